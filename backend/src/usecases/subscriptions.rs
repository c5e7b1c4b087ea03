use std::{collections::HashMap, sync::Arc};

use axum::http::StatusCode;
use chrono::Utc;
use crates::domain::{
    entities::{
        medicines::MedicineEntity,
        orders::OrderAggregate,
        user_subscriptions::{InsertUserSubscriptionEntity, UserSubscriptionEntity},
    },
    repositories::{
        medicines::MedicineRepository, subscriptions::SubscriptionRepository,
        users::UserRepository,
    },
    value_objects::{
        addresses::Address,
        enums::subscription_statuses::SubscriptionStatus,
        iam::Actor,
        medicines::MedicineSummary,
        orders::OrderModel,
        subscriptions::{
            RenewSubscriptionModel, SubscribeModel, SubscriptionPeriod, UserSubscriptionModel,
        },
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    errors::{ServiceError, UseCaseResult},
    orders::{OrderDraft, subscription_period},
    stock::{self, PricedLines},
};

/// Subscription orders are priced from the medicine's subscription options and never
/// reserve stock.
pub struct SubscriptionUseCase<M, S, U>
where
    M: MedicineRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    medicine_repository: Arc<M>,
    subscription_repository: Arc<S>,
    user_repository: Arc<U>,
}

impl<M, S, U> SubscriptionUseCase<M, S, U>
where
    M: MedicineRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(
        medicine_repository: Arc<M>,
        subscription_repository: Arc<S>,
        user_repository: Arc<U>,
    ) -> Self {
        Self {
            medicine_repository,
            subscription_repository,
            user_repository,
        }
    }

    pub async fn subscribe(
        &self,
        actor: Actor,
        subscribe_model: SubscribeModel,
    ) -> UseCaseResult<OrderModel> {
        let user_id = actor.user_id;
        let SubscribeModel {
            medicine_id,
            duration_days,
            payment_method,
            shipping_address,
        } = subscribe_model;

        info!(%user_id, %medicine_id, duration_days, "subscriptions: subscribe requested");

        let medicine = stock::load_medicine(self.medicine_repository.as_ref(), medicine_id).await?;

        if !medicine.is_available_for_subscription {
            warn!(
                %user_id,
                %medicine_id,
                status = StatusCode::BAD_REQUEST.as_u16(),
                "subscriptions: medicine not available for subscription"
            );
            return Err(ServiceError::NotEligible(format!(
                "medicine {medicine_id} is not available for subscription"
            )));
        }

        let price_minor = medicine
            .subscription_option(duration_days)
            .map(|option| option.price_minor)
            .ok_or_else(|| {
                warn!(
                    %user_id,
                    %medicine_id,
                    duration_days,
                    status = StatusCode::BAD_REQUEST.as_u16(),
                    "subscriptions: unknown subscription option"
                );
                ServiceError::InvalidOption(format!(
                    "no {duration_days}-day subscription option for medicine {medicine_id}"
                ))
            })?;

        let period = subscription_period(duration_days)?;
        let draft = self
            .draft(
                actor,
                &medicine,
                price_minor,
                period,
                RenewSubscriptionModel {
                    payment_method,
                    shipping_address,
                },
            )
            .await?;

        let now = Utc::now();
        let entry = InsertUserSubscriptionEntity {
            user_id,
            medicine_id,
            duration_days,
            start_date: period.start_date,
            end_date: period.end_date,
            status: SubscriptionStatus::Active.to_string(),
            created_at: now,
            updated_at: now,
        };

        let (subscription, aggregate) = self
            .subscription_repository
            .subscribe(entry, draft.into_new_order()?)
            .await
            .map_err(|err| {
                error!(%user_id, %medicine_id, db_error = ?err, "subscriptions: subscribe failed");
                ServiceError::from_repository(err)
            })?;

        info!(
            %user_id,
            subscription_id = %subscription.id,
            order_id = %aggregate.order.id,
            end_date = %subscription.end_date,
            "subscriptions: subscribed"
        );

        self.present_order(aggregate, &medicine)
    }

    /// Starts a new term from now with the entry's stored duration. Cancelled and
    /// completed entries may be renewed; the entry becomes active again.
    pub async fn renew_subscription(
        &self,
        actor: Actor,
        subscription_id: Uuid,
        renew_model: RenewSubscriptionModel,
    ) -> UseCaseResult<OrderModel> {
        let user_id = actor.user_id;
        let entry = self.find_entry(actor, subscription_id).await?;

        let medicine =
            stock::load_medicine(self.medicine_repository.as_ref(), entry.medicine_id).await?;

        let price_minor = medicine
            .subscription_option(entry.duration_days)
            .map(|option| option.price_minor)
            .ok_or_else(|| {
                ServiceError::not_found(format!(
                    "{}-day subscription option for medicine {}",
                    entry.duration_days, entry.medicine_id
                ))
            })?;

        let period = subscription_period(entry.duration_days)?;
        let draft = self
            .draft(actor, &medicine, price_minor, period, renew_model)
            .await?;

        let (subscription, aggregate) = self
            .subscription_repository
            .renew(
                subscription_id,
                period.start_date,
                period.end_date,
                draft.into_new_order()?,
            )
            .await
            .map_err(|err| {
                error!(%user_id, %subscription_id, db_error = ?err, "subscriptions: renew failed");
                ServiceError::from_repository(err)
            })?;

        info!(
            %user_id,
            %subscription_id,
            previous_status = %entry.status,
            order_id = %aggregate.order.id,
            end_date = %subscription.end_date,
            "subscriptions: renewed"
        );

        self.present_order(aggregate, &medicine)
    }

    pub async fn cancel_subscription(
        &self,
        actor: Actor,
        subscription_id: Uuid,
    ) -> UseCaseResult<()> {
        self.find_entry(actor, subscription_id).await?;

        self.subscription_repository
            .cancel(subscription_id)
            .await
            .map_err(ServiceError::from_repository)?;

        info!(user_id = %actor.user_id, %subscription_id, "subscriptions: cancelled");

        Ok(())
    }

    pub async fn list_my_subscriptions(
        &self,
        actor: Actor,
    ) -> UseCaseResult<Vec<UserSubscriptionModel>> {
        let user_id = actor.user_id;

        let completed = self
            .subscription_repository
            .complete_expired(user_id, Utc::now())
            .await
            .map_err(ServiceError::from_repository)?;
        if completed > 0 {
            info!(%user_id, completed, "subscriptions: expired entries completed");
        }

        let entries = self
            .subscription_repository
            .list_by_user(user_id)
            .await
            .map_err(ServiceError::from_repository)?;

        let mut entries = entries
            .into_iter()
            .map(UserSubscriptionModel::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let medicines = stock::medicine_summaries(
            self.medicine_repository.as_ref(),
            entries.iter().map(|entry| entry.medicine_id),
        )
        .await?;
        for entry in &mut entries {
            entry.medicine = medicines.get(&entry.medicine_id).cloned();
        }

        Ok(entries)
    }

    /// Subscription orders have a single line for the medicine already loaded.
    fn present_order(
        &self,
        aggregate: OrderAggregate,
        medicine: &MedicineEntity,
    ) -> UseCaseResult<OrderModel> {
        let mut order = OrderModel::try_from(aggregate)?;
        order.attach_medicines(&HashMap::from([(medicine.id, MedicineSummary::from(medicine))]));

        Ok(order)
    }

    async fn find_entry(
        &self,
        actor: Actor,
        subscription_id: Uuid,
    ) -> UseCaseResult<UserSubscriptionEntity> {
        self.subscription_repository
            .find_for_user(subscription_id, actor.user_id)
            .await
            .map_err(ServiceError::from_repository)?
            .ok_or_else(|| ServiceError::not_found(format!("subscription {subscription_id}")))
    }

    async fn draft(
        &self,
        actor: Actor,
        medicine: &MedicineEntity,
        price_minor: i64,
        period: SubscriptionPeriod,
        delivery: RenewSubscriptionModel,
    ) -> UseCaseResult<OrderDraft> {
        let shipping_address = match delivery.shipping_address {
            Some(address) if !address.is_blank() => Some(address),
            _ => self.profile_address(actor.user_id).await?,
        };

        Ok(OrderDraft {
            user_id: actor.user_id,
            priced: PricedLines::single(medicine, price_minor),
            period: Some(period),
            shipping_address,
            payment_method: delivery.payment_method.unwrap_or_default(),
            prescription_url: None,
            reserve_stock: false,
        })
    }

    async fn profile_address(&self, user_id: Uuid) -> UseCaseResult<Option<Address>> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await
            .map_err(ServiceError::from_repository)?;

        match user {
            Some(user) => Ok(Address::from_json(user.address)?),
            None => Ok(None),
        }
    }
}
