use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use crates::domain::{
    entities::orders::{InsertOrderEntity, NewOrder, OrderAggregate, UpdateOrderStatusEntity},
    repositories::{medicines::MedicineRepository, orders::OrderRepository},
    value_objects::{
        addresses::Address,
        enums::{
            order_statuses::OrderStatus, order_types::OrderType, payment_methods::PaymentMethod,
            payment_statuses::PaymentStatus,
        },
        iam::Actor,
        orders::{CreateOrderModel, OrderModel},
        subscriptions::SubscriptionPeriod,
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    errors::{ActorPolicy, ServiceError, UseCaseResult},
    stock::{self, PricedLines},
};

/// An order ready to be persisted: priced lines plus everything the order row needs.
#[derive(Debug, Clone)]
pub(crate) struct OrderDraft {
    pub user_id: Uuid,
    pub priced: PricedLines,
    pub period: Option<SubscriptionPeriod>,
    pub shipping_address: Option<Address>,
    pub payment_method: PaymentMethod,
    pub prescription_url: Option<String>,
    pub reserve_stock: bool,
}

impl OrderDraft {
    pub fn into_new_order(self) -> anyhow::Result<NewOrder> {
        let now = Utc::now();
        let order_type = if self.period.is_some() {
            OrderType::Subscription
        } else {
            OrderType::Regular
        };

        let shipping_address = self
            .shipping_address
            .as_ref()
            .map(Address::to_json)
            .transpose()?;

        Ok(NewOrder {
            order: InsertOrderEntity {
                user_id: self.user_id,
                total_amount_minor: self.priced.total_amount_minor,
                order_type: order_type.to_string(),
                subscription_duration_days: self.period.map(|p| p.duration_days),
                subscription_start_date: self.period.map(|p| p.start_date),
                subscription_end_date: self.period.map(|p| p.end_date),
                subscription_renewal_date: self.period.map(|p| p.renewal_date),
                status: OrderStatus::Pending.to_string(),
                shipping_address,
                payment_status: PaymentStatus::Pending.to_string(),
                payment_method: self.payment_method.to_string(),
                prescription_required: self.priced.prescription_required,
                prescription_url: self.prescription_url,
                stock_reserved: self.reserve_stock,
                created_at: now,
                updated_at: now,
            },
            lines: self.priced.lines,
        })
    }
}

pub(crate) fn subscription_period(duration_days: i32) -> UseCaseResult<SubscriptionPeriod> {
    SubscriptionPeriod::starting_at(Utc::now(), duration_days).ok_or_else(|| {
        ServiceError::Validation("subscription duration must be at least 1 day".to_string())
    })
}

fn order_status_of(aggregate: &OrderAggregate) -> UseCaseResult<OrderStatus> {
    OrderStatus::from_str(&aggregate.order.status).ok_or_else(|| {
        ServiceError::Internal(anyhow::anyhow!(
            "order {} has unknown status {}",
            aggregate.order.id,
            aggregate.order.status
        ))
    })
}

fn payment_status_of(aggregate: &OrderAggregate) -> UseCaseResult<PaymentStatus> {
    PaymentStatus::from_str(&aggregate.order.payment_status).ok_or_else(|| {
        ServiceError::Internal(anyhow::anyhow!(
            "order {} has unknown payment status {}",
            aggregate.order.id,
            aggregate.order.payment_status
        ))
    })
}

pub struct OrderUseCase<M, O>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    medicine_repository: Arc<M>,
    order_repository: Arc<O>,
}

impl<M, O> OrderUseCase<M, O>
where
    M: MedicineRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    pub fn new(medicine_repository: Arc<M>, order_repository: Arc<O>) -> Self {
        Self {
            medicine_repository,
            order_repository,
        }
    }

    pub async fn create_order(
        &self,
        actor: Actor,
        create_order_model: CreateOrderModel,
    ) -> UseCaseResult<OrderModel> {
        let user_id = actor.user_id;
        info!(
            %user_id,
            items = create_order_model.items.len(),
            order_type = %create_order_model.order_type,
            "orders: create requested"
        );

        let period = match (
            create_order_model.order_type,
            create_order_model.subscription_details,
        ) {
            (OrderType::Subscription, Some(details)) => {
                Some(subscription_period(details.duration_days)?)
            }
            (OrderType::Subscription, None) => {
                return Err(ServiceError::Validation(
                    "subscription orders require subscription_details".to_string(),
                ));
            }
            (OrderType::Regular, Some(_)) => {
                return Err(ServiceError::Validation(
                    "subscription_details are only allowed on subscription orders".to_string(),
                ));
            }
            (OrderType::Regular, None) => None,
        };

        if create_order_model.shipping_address.is_blank() {
            return Err(ServiceError::Validation(
                "shipping_address is required".to_string(),
            ));
        }

        let priced =
            stock::price_order_lines(self.medicine_repository.as_ref(), &create_order_model.items)
                .await?;

        let draft = OrderDraft {
            user_id,
            priced,
            period,
            shipping_address: Some(create_order_model.shipping_address),
            payment_method: create_order_model.payment_method,
            prescription_url: create_order_model.prescription_url,
            reserve_stock: true,
        };

        self.place(draft).await
    }

    /// Persists a draft, reserving stock when the draft asks for it.
    pub(crate) async fn place(&self, draft: OrderDraft) -> UseCaseResult<OrderModel> {
        let user_id = draft.user_id;
        let new_order = draft.into_new_order()?;

        let aggregate = self
            .order_repository
            .place_order(new_order)
            .await
            .map_err(|err| {
                let err = ServiceError::from_repository(err);
                match &err {
                    ServiceError::InsufficientStock { medicine_id } => warn!(
                        %user_id,
                        %medicine_id,
                        status = StatusCode::BAD_REQUEST.as_u16(),
                        "orders: stock reservation failed"
                    ),
                    _ => error!(%user_id, db_error = ?err, "orders: failed to place order"),
                }
                err
            })?;

        info!(
            %user_id,
            order_id = %aggregate.order.id,
            total_amount_minor = aggregate.order.total_amount_minor,
            "orders: order placed"
        );

        self.present(aggregate).await
    }

    pub async fn cancel_order(&self, actor: Actor, order_id: Uuid) -> UseCaseResult<OrderModel> {
        let user_id = actor.user_id;

        let aggregate = self
            .order_repository
            .find_by_id_for_user(order_id, user_id)
            .await
            .map_err(ServiceError::from_repository)?
            .ok_or_else(|| ServiceError::not_found(format!("order {order_id}")))?;

        let status = order_status_of(&aggregate)?;
        if status != OrderStatus::Pending {
            warn!(
                %user_id,
                %order_id,
                order_status = %status,
                status = StatusCode::BAD_REQUEST.as_u16(),
                "orders: cancel rejected"
            );
            return Err(ServiceError::InvalidState(format!(
                "only pending orders can be cancelled, order is {status}"
            )));
        }

        let cancelled = self
            .transition(&aggregate, OrderStatus::Pending, OrderStatus::Cancelled)
            .await?;

        info!(%user_id, %order_id, "orders: order cancelled and stock restored");

        self.present(cancelled).await
    }

    pub async fn set_order_status(
        &self,
        actor: Actor,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> UseCaseResult<OrderModel> {
        actor.require_admin()?;

        let aggregate = self.find_any(order_id).await?;
        let current = order_status_of(&aggregate)?;

        if current.is_terminal() {
            warn!(
                admin_id = %actor.user_id,
                %order_id,
                order_status = %current,
                status = StatusCode::BAD_REQUEST.as_u16(),
                "orders: status change on a closed order rejected"
            );
            return Err(ServiceError::InvalidState(format!(
                "order is already {current}"
            )));
        }

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::InvalidState(format!(
                "cannot move order from {current} to {new_status}"
            )));
        }

        let updated = self.transition(&aggregate, current, new_status).await?;

        info!(
            admin_id = %actor.user_id,
            %order_id,
            from = %current,
            to = %new_status,
            "orders: status updated"
        );

        self.present(updated).await
    }

    pub async fn set_payment_status(
        &self,
        actor: Actor,
        order_id: Uuid,
        new_status: PaymentStatus,
    ) -> UseCaseResult<OrderModel> {
        actor.require_admin()?;

        let aggregate = self.find_any(order_id).await?;
        let current = payment_status_of(&aggregate)?;

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::InvalidState(format!(
                "cannot move payment from {current} to {new_status}"
            )));
        }

        let updated = self
            .order_repository
            .transition_payment_status(order_id, current, new_status)
            .await
            .map_err(ServiceError::from_repository)?;

        info!(
            admin_id = %actor.user_id,
            %order_id,
            from = %current,
            to = %new_status,
            "orders: payment status updated"
        );

        self.present(updated).await
    }

    pub async fn list_my_orders(&self, actor: Actor) -> UseCaseResult<Vec<OrderModel>> {
        let orders = self
            .order_repository
            .list_by_user(actor.user_id)
            .await
            .map_err(ServiceError::from_repository)?;

        self.present_all(orders).await
    }

    pub async fn get_my_order(&self, actor: Actor, order_id: Uuid) -> UseCaseResult<OrderModel> {
        let aggregate = self
            .order_repository
            .find_by_id_for_user(order_id, actor.user_id)
            .await
            .map_err(ServiceError::from_repository)?
            .ok_or_else(|| ServiceError::not_found(format!("order {order_id}")))?;

        self.present(aggregate).await
    }

    pub async fn list_all_orders(&self, actor: Actor) -> UseCaseResult<Vec<OrderModel>> {
        actor.require_admin()?;

        let orders = self
            .order_repository
            .list_all()
            .await
            .map_err(ServiceError::from_repository)?;

        self.present_all(orders).await
    }

    async fn present(&self, aggregate: OrderAggregate) -> UseCaseResult<OrderModel> {
        let mut order = OrderModel::try_from(aggregate)?;
        let medicines =
            stock::medicine_summaries(self.medicine_repository.as_ref(), order.medicine_ids())
                .await?;
        order.attach_medicines(&medicines);

        Ok(order)
    }

    /// Typed models with the medicine summary of every line, fetched in one catalog read.
    async fn present_all(&self, aggregates: Vec<OrderAggregate>) -> UseCaseResult<Vec<OrderModel>> {
        let mut orders = aggregates
            .into_iter()
            .map(OrderModel::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let medicines = stock::medicine_summaries(
            self.medicine_repository.as_ref(),
            orders.iter().flat_map(OrderModel::medicine_ids),
        )
        .await?;
        for order in &mut orders {
            order.attach_medicines(&medicines);
        }

        Ok(orders)
    }

    async fn find_any(&self, order_id: Uuid) -> UseCaseResult<OrderAggregate> {
        self.order_repository
            .find_by_id(order_id)
            .await
            .map_err(ServiceError::from_repository)?
            .ok_or_else(|| ServiceError::not_found(format!("order {order_id}")))
    }

    /// Conditional on `from`. Entering cancelled restores reserved stock and refunds a
    /// completed payment in the same write.
    async fn transition(
        &self,
        aggregate: &OrderAggregate,
        from: OrderStatus,
        to: OrderStatus,
    ) -> UseCaseResult<OrderAggregate> {
        let cancelling = to == OrderStatus::Cancelled;
        let refund = cancelling && payment_status_of(aggregate)? == PaymentStatus::Completed;

        let changes = UpdateOrderStatusEntity {
            status: Some(to.to_string()),
            payment_status: refund.then(|| PaymentStatus::Refunded.to_string()),
            updated_at: Utc::now(),
        };

        self.order_repository
            .transition_status(
                aggregate.order.id,
                from,
                changes,
                cancelling && aggregate.order.stock_reserved,
            )
            .await
            .map_err(ServiceError::from_repository)
    }
}
