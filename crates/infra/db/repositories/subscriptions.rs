use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::user_subscriptions},
        repositories::orders::insert_order,
    },
};
use domain::{
    entities::{
        orders::{NewOrder, OrderAggregate},
        user_subscriptions::{InsertUserSubscriptionEntity, UserSubscriptionEntity},
    },
    repositories::{errors::SubscriptionMissing, subscriptions::SubscriptionRepository},
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<UserSubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = user_subscriptions::table
            .filter(user_subscriptions::user_id.eq(user_id))
            .order(user_subscriptions::created_at.desc())
            .select(UserSubscriptionEntity::as_select())
            .load::<UserSubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_for_user(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UserSubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = user_subscriptions::table
            .filter(user_subscriptions::id.eq(subscription_id))
            .filter(user_subscriptions::user_id.eq(user_id))
            .select(UserSubscriptionEntity::as_select())
            .first::<UserSubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn complete_expired(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let completed = update(user_subscriptions::table)
            .filter(user_subscriptions::user_id.eq(user_id))
            .filter(user_subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .filter(user_subscriptions::end_date.lt(now))
            .set((
                user_subscriptions::status.eq(SubscriptionStatus::Completed.to_string()),
                user_subscriptions::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

        Ok(completed)
    }

    async fn subscribe(
        &self,
        insert_subscription_entity: InsertUserSubscriptionEntity,
        new_order: NewOrder,
    ) -> Result<(UserSubscriptionEntity, OrderAggregate)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<_, anyhow::Error, _>(|tx| {
            let aggregate = insert_order(tx, new_order)?;

            let subscription = insert_into(user_subscriptions::table)
                .values(&insert_subscription_entity)
                .returning(UserSubscriptionEntity::as_returning())
                .get_result::<UserSubscriptionEntity>(tx)?;

            Ok((subscription, aggregate))
        })?;

        Ok(result)
    }

    async fn renew(
        &self,
        subscription_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        new_order: NewOrder,
    ) -> Result<(UserSubscriptionEntity, OrderAggregate)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<_, anyhow::Error, _>(|tx| {
            let subscription = update(user_subscriptions::table)
                .filter(user_subscriptions::id.eq(subscription_id))
                .set((
                    user_subscriptions::start_date.eq(start_date),
                    user_subscriptions::end_date.eq(end_date),
                    user_subscriptions::status.eq(SubscriptionStatus::Active.to_string()),
                    user_subscriptions::updated_at.eq(Utc::now()),
                ))
                .returning(UserSubscriptionEntity::as_returning())
                .get_result::<UserSubscriptionEntity>(tx)
                .optional()?
                .ok_or(SubscriptionMissing { subscription_id })?;

            let aggregate = insert_order(tx, new_order)?;

            Ok((subscription, aggregate))
        })?;

        Ok(result)
    }

    async fn cancel(&self, subscription_id: Uuid) -> Result<UserSubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let subscription = update(user_subscriptions::table)
            .filter(user_subscriptions::id.eq(subscription_id))
            .set((
                user_subscriptions::status.eq(SubscriptionStatus::Cancelled.to_string()),
                user_subscriptions::updated_at.eq(Utc::now()),
            ))
            .returning(UserSubscriptionEntity::as_returning())
            .get_result::<UserSubscriptionEntity>(&mut conn)
            .optional()?
            .ok_or(SubscriptionMissing { subscription_id })?;

        Ok(subscription)
    }
}
