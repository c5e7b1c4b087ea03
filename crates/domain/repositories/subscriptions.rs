use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{
    orders::{NewOrder, OrderAggregate},
    user_subscriptions::{InsertUserSubscriptionEntity, UserSubscriptionEntity},
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<UserSubscriptionEntity>>;

    async fn find_for_user(
        &self,
        subscription_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UserSubscriptionEntity>>;

    /// Marks the user's active entries whose term ended before `now` as completed.
    async fn complete_expired(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// Inserts the entry and its first order in one transaction.
    async fn subscribe(
        &self,
        insert_subscription_entity: InsertUserSubscriptionEntity,
        new_order: NewOrder,
    ) -> Result<(UserSubscriptionEntity, OrderAggregate)>;

    /// Resets the entry's term, forces it active and inserts the renewal order in one
    /// transaction.
    async fn renew(
        &self,
        subscription_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        new_order: NewOrder,
    ) -> Result<(UserSubscriptionEntity, OrderAggregate)>;

    async fn cancel(&self, subscription_id: Uuid) -> Result<UserSubscriptionEntity>;
}
