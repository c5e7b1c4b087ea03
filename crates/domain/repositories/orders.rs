use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::orders::{NewOrder, OrderAggregate, UpdateOrderStatusEntity},
    value_objects::enums::{order_statuses::OrderStatus, payment_statuses::PaymentStatus},
};

#[automock]
#[async_trait]
pub trait OrderRepository {
    /// Reserves stock (when requested) and inserts the order with its lines atomically.
    /// Fails with [`StockError`](super::errors::StockError) if any line cannot be covered.
    async fn place_order(&self, new_order: NewOrder) -> Result<OrderAggregate>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderAggregate>>;

    async fn find_by_id_for_user(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrderAggregate>>;

    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderAggregate>>;

    async fn list_all(&self) -> Result<Vec<OrderAggregate>>;

    /// Applies `changes` only while the order is still in `from`, returning
    /// [`OrderStatusConflict`](super::errors::OrderStatusConflict) otherwise.
    /// With `restock` set, every line's quantity goes back to its medicine in the
    /// same transaction.
    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        changes: UpdateOrderStatusEntity,
        restock: bool,
    ) -> Result<OrderAggregate>;

    async fn transition_payment_status(
        &self,
        order_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<OrderAggregate>;
}
