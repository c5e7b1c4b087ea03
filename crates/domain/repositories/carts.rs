use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::carts::CartEntity;

#[automock]
#[async_trait]
pub trait CartRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<CartEntity>>;

    /// Replaces the user's cart (items and total) in one write.
    async fn save(&self, cart_entity: CartEntity) -> Result<CartEntity>;
}
