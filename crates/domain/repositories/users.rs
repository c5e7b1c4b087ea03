use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::users::{InsertUserEntity, UserEntity};

#[automock]
#[async_trait]
pub trait UserRepository {
    /// Fails with [`DuplicateEmail`](super::errors::DuplicateEmail) when the email is taken.
    async fn create(&self, insert_user_entity: InsertUserEntity) -> Result<UserEntity>;

    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;
}
