use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::medicines::{
    InsertMedicineEntity, MedicineEntity, UpdateMedicineEntity,
};

#[automock]
#[async_trait]
pub trait MedicineRepository {
    async fn find_by_id(&self, medicine_id: Uuid) -> Result<Option<MedicineEntity>>;

    /// Ids with no matching row are skipped.
    async fn find_many(&self, medicine_ids: &[Uuid]) -> Result<Vec<MedicineEntity>>;

    async fn list(&self) -> Result<Vec<MedicineEntity>>;

    async fn list_available_for_subscription(&self) -> Result<Vec<MedicineEntity>>;

    async fn create(
        &self,
        insert_medicine_entity: InsertMedicineEntity,
    ) -> Result<MedicineEntity>;

    async fn update(
        &self,
        medicine_id: Uuid,
        update_medicine_entity: UpdateMedicineEntity,
    ) -> Result<Option<MedicineEntity>>;

    async fn delete(&self, medicine_id: Uuid) -> Result<bool>;
}
