use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::medicines},
};
use domain::{
    entities::medicines::{InsertMedicineEntity, MedicineEntity, MedicineRow, UpdateMedicineEntity},
    repositories::medicines::MedicineRepository,
};

pub struct MedicinePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MedicinePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MedicineRepository for MedicinePostgres {
    async fn find_by_id(&self, medicine_id: Uuid) -> Result<Option<MedicineEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = medicines::table
            .filter(medicines::id.eq(medicine_id))
            .select(MedicineRow::as_select())
            .first::<MedicineRow>(&mut conn)
            .optional()?;

        result.map(MedicineEntity::try_from).transpose()
    }

    async fn find_many(&self, medicine_ids: &[Uuid]) -> Result<Vec<MedicineEntity>> {
        if medicine_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = medicines::table
            .filter(medicines::id.eq_any(medicine_ids))
            .select(MedicineRow::as_select())
            .load::<MedicineRow>(&mut conn)?;

        results.into_iter().map(MedicineEntity::try_from).collect()
    }

    async fn list(&self) -> Result<Vec<MedicineEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = medicines::table
            .order(medicines::name.asc())
            .select(MedicineRow::as_select())
            .load::<MedicineRow>(&mut conn)?;

        results.into_iter().map(MedicineEntity::try_from).collect()
    }

    async fn list_available_for_subscription(&self) -> Result<Vec<MedicineEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = medicines::table
            .filter(medicines::is_available_for_subscription.eq(true))
            .order(medicines::name.asc())
            .select(MedicineRow::as_select())
            .load::<MedicineRow>(&mut conn)?;

        results.into_iter().map(MedicineEntity::try_from).collect()
    }

    async fn create(
        &self,
        insert_medicine_entity: InsertMedicineEntity,
    ) -> Result<MedicineEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(medicines::table)
            .values(&insert_medicine_entity)
            .returning(MedicineRow::as_returning())
            .get_result::<MedicineRow>(&mut conn)?;

        result.try_into()
    }

    async fn update(
        &self,
        medicine_id: Uuid,
        update_medicine_entity: UpdateMedicineEntity,
    ) -> Result<Option<MedicineEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(medicines::table)
            .filter(medicines::id.eq(medicine_id))
            .set(&update_medicine_entity)
            .returning(MedicineRow::as_returning())
            .get_result::<MedicineRow>(&mut conn)
            .optional()?;

        result.map(MedicineEntity::try_from).transpose()
    }

    async fn delete(&self, medicine_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(medicines::table)
            .filter(medicines::id.eq(medicine_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
