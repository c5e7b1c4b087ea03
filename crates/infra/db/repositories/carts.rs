use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, upsert::excluded};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::carts},
};
use domain::{entities::carts::CartEntity, repositories::carts::CartRepository};

pub struct CartPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CartPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CartRepository for CartPostgres {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<CartEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(CartEntity::as_select())
            .first::<CartEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn save(&self, cart_entity: CartEntity) -> Result<CartEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(carts::table)
            .values(&cart_entity)
            .on_conflict(carts::user_id)
            .do_update()
            .set((
                carts::items.eq(excluded(carts::items)),
                carts::total_amount_minor.eq(excluded(carts::total_amount_minor)),
                carts::updated_at.eq(excluded(carts::updated_at)),
            ))
            .returning(CartEntity::as_returning())
            .get_result::<CartEntity>(&mut conn)?;

        Ok(result)
    }
}
