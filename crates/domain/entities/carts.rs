use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::carts;

/// One row per user. `items` holds the serialized cart lines.
#[derive(Debug, Clone, Selectable, Queryable, Insertable, PartialEq)]
#[diesel(table_name = carts)]
pub struct CartEntity {
    pub user_id: Uuid,
    pub items: serde_json::Value,
    pub total_amount_minor: i64,
    pub updated_at: DateTime<Utc>,
}
