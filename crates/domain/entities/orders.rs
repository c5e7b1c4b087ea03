use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{order_items, orders};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount_minor: i64,
    pub order_type: String,
    pub subscription_duration_days: Option<i32>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub subscription_renewal_date: Option<DateTime<Utc>>,
    pub status: String,
    pub shipping_address: Option<serde_json::Value>,
    pub payment_status: String,
    pub payment_method: String,
    pub prescription_required: bool,
    pub prescription_url: Option<String>,
    pub stock_reserved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = orders)]
pub struct InsertOrderEntity {
    pub user_id: Uuid,
    pub total_amount_minor: i64,
    pub order_type: String,
    pub subscription_duration_days: Option<i32>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub subscription_renewal_date: Option<DateTime<Utc>>,
    pub status: String,
    pub shipping_address: Option<serde_json::Value>,
    pub payment_status: String,
    pub payment_method: String,
    pub prescription_required: bool,
    pub prescription_url: Option<String>,
    pub stock_reserved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status columns an order transition may touch; `None` leaves the column as is.
#[derive(Debug, Clone, AsChangeset, PartialEq)]
#[diesel(table_name = orders)]
pub struct UpdateOrderStatusEntity {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Associations, PartialEq)]
#[diesel(belongs_to(OrderEntity, foreign_key = order_id))]
#[diesel(table_name = order_items)]
pub struct OrderItemEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub line_no: i32,
    pub medicine_id: Uuid,
    pub quantity: i32,
    pub price_minor: i64,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = order_items)]
pub struct InsertOrderItemEntity {
    pub order_id: Uuid,
    pub line_no: i32,
    pub medicine_id: Uuid,
    pub quantity: i32,
    pub price_minor: i64,
}

/// A priced line waiting for its order id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub medicine_id: Uuid,
    pub quantity: i32,
    pub price_minor: i64,
}

/// Everything needed to persist an order in one transaction.
///
/// With `order.stock_reserved` set, every line's quantity is taken from the medicine
/// stock by a conditional decrement and the whole order fails if any line cannot be
/// covered. Only such orders give stock back when they are cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order: InsertOrderEntity,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderAggregate {
    pub order: OrderEntity,
    pub items: Vec<OrderItemEntity>,
}
