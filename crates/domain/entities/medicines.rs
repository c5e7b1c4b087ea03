use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::medicines::SubscriptionOption,
    infra::db::postgres::schema::medicines,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MedicineEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub price_minor: i64,
    pub stock: i32,
    pub category: String,
    pub prescription_required: bool,
    pub image_url: Option<String>,
    pub dosage: String,
    pub expiry_time_frame_months: i32,
    pub is_available_for_subscription: bool,
    pub subscription_options: Vec<SubscriptionOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MedicineEntity {
    pub fn subscription_option(&self, duration_days: i32) -> Option<&SubscriptionOption> {
        self.subscription_options
            .iter()
            .find(|option| option.duration_days == duration_days)
    }
}

/// Raw row used for Diesel queries. Subscription options stay as JSON and are parsed on load.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = medicines)]
pub struct MedicineRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub price_minor: i64,
    pub stock: i32,
    pub category: String,
    pub prescription_required: bool,
    pub image_url: Option<String>,
    pub dosage: String,
    pub expiry_time_frame_months: i32,
    pub is_available_for_subscription: bool,
    pub subscription_options: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MedicineRow> for MedicineEntity {
    type Error = anyhow::Error;

    fn try_from(value: MedicineRow) -> Result<Self, Self::Error> {
        let subscription_options = serde_json::from_value(value.subscription_options)
            .with_context(|| format!("medicine {} has unreadable subscription options", value.id))?;

        Ok(Self {
            id: value.id,
            name: value.name,
            description: value.description,
            manufacturer: value.manufacturer,
            price_minor: value.price_minor,
            stock: value.stock,
            category: value.category,
            prescription_required: value.prescription_required,
            image_url: value.image_url,
            dosage: value.dosage,
            expiry_time_frame_months: value.expiry_time_frame_months,
            is_available_for_subscription: value.is_available_for_subscription,
            subscription_options,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = medicines)]
pub struct InsertMedicineEntity {
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub price_minor: i64,
    pub stock: i32,
    pub category: String,
    pub prescription_required: bool,
    pub image_url: Option<String>,
    pub dosage: String,
    pub expiry_time_frame_months: i32,
    pub is_available_for_subscription: bool,
    pub subscription_options: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset, PartialEq)]
#[diesel(table_name = medicines)]
pub struct UpdateMedicineEntity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub price_minor: Option<i64>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub prescription_required: Option<bool>,
    pub image_url: Option<String>,
    pub dosage: Option<String>,
    pub expiry_time_frame_months: Option<i32>,
    pub is_available_for_subscription: Option<bool>,
    pub subscription_options: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}
