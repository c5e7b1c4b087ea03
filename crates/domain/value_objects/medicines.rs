use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::medicines::{InsertMedicineEntity, MedicineEntity, UpdateMedicineEntity},
    value_objects::validation::{ValidationError, ensure, ensure_not_blank},
};

pub const MIN_EXPIRY_MONTHS: i32 = 1;
pub const MAX_EXPIRY_MONTHS: i32 = 60;

/// A purchasable subscription length for a medicine. Stored as JSONB on the medicine row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionOption {
    pub duration_days: i32,
    pub price_minor: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MedicineModel {
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

impl From<MedicineEntity> for MedicineModel {
    fn from(entity: MedicineEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            manufacturer: entity.manufacturer,
            price_minor: entity.price_minor,
            stock: entity.stock,
            category: entity.category,
            prescription_required: entity.prescription_required,
            image_url: entity.image_url,
            dosage: entity.dosage,
            expiry_time_frame_months: entity.expiry_time_frame_months,
            is_available_for_subscription: entity.is_available_for_subscription,
            subscription_options: entity.subscription_options,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// The catalog fields shown next to an order line or a subscription.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MedicineSummary {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub manufacturer: String,
    pub image_url: Option<String>,
}

impl From<&MedicineEntity> for MedicineSummary {
    fn from(entity: &MedicineEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            dosage: entity.dosage.clone(),
            manufacturer: entity.manufacturer.clone(),
            image_url: entity.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertMedicineModel {
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub price_minor: i64,
    pub stock: i32,
    pub category: String,
    #[serde(default)]
    pub prescription_required: bool,
    pub image_url: Option<String>,
    pub dosage: String,
    pub expiry_time_frame_months: i32,
    #[serde(default)]
    pub is_available_for_subscription: bool,
    #[serde(default)]
    pub subscription_options: Vec<SubscriptionOption>,
}

impl InsertMedicineModel {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_not_blank(&self.name, "name")?;
        ensure_not_blank(&self.description, "description")?;
        ensure_not_blank(&self.manufacturer, "manufacturer")?;
        ensure_not_blank(&self.category, "category")?;
        ensure_not_blank(&self.dosage, "dosage")?;
        validate_price(self.price_minor)?;
        validate_stock(self.stock)?;
        validate_expiry(self.expiry_time_frame_months)?;
        validate_subscription_options(&self.subscription_options)
    }

    pub fn to_entity(&self) -> InsertMedicineEntity {
        let now = Utc::now();
        InsertMedicineEntity {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            manufacturer: self.manufacturer.clone(),
            price_minor: self.price_minor,
            stock: self.stock,
            category: self.category.clone(),
            prescription_required: self.prescription_required,
            image_url: self.image_url.clone(),
            dosage: self.dosage.clone(),
            expiry_time_frame_months: self.expiry_time_frame_months,
            is_available_for_subscription: self.is_available_for_subscription,
            subscription_options: options_to_json(&self.subscription_options),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMedicineModel {
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
    pub subscription_options: Option<Vec<SubscriptionOption>>,
}

impl UpdateMedicineModel {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (value, field) in [
            (&self.name, "name"),
            (&self.description, "description"),
            (&self.manufacturer, "manufacturer"),
            (&self.category, "category"),
            (&self.dosage, "dosage"),
        ] {
            if let Some(value) = value {
                ensure_not_blank(value, field)?;
            }
        }
        if let Some(price_minor) = self.price_minor {
            validate_price(price_minor)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        if let Some(months) = self.expiry_time_frame_months {
            validate_expiry(months)?;
        }
        if let Some(options) = &self.subscription_options {
            validate_subscription_options(options)?;
        }
        Ok(())
    }

    pub fn to_entity(&self) -> UpdateMedicineEntity {
        UpdateMedicineEntity {
            name: self.name.as_ref().map(|name| name.trim().to_string()),
            description: self.description.clone(),
            manufacturer: self.manufacturer.clone(),
            price_minor: self.price_minor,
            stock: self.stock,
            category: self.category.clone(),
            prescription_required: self.prescription_required,
            image_url: self.image_url.clone(),
            dosage: self.dosage.clone(),
            expiry_time_frame_months: self.expiry_time_frame_months,
            is_available_for_subscription: self.is_available_for_subscription,
            subscription_options: self.subscription_options.as_deref().map(options_to_json),
            updated_at: Utc::now(),
        }
    }
}

fn options_to_json(options: &[SubscriptionOption]) -> serde_json::Value {
    serde_json::Value::Array(
        options
            .iter()
            .map(|option| {
                serde_json::json!({
                    "duration_days": option.duration_days,
                    "price_minor": option.price_minor,
                })
            })
            .collect(),
    )
}

fn validate_price(price_minor: i64) -> Result<(), ValidationError> {
    ensure(price_minor >= 0, "price must not be negative")
}

fn validate_stock(stock: i32) -> Result<(), ValidationError> {
    ensure(stock >= 0, "stock must not be negative")
}

fn validate_expiry(months: i32) -> Result<(), ValidationError> {
    ensure(
        (MIN_EXPIRY_MONTHS..=MAX_EXPIRY_MONTHS).contains(&months),
        format!(
            "expiry time frame must be between {MIN_EXPIRY_MONTHS} and {MAX_EXPIRY_MONTHS} months"
        ),
    )
}

fn validate_subscription_options(options: &[SubscriptionOption]) -> Result<(), ValidationError> {
    let mut durations = HashSet::new();
    for option in options {
        ensure(
            option.duration_days >= 1,
            "subscription duration must be at least one day",
        )?;
        validate_price(option.price_minor)?;
        ensure(
            durations.insert(option.duration_days),
            format!("duplicate subscription duration {}", option.duration_days),
        )?;
    }
    Ok(())
}
