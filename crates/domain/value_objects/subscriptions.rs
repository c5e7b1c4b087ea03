use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::user_subscriptions::UserSubscriptionEntity,
    value_objects::{
        addresses::Address,
        enums::{payment_methods::PaymentMethod, subscription_statuses::SubscriptionStatus},
        medicines::MedicineSummary,
    },
};

/// Dates of one subscription term. The renewal date coincides with the end of the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPeriod {
    pub duration_days: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
}

impl SubscriptionPeriod {
    /// `None` for non-positive durations or dates chrono cannot represent.
    pub fn starting_at(start_date: DateTime<Utc>, duration_days: i32) -> Option<Self> {
        if duration_days < 1 {
            return None;
        }
        let end_date =
            start_date.checked_add_signed(Duration::try_days(i64::from(duration_days))?)?;

        Some(Self {
            duration_days,
            start_date,
            end_date,
            renewal_date: end_date,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeModel {
    pub medicine_id: Uuid,
    pub duration_days: i32,
    pub payment_method: Option<PaymentMethod>,
    pub shipping_address: Option<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenewSubscriptionModel {
    pub payment_method: Option<PaymentMethod>,
    pub shipping_address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSubscriptionModel {
    pub id: Uuid,
    pub medicine_id: Uuid,
    /// `None` once the medicine has been removed from the catalog.
    pub medicine: Option<MedicineSummary>,
    pub duration_days: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserSubscriptionEntity> for UserSubscriptionModel {
    type Error = anyhow::Error;

    fn try_from(entity: UserSubscriptionEntity) -> Result<Self, Self::Error> {
        let status = SubscriptionStatus::from_str(&entity.status).ok_or_else(|| {
            anyhow!(
                "subscription {} has unknown status {:?}",
                entity.id,
                entity.status
            )
        })?;

        Ok(Self {
            id: entity.id,
            medicine_id: entity.medicine_id,
            medicine: None,
            duration_days: entity.duration_days,
            start_date: entity.start_date,
            end_date: entity.end_date,
            status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn thirty_day_term_ends_thirty_days_later() {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        let period = SubscriptionPeriod::starting_at(start, 30).unwrap();

        assert_eq!(period.start_date, start);
        assert_eq!(
            period.end_date,
            Utc.with_ymd_and_hms(2025, 2, 14, 9, 30, 0).unwrap()
        );
        assert_eq!(period.renewal_date, period.end_date);
    }

    #[test]
    fn unknown_stored_status_fails_to_load() {
        let now = Utc::now();
        let entity = UserSubscriptionEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            medicine_id: Uuid::new_v4(),
            duration_days: 30,
            start_date: now,
            end_date: now,
            status: "paused".to_string(),
            created_at: now,
            updated_at: now,
        };

        assert!(UserSubscriptionModel::try_from(entity).is_err());
    }

    #[test]
    fn rejects_empty_terms() {
        let start = Utc::now();
        assert_eq!(SubscriptionPeriod::starting_at(start, 0), None);
        assert_eq!(SubscriptionPeriod::starting_at(start, -7), None);
    }
}
