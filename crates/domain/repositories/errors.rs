//! Typed failures raised inside repository transactions.
//!
//! Repositories return `anyhow::Result`; callers recover these with
//! `anyhow::Error::downcast_ref`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("insufficient stock for medicine {medicine_id}")]
    Insufficient { medicine_id: Uuid },
}

/// The order was not in the expected state when the conditional update ran.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("order {order_id} is no longer {expected}")]
pub struct OrderStatusConflict {
    pub order_id: Uuid,
    pub expected: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("email {email} is already registered")]
pub struct DuplicateEmail {
    pub email: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("subscription {subscription_id} not found")]
pub struct SubscriptionMissing {
    pub subscription_id: Uuid,
}
