use axum::http::StatusCode;
use crates::domain::{
    repositories::errors::{DuplicateEmail, OrderStatusConflict, StockError, SubscriptionMissing},
    value_objects::{iam::Actor, validation::ValidationError},
};
use thiserror::Error;
use uuid::Uuid;

pub type UseCaseResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("insufficient stock for medicine {medicine_id}")]
    InsufficientStock { medicine_id: Uuid },

    #[error("{0}")]
    InvalidOption(String),

    #[error("{0}")]
    NotEligible(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("admin access required")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("request body is too large")]
    PayloadTooLarge,

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InsufficientStock { .. }
            | ServiceError::InvalidOption(_)
            | ServiceError::NotEligible(_)
            | ServiceError::InvalidState(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    /// Recovers the typed failures repositories raise inside transactions.
    pub fn from_repository(err: anyhow::Error) -> Self {
        if let Some(StockError::Insufficient { medicine_id }) = err.downcast_ref::<StockError>() {
            return ServiceError::InsufficientStock {
                medicine_id: *medicine_id,
            };
        }
        if let Some(conflict) = err.downcast_ref::<OrderStatusConflict>() {
            return ServiceError::InvalidState(conflict.to_string());
        }
        if let Some(missing) = err.downcast_ref::<SubscriptionMissing>() {
            return ServiceError::NotFound(format!("subscription {}", missing.subscription_id));
        }
        if let Some(duplicate) = err.downcast_ref::<DuplicateEmail>() {
            return ServiceError::Conflict(duplicate.to_string());
        }
        ServiceError::Internal(err)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.0)
    }
}

/// Role checks every admin-only operation runs before touching a repository.
pub trait ActorPolicy {
    fn require_admin(&self) -> UseCaseResult<()>;
}

impl ActorPolicy for Actor {
    fn require_admin(&self) -> UseCaseResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}
