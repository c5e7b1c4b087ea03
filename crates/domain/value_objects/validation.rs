use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), ValidationError> {
    if condition {
        Ok(())
    } else {
        Err(ValidationError(message.into()))
    }
}

pub fn ensure_not_blank(value: &str, field: &str) -> Result<(), ValidationError> {
    ensure(!value.trim().is_empty(), format!("{field} is required"))
}
