use thiserror::Error;

/// Failures of the utility helpers. Record operations report `RecordError` directly.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
}
