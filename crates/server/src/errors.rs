use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Envelope;
use serde::Serialize;
use service::errors::ServiceError;
use service::records::RecordError;
use thiserror::Error;
use tracing::{error, warn};

/// Failed request rendered as an envelope with `output: false`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub input: serde_json::Value,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, input: impl Serialize, message: impl Into<String>) -> Self {
        let input = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
        Self { status, input, message: message.into() }
    }

    pub fn malformed(input: impl Serialize, detail: impl std::fmt::Display) -> Self {
        Self::record(input, RecordError::MalformedRequest(detail.to_string()))
    }

    pub fn record(input: impl Serialize, err: RecordError) -> Self {
        let status = record_status(&err);
        if err.is_store_failure() {
            warn!(code = err.code(), error = ?err, "record store failure");
        }
        Self::new(status, input, err.to_string())
    }

    pub fn service(input: impl Serialize, err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, input, msg),
        }
    }
}

/// Store trouble is reported as 400, not 5xx.
pub fn record_status(err: &RecordError) -> StatusCode {
    match err {
        RecordError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        RecordError::Conflict => StatusCode::CONFLICT,
        RecordError::NotFound(_) => StatusCode::NOT_FOUND,
        RecordError::StoreUnavailable(_) | RecordError::DeleteIncomplete { .. } => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Envelope::failed(self.input, self.message))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store setup failed: {0}")]
    Store(#[from] service::records::StoreError),
    #[error("notifier setup failed: {0}")]
    Notifier(#[from] common::notify::NotifyError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

impl StartupError {
    pub fn log(&self) {
        error!(error = %self, "startup error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::records::domain::Command;

    #[test]
    fn status_mapping() {
        assert_eq!(record_status(&RecordError::Conflict), StatusCode::CONFLICT);
        assert_eq!(record_status(&RecordError::NotFound(Command::Update)), StatusCode::NOT_FOUND);
        assert_eq!(record_status(&RecordError::StoreUnavailable("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(record_status(&RecordError::DeleteIncomplete { removed: 0 }), StatusCode::BAD_REQUEST);
        assert_eq!(record_status(&RecordError::MalformedRequest("x".into())), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_validation_is_bad_request() {
        let e = ApiError::service(21, ServiceError::Validation("too big".into()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.input, serde_json::json!(21));
        assert_eq!(e.message, "too big");
    }
}
