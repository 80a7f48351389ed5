use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use common::types::Envelope;
use serde::{Deserialize, Serialize};
use service::records::domain::{Command, OperationResult, RecordInput};
use service::records::RecordError;
use tracing::info;

use crate::errors::ApiError;
use crate::observability;
use crate::state::AppState;

/// Request body for create/update.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
    #[serde(default)]
    pub value: Option<String>,
}

/// What the client asked for, echoed back in `input`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordEcho {
    pub key: String,
    pub value: Option<String>,
}

pub type RecordResponse = Json<Envelope<RecordEcho, OperationResult>>;

fn finish(
    command: Command,
    echo: RecordEcho,
    result: Result<OperationResult, RecordError>,
) -> Result<RecordResponse, ApiError> {
    match result {
        Ok(out) => {
            observability::record_command(command.as_str(), "ok");
            Ok(Json(Envelope::ok(echo, out)))
        }
        Err(e) => {
            observability::record_command(command.as_str(), outcome_label(&e));
            info!(command = command.as_str(), key = %echo.key, code = e.code(), "record command rejected");
            Err(ApiError::record(echo, e))
        }
    }
}

fn outcome_label(e: &RecordError) -> &'static str {
    match e {
        RecordError::MalformedRequest(_) => "malformed",
        RecordError::Conflict => "conflict",
        RecordError::NotFound(_) => "not_found",
        RecordError::StoreUnavailable(_) | RecordError::DeleteIncomplete { .. } => "store_error",
    }
}

/// Unpack the JSON body; any rejection becomes `MalformedRequest` before the store is touched.
fn parse_body(
    command: Command,
    key: &str,
    body: Result<Json<RecordBody>, JsonRejection>,
) -> Result<RecordInput, ApiError> {
    match body {
        Ok(Json(body)) => Ok(RecordInput { key: key.to_string(), value: body.value }),
        Err(rejection) => {
            observability::record_command(command.as_str(), "malformed");
            let echo = RecordEcho { key: key.to_string(), value: None };
            Err(ApiError::malformed(echo, rejection.body_text()))
        }
    }
}

#[utoipa::path(
    post, path = "/kv-record/{key}", tag = "records",
    params(("key" = String, Path, description = "Record key")),
    request_body = crate::openapi::RecordBodyDoc,
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "Malformed request or store unavailable"),
        (status = 409, description = "Key already exists")
    )
)]
pub async fn create_record(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Result<Json<RecordBody>, JsonRejection>,
) -> Result<RecordResponse, ApiError> {
    let input = parse_body(Command::Create, &key, body)?;
    let echo = RecordEcho { key, value: input.value.clone() };
    finish(Command::Create, echo, state.records.create(input).await)
}

#[utoipa::path(
    put, path = "/kv-record/{key}", tag = "records",
    params(("key" = String, Path, description = "Record key")),
    request_body = crate::openapi::RecordBodyDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Malformed request or store unavailable"),
        (status = 404, description = "Key does not exist")
    )
)]
pub async fn update_record(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Result<Json<RecordBody>, JsonRejection>,
) -> Result<RecordResponse, ApiError> {
    let input = parse_body(Command::Update, &key, body)?;
    let echo = RecordEcho { key, value: input.value.clone() };
    finish(Command::Update, echo, state.records.update(input).await)
}

#[utoipa::path(
    get, path = "/kv-retrieve/{key}", tag = "records",
    params(("key" = String, Path, description = "Record key")),
    responses(
        (status = 200, description = "Stored value in output"),
        (status = 400, description = "Store unavailable"),
        (status = 404, description = "Key does not exist")
    )
)]
pub async fn retrieve_record(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<RecordResponse, ApiError> {
    let result = state.records.retrieve(&key).await;
    finish(Command::Retrieve, RecordEcho { key, value: None }, result)
}

#[utoipa::path(
    delete, path = "/keyval/{key}", tag = "records",
    params(("key" = String, Path, description = "Record key")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Store unavailable or nothing removed"),
        (status = 404, description = "Key does not exist")
    )
)]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<RecordResponse, ApiError> {
    let result = state.records.delete(&key).await;
    finish(Command::Delete, RecordEcho { key, value: None }, result)
}
