use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::types::Envelope;
use serde::Serialize;
use service::helpers;
use tracing::{info, warn};

use crate::errors::ApiError;
use crate::observability;
use crate::state::AppState;

#[derive(Serialize)]
pub struct Greeting {
    pub output: &'static str,
}

pub async fn hello() -> Json<Greeting> {
    Json(Greeting { output: "Hello World!" })
}

#[utoipa::path(get, path = "/md5/{input}", tag = "utility", params(("input" = String, Path,)), responses((status = 200, description = "Hex digest")))]
pub async fn md5(Path(input): Path<String>) -> Json<Envelope<String, String>> {
    let digest = helpers::md5_hex(&input);
    Json(Envelope::ok(input, digest))
}

#[utoipa::path(get, path = "/factorial/{n}", tag = "utility", params(("n" = i64, Path,)), responses((status = 200, description = "n!"), (status = 400, description = "Result does not fit")))]
pub async fn factorial(Path(n): Path<i64>) -> Result<Json<Envelope<i64, u64>>, ApiError> {
    let out = helpers::factorial(n).map_err(|e| ApiError::service(n, e))?;
    Ok(Json(Envelope::ok(n, out)))
}

#[utoipa::path(get, path = "/fibonacci/{n}", tag = "utility", params(("n" = i64, Path,)), responses((status = 200, description = "Fibonacci numbers up to n")))]
pub async fn fibonacci(Path(n): Path<i64>) -> Json<Envelope<i64, Vec<u64>>> {
    Json(Envelope::ok(n, helpers::fibonacci_upto(n)))
}

/// Trial division is CPU-bound for large primes, so it runs off the async workers.
#[utoipa::path(get, path = "/is-prime/{n}", tag = "utility", params(("n" = i64, Path,)), responses((status = 200, description = "Primality")))]
pub async fn is_prime(Path(n): Path<i64>) -> Result<Json<Envelope<i64, bool>>, ApiError> {
    let prime = tokio::task::spawn_blocking(move || helpers::is_prime(n))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, n, e.to_string()))?;
    Ok(Json(Envelope::ok(n, prime)))
}

#[utoipa::path(get, path = "/slack-alert/{msg}", tag = "utility", params(("msg" = String, Path,)), responses((status = 200, description = "Delivery report in output/message")))]
pub async fn slack_alert(State(state): State<AppState>, Path(msg): Path<String>) -> Json<Envelope<String, bool>> {
    let channel = &state.config.slack.channel;
    let (delivered, message) = match &state.notifier {
        None => (false, "Slack notifier is not configured.".to_string()),
        Some(notifier) => match notifier.post(&msg).await {
            Ok(200) => (true, format!("Message successfully posted to Slack channel {channel}")),
            Ok(status) => (
                false,
                format!("There was a problem posting to the Slack channel (HTTP response: {status})."),
            ),
            Err(e) => (false, format!("There was a problem posting to the Slack channel ({e}).")),
        },
    };
    observability::record_alert(delivered);
    if delivered {
        info!(%channel, "slack alert delivered");
    } else {
        warn!(%channel, %message, "slack alert not delivered");
    }
    Json(Envelope::ok(msg, delivered).with_message(message))
}
