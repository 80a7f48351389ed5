pub mod records;
pub mod utility;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::observability;
use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: record API, utility endpoints, and ops endpoints
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let record_routes = Router::new()
        .route(
            "/kv-record/:key",
            post(records::create_record)
                .put(records::update_record)
                .delete(records::delete_record),
        )
        .route("/kv-retrieve/:key", get(records::retrieve_record))
        .route("/keyval/:key", axum::routing::delete(records::delete_record));

    let utility_routes = Router::new()
        .route("/", get(utility::hello))
        .route("/md5/:input", get(utility::md5))
        .route("/factorial/:n", get(utility::factorial))
        .route("/fibonacci/:n", get(utility::fibonacci))
        .route("/is-prime/:n", get(utility::is_prime))
        .route("/slack-alert/:msg", get(utility::slack_alert));

    let ops_routes = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/openapi.json", get(openapi_json));

    record_routes
        .merge(utility_routes)
        .merge(ops_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency on the way out
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
