use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::notify::{Notifier, SlackNotifier};
use configs::{AppConfig, StoreBackend};
use service::records::{repo::redis_store::RedisStore, store::memory::MemoryStore, RecordStore};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Pick the store implementation named by the configuration.
pub fn build_store(cfg: &AppConfig) -> Result<Arc<dyn RecordStore>, StartupError> {
    cfg.store.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    match cfg.store.backend {
        StoreBackend::Redis => {
            let store: Arc<dyn RecordStore> = Arc::new(RedisStore::new(&cfg.store.url, cfg.store.timeout())?);
            info!(url = %cfg.store.url, timeout_ms = cfg.store.timeout_ms, "using redis store");
            Ok(store)
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; records are lost on restart");
            let store: Arc<dyn RecordStore> = MemoryStore::new();
            Ok(store)
        }
    }
}

/// Slack is optional: without a webhook URL the alert endpoint reports it is unconfigured.
pub fn build_notifier(cfg: &AppConfig) -> Result<Option<Arc<dyn Notifier>>, StartupError> {
    if cfg.slack.webhook_url.trim().is_empty() {
        warn!(stage = %cfg.slack.stage, "no slack webhook configured");
        return Ok(None);
    }
    let notifier: Arc<dyn Notifier> = Arc::new(SlackNotifier::new(cfg.slack.webhook_url.clone(), cfg.slack.timeout())?);
    info!(stage = %cfg.slack.stage, channel = %cfg.slack.channel, "slack notifier ready");
    Ok(Some(notifier))
}

pub fn build_app(cfg: Arc<AppConfig>) -> Result<Router, StartupError> {
    let store = build_store(&cfg)?;
    let notifier = build_notifier(&cfg)?;
    let state = AppState::new(store, notifier, cfg);
    Ok(routes::build_router(state, build_cors()))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Public entry: build the app from an already validated config and serve it
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(&cfg)?;
    let app = build_app(Arc::new(cfg)).map_err(|e| {
        e.log();
        anyhow::Error::new(e)
    })?;

    info!(%addr, "starting record service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
