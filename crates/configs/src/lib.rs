//! Process configuration.
//!
//! Built once at startup (TOML file, then environment overrides, then validation) and
//! handed to the server behind an `Arc`. Nothing mutates it afterwards.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 5000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown store backend `{other}` (expected redis or memory)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Redis, url: default_redis_url(), timeout_ms: default_store_timeout_ms() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    #[serde(default = "default_stage")]
    pub stage: String,
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default = "default_slack_timeout")]
    pub timeout_secs: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            stage: default_stage(),
            webhook_url: String::new(),
            channel: String::new(),
            timeout_secs: default_slack_timeout(),
        }
    }
}

fn default_redis_url() -> String { "redis://127.0.0.1:6379".into() }
fn default_store_timeout_ms() -> u64 { 2000 }
fn default_stage() -> String { "dev".into() }
fn default_slack_timeout() -> u64 { 5 }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Load the TOML file at `path`. A missing file yields the defaults.
/// An unreadable or invalid file is still an error.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content).with_context(|| format!("parsing config {path}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(e).with_context(|| format!("reading config {path}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File if present, defaults otherwise; then process env; then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_or_default(&config_path())?;
        cfg.apply_overrides(|k| std::env::var(k).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| anyhow!("SERVER_PORT is not a port: {port}"))?;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = Some(w.parse().map_err(|_| anyhow!("TOKIO_WORKER_THREADS is not a number: {w}"))?);
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.store.backend = backend.parse()?;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.store.url = url;
        }
        if let Some(ms) = lookup("STORE_TIMEOUT_MS") {
            self.store.timeout_ms = ms.parse().map_err(|_| anyhow!("STORE_TIMEOUT_MS is not a number: {ms}"))?;
        }
        if let Some(stage) = lookup("STAGE") {
            self.slack.stage = stage;
        }
        if let Some(url) = lookup("SLACK_URL") {
            self.slack.webhook_url = url;
        }
        if let Some(channel) = lookup("SLACK_CHANNEL") {
            self.slack.channel = channel;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        self.slack.normalize();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(anyhow!("store.timeout_ms must be positive"));
        }
        if self.backend == StoreBackend::Memory {
            return Ok(());
        }
        if self.url.trim().is_empty() {
            return Err(anyhow!("store.url is empty; set it in config.toml or REDIS_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("redis://") || lower.starts_with("rediss://")) {
            return Err(anyhow!("store.url must start with redis:// or rediss://"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SlackConfig {
    /// Fill the channel from the stage when none was given.
    fn normalize(&mut self) {
        if self.channel.trim().is_empty() {
            self.channel = if self.is_dev() { "@dev".into() } else { "#general".into() };
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_slack_timeout();
        }
    }

    pub fn is_dev(&self) -> bool {
        self.stage.eq_ignore_ascii_case("dev")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_validate() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.store.backend, StoreBackend::Redis);
        assert_eq!(cfg.store.timeout(), Duration::from_secs(2));
        assert_eq!(cfg.slack.channel, "@dev");
    }

    #[test]
    fn parses_toml_sections() {
        let cfg = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [store]
            backend = "memory"
            timeout_ms = 500

            [slack]
            stage = "prod"
            webhook_url = "https://hooks.example.com/x"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.url, "redis://127.0.0.1:6379");
        assert_eq!(cfg.store.timeout_ms, 500);
        assert_eq!(cfg.slack.webhook_url, "https://hooks.example.com/x");
    }

    #[test]
    fn non_dev_stage_posts_to_general() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(lookup(&[("STAGE", "prod")])).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.slack.channel, "#general");
    }

    #[test]
    fn explicit_channel_wins_over_stage() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(lookup(&[("STAGE", "prod"), ("SLACK_CHANNEL", "#ops")])).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.slack.channel, "#ops");
    }

    #[test]
    fn env_overrides_store_settings() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(lookup(&[
            ("REDIS_URL", "redis://cache:6379/1"),
            ("STORE_TIMEOUT_MS", "750"),
            ("SERVER_PORT", "9000"),
        ]))
        .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.store.url, "redis://cache:6379/1");
        assert_eq!(cfg.store.timeout_ms, 750);
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_overrides(lookup(&[("SERVER_PORT", "http")])).is_err());
        assert!(cfg.apply_overrides(lookup(&[("STORE_BACKEND", "etcd")])).is_err());

        let mut cfg = AppConfig::default();
        cfg.store.url = "http://localhost:6379".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.store.timeout_ms = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn memory_backend_ignores_url() {
        let mut cfg = AppConfig::default();
        cfg.store.backend = StoreBackend::Memory;
        cfg.store.url.clear();
        cfg.normalize_and_validate().unwrap();
    }

    fn scratch_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("kv-record-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("kv-record-{}-absent.toml", std::process::id()));
        let cfg = load_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.store.backend, StoreBackend::Redis);
    }

    #[test]
    fn invalid_file_is_an_error_not_defaults() {
        let path = scratch_file("invalid", "[server]\nport = \"not-a-port\"\n");
        let err = load_or_default(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"), "{err:#}");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn present_file_is_used() {
        let path = scratch_file("valid", "[server]\nhost = \"127.0.0.1\"\nport = 7000\n");
        let cfg = load_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 7000);
        std::fs::remove_file(&path).unwrap();
    }
}
