//! Client configuration loaded from environment variables.
//!
//! Every setting has a default pointing at a local development server, so
//! the client starts with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use parley_shared::constants::DEFAULT_PAGE_SIZE;
use parley_sync::SyncConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST root.
    /// Env: `PARLEY_API_URL`
    /// Default: `http://localhost:8080/api`
    pub api_url: String,

    /// WebSocket root the event stream paths are joined onto.
    /// Env: `PARLEY_WS_URL`
    /// Default: `ws://localhost:8080/`
    pub ws_url: String,

    /// Messages per history page.
    /// Env: `PARLEY_PAGE_SIZE`
    /// Default: `20`
    pub page_size: u32,

    /// Database file. `None` uses the platform data directory.
    /// Env: `PARLEY_DB_PATH`
    pub db_path: Option<PathBuf>,

    /// Upper bound of the reconnect backoff.
    /// Env: `PARLEY_RECONNECT_MAX_SECS`
    /// Default: `30`
    pub reconnect_max: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            ws_url: "ws://localhost:8080/".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            db_path: None,
            reconnect_max: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("PARLEY_API_URL") {
            if Url::parse(&url).is_ok() {
                config.api_url = url;
            } else {
                tracing::warn!(value = %url, "invalid PARLEY_API_URL, using default");
            }
        }

        if let Some(url) = lookup("PARLEY_WS_URL") {
            match Url::parse(&url) {
                Ok(parsed) if matches!(parsed.scheme(), "ws" | "wss") => config.ws_url = url,
                _ => tracing::warn!(value = %url, "invalid PARLEY_WS_URL, using default"),
            }
        }

        if let Some(val) = lookup("PARLEY_PAGE_SIZE") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.page_size = n,
                _ => tracing::warn!(value = %val, "invalid PARLEY_PAGE_SIZE, using default"),
            }
        }

        if let Some(path) = lookup("PARLEY_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("PARLEY_RECONNECT_MAX_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.reconnect_max = Duration::from_secs(secs),
                _ => tracing::warn!(
                    value = %val,
                    "invalid PARLEY_RECONNECT_MAX_SECS, using default"
                ),
            }
        }

        // RUST_LOG is read by the EnvFilter in `init_tracing`.

        config
    }

    pub fn sync_config(&self) -> SyncConfig {
        let defaults = SyncConfig::default();
        SyncConfig {
            page_size: self.page_size,
            reconnect_initial: defaults.reconnect_initial.min(self.reconnect_max),
            reconnect_max: self.reconnect_max,
        }
    }
}
