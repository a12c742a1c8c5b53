//! Request configuration, read once at startup from a JSON document.
//!
//! Accepts camelCase keys as well as the `WORKER_URL` / `API_KEY` names used
//! by the deployed `config/env` file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::services::ai::Mode;

const DEFAULT_RETRY_COUNT: u32 = 3;
const MAX_RETRY_COUNT: u32 = 20;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_HISTORY_WINDOW: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestConfig {
    /// Chat endpoint. Empty selects the offline transport.
    #[serde(alias = "WORKER_URL")]
    pub endpoint_url: String,
    pub retry_count: u32,
    pub timeout_ms: u64,
    /// Fixed pause between attempts; 0 retries immediately.
    pub retry_delay_ms: u64,
    /// Sent as the `x-api-key` header when present.
    #[serde(alias = "API_KEY")]
    pub api_key: Option<String>,
    pub history_window: usize,
    pub mode: Mode,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            retry_count: DEFAULT_RETRY_COUNT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_delay_ms: 0,
            api_key: None,
            history_window: DEFAULT_HISTORY_WINDOW,
            mode: Mode::Chat,
        }
    }
}

impl RequestConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let config: RequestConfig = serde_json::from_str(raw)?;
        Ok(config.normalized())
    }

    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self.normalized()
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self.normalized()
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self.normalized()
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self.normalized()
    }

    pub fn has_endpoint(&self) -> bool {
        !self.endpoint_url.is_empty()
    }

    fn normalized(mut self) -> Self {
        self.endpoint_url = self.endpoint_url.trim().to_string();
        self.retry_count = self.retry_count.clamp(1, MAX_RETRY_COUNT);
        self.timeout_ms = self.timeout_ms.max(1);
        self.api_key = self
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }
}

/// Load request configuration from `path`, falling back to defaults.
pub fn load_request_config(path: impl AsRef<Path>) -> RequestConfig {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!(
                "Request config {} not readable ({}), using defaults",
                path.display(),
                err
            );
            return RequestConfig::default();
        }
    };

    match RequestConfig::from_json_str(&raw) {
        Ok(config) => {
            log::info!(
                "Request config loaded: endpoint={}, retries={}, timeout={}ms, api_key={}",
                if config.has_endpoint() { config.endpoint_url.as_str() } else { "<offline>" },
                config.retry_count,
                config.timeout_ms,
                config.api_key.is_some()
            );
            config
        }
        Err(err) => {
            log::warn!("Request config {} invalid ({}), using defaults", path.display(), err);
            RequestConfig::default()
        }
    }
}
