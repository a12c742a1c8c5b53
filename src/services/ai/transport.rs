//! The network collaborator behind [`super::RequestClient`].

use std::future::Future;
use std::time::Duration;

use crate::services::config::RequestConfig;

use super::error::AttemptError;
use super::request_options::build_header_map;
use super::types::{ChatRequestBody, HttpRequest, HttpResponse, Mode};

const OFFLINE_REPLY_DELAY: Duration = Duration::from_millis(600);

/// Issues one POST. Timeouts are applied by the caller.
pub trait Transport {
    fn post(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, AttemptError>> + Send;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http_client }
    }
}

impl ReqwestTransport {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl Transport for ReqwestTransport {
    async fn post(&self, request: &HttpRequest) -> Result<HttpResponse, AttemptError> {
        let headers = build_header_map(&request.headers)?;
        let response = self
            .http_client
            .post(&request.url)
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    AttemptError::network(format!("Connection failed: {}", err))
                } else {
                    AttemptError::network(format!("Request failed: {}", err))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AttemptError::network(format!("Failed to read response: {}", err)))?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("");
            return Ok(HttpResponse {
                status: status.as_u16(),
                body: format!("{} {}", reason, body).trim().to_string(),
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Demo transport used when no endpoint is configured. Answers with canned
/// replies shaped like the real endpoint's.
#[derive(Clone, Default)]
pub struct OfflineTransport;

impl OfflineTransport {
    fn reply_for(body: &ChatRequestBody) -> String {
        match body.mode {
            Mode::Image => "🖼️ [Mock] Image generation not available in demo.".to_string(),
            Mode::Code => {
                "```js\n// Mock code snippet\nconsole.log(\"Hello from Wayne\");\n```".to_string()
            }
            Mode::Chat => format!("Hello! (Mock) You said: \"{}\"", body.message),
        }
    }
}

impl Transport for OfflineTransport {
    async fn post(&self, request: &HttpRequest) -> Result<HttpResponse, AttemptError> {
        tokio::time::sleep(OFFLINE_REPLY_DELAY).await;

        let body: ChatRequestBody = serde_json::from_str(&request.body)
            .map_err(|e| {
                AttemptError::network(format!("Offline transport: bad request body: {}", e))
            })?;
        let reply = serde_json::json!({ "reply": Self::reply_for(&body) });
        Ok(HttpResponse {
            status: 200,
            body: reply.to_string(),
        })
    }
}

/// Transport picked from configuration.
#[derive(Clone)]
pub enum ChatTransport {
    Http(ReqwestTransport),
    Offline(OfflineTransport),
}

impl ChatTransport {
    pub fn from_config(config: &RequestConfig) -> Self {
        if config.has_endpoint() {
            Self::Http(ReqwestTransport::default())
        } else {
            log::warn!("No chat endpoint configured, using offline demo replies");
            Self::Offline(OfflineTransport)
        }
    }
}

impl Transport for ChatTransport {
    async fn post(&self, request: &HttpRequest) -> Result<HttpResponse, AttemptError> {
        match self {
            Self::Http(transport) => transport.post(request).await,
            Self::Offline(transport) => transport.post(request).await,
        }
    }
}
