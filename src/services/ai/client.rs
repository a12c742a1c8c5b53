use serde_json::Value as JsonValue;

use crate::services::config::RequestConfig;
use crate::services::retry::RetryConfig;

use super::error::{AttemptError, RequestError};
use super::request_options::default_headers;
use super::transport::Transport;
use super::types::{ChatRequestBody, HttpRequest, ReplyPayload};

/// Sends chat requests with per-attempt timeout and sequential retries.
pub struct RequestClient<T> {
    transport: T,
    endpoint_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl<T: Transport> RequestClient<T> {
    pub fn new(config: &RequestConfig, transport: T) -> Self {
        Self {
            transport,
            endpoint_url: config.endpoint_url.clone(),
            api_key: config.api_key.clone(),
            retry: RetryConfig::from_request_config(config),
        }
    }

    fn build_request(&self, body: &ChatRequestBody) -> Result<HttpRequest, RequestError> {
        let body = serde_json::to_string(body)
            .map_err(|e| RequestError::invalid_request(e.to_string()))?;
        Ok(HttpRequest {
            url: self.endpoint_url.clone(),
            headers: default_headers(self.api_key.as_deref()),
            body,
        })
    }

    /// Only the final outcome is returned; intermediate failures are logged.
    pub async fn send(&self, body: &ChatRequestBody) -> Result<ReplyPayload, RequestError> {
        let request = self.build_request(body)?;
        let max_attempts = self.retry.max_attempts;
        let mut last_error: Option<AttemptError> = None;

        for attempt in 1..=max_attempts {
            let timeout = self.retry.attempt_timeout;
            let result = match tokio::time::timeout(timeout, self.transport.post(&request)).await {
                Ok(result) => result,
                Err(_) => Err(AttemptError::network(format!(
                    "Request timed out after {} ms",
                    timeout.as_millis()
                ))),
            };

            let err = match result {
                Ok(response) if response.is_success() => return normalize_reply(&response.body),
                Ok(response) => AttemptError::http_status(response.status, response.body),
                Err(err) => err,
            };

            if attempt < max_attempts {
                log::warn!(
                    "Chat retry attempt {}/{} after error: {}",
                    attempt + 1,
                    max_attempts,
                    err
                );
                if let Some(delay) = self.retry.backoff(attempt) {
                    tokio::time::sleep(delay).await;
                }
            }
            last_error = Some(err);
        }

        let last = last_error.unwrap_or_else(|| AttemptError::network("Chat request failed"));
        log::warn!("Chat request failed after {} attempts: {}", max_attempts, last);
        Err(RequestError::Exhausted {
            attempts: max_attempts,
            last,
        })
    }
}

/// Turn a 2xx body into displayable text.
///
/// `reply` wins when it is a string; otherwise a truthy `message` field is
/// used; otherwise the whole JSON document is rendered as text.
pub fn normalize_reply(body: &str) -> Result<ReplyPayload, RequestError> {
    let value: JsonValue = serde_json::from_str(body).map_err(|e| {
        log::warn!("Unexpected chat response body: {}", e);
        RequestError::malformed(e.to_string())
    })?;

    let image = value
        .get("image")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let text = if let Some(reply) = value.get("reply").and_then(JsonValue::as_str) {
        reply.to_string()
    } else {
        match value.get("message") {
            Some(JsonValue::String(message)) if !message.is_empty() => message.clone(),
            Some(message) if is_truthy(message) && !message.is_string() => message.to_string(),
            _ => value.to_string(),
        }
    };

    Ok(ReplyPayload { text, image })
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}
