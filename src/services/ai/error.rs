use serde::{Deserialize, Serialize};

/// Why a single attempt failed. Retried inside the client, never surfaced on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AttemptError {
    /// Transport failure or per-attempt timeout.
    NetworkFailure { message: String },
    /// Endpoint answered with a non-2xx status.
    HttpStatusFailure { status: u16, message: String },
}

impl AttemptError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatusFailure {
            status,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NetworkFailure { message } | Self::HttpStatusFailure { message, .. } => message,
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkFailure { message } => write!(f, "Network error: {}", message),
            Self::HttpStatusFailure { status, message } => {
                if message.trim().is_empty() {
                    write!(f, "API {}", status)
                } else {
                    write!(f, "API {} {}", status, message.trim())
                }
            }
        }
    }
}

impl std::error::Error for AttemptError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RequestError {
    /// Every attempt failed; `last` is the final attempt's cause.
    Exhausted { attempts: usize, last: AttemptError },
    /// A 2xx body that is not JSON. Not retried.
    MalformedResponse { message: String },
    /// The request body could not be encoded.
    InvalidRequest { message: String },
}

impl RequestError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { attempts, last } => {
                let plural = if *attempts == 1 { "" } else { "s" };
                write!(f, "{} (after {} attempt{})", last, attempts, plural)
            }
            Self::MalformedResponse { message } => write!(f, "Malformed response: {}", message),
            Self::InvalidRequest { message } => write!(f, "Invalid request: {}", message),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_display_carries_cause() {
        let err = RequestError::Exhausted {
            attempts: 3,
            last: AttemptError::http_status(503, "Service Unavailable "),
        };
        assert_eq!(err.to_string(), "API 503 Service Unavailable (after 3 attempts)");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_single_attempt_is_singular() {
        let err = RequestError::Exhausted {
            attempts: 1,
            last: AttemptError::network("Request timed out after 50 ms"),
        };
        assert_eq!(
            err.to_string(),
            "Network error: Request timed out after 50 ms (after 1 attempt)"
        );
    }

    #[test]
    fn test_serialized_tag() {
        let value = serde_json::to_value(RequestError::malformed("not json")).unwrap();
        assert_eq!(value["type"], "malformedResponse");
        assert_eq!(value["message"], "not json");
    }
}
