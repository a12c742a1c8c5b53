use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryError {
    /// The storage backend rejected a write (quota, locked file, ...).
    Persistence { message: String },
    /// The storage backend could not be opened or read.
    Storage { message: String },
    InvalidInput { message: String },
}

impl HistoryError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Persistence { message }
            | Self::Storage { message }
            | Self::InvalidInput { message } => message,
        }
    }
}

impl From<libsql::Error> for HistoryError {
    fn from(err: libsql::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence { message } => write!(f, "Persistence: {}", message),
            Self::Storage { message } => write!(f, "Storage: {}", message),
            Self::InvalidInput { message } => write!(f, "InvalidInput: {}", message),
        }
    }
}

impl std::error::Error for HistoryError {}
