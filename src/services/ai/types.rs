use serde::{Deserialize, Serialize};

use crate::plugins::history::{Message, Role};

/// What the endpoint is asked to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Chat,
    Image,
    Code,
}

/// One context entry in the outbound `history` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
    pub ts: u64,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            text: message.text().to_string(),
            ts: message.created_at_ms(),
        }
    }
}

/// JSON body posted to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
    pub image: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub mode: Mode,
}

impl ChatRequestBody {
    pub fn new(
        message: impl Into<String>,
        image: Option<String>,
        history: &[Message],
        mode: Mode,
    ) -> Self {
        Self {
            message: message.into(),
            image,
            history: history.iter().map(HistoryEntry::from).collect(),
            mode,
        }
    }
}

/// Normalized successful reply: always displayable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
