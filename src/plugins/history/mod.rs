//! Conversation history persistence on top of a browser-style key-value store.

mod error;
mod storage;
mod store;
mod title;
mod types;

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

pub use error::HistoryError;
pub use storage::{LibsqlStorage, LocalStorage, MemoryStorage};
pub use store::{HistoryStore, HISTORY_STORAGE_KEY, LEGACY_HISTORY_STORAGE_KEY};
pub use types::{
    Conversation, ConversationSet, ConversationSummary, Message, Role, DEFAULT_CONVERSATION_TITLE,
};

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}
