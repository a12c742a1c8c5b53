//! Conversation history persisted as one JSON document under a single key.
//!
//! Reads never fail the caller: missing, corrupt or foreign data loads as an
//! empty set. Writes report failures so the caller can warn, but the caller's
//! in-memory set stays authoritative for the session.

use serde::{Deserialize, Serialize};

use super::storage::LocalStorage;
use super::types::{Conversation, ConversationSet};
use super::HistoryError;

pub const HISTORY_STORAGE_KEY: &str = "wayne_conversations_v1";
/// Flat message log written by the single-conversation client. Discarded, not migrated.
pub const LEGACY_HISTORY_STORAGE_KEY: &str = "wayne_chat_history_v1";
const HISTORY_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedHistory {
    version: u32,
    conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
struct PersistedHistoryRef<'a> {
    version: u32,
    conversations: &'a [Conversation],
}

pub struct HistoryStore<S> {
    storage: S,
    key: String,
}

impl<S: LocalStorage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, HISTORY_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub async fn load(&self) -> ConversationSet {
        self.discard_legacy().await;

        let raw = match self.storage.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return ConversationSet::new(),
            Err(err) => {
                log::warn!("History load failed, starting empty: {}", err);
                return ConversationSet::new();
            }
        };

        let persisted = match serde_json::from_str::<PersistedHistory>(&raw) {
            Ok(persisted) => persisted,
            Err(err) => {
                log::warn!("History data unreadable, starting empty: {}", err);
                return ConversationSet::new();
            }
        };

        if persisted.version != HISTORY_FORMAT_VERSION {
            log::warn!(
                "History format version {} not supported, starting empty",
                persisted.version
            );
            return ConversationSet::new();
        }

        let mut set = ConversationSet::new();
        // Stored most-recent-first; insert oldest first to keep that order.
        for conversation in persisted.conversations.into_iter().rev() {
            set.insert(conversation);
        }
        set
    }

    pub async fn save(&self, set: &ConversationSet) -> Result<(), HistoryError> {
        let persisted = PersistedHistoryRef {
            version: HISTORY_FORMAT_VERSION,
            conversations: set.conversations(),
        };
        let raw = serde_json::to_string(&persisted)
            .map_err(|e| HistoryError::invalid_input(format!("History encode failed: {}", e)))?;

        self.storage
            .set_item(&self.key, &raw)
            .await
            .map_err(|err| match err {
                HistoryError::Persistence { .. } => err,
                other => HistoryError::persistence(other.message()),
            })
            .inspect_err(|err| log::warn!("History save failed: {}", err))
    }

    /// Best-effort wipe; failures are logged only.
    pub async fn clear(&self) {
        if let Err(err) = self.storage.remove_item(&self.key).await {
            log::warn!("History clear failed: {}", err);
        }
    }

    async fn discard_legacy(&self) {
        if self.key == LEGACY_HISTORY_STORAGE_KEY {
            return;
        }
        match self.storage.get_item(LEGACY_HISTORY_STORAGE_KEY).await {
            Ok(Some(_)) => {
                log::info!("Discarding legacy chat history under {}", LEGACY_HISTORY_STORAGE_KEY);
                if let Err(err) = self.storage.remove_item(LEGACY_HISTORY_STORAGE_KEY).await {
                    log::warn!("Legacy history removal failed: {}", err);
                }
            }
            Ok(None) => {}
            Err(err) => log::debug!("Legacy history lookup failed: {}", err),
        }
    }
}
