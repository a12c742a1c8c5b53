//! Key-value storage backends for [`super::HistoryStore`].
//!
//! The contract mirrors browser `localStorage`: string keys, string values,
//! whole-value reads and writes.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use libsql::{params, Builder, Database};

use super::HistoryError;

const STORAGE_DB_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub trait LocalStorage {
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, HistoryError>> + Send;

    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), HistoryError>> + Send;

    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), HistoryError>> + Send;
}

/// In-process storage. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, HistoryError> {
        self.items
            .lock()
            .map_err(|_| HistoryError::storage("Memory storage lock poisoned"))
    }
}

impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), HistoryError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Key-value storage in a local libSQL file (`local_storage` table).
#[derive(Clone)]
pub struct LibsqlStorage {
    db: Arc<Database>,
}

impl LibsqlStorage {
    pub async fn open_local(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        log::info!("History storage: using local libSQL file {}", path_str);
        let db = Builder::new_local(path_str).build().await?;
        let storage = Self { db: Arc::new(db) };
        storage.migrate().await?;
        Ok(storage)
    }

    fn connect(&self) -> Result<libsql::Connection, HistoryError> {
        let conn = self.db.connect()?;
        // Best-effort; a busy local file otherwise fails writes immediately.
        let _ = conn.busy_timeout(STORAGE_DB_BUSY_TIMEOUT);
        Ok(conn)
    }

    async fn migrate(&self) -> Result<(), HistoryError> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage (
  key TEXT PRIMARY KEY NOT NULL,
  value TEXT NOT NULL
);",
            (),
        )
        .await?;
        Ok(())
    }
}

impl LocalStorage for LibsqlStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                "SELECT value FROM local_storage WHERE key = ?1 LIMIT 1;",
                params![key],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let value: String = row.get(0)?;
        Ok(Some(value))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )
        .await
        .map_err(|e| HistoryError::persistence(e.to_string()))?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), HistoryError> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1;", params![key])
            .await
            .map_err(|e| HistoryError::persistence(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").await.unwrap(), None);

        storage.set_item("k", "v1").await.unwrap();
        storage.set_item("k", "v2").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("v2"));

        let shared = storage.clone();
        shared.remove_item("k").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_libsql_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        {
            let storage = LibsqlStorage::open_local(&path).await.unwrap();
            storage.set_item("k", "first").await.unwrap();
            storage.set_item("k", "second").await.unwrap();
        }

        let storage = LibsqlStorage::open_local(&path).await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("second"));

        storage.remove_item("k").await.unwrap();
        storage.remove_item("k").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), None);
    }
}
