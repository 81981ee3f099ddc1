//! Snapshot registry: per-`(TaskId, CommandId)` persisted state,
//! opaque to the executor and notifier — only the owning provider knows how
//! to interpret the `serde_json::Value` it stores and loads back.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::NotifyResult;
use crate::ids::TaskCommandKey;

/// Load/save seam for provider snapshots. One store instance is shared by
/// the whole executor; providers never see each other's keys.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the previously saved snapshot for `key`, or `None` if this is
    /// the first run (or none was ever saved).
    async fn load(&self, key: &TaskCommandKey) -> NotifyResult<Option<serde_json::Value>>;

    /// Persist `value` as the new snapshot for `key`, replacing any prior
    /// value.
    async fn save(&self, key: &TaskCommandKey, value: serde_json::Value) -> NotifyResult<()>;
}

/// Reference [`SnapshotStore`]: an in-process map, gone on restart.
///
/// Sufficient for the reference provider and for tests; a durable
/// implementation (file, database) is an external collaborator the same way
/// config loading is.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    entries: Mutex<HashMap<TaskCommandKey, serde_json::Value>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, key: &TaskCommandKey) -> NotifyResult<Option<serde_json::Value>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &TaskCommandKey, value: serde_json::Value) -> NotifyResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.clone(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CommandId, TaskId};

    fn key() -> TaskCommandKey {
        TaskCommandKey::new(TaskId::new("navershopping"), CommandId::new("watch_price"))
    }

    #[tokio::test]
    async fn missing_key_loads_as_none() {
        let store = InMemorySnapshotStore::new();
        assert_eq!(store.load(&key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let store = InMemorySnapshotStore::new();
        let value = serde_json::json!({ "products": [1, 2, 3] });
        store.save(&key(), value.clone()).await.unwrap();
        assert_eq!(store.load(&key()).await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn save_overwrites_prior_snapshot() {
        let store = InMemorySnapshotStore::new();
        store.save(&key(), serde_json::json!(1)).await.unwrap();
        store.save(&key(), serde_json::json!(2)).await.unwrap();
        assert_eq!(store.load(&key()).await.unwrap(), Some(serde_json::json!(2)));
    }
}
