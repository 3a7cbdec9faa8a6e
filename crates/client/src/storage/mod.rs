//! Offline storage and the pending-action queue.
//!
//! A generic typed key-value layer over a [`StorageBackend`], holding the
//! persisted cart, order history, favorites, auth blob, the offline action
//! queue, and the last-sync marker - each a JSON blob under a fixed key.
//!
//! # The queue is write-only
//!
//! Actions taken while offline are recorded with a retry counter, but no
//! code path in this repository replays them against the network. An
//! exactly-once replay protocol (idempotency keys, server-side dedup,
//! conflict resolution on reconnect) was never designed, and pretending
//! otherwise here would be worse than leaving the gap visible. Integration
//! tests pin the write-only behavior.

mod backend;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Fixed storage key namespace.
///
/// Every persisted blob lives under one of these keys; nothing else touches
/// the backend.
pub mod keys {
    /// Cart store snapshot.
    pub const CART: &str = "cart-storage";
    /// Orders store snapshot.
    pub const ORDERS: &str = "orders-storage";
    /// Auth token and profile blob.
    pub const AUTH: &str = "auth-storage";
    /// Favorited vendor ids.
    pub const FAVORITES: &str = "favorites-storage";
    /// Pending offline actions.
    pub const OFFLINE_QUEUE: &str = "offline-queue";
    /// Timestamp of the last successful sync.
    pub const LAST_SYNC: &str = "last-sync";
}

/// Errors from the offline storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted blob failed to (de)serialize.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A lock guarding the in-memory backend was poisoned.
    #[error("Storage lock poisoned")]
    Poisoned,

    /// Queue operation referenced an unknown action id.
    #[error("Unknown offline action: {0}")]
    UnknownAction(Uuid),
}

/// What kind of write an offline action represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflineActionKind {
    CreateOrder,
    CancelOrder,
    UpdateProfile,
    ToggleFavorite,
}

/// A pending write recorded while offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineAction {
    pub id: Uuid,
    pub kind: OfflineActionKind,
    /// Request body the action would have sent.
    pub payload: serde_json::Value,
    /// Times a (future) replayer has attempted this action.
    pub retries: u32,
    pub queued_at: DateTime<Utc>,
}

/// Typed offline storage over a pluggable backend.
///
/// Cheaply cloneable; all clones share the same backend.
#[derive(Clone)]
pub struct OfflineStore {
    backend: Arc<dyn StorageBackend>,
}

impl OfflineStore {
    /// Create a store over an arbitrary backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Create a store over a fresh in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Create a store over a file backend rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn on_disk(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::new(Arc::new(FileBackend::open(
            dir.as_ref().to_path_buf(),
        )?)))
    }

    /// Read and deserialize the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the blob does not
    /// deserialize as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }

    // =========================================================================
    // Offline action queue
    // =========================================================================

    /// Record a pending write. Returns the queued action.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue blob cannot be read or written.
    pub fn enqueue(
        &self,
        kind: OfflineActionKind,
        payload: serde_json::Value,
    ) -> Result<OfflineAction, StorageError> {
        let action = OfflineAction {
            id: Uuid::new_v4(),
            kind,
            payload,
            retries: 0,
            queued_at: Utc::now(),
        };

        let mut queue = self.queued_actions()?;
        queue.push(action.clone());
        self.set(keys::OFFLINE_QUEUE, &queue)?;

        debug!(action_id = %action.id, kind = ?kind, depth = queue.len(), "Queued offline action");
        Ok(action)
    }

    /// All pending actions in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue blob cannot be read.
    pub fn queued_actions(&self) -> Result<Vec<OfflineAction>, StorageError> {
        Ok(self.get(keys::OFFLINE_QUEUE)?.unwrap_or_default())
    }

    /// Increment the retry counter of a queued action.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownAction`] if no queued action has `id`,
    /// or an error if the queue blob cannot be read or written.
    pub fn bump_retry(&self, id: Uuid) -> Result<(), StorageError> {
        let mut queue = self.queued_actions()?;
        let action = queue
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StorageError::UnknownAction(id))?;
        action.retries += 1;
        self.set(keys::OFFLINE_QUEUE, &queue)
    }

    /// Drop every queued action without replaying anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn clear_queue(&self) -> Result<(), StorageError> {
        self.remove(keys::OFFLINE_QUEUE)
    }

    /// Timestamp of the last successful sync, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be read.
    pub fn last_sync(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        self.get(keys::LAST_SYNC)
    }

    /// Record the current time as the last successful sync.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn mark_synced(&self) -> Result<(), StorageError> {
        self.set(keys::LAST_SYNC, &Utc::now())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_round_trip() {
        let store = OfflineStore::in_memory();
        store
            .set(keys::FAVORITES, &vec![1_i64, 2, 3])
            .unwrap();
        let favorites: Option<Vec<i64>> = store.get(keys::FAVORITES).unwrap();
        assert_eq!(favorites, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_get_absent_key() {
        let store = OfflineStore::in_memory();
        let cart: Option<serde_json::Value> = store.get(keys::CART).unwrap();
        assert!(cart.is_none());
    }

    #[test]
    fn test_enqueue_preserves_fifo_order() {
        let store = OfflineStore::in_memory();
        let first = store
            .enqueue(OfflineActionKind::CreateOrder, json!({"vendor_id": 1}))
            .unwrap();
        let second = store
            .enqueue(OfflineActionKind::CancelOrder, json!({"order_id": "x"}))
            .unwrap();

        let queue = store.queued_actions().unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, first.id);
        assert_eq!(queue[1].id, second.id);
        assert_eq!(queue[0].retries, 0);
    }

    #[test]
    fn test_bump_retry() {
        let store = OfflineStore::in_memory();
        let action = store
            .enqueue(OfflineActionKind::UpdateProfile, json!({"name": "A"}))
            .unwrap();
        store.bump_retry(action.id).unwrap();
        store.bump_retry(action.id).unwrap();

        let queue = store.queued_actions().unwrap();
        assert_eq!(queue[0].retries, 2);
    }

    #[test]
    fn test_bump_retry_unknown_action() {
        let store = OfflineStore::in_memory();
        let err = store.bump_retry(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StorageError::UnknownAction(_)));
    }

    #[test]
    fn test_clear_queue() {
        let store = OfflineStore::in_memory();
        store
            .enqueue(OfflineActionKind::ToggleFavorite, json!({"vendor_id": 9}))
            .unwrap();
        store.clear_queue().unwrap();
        assert!(store.queued_actions().unwrap().is_empty());
    }

    #[test]
    fn test_last_sync_marker() {
        let store = OfflineStore::in_memory();
        assert!(store.last_sync().unwrap().is_none());
        store.mark_synced().unwrap();
        assert!(store.last_sync().unwrap().is_some());
    }

    #[test]
    fn test_on_disk_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = OfflineStore::on_disk(dir.path()).unwrap();
            store
                .enqueue(OfflineActionKind::CreateOrder, json!({"vendor_id": 2}))
                .unwrap();
        }
        let reopened = OfflineStore::on_disk(dir.path()).unwrap();
        assert_eq!(reopened.queued_actions().unwrap().len(), 1);
    }
}
