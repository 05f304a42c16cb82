//! Persistence back-ends for notes and local drafts
//!
//! The autosave coordinator talks to two stores: the authoritative
//! [`RemoteStore`] holding saved notes, and a [`DraftStore`] holding one
//! crash-recovery draft per note. In-memory implementations live here; the
//! file-system ones are in [`super::file_store`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Prefix of every draft storage key
pub const DRAFT_KEY_PREFIX: &str = "cinder_draft_";

/// Errors raised by note and draft stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Opaque identifier of a note
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of this note's draft slot
    pub fn draft_key(&self) -> String {
        format!("{}{}", DRAFT_KEY_PREFIX, self.0)
    }

    /// Recover the note id from a draft key
    pub fn from_draft_key(key: &str) -> Option<Self> {
        key.strip_prefix(DRAFT_KEY_PREFIX)
            .filter(|id| !id.is_empty())
            .map(Self::new)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A locally persisted draft
///
/// Stored as JSON `{"content": "...", "savedAt": <unix millis>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Serialized markdown
    pub content: String,
    /// Wall-clock time of the write, milliseconds since the Unix epoch
    pub saved_at: i64,
}

impl Draft {
    /// Create a draft stamped with the current time
    pub fn now(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            saved_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn saved_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.saved_at)
    }
}

/// Authoritative note storage
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Load the saved text of a note; a note never saved has empty text
    async fn load(&self, id: &DocumentId) -> Result<String, StoreError>;

    /// Replace the saved text of a note
    async fn save(&self, id: &DocumentId, text: &str) -> Result<(), StoreError>;
}

/// Local crash-recovery draft storage, keyed by [`DocumentId::draft_key`]
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn read_draft(&self, key: &str) -> Result<Option<Draft>, StoreError>;

    async fn write_draft(&self, key: &str, draft: &Draft) -> Result<(), StoreError>;

    /// Delete a draft; deleting a missing draft succeeds
    async fn delete_draft(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct MemoryRemoteInner {
    notes: Mutex<HashMap<DocumentId, String>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

/// In-memory note store; clones share the same notes
#[derive(Debug, Clone, Default)]
pub struct MemoryRemoteStore {
    inner: Arc<MemoryRemoteInner>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with notes
    pub fn with_notes<I, K, V>(notes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let notes = notes
            .into_iter()
            .map(|(id, text)| (DocumentId::new(id), text.into()))
            .collect();
        Self {
            inner: Arc::new(MemoryRemoteInner {
                notes: Mutex::new(notes),
                ..Default::default()
            }),
        }
    }

    /// Make every following save fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of save calls received, failed ones included
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    pub async fn text(&self, id: &DocumentId) -> Option<String> {
        self.inner.notes.lock().await.get(id).cloned()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn load(&self, id: &DocumentId) -> Result<String, StoreError> {
        Ok(self.text(id).await.unwrap_or_default())
    }

    async fn save(&self, id: &DocumentId, text: &str) -> Result<(), StoreError> {
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("save of {} rejected", id)));
        }
        self.inner
            .notes
            .lock()
            .await
            .insert(id.clone(), text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryDraftInner {
    drafts: Mutex<HashMap<String, Draft>>,
    failing: AtomicBool,
}

/// In-memory draft store; clones share the same drafts
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    inner: Arc<MemoryDraftInner>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail, as a full local storage would
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn get(&self, key: &str) -> Option<Draft> {
        self.inner.drafts.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.drafts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn read_draft(&self, key: &str) -> Result<Option<Draft>, StoreError> {
        Ok(self.get(key).await)
    }

    async fn write_draft(&self, key: &str, draft: &Draft) -> Result<(), StoreError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("draft storage quota exceeded".into()));
        }
        self.inner
            .drafts
            .lock()
            .await
            .insert(key.to_string(), draft.clone());
        Ok(())
    }

    async fn delete_draft(&self, key: &str) -> Result<(), StoreError> {
        self.inner.drafts.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_key_round_trip() {
        let id = DocumentId::new("abc-123");
        assert_eq!(id.draft_key(), "cinder_draft_abc-123");
        assert_eq!(DocumentId::from_draft_key(&id.draft_key()), Some(id));
        assert_eq!(DocumentId::from_draft_key("cinder_draft_"), None);
        assert_eq!(DocumentId::from_draft_key("other_key"), None);
    }

    #[test]
    fn test_draft_json_shape() {
        let draft = Draft {
            content: "# Hi".to_string(),
            saved_at: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&draft).unwrap();
        assert_eq!(json, r##"{"content":"# Hi","savedAt":1700000000000}"##);

        let back: Draft = serde_json::from_str(&json).unwrap();
        assert_eq!(back, draft);
        assert!(back.saved_at_utc().is_some());
    }

    #[tokio::test]
    async fn test_memory_remote_store_counts_and_fails() {
        let store = MemoryRemoteStore::with_notes([("n", "old")]);
        let id = DocumentId::new("n");
        assert_eq!(store.load(&id).await.unwrap(), "old");
        assert_eq!(store.load(&DocumentId::new("missing")).await.unwrap(), "");

        store.save(&id, "new").await.unwrap();
        store.set_failing(true);
        assert!(store.save(&id, "newer").await.is_err());

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.text(&id).await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_memory_draft_store() {
        let store = MemoryDraftStore::new();
        store.write_draft("k", &Draft::now("x")).await.unwrap();
        assert_eq!(store.read_draft("k").await.unwrap().unwrap().content, "x");

        store.delete_draft("k").await.unwrap();
        store.delete_draft("k").await.unwrap();
        assert!(store.read_draft("k").await.unwrap().is_none());

        store.set_failing(true);
        assert!(store.write_draft("k", &Draft::now("y")).await.is_err());
        assert!(store.is_empty().await);
    }
}
