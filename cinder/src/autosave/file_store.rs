//! File-system note and draft stores
//!
//! Notes are kept as `<id>.md` files in a notes directory. Drafts are JSON
//! files named after their storage key in a drafts directory. Writes go to a
//! temporary sibling first and are renamed into place, so a crash never
//! leaves a half-written file behind.

use super::store::{DocumentId, Draft, DraftStore, RemoteStore, StoreError, DRAFT_KEY_PREFIX};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Reject keys that would escape the store directory
fn checked_stem(key: &str) -> Result<&str, StoreError> {
    let unsafe_key = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0'])
        || key.starts_with('.');
    if unsafe_key {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Notes stored as markdown files
#[derive(Debug, Clone)]
pub struct FileRemoteStore {
    root: PathBuf,
}

impl FileRemoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file holding a note
    pub fn note_path(&self, id: &DocumentId) -> Result<PathBuf, StoreError> {
        let stem = checked_stem(id.as_str())?;
        Ok(self.root.join(format!("{}.md", stem)))
    }
}

#[async_trait]
impl RemoteStore for FileRemoteStore {
    async fn load(&self, id: &DocumentId) -> Result<String, StoreError> {
        let path = self.note_path(id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No saved note at {}, starting empty", path.display());
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, id: &DocumentId, text: &str) -> Result<(), StoreError> {
        let path = self.note_path(id)?;
        write_atomically(&path, text.as_bytes()).await?;
        log::debug!("Saved {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

/// Drafts stored as JSON files
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    root: PathBuf,
}

impl FileDraftStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn draft_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let stem = checked_stem(key)?;
        Ok(self.root.join(format!("{}.json", stem)))
    }

    /// List the keys of all stored drafts, sorted
    ///
    /// A missing drafts directory holds no drafts.
    pub fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::other)?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem.starts_with(DRAFT_KEY_PREFIX) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn read_draft(&self, key: &str) -> Result<Option<Draft>, StoreError> {
        let path = self.draft_path(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write_draft(&self, key: &str, draft: &Draft) -> Result<(), StoreError> {
        let path = self.draft_path(key)?;
        let json = serde_json::to_vec(draft)?;
        write_atomically(&path, &json).await
    }

    async fn delete_draft(&self, key: &str) -> Result<(), StoreError> {
        let path = self.draft_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
