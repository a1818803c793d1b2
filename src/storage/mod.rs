//! Content store for downloaded documents
//!
//! A plain directory keyed by document name. There is no manifest: a file
//! being present under its name is the only state. Writes go through a
//! temporary file and a rename, so a failed download never leaves a
//! truncated document behind.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::utils::error::StoreError;

/// Directory of documents keyed by file name
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Use `root` without touching the filesystem
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `root`, creating it if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(root);
        store.ensure().await?;
        Ok(store)
    }

    /// Create the store directory if it is absent
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created
    pub async fn ensure(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        tracing::debug!(dir = %self.root.display(), "Content store ready");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `name` inside the store
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidName` for names that would escape the directory
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Whether a document named `name` is present
    pub async fn exists(&self, name: &str) -> bool {
        let Ok(path) = self.path_for(name) else {
            return false;
        };
        tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Store `bytes` under `name`, replacing any previous document
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the name is invalid or the write fails; the
    /// target path is left as it was in that case
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let target = self.path_for(name)?;
        let temp = self.root.join(format!(".{name}.{}.part", Uuid::new_v4().simple()));

        if let Err(e) = write_synced(&temp, bytes).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::io(&temp, e));
        }

        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::io(&target, e));
        }

        Ok(target)
    }

    /// Read the document stored under `name`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the name is invalid or the file cannot be read
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        Err(StoreError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
