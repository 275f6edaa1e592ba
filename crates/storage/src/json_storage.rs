//! JSON file storage implementation.
//!
//! Stores each document as `<key>.json` in a data directory and keeps a small
//! per-key meta marker (version + updated_at) under `meta/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{Result, Storage, StorageError};

/// File-based JSON storage backend.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the data and `meta/`
    /// directories if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("meta")).await?;
        Ok(Self { root })
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document stored under `key`.
    pub fn document_path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join("meta").join(format!("{}.meta.json", key))
    }

    /// Number of times `key` has been written (0 if never).
    pub async fn version(&self, key: &str) -> Result<u64> {
        check_key(key)?;
        match fs::read_to_string(self.meta_path(key)).await {
            Ok(s) => {
                let json: serde_json::Value = serde_json::from_str(&s)?;
                Ok(json.get("version").and_then(|v| v.as_u64()).unwrap_or(0))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and increment the per-key version, return the new version.
    async fn bump_version(&self, key: &str) -> Result<u64> {
        let path = self.meta_path(key);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            // A damaged marker restarts the count rather than blocking the write.
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.document_path(key)?;

        // Write beside the target, then rename, so readers never see half a document.
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, value.as_bytes()).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        // The document is durable from here on; the marker is bookkeeping only.
        match self.bump_version(key).await {
            Ok(version) => debug!(key, version, bytes = value.len(), "stored document"),
            Err(e) => warn!(key, error = %e, "stored document but failed to update meta marker"),
        }
        Ok(())
    }
}

fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
