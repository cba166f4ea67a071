//! File-backed local storage.
//!
//! The file is a flat JSON object of string values, so several slots can
//! share one file:
//!
//! ```json
//! { "@RocketShoes:cart": "[{\"id\":1,\"amount\":2,...}]" }
//! ```
//!
//! Writes go to a sibling temp file that is then renamed over the original.
//! If the existing file is not a JSON object it cannot be merged into, so it
//! is moved aside to `<path>.bak` and a fresh object holding only this slot
//! is written in its place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, warn};

use super::{CartStorage, StorageError};
use crate::config::StorageConfig;

/// One slot in a local storage file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    key: String,
}

impl FileStorage {
    /// Slot `key` in the file at `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Build from configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.path, &config.key)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// The backing path with `suffix` appended.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }

    /// Read and parse the whole file. `Ok(None)` if it does not exist.
    async fn read_slots(&self) -> Result<Option<Map<String, Value>>, StorageError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(slots)) => Ok(Some(slots)),
            Ok(_) => Err(StorageError::Malformed(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(StorageError::Malformed(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl CartStorage for FileStorage {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        let Some(mut slots) = self.read_slots().await? else {
            return Ok(None);
        };

        match slots.remove(&self.key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => Err(StorageError::Malformed(format!(
                "slot {} is not a string",
                self.key
            ))),
        }
    }

    async fn save(&self, value: &str) -> Result<(), StorageError> {
        let mut slots = match self.read_slots().await {
            Ok(slots) => slots.unwrap_or_default(),
            Err(StorageError::Malformed(reason)) => {
                let backup = self.sibling(".bak");
                fs::rename(&self.path, &backup)
                    .await
                    .map_err(|e| self.io_error(e))?;
                warn!(%reason, backup = %backup.display(), "Replacing malformed storage file");
                Map::new()
            }
            Err(e) => return Err(e),
        };
        slots.insert(self.key.clone(), Value::String(value.to_string()));
        let contents = serde_json::to_string_pretty(&Value::Object(slots))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let tmp = self.sibling(".tmp");

        fs::write(&tmp, contents)
            .await
            .map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), key = %self.key, "Storage slot written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn storage_in(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::new(dir.path().join("storage.json"), "@RocketShoes:cart")
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);

        storage.save(r#"[{"id":1}]"#).await.unwrap();
        assert_eq!(
            storage.load().await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );

        storage.save("[]").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("a/b/storage.json"), "cart");
        storage.save("[]").await.unwrap();
        assert!(storage.path().exists());
    }

    #[tokio::test]
    async fn test_save_keeps_other_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let storage = FileStorage::new(&path, "@RocketShoes:cart");
        storage.save("[]").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let slots: Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(slots.get("theme"), Some(&Value::from("dark")));
        assert_eq!(slots.get("@RocketShoes:cart"), Some(&Value::from("[]")));
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path, "cart");
        let err = storage.load().await.unwrap_err();
        assert!(matches!(err, StorageError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_load_non_string_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"cart":[1,2]}"#).unwrap();

        let storage = FileStorage::new(&path, "cart");
        assert!(matches!(
            storage.load().await.unwrap_err(),
            StorageError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_save_replaces_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{{{").unwrap();

        let storage = FileStorage::new(&path, "cart");
        storage.save("[]").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("[]"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("storage.json.bak")).unwrap(),
            "{{{"
        );
    }

    #[tokio::test]
    async fn test_save_over_non_object_file_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"["theme", "dark"]"#).unwrap();

        let storage = FileStorage::new(&path, "cart");
        storage.save("[]").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let slots: Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("storage.json.bak")).unwrap(),
            r#"["theme", "dark"]"#
        );
    }
}
