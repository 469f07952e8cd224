//! Where a document store keeps its project between sessions.

use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored project is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A host-provided store (such as browser storage) refused the call.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Load/save contract for a stored project JSON value.
pub trait Persistence {
    /// The stored value, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Value>, StorageError>;

    fn save(&mut self, value: &Value) -> Result<(), StorageError>;
}

/// Keeps the value in memory, for tests and embedders without a disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    value: Option<Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `value`.
    pub fn with_value(value: Value) -> Self {
        Self { value: Some(value) }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

impl Persistence for MemoryStorage {
    fn load(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.value.clone())
    }

    fn save(&mut self, value: &Value) -> Result<(), StorageError> {
        self.value = Some(value.clone());
        Ok(())
    }
}

/// Pretty-printed JSON file on disk. A missing file loads as `None`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Persistence for JsonFileStorage {
    fn load(&self) -> Result<Option<Value>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(value)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, text).map_err(|e| self.io_error(e))?;
        log::debug!("saved project to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("uib-storage-{}-{name}", std::process::id()))
    }

    #[test]
    fn memory_storage_round_trips() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.load().unwrap(), None);
        storage.save(&json!({"id": "p"})).unwrap();
        assert_eq!(storage.load().unwrap(), Some(json!({"id": "p"})));
    }

    #[test]
    fn file_storage_missing_file_is_empty() {
        let storage = JsonFileStorage::new(temp_path("missing.json"));
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn file_storage_round_trips() {
        let dir = temp_path("nested");
        let path = dir.join("project.json");
        let mut storage = JsonFileStorage::new(&path);
        storage.save(&json!({"id": "p", "screens": []})).unwrap();
        assert_eq!(
            storage.load().unwrap(),
            Some(json!({"id": "p", "screens": []}))
        );
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let path = temp_path("garbage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = JsonFileStorage::new(&path);
        assert!(matches!(storage.load(), Err(StorageError::Json(_))));
        let _ = fs::remove_file(path);
    }
}
