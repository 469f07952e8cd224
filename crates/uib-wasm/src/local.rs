//! `window.localStorage` persistence for the browser editor.

use serde_json::Value;
use uib_editor::storage::{Persistence, StorageError};

/// Stores the project JSON under one localStorage key. Outside the browser
/// there is no storage: nothing loads and saves are dropped.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    key: String,
}

impl LocalStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(target_arch = "wasm32")]
fn storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Backend("no window".into()))?
        .local_storage()
        .map_err(|e| StorageError::Backend(format!("{e:?}")))?
        .ok_or_else(|| StorageError::Backend("localStorage unavailable".into()))
}

impl Persistence for LocalStorage {
    #[cfg(target_arch = "wasm32")]
    fn load(&self) -> Result<Option<Value>, StorageError> {
        let raw = storage()?
            .get_item(&self.key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn save(&mut self, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        storage()?
            .set_item(&self.key, &text)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load(&self) -> Result<Option<Value>, StorageError> {
        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save(&mut self, _value: &Value) -> Result<(), StorageError> {
        log::debug!("no localStorage outside the browser; dropped save of {}", self.key);
        Ok(())
    }
}
