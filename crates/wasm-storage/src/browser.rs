//! Browser storage backends (wasm32 only)

use wasm_bindgen::JsValue;

use crate::{StorageBackend, StorageError};

fn describe(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn window() -> Result<web_sys::Window, StorageError> {
    web_sys::window().ok_or_else(|| StorageError::Unavailable {
        message: "No window object".to_string(),
    })
}

/// Durable storage backed by `window.localStorage`
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        storage_for(false)?.get_item(key).map_err(|e| {
            StorageError::Backend {
                message: describe(e),
            }
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        storage_for(false)?.set_item(key, value).map_err(|e| {
            StorageError::Backend {
                message: describe(e),
            }
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        storage_for(false)?.remove_item(key).map_err(|e| {
            StorageError::Backend {
                message: describe(e),
            }
        })
    }
}

/// Tab-scoped storage backed by `window.sessionStorage`
pub struct SessionStorage;

impl SessionStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        storage_for(true)?.get_item(key).map_err(|e| {
            StorageError::Backend {
                message: describe(e),
            }
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        storage_for(true)?.set_item(key, value).map_err(|e| {
            StorageError::Backend {
                message: describe(e),
            }
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        storage_for(true)?.remove_item(key).map_err(|e| {
            StorageError::Backend {
                message: describe(e),
            }
        })
    }
}

fn storage_for(session: bool) -> Result<web_sys::Storage, StorageError> {
    let window = window()?;
    let storage = if session {
        window.session_storage()
    } else {
        window.local_storage()
    };

    storage
        .map_err(|e| StorageError::Unavailable {
            message: describe(e),
        })?
        .ok_or_else(|| StorageError::Unavailable {
            message: if session {
                "SessionStorage not supported".to_string()
            } else {
                "LocalStorage not supported".to_string()
            },
        })
}
