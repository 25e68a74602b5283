//! Namespaced key/value storage for small client-side state.
//!
//! Native builds keep one file per key under the local data directory;
//! wasm builds keep values in memory for the lifetime of the page.

use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::{env, fs, path::PathBuf};

#[cfg(target_arch = "wasm32")]
use once_cell::sync::Lazy;
#[cfg(target_arch = "wasm32")]
use std::{collections::HashMap, sync::Mutex};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[cfg(target_arch = "wasm32")]
static MEMORY_STORAGE: Lazy<Mutex<HashMap<String, HashMap<String, String>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// `CHATAPP_DATA_DIR` wins over the platform data directory.
#[cfg(not(target_arch = "wasm32"))]
fn storage_root() -> PathBuf {
    if let Ok(dir) = env::var("CHATAPP_DATA_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("chatapp");
    }
    PathBuf::from("cache")
}

#[cfg(not(target_arch = "wasm32"))]
fn namespace_dir(namespace: &str) -> PathBuf {
    storage_root().join(sanitize(namespace))
}

#[cfg(not(target_arch = "wasm32"))]
fn key_path(namespace: &str, key: &str) -> PathBuf {
    namespace_dir(namespace).join(format!("{}.json", sanitize(key)))
}

/// Maps anything outside `[A-Za-z0-9_-]` to `_` so names are safe path segments.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_get(namespace: &str, key: &str) -> Option<String> {
    fs::read_to_string(key_path(namespace, key)).ok()
}

#[cfg(target_arch = "wasm32")]
pub fn storage_get(namespace: &str, key: &str) -> Option<String> {
    let storage = MEMORY_STORAGE.lock().ok()?;
    storage.get(&sanitize(namespace))?.get(&sanitize(key)).cloned()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_set(namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
    fs::create_dir_all(namespace_dir(namespace))?;
    fs::write(key_path(namespace, key), value)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn storage_set(namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
    let mut storage = MEMORY_STORAGE
        .lock()
        .map_err(|_| StorageError::Poisoned)?;
    storage
        .entry(sanitize(namespace))
        .or_default()
        .insert(sanitize(key), value.to_string());
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_delete(namespace: &str, key: &str) -> Result<(), StorageError> {
    let path = key_path(namespace, key);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn storage_delete(namespace: &str, key: &str) -> Result<(), StorageError> {
    let mut storage = MEMORY_STORAGE
        .lock()
        .map_err(|_| StorageError::Poisoned)?;
    if let Some(entries) = storage.get_mut(&sanitize(namespace)) {
        entries.remove(&sanitize(key));
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_clear(namespace: &str) -> Result<(), StorageError> {
    let dir = namespace_dir(namespace);
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn storage_clear(namespace: &str) -> Result<(), StorageError> {
    let mut storage = MEMORY_STORAGE
        .lock()
        .map_err(|_| StorageError::Poisoned)?;
    storage.remove(&sanitize(namespace));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::sanitize;

    #[test]
    fn sanitizes_path_segments() {
        assert_eq!(sanitize("session"), "session");
        assert_eq!(sanitize("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize("user:prefs"), "user_prefs");
    }
}
