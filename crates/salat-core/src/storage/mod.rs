mod config;
pub mod database;
pub mod keys;
pub mod profile;

pub use config::{Config, PumpConfig, StatusConfig, TimetableConfig};
pub use database::{Database, KeyValueStore};
pub use profile::ProfileStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the data directory, creating it if needed.
///
/// `SALAT_HOME` overrides the location entirely. Otherwise the directory is
/// `~/.config/salat/`, or `~/.config/salat-dev/` when `SALAT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SALAT_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SALAT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("salat-dev")
            } else {
                base_dir.join("salat")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Read a JSON blob, treating absence and corruption alike as the default.
///
/// A corrupted blob is logged and replaced by `T::default()` so callers stay
/// usable after partial data loss. Storage failures still propagate.
pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.kv_get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "corrupted blob, falling back to empty value");
            Ok(T::default())
        }
    }
}

/// Like [`read_json`] but distinguishes an absent key.
pub fn read_json_opt<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.kv_get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "corrupted blob, ignoring stored value");
            Ok(None)
        }
    }
}

pub fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.kv_set(key, &json)?;
    Ok(())
}

/// Read-latest, mutate, write-back in one synchronous cycle.
///
/// The value is re-read right before the closure runs, so concurrent writers
/// in the same process cannot be overwritten by a stale copy.
pub fn update_json<T, R, F>(store: &dyn KeyValueStore, key: &str, f: F) -> Result<R>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnOnce(&mut T) -> R,
{
    let mut value: T = read_json(store, key)?;
    let out = f(&mut value);
    write_json(store, key, &value)?;
    Ok(out)
}
