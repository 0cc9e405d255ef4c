//! JSON Data Files
//!
//! Every collection in the data directory is a single JSON array.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::DataError;

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Field deserializer that reads an explicit `null` as the type's default.
/// Pair with `#[serde(default)]` so a missing key is covered too.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read an array, skipping entries that don't deserialize as `T`.
pub fn read_entries<T: DeserializeOwned>(path: &Path, label: &str) -> Result<Vec<T>, DataError> {
    let raw: Vec<Value> = read_file(path)?;
    let total = raw.len();

    let entries: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed {} entry #{} in {:?}: {}", label, index, path, e);
                None
            }
        })
        .collect();

    info!("Loaded {} {} ({} skipped)", entries.len(), label, total - entries.len());
    Ok(entries)
}

/// Like [`read_entries`], but any file-level failure yields an empty collection.
pub fn read_entries_or_empty<T: DeserializeOwned>(path: &Path, label: &str) -> Vec<T> {
    match read_entries(path, label) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to load {}: {}", label, e);
            Vec::new()
        }
    }
}

/// Read an array where every entry must deserialize.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    read_file(path)
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T, what: &'static str) -> Result<String, DataError> {
    serde_json::to_string_pretty(value).map_err(|source| DataError::Serialize { what, source })
}

pub async fn write_string(path: &Path, content: &str) -> Result<(), DataError> {
    tokio::fs::write(path, content).await.map_err(|source| DataError::Write {
        path: path.to_path_buf(),
        source,
    })
}
