use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or writing the JSON data files.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DataError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
