//! Storage errors shared by the record, extension and time-series stores.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored payload or a value being stored is not valid JSON for its type.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No record with this id or FQN (deleted records count as missing unless
    /// the lookup includes them).
    #[error("entity not found: {0}")]
    NotFound(String),

    /// Reading a config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad stored identifier or inverted time range.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The stored version moved on since the caller loaded the entity.
    #[error("version conflict: expected {expected}, found {actual}")]
    Conflict { expected: f64, actual: f64 },
}

impl From<stowage_types::Error> for StorageError {
    fn from(e: stowage_types::Error) -> Self {
        Self::InvalidData(e.to_string())
    }
}
