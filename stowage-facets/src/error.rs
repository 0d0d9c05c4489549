use stowage_model::UnknownProfileScope;
use stowage_storage::StorageError;
use stowage_versioning::VersioningError;
use thiserror::Error;

/// Errors raised by [`ContainerRepository`](crate::ContainerRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Caller input was rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    UnsupportedScope(#[from] UnknownProfileScope),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("versioning error: {0}")]
    Versioning(#[from] VersioningError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid name: {0}")]
    Name(#[from] stowage_types::Error),

    #[error("task error: {0}")]
    Task(String),
}

impl RepositoryError {
    pub(crate) fn invalid_column(name: &str) -> Self {
        Self::Validation(format!("Invalid column name {name}"))
    }

    /// Lifts a storage `NotFound` into [`RepositoryError::NotFound`].
    pub(crate) fn from_lookup(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
