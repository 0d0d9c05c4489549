use crate::UpdateState;
use stowage_storage::StorageError;
use thiserror::Error;

pub type VersioningResult<T> = Result<T, VersioningError>;

#[derive(Debug, Error)]
pub enum VersioningError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid name: {0}")]
    Name(#[from] stowage_types::Error),

    /// An updater step was called out of order.
    #[error("cannot {step} while {state:?}")]
    InvalidState { step: &'static str, state: UpdateState },

    /// The container has neither a parent nor a service to derive its FQN from.
    #[error("container {0} has no parent or service")]
    Orphan(String),

    /// The update tried to change a field fixed at creation.
    #[error("{0} cannot be changed by an update")]
    Immutable(&'static str),
}
