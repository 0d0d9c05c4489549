//! Core type definitions for Stowage.
//!
//! This crate defines the small, domain-agnostic types shared by every other
//! crate in the workspace:
//! - Entity identifiers (UUID v7)
//! - Epoch-millisecond time helpers and bounded time ranges
//! - Fully-qualified-name (FQN) building, quoting and splitting
//!
//! Container, column and profile types live in `stowage-model`.

pub mod fqn;
mod ids;
mod time;

pub use ids::EntityId;
pub use time::{now_millis, TimeRange};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid name {0}: {1}")]
    InvalidFqn(String, &'static str),

    #[error("invalid time range: start {start} is after end {end}")]
    InvalidTimeRange { start: i64, end: i64 },
}
