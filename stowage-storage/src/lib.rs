//! SQLite storage layer for Stowage.
//!
//! Persists three kinds of data behind one connection:
//!
//! - primary entity records, their relationships, tag usage and version history
//! - extension records: named JSON blobs attached to an entity id
//! - profiler time series: timestamped JSON rows keyed by entity FQN
//!
//! # Architecture
//!
//! - A [`Database`] owns the connection behind `Arc<Mutex<_>>`
//! - All reads and writes go through [`Database::unit_of_work`], which runs
//!   the closure inside a single SQLite transaction
//! - The stores ([`ExtensionStore`], [`TimeSeriesStore`], [`EntityStore`]) are
//!   cheap views over the transaction's connection
//! - The schema is created on open

mod config;
mod database;
mod entity_store;
mod error;
mod extension_store;
mod time_series;

pub use config::{JournalMode, StoreConfig};
pub use database::{Database, UnitOfWork};
pub use entity_store::{EntityStore, Include, Relationship, VersionEntry};
pub use error::{StorageError, StorageResult};
pub use extension_store::{ExtensionRecord, ExtensionStore};
pub use time_series::{SortOrder, TimeSeriesRecord, TimeSeriesStore};
