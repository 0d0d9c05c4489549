//! Versioning for Stowage containers.
//!
//! - [`Changeset`]: ordered field-level changes with scalar, list and
//!   nested kinds, and the [`VersionBump`] they imply
//! - [`diff_containers`]: the pure diff of two container snapshots,
//!   including the recursive column-tree diff
//! - [`ContainerUpdater`]: the `Loaded → Diffing → Persisting → Committed`
//!   update flow with optimistic concurrency, history and tag re-application
//!
//! Facet writes (profiles, sample data, custom metrics) never pass through
//! here; only primary-record updates are versioned.

mod changeset;
mod diff;
mod error;
mod updater;

pub use changeset::{diff_lists, Change, ChangeKind, Changeset, ListDiff, VersionBump};
pub use diff::{diff_containers, MINOR_FIELDS};
pub use error::{VersioningError, VersioningResult};
pub use updater::{reapply_tags, ContainerUpdater, Operation, UpdateState};
