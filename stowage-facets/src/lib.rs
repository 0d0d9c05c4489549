//! Facet coordinator for Stowage containers.
//!
//! [`ContainerRepository`] is the single entry point for container reads and
//! writes. It ties the primary record (with its relationships, tags and
//! version history) to the facets stored beside it:
//! - structured and unstructured sample data
//! - profiler configuration
//! - table, column and system profiles in the time-series store
//! - table- and column-scoped custom metrics
//!
//! Reads made without PII authorization pass through a [`PiiMasker`].
//! Accepted task suggestions are applied through [`TaskDispatch`].

mod error;
mod fields;
mod masking;
mod repository;
mod sample;
mod tasks;

pub use error::{RepositoryError, RepositoryResult};
pub use fields::{Field, FieldSet};
pub use masking::{MaskingConfig, PiiMasker, SensitiveTagMasker, MASKED_VALUE};
pub use repository::ContainerRepository;
pub use sample::decode_unstructured;
pub use tasks::{
    ColumnDescriptionResolver, ColumnTagsResolver, EntityLink, TaskDispatch, TaskKind, TaskResolver,
};
