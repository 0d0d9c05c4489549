//! Entity model for Stowage.
//!
//! Defines the types every other Stowage crate depends on:
//! - [`EntityRecord`] / [`EntityKind`]: the generic persisted record and the
//!   trait mapping typed entities onto it
//! - [`Container`]: the storage bucket/folder entity and its data model
//! - [`ColumnTree`]: the column hierarchy, held as an index arena
//! - profiler, sample-data and custom-metric facet types
//! - [`FacetKind`] and [`extension_key`]: the extension-name taxonomy
//!
//! Wire field names are camelCase so stored JSON stays readable by other
//! metadata tooling.

mod change;
mod column;
mod container;
mod entity;
mod extension;
mod metric;
mod profile;
mod tag;

pub use change::{ChangeDescription, FieldChange};
pub use column::{Column, ColumnId, ColumnNode, ColumnTree};
pub use container::{
    Container, ContainerDataModel, CreateContainer, EntityReference, FileFormat, StorageService,
};
pub use entity::{EntityKind, EntityRecord};
pub use extension::{extension_key, FacetKind, ProfileScope, UnknownProfileScope, CUSTOM_METRICS_PREFIX};
pub use metric::{CustomMetric, MetricScope};
pub use profile::{
    ColumnProfile, ColumnProfilerConfig, CreateTableProfile, DmlOperation, PartitionProfilerConfig,
    ProfileSampleType, SampleData, SystemProfile, TableData, TableProfile, TableProfilerConfig,
};
pub use tag::{LabelType, TagLabel, TagSource, TagState};
