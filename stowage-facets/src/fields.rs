//! Optional fields a container read can populate.

use crate::error::{RepositoryError, RepositoryResult};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use stowage_model::{
    extension_key, ColumnId, Container, CustomMetric, EntityKind, FacetKind, MetricScope, StorageService,
};
use stowage_storage::{EntityStore, ExtensionStore, Relationship, UnitOfWork};
use stowage_types::EntityId;

const TEST_SUITE: &str = "testSuite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Parent,
    Tags,
    DataModel,
    TableProfilerConfig,
    CustomMetrics,
    TestSuite,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Parent,
        Field::Tags,
        Field::DataModel,
        Field::TableProfilerConfig,
        Field::CustomMetrics,
        Field::TestSuite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Tags => "tags",
            Self::DataModel => "dataModel",
            Self::TableProfilerConfig => "tableProfilerConfig",
            Self::CustomMetrics => "customMetrics",
            Self::TestSuite => "testSuite",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| RepositoryError::Validation(format!("Invalid field name {s}")))
    }
}

/// The set of fields requested on a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldSet(u8);

impl FieldSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self::of(&Field::ALL)
    }

    pub fn of(fields: &[Field]) -> Self {
        Self(fields.iter().fold(0, |bits, f| bits | f.bit()))
    }

    /// Parses a comma-separated list such as `"tags,dataModel"`. Blank
    /// entries are skipped.
    pub fn parse(list: &str) -> RepositoryResult<Self> {
        let mut set = Self::empty();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            set = set.with(name.parse()?);
        }
        Ok(set)
    }

    #[must_use]
    pub fn with(self, field: Field) -> Self {
        Self(self.0 | field.bit())
    }

    pub fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

// ── Population ───────────────────────────────────────────────────

/// Fills the requested relationship fields and facets of a decoded container.
/// The owning service is always resolved.
pub(crate) fn set_fields(
    uow: &UnitOfWork<'_>,
    container: &mut Container,
    fields: FieldSet,
) -> RepositoryResult<()> {
    let entities = uow.entities();
    let extensions = uow.extensions();
    let id = container.id;

    container.service =
        entities.get_from(id, Relationship::Contains, StorageService::ENTITY_TYPE)?;
    if fields.contains(Field::Parent) {
        container.parent = entities.get_from(id, Relationship::Contains, Container::ENTITY_TYPE)?;
    }
    populate_tags(&entities, container, fields.contains(Field::Tags))?;
    if fields.contains(Field::TableProfilerConfig) {
        container.table_profiler_config =
            extensions.get_json(id, &extension_key(FacetKind::TableProfilerConfig, None))?;
    }
    if fields.contains(Field::TestSuite) {
        container.test_suite = entities
            .get_to(id, Relationship::Has, TEST_SUITE)?
            .into_iter()
            .next();
    }
    if fields.contains(Field::CustomMetrics) {
        container.custom_metrics = Some(read_custom_metrics(&extensions, id, None)?);
        if fields.contains(Field::DataModel) {
            attach_column_metrics(&extensions, container)?;
        }
    }
    Ok(())
}

/// Drops every optional field that was not requested.
pub(crate) fn clear_fields(container: &mut Container, fields: FieldSet) {
    if !fields.contains(Field::Parent) {
        container.parent = None;
    }
    if !fields.contains(Field::DataModel) {
        container.data_model = None;
    }
    if !fields.contains(Field::TableProfilerConfig) {
        container.table_profiler_config = None;
    }
    if !fields.contains(Field::TestSuite) {
        container.test_suite = None;
    }
    if !fields.contains(Field::CustomMetrics) {
        container.custom_metrics = None;
    }
}

/// Loads container and column tags from tag usage, or clears them all.
pub(crate) fn populate_tags(
    entities: &EntityStore<'_>,
    container: &mut Container,
    load: bool,
) -> RepositoryResult<()> {
    container.tags = if load {
        entities.get_tags(&container.fully_qualified_name)?
    } else {
        Vec::new()
    };
    if let Some(tree) = container.columns_mut() {
        for id in tree.depth_first() {
            let node = tree.node_mut(id);
            node.tags = match (load, node.fully_qualified_name.as_deref()) {
                (true, Some(column_fqn)) => entities.get_tags(column_fqn)?,
                _ => Vec::new(),
            };
        }
    }
    Ok(())
}

/// Custom metrics of one scope: the container's own when `column` is `None`,
/// otherwise those of exactly that column.
pub(crate) fn read_custom_metrics(
    extensions: &ExtensionStore<'_>,
    owner: EntityId,
    column: Option<&str>,
) -> RepositoryResult<Vec<CustomMetric>> {
    let kind = FacetKind::for_metric_scope(MetricScope::from_column(column));
    let mut metrics = Vec::new();
    for record in extensions.get_all_with_prefix(owner, &extension_key(kind, None))? {
        let metric: CustomMetric = serde_json::from_str(&record.json)?;
        if metric.column_name.as_deref() == column {
            metrics.push(metric);
        }
    }
    Ok(metrics)
}

/// Gives every column its own custom metrics (possibly none).
fn attach_column_metrics(
    extensions: &ExtensionStore<'_>,
    container: &mut Container,
) -> RepositoryResult<()> {
    let owner = container.id;
    let Some(tree) = container.columns_mut() else {
        return Ok(());
    };
    let prefix = extension_key(FacetKind::ColumnCustomMetric, None);
    let mut by_column: HashMap<ColumnId, Vec<CustomMetric>> = HashMap::new();
    for record in extensions.get_all_with_prefix(owner, &prefix)? {
        let metric: CustomMetric = serde_json::from_str(&record.json)?;
        if let Some(id) = metric.column_name.as_deref().and_then(|c| tree.resolve(c)) {
            by_column.entry(id).or_default().push(metric);
        }
    }
    for id in tree.depth_first() {
        tree.node_mut(id).custom_metrics = Some(by_column.remove(&id).unwrap_or_default());
    }
    Ok(())
}
