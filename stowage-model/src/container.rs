use crate::{
    ChangeDescription, ColumnTree, CustomMetric, EntityKind, SampleData, TableProfile,
    TableProfilerConfig, TagLabel,
};
use serde::{Deserialize, Serialize};
use stowage_types::{fqn, EntityId};

/// A weak reference to another entity (parent, service, test suite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    pub fully_qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// Object file formats a container may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Zip,
    Gz,
    Zstd,
    Csv,
    Tsv,
    Avro,
    Parquet,
    Json,
    Doc,
    Docx,
    Hwp,
    Hwpx,
}

impl FileFormat {
    /// Document formats whose samples are free text rather than rows.
    pub fn is_unstructured(self) -> bool {
        matches!(self, Self::Doc | Self::Docx | Self::Hwp | Self::Hwpx)
    }
}

/// The tabular schema of a container's objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDataModel {
    #[serde(default)]
    pub is_partitioned: bool,
    #[serde(default)]
    pub columns: ColumnTree,
}

/// The service (object store) that owns top-level containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageService {
    pub id: EntityId,
    pub name: String,
    pub fully_qualified_name: String,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: f64,
    pub updated_at: i64,
    pub updated_by: String,
}

impl StorageService {
    pub fn new(name: impl Into<String>, service_type: impl Into<String>) -> stowage_types::Result<Self> {
        let name = name.into();
        Ok(Self {
            id: EntityId::new(),
            fully_qualified_name: fqn::quote_name(&name)?,
            name,
            service_type: service_type.into(),
            description: None,
            version: 0.1,
            updated_at: stowage_types::now_millis(),
            updated_by: String::new(),
        })
    }
}

impl EntityKind for StorageService {
    const ENTITY_TYPE: &'static str = "storageService";

    fn id(&self) -> EntityId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn fully_qualified_name(&self) -> &str {
        &self.fully_qualified_name
    }
    fn version(&self) -> f64 {
        self.version
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
    fn updated_by(&self) -> &str {
        &self.updated_by
    }
}

/// A storage bucket or folder.
///
/// Fields after `change_description` are computed on read from the extension
/// store, the time-series store and the relationship graph; they are never
/// part of the persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub fully_qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_model: Option<ContainerDataModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_objects: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_formats: Vec<FileFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
    pub version: f64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_description: Option<ChangeDescription>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_profiler_config: Option<TableProfilerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_metrics: Option<Vec<CustomMetric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<SampleData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<TableProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_suite: Option<EntityReference>,
}

impl Container {
    /// A fresh container with only identity and name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            fully_qualified_name: String::new(),
            display_name: None,
            description: None,
            service: None,
            service_type: None,
            parent: None,
            data_model: None,
            prefix: None,
            number_of_objects: None,
            size: None,
            file_formats: Vec::new(),
            retention_period: None,
            source_hash: None,
            source_url: None,
            full_path: None,
            tags: Vec::new(),
            version: 0.1,
            updated_at: 0,
            updated_by: String::new(),
            deleted: false,
            change_description: None,
            table_profiler_config: None,
            custom_metrics: None,
            sample_data: None,
            profile: None,
            test_suite: None,
        }
    }

    /// The FQN this container's own name is appended to: the parent's if it
    /// has one, otherwise the service's.
    pub fn fqn_prefix(&self) -> Option<&str> {
        self.parent
            .as_ref()
            .or(self.service.as_ref())
            .map(|r| r.fully_qualified_name.as_str())
    }

    /// Recomputes this container's FQN under `prefix` and every column FQN
    /// beneath it.
    pub fn assign_fqn(&mut self, prefix: &str) -> stowage_types::Result<()> {
        self.fully_qualified_name = fqn::add(prefix, &self.name)?;
        if let Some(model) = self.data_model.as_mut() {
            model.columns.propagate_fqn(&self.fully_qualified_name)?;
        }
        Ok(())
    }

    pub fn columns(&self) -> Option<&ColumnTree> {
        self.data_model.as_ref().map(|m| &m.columns)
    }

    pub fn columns_mut(&mut self) -> Option<&mut ColumnTree> {
        self.data_model.as_mut().map(|m| &mut m.columns)
    }

    /// Returns true when samples for this container are free text.
    ///
    /// Decided by the first declared file format; a container without any
    /// declared format is treated as structured.
    pub fn has_unstructured_samples(&self) -> bool {
        self.file_formats.first().is_some_and(|f| f.is_unstructured())
    }

    /// The form written to the primary-record table.
    ///
    /// Relationship fields (service, parent, tags at every level) and
    /// read-time facets are removed; they are rebuilt on read.
    pub fn strip_for_storage(&self) -> Container {
        let mut stored = self.clone();
        stored.service = None;
        stored.parent = None;
        stored.tags.clear();
        stored.table_profiler_config = None;
        stored.custom_metrics = None;
        stored.sample_data = None;
        stored.profile = None;
        stored.test_suite = None;
        if let Some(model) = stored.data_model.as_mut() {
            model.columns = model.columns.clone_structural_only();
        }
        stored
    }
}

impl EntityKind for Container {
    const ENTITY_TYPE: &'static str = "container";

    fn id(&self) -> EntityId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn fully_qualified_name(&self) -> &str {
        &self.fully_qualified_name
    }
    fn version(&self) -> f64 {
        self.version
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
    fn updated_by(&self) -> &str {
        &self.updated_by
    }
    fn deleted(&self) -> bool {
        self.deleted
    }
    fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Request to create a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainer {
    pub name: String,
    /// FQN of the owning storage service.
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_model: Option<ContainerDataModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_objects: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default)]
    pub file_formats: Vec<FileFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagLabel>,
}

impl CreateContainer {
    pub fn new(name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            ..Self::default()
        }
    }

    /// Builds the container this request describes. Service and parent
    /// references are resolved by the caller.
    pub fn into_container(self, updated_by: &str) -> Container {
        let mut container = Container::new(self.name);
        container.display_name = self.display_name;
        container.description = self.description;
        container.data_model = self.data_model;
        container.prefix = self.prefix;
        container.number_of_objects = self.number_of_objects;
        container.size = self.size;
        container.file_formats = self.file_formats;
        container.retention_period = self.retention_period;
        container.source_hash = self.source_hash;
        container.source_url = self.source_url;
        container.full_path = self.full_path;
        container.tags = self.tags;
        container.updated_at = stowage_types::now_millis();
        container.updated_by = updated_by.to_string();
        container
    }
}
