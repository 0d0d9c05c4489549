//! The container repository.
//!
//! Every public operation runs inside one [`Database::unit_of_work`], so all
//! writes an operation makes commit together or not at all.

use crate::error::{RepositoryError, RepositoryResult};
use crate::fields::{clear_fields, populate_tags, read_custom_metrics, set_fields, Field, FieldSet};
use crate::masking::{PiiMasker, SensitiveTagMasker};
use crate::sample::{decode_unstructured, resolve_column, validate_table_data};
use crate::tasks::{EntityLink, TaskDispatch, TaskKind};
use std::sync::Arc;
use stowage_model::{
    extension_key, ColumnProfile, Container, CreateContainer, CreateTableProfile, CustomMetric,
    EntityKind, EntityRecord, EntityReference, FacetKind, MetricScope, ProfileSampleType, ProfileScope,
    SampleData, StorageService, SystemProfile, TableData, TableProfile, TableProfilerConfig, TagLabel,
};
use stowage_storage::{
    Database, EntityStore, Include, Relationship, SortOrder, StorageError, UnitOfWork, VersionEntry,
};
use stowage_types::{fqn, now_millis, EntityId, TimeRange};
use stowage_versioning::{reapply_tags, ContainerUpdater, Operation};
use tracing::{debug, info};

/// Fields the updater needs on the original snapshot.
const UPDATE_FIELDS: [Field; 3] = [Field::Parent, Field::Tags, Field::DataModel];

pub struct ContainerRepository {
    db: Database,
    masker: Arc<dyn PiiMasker>,
    tasks: TaskDispatch,
}

impl ContainerRepository {
    /// A repository using [`SensitiveTagMasker`] with its default tag and the
    /// built-in task resolvers.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            masker: Arc::new(SensitiveTagMasker::default()),
            tasks: TaskDispatch::default(),
        }
    }

    #[must_use]
    pub fn with_masker(mut self, masker: Arc<dyn PiiMasker>) -> Self {
        self.masker = masker;
        self
    }

    #[must_use]
    pub fn with_tasks(mut self, tasks: TaskDispatch) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // ── Services ─────────────────────────────────────────────────

    pub fn create_service(
        &self,
        name: &str,
        service_type: &str,
        user: &str,
    ) -> RepositoryResult<StorageService> {
        let mut service = StorageService::new(name, service_type)?;
        service.updated_by = user.to_string();
        self.db.unit_of_work(|uow| {
            let entities = uow.entities();
            if exists(&entities, StorageService::ENTITY_TYPE, &service.fully_qualified_name)? {
                return Err(RepositoryError::Validation(format!(
                    "storageService {} already exists",
                    service.fully_qualified_name
                )));
            }
            entities.store(&service.to_record()?)?;
            info!(service_id = %service.id, name = %service.name, "storage service created");
            Ok(service)
        })
    }

    pub fn get_service_by_name(&self, fqn: &str) -> RepositoryResult<StorageService> {
        self.db.unit_of_work(|uow| {
            let record = uow
                .entities()
                .find_by_name(StorageService::ENTITY_TYPE, fqn, Include::NonDeleted)
                .map_err(RepositoryError::from_lookup)?;
            Ok(record.decode()?)
        })
    }

    // ── Container lifecycle ──────────────────────────────────────

    /// Creates a container under its service (and parent, when given).
    ///
    /// The record is stored without relationship fields; `CONTAINS` edges
    /// from the service and the parent are added, tags are applied to the
    /// container and its columns, and the first history row is written.
    pub fn create_container(
        &self,
        request: CreateContainer,
        user: &str,
    ) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let entities = uow.entities();
            let service: StorageService = entities
                .find_by_name(StorageService::ENTITY_TYPE, &request.service, Include::NonDeleted)
                .map_err(RepositoryError::from_lookup)?
                .decode()?;
            let parent = match request.parent {
                Some(parent_id) => Some(load(&entities, parent_id, Include::NonDeleted)?),
                None => None,
            };

            let mut container = request.into_container(user);
            container.service = Some(service.entity_reference());
            container.service_type = Some(service.service_type.clone());
            container.parent = parent.as_ref().map(EntityKind::entity_reference);
            let prefix = parent
                .as_ref()
                .map_or(&service.fully_qualified_name, |p| &p.fully_qualified_name)
                .clone();
            container.assign_fqn(&prefix)?;

            if exists(&entities, Container::ENTITY_TYPE, &container.fully_qualified_name)? {
                return Err(RepositoryError::Validation(format!(
                    "container {} already exists",
                    container.fully_qualified_name
                )));
            }

            let record = container.strip_for_storage().to_record()?;
            entities.store(&record)?;
            let reference = container.entity_reference();
            entities.add_relationship(&service.entity_reference(), &reference, Relationship::Contains)?;
            if let Some(parent) = &parent {
                entities.add_relationship(&parent.entity_reference(), &reference, Relationship::Contains)?;
            }
            reapply_tags(&entities, None, &container)?;
            entities.store_version(
                container.id,
                container.version,
                &record.json,
                None,
                container.updated_at,
            )?;

            info!(
                container_id = %container.id,
                fqn = %container.fully_qualified_name,
                "container created"
            );
            Ok(container)
        })
    }

    /// Applies `updated` to the stored container through the versioning
    /// updater and returns the container as now stored.
    pub fn update_container(
        &self,
        id: EntityId,
        mut updated: Container,
        operation: Operation,
        user: &str,
    ) -> RepositoryResult<Container> {
        updated.updated_by = user.to_string();
        self.db.unit_of_work(|uow| {
            let original = fetch(uow, id, Include::NonDeleted, FieldSet::of(&UPDATE_FIELDS))?;
            let mut updater = ContainerUpdater::new(original, updated, operation);
            Ok(updater.update(uow)?)
        })
    }

    pub fn get_container(
        &self,
        id: EntityId,
        fields: FieldSet,
        include: Include,
    ) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| fetch(uow, id, include, fields))
    }

    pub fn get_container_by_name(
        &self,
        fqn: &str,
        fields: FieldSet,
        include: Include,
    ) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| fetch_by_name(uow, fqn, include, fields))
    }

    /// Every container record, ordered by FQN, without optional fields.
    pub fn list_containers(&self, include: Include) -> RepositoryResult<Vec<Container>> {
        self.db.unit_of_work(|uow| {
            uow.entities()
                .list(Container::ENTITY_TYPE, include)?
                .iter()
                .map(decode)
                .collect()
        })
    }

    /// Direct child containers, ordered by FQN.
    pub fn list_children(&self, id: EntityId) -> RepositoryResult<Vec<EntityReference>> {
        self.db.unit_of_work(|uow| {
            let entities = uow.entities();
            load(&entities, id, Include::All)?;
            Ok(entities.get_to(id, Relationship::Contains, Container::ENTITY_TYPE)?)
        })
    }

    pub fn list_versions(&self, id: EntityId) -> RepositoryResult<Vec<VersionEntry>> {
        self.db.unit_of_work(|uow| {
            let entities = uow.entities();
            load(&entities, id, Include::All)?;
            Ok(entities.list_versions(id)?)
        })
    }

    /// Deletes a container that has no child containers.
    ///
    /// A soft delete only flags the record. A hard delete also removes its
    /// facets, its profile history, its tag usage, its relationships and its
    /// version history.
    pub fn delete_container(&self, id: EntityId, hard: bool) -> RepositoryResult<()> {
        self.db.unit_of_work(|uow| {
            let entities = uow.entities();
            let container = load(&entities, id, Include::All)?;
            let children = entities.get_to(id, Relationship::Contains, Container::ENTITY_TYPE)?;
            if !children.is_empty() {
                return Err(RepositoryError::Validation(format!(
                    "container {} has {} child containers",
                    container.fully_qualified_name,
                    children.len()
                )));
            }
            if !hard {
                entities.set_deleted(id, true)?;
                info!(container_id = %id, "container soft-deleted");
                return Ok(());
            }

            let series = uow.time_series();
            for subject in subjects(&container) {
                entities.delete_tags(subject)?;
                series.delete_subject(subject)?;
            }
            let facets = uow.extensions().delete_all(id)?;
            entities.delete(id)?;
            info!(container_id = %id, facets, "container hard-deleted");
            Ok(())
        })
    }

    /// Restores a soft-deleted container.
    pub fn restore_container(&self, id: EntityId) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let entities = uow.entities();
            load(&entities, id, Include::Deleted)?;
            entities.set_deleted(id, false)?;
            info!(container_id = %id, "container restored");
            fetch(uow, id, Include::NonDeleted, FieldSet::empty())
        })
    }

    // ── Sample data ──────────────────────────────────────────────

    /// Stores structured sample rows after checking every column name and
    /// every row's width.
    pub fn add_sample_data(&self, id: EntityId, data: TableData) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch(uow, id, Include::NonDeleted, FieldSet::of(&[Field::DataModel]))?;
            validate_table_data(&container, &data)?;
            uow.extensions()
                .put_json(id, &extension_key(FacetKind::SampleData, None), &data)?;
            debug!(container_id = %id, rows = data.rows.len(), "sample data stored");
            container.sample_data = Some(SampleData::Structured(data));
            Ok(container)
        })
    }

    /// Stores free-text sample content verbatim and returns the container
    /// with the decoded text attached.
    pub fn add_unstructured_sample_data(&self, id: EntityId, raw: &str) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch(uow, id, Include::NonDeleted, FieldSet::empty())?;
            uow.extensions()
                .put(id, &extension_key(FacetKind::UnstructuredSampleData, None), raw)?;
            debug!(container_id = %id, bytes = raw.len(), "unstructured sample stored");
            container.sample_data = Some(SampleData::Unstructured(decode_unstructured(raw)));
            Ok(container)
        })
    }

    /// Reads the container's sample data.
    ///
    /// Containers whose first file format is a document type return decoded
    /// free text. Others return structured rows, masked when the caller is
    /// not authorized to see PII.
    pub fn get_sample_data(&self, id: EntityId, authorized: bool) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch(uow, id, Include::NonDeleted, FieldSet::of(&[Field::DataModel]))?;
            let extensions = uow.extensions();
            if container.has_unstructured_samples() {
                container.sample_data = extensions
                    .get(id, &extension_key(FacetKind::UnstructuredSampleData, None))?
                    .map(|raw| SampleData::Unstructured(decode_unstructured(&raw)));
                return Ok(container);
            }

            container.sample_data = extensions
                .get_json::<TableData>(id, &extension_key(FacetKind::SampleData, None))?
                .map(SampleData::Structured);
            if !authorized && container.sample_data.is_some() {
                populate_tags(&uow.entities(), &mut container, true)?;
                container = self.masker.mask_sample_rows(container);
            }
            Ok(container)
        })
    }

    /// Removes both the structured and the unstructured sample.
    pub fn delete_sample_data(&self, id: EntityId) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch(uow, id, Include::NonDeleted, FieldSet::empty())?;
            let extensions = uow.extensions();
            extensions.delete(id, &extension_key(FacetKind::SampleData, None))?;
            extensions.delete(id, &extension_key(FacetKind::UnstructuredSampleData, None))?;
            container.sample_data = None;
            Ok(container)
        })
    }

    // ── Profiler config ──────────────────────────────────────────

    pub fn add_table_profiler_config(
        &self,
        id: EntityId,
        config: TableProfilerConfig,
    ) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch(uow, id, Include::NonDeleted, FieldSet::of(&[Field::DataModel]))?;
            validate_profiler_config(&container, &config)?;
            uow.extensions()
                .put_json(id, &extension_key(FacetKind::TableProfilerConfig, None), &config)?;
            debug!(container_id = %id, "profiler config stored");
            container.table_profiler_config = Some(config);
            Ok(container)
        })
    }

    pub fn get_table_profiler_config(&self, id: EntityId) -> RepositoryResult<Option<TableProfilerConfig>> {
        self.db.unit_of_work(|uow| {
            load(&uow.entities(), id, Include::NonDeleted)?;
            Ok(uow
                .extensions()
                .get_json(id, &extension_key(FacetKind::TableProfilerConfig, None))?)
        })
    }

    pub fn delete_table_profiler_config(&self, id: EntityId) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch(uow, id, Include::NonDeleted, FieldSet::empty())?;
            uow.extensions()
                .delete(id, &extension_key(FacetKind::TableProfilerConfig, None))?;
            container.table_profiler_config = None;
            Ok(container)
        })
    }

    // ── Profiles ─────────────────────────────────────────────────

    /// Records one profiler run.
    ///
    /// Every column profile must name a column (plain `parent.child`
    /// naming); nothing is written when one does not. The table profile and
    /// column profiles are appended; each system profile replaces any row
    /// with the same timestamp and operation.
    pub fn add_table_profile(
        &self,
        id: EntityId,
        profile: CreateTableProfile,
    ) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch(uow, id, Include::NonDeleted, FieldSet::of(&[Field::DataModel]))?;
            let fqn = container.fully_qualified_name.clone();

            let mut column_rows = Vec::with_capacity(profile.column_profile.len());
            for column_profile in &profile.column_profile {
                let column_fqn = container
                    .columns()
                    .and_then(|tree| {
                        let column = tree.resolve_profile_name(&column_profile.name)?;
                        tree.node(column).fully_qualified_name.clone()
                    })
                    .ok_or_else(|| RepositoryError::invalid_column(&column_profile.name))?;
                column_rows.push((column_fqn, column_profile));
            }

            let series = uow.time_series();
            series.insert(
                &fqn,
                &extension_key(FacetKind::TableProfile, None),
                profile.table_profile.timestamp,
                &serde_json::to_string(&profile.table_profile)?,
            )?;
            let column_key = extension_key(FacetKind::ColumnProfile, None);
            for (column_fqn, column_profile) in &column_rows {
                series.insert(
                    column_fqn,
                    &column_key,
                    column_profile.timestamp,
                    &serde_json::to_string(column_profile)?,
                )?;
            }
            let system_key = extension_key(FacetKind::SystemProfile, None);
            for system_profile in profile.system_profile.iter().flatten() {
                series.upsert_with_operation(
                    &fqn,
                    &system_key,
                    system_profile.timestamp,
                    system_profile.operation.as_str(),
                    &serde_json::to_string(system_profile)?,
                )?;
            }

            info!(
                container_id = %id,
                fqn = %fqn,
                timestamp = profile.table_profile.timestamp,
                columns = column_rows.len(),
                "profile recorded"
            );
            container.profile = Some(profile.table_profile.clone());
            Ok(container)
        })
    }

    /// The container (deleted or not) with its latest table profile and
    /// each column's latest profile attached.
    pub fn get_latest_table_profile(&self, fqn: &str, authorized: bool) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let mut container = fetch_by_name(uow, fqn, Include::All, FieldSet::of(&[Field::DataModel]))?;
            let series = uow.time_series();
            container.profile =
                series.get_latest_json(fqn, &extension_key(FacetKind::TableProfile, None))?;
            let column_key = extension_key(FacetKind::ColumnProfile, None);
            if let Some(tree) = container.columns_mut() {
                for column in tree.depth_first() {
                    let node = tree.node_mut(column);
                    node.profile = match node.fully_qualified_name.as_deref() {
                        Some(column_fqn) => series.get_latest_json(column_fqn, &column_key)?,
                        None => None,
                    };
                }
            }
            if !authorized {
                populate_tags(&uow.entities(), &mut container, true)?;
                container = self.masker.mask_table_profile(container);
            }
            Ok(container)
        })
    }

    /// Table profiles of `fqn` within `range`, newest first.
    pub fn list_table_profiles(&self, fqn: &str, range: TimeRange) -> RepositoryResult<Vec<TableProfile>> {
        self.db.unit_of_work(|uow| {
            Ok(uow.time_series().list_between_json(
                fqn,
                &extension_key(FacetKind::TableProfile, None),
                range,
                SortOrder::Descending,
            )?)
        })
    }

    /// Profiles of one column within `range`, newest first, masked when the
    /// caller is not authorized to see PII.
    pub fn list_column_profiles(
        &self,
        column_fqn: &str,
        range: TimeRange,
        authorized: bool,
    ) -> RepositoryResult<Vec<ColumnProfile>> {
        self.db.unit_of_work(|uow| {
            let profiles = uow.time_series().list_between_json(
                column_fqn,
                &extension_key(FacetKind::ColumnProfile, None),
                range,
                SortOrder::Descending,
            )?;
            if authorized {
                return Ok(profiles);
            }
            let entities = uow.entities();
            let container_tags = owning_container_tags(&entities, column_fqn)?;
            let column_tags = entities.get_tags(column_fqn)?;
            Ok(self
                .masker
                .mask_column_profiles(column_fqn, &container_tags, &column_tags, profiles))
        })
    }

    pub fn list_system_profiles(&self, fqn: &str, range: TimeRange) -> RepositoryResult<Vec<SystemProfile>> {
        self.db.unit_of_work(|uow| {
            Ok(uow.time_series().list_between_json(
                fqn,
                &extension_key(FacetKind::SystemProfile, None),
                range,
                SortOrder::Descending,
            )?)
        })
    }

    /// Deletes the profile rows of `fqn` at `timestamp` for one scope
    /// (`table`, `container`, `column` or `system`). Returns how many rows
    /// were removed.
    pub fn delete_profile(&self, fqn: &str, scope: &str, timestamp: i64) -> RepositoryResult<usize> {
        let scope: ProfileScope = scope.parse()?;
        self.db.unit_of_work(|uow| {
            let removed = uow.time_series().delete_at(
                fqn,
                &extension_key(scope.facet_kind(), None),
                timestamp,
            )?;
            debug!(fqn, %scope, timestamp, removed, "profile deleted");
            Ok(removed)
        })
    }

    // ── Custom metrics ───────────────────────────────────────────

    /// Creates or replaces a custom metric, keyed by its scope and name.
    pub fn add_custom_metric(
        &self,
        id: EntityId,
        mut metric: CustomMetric,
        user: &str,
    ) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let container = fetch(uow, id, Include::NonDeleted, FieldSet::of(&[Field::DataModel]))?;
            if let Some(column) = metric.column_name.as_deref() {
                resolve_column(&container, column)?;
            }
            let key = extension_key(FacetKind::for_metric_scope(metric.scope()), Some(&metric.name));
            let extensions = uow.extensions();
            let existing: Option<CustomMetric> = extensions.get_json(id, &key)?;
            metric.id = existing
                .and_then(|m| m.id)
                .or(metric.id)
                .or_else(|| Some(EntityId::new()));
            metric.updated_at = now_millis();
            metric.updated_by = user.to_string();
            extensions.put_json(id, &key, &metric)?;
            debug!(container_id = %id, key = %key, "custom metric stored");
            fetch(uow, id, Include::NonDeleted, metric_fields())
        })
    }

    /// Removes exactly one metric; other scopes and names are untouched.
    pub fn delete_custom_metric(
        &self,
        id: EntityId,
        column: Option<&str>,
        name: &str,
    ) -> RepositoryResult<Container> {
        self.db.unit_of_work(|uow| {
            let container = fetch(uow, id, Include::NonDeleted, FieldSet::of(&[Field::DataModel]))?;
            if let Some(column) = column {
                resolve_column(&container, column)?;
            }
            let kind = FacetKind::for_metric_scope(MetricScope::from_column(column));
            let key = extension_key(kind, Some(name));
            let removed = uow.extensions().delete(id, &key)?;
            debug!(container_id = %id, key = %key, removed, "custom metric deleted");
            fetch(uow, id, Include::NonDeleted, metric_fields())
        })
    }

    /// The container's own metrics, or those of exactly `column`.
    pub fn list_custom_metrics(
        &self,
        id: EntityId,
        column: Option<&str>,
    ) -> RepositoryResult<Vec<CustomMetric>> {
        self.db.unit_of_work(|uow| {
            load(&uow.entities(), id, Include::NonDeleted)?;
            read_custom_metrics(&uow.extensions(), id, column)
        })
    }

    // ── Tasks ────────────────────────────────────────────────────

    /// Applies a resolved task to the container its link names.
    ///
    /// The change goes through the same versioned update path as a patch.
    pub fn resolve_task(
        &self,
        link: &str,
        task_type: &str,
        new_value: &str,
        user: &str,
    ) -> RepositoryResult<Container> {
        let link: EntityLink = link.parse()?;
        let kind: TaskKind = task_type.parse()?;
        if link.entity_type != Container::ENTITY_TYPE {
            return Err(RepositoryError::Task(format!(
                "Entity link {link} does not target a container"
            )));
        }
        self.db.unit_of_work(|uow| {
            let original =
                fetch_by_name(uow, &link.entity_fqn, Include::NonDeleted, FieldSet::of(&UPDATE_FIELDS))?;
            let mut updated = self.tasks.resolve(original.clone(), &link, kind, new_value)?;
            updated.updated_by = user.to_string();
            let mut updater = ContainerUpdater::new(original, updated, Operation::Patch);
            let container = updater.update(uow)?;
            info!(link = %link, kind = ?kind, version = container.version, "task resolved");
            Ok(container)
        })
    }
}

fn metric_fields() -> FieldSet {
    FieldSet::of(&[Field::DataModel, Field::CustomMetrics])
}

fn exists(entities: &EntityStore<'_>, entity_type: &str, fqn: &str) -> RepositoryResult<bool> {
    match entities.find_by_name(entity_type, fqn, Include::All) {
        Ok(_) => Ok(true),
        Err(StorageError::NotFound(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Decodes a stored record. The row's version and deletion flag win over
/// the JSON body, and column FQNs are recomputed from the record's FQN.
fn decode(record: &EntityRecord) -> RepositoryResult<Container> {
    let mut container: Container = record.decode()?;
    container.version = record.version;
    container.deleted = record.deleted;
    container.fully_qualified_name = record.fqn.clone();
    if let Some(tree) = container.columns_mut() {
        tree.propagate_fqn(&record.fqn)?;
    }
    Ok(container)
}

/// Tags of the nearest container whose FQN prefixes `column_fqn`.
fn owning_container_tags(entities: &EntityStore<'_>, column_fqn: &str) -> RepositoryResult<Vec<TagLabel>> {
    let mut prefix = fqn::parent(column_fqn)?;
    while let Some(candidate) = prefix {
        match entities.find_by_name(Container::ENTITY_TYPE, &candidate, Include::All) {
            Ok(_) => return Ok(entities.get_tags(&candidate)?),
            Err(StorageError::NotFound(_)) => prefix = fqn::parent(&candidate)?,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Vec::new())
}

fn load(entities: &EntityStore<'_>, id: EntityId, include: Include) -> RepositoryResult<Container> {
    let record = entities.find(id, include).map_err(RepositoryError::from_lookup)?;
    decode(&record)
}

fn hydrate(uow: &UnitOfWork<'_>, record: &EntityRecord, fields: FieldSet) -> RepositoryResult<Container> {
    let mut container = decode(record)?;
    set_fields(uow, &mut container, fields)?;
    clear_fields(&mut container, fields);
    Ok(container)
}

fn fetch(uow: &UnitOfWork<'_>, id: EntityId, include: Include, fields: FieldSet) -> RepositoryResult<Container> {
    let record = uow.entities().find(id, include).map_err(RepositoryError::from_lookup)?;
    hydrate(uow, &record, fields)
}

fn fetch_by_name(
    uow: &UnitOfWork<'_>,
    fqn: &str,
    include: Include,
    fields: FieldSet,
) -> RepositoryResult<Container> {
    let record = uow
        .entities()
        .find_by_name(Container::ENTITY_TYPE, fqn, include)
        .map_err(RepositoryError::from_lookup)?;
    hydrate(uow, &record, fields)
}

/// The container FQN followed by every column FQN.
fn subjects(container: &Container) -> Vec<&str> {
    let mut subjects = vec![container.fully_qualified_name.as_str()];
    if let Some(tree) = container.columns() {
        subjects.extend(tree.iter().filter_map(|(_, node)| node.fully_qualified_name.as_deref()));
    }
    subjects
}

fn validate_profiler_config(container: &Container, config: &TableProfilerConfig) -> RepositoryResult<()> {
    for column in config.exclude_columns.iter().flatten() {
        resolve_column(container, column)?;
    }
    for column in config.include_columns.iter().flatten() {
        resolve_column(container, &column.column_name)?;
    }
    let (Some(sample_type), Some(sample)) = (config.profile_sample_type, config.profile_sample) else {
        return Ok(());
    };
    match sample_type {
        ProfileSampleType::Percentage if !(0.0..=100.0).contains(&sample) => Err(
            RepositoryError::Validation("Profile sample value must be between 0 and 100".to_string()),
        ),
        ProfileSampleType::Rows if !sample.is_finite() || sample < 0.0 || sample.fract() != 0.0 => {
            Err(RepositoryError::Validation(
                "Profile sample value must be a non-negative whole number of rows".to_string(),
            ))
        }
        _ => Ok(()),
    }
}
