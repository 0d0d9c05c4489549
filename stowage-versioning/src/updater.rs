//! Applies an update to a stored container.
//!
//! One updater handles one update: it is built from the loaded original and
//! the caller's snapshot, diffs them, and persists the result inside the
//! caller's unit of work. Each step checks [`UpdateState`], so steps cannot
//! run out of order or twice.

use crate::changeset::{Changeset, VersionBump};
use crate::diff::diff_containers;
use crate::error::{VersioningError, VersioningResult};
use std::collections::HashMap;
use stowage_model::{Container, EntityKind, EntityReference};
use stowage_storage::{EntityStore, Include, Relationship, StorageError, TimeSeriesStore, UnitOfWork};
use stowage_types::EntityId;
use tracing::{debug, info};

/// How the updated snapshot was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Full replacement. A missing service or parent is taken from the original;
    /// a different one is rejected.
    Put,
    /// Partial update. Service and parent always come from the original.
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    /// Original and updated snapshots are in hand.
    Loaded,
    /// The changeset has been computed.
    Diffing,
    /// Writes are in progress.
    Persisting,
    /// Writes are done; the updater is spent.
    Committed,
}

pub struct ContainerUpdater {
    original: Container,
    updated: Container,
    operation: Operation,
    state: UpdateState,
    changes: Changeset,
}

impl ContainerUpdater {
    pub fn new(original: Container, mut updated: Container, operation: Operation) -> Self {
        match operation {
            Operation::Patch => {
                updated.service = original.service.clone();
                updated.parent = original.parent.clone();
            }
            Operation::Put => {
                if updated.service.is_none() {
                    updated.service = original.service.clone();
                }
                if updated.parent.is_none() {
                    updated.parent = original.parent.clone();
                }
            }
        }
        updated.id = original.id;
        updated.version = original.version;
        Self {
            original,
            updated,
            operation,
            state: UpdateState::Loaded,
            changes: Changeset::new(),
        }
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn changeset(&self) -> &Changeset {
        &self.changes
    }

    pub fn bump(&self) -> VersionBump {
        self.changes.bump()
    }

    /// Computes the changeset.
    ///
    /// FQNs of the updated snapshot are recomputed first, so a rename shows
    /// up as a `name` change with every column FQN already moved. A container
    /// cannot move to another service or parent.
    pub fn diff(&mut self) -> VersioningResult<&Changeset> {
        self.expect(UpdateState::Loaded, "diff")?;
        if !same_ref(&self.original.service, &self.updated.service) {
            return Err(VersioningError::Immutable("service"));
        }
        if !same_ref(&self.original.parent, &self.updated.parent) {
            return Err(VersioningError::Immutable("parent"));
        }
        let prefix = self
            .updated
            .fqn_prefix()
            .ok_or_else(|| VersioningError::Orphan(self.original.fully_qualified_name.clone()))?
            .to_string();
        self.updated.assign_fqn(&prefix)?;
        self.changes = diff_containers(&self.original, &self.updated)?;
        self.state = UpdateState::Diffing;
        debug!(
            container_id = %self.original.id,
            changes = self.changes.len(),
            bump = ?self.changes.bump(),
            "container diffed"
        );
        Ok(&self.changes)
    }

    /// Writes the update and returns the container as now stored.
    ///
    /// Fails with [`StorageError::Conflict`] when the stored version is no
    /// longer the one the original was loaded at. Without any change nothing
    /// is written. Minor-only changes are stored without a version bump or
    /// history row.
    pub fn persist(&mut self, uow: &UnitOfWork<'_>) -> VersioningResult<Container> {
        self.expect(UpdateState::Diffing, "persist")?;
        self.state = UpdateState::Persisting;
        let entities = uow.entities();

        let id = self.original.id;
        let stored_version = entities
            .current_version(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if stored_version != self.original.version {
            return Err(StorageError::Conflict {
                expected: self.original.version,
                actual: stored_version,
            }
            .into());
        }

        let mut result = self.updated.clone();
        if self.changes.is_empty() {
            result.updated_at = self.original.updated_at;
            result.updated_by = self.original.updated_by.clone();
            result.change_description = self.original.change_description.clone();
            self.state = UpdateState::Committed;
            return Ok(result);
        }

        let bump = self.changes.bump();
        result.version = bump.apply(self.original.version);
        result.updated_at = stowage_types::now_millis();
        result.change_description = Some(self.changes.describe(self.original.version));

        let record = result.strip_for_storage().to_record()?;
        entities.store(&record)?;
        reapply_tags(&entities, Some(&self.original), &result)?;
        if result.fully_qualified_name != self.original.fully_qualified_name {
            let series = uow.time_series();
            for (from, to) in fqn_moves(&self.original, &result) {
                series.rename_subject(&from, &to)?;
            }
            let moved = move_descendants(&entities, &series, id, &result.fully_qualified_name)?;
            debug!(
                container_id = %id,
                from = %self.original.fully_qualified_name,
                to = %result.fully_qualified_name,
                descendants = moved,
                "container renamed"
            );
        }
        if bump != VersionBump::None {
            entities.store_version(
                id,
                result.version,
                &record.json,
                result.change_description.as_ref(),
                result.updated_at,
            )?;
        }

        self.state = UpdateState::Committed;
        info!(
            container_id = %id,
            fqn = %result.fully_qualified_name,
            version = result.version,
            "container updated"
        );
        Ok(result)
    }

    /// Runs [`diff`](Self::diff) then [`persist`](Self::persist).
    pub fn update(&mut self, uow: &UnitOfWork<'_>) -> VersioningResult<Container> {
        self.diff()?;
        self.persist(uow)
    }

    fn expect(&self, state: UpdateState, step: &'static str) -> VersioningResult<()> {
        if self.state != state {
            return Err(VersioningError::InvalidState { step, state: self.state });
        }
        Ok(())
    }
}

/// Replaces tag usage for a container and its columns.
///
/// Usage is cleared at every FQN `previous` had (which covers renames and
/// removed columns) before the current tags are applied.
pub fn reapply_tags(
    entities: &EntityStore<'_>,
    previous: Option<&Container>,
    container: &Container,
) -> VersioningResult<()> {
    for target in previous.into_iter().chain([container]).flat_map(tag_targets) {
        entities.delete_tags(target)?;
    }
    for tag in &container.tags {
        entities.apply_tag(&container.fully_qualified_name, tag)?;
    }
    if let Some(columns) = container.columns() {
        for (_, node) in columns.iter() {
            if let Some(column_fqn) = &node.fully_qualified_name {
                for tag in &node.tags {
                    entities.apply_tag(column_fqn, tag)?;
                }
            }
        }
    }
    Ok(())
}

/// The container FQN followed by every column FQN.
fn tag_targets(container: &Container) -> Vec<&str> {
    let mut targets = vec![container.fully_qualified_name.as_str()];
    if let Some(columns) = container.columns() {
        targets.extend(columns.iter().filter_map(|(_, n)| n.fully_qualified_name.as_deref()));
    }
    targets
}

fn same_ref(a: &Option<EntityReference>, b: &Option<EntityReference>) -> bool {
    a.as_ref().map(|r| r.id) == b.as_ref().map(|r| r.id)
}

/// Old and new FQN of the container and of every column present in both
/// snapshots, matched by path. Unchanged pairs are left out.
fn fqn_moves(before: &Container, after: &Container) -> Vec<(String, String)> {
    let mut moves = vec![(
        before.fully_qualified_name.clone(),
        after.fully_qualified_name.clone(),
    )];
    if let (Some(old), Some(new)) = (before.columns(), after.columns()) {
        let targets: HashMap<Vec<&str>, &str> = new
            .iter()
            .filter_map(|(id, n)| Some((new.relative_path(id), n.fully_qualified_name.as_deref()?)))
            .collect();
        for (id, node) in old.iter() {
            let target = targets.get(&old.relative_path(id));
            if let (Some(from), Some(to)) = (node.fully_qualified_name.as_deref(), target) {
                moves.push((from.to_string(), (*to).to_string()));
            }
        }
    }
    moves.retain(|(from, to)| from != to);
    moves
}

/// Re-homes every container beneath `root` under its new FQN, carrying tag
/// usage and time series along. Descendants keep their version.
fn move_descendants(
    entities: &EntityStore<'_>,
    series: &TimeSeriesStore<'_>,
    root: EntityId,
    root_fqn: &str,
) -> VersioningResult<usize> {
    let mut pending = vec![(root, root_fqn.to_string())];
    let mut moved = 0;
    while let Some((parent, parent_fqn)) = pending.pop() {
        for child in entities.get_to(parent, Relationship::Contains, Container::ENTITY_TYPE)? {
            let record = entities.find(child.id, Include::All)?;
            let mut before: Container = record.decode()?;
            before.version = record.version;
            before.deleted = record.deleted;
            before.updated_at = record.updated_at;
            before.updated_by = record.updated_by.clone();
            before.fully_qualified_name = record.fqn.clone();
            if let Some(tree) = before.columns_mut() {
                tree.propagate_fqn(&record.fqn)?;
            }

            let mut after = before.clone();
            after.assign_fqn(&parent_fqn)?;
            let moves = fqn_moves(&before, &after);
            if moves.is_empty() {
                continue;
            }
            entities.store(&after.strip_for_storage().to_record()?)?;
            for (from, to) in &moves {
                let tags = entities.get_tags(from)?;
                entities.delete_tags(from)?;
                for tag in &tags {
                    entities.apply_tag(to, tag)?;
                }
                series.rename_subject(from, to)?;
            }
            moved += 1;
            pending.push((child.id, after.fully_qualified_name));
        }
    }
    Ok(moved)
}
