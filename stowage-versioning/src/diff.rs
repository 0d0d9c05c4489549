//! Container diff.
//!
//! Compares two snapshots field by field and records a [`Changeset`].
//! Columns are matched by own name (case-insensitive) and data type within
//! their parent, and change entries are named by the column's path relative
//! to the container, so renaming an ancestor entity never marks descendants.

use crate::changeset::{diff_lists, Changeset};
use crate::error::VersioningResult;
use stowage_model::{ColumnId, ColumnTree, Container, TagLabel};
use stowage_types::fqn;

/// Fields recorded for history that never bump the version.
pub const MINOR_FIELDS: &[&str] = &["numberOfObjects", "size"];

const DATA_MODEL: &str = "dataModel";
const COLUMNS: &str = "dataModel.columns";

/// Computes the changeset between two snapshots of one container.
///
/// Pure and deterministic: the same pair always yields the same changeset,
/// and identical snapshots yield an empty one.
pub fn diff_containers(original: &Container, updated: &Container) -> VersioningResult<Changeset> {
    let mut changes = Changeset::new();

    changes.scalar("name", Some(&original.name), Some(&updated.name), false)?;
    changes.scalar(
        "displayName",
        original.display_name.as_ref(),
        updated.display_name.as_ref(),
        false,
    )?;
    changes.scalar(
        "description",
        original.description.as_ref(),
        updated.description.as_ref(),
        false,
    )?;
    diff_tags(&mut changes, "tags", &original.tags, &updated.tags)?;

    match (&original.data_model, &updated.data_model) {
        (Some(old), Some(new)) => {
            diff_columns(
                &mut changes,
                COLUMNS,
                &old.columns,
                old.columns.roots(),
                &new.columns,
                new.columns.roots(),
            )?;
            changes.scalar(
                "dataModel.partition",
                Some(&old.is_partitioned),
                Some(&new.is_partitioned),
                false,
            )?;
        }
        (old, new) => {
            changes.nested(DATA_MODEL, old.as_ref(), new.as_ref())?;
        }
    }

    changes.scalar("prefix", original.prefix.as_ref(), updated.prefix.as_ref(), false)?;

    let formats = diff_lists(&original.file_formats, &updated.file_formats, |a, b| a == b);
    changes.list("fileFormats", &formats.added, &formats.deleted)?;

    changes.scalar(
        "numberOfObjects",
        original.number_of_objects.as_ref(),
        updated.number_of_objects.as_ref(),
        is_minor("numberOfObjects"),
    )?;
    changes.scalar("size", original.size.as_ref(), updated.size.as_ref(), is_minor("size"))?;
    changes.scalar("sourceUrl", original.source_url.as_ref(), updated.source_url.as_ref(), false)?;
    changes.scalar("fullPath", original.full_path.as_ref(), updated.full_path.as_ref(), false)?;
    changes.scalar(
        "retentionPeriod",
        original.retention_period.as_ref(),
        updated.retention_period.as_ref(),
        false,
    )?;
    changes.scalar("sourceHash", original.source_hash.as_ref(), updated.source_hash.as_ref(), false)?;

    Ok(changes)
}

fn is_minor(field: &str) -> bool {
    MINOR_FIELDS.contains(&field)
}

fn diff_tags(
    changes: &mut Changeset,
    field: &str,
    original: &[TagLabel],
    updated: &[TagLabel],
) -> VersioningResult<()> {
    let tags = diff_lists(original, updated, TagLabel::same_tag);
    changes.list(field, &tags.added, &tags.deleted)?;
    Ok(())
}

/// Diffs one sibling level and recurses into matched columns.
///
/// Any column present in the original but unmatched in the update (removed,
/// or its data type changed) makes the changeset major.
fn diff_columns(
    changes: &mut Changeset,
    field: &str,
    old_tree: &ColumnTree,
    old_level: &[ColumnId],
    new_tree: &ColumnTree,
    new_level: &[ColumnId],
) -> VersioningResult<()> {
    let level = diff_lists(old_level, new_level, |&o, &n| {
        let (o, n) = (old_tree.node(o), new_tree.node(n));
        o.name.to_lowercase() == n.name.to_lowercase() && o.data_type == n.data_type
    });

    let added: Vec<_> = level.added.iter().map(|&&id| new_tree.to_column(id)).collect();
    let deleted: Vec<_> = level.deleted.iter().map(|&&id| old_tree.to_column(id)).collect();
    changes.list(field, &added.iter().collect::<Vec<_>>(), &deleted.iter().collect::<Vec<_>>())?;
    if !deleted.is_empty() {
        changes.mark_major();
    }

    for &(&old_id, &new_id) in &level.matched {
        let (old, new) = (old_tree.node(old_id), new_tree.node(new_id));
        let column_field = column_field(field, &new.name)?;

        changes.scalar(
            format!("{column_field}.description"),
            old.description.as_ref(),
            new.description.as_ref(),
            false,
        )?;
        changes.scalar(
            format!("{column_field}.displayName"),
            old.display_name.as_ref(),
            new.display_name.as_ref(),
            false,
        )?;
        changes.scalar(
            format!("{column_field}.dataLength"),
            old.data_length.as_ref(),
            new.data_length.as_ref(),
            false,
        )?;
        diff_tags(changes, &format!("{column_field}.tags"), &old.tags, &new.tags)?;

        diff_columns(
            changes,
            &column_field,
            old_tree,
            old_tree.children(old_id),
            new_tree,
            new_tree.children(new_id),
        )?;
    }
    Ok(())
}

fn column_field(parent_field: &str, name: &str) -> VersioningResult<String> {
    Ok(format!("{parent_field}{}{}", fqn::SEPARATOR, fqn::quote_name(name)?))
}
