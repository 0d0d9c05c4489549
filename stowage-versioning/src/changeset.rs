//! Field-level changes between two snapshots of an entity.

use serde::Serialize;
use serde_json::Value;
use stowage_model::{ChangeDescription, FieldChange};

/// What changed in one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    /// A plain value changed. `None` means the field was absent.
    Scalar { old: Option<Value>, new: Option<Value> },
    /// Items entered or left a list. At least one side is non-empty.
    List { added: Vec<Value>, deleted: Vec<Value> },
    /// A nested object appeared, disappeared, or was replaced wholesale.
    Nested { old: Option<Value>, new: Option<Value> },
}

/// One entry of a [`Changeset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub field: String,
    pub kind: ChangeKind,
    /// Recorded for history but does not bump the version.
    pub minor: bool,
}

/// How far a changeset moves the version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionBump {
    None,
    Minor,
    Major,
}

impl VersionBump {
    /// The version after this bump, rounded to one decimal.
    pub fn apply(self, version: f64) -> f64 {
        let next = match self {
            Self::None => version,
            Self::Minor => version + 0.1,
            Self::Major => version + 1.0,
        };
        (next * 10.0).round() / 10.0
    }
}

/// Ordered field changes plus whether any of them is breaking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    changes: Vec<Change>,
    major: bool,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn get(&self, field: &str) -> Option<&Change> {
        self.changes.iter().find(|c| c.field == field)
    }

    /// Flags the changeset as breaking (e.g. a column was removed).
    pub fn mark_major(&mut self) {
        self.major = true;
    }

    pub fn is_major(&self) -> bool {
        self.major
    }

    pub fn bump(&self) -> VersionBump {
        if self.major {
            VersionBump::Major
        } else if self.changes.iter().any(|c| !c.minor) {
            VersionBump::Minor
        } else {
            VersionBump::None
        }
    }

    /// Records `old -> new` when they differ. Returns whether a change was recorded.
    pub fn scalar<T: Serialize + PartialEq + ?Sized>(
        &mut self,
        field: impl Into<String>,
        old: Option<&T>,
        new: Option<&T>,
        minor: bool,
    ) -> serde_json::Result<bool> {
        if old == new {
            return Ok(false);
        }
        self.changes.push(Change {
            field: field.into(),
            kind: ChangeKind::Scalar {
                old: old.map(serde_json::to_value).transpose()?,
                new: new.map(serde_json::to_value).transpose()?,
            },
            minor,
        });
        Ok(true)
    }

    /// Records added and deleted list items when either is non-empty.
    pub fn list<T: Serialize>(
        &mut self,
        field: impl Into<String>,
        added: &[&T],
        deleted: &[&T],
    ) -> serde_json::Result<bool> {
        if added.is_empty() && deleted.is_empty() {
            return Ok(false);
        }
        self.changes.push(Change {
            field: field.into(),
            kind: ChangeKind::List {
                added: added.iter().map(serde_json::to_value).collect::<Result<_, _>>()?,
                deleted: deleted.iter().map(serde_json::to_value).collect::<Result<_, _>>()?,
            },
            minor: false,
        });
        Ok(true)
    }

    /// Records a whole-object replacement unless both sides are absent.
    pub fn nested<T: Serialize + ?Sized>(
        &mut self,
        field: impl Into<String>,
        old: Option<&T>,
        new: Option<&T>,
    ) -> serde_json::Result<bool> {
        if old.is_none() && new.is_none() {
            return Ok(false);
        }
        self.changes.push(Change {
            field: field.into(),
            kind: ChangeKind::Nested {
                old: old.map(serde_json::to_value).transpose()?,
                new: new.map(serde_json::to_value).transpose()?,
            },
            minor: false,
        });
        Ok(true)
    }

    /// Renders the audit form stored on the entity and in its history.
    pub fn describe(&self, previous_version: f64) -> ChangeDescription {
        let mut description = ChangeDescription::new(previous_version);
        for change in &self.changes {
            let name = change.field.clone();
            match &change.kind {
                ChangeKind::Scalar { old, new } | ChangeKind::Nested { old, new } => {
                    let entry = FieldChange {
                        name,
                        old_value: old.clone(),
                        new_value: new.clone(),
                    };
                    match (old, new) {
                        (None, _) => description.fields_added.push(entry),
                        (_, None) => description.fields_deleted.push(entry),
                        _ => description.fields_updated.push(entry),
                    }
                }
                ChangeKind::List { added, deleted } => {
                    if !added.is_empty() {
                        description.fields_added.push(FieldChange {
                            name: name.clone(),
                            old_value: None,
                            new_value: Some(Value::Array(added.clone())),
                        });
                    }
                    if !deleted.is_empty() {
                        description.fields_deleted.push(FieldChange {
                            name,
                            old_value: Some(Value::Array(deleted.clone())),
                            new_value: None,
                        });
                    }
                }
            }
        }
        description
    }
}

/// Result of matching two lists with a caller-supplied predicate.
#[derive(Debug)]
pub struct ListDiff<'a, T> {
    /// Items of the updated list with no match in the original.
    pub added: Vec<&'a T>,
    /// Items of the original list with no match in the updated list.
    pub deleted: Vec<&'a T>,
    /// `(original, updated)` pairs that matched.
    pub matched: Vec<(&'a T, &'a T)>,
}

/// Splits two lists into added, deleted and matched items.
///
/// Each updated item matches the first original item accepted by `matches`;
/// an original item is matched at most once.
pub fn diff_lists<'a, T>(
    original: &'a [T],
    updated: &'a [T],
    matches: impl Fn(&T, &T) -> bool,
) -> ListDiff<'a, T> {
    let mut used = vec![false; original.len()];
    let mut added = Vec::new();
    let mut matched = Vec::new();
    for item in updated {
        let hit = original
            .iter()
            .enumerate()
            .find(|(i, o)| !used[*i] && matches(o, item));
        match hit {
            Some((i, o)) => {
                used[i] = true;
                matched.push((o, item));
            }
            None => added.push(item),
        }
    }
    let deleted = original
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(o, _)| o)
        .collect();
    ListDiff { added, deleted, matched }
}
