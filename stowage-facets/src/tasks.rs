//! Task workflows: applying an accepted suggestion to a container.
//!
//! A task names its target with an [`EntityLink`] and carries a new value.
//! [`TaskDispatch`] picks the [`TaskResolver`] registered for the link's
//! field and the task's [`TaskKind`].

use crate::error::{RepositoryError, RepositoryResult};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use stowage_model::{Container, TagLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// `RequestDescription` / `UpdateDescription`.
    Description,
    /// `RequestTag` / `UpdateTag`.
    Tags,
}

impl FromStr for TaskKind {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RequestDescription" | "UpdateDescription" => Ok(Self::Description),
            "RequestTag" | "UpdateTag" => Ok(Self::Tags),
            other => Err(RepositoryError::Task(format!("Invalid task type {other}"))),
        }
    }
}

/// A parsed `<#E::type::fqn[::field[::arrayField[::arrayValue]]]>` link.
///
/// For a column the array field is the column path and the array value the
/// column attribute, e.g. `<#E::container::s3.bucket::dataModel::email::description>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLink {
    pub entity_type: String,
    pub entity_fqn: String,
    pub field_name: Option<String>,
    pub array_field: Option<String>,
    pub array_value: Option<String>,
}

impl FromStr for EntityLink {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RepositoryError::Task(format!("Invalid entity link {s}"));
        let inner = s
            .strip_prefix("<#E::")
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(invalid)?;
        let parts: Vec<&str> = inner.split("::").collect();
        if parts.len() < 2 || parts.len() > 5 || parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }
        let part = |i: usize| parts.get(i).map(|p| p.to_string());
        Ok(Self {
            entity_type: parts[0].to_string(),
            entity_fqn: parts[1].to_string(),
            field_name: part(2),
            array_field: part(3),
            array_value: part(4),
        })
    }
}

impl fmt::Display for EntityLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<#E::{}::{}", self.entity_type, self.entity_fqn)?;
        for part in [&self.field_name, &self.array_field, &self.array_value]
            .into_iter()
            .flatten()
        {
            write!(f, "::{part}")?;
        }
        f.write_str(">")
    }
}

/// Applies a task's new value to a loaded container.
pub trait TaskResolver: Send + Sync {
    fn resolve(
        &self,
        container: Container,
        link: &EntityLink,
        new_value: &str,
    ) -> RepositoryResult<Container>;
}

/// Sets the description of the linked column.
pub struct ColumnDescriptionResolver;

impl TaskResolver for ColumnDescriptionResolver {
    fn resolve(
        &self,
        mut container: Container,
        link: &EntityLink,
        new_value: &str,
    ) -> RepositoryResult<Container> {
        let column = link_column(link)?;
        let tree = container
            .columns_mut()
            .ok_or_else(|| RepositoryError::invalid_column(column))?;
        let id = tree
            .resolve(column)
            .ok_or_else(|| RepositoryError::invalid_column(column))?;
        tree.node_mut(id).description = Some(new_value.to_string());
        Ok(container)
    }
}

/// Replaces the tags of the linked column. The new value is a JSON array of
/// tag labels.
pub struct ColumnTagsResolver;

impl TaskResolver for ColumnTagsResolver {
    fn resolve(
        &self,
        mut container: Container,
        link: &EntityLink,
        new_value: &str,
    ) -> RepositoryResult<Container> {
        let column = link_column(link)?;
        let tags: Vec<TagLabel> = serde_json::from_str(new_value)?;
        let tree = container
            .columns_mut()
            .ok_or_else(|| RepositoryError::invalid_column(column))?;
        let id = tree
            .resolve(column)
            .ok_or_else(|| RepositoryError::invalid_column(column))?;
        tree.node_mut(id).tags = tags;
        Ok(container)
    }
}

fn link_column(link: &EntityLink) -> RepositoryResult<&str> {
    link.array_field
        .as_deref()
        .ok_or_else(|| RepositoryError::Task(format!("Entity link {link} does not name a column")))
}

/// Resolvers keyed by `(field name, task kind)`.
pub struct TaskDispatch {
    resolvers: HashMap<(String, TaskKind), Box<dyn TaskResolver>>,
}

impl TaskDispatch {
    /// A table with no resolvers registered.
    pub fn empty() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        field_name: impl Into<String>,
        kind: TaskKind,
        resolver: Box<dyn TaskResolver>,
    ) {
        self.resolvers.insert((field_name.into(), kind), resolver);
    }

    pub fn resolver(&self, field_name: &str, kind: TaskKind) -> RepositoryResult<&dyn TaskResolver> {
        self.resolvers
            .get(&(field_name.to_string(), kind))
            .map(|r| &**r)
            .ok_or_else(|| {
                RepositoryError::Task(format!("No {kind:?} task resolver for field {field_name}"))
            })
    }

    /// Runs the resolver matching the link's field and `kind`.
    pub fn resolve(
        &self,
        container: Container,
        link: &EntityLink,
        kind: TaskKind,
        new_value: &str,
    ) -> RepositoryResult<Container> {
        let field = link
            .field_name
            .as_deref()
            .ok_or_else(|| RepositoryError::Task(format!("Entity link {link} does not name a field")))?;
        self.resolver(field, kind)?.resolve(container, link, new_value)
    }
}

impl Default for TaskDispatch {
    /// Column description and column tag resolvers under `dataModel`.
    fn default() -> Self {
        let mut dispatch = Self::empty();
        dispatch.register("dataModel", TaskKind::Description, Box::new(ColumnDescriptionResolver));
        dispatch.register("dataModel", TaskKind::Tags, Box::new(ColumnTagsResolver));
        dispatch
    }
}
