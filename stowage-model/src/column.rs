//! The column hierarchy of a container's data model.
//!
//! On the wire a data model is a nested `Vec<Column>`. In memory it is a
//! [`ColumnTree`]: an arena of [`ColumnNode`]s addressed by [`ColumnId`] with
//! parent/child edges stored as indices. Traversals walk indices instead of
//! mutating shared nested structures, so a tree loaded for one operation can
//! be cloned or rebuilt without aliasing another.

use crate::{ColumnProfile, CustomMetric, TagLabel};
use serde::{Deserialize, Serialize};
use stowage_types::fqn;

/// Nested wire form of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ColumnProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_metrics: Option<Vec<CustomMetric>>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            data_type: data_type.into(),
            data_length: None,
            description: None,
            fully_qualified_name: None,
            tags: Vec::new(),
            children: Vec::new(),
            profile: None,
            custom_metrics: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Column>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<TagLabel>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Index of a node inside one [`ColumnTree`]. Only meaningful for the tree
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(usize);

/// One column in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNode {
    pub name: String,
    pub display_name: Option<String>,
    pub data_type: String,
    pub data_length: Option<i64>,
    pub description: Option<String>,
    pub fully_qualified_name: Option<String>,
    pub tags: Vec<TagLabel>,
    pub profile: Option<ColumnProfile>,
    pub custom_metrics: Option<Vec<CustomMetric>>,
    parent: Option<ColumnId>,
    children: Vec<ColumnId>,
}

impl ColumnNode {
    pub fn parent(&self) -> Option<ColumnId> {
        self.parent
    }

    pub fn children(&self) -> &[ColumnId] {
        &self.children
    }
}

/// Arena-backed column hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Column>", into = "Vec<Column>")]
pub struct ColumnTree {
    nodes: Vec<ColumnNode>,
    roots: Vec<ColumnId>,
}

impl ColumnTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> Self {
        let mut tree = Self::new();
        for column in columns {
            tree.insert(None, column);
        }
        tree
    }

    /// Rebuilds the nested wire form.
    pub fn to_columns(&self) -> Vec<Column> {
        self.roots.iter().map(|&id| self.to_column(id)).collect()
    }

    /// Adds a top-level column (with any nested children) and returns its id.
    pub fn push_root(&mut self, column: Column) -> ColumnId {
        self.insert(None, column)
    }

    /// Adds `column` (with any nested children) under `parent`.
    pub fn push_child(&mut self, parent: ColumnId, column: Column) -> ColumnId {
        self.insert(Some(parent), column)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[ColumnId] {
        &self.roots
    }

    pub fn get(&self, id: ColumnId) -> Option<&ColumnNode> {
        self.nodes.get(id.0)
    }

    /// Returns the node for an id produced by this tree.
    ///
    /// # Panics
    /// Panics if `id` came from a different tree and is out of range.
    pub fn node(&self, id: ColumnId) -> &ColumnNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: ColumnId) -> &mut ColumnNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: ColumnId) -> &[ColumnId] {
        &self.nodes[id.0].children
    }

    /// All node ids in depth-first pre-order; a parent always precedes its
    /// children.
    pub fn depth_first(&self) -> Vec<ColumnId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ColumnId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Iterates `(id, node)` pairs in depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &ColumnNode)> + '_ {
        self.depth_first().into_iter().map(move |id| (id, &self.nodes[id.0]))
    }

    /// Resolves a dotted column path (relative to the container) to a node.
    ///
    /// Each segment is matched against the *own name* of the nodes at that
    /// level, descending into children until the path is exhausted. Quoted
    /// segments may contain the separator.
    pub fn resolve(&self, path: &str) -> Option<ColumnId> {
        let names = fqn::split(path).ok()?;
        let mut level: &[ColumnId] = &self.roots;
        let mut found = None;
        for name in &names {
            let id = level.iter().copied().find(|&id| self.nodes[id.0].name == *name)?;
            found = Some(id);
            level = &self.nodes[id.0].children;
        }
        found
    }

    /// Resolves a name built by plain `parent.child` concatenation, the
    /// convention profiler payloads use for nested columns.
    pub fn resolve_profile_name(&self, name: &str) -> Option<ColumnId> {
        self.depth_first()
            .into_iter()
            .find(|&id| self.relative_path(id).join(".") == name)
    }

    /// Finds the node whose computed FQN equals `fqn`.
    pub fn find_by_fqn(&self, fqn: &str) -> Option<ColumnId> {
        self.nodes
            .iter()
            .position(|n| n.fully_qualified_name.as_deref() == Some(fqn))
            .map(ColumnId)
    }

    /// Own names from the root down to `id`.
    pub fn relative_path(&self, id: ColumnId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            names.push(node.name.as_str());
            cursor = node.parent;
        }
        names.reverse();
        names
    }

    /// Recomputes every node's FQN beneath `parent_fqn`.
    pub fn propagate_fqn(&mut self, parent_fqn: &str) -> stowage_types::Result<()> {
        for id in self.depth_first() {
            let prefix = match self.nodes[id.0].parent {
                Some(parent) => self.nodes[parent.0]
                    .fully_qualified_name
                    .clone()
                    .unwrap_or_default(),
                None => parent_fqn.to_string(),
            };
            let column_fqn = fqn::add(&prefix, &self.nodes[id.0].name)?;
            self.nodes[id.0].fully_qualified_name = Some(column_fqn);
        }
        Ok(())
    }

    /// Deep copy with tags and read-time facets removed, for persisting.
    pub fn clone_structural_only(&self) -> ColumnTree {
        let mut tree = self.clone();
        for node in &mut tree.nodes {
            node.tags.clear();
            node.profile = None;
            node.custom_metrics = None;
        }
        tree
    }

    /// Every distinct tag applied anywhere in the tree, first occurrence wins.
    pub fn all_tags(&self) -> Vec<TagLabel> {
        let mut tags: Vec<TagLabel> = Vec::new();
        for (_, node) in self.iter() {
            for tag in &node.tags {
                if !tags.iter().any(|t| TagLabel::same_tag(t, tag)) {
                    tags.push(tag.clone());
                }
            }
        }
        tags
    }

    fn insert(&mut self, parent: Option<ColumnId>, column: Column) -> ColumnId {
        let Column {
            name,
            display_name,
            data_type,
            data_length,
            description,
            fully_qualified_name,
            tags,
            children,
            profile,
            custom_metrics,
        } = column;

        let id = ColumnId(self.nodes.len());
        self.nodes.push(ColumnNode {
            name,
            display_name,
            data_type,
            data_length,
            description,
            fully_qualified_name,
            tags,
            profile,
            custom_metrics,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        for child in children {
            self.insert(Some(id), child);
        }
        id
    }

    /// The subtree rooted at `id` in wire form.
    pub fn to_column(&self, id: ColumnId) -> Column {
        let node = &self.nodes[id.0];
        Column {
            name: node.name.clone(),
            display_name: node.display_name.clone(),
            data_type: node.data_type.clone(),
            data_length: node.data_length,
            description: node.description.clone(),
            fully_qualified_name: node.fully_qualified_name.clone(),
            tags: node.tags.clone(),
            children: node.children.iter().map(|&c| self.to_column(c)).collect(),
            profile: node.profile.clone(),
            custom_metrics: node.custom_metrics.clone(),
        }
    }
}

impl From<Vec<Column>> for ColumnTree {
    fn from(columns: Vec<Column>) -> Self {
        Self::from_columns(columns)
    }
}

impl From<ColumnTree> for Vec<Column> {
    fn from(tree: ColumnTree) -> Self {
        tree.to_columns()
    }
}
