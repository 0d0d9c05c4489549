use serde::{Deserialize, Serialize};
use stowage_types::EntityId;

/// A user-defined metric computed by the profiler.
///
/// Scoped to the whole container when `column_name` is absent, otherwise to
/// that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetric {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub updated_by: String,
}

impl CustomMetric {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            column_name: None,
            expression: expression.into(),
            description: None,
            owner: None,
            updated_at: 0,
            updated_by: String::new(),
        }
    }

    #[must_use]
    pub fn for_column(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    pub fn scope(&self) -> MetricScope<'_> {
        match &self.column_name {
            Some(column) => MetricScope::Column(column),
            None => MetricScope::Table,
        }
    }
}

/// Where a custom metric applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricScope<'a> {
    Table,
    Column(&'a str),
}

impl<'a> MetricScope<'a> {
    pub fn from_column(column_name: Option<&'a str>) -> Self {
        column_name.map_or(Self::Table, Self::Column)
    }

    pub fn column_name(&self) -> Option<&'a str> {
        match self {
            Self::Table => None,
            Self::Column(name) => Some(name),
        }
    }
}
