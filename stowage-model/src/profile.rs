//! Profiler configuration, profile snapshots and sample data.

use serde::{Deserialize, Serialize};

/// How the profiler samples a container's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileSampleType {
    /// `profile_sample` is a percentage in `[0, 100]`.
    Percentage,
    /// `profile_sample` is an absolute row count.
    Rows,
}

/// Per-column profiler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfilerConfig {
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionProfilerConfig {
    #[serde(default)]
    pub enable_partitioning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_interval_unit: Option<String>,
}

/// Profiler configuration stored under `container.tableProfilerConfig`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProfilerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_sample_type: Option<ProfileSampleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_sample: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_columns: Option<Vec<ColumnProfilerConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitioning: Option<PartitionProfilerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data_count: Option<i64>,
}

/// A container-level profile snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProfile {
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_byte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_sample: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_sample_type: Option<ProfileSampleType>,
}

/// A column-level profile snapshot. `name` uses the profiler's plain
/// `parent.child` naming for nested columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_proportion: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<serde_json::Value>,
}

impl ColumnProfile {
    /// Drops every statistic that can reveal column values, keeping counts.
    pub fn redact_values(&mut self) {
        self.min = None;
        self.max = None;
        self.mean = None;
        self.median = None;
        self.stddev = None;
        self.histogram = None;
    }
}

/// Kind of data-modification operation a system profile reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DmlOperation {
    Insert,
    Update,
    Delete,
    Write,
}

impl DmlOperation {
    /// The operation tag stored alongside system-profile rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Write => "WRITE",
        }
    }
}

/// A system-level volume measurement. Several operations may share one
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemProfile {
    pub timestamp: i64,
    pub operation: DmlOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<i64>,
}

/// One profiler run: table profile plus its column and system profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableProfile {
    pub table_profile: TableProfile,
    #[serde(default)]
    pub column_profile: Vec<ColumnProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_profile: Option<Vec<SystemProfile>>,
}

/// Structured sample rows. Every row must hold exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Sample data attached to a container on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleData {
    Structured(TableData),
    Unstructured(String),
}

impl SampleData {
    pub fn as_table(&self) -> Option<&TableData> {
        match self {
            Self::Structured(data) => Some(data),
            Self::Unstructured(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Structured(_) => None,
            Self::Unstructured(text) => Some(text),
        }
    }
}
