//! Extension-name taxonomy.
//!
//! Facets are stored outside the primary record under composed string keys.
//! These keys are shared with data written by other tooling and must stay
//! bit-exact:
//!
//! | facet | key |
//! |---|---|
//! | profiler config | `container.tableProfilerConfig` |
//! | table profile | `container.tableProfile` |
//! | column profile | `container.columnProfile` |
//! | system profile | `container.systemProfile` |
//! | structured sample | `container.sampleData` |
//! | unstructured sample | `container.unstructured_sampleData` |
//! | table metric | `customMetrics.container.table.<metricName>` |
//! | column metric | `customMetrics.container.column.<metricName>` |

use crate::{Container, EntityKind, MetricScope};
use std::fmt;
use std::str::FromStr;

/// Leading segment of every custom-metric key.
pub const CUSTOM_METRICS_PREFIX: &str = "customMetrics";

/// The kinds of facet an entity can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    TableProfilerConfig,
    TableProfile,
    ColumnProfile,
    SystemProfile,
    SampleData,
    UnstructuredSampleData,
    TableCustomMetric,
    ColumnCustomMetric,
}

impl FacetKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::TableProfilerConfig => "tableProfilerConfig",
            Self::TableProfile => "tableProfile",
            Self::ColumnProfile => "columnProfile",
            Self::SystemProfile => "systemProfile",
            Self::SampleData => "sampleData",
            Self::UnstructuredSampleData => "unstructured_sampleData",
            Self::TableCustomMetric => "table",
            Self::ColumnCustomMetric => "column",
        }
    }

    pub fn is_custom_metric(self) -> bool {
        matches!(self, Self::TableCustomMetric | Self::ColumnCustomMetric)
    }

    /// The metric kind matching a scope.
    pub fn for_metric_scope(scope: MetricScope<'_>) -> Self {
        match scope {
            MetricScope::Table => Self::TableCustomMetric,
            MetricScope::Column(_) => Self::ColumnCustomMetric,
        }
    }
}

/// Derives the extension key for a facet.
///
/// `metric_name` only matters for the custom-metric kinds: with a name it
/// yields that metric's key, without one it yields the shared prefix (ending
/// in the separator) used to enumerate every metric of that kind. It is
/// ignored for every other kind.
pub fn extension_key(kind: FacetKind, metric_name: Option<&str>) -> String {
    let entity = Container::ENTITY_TYPE;
    if kind.is_custom_metric() {
        let base = format!("{CUSTOM_METRICS_PREFIX}.{entity}.{}.", kind.suffix());
        match metric_name {
            Some(name) => format!("{base}{name}"),
            None => base,
        }
    } else {
        format!("{entity}.{}", kind.suffix())
    }
}

/// Which time-series profile a delete targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileScope {
    Table,
    Column,
    System,
}

impl ProfileScope {
    pub fn facet_kind(self) -> FacetKind {
        match self {
            Self::Table => FacetKind::TableProfile,
            Self::Column => FacetKind::ColumnProfile,
            Self::System => FacetKind::SystemProfile,
        }
    }
}

impl fmt::Display for ProfileScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::System => "system",
        };
        f.write_str(s)
    }
}

/// A profile scope tag outside `{table, column, system}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported profile scope {0:?}: must be one of {{table, column, system}}")]
pub struct UnknownProfileScope(pub String);

impl FromStr for ProfileScope {
    type Err = UnknownProfileScope;

    /// Case-insensitive. The entity type name is accepted as an alias for
    /// `table`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "table" => Ok(Self::Table),
            l if l == Container::ENTITY_TYPE => Ok(Self::Table),
            "column" => Ok(Self::Column),
            "system" => Ok(Self::System),
            _ => Err(UnknownProfileScope(s.to_string())),
        }
    }
}
