//! Configuration and reports for the `stowage` command-line tool.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stowage_facets::{ContainerRepository, FieldSet, MaskingConfig, SensitiveTagMasker};
use stowage_model::{
    ChangeDescription, Container, CreateContainer, CreateTableProfile, FieldChange, SampleData,
    SystemProfile, TableProfile,
};
use stowage_storage::{Database, Include, StoreConfig};
use stowage_types::TimeRange;

/// Everything the CLI reads from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store: StoreConfig,
    pub masking: MaskingConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw).context("Failed to parse config")
    }

    /// Applies the `--db` override.
    #[must_use]
    pub fn with_db(mut self, db: Option<PathBuf>) -> Self {
        if let Some(path) = db {
            self.store.path = Some(path);
        }
        self
    }
}

pub fn open_repository(config: &CliConfig) -> Result<ContainerRepository> {
    let db = Database::open(&config.store).context("Failed to open database")?;
    let masker = SensitiveTagMasker::new(config.masking.clone());
    Ok(ContainerRepository::new(db).with_masker(Arc::new(masker)))
}

/// Renders epoch milliseconds as RFC 3339, or the raw number when out of range.
pub fn format_millis(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

// ── Writes ───────────────────────────────────────────────────────

/// Creates a container from a JSON `CreateContainer` request file.
pub fn create_container(repo: &ContainerRepository, request: &Path, user: &str) -> Result<Container> {
    let request: CreateContainer = read_json(request)?;
    let name = request.name.clone();
    repo.create_container(request, user)
        .with_context(|| format!("Failed to create container {name}"))
}

/// Records a profiler run from a JSON `CreateTableProfile` file.
pub fn add_profile(repo: &ContainerRepository, fqn: &str, run: &Path) -> Result<Container> {
    let run: CreateTableProfile = read_json(run)?;
    let container = find(repo, fqn)?;
    repo.add_table_profile(container.id, run)
        .with_context(|| format!("Failed to record profile for {fqn}"))
}

// ── Reports ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    pub fqn: String,
    pub version: f64,
    pub deleted: bool,
    pub updated_by: String,
    pub updated_at: String,
}

pub fn list_containers(repo: &ContainerRepository, with_deleted: bool) -> Result<Vec<ContainerSummary>> {
    let include = if with_deleted { Include::All } else { Include::NonDeleted };
    let containers = repo.list_containers(include).context("Failed to list containers")?;
    Ok(containers
        .into_iter()
        .map(|c| ContainerSummary {
            fqn: c.fully_qualified_name,
            version: c.version,
            deleted: c.deleted,
            updated_by: c.updated_by,
            updated_at: format_millis(c.updated_at),
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLine {
    pub version: f64,
    pub updated_at: String,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
}

/// Version history of a container, newest first, with changed field names.
pub fn history(repo: &ContainerRepository, fqn: &str) -> Result<Vec<HistoryLine>> {
    let container = find(repo, fqn)?;
    let entries = repo
        .list_versions(container.id)
        .with_context(|| format!("Failed to read history of {fqn}"))?;
    let names = |changes: &[FieldChange]| changes.iter().map(|c| c.name.clone()).collect();
    Ok(entries
        .into_iter()
        .map(|entry| {
            let change = entry.change_description.unwrap_or_else(|| ChangeDescription::new(entry.version));
            HistoryLine {
                version: entry.version,
                updated_at: format_millis(entry.updated_at),
                added: names(&change.fields_added),
                updated: names(&change.fields_updated),
                deleted: names(&change.fields_deleted),
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionLine {
    pub extension: String,
    pub bytes: usize,
}

/// Every extension stored for a container, by name.
pub fn extensions(repo: &ContainerRepository, fqn: &str) -> Result<Vec<ExtensionLine>> {
    let container = find(repo, fqn)?;
    let records = repo
        .database()
        .unit_of_work(|uow| uow.extensions().get_all_with_prefix(container.id, ""))
        .context("Failed to read extensions")?;
    Ok(records
        .into_iter()
        .map(|r| ExtensionLine {
            extension: r.extension,
            bytes: r.json.len(),
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    pub table: Vec<TableProfile>,
    pub system: Vec<SystemProfile>,
}

pub fn profiles(repo: &ContainerRepository, fqn: &str, range: TimeRange) -> Result<ProfileReport> {
    Ok(ProfileReport {
        table: repo.list_table_profiles(fqn, range)?,
        system: repo.list_system_profiles(fqn, range)?,
    })
}

/// A container with the requested comma-separated `fields` populated.
pub fn show(repo: &ContainerRepository, fqn: &str, fields: &str) -> Result<Container> {
    let fields = match fields.trim() {
        "*" => FieldSet::all(),
        list => FieldSet::parse(list)?,
    };
    repo.get_container_by_name(fqn, fields, Include::NonDeleted)
        .with_context(|| format!("Container {fqn} not found"))
}

/// Sample data, masked unless `authorized`.
pub fn sample(repo: &ContainerRepository, fqn: &str, authorized: bool) -> Result<Option<SampleData>> {
    let container = find(repo, fqn)?;
    Ok(repo.get_sample_data(container.id, authorized)?.sample_data)
}

fn find(repo: &ContainerRepository, fqn: &str) -> Result<Container> {
    repo.get_container_by_name(fqn, FieldSet::empty(), Include::All)
        .with_context(|| format!("Container {fqn} not found"))
}
