use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;
use stowage_cli::{CliConfig, format_millis, open_repository};
use stowage_facets::{ContainerRepository, FieldSet};
use stowage_model::{
    Column, ContainerDataModel, CreateContainer, CreateTableProfile, SampleData, TableData,
    TableProfile, TagLabel,
};
use stowage_storage::{Include, JournalMode, StoreConfig};
use stowage_types::TimeRange;
use stowage_versioning::Operation;
use tempfile::TempDir;

const USER: &str = "admin";

fn make_repository(dir: &TempDir) -> ContainerRepository {
    let config = CliConfig::default().with_db(Some(dir.path().join("catalog.db")));
    let repo = open_repository(&config).unwrap();
    repo.create_service("s3", "S3", USER).unwrap();
    repo
}

fn write_json<T: serde::Serialize>(dir: &TempDir, name: &str, value: &T) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn make_request(name: &str) -> CreateContainer {
    let mut request = CreateContainer::new(name, "s3");
    request.data_model = Some(ContainerDataModel {
        is_partitioned: false,
        columns: vec![
            Column::new("id", "INT"),
            Column::new("email", "STRING").with_tags(vec![TagLabel::classification("Custom.Secret")]),
        ]
        .into(),
    });
    request
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn empty_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stowage.json");
    std::fs::write(&path, "{}").unwrap();

    let config = CliConfig::load(&path).unwrap();
    assert_eq!(config, CliConfig::default());
    assert_eq!(config.store.path, None);
    assert_eq!(config.masking.sensitive_tag, "PII.Sensitive");
}

#[test]
fn config_sections_are_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stowage.json");
    std::fs::write(
        &path,
        r#"{"store": {"path": "/tmp/x.db", "journal_mode": "delete"}, "masking": {"sensitive_tag": "Custom.Secret"}}"#,
    )
    .unwrap();

    let config = CliConfig::load(&path).unwrap();
    assert_eq!(config.store.path, Some(PathBuf::from("/tmp/x.db")));
    assert_eq!(config.store.journal_mode, JournalMode::Delete);
    assert_eq!(config.masking.sensitive_tag, "Custom.Secret");
}

#[test]
fn db_flag_overrides_config_path() {
    let config = CliConfig {
        store: StoreConfig::at("/tmp/a.db"),
        ..CliConfig::default()
    };
    assert_eq!(config.clone().with_db(None).store.path, Some(PathBuf::from("/tmp/a.db")));
    assert_eq!(
        config.with_db(Some("/tmp/b.db".into())).store.path,
        Some(PathBuf::from("/tmp/b.db"))
    );
}

#[test]
fn missing_or_malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    assert!(CliConfig::load(&dir.path().join("absent.json")).is_err());

    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = CliConfig::load(&path).unwrap_err();
    assert_eq!(err.to_string(), "Failed to parse config");
}

#[test]
fn millis_render_as_rfc3339() {
    assert_eq!(format_millis(0), "1970-01-01T00:00:00.000Z");
    assert_eq!(format_millis(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
}

// ── Commands ─────────────────────────────────────────────────────

#[test]
fn store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let repo = make_repository(&dir);
        let request = write_json(&dir, "request.json", &make_request("bucket"));
        let created = stowage_cli::create_container(&repo, &request, USER).unwrap();
        assert_eq!(created.fully_qualified_name, "s3.bucket");
    }

    let config = CliConfig::default().with_db(Some(dir.path().join("catalog.db")));
    let repo = open_repository(&config).unwrap();
    let listed = stowage_cli::list_containers(&repo, false).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].fqn, "s3.bucket");
    assert_eq!(listed[0].version, 0.1);
    assert_eq!(listed[0].updated_by, USER);
}

#[test]
fn list_hides_deleted_unless_asked() {
    let dir = TempDir::new().unwrap();
    let repo = make_repository(&dir);
    let c = repo.create_container(make_request("old"), USER).unwrap();
    repo.create_container(make_request("new"), USER).unwrap();
    repo.delete_container(c.id, false).unwrap();

    let live: Vec<_> = stowage_cli::list_containers(&repo, false)
        .unwrap()
        .into_iter()
        .map(|s| s.fqn)
        .collect();
    assert_eq!(live, vec!["s3.new"]);
    assert_eq!(stowage_cli::list_containers(&repo, true).unwrap().len(), 2);
}

#[test]
fn show_parses_field_list() {
    let dir = TempDir::new().unwrap();
    let repo = make_repository(&dir);
    repo.create_container(make_request("bucket"), USER).unwrap();

    let bare = stowage_cli::show(&repo, "s3.bucket", "").unwrap();
    assert!(bare.data_model.is_none());
    let full = stowage_cli::show(&repo, "s3.bucket", "*").unwrap();
    assert!(full.data_model.is_some());
    let some = stowage_cli::show(&repo, "s3.bucket", "dataModel").unwrap();
    assert!(some.data_model.is_some());

    assert!(stowage_cli::show(&repo, "s3.bucket", "owners").is_err());
    assert!(stowage_cli::show(&repo, "s3.missing", "").is_err());
}

#[test]
fn history_lists_changed_fields_newest_first() {
    let dir = TempDir::new().unwrap();
    let repo = make_repository(&dir);
    let c = repo.create_container(make_request("bucket"), USER).unwrap();
    let mut updated = repo
        .get_container(c.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    updated.description = Some("raw events".into());
    repo.update_container(c.id, updated, Operation::Put, "editor").unwrap();

    let lines = stowage_cli::history(&repo, "s3.bucket").unwrap();
    let versions: Vec<f64> = lines.iter().map(|l| l.version).collect();
    assert_eq!(versions, vec![0.2, 0.1]);
    assert_eq!(lines[0].added, vec!["description"]);
    assert!(lines[0].updated_at.ends_with('Z'));
}

#[test]
fn extensions_report_names_and_sizes() {
    let dir = TempDir::new().unwrap();
    let repo = make_repository(&dir);
    let c = repo.create_container(make_request("bucket"), USER).unwrap();
    repo.add_unstructured_sample_data(c.id, "hello").unwrap();

    let lines = stowage_cli::extensions(&repo, "s3.bucket").unwrap();
    let text = lines
        .iter()
        .find(|l| l.extension == "container.unstructured_sampleData")
        .unwrap();
    assert_eq!(text.bytes, 5);
}

#[test]
fn profile_file_is_recorded_and_listed() {
    let dir = TempDir::new().unwrap();
    let repo = make_repository(&dir);
    repo.create_container(make_request("bucket"), USER).unwrap();
    let run = CreateTableProfile {
        table_profile: TableProfile {
            timestamp: 1_000,
            row_count: Some(42.0),
            ..TableProfile::default()
        },
        column_profile: vec![],
        system_profile: None,
    };
    let path = write_json(&dir, "run.json", &run);

    stowage_cli::add_profile(&repo, "s3.bucket", &path).unwrap();
    let report = stowage_cli::profiles(&repo, "s3.bucket", TimeRange::new(0, 2_000).unwrap()).unwrap();
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.table[0].row_count, Some(42.0));
    assert!(report.system.is_empty());

    let outside = stowage_cli::profiles(&repo, "s3.bucket", TimeRange::new(5_000, 6_000).unwrap()).unwrap();
    assert!(outside.table.is_empty());
}

#[test]
fn sample_masks_with_configured_tag() {
    let dir = TempDir::new().unwrap();
    let mut config = CliConfig::default().with_db(Some(dir.path().join("catalog.db")));
    config.masking.sensitive_tag = "Custom.Secret".into();
    let repo = open_repository(&config).unwrap();
    repo.create_service("s3", "S3", USER).unwrap();
    let c = repo.create_container(make_request("bucket"), USER).unwrap();
    let data = TableData {
        columns: vec!["id".into(), "email".into()],
        rows: vec![vec![json!(1), json!("a@x.io")]],
    };
    repo.add_sample_data(c.id, data.clone()).unwrap();

    let open = stowage_cli::sample(&repo, "s3.bucket", true).unwrap();
    assert_eq!(open, Some(SampleData::Structured(data)));
    let masked = stowage_cli::sample(&repo, "s3.bucket", false).unwrap().unwrap();
    assert_eq!(masked.as_table().unwrap().rows, vec![vec![json!(1), json!("********")]]);
}
