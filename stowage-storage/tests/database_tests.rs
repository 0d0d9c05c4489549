use pretty_assertions::assert_eq;
use stowage_storage::{Database, JournalMode, StorageError, StoreConfig};
use stowage_types::EntityId;

// ── Units of work ────────────────────────────────────────────────

#[test]
fn failed_unit_of_work_rolls_back() {
    let db = Database::open_in_memory().unwrap();
    let owner = EntityId::new();
    let result: Result<(), StorageError> = db.unit_of_work(|uow| {
        uow.extensions().put(owner, "k", "v")?;
        uow.time_series().insert("s3.b", "container.tableProfile", 1, "{}")?;
        Err(StorageError::InvalidData("boom".into()))
    });
    assert!(result.is_err());

    let (ext, rows) = db
        .unit_of_work(|uow| {
            Ok::<_, StorageError>((
                uow.extensions().get(owner, "k")?,
                uow.time_series().count("s3.b", "container.tableProfile")?,
            ))
        })
        .unwrap();
    assert!(ext.is_none());
    assert_eq!(rows, 0);
}

#[test]
fn clones_share_one_database() {
    let db = Database::open_in_memory().unwrap();
    let other = db.clone();
    let owner = EntityId::new();
    db.unit_of_work(|uow| uow.extensions().put(owner, "k", "v")).unwrap();
    let got = other.unit_of_work(|uow| uow.extensions().get(owner, "k")).unwrap();
    assert_eq!(got.as_deref(), Some("v"));
}

// ── File-backed stores ───────────────────────────────────────────

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::at(dir.path().join("stowage.db"));
    let owner = EntityId::new();
    {
        let db = Database::open(&config).unwrap();
        db.unit_of_work(|uow| uow.extensions().put(owner, "k", "persisted")).unwrap();
    }
    let db = Database::open(&config).unwrap();
    let got = db.unit_of_work(|uow| uow.extensions().get(owner, "k")).unwrap();
    assert_eq!(got.as_deref(), Some("persisted"));
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn config_from_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, r#"{"journal_mode": "delete"}"#).unwrap();
    let config = StoreConfig::from_file(&path).unwrap();
    assert_eq!(config.journal_mode, JournalMode::Delete);
    assert_eq!(config.busy_timeout_ms, 5_000);
    assert!(config.path.is_none());
}

#[test]
fn config_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = StoreConfig::from_file(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
}
