use pretty_assertions::assert_eq;
use stowage_storage::{Database, StorageResult, UnitOfWork};
use stowage_types::EntityId;

fn with<T>(db: &Database, f: impl FnOnce(&UnitOfWork<'_>) -> StorageResult<T>) -> T {
    db.unit_of_work(f).unwrap()
}

// ── put / get ────────────────────────────────────────────────────

#[test]
fn put_then_get() {
    let db = Database::open_in_memory().unwrap();
    let owner = EntityId::new();
    let got = with(&db, |uow| {
        uow.extensions().put(owner, "container.sampleData", r#"{"rows":[]}"#)?;
        uow.extensions().get(owner, "container.sampleData")
    });
    assert_eq!(got.as_deref(), Some(r#"{"rows":[]}"#));
}

#[test]
fn put_replaces_existing_value() {
    let db = Database::open_in_memory().unwrap();
    let owner = EntityId::new();
    let got = with(&db, |uow| {
        let ext = uow.extensions();
        ext.put(owner, "k", "1")?;
        ext.put(owner, "k", "2")?;
        ext.get(owner, "k")
    });
    assert_eq!(got.as_deref(), Some("2"));
}

#[test]
fn get_missing_is_none() {
    let db = Database::open_in_memory().unwrap();
    let got = with(&db, |uow| uow.extensions().get(EntityId::new(), "nope"));
    assert!(got.is_none());
}

#[test]
fn values_are_scoped_by_owner() {
    let db = Database::open_in_memory().unwrap();
    let (a, b) = (EntityId::new(), EntityId::new());
    let got = with(&db, |uow| {
        uow.extensions().put(a, "k", "a")?;
        uow.extensions().get(b, "k")
    });
    assert!(got.is_none());
}

// ── Prefix reads ─────────────────────────────────────────────────

#[test]
fn prefix_read_is_literal_and_ordered() {
    let db = Database::open_in_memory().unwrap();
    let owner = EntityId::new();
    let names = with(&db, |uow| {
        let ext = uow.extensions();
        ext.put(owner, "customMetrics.container.table.b", "{}")?;
        ext.put(owner, "customMetrics.container.table.a", "{}")?;
        ext.put(owner, "customMetrics.container.column.c", "{}")?;
        ext.put(owner, "customMetrics_container_table_x", "{}")?;
        ext.get_all_with_prefix(owner, "customMetrics.container.table.")
    });
    let names: Vec<String> = names.into_iter().map(|r| r.extension).collect();
    assert_eq!(
        names,
        vec!["customMetrics.container.table.a", "customMetrics.container.table.b"]
    );
}

#[test]
fn percent_in_prefix_is_not_a_wildcard() {
    let db = Database::open_in_memory().unwrap();
    let owner = EntityId::new();
    let rows = with(&db, |uow| {
        uow.extensions().put(owner, "abc", "{}")?;
        uow.extensions().get_all_with_prefix(owner, "a%")
    });
    assert!(rows.is_empty());
}

// ── delete ───────────────────────────────────────────────────────

#[test]
fn delete_reports_presence() {
    let db = Database::open_in_memory().unwrap();
    let owner = EntityId::new();
    let (first, second, after) = with(&db, |uow| {
        let ext = uow.extensions();
        ext.put(owner, "k", "v")?;
        Ok((ext.delete(owner, "k")?, ext.delete(owner, "k")?, ext.get(owner, "k")?))
    });
    assert!(first);
    assert!(!second);
    assert!(after.is_none());
}

#[test]
fn delete_all_clears_only_owner() {
    let db = Database::open_in_memory().unwrap();
    let (a, b) = (EntityId::new(), EntityId::new());
    let (removed, kept) = with(&db, |uow| {
        let ext = uow.extensions();
        ext.put(a, "x", "1")?;
        ext.put(a, "y", "2")?;
        ext.put(b, "x", "3")?;
        Ok((ext.delete_all(a)?, ext.get(b, "x")?))
    });
    assert_eq!(removed, 2);
    assert_eq!(kept.as_deref(), Some("3"));
}

// ── Typed helpers ────────────────────────────────────────────────

#[test]
fn json_helpers_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let owner = EntityId::new();
    let value = serde_json::json!({"profileSample": 50.0});
    let got: Option<serde_json::Value> = with(&db, |uow| {
        uow.extensions().put_json(owner, "cfg", &value)?;
        uow.extensions().get_json(owner, "cfg")
    });
    assert_eq!(got, Some(value));
}
