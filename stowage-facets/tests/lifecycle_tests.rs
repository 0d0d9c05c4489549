mod common;

use common::{make_container, make_repository, make_request, column_fqn, SENSITIVE, USER};
use pretty_assertions::assert_eq;
use stowage_facets::{Field, FieldSet, RepositoryError};
use stowage_model::{CreateTableProfile, EntityKind, TableData, TagLabel};
use stowage_storage::Include;
use stowage_types::{EntityId, TimeRange};
use stowage_versioning::{Operation, VersioningError};

// ── Create ───────────────────────────────────────────────────────

#[test]
fn create_assigns_fqns_service_and_first_version() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");

    assert_eq!(c.fully_qualified_name, "s3.bucket");
    assert_eq!(c.service.as_ref().unwrap().name, "s3");
    assert_eq!(c.service_type.as_deref(), Some("S3"));
    assert_eq!(column_fqn(&c, "address.city"), "s3.bucket.address.city");
    assert_eq!(c.version, 0.1);

    let history = repo.list_versions(c.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version, 0.1);
    assert!(history[0].json.get("tags").is_none());
}

#[test]
fn create_under_parent_nests_fqn_and_links_child() {
    let repo = make_repository();
    let parent = make_container(&repo, "bucket");
    let mut request = make_request("logs");
    request.parent = Some(parent.id);
    let child = repo.create_container(request, USER).unwrap();

    assert_eq!(child.fully_qualified_name, "s3.bucket.logs");
    let children = repo.list_children(parent.id).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child.id);

    let loaded = repo
        .get_container(child.id, FieldSet::of(&[Field::Parent]), Include::NonDeleted)
        .unwrap();
    assert_eq!(loaded.parent.unwrap().id, parent.id);
    assert_eq!(loaded.service.unwrap().name, "s3");
}

#[test]
fn duplicate_fqn_rejected() {
    let repo = make_repository();
    make_container(&repo, "bucket");
    let err = repo.create_container(make_request("bucket"), USER).unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[test]
fn unknown_service_is_not_found() {
    let repo = make_repository();
    let mut request = make_request("bucket");
    request.service = "gcs".into();
    let err = repo.create_container(request, USER).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

// ── Field population ─────────────────────────────────────────────

#[test]
fn field_set_parses_names() {
    let fields = FieldSet::parse("tags, dataModel,").unwrap();
    assert!(fields.contains(Field::Tags));
    assert!(fields.contains(Field::DataModel));
    assert!(!fields.contains(Field::Parent));
    assert!(FieldSet::parse("").unwrap().is_empty());
    assert!(matches!(
        FieldSet::parse("tags,owners"),
        Err(RepositoryError::Validation(_))
    ));
}

#[test]
fn unrequested_fields_are_cleared() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    let bare = repo
        .get_container(c.id, FieldSet::empty(), Include::NonDeleted)
        .unwrap();
    assert!(bare.data_model.is_none());
    assert!(bare.tags.is_empty());
    assert!(bare.custom_metrics.is_none());
    assert!(bare.service.is_some());
}

#[test]
fn tags_are_rebuilt_from_usage() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    let loaded = repo
        .get_container_by_name("s3.bucket", FieldSet::all(), Include::NonDeleted)
        .unwrap();
    assert_eq!(loaded.tags, vec![TagLabel::classification("Tier.Gold")]);
    let tree = loaded.columns().unwrap();
    let email = tree.node(tree.resolve("email").unwrap());
    assert_eq!(email.tags, vec![TagLabel::classification(SENSITIVE)]);
    assert_eq!(loaded.id, c.id);
}

// ── Update ───────────────────────────────────────────────────────

#[test]
fn description_update_bumps_minor_and_records_history() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    let mut updated = repo
        .get_container(c.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    updated.description = Some("raw events".into());

    let stored = repo.update_container(c.id, updated, Operation::Put, "editor").unwrap();
    assert_eq!(stored.version, 0.2);
    assert_eq!(stored.updated_by, "editor");

    let history = repo.list_versions(c.id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, 0.2);
}

#[test]
fn unchanged_update_keeps_version() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    let same = repo
        .get_container(c.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    let stored = repo.update_container(c.id, same, Operation::Patch, USER).unwrap();
    assert_eq!(stored.version, 0.1);
    assert_eq!(repo.list_versions(c.id).unwrap().len(), 1);
}

#[test]
fn rename_moves_column_fqns() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    let mut updated = repo
        .get_container(c.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    updated.name = "archive".into();
    repo.update_container(c.id, updated, Operation::Patch, USER).unwrap();

    let loaded = repo
        .get_container_by_name("s3.archive", FieldSet::all(), Include::NonDeleted)
        .unwrap();
    assert_eq!(column_fqn(&loaded, "address.city"), "s3.archive.address.city");
    let tree = loaded.columns().unwrap();
    let email = tree.node(tree.resolve("email").unwrap());
    assert_eq!(email.tags, vec![TagLabel::classification(SENSITIVE)]);
}

#[test]
fn rename_moves_descendants_and_their_facets() {
    let repo = make_repository();
    let parent = make_container(&repo, "bucket");
    let mut request = make_request("logs");
    request.parent = Some(parent.id);
    let child = repo.create_container(request, USER).unwrap();
    let run = |ts| CreateTableProfile {
        table_profile: common::table_profile(ts, 5.0),
        column_profile: vec![common::column_profile("address.city", ts)],
        system_profile: None,
    };
    repo.add_table_profile(parent.id, run(100)).unwrap();
    repo.add_table_profile(child.id, run(200)).unwrap();

    let mut updated = repo
        .get_container(parent.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    updated.name = "archive".into();
    repo.update_container(parent.id, updated, Operation::Patch, USER).unwrap();

    let moved = repo
        .get_container_by_name("s3.archive.logs", FieldSet::all(), Include::NonDeleted)
        .unwrap();
    assert_eq!(moved.id, child.id);
    assert_eq!(moved.fully_qualified_name, "s3.archive.logs");
    assert_eq!(moved.version, child.version);
    assert_eq!(moved.parent.as_ref().unwrap().id, parent.id);
    assert_eq!(column_fqn(&moved, "address.city"), "s3.archive.logs.address.city");
    assert_eq!(moved.tags, vec![TagLabel::classification("Tier.Gold")]);
    let tree = moved.columns().unwrap();
    let email = tree.node(tree.resolve("email").unwrap());
    assert_eq!(email.tags, vec![TagLabel::classification(SENSITIVE)]);

    let old = repo.get_container_by_name("s3.bucket.logs", FieldSet::empty(), Include::All);
    assert!(matches!(old, Err(RepositoryError::NotFound(_))));

    let range = TimeRange::new(0, 1_000).unwrap();
    assert_eq!(repo.list_table_profiles("s3.archive", range).unwrap().len(), 1);
    assert_eq!(repo.list_table_profiles("s3.archive.logs", range).unwrap().len(), 1);
    assert!(repo.list_table_profiles("s3.bucket.logs", range).unwrap().is_empty());
    let city = repo
        .list_column_profiles("s3.archive.logs.address.city", range, true)
        .unwrap();
    assert_eq!(city.len(), 1);
    assert_eq!(city[0].timestamp, 200);
    assert!(repo
        .list_column_profiles("s3.bucket.address.city", range, true)
        .unwrap()
        .is_empty());
}

#[test]
fn put_cannot_move_container_to_another_parent() {
    let repo = make_repository();
    let a = make_container(&repo, "a");
    let b = make_container(&repo, "b");
    let mut request = make_request("logs");
    request.parent = Some(a.id);
    let child = repo.create_container(request, USER).unwrap();

    let mut updated = repo
        .get_container(child.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    updated.parent = Some(b.entity_reference());
    let err = repo
        .update_container(child.id, updated, Operation::Put, USER)
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Versioning(VersioningError::Immutable("parent"))
    ));

    let loaded = repo
        .get_container(child.id, FieldSet::of(&[Field::Parent]), Include::NonDeleted)
        .unwrap();
    assert_eq!(loaded.fully_qualified_name, "s3.a.logs");
    assert_eq!(loaded.parent.unwrap().id, a.id);
    assert_eq!(loaded.version, child.version);
    assert_eq!(repo.list_children(a.id).unwrap().len(), 1);
    assert!(repo.list_children(b.id).unwrap().is_empty());
}

// ── Delete ───────────────────────────────────────────────────────

#[test]
fn soft_delete_and_restore() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    repo.delete_container(c.id, false).unwrap();

    let err = repo
        .get_container(c.id, FieldSet::empty(), Include::NonDeleted)
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
    let deleted = repo
        .get_container(c.id, FieldSet::empty(), Include::Deleted)
        .unwrap();
    assert!(deleted.deleted);

    let restored = repo.restore_container(c.id).unwrap();
    assert!(!restored.deleted);
}

#[test]
fn hard_delete_removes_facets_and_profiles() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    repo.add_sample_data(
        c.id,
        TableData {
            columns: vec!["id".into()],
            rows: vec![vec![serde_json::json!(1)]],
        },
    )
    .unwrap();
    repo.add_table_profile(
        c.id,
        CreateTableProfile {
            table_profile: common::table_profile(100, 5.0),
            column_profile: vec![common::column_profile("address.city", 100)],
            system_profile: None,
        },
    )
    .unwrap();

    repo.delete_container(c.id, true).unwrap();

    let err = repo
        .get_container(c.id, FieldSet::empty(), Include::All)
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
    let range = TimeRange::new(0, 1_000).unwrap();
    assert!(repo.list_table_profiles("s3.bucket", range).unwrap().is_empty());
    assert!(repo
        .list_column_profiles("s3.bucket.address.city", range, true)
        .unwrap()
        .is_empty());
    let orphaned = repo
        .database()
        .unit_of_work(|uow| uow.extensions().get_all_with_prefix(c.id, "container."))
        .unwrap();
    assert!(orphaned.is_empty());
}

#[test]
fn delete_with_children_rejected() {
    let repo = make_repository();
    let parent = make_container(&repo, "bucket");
    let mut request = make_request("logs");
    request.parent = Some(parent.id);
    repo.create_container(request, USER).unwrap();

    let err = repo.delete_container(parent.id, false).unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[test]
fn missing_container_is_not_found() {
    let repo = make_repository();
    let err = repo.list_children(EntityId::new()).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}
