mod common;

use common::{make_container, make_repository, SENSITIVE};
use pretty_assertions::assert_eq;
use stowage_facets::{
    ContainerRepository, EntityLink, FieldSet, RepositoryError, RepositoryResult, TaskDispatch,
    TaskKind, TaskResolver,
};
use stowage_model::{Container, TagLabel};
use stowage_storage::{Database, Include};

const CITY_DESCRIPTION: &str = "<#E::container::s3.bucket::dataModel::address.city::description>";

#[test]
fn entity_link_parses_and_renders() {
    let link: EntityLink = CITY_DESCRIPTION.parse().unwrap();
    assert_eq!(link.entity_type, "container");
    assert_eq!(link.entity_fqn, "s3.bucket");
    assert_eq!(link.field_name.as_deref(), Some("dataModel"));
    assert_eq!(link.array_field.as_deref(), Some("address.city"));
    assert_eq!(link.array_value.as_deref(), Some("description"));
    assert_eq!(link.to_string(), CITY_DESCRIPTION);

    assert!("<#E::container>".parse::<EntityLink>().is_err());
    assert!("container::s3.bucket".parse::<EntityLink>().is_err());
}

#[test]
fn description_task_updates_column_and_bumps_version() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");

    let updated = repo
        .resolve_task(CITY_DESCRIPTION, "RequestDescription", "Town of residence", "steward")
        .unwrap();
    assert_eq!(updated.version, 0.2);

    let loaded = repo
        .get_container(c.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    let tree = loaded.columns().unwrap();
    let city = tree.node(tree.resolve("address.city").unwrap());
    assert_eq!(city.description.as_deref(), Some("Town of residence"));
}

#[test]
fn tag_task_replaces_column_tags() {
    let repo = make_repository();
    let c = make_container(&repo, "bucket");
    let tags = serde_json::to_string(&vec![TagLabel::classification(SENSITIVE)]).unwrap();

    repo.resolve_task(
        "<#E::container::s3.bucket::dataModel::address.zip::tags>",
        "UpdateTag",
        &tags,
        "steward",
    )
    .unwrap();

    let loaded = repo
        .get_container(c.id, FieldSet::all(), Include::NonDeleted)
        .unwrap();
    let tree = loaded.columns().unwrap();
    let zip = tree.node(tree.resolve("address.zip").unwrap());
    assert_eq!(zip.tags, vec![TagLabel::classification(SENSITIVE)]);
}

#[test]
fn unknown_task_type_rejected() {
    let repo = make_repository();
    make_container(&repo, "bucket");
    let err = repo
        .resolve_task(CITY_DESCRIPTION, "RequestApproval", "x", "steward")
        .unwrap_err();
    assert_eq!(err.to_string(), "task error: Invalid task type RequestApproval");
}

#[test]
fn unregistered_field_rejected() {
    let repo = make_repository();
    make_container(&repo, "bucket");
    let err = repo
        .resolve_task("<#E::container::s3.bucket::owners>", "RequestDescription", "x", "steward")
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Task(_)));
}

#[test]
fn unknown_column_in_link_rejected() {
    let repo = make_repository();
    make_container(&repo, "bucket");
    let err = repo
        .resolve_task(
            "<#E::container::s3.bucket::dataModel::phone::description>",
            "RequestDescription",
            "x",
            "steward",
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid column name phone");
}

struct ContainerDescription;

impl TaskResolver for ContainerDescription {
    fn resolve(
        &self,
        mut container: Container,
        _link: &EntityLink,
        new_value: &str,
    ) -> RepositoryResult<Container> {
        container.description = Some(new_value.to_string());
        Ok(container)
    }
}

#[test]
fn custom_resolver_can_be_registered() {
    let mut tasks = TaskDispatch::default();
    tasks.register("description", TaskKind::Description, Box::new(ContainerDescription));
    let repo = ContainerRepository::new(Database::open_in_memory().unwrap()).with_tasks(tasks);
    repo.create_service("s3", "S3", "admin").unwrap();
    let c = make_container(&repo, "bucket");

    let updated = repo
        .resolve_task("<#E::container::s3.bucket::description>", "UpdateDescription", "Raw events", "steward")
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("Raw events"));
    assert_eq!(updated.id, c.id);
}
