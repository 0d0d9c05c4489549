//! Shared fixtures for repository tests.

#![allow(dead_code)]

use stowage_facets::ContainerRepository;
use stowage_model::{
    Column, ColumnProfile, Container, ContainerDataModel, CreateContainer, FileFormat, TableProfile,
    TagLabel,
};
use stowage_storage::Database;

pub const SERVICE: &str = "s3";
pub const USER: &str = "admin";
pub const SENSITIVE: &str = "PII.Sensitive";

/// An in-memory repository with the `s3` service already created.
pub fn make_repository() -> ContainerRepository {
    let repo = ContainerRepository::new(Database::open_in_memory().unwrap());
    repo.create_service(SERVICE, "S3", USER).unwrap();
    repo
}

/// `id`, `address { city, zip }` and a sensitive `email`.
pub fn make_columns() -> Vec<Column> {
    vec![
        Column::new("id", "INT"),
        Column::new("address", "STRUCT").with_children(vec![
            Column::new("city", "STRING"),
            Column::new("zip", "STRING"),
        ]),
        Column::new("email", "STRING").with_tags(vec![TagLabel::classification(SENSITIVE)]),
    ]
}

pub fn make_request(name: &str) -> CreateContainer {
    let mut request = CreateContainer::new(name, SERVICE);
    request.data_model = Some(ContainerDataModel {
        is_partitioned: false,
        columns: make_columns().into(),
    });
    request.file_formats = vec![FileFormat::Csv];
    request.tags = vec![TagLabel::classification("Tier.Gold")];
    request
}

pub fn make_container(repo: &ContainerRepository, name: &str) -> Container {
    repo.create_container(make_request(name), USER).unwrap()
}

pub fn table_profile(timestamp: i64, row_count: f64) -> TableProfile {
    TableProfile {
        timestamp,
        row_count: Some(row_count),
        ..TableProfile::default()
    }
}

pub fn column_profile(name: &str, timestamp: i64) -> ColumnProfile {
    ColumnProfile {
        name: name.to_string(),
        timestamp,
        values_count: Some(10.0),
        min: Some(serde_json::json!("a")),
        max: Some(serde_json::json!("z")),
        ..ColumnProfile::default()
    }
}

/// FQN of the column at `path` in `container`.
pub fn column_fqn(container: &Container, path: &str) -> String {
    let tree = container.columns().unwrap();
    tree.node(tree.resolve(path).unwrap())
        .fully_qualified_name
        .clone()
        .unwrap()
}
