use pretty_assertions::assert_eq;
use stowage_model::{Column, ColumnTree, TagLabel};

fn make_tree() -> ColumnTree {
    ColumnTree::from_columns(vec![
        Column::new("id", "BIGINT"),
        Column::new("a", "STRUCT").with_children(vec![
            Column::new("b", "STRING").with_tags(vec![TagLabel::classification("PII.Sensitive")]),
            Column::new("x.y", "INT"),
        ]),
    ])
}

// ── Construction & wire form ─────────────────────────────────────

#[test]
fn arena_holds_every_node() {
    let tree = make_tree();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.roots().len(), 2);
}

#[test]
fn wire_form_roundtrips_through_arena() {
    let columns = make_tree().to_columns();
    let rebuilt = ColumnTree::from_columns(columns.clone());
    assert_eq!(rebuilt.to_columns(), columns);
}

#[test]
fn serializes_as_nested_columns() {
    let json = serde_json::to_value(make_tree()).unwrap();
    assert_eq!(json[1]["name"], "a");
    assert_eq!(json[1]["children"][0]["name"], "b");
    assert_eq!(json[1]["children"][0]["dataType"], "STRING");
}

#[test]
fn depth_first_visits_parent_before_children() {
    let tree = make_tree();
    let names: Vec<&str> = tree.iter().map(|(_, n)| n.name.as_str()).collect();
    assert_eq!(names, vec!["id", "a", "b", "x.y"]);
}

// ── resolve ──────────────────────────────────────────────────────

#[test]
fn resolve_nested_path() {
    let tree = make_tree();
    let id = tree.resolve("a.b").unwrap();
    assert_eq!(tree.node(id).name, "b");
    assert_eq!(tree.relative_path(id), vec!["a", "b"]);
}

#[test]
fn resolve_missing_segment_fails() {
    let tree = make_tree();
    assert!(tree.resolve("a.c").is_none());
    assert!(tree.resolve("b").is_none());
}

#[test]
fn resolve_matches_own_name_not_fqn() {
    let mut tree = make_tree();
    tree.propagate_fqn("s3.bucket").unwrap();
    assert!(tree.resolve("s3.bucket.a.b").is_none());
    assert!(tree.resolve("a.b").is_some());
}

#[test]
fn resolve_quoted_segment() {
    let tree = make_tree();
    let id = tree.resolve("a.\"x.y\"").unwrap();
    assert_eq!(tree.node(id).name, "x.y");
}

#[test]
fn resolve_profile_name_uses_plain_concatenation() {
    let tree = make_tree();
    let id = tree.resolve_profile_name("a.x.y").unwrap();
    assert_eq!(tree.node(id).name, "x.y");
}

// ── FQN propagation ──────────────────────────────────────────────

#[test]
fn propagate_fqn_prefixes_every_node() {
    let mut tree = make_tree();
    tree.propagate_fqn("s3.bucket").unwrap();
    let fqns: Vec<String> = tree
        .iter()
        .map(|(_, n)| n.fully_qualified_name.clone().unwrap())
        .collect();
    assert_eq!(
        fqns,
        vec!["s3.bucket.id", "s3.bucket.a", "s3.bucket.a.b", "s3.bucket.a.\"x.y\""]
    );
}

#[test]
fn repropagation_replaces_old_prefix() {
    let mut tree = make_tree();
    tree.propagate_fqn("s3.old").unwrap();
    tree.propagate_fqn("s3.new").unwrap();
    let b = tree.resolve("a.b").unwrap();
    assert_eq!(tree.node(b).fully_qualified_name.as_deref(), Some("s3.new.a.b"));
    assert!(tree.find_by_fqn("s3.old.a.b").is_none());
    assert_eq!(tree.find_by_fqn("s3.new.a.b"), Some(b));
}

// ── Structural clone ─────────────────────────────────────────────

#[test]
fn clone_structural_only_strips_tags() {
    let tree = make_tree();
    assert_eq!(tree.all_tags().len(), 1);

    let stripped = tree.clone_structural_only();
    assert!(stripped.all_tags().is_empty());
    assert_eq!(stripped.len(), tree.len());
    // the source tree keeps its tags
    assert_eq!(tree.all_tags().len(), 1);
}

#[test]
fn push_child_extends_arena() {
    let mut tree = make_tree();
    let a = tree.resolve("a").unwrap();
    let c = tree.push_child(a, Column::new("c", "DATE"));
    assert_eq!(tree.node(c).parent(), Some(a));
    assert_eq!(tree.resolve("a.c"), Some(c));
}
