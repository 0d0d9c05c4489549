use stowage_types::{EntityId, TimeRange};
use std::collections::HashSet;
use std::str::FromStr;

// ── EntityId ──────────────────────────────────────────────────────

#[test]
fn entity_id_new_is_unique() {
    let a = EntityId::new();
    let b = EntityId::new();
    assert_ne!(a, b);
}

#[test]
fn entity_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    let id = EntityId::from(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn entity_id_display_and_parse() {
    let id = EntityId::new();
    let parsed = EntityId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn entity_id_from_str_invalid() {
    assert!(EntityId::from_str("garbage").is_err());
    let err = EntityId::parse("not-a-uuid").unwrap_err();
    assert!(err.to_string().starts_with("invalid UUID"));
}

#[test]
fn entity_id_hash_and_eq() {
    let id = EntityId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn entity_id_serializes_as_plain_string() {
    let id = EntityId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let parsed: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn entity_ids_are_time_ordered() {
    let a = EntityId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = EntityId::new();
    assert!(a < b);
}

// ── TimeRange ─────────────────────────────────────────────────────

#[test]
fn time_range_rejects_inverted_bounds() {
    assert!(TimeRange::new(200, 100).is_err());
}

#[test]
fn time_range_bounds_are_inclusive() {
    let range = TimeRange::new(100, 200).unwrap();
    assert!(range.contains(100));
    assert!(range.contains(200));
    assert!(!range.contains(99));
    assert!(!range.contains(201));
}

#[test]
fn time_range_at_single_instant() {
    let range = TimeRange::at(42);
    assert_eq!(range.start(), 42);
    assert_eq!(range.end(), 42);
}

#[test]
fn now_millis_is_positive() {
    assert!(stowage_types::now_millis() > 0);
}
