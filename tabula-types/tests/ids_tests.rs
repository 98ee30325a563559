use std::collections::HashSet;
use std::str::FromStr;
use tabula_types::{EntityId, RequestId};

// ── EntityId ─────────────────────────────────────────────────────

#[test]
fn entity_ids_are_unique() {
    let ids: HashSet<EntityId> = (0..100).map(|_| EntityId::new()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn entity_id_display_parse_roundtrip() {
    let id = EntityId::new();
    let parsed = EntityId::parse(&id.to_string()).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn entity_id_from_str() {
    let id = EntityId::new();
    let parsed = EntityId::from_str(&id.to_string()).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn entity_id_parse_rejects_garbage() {
    assert!(EntityId::parse("not-a-uuid").is_err());
}

#[test]
fn entity_id_uuid_roundtrip() {
    let id = EntityId::new();
    assert_eq!(EntityId::from_uuid(id.as_uuid()), id);
}

#[test]
fn entity_id_serializes_as_string() {
    let id = EntityId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));

    let back: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

// ── RequestId ────────────────────────────────────────────────────

#[test]
fn request_ids_are_unique() {
    let a = RequestId::new();
    let b = RequestId::new();
    assert_ne!(a, b);
}

#[test]
fn request_id_display_parse_roundtrip() {
    let id = RequestId::new();
    let parsed = RequestId::parse(&id.to_string()).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn request_id_parse_rejects_garbage() {
    assert!(RequestId::parse("").is_err());
}

#[test]
fn request_id_serializes_as_string() {
    let id = RequestId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
}
