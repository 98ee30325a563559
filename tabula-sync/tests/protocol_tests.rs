use serde_json::json;
use tabula_sync::protocol::{
    decode_server_message, encode_request, ConnectionError, WireEntity, CLOSE_INVALID_ROOM_ID,
    CLOSE_ROOM_FULL, CLOSE_TOO_MANY_CONNECTIONS, CLOSE_TOO_MANY_ROOMS_CREATED,
};
use tabula_sync::TransportEvent;
use tabula_types::{
    Color, Entity, EntityId, GridPos, RequestId, Token, TokenContents, TokenKind, TokenPos,
    Update,
};

fn character(id: EntityId) -> Entity {
    Entity::from(
        Token::new(
            id,
            TokenKind::Character,
            TokenPos::new(2, 3, 1),
            TokenContents::icon("archer"),
        )
        .with_color(Color::new(255, 0, 0)),
    )
}

// ── outbound encoding ────────────────────────────────────────────

#[test]
fn update_encodes_with_bounding_coordinates() {
    let id = EntityId::new();
    let request_id = RequestId::new();
    let raw = encode_request(request_id, &[Update::Create(character(id))]).unwrap();

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        json!({
            "request_id": request_id.to_string(),
            "updates": [{
                "action": "update",
                "data": {
                    "type": "character",
                    "id": id.to_string(),
                    "contents": { "icon_id": "archer" },
                    "start_x": 2,
                    "start_y": 3,
                    "start_z": 1,
                    "end_x": 3,
                    "end_y": 4,
                    "end_z": 2,
                    "color_rgb": { "red": 255, "green": 0, "blue": 0 },
                }
            }]
        })
    );
}

#[test]
fn create_and_move_encode_identically() {
    let entity = character(EntityId::new());
    let request_id = RequestId::new();

    let created = encode_request(request_id, &[Update::Create(entity.clone())]).unwrap();
    let moved = encode_request(request_id, &[Update::Move(entity)]).unwrap();

    assert_eq!(created, moved);
}

#[test]
fn uncolored_token_omits_color_field() {
    let id = EntityId::new();
    let entity = Entity::from(Token::new(
        id,
        TokenKind::Floor,
        TokenPos::new(0, 0, 0),
        TokenContents::text("mud"),
    ));
    let raw = encode_request(RequestId::new(), &[Update::Create(entity)]).unwrap();

    assert!(!raw.contains("color_rgb"));
    assert!(raw.contains("\"type\":\"floor\""));
    assert!(raw.contains("\"text\":\"mud\""));
}

#[test]
fn ping_encodes_as_ping_action() {
    let id = EntityId::new();
    let ping = Entity::ping(id, GridPos::new(4, 5));
    let raw = encode_request(RequestId::new(), &[Update::Create(ping)]).unwrap();

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value["updates"][0],
        json!({
            "action": "ping",
            "data": { "type": "ping", "id": id.to_string(), "x": 4, "y": 5 }
        })
    );
}

#[test]
fn delete_encodes_with_bare_id() {
    let id = EntityId::new();
    let raw = encode_request(RequestId::new(), &[Update::Delete(id)]).unwrap();

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value["updates"][0],
        json!({ "action": "delete", "data": id.to_string() })
    );
}

// ── inbound decoding ─────────────────────────────────────────────

#[test]
fn decodes_connected_message_into_initial_state() {
    let id = EntityId::new();
    let raw = json!({
        "type": "connected",
        "data": [{
            "type": "floor",
            "id": id.to_string(),
            "contents": { "icon_id": "stone" },
            "start_x": 1, "start_y": 2, "start_z": 0,
            "end_x": 2, "end_y": 3, "end_z": 1,
        }]
    })
    .to_string();

    let message = decode_server_message(&raw).unwrap();
    let event = message.into_event();

    let expected = Entity::from(Token::new(
        id,
        TokenKind::Floor,
        TokenPos::new(1, 2, 0),
        TokenContents::icon("stone"),
    ));
    assert_eq!(event, TransportEvent::InitialState(vec![expected]));
}

#[test]
fn decodes_state_message_with_request_id() {
    let request_id = RequestId::new();
    let raw = json!({
        "type": "state",
        "request_id": request_id.to_string(),
        "data": [],
    })
    .to_string();

    let event = decode_server_message(&raw).unwrap().into_event();
    assert_eq!(
        event,
        TransportEvent::TokenUpdate {
            request_id: Some(request_id),
            entities: vec![],
        }
    );
}

#[test]
fn decodes_state_message_without_request_id_as_push() {
    let id = EntityId::new();
    let raw = json!({
        "type": "state",
        "data": [{ "type": "ping", "id": id.to_string(), "x": 0, "y": 0 }],
    })
    .to_string();

    let event = decode_server_message(&raw).unwrap().into_event();
    assert_eq!(
        event,
        TransportEvent::TokenUpdate {
            request_id: None,
            entities: vec![Entity::ping(id, GridPos::new(0, 0))],
        }
    );
}

#[test]
fn decodes_error_message() {
    let request_id = RequestId::new();
    let raw = json!({
        "type": "error",
        "request_id": request_id.to_string(),
        "data": "That position is occupied",
    })
    .to_string();

    let event = decode_server_message(&raw).unwrap().into_event();
    assert_eq!(
        event,
        TransportEvent::Error {
            request_id: Some(request_id),
            raw: "That position is occupied".to_string(),
        }
    );
}

#[test]
fn malformed_payload_fails_to_decode() {
    assert!(decode_server_message("not json").is_err());
    assert!(decode_server_message("{\"type\":\"mystery\"}").is_err());
}

#[test]
fn wire_entity_roundtrip_preserves_value() {
    let entity = character(EntityId::new());
    let wire = WireEntity::from(&entity);
    assert_eq!(Entity::from(wire), entity);
}

// ── close codes ──────────────────────────────────────────────────

#[test]
fn close_codes_map_to_reasons() {
    assert_eq!(
        ConnectionError::from_close_code(CLOSE_INVALID_ROOM_ID),
        ConnectionError::InvalidRoomId
    );
    assert_eq!(
        ConnectionError::from_close_code(CLOSE_ROOM_FULL),
        ConnectionError::RoomFull
    );
    assert_eq!(
        ConnectionError::from_close_code(CLOSE_TOO_MANY_CONNECTIONS),
        ConnectionError::TooManyConnections
    );
    assert_eq!(
        ConnectionError::from_close_code(CLOSE_TOO_MANY_ROOMS_CREATED),
        ConnectionError::TooManyRoomsCreated
    );
}

#[test]
fn connection_errors_describe_their_reason() {
    assert_eq!(ConnectionError::RoomFull.to_string(), "room is full");
    assert_eq!(
        tabula_sync::SyncError::Connection(ConnectionError::InvalidRoomId).to_string(),
        "connection closed: invalid room id"
    );

    let request_id = RequestId::new();
    assert_eq!(
        tabula_sync::SyncError::Rejected { request_id }.to_string(),
        format!("request {request_id} rejected by server")
    );
}

#[test]
fn other_close_codes_are_unknown() {
    assert_eq!(
        ConnectionError::from_close_code(1006),
        ConnectionError::Unknown
    );
    assert_eq!(
        ConnectionError::from_close_code(4005),
        ConnectionError::Unknown
    );
}
