//! Wire protocol types and JSON codec.
//!
//! Outbound messages are `{"request_id": …, "updates": [{"action":
//! "update" | "ping" | "delete", "data": …}, …]}`. Token payloads carry
//! bounding coordinates (`start_*` = position, `end_*` = position + 1 on
//! each axis) rather than a bare position. Inbound messages are tagged by
//! `type`: `connected` (full entity list), `state` (entity list, optional
//! request id), `error` (raw message, optional request id).
//!
//! Connection close codes 4001–4004 carry distinct rejection reasons;
//! anything else maps to an unknown error.

use crate::error::SyncResult;
use crate::transport::TransportEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabula_types::{
    Color, Entity, EntityId, GridPos, RequestId, Token, TokenContents, TokenKind, TokenPos, Update,
};

/// Close code: the room id is not a valid UUID.
pub const CLOSE_INVALID_ROOM_ID: u16 = 4001;
/// Close code: the room is at its occupancy limit.
pub const CLOSE_ROOM_FULL: u16 = 4002;
/// Close code: too many concurrent connections from this client.
pub const CLOSE_TOO_MANY_CONNECTIONS: u16 = 4003;
/// Close code: too many rooms created recently by this client.
pub const CLOSE_TOO_MANY_ROOMS_CREATED: u16 = 4004;

/// Categorized reason for a closed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    InvalidRoomId,
    RoomFull,
    TooManyConnections,
    TooManyRoomsCreated,
    Unknown,
}

impl ConnectionError {
    /// Maps a websocket close code to a reason.
    #[must_use]
    pub fn from_close_code(code: u16) -> Self {
        match code {
            CLOSE_INVALID_ROOM_ID => Self::InvalidRoomId,
            CLOSE_ROOM_FULL => Self::RoomFull,
            CLOSE_TOO_MANY_CONNECTIONS => Self::TooManyConnections,
            CLOSE_TOO_MANY_ROOMS_CREATED => Self::TooManyRoomsCreated,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::InvalidRoomId => "invalid room id",
            Self::RoomFull => "room is full",
            Self::TooManyConnections => "too many connections",
            Self::TooManyRoomsCreated => "too many rooms created",
            Self::Unknown => "unknown connection error",
        };
        f.write_str(reason)
    }
}

/// A token as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireToken {
    pub id: EntityId,
    pub contents: TokenContents,
    pub start_x: i32,
    pub start_y: i32,
    pub start_z: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub end_z: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color_rgb: Option<Color>,
}

/// An entity as it appears on the wire, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireEntity {
    Character(WireToken),
    Floor(WireToken),
    Ping { id: EntityId, x: i32, y: i32 },
}

impl From<&Entity> for WireEntity {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::Ping { id, pos } => Self::Ping {
                id: *id,
                x: pos.x,
                y: pos.y,
            },
            Entity::Token(token) => {
                let wire = WireToken {
                    id: token.id,
                    contents: token.contents.clone(),
                    start_x: token.pos.x,
                    start_y: token.pos.y,
                    start_z: token.pos.z,
                    end_x: token.pos.x + 1,
                    end_y: token.pos.y + 1,
                    end_z: token.pos.z + 1,
                    color_rgb: token.color,
                };
                match token.kind {
                    TokenKind::Character => Self::Character(wire),
                    TokenKind::Floor => Self::Floor(wire),
                }
            }
        }
    }
}

impl From<WireEntity> for Entity {
    fn from(wire: WireEntity) -> Self {
        match wire {
            WireEntity::Ping { id, x, y } => Entity::ping(id, GridPos::new(x, y)),
            WireEntity::Character(token) => Entity::Token(wire_token(token, TokenKind::Character)),
            WireEntity::Floor(token) => Entity::Token(wire_token(token, TokenKind::Floor)),
        }
    }
}

fn wire_token(wire: WireToken, kind: TokenKind) -> Token {
    Token {
        id: wire.id,
        kind,
        pos: TokenPos::new(wire.start_x, wire.start_y, wire.start_z),
        contents: wire.contents,
        color: wire.color_rgb,
    }
}

/// One update as it appears on the wire. `Create` and `Move` both
/// serialize as the `update` action (or `ping` for ping entities).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "lowercase")]
pub enum WireUpdate {
    Update(WireEntity),
    Ping(WireEntity),
    Delete(EntityId),
}

impl From<&Update> for WireUpdate {
    fn from(update: &Update) -> Self {
        match update {
            Update::Create(entity) | Update::Move(entity) => {
                if entity.is_ping() {
                    Self::Ping(entity.into())
                } else {
                    Self::Update(entity.into())
                }
            }
            Update::Delete(id) => Self::Delete(*id),
        }
    }
}

/// An outbound batch message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMessage {
    pub request_id: RequestId,
    pub updates: Vec<WireUpdate>,
}

impl BoardMessage {
    /// Builds the wire message for a batch.
    pub fn new(request_id: RequestId, updates: &[Update]) -> Self {
        Self {
            request_id,
            updates: updates.iter().map(WireUpdate::from).collect(),
        }
    }
}

/// An inbound message from the server, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Connection accepted; `data` is the full board state.
    Connected { data: Vec<WireEntity> },
    /// Authoritative entity delta. With a `request_id` it acknowledges
    /// the batch sent under that id; without one it is an unsolicited
    /// push from another client.
    State {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        request_id: Option<RequestId>,
        data: Vec<WireEntity>,
    },
    /// The server rejected a request or reports a failure.
    Error {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        request_id: Option<RequestId>,
        data: String,
    },
}

impl ServerMessage {
    /// Converts a decoded message into the transport event it represents.
    #[must_use]
    pub fn into_event(self) -> TransportEvent {
        match self {
            Self::Connected { data } => {
                TransportEvent::InitialState(data.into_iter().map(Entity::from).collect())
            }
            Self::State { request_id, data } => TransportEvent::TokenUpdate {
                request_id,
                entities: data.into_iter().map(Entity::from).collect(),
            },
            Self::Error { request_id, data } => TransportEvent::Error {
                request_id,
                raw: data,
            },
        }
    }
}

/// Encodes an outbound batch as JSON.
pub fn encode_request(request_id: RequestId, updates: &[Update]) -> SyncResult<String> {
    Ok(serde_json::to_string(&BoardMessage::new(request_id, updates))?)
}

/// Decodes an inbound server message. A failure here must be surfaced as
/// an error event with the raw payload and must not mutate either index.
pub fn decode_server_message(raw: &str) -> SyncResult<ServerMessage> {
    Ok(serde_json::from_str(raw)?)
}
