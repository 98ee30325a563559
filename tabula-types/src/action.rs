//! Actions and updates.
//!
//! An `Action` is one committed local board mutation, the unit the
//! reconciliation store applies and replays. An `Update` is the wire-level
//! counterpart produced by the diff engine for transmission.

use crate::{Entity, EntityId, GridPos};
use serde::{Deserialize, Serialize};

/// One committed board mutation.
///
/// Actions are idempotent when replayed against an index already in the
/// target state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Insert or fully replace an entity by id.
    Upsert(Entity),
    /// Remove an entity by id. Removing a missing id is a no-op.
    Delete(EntityId),
    /// Insert a transient ping. Semantically an upsert with a distinct
    /// entity kind; expiry arrives later as an ordinary `Delete`.
    Ping { id: EntityId, pos: GridPos },
}

impl Action {
    /// The id of the entity this action targets.
    #[must_use]
    pub fn target_id(&self) -> EntityId {
        match self {
            Self::Upsert(entity) => entity.id(),
            Self::Delete(id) => *id,
            Self::Ping { id, .. } => *id,
        }
    }

    /// The entity this action inserts, if any.
    #[must_use]
    pub fn entity(&self) -> Option<Entity> {
        match self {
            Self::Upsert(entity) => Some(entity.clone()),
            Self::Delete(_) => None,
            Self::Ping { id, pos } => Some(Entity::ping(*id, *pos)),
        }
    }
}

/// The wire-level representation of one change.
///
/// `Create` and `Move` both serialize as an upsert and are distinguished
/// only so callers can reason about which it was locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Update {
    /// Entity absent from the comparison base; carries the full payload.
    Create(Entity),
    /// Entity present in the base but value-unequal; carries the full
    /// payload.
    Move(Entity),
    /// Entity present in the base but absent locally; carries the id only.
    Delete(EntityId),
}

impl Update {
    /// The id of the entity this update targets.
    #[must_use]
    pub fn target_id(&self) -> EntityId {
        match self {
            Self::Create(entity) | Self::Move(entity) => entity.id(),
            Self::Delete(id) => *id,
        }
    }

    /// The equivalent action, as the server would fold it in.
    #[must_use]
    pub fn as_action(&self) -> Action {
        match self {
            Self::Create(Entity::Ping { id, pos }) => Action::Ping { id: *id, pos: *pos },
            Self::Create(entity) | Self::Move(entity) => Action::Upsert(entity.clone()),
            Self::Delete(id) => Action::Delete(*id),
        }
    }
}
