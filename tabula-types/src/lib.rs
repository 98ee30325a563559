//! Core type definitions for tabula.
//!
//! This crate defines the fundamental, transport-agnostic types shared by
//! the sync engine and its consumers:
//! - Entity and request identifiers (UUID v4, client-generated)
//! - The board entity model (pings, character tokens, floor tokens)
//! - Actions (locally-applied board mutations) and Updates (their
//!   wire-level counterpart)
//!
//! Wire encoding, indexes and reconciliation live in `tabula-sync`, not
//! here.

mod action;
mod entity;
mod ids;

pub use action::{Action, Update};
pub use entity::{Color, Entity, GridPos, Token, TokenContents, TokenKind, TokenPos, FLOOR_HEIGHT};
pub use ids::{EntityId, RequestId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
