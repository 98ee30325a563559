//! The board entity model.
//!
//! A board holds tokens (characters and floor tiles) and transient pings.
//! Tokens live at a 3-D grid position where `z` is the stacking height;
//! `z = 0` is reserved for the floor layer. Pings are 2-D and self-expire,
//! handled by the caller as an ordinary delete action.

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Stacking height of the floor layer.
pub const FLOOR_HEIGHT: i32 = 0;

/// A 2-D grid position (pings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Canonical string key for this cell.
    #[must_use]
    pub fn pos_key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

/// A 3-D grid position (tokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TokenPos {
    /// Creates a new token position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Canonical string key for this cell.
    #[must_use]
    pub fn pos_key(&self) -> String {
        format!("{},{},{}", self.x, self.y, self.z)
    }

    /// Whether this position is on the floor layer.
    #[must_use]
    pub const fn is_floor_height(&self) -> bool {
        self.z == FLOOR_HEIGHT
    }
}

/// An RGB color attached to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Creates a new color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// What a token renders: an icon reference or free text.
///
/// Serializes as `{"icon_id": …}` or `{"text": …}`, matching the wire
/// encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenContents {
    Icon { icon_id: String },
    Text { text: String },
}

impl TokenContents {
    /// Creates icon contents.
    pub fn icon(icon_id: impl Into<String>) -> Self {
        Self::Icon {
            icon_id: icon_id.into(),
        }
    }

    /// Creates text contents.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Derived content identity: `icon-<id>` or `text-<value>`.
    ///
    /// Two character tokens with equal content ids are interchangeable for
    /// deduplication bookkeeping, but remain distinct entities by id.
    #[must_use]
    pub fn content_id(&self) -> String {
        match self {
            Self::Icon { icon_id } => format!("icon-{icon_id}"),
            Self::Text { text } => format!("text-{text}"),
        }
    }
}

/// Whether a token is a character or a floor tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Character,
    Floor,
}

/// A positioned, renderable board object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: EntityId,
    pub kind: TokenKind,
    pub pos: TokenPos,
    pub contents: TokenContents,
    pub color: Option<Color>,
}

impl Token {
    /// Creates a new uncolored token.
    pub fn new(id: EntityId, kind: TokenKind, pos: TokenPos, contents: TokenContents) -> Self {
        Self {
            id,
            kind,
            pos,
            contents,
            color: None,
        }
    }

    /// Sets the token color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// A board entity tracked by id: a transient ping or a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Ping { id: EntityId, pos: GridPos },
    Token(Token),
}

impl Entity {
    /// Creates a ping entity.
    #[must_use]
    pub const fn ping(id: EntityId, pos: GridPos) -> Self {
        Self::Ping { id, pos }
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Ping { id, .. } => *id,
            Self::Token(token) => token.id,
        }
    }

    /// Canonical string key of the cell this entity occupies.
    #[must_use]
    pub fn pos_key(&self) -> String {
        match self {
            Self::Ping { pos, .. } => pos.pos_key(),
            Self::Token(token) => token.pos.pos_key(),
        }
    }

    /// Content identity, present only for character tokens.
    #[must_use]
    pub fn content_id(&self) -> Option<String> {
        match self {
            Self::Token(token) if token.kind == TokenKind::Character => {
                Some(token.contents.content_id())
            }
            _ => None,
        }
    }

    /// Whether this entity is a ping.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        matches!(self, Self::Ping { .. })
    }

    /// The token, if this entity is one.
    #[must_use]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            Self::Ping { .. } => None,
        }
    }
}

impl From<Token> for Entity {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}
