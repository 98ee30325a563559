//! Error types for the sync layer.

use crate::protocol::ConnectionError;
use tabula_types::RequestId;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
///
/// None of these are fatal: every failure degrades to "local view
/// temporarily diverges from the server, corrected on the next successful
/// exchange".
#[derive(Debug, Error)]
pub enum SyncError {
    /// Inbound message could not be decoded. The raw payload is reported
    /// through the error event; neither index is mutated.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Send attempted before a successful connection event.
    #[error("transport not connected")]
    NotConnected,

    /// The server rejected a batch; its edits are dropped, not applied.
    #[error("request {request_id} rejected by server")]
    Rejected { request_id: RequestId },

    /// The transport closed the connection.
    #[error("connection closed: {0}")]
    Connection(ConnectionError),

    /// The orchestrator command channel is gone.
    #[error("channel closed")]
    ChannelClosed,
}
