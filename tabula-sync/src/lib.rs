//! Optimistic client-side synchronization engine for tabula boards.
//!
//! Several clients share one spatial board of tokens and pings through an
//! authoritative server. This crate makes a user's edits visible
//! immediately while staying eventually consistent with the server and
//! with concurrent edits from other clients.
//!
//! # Architecture
//!
//! - **Index**: an in-memory snapshot of all board entities with derived
//!   lookup maps (content dedup, cell occupancy)
//! - **Merge**: two indexes — `network` (last server truth) and `local`
//!   (what the user sees) — plus the edits not yet confirmed
//! - **Diff**: computes the minimal update list between two snapshots,
//!   skipping edits already in flight
//! - **Protocol**: the JSON wire encoding and close-code mapping
//! - **Transport**: the abstraction over the connection; implementations
//!   live outside this crate
//! - **Engine / Orchestrator**: the engine is a pure state machine over
//!   the merge state; the orchestrator drives it from a tokio task,
//!   throttling outbound batches and folding in server responses
//!
//! # Data flow
//!
//! User intent → [`MergeState::apply_local_action`] (visible immediately)
//! → throttled flush → [`diff::compute_updates`] → transport send tagged
//! with a [`RequestId`](tabula_types::RequestId) → server ack, rejection,
//! or unsolicited push → [`MergeState::apply_network_update`] → `local`
//! recomputed as server truth + surviving pending edits.

pub mod diff;
mod engine;
mod error;
mod index;
mod merge;
mod orchestrator;
pub mod protocol;
pub mod transport;

pub use engine::{FlushOutcome, SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use index::EntityIndex;
pub use merge::{MergeState, QueuedBatch};
pub use orchestrator::{spawn_orchestrator, OrchestratorHandle, SyncCommand};
pub use protocol::{
    decode_server_message, encode_request, BoardMessage, ConnectionError, ServerMessage,
    WireEntity, WireUpdate,
};
pub use transport::{BoardTransport, TransportEvent};
