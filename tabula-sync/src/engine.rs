//! Sync engine — the outbound-batch state machine, without I/O.
//!
//! The engine owns the merge state and decides what to send; the
//! orchestrator handles timing and the transport. Keeping the engine
//! synchronous makes every ordering scenario testable without a runtime.

use crate::diff;
use crate::merge::MergeState;
use std::time::Duration;
use tabula_types::{Action, Entity, RequestId, Update};
use tracing::{debug, info, warn};

/// Throttle interval between outbound flushes.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(60);

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Minimum interval between outbound batches. Rapid local edits
    /// inside one interval coalesce into a single batch.
    pub throttle: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
        }
    }
}

/// One flushed batch, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushOutcome {
    /// Fresh id the batch is tagged with; acks and rejections refer to it.
    pub request_id: RequestId,
    /// The wire updates, in stable snapshot order.
    pub updates: Vec<Update>,
}

/// The sync engine: merge state plus outbound request lifecycle.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    state: MergeState,
}

impl SyncEngine {
    /// Creates an engine with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a user edit to the local view, recording it for the next
    /// flush.
    pub fn apply_local_action(&mut self, action: Action) {
        self.state.apply_local_action(action);
    }

    /// Computes the next outbound batch: the diff between confirmed
    /// network state and the current local view, skipping actions covered
    /// by outstanding unacknowledged batches.
    ///
    /// Returns `None` when there is nothing to send. Local actions that
    /// netted out to nothing stay unqueued; collecting them under a
    /// request id that is never sent would leak a batch no ack can prune.
    pub fn flush(&mut self) -> Option<FlushOutcome> {
        let updates = diff::compute_updates(
            self.state.network(),
            self.state.local(),
            self.state.in_flight_actions(),
        );
        if updates.is_empty() {
            return None;
        }

        let request_id = RequestId::new();
        self.state.collect_update(request_id);
        debug!(%request_id, updates = updates.len(), "flushing batch");
        Some(FlushOutcome {
            request_id,
            updates,
        })
    }

    /// Folds in the full snapshot delivered on (re)connection. Replaces
    /// the network state wholesale; stale in-flight batches are subsumed
    /// once their edits appear, or vanish with the next snapshot.
    pub fn handle_initial_state(&mut self, entities: Vec<Entity>) {
        info!(entities = entities.len(), "received initial board state");
        self.state.reset_network(entities);
    }

    /// Folds in an authoritative entity delta: an ack when `request_id`
    /// names one of our batches, an unsolicited push from another client
    /// otherwise.
    pub fn handle_token_update(
        &mut self,
        request_id: Option<&RequestId>,
        entities: Vec<Entity>,
    ) {
        let actions: Vec<Action> = entities.into_iter().map(upsert_action).collect();
        self.state.apply_network_update(&actions, request_id);
    }

    /// Handles a rejected batch: its edits are dropped without touching
    /// network state, silently reverting them from the visible view.
    pub fn handle_rejection(&mut self, request_id: &RequestId) {
        if self.state.drop_queued_update(request_id) {
            info!(%request_id, "dropped rejected batch");
        } else {
            warn!(%request_id, "rejection for unknown request id");
        }
    }

    /// Whether any local edit awaits a confirmed network state.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.state.has_pending_changes()
    }

    /// The merge state, for inspection.
    #[must_use]
    pub fn state(&self) -> &MergeState {
        &self.state
    }
}

/// The action a pushed entity folds in as.
fn upsert_action(entity: Entity) -> Action {
    match entity {
        Entity::Ping { id, pos } => Action::Ping { id, pos },
        other => Action::Upsert(other),
    }
}
