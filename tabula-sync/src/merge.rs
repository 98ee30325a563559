//! Reconciliation store.
//!
//! `MergeState` holds two snapshots of the board: `network`, the last
//! state confirmed or pushed by the server, and `local`, what the user
//! currently sees. The gap between them is the ordered pending edits:
//! batches already sent and awaiting acknowledgment, plus actions not yet
//! assigned to a batch.
//!
//! `local` is never patched incrementally on network changes; it is
//! recomputed as `network` + replay of everything still pending, which
//! keeps in-flight edits visible while the server's view wins for
//! anything the client did not touch.

use crate::diff;
use crate::index::EntityIndex;
use tabula_types::{Action, Entity, RequestId};
use tracing::debug;

/// A batch of actions sent to the server, awaiting acknowledgment.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedBatch {
    /// The request id the batch was sent under. Acknowledgment and
    /// rejection prune by this identity, never by content equality.
    pub request_id: RequestId,
    /// The actions in the batch, in the order they were applied locally.
    pub actions: Vec<Action>,
}

/// The reconciliation store: server truth, the user's view, and the
/// pending edits between them.
///
/// Created empty at session start and lives for the session; a session
/// reset discards the whole store.
#[derive(Debug, Clone, Default)]
pub struct MergeState {
    local: EntityIndex,
    network: EntityIndex,
    unqueued_actions: Vec<Action>,
    queued_updates: Vec<QueuedBatch>,
}

impl MergeState {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a local action: mutates `local` synchronously (visible to
    /// rendering before any round-trip) and records the action as
    /// unqueued. The sole path by which user intent becomes visible
    /// state; never touches `network`.
    pub fn apply_local_action(&mut self, action: Action) {
        self.local.apply(&action);
        self.unqueued_actions.push(action);
    }

    /// Moves all unqueued actions into a new queued batch tagged with
    /// `request_id`. Called exactly when a batch is flushed to the
    /// transport; later local actions start a fresh unqueued set.
    pub fn collect_update(&mut self, request_id: RequestId) {
        let actions = std::mem::take(&mut self.unqueued_actions);
        self.queued_updates.push(QueuedBatch {
            request_id,
            actions,
        });
    }

    /// Folds authoritative actions into `network`, in order.
    ///
    /// With a `request_id` this is an acknowledgment: exactly the batch
    /// sent under that id is dropped from the queue. Without one it is an
    /// unsolicited push from another client (or the initial snapshot) and
    /// no batch is dropped. Either way `local` is then recomputed as
    /// `network` + replay of every surviving batch and unqueued action.
    pub fn apply_network_update(&mut self, actions: &[Action], request_id: Option<&RequestId>) {
        for action in actions {
            self.network.apply(action);
        }
        if let Some(request_id) = request_id {
            self.queued_updates
                .retain(|batch| batch.request_id != *request_id);
        }
        self.recompute_local();
    }

    /// Rejection path: drops the batch sent under `request_id` without
    /// folding its actions into `network`, then recomputes `local`. The
    /// rejected edit silently vanishes, reverting to what the server
    /// actually holds. Returns whether the batch was known.
    pub fn drop_queued_update(&mut self, request_id: &RequestId) -> bool {
        let before = self.queued_updates.len();
        self.queued_updates
            .retain(|batch| batch.request_id != *request_id);
        let dropped = self.queued_updates.len() != before;
        if dropped {
            self.recompute_local();
        }
        dropped
    }

    /// Replaces `network` wholesale with a full authoritative snapshot
    /// (initial state, or the fresh snapshot after a reconnect) and
    /// recomputes `local`. Queued batches survive until acknowledged,
    /// rejected, or subsumed by a later snapshot.
    pub fn reset_network(&mut self, entities: Vec<Entity>) {
        debug!(entities = entities.len(), "resetting network state from snapshot");
        self.network = EntityIndex::from_entities(entities);
        self.recompute_local();
    }

    /// The index the user should see.
    #[must_use]
    pub fn local(&self) -> &EntityIndex {
        &self.local
    }

    /// The last state confirmed or pushed by the server.
    #[must_use]
    pub fn network(&self) -> &EntityIndex {
        &self.network
    }

    /// Actions in batches already sent but not yet acknowledged, in their
    /// original order. This is the in-flight set the diff engine must not
    /// resend.
    pub fn in_flight_actions(&self) -> impl Iterator<Item = &Action> {
        self.queued_updates.iter().flat_map(|batch| &batch.actions)
    }

    /// Actions applied locally but not yet assigned to a batch.
    #[must_use]
    pub fn unqueued_actions(&self) -> &[Action] {
        &self.unqueued_actions
    }

    /// Request ids of batches awaiting acknowledgment, oldest first.
    pub fn queued_request_ids(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.queued_updates.iter().map(|batch| batch.request_id)
    }

    /// Whether any local edit is not yet embedded in a confirmed network
    /// state.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.unqueued_actions.is_empty() || !self.queued_updates.is_empty()
    }

    /// `local` = `network` + surviving queued batches + unqueued actions,
    /// replayed in original order.
    fn recompute_local(&mut self) {
        let pending = self.in_flight_actions().chain(self.unqueued_actions.iter());
        let local = diff::local_view(&self.network, pending);
        self.local = local;
    }
}
