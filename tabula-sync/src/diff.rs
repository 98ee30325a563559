//! Snapshot diffing.
//!
//! Pure functions over entity snapshots. The reconciliation step and the
//! outbound batch computation are both expressed as functions of
//! (network snapshot, in-flight actions, local snapshot) rather than as
//! incremental patching, so convergence is testable by index equality.

use crate::index::EntityIndex;
use tabula_types::{Action, Update};

/// The authoritative comparison base: the network snapshot with every
/// in-flight action replayed on top, in order.
///
/// This is what the user should see for everything the server has not yet
/// confirmed, and what outbound diffs compare against so updates already
/// in transit are not resent.
pub fn local_view<'a>(
    network: &EntityIndex,
    in_flight: impl IntoIterator<Item = &'a Action>,
) -> EntityIndex {
    let mut view = network.clone();
    for action in in_flight {
        view.apply(action);
    }
    view
}

/// Computes the minimal ordered update list that brings `network` (after
/// the in-flight actions the server has not yet echoed) into alignment
/// with `local`.
///
/// - present locally, absent in the base: `Create`
/// - present in both but value-unequal: `Move`
/// - present in the base, absent locally: `Delete`
///
/// Output order follows the insertion order of the snapshots, so it is
/// stable and reproducible for a given pair.
pub fn compute_updates<'a>(
    network: &EntityIndex,
    local: &EntityIndex,
    in_flight: impl IntoIterator<Item = &'a Action>,
) -> Vec<Update> {
    let base = local_view(network, in_flight);
    let mut updates = Vec::new();

    for entity in local.entities() {
        match base.get(&entity.id()) {
            None => updates.push(Update::Create(entity.clone())),
            Some(existing) if existing != entity => updates.push(Update::Move(entity.clone())),
            Some(_) => {}
        }
    }

    for entity in base.entities() {
        if !local.contains(&entity.id()) {
            updates.push(Update::Delete(entity.id()));
        }
    }

    updates
}

/// Folds an update list into a snapshot, the way the server would.
pub fn apply_updates(index: &mut EntityIndex, updates: &[Update]) {
    for update in updates {
        index.apply(&update.as_action());
    }
}
