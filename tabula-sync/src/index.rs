//! Indexed board snapshot.
//!
//! `EntityIndex` owns the primary id → entity map together with two
//! derived lookup maps (content dedup, cell occupancy). The derived maps
//! are cache-coherent views: they are maintained inside every mutation and
//! never exposed for independent mutation, so they cannot diverge from the
//! primary map.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tabula_types::{Action, Entity, EntityId};

/// A snapshot of the board, indexed by id, content and position.
///
/// The primary map is insertion-ordered so that iteration (and therefore
/// diff output) is stable and reproducible for a given history.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    /// Primary map: id → entity.
    entity_by_id: IndexMap<EntityId, Entity>,
    /// Character token ids sharing a rendered content id.
    char_ids_by_content_id: HashMap<String, HashSet<EntityId>>,
    /// Cell key → occupying token id. Pings are not indexed here; the
    /// single-occupant rule applies to tokens only.
    token_ids_by_pos: HashMap<String, EntityId>,
}

impl EntityIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from a sequence of entities, in order.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut index = Self::new();
        for entity in entities {
            index.upsert(entity);
        }
        index
    }

    /// Inserts or fully replaces an entity by id.
    ///
    /// Any prior presence of the same id is removed from both derived maps
    /// first. If a *different* token already occupies the target cell, it
    /// is evicted from the position map (last write wins per cell) but
    /// stays in the primary map until explicitly deleted.
    pub fn upsert(&mut self, entity: Entity) {
        let id = entity.id();
        if let Some(prev) = self.entity_by_id.get(&id) {
            let prev = prev.clone();
            self.unindex(&prev);
        }
        self.index_secondary(&entity);
        self.entity_by_id.insert(id, entity);
    }

    /// Removes an entity by id from all three maps.
    ///
    /// Removing a nonexistent id is a no-op; absence is a common case when
    /// acks race with further local deletes.
    pub fn remove(&mut self, id: &EntityId) {
        if let Some(entity) = self.entity_by_id.shift_remove(id) {
            self.unindex(&entity);
        }
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entity_by_id.get(id)
    }

    /// Whether an entity with this id exists.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entity_by_id.contains_key(id)
    }

    /// Number of entities in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_by_id.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_by_id.is_empty()
    }

    /// Iterates over all entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entity_by_id.values()
    }

    /// The token occupying a cell, if any.
    #[must_use]
    pub fn entity_at(&self, pos_key: &str) -> Option<&Entity> {
        self.token_ids_by_pos
            .get(pos_key)
            .and_then(|id| self.entity_by_id.get(id))
    }

    /// Ids of character tokens currently rendering the given content.
    pub fn chars_with_content<'a>(
        &'a self,
        content_id: &str,
    ) -> impl Iterator<Item = EntityId> + 'a {
        self.char_ids_by_content_id
            .get(content_id)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Applies one action to the snapshot.
    ///
    /// Idempotent when replayed against an index already in the target
    /// state.
    pub fn apply(&mut self, action: &Action) {
        match action {
            Action::Upsert(entity) => self.upsert(entity.clone()),
            Action::Delete(id) => self.remove(id),
            Action::Ping { id, pos } => self.upsert(Entity::ping(*id, *pos)),
        }
    }

    /// Adds an entity to the derived maps, evicting a different occupant
    /// of the same cell.
    fn index_secondary(&mut self, entity: &Entity) {
        if let Some(content_id) = entity.content_id() {
            self.char_ids_by_content_id
                .entry(content_id)
                .or_default()
                .insert(entity.id());
        }
        if !entity.is_ping() {
            self.token_ids_by_pos.insert(entity.pos_key(), entity.id());
        }
    }

    /// Removes an entity's presence from the derived maps.
    fn unindex(&mut self, entity: &Entity) {
        if let Some(content_id) = entity.content_id() {
            if let Some(ids) = self.char_ids_by_content_id.get_mut(&content_id) {
                ids.remove(&entity.id());
                if ids.is_empty() {
                    self.char_ids_by_content_id.remove(&content_id);
                }
            }
        }
        if !entity.is_ping() {
            // Only clear the cell if this entity still owns it; it may
            // already have been evicted by a later occupant.
            let key = entity.pos_key();
            if self.token_ids_by_pos.get(&key) == Some(&entity.id()) {
                self.token_ids_by_pos.remove(&key);
            }
        }
    }
}

/// Value equality over the primary map, independent of insertion order.
/// The derived maps are a function of the primary map and do not
/// participate.
impl PartialEq for EntityIndex {
    fn eq(&self, other: &Self) -> bool {
        self.entity_by_id.len() == other.entity_by_id.len()
            && self
                .entity_by_id
                .iter()
                .all(|(id, entity)| other.entity_by_id.get(id) == Some(entity))
    }
}

impl Eq for EntityIndex {}
