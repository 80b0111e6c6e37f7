//! Scene graph storage.
//!
//! The history and manipulation engines never own scene data. They read and
//! write it through [`SceneStore`], so an editor can plug in whatever backing
//! store it renders from. [`SceneGraph`] is the in-memory store used by
//! [`EditDocument`](super::EditDocument).

use std::collections::HashMap;

use super::{EntityId, EntityPatch, PartId, SceneEntity};

/// Contract the edit core consumes from the scene graph.
pub trait SceneStore {
    /// Look up an entity by id.
    fn lookup(&self, id: EntityId) -> Option<&SceneEntity>;

    /// All entity ids, in storage order.
    fn list(&self) -> Vec<EntityId>;

    /// Write the set fields of `patch` into the entity.
    /// Returns false if the id does not resolve.
    fn apply(&mut self, id: EntityId, patch: &EntityPatch) -> bool;

    /// Insert an entity, replacing any entity with the same id.
    fn insert(&mut self, entity: SceneEntity);

    /// Remove an entity, returning it.
    fn delete(&mut self, id: EntityId) -> Option<SceneEntity>;

    /// Storage position of `id`.
    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.list().iter().position(|&e| e == id)
    }

    /// Insert an entity at storage position `index`, clamped to the end.
    /// Stores without positional insert append.
    fn insert_at(&mut self, _index: usize, entity: SceneEntity) {
        self.insert(entity);
    }

    /// Direct children of `id`, sorted by sibling order.
    fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        let mut children: Vec<(i32, EntityId)> = self
            .list()
            .into_iter()
            .filter_map(|child| self.lookup(child))
            .filter(|e| e.parent == Some(id))
            .map(|e| (e.order, e.id))
            .collect();
        children.sort();
        children.into_iter().map(|(_, id)| id).collect()
    }

    /// Find the entity owning a part. Walks the whole store.
    fn find_part_owner(&self, part: PartId) -> Option<EntityId> {
        self.list()
            .into_iter()
            .find(|&id| self.lookup(id).is_some_and(|e| e.part(part).is_some()))
    }
}

/// Hands out ids above the highest one seen. Once the id range is used up
/// it falls back to the lowest ids that are free again.
#[derive(Clone, Debug)]
struct IdAllocator {
    next: u64,
    max: u64,
    exhausted: bool,
    reclaim: u64,
}

impl IdAllocator {
    fn new(max: u64) -> Self {
        Self { next: 1, max, exhausted: false, reclaim: 1 }
    }

    fn reserve(&mut self, seen: u64) {
        if self.exhausted || seen < self.next {
            return;
        }
        match seen.checked_add(1).filter(|&next| next <= self.max) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
    }

    fn allocate(&mut self, is_free: impl Fn(u64) -> bool) -> Option<u64> {
        if !self.exhausted {
            let id = self.next;
            self.reserve(id);
            return Some(id);
        }
        let id = (self.reclaim..=self.max).find(|&id| is_free(id))?;
        self.reclaim = id.saturating_add(1);
        Some(id)
    }
}

/// In-memory scene graph.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    entities: Vec<SceneEntity>,
    entity_map: HashMap<EntityId, usize>,
    entity_ids: IdAllocator,
    part_ids: IdAllocator,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            entity_map: HashMap::new(),
            entity_ids: IdAllocator::new(u64::from(u32::MAX)),
            part_ids: IdAllocator::new(u64::MAX),
        }
    }

    /// Build a graph from existing entities. Later duplicates of an id replace earlier ones.
    pub fn from_entities(entities: impl IntoIterator<Item = SceneEntity>) -> Self {
        let mut graph = Self::new();
        for entity in entities {
            graph.insert(entity);
        }
        graph
    }

    /// Generate the next entity ID.
    ///
    /// Returns `u32::MAX` only if every id is held by an entity.
    pub fn next_entity_id(&mut self) -> EntityId {
        let entity_map = &self.entity_map;
        let id = self
            .entity_ids
            .allocate(|id| !entity_map.contains_key(&EntityId(id as u32)))
            .unwrap_or(u64::from(u32::MAX));
        EntityId(id as u32)
    }

    /// Generate the next part ID.
    pub fn next_part_id(&mut self) -> PartId {
        let entities = &self.entities;
        let id = self
            .part_ids
            .allocate(|id| entities.iter().all(|e| e.part(PartId(id)).is_none()))
            .unwrap_or(u64::MAX);
        PartId(id)
    }

    /// Order value that places a new child after its existing siblings.
    pub fn next_order(&self, parent: Option<EntityId>) -> i32 {
        self.entities
            .iter()
            .filter(|e| e.parent == parent)
            .map(|e| e.order + 1)
            .max()
            .unwrap_or(0)
    }

    /// Get an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entity_map.get(&id).map(|&idx| &self.entities[idx])
    }

    /// Get a mutable entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entity_map.get(&id).map(|&idx| &mut self.entities[idx])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity_map.contains_key(&id)
    }

    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    /// Entities without a parent, sorted by order.
    pub fn roots(&self) -> Vec<EntityId> {
        let mut roots: Vec<(i32, EntityId)> = self
            .entities
            .iter()
            .filter(|e| e.parent.is_none())
            .map(|e| (e.order, e.id))
            .collect();
        roots.sort();
        roots.into_iter().map(|(_, id)| id).collect()
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    ///
    /// Stops after visiting every entity once, so a corrupted (cyclic) graph
    /// cannot hang the walk.
    pub fn is_ancestor_or_self(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.entities.len() {
                return false;
            }
            current = self.get(cur).and_then(|e| e.parent);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity. Id counters are reset.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.entity_map.clear();
        self.entity_ids = IdAllocator::new(u64::from(u32::MAX));
        self.part_ids = IdAllocator::new(u64::MAX);
    }

    fn reserve_ids(&mut self, entity: &SceneEntity) {
        self.entity_ids.reserve(u64::from(entity.id.0));
        if let Some(max_part) = entity.parts.iter().map(|p| p.id.0).max() {
            self.part_ids.reserve(max_part);
        }
    }
}

impl SceneStore for SceneGraph {
    fn lookup(&self, id: EntityId) -> Option<&SceneEntity> {
        self.get(id)
    }

    fn list(&self) -> Vec<EntityId> {
        self.entity_ids()
    }

    fn apply(&mut self, id: EntityId, patch: &EntityPatch) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                patch.apply_to(entity);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, entity: SceneEntity) {
        self.reserve_ids(&entity);
        if let Some(&idx) = self.entity_map.get(&entity.id) {
            self.entities[idx] = entity;
            return;
        }
        let id = entity.id;
        let idx = self.entities.len();
        self.entities.push(entity);
        self.entity_map.insert(id, idx);
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entity_map.get(&id).copied()
    }

    fn insert_at(&mut self, index: usize, entity: SceneEntity) {
        if self.entity_map.contains_key(&entity.id) {
            self.insert(entity);
            return;
        }
        self.reserve_ids(&entity);

        let idx = index.min(self.entities.len());
        for eidx in self.entity_map.values_mut() {
            if *eidx >= idx {
                *eidx += 1;
            }
        }
        self.entity_map.insert(entity.id, idx);
        self.entities.insert(idx, entity);
    }

    fn delete(&mut self, id: EntityId) -> Option<SceneEntity> {
        let idx = self.entity_map.remove(&id)?;
        let entity = self.entities.remove(idx);

        // Update indices for entities after the removed one
        for eidx in self.entity_map.values_mut() {
            if *eidx > idx {
                *eidx -= 1;
            }
        }

        Some(entity)
    }
}
