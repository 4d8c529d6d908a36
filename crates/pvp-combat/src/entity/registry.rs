//! Live-entity registry
//!
//! Entities are referenced by [`EntityId`] only. A reference is resolved on
//! every use and comes back empty once the entity has been removed, so no
//! caller can act on a stale entity.

use std::collections::HashMap;

use tracing::debug;

use pvp_core::{DVec3, EntityId};

use super::living::LivingEntity;

/// All living entities known to the combat engine
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, LivingEntity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, returning its id
    pub fn insert(&mut self, entity: LivingEntity) -> EntityId {
        let id = entity.id;
        self.entities.insert(id, entity);
        id
    }

    /// Look up an entity that has not been removed. Dead entities still
    /// resolve.
    pub fn resolve(&self, id: EntityId) -> Option<&LivingEntity> {
        self.entities.get(&id).filter(|entity| !entity.removed)
    }

    /// Mutable [`EntityRegistry::resolve`]
    pub fn resolve_mut(&mut self, id: EntityId) -> Option<&mut LivingEntity> {
        self.entities.get_mut(&id).filter(|entity| !entity.removed)
    }

    /// Look up an entity regardless of removal
    pub fn get(&self, id: EntityId) -> Option<&LivingEntity> {
        self.entities.get(&id)
    }

    /// Mark an entity removed. Its id no longer resolves.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) if !entity.removed => {
                debug!(entity = %id, "Entity removed");
                entity.removed = true;
                true
            }
            _ => false,
        }
    }

    /// Drop removed entities from storage
    pub fn purge_removed(&mut self) {
        self.entities.retain(|_, entity| !entity.removed);
    }

    /// Ids of all alive entities, sorted so iteration is deterministic
    pub fn alive_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .entities
            .values()
            .filter(|entity| entity.is_alive())
            .map(|entity| entity.id)
            .collect();
        ids.sort();
        ids
    }

    /// Ids of alive entities whose position lies within `radius` of `center`
    pub fn alive_ids_near(&self, center: DVec3, radius: f64) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut ids = self.alive_ids();
        ids.retain(|id| {
            self.entities
                .get(id)
                .is_some_and(|entity| entity.position.distance_squared(center) <= radius_sq)
        });
        ids
    }

    /// Advance every live entity by one tick
    pub fn tick_all(&mut self) {
        for entity in self.entities.values_mut() {
            if entity.is_alive() {
                entity.tick();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_entity_does_not_resolve() {
        let mut registry = EntityRegistry::new();
        let id = registry.insert(LivingEntity::player());
        assert!(registry.resolve(id).is_some());
        assert!(registry.remove(id));
        assert!(registry.resolve(id).is_none());
        assert!(registry.resolve_mut(id).is_none());
        assert!(registry.get(id).is_some());
        assert!(!registry.remove(id));
    }

    #[test]
    fn test_unknown_id_does_not_resolve() {
        let registry = EntityRegistry::new();
        assert!(registry.resolve(EntityId::new()).is_none());
    }

    #[test]
    fn test_alive_ids_skip_dead_entities() {
        let mut registry = EntityRegistry::new();
        let alive = registry.insert(LivingEntity::player());
        let mut corpse = LivingEntity::player();
        corpse.dead = true;
        let dead = registry.insert(corpse);
        assert_eq!(registry.alive_ids(), vec![alive]);
        assert!(registry.resolve(dead).is_some());
    }

    #[test]
    fn test_alive_ids_near() {
        let mut registry = EntityRegistry::new();
        let near = registry.insert(LivingEntity::player().with_position(DVec3::new(1.0, 0.0, 0.0)));
        registry.insert(LivingEntity::player().with_position(DVec3::new(10.0, 0.0, 0.0)));
        assert_eq!(registry.alive_ids_near(DVec3::ZERO, 3.0), vec![near]);
    }

    #[test]
    fn test_tick_all_skips_removed() {
        let mut registry = EntityRegistry::new();
        let mut entity = LivingEntity::player();
        entity.invulnerable_ticks = 5;
        let id = registry.insert(entity);
        registry.tick_all();
        assert_eq!(registry.resolve(id).map(|e| e.invulnerable_ticks), Some(4));
        registry.remove(id);
        registry.tick_all();
        assert_eq!(registry.get(id).map(|e| e.invulnerable_ticks), Some(4));
        registry.purge_removed();
        assert!(registry.is_empty());
    }
}
