use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for an entity in the world.
///
/// Indices are recycled once an entity is despawned; the generation makes a
/// stale id distinguishable from the entity that reused its slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

/// Filter over component types: every `with` type present, no `without` type present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Family {
    all: Vec<TypeId>,
    none: Vec<TypeId>,
}

impl Family {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<T: Any>(mut self) -> Self {
        self.all.push(TypeId::of::<T>());
        self
    }

    #[must_use]
    pub fn without<T: Any>(mut self) -> Self {
        self.none.push(TypeId::of::<T>());
        self
    }
}

type Storage = HashMap<EntityId, Box<dyn Any>>;

/// Entity store with typed, sparse component storage.
///
/// - Entities are identified by `EntityId`
/// - Components are stored in type-based maps keyed by `EntityId`
/// - Iteration follows spawn order so every system sees entities in the same order
/// - Despawned slots go to a free list and are handed out again by `spawn`
pub struct World {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    order: Vec<EntityId>,
    storages: HashMap<TypeId, Storage>,
}

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            storages: HashMap::new(),
        }
    }

    /// Spawn a new entity, reusing a pooled slot when one is free.
    pub fn spawn(&mut self) -> EntityId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = index as usize;
                self.generations[slot] = self.generations[slot].wrapping_add(1);
                self.alive[slot] = true;
                EntityId {
                    index,
                    generation: self.generations[slot],
                }
            }
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                self.alive.push(true);
                EntityId {
                    index,
                    generation: 0,
                }
            }
        };
        self.order.push(id);
        id
    }

    /// Despawn an entity, removing it and all of its components.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        self.alive[entity.index as usize] = false;
        self.free.push(entity.index);
        self.order.retain(|&e| e != entity);
        for storage in self.storages.values_mut() {
            storage.remove(&entity);
        }

        true
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        let slot = entity.index as usize;
        slot < self.alive.len()
            && self.alive[slot]
            && self.generations[slot] == entity.generation
    }

    /// Number of alive entities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if there are no entities in the world.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Alive entities in spawn order.
    pub fn entities(&self) -> &[EntityId] {
        &self.order
    }

    /// Insert a component of type `T`, overwriting any existing component of that type.
    /// Inserting on a dead entity is ignored.
    pub fn insert<T: Any>(&mut self, entity: EntityId, component: T) {
        if !self.is_alive(entity) {
            return;
        }
        self.storages
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(entity, Box::new(component));
    }

    /// Remove and return a component of type `T` for an entity, if it exists.
    pub fn remove<T: Any>(&mut self, entity: EntityId) -> Option<T> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .remove(&entity)
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn get<T: Any>(&self, entity: EntityId) -> Option<&T> {
        self.storages
            .get(&TypeId::of::<T>())?
            .get(&entity)
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .get_mut(&entity)
            .and_then(|boxed| boxed.downcast_mut::<T>())
    }

    pub fn has<T: Any>(&self, entity: EntityId) -> bool {
        self.has_type(entity, TypeId::of::<T>())
    }

    fn has_type(&self, entity: EntityId, type_id: TypeId) -> bool {
        self.storages
            .get(&type_id)
            .is_some_and(|storage| storage.contains_key(&entity))
    }

    /// True if `entity` is alive and belongs to `family`.
    pub fn matches(&self, entity: EntityId, family: &Family) -> bool {
        self.is_alive(entity)
            && family.all.iter().all(|t| self.has_type(entity, *t))
            && !family.none.iter().any(|t| self.has_type(entity, *t))
    }

    /// Snapshot of the entities in `family`, in spawn order.
    pub fn family(&self, family: &Family) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|&e| self.matches(e, family))
            .collect()
    }

    /// Number of entities currently in `family`.
    pub fn count(&self, family: &Family) -> usize {
        self.order.iter().filter(|&&e| self.matches(e, family)).count()
    }

    /// Iterate over all entities that have a component of type `T`, in spawn order.
    pub fn query<T: Any>(&self) -> Vec<(EntityId, &T)> {
        let storage = match self.storages.get(&TypeId::of::<T>()) {
            Some(s) => s,
            None => return Vec::new(),
        };

        self.order
            .iter()
            .filter_map(|entity| {
                storage
                    .get(entity)
                    .and_then(|boxed| boxed.downcast_ref::<T>())
                    .map(|comp| (*entity, comp))
            })
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(i32);
    struct Frozen;

    #[test]
    fn test_insert_get_remove() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Health(3));
        assert_eq!(world.get::<Health>(e), Some(&Health(3)));
        world.get_mut::<Health>(e).unwrap().0 -= 1;
        assert_eq!(world.remove::<Health>(e), Some(Health(2)));
        assert!(world.get::<Health>(e).is_none());
    }

    #[test]
    fn test_despawn_recycles_slot_with_new_generation() {
        let mut world = World::new();
        let a = world.spawn();
        world.insert(a, Health(1));
        assert!(world.despawn(a));
        assert!(!world.despawn(a));

        let b = world.spawn();
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(!world.is_alive(a));
        assert!(world.get::<Health>(b).is_none());

        // a stale id cannot write into the recycled slot
        world.insert(a, Health(9));
        assert!(world.get::<Health>(b).is_none());
    }

    #[test]
    fn test_family_filters_and_keeps_spawn_order() {
        let mut world = World::new();
        let first = world.spawn();
        let frozen = world.spawn();
        let last = world.spawn();
        for e in [first, frozen, last] {
            world.insert(e, Health(1));
        }
        world.insert(frozen, Frozen);

        let family = Family::new().with::<Health>().without::<Frozen>();
        assert_eq!(world.family(&family), vec![first, last]);
        assert_eq!(world.count(&family), 2);

        world.remove::<Frozen>(frozen);
        assert_eq!(world.family(&family), vec![first, frozen, last]);
    }
}
