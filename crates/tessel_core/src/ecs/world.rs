//! # ECS World
//!
//! The central container for entities and their components.
//! Entity slots are pre-allocated at creation and never relocated.

use std::collections::VecDeque;

use super::component::Component;
use super::entity::{EntityId, EntitySlot};
use super::error::{EcsError, EcsResult};
use super::registry::ComponentRegistry;
use super::view::{EntityView, MatchMode};

/// Receives entity destruction notifications.
///
/// The hook runs synchronously inside [`World::destroy_with`], after the
/// handle has been validated and before any component is cleared or the slot
/// is recycled, so the hook can still read the dying entity's components.
pub trait DestroyHook {
    /// Called once for every entity about to be destroyed.
    fn on_entity_destroyed(&mut self, world: &World, entity: EntityId);
}

impl<F> DestroyHook for F
where
    F: FnMut(&World, EntityId),
{
    fn on_entity_destroyed(&mut self, world: &World, entity: EntityId) {
        self(world, entity);
    }
}

/// The ECS World - entity table plus component registry.
///
/// # Capacity
///
/// The world has a fixed number of entity slots set at creation. Component
/// arrays grow on demand, reusing freed slots first.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(4096);
///
/// let entity = world.create();
/// world.add_component::<Transform>(entity).unwrap().position = Vec2::new(1.0, 2.0);
/// ```
pub struct World {
    /// All entity slots (pre-allocated).
    slots: Box<[EntitySlot]>,
    /// Recycled slot indices, reissued first-in first-out.
    free_indices: VecDeque<u32>,
    /// First slot index never handed out yet.
    next_unused: u32,
    /// Number of currently active entities.
    alive_count: usize,
    /// Component storages by registered type.
    components: ComponentRegistry,
    /// Entities created since the last drain.
    uninitialized: Vec<EntityId>,
}

impl World {
    /// Creates a new world with the specified entity capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "Capacity cannot exceed u32::MAX"
        );

        Self {
            slots: vec![EntitySlot::default(); capacity].into_boxed_slice(),
            free_indices: VecDeque::new(),
            next_unused: 0,
            alive_count: 0,
            components: ComponentRegistry::new(capacity),
            uninitialized: Vec::new(),
        }
    }

    /// Fallible form of [`World::new`].
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidCapacity`] if capacity is zero or exceeds `u32::MAX`.
    pub fn try_new(capacity: usize) -> EcsResult<Self> {
        if capacity == 0 || capacity > u32::MAX as usize {
            return Err(EcsError::InvalidCapacity(capacity));
        }
        Ok(Self::new(capacity))
    }

    /// Returns the number of entity slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of currently active entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Creates an entity with an empty component mask.
    ///
    /// Recycled slots are reused before untouched ones. The new handle is
    /// pushed onto the uninitialised worklist.
    ///
    /// # Returns
    ///
    /// The new handle, or `EntityId::NULL` if every slot is active.
    pub fn create(&mut self) -> EntityId {
        let index = if let Some(index) = self.free_indices.pop_front() {
            index
        } else if (self.next_unused as usize) < self.slots.len() {
            let index = self.next_unused;
            self.next_unused += 1;
            index
        } else {
            tracing::warn!(capacity = self.slots.len(), "entity table full");
            return EntityId::NULL;
        };

        let slot = &mut self.slots[index as usize];
        slot.active = true;
        slot.component_mask = 0;

        let id = EntityId::new(index, slot.version);
        self.alive_count += 1;
        self.uninitialized.push(id);
        id
    }

    /// Destroys an entity without notifying anyone.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if the handle was invalid.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        self.destroy_with(id, &mut |_: &World, _: EntityId| {})
    }

    /// Destroys an entity, running `hook` first.
    ///
    /// Clears every component the entity holds, deactivates the slot, bumps
    /// its version (invalidating every outstanding handle) and queues the
    /// index for reuse. Invalid handles are a no-op.
    pub fn destroy_with<H>(&mut self, id: EntityId, hook: &mut H) -> bool
    where
        H: DestroyHook + ?Sized,
    {
        if !self.is_valid(id) {
            return false;
        }

        hook.on_entity_destroyed(self, id);

        let idx = id.index() as usize;
        let mask = self.slots[idx].component_mask;
        let removed = self.components.remove_all(idx, mask);

        let slot = &mut self.slots[idx];
        slot.active = false;
        slot.component_mask = 0;
        slot.version = slot.version.wrapping_add(1);

        self.free_indices.push_back(id.index());
        self.alive_count -= 1;
        self.uninitialized.retain(|pending| *pending != id);

        tracing::trace!(entity = %id, components = removed, "entity destroyed");
        true
    }

    /// Checks if a handle refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }

        match self.slots.get(id.index() as usize) {
            Some(slot) => slot.active && slot.version == id.version(),
            None => false,
        }
    }

    /// Current handle of an active slot.
    #[must_use]
    pub fn entity_at(&self, index: usize) -> Option<EntityId> {
        let slot = self.slots.get(index)?;
        slot.active.then(|| EntityId::new(index as u32, slot.version))
    }

    /// Component mask of a live entity.
    #[must_use]
    pub fn mask_of(&self, id: EntityId) -> Option<u64> {
        self.is_valid(id)
            .then(|| self.slots[id.index() as usize].component_mask)
    }

    /// The raw slot table.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[EntitySlot] {
        &self.slots
    }

    /// The component registry.
    #[inline]
    #[must_use]
    pub const fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Registers `C` eagerly and returns its index.
    ///
    /// # Errors
    ///
    /// [`EcsError::TooManyComponentTypes`] once 64 types are registered.
    pub fn register_component<C: Component>(&mut self) -> EcsResult<usize> {
        self.components.register::<C>()
    }

    /// Attaches a defaulted `C` to an entity.
    ///
    /// # Returns
    ///
    /// The new component, or None if the handle is invalid, the entity
    /// already has a `C`, or `C` cannot be registered.
    pub fn add_component<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        if !self.is_valid(id) {
            return None;
        }

        let component_index = match self.components.register::<C>() {
            Ok(index) => index,
            Err(err) => {
                tracing::warn!(entity = %id, %err, "component not added");
                return None;
            }
        };

        let idx = id.index() as usize;
        if self.slots[idx].has_component(component_index) {
            return None;
        }

        let component = self.components.storage_mut::<C>()?.insert(idx)?;
        self.slots[idx].add_component(component_index);
        Some(component)
    }

    /// Detaches `C` from an entity.
    ///
    /// # Returns
    ///
    /// `true` if a component was removed.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> bool {
        let Some(component_index) = self.live_component_index::<C>(id) else {
            return false;
        };

        let idx = id.index() as usize;
        let removed = self
            .components
            .storage_mut::<C>()
            .is_some_and(|storage| storage.remove(idx));
        self.slots[idx].remove_component(component_index);
        removed
    }

    /// Checks if a live entity has a `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, id: EntityId) -> bool {
        self.live_component_index::<C>(id).is_some()
    }

    /// Gets an entity's `C`.
    #[must_use]
    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.live_component_index::<C>(id)?;
        self.components.storage::<C>()?.get(id.index() as usize)
    }

    /// Gets an entity's `C` mutably.
    pub fn get_component_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        self.live_component_index::<C>(id)?;
        self.components
            .storage_mut::<C>()?
            .get_mut(id.index() as usize)
    }

    /// Mask bit index of `C` if the handle is live and the bit is set.
    fn live_component_index<C: Component>(&self, id: EntityId) -> Option<usize> {
        if !self.is_valid(id) {
            return None;
        }
        let component_index = self.components.index_of::<C>()?;
        self.slots[id.index() as usize]
            .has_component(component_index)
            .then_some(component_index)
    }

    /// Query over active entities by component mask.
    #[must_use]
    pub fn view(&self, mask: u64, mode: MatchMode) -> EntityView<'_> {
        EntityView::new(&self.slots, mask, mode)
    }

    /// Iterates every active entity in slot order.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.view(0, MatchMode::All).iter()
    }

    /// Entities created since the last [`World::drain_uninitialized`].
    #[inline]
    #[must_use]
    pub fn uninitialized(&self) -> &[EntityId] {
        &self.uninitialized
    }

    /// Takes the uninitialised worklist, leaving it empty.
    ///
    /// Entities destroyed before the drain are already gone from the list.
    pub fn drain_uninitialized(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_shared::{Transform, Vec2};

    #[derive(Debug, Default, PartialEq)]
    struct Health(u32);
    impl Component for Health {}

    #[test]
    fn test_world_creation() {
        let world = World::new(1000);
        assert_eq!(world.capacity(), 1000);
        assert_eq!(world.alive_count(), 0);
        assert!(World::try_new(0).is_err());
    }

    #[test]
    fn test_create_destroy() {
        let mut world = World::new(100);

        let id1 = world.create();
        assert!(!id1.is_null());
        assert!(world.is_valid(id1));
        assert_eq!(world.alive_count(), 1);

        let id2 = world.create();
        assert!(!id2.is_null());
        assert_eq!(world.alive_count(), 2);

        assert!(world.destroy(id1));
        assert!(!world.is_valid(id1));
        assert!(!world.destroy(id1));
        assert_eq!(world.alive_count(), 1);

        // Create again - should reuse the slot with a new version
        let id3 = world.create();
        assert_eq!(id3.index(), id1.index());
        assert_ne!(id3.version(), id1.version());
        assert!(world.is_valid(id3));
        assert!(!world.is_valid(id1));
    }

    #[test]
    fn test_full_world_returns_null() {
        let mut world = World::new(2);
        assert!(!world.create().is_null());
        assert!(!world.create().is_null());
        assert!(world.create().is_null());
    }

    #[test]
    fn test_add_get_remove_component() {
        let mut world = World::new(10);
        let id = world.create();

        let health = world.add_component::<Health>(id).unwrap();
        assert_eq!(*health, Health(0));
        health.0 = 30;

        assert!(world.add_component::<Health>(id).is_none());
        assert_eq!(world.get_component::<Health>(id), Some(&Health(30)));
        assert!(world.has_component::<Health>(id));

        assert!(world.remove_component::<Health>(id));
        assert!(world.get_component::<Health>(id).is_none());
        assert!(!world.remove_component::<Health>(id));
    }

    #[test]
    fn test_component_ops_on_stale_handle() {
        let mut world = World::new(10);
        let id = world.create();
        world.add_component::<Health>(id).unwrap().0 = 5;
        world.destroy(id);

        assert!(world.add_component::<Health>(id).is_none());
        assert!(world.get_component::<Health>(id).is_none());
        assert!(!world.remove_component::<Health>(id));

        // Components of the dead entity do not leak into the recycled slot
        let fresh = world.create();
        assert_eq!(fresh.index(), id.index());
        assert!(world.get_component::<Health>(fresh).is_none());
        assert_eq!(world.mask_of(fresh), Some(0));
    }

    #[test]
    fn test_destroy_hook_sees_components() {
        let mut world = World::new(10);
        let id = world.create();
        world.add_component::<Transform>(id).unwrap().position = Vec2::new(4.0, 2.0);

        let mut seen = Vec::new();
        world.destroy_with(id, &mut |w: &World, e: EntityId| {
            seen.push(w.get_component::<Transform>(e).map(|t| t.position));
        });

        assert_eq!(seen, vec![Some(Vec2::new(4.0, 2.0))]);
        assert!(!world.is_valid(id));
    }

    #[test]
    fn test_uninitialized_worklist() {
        let mut world = World::new(10);
        let a = world.create();
        let b = world.create();
        world.destroy(a);

        assert_eq!(world.uninitialized(), &[b]);
        assert_eq!(world.drain_uninitialized(), vec![b]);
        assert!(world.uninitialized().is_empty());
    }

    #[test]
    fn test_view_over_world() {
        let mut world = World::new(10);
        let a = world.create();
        let b = world.create();
        let c = world.create();
        world.add_component::<Transform>(a);
        world.add_component::<Transform>(c);
        world.add_component::<Health>(c);

        let transform_bit = 1 << world.components().index_of::<Transform>().unwrap();
        let health_bit = 1 << world.components().index_of::<Health>().unwrap();

        let both: Vec<_> = world.view(transform_bit | health_bit, MatchMode::All).iter().collect();
        assert_eq!(both, vec![c]);

        let either: Vec<_> = world.view(transform_bit | health_bit, MatchMode::Any).iter().collect();
        assert_eq!(either, vec![a, c]);

        assert_eq!(world.iter_alive().collect::<Vec<_>>(), vec![a, b, c]);
    }
}
