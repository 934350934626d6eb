//! # Component Storage
//!
//! Dense, per-type component storage with stable slots.
//!
//! The storage uses a slot-array strategy:
//! - Components live contiguously in a `Vec`
//! - `entity -> slot` and `slot -> entity` maps give O(1) lookup both ways
//! - Freed slots go into a queue and are reissued before the array grows,
//!   so removal never shifts other entries

use std::any::Any;
use std::collections::VecDeque;

use super::component::Component;

/// Sentinel for "no mapping" in the index maps.
const UNMAPPED: u32 = u32::MAX;

/// Storage for a single component type.
///
/// Guarantees:
/// - Every live mapping points at a populated slot
/// - Every populated slot belongs to exactly one entity index
/// - Reissued slots hold a freshly defaulted value
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Transform> = ComponentStorage::new(1024);
/// storage.insert(7).unwrap().position = Vec2::new(1.0, 2.0);
/// ```
pub struct ComponentStorage<C: Component> {
    /// The dense array of components.
    data: Vec<C>,
    /// Entity index -> slot (`UNMAPPED` when absent). Sized to entity capacity.
    entity_to_slot: Box<[u32]>,
    /// Slot -> entity index (`UNMAPPED` when the slot is free).
    slot_to_entity: Vec<u32>,
    /// Slots waiting to be reissued.
    free_slots: VecDeque<u32>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates storage able to map entity indices `0..entity_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(entity_capacity: usize) -> Self {
        assert!(entity_capacity > 0, "Capacity must be greater than zero");

        Self {
            data: Vec::new(),
            entity_to_slot: vec![UNMAPPED; entity_capacity].into_boxed_slice(),
            slot_to_entity: Vec::new(),
            free_slots: VecDeque::new(),
        }
    }

    /// Returns the number of entity indices this storage can map.
    #[inline]
    #[must_use]
    pub fn entity_capacity(&self) -> usize {
        self.entity_to_slot.len()
    }

    /// Returns the number of live components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() - self.free_slots.len()
    }

    /// Returns true if no component is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether an entity index has a component here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity_index: usize) -> bool {
        self.slot_of(entity_index).is_some()
    }

    /// Returns the slot holding the entity's component.
    #[inline]
    #[must_use]
    pub fn slot_of(&self, entity_index: usize) -> Option<usize> {
        match self.entity_to_slot.get(entity_index) {
            Some(&slot) if slot != UNMAPPED => Some(slot as usize),
            _ => None,
        }
    }

    /// Returns the entity index owning a slot.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, slot: usize) -> Option<usize> {
        match self.slot_to_entity.get(slot) {
            Some(&entity) if entity != UNMAPPED => Some(entity as usize),
            _ => None,
        }
    }

    /// Allocates a defaulted component for an entity index.
    ///
    /// # Returns
    ///
    /// The new component, or None if the index is out of range or already
    /// holds a component of this type.
    pub fn insert(&mut self, entity_index: usize) -> Option<&mut C> {
        let mapped = *self.entity_to_slot.get(entity_index)?;
        if mapped != UNMAPPED {
            return None;
        }

        let slot = if let Some(slot) = self.free_slots.pop_front() {
            let slot = slot as usize;
            self.data[slot] = C::default();
            self.slot_to_entity[slot] = entity_index as u32;
            slot
        } else {
            self.data.push(C::default());
            self.slot_to_entity.push(entity_index as u32);
            self.data.len() - 1
        };

        self.entity_to_slot[entity_index] = slot as u32;
        self.data.get_mut(slot)
    }

    /// Removes the entity's component, queueing its slot for reuse.
    ///
    /// # Returns
    ///
    /// `true` if a component was removed.
    pub fn remove(&mut self, entity_index: usize) -> bool {
        let Some(slot) = self.slot_of(entity_index) else {
            return false;
        };

        self.entity_to_slot[entity_index] = UNMAPPED;
        self.slot_to_entity[slot] = UNMAPPED;
        // Drop owned data now rather than at reissue time
        self.data[slot] = C::default();
        self.free_slots.push_back(slot as u32);
        true
    }

    /// Gets the entity's component.
    #[inline]
    #[must_use]
    pub fn get(&self, entity_index: usize) -> Option<&C> {
        self.slot_of(entity_index).and_then(|slot| self.data.get(slot))
    }

    /// Gets the entity's component mutably.
    #[inline]
    pub fn get_mut(&mut self, entity_index: usize) -> Option<&mut C> {
        let slot = self.slot_of(entity_index)?;
        self.data.get_mut(slot)
    }

    /// Iterates live components as `(entity_index, component)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.slot_to_entity
            .iter()
            .zip(self.data.iter())
            .filter(|&(&entity, _)| entity != UNMAPPED)
            .map(|(&entity, component)| (entity as usize, component))
    }

    /// Iterates live components mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut C)> {
        self.slot_to_entity
            .iter()
            .zip(self.data.iter_mut())
            .filter(|&(&entity, _)| entity != UNMAPPED)
            .map(|(&entity, component)| (entity as usize, component))
    }
}

/// Type-erased view of a [`ComponentStorage`], held by the registry.
pub trait ErasedStorage: Any {
    /// Removes the component of an entity index, if present.
    fn remove_entity(&mut self, entity_index: usize) -> bool;

    /// Number of live components.
    fn live_count(&self) -> usize;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn remove_entity(&mut self, entity_index: usize) -> bool {
        self.remove(entity_index)
    }

    fn live_count(&self) -> usize {
        self.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
