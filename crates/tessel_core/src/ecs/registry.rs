//! # Component Type Registry
//!
//! Maps each component type to a small, stable index the first time the type
//! is touched, and owns one type-erased [`ComponentStorage`] per index.
//!
//! Every registration is appended to a log. Systems keep a cursor into the
//! log and pull new records to build their interest masks (e.g. "which
//! indices are colliders") without hard-coding indices.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use tessel_shared::MAX_COMPONENT_TYPES;

use super::component::Component;
use super::error::{EcsError, EcsResult};
use super::storage::{ComponentStorage, ErasedStorage};

/// Record of one component type registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentRegistration {
    /// Index (bit position in the presence mask) given to the type.
    pub index: usize,
    /// Category tag declared by the type.
    pub tag: Option<&'static str>,
    /// Rust type name, for diagnostics.
    pub type_name: &'static str,
}

impl ComponentRegistration {
    /// Presence-mask bit of this registration.
    #[inline]
    #[must_use]
    pub const fn bit(&self) -> u64 {
        1 << self.index
    }
}

/// Owner of every component storage.
pub struct ComponentRegistry {
    /// Entity capacity handed to each new storage.
    entity_capacity: usize,
    /// Type -> index.
    indices: HashMap<TypeId, usize>,
    /// Index -> storage.
    storages: Vec<Box<dyn ErasedStorage>>,
    /// Append-only registration log.
    registrations: Vec<ComponentRegistration>,
}

impl ComponentRegistry {
    /// Creates an empty registry whose storages map `entity_capacity` slots.
    #[must_use]
    pub fn new(entity_capacity: usize) -> Self {
        Self {
            entity_capacity,
            indices: HashMap::new(),
            storages: Vec::with_capacity(MAX_COMPONENT_TYPES),
            registrations: Vec::with_capacity(MAX_COMPONENT_TYPES),
        }
    }

    /// Number of registered component types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.storages.len()
    }

    /// Returns true if no type is registered yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }

    /// Index of `C`, without registering it.
    #[inline]
    #[must_use]
    pub fn index_of<C: Component>(&self) -> Option<usize> {
        self.indices.get(&TypeId::of::<C>()).copied()
    }

    /// Returns the index of `C`, registering it on first use.
    ///
    /// # Errors
    ///
    /// [`EcsError::TooManyComponentTypes`] once every mask bit is taken.
    pub fn register<C: Component>(&mut self) -> EcsResult<usize> {
        if let Some(index) = self.index_of::<C>() {
            return Ok(index);
        }

        if self.storages.len() >= MAX_COMPONENT_TYPES {
            return Err(EcsError::TooManyComponentTypes {
                limit: MAX_COMPONENT_TYPES,
                type_name: type_name::<C>(),
            });
        }

        let index = self.storages.len();
        self.storages
            .push(Box::new(ComponentStorage::<C>::new(self.entity_capacity)));
        self.indices.insert(TypeId::of::<C>(), index);

        let registration = ComponentRegistration {
            index,
            tag: C::TAG,
            type_name: type_name::<C>(),
        };
        tracing::debug!(
            index,
            tag = registration.tag.unwrap_or("-"),
            type_name = registration.type_name,
            "component type registered"
        );
        self.registrations.push(registration);

        Ok(index)
    }

    /// Typed storage of `C`, if registered.
    #[must_use]
    pub fn storage<C: Component>(&self) -> Option<&ComponentStorage<C>> {
        let index = self.index_of::<C>()?;
        self.storages[index]
            .as_any()
            .downcast_ref::<ComponentStorage<C>>()
    }

    /// Mutable typed storage of `C`, if registered.
    pub fn storage_mut<C: Component>(&mut self) -> Option<&mut ComponentStorage<C>> {
        let index = self.index_of::<C>()?;
        self.storages[index]
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
    }

    /// Removes every component whose bit is set in `mask` from an entity index.
    ///
    /// # Returns
    ///
    /// Number of components removed.
    pub fn remove_all(&mut self, entity_index: usize, mask: u64) -> usize {
        let mut removed = 0;
        let mut bits = mask;
        while bits != 0 {
            let index = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            if let Some(storage) = self.storages.get_mut(index) {
                if storage.remove_entity(entity_index) {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Live component count of the type at `index`.
    #[must_use]
    pub fn live_count(&self, index: usize) -> usize {
        self.storages.get(index).map_or(0, |s| s.live_count())
    }

    /// The full registration log.
    #[inline]
    #[must_use]
    pub fn registrations(&self) -> &[ComponentRegistration] {
        &self.registrations
    }

    /// Registrations appended after the first `cursor` records.
    #[inline]
    #[must_use]
    pub fn registrations_since(&self, cursor: usize) -> &[ComponentRegistration] {
        self.registrations.get(cursor..).unwrap_or(&[])
    }

    /// Presence mask of every registered type carrying `tag`.
    #[must_use]
    pub fn mask_for_tag(&self, tag: &str) -> u64 {
        self.registrations
            .iter()
            .filter(|r| r.tag == Some(tag))
            .fold(0, |mask, r| mask | r.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Health;
    impl Component for Health {}

    #[derive(Default)]
    struct Hitbox;
    impl Component for Hitbox {
        const TAG: Option<&'static str> = Some("collider");
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = ComponentRegistry::new(16);
        let a = registry.register::<Health>().unwrap();
        let b = registry.register::<Hitbox>().unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(registry.register::<Health>().unwrap(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registration_log_and_tag_mask() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Health>().unwrap();
        registry.register::<Hitbox>().unwrap();

        assert_eq!(registry.registrations().len(), 2);
        let new = registry.registrations_since(1);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].tag, Some("collider"));
        assert!(registry.registrations_since(5).is_empty());

        assert_eq!(registry.mask_for_tag("collider"), 0b10);
        assert_eq!(registry.mask_for_tag("missing"), 0);
    }

    #[test]
    fn test_remove_all_clears_masked_storages() {
        let mut registry = ComponentRegistry::new(16);
        registry.register::<Health>().unwrap();
        registry.register::<Hitbox>().unwrap();
        registry.storage_mut::<Health>().unwrap().insert(3);
        registry.storage_mut::<Hitbox>().unwrap().insert(3);

        assert_eq!(registry.remove_all(3, 0b11), 2);
        assert_eq!(registry.live_count(0), 0);
        assert_eq!(registry.live_count(1), 0);
    }

    macro_rules! many_components {
        ($($name:ident),*) => {
            $(
                #[derive(Default)]
                struct $name;
                impl Component for $name {}
            )*
            fn register_all(registry: &mut ComponentRegistry) {
                $( registry.register::<$name>().unwrap(); )*
            }
        };
    }

    many_components!(
        C00, C01, C02, C03, C04, C05, C06, C07, C08, C09, C10, C11, C12, C13, C14, C15,
        C16, C17, C18, C19, C20, C21, C22, C23, C24, C25, C26, C27, C28, C29, C30, C31,
        C32, C33, C34, C35, C36, C37, C38, C39, C40, C41, C42, C43, C44, C45, C46, C47,
        C48, C49, C50, C51, C52, C53, C54, C55, C56, C57, C58, C59, C60, C61, C62, C63
    );

    #[test]
    fn test_sixty_fifth_type_is_rejected() {
        let mut registry = ComponentRegistry::new(4);
        register_all(&mut registry);
        assert_eq!(registry.len(), MAX_COMPONENT_TYPES);

        let err = registry.register::<Health>().unwrap_err();
        assert!(matches!(err, EcsError::TooManyComponentTypes { limit: 64, .. }));
    }
}
