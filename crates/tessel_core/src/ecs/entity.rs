//! # Entity Management
//!
//! Entities are lightweight handles consisting of:
//! - A slot index into the fixed entity table
//! - A version counter that invalidates handles when the slot is recycled

use std::fmt;

/// Versioned handle to an entity slot.
///
/// The handle is split into two parts:
/// - Lower 32 bits: slot index
/// - Upper 32 bits: version of the slot when the handle was issued
///
/// Two handles are equal iff both parts match. A handle is only valid while
/// its slot is active and the slot's version still equals the handle's.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a handle from slot index and version.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, version: u32) -> Self {
        Self(((version as u64) << 32) | (index as u64))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the version the handle was issued with.
    #[inline]
    #[must_use]
    pub const fn version(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity handle.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this handle is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(NULL)")
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.version())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.version())
    }
}

/// One slot of the entity table.
///
/// Slots are allocated once when the world is created and never move.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntitySlot {
    /// Whether the slot currently holds a live entity.
    pub active: bool,
    /// Current version; bumped every time the slot is destroyed.
    pub version: u32,
    /// Bitmask of attached components (up to 64 component types).
    pub component_mask: u64,
}

impl EntitySlot {
    /// Checks if this slot has a specific component.
    ///
    /// # Arguments
    ///
    /// * `component_index` - The registered component index (0-63)
    #[inline]
    #[must_use]
    pub const fn has_component(self, component_index: usize) -> bool {
        (self.component_mask & (1 << component_index)) != 0
    }

    /// Sets a component bit.
    #[inline]
    pub fn add_component(&mut self, component_index: usize) {
        self.component_mask |= 1 << component_index;
    }

    /// Clears a component bit.
    #[inline]
    pub fn remove_component(&mut self, component_index: usize) {
        self.component_mask &= !(1 << component_index);
    }
}
