//! # Entity Views
//!
//! Lazy iteration over active entities whose component mask matches a query.
//!
//! Iteration order is slot order `0..capacity`, not insertion order, so two
//! traversals of the same world state always agree. A view borrows the world,
//! which rules out structural changes (create/destroy, add/remove component)
//! while a traversal is in flight; collect the handles first when a pass must
//! mutate.

use super::entity::{EntityId, EntitySlot};

/// How a view compares the query mask with an entity's mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Every requested bit must be set (an empty mask matches every entity).
    #[default]
    All,
    /// At least one requested bit must be set (an empty mask matches nothing).
    Any,
}

impl MatchMode {
    /// Checks an entity mask against a query mask.
    #[inline]
    #[must_use]
    pub const fn matches(self, entity_mask: u64, query_mask: u64) -> bool {
        match self {
            Self::All => entity_mask & query_mask == query_mask,
            Self::Any => entity_mask & query_mask != 0,
        }
    }
}

/// A restartable query over the entity table.
#[derive(Clone, Copy, Debug)]
pub struct EntityView<'w> {
    slots: &'w [EntitySlot],
    mask: u64,
    mode: MatchMode,
}

impl<'w> EntityView<'w> {
    /// Creates a view over a slot table.
    #[must_use]
    pub const fn new(slots: &'w [EntitySlot], mask: u64, mode: MatchMode) -> Self {
        Self { slots, mask, mode }
    }

    /// The query mask.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    /// The match mode.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Starts a new traversal.
    #[must_use]
    pub fn iter(&self) -> ViewIter<'w> {
        ViewIter {
            slots: self.slots,
            mask: self.mask,
            mode: self.mode,
            next: 0,
        }
    }

    /// Counts matching entities (full traversal).
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

impl<'w> IntoIterator for &EntityView<'w> {
    type Item = EntityId;
    type IntoIter = ViewIter<'w>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator produced by [`EntityView::iter`].
#[derive(Clone, Debug)]
pub struct ViewIter<'w> {
    slots: &'w [EntitySlot],
    mask: u64,
    mode: MatchMode,
    next: usize,
}

impl Iterator for ViewIter<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        while let Some(slot) = self.slots.get(self.next) {
            let index = self.next;
            self.next += 1;
            if slot.active && self.mode.matches(slot.component_mask, self.mask) {
                return Some(EntityId::new(index as u32, slot.version));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len().saturating_sub(self.next)))
    }
}
