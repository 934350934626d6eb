//! # Collision Manifolds
//!
//! Contact data for one overlapping pair, and the store that keeps the last
//! manifold of every pair currently in contact.
//!
//! The existence of an entry *is* the "colliding" state of a pair: entries
//! appear on the first tick of overlap and disappear on the tick it ends.

use std::collections::HashMap;

use tessel_core::EntityId;
use tessel_shared::Vec2;

// ============================================================================
// MANIFOLD
// ============================================================================

/// How two shapes overlap, seen from the reference body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionManifold {
    /// Unit normal pointing from the reference body toward the other body.
    pub normal: Vec2,
    /// Overlap along `normal`, never negative.
    pub penetration_depth: f32,
    points: [Vec2; 2],
    point_count: usize,
}

impl CollisionManifold {
    /// Maximum number of contact points.
    pub const MAX_POINTS: usize = 2;

    /// Builds a manifold, keeping at most [`Self::MAX_POINTS`] points.
    #[must_use]
    pub fn new(normal: Vec2, penetration_depth: f32, points: &[Vec2]) -> Self {
        let mut manifold = Self {
            normal,
            penetration_depth: penetration_depth.max(0.0),
            ..Self::default()
        };
        for point in points.iter().take(Self::MAX_POINTS) {
            manifold.push_point(*point);
        }
        manifold
    }

    /// Appends a contact point; ignored once full.
    pub fn push_point(&mut self, point: Vec2) {
        if self.point_count < Self::MAX_POINTS {
            self.points[self.point_count] = point;
            self.point_count += 1;
        }
    }

    /// Contact points (0 to 2).
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.point_count]
    }

    /// The same contact seen from the other body.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            ..*self
        }
    }
}

/// A contact as reported to one of the two bodies.
///
/// The manifold normal always points away from the body receiving the event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionEvent {
    /// The entity being touched.
    pub other_entity: EntityId,
    /// Contact data oriented for the receiver.
    pub manifold: CollisionManifold,
}

/// Stored state of one colliding pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManifoldEntry {
    /// Manifold in the reference body's frame.
    pub manifold: CollisionManifold,
    /// Body owning the reference edge.
    pub reference: EntityId,
    /// The pair, smaller slot index first.
    pub pair: (EntityId, EntityId),
}

impl ManifoldEntry {
    /// The partner of `entity` in this pair, if `entity` belongs to it.
    #[must_use]
    pub fn other(&self, entity: EntityId) -> Option<EntityId> {
        if self.pair.0 == entity {
            Some(self.pair.1)
        } else if self.pair.1 == entity {
            Some(self.pair.0)
        } else {
            None
        }
    }

    /// The contact as `entity` should see it.
    #[must_use]
    pub fn event_for(&self, entity: EntityId) -> Option<CollisionEvent> {
        let other_entity = self.other(entity)?;
        let manifold = if self.reference == entity {
            self.manifold
        } else {
            self.manifold.flipped()
        };
        Some(CollisionEvent {
            other_entity,
            manifold,
        })
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Order-independent key of an entity pair for a store of `capacity` slots.
///
/// Unique for every unordered pair of slot indices below `capacity`.
#[inline]
#[must_use]
pub fn pair_key(a: EntityId, b: EntityId, capacity: usize) -> u64 {
    let (lo, hi) = if a.index() <= b.index() {
        (a.index(), b.index())
    } else {
        (b.index(), a.index())
    };
    u64::from(lo) * capacity as u64 + u64::from(hi)
}

/// Last manifold of every pair in contact, plus per-entity contact counts.
#[derive(Debug)]
pub struct ManifoldStore {
    capacity: usize,
    entries: HashMap<u64, ManifoldEntry>,
    /// Per slot: the handle holding the count and the pairs it belongs to.
    active: Vec<(EntityId, u32)>,
}

impl ManifoldStore {
    /// Creates an empty store for `capacity` entity slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            active: vec![(EntityId::NULL, 0); capacity],
        }
    }

    /// Entity slot capacity the keys are built for.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Key of a pair in this store.
    #[inline]
    #[must_use]
    pub fn pair_key(&self, a: EntityId, b: EntityId) -> u64 {
        pair_key(a, b, self.capacity)
    }

    /// Number of pairs in contact.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is in contact.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks whether the pair is in contact.
    #[must_use]
    pub fn exists(&self, a: EntityId, b: EntityId) -> bool {
        self.get(a, b).is_some()
    }

    /// Entry of a pair, if in contact.
    ///
    /// Handles must match the stored pair exactly; a recycled slot never
    /// sees its predecessor's entry.
    #[must_use]
    pub fn get(&self, a: EntityId, b: EntityId) -> Option<&ManifoldEntry> {
        self.entries
            .get(&self.pair_key(a, b))
            .filter(|entry| entry.other(a) == Some(b))
    }

    /// Inserts or replaces the manifold of a pair.
    ///
    /// # Returns
    ///
    /// `true` if the pair was not in contact before.
    pub fn set(
        &mut self,
        a: EntityId,
        b: EntityId,
        manifold: CollisionManifold,
        reference: EntityId,
    ) -> bool {
        let pair = if a.index() <= b.index() { (a, b) } else { (b, a) };
        let entry = ManifoldEntry {
            manifold,
            reference,
            pair,
        };
        let key = self.pair_key(a, b);

        match self.entries.insert(key, entry) {
            Some(previous) if previous.pair == pair => false,
            Some(previous) => {
                // Stale pair under a recycled slot
                self.release(previous.pair);
                self.acquire(pair);
                true
            }
            None => {
                self.acquire(pair);
                true
            }
        }
    }

    /// Removes a pair.
    ///
    /// # Returns
    ///
    /// The removed entry, or None if the pair was not in contact.
    pub fn remove(&mut self, a: EntityId, b: EntityId) -> Option<ManifoldEntry> {
        if !self.exists(a, b) {
            return None;
        }
        let entry = self.entries.remove(&self.pair_key(a, b))?;
        self.release(entry.pair);
        Some(entry)
    }

    /// Number of pairs `entity` belongs to.
    ///
    /// Zero for handles that no longer own their slot's count.
    #[must_use]
    pub fn active_count(&self, entity: EntityId) -> u32 {
        if entity.is_null() {
            return 0;
        }
        match self.active.get(entity.index() as usize) {
            Some(&(holder, count)) if holder == entity => count,
            _ => 0,
        }
    }

    /// O(1) check whether `entity` touches anything.
    #[inline]
    #[must_use]
    pub fn is_colliding(&self, entity: EntityId) -> bool {
        self.active_count(entity) > 0
    }

    /// Drops every pair `entity` belongs to.
    ///
    /// # Returns
    ///
    /// The partners whose pair was dropped.
    pub fn remove_entity(&mut self, entity: EntityId) -> Vec<EntityId> {
        if !self.is_colliding(entity) {
            return Vec::new();
        }

        let keys: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.other(entity).is_some())
            .map(|(key, _)| *key)
            .collect();

        let mut partners = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = self.entries.remove(&key) {
                self.release(entry.pair);
                partners.extend(entry.other(entity));
            }
        }
        partners
    }

    /// Drops every pair for which `keep` returns false, without notification.
    ///
    /// # Returns
    ///
    /// Number of pairs dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ManifoldEntry) -> bool,
    {
        let mut dropped = Vec::new();
        self.entries.retain(|_, entry| {
            let kept = keep(entry);
            if !kept {
                dropped.push(entry.pair);
            }
            kept
        });
        for pair in &dropped {
            self.release(*pair);
        }
        dropped.len()
    }

    /// Iterates every pair in contact, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ManifoldEntry> {
        self.entries.values()
    }

    /// Forgets every pair.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.active
            .iter_mut()
            .for_each(|slot| *slot = (EntityId::NULL, 0));
    }

    fn acquire(&mut self, (a, b): (EntityId, EntityId)) {
        for entity in [a, b] {
            if let Some(slot) = self.active.get_mut(entity.index() as usize) {
                if slot.0 == entity {
                    slot.1 += 1;
                } else {
                    // New generation takes the slot over
                    *slot = (entity, 1);
                }
            }
        }
    }

    fn release(&mut self, (a, b): (EntityId, EntityId)) {
        for entity in [a, b] {
            if let Some(slot) = self.active.get_mut(entity.index() as usize) {
                if slot.0 == entity {
                    slot.1 = slot.1.saturating_sub(1);
                }
            }
        }
    }
}
