//! # Physics System
//!
//! Per fixed tick:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. SYNC      pull new component registrations, prune dead entries   │
//! │ 2. REFRESH   snapshot transforms, rebuild the flat collider list    │
//! │ 3. BROAD     every unordered pair once: static skip, radius reject  │
//! │ 4. NARROW    shape-pair table dispatch                              │
//! │ 5. STATE     upsert/remove manifolds, fire enter/leave callbacks    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The system never owns component data. It borrows the world for the
//! duration of a call and keeps only the working list, the manifold store
//! and its interest mask between ticks.

use tessel_core::{DestroyHook, EntityId, MatchMode, Transform, World};
use tessel_shared::Vec2;

use crate::config::PhysicsConfig;

use super::cast::{Cast, CastHit};
use super::collider::{Collider, ShapeTag, COLLIDER_TAG};
use super::debug::{draw_shape, DebugColor, DebugRenderer, NORMAL_DRAW_LENGTH};
use super::manifold::{CollisionEvent, ManifoldStore};
use super::narrow_phase::{closest_point_on_segment, collide, Contact, WorldShape};

/// One collider in the per-tick working list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderProxy {
    /// Owning entity.
    pub entity: EntityId,
    /// Shape tag used for dispatch.
    pub tag: ShapeTag,
    /// World-space shape.
    pub shape: WorldShape,
    /// Bounding circle centre.
    pub center: Vec2,
    /// Bounding circle radius.
    pub bounding_radius: f32,
    /// Static flag.
    pub is_static: bool,
}

impl ColliderProxy {
    fn build(entity: EntityId, collider: &Collider) -> Self {
        let transform = collider.transform();
        Self {
            entity,
            tag: collider.tag(),
            shape: WorldShape::from_collider(collider.shape(), transform),
            center: transform.position,
            bounding_radius: collider.bounding_radius(),
            is_static: collider.is_static(),
        }
    }
}

/// Contact transition, queued for data-oriented consumers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactEvent {
    /// `.0` started touching `.1.other_entity`; the normal points away from `.0`.
    Enter(EntityId, CollisionEvent),
    /// `.0` stopped touching `.1`.
    Leave(EntityId, EntityId),
}

/// Counters of one [`PhysicsSystem::fixed_update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Colliders in the working list.
    pub colliders: u32,
    /// Unordered pairs visited.
    pub pairs_considered: u32,
    /// Pairs skipped because both colliders are static.
    pub static_pairs_skipped: u32,
    /// Pairs rejected by the bounding-circle test.
    pub broad_phase_rejects: u32,
    /// Exact shape tests run.
    pub narrow_phase_calls: u32,
    /// Pairs in contact after the step.
    pub contacts: u32,
    /// New contacts.
    pub enters: u32,
    /// Ended contacts.
    pub leaves: u32,
    /// Entries dropped because a body vanished outside the destroy hook.
    pub pruned: u32,
}

/// Collision detection and contact tracking over a [`World`].
#[derive(Debug)]
pub struct PhysicsSystem {
    config: PhysicsConfig,
    /// Rebuilt every tick.
    colliders: Vec<ColliderProxy>,
    /// Reused entity buffer for the refresh pass.
    scratch: Vec<EntityId>,
    manifolds: ManifoldStore,
    /// Registration log records already seen.
    registration_cursor: usize,
    /// Component bits tagged as colliders.
    collider_mask: u64,
    events: Vec<ContactEvent>,
    last_stats: StepStats,
}

impl PhysicsSystem {
    /// Creates a system for a world of `capacity` entity slots.
    #[must_use]
    pub fn new(config: PhysicsConfig, capacity: usize) -> Self {
        Self {
            config,
            colliders: Vec::new(),
            scratch: Vec::new(),
            manifolds: ManifoldStore::new(capacity),
            registration_cursor: 0,
            collider_mask: 0,
            events: Vec::new(),
            last_stats: StepStats::default(),
        }
    }

    /// The active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Component mask of every registered collider type.
    #[inline]
    #[must_use]
    pub const fn collider_mask(&self) -> u64 {
        self.collider_mask
    }

    /// The working list of the last tick.
    #[inline]
    #[must_use]
    pub fn colliders(&self) -> &[ColliderProxy] {
        &self.colliders
    }

    /// Pairs currently in contact.
    #[inline]
    #[must_use]
    pub const fn manifolds(&self) -> &ManifoldStore {
        &self.manifolds
    }

    /// Counters of the last step.
    #[inline]
    #[must_use]
    pub const fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    // ========================================================================
    // TICK
    // ========================================================================

    /// Runs one full detection step.
    pub fn fixed_update(&mut self, world: &mut World, dt: f32) -> StepStats {
        let mut stats = StepStats::default();

        self.sync_world(world);
        stats.pruned = self.prune(world);
        self.refresh(world);
        stats.colliders = u32::try_from(self.colliders.len()).unwrap_or(u32::MAX);

        for i in 0..self.colliders.len() {
            for j in (i + 1)..self.colliders.len() {
                stats.pairs_considered += 1;
                let (a, b) = (self.colliders[i], self.colliders[j]);
                if self.config.skip_static_pairs && a.is_static && b.is_static {
                    // Untested pairs keep whatever state they had
                    stats.static_pairs_skipped += 1;
                    continue;
                }
                let contact = self.test_pair(&a, &b, &mut stats);
                self.apply_transition(world, &a, &b, contact, &mut stats);
            }
        }

        stats.contacts = u32::try_from(self.manifolds.len()).unwrap_or(u32::MAX);
        self.last_stats = stats;
        tracing::trace!(
            dt,
            colliders = stats.colliders,
            narrow_phase_calls = stats.narrow_phase_calls,
            contacts = stats.contacts,
            "physics step"
        );
        stats
    }

    /// One-time setup of freshly created entities.
    ///
    /// Snapshots the transform of each collider-carrying entity and adds it
    /// to the working list, so casts see it before the next tick.
    pub fn initialize_entities(&mut self, world: &mut World, entities: &[EntityId]) {
        self.sync_world(world);
        for &entity in entities {
            let transform = world
                .get_component::<Transform>(entity)
                .copied()
                .unwrap_or_default();
            let Some(collider) = world.get_component_mut::<Collider>(entity) else {
                continue;
            };
            collider.refresh(entity, transform);
            let proxy = ColliderProxy::build(entity, collider);

            match self.colliders.iter_mut().find(|p| p.entity == entity) {
                Some(existing) => *existing = proxy,
                None => self.colliders.push(proxy),
            }
        }
    }

    /// Pulls new registrations and follows world capacity changes.
    fn sync_world(&mut self, world: &World) {
        let registry = world.components();
        for registration in registry.registrations_since(self.registration_cursor) {
            if registration.tag == Some(COLLIDER_TAG) {
                self.collider_mask |= registration.bit();
                tracing::debug!(
                    index = registration.index,
                    type_name = registration.type_name,
                    "collider component registered"
                );
            }
        }
        self.registration_cursor = registry.registrations().len();

        if world.capacity() != self.manifolds.capacity() {
            tracing::warn!(
                world = world.capacity(),
                physics = self.manifolds.capacity(),
                "entity capacity mismatch, contact state reset"
            );
            self.manifolds = ManifoldStore::new(world.capacity());
        }
    }

    /// Drops entries whose bodies died or lost their collider silently.
    fn prune(&mut self, world: &World) -> u32 {
        let dropped = self.manifolds.retain(|entry| {
            let (a, b) = entry.pair;
            world.has_component::<Collider>(a) && world.has_component::<Collider>(b)
        });
        if dropped > 0 {
            tracing::debug!(dropped, "stale contacts pruned");
        }
        u32::try_from(dropped).unwrap_or(u32::MAX)
    }

    fn refresh(&mut self, world: &mut World) {
        self.colliders.clear();
        self.scratch.clear();
        self.scratch
            .extend(world.view(self.collider_mask, MatchMode::Any).iter());

        for &entity in &self.scratch {
            let transform = world
                .get_component::<Transform>(entity)
                .copied()
                .unwrap_or_default();
            if let Some(collider) = world.get_component_mut::<Collider>(entity) {
                collider.refresh(entity, transform);
                self.colliders.push(ColliderProxy::build(entity, collider));
            }
        }
    }

    fn test_pair(
        &self,
        a: &ColliderProxy,
        b: &ColliderProxy,
        stats: &mut StepStats,
    ) -> Option<Contact> {
        let reach = a.bounding_radius + b.bounding_radius;
        let delta = b.center - a.center;
        let outside_square =
            self.config.broad_phase_square_prefilter && (delta.x.abs() > reach || delta.y.abs() > reach);
        if outside_square || delta.length_squared() > reach * reach {
            stats.broad_phase_rejects += 1;
            return None;
        }

        stats.narrow_phase_calls += 1;
        collide(a.tag, &a.shape, b.tag, &b.shape)
    }

    fn apply_transition(
        &mut self,
        world: &mut World,
        a: &ColliderProxy,
        b: &ColliderProxy,
        contact: Option<Contact>,
        stats: &mut StepStats,
    ) {
        match contact {
            Some(contact) => {
                let reference = if contact.body1_is_reference {
                    a.entity
                } else {
                    b.entity
                };
                // Store first so callbacks observe the new state
                let began = self
                    .manifolds
                    .set(a.entity, b.entity, contact.manifold, reference);
                if began {
                    stats.enters += 1;
                    tracing::debug!(a = %a.entity, b = %b.entity, "contact began");
                    self.notify_enter(world, a.entity, b.entity);
                    self.notify_enter(world, b.entity, a.entity);
                }
            }
            None => {
                if self.manifolds.remove(a.entity, b.entity).is_some() {
                    stats.leaves += 1;
                    tracing::debug!(a = %a.entity, b = %b.entity, "contact ended");
                    self.notify_leave(world, a.entity, b.entity);
                    self.notify_leave(world, b.entity, a.entity);
                }
            }
        }
    }

    fn notify_enter(&mut self, world: &mut World, entity: EntityId, other: EntityId) {
        let Some(event) = self
            .manifolds
            .get(entity, other)
            .and_then(|entry| entry.event_for(entity))
        else {
            return;
        };
        if let Some(collider) = world.get_component_mut::<Collider>(entity) {
            collider.notify_enter(&event);
        }
        if self.config.emit_events {
            self.events.push(ContactEvent::Enter(entity, event));
        }
    }

    fn notify_leave(&mut self, world: &mut World, entity: EntityId, other: EntityId) {
        if let Some(collider) = world.get_component_mut::<Collider>(entity) {
            collider.notify_leave(other);
        }
        if self.config.emit_events {
            self.events.push(ContactEvent::Leave(entity, other));
        }
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    /// Contact transitions queued since the last drain.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Takes the queued contact transitions.
    pub fn drain_events(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// O(1) check whether `entity` touches any collider.
    #[must_use]
    pub fn is_entity_colliding(&self, entity: EntityId) -> bool {
        self.manifolds.is_colliding(entity)
    }

    /// Every current contact of `entity`, normals pointing away from it.
    #[must_use]
    pub fn collision_events(&self, entity: EntityId) -> Vec<CollisionEvent> {
        if !self.manifolds.is_colliding(entity) {
            return Vec::new();
        }
        self.colliders
            .iter()
            .filter(|proxy| proxy.entity != entity)
            .filter_map(|proxy| self.manifolds.get(entity, proxy.entity))
            .filter_map(|entry| entry.event_for(entity))
            .collect()
    }

    /// Nearest collider hit by a ray.
    #[must_use]
    pub fn ray_cast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_length: f32,
        ignore: Option<EntityId>,
    ) -> Option<CastHit> {
        self.cast(Cast::new(origin, direction, max_length, 0.0)?, ignore)
    }

    /// Nearest collider hit by a swept circle.
    #[must_use]
    pub fn circle_cast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_length: f32,
        radius: f32,
        ignore: Option<EntityId>,
    ) -> Option<CastHit> {
        self.cast(Cast::new(origin, direction, max_length, radius)?, ignore)
    }

    fn cast(&self, cast: Cast, ignore: Option<EntityId>) -> Option<CastHit> {
        self.colliders
            .iter()
            .filter(|proxy| Some(proxy.entity) != ignore)
            .filter(|proxy| {
                // Bounding-circle reject along the whole sweep
                let reach = proxy.bounding_radius + cast.radius;
                let closest =
                    closest_point_on_segment(cast.origin, cast.at(cast.max_length), proxy.center);
                closest.distance_squared(proxy.center) <= reach * reach
            })
            .filter_map(|proxy| cast.hit(proxy.entity, &proxy.shape))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    // ========================================================================
    // DEBUG
    // ========================================================================

    /// Draws every collider of the last tick and every live contact.
    pub fn debug_draw(&self, renderer: &mut dyn DebugRenderer) {
        for proxy in &self.colliders {
            let color = if self.manifolds.is_colliding(proxy.entity) {
                DebugColor::Colliding
            } else if proxy.is_static {
                DebugColor::Static
            } else {
                DebugColor::Dynamic
            };
            draw_shape(renderer, &proxy.shape, color);
        }

        for entry in self.manifolds.iter() {
            let manifold = &entry.manifold;
            for &point in manifold.points() {
                renderer.draw_point(point, DebugColor::ContactPoint);
                renderer.draw_line(
                    point,
                    point + manifold.normal * NORMAL_DRAW_LENGTH,
                    DebugColor::ContactNormal,
                );
            }
        }
    }
}

impl DestroyHook for PhysicsSystem {
    /// Drops every contact of the dying entity without leave callbacks.
    fn on_entity_destroyed(&mut self, _world: &World, entity: EntityId) {
        let partners = self.manifolds.remove_entity(entity);
        self.colliders.retain(|proxy| proxy.entity != entity);
        if !partners.is_empty() {
            tracing::debug!(%entity, partners = partners.len(), "contacts torn down");
        }
    }
}
