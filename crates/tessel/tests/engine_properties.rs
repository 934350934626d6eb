//! # Engine Property Tests
//!
//! End-to-end checks across the entity store, the physics system and the
//! game loop:
//!
//! 1. **Handles**: destroyed handles never alias recycled slots
//! 2. **Masks**: component bits track add/remove exactly
//! 3. **Contacts**: enter/leave fire once per transition, on both sides
//! 4. **Geometry**: the box-box separating-axis manifold
//! 5. **Teardown**: destruction drops contacts without leave callbacks
//!
//! Run with: cargo test --package tessel --test engine_properties

use std::cell::Cell;
use std::rc::Rc;

use tessel::physics::pair_key;
use tessel::{
    Collider, ContactEvent, EngineConfig, EntityId, GameLoop, MatchMode, PhysicsConfig,
    PhysicsSystem, Transform, Vec2, World,
};

const STEP: f32 = 1.0 / 60.0;

// ============================================================================
// HELPERS
// ============================================================================

/// Enter/leave callback counters for one collider.
#[derive(Clone, Default)]
struct Counters {
    enters: Rc<Cell<u32>>,
    leaves: Rc<Cell<u32>>,
}

fn spawn_box(world: &mut World, x: f32, y: f32, half: f32) -> (EntityId, Counters) {
    let entity = world.create();
    world.add_component::<Transform>(entity).unwrap().position = Vec2::new(x, y);

    let counters = Counters::default();
    let collider = world.add_component::<Collider>(entity).unwrap();
    collider.set_box(Vec2::new(half, half)).unwrap();
    let enters = Rc::clone(&counters.enters);
    collider.on_body_enter(move |_| enters.set(enters.get() + 1));
    let leaves = Rc::clone(&counters.leaves);
    collider.on_body_leave(move |_| leaves.set(leaves.get() + 1));

    (entity, counters)
}

fn spawn_circle(world: &mut World, x: f32, y: f32, radius: f32) -> EntityId {
    let entity = world.create();
    world.add_component::<Transform>(entity).unwrap().position = Vec2::new(x, y);
    world
        .add_component::<Collider>(entity)
        .unwrap()
        .set_circle(radius)
        .unwrap();
    entity
}

fn move_to(world: &mut World, entity: EntityId, x: f32, y: f32) {
    world.get_component_mut::<Transform>(entity).unwrap().position = Vec2::new(x, y);
}

// ============================================================================
// ENTITY STORE
// ============================================================================

#[test]
fn stale_handle_never_reaches_recycled_slot() {
    let mut world = World::new(1);
    let old = world.create();
    world.add_component::<Transform>(old).unwrap().position = Vec2::new(3.0, 4.0);
    assert!(world.destroy(old));

    let new = world.create();
    assert_eq!(new.index(), old.index());
    assert_ne!(new.version(), old.version());

    assert!(!world.is_valid(old));
    assert!(world.get_component::<Transform>(old).is_none());
    assert!(!world.destroy(old));
    assert!(world.add_component::<Transform>(old).is_none());

    // The recycled slot starts empty
    assert!(!world.has_component::<Transform>(new));
    assert_eq!(world.mask_of(new), Some(0));
}

#[test]
fn component_mask_tracks_membership() {
    let mut world = World::new(8);
    let entity = world.create();
    let transform_bit = 1 << world.register_component::<Transform>().unwrap();
    let collider_bit = 1 << world.register_component::<Collider>().unwrap();

    world.add_component::<Transform>(entity);
    world.add_component::<Collider>(entity);
    assert_eq!(world.mask_of(entity), Some(transform_bit | collider_bit));
    assert_eq!(world.view(transform_bit | collider_bit, MatchMode::All).count(), 1);

    assert!(world.remove_component::<Collider>(entity));
    assert_eq!(world.mask_of(entity), Some(transform_bit));
    assert!(!world.has_component::<Collider>(entity));
    assert_eq!(world.view(transform_bit | collider_bit, MatchMode::All).count(), 0);
    assert_eq!(world.view(transform_bit | collider_bit, MatchMode::Any).count(), 1);

    // Removing twice is a no-op
    assert!(!world.remove_component::<Collider>(entity));
}

#[test]
fn pair_key_is_symmetric_and_unique() {
    let capacity = 16;
    let mut seen = std::collections::HashSet::new();
    for i in 0..capacity as u32 {
        for j in (i + 1)..capacity as u32 {
            let a = EntityId::new(i, 0);
            let b = EntityId::new(j, 3);
            let key = pair_key(a, b, capacity);
            assert_eq!(key, pair_key(b, a, capacity));
            assert!(seen.insert(key), "duplicate key for ({i}, {j})");
        }
    }
}

// ============================================================================
// CONTACT LIFECYCLE
// ============================================================================

#[test]
fn enter_and_leave_fire_exactly_once_per_side() {
    let mut world = World::new(16);
    let mut physics = PhysicsSystem::new(PhysicsConfig::default(), 16);
    let (a, a_counts) = spawn_box(&mut world, 0.0, 0.0, 1.0);
    let (b, b_counts) = spawn_box(&mut world, 5.0, 0.0, 1.0);

    physics.fixed_update(&mut world, STEP);
    assert_eq!(a_counts.enters.get(), 0);

    move_to(&mut world, b, 1.5, 0.0);
    for _ in 0..5 {
        physics.fixed_update(&mut world, STEP);
    }
    assert_eq!(a_counts.enters.get(), 1);
    assert_eq!(b_counts.enters.get(), 1);
    assert_eq!(a_counts.leaves.get(), 0);
    assert!(physics.is_entity_colliding(a));

    move_to(&mut world, b, 5.0, 0.0);
    for _ in 0..5 {
        physics.fixed_update(&mut world, STEP);
    }
    assert_eq!(a_counts.leaves.get(), 1);
    assert_eq!(b_counts.leaves.get(), 1);
    assert_eq!(a_counts.enters.get(), 1);
    assert!(!physics.is_entity_colliding(b));

    let events = physics.drain_events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], ContactEvent::Enter(e, ref ev) if e == a && ev.other_entity == b));
    assert!(matches!(events[3], ContactEvent::Leave(e, other) if e == b && other == a));
}

#[test]
fn box_box_manifold_through_the_system() {
    let mut world = World::new(16);
    let mut physics = PhysicsSystem::new(PhysicsConfig::default(), 16);
    let (a, _) = spawn_box(&mut world, 0.0, 0.0, 1.0);
    let (b, _) = spawn_box(&mut world, 1.5, 0.0, 1.0);

    let stats = physics.fixed_update(&mut world, STEP);
    assert_eq!(stats.contacts, 1);

    let entry = physics.manifolds().get(a, b).unwrap();
    let manifold = entry.manifold;
    assert!((manifold.penetration_depth - 0.5).abs() < 1e-5);
    assert!(manifold.normal.y.abs() < 1e-6);
    assert!((manifold.normal.x.abs() - 1.0).abs() < 1e-6);
    assert_eq!(manifold.points().len(), 2);
    for point in manifold.points() {
        assert!((point.x - 0.5).abs() < 1e-5);
        assert!((point.y.abs() - 1.0).abs() < 1e-5);
    }

    // Each side sees the normal pointing at the other
    let from_a = physics.collision_events(a);
    let from_b = physics.collision_events(b);
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a[0].other_entity, b);
    assert!(from_a[0].manifold.normal.x > 0.0);
    assert!(from_b[0].manifold.normal.x < 0.0);
}

#[test]
fn distant_circles_never_reach_narrow_phase() {
    let mut world = World::new(16);
    let mut physics = PhysicsSystem::new(PhysicsConfig::default(), 16);
    let a = spawn_circle(&mut world, 0.0, 0.0, 1.0);
    let b = spawn_circle(&mut world, 10.0, 0.0, 1.0);

    let stats = physics.fixed_update(&mut world, STEP);
    assert_eq!(stats.pairs_considered, 1);
    assert_eq!(stats.broad_phase_rejects, 1);
    assert_eq!(stats.narrow_phase_calls, 0);
    assert!(!physics.is_entity_colliding(a));
    assert!(!physics.is_entity_colliding(b));
}

#[test]
fn destroying_an_entity_drops_its_contacts_silently() {
    let mut world = World::new(16);
    let mut physics = PhysicsSystem::new(PhysicsConfig::default(), 16);
    let (hub, hub_counts) = spawn_box(&mut world, 0.0, 0.0, 1.0);
    let (left, left_counts) = spawn_box(&mut world, -1.5, 0.0, 1.0);
    let (right, right_counts) = spawn_box(&mut world, 1.5, 0.0, 1.0);

    physics.fixed_update(&mut world, STEP);
    assert_eq!(physics.manifolds().active_count(hub), 2);
    assert_eq!(physics.manifolds().active_count(left), 1);
    assert_eq!(physics.manifolds().active_count(right), 1);
    physics.drain_events();

    assert!(world.destroy_with(hub, &mut physics));
    assert_eq!(physics.manifolds().len(), 0);
    assert_eq!(physics.manifolds().active_count(left), 0);
    assert_eq!(physics.manifolds().active_count(right), 0);
    assert!(!physics.is_entity_colliding(left));

    let stats = physics.fixed_update(&mut world, STEP);
    assert_eq!(stats.leaves, 0);
    assert_eq!(stats.pruned, 0);
    for counts in [&hub_counts, &left_counts, &right_counts] {
        assert_eq!(counts.leaves.get(), 0);
    }
    assert!(physics.drain_events().is_empty());
}

#[test]
fn stale_handle_does_not_inherit_recycled_contacts() {
    let mut world = World::new(2);
    let mut physics = PhysicsSystem::new(PhysicsConfig::default(), 2);
    let (old, _) = spawn_box(&mut world, 0.0, 0.0, 1.0);
    let (partner, _) = spawn_box(&mut world, 1.5, 0.0, 1.0);
    physics.fixed_update(&mut world, STEP);
    assert!(physics.is_entity_colliding(old));

    assert!(world.destroy_with(old, &mut physics));
    let (successor, _) = spawn_box(&mut world, 0.0, 0.0, 1.0);
    assert_eq!(successor.index(), old.index());
    physics.fixed_update(&mut world, STEP);

    assert!(physics.is_entity_colliding(successor));
    assert!(physics.is_entity_colliding(partner));
    assert!(!world.is_valid(old));
    assert!(!physics.is_entity_colliding(old));
    assert!(physics.collision_events(old).is_empty());
    assert_eq!(physics.manifolds().active_count(old), 0);
}

// ============================================================================
// GAME LOOP
// ============================================================================

#[test]
fn game_loop_from_toml_runs_contacts() {
    let config = EngineConfig::from_toml_str(
        r"
        [world]
        max_entities = 64

        [game_loop]
        fixed_timestep = 0.125
        max_steps_per_frame = 4
        ",
    )
    .unwrap();
    let mut game_loop = GameLoop::new(config);

    let (a, a_counts) = spawn_box(game_loop.world_mut(), 0.0, 0.0, 1.0);
    let (b, _) = spawn_box(game_loop.world_mut(), 3.5, 0.0, 1.0);

    // Slide b toward a by one unit per step
    let frame = game_loop.advance_with(0.25, |world, _, _| {
        let position = world.get_component::<Transform>(b).unwrap().position;
        move_to(world, b, position.x - 1.0, 0.0);
    });
    assert_eq!(frame.steps, 2);
    assert_eq!(a_counts.enters.get(), 1);
    assert!(game_loop.physics().is_entity_colliding(a));

    assert!(game_loop.destroy(b));
    game_loop.advance(0.125);
    assert!(!game_loop.physics().is_entity_colliding(a));
    assert_eq!(a_counts.leaves.get(), 0);
}
