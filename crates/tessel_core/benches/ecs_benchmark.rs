//! # ECS Performance Benchmark
//!
//! Entity churn, component access and view iteration at full capacity.
//!
//! Run with: `cargo bench --package tessel_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessel_core::{Component, MatchMode, Transform, Vec2, World};
use tessel_shared::MAX_ENTITIES;

#[derive(Default, Clone, Copy)]
struct Velocity(Vec2);

impl Component for Velocity {}

/// World at capacity, every entity with a transform, every other with a velocity.
fn populated_world() -> World {
    let mut world = World::new(MAX_ENTITIES);
    for i in 0..MAX_ENTITIES {
        let entity = world.create();
        if let Some(transform) = world.add_component::<Transform>(entity) {
            transform.position = Vec2::new(i as f32, 0.0);
        }
        if i % 2 == 0 {
            if let Some(velocity) = world.add_component::<Velocity>(entity) {
                velocity.0 = Vec2::new(1.0, 0.5);
            }
        }
    }
    world
}

/// Benchmark: fill and empty the entity table.
fn bench_create_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_destroy");

    for count in [256, 1024, MAX_ENTITIES] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut world = World::new(MAX_ENTITIES);
            let mut entities = Vec::with_capacity(count);
            b.iter(|| {
                for _ in 0..count {
                    entities.push(world.create());
                }
                for entity in entities.drain(..) {
                    world.destroy(entity);
                }
                black_box(world.alive_count())
            });
        });
    }

    group.finish();
}

/// Benchmark: handle-checked component reads.
fn bench_get_component(c: &mut Criterion) {
    let world = populated_world();
    let entities: Vec<_> = world.iter_alive().collect();

    c.bench_function("get_transform_4096", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for &entity in &entities {
                if let Some(transform) = world.get_component::<Transform>(entity) {
                    sum += transform.position.x;
                }
            }
            black_box(sum)
        });
    });
}

/// Benchmark: mask views in both match modes.
fn bench_view_iteration(c: &mut Criterion) {
    let mut world = populated_world();
    let mask = world.components().index_of::<Transform>().map_or(0, |i| 1 << i)
        | world.components().index_of::<Velocity>().map_or(0, |i| 1 << i);

    c.bench_function("view_all_transform_velocity", |b| {
        b.iter(|| black_box(world.view(mask, MatchMode::All).count()));
    });

    c.bench_function("view_integrate", |b| {
        let mut scratch = Vec::with_capacity(MAX_ENTITIES);
        b.iter(|| {
            scratch.clear();
            scratch.extend(world.view(mask, MatchMode::All).iter());
            for &entity in &scratch {
                let Some(&Velocity(velocity)) = world.get_component::<Velocity>(entity) else {
                    continue;
                };
                if let Some(transform) = world.get_component_mut::<Transform>(entity) {
                    transform.position += velocity * (1.0 / 60.0);
                }
            }
            black_box(scratch.len())
        });
    });
}

criterion_group!(
    benches,
    bench_create_destroy,
    bench_get_component,
    bench_view_iteration,
);

criterion_main!(benches);
