//! # ECS Performance Benchmark
//!
//! `for_each` over archetype tables against a raw slice loop, plus
//! entity create/destroy cycles.
//!
//! Run with: `cargo bench --package tessera_core --bench ecs_benchmark`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tessera_core::{ComponentStore, Entity};

const ENTITY_COUNT: usize = 100_000;

#[derive(Clone, Copy, Default)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Default)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Default)]
struct Frozen;

/// Every entity gets Position; every `frozen_every`th gets Frozen instead of
/// Velocity. `None` gives every entity Velocity.
fn populated_store(frozen_every: Option<usize>) -> ComponentStore {
    let mut store = ComponentStore::with_capacity(ENTITY_COUNT);
    store.register_component::<Position>();
    store.register_component::<Velocity>();
    store.register_component::<Frozen>();

    for i in 0..ENTITY_COUNT {
        let entity = store.create_entity();
        let f = i as f32;
        store.add_component(entity, Position { x: f, y: f, z: f });
        if frozen_every.is_some_and(|n| i % n == n - 1) {
            store.add_component(entity, Frozen);
        } else {
            store.add_component(entity, Velocity { x: 0.1, y: 0.2, z: 0.3 });
        }
    }
    store
}

/// Number of entities `for_each::<(Position, Velocity)>` visits.
fn moving_entities(store: &mut ComponentStore) -> usize {
    let mut visited = 0;
    store.for_each::<(Position, Velocity), _>(|_, count| visited += count);
    visited
}

/// Benchmark: Integrate positions with every entity in one table.
fn bench_for_each_single_run(c: &mut Criterion) {
    let mut store = populated_store(None);
    assert_eq!(moving_entities(&mut store), ENTITY_COUNT);

    c.bench_function("for_each_position_velocity_100K", |b| {
        b.iter(|| {
            store.for_each::<(Position, Velocity), _>(|(positions, velocities), count| {
                for (p, v) in positions[..count].iter_mut().zip(&velocities[..count]) {
                    p.x += v.x * 0.016;
                    p.y += v.y * 0.016;
                    p.z += v.z * 0.016;
                }
            });
            black_box(store.entity_count())
        });
    });
}

/// Benchmark: Same update when every 16th entity has another signature.
fn bench_for_each_interleaved(c: &mut Criterion) {
    let mut store = populated_store(Some(16));
    assert_eq!(moving_entities(&mut store), ENTITY_COUNT - ENTITY_COUNT / 16);

    c.bench_function("for_each_interleaved_100K", |b| {
        b.iter(|| {
            store.for_each::<(Velocity, Position), _>(|(velocities, positions), count| {
                for (p, v) in positions[..count].iter_mut().zip(&velocities[..count]) {
                    p.x += v.x * 0.016;
                }
            });
            black_box(store.entity_count())
        });
    });
}

/// Benchmark: Raw slice iteration (theoretical minimum).
fn bench_raw_slice_update(c: &mut Criterion) {
    let mut positions = vec![Position::default(); ENTITY_COUNT];
    let velocities = vec![Velocity { x: 0.1, y: 0.2, z: 0.3 }; ENTITY_COUNT];

    c.bench_function("raw_slice_100K_update", |b| {
        b.iter(|| {
            for (p, v) in positions.iter_mut().zip(velocities.iter()) {
                p.x += v.x * 0.016;
                p.y += v.y * 0.016;
                p.z += v.z * 0.016;
            }
            black_box(positions.len())
        });
    });
}

/// Benchmark: Entity destroy/create cycle.
fn bench_create_destroy_cycle(c: &mut Criterion) {
    let mut store = populated_store(None);
    let mut entities: Vec<Entity> = store.entities().take(10_000).collect();

    c.bench_function("create_destroy_cycle_10K", |b| {
        b.iter(|| {
            for entity in &entities {
                store.destroy_entity(*entity);
            }
            for entity in &mut entities {
                *entity = store.create_entity();
                store.add_component(*entity, Position::default());
            }
            black_box(store.entity_count())
        });
    });
}

criterion_group!(
    benches,
    bench_for_each_single_run,
    bench_for_each_interleaved,
    bench_raw_slice_update,
    bench_create_destroy_cycle,
);

criterion_main!(benches);
