//! Integration tests for the component store's iteration contract.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera_core::{ComponentStore, Entity};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Foo(i32);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Bar(i32);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Baz(i32);

/// E1 carries Foo, E2 carries Foo and Bar.
fn two_entities() -> (ComponentStore, Entity, Entity) {
    let mut store = ComponentStore::new();
    store.register_component::<Foo>();
    store.register_component::<Bar>();

    let e1 = store.create_entity();
    store.add_component(e1, Foo(1));

    let e2 = store.create_entity();
    store.add_component(e2, Foo(2));
    store.add_component(e2, Bar(20));

    (store, e1, e2)
}

fn foo(store: &ComponentStore, entity: Entity) -> i32 {
    store.get_component::<Foo>(entity).map_or(i32::MIN, |f| f.0)
}

#[test]
fn test_for_each_matches_supersets() {
    let (mut store, e1, e2) = two_entities();

    store.for_each::<(Foo,), _>(|(foos,), count| {
        for f in &mut foos[..count] {
            f.0 += 100;
        }
    });

    assert_eq!(foo(&store, e1), 101);
    assert_eq!(foo(&store, e2), 102);
}

#[test]
fn test_for_each_excludes_missing_components() {
    let (mut store, e1, e2) = two_entities();

    let mut visited = 0;
    store.for_each::<(Foo, Bar), _>(|(foos, bars), count| {
        visited += count;
        for (f, b) in foos.iter_mut().zip(bars.iter()) {
            f.0 += b.0;
        }
    });

    assert_eq!(visited, 1);
    assert_eq!(foo(&store, e1), 1);
    assert_eq!(foo(&store, e2), 22);
}

#[test]
fn test_for_each_order_symmetry() {
    let (mut forward, f1, f2) = two_entities();
    let (mut reverse, r1, r2) = two_entities();

    forward.for_each::<(Foo, Bar), _>(|(foos, bars), _| {
        for (f, b) in foos.iter_mut().zip(bars.iter_mut()) {
            f.0 *= 3;
            b.0 += 1;
        }
    });
    reverse.for_each::<(Bar, Foo), _>(|(bars, foos), _| {
        for (b, f) in bars.iter_mut().zip(foos.iter_mut()) {
            f.0 *= 3;
            b.0 += 1;
        }
    });

    assert_eq!(foo(&forward, f1), foo(&reverse, r1));
    assert_eq!(foo(&forward, f2), foo(&reverse, r2));
    assert_eq!(
        forward.get_component::<Bar>(f2),
        reverse.get_component::<Bar>(r2)
    );
    assert_eq!(forward.get_component::<Bar>(f2), Some(&Bar(21)));
}

#[test]
fn test_mutations_visible_to_later_passes() {
    let (mut store, _, e2) = two_entities();

    store.for_each::<(Bar, Foo), _>(|(bars, _), _| {
        for b in bars.iter_mut() {
            b.0 = 7;
        }
    });

    let mut seen = Vec::new();
    store.for_each::<(Foo, Bar), _>(|(_, bars), _| seen.extend(bars.iter().copied()));

    assert_eq!(seen, vec![Bar(7)]);
    assert_eq!(store.get_component::<Bar>(e2), Some(&Bar(7)));
}

#[test]
fn test_one_call_per_signature() {
    let mut store = ComponentStore::new();
    store.register_component::<Foo>();
    store.register_component::<Bar>();
    store.register_component::<Baz>();

    // Foo on all, Baz on all but the middle: one table per signature.
    let entities: Vec<Entity> = (0..5).map(|_| store.create_entity()).collect();
    for (i, &entity) in (0..).zip(&entities) {
        store.add_component(entity, Foo(i));
        if i != 2 {
            store.add_component(entity, Baz(0));
        }
    }

    let mut tables = Vec::new();
    store.for_each::<(Baz, Foo), _>(|(_, foos), count| {
        tables.push(foos[..count].iter().map(|f| f.0).collect::<Vec<_>>());
    });
    assert_eq!(tables, vec![vec![0, 1, 3, 4]]);

    // Giving the middle entity Baz moves it into the same table.
    store.add_component(entities[2], Baz(0));
    let mut counts = Vec::new();
    store.for_each::<(Foo, Baz), _>(|_, count| counts.push(count));
    assert_eq!(counts, vec![5]);
}

#[test]
fn test_interleaved_signatures_call_once_per_table() {
    let mut store = ComponentStore::new();
    store.register_component::<Foo>();
    store.register_component::<Bar>();

    // Even slots carry Foo, odd slots Foo and Bar.
    for i in 0..1000 {
        let entity = store.create_entity();
        store.add_component(entity, Foo(i));
        if i % 2 == 1 {
            store.add_component(entity, Bar(i));
        }
    }

    let mut counts = Vec::new();
    store.for_each::<(Foo, Bar), _>(|(foos, bars), count| {
        assert_eq!(foos.len(), count);
        assert!(foos.iter().zip(bars.iter()).all(|(f, b)| f.0 == b.0));
        counts.push(count);
    });
    assert_eq!(counts, vec![500]);

    let mut counts = Vec::new();
    store.for_each::<(Foo,), _>(|_, count| counts.push(count));
    assert_eq!(counts, vec![500, 500]);
}

#[test]
fn test_columns_hold_only_live_rows() {
    let mut store = ComponentStore::new();
    store.register_component::<Foo>();

    for _ in 0..100_000 {
        store.create_entity();
    }
    let last = store.create_entity();
    store.add_component(last, Foo(1));

    let mut lengths = Vec::new();
    store.for_each::<(Foo,), _>(|(foos,), count| lengths.push((foos.len(), count)));
    assert_eq!(lengths, vec![(1, 1)]);

    // Destroyed rows are reclaimed, not left vacant.
    let doomed: Vec<Entity> = (0..1000)
        .map(|i| {
            let entity = store.create_entity();
            store.add_component(entity, Foo(i));
            entity
        })
        .collect();
    for entity in doomed {
        store.destroy_entity(entity);
    }

    let mut lengths = Vec::new();
    store.for_each::<(Foo,), _>(|(foos,), count| lengths.push((foos.len(), count)));
    assert_eq!(lengths, vec![(1, 1)]);
    assert_eq!(foo(&store, last), 1);
}

/// Seeded churn of create, destroy, add and remove, checked against a plain
/// list of live entities and their components.
#[test]
fn test_churn_matches_model() {
    let mut rng = StdRng::seed_from_u64(0xEC5_2024);
    let mut store = ComponentStore::new();
    store.register_component::<Foo>();
    store.register_component::<Bar>();

    // (entity, Foo value, Bar value)
    let mut live: Vec<(Entity, Option<i32>, Option<i32>)> = Vec::new();

    for step in 0..5_000 {
        match rng.gen_range(0..6) {
            0 | 1 => live.push((store.create_entity(), None, None)),
            2 if !live.is_empty() => {
                let (entity, _, _) = live.swap_remove(rng.gen_range(0..live.len()));
                assert!(store.destroy_entity(entity));
            }
            3 if !live.is_empty() => {
                let pick = rng.gen_range(0..live.len());
                let (entity, foo_value, _) = &mut live[pick];
                assert_eq!(store.add_component(*entity, Foo(step)).map(|f| f.0), *foo_value);
                *foo_value = Some(step);
            }
            4 if !live.is_empty() => {
                let pick = rng.gen_range(0..live.len());
                let (entity, _, bar_value) = &mut live[pick];
                assert_eq!(store.add_component(*entity, Bar(step)).map(|b| b.0), *bar_value);
                *bar_value = Some(step);
            }
            5 if !live.is_empty() => {
                let pick = rng.gen_range(0..live.len());
                let (entity, foo_value, _) = &mut live[pick];
                assert_eq!(store.remove_component::<Foo>(*entity).map(|f| f.0), *foo_value);
                *foo_value = None;
            }
            _ => {}
        }

        if step % 50 == 0 {
            check_against_model(&mut store, &live);
        }
    }
    check_against_model(&mut store, &live);
}

fn check_against_model(store: &mut ComponentStore, live: &[(Entity, Option<i32>, Option<i32>)]) {
    assert_eq!(store.entity_count(), live.len());

    let mut expected: Vec<(i32, i32)> = live
        .iter()
        .filter_map(|&(_, f, b)| Some((f?, b?)))
        .collect();
    let mut seen = Vec::new();
    let mut calls = 0;
    store.for_each::<(Foo, Bar), _>(|(foos, bars), count| {
        assert!(count > 0);
        assert_eq!((foos.len(), bars.len()), (count, count));
        seen.extend(foos.iter().zip(bars.iter()).map(|(f, b)| (f.0, b.0)));
        calls += 1;
    });
    expected.sort_unstable();
    seen.sort_unstable();
    assert_eq!(seen, expected);
    // At most one table holds both.
    assert!(calls <= 1);

    let with_foo = live.iter().filter(|(_, f, _)| f.is_some()).count();
    let mut total = 0;
    let mut calls = 0;
    store.for_each::<(Foo,), _>(|_, count| {
        total += count;
        calls += 1;
    });
    assert_eq!(total, with_foo);
    assert!(calls <= 2);

    for &(entity, f, b) in live {
        assert_eq!(store.get_component::<Foo>(entity).map(|v| v.0), f);
        assert_eq!(store.get_component::<Bar>(entity).map(|v| v.0), b);
    }
}

#[test]
fn test_destroy_and_reuse_slot() {
    let (mut store, e1, e2) = two_entities();

    assert!(store.destroy_entity(e1));
    assert!(store.get_component::<Foo>(e1).is_none());

    let e3 = store.create_entity();
    assert_eq!(e3.index(), e1.index());
    assert_ne!(e3, e1);
    assert!(store.get_component::<Foo>(e3).is_none());

    // e3 has no Foo yet, so only e2 is visited.
    let mut counts = Vec::new();
    store.for_each::<(Foo,), _>(|_, count| counts.push(count));
    assert_eq!(counts, vec![1]);

    store.add_component(e3, Foo(30));
    assert_eq!(foo(&store, e3), 30);
    assert_eq!(foo(&store, e2), 2);
    assert!(store.get_component::<Foo>(e1).is_none());
}

#[test]
fn test_remove_component_updates_signature() {
    let (mut store, _, e2) = two_entities();

    assert_eq!(store.remove_component::<Bar>(e2), Some(Bar(20)));
    assert!(!store.has_component::<Bar>(e2));

    let mut calls = 0;
    store.for_each::<(Foo, Bar), _>(|_, _| calls += 1);
    assert_eq!(calls, 0);

    let signature = store.signature(e2).map(|s| s.len());
    assert_eq!(signature, Some(1));
}
