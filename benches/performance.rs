//! Performance benchmarks for observer dispatch and readiness checks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use statuswatch::{
    AdaptiveSubscriptionManager, FieldHandler, FieldPath, FieldSpec, ObserverEvent,
    PrivacySettings, StatusTree, SubscriptionPlan, UnitSpec,
};
use std::sync::Arc;

/// Benchmark leaf dispatch with varying observer counts
fn bench_dispatch_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_fanout");

    for observers in [1, 10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("observers", observers),
            &observers,
            |b, &count| {
                let tree = StatusTree::new();
                let field = tree
                    .insert_group("charging", "chargingStatus")
                    .insert_field("chargingState");

                for _ in 0..count {
                    field.add_observer(Arc::new(|_, _| {}), ObserverEvent::VALUE_CHANGED);
                }

                let mut toggle = false;
                b.iter(|| {
                    // Alternate values so every update is a real change.
                    toggle = !toggle;
                    let value = if toggle { "charging" } else { "readyForCharging" };
                    field.update_from_server(black_box(json!(value)));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the coarse re-check sweep with varying pending unit counts
fn bench_recheck_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("recheck_sweep");

    for units in [1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("pending_units", units), &units, |b, &count| {
            let tree = StatusTree::new();
            let mut plan = SubscriptionPlan::new();
            for i in 0..count {
                let group_name = format!("group{}", i);
                tree.insert_group("charging", &group_name)
                    .insert_field("state");
                plan = plan.unit(
                    UnitSpec::new(format!("unit{}", i)).field(
                        FieldSpec::new(
                            FieldPath::new("charging", group_name, "state"),
                            FieldHandler::new(|_| {}),
                        )
                        .required(),
                    ),
                );
            }

            // Everything stays pending: each tick re-checks every unit.
            let manager =
                AdaptiveSubscriptionManager::new(Arc::clone(&tree), plan, PrivacySettings::new())
                    .unwrap();

            b.iter(|| {
                tree.notify_updated();
            });

            manager.shutdown();
        });
    }

    group.finish();
}

/// Benchmark group lookup through the domain map
fn bench_group_lookup(c: &mut Criterion) {
    let tree = StatusTree::new();
    for i in 0..100 {
        tree.insert_group("charging", &format!("group{}", i));
    }

    c.bench_function("group_lookup", |b| {
        b.iter(|| {
            black_box(tree.group(black_box("charging"), black_box("group50")));
        });
    });
}

criterion_group!(
    benches,
    bench_dispatch_fanout,
    bench_recheck_sweep,
    bench_group_lookup,
);

criterion_main!(benches);
