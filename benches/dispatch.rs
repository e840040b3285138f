//! Dispatch benchmarks for attached trackers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use model_change::{
    Attachable, ClassId, EventBus, Model, ModelChangeConfig, ModelChangeTracker, ModelEvent,
    ModelStore, Result,
};

fn tracked_classes(count: usize) -> Vec<ClassId> {
    (0..count).map(|i| ClassId::new(format!("Model{}", i))).collect()
}

/// Benchmark attach + detach with a growing tracked class set
fn bench_attach_detach(c: &mut Criterion) {
    let mut group = c.benchmark_group("attach_detach");

    for classes in [1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("classes", classes), &classes, |b, &n| {
            let bus = EventBus::new();
            let tracker = ModelChangeTracker::with_handler(
                bus.clone(),
                &ModelChangeConfig::for_classes(tracked_classes(n)),
                |_: &ModelEvent| -> Result<()> { Ok(()) },
            );

            b.iter(|| {
                tracker.attach();
                tracker.detach();
            });
        });
    }

    group.finish();
}

/// Benchmark saves flowing through an attached tracker
fn bench_save_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_dispatch");

    for listeners in [0, 1, 8] {
        group.bench_with_input(
            BenchmarkId::new("extra_listeners", listeners),
            &listeners,
            |b, &n| {
                let bus = EventBus::new();
                let store = ModelStore::new(bus.clone());

                let trackers: Vec<_> = (0..=n)
                    .map(|_| {
                        ModelChangeTracker::with_handler(
                            bus.clone(),
                            &ModelChangeConfig::for_classes(vec![ClassId::from("Item")]),
                            |event: &ModelEvent| -> Result<()> {
                                black_box(event.kind());
                                Ok(())
                            },
                        )
                    })
                    .collect();
                for tracker in &trackers {
                    tracker.attach();
                }

                let mut i = 0u64;
                b.iter(|| {
                    i += 1;
                    black_box(store.save(Model::new("Item").with("name", i)).unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_attach_detach, bench_save_dispatch);
criterion_main!(benches);
