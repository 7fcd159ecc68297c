use std::cell::Cell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use fluxion_core::{Engine, UnitId};

const STEP: f32 = 1.0 / 60.0;

fn engine_with_tweens(count: usize, duration: f32) -> Engine {
    let mut engine = Engine::default();
    for i in 0..count {
        let x = Rc::new(Cell::new(0.0f32));
        let (get, set) = (x.clone(), x);
        engine.create(move || get.get(), move |v| set.set(v), i as f32, duration);
    }
    engine
}

/// Sequence of `clips` clips, each holding a nested sequence of two intervals.
fn engine_with_nested_sequence(clips: usize) -> (Engine, UnitId) {
    let mut engine = Engine::default();
    let outer = engine.create_sequence();
    for _ in 0..clips {
        let inner = engine.create_sequence();
        for _ in 0..2 {
            let interval = engine.create_interval(STEP * 3.0);
            engine
                .add_as_new_clip(inner, interval)
                .expect("fresh sequence accepts intervals");
        }
        engine
            .add_as_new_clip(outer, inner)
            .expect("fresh sequence accepts sequences");
    }
    (engine, outer)
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    for count in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::new("steady", count), &count, |b, &count| {
            let mut engine = engine_with_tweens(count, 1.0e6);
            engine.advance(STEP);
            b.iter(|| engine.advance(black_box(STEP)));
        });

        // Every unit completes on the first pass and is reaped on the second.
        group.bench_with_input(
            BenchmarkId::new("complete_and_reap", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || engine_with_tweens(count, STEP * 0.5),
                    |mut engine| {
                        engine.advance(STEP);
                        engine.advance(STEP);
                        engine
                    },
                    BatchSize::LargeInput,
                );
            },
        );

        group.bench_with_input(BenchmarkId::new("create", count), &count, |b, &count| {
            b.iter(|| black_box(engine_with_tweens(count, 1.0)));
        });
    }

    group.bench_function("nested_sequence", |b| {
        b.iter_batched(
            || engine_with_nested_sequence(64),
            |(mut engine, outer)| {
                for _ in 0..10_000 {
                    if !engine.contains(outer) {
                        break;
                    }
                    engine.advance(STEP);
                }
                engine
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);
