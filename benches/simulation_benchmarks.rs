//! Validation Benchmarks with 95% Confidence Intervals
//!
//! - closed-form classifier and predictor (per sweep point)
//! - rod integration throughput for growing element counts
//! - sweep dispatch overhead of the work-stealing executor
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use frictionval::config::ValidationConfig;
use frictionval::edd::{classify, predict, simulate_point, AnalyticalInputs};
use frictionval::scenarios::ScenarioParams;
use frictionval::sweep::{default_sweep, SweepExecutor};

/// Classifier + predictor over the reference sweep
fn bench_closed_form(c: &mut Criterion) {
    let mut group = c.benchmark_group("ClosedForm");
    group.sample_size(100);
    group.confidence_level(0.95);

    let sweep = default_sweep();
    group.bench_function("classify_and_predict_sweep", |b| {
        b.iter(|| {
            sweep
                .iter()
                .map(|a| {
                    let alpha = a * std::f64::consts::PI;
                    let c = classify(0.4, 1.0, -9.80665, alpha);
                    predict(
                        c.regime,
                        0.5,
                        &AnalyticalInputs {
                            mass: 1.0,
                            radius: 0.025,
                            gravity: -9.80665,
                            alpha,
                            kinetic_mu: 0.2,
                        },
                    )
                    .total()
                })
                .sum::<f64>()
        });
    });

    group.finish();
}

/// One short sweep point per element count
fn bench_rod_integration(c: &mut Criterion) {
    let mut group = c.benchmark_group("RodIntegration");
    group.sample_size(20);
    group.confidence_level(0.95);

    for n in [5, 20, 50].iter() {
        let config = ValidationConfig::builder()
            .rod(ScenarioParams {
                n_elements: *n,
                ..ScenarioParams::default()
            })
            .final_time(1e-3)
            .snapshots(0)
            .build();
        group.bench_with_input(BenchmarkId::new("1000_steps", n), &config, |b, config| {
            b.iter(|| black_box(simulate_point(config, 0.2).map(|r| r.translational_energy())));
        });
    }

    group.finish();
}

/// Executor overhead on trivial tasks
fn bench_executor(c: &mut Criterion) {
    let mut group = c.benchmark_group("SweepExecutor");
    group.sample_size(50);

    let items: Vec<f64> = (0..256).map(f64::from).collect();
    for workers in [1, 4].iter() {
        let executor = SweepExecutor::with_workers(*workers);
        group.bench_with_input(BenchmarkId::new("dispatch", workers), &items, |b, items| {
            b.iter(|| {
                let out: Result<Vec<f64>, _> =
                    executor.execute(items.as_slice(), |_, x| Ok::<f64, ()>(x.sqrt()));
                black_box(out)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_closed_form, bench_rod_integration, bench_executor);
criterion_main!(benches);
