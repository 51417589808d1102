//! Benchmarks for the zrisk-ecl pipeline.
//!
//! Run with: cargo bench -p zrisk-ecl

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use zrisk_config::lgd::LgdModel;
use zrisk_config::model::ParallelConfig;
use zrisk_config::policy::ZTransform;
use zrisk_config::staging::StageMapConfig;
use zrisk_config::ModelConfig;
use zrisk_core::{Account, InterestRate, RatingScale, Scenario, ScenarioSet};
use zrisk_credit::{CreditCycleAdjuster, MarkovPropagator};
use zrisk_ecl::EclEngine;
use zrisk_math::{StochasticMatrix, WriteOffSplit};

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn create_ttc() -> StochasticMatrix {
    let scale = Arc::new(RatingScale::from_names(&["1", "2", "3", "4", "5", "6", "7"], "D").unwrap());
    StochasticMatrix::from_rows(
        scale,
        &[
            vec![0.900, 0.070, 0.020, 0.005, 0.003, 0.001, 0.0005, 0.0005],
            vec![0.020, 0.880, 0.070, 0.020, 0.005, 0.003, 0.0010, 0.0010],
            vec![0.005, 0.030, 0.870, 0.070, 0.015, 0.006, 0.0020, 0.0020],
            vec![0.002, 0.010, 0.050, 0.850, 0.060, 0.020, 0.0040, 0.0040],
            vec![0.001, 0.004, 0.020, 0.070, 0.820, 0.060, 0.0150, 0.0100],
            vec![0.000, 0.002, 0.010, 0.030, 0.080, 0.800, 0.0500, 0.0280],
            vec![0.000, 0.000, 0.005, 0.015, 0.040, 0.100, 0.7400, 0.1000],
            vec![0.050, 0.000, 0.000, 0.000, 0.000, 0.000, 0.0000, 0.9500],
        ],
    )
    .unwrap()
}

fn create_config() -> ModelConfig {
    ModelConfig::new(0.12)
        .with_cure_state("3")
        .with_write_off(WriteOffSplit::new(0.3, 18.0).unwrap())
        .with_lgd(LgdModel::constant(0.35))
        .with_stage_map(StageMapConfig::default())
}

fn create_account(id: usize) -> Account {
    let grades = ["1", "2", "3", "4", "5", "6", "7"];
    Account::builder(format!("LOAN_{id:05}"))
        .balance(10_000.0 + 500.0 * (id % 40) as f64)
        .interest_rate(InterestRate::fixed(0.03 + 0.005 * (id % 8) as f64))
        .remaining_term(60 + 12 * (id % 20))
        .origination_state(grades[id % 3])
        .current_state(grades[id % grades.len()])
        .build()
        .unwrap()
}

fn create_scenarios(periods: usize) -> ScenarioSet {
    let path = |level: f64| (0..periods).map(|t| level * (-(t as f64) / 24.0).exp()).collect::<Vec<f64>>();
    ScenarioSet::new(
        vec![
            Scenario::new("BASE", 0.5, path(0.0)),
            Scenario::new("UP", 0.2, path(-1.0)),
            Scenario::new("DOWN", 0.3, path(1.5)),
        ],
        1e-9,
    )
    .unwrap()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_pit_path(c: &mut Criterion) {
    let ttc = create_ttc();
    let adjuster = CreditCycleAdjuster::new(0.12, ZTransform::Calibrated).unwrap();
    let scenario = Scenario::new("DOWN", 1.0, vec![1.0; 360]);

    let mut group = c.benchmark_group("pit_path");
    for periods in [12, 120, 360] {
        group.throughput(Throughput::Elements(periods as u64));
        group.bench_with_input(BenchmarkId::from_parameter(periods), &periods, |b, &periods| {
            b.iter(|| adjuster.pit_path(black_box(&ttc), black_box(&scenario), periods, None))
        });
    }
    group.finish();
}

fn bench_propagation(c: &mut Criterion) {
    let ttc = create_ttc();
    let propagator = MarkovPropagator::new(Arc::clone(ttc.scale_handle()));
    let matrices = vec![ttc; 360];

    c.bench_function("propagate_360", |b| {
        b.iter(|| propagator.propagate_from_index(black_box(2), black_box(&matrices)))
    });
}

fn bench_single_unit(c: &mut Criterion) {
    let engine = EclEngine::new(create_ttc(), create_config()).unwrap();
    let account = create_account(7);
    let scenario = Scenario::new("BASE", 1.0, vec![0.25; account.remaining_term]);

    c.bench_function("single_unit", |b| {
        b.iter(|| engine.run_unit(black_box(&account), black_box(&scenario)))
    });
}

fn bench_portfolio_run(c: &mut Criterion) {
    let scenarios = create_scenarios(300);

    let mut group = c.benchmark_group("portfolio_run");
    group.sample_size(20);
    for size in [10, 100, 500] {
        let accounts: Vec<Account> = (0..size).map(create_account).collect();
        group.throughput(Throughput::Elements((size * scenarios.len()) as u64));

        let sequential = EclEngine::new(
            create_ttc(),
            create_config().with_parallel(ParallelConfig::sequential()),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("sequential", size), &accounts, |b, accounts| {
            b.iter(|| sequential.run(black_box(accounts), black_box(&scenarios)))
        });

        let parallel = EclEngine::new(create_ttc(), create_config()).unwrap();
        group.bench_with_input(BenchmarkId::new("parallel", size), &accounts, |b, accounts| {
            b.iter(|| parallel.run(black_box(accounts), black_box(&scenarios)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_pit_path,
    bench_propagation,
    bench_single_unit,
    bench_portfolio_run
);
criterion_main!(benches);
