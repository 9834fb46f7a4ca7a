//! Criterion benchmarks for end-to-end optimization with `GoodLpSolver`.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package tideway-solver-lp
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use tideway_core::test_support::{Scenario, direct_scenario, split_scenario};
use tideway_core::{Formulation, ModelSettings};
use tideway_solver_lp::test_support::{optimizer, quick_settings};

fn bench_scenario(c: &mut Criterion, name: &str, scenario: &Scenario, formulation: Formulation) {
    let engine = optimizer(scenario);
    let request = scenario
        .request()
        .with_model(ModelSettings {
            formulation,
            ..ModelSettings::default()
        })
        .with_solver(quick_settings());
    c.bench_function(name, |b| {
        b.iter(|| engine.optimize(black_box(&request)));
    });
}

fn bench_solve(c: &mut Criterion) {
    let (Ok(direct), Ok(split)) = (direct_scenario(), split_scenario()) else {
        panic!("reference scenario constants are valid");
    };
    bench_scenario(c, "direct_cargo_flow", &direct, Formulation::CargoFlow);
    bench_scenario(c, "split_discrete", &split, Formulation::DiscreteExecution);
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
