//! Test-only utilities for `tideway-solver-lp`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and `cfg(test)`).

use std::time::Duration;

use tideway_core::test_support::Scenario;
use tideway_core::{FleetOptimizer, SolverSettings, TripTimeTable};

use crate::GoodLpSolver;

/// Solver settings short enough for a test suite.
///
/// # Examples
/// ```rust
/// use tideway_solver_lp::test_support::quick_settings;
///
/// assert_eq!(quick_settings().workers, 1);
/// ```
#[must_use]
pub const fn quick_settings() -> SolverSettings {
    SolverSettings {
        time_limit: Duration::from_secs(60),
        workers: 1,
    }
}

/// An optimizer over the scenario's trip table and a default solver.
#[must_use]
pub fn optimizer(scenario: &Scenario) -> FleetOptimizer<TripTimeTable, GoodLpSolver> {
    FleetOptimizer::new(scenario.table.clone(), GoodLpSolver::new())
}
