//! Behavioural tests for `FleetOptimizer` using rstest-bdd.
#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tideway_core::test_support::{
    Scenario, ScriptedSolver, direct_scenario, named_assignment, shortfall_scenario,
};
use tideway_core::{
    FactorKind, FleetOptimizer, LinearModel, MilpSolver, OptimizationResult, OptimizationStatus,
    OptimizeError, SolveStatus, SolverDiagnostics, SolverError, SolverOutcome, SolverSettings,
};

enum SolverChoice {
    Scripted(ScriptedSolver),
    DirectVoyages,
}

impl SolverChoice {
    fn calls(&self) -> usize {
        match self {
            Self::Scripted(solver) => solver.calls(),
            Self::DirectVoyages => 0,
        }
    }
}

impl MilpSolver for SolverChoice {
    fn solve(&self, model: &LinearModel, settings: &SolverSettings) -> Result<SolverOutcome, SolverError> {
        match self {
            Self::Scripted(solver) => solver.solve(model, settings),
            Self::DirectVoyages => Ok(SolverOutcome::solved(
                SolveStatus::Optimal,
                named_assignment(
                    model,
                    &[
                        ("trips[T1:L1>U1]", 1.0),
                        ("flow[T1:L1>U1@U1]", 40_000.0),
                        ("trips[T2:L1>U2]", 1.0),
                        ("flow[T2:L1>U2@U2]", 25_000.0),
                    ],
                ),
                SolverDiagnostics::default(),
            )),
        }
    }
}

struct OptimizerWorld {
    scenario: RefCell<Option<Scenario>>,
    solver: RefCell<Option<SolverChoice>>,
    calls: RefCell<Option<usize>>,
    outcome: RefCell<Option<Result<OptimizationResult, OptimizeError>>>,
}

impl OptimizerWorld {
    fn result(&self) -> OptimizationResult {
        self.outcome
            .borrow()
            .as_ref()
            .cloned()
            .expect("outcome should be recorded before assertions")
            .expect("run should complete")
    }
}

#[fixture]
fn world() -> OptimizerWorld {
    OptimizerWorld {
        scenario: RefCell::new(None),
        solver: RefCell::new(None),
        calls: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a single 10000 t tanker against 500000 t of demand")]
fn given_shortfall(world: &OptimizerWorld) {
    world.scenario.replace(Some(shortfall_scenario().expect("fixture")));
}

#[given("the direct delivery scenario")]
fn given_direct(world: &OptimizerWorld) {
    world.scenario.replace(Some(direct_scenario().expect("fixture")));
}

#[given("a solver that must not be called")]
fn given_forbidden_solver(world: &OptimizerWorld) {
    world
        .solver
        .replace(Some(SolverChoice::Scripted(ScriptedSolver::failing("must not be called"))));
}

#[given("a solver that times out")]
fn given_timeout_solver(world: &OptimizerWorld) {
    world.solver.replace(Some(SolverChoice::Scripted(ScriptedSolver::new(Ok(
        SolverOutcome::unsolved(SolveStatus::TimedOut, SolverDiagnostics::default()),
    )))));
}

#[given("a solver that serves each port with one direct voyage")]
fn given_direct_solver(world: &OptimizerWorld) {
    world.solver.replace(Some(SolverChoice::DirectVoyages));
}

#[when("the fleet optimizer runs")]
fn when_optimizer_runs(world: &OptimizerWorld) {
    let scenario = world.scenario.borrow().clone().expect("scenario given");
    let solver = world.solver.borrow_mut().take().expect("solver given");
    let optimizer = FleetOptimizer::new(scenario.table.clone(), solver);
    let outcome = optimizer.optimize(&scenario.request());
    world.calls.replace(Some(optimizer.solver().calls()));
    world.outcome.replace(Some(outcome));
}

#[then("the run is infeasible")]
fn then_infeasible(world: &OptimizerWorld) {
    assert_eq!(world.result().status, OptimizationStatus::Infeasible);
}

#[then("the run is inconclusive")]
fn then_inconclusive(world: &OptimizerWorld) {
    assert_eq!(world.result().status, OptimizationStatus::Inconclusive);
}

#[then("the run is optimal")]
fn then_optimal(world: &OptimizerWorld) {
    assert_eq!(world.result().status, OptimizationStatus::Optimal);
}

#[then("no demand is satisfied")]
#[expect(clippy::float_cmp, reason = "nothing was delivered")]
fn then_nothing_delivered(world: &OptimizerWorld) {
    let result = world.result();
    assert_eq!(result.kpis.demand_satisfaction_pct, 0.0);
    assert!(result.deliveries.iter().all(|d| d.delivered_mt == 0.0));
}

#[then("a capacity shortfall suggestion is reported")]
fn then_capacity_suggestion(world: &OptimizerWorld) {
    assert!(
        world
            .result()
            .suggestions
            .iter()
            .any(|s| s.factor == FactorKind::CapacityShortfall)
    );
}

#[then("no suggestions are reported")]
fn then_no_suggestions(world: &OptimizerWorld) {
    assert!(world.result().suggestions.is_empty());
}

#[then("the solver was never called")]
fn then_solver_idle(world: &OptimizerWorld) {
    assert_eq!(*world.calls.borrow(), Some(0));
}

#[then("every port receives exactly its demand")]
#[expect(
    clippy::float_cmp,
    clippy::float_arithmetic,
    reason = "deliveries are whole tonnes"
)]
fn then_exact_deliveries(world: &OptimizerWorld) {
    let result = world.result();
    assert_eq!(result.deliveries.len(), 2);
    for delivery in &result.deliveries {
        assert_eq!(delivery.delivered_mt, delivery.demand_mt, "port {}", delivery.port);
    }
    assert!((result.kpis.demand_satisfaction_pct - 100.0).abs() < 1e-9);
}

#[then("vessel {vessel} sails {voyages} voyages")]
fn then_vessel_voyages(world: &OptimizerWorld, vessel: String, voyages: u32) {
    let result = world.result();
    let schedule = result
        .schedules
        .iter()
        .find(|s| s.vessel.as_str() == vessel)
        .expect("vessel schedule");
    assert_eq!(schedule.voyages, voyages);
}

#[scenario(path = "tests/features/fleet_optimizer.feature", index = 0)]
fn shortfall_fails_fast(world: OptimizerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fleet_optimizer.feature", index = 1)]
fn timeout_is_inconclusive(world: OptimizerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fleet_optimizer.feature", index = 2)]
fn assignment_becomes_schedule(world: OptimizerWorld) {
    let _ = world;
}
