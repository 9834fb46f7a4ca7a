//! `GoodLpSolver` implementation backed by `good_lp` and `microlp`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use good_lp::ResolutionError;
use log::{debug, info, warn};
use tideway_core::{
    Assignment, LinearModel, MilpSolver, SolveStatus, SolverDiagnostics, SolverError,
    SolverOutcome, SolverSettings,
};

use crate::translate::{self, Solved};

const WORKER_NAME: &str = "tideway-lp";

/// Configuration for [`GoodLpSolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpSolverConfig {
    /// Largest distance from an integer accepted for an integer variable.
    pub integrality_tolerance: f64,
    /// Live solve workers a solver tolerates, counting workers abandoned
    /// after a timeout that are still searching.
    pub max_running_workers: usize,
}

impl Default for LpSolverConfig {
    fn default() -> Self {
        Self {
            integrality_tolerance: 1e-6,
            max_running_workers: 2,
        }
    }
}

/// Holds one slot of a solver's worker budget until dropped.
struct WorkerSlot(Arc<AtomicUsize>);

impl WorkerSlot {
    fn claim(running: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        running
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                if live < limit { live.checked_add(1) } else { None }
            })
            .ok()
            .map(|_| Self(Arc::clone(running)))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// MILP solver using `good_lp` with the `microlp` backend.
///
/// `microlp` is single-threaded, so [`SolverSettings::workers`] is logged
/// and otherwise ignored. Every solve reports [`SolveStatus::Optimal`] or
/// [`SolveStatus::Infeasible`] when it finishes in time and
/// [`SolveStatus::TimedOut`] when it does not.
///
/// `microlp` cannot be interrupted. A timed-out worker keeps its CPU and its
/// copy of the model until the search ends on its own. Each solver, and every
/// clone of it, shares a budget of [`LpSolverConfig::max_running_workers`];
/// a solve that finds the budget spent fails with
/// [`SolverError::WorkerUnavailable`] instead of starting another search.
///
/// # Examples
///
/// ```
/// use tideway_core::{ConstraintKind, LinearModel, LinearTerm, MilpSolver, Sense, SolveStatus,
///     SolverSettings};
/// use tideway_solver_lp::GoodLpSolver;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut model = LinearModel::default();
/// let trips = model.add_variable("trips", 0, 5);
/// model.add_constraint(
///     "demand",
///     ConstraintKind::Demand,
///     vec![LinearTerm { variable: trips, coefficient: 2 }],
///     Sense::Equal,
///     6,
/// );
///
/// let outcome = GoodLpSolver::new().solve(&model, &SolverSettings::default())?;
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// let values = outcome.assignment.map(|a| a.rounded()).transpose()?;
/// assert_eq!(values, Some(vec![3]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct GoodLpSolver {
    config: LpSolverConfig,
    running: Arc<AtomicUsize>,
}

impl GoodLpSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub fn with_config(config: LpSolverConfig) -> Self {
        Self {
            config,
            running: Arc::default(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &LpSolverConfig {
        &self.config
    }

    /// Workers still searching, including those abandoned after a timeout.
    #[must_use]
    pub fn running_workers(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    #[expect(clippy::float_arithmetic, reason = "integrality check")]
    fn check_integrality(&self, model: &LinearModel, values: &[f64]) -> Result<(), SolverError> {
        let offender = model
            .variables()
            .iter()
            .zip(values)
            .find(|(_, value)| (*value - value.round()).abs() > self.config.integrality_tolerance);
        match offender {
            Some((variable, value)) => Err(SolverError::MalformedAssignment {
                reason: format!("{} = {value} is not integral", variable.name),
            }),
            None => Ok(()),
        }
    }

    fn outcome(
        &self,
        model: &LinearModel,
        result: Result<Solved, ResolutionError>,
        started_at: Instant,
    ) -> Result<SolverOutcome, SolverError> {
        match result {
            Ok(solved) => {
                self.check_integrality(model, &solved.values)?;
                let diagnostics = SolverDiagnostics {
                    wall_time: started_at.elapsed(),
                    objective_value: Some(solved.objective),
                    ..SolverDiagnostics::default()
                };
                Ok(SolverOutcome::solved(
                    SolveStatus::Optimal,
                    Assignment::new(solved.values),
                    diagnostics,
                ))
            }
            Err(ResolutionError::Infeasible) => Ok(SolverOutcome::unsolved(
                SolveStatus::Infeasible,
                SolverDiagnostics {
                    wall_time: started_at.elapsed(),
                    ..SolverDiagnostics::default()
                },
            )),
            Err(err) => Err(SolverError::Backend {
                message: err.to_string(),
            }),
        }
    }
}

impl MilpSolver for GoodLpSolver {
    fn solve(&self, model: &LinearModel, settings: &SolverSettings) -> Result<SolverOutcome, SolverError> {
        debug!(
            "solving {} variables and {} constraints; worker hint {} ignored by microlp",
            model.variables().len(),
            model.constraints().len(),
            settings.workers
        );
        let started_at = Instant::now();
        if model.variables().is_empty() {
            let status = if model.is_satisfied_by(&[]) {
                SolveStatus::Optimal
            } else {
                SolveStatus::Infeasible
            };
            return Ok(SolverOutcome {
                status,
                assignment: (status == SolveStatus::Optimal).then(Assignment::default),
                diagnostics: SolverDiagnostics::default(),
            });
        }
        let limit = self.config.max_running_workers;
        let slot = WorkerSlot::claim(&self.running, limit).ok_or_else(|| {
            SolverError::WorkerUnavailable {
                message: format!("{limit} solver workers are still running"),
            }
        })?;
        let (sender, receiver) = mpsc::channel();
        let owned = model.clone();
        thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || {
                let _slot = slot;
                if sender.send(translate::solve(&owned)).is_err() {
                    debug!("solve finished after the caller stopped waiting");
                }
            })
            .map_err(|err| SolverError::WorkerUnavailable {
                message: err.to_string(),
            })?;

        match receiver.recv_timeout(settings.time_limit) {
            Ok(result) => {
                let outcome = self.outcome(model, result, started_at)?;
                info!(
                    "solver finished with {:?} in {:?}",
                    outcome.status, outcome.diagnostics.wall_time
                );
                Ok(outcome)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "solver exceeded its {:?} limit; abandoning the worker ({} still running)",
                    settings.time_limit,
                    self.running_workers()
                );
                Ok(SolverOutcome::unsolved(
                    SolveStatus::TimedOut,
                    SolverDiagnostics {
                        wall_time: started_at.elapsed(),
                        ..SolverDiagnostics::default()
                    },
                ))
            }
            Err(RecvTimeoutError::Disconnected) => Err(SolverError::WorkerUnavailable {
                message: "solver worker stopped without an answer".to_owned(),
            }),
        }
    }
}
