//! Contract for the external integer solver.
//!
//! The core never searches for solutions itself. It hands a
//! [`LinearModel`] to a [`MilpSolver`] together with a wall-clock limit and
//! a worker hint, and receives a [`SolverOutcome`]. Implementations live in
//! separate crates so the backend can be swapped without touching the rest
//! of the engine.

use std::time::Duration;

use thiserror::Error;

use crate::LinearModel;

/// `2^53`, the largest magnitude at which every integer is exact in `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Per-call solver configuration.
///
/// Passed explicitly with every solve; there is no process-wide solver
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverSettings {
    /// Wall-clock budget for one solve.
    pub time_limit: Duration,
    /// Parallelism hint for the backend.
    pub workers: u16,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(300),
            workers: 8,
        }
    }
}

/// Terminal state reported by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal assignment.
    Optimal,
    /// Valid assignment without an optimality proof.
    Feasible,
    /// Proven that no assignment satisfies every constraint.
    Infeasible,
    /// The time limit expired before any conclusion.
    TimedOut,
}

/// One value per model variable, in [`LinearModel::variables`] order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assignment(Vec<f64>);

impl Assignment {
    /// Wrap raw solver values.
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Raw values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values rounded to the nearest integer.
    ///
    /// Integer variables come back from floating-point backends with small
    /// tolerances, e.g. `2.9999999`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MalformedAssignment`] when a value is not
    /// finite or too large to be an exact integer.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range is checked before the cast"
    )]
    pub fn rounded(&self) -> Result<Vec<i64>, SolverError> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let rounded = value.round();
                if rounded.is_finite() && rounded.abs() <= MAX_EXACT_INTEGER {
                    Ok(rounded as i64)
                } else {
                    Err(SolverError::MalformedAssignment {
                        reason: format!("variable #{index} has value {value}"),
                    })
                }
            })
            .collect()
    }
}

/// Observability data surfaced by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverDiagnostics {
    /// Wall-clock time spent solving.
    pub wall_time: Duration,
    /// Branch-and-bound nodes explored, when reported.
    pub explored_nodes: Option<u64>,
    /// Best proven bound on the objective, when reported.
    pub best_bound: Option<f64>,
    /// Objective value of the returned assignment.
    pub objective_value: Option<f64>,
}

/// What a solve produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    /// Terminal state.
    pub status: SolveStatus,
    /// Variable values; present for `Optimal` and `Feasible`.
    pub assignment: Option<Assignment>,
    /// Diagnostics for logging and reporting.
    pub diagnostics: SolverDiagnostics,
}

impl SolverOutcome {
    /// Outcome carrying a solution.
    #[must_use]
    pub const fn solved(status: SolveStatus, assignment: Assignment, diagnostics: SolverDiagnostics) -> Self {
        Self {
            status,
            assignment: Some(assignment),
            diagnostics,
        }
    }

    /// Outcome without a solution.
    #[must_use]
    pub const fn unsolved(status: SolveStatus, diagnostics: SolverDiagnostics) -> Self {
        Self {
            status,
            assignment: None,
            diagnostics,
        }
    }
}

/// Errors returned by [`MilpSolver::solve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The backend reported a failure other than infeasibility.
    #[error("solver backend failed: {message}")]
    Backend {
        /// Backend message.
        message: String,
    },
    /// The worker running the backend could not be started or vanished.
    #[error("solver worker unavailable: {message}")]
    WorkerUnavailable {
        /// Cause reported by the runtime.
        message: String,
    },
    /// The backend returned values that do not fit the model.
    #[error("solver returned a malformed assignment: {reason}")]
    MalformedAssignment {
        /// What was wrong.
        reason: String,
    },
}

/// Integer solver treated as an opaque service.
///
/// Calls are blocking and bounded by [`SolverSettings::time_limit`].
/// Implementations must not alter model semantics and must be
/// `Send + Sync` so independent runs can share one solver value.
///
/// # Examples
///
/// ```rust
/// use tideway_core::{
///     LinearModel, MilpSolver, SolveStatus, SolverDiagnostics, SolverError, SolverOutcome,
///     SolverSettings,
/// };
///
/// struct AlwaysInfeasible;
///
/// impl MilpSolver for AlwaysInfeasible {
///     fn solve(
///         &self,
///         _model: &LinearModel,
///         _settings: &SolverSettings,
///     ) -> Result<SolverOutcome, SolverError> {
///         Ok(SolverOutcome::unsolved(
///             SolveStatus::Infeasible,
///             SolverDiagnostics::default(),
///         ))
///     }
/// }
///
/// let outcome = AlwaysInfeasible
///     .solve(&LinearModel::default(), &SolverSettings::default())
///     .expect("solver runs");
/// assert_eq!(outcome.status, SolveStatus::Infeasible);
/// ```
pub trait MilpSolver: Send + Sync {
    /// Solve `model` within `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] when the backend fails; proven infeasibility
    /// and timeouts are reported through [`SolverOutcome::status`] instead.
    fn solve(&self, model: &LinearModel, settings: &SolverSettings) -> Result<SolverOutcome, SolverError>;
}
