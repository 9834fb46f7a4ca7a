//! Solver-agnostic integer linear model.
//!
//! The builder turns a candidate universe into a [`LinearModel`]: bounded
//! integer variables, named linear constraints and a linear objective, all
//! with integer coefficients. Floating-point metrics are converted to
//! integers exactly once, through [`ModelScaling`], and every conversion is
//! guarded so that a non-zero metric never silently becomes zero.

mod builder;
mod objective;

use std::fmt;

use thiserror::Error;

pub use builder::{
    CandidateBinding, ConstraintModelBuilder, DeliveryBinding, DeliverySource, FleetModel,
    Formulation, ModelSettings,
};
pub use objective::{BalancedWeights, ObjectiveMode, ObjectiveSelector};

use crate::{CandidateId, PortId, SplitPolicy, VesselId};

/// Largest magnitude a coefficient may take. Beyond `2^53` the solver's
/// `f64` arithmetic can no longer represent every integer.
pub const MAX_COEFFICIENT: i64 = 1 << 53;

/// Index of a variable within its [`LinearModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(usize);

impl VariableId {
    /// Position of the variable in [`LinearModel::variables`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a constraint within its [`LinearModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(usize);

impl ConstraintId {
    /// Position of the constraint in [`LinearModel::constraints`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A bounded integer decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Human-readable name, e.g. `trips[T1:L1>U1]`.
    pub name: String,
    /// Inclusive lower bound.
    pub lower: i64,
    /// Inclusive upper bound.
    pub upper: i64,
}

/// `coefficient * variable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearTerm {
    /// Variable the term multiplies.
    pub variable: VariableId,
    /// Integer coefficient.
    pub coefficient: i64,
}

/// Relation between a constraint's left-hand side and its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `lhs <= rhs`
    LessOrEqual,
    /// `lhs >= rhs`
    GreaterOrEqual,
    /// `lhs == rhs`
    Equal,
}

/// Family a constraint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Delivered mass equals demand at one port.
    Demand,
    /// A vessel's voyage time fits its monthly hours.
    TimeBudget,
    /// A vessel sails at most the allowed number of voyages.
    VoyageCap,
    /// Cargo flows of a candidate fit its loaded trips.
    CargoLink,
    /// A vessel carries at least half the fleet's average workload.
    LoadBalance,
}

/// A named linear relation over model variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// Human-readable name, e.g. `demand[U1]`.
    pub name: String,
    /// Constraint family.
    pub kind: ConstraintKind,
    /// Left-hand side terms.
    pub terms: Vec<LinearTerm>,
    /// Relation to `rhs`.
    pub sense: Sense,
    /// Right-hand side constant.
    pub rhs: i64,
}

impl Constraint {
    /// Whether `lhs` satisfies the relation.
    #[must_use]
    pub const fn holds_for(&self, lhs: i64) -> bool {
        match self.sense {
            Sense::LessOrEqual => lhs <= self.rhs,
            Sense::GreaterOrEqual => lhs >= self.rhs,
            Sense::Equal => lhs == self.rhs,
        }
    }
}

/// Variables, constraints and a minimisation objective.
///
/// Identifiers are handed out incrementally, so a model is built by one
/// thread and never shared between runs.
///
/// # Examples
///
/// ```
/// use tideway_core::{ConstraintKind, LinearModel, LinearTerm, Sense};
///
/// let mut model = LinearModel::default();
/// let x = model.add_variable("x", 0, 10);
/// let row = model.add_constraint(
///     "cap",
///     ConstraintKind::VoyageCap,
///     vec![LinearTerm { variable: x, coefficient: 2 }],
///     Sense::LessOrEqual,
///     8,
/// );
/// assert_eq!(model.row_value(row, &[4]), Some(8));
/// assert!(model.is_satisfied_by(&[4]));
/// assert!(!model.is_satisfied_by(&[5]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearModel {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Vec<LinearTerm>,
}

impl LinearModel {
    /// Add a bounded integer variable.
    pub fn add_variable(&mut self, name: impl Into<String>, lower: i64, upper: i64) -> VariableId {
        let id = VariableId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            lower,
            upper,
        });
        id
    }

    /// Add a constraint.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        kind: ConstraintKind,
        terms: Vec<LinearTerm>,
        sense: Sense,
        rhs: i64,
    ) -> ConstraintId {
        let id = ConstraintId(self.constraints.len());
        self.constraints.push(Constraint {
            name: name.into(),
            kind,
            terms,
            sense,
            rhs,
        });
        id
    }

    /// Replace the objective.
    pub fn set_objective(&mut self, terms: Vec<LinearTerm>) {
        self.objective = terms;
    }

    /// Variables in creation order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Constraints in creation order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Objective terms, minimised.
    #[must_use]
    pub fn objective(&self) -> &[LinearTerm] {
        &self.objective
    }

    /// Constraint by id.
    #[must_use]
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.0)
    }

    /// Number of constraints of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    /// Evaluate `terms` against one value per variable.
    ///
    /// Returns `None` when a term references a variable without a value or
    /// the sum overflows.
    #[must_use]
    pub fn evaluate(terms: &[LinearTerm], values: &[i64]) -> Option<i64> {
        terms.iter().try_fold(0_i64, |acc, term| {
            let value = values.get(term.variable.0)?;
            acc.checked_add(term.coefficient.checked_mul(*value)?)
        })
    }

    /// Left-hand side of constraint `id` under `values`.
    #[must_use]
    pub fn row_value(&self, id: ConstraintId, values: &[i64]) -> Option<i64> {
        Self::evaluate(&self.constraint(id)?.terms, values)
    }

    /// Objective value under `values`.
    #[must_use]
    pub fn objective_value(&self, values: &[i64]) -> Option<i64> {
        Self::evaluate(&self.objective, values)
    }

    /// Whether `values` respects every bound and constraint.
    #[must_use]
    pub fn is_satisfied_by(&self, values: &[i64]) -> bool {
        values.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(values)
                .all(|(var, value)| (var.lower..=var.upper).contains(value))
            && self.constraints.iter().all(|c| {
                Self::evaluate(&c.terms, values).is_some_and(|lhs| c.holds_for(lhs))
            })
    }
}

/// Integer units per physical unit used when scaling metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelScaling {
    /// Cargo units per metric tonne.
    pub mass_per_mt: f64,
    /// Time units per hour.
    pub time_per_hour: f64,
    /// Objective units per currency unit.
    pub cost_per_currency: f64,
    /// Objective units per tonne of fuel.
    pub fuel_per_mt: f64,
}

impl Default for ModelScaling {
    fn default() -> Self {
        Self {
            mass_per_mt: 1.0,
            time_per_hour: 100.0,
            cost_per_currency: 1.0,
            fuel_per_mt: 1_000.0,
        }
    }
}

/// Rounding applied when a metric is scaled to integer units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rounding {
    Nearest,
    Up,
    Down,
}

/// Quantity being scaled, reported in [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Cargo mass.
    Cargo,
    /// Voyage or budget time.
    Time,
    /// Monetary cost.
    Cost,
    /// Fuel burn.
    Fuel,
    /// Weighted blend of cost and time.
    Blend,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cargo => "cargo",
            Self::Time => "time",
            Self::Cost => "cost",
            Self::Fuel => "fuel",
            Self::Blend => "blended cost",
        };
        f.write_str(name)
    }
}

/// Scale `value` by `per_unit` into an integer coefficient.
///
/// A positive metric that scales to zero is rejected instead of silently
/// dropping a term.
#[expect(clippy::float_arithmetic, reason = "metrics are scaled once here")]
#[expect(
    clippy::cast_possible_truncation,
    reason = "magnitude is checked against MAX_COEFFICIENT before the cast"
)]
#[expect(clippy::cast_precision_loss, reason = "MAX_COEFFICIENT is exact in f64")]
pub(crate) fn scale(
    subject: &str,
    metric: Metric,
    value: f64,
    per_unit: f64,
    rounding: Rounding,
) -> Result<i64, ModelError> {
    let raw = value * per_unit;
    let scaled = match rounding {
        Rounding::Nearest => raw.round(),
        Rounding::Up => raw.ceil(),
        Rounding::Down => raw.floor(),
    };
    if !scaled.is_finite() || scaled.abs() > MAX_COEFFICIENT as f64 {
        return Err(ModelError::CoefficientOverflow {
            subject: subject.to_owned(),
            metric,
            value,
        });
    }
    if value > 0.0 && scaled < 1.0 {
        return Err(ModelError::CoefficientUnderflow {
            subject: subject.to_owned(),
            metric,
            value,
        });
    }
    Ok(scaled as i64)
}

/// Errors raised while building the model or attaching an objective.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A port with positive demand has no serving candidate.
    #[error("port {port} has positive demand but no candidate serves it")]
    UncoveredDemand {
        /// Unserved port.
        port: PortId,
    },
    /// A positive metric scaled to zero.
    #[error("{metric} of {subject} ({value}) vanishes after integer scaling")]
    CoefficientUnderflow {
        /// Candidate, vessel or port the metric belongs to.
        subject: String,
        /// Scaled quantity.
        metric: Metric,
        /// Unscaled value.
        value: f64,
    },
    /// A metric scaled beyond the exactly representable integer range.
    #[error("{metric} of {subject} ({value}) is too large after integer scaling")]
    CoefficientOverflow {
        /// Candidate, vessel or port the metric belongs to.
        subject: String,
        /// Scaled quantity.
        metric: Metric,
        /// Unscaled value.
        value: f64,
    },
    /// A candidate's cargo split does not match the formulation.
    #[error("candidate {candidate} uses {found:?} cargo splits, the formulation needs {expected:?}")]
    SplitPolicyMismatch {
        /// Offending candidate.
        candidate: CandidateId,
        /// Policy the formulation needs.
        expected: SplitPolicy,
        /// Policy the candidate carries.
        found: SplitPolicy,
    },
    /// A candidate references a vessel missing from the roster.
    #[error("candidate {candidate} references unknown vessel {vessel}")]
    UnknownVessel {
        /// Offending candidate.
        candidate: CandidateId,
        /// Missing vessel.
        vessel: VesselId,
    },
    /// A binding references a candidate missing from the universe.
    #[error("model references candidate #{index}, which is not in the universe")]
    UnknownCandidate {
        /// Position looked up.
        index: usize,
    },
}
