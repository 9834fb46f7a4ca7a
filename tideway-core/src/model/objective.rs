//! Attach a linear objective to a built model.

use std::fmt;
use std::str::FromStr;

use log::info;

use crate::CandidateUniverse;

use super::{FleetModel, LinearTerm, Metric, ModelError, Rounding, scale};

/// Quantity the optimizer minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ObjectiveMode {
    /// Total voyage cost.
    #[default]
    Cost,
    /// Total fuel burn, a proxy for CO2.
    Emissions,
    /// Total voyage time.
    Time,
    /// Fixed-weight blend of cost and time.
    Balanced,
}

impl fmt::Display for ObjectiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cost => "cost",
            Self::Emissions => "emissions",
            Self::Time => "time",
            Self::Balanced => "balanced",
        })
    }
}

impl FromStr for ObjectiveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" => Ok(Self::Cost),
            "emissions" | "fuel" => Ok(Self::Emissions),
            "time" => Ok(Self::Time),
            "balanced" => Ok(Self::Balanced),
            other => Err(format!(
                "unknown objective '{other}', expected cost, emissions, time or balanced"
            )),
        }
    }
}

/// Objective units contributed per currency unit and per hour in
/// [`ObjectiveMode::Balanced`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancedWeights {
    /// Units per currency unit of cost.
    pub cost: f64,
    /// Units per hour of voyage time.
    pub time_hours: f64,
}

impl Default for BalancedWeights {
    fn default() -> Self {
        Self {
            cost: 0.1,
            time_hours: 100.0,
        }
    }
}

/// Builds the objective row for a [`FleetModel`].
///
/// Each candidate contributes `trips * coefficient`; no slack or penalty
/// terms are added, so unmet demand can never be traded against cost.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectiveSelector {
    mode: ObjectiveMode,
    weights: BalancedWeights,
}

impl ObjectiveSelector {
    /// Select `mode` with default blend weights.
    #[must_use]
    pub fn new(mode: ObjectiveMode) -> Self {
        Self {
            mode,
            weights: BalancedWeights::default(),
        }
    }

    /// Replace the blend weights used by [`ObjectiveMode::Balanced`].
    #[must_use]
    pub const fn with_weights(mut self, weights: BalancedWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Selected mode.
    #[must_use]
    pub const fn mode(&self) -> ObjectiveMode {
        self.mode
    }

    /// Set the objective of `fleet` from the metrics in `universe`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownCandidate`] when `fleet` was built from a
    /// different universe, and a coefficient error when a metric does not
    /// survive scaling.
    pub fn apply(&self, fleet: &mut FleetModel, universe: &CandidateUniverse) -> Result<(), ModelError> {
        let scaling = fleet.settings().scaling;
        let terms = fleet
            .bindings()
            .iter()
            .map(|binding| {
                let candidate = universe
                    .get(binding.candidate)
                    .filter(|candidate| candidate.id == binding.id)
                    .ok_or(ModelError::UnknownCandidate {
                        index: binding.candidate,
                    })?;
                let subject = candidate.id.as_str();
                let coefficient = match self.mode {
                    ObjectiveMode::Cost => scale(
                        subject,
                        Metric::Cost,
                        candidate.total_cost(),
                        scaling.cost_per_currency,
                        Rounding::Nearest,
                    )?,
                    ObjectiveMode::Emissions => scale(
                        subject,
                        Metric::Fuel,
                        candidate.estimate.fuel_mt,
                        scaling.fuel_per_mt,
                        Rounding::Nearest,
                    )?,
                    ObjectiveMode::Time => binding.time_units,
                    ObjectiveMode::Balanced => scale(
                        subject,
                        Metric::Blend,
                        self.blend(candidate.total_cost(), candidate.total_hours()),
                        1.0,
                        Rounding::Nearest,
                    )?,
                };
                Ok(LinearTerm {
                    variable: binding.trips,
                    coefficient,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        info!("objective {} over {} candidates", self.mode, terms.len());
        fleet.set_objective(terms);
        Ok(())
    }

    #[expect(clippy::float_arithmetic, reason = "weighted blend of two metrics")]
    fn blend(&self, cost: f64, hours: f64) -> f64 {
        self.weights.cost * cost + self.weights.time_hours * hours
    }
}
