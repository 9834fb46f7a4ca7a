//! Optimization results handed back to callers.
//!
//! The structures here define fields and invariants only; serialisation to a
//! wire format is left to the caller (the CLI prints them as JSON).

mod extractor;

use std::collections::BTreeMap;

pub use extractor::{ExtractError, Extraction, ResultExtractor};

use crate::{
    Advisory, CandidateId, CargoAllocation, EmissionsReport, Formulation, ObjectiveMode, PortId,
    RoutePattern, SolverDiagnostics, Suggestion, VesselId,
};

/// Terminal status of one optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum OptimizationStatus {
    /// Proven optimal schedule.
    Optimal,
    /// Valid schedule without an optimality proof.
    Feasible,
    /// No schedule meets every hard constraint.
    Infeasible,
    /// The solver timed out or failed; nothing was proven either way.
    Inconclusive,
}

impl OptimizationStatus {
    /// Whether the result carries a schedule.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

/// A candidate the solver scheduled at least once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedVoyage {
    /// Candidate identifier.
    pub candidate: CandidateId,
    /// Vessel sailing the voyage.
    pub vessel: VesselId,
    /// Loading port.
    pub pickup: PortId,
    /// Drop-off ports in visiting order.
    pub drop_offs: Vec<PortId>,
    /// Direct or split.
    pub pattern: RoutePattern,
    /// Times the voyage runs in the period.
    pub executions: u32,
    /// Mass delivered per port across all executions.
    pub deliveries: Vec<CargoAllocation>,
    /// Cost of one execution.
    pub cost_per_trip: f64,
    /// Cost of all executions.
    pub total_cost: f64,
    /// Hours of one execution.
    pub hours_per_trip: f64,
    /// Distance of all executions, in nautical miles.
    pub distance_nm: f64,
    /// Fuel of all executions, in tonnes.
    pub fuel_mt: f64,
}

/// Demand fulfilment at one drop-off port.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortDelivery {
    /// Drop-off port.
    pub port: PortId,
    /// Required mass.
    pub demand_mt: f64,
    /// Delivered mass.
    pub delivered_mt: f64,
    /// `delivered / demand` as a percentage; 100 when nothing was required.
    pub satisfaction_pct: f64,
}

/// Kind of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Activity {
    /// Alongside the pickup port.
    Load,
    /// Under way.
    Sail,
    /// Alongside a drop-off port.
    Unload,
    /// Unscheduled time at the end of the period.
    Idle,
}

/// One step of a vessel's synthesized schedule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineEntry {
    /// What the vessel is doing.
    pub activity: Activity,
    /// Port alongside, or destination when sailing.
    pub port: Option<PortId>,
    /// Start, in hours from the period start.
    pub start_hours: f64,
    /// End, in hours from the period start.
    pub end_hours: f64,
    /// Voyage the step belongs to.
    pub candidate: Option<CandidateId>,
}

/// Workload of one vessel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VesselSchedule {
    /// Vessel.
    pub vessel: VesselId,
    /// Voyages sailed.
    pub voyages: u32,
    /// Hours charged against the time budget.
    pub utilized_hours: f64,
    /// Monthly operating hours.
    pub available_hours: f64,
    /// `utilized / available` as a percentage.
    pub utilization_pct: f64,
    /// Chronological activities, ending with idle time if any.
    pub timeline: Vec<TimelineEntry>,
}

/// Fleet-wide aggregates.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetKpis {
    /// Cost of every scheduled voyage.
    pub total_cost: f64,
    /// Charter part of `total_cost`.
    pub charter_cost: f64,
    /// Port-charge part of `total_cost`.
    pub port_charges: f64,
    /// Fuel part of `total_cost`.
    pub fuel_cost: f64,
    /// Distance sailed.
    pub total_distance_nm: f64,
    /// Voyages sailed.
    pub total_voyages: u32,
    /// Mass delivered.
    pub delivered_mt: f64,
    /// Mass required.
    pub demand_mt: f64,
    /// `delivered / demand` as a percentage.
    pub demand_satisfaction_pct: f64,
    /// Hours used over hours available, as a percentage.
    pub fleet_utilization_pct: f64,
    /// Cost per delivered tonne, absent when nothing was delivered.
    pub cost_per_mt: Option<f64>,
    /// Fuel, CO2 and EEOI.
    pub emissions: EmissionsReport,
}

/// Constraint left-hand sides re-evaluated on the accepted assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaledTotals {
    /// Delivered mass units per demand row.
    pub delivered: BTreeMap<PortId, i64>,
    /// Time units per vessel time row.
    pub vessel_time: BTreeMap<VesselId, i64>,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    /// Terminal status.
    pub status: OptimizationStatus,
    /// Objective that was minimised.
    pub objective: ObjectiveMode,
    /// Formulation that was built.
    pub formulation: Formulation,
    /// Objective value reported by the solver.
    pub objective_value: Option<f64>,
    /// Candidates generated for the run.
    pub candidate_count: usize,
    /// Scheduled voyages.
    pub selected: Vec<SelectedVoyage>,
    /// Fulfilment per drop-off port.
    pub deliveries: Vec<PortDelivery>,
    /// Workload per vessel.
    pub schedules: Vec<VesselSchedule>,
    /// Fleet aggregates.
    pub kpis: FleetKpis,
    /// Integer row values backing `deliveries` and `schedules`.
    pub scaled: Option<ScaledTotals>,
    /// Ranked remediation suggestions for infeasible runs.
    pub suggestions: Vec<Suggestion>,
    /// Operational notes on successful runs.
    pub advisories: Vec<Advisory>,
    /// Solver observability data, when the solver ran.
    pub diagnostics: Option<SolverDiagnostics>,
    /// Why the run is inconclusive or infeasible, in words.
    pub reason: Option<String>,
}

impl OptimizationResult {
    /// A result with no schedule and zero deliveries.
    #[must_use]
    pub fn unscheduled(
        status: OptimizationStatus,
        objective: ObjectiveMode,
        formulation: Formulation,
        deliveries: Vec<PortDelivery>,
        reason: impl Into<String>,
    ) -> Self {
        let demand_mt = deliveries.iter().map(|d| d.demand_mt).sum();
        Self {
            status,
            objective,
            formulation,
            objective_value: None,
            candidate_count: 0,
            selected: Vec::new(),
            deliveries,
            schedules: Vec::new(),
            kpis: FleetKpis {
                demand_mt,
                ..FleetKpis::default()
            },
            scaled: None,
            suggestions: Vec::new(),
            advisories: Vec::new(),
            diagnostics: None,
            reason: Some(reason.into()),
        }
    }

    /// Fulfilment entry for `port`.
    #[must_use]
    pub fn delivery(&self, port: &str) -> Option<&PortDelivery> {
        self.deliveries.iter().find(|d| d.port.as_str() == port)
    }
}
