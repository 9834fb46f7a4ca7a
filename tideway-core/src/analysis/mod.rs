//! Structural diagnosis of infeasible runs and advisories on feasible ones.
//!
//! The analyzer does not inspect the solver's proof. It applies fixed
//! heuristics to the roster, demand and settings and reports plausible
//! contributing factors, cheapest remediation first. None of them is a claim
//! about why the solver failed.

mod advisory;

use std::fmt;
use std::time::Duration;

use log::info;

use crate::{CandidateUniverse, Demand, SolverSettings, Vessel};

pub use advisory::{Advisory, AdvisoryKind, FleetAdvisor};

/// Limits the heuristics compare against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerThresholds {
    /// Demand above `capacity * multiplier` is a capacity shortfall.
    pub capacity_trip_multiplier: f64,
    /// Capacity assumed for each vessel the analyzer proposes to add.
    pub added_vessel_capacity_mt: f64,
    /// Daily charter cost of an added vessel.
    pub added_vessel_daily_rate: f64,
    /// Days charged when costing fleet changes.
    pub planning_days: f64,
    /// `demand / capacity` above which the time budget is under pressure.
    pub time_pressure_ratio: f64,
    /// Fleets with fewer available vessels lack routing flexibility.
    pub min_fleet_size: usize,
    /// Vessels below `mean capacity * ratio` count as small.
    pub small_vessel_ratio: f64,
    /// Daily cost increment of replacing a small vessel.
    pub replacement_daily_rate: f64,
    /// Share of total demand above which one port dominates.
    pub concentration_share: f64,
    /// Share the dominating port should be reduced to.
    pub concentration_target_share: f64,
    /// Port demand above which a closer loading port is suggested.
    pub port_coverage_mt: f64,
    /// Solver time limits below this are too short to trust.
    pub min_time_limit: Duration,
    /// Time limit suggested instead.
    pub recommended_time_limit: Duration,
    /// Worker hints below this are too low to trust.
    pub min_workers: u16,
    /// Worker hint suggested instead.
    pub recommended_workers: u16,
}

impl Default for AnalyzerThresholds {
    fn default() -> Self {
        Self {
            capacity_trip_multiplier: 2.0,
            added_vessel_capacity_mt: 25_000.0,
            added_vessel_daily_rate: 500_000.0,
            planning_days: 30.0,
            time_pressure_ratio: 2.5,
            min_fleet_size: 5,
            small_vessel_ratio: 0.7,
            replacement_daily_rate: 300_000.0,
            concentration_share: 0.30,
            concentration_target_share: 0.25,
            port_coverage_mt: 35_000.0,
            min_time_limit: Duration::from_secs(120),
            recommended_time_limit: Duration::from_secs(300),
            min_workers: 4,
            recommended_workers: 8,
        }
    }
}

/// Contributing factor a suggestion addresses.
///
/// The declaration order breaks ties when sorting suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FactorKind {
    /// Demand exceeds what the fleet can lift.
    CapacityShortfall,
    /// Required trips exceed what the time budget allows.
    TimePressure,
    /// Too few vessels.
    FleetSize,
    /// Too many small vessels.
    FleetComposition,
    /// One port holds a disproportionate share of demand.
    DemandConcentration,
    /// A port's demand is large enough to strain its supply route.
    PortCoverage,
    /// Solver time limit too short.
    SolverTimeLimit,
    /// Solver worker hint too low.
    SolverWorkers,
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CapacityShortfall => "capacity shortfall",
            Self::TimePressure => "time pressure",
            Self::FleetSize => "fleet size",
            Self::FleetComposition => "fleet composition",
            Self::DemandConcentration => "demand concentration",
            Self::PortCoverage => "port coverage",
            Self::SolverTimeLimit => "solver time limit",
            Self::SolverWorkers => "solver workers",
        })
    }
}

/// One remediation proposal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Suggestion {
    /// Factor addressed.
    pub factor: FactorKind,
    /// What to change.
    pub action: String,
    /// Expected effect.
    pub impact: String,
    /// Order-of-magnitude cost of the change; zero for operational changes.
    pub cost_estimate: f64,
    /// 1 is high, 3 is low.
    pub priority: u8,
}

/// Inputs of one analysis.
#[derive(Debug, Clone, Copy)]
pub struct InfeasibilityContext<'a> {
    /// Full roster; only available vessels count towards capacity.
    pub vessels: &'a [Vessel],
    /// Required deliveries.
    pub demand: &'a Demand,
    /// Candidates, when generation ran.
    pub universe: Option<&'a CandidateUniverse>,
    /// Solver settings of the run.
    pub solver: &'a SolverSettings,
    /// Voyage cap per vessel.
    pub max_voyages_per_vessel: u32,
}

/// Runs the structural heuristics.
///
/// # Examples
///
/// ```
/// use tideway_core::{
///     Demand, FactorKind, InfeasibilityAnalyzer, InfeasibilityContext, SolverSettings, Vessel,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let vessels = vec![Vessel::new("T1", 10_000.0, 1.0, 1.0)?];
/// let demand = Demand::new([("U1", 500_000.0)])?;
/// let suggestions = InfeasibilityAnalyzer::default().analyze(&InfeasibilityContext {
///     vessels: &vessels,
///     demand: &demand,
///     universe: None,
///     solver: &SolverSettings::default(),
///     max_voyages_per_vessel: 8,
/// });
/// assert!(suggestions.iter().any(|s| s.factor == FactorKind::CapacityShortfall));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InfeasibilityAnalyzer {
    thresholds: AnalyzerThresholds,
}

impl InfeasibilityAnalyzer {
    /// Create an analyzer with custom thresholds.
    #[must_use]
    pub const fn new(thresholds: AnalyzerThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> &AnalyzerThresholds {
        &self.thresholds
    }

    /// Suggestions sorted by cost estimate, then priority, then factor.
    #[must_use]
    pub fn analyze(&self, context: &InfeasibilityContext<'_>) -> Vec<Suggestion> {
        let fleet = FleetProfile::of(context.vessels);
        let total_demand = context.demand.total();
        let mut suggestions: Vec<Suggestion> = [
            self.capacity_shortfall(&fleet, total_demand),
            self.time_pressure(context, &fleet, total_demand),
            self.fleet_size(&fleet),
            self.fleet_composition(&fleet),
            self.demand_concentration(context.demand, total_demand),
            self.solver_time_limit(context.solver),
            self.solver_workers(context.solver),
        ]
        .into_iter()
        .flatten()
        .chain(self.port_coverage(context.demand))
        .collect();

        suggestions.sort_by(|a, b| {
            a.cost_estimate
                .total_cmp(&b.cost_estimate)
                .then(a.priority.cmp(&b.priority))
                .then(a.factor.cmp(&b.factor))
        });
        info!("infeasibility analysis produced {} suggestions", suggestions.len());
        suggestions
    }

    #[expect(clippy::float_arithmetic, reason = "capacity heuristics")]
    fn capacity_shortfall(&self, fleet: &FleetProfile, demand: f64) -> Option<Suggestion> {
        let liftable = fleet.capacity * self.thresholds.capacity_trip_multiplier;
        if demand <= liftable {
            return None;
        }
        let shortage = demand - liftable;
        let vessels = (shortage / self.thresholds.added_vessel_capacity_mt).ceil().max(1.0);
        Some(Suggestion {
            factor: FactorKind::CapacityShortfall,
            action: format!(
                "add {vessels:.0} vessel(s) of about {:.0} t capacity",
                self.thresholds.added_vessel_capacity_mt
            ),
            impact: format!("covers a shortage of {shortage:.0} t"),
            cost_estimate: vessels
                * self.thresholds.added_vessel_daily_rate
                * self.thresholds.planning_days,
            priority: 1,
        })
    }

    #[expect(clippy::float_arithmetic, reason = "trip ratio heuristics")]
    fn time_pressure(
        &self,
        context: &InfeasibilityContext<'_>,
        fleet: &FleetProfile,
        demand: f64,
    ) -> Option<Suggestion> {
        let ratio_exceeded = if fleet.capacity > 0.0 {
            demand / fleet.capacity > self.thresholds.time_pressure_ratio
        } else {
            demand > 0.0
        };
        let budget_exceeded = context.universe.is_some_and(|universe| {
            demand > time_allowed_capacity(universe, context.vessels, context.max_voyages_per_vessel)
        });
        (ratio_exceeded || budget_exceeded).then(|| Suggestion {
            factor: FactorKind::TimePressure,
            action: "extend the planning horizon".to_owned(),
            impact: "gives vessels time to complete the required trips".to_owned(),
            cost_estimate: 0.0,
            priority: 2,
        })
    }

    fn fleet_size(&self, fleet: &FleetProfile) -> Option<Suggestion> {
        let count = fleet.capacities.len();
        (count < self.thresholds.min_fleet_size).then(|| Suggestion {
            factor: FactorKind::FleetSize,
            action: format!("include more vessels (currently {count})"),
            impact: "increases routing flexibility and coverage".to_owned(),
            cost_estimate: 0.0,
            priority: 2,
        })
    }

    #[expect(clippy::float_arithmetic, reason = "capacity heuristics")]
    #[expect(clippy::cast_precision_loss, reason = "vessel counts are small")]
    fn fleet_composition(&self, fleet: &FleetProfile) -> Option<Suggestion> {
        let count = fleet.capacities.len();
        if count == 0 {
            return None;
        }
        let mean = fleet.capacity / count as f64;
        let cutoff = mean * self.thresholds.small_vessel_ratio;
        let small = fleet.capacities.iter().filter(|c| **c < cutoff).count();
        (small * 2 > count).then(|| Suggestion {
            factor: FactorKind::FleetComposition,
            action: format!("replace {small} small vessel(s) with larger ones"),
            impact: "better matches vessel capacity to demand".to_owned(),
            cost_estimate: small as f64
                * self.thresholds.replacement_daily_rate
                * self.thresholds.planning_days,
            priority: 2,
        })
    }

    #[expect(clippy::float_arithmetic, reason = "demand shares")]
    fn demand_concentration(&self, demand: &Demand, total: f64) -> Option<Suggestion> {
        let (port, largest) = demand.largest()?;
        if largest <= total * self.thresholds.concentration_share {
            return None;
        }
        let reduction = largest - total * self.thresholds.concentration_target_share;
        Some(Suggestion {
            factor: FactorKind::DemandConcentration,
            action: format!("reduce demand at {port} by {reduction:.0} t"),
            impact: "balances demand across ports".to_owned(),
            cost_estimate: 0.0,
            priority: 3,
        })
    }

    fn port_coverage<'d>(&'d self, demand: &'d Demand) -> impl Iterator<Item = Suggestion> + 'd {
        demand
            .positive()
            .filter(|(_, mass)| *mass > self.thresholds.port_coverage_mt)
            .map(|(port, mass)| Suggestion {
                factor: FactorKind::PortCoverage,
                action: format!("add a loading port closer to {port}"),
                impact: format!("shortens transit for {mass:.0} t of demand"),
                cost_estimate: 0.0,
                priority: 3,
            })
    }

    fn solver_time_limit(&self, solver: &SolverSettings) -> Option<Suggestion> {
        (solver.time_limit < self.thresholds.min_time_limit).then(|| Suggestion {
            factor: FactorKind::SolverTimeLimit,
            action: format!(
                "raise the solver time limit from {}s to {}s",
                solver.time_limit.as_secs(),
                self.thresholds.recommended_time_limit.as_secs()
            ),
            impact: "gives the solver time to find or refute a schedule".to_owned(),
            cost_estimate: 0.0,
            priority: 1,
        })
    }

    fn solver_workers(&self, solver: &SolverSettings) -> Option<Suggestion> {
        (solver.workers < self.thresholds.min_workers).then(|| Suggestion {
            factor: FactorKind::SolverWorkers,
            action: format!(
                "raise solver workers from {} to {}",
                solver.workers, self.thresholds.recommended_workers
            ),
            impact: "enables a parallel search".to_owned(),
            cost_estimate: 0.0,
            priority: 2,
        })
    }
}

struct FleetProfile {
    capacities: Vec<f64>,
    capacity: f64,
}

impl FleetProfile {
    fn of(vessels: &[Vessel]) -> Self {
        let capacities: Vec<f64> = vessels
            .iter()
            .filter(|vessel| vessel.is_available())
            .map(|vessel| vessel.capacity_mt)
            .collect();
        let capacity = capacities.iter().sum();
        Self {
            capacities,
            capacity,
        }
    }
}

/// Mass the fleet can lift when every available vessel repeats its fastest
/// candidate as often as its hours and voyage cap allow.
#[expect(clippy::float_arithmetic, reason = "voyage counts from hours")]
fn time_allowed_capacity(universe: &CandidateUniverse, vessels: &[Vessel], max_voyages: u32) -> f64 {
    vessels
        .iter()
        .filter(|vessel| vessel.is_available())
        .filter_map(|vessel| {
            let fastest = universe
                .for_vessel(vessel.id.as_str())
                .map(crate::RouteCandidate::total_hours)
                .filter(|hours| *hours > 0.0)
                .min_by(f64::total_cmp)?;
            let voyages = (vessel.monthly_hours / fastest)
                .floor()
                .min(f64::from(max_voyages));
            Some(vessel.capacity_mt * voyages)
        })
        .sum()
}
