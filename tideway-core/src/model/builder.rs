//! Turn a candidate universe into a [`LinearModel`].
//!
//! Two formulations are available and never mixed within one model:
//!
//! - [`Formulation::CargoFlow`] (default): per candidate, one integer trip
//!   count plus one integer cargo-flow variable per drop-off port. Flows are
//!   linked to trips by `sum(flows) <= nominal_load * trips`, so the model
//!   chooses how a split voyage divides its load. Time and voyage caps are
//!   charged per trip.
//! - [`Formulation::DiscreteExecution`]: per candidate, one integer
//!   execution count. Each execution discharges the fixed equal split
//!   computed by the cost model.
//!
//! Demand rows are hard equalities in both formulations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use log::info;

use crate::{
    CandidateId, CandidateUniverse, Demand, PortId, RouteCandidate, SplitPolicy, Vessel, VesselId,
};

use super::{
    ConstraintId, ConstraintKind, LinearModel, LinearTerm, Metric, ModelError, ModelScaling,
    Rounding, Sense, VariableId, scale,
};

/// Shape of the integer program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Formulation {
    /// Trip counts plus per-port cargo flows.
    #[default]
    CargoFlow,
    /// Execution counts with fixed equal cargo splits.
    ///
    /// Every execution discharges a fixed load, so demand must be an exact
    /// sum of those loads. Raising a vessel's capacity can therefore turn a
    /// feasible instance infeasible, and mixed demands such as 40 000 and
    /// 25 000 t against 50 000 and 25 000 t tankers have no exact cover.
    /// Capacity monotonicity holds only under [`Formulation::CargoFlow`].
    DiscreteExecution,
}

impl Formulation {
    /// Cargo split policy the candidates must carry.
    #[must_use]
    pub const fn split_policy(self) -> SplitPolicy {
        match self {
            Self::CargoFlow => SplitPolicy::ModelChosen,
            Self::DiscreteExecution => SplitPolicy::Equal,
        }
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CargoFlow => "cargo-flow",
            Self::DiscreteExecution => "discrete",
        })
    }
}

impl FromStr for Formulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cargo-flow" | "flow" => Ok(Self::CargoFlow),
            "discrete" | "discrete-execution" => Ok(Self::DiscreteExecution),
            other => Err(format!(
                "unknown formulation '{other}', expected 'cargo-flow' or 'discrete'"
            )),
        }
    }
}

/// Settings for [`ConstraintModelBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    /// Formulation to build.
    pub formulation: Formulation,
    /// Upper bound on each candidate's trip count.
    pub max_executions: u32,
    /// Upper bound on the voyages a vessel sails in the period.
    pub max_voyages_per_vessel: u32,
    /// Require every vessel to carry at least half the average workload.
    pub load_balancing: bool,
    /// Integer scaling of metrics.
    pub scaling: ModelScaling,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            formulation: Formulation::CargoFlow,
            max_executions: 10,
            max_voyages_per_vessel: 8,
            load_balancing: false,
            scaling: ModelScaling::default(),
        }
    }
}

/// Where a candidate's delivery to one port comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverySource {
    /// A cargo-flow variable, in scaled mass units.
    Flow(VariableId),
    /// A fixed number of scaled mass units per execution.
    PerTrip(i64),
}

/// Delivery of one candidate to one drop-off port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryBinding {
    /// Receiving port.
    pub port: PortId,
    /// Source of the delivered units.
    pub source: DeliverySource,
}

impl DeliveryBinding {
    /// Term this delivery contributes to its port's demand row.
    #[must_use]
    pub const fn demand_term(&self, trips: VariableId) -> LinearTerm {
        match self.source {
            DeliverySource::Flow(variable) => LinearTerm {
                variable,
                coefficient: 1,
            },
            DeliverySource::PerTrip(units) => LinearTerm {
                variable: trips,
                coefficient: units,
            },
        }
    }
}

/// Model variables and scaled metrics of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBinding {
    /// Position in the candidate universe.
    pub candidate: usize,
    /// Identifier of the candidate.
    pub id: CandidateId,
    /// Owning vessel.
    pub vessel: VesselId,
    /// Trip or execution count.
    pub trips: VariableId,
    /// Voyage time per trip, in time units (rounded up).
    pub time_units: i64,
    /// Mass loaded per trip, in mass units (rounded down).
    pub nominal_units: i64,
    /// Deliveries in visiting order.
    pub deliveries: Vec<DeliveryBinding>,
}

/// A built model plus the bookkeeping needed to interpret its solution.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetModel {
    model: LinearModel,
    settings: ModelSettings,
    bindings: Vec<CandidateBinding>,
    demand_rows: BTreeMap<PortId, ConstraintId>,
    time_rows: BTreeMap<VesselId, ConstraintId>,
    voyage_rows: BTreeMap<VesselId, ConstraintId>,
}

impl FleetModel {
    /// The integer program.
    #[must_use]
    pub const fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Settings the model was built with.
    #[must_use]
    pub const fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// One binding per candidate, in universe order.
    #[must_use]
    pub fn bindings(&self) -> &[CandidateBinding] {
        &self.bindings
    }

    /// Demand rows keyed by port.
    #[must_use]
    pub const fn demand_rows(&self) -> &BTreeMap<PortId, ConstraintId> {
        &self.demand_rows
    }

    /// Time-budget rows keyed by vessel.
    #[must_use]
    pub const fn time_rows(&self) -> &BTreeMap<VesselId, ConstraintId> {
        &self.time_rows
    }

    /// Voyage-cap rows keyed by vessel.
    #[must_use]
    pub const fn voyage_rows(&self) -> &BTreeMap<VesselId, ConstraintId> {
        &self.voyage_rows
    }

    pub(crate) fn set_objective(&mut self, terms: Vec<LinearTerm>) {
        self.model.set_objective(terms);
    }
}

/// Builds a [`FleetModel`] from candidates, roster and demand.
///
/// # Examples
///
/// ```
/// use tideway_core::{
///     CandidateGenerator, ConstraintKind, ConstraintModelBuilder, Demand, ModelSettings, Port,
///     SplitPolicy, TripTimeTable, Vessel, VoyageCostModel, VoyageParameters,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = TripTimeTable::new().with_trip_days("L1", "U1", 1.0)?;
/// let cost = VoyageCostModel::new(VoyageParameters::default())
///     .with_split_policy(SplitPolicy::ModelChosen);
/// let vessels = vec![Vessel::new("T1", 50_000.0, 1.0, 1.0)?];
/// let universe = CandidateGenerator::new(&table, &cost).generate(
///     &vessels,
///     &[Port::pickup("L1", 0.0)?],
///     &[Port::drop_off("U1", 0.0)?],
/// );
/// let demand = Demand::new([("U1", 40_000.0)])?;
/// let settings = ModelSettings::default();
///
/// let fleet = ConstraintModelBuilder::new(&universe, &vessels, &demand, &settings).build()?;
/// assert_eq!(fleet.model().count_of(ConstraintKind::Demand), 1);
/// assert_eq!(fleet.model().count_of(ConstraintKind::CargoLink), 1);
/// # Ok(())
/// # }
/// ```
pub struct ConstraintModelBuilder<'a> {
    universe: &'a CandidateUniverse,
    vessels: &'a [Vessel],
    demand: &'a Demand,
    settings: &'a ModelSettings,
}

impl<'a> ConstraintModelBuilder<'a> {
    /// Create a builder.
    #[must_use]
    pub const fn new(
        universe: &'a CandidateUniverse,
        vessels: &'a [Vessel],
        demand: &'a Demand,
        settings: &'a ModelSettings,
    ) -> Self {
        Self {
            universe,
            vessels,
            demand,
            settings,
        }
    }

    /// Build the model atomically.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UncoveredDemand`] when a port with positive demand has
    ///   no serving candidate; checked before anything else.
    /// - [`ModelError::UnknownVessel`] or [`ModelError::SplitPolicyMismatch`]
    ///   for candidates that do not belong to this roster or formulation.
    /// - [`ModelError::CoefficientUnderflow`] or
    ///   [`ModelError::CoefficientOverflow`] when scaling loses a metric.
    pub fn build(&self) -> Result<FleetModel, ModelError> {
        self.check_coverage()?;
        let roster: HashMap<&str, &Vessel> = self
            .vessels
            .iter()
            .map(|vessel| (vessel.id.as_str(), vessel))
            .collect();

        let mut model = LinearModel::default();
        let bindings = self
            .universe
            .iter()
            .enumerate()
            .map(|(index, candidate)| self.bind(&mut model, &roster, index, candidate))
            .collect::<Result<Vec<_>, _>>()?;

        let demand_rows = self.add_demand_rows(&mut model, &bindings)?;
        let (time_rows, voyage_rows) = self.add_vessel_rows(&mut model, &bindings)?;
        Self::add_cargo_links(&mut model, &bindings);
        if self.settings.load_balancing {
            Self::add_load_balance(&mut model, &bindings);
        }

        info!(
            "built {:?} model: {} variables, {} constraints",
            self.settings.formulation,
            model.variables().len(),
            model.constraints().len()
        );
        Ok(FleetModel {
            model,
            settings: self.settings.clone(),
            bindings,
            demand_rows,
            time_rows,
            voyage_rows,
        })
    }

    fn check_coverage(&self) -> Result<(), ModelError> {
        match self
            .demand
            .positive()
            .find(|(port, _)| self.universe.serving(port.as_str()).next().is_none())
        {
            Some((port, _)) => Err(ModelError::UncoveredDemand { port: port.clone() }),
            None => Ok(()),
        }
    }

    fn bind(
        &self,
        model: &mut LinearModel,
        roster: &HashMap<&str, &Vessel>,
        index: usize,
        candidate: &RouteCandidate,
    ) -> Result<CandidateBinding, ModelError> {
        if !roster.contains_key(candidate.vessel.as_str()) {
            return Err(ModelError::UnknownVessel {
                candidate: candidate.id.clone(),
                vessel: candidate.vessel.clone(),
            });
        }
        let expected = self.settings.formulation.split_policy();
        let cargo = &candidate.estimate.cargo;
        if cargo.policy != expected {
            return Err(ModelError::SplitPolicyMismatch {
                candidate: candidate.id.clone(),
                expected,
                found: cargo.policy,
            });
        }

        let scaling = &self.settings.scaling;
        let subject = candidate.id.as_str();
        let time_units = scale(
            subject,
            Metric::Time,
            candidate.total_hours(),
            scaling.time_per_hour,
            Rounding::Up,
        )?;
        let nominal_units = scale(
            subject,
            Metric::Cargo,
            cargo.nominal_load_mt,
            scaling.mass_per_mt,
            Rounding::Down,
        )?;
        let max_trips = i64::from(self.settings.max_executions);
        let trips = model.add_variable(format!("trips[{subject}]"), 0, max_trips);

        let deliveries = match self.settings.formulation {
            Formulation::CargoFlow => candidate
                .drop_offs
                .iter()
                .map(|port| DeliveryBinding {
                    port: port.clone(),
                    source: DeliverySource::Flow(model.add_variable(
                        format!("flow[{subject}@{port}]"),
                        0,
                        nominal_units.saturating_mul(max_trips),
                    )),
                })
                .collect(),
            Formulation::DiscreteExecution => cargo
                .allocations
                .iter()
                .map(|allocation| {
                    let units = scale(
                        subject,
                        Metric::Cargo,
                        allocation.mass_mt,
                        scaling.mass_per_mt,
                        Rounding::Down,
                    )?;
                    Ok(DeliveryBinding {
                        port: allocation.port.clone(),
                        source: DeliverySource::PerTrip(units),
                    })
                })
                .collect::<Result<Vec<_>, ModelError>>()?,
        };

        Ok(CandidateBinding {
            candidate: index,
            id: candidate.id.clone(),
            vessel: candidate.vessel.clone(),
            trips,
            time_units,
            nominal_units,
            deliveries,
        })
    }

    fn add_demand_rows(
        &self,
        model: &mut LinearModel,
        bindings: &[CandidateBinding],
    ) -> Result<BTreeMap<PortId, ConstraintId>, ModelError> {
        let ports: BTreeSet<&PortId> = self
            .demand
            .iter()
            .map(|(port, _)| port)
            .chain(bindings.iter().flat_map(|b| b.deliveries.iter().map(|d| &d.port)))
            .collect();

        let mut rows = BTreeMap::new();
        for port in ports {
            let required = scale(
                port.as_str(),
                Metric::Cargo,
                self.demand.get(port.as_str()),
                self.settings.scaling.mass_per_mt,
                Rounding::Nearest,
            )?;
            let terms: Vec<LinearTerm> = bindings
                .iter()
                .flat_map(|binding| {
                    binding
                        .deliveries
                        .iter()
                        .filter(|delivery| &delivery.port == port)
                        .map(|delivery| delivery.demand_term(binding.trips))
                })
                .collect();
            let row = model.add_constraint(
                format!("demand[{port}]"),
                ConstraintKind::Demand,
                terms,
                Sense::Equal,
                required,
            );
            rows.insert(port.clone(), row);
        }
        Ok(rows)
    }

    #[expect(clippy::type_complexity, reason = "pair of row maps")]
    fn add_vessel_rows(
        &self,
        model: &mut LinearModel,
        bindings: &[CandidateBinding],
    ) -> Result<(BTreeMap<VesselId, ConstraintId>, BTreeMap<VesselId, ConstraintId>), ModelError> {
        let mut time_rows = BTreeMap::new();
        let mut voyage_rows = BTreeMap::new();
        for vessel in self.vessels {
            let owned: Vec<&CandidateBinding> =
                bindings.iter().filter(|b| b.vessel == vessel.id).collect();
            if owned.is_empty() {
                continue;
            }
            let budget = scale(
                vessel.id.as_str(),
                Metric::Time,
                vessel.monthly_hours,
                self.settings.scaling.time_per_hour,
                Rounding::Down,
            )?;
            let time = model.add_constraint(
                format!("time[{}]", vessel.id),
                ConstraintKind::TimeBudget,
                owned
                    .iter()
                    .map(|b| LinearTerm {
                        variable: b.trips,
                        coefficient: b.time_units,
                    })
                    .collect(),
                Sense::LessOrEqual,
                budget,
            );
            let voyages = model.add_constraint(
                format!("voyages[{}]", vessel.id),
                ConstraintKind::VoyageCap,
                owned
                    .iter()
                    .map(|b| LinearTerm {
                        variable: b.trips,
                        coefficient: 1,
                    })
                    .collect(),
                Sense::LessOrEqual,
                i64::from(self.settings.max_voyages_per_vessel),
            );
            time_rows.insert(vessel.id.clone(), time);
            voyage_rows.insert(vessel.id.clone(), voyages);
        }
        Ok((time_rows, voyage_rows))
    }

    fn add_cargo_links(model: &mut LinearModel, bindings: &[CandidateBinding]) {
        for binding in bindings {
            let flows: Vec<LinearTerm> = binding
                .deliveries
                .iter()
                .filter_map(|delivery| match delivery.source {
                    DeliverySource::Flow(variable) => Some(LinearTerm {
                        variable,
                        coefficient: 1,
                    }),
                    DeliverySource::PerTrip(_) => None,
                })
                .collect();
            if flows.is_empty() {
                continue;
            }
            let mut terms = flows;
            terms.push(LinearTerm {
                variable: binding.trips,
                coefficient: -binding.nominal_units,
            });
            model.add_constraint(
                format!("link[{}]", binding.id),
                ConstraintKind::CargoLink,
                terms,
                Sense::LessOrEqual,
                0,
            );
        }
    }

    /// `time_v >= mean / 2`, rewritten as
    /// `(2n - 1) * time_v - sum(time_w for w != v) >= 0`.
    fn add_load_balance(model: &mut LinearModel, bindings: &[CandidateBinding]) {
        let active: BTreeSet<&VesselId> = bindings.iter().map(|b| &b.vessel).collect();
        let Ok(n) = i64::try_from(active.len()) else {
            return;
        };
        if n < 2 {
            return;
        }
        let own_weight = 2 * n - 1;
        for vessel in active.iter().copied() {
            let terms = bindings
                .iter()
                .map(|b| LinearTerm {
                    variable: b.trips,
                    coefficient: if &b.vessel == vessel {
                        own_weight.saturating_mul(b.time_units)
                    } else {
                        -b.time_units
                    },
                })
                .collect();
            model.add_constraint(
                format!("balance[{vessel}]"),
                ConstraintKind::LoadBalance,
                terms,
                Sense::GreaterOrEqual,
                0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Scenario, direct_scenario};
    use crate::{CandidateGenerator, VoyageCostModel, VoyageParameters};
    use rstest::{fixture, rstest};

    #[fixture]
    fn scenario() -> Scenario {
        direct_scenario().expect("scenario")
    }

    fn universe(scenario: &Scenario, policy: SplitPolicy) -> CandidateUniverse {
        let cost = VoyageCostModel::new(VoyageParameters::default()).with_split_policy(policy);
        CandidateGenerator::new(&scenario.table, &cost).generate(
            &scenario.vessels,
            &scenario.pickup_ports,
            &scenario.drop_off_ports,
        )
    }

    #[rstest]
    fn cargo_flow_model_has_trip_and_flow_variables(scenario: Scenario) {
        let universe = universe(&scenario, SplitPolicy::ModelChosen);
        let settings = ModelSettings::default();
        let fleet = ConstraintModelBuilder::new(&universe, &scenario.vessels, &scenario.demand, &settings)
            .build()
            .expect("model");

        // two vessels, each with two directs and two split orders
        assert_eq!(universe.len(), 8);
        assert_eq!(fleet.model().variables().len(), 8 + 12);
        assert_eq!(fleet.model().count_of(ConstraintKind::Demand), 2);
        assert_eq!(fleet.model().count_of(ConstraintKind::TimeBudget), 2);
        assert_eq!(fleet.model().count_of(ConstraintKind::VoyageCap), 2);
        assert_eq!(fleet.model().count_of(ConstraintKind::CargoLink), 8);
        assert_eq!(fleet.model().count_of(ConstraintKind::LoadBalance), 0);
    }

    #[rstest]
    fn demand_rows_are_equalities_on_scaled_mass(scenario: Scenario) {
        let universe = universe(&scenario, SplitPolicy::ModelChosen);
        let settings = ModelSettings::default();
        let fleet = ConstraintModelBuilder::new(&universe, &scenario.vessels, &scenario.demand, &settings)
            .build()
            .expect("model");

        let row = fleet
            .demand_rows()
            .get("U1")
            .and_then(|id| fleet.model().constraint(*id))
            .expect("demand row");
        assert_eq!(row.sense, Sense::Equal);
        assert_eq!(row.rhs, 40_000);
        assert_eq!(row.name, "demand[U1]");
    }

    #[rstest]
    fn discrete_model_charges_fixed_splits(scenario: Scenario) {
        let universe = universe(&scenario, SplitPolicy::Equal);
        let settings = ModelSettings {
            formulation: Formulation::DiscreteExecution,
            ..ModelSettings::default()
        };
        let fleet = ConstraintModelBuilder::new(&universe, &scenario.vessels, &scenario.demand, &settings)
            .build()
            .expect("model");

        assert_eq!(fleet.model().variables().len(), 8);
        assert_eq!(fleet.model().count_of(ConstraintKind::CargoLink), 0);
        assert!(fleet.bindings().iter().all(|binding| {
            binding
                .deliveries
                .iter()
                .all(|d| matches!(d.source, DeliverySource::PerTrip(units) if units > 0))
        }));
    }

    #[rstest]
    fn mixed_split_policy_is_rejected(scenario: Scenario) {
        let universe = universe(&scenario, SplitPolicy::ModelChosen);
        let settings = ModelSettings {
            formulation: Formulation::DiscreteExecution,
            ..ModelSettings::default()
        };
        let err = ConstraintModelBuilder::new(&universe, &scenario.vessels, &scenario.demand, &settings)
            .build()
            .expect_err("policy mismatch");
        assert!(matches!(err, ModelError::SplitPolicyMismatch { .. }));
    }

    #[rstest]
    fn uncovered_demand_is_reported_before_building(scenario: Scenario) {
        let universe = universe(&scenario, SplitPolicy::ModelChosen);
        let demand = Demand::new([("U1", 40_000.0), ("U3", 5_000.0)]).expect("demand");
        let err = ConstraintModelBuilder::new(&universe, &scenario.vessels, &demand, &ModelSettings::default())
            .build()
            .expect_err("uncovered");
        assert_eq!(err, ModelError::UncoveredDemand { port: PortId::new("U3") });
    }

    #[rstest]
    fn candidates_outside_the_roster_are_rejected(scenario: Scenario) {
        let universe = universe(&scenario, SplitPolicy::ModelChosen);
        let err = ConstraintModelBuilder::new(&universe, &[], &scenario.demand, &ModelSettings::default())
            .build()
            .expect_err("unknown vessel");
        assert!(matches!(err, ModelError::UnknownVessel { .. }));
    }

    #[rstest]
    fn load_balancing_adds_one_row_per_active_vessel(scenario: Scenario) {
        let universe = universe(&scenario, SplitPolicy::ModelChosen);
        let settings = ModelSettings {
            load_balancing: true,
            ..ModelSettings::default()
        };
        let fleet = ConstraintModelBuilder::new(&universe, &scenario.vessels, &scenario.demand, &settings)
            .build()
            .expect("model");
        assert_eq!(fleet.model().count_of(ConstraintKind::LoadBalance), 2);
    }

    #[rstest]
    #[case("cargo-flow", Formulation::CargoFlow)]
    #[case("Discrete", Formulation::DiscreteExecution)]
    #[case("discrete_execution", Formulation::DiscreteExecution)]
    fn formulation_parses(#[case] raw: &str, #[case] expected: Formulation) {
        assert_eq!(raw.parse::<Formulation>(), Ok(expected));
    }
}
