//! End-to-end optimization runs.
//!
//! [`FleetOptimizer`] wires the pipeline together: validate, fail fast on
//! gross capacity shortfalls, generate candidates, build the model, solve,
//! then extract a schedule or analyse infeasibility. Every call builds and
//! owns its own model; the optimizer keeps no state between calls.

use std::collections::HashSet;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    BalancedWeights, CandidateGenerator, CandidateUniverse, ConstraintModelBuilder,
    DEFAULT_CARBON_PRICE_PER_T, Demand, FleetAdvisor, FleetDataProvider, InfeasibilityAnalyzer,
    InfeasibilityContext, MilpSolver, ModelError, ModelSettings, ObjectiveMode, ObjectiveSelector,
    OptimizationResult, OptimizationStatus, Port, PortDelivery, PortError, PortId, PortRole,
    ResultExtractor, SolveStatus, SolverSettings, TripMetricsProvider, Vessel, VesselError,
    VesselId, VoyageCostModel, VoyageParameters,
};

/// Everything one run needs besides the trip metrics and the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRequest {
    /// Vessel roster.
    pub vessels: Vec<Vessel>,
    /// Loading ports.
    pub pickup_ports: Vec<Port>,
    /// Discharge ports.
    pub drop_off_ports: Vec<Port>,
    /// Required mass per drop-off port.
    pub demand: Demand,
    /// Quantity to minimise.
    pub objective: ObjectiveMode,
    /// Blend weights for [`ObjectiveMode::Balanced`].
    pub balanced_weights: BalancedWeights,
    /// Voyage constants.
    pub voyage: VoyageParameters,
    /// Model shape and scaling.
    pub model: ModelSettings,
    /// Solver time limit and worker hint.
    pub solver: SolverSettings,
    /// Price per tonne of CO2 in the emissions report.
    pub carbon_price_per_t: f64,
}

impl OptimizationRequest {
    /// A request with default settings.
    #[must_use]
    pub fn new(
        vessels: Vec<Vessel>,
        pickup_ports: Vec<Port>,
        drop_off_ports: Vec<Port>,
        demand: Demand,
    ) -> Self {
        Self {
            vessels,
            pickup_ports,
            drop_off_ports,
            demand,
            objective: ObjectiveMode::default(),
            balanced_weights: BalancedWeights::default(),
            voyage: VoyageParameters::default(),
            model: ModelSettings::default(),
            solver: SolverSettings::default(),
            carbon_price_per_t: DEFAULT_CARBON_PRICE_PER_T,
        }
    }

    /// A request with default settings over the data in `provider`.
    #[must_use]
    pub fn from_provider(provider: &dyn FleetDataProvider) -> Self {
        Self::new(
            provider.vessels().to_vec(),
            provider.pickup_ports().to_vec(),
            provider.drop_off_ports().to_vec(),
            provider.demand().clone(),
        )
    }

    /// Replace the objective.
    #[must_use]
    pub fn with_objective(mut self, objective: ObjectiveMode) -> Self {
        self.objective = objective;
        self
    }

    /// Replace the voyage constants.
    #[must_use]
    pub fn with_voyage(mut self, voyage: VoyageParameters) -> Self {
        self.voyage = voyage;
        self
    }

    /// Replace the model settings.
    #[must_use]
    pub fn with_model(mut self, model: ModelSettings) -> Self {
        self.model = model;
        self
    }

    /// Replace the solver settings.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// Check every input before any model is built.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, naming the offending
    /// entity or field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.vessels.is_empty() {
            return Err(ValidationError::NoVessels);
        }
        let mut vessels = HashSet::new();
        for vessel in &self.vessels {
            vessel.validate()?;
            if !vessels.insert(vessel.id.as_str()) {
                return Err(ValidationError::DuplicateVessel {
                    vessel: vessel.id.clone(),
                });
            }
        }

        let mut ports = HashSet::new();
        let roles = self
            .pickup_ports
            .iter()
            .map(|port| (port, PortRole::Pickup))
            .chain(self.drop_off_ports.iter().map(|port| (port, PortRole::DropOff)));
        for (port, expected) in roles {
            port.validate()?;
            if port.role != expected {
                return Err(ValidationError::PortRoleMismatch {
                    port: port.id.clone(),
                    expected,
                });
            }
            if !ports.insert(port.id.as_str()) {
                return Err(ValidationError::DuplicatePort {
                    port: port.id.clone(),
                });
            }
        }
        if let Some((port, _)) = self
            .demand
            .iter()
            .find(|(port, _)| !self.drop_off_ports.iter().any(|p| &p.id == *port))
        {
            return Err(ValidationError::DemandForUnknownPort { port: port.clone() });
        }

        self.validate_settings()
    }

    fn validate_settings(&self) -> Result<(), ValidationError> {
        let voyage = &self.voyage;
        if !voyage.fuel_price_per_mt.is_finite() || voyage.fuel_price_per_mt < 0.0 {
            return Err(ValidationError::InvalidFuelPrice {
                value: voyage.fuel_price_per_mt,
            });
        }
        if !(voyage.load_factor > 0.0 && voyage.load_factor <= 1.0) {
            return Err(ValidationError::InvalidLoadFactor {
                value: voyage.load_factor,
            });
        }
        if !(voyage.service_speed_knots.is_finite() && voyage.service_speed_knots > 0.0) {
            return Err(ValidationError::InvalidServiceSpeed {
                value: voyage.service_speed_knots,
            });
        }
        if !self.carbon_price_per_t.is_finite() || self.carbon_price_per_t < 0.0 {
            return Err(ValidationError::InvalidCarbonPrice {
                value: self.carbon_price_per_t,
            });
        }
        if self.solver.time_limit.is_zero() {
            return Err(ValidationError::ZeroTimeLimit);
        }
        if self.model.max_voyages_per_vessel == 0 {
            return Err(ValidationError::ZeroMaxVoyages);
        }
        if self.model.max_executions == 0 {
            return Err(ValidationError::ZeroMaxExecutions);
        }
        Ok(())
    }

    /// Mass the available fleet could lift if every vessel sailed full on
    /// every allowed voyage.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "capacity bound in tonnes")]
    pub fn liftable_mass(&self) -> f64 {
        let voyages = f64::from(self.model.max_voyages_per_vessel);
        self.vessels
            .iter()
            .filter(|vessel| vessel.is_available())
            .map(|vessel| vessel.capacity_mt * self.voyage.load_factor * voyages)
            .sum()
    }
}

/// Input rejected before model construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A vessel failed its own checks.
    #[error(transparent)]
    Vessel(#[from] VesselError),
    /// A port failed its own checks.
    #[error(transparent)]
    Port(#[from] PortError),
    /// The roster is empty.
    #[error("the vessel roster is empty")]
    NoVessels,
    /// Two vessels share an identifier.
    #[error("vessel {vessel} appears more than once")]
    DuplicateVessel {
        /// Repeated identifier.
        vessel: VesselId,
    },
    /// Two ports share an identifier, possibly across roles.
    #[error("port {port} appears more than once")]
    DuplicatePort {
        /// Repeated identifier.
        port: PortId,
    },
    /// A port sits in the list of the other role.
    #[error("port {port} is listed as {expected:?} but has a different role")]
    PortRoleMismatch {
        /// Offending port.
        port: PortId,
        /// Role of the list it sits in.
        expected: PortRole,
    },
    /// Demand names a port that is not a drop-off port.
    #[error("demand references {port}, which is not a drop-off port")]
    DemandForUnknownPort {
        /// Unknown port.
        port: PortId,
    },
    /// Fuel price negative or not a number.
    #[error("fuel price must be non-negative, got {value}")]
    InvalidFuelPrice {
        /// Rejected value.
        value: f64,
    },
    /// Load factor outside `(0, 1]`.
    #[error("load factor must be in (0, 1], got {value}")]
    InvalidLoadFactor {
        /// Rejected value.
        value: f64,
    },
    /// Service speed not positive.
    #[error("service speed must be positive, got {value}")]
    InvalidServiceSpeed {
        /// Rejected value.
        value: f64,
    },
    /// Carbon price negative or not a number.
    #[error("carbon price must be non-negative, got {value}")]
    InvalidCarbonPrice {
        /// Rejected value.
        value: f64,
    },
    /// Solver time limit of zero.
    #[error("solver time limit must be positive")]
    ZeroTimeLimit,
    /// Voyage cap of zero.
    #[error("max voyages per vessel must be at least 1")]
    ZeroMaxVoyages,
    /// Execution cap of zero.
    #[error("max executions per candidate must be at least 1")]
    ZeroMaxExecutions,
}

/// Errors that end a run without a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// The request is malformed.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    /// A port with positive demand has no serving candidate; no solver call
    /// can fix this.
    #[error("port {port} has positive demand but no candidate serves it")]
    UncoveredDemand {
        /// Unserved port.
        port: PortId,
    },
    /// The model could not be built.
    #[error("model construction failed: {0}")]
    Model(#[source] ModelError),
}

impl From<ModelError> for OptimizeError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UncoveredDemand { port } => Self::UncoveredDemand { port },
            other => Self::Model(other),
        }
    }
}

/// Runs the optimization pipeline over a trip-metrics provider and a solver.
///
/// # Examples
///
/// ```
/// use tideway_core::{
///     Demand, FleetOptimizer, LinearModel, MilpSolver, OptimizationRequest, OptimizationStatus,
///     Port, SolveStatus, SolverDiagnostics, SolverError, SolverOutcome, SolverSettings,
///     TripTimeTable, Vessel,
/// };
///
/// struct NeverCalled;
///
/// impl MilpSolver for NeverCalled {
///     fn solve(&self, _: &LinearModel, _: &SolverSettings) -> Result<SolverOutcome, SolverError> {
///         Ok(SolverOutcome::unsolved(SolveStatus::TimedOut, SolverDiagnostics::default()))
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = TripTimeTable::new().with_trip_days("L1", "U1", 0.4)?;
/// let request = OptimizationRequest::new(
///     vec![Vessel::new("T1", 10_000.0, 1.0, 1.0)?],
///     vec![Port::pickup("L1", 0.0)?],
///     vec![Port::drop_off("U1", 0.0)?],
///     Demand::new([("U1", 500_000.0)])?,
/// );
///
/// let result = FleetOptimizer::new(table, NeverCalled).optimize(&request)?;
/// assert_eq!(result.status, OptimizationStatus::Infeasible);
/// assert!(!result.suggestions.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct FleetOptimizer<P, S> {
    provider: P,
    solver: S,
    analyzer: InfeasibilityAnalyzer,
    advisor: FleetAdvisor,
}

impl<P: TripMetricsProvider, S: MilpSolver> FleetOptimizer<P, S> {
    /// Create an optimizer with default analyzer and advisor thresholds.
    #[must_use]
    pub fn new(provider: P, solver: S) -> Self {
        Self {
            provider,
            solver,
            analyzer: InfeasibilityAnalyzer::default(),
            advisor: FleetAdvisor::default(),
        }
    }

    /// Replace the infeasibility analyzer.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: InfeasibilityAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Replace the advisor.
    #[must_use]
    pub fn with_advisor(mut self, advisor: FleetAdvisor) -> Self {
        self.advisor = advisor;
        self
    }

    /// Trip metrics in use.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Solver in use.
    #[must_use]
    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// Validate `request` and generate its candidate universe.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::Validation`] for malformed input.
    pub fn candidates(&self, request: &OptimizationRequest) -> Result<CandidateUniverse, OptimizeError> {
        request.validate()?;
        Ok(self.generate(request))
    }

    /// Run the full pipeline once.
    ///
    /// Proven infeasibility, timeouts and solver failures are reported
    /// through [`OptimizationResult::status`], never as errors.
    ///
    /// # Errors
    ///
    /// - [`OptimizeError::Validation`] for malformed input.
    /// - [`OptimizeError::UncoveredDemand`] when a demand port has no
    ///   serving candidate.
    /// - [`OptimizeError::Model`] when a metric does not survive integer
    ///   scaling.
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult, OptimizeError> {
        request.validate()?;

        let demand_mt = request.demand.total();
        let liftable = request.liftable_mass();
        if demand_mt > liftable {
            info!("demand of {demand_mt:.0} t exceeds the liftable {liftable:.0} t; skipping the solver");
            return Ok(self.infeasible(
                request,
                None,
                format!("demand of {demand_mt:.0} t exceeds the {liftable:.0} t the fleet can lift"),
            ));
        }

        let universe = self.generate(request);
        if universe.is_empty() {
            return Ok(self.infeasible(request, Some(&universe), "no voyage candidates could be generated"));
        }

        let mut fleet =
            ConstraintModelBuilder::new(&universe, &request.vessels, &request.demand, &request.model)
                .build()?;
        ObjectiveSelector::new(request.objective)
            .with_weights(request.balanced_weights)
            .apply(&mut fleet, &universe)?;

        let outcome = match self.solver.solve(fleet.model(), &request.solver) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("solver failed: {err}");
                return Ok(inconclusive(request, &universe, err.to_string()));
            }
        };
        debug!("solver diagnostics: {:?}", outcome.diagnostics);

        let result = match (outcome.status, outcome.assignment) {
            (SolveStatus::Optimal | SolveStatus::Feasible, Some(assignment)) => {
                let extraction = ResultExtractor::new(
                    &fleet,
                    &universe,
                    &request.vessels,
                    &request.demand,
                    &request.voyage,
                )
                .with_carbon_price(request.carbon_price_per_t)
                .extract(&assignment);
                match extraction {
                    Ok(extraction) => {
                        let status = if outcome.status == SolveStatus::Optimal {
                            OptimizationStatus::Optimal
                        } else {
                            OptimizationStatus::Feasible
                        };
                        let advisories = self.advisor.advise(&extraction);
                        OptimizationResult {
                            status,
                            objective: request.objective,
                            formulation: request.model.formulation,
                            objective_value: objective_value(extraction.objective_units)
                                .or(outcome.diagnostics.objective_value),
                            candidate_count: universe.len(),
                            selected: extraction.selected,
                            deliveries: extraction.deliveries,
                            schedules: extraction.schedules,
                            kpis: extraction.kpis,
                            scaled: Some(extraction.scaled),
                            suggestions: Vec::new(),
                            advisories,
                            diagnostics: Some(outcome.diagnostics),
                            reason: None,
                        }
                    }
                    Err(err) => {
                        warn!("discarding solver assignment: {err}");
                        inconclusive(request, &universe, err.to_string())
                    }
                }
            }
            (SolveStatus::Optimal | SolveStatus::Feasible, None) => inconclusive(
                request,
                &universe,
                "solver reported success without an assignment",
            ),
            (SolveStatus::Infeasible, _) => {
                let mut result =
                    self.infeasible(request, Some(&universe), "the solver proved the model infeasible");
                result.diagnostics = Some(outcome.diagnostics);
                result
            }
            (SolveStatus::TimedOut, _) => {
                let mut result = inconclusive(
                    request,
                    &universe,
                    format!(
                        "time limit of {}s expired without a conclusion",
                        request.solver.time_limit.as_secs()
                    ),
                );
                result.diagnostics = Some(outcome.diagnostics);
                result
            }
        };
        info!("optimization finished with status {:?}", result.status);
        Ok(result)
    }

    fn generate(&self, request: &OptimizationRequest) -> CandidateUniverse {
        let cost_model = VoyageCostModel::new(request.voyage.clone())
            .with_split_policy(request.model.formulation.split_policy());
        CandidateGenerator::new(&self.provider, &cost_model).generate(
            &request.vessels,
            &request.pickup_ports,
            &request.drop_off_ports,
        )
    }

    fn infeasible(
        &self,
        request: &OptimizationRequest,
        universe: Option<&CandidateUniverse>,
        reason: impl Into<String>,
    ) -> OptimizationResult {
        let suggestions = self.analyzer.analyze(&InfeasibilityContext {
            vessels: &request.vessels,
            demand: &request.demand,
            universe,
            solver: &request.solver,
            max_voyages_per_vessel: request.model.max_voyages_per_vessel,
        });
        let mut result = OptimizationResult::unscheduled(
            OptimizationStatus::Infeasible,
            request.objective,
            request.model.formulation,
            undelivered(&request.demand),
            reason,
        );
        result.candidate_count = universe.map_or(0, CandidateUniverse::len);
        result.suggestions = suggestions;
        result
    }
}

fn inconclusive(
    request: &OptimizationRequest,
    universe: &CandidateUniverse,
    reason: impl Into<String>,
) -> OptimizationResult {
    let mut result = OptimizationResult::unscheduled(
        OptimizationStatus::Inconclusive,
        request.objective,
        request.model.formulation,
        undelivered(&request.demand),
        reason,
    );
    result.candidate_count = universe.len();
    result
}

fn undelivered(demand: &Demand) -> Vec<PortDelivery> {
    demand
        .iter()
        .map(|(port, demand_mt)| PortDelivery {
            port: port.clone(),
            demand_mt,
            delivered_mt: 0.0,
            satisfaction_pct: if demand_mt > 0.0 { 0.0 } else { 100.0 },
        })
        .collect()
}

#[expect(clippy::cast_precision_loss, reason = "objective values stay below 2^53")]
fn objective_value(units: Option<i64>) -> Option<f64> {
    units.map(|units| units as f64)
}
