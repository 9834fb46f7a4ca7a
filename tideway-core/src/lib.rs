//! Core domain and optimization pipeline for the Tideway fleet router.
//!
//! The crate turns a vessel roster, pickup and drop-off ports, monthly demand
//! and a trip-time table into a monthly voyage schedule. It enumerates route
//! candidates, builds an integer linear model with exact integer scaling,
//! hands the model to a [`MilpSolver`] and extracts a schedule with KPIs, or
//! explains a likely infeasibility.
//!
//! The solver backend lives in a separate crate; this crate only defines the
//! [`MilpSolver`] contract and never searches for solutions itself.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod analysis;
mod candidate;
mod demand;
mod emissions;
mod fleet;
mod ids;
pub mod model;
mod optimizer;
mod port;
mod result;
mod solver;
mod trip;
mod vessel;
mod voyage;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use analysis::{
    Advisory, AdvisoryKind, AnalyzerThresholds, FactorKind, FleetAdvisor, InfeasibilityAnalyzer,
    InfeasibilityContext, Suggestion,
};
pub use candidate::{
    CandidateGenerator, CandidateId, CandidateStatistics, CandidateUniverse, RangeStats,
    RouteCandidate, RoutePattern,
};
pub use demand::{Demand, DemandError};
pub use emissions::{DEFAULT_CARBON_PRICE_PER_T, EeoiRating, EmissionsAccumulator, EmissionsReport};
pub use fleet::{FleetDataProvider, InMemoryFleet};
pub use ids::{ID_SEPARATORS, PortId, VesselId};
pub use model::{
    BalancedWeights, CandidateBinding, ConstraintKind, ConstraintModelBuilder, DeliveryBinding,
    DeliverySource, FleetModel, Formulation, LinearModel, LinearTerm, ModelError, ModelScaling,
    ModelSettings, ObjectiveMode, ObjectiveSelector, Sense,
};
pub use optimizer::{FleetOptimizer, OptimizationRequest, OptimizeError, ValidationError};
pub use port::{DEFAULT_DROP_OFF_CHARGE, DEFAULT_PICKUP_CHARGE, Port, PortError, PortRole};
pub use result::{
    Activity, ExtractError, Extraction, FleetKpis, OptimizationResult, OptimizationStatus,
    PortDelivery, ResultExtractor, ScaledTotals, SelectedVoyage, TimelineEntry, VesselSchedule,
};
pub use solver::{
    Assignment, MilpSolver, SolveStatus, SolverDiagnostics, SolverError, SolverOutcome,
    SolverSettings,
};
pub use trip::{
    Leg, LegKind, MAX_DROP_OFFS, TripError, TripMetrics, TripMetricsProvider, TripTableError,
    TripTimeFallbacks, TripTimeTable, days_to_duration,
};
pub use vessel::{FuelType, MAX_MONTHLY_HOURS, Vessel, VesselError, VesselStatus};
pub use voyage::{
    CargoAllocation, CargoSplit, CostBreakdown, SplitPolicy, VoyageCostModel, VoyageEstimate,
    VoyageParameters, VoyageTimes,
};
