//! Facade crate for the Tideway fleet routing engine.
//!
//! This crate re-exports the core domain types and the orchestrator, and
//! exposes the `good_lp` solver adapter behind the `solver-lp` feature.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "solver-lp")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tideway_engine::{
//!     Demand, FleetOptimizer, GoodLpSolver, OptimizationRequest, OptimizationStatus, Port,
//!     TripTimeTable, Vessel,
//! };
//!
//! let table = TripTimeTable::new().with_trip_days("L1", "U1", 0.4)?;
//! let request = OptimizationRequest::new(
//!     vec![Vessel::new("T1", 50_000.0, 6_300_000.0, 25.0)?],
//!     vec![Port::pickup("L1", 100_000.0)?],
//!     vec![Port::drop_off("U1", 80_000.0)?],
//!     Demand::new([("U1", 50_000.0)])?,
//! );
//! let result = FleetOptimizer::new(table, GoodLpSolver::new()).optimize(&request)?;
//! assert_eq!(result.status, OptimizationStatus::Optimal);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "solver-lp"))]
//! # fn main() {}
//! ```

#![forbid(unsafe_code)]

pub use tideway_core::{
    Advisory, AdvisoryKind, AnalyzerThresholds, CandidateGenerator, CandidateStatistics,
    CandidateUniverse, Demand, EmissionsReport, FactorKind, FleetDataProvider, FleetKpis,
    FleetOptimizer, Formulation, FuelType, InMemoryFleet, InfeasibilityAnalyzer, LinearModel,
    MilpSolver, ModelSettings, ObjectiveMode, OptimizationRequest, OptimizationResult,
    OptimizationStatus, OptimizeError, Port, PortId, RouteCandidate, SolveStatus, SolverError,
    SolverOutcome, SolverSettings, Suggestion, TripMetricsProvider, TripTimeTable,
    ValidationError, Vessel, VesselId, VesselStatus, VoyageCostModel, VoyageParameters,
};

#[cfg(feature = "test-support")]
pub use tideway_core::test_support;

#[cfg(feature = "solver-lp")]
pub use tideway_solver_lp::{GoodLpSolver, LpSolverConfig};
