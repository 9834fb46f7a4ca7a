//! Fixtures shared by unit, behaviour and downstream tests.
//!
//! The challenge fleet mirrors a coastal tanker operation: nine tankers,
//! six loading ports and eleven discharge ports with monthly demand.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::{
    Assignment, DEFAULT_DROP_OFF_CHARGE, DEFAULT_PICKUP_CHARGE, Demand, DemandError, FuelType,
    InMemoryFleet, LinearModel, MAX_MONTHLY_HOURS, MilpSolver, OptimizationRequest, Port,
    PortRole, SolverError, SolverOutcome, SolverSettings, TripTableError, TripTimeTable, Vessel,
    VesselStatus,
};

/// Errors raised while assembling a fixture.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixtureError {
    /// Demand entries were rejected.
    #[error(transparent)]
    Demand(#[from] DemandError),
    /// A trip-time entry was rejected.
    #[error(transparent)]
    Trip(#[from] TripTableError),
}

/// A self-contained optimization input.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Vessel roster.
    pub vessels: Vec<Vessel>,
    /// Loading ports.
    pub pickup_ports: Vec<Port>,
    /// Discharge ports.
    pub drop_off_ports: Vec<Port>,
    /// Required mass per discharge port.
    pub demand: Demand,
    /// Sailing times.
    pub table: TripTimeTable,
}

impl Scenario {
    /// Request with default settings.
    #[must_use]
    pub fn request(&self) -> OptimizationRequest {
        OptimizationRequest::new(
            self.vessels.clone(),
            self.pickup_ports.clone(),
            self.drop_off_ports.clone(),
            self.demand.clone(),
        )
    }

    /// The scenario's static data behind a fleet data provider.
    #[must_use]
    pub fn fleet(&self) -> InMemoryFleet {
        InMemoryFleet::new(
            self.vessels.clone(),
            self.pickup_ports
                .iter()
                .chain(&self.drop_off_ports)
                .cloned()
                .collect(),
            self.demand.clone(),
        )
    }
}

/// An available HFO tanker with full monthly hours.
#[must_use]
pub fn tanker(id: &str, capacity_mt: f64, daily_rate: f64, fuel_per_day_mt: f64) -> Vessel {
    Vessel {
        id: id.into(),
        capacity_mt,
        daily_rate,
        fuel_per_day_mt,
        monthly_hours: MAX_MONTHLY_HOURS,
        status: VesselStatus::Available,
        fuel_type: FuelType::Hfo,
    }
}

/// A pickup port with the default call charge.
#[must_use]
pub fn pickup(id: &str) -> Port {
    Port {
        id: id.into(),
        role: PortRole::Pickup,
        port_charge: DEFAULT_PICKUP_CHARGE,
        handling_rate: 0.0,
    }
}

/// A drop-off port with the default call charge.
#[must_use]
pub fn drop_off(id: &str) -> Port {
    Port {
        id: id.into(),
        role: PortRole::DropOff,
        port_charge: DEFAULT_DROP_OFF_CHARGE,
        handling_rate: 0.0,
    }
}

/// Build a table from `(from, to, days)` triples.
///
/// # Errors
///
/// Returns [`TripTableError`] for invalid entries.
pub fn trip_table(entries: &[(&str, &str, f64)]) -> Result<TripTimeTable, TripTableError> {
    entries
        .iter()
        .try_fold(TripTimeTable::new(), |table, (from, to, days)| {
            table.with_trip_days(*from, *to, *days)
        })
}

/// One pickup, two drop-offs demanding 40 000 and 25 000 t, and two tankers
/// of 50 000 and 25 000 t.
///
/// # Errors
///
/// Returns [`FixtureError`] if a constant is invalid.
pub fn direct_scenario() -> Result<Scenario, FixtureError> {
    Ok(Scenario {
        vessels: vec![
            tanker("T1", 50_000.0, 6_300_000.0, 25.0),
            tanker("T2", 25_000.0, 3_900_000.0, 15.0),
        ],
        pickup_ports: vec![pickup("L1")],
        drop_off_ports: vec![drop_off("U1"), drop_off("U2")],
        demand: Demand::new([("U1", 40_000.0), ("U2", 25_000.0)])?,
        table: trip_table(&[("L1", "U1", 0.4), ("L1", "U2", 0.7), ("U1", "U2", 0.35)])?,
    })
}

/// One 10 000 t tanker against 500 000 t of demand at a single port.
///
/// # Errors
///
/// Returns [`FixtureError`] if a constant is invalid.
pub fn shortfall_scenario() -> Result<Scenario, FixtureError> {
    Ok(Scenario {
        vessels: vec![tanker("T1", 10_000.0, 6_300_000.0, 25.0)],
        pickup_ports: vec![pickup("L1")],
        drop_off_ports: vec![drop_off("U1")],
        demand: Demand::new([("U1", 500_000.0)])?,
        table: trip_table(&[("L1", "U1", 0.4)])?,
    })
}

/// A split-friendly layout: `L1 -> U1` takes 0.4 days, `U1 -> U2` 0.35 days
/// and `L1 -> U2` 0.7 days.
///
/// # Errors
///
/// Returns [`FixtureError`] if a constant is invalid.
pub fn split_scenario() -> Result<Scenario, FixtureError> {
    Ok(Scenario {
        vessels: vec![tanker("T1", 50_000.0, 6_300_000.0, 25.0)],
        pickup_ports: vec![pickup("L1")],
        drop_off_ports: vec![drop_off("U1"), drop_off("U2")],
        demand: Demand::new([("U1", 25_000.0), ("U2", 25_000.0)])?,
        table: trip_table(&[("L1", "U1", 0.4), ("U1", "U2", 0.35), ("L1", "U2", 0.7)])?,
    })
}

/// Nine tankers: seven of 50 000 t and two of 25 000 t.
#[must_use]
pub fn challenge_vessels() -> Vec<Vessel> {
    [
        ("T1", 6_300_000.0),
        ("T2", 4_900_000.0),
        ("T3", 5_100_000.0),
        ("T4", 5_100_000.0),
        ("T5", 5_300_000.0),
        ("T6", 5_700_000.0),
        ("T7", 6_500_000.0),
    ]
    .into_iter()
    .map(|(id, rate)| tanker(id, 50_000.0, rate, 25.0))
    .chain([
        tanker("T8", 25_000.0, 3_900_000.0, 15.0),
        tanker("T9", 25_000.0, 3_800_000.0, 15.0),
    ])
    .collect()
}

const CHALLENGE_PICKUPS: [&str; 6] = ["L1", "L2", "L3", "L4", "L5", "L6"];

const CHALLENGE_DROP_OFFS: [&str; 11] = [
    "U1", "U2", "U3", "U4", "U5", "U6", "U7", "U8", "U9", "U10", "U11",
];

const CHALLENGE_DEMAND: [f64; 11] = [
    40_000.0, 135_000.0, 5_000.0, 20_000.0, 20_000.0, 20_000.0, 110_000.0, 30_000.0, 20_000.0,
    20_000.0, 20_000.0,
];

const PICKUP_DAYS: [[f64; 11]; 6] = [
    [0.4, 0.7, 0.4, 0.4, 0.4, 0.6, 0.5, 0.4, 0.3, 0.5, 0.7],
    [0.4, 0.6, 0.5, 0.4, 0.4, 0.5, 0.5, 0.5, 0.3, 0.5, 0.6],
    [0.4, 0.6, 0.5, 0.4, 0.4, 0.5, 0.5, 0.5, 0.3, 0.6, 0.6],
    [0.4, 0.6, 0.4, 0.3, 0.3, 0.5, 0.5, 0.4, 0.3, 0.5, 0.6],
    [0.4, 0.6, 0.4, 0.3, 0.3, 0.5, 0.5, 0.4, 0.3, 0.5, 0.5],
    [0.58, 0.73, 0.64, 0.56, 0.56, 0.65, 0.67, 0.64, 0.50, 0.70, 0.73],
];

// Directional; the diagonal is never looked up.
const DROP_OFF_DAYS: [[f64; 11]; 11] = [
    [0.00, 0.35, 0.19, 0.16, 0.16, 0.25, 0.23, 0.19, 0.09, 0.19, 0.33],
    [0.36, 0.00, 0.38, 0.37, 0.37, 0.15, 0.34, 0.38, 0.29, 0.40, 0.19],
    [0.16, 0.33, 0.00, 0.16, 0.16, 0.25, 0.21, 0.17, 0.09, 0.19, 0.32],
    [0.18, 0.37, 0.21, 0.00, 0.12, 0.29, 0.25, 0.21, 0.05, 0.21, 0.35],
    [0.18, 0.37, 0.21, 0.12, 0.00, 0.29, 0.25, 0.21, 0.05, 0.21, 0.35],
    [0.29, 0.17, 0.32, 0.31, 0.31, 0.00, 0.22, 0.32, 0.24, 0.34, 0.18],
    [0.19, 0.29, 0.21, 0.20, 0.20, 0.15, 0.00, 0.21, 0.12, 0.21, 0.28],
    [0.16, 0.33, 0.17, 0.16, 0.16, 0.25, 0.21, 0.00, 0.09, 0.19, 0.32],
    [0.17, 0.37, 0.21, 0.12, 0.12, 0.29, 0.25, 0.21, 0.00, 0.21, 0.35],
    [0.14, 0.34, 0.18, 0.15, 0.15, 0.27, 0.20, 0.18, 0.07, 0.00, 0.33],
    [0.33, 0.17, 0.34, 0.33, 0.33, 0.13, 0.30, 0.34, 0.25, 0.36, 0.00],
];

/// Sailing times between every challenge port pair.
///
/// # Errors
///
/// Returns [`TripTableError`] if a constant is invalid.
pub fn challenge_trip_table() -> Result<TripTimeTable, TripTableError> {
    let mut table = TripTimeTable::new();
    for (pickup, row) in CHALLENGE_PICKUPS.iter().zip(PICKUP_DAYS) {
        for (drop_off, days) in CHALLENGE_DROP_OFFS.iter().zip(row) {
            table.insert_days((*pickup).into(), (*drop_off).into(), days)?;
        }
    }
    for (from, row) in CHALLENGE_DROP_OFFS.iter().zip(DROP_OFF_DAYS) {
        for (to, days) in CHALLENGE_DROP_OFFS.iter().zip(row) {
            if from != to {
                table.insert_days((*from).into(), (*to).into(), days)?;
            }
        }
    }
    Ok(table)
}

/// The full challenge: nine tankers, six pickups, eleven drop-offs and
/// 440 000 t of monthly demand.
///
/// # Errors
///
/// Returns [`FixtureError`] if a constant is invalid.
pub fn challenge_scenario() -> Result<Scenario, FixtureError> {
    Ok(Scenario {
        vessels: challenge_vessels(),
        pickup_ports: CHALLENGE_PICKUPS.iter().map(|id| pickup(id)).collect(),
        drop_off_ports: CHALLENGE_DROP_OFFS.iter().map(|id| drop_off(id)).collect(),
        demand: Demand::new(CHALLENGE_DROP_OFFS.iter().copied().zip(CHALLENGE_DEMAND))?,
        table: challenge_trip_table()?,
    })
}

/// An assignment setting the named variables and zeroing the rest.
#[must_use]
pub fn named_assignment(model: &LinearModel, values: &[(&str, f64)]) -> Assignment {
    Assignment::new(
        model
            .variables()
            .iter()
            .map(|variable| {
                values
                    .iter()
                    .find(|(name, _)| *name == variable.name)
                    .map_or(0.0, |(_, value)| *value)
            })
            .collect(),
    )
}

/// Solver returning the same canned response on every call.
#[derive(Debug)]
pub struct ScriptedSolver {
    response: Result<SolverOutcome, SolverError>,
    calls: AtomicUsize,
}

impl ScriptedSolver {
    /// Respond with `response`.
    #[must_use]
    pub const fn new(response: Result<SolverOutcome, SolverError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every call with a backend error carrying `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::new(Err(SolverError::Backend {
            message: message.to_owned(),
        }))
    }

    /// Number of solve calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl MilpSolver for ScriptedSolver {
    fn solve(&self, _model: &LinearModel, _settings: &SolverSettings) -> Result<SolverOutcome, SolverError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.response.clone()
    }
}

/// Solver delegating to a closure, for responses that depend on the model.
pub struct FnSolver<F> {
    solve: F,
}

impl<F> FnSolver<F>
where
    F: Fn(&LinearModel, &SolverSettings) -> Result<SolverOutcome, SolverError> + Send + Sync,
{
    /// Wrap `solve`.
    #[must_use]
    pub const fn new(solve: F) -> Self {
        Self { solve }
    }
}

impl<F> MilpSolver for FnSolver<F>
where
    F: Fn(&LinearModel, &SolverSettings) -> Result<SolverOutcome, SolverError> + Send + Sync,
{
    fn solve(&self, model: &LinearModel, settings: &SolverSettings) -> Result<SolverOutcome, SolverError> {
        (self.solve)(model, settings)
    }
}
