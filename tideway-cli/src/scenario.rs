//! Scenario files and the option parsing shared by every subcommand.
//!
//! A scenario is one JSON document holding the roster, the ports, the
//! demand vector and the trip table:
//!
//! ```json
//! {
//!   "vessels": [{"id": "T1", "capacity_mt": 50000, "daily_rate": 6300000, "fuel_per_day_mt": 25}],
//!   "ports": [
//!     {"id": "L1", "role": "pickup", "port_charge": 100000},
//!     {"id": "U1", "role": "drop_off", "port_charge": 80000}
//!   ],
//!   "demand": {"U1": 40000},
//!   "trip_times": [{"from": "L1", "to": "U1", "days": 0.4}],
//!   "distances": [{"from": "L1", "to": "U1", "nautical_miles": 135}]
//! }
//! ```

use std::io::{BufReader, Write};
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tideway_core::{
    Demand, FleetDataProvider, InMemoryFleet, OptimizationRequest, Port, PortId, TripTimeTable,
    Vessel, VoyageParameters,
};

use crate::fs::open_utf8_file;
use crate::{ARG_FUEL_PRICE, CliError};

/// Sailing time between two ports, in days.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct TripTimeEntry {
    pub(crate) from: PortId,
    pub(crate) to: PortId,
    pub(crate) days: f64,
}

/// Distance between two ports, in nautical miles.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct DistanceEntry {
    pub(crate) from: PortId,
    pub(crate) to: PortId,
    pub(crate) nautical_miles: f64,
}

/// On-disk scenario layout.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct ScenarioFile {
    pub(crate) vessels: Vec<Vessel>,
    pub(crate) ports: Vec<Port>,
    pub(crate) demand: Demand,
    #[serde(default)]
    pub(crate) trip_times: Vec<TripTimeEntry>,
    #[serde(default)]
    pub(crate) distances: Vec<DistanceEntry>,
}

/// A decoded scenario ready for the engine.
#[derive(Debug, Clone)]
pub(crate) struct LoadedScenario {
    pub(crate) path: Utf8PathBuf,
    pub(crate) fleet: InMemoryFleet,
    pub(crate) table: TripTimeTable,
}

impl LoadedScenario {
    fn from_file(path: &Utf8Path, file: ScenarioFile) -> Result<Self, CliError> {
        let invalid = |source| CliError::InvalidTripTable {
            path: path.to_path_buf(),
            source,
        };
        let mut table = TripTimeTable::new();
        for entry in file.trip_times {
            table
                .insert_days(entry.from, entry.to, entry.days)
                .map_err(invalid)?;
        }
        for entry in file.distances {
            table
                .insert_distance(entry.from, entry.to, entry.nautical_miles)
                .map_err(invalid)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            fleet: InMemoryFleet::new(file.vessels, file.ports, file.demand),
            table,
        })
    }

    /// A validated request with default settings.
    pub(crate) fn request(&self) -> Result<OptimizationRequest, CliError> {
        let request = OptimizationRequest::from_provider(&self.fleet);
        request
            .validate()
            .map_err(|source| CliError::InvalidScenario {
                path: self.path.clone(),
                source,
            })?;
        Ok(request)
    }

    /// Number of vessels in the roster.
    pub(crate) fn vessel_count(&self) -> usize {
        self.fleet.vessels().len()
    }
}

/// Loads a JSON scenario from disk.
pub(crate) fn load_scenario(path: &Utf8Path) -> Result<LoadedScenario, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenScenario {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded: ScenarioFile =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseScenario {
            path: path.to_path_buf(),
            source,
        })?;
    LoadedScenario::from_file(path, decoded)
}

/// Parses an optional textual option such as `--objective`.
pub(crate) fn parse_option<T>(field: &'static str, value: Option<String>) -> Result<Option<T>, CliError>
where
    T: FromStr<Err = String>,
{
    value
        .map(|raw| {
            raw.parse().map_err(|reason| CliError::InvalidOption {
                field,
                value: raw.clone(),
                reason,
            })
        })
        .transpose()
}

/// Voyage constants after applying the fuel-price and round-trip overrides.
pub(crate) fn voyage_parameters(
    fuel_price: Option<f64>,
    round_trip: Option<bool>,
) -> Result<VoyageParameters, CliError> {
    let mut voyage = VoyageParameters::default();
    if let Some(price) = fuel_price {
        if !(price.is_finite() && price >= 0.0) {
            return Err(CliError::InvalidOption {
                field: ARG_FUEL_PRICE,
                value: price.to_string(),
                reason: "must be a non-negative number".to_owned(),
            });
        }
        voyage.fuel_price_per_mt = price;
    }
    if let Some(returning) = round_trip {
        voyage.round_trip = returning;
    }
    Ok(voyage)
}

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
