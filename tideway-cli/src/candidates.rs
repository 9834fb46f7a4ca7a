//! Candidates command: lists the voyage patterns a scenario produces.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tideway_core::{
    CandidateGenerator, CandidateStatistics, Formulation, RouteCandidate, VoyageCostModel,
    VoyageParameters,
};

use crate::scenario::{load_scenario, parse_option, voyage_parameters, write_json};
use crate::{
    ARG_FORMULATION, ARG_FUEL_PRICE, ARG_ROUND_TRIP, ARG_SCENARIO, CliError,
    ENV_CANDIDATES_SCENARIO,
};

/// CLI arguments for the `candidates` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print candidate statistics and every voyage candidate")]
#[ortho_config(prefix = "TIDEWAY")]
pub(crate) struct CandidatesArgs {
    /// Path to the scenario JSON file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) scenario_path: Option<Utf8PathBuf>,
    /// Model shape whose split policy prices the candidates.
    #[arg(long = ARG_FORMULATION, value_name = "shape")]
    #[serde(default)]
    pub(crate) formulation: Option<String>,
    /// Bunker price per tonne of fuel.
    #[arg(long = ARG_FUEL_PRICE, value_name = "price")]
    #[serde(default)]
    pub(crate) fuel_price: Option<f64>,
    /// Sail back to the pickup port after the last drop-off.
    #[arg(long = ARG_ROUND_TRIP, value_name = "bool", num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) round_trip: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CandidatesConfig {
    pub(crate) scenario_path: Utf8PathBuf,
    pub(crate) formulation: Formulation,
    pub(crate) voyage: VoyageParameters,
}

impl TryFrom<CandidatesArgs> for CandidatesConfig {
    type Error = CliError;

    fn try_from(args: CandidatesArgs) -> Result<Self, Self::Error> {
        let scenario_path = args.scenario_path.ok_or(CliError::MissingArgument {
            field: ARG_SCENARIO,
            env: ENV_CANDIDATES_SCENARIO,
        })?;
        Ok(Self {
            scenario_path,
            formulation: parse_option(ARG_FORMULATION, args.formulation)?.unwrap_or_default(),
            voyage: voyage_parameters(args.fuel_price, args.round_trip)?,
        })
    }
}

/// JSON document printed by `tideway candidates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CandidateReport {
    pub(crate) statistics: CandidateStatistics,
    pub(crate) candidates: Vec<RouteCandidate>,
}

pub(super) fn run_candidates(args: CandidatesArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_candidates_with(args, &mut stdout)
}

pub(super) fn run_candidates_with(args: CandidatesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = CandidatesConfig::try_from(merged)?;
    crate::fs::require_existing(&config.scenario_path, ARG_SCENARIO)?;
    let scenario = load_scenario(&config.scenario_path)?;
    let request = scenario.request()?;

    let cost = VoyageCostModel::new(config.voyage).with_split_policy(config.formulation.split_policy());
    let universe = CandidateGenerator::new(&scenario.table, &cost).generate(
        &request.vessels,
        &request.pickup_ports,
        &request.drop_off_ports,
    );
    info!("{} candidates for {}", universe.len(), scenario.path);
    let report = CandidateReport {
        statistics: universe.statistics(),
        candidates: universe.as_slice().to_vec(),
    };
    write_json(writer, &report)
}
