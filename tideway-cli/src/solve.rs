//! Solve command implementation for the Tideway CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tideway_core::{
    FleetOptimizer, Formulation, MilpSolver, ModelSettings, ObjectiveMode, OptimizationRequest,
    SolverSettings, VoyageParameters,
};
use tideway_solver_lp::GoodLpSolver;

use crate::scenario::{load_scenario, parse_option, voyage_parameters, write_json};
use crate::{
    ARG_FORMULATION, ARG_FUEL_PRICE, ARG_LOAD_BALANCING, ARG_OBJECTIVE, ARG_ROUND_TRIP,
    ARG_SCENARIO, ARG_TIME_LIMIT_SECS, ARG_WORKERS, CliError, ENV_SOLVE_SCENARIO,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Optimize a fleet scenario. The scenario JSON holds the \
                 vessels, ports, demand and trip times; every other setting \
                 can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Assign voyages to the fleet and print the schedule"
)]
#[ortho_config(prefix = "TIDEWAY")]
pub(crate) struct SolveArgs {
    /// Path to the scenario JSON file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) scenario_path: Option<Utf8PathBuf>,
    /// Quantity to minimise: cost, emissions, time or balanced.
    #[arg(long = ARG_OBJECTIVE, value_name = "mode")]
    #[serde(default)]
    pub(crate) objective: Option<String>,
    /// Model shape: cargo-flow or discrete-execution. Discrete execution
    /// needs demand that is an exact sum of fixed per-voyage loads.
    #[arg(long = ARG_FORMULATION, value_name = "shape")]
    #[serde(default)]
    pub(crate) formulation: Option<String>,
    /// Wall-clock budget for the solver.
    #[arg(long = ARG_TIME_LIMIT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Parallelism hint for the solver.
    #[arg(long = ARG_WORKERS, value_name = "count")]
    #[serde(default)]
    pub(crate) workers: Option<u16>,
    /// Bunker price per tonne of fuel.
    #[arg(long = ARG_FUEL_PRICE, value_name = "price")]
    #[serde(default)]
    pub(crate) fuel_price: Option<f64>,
    /// Sail back to the pickup port after the last drop-off.
    #[arg(long = ARG_ROUND_TRIP, value_name = "bool", num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) round_trip: Option<bool>,
    /// Require every vessel to carry part of the workload.
    #[arg(long = ARG_LOAD_BALANCING, value_name = "bool", num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) load_balancing: Option<bool>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    pub(crate) scenario_path: Utf8PathBuf,
    pub(crate) objective: ObjectiveMode,
    pub(crate) model: ModelSettings,
    pub(crate) solver: SolverSettings,
    pub(crate) voyage: VoyageParameters,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        crate::fs::require_existing(&self.scenario_path, ARG_SCENARIO)
    }

    fn apply(&self, request: OptimizationRequest) -> OptimizationRequest {
        request
            .with_objective(self.objective)
            .with_voyage(self.voyage.clone())
            .with_model(self.model.clone())
            .with_solver(self.solver)
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let scenario_path = args.scenario_path.ok_or(CliError::MissingArgument {
            field: ARG_SCENARIO,
            env: ENV_SOLVE_SCENARIO,
        })?;
        let objective = parse_option(ARG_OBJECTIVE, args.objective)?.unwrap_or_default();
        let formulation: Formulation =
            parse_option(ARG_FORMULATION, args.formulation)?.unwrap_or_default();

        let defaults = SolverSettings::default();
        let time_limit = match args.time_limit_secs {
            Some(0) => {
                return Err(CliError::InvalidOption {
                    field: ARG_TIME_LIMIT_SECS,
                    value: "0".to_owned(),
                    reason: "must be at least one second".to_owned(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.time_limit,
        };
        let workers = match args.workers {
            Some(0) => {
                return Err(CliError::InvalidOption {
                    field: ARG_WORKERS,
                    value: "0".to_owned(),
                    reason: "must be at least one".to_owned(),
                });
            }
            Some(count) => count,
            None => defaults.workers,
        };

        Ok(Self {
            scenario_path,
            objective,
            model: ModelSettings {
                formulation,
                load_balancing: args.load_balancing.unwrap_or(false),
                ..ModelSettings::default()
            },
            solver: SolverSettings {
                time_limit,
                workers,
            },
            voyage: voyage_parameters(args.fuel_price, args.round_trip)?,
        })
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, GoodLpSolver::new(), &mut stdout)
}

pub(super) fn run_solve_with<S: MilpSolver>(
    args: SolveArgs,
    solver: S,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let scenario = load_scenario(&config.scenario_path)?;
    let request = config.apply(scenario.request()?);
    info!(
        "solving {} with {} vessels, objective {} and formulation {}",
        scenario.path,
        scenario.vessel_count(),
        config.objective,
        config.model.formulation
    );
    let result = FleetOptimizer::new(scenario.table, solver)
        .optimize(&request)
        .map_err(|source| CliError::Optimize {
            path: scenario.path.clone(),
            source,
        })?;
    write_json(writer, &result)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
