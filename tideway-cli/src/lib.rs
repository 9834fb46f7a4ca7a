//! Command-line interface for the Tideway fleet routing engine.
//!
//! `tideway solve` optimizes a JSON scenario and prints the result;
//! `tideway candidates` prints the voyage candidates a scenario produces.
//! Logs go to stderr and stdout carries only JSON.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod candidates;
mod error;
mod fs;
mod scenario;
mod solve;

pub use error::CliError;

use candidates::CandidatesArgs;
use solve::SolveArgs;

const ARG_SCENARIO: &str = "scenario";
const ARG_OBJECTIVE: &str = "objective";
const ARG_FORMULATION: &str = "formulation";
const ARG_TIME_LIMIT_SECS: &str = "time-limit-secs";
const ARG_WORKERS: &str = "workers";
const ARG_FUEL_PRICE: &str = "fuel-price";
const ARG_ROUND_TRIP: &str = "round-trip";
const ARG_LOAD_BALANCING: &str = "load-balancing";
const ENV_SOLVE_SCENARIO: &str = "TIDEWAY_CMDS_SOLVE_SCENARIO_PATH";
const ENV_CANDIDATES_SCENARIO: &str = "TIDEWAY_CMDS_CANDIDATES_SCENARIO_PATH";

/// Run the Tideway CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// scenario cannot be read, or the run fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => solve::run_solve(args),
        Command::Candidates(args) => candidates::run_candidates(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tideway",
    about = "Assign a tanker fleet to monthly cargo voyages",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Optimize a scenario and print the schedule.
    Solve(SolveArgs),
    /// List the voyage candidates a scenario produces.
    Candidates(CandidatesArgs),
}

#[cfg(test)]
mod tests;
