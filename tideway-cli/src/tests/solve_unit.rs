//! Focused unit tests covering configuration merging and scenario loading.

use super::helpers::{Workspace, split_scenario_file, write_utf8};
use super::*;
use crate::scenario::{DistanceEntry, load_scenario, parse_option, voyage_parameters};
use crate::solve::{SolveArgs, SolveConfig, config_from_layers_for_test};
use rstest::rstest;
use std::time::Duration;
use tideway_core::{
    FleetDataProvider, Formulation, LegKind, ObjectiveMode, PortId, TripMetricsProvider,
};

#[rstest]
fn converting_solve_without_scenario_errors() {
    let err = SolveConfig::try_from(SolveArgs::default()).expect_err("missing scenario should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SCENARIO);
            assert_eq!(env, ENV_SOLVE_SCENARIO);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[expect(clippy::float_cmp, reason = "prices are copied verbatim")]
fn solve_config_applies_overrides() {
    let args = SolveArgs {
        scenario_path: Some("scenario.json".into()),
        objective: Some("fuel".to_owned()),
        formulation: Some("discrete-execution".to_owned()),
        time_limit_secs: Some(45),
        workers: Some(2),
        fuel_price: Some(30_000.0),
        round_trip: Some(true),
        load_balancing: Some(true),
    };

    let config = SolveConfig::try_from(args).expect("config should build");
    assert_eq!(config.objective, ObjectiveMode::Emissions);
    assert_eq!(config.model.formulation, Formulation::DiscreteExecution);
    assert!(config.model.load_balancing);
    assert_eq!(config.solver.time_limit, Duration::from_secs(45));
    assert_eq!(config.solver.workers, 2);
    assert_eq!(config.voyage.fuel_price_per_mt, 30_000.0);
    assert!(config.voyage.round_trip);
}

#[rstest]
fn solve_config_defaults_match_the_engine() {
    let args = SolveArgs {
        scenario_path: Some("scenario.json".into()),
        ..SolveArgs::default()
    };
    let config = SolveConfig::try_from(args).expect("config should build");
    assert_eq!(config.objective, ObjectiveMode::Cost);
    assert_eq!(config.model, tideway_core::ModelSettings::default());
    assert_eq!(config.solver, tideway_core::SolverSettings::default());
    assert_eq!(config.voyage, tideway_core::VoyageParameters::default());
}

#[rstest]
#[case::zero_time_limit(SolveArgs { time_limit_secs: Some(0), ..SolveArgs::default() }, ARG_TIME_LIMIT_SECS)]
#[case::zero_workers(SolveArgs { workers: Some(0), ..SolveArgs::default() }, ARG_WORKERS)]
#[case::negative_fuel_price(SolveArgs { fuel_price: Some(-1.0), ..SolveArgs::default() }, ARG_FUEL_PRICE)]
#[case::unknown_formulation(
    SolveArgs { formulation: Some("stochastic".to_owned()), ..SolveArgs::default() },
    ARG_FORMULATION
)]
fn solve_config_rejects_bad_options(#[case] mut args: SolveArgs, #[case] expected: &'static str) {
    args.scenario_path = Some("scenario.json".into());
    match SolveConfig::try_from(args).expect_err("option should be rejected") {
        CliError::InvalidOption { field, .. } => assert_eq!(field, expected),
        other => panic!("expected InvalidOption, found {other:?}"),
    }
}

#[rstest]
fn parse_option_passes_absent_values_through() {
    let parsed: Option<ObjectiveMode> = parse_option(ARG_OBJECTIVE, None).expect("absent is fine");
    assert_eq!(parsed, None);
}

#[rstest]
fn voyage_parameters_reject_non_finite_prices() {
    let err = voyage_parameters(Some(f64::NAN), None).expect_err("NaN price");
    assert!(matches!(err, CliError::InvalidOption { field: ARG_FUEL_PRICE, .. }));
}

#[rstest]
fn load_scenario_builds_fleet_and_table() {
    let workspace = Workspace::new();
    let mut file = split_scenario_file();
    file.distances.push(DistanceEntry {
        from: PortId::new("L1"),
        to: PortId::new("U1"),
        nautical_miles: 135.0,
    });
    workspace.write_scenario(&file);

    let scenario = load_scenario(&workspace.scenario_path).expect("scenario should load");
    assert_eq!(scenario.vessel_count(), 1);
    assert_eq!(scenario.fleet.pickup_ports().len(), 1);
    assert_eq!(scenario.fleet.drop_off_ports().len(), 2);
    assert_eq!(scenario.table.len(), 3);
    let leg = scenario
        .table
        .leg(&PortId::new("L1"), &PortId::new("U1"), LegKind::Outbound);
    assert!(!leg.estimated);
    assert_eq!(leg.distance_nm, Some(135.0));
}

#[rstest]
fn load_scenario_rejects_invalid_trip_entries() {
    let workspace = Workspace::new();
    let mut file = split_scenario_file();
    if let Some(entry) = file.trip_times.first_mut() {
        entry.days = -1.0;
    }
    workspace.write_scenario(&file);

    match load_scenario(&workspace.scenario_path).expect_err("negative days") {
        CliError::InvalidTripTable { path, .. } => assert_eq!(path, workspace.scenario_path),
        other => panic!("expected InvalidTripTable, found {other:?}"),
    }
}

#[rstest]
fn load_scenario_rejects_invalid_json() {
    let workspace = Workspace::new();
    write_utf8(&workspace.scenario_path, b"{ not valid json");

    match load_scenario(&workspace.scenario_path).expect_err("invalid json should error") {
        CliError::ParseScenario { path, .. } => assert_eq!(path, workspace.scenario_path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_scenario_io_error_returns_open_error() {
    let workspace = Workspace::new();

    match load_scenario(&workspace.scenario_path).expect_err("missing scenario should error") {
        CliError::OpenScenario { path, .. } => assert_eq!(path, workspace.scenario_path),
        other => panic!("expected OpenScenario, found {other:?}"),
    }
}

#[rstest]
fn require_existing_reports_directories() {
    let workspace = Workspace::new();
    let directory = workspace.root.join("scenario-dir");
    std::fs::create_dir(&directory).expect("scenario directory");

    match crate::fs::require_existing(&directory, ARG_SCENARIO).expect_err("directory") {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_SCENARIO);
            assert_eq!(path, directory);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "scenario_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert!(matches!(err, CliError::Configuration(_)), "found {err:?}");
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "objective": "time",
            "time_limit_secs": 600,
            "workers": 2,
        }),
        None,
    );
    composer.push_environment(json!({
        "scenario_path": "from-env.json",
        "objective": "fuel",
    }));
    composer.push_cli(json!({
        "objective": "balanced",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.scenario_path.as_str(), "from-env.json");
    assert_eq!(config.objective, ObjectiveMode::Balanced);
    assert_eq!(config.solver.time_limit, Duration::from_secs(600));
    assert_eq!(config.solver.workers, 2);
}
