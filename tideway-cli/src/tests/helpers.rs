//! Scenario files and a scratch workspace for CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;
use tideway_core::test_support::{drop_off, pickup, tanker};
use tideway_core::{Demand, PortId};

use crate::scenario::{ScenarioFile, TripTimeEntry};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// A temporary directory holding one scenario path.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) scenario_path: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let scenario_path = root.join("scenario.json");
        Self {
            _tmp: tmp,
            root,
            scenario_path,
        }
    }

    pub(super) fn write_scenario(&self, scenario: &ScenarioFile) {
        let payload = serde_json::to_string_pretty(scenario).expect("serialize scenario");
        write_utf8(&self.scenario_path, payload.as_bytes());
    }
}

fn trip(from: &str, to: &str, days: f64) -> TripTimeEntry {
    TripTimeEntry {
        from: PortId::new(from),
        to: PortId::new(to),
        days,
    }
}

/// One 50 000 t tanker serving two ports of 25 000 t each from `L1`.
pub(super) fn split_scenario_file() -> ScenarioFile {
    ScenarioFile {
        vessels: vec![tanker("T1", 50_000.0, 6_300_000.0, 25.0)],
        ports: vec![pickup("L1"), drop_off("U1"), drop_off("U2")],
        demand: Demand::new([("U1", 25_000.0), ("U2", 25_000.0)]).expect("valid demand"),
        trip_times: vec![
            trip("L1", "U1", 0.4),
            trip("U1", "U2", 0.35),
            trip("L1", "U2", 0.7),
        ],
        distances: Vec::new(),
    }
}
