//! Behavioural tests for route candidate generation.
#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]

use std::cell::RefCell;
use std::collections::BTreeSet;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tideway_core::test_support::{Scenario, challenge_scenario, split_scenario};
use tideway_core::{
    CandidateGenerator, CandidateUniverse, VesselStatus, VoyageCostModel, VoyageParameters,
};

struct GenerationWorld {
    scenario: RefCell<Option<Scenario>>,
    universe: RefCell<Option<CandidateUniverse>>,
}

impl GenerationWorld {
    fn universe(&self) -> CandidateUniverse {
        self.universe
            .borrow()
            .clone()
            .expect("candidates should be generated before assertions")
    }
}

#[fixture]
fn world() -> GenerationWorld {
    GenerationWorld {
        scenario: RefCell::new(None),
        universe: RefCell::new(None),
    }
}

#[given("the challenge fleet")]
fn given_challenge(world: &GenerationWorld) {
    world.scenario.replace(Some(challenge_scenario().expect("fixture")));
}

#[given("the split delivery scenario")]
fn given_split(world: &GenerationWorld) {
    world.scenario.replace(Some(split_scenario().expect("fixture")));
}

#[given("vessel {vessel} is in maintenance")]
fn given_maintenance(world: &GenerationWorld, vessel: String) {
    let mut scenario = world.scenario.borrow_mut();
    let target = scenario
        .as_mut()
        .and_then(|s| s.vessels.iter_mut().find(|v| v.id.as_str() == vessel))
        .expect("vessel in roster");
    target.status = VesselStatus::Maintenance;
}

#[when("candidates are generated")]
fn when_generated(world: &GenerationWorld) {
    let scenario = world.scenario.borrow().clone().expect("scenario given");
    let cost = VoyageCostModel::new(VoyageParameters::default());
    let universe = CandidateGenerator::new(&scenario.table, &cost).generate(
        &scenario.vessels,
        &scenario.pickup_ports,
        &scenario.drop_off_ports,
    );
    world.universe.replace(Some(universe));
}

#[then("{count} candidates are produced")]
fn then_count(world: &GenerationWorld, count: usize) {
    assert_eq!(world.universe().len(), count);
}

#[then("no candidate repeats a drop-off port")]
fn then_distinct_drop_offs(world: &GenerationWorld) {
    for candidate in world.universe().iter() {
        let distinct: BTreeSet<_> = candidate.drop_offs.iter().collect();
        assert_eq!(distinct.len(), candidate.drop_offs.len(), "{}", candidate.id);
        assert!(!distinct.contains(&candidate.pickup), "{}", candidate.id);
    }
}

#[then("no candidate belongs to vessel {vessel}")]
fn then_vessel_absent(world: &GenerationWorld, vessel: String) {
    assert_eq!(world.universe().for_vessel(&vessel).count(), 0);
}

#[then("the split candidate {id} sails for {days} days")]
#[expect(clippy::float_arithmetic, reason = "compares sailing days")]
fn then_split_sailing(world: &GenerationWorld, id: String, days: f64) {
    let universe = world.universe();
    let candidate = universe
        .iter()
        .find(|c| c.id.as_str() == id)
        .expect("split candidate");
    let sailed = candidate.estimate.times.sailing.as_secs_f64() / 86_400.0;
    assert!((sailed - days).abs() < 1e-6, "sailed {sailed} days");
}

#[scenario(path = "tests/features/candidate_generation.feature", index = 0)]
fn challenge_universe(world: GenerationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/candidate_generation.feature", index = 1)]
fn unavailable_vessels_skipped(world: GenerationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/candidate_generation.feature", index = 2)]
fn split_sails_between_drop_offs(world: GenerationWorld) {
    let _ = world;
}
