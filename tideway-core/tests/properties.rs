//! Property-based tests for candidate generation, costing and extraction.
//!
//! # Invariants tested
//!
//! - **Candidate count:** `V * (L * U + L * U * (U - 1))` candidates.
//! - **Distinct drop-offs:** no candidate repeats a port or calls at its
//!   pickup port as a drop-off.
//! - **Cost decomposition:** every candidate's cost is charter plus port
//!   charges plus fuel.
//! - **Demand round-trip:** extracted deliveries equal the demand rows.
//! - **Time-budget conformance:** an accepted assignment never exceeds a
//!   vessel's monthly hours.
#![expect(
    clippy::expect_used,
    reason = "property tests use expect for readable failures"
)]

use std::collections::BTreeSet;

use proptest::prelude::*;
use tideway_core::test_support::{drop_off, named_assignment, pickup, tanker, trip_table};
use tideway_core::{
    CandidateGenerator, CandidateUniverse, ConstraintModelBuilder, Demand, ExtractError,
    ModelSettings, Port, ResultExtractor, SplitPolicy, TripTimeTable, Vessel, VoyageCostModel,
    VoyageParameters,
};

fn fleet(vessels: usize, pickups: usize, drop_offs: usize) -> (Vec<Vessel>, Vec<Port>, Vec<Port>) {
    (
        (1..=vessels)
            .map(|i| tanker(&format!("T{i}"), 50_000.0, 5_000_000.0, 25.0))
            .collect(),
        (1..=pickups).map(|i| pickup(&format!("L{i}"))).collect(),
        (1..=drop_offs).map(|i| drop_off(&format!("U{i}"))).collect(),
    )
}

fn generate(
    table: &TripTimeTable,
    params: VoyageParameters,
    vessels: &[Vessel],
    pickups: &[Port],
    drop_offs: &[Port],
) -> CandidateUniverse {
    let cost = VoyageCostModel::new(params).with_split_policy(SplitPolicy::ModelChosen);
    CandidateGenerator::new(table, &cost).generate(vessels, pickups, drop_offs)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every direct pattern plus both orders of every drop-off pair, per
    /// vessel and pickup.
    #[test]
    fn candidate_count_matches_formula(
        vessels in 1_usize..=4,
        pickups in 1_usize..=3,
        drop_offs in 1_usize..=6,
    ) {
        let (roster, loading, discharging) = fleet(vessels, pickups, drop_offs);
        let universe = generate(
            &TripTimeTable::new(),
            VoyageParameters::default(),
            &roster,
            &loading,
            &discharging,
        );
        let expected = vessels * (pickups * drop_offs + pickups * drop_offs * (drop_offs - 1));
        prop_assert_eq!(universe.len(), expected);
    }

    /// Drop-offs are pairwise distinct and never the pickup port.
    #[test]
    fn drop_offs_are_distinct(drop_offs in 1_usize..=6) {
        let (roster, loading, discharging) = fleet(1, 2, drop_offs);
        let universe = generate(
            &TripTimeTable::new(),
            VoyageParameters::default(),
            &roster,
            &loading,
            &discharging,
        );
        for candidate in universe.iter() {
            let distinct: BTreeSet<_> = candidate.drop_offs.iter().collect();
            prop_assert_eq!(distinct.len(), candidate.drop_offs.len());
            prop_assert!(!distinct.contains(&candidate.pickup));
        }
    }

    /// Cost is the sum of its line items and each item follows its formula.
    #[test]
    #[expect(clippy::float_arithmetic, reason = "cost tolerances")]
    fn cost_decomposes(
        days in 0.05_f64..3.0,
        daily_rate in 100_000.0_f64..8_000_000.0,
        fuel_per_day in 5.0_f64..40.0,
        fuel_price in 0.0_f64..90_000.0,
        round_trip in any::<bool>(),
    ) {
        let table = trip_table(&[("L1", "U1", days), ("L1", "U2", days), ("U1", "U2", days)])
            .expect("valid table");
        let params = VoyageParameters {
            fuel_price_per_mt: fuel_price,
            round_trip,
            ..VoyageParameters::default()
        };
        let roster = vec![tanker("T1", 50_000.0, daily_rate, fuel_per_day)];
        let universe = generate(
            &table,
            params.clone(),
            &roster,
            &[pickup("L1")],
            &[drop_off("U1"), drop_off("U2")],
        );
        prop_assert!(!universe.is_empty());
        for candidate in universe.iter() {
            let cost = candidate.estimate.cost;
            let tolerance = 1e-6 * candidate.total_cost().max(1.0);
            prop_assert!(
                (candidate.total_cost() - (cost.charter + cost.port_charges + cost.fuel)).abs()
                    <= tolerance
            );
            prop_assert!(
                (cost.charter - candidate.total_hours() / 24.0 * daily_rate).abs() <= tolerance
            );
            prop_assert!(
                (cost.fuel - candidate.estimate.fuel_mt * params.fuel_price_per_mt).abs()
                    <= tolerance
            );
        }
    }

    /// Delivered mass read back from an accepted assignment equals demand.
    #[test]
    #[expect(clippy::float_cmp, reason = "whole tonnes are exact")]
    #[expect(clippy::cast_precision_loss, reason = "masses stay far below 2^53")]
    fn deliveries_round_trip(trips in 1_u32..=8, per_trip in 1_u32..=50_000) {
        let table = trip_table(&[("L1", "U1", 0.4)]).expect("valid table");
        let roster = vec![tanker("T1", 50_000.0, 5_000_000.0, 25.0)];
        let universe = generate(
            &table,
            VoyageParameters::default(),
            &roster,
            &[pickup("L1")],
            &[drop_off("U1")],
        );
        let delivered = u64::from(trips) * u64::from(per_trip);
        let demand = Demand::new([("U1", delivered as f64)]).expect("valid demand");
        let settings = ModelSettings::default();
        let fleet = ConstraintModelBuilder::new(&universe, &roster, &demand, &settings)
            .build()
            .expect("model");
        let assignment = named_assignment(
            fleet.model(),
            &[
                ("trips[T1:L1>U1]", f64::from(trips)),
                ("flow[T1:L1>U1@U1]", delivered as f64),
            ],
        );
        let extraction = ResultExtractor::new(
            &fleet,
            &universe,
            &roster,
            &demand,
            &VoyageParameters::default(),
        )
        .extract(&assignment)
        .expect("feasible assignment");
        let port = extraction.deliveries.first().expect("one demand row");
        prop_assert!(port.delivered_mt == delivered as f64);
        prop_assert!(port.delivered_mt == port.demand_mt);
    }

    /// Long voyages either fit the monthly hours or are rejected on the
    /// vessel's time row.
    #[test]
    #[expect(clippy::float_arithmetic, reason = "hour comparisons")]
    fn accepted_assignments_fit_the_time_budget(trips in 1_u32..=8) {
        let table = trip_table(&[("L1", "U1", 5.0)]).expect("valid table");
        let roster = vec![tanker("T1", 50_000.0, 5_000_000.0, 25.0)];
        let universe = generate(
            &table,
            VoyageParameters::default(),
            &roster,
            &[pickup("L1")],
            &[drop_off("U1")],
        );
        let delivered = f64::from(trips) * 50_000.0;
        let demand = Demand::new([("U1", delivered)]).expect("valid demand");
        let settings = ModelSettings::default();
        let fleet = ConstraintModelBuilder::new(&universe, &roster, &demand, &settings)
            .build()
            .expect("model");
        let assignment = named_assignment(
            fleet.model(),
            &[("trips[T1:L1>U1]", f64::from(trips)), ("flow[T1:L1>U1@U1]", delivered)],
        );
        let hours = universe.iter().next().expect("one candidate").total_hours();
        let outcome = ResultExtractor::new(
            &fleet,
            &universe,
            &roster,
            &demand,
            &VoyageParameters::default(),
        )
        .extract(&assignment);

        if f64::from(trips) * hours <= 720.0 {
            let extraction = outcome.expect("assignment within budget");
            for schedule in &extraction.schedules {
                prop_assert!(schedule.utilized_hours <= schedule.available_hours + 1e-9);
            }
        } else {
            prop_assert_eq!(
                outcome,
                Err(ExtractError::Violated { name: "time[T1]".to_owned() })
            );
        }
    }
}
