//! Interpret a solver assignment in fleet terms.
//!
//! Delivered mass and vessel time are read back from the demand and time
//! rows of the model itself, so reported figures are exactly the quantities
//! the constraints bounded.

use std::collections::BTreeMap;
use std::time::Duration;

use log::info;
use thiserror::Error;

use crate::{
    Assignment, CandidateId, CargoAllocation, DEFAULT_CARBON_PRICE_PER_T, Demand, DeliverySource,
    EmissionsAccumulator, FleetModel, FuelType, LegKind, LinearModel, PortId, RouteCandidate,
    SolverError, Vessel, VoyageParameters,
};
use crate::model::{CandidateBinding, ConstraintId, VariableId};

use super::{
    Activity, FleetKpis, PortDelivery, ScaledTotals, SelectedVoyage, TimelineEntry, VesselSchedule,
};

/// Errors raised while reading an assignment back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The assignment does not have one value per variable.
    #[error("assignment has {found} values but the model has {expected} variables")]
    AssignmentLength {
        /// Variables in the model.
        expected: usize,
        /// Values supplied.
        found: usize,
    },
    /// A value could not be rounded to an integer.
    #[error(transparent)]
    Rounding(#[from] SolverError),
    /// A bound or constraint does not hold.
    #[error("assignment violates {name}")]
    Violated {
        /// Variable or constraint name.
        name: String,
    },
    /// A variable has no value.
    #[error("no value for variable #{index}")]
    MissingValue {
        /// Variable position.
        index: usize,
    },
    /// A row or product left the `i64` range.
    #[error("{name} overflows")]
    Overflow {
        /// Row or variable name.
        name: String,
    },
    /// A binding references a candidate missing from the universe.
    #[error("model references candidate #{index}, which is not in the universe")]
    UnknownCandidate {
        /// Position looked up.
        index: usize,
    },
}

/// Fleet-level reading of one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Voyages with at least one execution.
    pub selected: Vec<SelectedVoyage>,
    /// Fulfilment per demand row.
    pub deliveries: Vec<PortDelivery>,
    /// Workload per vessel that owns candidates, in roster order.
    pub schedules: Vec<VesselSchedule>,
    /// Fleet aggregates.
    pub kpis: FleetKpis,
    /// Integer row values the figures above derive from.
    pub scaled: ScaledTotals,
    /// Objective evaluated on the rounded assignment, in model units.
    pub objective_units: Option<i64>,
}

struct Scheduled<'c> {
    candidate: &'c RouteCandidate,
    voyage: SelectedVoyage,
}

/// Reads solver assignments against the model they solve.
pub struct ResultExtractor<'a> {
    fleet: &'a FleetModel,
    universe: &'a crate::CandidateUniverse,
    vessels: &'a [Vessel],
    demand: &'a Demand,
    params: &'a VoyageParameters,
    carbon_price_per_t: f64,
}

impl<'a> ResultExtractor<'a> {
    /// Create an extractor for `fleet`, built from `universe`, `vessels` and
    /// `demand`, whose candidates were estimated with `params`.
    #[must_use]
    pub const fn new(
        fleet: &'a FleetModel,
        universe: &'a crate::CandidateUniverse,
        vessels: &'a [Vessel],
        demand: &'a Demand,
        params: &'a VoyageParameters,
    ) -> Self {
        Self {
            fleet,
            universe,
            vessels,
            demand,
            params,
            carbon_price_per_t: DEFAULT_CARBON_PRICE_PER_T,
        }
    }

    /// Price CO2 at `carbon_price_per_t` in the emissions report.
    #[must_use]
    pub const fn with_carbon_price(mut self, carbon_price_per_t: f64) -> Self {
        self.carbon_price_per_t = carbon_price_per_t;
        self
    }

    /// Round `assignment`, check it against every bound and constraint, and
    /// derive schedules and KPIs from it.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractError`] when the assignment does not fit the
    /// model or violates it.
    pub fn extract(&self, assignment: &Assignment) -> Result<Extraction, ExtractError> {
        let model = self.fleet.model();
        let expected = model.variables().len();
        if assignment.len() != expected {
            return Err(ExtractError::AssignmentLength {
                expected,
                found: assignment.len(),
            });
        }
        let values = assignment.rounded()?;
        if let Some(name) = first_violation(model, &values) {
            return Err(ExtractError::Violated { name });
        }

        let scaled = self.scaled_totals(&values)?;
        let scheduled = self.scheduled(&values)?;
        let deliveries = self.deliveries(&scaled);
        let schedules = self.schedules(&scheduled, &scaled);
        let kpis = self.kpis(&scheduled, &deliveries, &schedules);
        info!(
            "extracted {} voyages delivering {:.0} of {:.0} t",
            kpis.total_voyages, kpis.delivered_mt, kpis.demand_mt
        );
        Ok(Extraction {
            selected: scheduled.into_iter().map(|s| s.voyage).collect(),
            deliveries,
            schedules,
            kpis,
            scaled,
            objective_units: model.objective_value(&values),
        })
    }

    fn scaled_totals(&self, values: &[i64]) -> Result<ScaledTotals, ExtractError> {
        let model = self.fleet.model();
        let delivered = self
            .fleet
            .demand_rows()
            .iter()
            .map(|(port, row)| Ok((port.clone(), row_value(model, *row, values)?)))
            .collect::<Result<BTreeMap<_, _>, ExtractError>>()?;
        let vessel_time = self
            .fleet
            .time_rows()
            .iter()
            .map(|(vessel, row)| Ok((vessel.clone(), row_value(model, *row, values)?)))
            .collect::<Result<BTreeMap<_, _>, ExtractError>>()?;
        Ok(ScaledTotals {
            delivered,
            vessel_time,
        })
    }

    fn scheduled(&self, values: &[i64]) -> Result<Vec<Scheduled<'a>>, ExtractError> {
        let mut scheduled = Vec::new();
        for binding in self.fleet.bindings() {
            let trips = value_of(values, binding.trips)?;
            if trips == 0 {
                continue;
            }
            let candidate = self
                .universe
                .get(binding.candidate)
                .filter(|candidate| candidate.id == binding.id)
                .ok_or(ExtractError::UnknownCandidate {
                    index: binding.candidate,
                })?;
            let executions = u32::try_from(trips).map_err(|_| ExtractError::Violated {
                name: format!("trips[{}]", binding.id),
            })?;
            let deliveries = self.voyage_deliveries(binding, trips, values)?;
            scheduled.push(Scheduled {
                candidate,
                voyage: selected_voyage(candidate, executions, deliveries),
            });
        }
        Ok(scheduled)
    }

    fn voyage_deliveries(
        &self,
        binding: &CandidateBinding,
        trips: i64,
        values: &[i64],
    ) -> Result<Vec<CargoAllocation>, ExtractError> {
        binding
            .deliveries
            .iter()
            .map(|delivery| {
                let units = match delivery.source {
                    DeliverySource::Flow(variable) => value_of(values, variable)?,
                    DeliverySource::PerTrip(units) => {
                        units.checked_mul(trips).ok_or_else(|| ExtractError::Overflow {
                            name: format!("delivery of {} to {}", binding.id, delivery.port),
                        })?
                    }
                };
                Ok(CargoAllocation {
                    port: delivery.port.clone(),
                    mass_mt: self.mass(units),
                })
            })
            .collect()
    }

    #[expect(clippy::float_arithmetic, reason = "satisfaction percentages")]
    fn deliveries(&self, scaled: &ScaledTotals) -> Vec<PortDelivery> {
        scaled
            .delivered
            .iter()
            .map(|(port, units)| {
                let demand_mt = self.demand.get(port.as_str());
                let delivered_mt = self.mass(*units);
                PortDelivery {
                    port: port.clone(),
                    demand_mt,
                    delivered_mt,
                    satisfaction_pct: percentage(delivered_mt, demand_mt).unwrap_or(100.0),
                }
            })
            .collect()
    }

    #[expect(clippy::float_arithmetic, reason = "utilization percentages")]
    fn schedules(&self, scheduled: &[Scheduled<'_>], scaled: &ScaledTotals) -> Vec<VesselSchedule> {
        self.vessels
            .iter()
            .filter_map(|vessel| {
                let units = *scaled.vessel_time.get(&vessel.id)?;
                let own: Vec<&Scheduled<'_>> = scheduled
                    .iter()
                    .filter(|s| s.voyage.vessel == vessel.id)
                    .collect();
                let utilized_hours = self.hours(units);
                Some(VesselSchedule {
                    vessel: vessel.id.clone(),
                    voyages: own
                        .iter()
                        .fold(0_u32, |acc, s| acc.saturating_add(s.voyage.executions)),
                    utilized_hours,
                    available_hours: vessel.monthly_hours,
                    utilization_pct: percentage(utilized_hours, vessel.monthly_hours)
                        .unwrap_or(0.0),
                    timeline: self.timeline(&own, vessel.monthly_hours),
                })
            })
            .collect()
    }

    fn timeline(&self, voyages: &[&Scheduled<'_>], available_hours: f64) -> Vec<TimelineEntry> {
        let loading = duration_hours(self.params.loading_time);
        let unloading = duration_hours(self.params.unloading_time_per_drop_off);
        let mut timeline = Timeline::default();
        for scheduled in voyages {
            let candidate = scheduled.candidate;
            let id = &candidate.id;
            for _ in 0..scheduled.voyage.executions {
                timeline.step(Activity::Load, Some(&candidate.pickup), loading, Some(id));
                for leg in &candidate.estimate.legs {
                    timeline.step(Activity::Sail, Some(&leg.to), leg.hours(), Some(id));
                    if leg.kind != LegKind::Return {
                        timeline.step(Activity::Unload, Some(&leg.to), unloading, Some(id));
                    }
                }
            }
        }
        timeline.finish(available_hours)
    }

    #[expect(clippy::float_arithmetic, reason = "KPI aggregation")]
    fn kpis(
        &self,
        scheduled: &[Scheduled<'_>],
        deliveries: &[PortDelivery],
        schedules: &[VesselSchedule],
    ) -> FleetKpis {
        let mut kpis = FleetKpis::default();
        let mut emissions = EmissionsAccumulator::default();
        for Scheduled { candidate, voyage } in scheduled {
            let runs = f64::from(voyage.executions);
            let cost = &candidate.estimate.cost;
            kpis.total_cost += voyage.total_cost;
            kpis.charter_cost += cost.charter * runs;
            kpis.port_charges += cost.port_charges * runs;
            kpis.fuel_cost += cost.fuel * runs;
            kpis.total_distance_nm += voyage.distance_nm;
            kpis.total_voyages = kpis.total_voyages.saturating_add(voyage.executions);
            let cargo_per_trip = voyage.deliveries.iter().map(|d| d.mass_mt).sum::<f64>() / runs;
            emissions.add_voyage(
                self.fuel_type(candidate),
                candidate.estimate.fuel_mt,
                cargo_per_trip,
                candidate.estimate.distance_nm,
                runs,
            );
        }

        kpis.delivered_mt = deliveries.iter().map(|d| d.delivered_mt).sum();
        kpis.demand_mt = self.demand.total();
        kpis.demand_satisfaction_pct =
            percentage(kpis.delivered_mt, kpis.demand_mt).unwrap_or(100.0);
        let (used, available) = schedules.iter().fold((0.0, 0.0), |(used, available), s| {
            (used + s.utilized_hours, available + s.available_hours)
        });
        kpis.fleet_utilization_pct = percentage(used, available).unwrap_or(0.0);
        kpis.cost_per_mt = (kpis.delivered_mt > 0.0).then(|| kpis.total_cost / kpis.delivered_mt);
        kpis.emissions = emissions.report(self.carbon_price_per_t);
        kpis
    }

    fn fuel_type(&self, candidate: &RouteCandidate) -> FuelType {
        self.vessels
            .iter()
            .find(|vessel| vessel.id == candidate.vessel)
            .map_or_else(FuelType::default, |vessel| vessel.fuel_type)
    }

    #[expect(clippy::float_arithmetic, reason = "undo integer scaling")]
    #[expect(clippy::cast_precision_loss, reason = "row values stay below 2^53")]
    fn mass(&self, units: i64) -> f64 {
        units as f64 / self.fleet.settings().scaling.mass_per_mt
    }

    #[expect(clippy::float_arithmetic, reason = "undo integer scaling")]
    #[expect(clippy::cast_precision_loss, reason = "row values stay below 2^53")]
    fn hours(&self, units: i64) -> f64 {
        units as f64 / self.fleet.settings().scaling.time_per_hour
    }
}

#[derive(Default)]
struct Timeline {
    entries: Vec<TimelineEntry>,
    now: f64,
}

impl Timeline {
    #[expect(clippy::float_arithmetic, reason = "timeline offsets in hours")]
    fn step(
        &mut self,
        activity: Activity,
        port: Option<&PortId>,
        hours: f64,
        candidate: Option<&CandidateId>,
    ) {
        let start_hours = self.now;
        self.now += hours;
        self.entries.push(TimelineEntry {
            activity,
            port: port.cloned(),
            start_hours,
            end_hours: self.now,
            candidate: candidate.cloned(),
        });
    }

    #[expect(clippy::float_arithmetic, reason = "idle time in hours")]
    fn finish(mut self, available_hours: f64) -> Vec<TimelineEntry> {
        if self.now < available_hours {
            self.step(Activity::Idle, None, available_hours - self.now, None);
        }
        self.entries
    }
}

#[expect(clippy::float_arithmetic, reason = "per-trip metrics times executions")]
fn selected_voyage(
    candidate: &RouteCandidate,
    executions: u32,
    deliveries: Vec<CargoAllocation>,
) -> SelectedVoyage {
    let runs = f64::from(executions);
    SelectedVoyage {
        candidate: candidate.id.clone(),
        vessel: candidate.vessel.clone(),
        pickup: candidate.pickup.clone(),
        drop_offs: candidate.drop_offs.clone(),
        pattern: candidate.pattern(),
        executions,
        deliveries,
        cost_per_trip: candidate.total_cost(),
        total_cost: candidate.total_cost() * runs,
        hours_per_trip: candidate.total_hours(),
        distance_nm: candidate.estimate.distance_nm * runs,
        fuel_mt: candidate.estimate.fuel_mt * runs,
    }
}

fn first_violation(model: &LinearModel, values: &[i64]) -> Option<String> {
    model
        .variables()
        .iter()
        .zip(values)
        .find(|(variable, value)| !(variable.lower..=variable.upper).contains(*value))
        .map(|(variable, _)| variable.name.clone())
        .or_else(|| {
            model
                .constraints()
                .iter()
                .find(|c| {
                    !LinearModel::evaluate(&c.terms, values).is_some_and(|lhs| c.holds_for(lhs))
                })
                .map(|c| c.name.clone())
        })
}

fn row_value(model: &LinearModel, row: ConstraintId, values: &[i64]) -> Result<i64, ExtractError> {
    model.row_value(row, values).ok_or_else(|| ExtractError::Overflow {
        name: model
            .constraint(row)
            .map_or_else(|| format!("row #{}", row.index()), |c| c.name.clone()),
    })
}

fn value_of(values: &[i64], variable: VariableId) -> Result<i64, ExtractError> {
    values
        .get(variable.index())
        .copied()
        .ok_or(ExtractError::MissingValue {
            index: variable.index(),
        })
}

#[expect(clippy::float_arithmetic, reason = "ratio as a percentage")]
fn percentage(part: f64, whole: f64) -> Option<f64> {
    (whole > 0.0).then(|| part / whole * 100.0)
}

#[expect(clippy::float_arithmetic, reason = "converts seconds to hours")]
fn duration_hours(duration: Duration) -> f64 {
    duration.as_secs_f64() / 3_600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CandidateGenerator, CandidateUniverse, ConstraintModelBuilder, ModelSettings, Port,
        SplitPolicy, TripTimeTable, VoyageCostModel,
    };
    use rstest::{fixture, rstest};

    struct Single {
        vessels: Vec<Vessel>,
        demand: Demand,
        params: VoyageParameters,
        universe: CandidateUniverse,
        fleet: FleetModel,
    }

    #[fixture]
    fn single() -> Single {
        let table = TripTimeTable::new()
            .with_trip_days("L1", "U1", 1.0)
            .expect("valid trip");
        let params = VoyageParameters::default();
        let cost = VoyageCostModel::new(params.clone()).with_split_policy(SplitPolicy::ModelChosen);
        let vessels = vec![Vessel::new("T1", 50_000.0, 1_000_000.0, 20.0).expect("valid vessel")];
        let universe = CandidateGenerator::new(&table, &cost).generate(
            &vessels,
            &[Port::pickup("L1", 100_000.0).expect("valid port")],
            &[Port::drop_off("U1", 80_000.0).expect("valid port")],
        );
        let demand = Demand::new([("U1", 50_000.0)]).expect("valid demand");
        let fleet = ConstraintModelBuilder::new(&universe, &vessels, &demand, &ModelSettings::default())
            .build()
            .expect("model builds");
        Single {
            vessels,
            demand,
            params,
            universe,
            fleet,
        }
    }

    fn extractor(single: &Single) -> ResultExtractor<'_> {
        ResultExtractor::new(
            &single.fleet,
            &single.universe,
            &single.vessels,
            &single.demand,
            &single.params,
        )
    }

    #[rstest]
    fn reads_back_delivery_and_time(single: Single) {
        let extraction = extractor(&single)
            .extract(&Assignment::new(vec![1.0, 50_000.0]))
            .expect("valid assignment");

        assert_eq!(extraction.scaled.delivered.get("U1"), Some(&50_000));
        assert_eq!(extraction.scaled.vessel_time.get("T1"), Some(&3_400));
        let delivery = &extraction.deliveries[0];
        assert!((delivery.satisfaction_pct - 100.0).abs() < 1e-9);
        let schedule = &extraction.schedules[0];
        assert_eq!(schedule.voyages, 1);
        assert!((schedule.utilized_hours - 34.0).abs() < 1e-9);
        assert_eq!(extraction.kpis.total_voyages, 1);
        assert!(extraction.kpis.emissions.eeoi.is_some());
    }

    #[rstest]
    fn timeline_walks_load_sail_unload_then_idles(single: Single) {
        let extraction = extractor(&single)
            .extract(&Assignment::new(vec![1.0, 50_000.0]))
            .expect("valid assignment");
        let activities: Vec<Activity> = extraction.schedules[0]
            .timeline
            .iter()
            .map(|entry| entry.activity)
            .collect();
        assert_eq!(
            activities,
            vec![Activity::Load, Activity::Sail, Activity::Unload, Activity::Idle]
        );
        let idle = extraction.schedules[0].timeline.last().expect("idle entry");
        assert!((idle.start_hours - 34.0).abs() < 1e-9);
        assert!((idle.end_hours - 720.0).abs() < 1e-9);
    }

    #[rstest]
    fn rejects_short_assignment(single: Single) {
        let err = extractor(&single)
            .extract(&Assignment::new(vec![1.0]))
            .expect_err("length mismatch");
        assert_eq!(
            err,
            ExtractError::AssignmentLength {
                expected: 2,
                found: 1
            }
        );
    }

    #[rstest]
    fn rejects_flow_without_trips(single: Single) {
        let err = extractor(&single)
            .extract(&Assignment::new(vec![0.0, 50_000.0]))
            .expect_err("cargo link violated");
        assert!(matches!(err, ExtractError::Violated { name } if name.starts_with("link[")));
    }
}
