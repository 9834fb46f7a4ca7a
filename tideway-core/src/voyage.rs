//! Time, cost, fuel and cargo-split metrics for a single voyage.
//!
//! All values keep full `f64` precision here. Integer scaling for the solver
//! happens later, in the model builder.

use std::time::Duration;

use crate::trip::{Leg, TripError, TripMetrics, TripMetricsProvider};
use crate::{Port, PortId, Vessel};

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Voyage-level constants shared by every candidate in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct VoyageParameters {
    /// Fixed time alongside the pickup port, independent of cargo mass.
    pub loading_time: Duration,
    /// Fixed time alongside each drop-off port.
    pub unloading_time_per_drop_off: Duration,
    /// Bunker price per metric tonne of fuel.
    pub fuel_price_per_mt: f64,
    /// Whether the vessel sails back to its pickup port after the last
    /// drop-off.
    pub round_trip: bool,
    /// Speed used to estimate distances that are not tabulated, in knots.
    pub service_speed_knots: f64,
    /// Share of capacity loaded per voyage, in `(0, 1]`.
    pub load_factor: f64,
}

impl Default for VoyageParameters {
    fn default() -> Self {
        Self {
            loading_time: Duration::from_secs(6 * 3_600),
            unloading_time_per_drop_off: Duration::from_secs(4 * 3_600),
            fuel_price_per_mt: 45_000.0,
            round_trip: false,
            service_speed_knots: 14.0,
            load_factor: 1.0,
        }
    }
}

/// How a split voyage divides its load between drop-off ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SplitPolicy {
    /// Every drop-off receives the same share.
    #[default]
    Equal,
    /// The optimization model chooses the split; the recorded allocations
    /// are indicative only.
    ModelChosen,
}

/// Planned mass for one drop-off port.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CargoAllocation {
    /// Receiving port.
    pub port: PortId,
    /// Mass discharged there, in metric tonnes.
    pub mass_mt: f64,
}

/// Division of a voyage's load across its drop-offs.
///
/// The allocations always sum to `nominal_load_mt`, which never exceeds the
/// vessel's capacity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CargoSplit {
    /// Policy the allocations were derived from.
    pub policy: SplitPolicy,
    /// Mass loaded at the pickup port.
    pub nominal_load_mt: f64,
    /// Per-port allocations in visiting order.
    pub allocations: Vec<CargoAllocation>,
}

impl CargoSplit {
    /// Planned mass for `port`, zero when the voyage does not call there.
    #[must_use]
    pub fn mass_for(&self, port: &str) -> f64 {
        self.allocations
            .iter()
            .find(|allocation| allocation.port.as_str() == port)
            .map_or(0.0, |allocation| allocation.mass_mt)
    }
}

/// Time components of a voyage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoyageTimes {
    /// Outbound and inter-stop sailing.
    pub sailing: Duration,
    /// Loading plus unloading at every drop-off.
    pub service: Duration,
    /// Sailing back to the pickup port; zero unless round trips are on.
    pub return_leg: Duration,
}

impl VoyageTimes {
    /// Whole voyage duration.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.sailing + self.service + self.return_leg
    }

    /// Whole voyage duration in hours.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "converts seconds to hours")]
    pub fn total_hours(&self) -> f64 {
        self.total().as_secs_f64() / SECONDS_PER_HOUR
    }

    /// Time spent under way, including the return leg.
    #[must_use]
    pub fn under_way(&self) -> Duration {
        self.sailing + self.return_leg
    }
}

/// Auditable cost line items of a voyage.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostBreakdown {
    /// Voyage days times the vessel's daily rate.
    pub charter: f64,
    /// Call charges and cargo handling at every visited port.
    pub port_charges: f64,
    /// Fuel burned under way times the bunker price.
    pub fuel: f64,
}

impl CostBreakdown {
    /// Sum of the three line items.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "costs are monetary amounts")]
    pub fn total(&self) -> f64 {
        self.charter + self.port_charges + self.fuel
    }
}

/// Full metrics for one voyage pattern.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoyageEstimate {
    /// Time components.
    pub times: VoyageTimes,
    /// Cost line items.
    pub cost: CostBreakdown,
    /// Fuel burned under way, in metric tonnes.
    pub fuel_mt: f64,
    /// Distance sailed, including the return leg when applicable.
    pub distance_nm: f64,
    /// Cargo division across drop-offs.
    pub cargo: CargoSplit,
    /// Legs sailed, in order, including the return leg when applicable.
    pub legs: Vec<Leg>,
}

impl VoyageEstimate {
    /// Whether any leg relied on a fallback sailing time.
    #[must_use]
    pub fn estimated(&self) -> bool {
        self.legs.iter().any(|leg| leg.estimated)
    }
}

/// Computes [`VoyageEstimate`] values from vessel, port and leg data.
///
/// # Examples
///
/// ```
/// use tideway_core::{Port, TripTimeTable, Vessel, VoyageCostModel, VoyageParameters};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = TripTimeTable::new().with_trip_days("L1", "U1", 1.0)?;
/// let vessel = Vessel::new("T1", 50_000.0, 1_000_000.0, 20.0)?;
/// let pickup = Port::pickup("L1", 100_000.0)?;
/// let drop_off = Port::drop_off("U1", 80_000.0)?;
///
/// let model = VoyageCostModel::new(VoyageParameters::default());
/// let estimate = model.estimate(&table, &vessel, &pickup, &[&drop_off])?;
/// assert_eq!(estimate.times.total_hours(), 34.0);
/// assert_eq!(estimate.fuel_mt, 20.0);
/// assert_eq!(estimate.cargo.nominal_load_mt, 50_000.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoyageCostModel {
    params: VoyageParameters,
    split_policy: SplitPolicy,
}

impl VoyageCostModel {
    /// Create a model using equal cargo splits.
    #[must_use]
    pub fn new(params: VoyageParameters) -> Self {
        Self {
            params,
            split_policy: SplitPolicy::Equal,
        }
    }

    /// Replace the cargo split policy.
    #[must_use]
    pub const fn with_split_policy(mut self, split_policy: SplitPolicy) -> Self {
        self.split_policy = split_policy;
        self
    }

    /// Parameters in use.
    #[must_use]
    pub const fn params(&self) -> &VoyageParameters {
        &self.params
    }

    /// Split policy in use.
    #[must_use]
    pub const fn split_policy(&self) -> SplitPolicy {
        self.split_policy
    }

    /// Estimate a voyage of `vessel` loading at `pickup` and discharging at
    /// `drop_offs` in order.
    ///
    /// # Errors
    ///
    /// Returns a [`TripError`] when the port pattern is illegal.
    pub fn estimate(
        &self,
        provider: &dyn TripMetricsProvider,
        vessel: &Vessel,
        pickup: &Port,
        drop_offs: &[&Port],
    ) -> Result<VoyageEstimate, TripError> {
        let ids: Vec<PortId> = drop_offs.iter().map(|port| port.id.clone()).collect();
        let trip = provider.trip_metrics(&pickup.id, &ids)?;
        let return_leg = if self.params.round_trip {
            Some(provider.return_leg(&pickup.id, &ids)?)
        } else {
            None
        };
        let times = self.times(&trip, return_leg.as_ref(), drop_offs.len());
        let cargo = self.split(vessel, drop_offs);
        let fuel_mt = fuel_burn(vessel, times.under_way());
        let cost = self.costs(vessel, pickup, drop_offs, &times, &cargo, fuel_mt);

        let TripMetrics {
            outbound,
            inter_stop,
        } = trip;
        let legs: Vec<Leg> = std::iter::once(outbound)
            .chain(inter_stop)
            .chain(return_leg)
            .collect();
        let distance_nm = legs
            .iter()
            .map(|leg| self.leg_distance(leg))
            .sum::<f64>();

        Ok(VoyageEstimate {
            times,
            cost,
            fuel_mt,
            distance_nm,
            cargo,
            legs,
        })
    }

    fn times(&self, trip: &TripMetrics, return_leg: Option<&Leg>, stops: usize) -> VoyageTimes {
        let unloading = (0..stops).fold(Duration::ZERO, |acc, _| {
            acc + self.params.unloading_time_per_drop_off
        });
        VoyageTimes {
            sailing: trip.sailing_time(),
            service: self.params.loading_time + unloading,
            return_leg: return_leg.map_or(Duration::ZERO, |leg| leg.sailing),
        }
    }

    #[expect(clippy::float_arithmetic, reason = "cargo mass is continuous")]
    #[expect(clippy::cast_precision_loss, reason = "drop-off count is at most two")]
    fn split(&self, vessel: &Vessel, drop_offs: &[&Port]) -> CargoSplit {
        let nominal_load_mt = vessel.capacity_mt * self.params.load_factor.clamp(0.0, 1.0);
        let share = nominal_load_mt / drop_offs.len().max(1) as f64;
        CargoSplit {
            policy: self.split_policy,
            nominal_load_mt,
            allocations: drop_offs
                .iter()
                .map(|port| CargoAllocation {
                    port: port.id.clone(),
                    mass_mt: share,
                })
                .collect(),
        }
    }

    #[expect(clippy::float_arithmetic, reason = "costs are monetary amounts")]
    fn costs(
        &self,
        vessel: &Vessel,
        pickup: &Port,
        drop_offs: &[&Port],
        times: &VoyageTimes,
        cargo: &CargoSplit,
        fuel_mt: f64,
    ) -> CostBreakdown {
        let days = times.total().as_secs_f64() / SECONDS_PER_DAY;
        let loading = pickup.port_charge + pickup.handling_rate * cargo.nominal_load_mt;
        let discharging: f64 = drop_offs
            .iter()
            .map(|port| port.port_charge + port.handling_rate * cargo.mass_for(port.id.as_str()))
            .sum();
        CostBreakdown {
            charter: days * vessel.daily_rate,
            port_charges: loading + discharging,
            fuel: fuel_mt * self.params.fuel_price_per_mt,
        }
    }

    #[expect(clippy::float_arithmetic, reason = "distance estimate from speed")]
    fn leg_distance(&self, leg: &Leg) -> f64 {
        leg.distance_nm
            .unwrap_or_else(|| leg.hours() * self.params.service_speed_knots)
    }
}

#[expect(clippy::float_arithmetic, reason = "fuel burn is a daily rate")]
fn fuel_burn(vessel: &Vessel, under_way: Duration) -> f64 {
    vessel.fuel_per_day_mt * under_way.as_secs_f64() / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TripTimeTable;
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> TripTimeTable {
        TripTimeTable::new()
            .with_trip_days("L1", "U1", 0.5)
            .and_then(|t| t.with_trip_days("U1", "U2", 0.25))
            .expect("valid table")
    }

    #[fixture]
    fn vessel() -> Vessel {
        Vessel::new("T1", 50_000.0, 2_400_000.0, 24.0).expect("valid vessel")
    }

    #[fixture]
    fn ports() -> (Port, Port, Port) {
        (
            Port::pickup("L1", 100_000.0).expect("valid port"),
            Port::drop_off("U1", 80_000.0).expect("valid port"),
            Port::drop_off("U2", 80_000.0).expect("valid port"),
        )
    }

    #[rstest]
    fn direct_voyage_times_and_costs(table: TripTimeTable, vessel: Vessel, ports: (Port, Port, Port)) {
        let (pickup, u1, _) = ports;
        let model = VoyageCostModel::new(VoyageParameters::default());
        let estimate = model
            .estimate(&table, &vessel, &pickup, &[&u1])
            .expect("legal voyage");

        // 12 h sailing + 6 h loading + 4 h unloading
        assert_eq!(estimate.times.total(), Duration::from_secs(22 * 3_600));
        assert!((estimate.fuel_mt - 12.0).abs() < 1e-9);
        assert!((estimate.cost.charter - 2_200_000.0).abs() < 1e-6);
        assert!((estimate.cost.port_charges - 180_000.0).abs() < 1e-9);
        assert!((estimate.cost.fuel - 540_000.0).abs() < 1e-6);
        assert_eq!(estimate.cargo.allocations.len(), 1);
        assert_eq!(estimate.cargo.mass_for("U1"), 50_000.0);
    }

    #[rstest]
    fn split_voyage_divides_load_equally(table: TripTimeTable, vessel: Vessel, ports: (Port, Port, Port)) {
        let (pickup, u1, u2) = ports;
        let model = VoyageCostModel::new(VoyageParameters::default());
        let estimate = model
            .estimate(&table, &vessel, &pickup, &[&u1, &u2])
            .expect("legal voyage");

        assert_eq!(estimate.times.sailing, Duration::from_secs(18 * 3_600));
        assert_eq!(estimate.times.service, Duration::from_secs(14 * 3_600));
        assert_eq!(estimate.cargo.mass_for("U1"), 25_000.0);
        assert_eq!(estimate.cargo.mass_for("U2"), 25_000.0);
        assert!((estimate.cost.port_charges - 260_000.0).abs() < 1e-9);
    }

    #[rstest]
    fn round_trip_adds_return_leg_to_time_fuel_and_distance(
        table: TripTimeTable,
        vessel: Vessel,
        ports: (Port, Port, Port),
    ) {
        let (pickup, u1, _) = ports;
        let one_way = VoyageCostModel::new(VoyageParameters::default())
            .estimate(&table, &vessel, &pickup, &[&u1])
            .expect("legal voyage");
        let round = VoyageCostModel::new(VoyageParameters {
            round_trip: true,
            ..VoyageParameters::default()
        })
        .estimate(&table, &vessel, &pickup, &[&u1])
        .expect("legal voyage");

        assert_eq!(round.times.return_leg, Duration::from_secs(12 * 3_600));
        assert!(round.fuel_mt > one_way.fuel_mt);
        assert!((round.distance_nm - 2.0 * one_way.distance_nm).abs() < 1e-9);
        assert_eq!(round.legs.len(), 2);
    }

    #[rstest]
    fn untabulated_distance_uses_service_speed(table: TripTimeTable, vessel: Vessel, ports: (Port, Port, Port)) {
        let (pickup, u1, _) = ports;
        let estimate = VoyageCostModel::new(VoyageParameters::default())
            .estimate(&table, &vessel, &pickup, &[&u1])
            .expect("legal voyage");
        assert!((estimate.distance_nm - 12.0 * 14.0).abs() < 1e-9);
    }

    #[rstest]
    fn handling_rates_scale_with_cargo(table: TripTimeTable, vessel: Vessel) {
        let pickup = Port::pickup("L1", 0.0)
            .and_then(|p| p.with_handling_rate(2.0))
            .expect("valid port");
        let u1 = Port::drop_off("U1", 0.0)
            .and_then(|p| p.with_handling_rate(1.0))
            .expect("valid port");
        let estimate = VoyageCostModel::new(VoyageParameters::default())
            .estimate(&table, &vessel, &pickup, &[&u1])
            .expect("legal voyage");
        assert!((estimate.cost.port_charges - 150_000.0).abs() < 1e-9);
    }

    #[rstest]
    fn cost_total_is_sum_of_line_items(table: TripTimeTable, vessel: Vessel, ports: (Port, Port, Port)) {
        let (pickup, u1, u2) = ports;
        let estimate = VoyageCostModel::new(VoyageParameters::default())
            .estimate(&table, &vessel, &pickup, &[&u2, &u1])
            .expect("legal voyage");
        let CostBreakdown {
            charter,
            port_charges,
            fuel,
        } = estimate.cost;
        assert!((estimate.cost.total() - (charter + port_charges + fuel)).abs() < 1e-6);
    }
}
