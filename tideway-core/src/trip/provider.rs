//! Trip-metrics provider trait and the leg types it returns.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::PortId;

use super::error::TripError;

/// Most drop-off ports a single voyage may visit.
pub const MAX_DROP_OFFS: usize = 2;

/// Which static table a leg is looked up in.
///
/// The kind selects the fallback used when the table has no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum LegKind {
    /// From the loading port to the first drop-off.
    Outbound,
    /// Between two drop-off ports.
    InterStop,
    /// From the last drop-off back to the loading port.
    Return,
}

/// One sailing leg between two ports.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Departure port.
    pub from: PortId,
    /// Arrival port.
    pub to: PortId,
    /// Table the leg came from.
    pub kind: LegKind,
    /// Time under way.
    pub sailing: Duration,
    /// Tabulated distance, if the provider knows it.
    pub distance_nm: Option<f64>,
    /// Whether `sailing` is a fallback rather than a table entry.
    pub estimated: bool,
}

impl Leg {
    /// Sailing time in hours.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "converts seconds to hours")]
    pub fn hours(&self) -> f64 {
        self.sailing.as_secs_f64() / 3_600.0
    }
}

/// Outbound legs of a voyage, in visiting order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripMetrics {
    /// Pickup to first drop-off.
    pub outbound: Leg,
    /// First to second drop-off, when there is one.
    pub inter_stop: Option<Leg>,
}

impl TripMetrics {
    /// Sum of the outbound and inter-stop sailing times.
    ///
    /// A split voyage sails `pickup -> A -> B`, never `pickup -> B`.
    #[must_use]
    pub fn sailing_time(&self) -> Duration {
        self.inter_stop
            .as_ref()
            .map_or(self.outbound.sailing, |leg| self.outbound.sailing + leg.sailing)
    }

    /// Legs in visiting order.
    pub fn legs(&self) -> impl Iterator<Item = &Leg> + '_ {
        std::iter::once(&self.outbound).chain(self.inter_stop.as_ref())
    }

    /// Whether any leg used a fallback time.
    #[must_use]
    pub fn estimated(&self) -> bool {
        self.legs().any(|leg| leg.estimated)
    }
}

/// Look up sailing times between ports from static tables.
///
/// Implementations must be `Send + Sync`: candidate generation queries the
/// provider from several worker threads at once.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tideway_core::{Leg, LegKind, PortId, TripMetricsProvider};
///
/// struct HalfDay;
///
/// impl TripMetricsProvider for HalfDay {
///     fn leg(&self, from: &PortId, to: &PortId, kind: LegKind) -> Leg {
///         Leg {
///             from: from.clone(),
///             to: to.clone(),
///             kind,
///             sailing: Duration::from_secs(12 * 3_600),
///             distance_nm: None,
///             estimated: false,
///         }
///     }
/// }
///
/// let metrics = HalfDay
///     .trip_metrics(&PortId::new("L1"), &[PortId::new("U1"), PortId::new("U2")])
///     .expect("legal voyage");
/// assert_eq!(metrics.sailing_time(), Duration::from_secs(24 * 3_600));
/// ```
pub trait TripMetricsProvider: Send + Sync {
    /// Return the leg `from -> to`.
    ///
    /// Missing entries must fall back to a non-zero time and set
    /// [`Leg::estimated`].
    fn leg(&self, from: &PortId, to: &PortId, kind: LegKind) -> Leg;

    /// Return the outbound legs for `pickup` followed by `drop_offs` in order.
    ///
    /// # Errors
    ///
    /// Returns a [`TripError`] when the pattern is structurally illegal.
    fn trip_metrics(&self, pickup: &PortId, drop_offs: &[PortId]) -> Result<TripMetrics, TripError> {
        check_pattern(pickup, drop_offs)?;
        let (first, rest) = drop_offs.split_first().ok_or(TripError::NoDropOffs)?;
        let outbound = self.leg(pickup, first, LegKind::Outbound);
        let inter_stop = rest
            .first()
            .map(|second| self.leg(first, second, LegKind::InterStop));
        Ok(TripMetrics {
            outbound,
            inter_stop,
        })
    }

    /// Return the leg from the last drop-off back to `pickup`.
    ///
    /// # Errors
    ///
    /// Returns [`TripError::NoDropOffs`] when `drop_offs` is empty.
    fn return_leg(&self, pickup: &PortId, drop_offs: &[PortId]) -> Result<Leg, TripError> {
        let last = drop_offs.last().ok_or(TripError::NoDropOffs)?;
        Ok(self.leg(last, pickup, LegKind::Return))
    }
}

fn check_pattern(pickup: &PortId, drop_offs: &[PortId]) -> Result<(), TripError> {
    if drop_offs.is_empty() {
        return Err(TripError::NoDropOffs);
    }
    if drop_offs.len() > MAX_DROP_OFFS {
        return Err(TripError::TooManyDropOffs {
            count: drop_offs.len(),
            max: MAX_DROP_OFFS,
        });
    }
    let mut seen = BTreeSet::new();
    for port in drop_offs {
        if port == pickup {
            return Err(TripError::PickupInDropOffs { port: port.clone() });
        }
        if !seen.insert(port) {
            return Err(TripError::DuplicateDropOff { port: port.clone() });
        }
    }
    Ok(())
}
