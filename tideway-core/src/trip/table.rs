//! In-memory trip-time and distance tables.

use std::collections::HashMap;
use std::time::Duration;

use log::warn;

use crate::PortId;

use super::error::TripTableError;
use super::provider::{Leg, LegKind, TripMetricsProvider};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const MAX_LEG_DAYS: f64 = 365.0;

/// Convert a sailing time in days to a [`Duration`].
///
/// Times are rounded to the millisecond so that tabulated fractions of a day
/// add up exactly, e.g. `0.4 + 0.35 == 0.75`.
///
/// Returns `None` unless `days` lies in `(0, 365]`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tideway_core::days_to_duration;
///
/// let a = days_to_duration(0.4).expect("valid");
/// let b = days_to_duration(0.35).expect("valid");
/// assert_eq!(a + b, days_to_duration(0.75).expect("valid"));
/// assert_eq!(days_to_duration(0.0), None);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "days are tabulated as fractions")]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is bounded to (0, 365] days before the cast"
)]
pub fn days_to_duration(days: f64) -> Option<Duration> {
    if !(days.is_finite() && days > 0.0 && days <= MAX_LEG_DAYS) {
        return None;
    }
    let millis = (days * MILLIS_PER_DAY).round() as u64;
    (millis > 0).then(|| Duration::from_millis(millis))
}

/// Sailing times used when a table has no entry for a leg.
///
/// Both defaults are non-zero so a missing entry never makes a voyage look
/// free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripTimeFallbacks {
    /// Pickup to drop-off, and the return leg.
    pub pickup_to_drop_off: Duration,
    /// Drop-off to drop-off.
    pub drop_off_to_drop_off: Duration,
}

impl Default for TripTimeFallbacks {
    fn default() -> Self {
        Self {
            // 0.5 days
            pickup_to_drop_off: Duration::from_secs(12 * 3_600),
            // 0.2 days
            drop_off_to_drop_off: Duration::from_secs(17_280),
        }
    }
}

impl TripTimeFallbacks {
    const fn for_kind(&self, kind: LegKind) -> Duration {
        match kind {
            LegKind::Outbound | LegKind::Return => self.pickup_to_drop_off,
            LegKind::InterStop => self.drop_off_to_drop_off,
        }
    }
}

/// Static lookup tables keyed by port pair.
///
/// Entries are symmetric: a query for `a -> b` falls back to the entry for
/// `b -> a` before using [`TripTimeFallbacks`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tideway_core::{LegKind, PortId, TripMetricsProvider, TripTimeTable};
///
/// # fn main() -> Result<(), tideway_core::TripTableError> {
/// let table = TripTimeTable::new()
///     .with_trip_days("L1", "U1", 0.4)?
///     .with_trip_days("U1", "U2", 0.35)?;
/// let metrics = table
///     .trip_metrics(&PortId::new("L1"), &[PortId::new("U1"), PortId::new("U2")])
///     .expect("legal voyage");
/// assert_eq!(metrics.sailing_time(), Duration::from_secs(64_800));
/// assert!(!metrics.estimated());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TripTimeTable {
    times: HashMap<(PortId, PortId), Duration>,
    distances: HashMap<(PortId, PortId), f64>,
    fallbacks: TripTimeFallbacks,
}

impl TripTimeTable {
    /// Create an empty table using the default fallbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fallback sailing times.
    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: TripTimeFallbacks) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Add a sailing time in days, consuming and returning the table.
    ///
    /// # Errors
    ///
    /// See [`TripTimeTable::insert_days`].
    pub fn with_trip_days(
        mut self,
        from: impl Into<PortId>,
        to: impl Into<PortId>,
        days: f64,
    ) -> Result<Self, TripTableError> {
        self.insert_days(from.into(), to.into(), days)?;
        Ok(self)
    }

    /// Add a sailing time in days.
    ///
    /// # Errors
    ///
    /// Returns [`TripTableError::InvalidDuration`] unless `days` lies in
    /// `(0, 365]`, and [`TripTableError::SelfLoop`] when `from == to`.
    pub fn insert_days(&mut self, from: PortId, to: PortId, days: f64) -> Result<(), TripTableError> {
        if from == to {
            return Err(TripTableError::SelfLoop { port: from });
        }
        let Some(sailing) = days_to_duration(days) else {
            return Err(TripTableError::InvalidDuration { from, to, days });
        };
        self.times.insert((from, to), sailing);
        Ok(())
    }

    /// Add a distance in nautical miles.
    ///
    /// # Errors
    ///
    /// Returns [`TripTableError::InvalidDistance`] for negative or
    /// non-finite distances, and [`TripTableError::SelfLoop`] when
    /// `from == to`.
    pub fn insert_distance(
        &mut self,
        from: PortId,
        to: PortId,
        nautical_miles: f64,
    ) -> Result<(), TripTableError> {
        if from == to {
            return Err(TripTableError::SelfLoop { port: from });
        }
        if !(nautical_miles.is_finite() && nautical_miles >= 0.0) {
            return Err(TripTableError::InvalidDistance {
                from,
                to,
                nautical_miles,
            });
        }
        self.distances.insert((from, to), nautical_miles);
        Ok(())
    }

    /// Number of tabulated sailing times.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether no sailing time is tabulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn lookup<T: Copy>(map: &HashMap<(PortId, PortId), T>, from: &PortId, to: &PortId) -> Option<T> {
        // Keys are owned pairs, so probe with clones of the two ids.
        let forward = (from.clone(), to.clone());
        map.get(&forward).copied().or_else(|| {
            let (a, b) = forward;
            map.get(&(b, a)).copied()
        })
    }
}

impl TripMetricsProvider for TripTimeTable {
    fn leg(&self, from: &PortId, to: &PortId, kind: LegKind) -> Leg {
        let distance_nm = Self::lookup(&self.distances, from, to);
        if let Some(sailing) = Self::lookup(&self.times, from, to) {
            return Leg {
                from: from.clone(),
                to: to.clone(),
                kind,
                sailing,
                distance_nm,
                estimated: false,
            };
        }
        let sailing = self.fallbacks.for_kind(kind);
        warn!("no sailing time for {from} -> {to}; using fallback of {sailing:?}");
        Leg {
            from: from.clone(),
            to: to.clone(),
            kind,
            sailing,
            distance_nm,
            estimated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> TripTimeTable {
        TripTimeTable::new()
            .with_trip_days("L1", "U1", 0.4)
            .and_then(|t| t.with_trip_days("U1", "U2", 0.35))
            .expect("valid table")
    }

    fn id(raw: &str) -> PortId {
        PortId::new(raw)
    }

    #[rstest]
    fn split_sailing_time_chains_through_first_drop_off(table: TripTimeTable) {
        let metrics = table
            .trip_metrics(&id("L1"), &[id("U1"), id("U2")])
            .expect("legal voyage");
        let expected = days_to_duration(0.75).expect("valid duration");
        assert_eq!(metrics.sailing_time(), expected);
    }

    #[rstest]
    fn reverse_lookup_is_symmetric(table: TripTimeTable) {
        let leg = table.leg(&id("U2"), &id("U1"), LegKind::InterStop);
        assert!(!leg.estimated);
        assert_eq!(leg.sailing, days_to_duration(0.35).expect("valid duration"));
    }

    #[rstest]
    #[case(LegKind::Outbound, Duration::from_secs(43_200))]
    #[case(LegKind::InterStop, Duration::from_secs(17_280))]
    #[case(LegKind::Return, Duration::from_secs(43_200))]
    fn missing_entries_use_non_zero_fallbacks(
        table: TripTimeTable,
        #[case] kind: LegKind,
        #[case] expected: Duration,
    ) {
        let leg = table.leg(&id("L9"), &id("U9"), kind);
        assert!(leg.estimated);
        assert_eq!(leg.sailing, expected);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    #[case(400.0)]
    fn rejects_invalid_days(#[case] days: f64) {
        let err = TripTimeTable::new()
            .with_trip_days("L1", "U1", days)
            .expect_err("invalid duration");
        assert!(matches!(err, TripTableError::InvalidDuration { .. }));
    }

    #[rstest]
    fn rejects_self_loops() {
        let err = TripTimeTable::new()
            .with_trip_days("U1", "U1", 1.0)
            .expect_err("self loop");
        assert_eq!(err, TripTableError::SelfLoop { port: id("U1") });
    }

    #[rstest]
    fn distances_are_attached_to_legs(mut table: TripTimeTable) {
        table
            .insert_distance(id("L1"), id("U1"), 134.0)
            .expect("valid distance");
        let leg = table.leg(&id("U1"), &id("L1"), LegKind::Return);
        assert_eq!(leg.distance_nm, Some(134.0));
    }
}
