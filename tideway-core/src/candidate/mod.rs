//! Route candidates and the universe they form.
//!
//! A candidate is one fully specified voyage pattern: a vessel, one pickup
//! port and one or two drop-off ports in visiting order, together with its
//! [`VoyageEstimate`]. The [`CandidateGenerator`] enumerates every legal
//! pattern once per run.

mod generator;

use std::fmt;

pub use generator::CandidateGenerator;

use crate::{PortId, VesselId, VoyageEstimate};

/// Run-scoped identifier of a candidate, e.g. `T1:L1>U1>U2`.
///
/// Built from the vessel, pickup and ordered drop-off ids, so it is stable
/// for the duration of a run and distinguishes the two visiting orders of a
/// split voyage. Validated ids never contain [`ID_SEPARATORS`](crate::ID_SEPARATORS),
/// so distinct patterns never share an identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CandidateId(String);

impl CandidateId {
    /// Compose the identifier for a voyage pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use tideway_core::{CandidateId, PortId, VesselId};
    ///
    /// let id = CandidateId::compose(
    ///     &VesselId::new("T1"),
    ///     &PortId::new("L1"),
    ///     &[PortId::new("U2"), PortId::new("U1")],
    /// );
    /// assert_eq!(id.as_str(), "T1:L1>U2>U1");
    /// ```
    #[must_use]
    pub fn compose(vessel: &VesselId, pickup: &PortId, drop_offs: &[PortId]) -> Self {
        let mut raw = format!("{vessel}:{pickup}");
        for port in drop_offs {
            raw.push('>');
            raw.push_str(port.as_str());
        }
        Self(raw)
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shape of a voyage pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RoutePattern {
    /// One drop-off port.
    Direct,
    /// Two drop-off ports in a fixed order.
    Split,
}

/// One voyage pattern with its precomputed metrics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteCandidate {
    /// Run-scoped identifier.
    pub id: CandidateId,
    /// Owning vessel.
    pub vessel: VesselId,
    /// Loading port.
    pub pickup: PortId,
    /// Drop-off ports in visiting order.
    pub drop_offs: Vec<PortId>,
    /// Time, cost, fuel and cargo metrics.
    pub estimate: VoyageEstimate,
}

impl RouteCandidate {
    /// Direct or split.
    #[must_use]
    pub fn pattern(&self) -> RoutePattern {
        if self.drop_offs.len() > 1 {
            RoutePattern::Split
        } else {
            RoutePattern::Direct
        }
    }

    /// Whether the voyage discharges at `port`.
    #[must_use]
    pub fn serves(&self, port: &str) -> bool {
        self.drop_offs.iter().any(|p| p.as_str() == port)
    }

    /// Total cost of one execution.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.estimate.cost.total()
    }

    /// Total duration of one execution, in hours.
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.estimate.times.total_hours()
    }
}

/// Minimum, maximum and mean of a metric across candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeStats {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl RangeStats {
    #[expect(clippy::float_arithmetic, reason = "mean of a metric")]
    #[expect(clippy::cast_precision_loss, reason = "candidate counts are small")]
    fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        let (count, min, max, sum) = values.fold(
            (0_usize, f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(count, min, max, sum), value| (count + 1, min.min(value), max.max(value), sum + value),
        );
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

/// Summary of a candidate universe.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateStatistics {
    /// Number of candidates.
    pub total: usize,
    /// Candidates with one drop-off.
    pub direct: usize,
    /// Candidates with two drop-offs.
    pub split: usize,
    /// Candidates that used at least one fallback sailing time.
    pub estimated: usize,
    /// Total cost per execution, absent for an empty universe.
    pub cost: Option<RangeStats>,
    /// Distance per execution in nautical miles.
    pub distance_nm: Option<RangeStats>,
    /// Duration per execution in hours.
    pub total_hours: Option<RangeStats>,
}

/// All candidates generated for one run, in deterministic order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateUniverse {
    candidates: Vec<RouteCandidate>,
}

impl CandidateUniverse {
    /// Wrap an ordered list of candidates.
    #[must_use]
    pub const fn new(candidates: Vec<RouteCandidate>) -> Self {
        Self { candidates }
    }

    /// Candidates in generation order.
    #[must_use]
    pub fn as_slice(&self) -> &[RouteCandidate] {
        &self.candidates
    }

    /// Iterate candidates in generation order.
    pub fn iter(&self) -> std::slice::Iter<'_, RouteCandidate> {
        self.candidates.iter()
    }

    /// Candidate at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RouteCandidate> {
        self.candidates.get(index)
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the universe is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates owned by `vessel`.
    pub fn for_vessel<'a>(&'a self, vessel: &'a str) -> impl Iterator<Item = &'a RouteCandidate> + 'a {
        self.iter().filter(move |c| c.vessel.as_str() == vessel)
    }

    /// Candidates that discharge at `port`.
    pub fn serving<'a>(&'a self, port: &'a str) -> impl Iterator<Item = &'a RouteCandidate> + 'a {
        self.iter().filter(move |c| c.serves(port))
    }

    /// Counts and metric ranges across the universe.
    #[must_use]
    pub fn statistics(&self) -> CandidateStatistics {
        let split = self
            .iter()
            .filter(|c| c.pattern() == RoutePattern::Split)
            .count();
        CandidateStatistics {
            total: self.len(),
            direct: self.len() - split,
            split,
            estimated: self.iter().filter(|c| c.estimate.estimated()).count(),
            cost: RangeStats::from_values(self.iter().map(RouteCandidate::total_cost)),
            distance_nm: RangeStats::from_values(self.iter().map(|c| c.estimate.distance_nm)),
            total_hours: RangeStats::from_values(self.iter().map(RouteCandidate::total_hours)),
        }
    }
}

impl<'a> IntoIterator for &'a CandidateUniverse {
    type Item = &'a RouteCandidate;
    type IntoIter = std::slice::Iter<'a, RouteCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn range_stats_of_empty_iterator_is_none() {
        assert_eq!(RangeStats::from_values(std::iter::empty()), None);
    }

    #[rstest]
    fn range_stats_tracks_extremes_and_mean() {
        let stats = RangeStats::from_values([3.0, 1.0, 2.0].into_iter()).expect("non-empty");
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert!((stats.mean - 2.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn empty_universe_statistics() {
        let stats = CandidateUniverse::default().statistics();
        assert_eq!(stats.total, 0);
        assert!(stats.cost.is_none());
    }
}
