//! Enumerate every legal voyage pattern for a fleet.

use log::{info, warn};
use rayon::prelude::*;

use crate::trip::TripMetricsProvider;
use crate::{Port, PortId, Vessel, VoyageCostModel};

use super::{CandidateId, CandidateUniverse, RouteCandidate};

/// Builds the candidate universe for one run.
///
/// For every available vessel and pickup port the generator emits one
/// direct candidate per drop-off port, then two split candidates (one per
/// visiting order) per unordered pair of drop-off ports. Work is partitioned
/// by vessel and run on the rayon pool; the output order does not depend on
/// scheduling.
///
/// # Examples
///
/// ```
/// use tideway_core::{
///     CandidateGenerator, Port, TripTimeTable, Vessel, VoyageCostModel, VoyageParameters,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = TripTimeTable::new();
/// let model = VoyageCostModel::new(VoyageParameters::default());
/// let generator = CandidateGenerator::new(&table, &model);
///
/// let vessels = vec![Vessel::new("T1", 50_000.0, 1.0, 1.0)?];
/// let pickups = vec![Port::pickup("L1", 0.0)?];
/// let drop_offs = vec![
///     Port::drop_off("U1", 0.0)?,
///     Port::drop_off("U2", 0.0)?,
///     Port::drop_off("U3", 0.0)?,
/// ];
/// let universe = generator.generate(&vessels, &pickups, &drop_offs);
/// // 3 directs + 3 pairs x 2 orders
/// assert_eq!(universe.len(), 9);
/// # Ok(())
/// # }
/// ```
pub struct CandidateGenerator<'a> {
    provider: &'a dyn TripMetricsProvider,
    model: &'a VoyageCostModel,
}

impl<'a> CandidateGenerator<'a> {
    /// Create a generator over a trip-metrics provider and cost model.
    #[must_use]
    pub const fn new(provider: &'a dyn TripMetricsProvider, model: &'a VoyageCostModel) -> Self {
        Self { provider, model }
    }

    /// Generate the full universe.
    ///
    /// Returns an empty universe when either port list is empty. Vessels that
    /// are not available are skipped with a warning.
    #[must_use]
    pub fn generate(&self, vessels: &[Vessel], pickups: &[Port], drop_offs: &[Port]) -> CandidateUniverse {
        if pickups.is_empty() || drop_offs.is_empty() {
            warn!(
                "no candidates generated: {} pickup and {} drop-off ports",
                pickups.len(),
                drop_offs.len()
            );
            return CandidateUniverse::default();
        }
        let available: Vec<&Vessel> = vessels
            .iter()
            .filter(|vessel| {
                if !vessel.is_available() {
                    warn!("skipping vessel {} with status {:?}", vessel.id, vessel.status);
                }
                vessel.is_available()
            })
            .collect();

        let patterns = voyage_patterns(drop_offs);
        let candidates: Vec<RouteCandidate> = available
            .par_iter()
            .map(|vessel| self.for_vessel(vessel, pickups, &patterns))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        info!(
            "generated {} candidates for {} vessels",
            candidates.len(),
            available.len()
        );
        CandidateUniverse::new(candidates)
    }

    fn for_vessel(&self, vessel: &Vessel, pickups: &[Port], patterns: &[Vec<&Port>]) -> Vec<RouteCandidate> {
        pickups
            .iter()
            .flat_map(|pickup| {
                patterns
                    .iter()
                    .filter_map(move |stops| self.candidate(vessel, pickup, stops))
            })
            .collect()
    }

    fn candidate(&self, vessel: &Vessel, pickup: &Port, stops: &[&Port]) -> Option<RouteCandidate> {
        let drop_offs: Vec<PortId> = stops.iter().map(|port| port.id.clone()).collect();
        let id = CandidateId::compose(&vessel.id, &pickup.id, &drop_offs);
        match self.model.estimate(self.provider, vessel, pickup, stops) {
            Ok(estimate) => Some(RouteCandidate {
                id,
                vessel: vessel.id.clone(),
                pickup: pickup.id.clone(),
                drop_offs,
                estimate,
            }),
            Err(err) => {
                warn!("dropping candidate {id}: {err}");
                None
            }
        }
    }
}

/// Drop-off sequences: all directs, then both orders of every pair.
fn voyage_patterns(drop_offs: &[Port]) -> Vec<Vec<&Port>> {
    let directs = drop_offs.iter().map(|port| vec![port]);
    let splits = drop_offs.iter().enumerate().flat_map(|(i, first)| {
        drop_offs
            .iter()
            .skip(i + 1)
            .flat_map(move |second| [vec![first, second], vec![second, first]])
    });
    directs.chain(splits).collect()
}
