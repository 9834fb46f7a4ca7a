//! Operational notes attached to feasible results.

use log::info;

use crate::{Extraction, PortId, VesselId};

/// What an advisory is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AdvisoryKind {
    /// Fleet utilization below the low watermark.
    UnderUtilizedFleet,
    /// Fleet utilization above the high watermark.
    SaturatedFleet,
    /// A vessel with candidates sails no voyage.
    IdleVessel,
    /// A port received less than it required.
    UnmetDemand,
}

/// One operational note.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Advisory {
    /// Category.
    pub kind: AdvisoryKind,
    /// Human-readable explanation.
    pub message: String,
}

/// Derives [`Advisory`] values from an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetAdvisor {
    /// Utilization percentage below which the fleet is under-used.
    pub low_utilization_pct: f64,
    /// Utilization percentage above which the fleet has no slack.
    pub high_utilization_pct: f64,
}

impl Default for FleetAdvisor {
    fn default() -> Self {
        Self {
            low_utilization_pct: 70.0,
            high_utilization_pct: 95.0,
        }
    }
}

impl FleetAdvisor {
    /// Advisories for `extraction`, fleet-wide notes first.
    #[must_use]
    pub fn advise(&self, extraction: &Extraction) -> Vec<Advisory> {
        let utilization = extraction.kpis.fleet_utilization_pct;
        let fleet = if utilization < self.low_utilization_pct {
            Some(Advisory {
                kind: AdvisoryKind::UnderUtilizedFleet,
                message: format!(
                    "fleet utilization is {utilization:.1}%; consider releasing vessels or taking more cargo"
                ),
            })
        } else if utilization > self.high_utilization_pct {
            Some(Advisory {
                kind: AdvisoryKind::SaturatedFleet,
                message: format!(
                    "fleet utilization is {utilization:.1}%; delays will cascade without spare capacity"
                ),
            })
        } else {
            None
        };

        let idle = extraction
            .schedules
            .iter()
            .filter(|schedule| schedule.voyages == 0)
            .map(|schedule| idle_vessel(&schedule.vessel));
        let unmet = extraction.deliveries.iter().filter_map(|delivery| {
            unmet_demand(&delivery.port, delivery.demand_mt, delivery.delivered_mt)
        });

        let advisories: Vec<Advisory> = fleet.into_iter().chain(idle).chain(unmet).collect();
        if !advisories.is_empty() {
            info!("{} advisories on the schedule", advisories.len());
        }
        advisories
    }
}

fn idle_vessel(vessel: &VesselId) -> Advisory {
    Advisory {
        kind: AdvisoryKind::IdleVessel,
        message: format!("vessel {vessel} has no voyages this period"),
    }
}

#[expect(clippy::float_arithmetic, reason = "shortfall in tonnes")]
fn unmet_demand(port: &PortId, demand_mt: f64, delivered_mt: f64) -> Option<Advisory> {
    let shortfall = demand_mt - delivered_mt;
    (shortfall > 0.0).then(|| Advisory {
        kind: AdvisoryKind::UnmetDemand,
        message: format!("port {port} is short by {shortfall:.1} t"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FleetKpis, PortDelivery, ScaledTotals, VesselSchedule};
    use rstest::rstest;

    fn extraction(utilization: f64, voyages: u32, delivered_mt: f64) -> Extraction {
        Extraction {
            selected: Vec::new(),
            deliveries: vec![PortDelivery {
                port: PortId::new("U1"),
                demand_mt: 40_000.0,
                delivered_mt,
                satisfaction_pct: 100.0,
            }],
            schedules: vec![VesselSchedule {
                vessel: VesselId::new("T1"),
                voyages,
                utilized_hours: 0.0,
                available_hours: 720.0,
                utilization_pct: utilization,
                timeline: Vec::new(),
            }],
            kpis: FleetKpis {
                fleet_utilization_pct: utilization,
                ..FleetKpis::default()
            },
            scaled: ScaledTotals::default(),
            objective_units: None,
        }
    }

    #[rstest]
    #[case(50.0, Some(AdvisoryKind::UnderUtilizedFleet))]
    #[case(80.0, None)]
    #[case(97.0, Some(AdvisoryKind::SaturatedFleet))]
    fn utilization_watermarks(#[case] utilization: f64, #[case] expected: Option<AdvisoryKind>) {
        let advisories = FleetAdvisor::default().advise(&extraction(utilization, 1, 40_000.0));
        assert_eq!(advisories.first().map(|a| a.kind), expected);
    }

    #[rstest]
    fn idle_vessel_and_shortfall_are_reported() {
        let kinds: Vec<AdvisoryKind> = FleetAdvisor::default()
            .advise(&extraction(80.0, 0, 39_000.0))
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(kinds, vec![AdvisoryKind::IdleVessel, AdvisoryKind::UnmetDemand]);
    }
}
