//! Read-only access to the fleet roster, port lists and demand.
//!
//! The optimizer never loads or persists data itself. Callers hand it a
//! [`FleetDataProvider`], typically an [`InMemoryFleet`] built from a
//! scenario file or a database snapshot.

use crate::{Demand, Port, PortRole, Vessel};

/// Source of the static inputs for one optimization run.
///
/// # Examples
///
/// ```rust
/// use tideway_core::{Demand, FleetDataProvider, InMemoryFleet, Port, Vessel};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fleet = InMemoryFleet::new(
///     vec![Vessel::new("T1", 50_000.0, 6_300_000.0, 25.0)?],
///     vec![Port::pickup("L1", 100_000.0)?, Port::drop_off("U1", 80_000.0)?],
///     Demand::new([("U1", 40_000.0)])?,
/// );
/// assert_eq!(fleet.pickup_ports().len(), 1);
/// assert_eq!(fleet.drop_off_ports().len(), 1);
/// # Ok(())
/// # }
/// ```
pub trait FleetDataProvider {
    /// Vessel roster in planning order.
    fn vessels(&self) -> &[Vessel];
    /// Ports where cargo is loaded.
    fn pickup_ports(&self) -> &[Port];
    /// Ports where cargo is discharged.
    fn drop_off_ports(&self) -> &[Port];
    /// Required mass per drop-off port.
    fn demand(&self) -> &Demand;
}

/// [`FleetDataProvider`] holding everything in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryFleet {
    vessels: Vec<Vessel>,
    pickup_ports: Vec<Port>,
    drop_off_ports: Vec<Port>,
    demand: Demand,
}

impl InMemoryFleet {
    /// Build a fleet, splitting `ports` by role while keeping their order.
    #[must_use]
    pub fn new(vessels: Vec<Vessel>, ports: Vec<Port>, demand: Demand) -> Self {
        let (pickup_ports, drop_off_ports) = ports
            .into_iter()
            .partition(|port| port.role == PortRole::Pickup);
        Self {
            vessels,
            pickup_ports,
            drop_off_ports,
            demand,
        }
    }
}

impl FleetDataProvider for InMemoryFleet {
    fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    fn pickup_ports(&self) -> &[Port] {
        &self.pickup_ports
    }

    fn drop_off_ports(&self) -> &[Port] {
        &self.drop_off_ports
    }

    fn demand(&self) -> &Demand {
        &self.demand
    }
}
