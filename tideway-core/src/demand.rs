//! Monthly demand per drop-off port.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::PortId;

/// Required mass per drop-off port for the planning period.
///
/// Entries are kept in port order so model rows are built deterministically.
///
/// # Examples
///
/// ```
/// use tideway_core::Demand;
///
/// # fn main() -> Result<(), tideway_core::DemandError> {
/// let demand = Demand::new([("U1", 40_000.0), ("U2", 25_000.0)])?;
/// assert_eq!(demand.total(), 65_000.0);
/// assert_eq!(demand.get("U3"), 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "BTreeMap<PortId, f64>",
        into = "BTreeMap<PortId, f64>"
    )
)]
pub struct Demand {
    entries: BTreeMap<PortId, f64>,
}

/// Errors returned by [`Demand::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DemandError {
    /// A port's demand was negative or not a number.
    #[error("demand at {port} must be a non-negative number, got {value}")]
    Invalid {
        /// Offending port.
        port: PortId,
        /// Rejected mass.
        value: f64,
    },
    /// The same port appeared twice.
    #[error("demand for {port} was given more than once")]
    Duplicate {
        /// Repeated port.
        port: PortId,
    },
}

impl Demand {
    /// Validates and constructs a demand vector.
    pub fn new<I, P>(entries: I) -> Result<Self, DemandError>
    where
        I: IntoIterator<Item = (P, f64)>,
        P: Into<PortId>,
    {
        let mut map = BTreeMap::new();
        for (port, mass) in entries {
            let port = port.into();
            if !(mass.is_finite() && mass >= 0.0) {
                return Err(DemandError::Invalid { port, value: mass });
            }
            if map.contains_key(&port) {
                return Err(DemandError::Duplicate { port });
            }
            map.insert(port, mass);
        }
        Ok(Self { entries: map })
    }

    /// Required mass at `port`, zero when the port has no entry.
    #[must_use]
    pub fn get(&self, port: &str) -> f64 {
        self.entries.get(port).copied().unwrap_or(0.0)
    }

    /// Sum of all entries.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Iterate `(port, mass)` pairs in port order.
    pub fn iter(&self) -> impl Iterator<Item = (&PortId, f64)> + '_ {
        self.entries.iter().map(|(port, mass)| (port, *mass))
    }

    /// Iterate ports with strictly positive demand.
    pub fn positive(&self) -> impl Iterator<Item = (&PortId, f64)> + '_ {
        self.iter().filter(|(_, mass)| *mass > 0.0)
    }

    /// Number of ports with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no port has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Port holding the largest demand, ties resolved by port order.
    #[must_use]
    pub fn largest(&self) -> Option<(&PortId, f64)> {
        self.iter()
            .fold(None, |best: Option<(&PortId, f64)>, (port, mass)| match best {
                Some((_, best_mass)) if best_mass >= mass => best,
                _ => Some((port, mass)),
            })
    }
}

impl TryFrom<BTreeMap<PortId, f64>> for Demand {
    type Error = DemandError;

    fn try_from(value: BTreeMap<PortId, f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Demand> for BTreeMap<PortId, f64> {
    fn from(value: Demand) -> Self {
        value.entries
    }
}
