//! Pickup and drop-off ports with their call charges.

use thiserror::Error;

use crate::PortId;

/// Default fixed charge for a call at a pickup port.
pub const DEFAULT_PICKUP_CHARGE: f64 = 100_000.0;

/// Default fixed charge for a call at a drop-off port.
pub const DEFAULT_DROP_OFF_CHARGE: f64 = 80_000.0;

/// Whether a port loads or discharges cargo. A port never does both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PortRole {
    /// Loading port with unconstrained supply.
    Pickup,
    /// Discharge port carrying a monthly demand.
    DropOff,
}

/// A port with its role and tariff.
///
/// # Examples
///
/// ```
/// use tideway_core::{Port, PortRole};
///
/// # fn main() -> Result<(), tideway_core::PortError> {
/// let port = Port::drop_off("U1", 80_000.0)?.with_handling_rate(12.5)?;
/// assert_eq!(port.role, PortRole::DropOff);
/// assert_eq!(port.handling_rate, 12.5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Port {
    /// Unique identifier.
    pub id: PortId,
    /// Loading or discharge role.
    pub role: PortRole,
    /// Fixed charge levied per call.
    pub port_charge: f64,
    /// Charge per tonne of cargo handled.
    #[cfg_attr(feature = "serde", serde(default))]
    pub handling_rate: f64,
}

/// Errors returned by [`Port::validate`] and the [`Port`] constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortError {
    /// The identifier is blank or contains a candidate-id separator.
    #[error("port id '{port}' must be non-blank and free of ':' and '>'")]
    MalformedId {
        /// Offending identifier.
        port: PortId,
    },
    /// The per-call charge was negative or not a number.
    #[error("port {port} call charge must be non-negative, got {value}")]
    InvalidCharge {
        /// Offending port.
        port: PortId,
        /// Rejected charge.
        value: f64,
    },
    /// The per-tonne handling rate was negative or not a number.
    #[error("port {port} handling rate must be non-negative, got {value}")]
    InvalidHandlingRate {
        /// Offending port.
        port: PortId,
        /// Rejected rate.
        value: f64,
    },
}

impl Port {
    /// Validates and constructs a pickup port.
    pub fn pickup(id: impl Into<PortId>, port_charge: f64) -> Result<Self, PortError> {
        Self::new(id.into(), PortRole::Pickup, port_charge)
    }

    /// Validates and constructs a drop-off port.
    pub fn drop_off(id: impl Into<PortId>, port_charge: f64) -> Result<Self, PortError> {
        Self::new(id.into(), PortRole::DropOff, port_charge)
    }

    fn new(id: PortId, role: PortRole, port_charge: f64) -> Result<Self, PortError> {
        let port = Self {
            id,
            role,
            port_charge,
            handling_rate: 0.0,
        };
        port.validate()?;
        Ok(port)
    }

    /// Replace the handling rate, revalidating the port.
    pub fn with_handling_rate(self, handling_rate: f64) -> Result<Self, PortError> {
        let port = Self {
            handling_rate,
            ..self
        };
        port.validate()?;
        Ok(port)
    }

    /// Check the identifier and the tariff fields.
    pub fn validate(&self) -> Result<(), PortError> {
        if !self.id.is_well_formed() {
            return Err(PortError::MalformedId {
                port: self.id.clone(),
            });
        }
        if !(self.port_charge.is_finite() && self.port_charge >= 0.0) {
            return Err(PortError::InvalidCharge {
                port: self.id.clone(),
                value: self.port_charge,
            });
        }
        if !(self.handling_rate.is_finite() && self.handling_rate >= 0.0) {
            return Err(PortError::InvalidHandlingRate {
                port: self.id.clone(),
                value: self.handling_rate,
            });
        }
        Ok(())
    }
}
