use thiserror::Error;

use crate::PortId;

/// Errors from [`crate::trip::TripMetricsProvider::trip_metrics`].
///
/// Every variant describes a structurally illegal voyage pattern. The
/// candidate generator drops such patterns instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    /// The voyage visits no drop-off port.
    #[error("a voyage must visit at least one drop-off port")]
    NoDropOffs,
    /// The voyage visits more drop-off ports than allowed.
    #[error("a voyage may visit at most {max} drop-off ports, got {count}")]
    TooManyDropOffs {
        /// Requested drop-off count.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },
    /// The pickup port also appears as a drop-off.
    #[error("pickup port {port} cannot also be a drop-off")]
    PickupInDropOffs {
        /// Offending port.
        port: PortId,
    },
    /// A drop-off port appears twice.
    #[error("drop-off port {port} is visited more than once")]
    DuplicateDropOff {
        /// Repeated port.
        port: PortId,
    },
}

/// Errors raised while populating a [`crate::trip::TripTimeTable`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripTableError {
    /// A sailing time was zero, negative, too large or not a number.
    #[error("sailing time {from} -> {to} must be a positive number of days, got {days}")]
    InvalidDuration {
        /// Origin port.
        from: PortId,
        /// Destination port.
        to: PortId,
        /// Rejected value in days.
        days: f64,
    },
    /// A distance was negative or not a number.
    #[error("distance {from} -> {to} must be a non-negative number of nautical miles, got {nautical_miles}")]
    InvalidDistance {
        /// Origin port.
        from: PortId,
        /// Destination port.
        to: PortId,
        /// Rejected distance.
        nautical_miles: f64,
    },
    /// A leg started and ended at the same port.
    #[error("trip table entry {port} -> {port} is a self loop")]
    SelfLoop {
        /// Port on both ends.
        port: PortId,
    },
}
