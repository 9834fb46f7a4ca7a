//! Sailing times and distances between ports.
//!
//! The [`TripMetricsProvider`] trait answers leg queries from static tables.
//! A lookup never fails: a missing entry falls back to a documented constant
//! for its [`LegKind`], is flagged as estimated, and is logged as a warning.
//! [`TripTimeTable`] is the in-memory implementation fed by the CLI and the
//! test fixtures.

mod error;
mod provider;
mod table;

pub use error::{TripError, TripTableError};
pub use provider::{Leg, LegKind, MAX_DROP_OFFS, TripMetrics, TripMetricsProvider};
pub use table::{TripTimeFallbacks, TripTimeTable, days_to_duration};
