//! Vessel roster entries and their validation rules.

use thiserror::Error;

use crate::VesselId;

/// Upper bound on a vessel's monthly operating hours (30 days).
pub const MAX_MONTHLY_HOURS: f64 = 720.0;

/// Operational state of a vessel at planning time.
///
/// Only [`VesselStatus::Available`] vessels take part in candidate
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VesselStatus {
    /// Free to be scheduled.
    #[default]
    Available,
    /// Underway on an existing voyage.
    InTransit,
    /// Alongside a berth taking on cargo.
    Loading,
    /// Alongside a berth discharging cargo.
    Unloading,
    /// Out of service for planned maintenance.
    Maintenance,
    /// Withdrawn from service for any other reason.
    Unavailable,
}

/// Bunker fuel burned by a vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum FuelType {
    /// Heavy fuel oil.
    #[default]
    Hfo,
    /// Marine diesel oil.
    Mdo,
    /// Marine gas oil.
    Mgo,
    /// Liquefied natural gas.
    Lng,
}

impl FuelType {
    /// Tonnes of CO2 emitted per tonne of fuel burned.
    #[must_use]
    pub const fn carbon_factor(self) -> f64 {
        match self {
            Self::Hfo => 3.114,
            Self::Mdo | Self::Mgo => 3.206,
            Self::Lng => 2.75,
        }
    }
}

/// A vessel in the fleet roster.
///
/// Vessels are immutable for the duration of an optimization run.
///
/// # Examples
///
/// ```
/// use tideway_core::{Vessel, VesselStatus};
///
/// # fn main() -> Result<(), tideway_core::VesselError> {
/// let vessel = Vessel::new("T8", 25_000.0, 3_200_000.0, 15.0)?
///     .with_monthly_hours(600.0)?;
/// assert_eq!(vessel.status, VesselStatus::Available);
/// assert!(vessel.is_available());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vessel {
    /// Unique identifier.
    pub id: VesselId,
    /// Cargo capacity in metric tonnes.
    pub capacity_mt: f64,
    /// Charter or operating cost per day.
    pub daily_rate: f64,
    /// Fuel burned per sailing day, in metric tonnes.
    pub fuel_per_day_mt: f64,
    /// Operating hours available in the planning month.
    #[cfg_attr(feature = "serde", serde(default = "default_monthly_hours"))]
    pub monthly_hours: f64,
    /// Current operational state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: VesselStatus,
    /// Fuel burned by the main engine.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fuel_type: FuelType,
}

#[cfg(feature = "serde")]
const fn default_monthly_hours() -> f64 {
    MAX_MONTHLY_HOURS
}

/// Errors returned by [`Vessel::validate`] and the [`Vessel`] constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VesselError {
    /// The identifier is blank or contains a candidate-id separator.
    #[error("vessel id '{vessel}' must be non-blank and free of ':' and '>'")]
    MalformedId {
        /// Offending identifier.
        vessel: VesselId,
    },
    /// Capacity was zero, negative or not a number.
    #[error("vessel {vessel} capacity must be positive, got {value}")]
    NonPositiveCapacity {
        /// Offending vessel.
        vessel: VesselId,
        /// Rejected capacity.
        value: f64,
    },
    /// Daily rate was negative or not a number.
    #[error("vessel {vessel} daily rate must be non-negative, got {value}")]
    InvalidDailyRate {
        /// Offending vessel.
        vessel: VesselId,
        /// Rejected rate.
        value: f64,
    },
    /// Fuel burn was negative or not a number.
    #[error("vessel {vessel} fuel burn must be non-negative, got {value}")]
    InvalidFuelBurn {
        /// Offending vessel.
        vessel: VesselId,
        /// Rejected burn rate.
        value: f64,
    },
    /// Monthly hours fell outside `(0, 720]`.
    #[error("vessel {vessel} monthly hours must be in (0, {MAX_MONTHLY_HOURS}], got {value}")]
    InvalidMonthlyHours {
        /// Offending vessel.
        vessel: VesselId,
        /// Rejected hours.
        value: f64,
    },
}

impl Vessel {
    /// Validates and constructs an available HFO vessel with a full month of
    /// operating hours.
    pub fn new(
        id: impl Into<VesselId>,
        capacity_mt: f64,
        daily_rate: f64,
        fuel_per_day_mt: f64,
    ) -> Result<Self, VesselError> {
        let vessel = Self {
            id: id.into(),
            capacity_mt,
            daily_rate,
            fuel_per_day_mt,
            monthly_hours: MAX_MONTHLY_HOURS,
            status: VesselStatus::Available,
            fuel_type: FuelType::Hfo,
        };
        vessel.validate()?;
        Ok(vessel)
    }

    /// Replace the monthly operating hours, revalidating the vessel.
    pub fn with_monthly_hours(self, monthly_hours: f64) -> Result<Self, VesselError> {
        let vessel = Self {
            monthly_hours,
            ..self
        };
        vessel.validate()?;
        Ok(vessel)
    }

    /// Replace the operational status.
    #[must_use]
    pub fn with_status(self, status: VesselStatus) -> Self {
        Self { status, ..self }
    }

    /// Replace the fuel type.
    #[must_use]
    pub fn with_fuel_type(self, fuel_type: FuelType) -> Self {
        Self { fuel_type, ..self }
    }

    /// Whether the vessel may be scheduled in this run.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == VesselStatus::Available
    }

    /// Check the identifier and every numeric field.
    ///
    /// Deserialised vessels bypass the constructors, so callers validate
    /// them before use.
    pub fn validate(&self) -> Result<(), VesselError> {
        let vessel = || self.id.clone();
        if !self.id.is_well_formed() {
            return Err(VesselError::MalformedId { vessel: vessel() });
        }
        if !(self.capacity_mt.is_finite() && self.capacity_mt > 0.0) {
            return Err(VesselError::NonPositiveCapacity {
                vessel: vessel(),
                value: self.capacity_mt,
            });
        }
        if !(self.daily_rate.is_finite() && self.daily_rate >= 0.0) {
            return Err(VesselError::InvalidDailyRate {
                vessel: vessel(),
                value: self.daily_rate,
            });
        }
        if !(self.fuel_per_day_mt.is_finite() && self.fuel_per_day_mt >= 0.0) {
            return Err(VesselError::InvalidFuelBurn {
                vessel: vessel(),
                value: self.fuel_per_day_mt,
            });
        }
        if !(self.monthly_hours > 0.0 && self.monthly_hours <= MAX_MONTHLY_HOURS) {
            return Err(VesselError::InvalidMonthlyHours {
                vessel: vessel(),
                value: self.monthly_hours,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_vessel_defaults_to_full_month() {
        let vessel = Vessel::new("T1", 50_000.0, 6_300_000.0, 25.0).expect("valid vessel");
        assert_eq!(vessel.monthly_hours, MAX_MONTHLY_HOURS);
        assert_eq!(vessel.fuel_type, FuelType::Hfo);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn rejects_non_positive_capacity(#[case] capacity: f64) {
        let err = Vessel::new("T1", capacity, 1.0, 1.0).expect_err("capacity must be positive");
        assert!(matches!(err, VesselError::NonPositiveCapacity { .. }));
    }

    #[rstest]
    #[case("A:B")]
    #[case("T1>T2")]
    #[case("")]
    fn rejects_malformed_ids(#[case] id: &str) {
        let err = Vessel::new(id, 1.0, 1.0, 1.0).expect_err("id must be well formed");
        assert_eq!(err, VesselError::MalformedId { vessel: VesselId::new(id) });
    }

    #[rstest]
    #[case(0.0)]
    #[case(720.5)]
    fn rejects_out_of_range_hours(#[case] hours: f64) {
        let vessel = Vessel::new("T1", 1.0, 1.0, 1.0).expect("valid vessel");
        let err = vessel
            .with_monthly_hours(hours)
            .expect_err("hours outside (0, 720]");
        assert!(matches!(err, VesselError::InvalidMonthlyHours { .. }));
    }

    #[rstest]
    fn accepts_boundary_hours() {
        let vessel = Vessel::new("T1", 1.0, 1.0, 1.0).expect("valid vessel");
        assert!(vessel.with_monthly_hours(720.0).is_ok());
    }

    #[rstest]
    fn maintenance_vessel_is_not_available() {
        let vessel = Vessel::new("T1", 1.0, 1.0, 1.0)
            .expect("valid vessel")
            .with_status(VesselStatus::Maintenance);
        assert!(!vessel.is_available());
    }

    #[rstest]
    #[case(FuelType::Hfo, 3.114)]
    #[case(FuelType::Mgo, 3.206)]
    #[case(FuelType::Lng, 2.75)]
    fn carbon_factors_match_imo_defaults(#[case] fuel: FuelType, #[case] factor: f64) {
        assert!((fuel.carbon_factor() - factor).abs() < f64::EPSILON);
    }
}
