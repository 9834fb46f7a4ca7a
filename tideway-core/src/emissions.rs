//! Fuel, CO2 and Energy Efficiency Operational Indicator (EEOI) reporting.
//!
//! `EEOI = (fuel * carbon factor) / (cargo * distance)`, expressed in grams of
//! CO2 per tonne-nautical-mile.

use crate::FuelType;

/// Carbon price per tonne of CO2 used for the cost estimate.
pub const DEFAULT_CARBON_PRICE_PER_T: f64 = 2_000.0;

const GRAMS_PER_TONNE: f64 = 1_000_000.0;

/// Efficiency band of an EEOI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EeoiRating {
    /// At most 8 g/t-nm.
    Excellent,
    /// At most 12 g/t-nm.
    Good,
    /// At most 16 g/t-nm.
    Average,
    /// At most 20 g/t-nm.
    Poor,
    /// Above 20 g/t-nm.
    VeryPoor,
}

impl EeoiRating {
    /// Classify an EEOI value.
    ///
    /// # Examples
    ///
    /// ```
    /// use tideway_core::EeoiRating;
    ///
    /// assert_eq!(EeoiRating::from_eeoi(8.0), EeoiRating::Excellent);
    /// assert_eq!(EeoiRating::from_eeoi(12.5), EeoiRating::Average);
    /// assert_eq!(EeoiRating::from_eeoi(21.0), EeoiRating::VeryPoor);
    /// ```
    #[must_use]
    pub fn from_eeoi(eeoi: f64) -> Self {
        if eeoi <= 8.0 {
            Self::Excellent
        } else if eeoi <= 12.0 {
            Self::Good
        } else if eeoi <= 16.0 {
            Self::Average
        } else if eeoi <= 20.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }
}

/// Fleet emissions for a set of scheduled voyages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmissionsReport {
    /// Fuel burned, in tonnes.
    pub fuel_mt: f64,
    /// CO2 emitted, in tonnes.
    pub co2_t: f64,
    /// Cargo mass times distance sailed.
    pub cargo_tonne_miles: f64,
    /// Grams of CO2 per tonne-mile; absent when no transport work was done.
    pub eeoi: Option<f64>,
    /// Band of `eeoi`.
    pub rating: Option<EeoiRating>,
    /// CO2 priced at the carbon price.
    pub carbon_cost: f64,
}

/// Running totals from which an [`EmissionsReport`] is derived.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmissionsAccumulator {
    fuel_mt: f64,
    co2_t: f64,
    cargo_tonne_miles: f64,
}

impl EmissionsAccumulator {
    /// Add `executions` repetitions of one voyage.
    #[expect(clippy::float_arithmetic, reason = "emission totals are continuous")]
    pub fn add_voyage(
        &mut self,
        fuel_type: FuelType,
        fuel_mt: f64,
        cargo_mt: f64,
        distance_nm: f64,
        executions: f64,
    ) {
        let fuel = fuel_mt * executions;
        self.fuel_mt += fuel;
        self.co2_t += fuel * fuel_type.carbon_factor();
        self.cargo_tonne_miles += cargo_mt * distance_nm * executions;
    }

    /// Produce the report, pricing CO2 at `carbon_price_per_t`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tideway_core::{EeoiRating, EmissionsAccumulator, FuelType};
    ///
    /// let mut totals = EmissionsAccumulator::default();
    /// totals.add_voyage(FuelType::Hfo, 10.0, 50_000.0, 300.0, 1.0);
    /// let report = totals.report(2_000.0);
    /// assert!((report.co2_t - 31.14).abs() < 1e-9);
    /// assert_eq!(report.rating, Some(EeoiRating::Excellent));
    /// ```
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "emission ratios are continuous")]
    pub fn report(&self, carbon_price_per_t: f64) -> EmissionsReport {
        let eeoi = (self.cargo_tonne_miles > 0.0)
            .then(|| self.co2_t * GRAMS_PER_TONNE / self.cargo_tonne_miles);
        EmissionsReport {
            fuel_mt: self.fuel_mt,
            co2_t: self.co2_t,
            cargo_tonne_miles: self.cargo_tonne_miles,
            eeoi,
            rating: eeoi.map(EeoiRating::from_eeoi),
            carbon_cost: self.co2_t * carbon_price_per_t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(7.9, EeoiRating::Excellent)]
    #[case(12.0, EeoiRating::Good)]
    #[case(15.0, EeoiRating::Average)]
    #[case(20.0, EeoiRating::Poor)]
    #[case(20.1, EeoiRating::VeryPoor)]
    fn rating_bands(#[case] eeoi: f64, #[case] expected: EeoiRating) {
        assert_eq!(EeoiRating::from_eeoi(eeoi), expected);
    }

    #[rstest]
    fn no_transport_work_has_no_eeoi() {
        let report = EmissionsAccumulator::default().report(DEFAULT_CARBON_PRICE_PER_T);
        assert_eq!(report.eeoi, None);
        assert_eq!(report.rating, None);
    }

    #[rstest]
    fn lng_emits_less_than_hfo() {
        let mut hfo = EmissionsAccumulator::default();
        hfo.add_voyage(FuelType::Hfo, 10.0, 1.0, 1.0, 2.0);
        let mut lng = EmissionsAccumulator::default();
        lng.add_voyage(FuelType::Lng, 10.0, 1.0, 1.0, 2.0);
        assert!(lng.report(0.0).co2_t < hfo.report(0.0).co2_t);
        assert!((hfo.report(0.0).fuel_mt - 20.0).abs() < 1e-9);
    }
}
