//! Scheme assumptions: calendar, discounting margins, career growth,
//! macro history and the market rate cap table

mod career;
mod history;
mod rate_cap;
mod series;
pub mod loader;

pub use career::{CareerBand, CareerGrowthBands};
pub use history::HistoricalSeries;
pub use rate_cap::{tax_year_ending, CapPeriod, MarketRateCapOverlay, RateCapTable, YearMonth, MONTHS_IN_YEAR};
pub use series::{AnnualSeries, SeriesPoint, TimeSeriesProjector};
pub use loader::LoadedSeries;

use std::path::Path;

use crate::error::Result;
use crate::inputs::{BorrowerProfile, PolicyParameters};

/// Fixed years that frame every simulation
#[derive(Debug, Clone)]
pub struct SchemeCalendar {
    /// First simulated tax year
    pub start_year: i32,

    /// Default last simulated year
    pub default_end_year: i32,

    /// First forecast year: caller spreads, forecast adjustments and discounting start here
    pub projection_start_year: i32,

    /// Year whose closing balance is the face value
    pub face_value_year: i32,

    /// Year a starting-balance profile is pinned to its configured balance
    pub starting_balance_year: i32,

    /// Eligible graduation cohorts (inclusive)
    pub cohort_min_year: i32,
    pub cohort_max_year: i32,

    /// Age at which study starts
    pub entry_age: i32,

    /// Years simulated past the write-off year
    pub horizon_buffer_years: i32,

    /// Hard ceiling on the last simulated year, whatever the inputs
    pub max_end_year: i32,
}

impl Default for SchemeCalendar {
    fn default() -> Self {
        Self {
            start_year: 2013,
            default_end_year: 2060,
            projection_start_year: 2026,
            face_value_year: 2025,
            starting_balance_year: 2025,
            cohort_min_year: 2012,
            cohort_max_year: 2023,
            entry_age: 18,
            horizon_buffer_years: 2,
            max_end_year: 2200,
        }
    }
}

/// Rate constants used when projecting and discounting
#[derive(Debug, Clone)]
pub struct RateAssumptions {
    /// Fixed market discount rate
    pub market_discount_rate: f64,

    /// RPI assumed beyond the last known value
    pub long_run_rpi: f64,

    /// AWE growth when fewer than two observations exist
    pub fallback_wage_growth: f64,

    /// Government rate = RPI - margin up to and including the cutoff year
    pub government_margin_to_cutoff: f64,

    /// Government rate = RPI + margin after the cutoff year
    pub government_margin_after_cutoff: f64,

    pub government_margin_cutoff_year: i32,

    /// Balances below this snap to zero
    pub balance_epsilon: f64,
}

impl Default for RateAssumptions {
    fn default() -> Self {
        Self {
            market_discount_rate: 0.08,
            long_run_rpi: 0.021,
            fallback_wage_growth: 0.02,
            government_margin_to_cutoff: 0.0085,
            government_margin_after_cutoff: 0.0005,
            government_margin_cutoff_year: 2030,
            balance_epsilon: 0.01,
        }
    }
}

/// Container for all scheme assumptions
#[derive(Debug, Clone)]
pub struct SchemeAssumptions {
    pub calendar: SchemeCalendar,
    pub rates: RateAssumptions,
    pub career: CareerGrowthBands,
    pub history: HistoricalSeries,
    pub rate_caps: RateCapTable,
}

impl SchemeAssumptions {
    /// Plan 2 assumptions with built-in history
    pub fn default_plan2() -> Self {
        let rates = RateAssumptions::default();
        Self {
            history: HistoricalSeries::default_plan2(rates.long_run_rpi),
            calendar: SchemeCalendar::default(),
            career: CareerGrowthBands::default_plan2(),
            rate_caps: RateCapTable::default_plan2(),
            rates,
        }
    }

    /// Load series from CSV files in the default location (data/series/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_SERIES_PATH))
    }

    /// Load series from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let loaded = LoadedSeries::load_from(path)?;

        Ok(Self {
            calendar: SchemeCalendar::default(),
            rates: RateAssumptions::default(),
            career: CareerGrowthBands::default_plan2(),
            history: HistoricalSeries::from_loaded(&loaded),
            rate_caps: RateCapTable::from_periods(&loaded.cap_periods),
        })
    }

    pub fn is_eligible_cohort(&self, graduation_year: i32) -> bool {
        (self.calendar.cohort_min_year..=self.calendar.cohort_max_year).contains(&graduation_year)
    }

    /// Last simulated year: default horizon or write-off plus buffer, whichever
    /// is later; an override only ever extends it. Never beyond `max_end_year`.
    pub fn end_year(
        &self,
        profile: &BorrowerProfile,
        policy: &PolicyParameters,
        end_year_override: Option<i32>,
    ) -> i32 {
        let calendar = &self.calendar;
        let write_off_horizon = profile
            .graduation_year
            .saturating_add(policy.writeoff_years)
            .saturating_add(calendar.horizon_buffer_years);
        let base = calendar.default_end_year.max(write_off_horizon);
        let end_year = end_year_override.map_or(base, |o| base.max(o));
        end_year.min(calendar.max_end_year.max(calendar.default_end_year))
    }

    pub fn projector(&self) -> TimeSeriesProjector<'_> {
        TimeSeriesProjector::new(&self.history, &self.calendar, &self.rates)
    }

    pub fn rate_cap_overlay(&self) -> MarketRateCapOverlay<'_> {
        MarketRateCapOverlay::new(&self.rate_caps)
    }
}

impl Default for SchemeAssumptions {
    fn default() -> Self {
        Self::default_plan2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_window() {
        let scheme = SchemeAssumptions::default_plan2();
        assert!(scheme.is_eligible_cohort(2012));
        assert!(scheme.is_eligible_cohort(2023));
        assert!(!scheme.is_eligible_cohort(2011));
        assert!(!scheme.is_eligible_cohort(2025));
    }

    #[test]
    fn test_end_year() {
        let scheme = SchemeAssumptions::default_plan2();
        let profile = BorrowerProfile::default();
        let policy = PolicyParameters::default();
        assert_eq!(scheme.end_year(&profile, &policy, None), 2060);
        assert_eq!(scheme.end_year(&profile, &policy, Some(2050)), 2060);
        assert_eq!(scheme.end_year(&profile, &policy, Some(2070)), 2070);

        let long = PolicyParameters { writeoff_years: 40, ..Default::default() };
        assert_eq!(scheme.end_year(&profile, &long, None), 2060);
        let longer = PolicyParameters { writeoff_years: 45, ..Default::default() };
        assert_eq!(scheme.end_year(&profile, &longer, None), 2065);
    }

    #[test]
    fn test_end_year_is_bounded() {
        let scheme = SchemeAssumptions::default_plan2();
        let profile = BorrowerProfile::default();
        let policy = PolicyParameters::default();
        assert_eq!(scheme.end_year(&profile, &policy, Some(2_000_000_000)), 2200);
        assert_eq!(scheme.end_year(&profile, &policy, Some(i32::MIN)), 2060);

        let huge = PolicyParameters { writeoff_years: i32::MAX, ..Default::default() };
        assert_eq!(scheme.end_year(&profile, &huge, None), 2200);
        let far = BorrowerProfile { graduation_year: i32::MAX, ..Default::default() };
        assert_eq!(scheme.end_year(&far, &huge, Some(i32::MAX)), 2200);
    }

    #[test]
    fn test_csv_matches_builtin() {
        let from_csv = SchemeAssumptions::from_csv().expect("series should load");
        let builtin = SchemeAssumptions::default_plan2();
        for year in from_csv.rate_caps.tax_years() {
            assert_eq!(from_csv.rate_caps.capped_months(year), builtin.rate_caps.capped_months(year));
        }
        assert_eq!(from_csv.history.awe, builtin.history.awe);
    }
}
