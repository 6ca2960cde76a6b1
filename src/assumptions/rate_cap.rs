//! Prevailing market rate (PMR) caps
//!
//! Between 2021 and 2024 the borrower rate was capped in specific calendar
//! months. Each capped month is assigned to the tax year it falls in
//! (April starts a new tax year) so annual steps can blend capped and
//! uncapped months.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::projection::LifeStage;

pub const MONTHS_IN_YEAR: usize = 12;

/// Calendar month, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Parse `YYYY-MM`
    pub fn parse(text: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", text.trim()), "%Y-%m-%d")
            .map_err(|_| ModelError::InvalidYearMonth(text.to_string()))?;
        Ok(Self::new(date.year(), date.month()))
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Tax year ending for a calendar month
pub fn tax_year_ending(date: NaiveDate) -> i32 {
    if date.month() >= 4 {
        date.year() + 1
    } else {
        date.year()
    }
}

/// Inclusive run of months capped at one rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapPeriod {
    pub start: YearMonth,
    pub end: YearMonth,
    pub rate: f64,
}

impl CapPeriod {
    pub const fn new(start: YearMonth, end: YearMonth, rate: f64) -> Self {
        Self { start, end, rate }
    }
}

const PLAN2_CAP_PERIODS: [CapPeriod; 15] = [
    CapPeriod::new(YearMonth::new(2021, 7), YearMonth::new(2021, 8), 0.053),
    CapPeriod::new(YearMonth::new(2021, 9), YearMonth::new(2021, 9), 0.042),
    CapPeriod::new(YearMonth::new(2021, 10), YearMonth::new(2021, 12), 0.041),
    CapPeriod::new(YearMonth::new(2022, 1), YearMonth::new(2022, 2), 0.044),
    CapPeriod::new(YearMonth::new(2022, 9), YearMonth::new(2022, 11), 0.063),
    CapPeriod::new(YearMonth::new(2022, 12), YearMonth::new(2023, 2), 0.065),
    CapPeriod::new(YearMonth::new(2023, 3), YearMonth::new(2023, 5), 0.069),
    CapPeriod::new(YearMonth::new(2023, 6), YearMonth::new(2023, 8), 0.071),
    CapPeriod::new(YearMonth::new(2023, 9), YearMonth::new(2023, 11), 0.073),
    CapPeriod::new(YearMonth::new(2023, 12), YearMonth::new(2023, 12), 0.075),
    CapPeriod::new(YearMonth::new(2024, 1), YearMonth::new(2024, 2), 0.076),
    CapPeriod::new(YearMonth::new(2024, 3), YearMonth::new(2024, 3), 0.077),
    CapPeriod::new(YearMonth::new(2024, 4), YearMonth::new(2024, 5), 0.078),
    CapPeriod::new(YearMonth::new(2024, 6), YearMonth::new(2024, 7), 0.079),
    CapPeriod::new(YearMonth::new(2024, 8), YearMonth::new(2024, 8), 0.08),
];

/// Capped monthly rates grouped by tax year ending. Built once, read-only after.
#[derive(Debug, Clone, Default)]
pub struct RateCapTable {
    by_tax_year: BTreeMap<i32, Vec<f64>>,
}

impl RateCapTable {
    pub fn default_plan2() -> Self {
        Self::from_periods(&PLAN2_CAP_PERIODS)
    }

    pub fn from_periods(periods: &[CapPeriod]) -> Self {
        let mut by_tax_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();

        for period in periods {
            let (Some(mut cursor), Some(end)) = (period.start.first_day(), period.end.first_day()) else {
                warn!("Skipping cap period with invalid month: {:?}", period);
                continue;
            };

            while cursor <= end {
                by_tax_year
                    .entry(tax_year_ending(cursor))
                    .or_default()
                    .push(period.rate);

                match cursor.checked_add_months(Months::new(1)) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        }

        Self { by_tax_year }
    }

    /// Capped monthly rates recorded for a tax year (possibly empty)
    pub fn capped_months(&self, tax_year_ending: i32) -> &[f64] {
        self.by_tax_year
            .get(&tax_year_ending)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_capped(&self, tax_year_ending: i32) -> bool {
        !self.capped_months(tax_year_ending).is_empty()
    }

    /// Blend capped months with the candidate rate for the remaining months
    pub fn blend(&self, tax_year_ending: i32, candidate: f64) -> f64 {
        let capped = self.capped_months(tax_year_ending);
        if capped.is_empty() {
            return candidate;
        }

        let capped_sum: f64 = capped.iter().sum();
        let uncapped_months = MONTHS_IN_YEAR.saturating_sub(capped.len()) as f64;
        (capped_sum + uncapped_months * candidate) / MONTHS_IN_YEAR as f64
    }

    pub fn tax_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_tax_year.keys().copied()
    }
}

/// Applies the cap table to a candidate borrower rate
#[derive(Debug, Clone, Copy)]
pub struct MarketRateCapOverlay<'a> {
    table: &'a RateCapTable,
}

impl<'a> MarketRateCapOverlay<'a> {
    pub fn new(table: &'a RateCapTable) -> Self {
        Self { table }
    }

    /// Only positive rates outside write-off are capped; anything else passes through
    pub fn apply(&self, tax_year_ending: i32, candidate: f64, stage: LifeStage) -> f64 {
        if candidate > 0.0 && stage != LifeStage::WrittenOff {
            self.table.blend(tax_year_ending, candidate)
        } else {
            candidate
        }
    }

    pub fn is_capped(&self, tax_year_ending: i32) -> bool {
        self.table.is_capped(tax_year_ending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tax_year_assignment() {
        let table = RateCapTable::default_plan2();
        // Jul 2021 - Feb 2022 -> tax year ending 2022
        assert_eq!(table.capped_months(2022).len(), 8);
        // Sep 2022 - Mar 2023 -> 2023
        assert_eq!(table.capped_months(2023).len(), 7);
        // Apr 2023 - Mar 2024 -> 2024 (every month capped)
        assert_eq!(table.capped_months(2024).len(), 12);
        // Apr 2024 - Aug 2024 -> 2025
        assert_eq!(table.capped_months(2025).len(), 5);
        assert!(table.capped_months(2021).is_empty());
        assert_eq!(table.tax_years().collect::<Vec<_>>(), vec![2022, 2023, 2024, 2025]);
    }

    #[test]
    fn test_blend_weights_capped_months() {
        let table = RateCapTable::default_plan2();
        let candidate = 0.097;
        let expected = (3.0 * 0.063 + 3.0 * 0.065 + 0.069 + 5.0 * candidate) / 12.0;
        assert_relative_eq!(table.blend(2023, candidate), expected, epsilon = 1e-12);

        let blended = table.blend(2023, candidate);
        assert!(blended < candidate && blended > 0.063);
    }

    #[test]
    fn test_fully_capped_year_ignores_candidate() {
        let table = RateCapTable::default_plan2();
        assert_relative_eq!(table.blend(2024, 0.5), table.blend(2024, 0.01), epsilon = 1e-12);
    }

    #[test]
    fn test_overlay_pass_through() {
        let table = RateCapTable::default_plan2();
        let overlay = MarketRateCapOverlay::new(&table);
        assert_eq!(overlay.apply(2030, 0.05, LifeStage::LiableToRepay), 0.05);
        assert_eq!(overlay.apply(2023, 0.0, LifeStage::LiableToRepay), 0.0);
        assert_eq!(overlay.apply(2023, 0.09, LifeStage::WrittenOff), 0.09);
        assert!(overlay.apply(2023, 0.09, LifeStage::Studying) < 0.09);
    }

    #[test]
    fn test_parse_year_month() {
        assert_eq!(YearMonth::parse("2022-09").unwrap(), YearMonth::new(2022, 9));
        assert!(YearMonth::parse("2022-13").is_err());
    }
}
