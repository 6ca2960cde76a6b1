//! Annual macro series projection
//!
//! Each series is resolved year by year through a fixed rule order:
//! known value, clamp before history, extrapolate after history, and an
//! interior-gap fallback. Thresholds get the policy's forecast adjustment
//! from the projection start year onward.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::history::HistoricalSeries;
use super::{RateAssumptions, SchemeCalendar};
use crate::inputs::{forecast_factor, PolicyParameters};

/// Resolved series values for one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub year: i32,
    pub rpi: f64,
    pub awe: f64,
    pub low_rate: f64,
    pub high_rate: f64,
    pub government_rate: f64,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
}

/// Contiguous, ascending annual series for one simulation run
#[derive(Debug, Clone)]
pub struct AnnualSeries {
    first_year: i32,
    points: Vec<SeriesPoint>,
}

impl AnnualSeries {
    pub fn get(&self, year: i32) -> Option<&SeriesPoint> {
        let idx = year.checked_sub(self.first_year)?;
        usize::try_from(idx).ok().and_then(|i| self.points.get(i))
    }

    /// AWE[year] / AWE[year - 1]; 1.0 when either year is outside the run
    pub fn wage_ratio(&self, year: i32) -> f64 {
        match (self.get(year), self.get(year - 1)) {
            (Some(cur), Some(prev)) if prev.awe > 0.0 => cur.awe / prev.awe,
            _ => 1.0,
        }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }
}

/// Where a year sits relative to a series' known history
#[derive(Debug, Clone, Copy, PartialEq)]
enum SeriesRule {
    Known(f64),
    BeforeHistory(f64),
    AfterHistory,
    Gap,
}

fn classify(year: i32, known: &BTreeMap<i32, f64>) -> SeriesRule {
    if let Some(&value) = known.get(&year) {
        return SeriesRule::Known(value);
    }
    match (known.iter().next(), known.keys().next_back()) {
        (Some((&first, &first_value)), _) if year < first => SeriesRule::BeforeHistory(first_value),
        (_, Some(&last)) if year > last => SeriesRule::AfterHistory,
        (None, None) => SeriesRule::AfterHistory,
        _ => SeriesRule::Gap,
    }
}

/// Trailing year-over-year AWE growth from the last two observations
fn trailing_growth(awe: &BTreeMap<i32, f64>, fallback: f64) -> f64 {
    let mut tail = awe.values().rev();
    match (tail.next(), tail.next()) {
        (Some(&last), Some(&prev)) => last / prev.max(1.0) - 1.0,
        _ => fallback,
    }
}

/// Builds [`AnnualSeries`] from history and policy
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesProjector<'a> {
    history: &'a HistoricalSeries,
    calendar: &'a SchemeCalendar,
    rates: &'a RateAssumptions,
}

impl<'a> TimeSeriesProjector<'a> {
    pub fn new(
        history: &'a HistoricalSeries,
        calendar: &'a SchemeCalendar,
        rates: &'a RateAssumptions,
    ) -> Self {
        Self { history, calendar, rates }
    }

    pub fn project(&self, years: RangeInclusive<i32>, policy: &PolicyParameters) -> AnnualSeries {
        let first_year = *years.start();
        let baseline_spreads = PolicyParameters::status_quo().normalized_spreads();
        let adjusted_spreads = policy.normalized_spreads();
        let awe_growth = trailing_growth(&self.history.awe, self.rates.fallback_wage_growth);
        let lower_factor = forecast_factor(policy.lower_threshold_forecast_adj);
        let upper_factor = forecast_factor(policy.upper_threshold_forecast_adj);

        let mut points: Vec<SeriesPoint> = Vec::new();
        // Forecast adjustments apply after uprating, so uprate from unadjusted values
        let mut raw_lower: Option<f64> = None;
        let mut raw_upper: Option<f64> = None;

        for year in years {
            let prev_awe = points.last().map(|p| p.awe);

            let rpi = self.rpi(year);
            let awe = self.awe(year, prev_awe, awe_growth);
            let wage_ratio = match prev_awe {
                Some(p) if p > 0.0 => awe / p,
                _ => 1.0,
            };

            let (low_spread, high_spread) = if year >= self.calendar.projection_start_year {
                adjusted_spreads
            } else {
                baseline_spreads
            };

            let lower = threshold(year, &self.history.repayment_threshold, raw_lower, wage_ratio);
            let upper = threshold(year, &self.history.higher_interest_threshold, raw_upper, wage_ratio);
            raw_lower = Some(lower);
            raw_upper = Some(upper);

            points.push(SeriesPoint {
                year,
                rpi,
                awe,
                low_rate: rpi + low_spread,
                high_rate: rpi + high_spread,
                government_rate: self.government_rate(year, rpi),
                lower_threshold: lower * self.factor_for(year, lower_factor),
                upper_threshold: upper * self.factor_for(year, upper_factor),
            });
        }

        AnnualSeries { first_year, points }
    }

    fn factor_for(&self, year: i32, factor: f64) -> f64 {
        if year >= self.calendar.projection_start_year {
            factor
        } else {
            1.0
        }
    }

    fn rpi(&self, year: i32) -> f64 {
        match classify(year, &self.history.rpi) {
            SeriesRule::Known(v) | SeriesRule::BeforeHistory(v) => v,
            SeriesRule::AfterHistory | SeriesRule::Gap => self.rates.long_run_rpi,
        }
    }

    fn awe(&self, year: i32, prev: Option<f64>, growth: f64) -> f64 {
        match classify(year, &self.history.awe) {
            SeriesRule::Known(v) | SeriesRule::BeforeHistory(v) => v,
            SeriesRule::AfterHistory => {
                let base = prev
                    .or_else(|| self.history.awe.values().next_back().copied())
                    .unwrap_or(100.0);
                base * (1.0 + growth)
            }
            SeriesRule::Gap => 100.0,
        }
    }

    fn government_rate(&self, year: i32, rpi: f64) -> f64 {
        if year > self.rates.government_margin_cutoff_year {
            rpi + self.rates.government_margin_after_cutoff
        } else {
            rpi - self.rates.government_margin_to_cutoff
        }
    }
}

/// Known value, clamp before history, otherwise uprate the previous year by wages
fn threshold(year: i32, known: &BTreeMap<i32, f64>, prev: Option<f64>, wage_ratio: f64) -> f64 {
    match classify(year, known) {
        SeriesRule::Known(v) | SeriesRule::BeforeHistory(v) => v,
        SeriesRule::AfterHistory | SeriesRule::Gap => {
            let base = prev
                .or_else(|| known.values().next_back().copied())
                .unwrap_or(0.0);
            base * wage_ratio
        }
    }
}
