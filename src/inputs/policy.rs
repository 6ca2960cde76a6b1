//! Repayment policy parameters

use serde::{Deserialize, Serialize};

use super::params::{format_number, ParamMap, ParamReader};

/// Longest write-off term accepted from raw parameters
pub const MAX_WRITEOFF_YEARS: i32 = 100;

/// Policy levers for the repayment scheme. `Default` is the status quo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyParameters {
    /// Spread over RPI for the lower interest-rate bound
    pub low_rate_spread_over_rpi: f64,

    /// Spread over RPI for the upper interest-rate bound
    pub high_rate_spread_over_rpi: f64,

    /// Multiplicative adjustment to the projected repayment threshold
    pub lower_threshold_forecast_adj: f64,

    /// Multiplicative adjustment to the projected higher-interest threshold
    pub upper_threshold_forecast_adj: f64,

    /// Share of income above the repayment threshold collected
    pub repayment_rate: f64,

    /// Years after graduation at which the balance is forgiven
    pub writeoff_years: i32,
}

impl Default for PolicyParameters {
    fn default() -> Self {
        Self {
            low_rate_spread_over_rpi: 0.0,
            high_rate_spread_over_rpi: 0.03,
            lower_threshold_forecast_adj: 0.0,
            upper_threshold_forecast_adj: 0.0,
            repayment_rate: 0.09,
            writeoff_years: 30,
        }
    }
}

impl PolicyParameters {
    pub fn status_quo() -> Self {
        Self::default()
    }

    pub fn from_params(params: &ParamMap) -> Self {
        Self::from_reader(ParamReader::new(params))
    }

    pub fn from_reader(reader: ParamReader<'_>) -> Self {
        let d = Self::default();
        Self {
            low_rate_spread_over_rpi: reader.number("lowRateSpreadOverRpi", d.low_rate_spread_over_rpi),
            high_rate_spread_over_rpi: reader.number("highRateSpreadOverRpi", d.high_rate_spread_over_rpi),
            lower_threshold_forecast_adj: reader
                .number("lowerThresholdForecastAdj", d.lower_threshold_forecast_adj),
            upper_threshold_forecast_adj: reader
                .number("upperThresholdForecastAdj", d.upper_threshold_forecast_adj),
            repayment_rate: reader.number("repaymentRate", d.repayment_rate),
            writeoff_years: reader.integer_in("writeoffYears", d.writeoff_years, 0..=MAX_WRITEOFF_YEARS),
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let d = Self::default();
        let numeric = [
            ("lowRateSpreadOverRpi", self.low_rate_spread_over_rpi, d.low_rate_spread_over_rpi),
            ("highRateSpreadOverRpi", self.high_rate_spread_over_rpi, d.high_rate_spread_over_rpi),
            (
                "lowerThresholdForecastAdj",
                self.lower_threshold_forecast_adj,
                d.lower_threshold_forecast_adj,
            ),
            (
                "upperThresholdForecastAdj",
                self.upper_threshold_forecast_adj,
                d.upper_threshold_forecast_adj,
            ),
            ("repaymentRate", self.repayment_rate, d.repayment_rate),
        ];

        let mut out: Vec<(String, String)> = numeric
            .iter()
            .filter(|(_, value, default)| value != default)
            .map(|(name, value, _)| (name.to_string(), format_number(*value)))
            .collect();

        if self.writeoff_years != d.writeoff_years {
            out.push(("writeoffYears".into(), self.writeoff_years.to_string()));
        }

        out
    }

    /// (low, high) spread pair ordered so that low <= high
    pub fn normalized_spreads(&self) -> (f64, f64) {
        let a = self.low_rate_spread_over_rpi;
        let b = self.high_rate_spread_over_rpi;
        (a.min(b), a.max(b))
    }

    pub fn is_status_quo(&self) -> bool {
        *self == Self::default()
    }
}

/// Threshold multiplier for a forecast adjustment, never below 0.1
pub fn forecast_factor(adjustment: f64) -> f64 {
    (1.0 + adjustment).max(0.1)
}
