//! Discount regimes for valuing repayment cashflows
//!
//! Three independent running factors:
//! - **Government**: year-specific HMT discount rate
//! - **Market**: fixed annual rate
//! - **Borrower**: the borrower's own effective interest rate

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountRegime {
    Government,
    Market,
    Borrower,
}

impl DiscountRegime {
    pub const ALL: [DiscountRegime; 3] =
        [DiscountRegime::Government, DiscountRegime::Market, DiscountRegime::Borrower];

    /// Display name of the valuation method
    pub fn method(&self) -> &'static str {
        match self {
            DiscountRegime::Government => "Government / HMT",
            DiscountRegime::Market => "Market",
            DiscountRegime::Borrower => "ONS",
        }
    }
}

impl fmt::Display for DiscountRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// This year's annual rate under each regime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeRates {
    pub government: f64,
    pub market: f64,
    pub borrower: f64,
}

/// Present value of one cashflow under each regime
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentValues {
    pub government: f64,
    pub market: f64,
    pub borrower: f64,
}

/// Cumulative discount factors, one per regime, all starting at 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountFactors {
    pub government: f64,
    pub market: f64,
    pub borrower: f64,
}

impl Default for DiscountFactors {
    fn default() -> Self {
        Self {
            government: 1.0,
            market: 1.0,
            borrower: 1.0,
        }
    }
}

impl DiscountFactors {
    /// Roll each factor forward one year at its own rate
    pub fn advance(&mut self, rates: RegimeRates) {
        self.government = discount_one_year(self.government, rates.government);
        self.market = discount_one_year(self.market, rates.market);
        self.borrower = discount_one_year(self.borrower, rates.borrower);
    }

    /// PV of an amount under each regime's current factor
    pub fn present_values(&self, amount: f64) -> PresentValues {
        PresentValues {
            government: amount * self.government,
            market: amount * self.market,
            borrower: amount * self.borrower,
        }
    }
}

/// A rate of -100% or below would make the factor undefined; hold it instead
fn discount_one_year(factor: f64, rate: f64) -> f64 {
    let denom = 1.0 + rate;
    if denom <= f64::EPSILON {
        factor
    } else {
        factor / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_factors_start_at_one() {
        let factors = DiscountFactors::default();
        assert_eq!((factors.government, factors.market, factors.borrower), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_regimes_advance_independently() {
        let mut factors = DiscountFactors::default();
        let rates = RegimeRates { government: 0.02, market: 0.08, borrower: 0.0 };
        factors.advance(rates);
        factors.advance(rates);

        assert_relative_eq!(factors.government, 1.0 / 1.02_f64.powi(2), epsilon = 1e-12);
        assert_relative_eq!(factors.market, 1.0 / 1.08_f64.powi(2), epsilon = 1e-12);
        assert_eq!(factors.borrower, 1.0);
        // Lower rate = higher discount factor
        assert!(factors.government > factors.market);
    }

    #[test]
    fn test_present_values() {
        let mut factors = DiscountFactors::default();
        factors.advance(RegimeRates { government: 0.0, market: 0.25, borrower: 1.0 });
        let pv = factors.present_values(100.0);
        assert_relative_eq!(pv.government, 100.0);
        assert_relative_eq!(pv.market, 80.0);
        assert_relative_eq!(pv.borrower, 50.0);
    }

    #[test]
    fn test_degenerate_rate_holds_factor() {
        let mut factors = DiscountFactors::default();
        factors.advance(RegimeRates { government: -1.0, market: 0.0, borrower: 0.0 });
        assert_eq!(factors.government, 1.0);
    }
}
