//! State carried from one simulated year to the next

use super::discount::DiscountFactors;
use super::lifecycle::LifeStage;

/// Loan state at the close of the previous year
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// Closing balance of the prior year (unrounded)
    pub prev_balance: f64,

    /// Income of the prior year (unrounded)
    pub prev_income: f64,

    /// Running discount factors, one per regime
    pub discount: DiscountFactors,

    /// Balance forgiven at write-off, captured once
    pub written_off_amount: f64,
    pub write_off_captured: bool,

    /// First year the debt was repaid in full
    pub debt_cleared_year: Option<i32>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            prev_balance: 0.0,
            prev_income: 0.0,
            discount: DiscountFactors::default(),
            written_off_amount: 0.0,
            write_off_captured: false,
            debt_cleared_year: None,
        }
    }

    /// Record the write-off amount the first time the stage is reached
    pub fn capture_write_off(&mut self) {
        if !self.write_off_captured {
            self.written_off_amount = self.prev_balance.max(0.0);
            self.write_off_captured = true;
        }
    }

    /// Record payoff: the first repaying year that takes a positive balance to zero
    pub fn check_cleared(&mut self, year: i32, stage: LifeStage, balance: f64) {
        if self.debt_cleared_year.is_none()
            && stage == LifeStage::LiableToRepay
            && self.prev_balance > 0.0
            && balance == 0.0
        {
            self.debt_cleared_year = Some(year);
        }
    }

    /// Close the year and carry values forward
    pub fn advance(&mut self, balance: f64, income: f64) {
        self.prev_balance = balance;
        self.prev_income = income;
    }
}
