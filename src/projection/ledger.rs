//! Ledger output structures for simulations

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::lifecycle::LifeStage;
use crate::error::Result;

/// Round to whole pence
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One simulated tax year. Currency fields are rounded to pence; rates are not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    // Timing
    pub year: i32,
    pub age: i32,
    pub life_stage: LifeStage,

    // Income and thresholds
    pub income: f64,
    pub lower_threshold: f64,
    pub upper_threshold: f64,

    // Accrual
    pub borrower_rate: f64,
    pub borrowing: f64,
    pub mid_year_balance: f64,
    pub interest: f64,

    /// Non-positive: repayments reduce the liability
    pub repayment: f64,
    pub net_change: f64,
    pub balance: f64,

    // Valuation
    pub government_discount_rate: f64,
    pub pv_government: f64,
    pub pv_market: f64,
    pub pv_borrower: f64,

    /// A historical market rate cap applied in this tax year
    pub rate_capped: bool,
}

impl LedgerRow {
    /// Short note for tabular displays
    pub fn rate_note(&self) -> &'static str {
        if self.rate_capped {
            "PMR"
        } else {
            ""
        }
    }

    /// Amount actually collected from the borrower this year
    pub fn repayment_taken(&self) -> f64 {
        (-self.repayment).max(0.0)
    }
}

/// Valuation summary for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    /// Balance at the end of the face-value year
    pub face_value_2025: f64,
    pub total_repaid: f64,
    pub total_interest: f64,
    pub npv_government: f64,
    pub npv_market: f64,
    pub npv_borrower: f64,
    pub rab_charge: f64,
    pub pct_face_government: f64,
    pub pct_face_market: f64,
    pub pct_face_borrower: f64,
    pub written_off_amount: f64,
    pub debt_cleared_year: Option<i32>,
}

/// Complete simulation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Annual rows, ascending by year
    pub rows: Vec<LedgerRow>,

    pub summary: SimulationSummary,
}

impl SimulationResult {
    /// Empty ledger with an all-zero summary, returned for ineligible cohorts
    pub fn ineligible() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, year: i32) -> Option<&LedgerRow> {
        self.rows.iter().find(|r| r.year == year)
    }

    pub fn final_balance(&self) -> f64 {
        self.rows.last().map(|r| r.balance).unwrap_or(0.0)
    }
}

/// Write rows as CSV with a camelCase header
pub fn write_ledger_csv<W: Write>(writer: W, rows: &[LedgerRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> LedgerRow {
        LedgerRow {
            year: 2026,
            age: 29,
            life_stage: LifeStage::LiableToRepay,
            income: 30_000.0,
            lower_threshold: 29_385.0,
            upper_threshold: 52_885.0,
            borrower_rate: 0.05,
            borrowing: 0.0,
            mid_year_balance: 50_000.0,
            interest: 2_500.0,
            repayment: -55.35,
            net_change: 2_444.65,
            balance: 52_444.65,
            government_discount_rate: 0.0215,
            pv_government: 54.19,
            pv_market: 51.25,
            pv_borrower: 52.71,
            rate_capped: false,
        }
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(1.005 + 1e-9), 1.01);
        assert_eq!(round_currency(-2.344), -2.34);
        assert_eq!(round_currency(25_000.0), 25_000.0);
    }

    #[test]
    fn test_ineligible_is_empty() {
        let result = SimulationResult::ineligible();
        assert!(result.is_empty());
        assert_eq!(result.summary.debt_cleared_year, None);
        assert_eq!(result.final_balance(), 0.0);
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        write_ledger_csv(&mut buf, &[sample_row()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("year,age,lifeStage,income"));
        assert!(header.ends_with("rateCapped"));
        let line = lines.next().unwrap();
        assert!(line.starts_with("2026,29,Liable to repay,30000.0"));
    }

    #[test]
    fn test_summary_json_field_names() {
        let json = serde_json::to_value(SimulationSummary::default()).unwrap();
        assert!(json.get("faceValue2025").is_some());
        assert!(json.get("debtClearedYear").unwrap().is_null());
    }

    #[test]
    fn test_repayment_taken() {
        let row = sample_row();
        assert_eq!(row.repayment_taken(), 55.35);
        assert_eq!(row.rate_note(), "");
    }
}
