//! Side-by-side view of a modified policy against the status quo

use std::fmt;

use serde::Serialize;

use crate::projection::{DiscountRegime, LedgerRow, LifeStage, SimulationResult, SimulationSummary};

/// Numeric cells closer than this count as unchanged
const CHANGE_TOLERANCE: f64 = 1e-9;

/// Whole-pound sterling with thousands separators, e.g. `-£12,345`
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-£{grouped}")
    } else {
        format!("£{grouped}")
    }
}

/// Percentage with one decimal place
pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// How a loan ended within the simulated horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum LoanOutcome {
    WrittenOff(f64),
    PaidOff(i32),
    Outstanding,
}

impl LoanOutcome {
    pub fn from_summary(summary: &SimulationSummary) -> Self {
        if summary.written_off_amount > 0.0 {
            LoanOutcome::WrittenOff(summary.written_off_amount)
        } else if let Some(year) = summary.debt_cleared_year {
            LoanOutcome::PaidOff(year)
        } else {
            LoanOutcome::Outstanding
        }
    }
}

impl fmt::Display for LoanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanOutcome::WrittenOff(amount) => write!(f, "Written off: {}", format_currency(*amount)),
            LoanOutcome::PaidOff(year) => write!(f, "Paid off in {year}"),
            LoanOutcome::Outstanding => f.write_str("No payoff or write-off in model horizon"),
        }
    }
}

/// NPV under one discount regime, status quo against modified
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRow {
    pub method: String,
    pub discount_rate: String,
    pub npv_status_quo: f64,
    pub npv_changed: f64,
    pub npv_delta: f64,
    pub pct_face_status_quo: f64,
    pub pct_face_changed: f64,
    pub pct_face_delta: f64,

    /// Only reported under the government regime
    pub rab_charge_status_quo: Option<f64>,
    pub rab_charge_changed: Option<f64>,
    pub rab_charge_delta: Option<f64>,
}

/// A headline total, status quo against modified
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalComparison {
    pub label: &'static str,
    pub status_quo: f64,
    pub changed: f64,
    pub delta: f64,
}

/// One modified-run year alongside the matching status-quo year, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyComparisonRow {
    pub year: i32,
    pub life_stage: LifeStage,
    pub age: i32,
    pub income_status_quo: Option<f64>,
    pub income_changed: f64,
    pub lower_threshold_status_quo: Option<f64>,
    pub lower_threshold_changed: f64,
    pub upper_threshold_status_quo: Option<f64>,
    pub upper_threshold_changed: f64,
    pub borrower_rate_status_quo: Option<f64>,
    pub borrower_rate_changed: f64,
    pub borrowing_status_quo: Option<f64>,
    pub borrowing_changed: f64,
    pub interest_status_quo: Option<f64>,
    pub interest_changed: f64,
    pub repayment_status_quo: Option<f64>,
    pub repayment_changed: f64,
    pub balance_status_quo: Option<f64>,
    pub balance_changed: f64,
    pub rate_note_status_quo: &'static str,
    pub rate_note_changed: &'static str,
}

impl YearlyComparisonRow {
    fn new(changed: &LedgerRow, status_quo: Option<&LedgerRow>) -> Self {
        Self {
            year: changed.year,
            life_stage: changed.life_stage,
            age: changed.age,
            income_status_quo: status_quo.map(|r| r.income),
            income_changed: changed.income,
            lower_threshold_status_quo: status_quo.map(|r| r.lower_threshold),
            lower_threshold_changed: changed.lower_threshold,
            upper_threshold_status_quo: status_quo.map(|r| r.upper_threshold),
            upper_threshold_changed: changed.upper_threshold,
            borrower_rate_status_quo: status_quo.map(|r| r.borrower_rate),
            borrower_rate_changed: changed.borrower_rate,
            borrowing_status_quo: status_quo.map(|r| r.borrowing),
            borrowing_changed: changed.borrowing,
            interest_status_quo: status_quo.map(|r| r.interest),
            interest_changed: changed.interest,
            repayment_status_quo: status_quo.map(|r| r.repayment),
            repayment_changed: changed.repayment,
            balance_status_quo: status_quo.map(|r| r.balance),
            balance_changed: changed.balance,
            rate_note_status_quo: status_quo.map_or("", |r| r.rate_note()),
            rate_note_changed: changed.rate_note(),
        }
    }
}

/// Columns of the yearly comparison that can be shown side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnGroup {
    LowerThreshold,
    UpperThreshold,
    BorrowerRate,
    Borrowing,
    Interest,
    Repayment,
    Balance,
    RateNote,
}

impl ColumnGroup {
    pub const ALL: [ColumnGroup; 8] = [
        ColumnGroup::LowerThreshold,
        ColumnGroup::UpperThreshold,
        ColumnGroup::BorrowerRate,
        ColumnGroup::Borrowing,
        ColumnGroup::Interest,
        ColumnGroup::Repayment,
        ColumnGroup::Balance,
        ColumnGroup::RateNote,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ColumnGroup::LowerThreshold => "Lower Threshold",
            ColumnGroup::UpperThreshold => "Upper Threshold",
            ColumnGroup::BorrowerRate => "Rate",
            ColumnGroup::Borrowing => "Borrowing",
            ColumnGroup::Interest => "Interest",
            ColumnGroup::Repayment => "Repayment",
            ColumnGroup::Balance => "Balance",
            ColumnGroup::RateNote => "Notes",
        }
    }

    /// Whether this column differs between the two runs in the given row
    pub fn differs(&self, row: &YearlyComparisonRow) -> bool {
        match self {
            ColumnGroup::LowerThreshold => numbers_differ(row.lower_threshold_status_quo, row.lower_threshold_changed),
            ColumnGroup::UpperThreshold => numbers_differ(row.upper_threshold_status_quo, row.upper_threshold_changed),
            ColumnGroup::BorrowerRate => numbers_differ(row.borrower_rate_status_quo, row.borrower_rate_changed),
            ColumnGroup::Borrowing => numbers_differ(row.borrowing_status_quo, row.borrowing_changed),
            ColumnGroup::Interest => numbers_differ(row.interest_status_quo, row.interest_changed),
            ColumnGroup::Repayment => numbers_differ(row.repayment_status_quo, row.repayment_changed),
            ColumnGroup::Balance => numbers_differ(row.balance_status_quo, row.balance_changed),
            ColumnGroup::RateNote => row.rate_note_status_quo != row.rate_note_changed,
        }
    }
}

/// A missing status-quo year always counts as a difference
fn numbers_differ(status_quo: Option<f64>, changed: f64) -> bool {
    match status_quo {
        Some(value) => (value - changed).abs() > CHANGE_TOLERANCE,
        None => true,
    }
}

/// What the borrower keeps each year
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRow {
    pub year: i32,
    pub income: f64,
    pub take_home: f64,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
    pub repayment_taken: f64,

    /// Repayment as a fraction of income, zero when there is no income
    pub repayment_share: f64,
}

impl From<&LedgerRow> for IncomeRow {
    fn from(row: &LedgerRow) -> Self {
        let repayment_taken = row.repayment_taken();
        Self {
            year: row.year,
            income: row.income,
            take_home: (row.income - repayment_taken).max(0.0),
            lower_threshold: row.lower_threshold,
            upper_threshold: row.upper_threshold,
            repayment_taken,
            repayment_share: if row.income > 0.0 { repayment_taken / row.income } else { 0.0 },
        }
    }
}

pub fn income_view(result: &SimulationResult) -> Vec<IncomeRow> {
    result.rows.iter().map(IncomeRow::from).collect()
}

/// A status-quo run paired with a modified-policy run for the same borrower
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub status_quo: SimulationResult,
    pub modified: SimulationResult,

    /// Fixed rate behind the market valuation row
    pub market_discount_rate: f64,
}

impl Comparison {
    pub fn new(status_quo: SimulationResult, modified: SimulationResult, market_discount_rate: f64) -> Self {
        Self { status_quo, modified, market_discount_rate }
    }

    pub fn status_quo_outcome(&self) -> LoanOutcome {
        LoanOutcome::from_summary(&self.status_quo.summary)
    }

    pub fn modified_outcome(&self) -> LoanOutcome {
        LoanOutcome::from_summary(&self.modified.summary)
    }

    pub fn totals(&self) -> Vec<TotalComparison> {
        let sq = &self.status_quo.summary;
        let md = &self.modified.summary;
        [
            ("Total Repaid", sq.total_repaid, md.total_repaid),
            ("Total Interest Accrued", sq.total_interest, md.total_interest),
        ]
        .into_iter()
        .map(|(label, status_quo, changed)| TotalComparison {
            label,
            status_quo,
            changed,
            delta: changed - status_quo,
        })
        .collect()
    }

    /// One row per discount regime
    pub fn valuation_rows(&self) -> Vec<ValuationRow> {
        let sq = &self.status_quo.summary;
        let md = &self.modified.summary;

        DiscountRegime::ALL
            .iter()
            .map(|&regime| {
                let (npv_sq, npv_md, pct_sq, pct_md) = match regime {
                    DiscountRegime::Government => {
                        (sq.npv_government, md.npv_government, sq.pct_face_government, md.pct_face_government)
                    }
                    DiscountRegime::Market => (sq.npv_market, md.npv_market, sq.pct_face_market, md.pct_face_market),
                    DiscountRegime::Borrower => {
                        (sq.npv_borrower, md.npv_borrower, sq.pct_face_borrower, md.pct_face_borrower)
                    }
                };
                let (rab_sq, rab_md) = match regime {
                    DiscountRegime::Government => (Some(sq.rab_charge), Some(md.rab_charge)),
                    _ => (None, None),
                };

                ValuationRow {
                    method: regime.method().to_string(),
                    discount_rate: self.discount_rate_label(regime),
                    npv_status_quo: npv_sq,
                    npv_changed: npv_md,
                    npv_delta: npv_md - npv_sq,
                    pct_face_status_quo: pct_sq,
                    pct_face_changed: pct_md,
                    pct_face_delta: pct_md - pct_sq,
                    rab_charge_status_quo: rab_sq,
                    rab_charge_changed: rab_md,
                    rab_charge_delta: rab_sq.zip(rab_md).map(|(s, m)| m - s),
                }
            })
            .collect()
    }

    fn discount_rate_label(&self, regime: DiscountRegime) -> String {
        match regime {
            DiscountRegime::Government => "Year-specific HMT".to_string(),
            DiscountRegime::Market => format!("{:.1}% fixed", self.market_discount_rate * 100.0),
            DiscountRegime::Borrower => "Borrower interest rate".to_string(),
        }
    }

    /// Modified years in order, each joined to the status-quo year if present
    pub fn yearly_rows(&self) -> Vec<YearlyComparisonRow> {
        self.modified
            .rows
            .iter()
            .map(|row| YearlyComparisonRow::new(row, self.status_quo.row(row.year)))
            .collect()
    }

    /// Column groups that differ in at least one year
    pub fn changed_columns(&self) -> Vec<ColumnGroup> {
        let rows = self.yearly_rows();
        ColumnGroup::ALL
            .into_iter()
            .filter(|group| rows.iter().any(|row| group.differs(row)))
            .collect()
    }

    /// Everything a caller needs to render the comparison
    pub fn report(&self) -> ComparisonReport {
        ComparisonReport {
            status_quo: self.status_quo.summary.clone(),
            modified: self.modified.summary.clone(),
            status_quo_outcome: self.status_quo_outcome().to_string(),
            modified_outcome: self.modified_outcome().to_string(),
            totals: self.totals(),
            valuation: self.valuation_rows(),
            changed_columns: self.changed_columns(),
            yearly: self.yearly_rows(),
            income: income_view(&self.modified),
        }
    }
}

/// Serializable digest of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub status_quo: SimulationSummary,
    pub modified: SimulationSummary,
    pub status_quo_outcome: String,
    pub modified_outcome: String,
    pub totals: Vec<TotalComparison>,
    pub valuation: Vec<ValuationRow>,
    pub changed_columns: Vec<ColumnGroup>,
    pub yearly: Vec<YearlyComparisonRow>,
    pub income: Vec<IncomeRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{BorrowerPreset, BorrowerProfile, PolicyParameters};
    use crate::scenario::ScenarioRunner;
    use approx::assert_relative_eq;

    fn summary(npv: f64, rab: f64) -> SimulationSummary {
        SimulationSummary {
            face_value_2025: 40_000.0,
            npv_government: npv,
            npv_market: npv / 2.0,
            npv_borrower: npv / 3.0,
            rab_charge: rab,
            pct_face_government: npv / 40_000.0,
            ..Default::default()
        }
    }

    fn result(summary: SimulationSummary) -> SimulationResult {
        SimulationResult { rows: Vec::new(), summary }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "£0");
        assert_eq!(format_currency(999.4), "£999");
        assert_eq!(format_currency(1_234.5), "£1,235");
        assert_eq!(format_currency(54_421.0), "£54,421");
        assert_eq!(format_currency(1_000_000.0), "£1,000,000");
        assert_eq!(format_currency(-12_345.0), "-£12,345");
        assert_eq!(format_pct(0.0745), "7.5%");
    }

    #[test]
    fn test_loan_outcome_precedence() {
        let mut s = SimulationSummary { written_off_amount: 12_000.0, debt_cleared_year: Some(2040), ..Default::default() };
        assert_eq!(LoanOutcome::from_summary(&s), LoanOutcome::WrittenOff(12_000.0));
        assert_eq!(LoanOutcome::from_summary(&s).to_string(), "Written off: £12,000");

        s.written_off_amount = 0.0;
        assert_eq!(LoanOutcome::from_summary(&s).to_string(), "Paid off in 2040");

        s.debt_cleared_year = None;
        assert_eq!(
            LoanOutcome::from_summary(&s).to_string(),
            "No payoff or write-off in model horizon"
        );
    }

    #[test]
    fn test_valuation_rows() {
        let comparison = Comparison::new(result(summary(20_000.0, 0.5)), result(summary(24_000.0, 0.4)), 0.08);
        let rows = comparison.valuation_rows();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].method, "Government / HMT");
        assert_eq!(rows[0].discount_rate, "Year-specific HMT");
        assert_relative_eq!(rows[0].npv_delta, 4_000.0);
        assert_relative_eq!(rows[0].pct_face_delta, 0.1);
        assert_relative_eq!(rows[0].rab_charge_delta.unwrap(), -0.1, epsilon = 1e-12);

        assert_eq!(rows[1].method, "Market");
        assert_eq!(rows[1].discount_rate, "8.0% fixed");
        assert_relative_eq!(rows[1].npv_delta, 2_000.0);
        assert_eq!(rows[1].rab_charge_changed, None);
        assert_eq!(rows[1].rab_charge_delta, None);

        assert_eq!(rows[2].method, "ONS");
        assert_eq!(rows[2].discount_rate, "Borrower interest rate");
    }

    #[test]
    fn test_changed_columns_follow_policy() {
        let runner = ScenarioRunner::new();
        let profile = BorrowerProfile::default();

        let policy = PolicyParameters { lower_threshold_forecast_adj: 0.1, ..Default::default() };
        let changed = runner.compare(&profile, &policy).changed_columns();
        assert!(changed.contains(&ColumnGroup::LowerThreshold));
        assert!(!changed.contains(&ColumnGroup::UpperThreshold));
        assert!(!changed.contains(&ColumnGroup::Borrowing));
        assert!(!changed.contains(&ColumnGroup::RateNote));
    }

    #[test]
    fn test_yearly_rows_track_modified_horizon() {
        let runner = ScenarioRunner::new();
        let profile = BorrowerProfile::default();
        let policy = PolicyParameters { repayment_rate: 0.12, ..Default::default() };
        let comparison = runner.compare(&profile, &policy);

        let rows = comparison.yearly_rows();
        assert_eq!(rows.len(), comparison.modified.rows.len());
        assert!(rows.iter().all(|r| r.income_status_quo.is_some()));

        let y2023 = rows.iter().find(|r| r.year == 2023).unwrap();
        assert_eq!(y2023.rate_note_changed, "PMR");
        assert_eq!(y2023.rate_note_status_quo, "PMR");

        assert!(comparison.changed_columns().contains(&ColumnGroup::Repayment));
        let totals = comparison.totals();
        assert_eq!(totals[0].label, "Total Repaid");
        assert_relative_eq!(totals[0].delta, totals[0].changed - totals[0].status_quo);
    }

    #[test]
    fn test_missing_status_quo_year_counts_as_change() {
        let row = YearlyComparisonRow::new(
            &crate::projection::LedgerRow {
                year: 2070,
                age: 73,
                life_stage: LifeStage::WrittenOff,
                income: 0.0,
                lower_threshold: 0.0,
                upper_threshold: 0.0,
                borrower_rate: 0.0,
                borrowing: 0.0,
                mid_year_balance: 0.0,
                interest: 0.0,
                repayment: 0.0,
                net_change: 0.0,
                balance: 0.0,
                government_discount_rate: 0.0,
                pv_government: 0.0,
                pv_market: 0.0,
                pv_borrower: 0.0,
                rate_capped: false,
            },
            None,
        );
        assert!(ColumnGroup::Balance.differs(&row));
        assert!(!ColumnGroup::RateNote.differs(&row));
    }

    #[test]
    fn test_income_view() {
        let runner = ScenarioRunner::new();
        let profile = BorrowerPreset::High.apply(&BorrowerProfile::default());
        let result = runner.run(&profile, &PolicyParameters::default());
        let view = income_view(&result);

        let before = view.iter().find(|r| r.year == 2016).unwrap();
        assert_eq!(before.repayment_share, 0.0);
        assert_eq!(before.take_home, 0.0);

        let first = view.iter().find(|r| r.year == 2018).unwrap();
        assert!(first.repayment_taken > 0.0);
        assert_relative_eq!(first.take_home, first.income - first.repayment_taken, epsilon = 1e-9);
        assert_relative_eq!(first.repayment_share, first.repayment_taken / first.income, epsilon = 1e-12);
    }

    #[test]
    fn test_report_serializes() {
        let runner = ScenarioRunner::new();
        let comparison = runner.compare(&BorrowerProfile::default(), &PolicyParameters::default());
        let json = serde_json::to_value(comparison.report()).unwrap();
        assert_eq!(json["valuation"].as_array().unwrap().len(), 3);
        assert!(json["changedColumns"].as_array().unwrap().is_empty());
        assert!(json["modifiedOutcome"].is_string());
        assert_eq!(json["yearly"][0]["year"], 2013);
    }
}
