//! Reduce a completed ledger to valuation metrics

use super::ledger::{LedgerRow, SimulationSummary};

/// Ratio with a zero result whenever the face value is not positive
fn share_of_face(amount: f64, face_value: f64) -> f64 {
    if face_value > 0.0 {
        amount / face_value
    } else {
        0.0
    }
}

/// Build the summary from ledger rows plus the engine's write-off/payoff outcome
pub fn summarize(
    rows: &[LedgerRow],
    face_value_year: i32,
    written_off_amount: f64,
    debt_cleared_year: Option<i32>,
) -> SimulationSummary {
    let face_value = rows
        .iter()
        .find(|r| r.year == face_value_year)
        .map(|r| r.balance)
        .unwrap_or(0.0);

    let total_repaid = -rows
        .iter()
        .filter(|r| r.repayment < 0.0)
        .map(|r| r.repayment)
        .sum::<f64>();
    let total_interest: f64 = rows.iter().map(|r| r.interest).sum();

    let npv_government: f64 = rows.iter().map(|r| r.pv_government).sum();
    let npv_market: f64 = rows.iter().map(|r| r.pv_market).sum();
    let npv_borrower: f64 = rows.iter().map(|r| r.pv_borrower).sum();

    SimulationSummary {
        face_value_2025: face_value,
        total_repaid,
        total_interest,
        npv_government,
        npv_market,
        npv_borrower,
        rab_charge: share_of_face(face_value - npv_government, face_value),
        pct_face_government: share_of_face(npv_government, face_value),
        pct_face_market: share_of_face(npv_market, face_value),
        pct_face_borrower: share_of_face(npv_borrower, face_value),
        written_off_amount,
        debt_cleared_year,
    }
}
