//! Core amortization engine for annual loan ledgers

use log::debug;

use super::discount::{PresentValues, RegimeRates};
use super::ledger::{round_currency, LedgerRow, SimulationResult};
use super::lifecycle::LifeStage;
use super::state::LedgerState;
use super::valuation;
use crate::assumptions::{AnnualSeries, SchemeAssumptions, SeriesPoint};
use crate::inputs::{BalanceMode, BorrowerProfile, PolicyParameters};

/// Main simulation engine
#[derive(Debug, Clone)]
pub struct LoanEngine {
    assumptions: SchemeAssumptions,
}

impl LoanEngine {
    /// Create a new engine with given assumptions
    pub fn new(assumptions: SchemeAssumptions) -> Self {
        Self { assumptions }
    }

    /// Engine with built-in Plan 2 assumptions
    pub fn plan2() -> Self {
        Self::new(SchemeAssumptions::default_plan2())
    }

    pub fn assumptions(&self) -> &SchemeAssumptions {
        &self.assumptions
    }

    /// Run a full simulation for one borrower under one policy.
    ///
    /// Pure: identical inputs give identical results. Cohorts outside the
    /// scheme window get an empty ledger and a zero summary.
    pub fn simulate(
        &self,
        profile: &BorrowerProfile,
        policy: &PolicyParameters,
        end_year_override: Option<i32>,
    ) -> SimulationResult {
        if !self.assumptions.is_eligible_cohort(profile.graduation_year) {
            debug!(
                "Graduation year {} is outside the eligible cohort window",
                profile.graduation_year
            );
            return SimulationResult::ineligible();
        }

        let calendar = &self.assumptions.calendar;
        let end_year = self.assumptions.end_year(profile, policy, end_year_override);
        let series = self
            .assumptions
            .projector()
            .project(calendar.start_year..=end_year, policy);

        let mut state = LedgerState::new();
        let rows: Vec<LedgerRow> = series
            .points()
            .iter()
            .map(|point| self.calculate_year(profile, policy, &series, point, &mut state))
            .collect();

        let summary = valuation::summarize(
            &rows,
            calendar.face_value_year,
            state.written_off_amount,
            state.debt_cleared_year,
        );

        debug!(
            "Simulated {}..={} for graduation {}: repaid {:.2}, written off {:.2}",
            calendar.start_year, end_year, profile.graduation_year, summary.total_repaid, summary.written_off_amount
        );

        SimulationResult { rows, summary }
    }

    /// Calculate one ledger row and advance the carried state
    fn calculate_year(
        &self,
        profile: &BorrowerProfile,
        policy: &PolicyParameters,
        series: &AnnualSeries,
        point: &SeriesPoint,
        state: &mut LedgerState,
    ) -> LedgerRow {
        let calendar = &self.assumptions.calendar;
        let rates = &self.assumptions.rates;
        let overlay = self.assumptions.rate_cap_overlay();
        let year = point.year;

        let age = calendar
            .entry_age
            .saturating_add(profile.study_years)
            .saturating_add(year.saturating_sub(profile.graduation_year));
        let stage = LifeStage::derive(year, profile.graduation_year, policy.writeoff_years, profile.study_years);

        let income = self.income(profile, series, state.prev_income, year, age);

        let candidate_rate = select_rate(state.prev_balance, stage, income, point);
        let borrower_rate = overlay.apply(year, candidate_rate, stage);

        let borrowing = if stage == LifeStage::Studying && profile.balance_mode == BalanceMode::BuildUp {
            profile.annual_borrowing()
        } else {
            0.0
        };

        // New borrowing is drawn through the year, so half of it accrues
        let mid_year_balance = state.prev_balance + borrowing / 2.0;

        let interest = if stage == LifeStage::WrittenOff {
            0.0
        } else {
            mid_year_balance * borrower_rate
        };

        let repayment = if stage == LifeStage::LiableToRepay {
            let due = ((income - point.lower_threshold) * policy.repayment_rate).max(0.0);
            let collected = due.min((mid_year_balance + interest).max(0.0));
            if collected > 0.0 {
                -collected
            } else {
                0.0
            }
        } else {
            0.0
        };

        let mut balance = state.prev_balance + borrowing + interest + repayment;
        if profile.balance_mode == BalanceMode::StartingBalance && year == calendar.starting_balance_year {
            balance = profile.starting_balance_2025.max(0.0);
        }
        if stage == LifeStage::WrittenOff {
            state.capture_write_off();
            balance = 0.0;
        }
        if balance < rates.balance_epsilon {
            balance = 0.0;
        }

        state.check_cleared(year, stage, balance);

        let pv = if year >= calendar.projection_start_year {
            state.discount.advance(RegimeRates {
                government: point.government_rate,
                market: rates.market_discount_rate,
                borrower: borrower_rate,
            });
            state.discount.present_values(repayment.abs())
        } else {
            PresentValues::default()
        };

        let row = LedgerRow {
            year,
            age,
            life_stage: stage,
            income: round_currency(income),
            lower_threshold: round_currency(point.lower_threshold),
            upper_threshold: round_currency(point.upper_threshold),
            borrower_rate,
            borrowing: round_currency(borrowing),
            mid_year_balance: round_currency(mid_year_balance),
            interest: round_currency(interest),
            repayment: round_currency(repayment),
            net_change: round_currency(balance - state.prev_balance),
            balance: round_currency(balance),
            government_discount_rate: point.government_rate,
            pv_government: round_currency(pv.government),
            pv_market: round_currency(pv.market),
            pv_borrower: round_currency(pv.borrower),
            rate_capped: overlay.is_capped(year),
        };

        state.advance(balance, income);
        row
    }

    /// Starting salary in the graduation year, then compounded by career
    /// progression and wage growth; nothing before graduation
    fn income(&self, profile: &BorrowerProfile, series: &AnnualSeries, prev_income: f64, year: i32, age: i32) -> f64 {
        if year == profile.graduation_year {
            profile.starting_salary
        } else if year > profile.graduation_year {
            let career_growth = self.assumptions.career.rate_for_age(age);
            prev_income * (1.0 + career_growth) * series.wage_ratio(year)
        } else {
            0.0
        }
    }
}

/// Candidate borrower rate before any market cap
fn select_rate(prev_balance: f64, stage: LifeStage, income: f64, point: &SeriesPoint) -> f64 {
    if stage == LifeStage::Studying {
        return point.high_rate;
    }
    if prev_balance <= 0.0 {
        return 0.0;
    }

    if income > point.upper_threshold {
        point.high_rate
    } else if income <= point.lower_threshold {
        point.low_rate
    } else {
        let band = (point.upper_threshold - point.lower_threshold).max(1.0);
        let share = (income - point.lower_threshold) / band;
        point.low_rate + share * (point.high_rate - point.low_rate)
    }
}
