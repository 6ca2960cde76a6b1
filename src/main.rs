//! Student Loan Model CLI
//!
//! Runs one borrower under a modified policy against the status quo and
//! prints the ledger, outcome and valuation comparison.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use student_loan_model::comparison::{format_currency, format_pct};
use student_loan_model::inputs::{inputs_from_query, inputs_to_query};
use student_loan_model::projection::write_ledger_csv;
use student_loan_model::{BalanceMode, BorrowerPreset, BorrowerProfile, PolicyParameters, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "student_loan_model")]
#[command(about = "Simulate an income-contingent student loan against the status quo")]
struct Cli {
    /// Start from a shareable query string, e.g. "startingSalary=42000&repaymentRate=0.08"
    #[arg(long)]
    query: Option<String>,

    /// Apply an earnings preset (high, mid, low)
    #[arg(long)]
    preset: Option<BorrowerPreset>,

    #[arg(long)]
    graduation_year: Option<i32>,

    #[arg(long)]
    starting_salary: Option<f64>,

    #[arg(long)]
    study_years: Option<i32>,

    /// build-up or starting-balance
    #[arg(long)]
    balance_mode: Option<BalanceMode>,

    #[arg(long)]
    tuition_fee: Option<f64>,

    #[arg(long)]
    maintenance_loan: Option<f64>,

    #[arg(long)]
    starting_balance_2025: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    low_rate_spread_over_rpi: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    high_rate_spread_over_rpi: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    lower_threshold_forecast_adj: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    upper_threshold_forecast_adj: Option<f64>,

    #[arg(long)]
    repayment_rate: Option<f64>,

    #[arg(long)]
    writeoff_years: Option<i32>,

    /// Extend the simulation horizon to at least this year
    #[arg(long)]
    end_year: Option<i32>,

    /// Load macro series and cap periods from this directory
    #[arg(long)]
    series_dir: Option<PathBuf>,

    /// Write the modified-policy ledger as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the full comparison report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Number of ledger rows to print
    #[arg(long, default_value = "20")]
    rows: usize,
}

impl Cli {
    fn inputs(&self) -> (BorrowerProfile, PolicyParameters) {
        let (mut profile, mut policy) = self.query.as_deref().map(inputs_from_query).unwrap_or_default();

        if let Some(preset) = self.preset {
            profile = preset.apply(&profile);
        }

        set(&mut profile.graduation_year, self.graduation_year);
        set(&mut profile.starting_salary, self.starting_salary);
        set(&mut profile.study_years, self.study_years.map(|y| y.max(0)));
        set(&mut profile.balance_mode, self.balance_mode);
        set(&mut profile.tuition_fee, self.tuition_fee);
        set(&mut profile.maintenance_loan, self.maintenance_loan);
        set(&mut profile.starting_balance_2025, self.starting_balance_2025);

        set(&mut policy.low_rate_spread_over_rpi, self.low_rate_spread_over_rpi);
        set(&mut policy.high_rate_spread_over_rpi, self.high_rate_spread_over_rpi);
        set(&mut policy.lower_threshold_forecast_adj, self.lower_threshold_forecast_adj);
        set(&mut policy.upper_threshold_forecast_adj, self.upper_threshold_forecast_adj);
        set(&mut policy.repayment_rate, self.repayment_rate);
        set(&mut policy.writeoff_years, self.writeoff_years);

        (profile, policy)
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Student Loan Model v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");

    let runner = match &cli.series_dir {
        Some(dir) => ScenarioRunner::from_csv_path(dir)
            .with_context(|| format!("Failed to load series from {}", dir.display()))?,
        None => ScenarioRunner::new(),
    };

    let (profile, policy) = cli.inputs();
    println!("Borrower: graduates {}, starting salary {}", profile.graduation_year, format_currency(profile.starting_salary));
    println!("  Study years: {}  Balance mode: {}", profile.study_years, profile.balance_mode);
    let query = inputs_to_query(&profile, &policy);
    if !query.is_empty() {
        println!("  Query: {query}");
    }
    println!();

    if !runner.assumptions().is_eligible_cohort(profile.graduation_year) {
        println!("Graduation year {} is outside the Plan 2 cohort window; nothing to simulate.", profile.graduation_year);
        return Ok(());
    }

    let comparison = runner.compare_until(&profile, &policy, cli.end_year);
    let rows = &comparison.modified.rows;

    println!("Ledger ({} years):", rows.len());
    println!(
        "{:>5} {:>3} {:<16} {:>10} {:>7} {:>10} {:>10} {:>10} {:>12} {:>4}",
        "Year", "Age", "Stage", "Income", "Rate", "Borrowing", "Interest", "Repayment", "Balance", ""
    );
    println!("{}", "-".repeat(96));
    for row in rows.iter().take(cli.rows) {
        println!(
            "{:>5} {:>3} {:<16} {:>10.2} {:>7} {:>10.2} {:>10.2} {:>10.2} {:>12.2} {:>4}",
            row.year,
            row.age,
            row.life_stage.as_str(),
            row.income,
            format_pct(row.borrower_rate),
            row.borrowing,
            row.interest,
            row.repayment,
            row.balance,
            row.rate_note(),
        );
    }
    if rows.len() > cli.rows {
        println!("... ({} more years)", rows.len() - cli.rows);
    }

    println!("\nOutcome:");
    println!("  Status quo: {}", comparison.status_quo_outcome());
    println!("  Changed:    {}", comparison.modified_outcome());

    println!("\nTotals:");
    for total in comparison.totals() {
        println!(
            "  {:<24} {:>12} {:>12} {:>12}",
            total.label,
            format_currency(total.status_quo),
            format_currency(total.changed),
            format_currency(total.delta)
        );
    }

    println!("\nValuation (face value {}):", format_currency(comparison.modified.summary.face_value_2025));
    println!(
        "  {:<18} {:<24} {:>12} {:>12} {:>12} {:>8} {:>8}",
        "Method", "Discount rate", "NPV (SQ)", "NPV", "Delta", "% face", "RAB"
    );
    for row in comparison.valuation_rows() {
        println!(
            "  {:<18} {:<24} {:>12} {:>12} {:>12} {:>8} {:>8}",
            row.method,
            row.discount_rate,
            format_currency(row.npv_status_quo),
            format_currency(row.npv_changed),
            format_currency(row.npv_delta),
            format_pct(row.pct_face_changed),
            row.rab_charge_changed.map(format_pct).unwrap_or_default(),
        );
    }

    let changed: Vec<_> = comparison.changed_columns().iter().map(|c| c.label()).collect();
    if !changed.is_empty() {
        println!("\nColumns changed vs status quo: {}", changed.join(", "));
    }

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        write_ledger_csv(BufWriter::new(file), rows)?;
        println!("\nLedger written to: {}", path.display());
    }

    if let Some(path) = &cli.json {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &comparison.report())?;
        println!("Comparison written to: {}", path.display());
    }

    Ok(())
}
