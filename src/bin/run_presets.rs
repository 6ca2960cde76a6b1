//! Run every borrower preset against the status quo
//!
//! Outputs one summary line per preset plus a combined CSV of ledgers

use std::fs::File;
use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use student_loan_model::comparison::{format_currency, format_pct};
use student_loan_model::inputs::inputs_from_query;
use student_loan_model::{BorrowerPreset, LoanOutcome, ScenarioRunner};

fn main() -> Result<()> {
    env_logger::init();

    // Optional policy overrides as a query string, e.g. "repaymentRate=0.08"
    let query = std::env::args().nth(1).unwrap_or_default();
    let (base, policy) = inputs_from_query(&query);

    let start = Instant::now();
    let runner = ScenarioRunner::from_csv().unwrap_or_else(|e| {
        log::warn!("Falling back to built-in series: {}", e);
        ScenarioRunner::new()
    });
    println!("Loaded assumptions in {:?}", start.elapsed());

    let run_start = Instant::now();
    let results = runner.run_presets(&base, &policy);
    println!("Ran {} presets in {:?}\n", results.len(), run_start.elapsed());

    println!(
        "{:<6} {:>10} {:>12} {:>12} {:>10} {:>10}  {}",
        "Preset", "Salary", "Repaid", "NPV (HMT)", "RAB", "RAB (SQ)", "Outcome"
    );
    println!("{}", "-".repeat(96));
    for (preset, comparison) in &results {
        let summary = &comparison.modified.summary;
        println!(
            "{:<6} {:>10} {:>12} {:>12} {:>10} {:>10}  {}",
            preset.as_str(),
            format_currency(preset.starting_salary()),
            format_currency(summary.total_repaid),
            format_currency(summary.npv_government),
            format_pct(summary.rab_charge),
            format_pct(comparison.status_quo.summary.rab_charge),
            comparison.modified_outcome(),
        );
    }

    let written_off = results
        .iter()
        .filter(|(_, c)| matches!(c.modified_outcome(), LoanOutcome::WrittenOff(_)))
        .count();
    println!("\n{} of {} presets end in write-off", written_off, BorrowerPreset::ALL.len());

    // Combined ledger for all presets
    let output_path = "preset_ledgers.csv";
    let mut file = File::create(output_path).with_context(|| format!("Unable to create {output_path}"))?;
    writeln!(file, "Preset,Year,Age,Stage,Income,Rate,Interest,Repayment,Balance,PV_Government")?;
    for (preset, comparison) in &results {
        for row in &comparison.modified.rows {
            writeln!(
                file,
                "{},{},{},{},{:.2},{:.6},{:.2},{:.2},{:.2},{:.2}",
                preset.as_str(),
                row.year,
                row.age,
                row.life_stage,
                row.income,
                row.borrower_rate,
                row.interest,
                row.repayment,
                row.balance,
                row.pv_government,
            )?;
        }
    }

    println!("Output written to {}", output_path);
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
