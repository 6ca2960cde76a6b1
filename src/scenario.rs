//! Scenario runner for repeated and paired simulations
//!
//! Loads scheme assumptions once, then runs any number of borrower/policy
//! combinations against them without re-reading series files.

use std::path::Path;

use log::info;
use rayon::prelude::*;

use crate::assumptions::SchemeAssumptions;
use crate::comparison::Comparison;
use crate::error::Result;
use crate::inputs::{BorrowerPreset, BorrowerProfile, PolicyParameters};
use crate::projection::{LoanEngine, SimulationResult};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// let policy = PolicyParameters { repayment_rate: 0.08, ..Default::default() };
/// let comparison = runner.compare(&BorrowerProfile::default(), &policy);
/// println!("{}", comparison.modified_outcome());
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: LoanEngine,
}

impl ScenarioRunner {
    /// Runner with built-in Plan 2 assumptions
    pub fn new() -> Self {
        Self {
            engine: LoanEngine::plan2(),
        }
    }

    /// Runner with series loaded from the default data directory
    pub fn from_csv() -> Result<Self> {
        Ok(Self::with_assumptions(SchemeAssumptions::from_csv()?))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self::with_assumptions(SchemeAssumptions::from_csv_path(path)?))
    }

    pub fn with_assumptions(assumptions: SchemeAssumptions) -> Self {
        Self {
            engine: LoanEngine::new(assumptions),
        }
    }

    pub fn assumptions(&self) -> &SchemeAssumptions {
        self.engine.assumptions()
    }

    /// Simulate one borrower under one policy to the default horizon
    pub fn run(&self, profile: &BorrowerProfile, policy: &PolicyParameters) -> SimulationResult {
        self.engine.simulate(profile, policy, None)
    }

    /// Simulate with an explicit end year (only ever extends the horizon)
    pub fn run_until(&self, profile: &BorrowerProfile, policy: &PolicyParameters, end_year: i32) -> SimulationResult {
        self.engine.simulate(profile, policy, Some(end_year))
    }

    /// Run a policy against the status quo for the same borrower.
    ///
    /// Both runs share the modified policy's horizon; the two simulations
    /// execute in parallel.
    pub fn compare(&self, profile: &BorrowerProfile, policy: &PolicyParameters) -> Comparison {
        self.compare_until(profile, policy, None)
    }

    pub fn compare_until(
        &self,
        profile: &BorrowerProfile,
        policy: &PolicyParameters,
        end_year_override: Option<i32>,
    ) -> Comparison {
        let end_year = self.assumptions().end_year(profile, policy, end_year_override);
        let status_quo_policy = PolicyParameters::status_quo();

        let (status_quo, modified) = rayon::join(
            || self.engine.simulate(profile, &status_quo_policy, Some(end_year)),
            || self.engine.simulate(profile, policy, Some(end_year)),
        );

        Comparison::new(status_quo, modified, self.assumptions().rates.market_discount_rate)
    }

    /// Many borrowers under one policy
    pub fn run_batch(&self, profiles: &[BorrowerProfile], policy: &PolicyParameters) -> Vec<SimulationResult> {
        profiles.par_iter().map(|p| self.run(p, policy)).collect()
    }

    /// One borrower under many policies
    pub fn run_scenarios(&self, profile: &BorrowerProfile, policies: &[PolicyParameters]) -> Vec<SimulationResult> {
        policies.par_iter().map(|p| self.run(profile, p)).collect()
    }

    /// Every preset applied to a base profile, each compared with the status quo
    pub fn run_presets(
        &self,
        base: &BorrowerProfile,
        policy: &PolicyParameters,
    ) -> Vec<(BorrowerPreset, Comparison)> {
        info!("Running {} presets", BorrowerPreset::ALL.len());
        BorrowerPreset::ALL
            .par_iter()
            .map(|&preset| (preset, self.compare(&preset.apply(base), policy)))
            .collect()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
