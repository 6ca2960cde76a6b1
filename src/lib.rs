//! Student Loan Model - year-by-year valuation engine for income-contingent student loans
//!
//! This library provides:
//! - Macro series projection (RPI, earnings, thresholds, discount rates)
//! - Historical market rate caps blended into borrower rates
//! - Annual loan ledgers from study through repayment to write-off
//! - Present values under government, market and borrower discounting
//! - Status-quo comparisons and borrower presets

pub mod error;
pub mod inputs;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod comparison;

// Re-export commonly used types
pub use error::{ModelError, Result};
pub use inputs::{BalanceMode, BorrowerPreset, BorrowerProfile, PolicyParameters};
pub use assumptions::SchemeAssumptions;
pub use projection::{LedgerRow, LifeStage, LoanEngine, SimulationResult, SimulationSummary};
pub use scenario::ScenarioRunner;
pub use comparison::{Comparison, LoanOutcome};
