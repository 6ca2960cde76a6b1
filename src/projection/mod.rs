//! Year-by-year loan ledger projection and valuation

mod discount;
mod engine;
mod ledger;
mod lifecycle;
mod state;
mod valuation;

pub use discount::{DiscountFactors, DiscountRegime, PresentValues, RegimeRates};
pub use engine::LoanEngine;
pub use ledger::{round_currency, write_ledger_csv, LedgerRow, SimulationResult, SimulationSummary};
pub use lifecycle::LifeStage;
pub use state::LedgerState;
pub use valuation::summarize;
