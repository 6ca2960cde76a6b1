//! Borrower and policy inputs, plus query-string ingestion

mod borrower;
mod policy;
pub mod params;

pub use borrower::{BalanceMode, BorrowerPreset, BorrowerProfile, MAX_STUDY_YEARS};
pub use policy::{forecast_factor, PolicyParameters, MAX_WRITEOFF_YEARS};
pub use params::{parse_query_string, to_query_string, ParamMap, ParamReader};

/// Hydrate both input structs from one query string
pub fn inputs_from_query(query: &str) -> (BorrowerProfile, PolicyParameters) {
    let params = parse_query_string(query);
    (BorrowerProfile::from_params(&params), PolicyParameters::from_params(&params))
}

/// Shareable query string listing only the non-default fields
pub fn inputs_to_query(profile: &BorrowerProfile, policy: &PolicyParameters) -> String {
    let mut pairs = profile.to_params();
    pairs.extend(policy.to_params());
    to_query_string(&pairs)
}
