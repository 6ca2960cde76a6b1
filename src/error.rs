//! Error types for the fallible edges of the crate
//!
//! The simulation itself never fails. Errors only arise when loading series
//! from disk, exporting ledgers, or parsing parameters strictly.

use thiserror::Error;

/// Errors raised outside the pure simulation core
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for parameter {name}")]
    InvalidParameter { name: String, value: String },

    #[error("Unknown borrower preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid year-month {0:?}, expected YYYY-MM")]
    InvalidYearMonth(String),

    #[error("Series {0} contains no data points")]
    EmptySeries(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
