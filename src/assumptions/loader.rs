//! CSV-based series loader
//!
//! Loads macro history and cap periods from CSV files in data/series/

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use log::info;
use serde::Deserialize;

use super::rate_cap::{CapPeriod, YearMonth};
use crate::error::{ModelError, Result};

/// Default path to the series directory
pub const DEFAULT_SERIES_PATH: &str = "data/series";

#[derive(Debug, Deserialize)]
struct YearValueRow {
    year: i32,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct CapPeriodRow {
    start: String,
    end: String,
    rate: f64,
}

/// Load a `year,value` file into a year-keyed map
pub fn load_year_series(path: &Path, file_name: &str) -> Result<BTreeMap<i32, f64>> {
    let file = File::open(path.join(file_name))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut series = BTreeMap::new();
    for result in reader.deserialize() {
        let row: YearValueRow = result?;
        series.insert(row.year, row.value);
    }

    if series.is_empty() {
        return Err(ModelError::EmptySeries(file_name.to_string()));
    }

    Ok(series)
}

/// Load `start,end,rate` cap periods with `YYYY-MM` month bounds
pub fn load_cap_periods(path: &Path) -> Result<Vec<CapPeriod>> {
    let file = File::open(path.join("cap_periods.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut periods = Vec::new();
    for result in reader.deserialize() {
        let row: CapPeriodRow = result?;
        periods.push(CapPeriod::new(
            YearMonth::parse(&row.start)?,
            YearMonth::parse(&row.end)?,
            row.rate,
        ));
    }

    Ok(periods)
}

/// All series loaded from a directory
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub rpi: BTreeMap<i32, f64>,
    pub awe: BTreeMap<i32, f64>,
    pub repayment_threshold: BTreeMap<i32, f64>,
    pub higher_interest_threshold: BTreeMap<i32, f64>,
    pub cap_periods: Vec<CapPeriod>,
}

impl LoadedSeries {
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_SERIES_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let loaded = Self {
            rpi: load_year_series(path, "rpi.csv")?,
            awe: load_year_series(path, "awe.csv")?,
            repayment_threshold: load_year_series(path, "repayment_threshold.csv")?,
            higher_interest_threshold: load_year_series(path, "higher_interest_threshold.csv")?,
            cap_periods: load_cap_periods(path)?,
        };

        info!(
            "Loaded series from {}: {} RPI years, {} AWE years, {} cap periods",
            path.display(),
            loaded.rpi.len(),
            loaded.awe.len(),
            loaded.cap_periods.len()
        );

        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::history::HistoricalSeries;

    #[test]
    fn test_load_default_series() {
        let result = LoadedSeries::load_default();
        assert!(result.is_ok(), "Failed to load series: {:?}", result.err());

        let loaded = result.unwrap();
        let builtin = HistoricalSeries::default_plan2(0.021);

        assert_eq!(loaded.rpi, builtin.rpi);
        assert_eq!(loaded.awe, builtin.awe);
        assert_eq!(loaded.repayment_threshold, builtin.repayment_threshold);
        assert_eq!(loaded.higher_interest_threshold, builtin.higher_interest_threshold);
        assert_eq!(loaded.cap_periods.len(), 15);
        assert_eq!(loaded.cap_periods[0].start, YearMonth::new(2021, 7));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = LoadedSeries::load_from(Path::new("data/does-not-exist")).unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }
}
