//! Borrower profile and the built-in borrower presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::params::{format_number, ParamMap, ParamReader};
use crate::error::ModelError;

/// How the opening balance is formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceMode {
    /// Balance accrues from tuition and maintenance borrowing while studying
    #[default]
    BuildUp,
    /// Balance is pinned to a known figure in the anchor year
    StartingBalance,
}

impl BalanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceMode::BuildUp => "build-up",
            BalanceMode::StartingBalance => "starting-balance",
        }
    }
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalanceMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build-up" => Ok(BalanceMode::BuildUp),
            "starting-balance" => Ok(BalanceMode::StartingBalance),
            other => Err(ModelError::InvalidParameter {
                name: "balanceMode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Longest course length accepted from raw parameters
pub const MAX_STUDY_YEARS: i32 = 10;

/// A single borrower, fixed for the duration of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BorrowerProfile {
    /// Tax year ending in which the borrower graduates
    pub graduation_year: i32,

    /// Salary in the graduation year
    pub starting_salary: f64,

    /// Years of study before graduation
    pub study_years: i32,

    pub balance_mode: BalanceMode,

    /// Annual tuition fee loan (build-up mode only)
    pub tuition_fee: f64,

    /// Annual maintenance loan (build-up mode only)
    pub maintenance_loan: f64,

    /// Balance in the 2025 anchor year (starting-balance mode only)
    pub starting_balance_2025: f64,
}

impl Default for BorrowerProfile {
    fn default() -> Self {
        Self {
            graduation_year: 2018,
            starting_salary: 25_000.0,
            study_years: 3,
            balance_mode: BalanceMode::BuildUp,
            tuition_fee: 9_000.0,
            maintenance_loan: 3_900.0,
            starting_balance_2025: 54_421.0,
        }
    }
}

impl BorrowerProfile {
    /// Hydrate from raw parameters, falling back to defaults field by field
    pub fn from_params(params: &ParamMap) -> Self {
        Self::from_reader(ParamReader::new(params))
    }

    pub fn from_reader(reader: ParamReader<'_>) -> Self {
        let d = Self::default();
        Self {
            graduation_year: reader.integer("graduationYear", d.graduation_year),
            starting_salary: reader.number("startingSalary", d.starting_salary),
            study_years: reader.integer_in("studyYears", d.study_years, 0..=MAX_STUDY_YEARS),
            balance_mode: reader.choice("balanceMode", d.balance_mode),
            tuition_fee: reader.number("tuitionFee", d.tuition_fee),
            maintenance_loan: reader.number("maintenanceLoan", d.maintenance_loan),
            starting_balance_2025: reader.number("startingBalance2025", d.starting_balance_2025),
        }
    }

    /// Fields that differ from the defaults, in declaration order
    pub fn to_params(&self) -> Vec<(String, String)> {
        let d = Self::default();
        let mut out = Vec::new();

        if self.graduation_year != d.graduation_year {
            out.push(("graduationYear".into(), self.graduation_year.to_string()));
        }
        if self.starting_salary != d.starting_salary {
            out.push(("startingSalary".into(), format_number(self.starting_salary)));
        }
        if self.study_years != d.study_years {
            out.push(("studyYears".into(), self.study_years.to_string()));
        }
        if self.balance_mode != d.balance_mode {
            out.push(("balanceMode".into(), self.balance_mode.as_str().to_string()));
        }
        if self.tuition_fee != d.tuition_fee {
            out.push(("tuitionFee".into(), format_number(self.tuition_fee)));
        }
        if self.maintenance_loan != d.maintenance_loan {
            out.push(("maintenanceLoan".into(), format_number(self.maintenance_loan)));
        }
        if self.starting_balance_2025 != d.starting_balance_2025 {
            out.push(("startingBalance2025".into(), format_number(self.starting_balance_2025)));
        }

        out
    }

    /// Annual borrowing while studying in build-up mode
    pub fn annual_borrowing(&self) -> f64 {
        self.tuition_fee + self.maintenance_loan
    }
}

/// Canned earnings profiles for quick comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowerPreset {
    High,
    Mid,
    Low,
}

impl BorrowerPreset {
    pub const ALL: [BorrowerPreset; 3] = [BorrowerPreset::High, BorrowerPreset::Mid, BorrowerPreset::Low];

    pub fn starting_salary(&self) -> f64 {
        match self {
            BorrowerPreset::High => 50_000.0,
            BorrowerPreset::Mid => 25_000.0,
            BorrowerPreset::Low => 16_000.0,
        }
    }

    pub fn graduation_year(&self) -> i32 {
        2018
    }

    /// Overlay the preset's fields onto an existing profile
    pub fn apply(&self, profile: &BorrowerProfile) -> BorrowerProfile {
        BorrowerProfile {
            graduation_year: self.graduation_year(),
            starting_salary: self.starting_salary(),
            ..profile.clone()
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowerPreset::High => "high",
            BorrowerPreset::Mid => "mid",
            BorrowerPreset::Low => "low",
        }
    }
}

impl fmt::Display for BorrowerPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BorrowerPreset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(BorrowerPreset::High),
            "mid" => Ok(BorrowerPreset::Mid),
            "low" => Ok(BorrowerPreset::Low),
            other => Err(ModelError::UnknownPreset(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::params::parse_query_string;

    #[test]
    fn test_defaults_when_params_empty() {
        let profile = BorrowerProfile::from_params(&ParamMap::new());
        assert_eq!(profile, BorrowerProfile::default());
    }

    #[test]
    fn test_invalid_balance_mode_falls_back() {
        let params = parse_query_string("balanceMode=lump-sum&startingSalary=31000");
        let profile = BorrowerProfile::from_params(&params);
        assert_eq!(profile.balance_mode, BalanceMode::BuildUp);
        assert_eq!(profile.starting_salary, 31_000.0);

        let params = parse_query_string("balanceMode=starting-balance");
        let profile = BorrowerProfile::from_params(&params);
        assert_eq!(profile.balance_mode, BalanceMode::StartingBalance);
    }

    #[test]
    fn test_to_params_only_lists_changes() {
        let profile = BorrowerProfile {
            starting_salary: 30_000.0,
            balance_mode: BalanceMode::StartingBalance,
            ..Default::default()
        };
        let params = profile.to_params();
        assert_eq!(
            params,
            vec![
                ("startingSalary".to_string(), "30000".to_string()),
                ("balanceMode".to_string(), "starting-balance".to_string()),
            ]
        );

        let map: ParamMap = params.into_iter().collect();
        assert_eq!(BorrowerProfile::from_params(&map), profile);
    }

    #[test]
    fn test_presets() {
        let low: BorrowerPreset = "Low".parse().unwrap();
        let profile = low.apply(&BorrowerProfile::default());
        assert_eq!(profile.starting_salary, 16_000.0);
        assert_eq!(profile.graduation_year, 2018);
        assert!(matches!(
            "extreme".parse::<BorrowerPreset>(),
            Err(ModelError::UnknownPreset(_))
        ));
    }
}
