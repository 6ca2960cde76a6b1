//! Known macro history by tax year ending
//!
//! Values past the last observed year are the published forecasts. The
//! projector extrapolates beyond whatever is stored here.

use std::collections::BTreeMap;

use super::loader::LoadedSeries;

/// Year-keyed observed values for each macro series
#[derive(Debug, Clone, Default)]
pub struct HistoricalSeries {
    /// RPI inflation rate
    pub rpi: BTreeMap<i32, f64>,

    /// Average weekly earnings index level
    pub awe: BTreeMap<i32, f64>,

    /// Repayment (lower) threshold
    pub repayment_threshold: BTreeMap<i32, f64>,

    /// Higher-interest (upper) threshold
    pub higher_interest_threshold: BTreeMap<i32, f64>,
}

const RPI: [(i32, f64); 13] = [
    (2013, 0.036),
    (2014, 0.033),
    (2015, 0.025),
    (2016, 0.009),
    (2017, 0.016),
    (2018, 0.031),
    (2019, 0.033),
    (2020, 0.024),
    (2021, 0.026),
    (2022, 0.015),
    (2023, 0.067),
    (2024, 0.077),
    (2025, 0.043),
];

/// Short-run RPI forecast before the long-run rate takes over
const RPI_FORECAST: [(i32, f64); 4] = [(2026, 0.03), (2027, 0.03), (2028, 0.03), (2029, 0.03)];

/// Last explicitly published RPI year; 2030+ is the long-run rate
const RPI_LONG_RUN_FROM: i32 = 2030;
const RPI_PUBLISHED_TO: i32 = 2060;

const REPAYMENT_THRESHOLD: [(i32, f64); 13] = [
    (2016, 21_000.0),
    (2017, 21_000.0),
    (2018, 25_000.0),
    (2019, 25_000.0),
    (2020, 25_725.0),
    (2021, 26_725.0),
    (2022, 27_295.0),
    (2023, 27_295.0),
    (2024, 27_295.0),
    (2025, 27_295.0),
    (2026, 29_385.0),
    (2027, 29_385.0),
    (2028, 29_385.0),
];

const HIGHER_INTEREST_THRESHOLD: [(i32, f64); 14] = [
    (2016, 41_000.0),
    (2017, 41_000.0),
    (2018, 45_000.0),
    (2019, 46_305.0),
    (2020, 47_835.0),
    (2021, 49_130.0),
    (2022, 49_130.0),
    (2023, 49_130.0),
    (2024, 51_245.0),
    (2025, 51_245.0),
    (2026, 52_885.0),
    (2027, 52_885.0),
    (2028, 52_885.0),
    (2029, 52_885.0),
];

const AWE: [(i32, f64); 48] = [
    (2013, 104.585707610209),
    (2014, 109.417612115425),
    (2015, 110.110016048805),
    (2016, 112.378080163611),
    (2017, 115.0884125336),
    (2018, 118.71158381233),
    (2019, 121.477053647363),
    (2020, 124.659226928468),
    (2021, 124.736737039507),
    (2022, 132.201009149403),
    (2023, 140.412025098435),
    (2024, 148.311409849505),
    (2025, 155.158695027451),
    (2026, 159.441705861328),
    (2027, 163.886552181829),
    (2028, 168.567877245132),
    (2029, 173.528884809793),
    (2030, 178.758207493962),
    (2031, 183.245038502061),
    (2032, 187.844488968462),
    (2033, 192.559385641571),
    (2034, 197.392626221174),
    (2035, 202.347181139326),
    (2036, 207.426095385923),
    (2037, 212.632490380109),
    (2038, 217.96956588865),
    (2039, 223.440601992455),
    (2040, 229.048961102466),
    (2041, 234.798090026138),
    (2042, 240.691522085794),
    (2043, 246.732879290147),
    (2044, 252.92587456033),
    (2045, 259.274314011794),
    (2046, 265.78209929349),
    (2047, 272.453229985757),
    (2048, 279.291806058399),
    (2049, 286.302030390465),
    (2050, 293.488211353265),
    (2051, 300.854765458232),
    (2052, 308.406220071234),
    (2053, 316.147216195022),
    (2054, 324.082511321517),
    (2055, 332.216982355687),
    (2056, 340.555628612815),
    (2057, 349.103574890996),
    (2058, 357.86607462076),
    (2059, 366.848513093741),
    (2060, 376.056410772394),
];

impl HistoricalSeries {
    /// Plan 2 history and published forecasts
    pub fn default_plan2(long_run_rpi: f64) -> Self {
        let mut rpi: BTreeMap<i32, f64> = RPI.iter().chain(RPI_FORECAST.iter()).copied().collect();
        for year in RPI_LONG_RUN_FROM..=RPI_PUBLISHED_TO {
            rpi.insert(year, long_run_rpi);
        }

        Self {
            rpi,
            awe: AWE.iter().copied().collect(),
            repayment_threshold: REPAYMENT_THRESHOLD.iter().copied().collect(),
            higher_interest_threshold: HIGHER_INTEREST_THRESHOLD.iter().copied().collect(),
        }
    }

    pub fn from_loaded(loaded: &LoadedSeries) -> Self {
        Self {
            rpi: loaded.rpi.clone(),
            awe: loaded.awe.clone(),
            repayment_threshold: loaded.repayment_threshold.clone(),
            higher_interest_threshold: loaded.higher_interest_threshold.clone(),
        }
    }
}
