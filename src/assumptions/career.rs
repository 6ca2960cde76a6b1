//! Age-banded real earnings growth over a career

/// Inclusive age band with its annual career-progression growth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CareerBand {
    pub min_age: i32,
    pub max_age: i32,
    pub rate: f64,
}

/// Ordered, non-overlapping career growth bands
#[derive(Debug, Clone)]
pub struct CareerGrowthBands {
    bands: Vec<CareerBand>,
}

impl CareerGrowthBands {
    pub fn new(bands: Vec<CareerBand>) -> Self {
        Self { bands }
    }

    pub fn default_plan2() -> Self {
        Self::new(vec![
            CareerBand { min_age: 18, max_age: 21, rate: 0.0382 },
            CareerBand { min_age: 22, max_age: 29, rate: 0.0244 },
            CareerBand { min_age: 30, max_age: 39, rate: 0.0078 },
            CareerBand { min_age: 40, max_age: 49, rate: -0.0046 },
            CareerBand { min_age: 50, max_age: 120, rate: -0.0133 },
        ])
    }

    /// Growth for an age; ages outside every band grow at zero
    pub fn rate_for_age(&self, age: i32) -> f64 {
        self.bands
            .iter()
            .find(|band| age >= band.min_age && age <= band.max_age)
            .map(|band| band.rate)
            .unwrap_or(0.0)
    }
}

impl Default for CareerGrowthBands {
    fn default() -> Self {
        Self::default_plan2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        let bands = CareerGrowthBands::default_plan2();
        assert_eq!(bands.rate_for_age(21), 0.0382);
        assert_eq!(bands.rate_for_age(22), 0.0244);
        assert_eq!(bands.rate_for_age(39), 0.0078);
        assert_eq!(bands.rate_for_age(50), -0.0133);
    }

    #[test]
    fn test_out_of_band_is_zero() {
        let bands = CareerGrowthBands::default_plan2();
        assert_eq!(bands.rate_for_age(17), 0.0);
        assert_eq!(bands.rate_for_age(121), 0.0);
    }
}
