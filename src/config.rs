use crate::error::{RadarError, RadarResult};
use crate::models::ReductionRates;

pub const DEFAULT_COUNT: usize = 35;
pub const DEFAULT_SEED: u64 = 7;
pub const DEFAULT_R_HIGH: f64 = 0.25;
pub const DEFAULT_R_MED: f64 = 0.12;

/// Everything one dashboard refresh depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub count: usize,
    pub seed: u64,
    pub rates: ReductionRates,
    pub only_high: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            seed: DEFAULT_SEED,
            rates: ReductionRates {
                r_high: DEFAULT_R_HIGH,
                r_med: DEFAULT_R_MED,
            },
            only_high: false,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> RadarResult<()> {
        if self.count == 0 {
            return Err(RadarError::invalid_config(
                "count",
                "at least one booking is required",
            ));
        }
        if self.seed == 0 {
            return Err(RadarError::invalid_config("seed", "seed must be positive"));
        }
        self.validate_rates()
    }

    /// Checks only the what-if rates, for bookings that were not generated.
    pub fn validate_rates(&self) -> RadarResult<()> {
        check_rate("r_high", self.rates.r_high)?;
        check_rate("r_med", self.rates.r_med)?;
        Ok(())
    }
}

fn check_rate(field: &'static str, value: f64) -> RadarResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(RadarError::invalid_config(
            field,
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(())
}
