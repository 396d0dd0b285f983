//! Three-segment curve generated from summary statistics.

use crate::error::{TurbulenceError, TurbulenceResult};
use crate::stats::IterationStats;
use pc_core::AvailablePower;
use pc_interp::PowerFunction;

/// Zero below cut-in, constant Cp times available power up to rated wind
/// speed, then flat at rated power.
///
/// ```text
/// V_r = (2000 * P / (rho * Cp * A))^(1/3)
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdealizedCurve {
    stats: IterationStats,
    rated_wind_speed: f64,
    available: AvailablePower,
}

impl IdealizedCurve {
    /// # Errors
    /// Rated power and Cp must be finite and positive, and cut-in must not lie
    /// above the rated wind speed they imply.
    pub fn new(stats: IterationStats, available: AvailablePower) -> TurbulenceResult<Self> {
        let IterationStats {
            rated_power,
            cut_in_wind_speed,
            cp_max,
        } = stats;
        if !(rated_power.is_finite() && rated_power > 0.0) {
            return Err(TurbulenceError::Configuration {
                what: format!("idealized curve needs a positive rated power, got {rated_power}"),
            });
        }
        if !(cp_max.is_finite() && cp_max > 0.0) {
            return Err(TurbulenceError::Configuration {
                what: format!("idealized curve needs a positive power coefficient, got {cp_max}"),
            });
        }
        if !cut_in_wind_speed.is_finite() {
            return Err(TurbulenceError::Configuration {
                what: "idealized curve needs a finite cut-in wind speed".to_string(),
            });
        }
        let rated_wind_speed = (2000.0 * rated_power
            / (available.density() * cp_max * available.area()))
        .cbrt();
        if cut_in_wind_speed > rated_wind_speed {
            return Err(TurbulenceError::Configuration {
                what: format!(
                    "cut-in wind speed {cut_in_wind_speed} m/s exceeds rated wind speed \
                     {rated_wind_speed:.3} m/s"
                ),
            });
        }
        Ok(Self {
            stats,
            rated_wind_speed,
            available,
        })
    }

    pub fn stats(&self) -> IterationStats {
        self.stats
    }

    pub fn rated_power(&self) -> f64 {
        self.stats.rated_power
    }

    pub fn cut_in_wind_speed(&self) -> f64 {
        self.stats.cut_in_wind_speed
    }

    pub fn cp_max(&self) -> f64 {
        self.stats.cp_max
    }

    pub fn rated_wind_speed(&self) -> f64 {
        self.rated_wind_speed
    }
}

impl PowerFunction for IdealizedCurve {
    fn power(&self, wind_speed: f64) -> f64 {
        if wind_speed <= self.stats.cut_in_wind_speed {
            0.0
        } else if wind_speed < self.rated_wind_speed {
            self.stats.cp_max * self.available.power(wind_speed)
        } else {
            self.stats.rated_power
        }
    }
}
