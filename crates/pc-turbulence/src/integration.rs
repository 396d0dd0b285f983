//! Probe grid and Gaussian weights for turbulence integration.

use crate::error::{TurbulenceError, TurbulenceResult};
use std::f64::consts::PI;

/// Fixed array of probe wind speeds shared by every simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationRange {
    wind_speeds: Vec<f64>,
    step: f64,
    /// step / sqrt(2 pi)
    scale: f64,
}

impl Default for IntegrationRange {
    /// 0 to 100 m/s in 0.1 m/s steps.
    fn default() -> Self {
        let count = 1001;
        Self {
            wind_speeds: (0..count).map(|i| i as f64 * 0.1).collect(),
            step: 0.1,
            scale: 0.1 / (2.0 * PI).sqrt(),
        }
    }
}

impl IntegrationRange {
    /// Probe speeds from `minimum` to `maximum` inclusive.
    pub fn new(minimum: f64, maximum: f64, step: f64) -> TurbulenceResult<Self> {
        if !(minimum.is_finite() && maximum.is_finite() && step.is_finite()) {
            return Err(TurbulenceError::Configuration {
                what: "integration range bounds must be finite".to_string(),
            });
        }
        if step <= 0.0 || maximum <= minimum {
            return Err(TurbulenceError::Configuration {
                what: format!(
                    "integration range needs step > 0 and max > min (min={minimum}, max={maximum}, step={step})"
                ),
            });
        }
        let count = ((maximum - minimum) / step).round() as usize + 1;
        Ok(Self {
            wind_speeds: (0..count).map(|i| minimum + i as f64 * step).collect(),
            step,
            scale: step / (2.0 * PI).sqrt(),
        })
    }

    pub fn wind_speeds(&self) -> &[f64] {
        &self.wind_speeds
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Discretised normal density at every probe speed:
    ///
    /// ```text
    /// w(p) = (step / sqrt(2 pi)) * (1 / sd) * exp(-0.5 * ((p - mean) / sd)^2)
    /// ```
    pub fn probabilities(&self, mean: f64, standard_deviation: f64) -> Vec<f64> {
        let one_over_sd = 1.0 / standard_deviation;
        self.wind_speeds
            .iter()
            .map(|&p| self.weight(p, mean, one_over_sd))
            .collect()
    }

    #[inline]
    pub(crate) fn weight(&self, probe: f64, mean: f64, one_over_sd: f64) -> f64 {
        let z = (probe - mean) * one_over_sd;
        self.scale * one_over_sd * (-0.5 * z * z).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_spans_zero_to_hundred() {
        let range = IntegrationRange::default();
        assert_eq!(range.wind_speeds().len(), 1001);
        assert_eq!(range.wind_speeds()[0], 0.0);
        assert!((range.wind_speeds()[1000] - 100.0).abs() < 1e-9);
        assert_eq!(range, IntegrationRange::new(0.0, 100.0, 0.1).unwrap());
    }

    #[test]
    fn probabilities_sum_to_about_one() {
        let range = IntegrationRange::default();
        let total: f64 = range.probabilities(10.0, 1.0).iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn probabilities_peak_at_mean() {
        let range = IntegrationRange::default();
        let weights = range.probabilities(10.0, 1.0);
        let peak = weights
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(100));
    }

    #[test]
    fn invalid_range_rejected() {
        assert!(IntegrationRange::new(0.0, 100.0, 0.0).is_err());
        assert!(IntegrationRange::new(10.0, 5.0, 0.1).is_err());
    }
}
