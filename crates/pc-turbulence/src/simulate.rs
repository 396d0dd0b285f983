//! Forward turbulence simulation.
//!
//! A zero-turbulence curve is evaluated once on the integration grid; each
//! query then averages those values under a Gaussian centred on the mean wind
//! speed with standard deviation `v * ti`.

use crate::error::{TurbulenceError, TurbulenceResult};
use crate::integration::IntegrationRange;
use crate::relaxation::Relaxation;
use pc_interp::PowerFunction;
use std::sync::Arc;

/// Expected power of a curve under turbulent inflow.
#[derive(Clone, Debug)]
pub struct SimulatedPower<C> {
    curve: C,
    range: Arc<IntegrationRange>,
    /// `curve.power` at every probe speed of `range`.
    integration_powers: Vec<f64>,
    relaxation: Relaxation,
}

impl<C: PowerFunction> SimulatedPower<C> {
    pub fn new(curve: C, range: Arc<IntegrationRange>, relaxation: Relaxation) -> Self {
        let integration_powers = range
            .wind_speeds()
            .iter()
            .map(|&v| curve.power(v))
            .collect();
        Self {
            curve,
            range,
            integration_powers,
            relaxation,
        }
    }

    pub fn curve(&self) -> &C {
        &self.curve
    }

    pub fn relaxation(&self) -> Relaxation {
        self.relaxation
    }

    pub fn range(&self) -> &IntegrationRange {
        &self.range
    }

    /// Simulated power at mean wind speed `wind_speed` and turbulence
    /// intensity `turbulence`, after relaxation.
    ///
    /// Zero spread returns the underlying curve value exactly. So does a
    /// spread too narrow for any probe to carry weight.
    pub fn power(&self, wind_speed: f64, turbulence: f64) -> f64 {
        let turbulence = self.relaxation.relax(wind_speed, turbulence);
        let sigma = wind_speed * turbulence;
        if sigma <= 0.0 || !sigma.is_finite() {
            return self.curve.power(wind_speed);
        }

        let one_over_sd = 1.0 / sigma;
        let (weighted, total) = self
            .range
            .wind_speeds()
            .iter()
            .zip(&self.integration_powers)
            .fold((0.0, 0.0), |(weighted, total), (&probe, &power)| {
                let w = self.range.weight(probe, wind_speed, one_over_sd);
                (weighted + w * power, total + w)
            });

        if total > 0.0 {
            weighted / total
        } else {
            self.curve.power(wind_speed)
        }
    }
}

/// Simulated powers at a list of operating points.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatedCurve {
    pub wind_speeds: Vec<f64>,
    pub turbulences: Vec<f64>,
    pub powers: Vec<f64>,
}

/// Simulate `curve` at every `(wind_speeds[i], turbulences[i])` pair.
///
/// # Errors
/// The two slices must have equal length.
pub fn simulate_curve<C: PowerFunction>(
    curve: C,
    wind_speeds: &[f64],
    turbulences: &[f64],
    range: Arc<IntegrationRange>,
    relaxation: Relaxation,
) -> TurbulenceResult<SimulatedCurve> {
    if wind_speeds.len() != turbulences.len() {
        return Err(TurbulenceError::Configuration {
            what: format!(
                "{} wind speeds but {} turbulence intensities",
                wind_speeds.len(),
                turbulences.len()
            ),
        });
    }
    let simulated = SimulatedPower::new(curve, range, relaxation);
    let powers = wind_speeds
        .iter()
        .zip(turbulences)
        .map(|(&v, &ti)| simulated.power(v, ti))
        .collect();
    Ok(SimulatedCurve {
        wind_speeds: wind_speeds.to_vec(),
        turbulences: turbulences.to_vec(),
        powers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f64);

    impl PowerFunction for Constant {
        fn power(&self, _wind_speed: f64) -> f64 {
            self.0
        }
    }

    struct Line;

    impl PowerFunction for Line {
        fn power(&self, wind_speed: f64) -> f64 {
            100.0 * wind_speed
        }
    }

    struct Cubic;

    impl PowerFunction for Cubic {
        fn power(&self, wind_speed: f64) -> f64 {
            wind_speed.powi(3)
        }
    }

    fn range() -> Arc<IntegrationRange> {
        Arc::new(IntegrationRange::default())
    }

    #[test]
    fn zero_turbulence_returns_curve_value() {
        let simulated = SimulatedPower::new(Cubic, range(), Relaxation::None);
        assert_eq!(simulated.power(7.3, 0.0), 7.3_f64.powi(3));
    }

    #[test]
    fn constant_curve_is_unchanged() {
        let simulated = SimulatedPower::new(Constant(1500.0), range(), Relaxation::None);
        assert!((simulated.power(10.0, 0.15) - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn linear_curve_keeps_its_mean() {
        let simulated = SimulatedPower::new(Line, range(), Relaxation::None);
        assert!((simulated.power(10.0, 0.1) - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn convex_curve_gains_power() {
        // E[v^3] = mu^3 + 3 mu sigma^2 for a normal distribution
        let simulated = SimulatedPower::new(Cubic, range(), Relaxation::None);
        let expected = 1000.0 + 3.0 * 10.0 * 1.0;
        assert!((simulated.power(10.0, 0.1) - expected).abs() < 1e-3);
    }

    #[test]
    fn relaxation_reduces_spread() {
        let full = SimulatedPower::new(Cubic, range(), Relaxation::None);
        let relaxed = SimulatedPower::new(Cubic, range(), Relaxation::Scaled { factor: 0.5 });
        let blurred_full = full.power(10.0, 0.2) - 1000.0;
        let blurred_half = relaxed.power(10.0, 0.2) - 1000.0;
        assert!((blurred_full / blurred_half - 4.0).abs() < 1e-3);
        assert_eq!(relaxed.power(10.0, 0.1), full.power(10.0, 0.05));
    }

    #[test]
    fn simulate_curve_requires_matching_lengths() {
        assert!(simulate_curve(Cubic, &[1.0, 2.0], &[0.1], range(), Relaxation::None).is_err());
        let curve = simulate_curve(Cubic, &[5.0, 8.0], &[0.0, 0.0], range(), Relaxation::None)
            .unwrap();
        assert_eq!(curve.powers, vec![125.0, 512.0]);
    }
}
