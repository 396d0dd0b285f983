//! Iterative bin-preserving power curve fit (Marmander).
//!
//! Measured power curves are bin averages: the value reported for a bin is the
//! mean power over every sample whose wind speed fell inside it. Drawing a
//! smooth curve through the bin centers does not preserve those means wherever
//! the curve bends. This fit adjusts the curve's knot ordinates until the
//! integral average of the curve over each bin's true boundaries reproduces
//! the observed bin average.
//!
//! ## Pre-processing
//!
//! 1. Samples are ordered by wind speed and powers rounded to the nearest kW.
//!    A negative rounded power is rejected.
//! 2. Bins whose rounded power equals the minimum (no production) or the
//!    maximum (rated), and the first and last bins, are held fixed.
//! 3. Anchor knots are added at cut-in (zero power), at the lower limit of the
//!    first rated bin (rated power) and at cut-out (last observed power).
//!    Above cut-out the curve is zero without a knot of its own.
//!
//! ## Iteration
//!
//! ```text
//! fit curve through (x, target)
//! e_i = mean(curve over bin i) - observed_i      (adjustable bins)
//! stop when rmse(e) < tolerance
//! target_i -= gain * e_i
//! ```

use crate::error::{InterpError, InterpResult};
use crate::hermite::CubicHermiteInterpolator;
use crate::integrate::{DEFAULT_INTEGRATION_STEP, bin_average};
use crate::knots::Knots;
use crate::spline::CubicSplineInterpolator;
use crate::traits::PowerFunction;
use pc_core::{BinLimits, ensure_finite, max_of, min_of, round_kw};
use serde::{Deserialize, Serialize};

/// Smooth interpolant refitted at every iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarmanderBase {
    CubicSpline,
    CubicHermite,
}

/// Iteration controls for the bin-preserving fit.
#[derive(Clone, Copy, Debug)]
pub struct MarmanderConfig {
    /// Maximum number of fits
    pub max_iterations: usize,
    /// Stopping threshold on the RMS bin-average error (kW)
    pub rmse_tolerance: f64,
    /// Fraction of each bin error removed from its target per iteration
    pub gain: f64,
    /// Integration step across a bin (m/s)
    pub integration_step: f64,
}

impl Default for MarmanderConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            rmse_tolerance: 0.01,
            gain: 1.0,
            integration_step: DEFAULT_INTEGRATION_STEP,
        }
    }
}

/// One observed bin after fitting.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedBin {
    pub wind_speed: f64,
    pub observed: f64,
    pub limits: BinLimits,
    pub adjustable: bool,
    /// Integral average of the fitted curve over `limits`
    pub fitted: f64,
}

/// Outcome of a converged fit.
#[derive(Clone, Debug)]
pub struct MarmanderFit {
    pub iterations: usize,
    pub rmse: f64,
    pub bins: Vec<FittedBin>,
}

#[derive(Clone, Debug)]
enum SmoothCurve {
    Spline(CubicSplineInterpolator),
    Hermite(CubicHermiteInterpolator),
}

impl SmoothCurve {
    fn fit(
        base: MarmanderBase,
        wind_speeds: Vec<f64>,
        powers: Vec<f64>,
        cut_out_wind_speed: f64,
    ) -> InterpResult<Self> {
        Ok(match base {
            MarmanderBase::CubicSpline => Self::Spline(CubicSplineInterpolator::new(
                wind_speeds,
                powers,
                cut_out_wind_speed,
            )?),
            MarmanderBase::CubicHermite => Self::Hermite(CubicHermiteInterpolator::new(
                wind_speeds,
                powers,
                cut_out_wind_speed,
            )?),
        })
    }
}

impl PowerFunction for SmoothCurve {
    fn power(&self, wind_speed: f64) -> f64 {
        match self {
            Self::Spline(curve) => curve.power(wind_speed),
            Self::Hermite(curve) => curve.power(wind_speed),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct KnotSpec {
    wind_speed: f64,
    power: f64,
    /// Index of the observed bin this knot belongs to, `None` for anchors.
    sample: Option<usize>,
}

/// Power curve whose bin averages match the observed ones.
#[derive(Clone, Debug)]
pub struct MarmanderInterpolator {
    curve: SmoothCurve,
    knots: Knots,
    fit: MarmanderFit,
    cut_out_wind_speed: f64,
}

impl MarmanderInterpolator {
    pub const MIN_SAMPLES: usize = 4;

    /// Fit a bin-preserving curve.
    ///
    /// # Arguments
    /// * `wind_speeds` - bin centers
    /// * `powers` - observed bin averages (kW)
    /// * `limits` - true boundaries of each bin
    /// * `cut_out_wind_speed` - zero power above this speed
    /// * `cut_in_wind_speed` - optional cut-in estimate; must fall between the
    ///   last idle bin and the first operating bin, else the first operating
    ///   bin's lower limit is used
    ///
    /// # Errors
    /// Configuration errors for malformed input, a convergence error when the
    /// RMS bin error is still above tolerance after `max_iterations` fits.
    pub fn new(
        wind_speeds: Vec<f64>,
        powers: Vec<f64>,
        limits: Vec<BinLimits>,
        cut_out_wind_speed: f64,
        cut_in_wind_speed: Option<f64>,
        base: MarmanderBase,
        config: MarmanderConfig,
    ) -> InterpResult<Self> {
        if wind_speeds.len() != powers.len() {
            return Err(InterpError::LengthMismatch {
                wind_speeds: wind_speeds.len(),
                powers: powers.len(),
            });
        }
        if limits.len() != wind_speeds.len() {
            return Err(InterpError::Configuration {
                what: format!(
                    "{} bin limits supplied for {} samples",
                    limits.len(),
                    wind_speeds.len()
                ),
            });
        }
        if wind_speeds.len() < Self::MIN_SAMPLES {
            return Err(InterpError::TooFewSamples {
                what: "marmander fit",
                needed: Self::MIN_SAMPLES,
                got: wind_speeds.len(),
            });
        }
        ensure_finite(cut_out_wind_speed, "cut-out wind speed")?;

        // Order everything by wind speed; Knots validation catches duplicates.
        let mut order: Vec<usize> = (0..wind_speeds.len()).collect();
        order.sort_by(|&a, &b| wind_speeds[a].total_cmp(&wind_speeds[b]));
        let xs: Vec<f64> = order.iter().map(|&i| wind_speeds[i]).collect();
        let ys: Vec<f64> = order.iter().map(|&i| powers[i]).collect();
        let limits: Vec<BinLimits> = order.iter().map(|&i| limits[i]).collect();
        let observed = Knots::new(xs, ys, Self::MIN_SAMPLES, "marmander fit")?;
        let xs = observed.wind_speeds();
        let ys = observed.powers();
        let n = xs.len();

        let rounded: Vec<f64> = ys.iter().map(|&p| round_kw(p)).collect();
        if let Some(i) = rounded.iter().position(|&r| r < 0.0) {
            return Err(InterpError::NegativePower {
                wind_speed: xs[i],
                power: rounded[i],
            });
        }
        // Non-empty and finite, checked above.
        let min_rounded = min_of(&rounded).unwrap_or(0.0);
        let max_rounded = max_of(&rounded).unwrap_or(0.0);
        let max_power = max_of(ys).unwrap_or(0.0);

        let adjustable: Vec<bool> = (0..n)
            .map(|i| {
                i != 0 && i != n - 1 && rounded[i] != min_rounded && rounded[i] != max_rounded
            })
            .collect();

        let first_operating =
            rounded
                .iter()
                .position(|&r| r > 0.0)
                .ok_or_else(|| InterpError::Configuration {
                    what: "power curve has no operating bins".to_string(),
                })?;
        let first_rated = rounded
            .iter()
            .position(|&r| r == max_rounded)
            .unwrap_or(first_operating);

        let mut specs: Vec<KnotSpec> = (0..n)
            .map(|i| KnotSpec {
                wind_speed: xs[i],
                power: ys[i],
                sample: Some(i),
            })
            .collect();

        let previous_idle = first_operating.checked_sub(1).map(|i| xs[i]);
        let fits_before_operating = |x: f64| {
            x < xs[first_operating] && previous_idle.is_none_or(|prev| x > prev)
        };
        let cut_in = cut_in_wind_speed
            .filter(|&x| fits_before_operating(x))
            .unwrap_or(limits[first_operating].start);
        if fits_before_operating(cut_in) {
            specs.push(KnotSpec {
                wind_speed: cut_in,
                power: 0.0,
                sample: None,
            });
        }

        if first_rated > first_operating {
            let rated_anchor = limits[first_rated].start;
            if rated_anchor > xs[first_rated - 1] && rated_anchor < xs[first_rated] {
                specs.push(KnotSpec {
                    wind_speed: rated_anchor,
                    power: max_power,
                    sample: None,
                });
            }
        }

        let last_wind_speed = xs[n - 1];
        if cut_out_wind_speed > last_wind_speed {
            specs.push(KnotSpec {
                wind_speed: cut_out_wind_speed,
                power: ys[n - 1],
                sample: None,
            });
        }
        specs.sort_by(|a, b| a.wind_speed.total_cmp(&b.wind_speed));

        let knot_xs: Vec<f64> = specs.iter().map(|k| k.wind_speed).collect();
        let mut targets: Vec<f64> = specs.iter().map(|k| k.power).collect();

        for iteration in 1..=config.max_iterations {
            let curve = SmoothCurve::fit(
                base,
                knot_xs.clone(),
                targets.clone(),
                cut_out_wind_speed,
            )?;

            let averages: Vec<f64> = limits
                .iter()
                .map(|&l| bin_average(&curve, l, config.integration_step))
                .collect();

            let mut sum_sq = 0.0;
            let mut count = 0usize;
            for i in (0..n).filter(|&i| adjustable[i]) {
                let error = averages[i] - ys[i];
                sum_sq += error * error;
                count += 1;
            }
            let rmse = if count == 0 {
                0.0
            } else {
                (sum_sq / count as f64).sqrt()
            };
            tracing::debug!(iteration, rmse, adjustable = count, "marmander fit iteration");

            if rmse < config.rmse_tolerance {
                tracing::info!(iteration, rmse, "marmander fit converged");
                let bins = (0..n)
                    .map(|i| FittedBin {
                        wind_speed: xs[i],
                        observed: ys[i],
                        limits: limits[i],
                        adjustable: adjustable[i],
                        fitted: averages[i],
                    })
                    .collect();

                let knots = Knots::new(knot_xs, targets, Self::MIN_SAMPLES, "marmander fit")?;

                return Ok(Self {
                    curve,
                    knots,
                    fit: MarmanderFit {
                        iterations: iteration,
                        rmse,
                        bins,
                    },
                    cut_out_wind_speed,
                });
            }

            for (target, spec) in targets.iter_mut().zip(&specs) {
                if let Some(i) = spec.sample.filter(|&i| adjustable[i]) {
                    *target -= config.gain * (averages[i] - ys[i]);
                }
            }
        }

        tracing::warn!(
            iterations = config.max_iterations,
            tolerance = config.rmse_tolerance,
            "marmander fit did not converge"
        );
        Err(InterpError::Convergence {
            what: format!(
                "bin-average RMSE still above {} kW",
                config.rmse_tolerance
            ),
            iterations: config.max_iterations,
        })
    }

    /// Knot table of the converged fit: adjusted ordinates plus anchors. The
    /// curve passes through every knot.
    pub fn knots(&self) -> &Knots {
        &self.knots
    }

    pub fn fit(&self) -> &MarmanderFit {
        &self.fit
    }

    pub fn cut_out_wind_speed(&self) -> f64 {
        self.cut_out_wind_speed
    }
}

impl PowerFunction for MarmanderInterpolator {
    fn power(&self, wind_speed: f64) -> f64 {
        if wind_speed > self.cut_out_wind_speed {
            return 0.0;
        }
        self.curve.power(wind_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins(xs: &[f64]) -> Vec<BinLimits> {
        xs.iter().map(|&x| BinLimits::centered(x, 1.0)).collect()
    }

    #[test]
    fn negative_rounded_power_rejected() {
        let xs = vec![3.0, 4.0, 5.0, 6.0, 7.0];
        let ys = vec![-2.0, 50.0, 150.0, 300.0, 300.0];
        let err = MarmanderInterpolator::new(
            xs.clone(),
            ys,
            bins(&xs),
            25.0,
            None,
            MarmanderBase::CubicHermite,
            MarmanderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InterpError::NegativePower { .. }));
    }

    #[test]
    fn small_negative_noise_rounds_to_zero() {
        let xs = vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let ys = vec![0.0, -0.3, 50.0, 150.0, 300.0, 300.0];
        let fit = MarmanderInterpolator::new(
            xs.clone(),
            ys,
            bins(&xs),
            25.0,
            None,
            MarmanderBase::CubicHermite,
            MarmanderConfig::default(),
        );
        assert!(fit.is_ok());
    }

    #[test]
    fn unsorted_samples_are_ordered() {
        let xs = vec![5.0, 3.0, 7.0, 4.0, 6.0, 2.0];
        let ys = vec![150.0, 0.0, 300.0, 50.0, 250.0, 0.0];
        let fit = MarmanderInterpolator::new(
            xs.clone(),
            ys,
            bins(&xs),
            25.0,
            None,
            MarmanderBase::CubicHermite,
            MarmanderConfig::default(),
        )
        .unwrap();
        let speeds: Vec<f64> = fit.fit().bins.iter().map(|b| b.wind_speed).collect();
        assert_eq!(speeds, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn idle_and_rated_bins_are_fixed() {
        let xs = vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let ys = vec![0.0, 0.0, 50.0, 150.0, 280.0, 300.0, 300.0];
        let fit = MarmanderInterpolator::new(
            xs.clone(),
            ys,
            bins(&xs),
            25.0,
            None,
            MarmanderBase::CubicHermite,
            MarmanderConfig::default(),
        )
        .unwrap();
        let adjustable: Vec<bool> = fit.fit().bins.iter().map(|b| b.adjustable).collect();
        assert_eq!(
            adjustable,
            vec![false, false, true, true, true, false, false]
        );
    }

    #[test]
    fn anchors_are_added() {
        let xs = vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let ys = vec![0.0, 0.0, 50.0, 150.0, 280.0, 300.0, 300.0];
        let fit = MarmanderInterpolator::new(
            xs.clone(),
            ys,
            bins(&xs),
            20.0,
            None,
            MarmanderBase::CubicHermite,
            MarmanderConfig::default(),
        )
        .unwrap();
        let knots = fit.knots();
        let speeds = knots.wind_speeds();
        // cut-in at 3.5, rated at 6.5 and cut-out at 20
        assert!(speeds.contains(&3.5));
        assert!(speeds.contains(&6.5));
        assert_eq!(knots.last_wind_speed(), 20.0);
        assert_eq!(knots.powers()[knots.len() - 1], 300.0);
        assert_eq!(fit.power(20.005), 0.0);
    }

    #[test]
    fn reported_knots_lie_on_the_curve() {
        let xs = vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let ys = vec![0.0, 0.0, 50.0, 150.0, 280.0, 300.0, 300.0];
        for base in [MarmanderBase::CubicSpline, MarmanderBase::CubicHermite] {
            let fit = MarmanderInterpolator::new(
                xs.clone(),
                ys.clone(),
                bins(&xs),
                20.0,
                None,
                base,
                MarmanderConfig::default(),
            )
            .unwrap();
            let knots = fit.knots();
            for (&x, &y) in knots.wind_speeds().iter().zip(knots.powers()) {
                assert!((fit.power(x) - y).abs() < 1e-6, "{base:?} at {x} m/s");
            }
        }
    }

    #[test]
    fn cut_in_estimate_outside_gap_is_ignored() {
        let xs = vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let ys = vec![0.0, 0.0, 50.0, 150.0, 300.0, 300.0];
        let fit = MarmanderInterpolator::new(
            xs.clone(),
            ys,
            bins(&xs),
            25.0,
            Some(4.2),
            MarmanderBase::CubicHermite,
            MarmanderConfig::default(),
        )
        .unwrap();
        assert!(fit.knots().wind_speeds().contains(&3.5));
        assert!(!fit.knots().wind_speeds().contains(&4.2));
    }

    #[test]
    fn single_fit_cannot_reach_tight_tolerance() {
        let xs = vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let ys = vec![0.0, 0.0, 50.0, 150.0, 300.0, 300.0];
        let config = MarmanderConfig {
            max_iterations: 1,
            rmse_tolerance: 1e-12,
            ..MarmanderConfig::default()
        };
        let err = MarmanderInterpolator::new(
            xs.clone(),
            ys,
            bins(&xs),
            25.0,
            None,
            MarmanderBase::CubicSpline,
            config,
        )
        .unwrap_err();
        assert!(matches!(err, InterpError::Convergence { iterations: 1, .. }));
    }
}
