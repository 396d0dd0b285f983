//! Recovery of the zero-turbulence power curve.
//!
//! A measured curve is the zero-turbulence curve blurred by turbulence. The
//! inversion runs in two stages:
//!
//! 1. Fixed point over three statistics (rated power, cut-in, peak Cp). An
//!    idealized curve built from trial statistics is simulated at the
//!    reference operating points; trial statistics move against the
//!    difference between simulated and reference statistics until all three
//!    agree within tolerance.
//! 2. Residual correction. At each reference wind speed
//!    `P0 = P_ref - P_sim + P_ideal`, so whatever shape the idealized curve
//!    cannot express is carried over from the measurement unchanged.

use crate::error::{TurbulenceError, TurbulenceResult};
use crate::idealized::IdealizedCurve;
use crate::integration::IntegrationRange;
use crate::relaxation::Relaxation;
use crate::simulate::simulate_curve;
use crate::stats::{ConvergenceCheck, IterationStats};
use pc_core::{AvailablePower, DomainWarning};
use pc_interp::PowerFunction;
use std::sync::Arc;

/// A measured curve together with the turbulence it was measured at.
#[derive(Clone, Copy, Debug)]
pub struct ReferenceCurve<'a> {
    wind_speeds: &'a [f64],
    powers: &'a [f64],
    turbulences: &'a [f64],
}

impl<'a> ReferenceCurve<'a> {
    /// # Errors
    /// Slices must have equal length, at least two entries, finite values,
    /// strictly increasing wind speeds and non-negative turbulence.
    pub fn new(
        wind_speeds: &'a [f64],
        powers: &'a [f64],
        turbulences: &'a [f64],
    ) -> TurbulenceResult<Self> {
        if wind_speeds.len() != powers.len() || wind_speeds.len() != turbulences.len() {
            return Err(TurbulenceError::Configuration {
                what: format!(
                    "reference curve has {} wind speeds, {} powers and {} turbulence intensities",
                    wind_speeds.len(),
                    powers.len(),
                    turbulences.len()
                ),
            });
        }
        if wind_speeds.len() < 2 {
            return Err(TurbulenceError::Configuration {
                what: "reference curve needs at least two samples".to_string(),
            });
        }
        let all_finite = wind_speeds
            .iter()
            .chain(powers)
            .chain(turbulences)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(TurbulenceError::Configuration {
                what: "reference curve contains non-finite values".to_string(),
            });
        }
        if let Some(w) = wind_speeds.windows(2).find(|w| w[1] <= w[0]) {
            return Err(TurbulenceError::Configuration {
                what: format!(
                    "reference wind speeds must increase strictly ({} then {})",
                    w[0], w[1]
                ),
            });
        }
        if let Some(ti) = turbulences.iter().find(|&&ti| ti < 0.0) {
            return Err(TurbulenceError::Configuration {
                what: format!("turbulence intensity must be non-negative, got {ti}"),
            });
        }
        Ok(Self {
            wind_speeds,
            powers,
            turbulences,
        })
    }

    pub fn wind_speeds(&self) -> &'a [f64] {
        self.wind_speeds
    }

    pub fn powers(&self) -> &'a [f64] {
        self.powers
    }

    pub fn turbulences(&self) -> &'a [f64] {
        self.turbulences
    }

    /// Samples converting more than the Betz limit of the available power.
    pub fn betz_warnings(&self, available: &AvailablePower) -> Vec<DomainWarning> {
        self.wind_speeds
            .iter()
            .zip(self.powers)
            .filter_map(|(&v, &p)| available.check_betz(v, p))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeconvolutionConfig {
    /// Idealized curves simulated before giving up.
    pub max_iterations: usize,
    /// Upper bound on the converged rated wind speed.
    pub cut_out_wind_speed: Option<f64>,
}

impl Default for DeconvolutionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            cut_out_wind_speed: None,
        }
    }
}

impl DeconvolutionConfig {
    pub fn with_cut_out(mut self, cut_out_wind_speed: f64) -> Self {
        self.cut_out_wind_speed = Some(cut_out_wind_speed);
        self
    }
}

/// The power curve a turbine would follow in perfectly steady flow.
///
/// Non-decreasing and bounded by rated power. Zero at or below the first
/// reference wind speed and held at its last operating value from the last
/// reference wind speed with positive power.
#[derive(Clone, Debug)]
pub struct ZeroTurbulenceCurve {
    wind_speeds: Vec<f64>,
    powers: Vec<f64>,
    last_operating_index: usize,
    idealized: IdealizedCurve,
    reference_stats: IterationStats,
    iterations: usize,
}

impl ZeroTurbulenceCurve {
    /// Deconvolve `reference` at the turbulence it was measured at.
    ///
    /// Betz exceedances are not checked here; see
    /// [`ReferenceCurve::betz_warnings`].
    ///
    /// # Errors
    /// - `Configuration` if the reference never produces power, or the
    ///   converged rated wind speed lies beyond `config.cut_out_wind_speed`
    /// - `Convergence` if the statistics do not agree within
    ///   `config.max_iterations` simulations
    pub fn deconvolve(
        reference: &ReferenceCurve<'_>,
        available: AvailablePower,
        range: Arc<IntegrationRange>,
        relaxation: Relaxation,
        config: &DeconvolutionConfig,
    ) -> TurbulenceResult<Self> {
        let xs = reference.wind_speeds();
        let ys = reference.powers();

        let reference_stats = IterationStats::from_curve(xs, ys, &available);
        let last_operating_index = ys.iter().rposition(|&p| p > 0.0).ok_or_else(|| {
            TurbulenceError::Configuration {
                what: "reference curve never produces power".to_string(),
            }
        })?;
        tracing::debug!(
            rated_power = reference_stats.rated_power,
            cut_in = reference_stats.cut_in_wind_speed,
            cp_max = reference_stats.cp_max,
            "zero-turbulence deconvolution started"
        );

        let mut trial = reference_stats;
        for iteration in 1..=config.max_iterations {
            let idealized = IdealizedCurve::new(trial, available).map_err(|e| match e {
                TurbulenceError::Configuration { what } if iteration > 1 => {
                    TurbulenceError::Convergence {
                        what: format!("trial statistics became non-physical: {what}"),
                        iterations: iteration - 1,
                    }
                }
                other => other,
            })?;

            let simulated = simulate_curve(
                &idealized,
                xs,
                reference.turbulences(),
                Arc::clone(&range),
                relaxation,
            )?;
            let simulated_stats = IterationStats::from_curve(xs, &simulated.powers, &available);
            let check = ConvergenceCheck::new(&reference_stats, &simulated_stats);
            tracing::debug!(
                iteration,
                rated_power_diff = check.rated_power_diff,
                cut_in_diff = check.cut_in_diff,
                cp_max_diff = check.cp_max_diff,
                "zero-turbulence iteration"
            );

            if check.is_converged() {
                if let Some(cut_out) = config.cut_out_wind_speed
                    && idealized.rated_wind_speed() > cut_out
                {
                    tracing::warn!(
                        rated_wind_speed = idealized.rated_wind_speed(),
                        cut_out,
                        "zero-turbulence rated wind speed beyond cut-out"
                    );
                    return Err(TurbulenceError::Configuration {
                        what: format!(
                            "rated wind speed {:.3} m/s lies beyond cut-out {cut_out} m/s",
                            idealized.rated_wind_speed()
                        ),
                    });
                }
                tracing::info!(
                    iterations = iteration,
                    rated_power = idealized.rated_power(),
                    rated_wind_speed = idealized.rated_wind_speed(),
                    "zero-turbulence curve converged"
                );
                let powers = corrected_powers(xs, ys, &simulated.powers, &idealized);
                return Ok(Self {
                    wind_speeds: xs.to_vec(),
                    powers,
                    last_operating_index,
                    idealized,
                    reference_stats,
                    iterations: iteration,
                });
            }
            trial = trial.incremented(&check);
        }

        tracing::warn!(
            iterations = config.max_iterations,
            "zero-turbulence curve did not converge"
        );
        Err(TurbulenceError::Convergence {
            what: "zero-turbulence statistics".to_string(),
            iterations: config.max_iterations,
        })
    }

    pub fn rated_power(&self) -> f64 {
        self.idealized.rated_power()
    }

    pub fn rated_wind_speed(&self) -> f64 {
        self.idealized.rated_wind_speed()
    }

    pub fn cut_in_wind_speed(&self) -> f64 {
        self.idealized.cut_in_wind_speed()
    }

    /// Converged idealized curve.
    pub fn idealized(&self) -> &IdealizedCurve {
        &self.idealized
    }

    pub fn reference_stats(&self) -> IterationStats {
        self.reference_stats
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn wind_speeds(&self) -> &[f64] {
        &self.wind_speeds
    }

    /// Corrected ordinates at the reference wind speeds.
    pub fn powers(&self) -> &[f64] {
        &self.powers
    }
}

/// `P_ref - P_sim + P_ideal`, clamped to `[0, rated]` and made non-decreasing.
fn corrected_powers(
    wind_speeds: &[f64],
    reference: &[f64],
    simulated: &[f64],
    idealized: &IdealizedCurve,
) -> Vec<f64> {
    let rated = idealized.rated_power();
    let mut running_max = 0.0_f64;
    wind_speeds
        .iter()
        .zip(reference)
        .zip(simulated)
        .map(|((&v, &p_ref), &p_sim)| {
            let corrected = (p_ref - p_sim + idealized.power(v)).clamp(0.0, rated);
            running_max = running_max.max(corrected);
            running_max
        })
        .collect()
}

impl PowerFunction for ZeroTurbulenceCurve {
    fn power(&self, wind_speed: f64) -> f64 {
        let xs = &self.wind_speeds;
        let ys = &self.powers;
        if wind_speed.is_nan() || wind_speed <= xs[0] {
            return 0.0;
        }
        let last = self.last_operating_index;
        if wind_speed >= xs[last] {
            return ys[last];
        }
        let i = xs.partition_point(|&x| x <= wind_speed) - 1;
        let t = (wind_speed - xs[i]) / (xs[i + 1] - xs[i]);
        ys[i] + t * (ys[i + 1] - ys[i])
    }
}
