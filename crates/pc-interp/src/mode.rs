//! Interpolation mode selection and enum dispatch over the interpolators.

use crate::error::{InterpError, InterpResult};
use crate::hermite::CubicHermiteInterpolator;
use crate::knots::Knots;
use crate::linear::LinearInterpolator;
use crate::marmander::{MarmanderBase, MarmanderConfig, MarmanderInterpolator};
use crate::spline::CubicSplineInterpolator;
use crate::traits::PowerFunction;
use pc_core::BinLimits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which interpolator turns bin samples into a continuous curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InterpolationMode {
    Linear,
    #[default]
    CubicSpline,
    CubicHermite,
    MarmanderCubicSpline,
    MarmanderCubicHermite,
}

impl InterpolationMode {
    pub const ALL: [InterpolationMode; 5] = [
        InterpolationMode::Linear,
        InterpolationMode::CubicSpline,
        InterpolationMode::CubicHermite,
        InterpolationMode::MarmanderCubicSpline,
        InterpolationMode::MarmanderCubicHermite,
    ];

    /// Configuration name of the mode.
    pub fn name(self) -> &'static str {
        match self {
            InterpolationMode::Linear => "Linear",
            InterpolationMode::CubicSpline => "Cubic Spline",
            InterpolationMode::CubicHermite => "Cubic Hermite",
            InterpolationMode::MarmanderCubicSpline => "Marmander (Cubic Spline)",
            InterpolationMode::MarmanderCubicHermite => "Marmander (Cubic Hermite)",
        }
    }

    pub fn is_marmander(self) -> bool {
        matches!(
            self,
            InterpolationMode::MarmanderCubicSpline | InterpolationMode::MarmanderCubicHermite
        )
    }

    /// Fewest distinct samples the mode accepts.
    pub fn min_samples(self) -> usize {
        match self {
            InterpolationMode::Linear => LinearInterpolator::MIN_SAMPLES,
            InterpolationMode::CubicSpline => CubicSplineInterpolator::MIN_SAMPLES,
            InterpolationMode::CubicHermite => CubicHermiteInterpolator::MIN_SAMPLES,
            InterpolationMode::MarmanderCubicSpline
            | InterpolationMode::MarmanderCubicHermite => MarmanderInterpolator::MIN_SAMPLES,
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolationMode {
    type Err = InterpError;

    /// Accepts the configuration names and their compact forms, ignoring case,
    /// spaces, hyphens, underscores and parentheses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_' | '(' | ')'))
            .flat_map(char::to_lowercase)
            .collect();
        match compact.as_str() {
            "linear" => Ok(InterpolationMode::Linear),
            "cubicspline" => Ok(InterpolationMode::CubicSpline),
            "cubichermite" => Ok(InterpolationMode::CubicHermite),
            "marmandercubicspline" | "marmanderspline" => {
                Ok(InterpolationMode::MarmanderCubicSpline)
            }
            "marmandercubichermite" | "marmanderhermite" => {
                Ok(InterpolationMode::MarmanderCubicHermite)
            }
            _ => Err(InterpError::UnknownMode {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for InterpolationMode {
    type Error = InterpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InterpolationMode> for String {
    fn from(mode: InterpolationMode) -> Self {
        mode.name().to_string()
    }
}

/// Everything an interpolator may need.
///
/// `bin_limits` and `cut_in_wind_speed` are only read by the Marmander fit.
/// Without limits each bin is taken as centred on its sample with the
/// smallest sample spacing as width.
#[derive(Clone, Debug)]
pub struct InterpolatorInput<'a> {
    pub wind_speeds: &'a [f64],
    pub powers: &'a [f64],
    pub cut_out_wind_speed: f64,
    pub bin_limits: Option<&'a [BinLimits]>,
    pub cut_in_wind_speed: Option<f64>,
}

impl<'a> InterpolatorInput<'a> {
    pub fn new(wind_speeds: &'a [f64], powers: &'a [f64], cut_out_wind_speed: f64) -> Self {
        Self {
            wind_speeds,
            powers,
            cut_out_wind_speed,
            bin_limits: None,
            cut_in_wind_speed: None,
        }
    }

    pub fn with_bin_limits(mut self, limits: &'a [BinLimits]) -> Self {
        self.bin_limits = Some(limits);
        self
    }

    pub fn with_cut_in(mut self, cut_in_wind_speed: f64) -> Self {
        self.cut_in_wind_speed = Some(cut_in_wind_speed);
        self
    }

    fn nominal_limits(&self) -> InterpResult<Vec<BinLimits>> {
        let mut sorted = self.wind_speeds.to_vec();
        sorted.sort_by(f64::total_cmp);
        let width = sorted
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0.0)
            .fold(f64::INFINITY, f64::min);
        if !width.is_finite() {
            return Err(InterpError::Configuration {
                what: "cannot infer a bin width from the samples".to_string(),
            });
        }
        Ok(self
            .wind_speeds
            .iter()
            .map(|&x| BinLimits::centered(x, width))
            .collect())
    }
}

/// A power curve interpolator of any mode.
#[derive(Clone, Debug)]
pub enum CurveInterpolator {
    Linear(LinearInterpolator),
    CubicSpline(CubicSplineInterpolator),
    CubicHermite(CubicHermiteInterpolator),
    Marmander(MarmanderInterpolator),
}

impl CurveInterpolator {
    pub fn build(mode: InterpolationMode, input: &InterpolatorInput<'_>) -> InterpResult<Self> {
        let xs = input.wind_speeds.to_vec();
        let ys = input.powers.to_vec();
        let cut_out = input.cut_out_wind_speed;
        tracing::debug!(mode = %mode, samples = xs.len(), cut_out, "building interpolator");

        Ok(match mode {
            InterpolationMode::Linear => Self::Linear(LinearInterpolator::new(xs, ys, cut_out)?),
            InterpolationMode::CubicSpline => {
                Self::CubicSpline(CubicSplineInterpolator::new(xs, ys, cut_out)?)
            }
            InterpolationMode::CubicHermite => {
                Self::CubicHermite(CubicHermiteInterpolator::new(xs, ys, cut_out)?)
            }
            InterpolationMode::MarmanderCubicSpline | InterpolationMode::MarmanderCubicHermite => {
                let base = if mode == InterpolationMode::MarmanderCubicSpline {
                    MarmanderBase::CubicSpline
                } else {
                    MarmanderBase::CubicHermite
                };
                let limits = match input.bin_limits {
                    Some(limits) => limits.to_vec(),
                    None => input.nominal_limits()?,
                };
                Self::Marmander(MarmanderInterpolator::new(
                    xs,
                    ys,
                    limits,
                    cut_out,
                    input.cut_in_wind_speed,
                    base,
                    MarmanderConfig::default(),
                )?)
            }
        })
    }

    pub fn knots(&self) -> &Knots {
        match self {
            Self::Linear(curve) => curve.knots(),
            Self::CubicSpline(curve) => curve.knots(),
            Self::CubicHermite(curve) => curve.knots(),
            Self::Marmander(curve) => curve.knots(),
        }
    }
}

impl PowerFunction for CurveInterpolator {
    fn power(&self, wind_speed: f64) -> f64 {
        match self {
            Self::Linear(curve) => curve.power(wind_speed),
            Self::CubicSpline(curve) => curve.power(wind_speed),
            Self::CubicHermite(curve) => curve.power(wind_speed),
            Self::Marmander(curve) => curve.power(wind_speed),
        }
    }
}
