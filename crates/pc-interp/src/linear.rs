//! Piecewise-linear power curve.

use crate::error::InterpResult;
use crate::knots::Knots;
use crate::traits::PowerFunction;

/// Straight lines between samples; zero outside them and above cut-out.
#[derive(Clone, Debug)]
pub struct LinearInterpolator {
    knots: Knots,
    cut_out_wind_speed: f64,
}

impl LinearInterpolator {
    pub const MIN_SAMPLES: usize = 2;

    pub fn new(
        wind_speeds: Vec<f64>,
        powers: Vec<f64>,
        cut_out_wind_speed: f64,
    ) -> InterpResult<Self> {
        let knots = Knots::new(wind_speeds, powers, Self::MIN_SAMPLES, "linear interpolation")?;
        Ok(Self::from_knots(knots, cut_out_wind_speed))
    }

    pub(crate) fn from_knots(knots: Knots, cut_out_wind_speed: f64) -> Self {
        Self {
            knots,
            cut_out_wind_speed,
        }
    }

    pub fn knots(&self) -> &Knots {
        &self.knots
    }

    /// Interpolated value ignoring cut-out; zero outside the knots.
    pub(crate) fn interpolate(&self, wind_speed: f64) -> f64 {
        if !self.knots.covers(wind_speed) {
            return 0.0;
        }
        let i = self.knots.segment(wind_speed);
        let x = self.knots.wind_speeds();
        let y = self.knots.powers();
        let t = (wind_speed - x[i]) / (x[i + 1] - x[i]);
        y[i] + t * (y[i + 1] - y[i])
    }
}

impl PowerFunction for LinearInterpolator {
    fn power(&self, wind_speed: f64) -> f64 {
        if wind_speed > self.cut_out_wind_speed {
            return 0.0;
        }
        self.interpolate(wind_speed)
    }
}
