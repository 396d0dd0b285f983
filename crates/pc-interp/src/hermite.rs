//! Shape-preserving piecewise cubic Hermite (PCHIP) power curve.

use crate::error::InterpResult;
use crate::knots::Knots;
use crate::traits::PowerFunction;

/// Monotonic cubic interpolation: never overshoots the samples.
///
/// Interior slopes are the weighted harmonic mean of the neighbouring secant
/// slopes (Fritsch-Carlson), zero at local extrema. End slopes use a
/// one-sided three-point estimate, limited so monotonicity is kept.
#[derive(Clone, Debug)]
pub struct CubicHermiteInterpolator {
    knots: Knots,
    slopes: Vec<f64>,
    cut_out_wind_speed: f64,
}

impl CubicHermiteInterpolator {
    pub const MIN_SAMPLES: usize = 4;

    pub fn new(
        wind_speeds: Vec<f64>,
        powers: Vec<f64>,
        cut_out_wind_speed: f64,
    ) -> InterpResult<Self> {
        let knots = Knots::new(wind_speeds, powers, Self::MIN_SAMPLES, "cubic hermite")?;
        let slopes = pchip_slopes(&knots);
        Ok(Self {
            knots,
            slopes,
            cut_out_wind_speed,
        })
    }

    pub fn knots(&self) -> &Knots {
        &self.knots
    }
}

impl PowerFunction for CubicHermiteInterpolator {
    fn power(&self, wind_speed: f64) -> f64 {
        if wind_speed > self.cut_out_wind_speed || !self.knots.covers(wind_speed) {
            return 0.0;
        }
        let i = self.knots.segment(wind_speed);
        let x = self.knots.wind_speeds();
        let y = self.knots.powers();
        let h = x[i + 1] - x[i];
        let t = (wind_speed - x[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * y[i] + h10 * h * self.slopes[i] + h01 * y[i + 1] + h11 * h * self.slopes[i + 1]
    }
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

fn pchip_slopes(knots: &Knots) -> Vec<f64> {
    let x = knots.wind_speeds();
    let y = knots.powers();
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (y[k + 1] - y[k]) / h[k]).collect();

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m0, m1) = (delta[k - 1], delta[k]);
        if sign(m0) != sign(m1) || m0 == 0.0 || m1 == 0.0 {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
    }

    d[0] = edge_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = edge_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

/// One-sided three-point end slope, zeroed or limited to keep monotonicity.
fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}
