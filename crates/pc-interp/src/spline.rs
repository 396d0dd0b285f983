//! Not-a-knot cubic spline with a linear tail.

use crate::error::{InterpError, InterpResult};
use crate::knots::Knots;
use crate::linear::LinearInterpolator;
use crate::traits::PowerFunction;
use nalgebra::{DMatrix, DVector};

/// Cubic spline through the samples, switching to straight lines near rated.
///
/// A cubic spline overshoots where the curve bends into its rated plateau.
/// The spline is therefore only used up to the knot three places before the
/// last knot with positive power; beyond that a linear interpolant over the
/// same knots takes over, up to cut-out.
#[derive(Clone, Debug)]
pub struct CubicSplineInterpolator {
    linear: LinearInterpolator,
    /// Second derivatives at the knots.
    second_derivatives: Vec<f64>,
    last_cubic_wind_speed: f64,
    cut_out_wind_speed: f64,
}

impl CubicSplineInterpolator {
    pub const MIN_SAMPLES: usize = 4;

    pub fn new(
        wind_speeds: Vec<f64>,
        powers: Vec<f64>,
        cut_out_wind_speed: f64,
    ) -> InterpResult<Self> {
        let knots = Knots::new(wind_speeds, powers, Self::MIN_SAMPLES, "cubic spline")?;
        let second_derivatives = not_a_knot_second_derivatives(&knots)?;

        // With fewer than three knots before the last positive one there is no
        // room for the spline, so the whole curve is linear.
        let last_cubic_wind_speed = match knots.last_positive_index() {
            Some(i) if i >= 3 => knots.wind_speeds()[i - 3],
            _ => knots.first_wind_speed(),
        };

        Ok(Self {
            linear: LinearInterpolator::from_knots(knots, cut_out_wind_speed),
            second_derivatives,
            last_cubic_wind_speed,
            cut_out_wind_speed,
        })
    }

    pub fn knots(&self) -> &Knots {
        self.linear.knots()
    }

    /// Wind speed above which the linear tail is used.
    pub fn last_cubic_wind_speed(&self) -> f64 {
        self.last_cubic_wind_speed
    }

    fn spline(&self, wind_speed: f64) -> f64 {
        let knots = self.knots();
        if !knots.covers(wind_speed) {
            return 0.0;
        }
        let i = knots.segment(wind_speed);
        let x = knots.wind_speeds();
        let y = knots.powers();
        let m = &self.second_derivatives;
        let h = x[i + 1] - x[i];
        let a = x[i + 1] - wind_speed;
        let b = wind_speed - x[i];
        m[i] * a * a * a / (6.0 * h)
            + m[i + 1] * b * b * b / (6.0 * h)
            + (y[i] / h - m[i] * h / 6.0) * a
            + (y[i + 1] / h - m[i + 1] * h / 6.0) * b
    }
}

impl PowerFunction for CubicSplineInterpolator {
    fn power(&self, wind_speed: f64) -> f64 {
        if wind_speed > self.cut_out_wind_speed {
            0.0
        } else if wind_speed > self.last_cubic_wind_speed {
            self.linear.interpolate(wind_speed)
        } else {
            self.spline(wind_speed)
        }
    }
}

/// Solve for knot second derivatives with not-a-knot end conditions
/// (continuous third derivative at the second and penultimate knots).
fn not_a_knot_second_derivatives(knots: &Knots) -> InterpResult<Vec<f64>> {
    let x = knots.wind_speeds();
    let y = knots.powers();
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DVector::<f64>::zeros(n);

    a[(0, 0)] = h[1];
    a[(0, 1)] = -(h[0] + h[1]);
    a[(0, 2)] = h[0];

    for i in 1..n - 1 {
        a[(i, i - 1)] = h[i - 1];
        a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
        a[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
    }

    a[(n - 1, n - 3)] = h[n - 2];
    a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
    a[(n - 1, n - 1)] = h[n - 3];

    let m = a.lu().solve(&rhs).ok_or_else(|| InterpError::Numeric {
        what: "cubic spline system is singular".to_string(),
    })?;
    Ok(m.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproduces_a_cubic_exactly() {
        // A not-a-knot spline through samples of a cubic is that cubic.
        let f = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x + 3.0;
        let xs: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let spline = CubicSplineInterpolator::new(xs, ys, 100.0).unwrap();
        for &x in &[0.25, 1.5, 2.75, 3.1] {
            assert!((spline.spline(x) - f(x)).abs() < 1e-9, "x={x}");
        }
    }

    #[test]
    fn passes_through_knots() {
        let xs = vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let ys = vec![0.0, 50.0, 150.0, 300.0, 500.0, 800.0, 1200.0, 1600.0];
        let spline = CubicSplineInterpolator::new(xs.clone(), ys.clone(), 25.0).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            assert!((spline.power(*x) - y).abs() < 1e-9);
        }
    }

    #[test]
    fn linear_tail_after_third_from_last_positive() {
        let xs = vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let ys = vec![0.0, 50.0, 150.0, 300.0, 500.0, 500.0, 500.0];
        let spline = CubicSplineInterpolator::new(xs, ys, 25.0).unwrap();
        assert_eq!(spline.last_cubic_wind_speed(), 6.0);
        // Linear between (7, 500) and (8, 500): no overshoot on the plateau.
        assert_eq!(spline.power(7.5), 500.0);
        assert_eq!(spline.power(6.5), 400.0);
    }

    #[test]
    fn zero_outside_and_above_cut_out() {
        let xs = vec![3.0, 4.0, 5.0, 6.0, 7.0];
        let ys = vec![0.0, 50.0, 150.0, 300.0, 300.0];
        let spline = CubicSplineInterpolator::new(xs, ys, 6.5).unwrap();
        assert_eq!(spline.power(2.9), 0.0);
        assert_eq!(spline.power(6.6), 0.0);
        assert_eq!(spline.power(30.0), 0.0);
    }

    #[test]
    fn needs_four_samples() {
        let err = CubicSplineInterpolator::new(vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0], 25.0)
            .unwrap_err();
        assert!(matches!(err, InterpError::TooFewSamples { needed: 4, .. }));
    }
}
