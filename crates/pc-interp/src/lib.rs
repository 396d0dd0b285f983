//! Continuous power curves from discrete, bin-averaged samples.
//!
//! Every interpolator answers `power(wind_speed)` and returns zero above its
//! cut-out wind speed. Variants:
//! - [`LinearInterpolator`]: piecewise linear, zero outside the samples
//! - [`CubicSplineInterpolator`]: not-a-knot cubic spline with a linear tail
//! - [`CubicHermiteInterpolator`]: shape-preserving PCHIP
//! - [`MarmanderInterpolator`]: iterative fit that preserves bin averages
//!
//! [`CurveInterpolator`] dispatches over the variants by [`InterpolationMode`].

pub mod error;
pub mod hermite;
pub mod integrate;
pub mod knots;
pub mod linear;
pub mod marmander;
pub mod mode;
pub mod spline;
pub mod traits;

pub use error::{InterpError, InterpResult};
pub use hermite::CubicHermiteInterpolator;
pub use integrate::{DEFAULT_INTEGRATION_STEP, bin_average};
pub use knots::Knots;
pub use linear::LinearInterpolator;
pub use marmander::{
    FittedBin, MarmanderBase, MarmanderConfig, MarmanderFit, MarmanderInterpolator,
};
pub use mode::{CurveInterpolator, InterpolationMode, InterpolatorInput};
pub use spline::CubicSplineInterpolator;
pub use traits::PowerFunction;
