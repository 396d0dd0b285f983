//! Turbulence effects on measured power curves.
//!
//! Turbulence spreads the instantaneous wind speed around its mean. Because a
//! power curve is non-linear, the measured mean power at a given mean wind
//! speed is biased away from what the turbine would make in steady flow.
//!
//! This crate provides:
//! - the forward simulator: blur a zero-turbulence curve with a Gaussian wind
//!   speed distribution to predict measured power at any turbulence intensity
//! - the deconvolution engine: recover the zero-turbulence curve from a
//!   measured curve and the turbulence it was measured at
//!
//! # Architecture
//!
//! - [`IntegrationRange`]: shared probe grid of wind speeds
//! - [`SimulatedPower`]: a curve pre-evaluated on the grid, averaged per query
//! - [`IterationStats`] / [`ConvergenceCheck`]: rated power, cut-in and peak Cp
//! - [`IdealizedCurve`]: three-segment curve generated from those stats
//! - [`ZeroTurbulenceCurve`]: fixed point over the stats, then residual correction

pub mod error;
pub mod idealized;
pub mod integration;
pub mod relaxation;
pub mod simulate;
pub mod stats;
pub mod zero_ti;

pub use error::{TurbulenceError, TurbulenceResult};
pub use idealized::IdealizedCurve;
pub use integration::IntegrationRange;
pub use relaxation::Relaxation;
pub use simulate::{SimulatedCurve, SimulatedPower, simulate_curve};
pub use stats::{ConvergenceCheck, IterationStats};
pub use zero_ti::{DeconvolutionConfig, ReferenceCurve, ZeroTurbulenceCurve};
