//! The power curve facade.
//!
//! Turns a table of binned observations into a callable
//! `power(wind speed, turbulence?)`:
//! - builds the base interpolated curve in the configured mode
//! - forces exact zero below the first operating bin
//! - on request, derives the zero-turbulence curve and corrects queries to
//!   any turbulence intensity
//! - clamps every answer to `[0, rated power]`

pub mod config;
pub mod curve;
pub mod deviation;
pub mod error;
pub mod limits;
pub mod samples;

pub use config::PowerCurveConfig;
pub use curve::{PowerCurve, PowerQuery, ZeroTiStatus};
pub use deviation::TurbulenceDeviation;
pub use error::{CurveError, CurveResult};
pub use limits::SubBinOccupancy;
pub use samples::{PowerCurveSample, SampleTable};

// Types callers need to configure a curve.
pub use pc_core::{BinLimits, BinSet, DomainWarning, RotorGeometry};
pub use pc_interp::{InterpolationMode, PowerFunction};
pub use pc_turbulence::{Relaxation, ZeroTurbulenceCurve};
