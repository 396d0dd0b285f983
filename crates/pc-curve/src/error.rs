//! Error types for the power curve facade.

use pc_core::CoreError;
use pc_interp::InterpError;
use pc_turbulence::TurbulenceError;
use thiserror::Error;

/// Result type for power curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Duplicate wind speed {wind_speed} in sample table")]
    DuplicateWindSpeed { wind_speed: f64 },

    #[error("Zero-turbulence curve requires an air density")]
    MissingDensity,

    #[error("Zero-turbulence curve requires a rotor geometry")]
    MissingRotor,

    #[error("Sample at {wind_speed} m/s has no turbulence intensity")]
    MissingTurbulence { wind_speed: f64 },

    #[error("Turbulence correction requested but the zero-turbulence curve is not ready")]
    ZeroTiNotReady,

    #[error("No previous zero-turbulence state to revert to")]
    NoZeroTiHistory,

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Interpolation error: {0}")]
    Interp(#[from] InterpError),

    #[error("Turbulence error: {0}")]
    Turbulence(#[from] TurbulenceError),
}

impl CurveError {
    /// True for a bounded fixed point that ran out of iterations.
    pub fn is_convergence(&self) -> bool {
        matches!(
            self,
            CurveError::Interp(InterpError::Convergence { .. })
                | CurveError::Turbulence(TurbulenceError::Convergence { .. })
        )
    }
}
