//! Error types for turbulence simulation and deconvolution.

use pc_core::CoreError;
use pc_interp::InterpError;
use thiserror::Error;

/// Result type for turbulence operations.
pub type TurbulenceResult<T> = Result<T, TurbulenceError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TurbulenceError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Convergence failed after {iterations} iterations: {what}")]
    Convergence { what: String, iterations: usize },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Interpolation error: {0}")]
    Interp(#[from] InterpError),
}
