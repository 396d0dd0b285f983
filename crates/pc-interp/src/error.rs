//! Error types for interpolator construction.

use pc_core::CoreError;
use thiserror::Error;

/// Result type for interpolator operations.
pub type InterpResult<T> = Result<T, InterpError>;

/// Errors raised while building or fitting an interpolator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpError {
    #[error("Too few samples: {what} needs at least {needed}, got {got}")]
    TooFewSamples {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Duplicate wind speed {wind_speed} in power curve samples")]
    DuplicateWindSpeed { wind_speed: f64 },

    #[error("Wind speeds must be strictly increasing ({previous} then {next})")]
    NotIncreasing { previous: f64, next: f64 },

    #[error("Mismatched sample arrays: {wind_speeds} wind speeds, {powers} powers")]
    LengthMismatch { wind_speeds: usize, powers: usize },

    #[error("Negative rounded power {power} kW at {wind_speed} m/s")]
    NegativePower { wind_speed: f64, power: f64 },

    #[error("Unknown interpolation mode: {name}")]
    UnknownMode { name: String },

    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Convergence failed after {iterations} iterations: {what}")]
    Convergence { what: String, iterations: usize },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
