//! Relaxation of the turbulence fed to the forward simulator.

use crate::error::{TurbulenceError, TurbulenceResult};
use serde::{Deserialize, Serialize};

/// Intercepts a turbulence intensity before it is used in a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relaxation {
    /// Turbulence is used as measured.
    #[default]
    None,
    /// Turbulence scaled by a fixed factor, modelling reduced effective mixing.
    Scaled { factor: f64 },
}

impl Relaxation {
    /// # Errors
    /// The factor must be finite and non-negative.
    pub fn scaled(factor: f64) -> TurbulenceResult<Self> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(TurbulenceError::Configuration {
                what: format!("relaxation factor must be finite and non-negative, got {factor}"),
            });
        }
        Ok(Relaxation::Scaled { factor })
    }

    pub fn relax(&self, _wind_speed: f64, turbulence: f64) -> f64 {
        match self {
            Relaxation::None => turbulence,
            Relaxation::Scaled { factor } => factor * turbulence,
        }
    }
}
