//! Non-fatal sanity checks surfaced to the operator.

use std::fmt;

/// A physically suspicious condition that does not stop the computation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DomainWarning {
    /// Power coefficient above 16/27.
    BetzLimitExceeded { wind_speed: f64, cp: f64 },
}

impl DomainWarning {
    /// Emit the warning on the `tracing` warn level.
    pub fn log(&self) {
        tracing::warn!("{self}");
    }
}

impl fmt::Display for DomainWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainWarning::BetzLimitExceeded { wind_speed, cp } => write!(
                f,
                "power coefficient {cp:.3} at {wind_speed} m/s exceeds the Betz limit"
            ),
        }
    }
}
