//! Construction-time configuration of a power curve.

use crate::limits::SubBinOccupancy;
use pc_core::{Density, RotorGeometry};
use pc_interp::InterpolationMode;
use pc_turbulence::Relaxation;
use serde::{Deserialize, Serialize};

/// Everything a [`PowerCurve`](crate::PowerCurve) needs besides its samples.
///
/// Unset optional values are inferred from the samples: cut-out from the
/// last observed wind speed, rated power from the largest observed power and
/// bin width from the smallest spacing between samples. Density and rotor are
/// only needed for the zero-turbulence curve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerCurveConfig {
    pub interpolation_mode: InterpolationMode,
    pub cut_out_wind_speed: Option<f64>,
    pub rated_power: Option<f64>,
    pub bin_width: Option<f64>,
    pub density: Option<Density>,
    pub rotor: Option<RotorGeometry>,
    pub sub_bins: Option<SubBinOccupancy>,
    pub relaxation: Relaxation,
    pub zero_ti_required: bool,
}

impl PowerCurveConfig {
    pub fn new(interpolation_mode: InterpolationMode) -> Self {
        Self {
            interpolation_mode,
            ..Self::default()
        }
    }

    pub fn with_cut_out(mut self, wind_speed: f64) -> Self {
        self.cut_out_wind_speed = Some(wind_speed);
        self
    }

    pub fn with_rated_power(mut self, power: f64) -> Self {
        self.rated_power = Some(power);
        self
    }

    pub fn with_bin_width(mut self, width: f64) -> Self {
        self.bin_width = Some(width);
        self
    }

    pub fn with_density(mut self, density: Density) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_rotor(mut self, rotor: RotorGeometry) -> Self {
        self.rotor = Some(rotor);
        self
    }

    pub fn with_sub_bins(mut self, sub_bins: SubBinOccupancy) -> Self {
        self.sub_bins = Some(sub_bins);
        self
    }

    pub fn with_relaxation(mut self, relaxation: Relaxation) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Compute the zero-turbulence curve at construction.
    pub fn with_zero_ti(mut self) -> Self {
        self.zero_ti_required = true;
        self
    }
}
