//! Rotor geometry and the kinetic energy flux available to it.

use crate::error::{CoreError, CoreResult};
use crate::numeric::ensure_finite;
use crate::units::{Area, Density, Length};
use crate::warnings::DomainWarning;
use std::f64::consts::PI;

/// Theoretical maximum power coefficient of an ideal rotor (16/27).
pub const BETZ_LIMIT: f64 = 16.0 / 27.0;

/// Rotor diameter and hub height of a horizontal axis turbine.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotorGeometry {
    pub diameter: Length,
    pub hub_height: Length,
}

impl RotorGeometry {
    /// # Errors
    /// Returns a configuration error unless both lengths are finite and positive.
    pub fn new(diameter: Length, hub_height: Length) -> CoreResult<Self> {
        ensure_finite(diameter.value, "rotor diameter")?;
        ensure_finite(hub_height.value, "hub height")?;
        if diameter.value <= 0.0 {
            return Err(CoreError::Configuration {
                what: format!("rotor diameter must be positive, got {} m", diameter.value),
            });
        }
        if hub_height.value <= 0.0 {
            return Err(CoreError::Configuration {
                what: format!("hub height must be positive, got {} m", hub_height.value),
            });
        }
        Ok(Self {
            diameter,
            hub_height,
        })
    }

    pub fn radius(&self) -> Length {
        self.diameter * 0.5
    }

    pub fn area(&self) -> Area {
        self.radius() * self.radius() * PI
    }

    pub fn lower_tip(&self) -> Length {
        self.hub_height - self.radius()
    }

    pub fn upper_tip(&self) -> Length {
        self.hub_height + self.radius()
    }
}

/// Kinetic energy flux through a swept area.
///
/// ```text
/// P(v) = 0.5 * rho * A * v^3 / 1000   [kW]
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvailablePower {
    area_m2: f64,
    density_kg_m3: f64,
}

impl AvailablePower {
    pub fn new(area: Area, density: Density) -> CoreResult<Self> {
        let area_m2 = ensure_finite(area.value, "swept area")?;
        let density_kg_m3 = ensure_finite(density.value, "air density")?;
        if area_m2 <= 0.0 {
            return Err(CoreError::Configuration {
                what: format!("swept area must be positive, got {area_m2} m2"),
            });
        }
        if density_kg_m3 <= 0.0 {
            return Err(CoreError::Configuration {
                what: format!("air density must be positive, got {density_kg_m3} kg/m3"),
            });
        }
        Ok(Self {
            area_m2,
            density_kg_m3,
        })
    }

    pub fn for_rotor(rotor: &RotorGeometry, density: Density) -> CoreResult<Self> {
        Self::new(rotor.area(), density)
    }

    /// Swept area in m².
    pub fn area(&self) -> f64 {
        self.area_m2
    }

    /// Air density in kg/m³.
    pub fn density(&self) -> f64 {
        self.density_kg_m3
    }

    /// Available power in kW at wind speed `v` in m/s.
    pub fn power(&self, v: f64) -> f64 {
        0.5 * self.density_kg_m3 * self.area_m2 * v * v * v / 1000.0
    }

    /// Fraction of the available power converted, zero where none is available.
    pub fn power_coefficient(&self, v: f64, actual_power: f64) -> f64 {
        let available = self.power(v);
        if available == 0.0 {
            0.0
        } else {
            actual_power / available
        }
    }

    /// Betz limit sanity check. Exceedance is reported, never fatal.
    pub fn check_betz(&self, v: f64, actual_power: f64) -> Option<DomainWarning> {
        let cp = self.power_coefficient(v, actual_power);
        if cp > BETZ_LIMIT {
            let warning = DomainWarning::BetzLimitExceeded { wind_speed: v, cp };
            warning.log();
            Some(warning)
        } else {
            None
        }
    }
}
