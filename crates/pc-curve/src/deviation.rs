//! Empirical turbulence deviation used by augmented queries.

/// Relative power deviation as a function of normalised wind speed and the
/// query and reference turbulence. Augmented power is `power * (1 + deviation)`.
pub trait TurbulenceDeviation {
    fn deviation(
        &self,
        normalised_wind_speed: f64,
        turbulence: f64,
        reference_turbulence: f64,
    ) -> f64;
}

impl<F> TurbulenceDeviation for F
where
    F: Fn(f64, f64, f64) -> f64,
{
    fn deviation(
        &self,
        normalised_wind_speed: f64,
        turbulence: f64,
        reference_turbulence: f64,
    ) -> f64 {
        self(normalised_wind_speed, turbulence, reference_turbulence)
    }
}
