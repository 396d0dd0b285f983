//! The single capability shared by every curve in the workspace.

/// A continuous function of power (kW) versus wind speed (m/s).
pub trait PowerFunction {
    fn power(&self, wind_speed: f64) -> f64;
}

impl<T: PowerFunction + ?Sized> PowerFunction for &T {
    fn power(&self, wind_speed: f64) -> f64 {
        (**self).power(wind_speed)
    }
}

impl<T: PowerFunction + ?Sized> PowerFunction for Box<T> {
    fn power(&self, wind_speed: f64) -> f64 {
        (**self).power(wind_speed)
    }
}
