//! Bin-average integration of a power curve.

use crate::traits::PowerFunction;
use pc_core::BinLimits;

/// Default integration step in m/s.
pub const DEFAULT_INTEGRATION_STEP: f64 = 0.01;

/// Mean of `curve` over `limits`, by the midpoint rule with sub-intervals no
/// wider than `step`.
pub fn bin_average<F: PowerFunction + ?Sized>(curve: &F, limits: BinLimits, step: f64) -> f64 {
    let width = limits.width();
    if width <= 0.0 {
        return curve.power(limits.start);
    }
    let intervals = (width / step).ceil().max(1.0) as usize;
    let h = width / intervals as f64;
    let sum: f64 = (0..intervals)
        .map(|k| curve.power(limits.start + (k as f64 + 0.5) * h))
        .sum();
    sum / intervals as f64
}
