//! Summary statistics compared between the reference and simulated curves.

use pc_core::{AvailablePower, max_of};
use serde::Serialize;

/// The three numbers the idealized curve is generated from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IterationStats {
    /// Largest power in kW.
    pub rated_power: f64,
    /// First wind speed producing at least 0.1 % of rated power.
    pub cut_in_wind_speed: f64,
    /// Largest power coefficient.
    pub cp_max: f64,
}

impl IterationStats {
    /// Fraction of rated power taken as "producing".
    pub const CUT_IN_FRACTION: f64 = 0.001;

    /// Statistics of a sampled curve. Cut-in is zero if nothing produces.
    pub fn from_curve(wind_speeds: &[f64], powers: &[f64], available: &AvailablePower) -> Self {
        let rated_power = max_of(powers).unwrap_or(0.0);
        let threshold = Self::CUT_IN_FRACTION * rated_power;

        let cut_in_wind_speed = wind_speeds
            .iter()
            .zip(powers)
            .filter(|&(_, &p)| p >= threshold && p > 0.0)
            .map(|(&v, _)| v)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
            .unwrap_or(0.0);

        let cps: Vec<f64> = wind_speeds
            .iter()
            .zip(powers)
            .map(|(&v, &p)| available.power_coefficient(v, p))
            .collect();
        let cp_max = max_of(&cps).unwrap_or(0.0);

        Self {
            rated_power,
            cut_in_wind_speed,
            cp_max,
        }
    }

    /// Next trial: every unconverged component moves against its difference.
    pub fn incremented(&self, check: &ConvergenceCheck) -> Self {
        let mut next = *self;
        if !check.rated_power_converged {
            next.rated_power -= check.rated_power_diff;
        }
        if !check.cut_in_converged {
            next.cut_in_wind_speed -= check.cut_in_diff;
        }
        if !check.cp_max_converged {
            next.cp_max -= check.cp_max_diff;
        }
        next
    }
}

/// Differences `simulated - reference` and whether each is within tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ConvergenceCheck {
    pub rated_power_diff: f64,
    pub cut_in_diff: f64,
    pub cp_max_diff: f64,
    pub rated_power_converged: bool,
    pub cut_in_converged: bool,
    pub cp_max_converged: bool,
}

impl ConvergenceCheck {
    /// Rated power tolerance as a fraction of the reference rated power.
    pub const RATED_POWER_FRACTION: f64 = 0.001;
    /// Cut-in tolerance in m/s.
    pub const CUT_IN_TOLERANCE: f64 = 0.5;
    pub const CP_MAX_TOLERANCE: f64 = 0.01;

    pub fn new(reference: &IterationStats, simulated: &IterationStats) -> Self {
        let rated_power_diff = simulated.rated_power - reference.rated_power;
        let cut_in_diff = simulated.cut_in_wind_speed - reference.cut_in_wind_speed;
        let cp_max_diff = simulated.cp_max - reference.cp_max;
        Self {
            rated_power_diff,
            cut_in_diff,
            cp_max_diff,
            rated_power_converged: rated_power_diff.abs()
                < Self::RATED_POWER_FRACTION * reference.rated_power,
            cut_in_converged: cut_in_diff.abs() <= Self::CUT_IN_TOLERANCE,
            cp_max_converged: cp_max_diff.abs() <= Self::CP_MAX_TOLERANCE,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.rated_power_converged && self.cut_in_converged && self.cp_max_converged
    }
}
