//! Validated interpolation knots.

use crate::error::{InterpError, InterpResult};
use pc_core::ensure_finite;

/// Parallel arrays of strictly increasing wind speeds and their powers.
#[derive(Clone, Debug, PartialEq)]
pub struct Knots {
    wind_speeds: Vec<f64>,
    powers: Vec<f64>,
}

impl Knots {
    /// # Errors
    /// Rejects mismatched lengths, non-finite values, duplicates, unsorted input
    /// and fewer than `min_len` points.
    pub fn new(
        wind_speeds: Vec<f64>,
        powers: Vec<f64>,
        min_len: usize,
        what: &'static str,
    ) -> InterpResult<Self> {
        if wind_speeds.len() != powers.len() {
            return Err(InterpError::LengthMismatch {
                wind_speeds: wind_speeds.len(),
                powers: powers.len(),
            });
        }
        if wind_speeds.len() < min_len {
            return Err(InterpError::TooFewSamples {
                what,
                needed: min_len,
                got: wind_speeds.len(),
            });
        }
        for (&x, &y) in wind_speeds.iter().zip(&powers) {
            ensure_finite(x, "wind speed")?;
            ensure_finite(y, "power")?;
        }
        for pair in wind_speeds.windows(2) {
            if pair[1] == pair[0] {
                return Err(InterpError::DuplicateWindSpeed {
                    wind_speed: pair[0],
                });
            }
            if pair[1] < pair[0] {
                return Err(InterpError::NotIncreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self {
            wind_speeds,
            powers,
        })
    }

    pub fn wind_speeds(&self) -> &[f64] {
        &self.wind_speeds
    }

    pub fn powers(&self) -> &[f64] {
        &self.powers
    }

    pub fn len(&self) -> usize {
        self.wind_speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wind_speeds.is_empty()
    }

    pub fn first_wind_speed(&self) -> f64 {
        self.wind_speeds[0]
    }

    pub fn last_wind_speed(&self) -> f64 {
        self.wind_speeds[self.wind_speeds.len() - 1]
    }

    /// Whether `x` lies within `[first, last]`. False for NaN.
    pub fn covers(&self, x: f64) -> bool {
        x >= self.first_wind_speed() && x <= self.last_wind_speed()
    }

    /// Index `i` of the segment `[x_i, x_{i+1}]` holding `x`; caller checks `covers`.
    pub fn segment(&self, x: f64) -> usize {
        let upper = self.wind_speeds.partition_point(|&xi| xi <= x);
        upper.saturating_sub(1).min(self.wind_speeds.len() - 2)
    }

    /// Index of the last knot with positive power.
    pub fn last_positive_index(&self) -> Option<usize> {
        self.powers.iter().rposition(|&p| p > 0.0)
    }
}
