//! Regular partitions of wind speed into fixed-width bins.

use crate::error::{CoreError, CoreResult};
use crate::numeric::ensure_finite;

/// Tolerance on the implied bin count when it is derived from a last center.
const BIN_COUNT_TOLERANCE: f64 = 1e-12;

/// Lower and upper boundary of one bin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinLimits {
    pub start: f64,
    pub end: f64,
}

impl BinLimits {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Limits of a bin of the given width centred on `center`.
    pub fn centered(center: f64, width: f64) -> Self {
        Self {
            start: center - 0.5 * width,
            end: center + 0.5 * width,
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn center(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    /// Half-open membership test, `[start, end)`.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x < self.end
    }
}

/// A regular partition of wind speed.
///
/// Immutable once constructed. The number of bins is either given directly or
/// derived from the center of the last bin, in which case the implied count
/// must be an integer to within `1e-12`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinSet {
    center_of_first_bin: f64,
    bin_width: f64,
    number_of_bins: usize,
}

impl BinSet {
    /// Build from whichever of `center_of_last_bin` and `number_of_bins` the
    /// caller has. When both are given they must agree.
    pub fn new(
        center_of_first_bin: f64,
        bin_width: f64,
        center_of_last_bin: Option<f64>,
        number_of_bins: Option<usize>,
    ) -> CoreResult<Self> {
        match (center_of_last_bin, number_of_bins) {
            (Some(last), Some(count)) => {
                let set = Self::new_with_last_center(center_of_first_bin, bin_width, last)?;
                if set.number_of_bins != count {
                    return Err(CoreError::Configuration {
                        what: format!(
                            "bin count {count} disagrees with center of last bin {last} (implies {})",
                            set.number_of_bins
                        ),
                    });
                }
                Ok(set)
            }
            (Some(last), None) => Self::new_with_last_center(center_of_first_bin, bin_width, last),
            (None, Some(count)) => Self::new_with_count(center_of_first_bin, bin_width, count),
            (None, None) => Err(CoreError::Configuration {
                what: "bins need either a center of last bin or a number of bins".to_string(),
            }),
        }
    }

    pub fn new_with_count(
        center_of_first_bin: f64,
        bin_width: f64,
        number_of_bins: usize,
    ) -> CoreResult<Self> {
        ensure_finite(center_of_first_bin, "center of first bin")?;
        ensure_finite(bin_width, "bin width")?;
        if bin_width <= 0.0 {
            return Err(CoreError::Configuration {
                what: format!("bin width must be positive, got {bin_width}"),
            });
        }
        if number_of_bins == 0 {
            return Err(CoreError::Configuration {
                what: "number of bins must be at least one".to_string(),
            });
        }
        Ok(Self {
            center_of_first_bin,
            bin_width,
            number_of_bins,
        })
    }

    pub fn new_with_last_center(
        center_of_first_bin: f64,
        bin_width: f64,
        center_of_last_bin: f64,
    ) -> CoreResult<Self> {
        ensure_finite(center_of_first_bin, "center of first bin")?;
        ensure_finite(bin_width, "bin width")?;
        ensure_finite(center_of_last_bin, "center of last bin")?;
        if bin_width <= 0.0 {
            return Err(CoreError::Configuration {
                what: format!("bin width must be positive, got {bin_width}"),
            });
        }

        let implied = (center_of_last_bin - center_of_first_bin) / bin_width + 1.0;
        let rounded = implied.round();
        if (implied - rounded).abs() > BIN_COUNT_TOLERANCE {
            return Err(CoreError::Configuration {
                what: format!(
                    "bins from {center_of_first_bin} to {center_of_last_bin} with width {bin_width} \
                     imply a non-integer bin count ({implied})"
                ),
            });
        }
        if rounded < 1.0 {
            return Err(CoreError::Configuration {
                what: format!(
                    "center of last bin {center_of_last_bin} lies before center of first bin {center_of_first_bin}"
                ),
            });
        }

        Self::new_with_count(center_of_first_bin, bin_width, rounded as usize)
    }

    pub fn center_of_first_bin(&self) -> f64 {
        self.center_of_first_bin
    }

    pub fn center_of_last_bin(&self) -> f64 {
        self.bin_center_by_index(self.number_of_bins - 1)
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn number_of_bins(&self) -> usize {
        self.number_of_bins
    }

    /// Nearest bin center to `x`. NaN in, NaN out.
    ///
    /// The center is not restricted to the bins of this set; values past either
    /// end map onto the extension of the same grid.
    pub fn bin_center(&self, x: f64) -> f64 {
        ((x - self.center_of_first_bin) / self.bin_width).round_ties_even() * self.bin_width
            + self.center_of_first_bin
    }

    /// Index of the bin whose limits contain `x`.
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            return None;
        }
        let offset = (x - self.bin_start_by_index(0)) / self.bin_width;
        if offset < 0.0 {
            return None;
        }
        let index = offset.floor() as usize;
        (index < self.number_of_bins).then_some(index)
    }

    pub fn bin_center_by_index(&self, index: usize) -> f64 {
        self.center_of_first_bin + index as f64 * self.bin_width
    }

    pub fn bin_start_by_index(&self, index: usize) -> f64 {
        self.bin_center_by_index(index) - 0.5 * self.bin_width
    }

    pub fn bin_end_by_index(&self, index: usize) -> f64 {
        self.bin_center_by_index(index) + 0.5 * self.bin_width
    }

    pub fn centers(&self) -> Vec<f64> {
        (0..self.number_of_bins)
            .map(|i| self.bin_center_by_index(i))
            .collect()
    }

    pub fn limits(&self) -> Vec<BinLimits> {
        (0..self.number_of_bins)
            .map(|i| BinLimits::new(self.bin_start_by_index(i), self.bin_end_by_index(i)))
            .collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn bin_center_is_idempotent(x in 0.0_f64..40.0) {
            let bins = BinSet::new_with_count(1.0, 0.5, 60).unwrap();
            let c = bins.bin_center(x);
            prop_assert!((bins.bin_center(c) - c).abs() < 1e-9);
            prop_assert!((c - x).abs() <= 0.25 + 1e-9);
        }
    }
}
