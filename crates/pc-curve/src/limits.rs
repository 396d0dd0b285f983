//! Bin limits and knot preparation.
//!
//! A bin's nominal limits are `center ± width / 2`, but data rarely fills a
//! bin evenly. When per-sub-bin sample counts are available the true limits
//! shrink to the span of occupied sub-bins. Below the first operating bin the
//! base curve is forced to exactly zero.

use crate::error::{CurveError, CurveResult};
use crate::samples::SampleTable;
use pc_core::BinLimits;
use serde::{Deserialize, Serialize};

/// Sample counts per sub-bin, one row per sample of the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubBinOccupancy {
    /// Estimated cut-in wind speed, if the caller has one.
    #[serde(default)]
    pub cut_in_wind_speed: Option<f64>,
    pub sub_bins_per_bin: usize,
    pub counts: Vec<Vec<u64>>,
}

impl SubBinOccupancy {
    pub fn new(
        cut_in_wind_speed: Option<f64>,
        sub_bins_per_bin: usize,
        counts: Vec<Vec<u64>>,
    ) -> CurveResult<Self> {
        if sub_bins_per_bin == 0 {
            return Err(CurveError::Configuration {
                what: "sub-bins per bin must be at least one".to_string(),
            });
        }
        if let Some(row) = counts.iter().position(|c| c.len() != sub_bins_per_bin) {
            return Err(CurveError::Configuration {
                what: format!(
                    "sub-bin row {row} has {} entries, expected {sub_bins_per_bin}",
                    counts[row].len()
                ),
            });
        }
        if let Some(v) = cut_in_wind_speed
            && !v.is_finite()
        {
            return Err(CurveError::Configuration {
                what: "cut-in wind speed estimate must be finite".to_string(),
            });
        }
        Ok(Self {
            cut_in_wind_speed,
            sub_bins_per_bin,
            counts,
        })
    }

    /// Span of the occupied sub-bins of row `index`. Rows without data keep
    /// their nominal limits.
    pub fn refine(&self, index: usize, nominal: BinLimits) -> BinLimits {
        let Some(row) = self.counts.get(index) else {
            return nominal;
        };
        let first = row.iter().position(|&c| c > 0);
        let last = row.iter().rposition(|&c| c > 0);
        match (first, last) {
            (Some(first), Some(last)) => {
                let sub_width = nominal.width() / self.sub_bins_per_bin as f64;
                BinLimits::new(
                    nominal.start + first as f64 * sub_width,
                    nominal.start + (last + 1) as f64 * sub_width,
                )
            }
            _ => nominal,
        }
    }

    /// Refined limits for every nominal bin.
    ///
    /// # Errors
    /// The occupancy must have one row per bin.
    pub fn true_limits(&self, nominal: &[BinLimits]) -> CurveResult<Vec<BinLimits>> {
        if self.counts.len() != nominal.len() {
            return Err(CurveError::Configuration {
                what: format!(
                    "sub-bin occupancy has {} rows for {} bins",
                    self.counts.len(),
                    nominal.len()
                ),
            });
        }
        Ok(nominal
            .iter()
            .enumerate()
            .map(|(i, &limits)| self.refine(i, limits))
            .collect())
    }
}

/// Wind speed at or below which the base curve is exactly zero.
///
/// The cut-in estimate when given, otherwise the lower limit of the first
/// bin with positive power. `None` when nothing produces.
pub(crate) fn zero_power_limit(
    table: &SampleTable,
    cut_in_estimate: Option<f64>,
    bin_width: f64,
) -> Option<f64> {
    cut_in_estimate.or_else(|| {
        table
            .first_non_zero_wind_speed()
            .map(|v| v - 0.5 * bin_width)
    })
}

/// Knots for the non-Marmander interpolators.
///
/// Samples at or below the zero-power limit are replaced by a single zero
/// knot at the limit; a flat knot at cut-out is appended when the samples stop
/// short of it.
pub(crate) fn prepare_knots(
    table: &SampleTable,
    zero_power_limit: Option<f64>,
    cut_out_wind_speed: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut wind_speeds = Vec::with_capacity(table.len() + 2);
    let mut powers = Vec::with_capacity(table.len() + 2);

    if let Some(limit) = zero_power_limit {
        wind_speeds.push(limit);
        powers.push(0.0);
    }
    for s in table.samples() {
        if zero_power_limit.is_some_and(|limit| s.wind_speed <= limit) {
            continue;
        }
        wind_speeds.push(s.wind_speed);
        powers.push(s.power);
    }

    if let (Some(&last_wind_speed), Some(&last_power)) = (wind_speeds.last(), powers.last())
        && last_wind_speed < cut_out_wind_speed
    {
        wind_speeds.push(cut_out_wind_speed);
        powers.push(last_power);
    }
    (wind_speeds, powers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SampleTable {
        SampleTable::from_columns(
            &[2.0, 3.0, 4.0, 5.0, 6.0],
            &[0.0, 0.0, 50.0, 150.0, 300.0],
        )
        .unwrap()
    }

    #[test]
    fn limit_from_first_operating_bin() {
        assert_eq!(zero_power_limit(&table(), None, 1.0), Some(3.5));
        assert_eq!(zero_power_limit(&table(), Some(3.2), 1.0), Some(3.2));
        let dead = SampleTable::from_columns(&[3.0, 4.0], &[0.0, 0.0]).unwrap();
        assert_eq!(zero_power_limit(&dead, None, 1.0), None);
    }

    #[test]
    fn knots_start_at_limit_and_reach_cut_out() {
        let (xs, ys) = prepare_knots(&table(), Some(3.5), 25.0);
        assert_eq!(xs, vec![3.5, 4.0, 5.0, 6.0, 25.0]);
        assert_eq!(ys, vec![0.0, 50.0, 150.0, 300.0, 300.0]);
    }

    #[test]
    fn knots_untouched_without_limit_or_gap() {
        let (xs, ys) = prepare_knots(&table(), None, 6.0);
        assert_eq!(xs, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ys, vec![0.0, 0.0, 50.0, 150.0, 300.0]);
    }

    #[test]
    fn occupied_sub_bins_narrow_the_limits() {
        let occupancy =
            SubBinOccupancy::new(None, 4, vec![vec![0, 3, 5, 0], vec![0, 0, 0, 0]]).unwrap();
        let nominal = [BinLimits::centered(4.0, 1.0), BinLimits::centered(5.0, 1.0)];
        let limits = occupancy.true_limits(&nominal).unwrap();
        assert_eq!(limits[0], BinLimits::new(3.75, 4.25));
        assert_eq!(limits[1], nominal[1]);
    }

    #[test]
    fn occupancy_shape_is_checked() {
        assert!(SubBinOccupancy::new(None, 0, Vec::new()).is_err());
        assert!(SubBinOccupancy::new(None, 4, vec![vec![1, 2, 3]]).is_err());
        let occupancy = SubBinOccupancy::new(None, 2, vec![vec![1, 1]]).unwrap();
        assert!(occupancy.true_limits(&[]).is_err());
    }
}
