//! Binned observations the curve is built from.

use crate::error::{CurveError, CurveResult};
use serde::{Deserialize, Serialize};

/// One bin of measured data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerCurveSample {
    /// Bin center in m/s.
    pub wind_speed: f64,
    /// Mean power in kW.
    pub power: f64,
    /// Mean turbulence intensity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbulence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl PowerCurveSample {
    pub fn new(wind_speed: f64, power: f64) -> Self {
        Self {
            wind_speed,
            power,
            turbulence: None,
            count: None,
        }
    }

    pub fn with_turbulence(mut self, turbulence: f64) -> Self {
        self.turbulence = Some(turbulence);
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

/// Samples ordered by wind speed, with unique wind speeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PowerCurveSample>", into = "Vec<PowerCurveSample>")]
pub struct SampleTable {
    samples: Vec<PowerCurveSample>,
}

impl SampleTable {
    /// Sort and validate.
    ///
    /// # Errors
    /// - `Configuration` for an empty table, non-finite values, negative wind
    ///   speed or negative turbulence
    /// - `DuplicateWindSpeed` if two rows share a wind speed
    pub fn new(mut samples: Vec<PowerCurveSample>) -> CurveResult<Self> {
        if samples.is_empty() {
            return Err(CurveError::Configuration {
                what: "sample table is empty".to_string(),
            });
        }
        for s in &samples {
            if !s.wind_speed.is_finite() || !s.power.is_finite() {
                return Err(CurveError::Configuration {
                    what: format!(
                        "sample ({}, {}) is not finite; drop unpopulated bins first",
                        s.wind_speed, s.power
                    ),
                });
            }
            if s.wind_speed < 0.0 {
                return Err(CurveError::Configuration {
                    what: format!("negative wind speed {}", s.wind_speed),
                });
            }
            if let Some(ti) = s.turbulence
                && !(ti.is_finite() && ti >= 0.0)
            {
                return Err(CurveError::Configuration {
                    what: format!("turbulence {ti} at {} m/s must be finite and non-negative", s.wind_speed),
                });
            }
        }

        samples.sort_by(|a, b| a.wind_speed.total_cmp(&b.wind_speed));
        if let Some(w) = samples.windows(2).find(|w| w[0].wind_speed == w[1].wind_speed) {
            return Err(CurveError::DuplicateWindSpeed {
                wind_speed: w[0].wind_speed,
            });
        }
        Ok(Self { samples })
    }

    /// Build from parallel columns.
    pub fn from_columns(wind_speeds: &[f64], powers: &[f64]) -> CurveResult<Self> {
        if wind_speeds.len() != powers.len() {
            return Err(CurveError::Configuration {
                what: format!(
                    "{} wind speeds but {} powers",
                    wind_speeds.len(),
                    powers.len()
                ),
            });
        }
        Self::new(
            wind_speeds
                .iter()
                .zip(powers)
                .map(|(&v, &p)| PowerCurveSample::new(v, p))
                .collect(),
        )
    }

    pub fn samples(&self) -> &[PowerCurveSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn wind_speeds(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.wind_speed).collect()
    }

    pub fn powers(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.power).collect()
    }

    /// Turbulence column, or the first wind speed that lacks one.
    pub fn turbulences(&self) -> CurveResult<Vec<f64>> {
        self.samples
            .iter()
            .map(|s| {
                s.turbulence.ok_or(CurveError::MissingTurbulence {
                    wind_speed: s.wind_speed,
                })
            })
            .collect()
    }

    pub fn first_wind_speed(&self) -> f64 {
        self.samples[0].wind_speed
    }

    pub fn last_wind_speed(&self) -> f64 {
        self.samples[self.samples.len() - 1].wind_speed
    }

    /// Lowest wind speed with positive power.
    pub fn first_non_zero_wind_speed(&self) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.power > 0.0)
            .map(|s| s.wind_speed)
    }

    pub fn max_power(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.power)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest gap between neighbouring wind speeds.
    pub fn min_spacing(&self) -> Option<f64> {
        self.samples
            .windows(2)
            .map(|w| w[1].wind_speed - w[0].wind_speed)
            .reduce(f64::min)
    }
}

impl TryFrom<Vec<PowerCurveSample>> for SampleTable {
    type Error = CurveError;

    fn try_from(samples: Vec<PowerCurveSample>) -> Result<Self, Self::Error> {
        Self::new(samples)
    }
}

impl From<SampleTable> for Vec<PowerCurveSample> {
    fn from(table: SampleTable) -> Self {
        table.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_sorted() {
        let table = SampleTable::from_columns(&[5.0, 3.0, 4.0], &[150.0, 0.0, 50.0]).unwrap();
        assert_eq!(table.wind_speeds(), vec![3.0, 4.0, 5.0]);
        assert_eq!(table.powers(), vec![0.0, 50.0, 150.0]);
        assert_eq!(table.first_non_zero_wind_speed(), Some(4.0));
        assert_eq!(table.min_spacing(), Some(1.0));
        assert_eq!(table.max_power(), 150.0);
    }

    #[test]
    fn duplicates_rejected() {
        let err = SampleTable::from_columns(&[3.0, 4.0, 3.0], &[0.0, 50.0, 1.0]).unwrap_err();
        assert_eq!(err, CurveError::DuplicateWindSpeed { wind_speed: 3.0 });
    }

    #[test]
    fn invalid_rows_rejected() {
        assert!(SampleTable::new(Vec::new()).is_err());
        assert!(SampleTable::from_columns(&[3.0, f64::NAN], &[0.0, 1.0]).is_err());
        assert!(SampleTable::from_columns(&[-1.0, 3.0], &[0.0, 1.0]).is_err());
        let negative_ti = vec![PowerCurveSample::new(3.0, 0.0).with_turbulence(-0.1)];
        assert!(SampleTable::new(negative_ti).is_err());
    }

    #[test]
    fn missing_turbulence_is_reported() {
        let table = SampleTable::new(vec![
            PowerCurveSample::new(3.0, 0.0).with_turbulence(0.1),
            PowerCurveSample::new(4.0, 50.0),
        ])
        .unwrap();
        assert_eq!(
            table.turbulences().unwrap_err(),
            CurveError::MissingTurbulence { wind_speed: 4.0 }
        );
    }

    #[test]
    fn deserializes_through_validation() {
        let json = r#"[{"wind_speed": 4.0, "power": 50.0}, {"wind_speed": 3.0, "power": 0.0, "turbulence": 0.12, "count": 40}]"#;
        let table: SampleTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.first_wind_speed(), 3.0);
        assert_eq!(table.samples()[0].count, Some(40));

        let duplicate = r#"[{"wind_speed": 4.0, "power": 50.0}, {"wind_speed": 4.0, "power": 0.0}]"#;
        assert!(serde_json::from_str::<SampleTable>(duplicate).is_err());
    }
}
