//! YAML sample table format.

use pc_core::{kg_per_m3, m};
use pc_curve::{CurveError, InterpolationMode, PowerCurveConfig, RotorGeometry, SampleTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Power curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("Core error: {0}")]
    Core(#[from] pc_core::CoreError),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RotorSpec {
    pub diameter_m: f64,
    pub hub_height_m: f64,
}

/// A turbine and its binned measurements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableFile {
    pub rotor: RotorSpec,
    pub density_kg_m3: f64,
    #[serde(default)]
    pub rated_power_kw: Option<f64>,
    #[serde(default)]
    pub cut_out_wind_speed: Option<f64>,
    #[serde(default)]
    pub interpolation_mode: Option<InterpolationMode>,
    pub samples: SampleTable,
}

impl TableFile {
    /// Curve configuration, with `mode` taking precedence over the file.
    pub fn config(&self, mode: Option<InterpolationMode>) -> CliResult<PowerCurveConfig> {
        let rotor = RotorGeometry::new(m(self.rotor.diameter_m), m(self.rotor.hub_height_m))?;
        let mut config = PowerCurveConfig::new(
            mode.or(self.interpolation_mode).unwrap_or_default(),
        )
        .with_rotor(rotor)
        .with_density(kg_per_m3(self.density_kg_m3));
        if let Some(rated) = self.rated_power_kw {
            config = config.with_rated_power(rated);
        }
        if let Some(cut_out) = self.cut_out_wind_speed {
            config = config.with_cut_out(cut_out);
        }
        Ok(config)
    }
}

pub fn load_yaml(path: &Path) -> CliResult<TableFile> {
    let content = std::fs::read_to_string(path)?;
    let table: TableFile = serde_yaml::from_str(&content)?;
    tracing::debug!(path = %path.display(), samples = table.samples.len(), "loaded sample table");
    Ok(table)
}
