//! The power curve facade.
//!
//! A [`PowerCurve`] owns one interpolated base curve, built once from its
//! samples, and an optional zero-turbulence sub-state. The sub-state moves
//! through [`ZeroTiStatus`]:
//!
//! ```text
//! Built ──(required / relaxation changed)──> ZeroTiPending ──recompute()──> ZeroTiReady
//!   ^                                                                          │
//!   └──────────────────────────── revert_zero_ti() ────────────────────────────┘
//! ```
//!
//! A change of the required flag or the relaxation moves a ready state into a
//! one-slot history so `revert_zero_ti()` restores it without recomputation.
//! Intermediate pending or built states never displace a ready snapshot.

use crate::config::PowerCurveConfig;
use crate::deviation::TurbulenceDeviation;
use crate::error::{CurveError, CurveResult};
use crate::limits::{prepare_knots, zero_power_limit};
use crate::samples::SampleTable;
use pc_core::{AvailablePower, BinLimits, DomainWarning};
use pc_interp::{CurveInterpolator, InterpolationMode, InterpolatorInput, PowerFunction};
use pc_turbulence::{
    DeconvolutionConfig, IntegrationRange, ReferenceCurve, Relaxation, SimulatedPower,
    ZeroTurbulenceCurve,
};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroTiStatus {
    /// Base curve only.
    Built,
    /// Zero-turbulence curve required but not computed.
    ZeroTiPending,
    /// Zero-turbulence curve and its simulator ready for queries.
    ZeroTiReady,
}

/// A single `power()` request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerQuery {
    pub wind_speed: f64,
    pub turbulence: Option<f64>,
    pub augment: bool,
    pub normalised_wind_speed: Option<f64>,
}

impl PowerQuery {
    pub fn new(wind_speed: f64) -> Self {
        Self {
            wind_speed,
            turbulence: None,
            augment: false,
            normalised_wind_speed: None,
        }
    }

    pub fn with_turbulence(mut self, turbulence: f64) -> Self {
        self.turbulence = Some(turbulence);
        self
    }

    /// Apply the registered turbulence deviation model. Without a normalised
    /// wind speed the deviation is zero.
    pub fn augmented(mut self, normalised_wind_speed: Option<f64>) -> Self {
        self.augment = true;
        self.normalised_wind_speed = normalised_wind_speed;
        self
    }
}

#[derive(Clone, Debug)]
struct ZeroTiState {
    required: bool,
    relaxation: Relaxation,
    simulator: Option<Arc<SimulatedPower<ZeroTurbulenceCurve>>>,
}

impl ZeroTiState {
    fn status(&self) -> ZeroTiStatus {
        match (self.required, &self.simulator) {
            (false, _) => ZeroTiStatus::Built,
            (true, None) => ZeroTiStatus::ZeroTiPending,
            (true, Some(_)) => ZeroTiStatus::ZeroTiReady,
        }
    }

    fn ready(&self) -> Option<&SimulatedPower<ZeroTurbulenceCurve>> {
        self.simulator.as_deref().filter(|_| self.required)
    }
}

/// Power as a function of wind speed and, optionally, turbulence.
#[derive(Clone)]
pub struct PowerCurve {
    table: SampleTable,
    interpolator: CurveInterpolator,
    mode: InterpolationMode,
    rated_power: f64,
    cut_out_wind_speed: f64,
    cut_in_wind_speed: Option<f64>,
    zero_power_limit: Option<f64>,
    /// Turbulence column of the table, if complete.
    reference_turbulence: Option<Vec<f64>>,
    available: Option<AvailablePower>,
    density_known: bool,
    range: Arc<IntegrationRange>,
    deconvolution: DeconvolutionConfig,
    deviation: Option<Arc<dyn TurbulenceDeviation + Send + Sync>>,
    state: ZeroTiState,
    history: Option<ZeroTiState>,
    warnings: Vec<DomainWarning>,
}

impl PowerCurve {
    /// Build the base curve and, if configured, the zero-turbulence curve.
    ///
    /// # Errors
    /// Any configuration error of the samples or interpolator, and the
    /// deconvolution's errors when `zero_ti_required` is set. A zero-turbulence
    /// rated wind speed beyond cut-out is a configuration error.
    pub fn new(table: SampleTable, config: PowerCurveConfig) -> CurveResult<Self> {
        let mode = config.interpolation_mode;

        let cut_out_wind_speed = config
            .cut_out_wind_speed
            .unwrap_or_else(|| table.last_wind_speed());
        if !(cut_out_wind_speed.is_finite() && cut_out_wind_speed > 0.0) {
            return Err(CurveError::Configuration {
                what: format!("cut-out wind speed must be positive, got {cut_out_wind_speed}"),
            });
        }

        let rated_power = config.rated_power.unwrap_or_else(|| table.max_power().max(0.0));
        if !(rated_power.is_finite() && rated_power >= 0.0) {
            return Err(CurveError::Configuration {
                what: format!("rated power must be non-negative, got {rated_power}"),
            });
        }

        let bin_width = match config.bin_width.or_else(|| table.min_spacing()) {
            Some(width) if width.is_finite() && width > 0.0 => width,
            Some(width) => {
                return Err(CurveError::Configuration {
                    what: format!("bin width must be positive, got {width}"),
                });
            }
            None => {
                return Err(CurveError::Configuration {
                    what: "cannot infer a bin width from a single sample".to_string(),
                });
            }
        };

        let cut_in_estimate = config.sub_bins.as_ref().and_then(|s| s.cut_in_wind_speed);
        let zero_power_limit = zero_power_limit(&table, cut_in_estimate, bin_width);
        let cut_in_wind_speed = cut_in_estimate.or_else(|| table.first_non_zero_wind_speed());

        let interpolator = if mode.is_marmander() {
            let xs = table.wind_speeds();
            let ys = table.powers();
            let nominal: Vec<BinLimits> = xs
                .iter()
                .map(|&x| BinLimits::centered(x, bin_width))
                .collect();
            let limits = match &config.sub_bins {
                Some(sub_bins) => sub_bins.true_limits(&nominal)?,
                None => nominal,
            };
            let mut input =
                InterpolatorInput::new(&xs, &ys, cut_out_wind_speed).with_bin_limits(&limits);
            if let Some(cut_in) = cut_in_estimate {
                input = input.with_cut_in(cut_in);
            }
            CurveInterpolator::build(mode, &input)?
        } else {
            let (xs, ys) = prepare_knots(&table, zero_power_limit, cut_out_wind_speed);
            CurveInterpolator::build(mode, &InterpolatorInput::new(&xs, &ys, cut_out_wind_speed))?
        };

        let available = match (config.rotor, config.density) {
            (Some(rotor), Some(density)) => Some(AvailablePower::for_rotor(&rotor, density)?),
            _ => None,
        };
        let warnings = available
            .map(|available| {
                table
                    .samples()
                    .iter()
                    .filter_map(|s| available.check_betz(s.wind_speed, s.power))
                    .collect()
            })
            .unwrap_or_default();

        tracing::info!(
            mode = %mode,
            samples = table.len(),
            rated_power,
            cut_out = cut_out_wind_speed,
            "power curve built"
        );

        let mut curve = Self {
            reference_turbulence: table.turbulences().ok(),
            table,
            interpolator,
            mode,
            rated_power,
            cut_out_wind_speed,
            cut_in_wind_speed,
            zero_power_limit,
            available,
            density_known: config.density.is_some(),
            range: Arc::new(IntegrationRange::default()),
            deconvolution: DeconvolutionConfig::default().with_cut_out(cut_out_wind_speed),
            deviation: None,
            state: ZeroTiState {
                required: false,
                relaxation: config.relaxation,
                simulator: None,
            },
            history: None,
            warnings,
        };

        if config.zero_ti_required {
            curve.check_zero_ti_inputs()?;
            curve.state.required = true;
            curve.recompute()?;
        }
        Ok(curve)
    }

    /// Register the model used by augmented queries.
    pub fn with_deviation<D>(mut self, model: D) -> Self
    where
        D: TurbulenceDeviation + Send + Sync + 'static,
    {
        self.deviation = Some(Arc::new(model));
        self
    }

    pub fn samples(&self) -> &SampleTable {
        &self.table
    }

    pub fn interpolator(&self) -> &CurveInterpolator {
        &self.interpolator
    }

    pub fn interpolation_mode(&self) -> InterpolationMode {
        self.mode
    }

    pub fn rated_power(&self) -> f64 {
        self.rated_power
    }

    pub fn cut_out_wind_speed(&self) -> f64 {
        self.cut_out_wind_speed
    }

    /// Cut-in estimate if one was supplied, otherwise the first wind speed
    /// with positive power.
    pub fn cut_in_wind_speed(&self) -> Option<f64> {
        self.cut_in_wind_speed
    }

    /// At or below this wind speed the base curve is exactly zero.
    pub fn zero_power_limit(&self) -> Option<f64> {
        self.zero_power_limit
    }

    pub fn first_wind_speed(&self) -> f64 {
        self.table.first_wind_speed()
    }

    /// Betz exceedances found in the samples, checked once at construction.
    pub fn warnings(&self) -> &[DomainWarning] {
        &self.warnings
    }

    /// Interpolated power, zero at or below the zero-power limit and clamped
    /// to `[0, rated]`.
    pub fn base_power(&self, wind_speed: f64) -> f64 {
        if wind_speed.is_nan() {
            return 0.0;
        }
        if self
            .zero_power_limit
            .is_some_and(|limit| wind_speed <= limit)
        {
            return 0.0;
        }
        self.clamp(self.interpolator.power(wind_speed))
    }

    /// Turbulence the samples were measured at, linear between samples and
    /// held at the edge values outside them.
    pub fn reference_turbulence(&self, wind_speed: f64) -> CurveResult<f64> {
        let turbulences = match &self.reference_turbulence {
            Some(t) => t,
            None => return Err(self.missing_turbulence()),
        };
        let samples = self.table.samples();
        let last = samples.len() - 1;
        if wind_speed <= samples[0].wind_speed {
            return Ok(turbulences[0]);
        }
        if wind_speed >= samples[last].wind_speed {
            return Ok(turbulences[last]);
        }
        let i = samples.partition_point(|s| s.wind_speed <= wind_speed) - 1;
        let t = (wind_speed - samples[i].wind_speed)
            / (samples[i + 1].wind_speed - samples[i].wind_speed);
        Ok(turbulences[i] + t * (turbulences[i + 1] - turbulences[i]))
    }

    /// Power for a query.
    ///
    /// Without turbulence this is [`base_power`](Self::base_power). With
    /// turbulence the zero-turbulence curve must be ready and
    ///
    /// ```text
    /// P = base(v) + sim(v, relax(ti)) - sim(v, relax(ti_ref(v)))
    /// ```
    ///
    /// optionally scaled by `1 + deviation`. The result is always clamped to
    /// `[0, rated]`.
    pub fn power(&self, query: PowerQuery) -> CurveResult<f64> {
        let v = query.wind_speed;
        let base = self.base_power(v);

        let Some(turbulence) = query.turbulence else {
            if query.augment {
                return Err(CurveError::Configuration {
                    what: "augmented power needs a turbulence intensity".to_string(),
                });
            }
            return Ok(base);
        };
        if !(turbulence.is_finite() && turbulence >= 0.0) {
            return Err(CurveError::Configuration {
                what: format!("turbulence intensity must be non-negative, got {turbulence}"),
            });
        }

        let simulator = self.state.ready().ok_or(CurveError::ZeroTiNotReady)?;
        let reference = self.reference_turbulence(v)?;
        let mut power = base + simulator.power(v, turbulence) - simulator.power(v, reference);

        if query.augment {
            let model = self.deviation.as_ref().ok_or_else(|| CurveError::Configuration {
                what: "augmented power needs a turbulence deviation model".to_string(),
            })?;
            let deviation = query
                .normalised_wind_speed
                .map_or(0.0, |nws| model.deviation(nws, turbulence, reference));
            power *= 1.0 + deviation;
        }
        Ok(self.clamp(power))
    }

    pub fn zero_ti_status(&self) -> ZeroTiStatus {
        self.state.status()
    }

    pub fn zero_ti_required(&self) -> bool {
        self.state.required
    }

    pub fn relaxation(&self) -> Relaxation {
        self.state.relaxation
    }

    /// The ready zero-turbulence curve.
    pub fn zero_ti_curve(&self) -> Option<&ZeroTurbulenceCurve> {
        self.state.ready().map(SimulatedPower::curve)
    }

    /// Rated wind speed of the zero-turbulence curve.
    pub fn rated_wind_speed(&self) -> CurveResult<f64> {
        self.zero_ti_curve()
            .map(ZeroTurbulenceCurve::rated_wind_speed)
            .ok_or(CurveError::ZeroTiNotReady)
    }

    /// Change whether turbulence queries are supported. A change leaves the
    /// new state pending and keeps a ready state in history.
    ///
    /// # Errors
    /// Requiring the zero-turbulence curve needs density, rotor and a
    /// complete turbulence column; on error nothing changes.
    pub fn set_zero_ti_required(&mut self, required: bool) -> CurveResult<ZeroTiStatus> {
        if required == self.state.required {
            return Ok(self.zero_ti_status());
        }
        if required {
            self.check_zero_ti_inputs()?;
        }
        self.transition(ZeroTiState {
            required,
            relaxation: self.state.relaxation,
            simulator: None,
        });
        Ok(self.zero_ti_status())
    }

    /// Change the relaxation. A change leaves the new state pending and keeps
    /// a ready state in history.
    pub fn set_relaxation(&mut self, relaxation: Relaxation) -> ZeroTiStatus {
        if relaxation != self.state.relaxation {
            self.transition(ZeroTiState {
                required: self.state.required,
                relaxation,
                simulator: None,
            });
        }
        self.zero_ti_status()
    }

    /// Run the deconvolution if the zero-turbulence curve is pending.
    ///
    /// # Errors
    /// Deconvolution errors propagate and the state stays pending.
    pub fn recompute(&mut self) -> CurveResult<ZeroTiStatus> {
        if self.zero_ti_status() != ZeroTiStatus::ZeroTiPending {
            return Ok(self.zero_ti_status());
        }
        let available = self.available.ok_or(CurveError::MissingDensity)?;
        let turbulences = match &self.reference_turbulence {
            Some(t) => t,
            None => return Err(self.missing_turbulence()),
        };
        let xs = self.table.wind_speeds();
        let ys = self.table.powers();
        let reference = ReferenceCurve::new(&xs, &ys, turbulences)?;

        let zero_ti = ZeroTurbulenceCurve::deconvolve(
            &reference,
            available,
            Arc::clone(&self.range),
            self.state.relaxation,
            &self.deconvolution,
        )?;
        self.state.simulator = Some(Arc::new(SimulatedPower::new(
            zero_ti,
            Arc::clone(&self.range),
            self.state.relaxation,
        )));
        tracing::debug!(relaxation = ?self.state.relaxation, "zero-turbulence state ready");
        Ok(self.zero_ti_status())
    }

    /// Restore the state replaced by the last change.
    ///
    /// # Errors
    /// `NoZeroTiHistory` if there is nothing to restore.
    pub fn revert_zero_ti(&mut self) -> CurveResult<ZeroTiStatus> {
        let previous = self.history.take().ok_or(CurveError::NoZeroTiHistory)?;
        self.state = previous;
        tracing::debug!(status = ?self.zero_ti_status(), "zero-turbulence state reverted");
        Ok(self.zero_ti_status())
    }

    fn transition(&mut self, next: ZeroTiState) {
        let previous = std::mem::replace(&mut self.state, next);
        tracing::debug!(
            from = ?previous.status(),
            to = ?self.state.status(),
            "zero-turbulence state changed"
        );
        // A ready snapshot is only displaced by a newer ready one.
        if previous.status() == ZeroTiStatus::ZeroTiReady || self.history.is_none() {
            self.history = Some(previous);
        }
    }

    fn check_zero_ti_inputs(&self) -> CurveResult<()> {
        if self.available.is_none() {
            return Err(if self.density_known {
                CurveError::MissingRotor
            } else {
                CurveError::MissingDensity
            });
        }
        if self.reference_turbulence.is_none() {
            return Err(self.missing_turbulence());
        }
        Ok(())
    }

    fn missing_turbulence(&self) -> CurveError {
        match self.table.turbulences() {
            Err(err) => err,
            Ok(_) => CurveError::Configuration {
                what: "turbulence column unavailable".to_string(),
            },
        }
    }

    fn clamp(&self, power: f64) -> f64 {
        if power.is_nan() {
            return 0.0;
        }
        power.clamp(0.0, self.rated_power)
    }
}

impl PowerFunction for PowerCurve {
    fn power(&self, wind_speed: f64) -> f64 {
        self.base_power(wind_speed)
    }
}

impl fmt::Debug for PowerCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerCurve")
            .field("mode", &self.mode)
            .field("samples", &self.table.len())
            .field("rated_power", &self.rated_power)
            .field("cut_out_wind_speed", &self.cut_out_wind_speed)
            .field("zero_ti_status", &self.zero_ti_status())
            .field("relaxation", &self.state.relaxation)
            .field("has_deviation_model", &self.deviation.is_some())
            .finish()
    }
}
