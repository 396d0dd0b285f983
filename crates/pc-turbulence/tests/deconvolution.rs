//! Deconvolution against curves whose zero-turbulence shape is known.

use pc_core::{AvailablePower, DomainWarning, kg_per_m3, m2};
use pc_interp::PowerFunction;
use pc_turbulence::{
    DeconvolutionConfig, IdealizedCurve, IntegrationRange, IterationStats, ReferenceCurve,
    Relaxation, SimulatedPower, TurbulenceError, ZeroTurbulenceCurve,
};
use std::sync::Arc;

const RATED: f64 = 2000.0;
const TI: f64 = 0.1;

fn available() -> AvailablePower {
    // 100 m rotor
    AvailablePower::new(m2(7853.98), kg_per_m3(1.225)).unwrap()
}

fn truth() -> IdealizedCurve {
    IdealizedCurve::new(
        IterationStats {
            rated_power: RATED,
            cut_in_wind_speed: 3.0,
            cp_max: 0.45,
        },
        available(),
    )
    .unwrap()
}

fn wind_speeds() -> Vec<f64> {
    (1..=50).map(|i| 0.5 * f64::from(i)).collect()
}

/// Truth blurred at 10 % turbulence, as a measurement would see it.
fn measured() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let xs = wind_speeds();
    let simulated = SimulatedPower::new(
        truth(),
        Arc::new(IntegrationRange::default()),
        Relaxation::None,
    );
    let ys = xs.iter().map(|&v| simulated.power(v, TI)).collect();
    let tis = vec![TI; xs.len()];
    (xs, ys, tis)
}

fn deconvolve(
    xs: &[f64],
    ys: &[f64],
    tis: &[f64],
    config: &DeconvolutionConfig,
) -> Result<ZeroTurbulenceCurve, TurbulenceError> {
    let reference = ReferenceCurve::new(xs, ys, tis)?;
    ZeroTurbulenceCurve::deconvolve(
        &reference,
        available(),
        Arc::new(IntegrationRange::default()),
        Relaxation::None,
        config,
    )
}

#[test]
fn blurred_curve_recovers_its_sharp_knee() {
    let (xs, ys, tis) = measured();
    let zero_ti = deconvolve(&xs, &ys, &tis, &DeconvolutionConfig::default()).unwrap();

    assert!(zero_ti.iterations() <= 5);
    assert!((zero_ti.rated_power() - RATED).abs() < 1e-3 * RATED);
    assert!((zero_ti.idealized().cp_max() - 0.45).abs() <= 0.01);
    assert!((zero_ti.rated_wind_speed() - truth().rated_wind_speed()).abs() < 0.05);

    let truth = truth();
    for &v in &xs {
        let error = (zero_ti.power(v) - truth.power(v)).abs();
        assert!(error < 2.0, "at {v} m/s recovered power is off by {error} kW");
    }

    // The measured curve rounds the knee off well below rated power.
    let knee = xs.iter().position(|&v| v == 10.0).unwrap();
    assert!(ys[knee] < 0.95 * RATED);
    assert!(zero_ti.power(10.0) > 0.99 * RATED);
}

#[test]
fn recovered_curve_blurs_back_to_the_measurement() {
    let (xs, ys, tis) = measured();
    let zero_ti = deconvolve(&xs, &ys, &tis, &DeconvolutionConfig::default()).unwrap();
    let resimulated = SimulatedPower::new(
        &zero_ti,
        Arc::new(IntegrationRange::default()),
        Relaxation::None,
    );
    for (&v, &measured) in xs.iter().zip(&ys) {
        let error = (resimulated.power(v, TI) - measured).abs();
        assert!(error < 0.01 * RATED, "at {v} m/s: {error} kW");
    }
}

#[test]
fn zero_turbulence_measurement_is_returned_unchanged() {
    let xs = wind_speeds();
    let truth = truth();
    let ys: Vec<f64> = xs.iter().map(|&v| truth.power(v)).collect();
    let tis = vec![0.0; xs.len()];

    let zero_ti = deconvolve(&xs, &ys, &tis, &DeconvolutionConfig::default()).unwrap();
    assert_eq!(zero_ti.iterations(), 1);
    for (&v, &p) in xs.iter().zip(&ys) {
        assert!((zero_ti.power(v) - p).abs() < 1e-9, "at {v} m/s");
    }
}

#[test]
fn recovered_curve_is_monotone_and_bounded() {
    let (xs, ys, tis) = measured();
    let zero_ti = deconvolve(&xs, &ys, &tis, &DeconvolutionConfig::default()).unwrap();
    let rated = zero_ti.rated_power();

    let mut previous = 0.0;
    for i in 0..=300 {
        let v = 0.1 * f64::from(i);
        let p = zero_ti.power(v);
        assert!((0.0..=rated).contains(&p), "{p} kW at {v} m/s");
        assert!(p >= previous, "power drops at {v} m/s");
        previous = p;
    }
    assert_eq!(zero_ti.power(0.5), 0.0);
    assert_eq!(zero_ti.power(40.0), zero_ti.power(25.0));
}

#[test]
fn iteration_limit_is_convergence_error() {
    let (xs, ys, tis) = measured();
    let config = DeconvolutionConfig {
        max_iterations: 1,
        ..DeconvolutionConfig::default()
    };
    let err = deconvolve(&xs, &ys, &tis, &config).unwrap_err();
    assert_eq!(
        err,
        TurbulenceError::Convergence {
            what: "zero-turbulence statistics".to_string(),
            iterations: 1,
        }
    );
}

#[test]
fn super_betz_samples_are_reported_by_the_reference() {
    let xs = [3.0, 4.0, 5.0, 6.0];
    // Cp about 0.78 at 5 m/s
    let ys = [0.0, 100.0, 470.0, 600.0];
    let tis = [0.0; 4];
    let reference = ReferenceCurve::new(&xs, &ys, &tis).unwrap();
    let warnings = reference.betz_warnings(&available());
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        DomainWarning::BetzLimitExceeded { wind_speed, .. } if wind_speed == 5.0
    ));

    // the deconvolution itself still runs on such data
    assert!(deconvolve(&xs, &ys, &tis, &DeconvolutionConfig::default()).is_ok());
}

#[test]
fn rated_wind_speed_lies_between_cut_in_and_cut_out() {
    let (xs, ys, tis) = measured();
    let config = DeconvolutionConfig::default().with_cut_out(25.0);
    let zero_ti = deconvolve(&xs, &ys, &tis, &config).unwrap();
    assert!(zero_ti.cut_in_wind_speed() <= zero_ti.rated_wind_speed());
    assert!(zero_ti.rated_wind_speed() <= 25.0);
}

#[test]
fn rated_wind_speed_beyond_cut_out_is_rejected() {
    let (xs, ys, tis) = measured();
    // the recovered rated wind speed is about 9.74 m/s
    let config = DeconvolutionConfig::default().with_cut_out(9.0);
    let err = deconvolve(&xs, &ys, &tis, &config).unwrap_err();
    assert!(matches!(err, TurbulenceError::Configuration { .. }), "{err}");
}
