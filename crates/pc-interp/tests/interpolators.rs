//! Integration tests across the interpolator family.

use pc_core::BinLimits;
use pc_interp::{
    CurveInterpolator, DEFAULT_INTEGRATION_STEP, InterpError, InterpolationMode,
    InterpolatorInput, PowerFunction, bin_average,
};
use proptest::prelude::*;

const CUT_OUT: f64 = 25.0;

/// Sharp-kneed reference curve: cubic from 3 m/s, rated 2000 kW from 12 m/s.
struct KneeCurve;

impl PowerFunction for KneeCurve {
    fn power(&self, wind_speed: f64) -> f64 {
        if wind_speed < 3.0 {
            0.0
        } else {
            let k = 2000.0 / (1728.0 - 27.0);
            (k * (wind_speed.powi(3) - 27.0)).min(2000.0)
        }
    }
}

fn binned_knee() -> (Vec<f64>, Vec<f64>) {
    let xs: Vec<f64> = (1..=20).map(f64::from).collect();
    let ys = xs
        .iter()
        .map(|&c| bin_average(&KneeCurve, BinLimits::centered(c, 1.0), DEFAULT_INTEGRATION_STEP))
        .collect();
    (xs, ys)
}

fn scenario_samples() -> (Vec<f64>, Vec<f64>) {
    let xs = vec![
        3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0,
    ];
    let ys = vec![
        0.0, 50.0, 150.0, 300.0, 500.0, 750.0, 1050.0, 1400.0, 1750.0, 2000.0, 2000.0,
    ];
    (xs, ys)
}

#[test]
fn linear_scenario() {
    let (xs, ys) = scenario_samples();
    let curve =
        CurveInterpolator::build(InterpolationMode::Linear, &InterpolatorInput::new(&xs, &ys, CUT_OUT))
            .unwrap();
    assert_eq!(curve.power(4.5), 100.0);
    assert_eq!(curve.power(30.0), 0.0);
}

#[test]
fn every_mode_builds_from_binned_samples() {
    let (xs, ys) = binned_knee();
    for mode in InterpolationMode::ALL {
        let curve = CurveInterpolator::build(mode, &InterpolatorInput::new(&xs, &ys, CUT_OUT))
            .unwrap_or_else(|e| panic!("{mode}: {e}"));
        assert_eq!(curve.power(CUT_OUT + 0.5), 0.0, "{mode}");
        let mid = curve.power(8.0);
        assert!(mid > 400.0 && mid < 700.0, "{mode}: power(8) = {mid}");
    }
}

#[test]
fn duplicate_wind_speeds_rejected_by_every_mode() {
    let xs = [3.0, 4.0, 4.0, 5.0, 6.0];
    let ys = [0.0, 50.0, 60.0, 150.0, 300.0];
    for mode in InterpolationMode::ALL {
        let err = CurveInterpolator::build(mode, &InterpolatorInput::new(&xs, &ys, CUT_OUT))
            .unwrap_err();
        assert!(
            matches!(err, InterpError::DuplicateWindSpeed { .. }),
            "{mode}: {err}"
        );
    }
}

#[test]
fn cubic_modes_need_four_samples() {
    let xs = [3.0, 4.0, 5.0];
    let ys = [0.0, 50.0, 150.0];
    assert!(
        CurveInterpolator::build(InterpolationMode::Linear, &InterpolatorInput::new(&xs, &ys, CUT_OUT))
            .is_ok()
    );
    for mode in [
        InterpolationMode::CubicSpline,
        InterpolationMode::CubicHermite,
        InterpolationMode::MarmanderCubicSpline,
        InterpolationMode::MarmanderCubicHermite,
    ] {
        let err = CurveInterpolator::build(mode, &InterpolatorInput::new(&xs, &ys, CUT_OUT))
            .unwrap_err();
        assert!(matches!(err, InterpError::TooFewSamples { needed: 4, .. }));
    }
}

#[test]
fn marmander_preserves_bin_averages() {
    let (xs, ys) = binned_knee();
    let limits: Vec<BinLimits> = xs.iter().map(|&x| BinLimits::centered(x, 1.0)).collect();

    for mode in [
        InterpolationMode::MarmanderCubicSpline,
        InterpolationMode::MarmanderCubicHermite,
    ] {
        let input = InterpolatorInput::new(&xs, &ys, CUT_OUT).with_bin_limits(&limits);
        let curve = CurveInterpolator::build(mode, &input).unwrap();
        let CurveInterpolator::Marmander(fit) = &curve else {
            panic!("{mode} did not build a marmander fit");
        };
        let report = fit.fit();
        assert!(report.iterations <= 20);
        assert!(report.rmse < 0.01, "{mode}: rmse {}", report.rmse);

        let adjustable: Vec<_> = report.bins.iter().filter(|b| b.adjustable).collect();
        assert!(!adjustable.is_empty());
        let mut sum_sq = 0.0;
        for bin in &adjustable {
            let average = bin_average(&curve, bin.limits, DEFAULT_INTEGRATION_STEP);
            sum_sq += (average - bin.observed).powi(2);
        }
        let rmse = (sum_sq / adjustable.len() as f64).sqrt();
        assert!(rmse < 0.01, "{mode}: recomputed rmse {rmse}");
    }
}

#[test]
fn marmander_beats_plain_spline_on_bin_averages() {
    let (xs, ys) = binned_knee();
    let input = InterpolatorInput::new(&xs, &ys, CUT_OUT);
    let plain = CurveInterpolator::build(InterpolationMode::CubicSpline, &input).unwrap();
    let fitted = CurveInterpolator::build(InterpolationMode::MarmanderCubicSpline, &input).unwrap();

    // Bin 10 sits on the convex part of the ramp.
    let limits = BinLimits::centered(10.0, 1.0);
    let observed = ys[9];
    let plain_error = (bin_average(&plain, limits, DEFAULT_INTEGRATION_STEP) - observed).abs();
    let fitted_error = (bin_average(&fitted, limits, DEFAULT_INTEGRATION_STEP) - observed).abs();
    assert!(fitted_error < plain_error);
    assert!(fitted_error < 0.05);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn zero_above_cut_out_for_every_mode(v in 25.000_001_f64..200.0) {
        let (xs, ys) = binned_knee();
        for mode in InterpolationMode::ALL {
            let curve = CurveInterpolator::build(mode, &InterpolatorInput::new(&xs, &ys, CUT_OUT))
                .unwrap();
            prop_assert_eq!(curve.power(v), 0.0);
        }
    }
}
