use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Round to the nearest kW, ties to even.
pub fn round_kw(v: Real) -> Real {
    v.round_ties_even()
}

/// Largest value of a slice, `None` when empty or all NaN.
pub fn max_of(values: &[Real]) -> Option<Real> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: Real| a.max(v))))
}

/// Smallest value of a slice, `None` when empty or all NaN.
pub fn min_of(values: &[Real]) -> Option<Real> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: Real| a.min(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn extremes_skip_nan() {
        assert_eq!(max_of(&[1.0, Real::NAN, 3.0]), Some(3.0));
        assert_eq!(min_of(&[2.0, Real::NAN, -1.0]), Some(-1.0));
        assert_eq!(max_of(&[]), None);
    }

    #[test]
    fn round_kw_ties_to_even() {
        assert_eq!(round_kw(1999.5), 2000.0);
        assert_eq!(round_kw(2.5), 2.0);
        assert_eq!(round_kw(0.4), 0.0);
        assert_eq!(round_kw(-0.6), -1.0);
    }
}
