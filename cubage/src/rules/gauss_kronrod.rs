//! The 15-point Gauss-Kronrod rule.
//!
//! The 15 Kronrod abscissas contain the 7 Gauss abscissas, so a single pass
//! over the integrand yields both the 7-point Gauss estimate and the 15-point
//! Kronrod estimate. The error heuristic follows QUADPACK's `qk15`.

use crate::error::Result;
use crate::integrand::{Line, Sampler, Scalar};
use crate::rules::{check_finite, RuleEstimate};

/// Number of integrand evaluations per application.
pub const N_POINTS: usize = 15;

/// Kronrod abscissas on [-1, 1], positive half, largest first. The Gauss
/// abscissas are the entries with odd index, plus the center.
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144838258730,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

/// Kronrod weights, matching `XGK`.
const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

/// Gauss weights for `XGK[1]`, `XGK[3]`, `XGK[5]` and the center.
const WG: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

/// Scratch space for one application of the rule.
pub(crate) struct Gk15 {
    points: [f64; N_POINTS],
    values: [f64; N_POINTS],
}

impl Gk15 {
    pub(crate) fn new() -> Self {
        Gk15 {
            points: [0.0; N_POINTS],
            values: [0.0; N_POINTS],
        }
    }

    /// Applies the rule to a 1-dimensional sampler over `[lo, hi]`.
    pub(crate) fn apply<S: Sampler + ?Sized>(
        &mut self,
        sampler: &S,
        lo: f64,
        hi: f64,
    ) -> Result<RuleEstimate> {
        // `lo + hi` may overflow even when the width does not.
        let half_length = 0.5 * (hi - lo);
        let center = lo + half_length;

        self.points[0] = center;
        for (j, &x) in XGK[..7].iter().enumerate() {
            let abscissa = half_length * x;
            self.points[1 + 2 * j] = center - abscissa;
            self.points[2 + 2 * j] = center + abscissa;
        }

        sampler.sample(&self.points, &mut self.values);
        check_finite(&self.points, &self.values, 1)?;

        Ok(combine(&self.values, half_length))
    }
}

/// Combines the 15 samples laid out as `[center, (minus, plus) per abscissa]`.
fn combine(values: &[f64; N_POINTS], half_length: f64) -> RuleEstimate {
    let f_center = values[0];
    let mut res_gauss = f_center * WG[3];
    let mut res_kronrod = f_center * WGK[7];
    let mut res_abs = res_kronrod.abs();

    for j in 0..7 {
        let (f1, f2) = (values[1 + 2 * j], values[2 + 2 * j]);
        let f_sum = f1 + f2;
        res_kronrod += WGK[j] * f_sum;
        res_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            res_gauss += WG[j / 2] * f_sum;
        }
    }

    let mean = 0.5 * res_kronrod;
    let mut res_asc = WGK[7] * (f_center - mean).abs();
    for j in 0..7 {
        let (f1, f2) = (values[1 + 2 * j], values[2 + 2 * j]);
        res_asc += WGK[j] * ((f1 - mean).abs() + (f2 - mean).abs());
    }

    let abs_half_length = half_length.abs();
    let value = res_kronrod * half_length;
    res_abs *= abs_half_length;
    res_asc *= abs_half_length;

    let mut error = ((res_kronrod - res_gauss) * half_length).abs();
    if res_asc != 0.0 && error != 0.0 {
        error = res_asc * (200.0 * error / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * res_abs);
    }

    RuleEstimate { value, error }
}

/// Applies the 15-point Gauss-Kronrod rule once to `f` over `[lo, hi]`,
/// without any subdivision.
///
/// # Examples
///
/// ```
/// use cubage::rules::gauss_kronrod::gk15;
///
/// let estimate = gk15(|x: f64| x.powi(4), 0.0, 1.0).unwrap();
/// assert!((estimate.value - 0.2).abs() < 1e-15);
/// ```
///
/// # Errors
///
/// Fails with [`crate::QuadError::InvalidIntegrand`] if `f` is not finite at
/// one of the abscissas.
pub fn gk15<F: Fn(f64) -> f64>(f: F, lo: f64, hi: f64) -> Result<RuleEstimate> {
    Gk15::new().apply(&Scalar(&Line(f)), lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuadError;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_weights_integrate_constants() {
        let kronrod: f64 = WGK[7] + 2.0 * WGK[..7].iter().sum::<f64>();
        let gauss: f64 = WG[3] + 2.0 * WG[..3].iter().sum::<f64>();
        assert_abs_diff_eq!(kronrod, 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(gauss, 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_exact_for_polynomials() {
        let estimate = gk15(|x: f64| x.powi(4), 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(estimate.value, 0.2, epsilon = 1e-15);
        assert!(estimate.error < 1e-14, "error: {}", estimate.error);

        // Degree 14 is still within reach of the Kronrod rule.
        let estimate = gk15(|x: f64| x.powi(14), -1.0, 1.0).unwrap();
        assert_abs_diff_eq!(estimate.value, 2.0 / 15.0, epsilon = 1e-14);
    }

    #[test]
    fn test_smooth_function() {
        let estimate = gk15(f64::sin, 0.0, PI).unwrap();
        assert_abs_diff_eq!(estimate.value, 2.0, epsilon = 1e-12);
        assert!(estimate.error < 1e-10);
    }

    #[test]
    fn test_error_estimate_flags_hard_integrands() {
        let estimate = gk15(|x: f64| x.abs().sqrt(), -1.0, 1.0).unwrap();
        let exact = 4.0 / 3.0;
        assert!(estimate.error >= (estimate.value - exact).abs());
        assert!(estimate.error > 1e-4);
    }

    #[test]
    fn test_reversed_interval_flips_sign() {
        let forward = gk15(f64::exp, 0.0, 2.0).unwrap();
        let backward = gk15(f64::exp, 2.0, 0.0).unwrap();
        assert_eq!(forward.value, -backward.value);
        assert_eq!(forward.error, backward.error);
    }

    #[test]
    fn test_non_finite_sample() {
        let result = gk15(|x: f64| if x > 0.5 { f64::NAN } else { x }, 0.0, 1.0);
        assert!(matches!(result, Err(QuadError::InvalidIntegrand { .. })));
    }
}
