//! The 1-D adaptive integrator: the 15-point Gauss-Kronrod rule driven by
//! recursive bisection of the interval with the largest error.

use std::fmt;

use log::debug;

use crate::adaptive::{subdivide, Refine};
use crate::config::QuadConfig;
use crate::error::{QuadError, Result};
use crate::integrand::{Line, Packed, Sampler, Scalar, SimdIntegrand};
use crate::partition::Cell;
use crate::rules::gauss_kronrod::{Gk15, N_POINTS};
use crate::substitution::{Substituted, Substitution};

/// Stores the result of an adaptive integration.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadResult {
    /// The estimated value of the integral.
    pub value: f64,
    /// The estimated absolute error. This is a heuristic, not a certified
    /// bound.
    pub error: f64,
    /// The number of integrand evaluations.
    pub neval: usize,
}

impl QuadResult {
    fn oriented(self, sign: f64) -> Self {
        QuadResult {
            value: sign * self.value,
            ..self
        }
    }
}

impl fmt::Display for QuadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.12e} +/- {:.3e} ({} evaluations)",
            self.value, self.error, self.neval
        )
    }
}

/// A subinterval of the partition with its rule estimate.
struct Interval {
    lo: f64,
    hi: f64,
    value: f64,
    error: f64,
}

impl Cell for Interval {
    fn value(&self) -> f64 {
        self.value
    }

    fn error(&self) -> f64 {
        self.error
    }
}

struct Bisection<'a, S: ?Sized> {
    sampler: &'a S,
    rule: Gk15,
    neval: usize,
    /// Absolute width below which children are not produced.
    min_width: f64,
}

impl<S: Sampler + ?Sized> Bisection<'_, S> {
    fn interval(&mut self, lo: f64, hi: f64) -> Result<Interval> {
        let estimate = self.rule.apply(self.sampler, lo, hi)?;
        self.neval += N_POINTS;
        Ok(Interval {
            lo,
            hi,
            value: estimate.value,
            error: estimate.error,
        })
    }
}

impl<S: Sampler + ?Sized> Refine for Bisection<'_, S> {
    type Cell = Interval;

    fn split(&mut self, cell: &Interval) -> Result<Option<(Interval, Interval)>> {
        let mid = cell.lo + 0.5 * (cell.hi - cell.lo);
        if !(cell.lo < mid && mid < cell.hi) || mid - cell.lo < self.min_width {
            return Ok(None);
        }
        let left = self.interval(cell.lo, mid)?;
        let right = self.interval(mid, cell.hi)?;
        Ok(Some((left, right)))
    }

    fn neval(&self) -> usize {
        self.neval
    }
}

/// Runs the 1-D engine on a validated configuration and finite bounds.
pub(crate) fn adaptive_gk<S: Sampler + ?Sized>(
    sampler: &S,
    a: f64,
    b: f64,
    config: &QuadConfig,
) -> Result<QuadResult> {
    if a == b {
        return Ok(QuadResult::default());
    }
    let (lo, hi, sign) = if a < b { (a, b, 1.0) } else { (b, a, -1.0) };
    let width = hi - lo;
    if !width.is_finite() {
        return Err(QuadError::invalid_input(format!(
            "the width of [{}, {}] overflows",
            lo, hi
        )));
    }

    let mut refiner = Bisection {
        sampler,
        rule: Gk15::new(),
        neval: 0,
        min_width: config.min_width * width,
    };
    let root = refiner.interval(lo, hi)?;
    match subdivide(&mut refiner, root, config) {
        Ok(result) => Ok(result.oriented(sign)),
        Err(QuadError::NonConvergence {
            result,
            cells,
            limit,
        }) => Err(QuadError::NonConvergence {
            result: result.oriented(sign),
            cells,
            limit,
        }),
        Err(err) => Err(err),
    }
}

fn check_bounds(a: f64, b: f64) -> Result<()> {
    if a.is_nan() || b.is_nan() {
        return Err(QuadError::invalid_input(format!(
            "bounds must not be NaN, got [{}, {}]",
            a, b
        )));
    }
    if a.is_infinite() || b.is_infinite() {
        return Err(QuadError::invalid_input(format!(
            "infinite bounds [{}, {}] need a substitution mapping them to finite values",
            a, b
        )));
    }
    Ok(())
}

/// The adaptive 1-D integrator.
///
/// A `Quad` holds nothing but its settings, so one value can serve any number
/// of calls, from any number of threads.
///
/// ```
/// use cubage::{Quad, QuadConfig};
///
/// let quad = Quad::with_config(QuadConfig::one_dim().with_epsrel(1e-10));
/// let result = quad.integrate(|x: f64| x.sin(), 0.0, std::f64::consts::PI).unwrap();
/// assert!((result.value - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quad {
    config: QuadConfig,
}

impl Quad {
    /// Creates an integrator with the default 1-D settings.
    pub fn new() -> Self {
        Quad::with_config(QuadConfig::one_dim())
    }

    pub fn with_config(config: QuadConfig) -> Self {
        Quad { config }
    }

    pub fn config(&self) -> &QuadConfig {
        &self.config
    }

    /// Integrates `f` over `[a, b]`. With `a > b` the result changes sign.
    ///
    /// # Errors
    ///
    /// * [`QuadError::InvalidInput`] for NaN or infinite bounds, or an invalid
    ///   configuration.
    /// * [`QuadError::InvalidIntegrand`] as soon as `f` returns NaN or an
    ///   infinity.
    /// * [`QuadError::NonConvergence`] when the subdivision budget runs out.
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F, a: f64, b: f64) -> Result<QuadResult> {
        check_bounds(a, b)?;
        self.run(&Scalar(&Line(f)), a, b)
    }

    /// Integrates `f` over `[a, b]` in the variable `u` of `sub`, that is
    /// `∫_{u(a)}^{u(b)} f(x(u)) x'(u) du`.
    ///
    /// The bounds may be infinite as long as `sub` maps them to finite values.
    /// `sub.dxdu` must be the derivative of `sub.x`; this is not checked.
    ///
    /// ```
    /// use cubage::{Quad, Sub};
    ///
    /// // The tail of 1/x² maps to the finite interval [0, 1].
    /// let result = Quad::new()
    ///     .integrate_sub(|x: f64| 1.0 / (x * x), 1.0, f64::INFINITY, &Sub::Reciprocal)
    ///     .unwrap();
    /// assert!((result.value - 1.0).abs() < 1e-12);
    /// ```
    pub fn integrate_sub<S, F>(&self, f: F, a: f64, b: f64, sub: &S) -> Result<QuadResult>
    where
        S: Substitution + ?Sized,
        F: Fn(f64) -> f64,
    {
        let (ua, ub) = (sub.u(a), sub.u(b));
        if !ua.is_finite() || !ub.is_finite() {
            return Err(QuadError::invalid_input(format!(
                "the substitution maps [{}, {}] to [{}, {}]",
                a, b, ua, ub
            )));
        }
        self.run(&Scalar(&Substituted { func: f, sub }), ua, ub)
    }

    /// Integrates a 1-dimensional [`SimdIntegrand`], four abscissas at a time.
    ///
    /// Samples the same points as [`Quad::integrate`] and gives the same
    /// result for the same function.
    pub fn integrate_simd<F: SimdIntegrand + ?Sized>(
        &self,
        f: &F,
        a: f64,
        b: f64,
    ) -> Result<QuadResult> {
        if f.dim() != 1 {
            return Err(QuadError::invalid_input(format!(
                "expected a 1-dimensional integrand, got dimension {}",
                f.dim()
            )));
        }
        check_bounds(a, b)?;
        self.run(&Packed(f), a, b)
    }

    fn run<S: Sampler + ?Sized>(&self, sampler: &S, a: f64, b: f64) -> Result<QuadResult> {
        self.config.validate()?;
        debug!(
            "integrating over [{}, {}] with epsrel {:e}, epsabs {:e}",
            a, b, self.config.tolerance.epsrel, self.config.tolerance.epsabs
        );
        let result = adaptive_gk(sampler, a, b, &self.config)?;
        debug!("converged to {}", result);
        Ok(result)
    }
}

/// Integrates `f` over `[a, b]` to the default tolerances (relative `1e-5`,
/// absolute `1e-10`).
///
/// ```
/// let result = cubage::integrate(|x: f64| x.powi(4), 0.0, 1.0).unwrap();
/// assert!((result.value - 0.2).abs() < 1e-15);
/// assert_eq!(result.neval, 15);
/// ```
pub fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> Result<QuadResult> {
    Quad::new().integrate(f, a, b)
}

/// Integrates `f` over `[a, b]`, stopping once either tolerance is met.
pub fn integrate_with<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    epsrel: f64,
    epsabs: f64,
) -> Result<QuadResult> {
    let config = QuadConfig::one_dim()
        .with_epsrel(epsrel)
        .with_epsabs(epsabs);
    Quad::with_config(config).integrate(f, a, b)
}

/// Integrates `f` over `[a, b]` after the change of variable `sub`.
///
/// See [`Quad::integrate_sub`].
pub fn integrate_sub<S, F>(
    f: F,
    a: f64,
    b: f64,
    epsrel: f64,
    epsabs: f64,
    sub: &S,
) -> Result<QuadResult>
where
    S: Substitution + ?Sized,
    F: Fn(f64) -> f64,
{
    let config = QuadConfig::one_dim()
        .with_epsrel(epsrel)
        .with_epsabs(epsabs);
    Quad::with_config(config).integrate_sub(f, a, b, sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;
    use wide::f64x4;

    #[test]
    fn test_polynomial_in_one_application() {
        let result = integrate(|x: f64| x.powi(4), 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(result.value, 0.2, epsilon = 1e-15);
        assert_eq!(result.neval, N_POINTS);
        assert!(result.error < 1e-14);
    }

    #[test]
    fn test_converges_on_smooth_integrands() {
        let result = integrate_with(|x: f64| 1.0 / (1.0 + x * x), 0.0, 1.0, 1e-12, 0.0).unwrap();
        assert_abs_diff_eq!(result.value, PI / 4.0, epsilon = 1e-12);

        let result = integrate_with(|x: f64| (10.0 * x).sin(), 0.0, 2.0 * PI, 0.0, 1e-10).unwrap();
        assert_abs_diff_eq!(result.value, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_endpoint_singularity() {
        let result = integrate_with(f64::ln, 0.0, 1.0, 1e-10, 0.0).unwrap();
        assert_abs_diff_eq!(result.value, -1.0, epsilon = 1e-8);
        assert!(result.neval > N_POINTS);
        assert_eq!(result.neval % (2 * N_POINTS), N_POINTS);
    }

    #[test]
    fn test_orientation_is_exact() {
        let forward = integrate_with(f64::sqrt, 0.0, 2.0, 1e-9, 0.0).unwrap();
        let backward = integrate_with(f64::sqrt, 2.0, 0.0, 1e-9, 0.0).unwrap();
        assert_eq!(forward.value, -backward.value);
        assert_eq!(forward.error, backward.error);
        assert_eq!(forward.neval, backward.neval);
        assert_abs_diff_eq!(forward.value, 2.0 * 2f64.sqrt() * 2.0 / 3.0, epsilon = 1e-8);
    }

    #[test]
    fn test_zero_width_domain() {
        let result = integrate(|_| panic!("must not be evaluated"), 1.5, 1.5).unwrap();
        assert_eq!(result, QuadResult::default());
    }

    #[test]
    fn test_invalid_bounds() {
        for (a, b) in [(f64::NAN, 1.0), (0.0, f64::INFINITY), (f64::NEG_INFINITY, 0.0)] {
            assert!(matches!(
                integrate(|x: f64| x, a, b),
                Err(QuadError::InvalidInput { .. })
            ));
        }
        assert!(matches!(
            integrate(|x: f64| x, -f64::MAX, f64::MAX),
            Err(QuadError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(matches!(
            integrate_with(|x: f64| x, 0.0, 1.0, -1.0, 0.0),
            Err(QuadError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_non_finite_integrand() {
        // The center of [-1, 1] is sampled first.
        match integrate(|x: f64| 1.0 / x, -1.0, 1.0) {
            Err(QuadError::InvalidIntegrand { point, value }) => {
                assert_eq!(point, vec![0.0]);
                assert!(value.is_infinite());
            }
            other => panic!("expected an invalid integrand, got {:?}", other),
        }
    }

    #[test]
    fn test_budget_of_one() {
        let quad = Quad::with_config(
            QuadConfig::one_dim()
                .with_epsrel(1e-12)
                .with_epsabs(0.0)
                .with_max_subdivisions(1),
        );
        match quad.integrate(f64::sqrt, 0.0, 1.0) {
            Err(QuadError::NonConvergence {
                result,
                cells,
                limit,
            }) => {
                assert_eq!((cells, limit), (1, 1));
                assert_eq!(result.neval, N_POINTS);
                assert!(result.value.is_finite());
                assert!(result.error.is_finite() && result.error > 0.0);
                assert_abs_diff_eq!(result.value, 2.0 / 3.0, epsilon = 1e-2);
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_intervals_stop_refinement() {
        // Both halves of the root are already narrower than the floor.
        let quad = Quad::with_config(
            QuadConfig::one_dim()
                .with_epsrel(0.0)
                .with_epsabs(1e-6)
                .with_min_width(0.3),
        );
        let err = quad
            .integrate(|x: f64| if x < 1.0 / 3.0 { 0.0 } else { 1.0 }, 0.0, 1.0)
            .unwrap_err();
        let partial = err.partial().unwrap();
        assert_eq!(partial.neval, 3 * N_POINTS);
        assert_abs_diff_eq!(partial.value, 2.0 / 3.0, epsilon = 5e-2);
        match err {
            QuadError::NonConvergence { cells, limit, .. } => assert!(cells < limit),
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_finite_bounds() {
        // a + b overflows while b - a does not.
        let result = integrate_with(|x: f64| 1.0 / x, 1e308, 1.7e308, 1e-10, 0.0).unwrap();
        assert_relative_eq!(result.value, 1.7f64.ln(), max_relative = 1e-9);

        let reversed = integrate_with(|x: f64| 1.0 / x, -1.7e308, -1e308, 1e-10, 0.0).unwrap();
        assert_relative_eq!(reversed.value, -1.7f64.ln(), max_relative = 1e-9);
    }

    struct Rational;

    impl SimdIntegrand for Rational {
        fn dim(&self) -> usize {
            1
        }

        fn eval_simd(&self, points: &[f64x4]) -> f64x4 {
            let x = points[0];
            x * x / (f64x4::splat(1.0) + x * x)
        }
    }

    #[test]
    fn test_simd_matches_scalar() {
        let quad = Quad::with_config(QuadConfig::one_dim().with_epsrel(1e-12));
        let scalar = quad.integrate(|x: f64| x * x / (1.0 + x * x), -3.0, 5.0).unwrap();
        let simd = quad.integrate_simd(&Rational, -3.0, 5.0).unwrap();
        assert_eq!(scalar, simd);
    }

    #[test]
    fn test_simd_dimension_mismatch() {
        struct Plane;
        impl SimdIntegrand for Plane {
            fn dim(&self) -> usize {
                2
            }
            fn eval_simd(&self, points: &[f64x4]) -> f64x4 {
                points[0] + points[1]
            }
        }
        assert!(matches!(
            Quad::new().integrate_simd(&Plane, 0.0, 1.0),
            Err(QuadError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_display() {
        let result = QuadResult {
            value: 0.5,
            error: 1e-12,
            neval: 45,
        };
        assert_eq!(result.to_string(), "5.000000000000e-1 +/- 1.000e-12 (45 evaluations)");
    }
}
