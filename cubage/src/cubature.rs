//! The n-D adaptive integrator: the Genz-Malik rule driven by recursive
//! halving of the region with the largest error, along its roughest axis.

use log::debug;

use crate::adaptive::{subdivide, Refine};
use crate::config::QuadConfig;
use crate::error::{QuadError, Result};
use crate::integrand::{FnIntegrand, Integrand, Packed, Sampler, Scalar, SimdIntegrand};
use crate::partition::Cell;
use crate::quad::{adaptive_gk, QuadResult};
use crate::rules::genz_malik::{GenzMalik, MAX_DIM};

/// A subregion of the partition with its rule estimate.
struct Region {
    center: Vec<f64>,
    half_width: Vec<f64>,
    value: f64,
    error: f64,
    split_axis: usize,
}

impl Cell for Region {
    fn value(&self) -> f64 {
        self.value
    }

    fn error(&self) -> f64 {
        self.error
    }
}

struct Halving<'a, S: ?Sized> {
    sampler: &'a S,
    rule: GenzMalik,
    neval: usize,
    /// Per-axis half-width below which children are not produced.
    min_half_width: Vec<f64>,
}

impl<S: Sampler + ?Sized> Halving<'_, S> {
    fn region(&mut self, center: Vec<f64>, half_width: Vec<f64>) -> Result<Region> {
        let application = self.rule.apply(self.sampler, &center, &half_width)?;
        self.neval += self.rule.n_points();
        Ok(Region {
            center,
            half_width,
            value: application.estimate.value,
            error: application.estimate.error,
            split_axis: application.split_axis,
        })
    }
}

impl<S: Sampler + ?Sized> Refine for Halving<'_, S> {
    type Cell = Region;

    fn split(&mut self, cell: &Region) -> Result<Option<(Region, Region)>> {
        let axis = cell.split_axis;
        let c = cell.center[axis];
        let h = 0.5 * cell.half_width[axis];
        let (lower, upper) = (c - h, c + h);
        if !(lower < c && c < upper) || h < self.min_half_width[axis] {
            return Ok(None);
        }

        let mut half_width = cell.half_width.clone();
        half_width[axis] = h;
        let mut center = cell.center.clone();
        center[axis] = lower;
        let left = self.region(center.clone(), half_width.clone())?;
        center[axis] = upper;
        let right = self.region(center, half_width)?;
        Ok(Some((left, right)))
    }

    fn neval(&self) -> usize {
        self.neval
    }
}

/// The adaptive n-D integrator.
///
/// The dimension is taken from the integrand. One dimension is handled by the
/// 1-D Gauss-Kronrod engine, since the Genz-Malik rule needs at least two.
///
/// ```
/// use cubage::{Cubature, integrand::PerAxis};
///
/// let f = PerAxis::<_, 2>::new(|x: f64, y: f64| x * y);
/// let result = Cubature::new().integrate(&f, &[0.0, 0.0], &[1.0, 1.0]).unwrap();
/// assert!((result.value - 0.25).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubature {
    config: QuadConfig,
}

impl Default for Cubature {
    fn default() -> Self {
        Cubature::new()
    }
}

impl Cubature {
    /// Creates an integrator with the default n-D settings.
    pub fn new() -> Self {
        Cubature::with_config(QuadConfig::multi_dim())
    }

    pub fn with_config(config: QuadConfig) -> Self {
        Cubature { config }
    }

    pub fn config(&self) -> &QuadConfig {
        &self.config
    }

    /// Integrates `f` over the box with corners `a` and `b`. Every axis with
    /// `a[i] > b[i]` flips the sign of the result.
    ///
    /// # Errors
    ///
    /// * [`QuadError::InvalidInput`] if the corners do not match the dimension
    ///   of `f`, the dimension is 0 or above [`MAX_DIM`], a bound is NaN or
    ///   infinite, or the configuration is invalid.
    /// * [`QuadError::InvalidIntegrand`] as soon as `f` returns NaN or an
    ///   infinity.
    /// * [`QuadError::NonConvergence`] when the subdivision budget runs out.
    pub fn integrate<F: Integrand + ?Sized>(
        &self,
        f: &F,
        a: &[f64],
        b: &[f64],
    ) -> Result<QuadResult> {
        self.run(&Scalar(f), a, b)
    }

    /// Integrates a [`SimdIntegrand`], four stencil points at a time.
    ///
    /// Samples the same points as [`Cubature::integrate`] and gives the same
    /// result for the same function.
    pub fn integrate_simd<F: SimdIntegrand + ?Sized>(
        &self,
        f: &F,
        a: &[f64],
        b: &[f64],
    ) -> Result<QuadResult> {
        self.run(&Packed(f), a, b)
    }

    fn run<S: Sampler + ?Sized>(&self, sampler: &S, a: &[f64], b: &[f64]) -> Result<QuadResult> {
        self.config.validate()?;
        let dim = sampler.dim();
        check_domain(dim, a, b)?;
        debug!(
            "integrating over {:?} x {:?} with epsrel {:e}, epsabs {:e}",
            a, b, self.config.tolerance.epsrel, self.config.tolerance.epsabs
        );

        let result = if dim == 1 {
            adaptive_gk(sampler, a[0], b[0], &self.config)?
        } else {
            adaptive_gm(sampler, a, b, &self.config)?
        };
        debug!("converged to {}", result);
        Ok(result)
    }
}

fn check_domain(dim: usize, a: &[f64], b: &[f64]) -> Result<()> {
    if dim == 0 || dim > MAX_DIM {
        return Err(QuadError::invalid_input(format!(
            "dimension must be between 1 and {}, got {}",
            MAX_DIM, dim
        )));
    }
    if a.len() != dim || b.len() != dim {
        return Err(QuadError::invalid_input(format!(
            "expected {} bounds per corner, got {} and {}",
            dim,
            a.len(),
            b.len()
        )));
    }
    if let Some((i, (lo, hi))) = a
        .iter()
        .zip(b)
        .enumerate()
        .find(|(_, (lo, hi))| !lo.is_finite() || !hi.is_finite())
    {
        return Err(QuadError::invalid_input(format!(
            "bounds must be finite, got [{}, {}] on axis {}",
            lo, hi, i
        )));
    }
    Ok(())
}

fn adaptive_gm<S: Sampler + ?Sized>(
    sampler: &S,
    a: &[f64],
    b: &[f64],
    config: &QuadConfig,
) -> Result<QuadResult> {
    if a.iter().zip(b).any(|(lo, hi)| lo == hi) {
        return Ok(QuadResult::default());
    }

    let dim = a.len();
    let mut sign = 1.0;
    let mut center = Vec::with_capacity(dim);
    let mut half_width = Vec::with_capacity(dim);
    for (&ai, &bi) in a.iter().zip(b) {
        let (lo, hi) = if ai < bi { (ai, bi) } else { (bi, ai) };
        if ai > bi {
            sign = -sign;
        }
        let h = 0.5 * (hi - lo);
        if !h.is_finite() {
            return Err(QuadError::invalid_input(format!(
                "the width of [{}, {}] overflows",
                lo, hi
            )));
        }
        center.push(lo + h);
        half_width.push(h);
    }

    let mut refiner = Halving {
        sampler,
        rule: GenzMalik::new(dim)?,
        neval: 0,
        min_half_width: half_width.iter().map(|h| config.min_width * h).collect(),
    };
    let root = refiner.region(center, half_width)?;
    let oriented = |result: QuadResult| QuadResult {
        value: sign * result.value,
        ..result
    };
    match subdivide(&mut refiner, root, config) {
        Ok(result) => Ok(oriented(result)),
        Err(QuadError::NonConvergence {
            result,
            cells,
            limit,
        }) => Err(QuadError::NonConvergence {
            result: oriented(result),
            cells,
            limit,
        }),
        Err(err) => Err(err),
    }
}

/// Integrates `f` over the `N`-dimensional box with corners `a` and `b`,
/// stopping once either tolerance is met.
///
/// ```
/// let f = |x: &[f64]| x[0] * x[0] + x[1] * x[2];
/// let result = cubage::integrate_nd(f, [0.0; 3], [1.0; 3], 1e-10, 0.0).unwrap();
/// assert!((result.value - (1.0 / 3.0 + 0.25)).abs() < 1e-12);
/// ```
pub fn integrate_nd<const N: usize, F: Fn(&[f64]) -> f64>(
    f: F,
    a: [f64; N],
    b: [f64; N],
    epsrel: f64,
    epsabs: f64,
) -> Result<QuadResult> {
    let config = QuadConfig::multi_dim()
        .with_epsrel(epsrel)
        .with_epsabs(epsabs);
    Cubature::with_config(config).integrate(&FnIntegrand::new(N, f), &a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_REGIONS;
    use crate::integrand::PerAxis;
    use crate::quad::integrate_with;
    use crate::rules::genz_malik::n_points;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use libm::erf;
    use std::f64::consts::PI;
    use wide::f64x4;

    #[test]
    fn test_bilinear_in_one_application() {
        let result = integrate_nd(|x: &[f64]| x[0] * x[1], [0.0, 0.0], [1.0, 1.0], 1e-5, 1e-10)
            .unwrap();
        assert_abs_diff_eq!(result.value, 0.25, epsilon = 1e-15);
        assert_eq!(result.neval, n_points(2));
    }

    #[test]
    fn test_separable_matches_product_of_line_integrals() {
        let result = integrate_nd(
            |x: &[f64]| x[0].exp() * x[1].cos() * (1.0 + x[2]).ln(),
            [0.0, 0.0, 0.0],
            [1.0, 2.0, 0.5],
            1e-9,
            0.0,
        )
        .unwrap();
        let gx = integrate_with(f64::exp, 0.0, 1.0, 1e-12, 0.0).unwrap().value;
        let gy = integrate_with(f64::cos, 0.0, 2.0, 1e-12, 0.0).unwrap().value;
        let gz = integrate_with(|z: f64| (1.0 + z).ln(), 0.0, 0.5, 1e-12, 0.0)
            .unwrap()
            .value;
        assert_relative_eq!(result.value, gx * gy * gz, max_relative = 1e-8);
    }

    #[test]
    fn test_gaussian_peak() {
        let f = |x: &[f64]| (-50.0 * ((x[0] - 0.5).powi(2) + (x[1] - 0.5).powi(2))).exp();
        let line = (PI / 50.0).sqrt() * erf(0.5 * 50f64.sqrt());
        let result = integrate_nd(f, [0.0, 0.0], [1.0, 1.0], 1e-8, 0.0).unwrap();
        assert_relative_eq!(result.value, line * line, max_relative = 1e-7);
        assert!(result.neval > n_points(2));
    }

    #[test]
    fn test_per_axis_matches_slice() {
        let cubature = Cubature::with_config(QuadConfig::multi_dim().with_epsrel(1e-8));
        let slice = FnIntegrand::new(3, |x: &[f64]| (x[0] * x[1]).sin() + x[2] * x[2]);
        let per_axis = PerAxis::<_, 3>::new(|x: f64, y: f64, z: f64| (x * y).sin() + z * z);
        let (a, b) = ([0.0, -1.0, 0.5], [2.0, 1.0, 1.5]);
        assert_eq!(
            cubature.integrate(&slice, &a, &b).unwrap(),
            cubature.integrate(&per_axis, &a, &b).unwrap()
        );
    }

    struct Lorentzian;

    impl SimdIntegrand for Lorentzian {
        fn dim(&self) -> usize {
            3
        }

        fn eval_simd(&self, points: &[f64x4]) -> f64x4 {
            let (x, y, z) = (points[0], points[1], points[2]);
            f64x4::splat(1.0) / (f64x4::splat(1.0) + x * x + y * y + z * z)
        }
    }

    #[test]
    fn test_simd_matches_scalar() {
        let cubature = Cubature::with_config(QuadConfig::multi_dim().with_epsrel(1e-7));
        let scalar = FnIntegrand::new(3, |x: &[f64]| {
            1.0 / (1.0 + x[0] * x[0] + x[1] * x[1] + x[2] * x[2])
        });
        let (a, b) = ([-2.0, -1.0, 0.0], [2.0, 3.0, 1.0]);
        let expected = cubature.integrate(&scalar, &a, &b).unwrap();
        let simd = cubature.integrate_simd(&Lorentzian, &a, &b).unwrap();
        assert_eq!(expected, simd);
        // 33 points per region do not fill whole packets.
        assert!(expected.neval % 4 != 0);
    }

    #[test]
    fn test_orientation() {
        let f = FnIntegrand::new(2, |x: &[f64]| (x[0] + 2.0 * x[1]).cos() + x[0]);
        let cubature = Cubature::with_config(QuadConfig::multi_dim().with_epsrel(1e-9));
        let forward = cubature.integrate(&f, &[0.0, 0.0], &[1.0, 2.0]).unwrap();
        let one_flip = cubature.integrate(&f, &[1.0, 0.0], &[0.0, 2.0]).unwrap();
        let two_flips = cubature.integrate(&f, &[1.0, 2.0], &[0.0, 0.0]).unwrap();
        assert_eq!(one_flip.value, -forward.value);
        assert_eq!(one_flip.error, forward.error);
        assert_eq!(two_flips, forward);
    }

    #[test]
    fn test_zero_width_axis() {
        let result = integrate_nd(
            |_: &[f64]| panic!("must not be evaluated"),
            [0.0, 1.0],
            [1.0, 1.0],
            1e-5,
            1e-10,
        )
        .unwrap();
        assert_eq!(result, QuadResult::default());
    }

    #[test]
    fn test_one_dimension_uses_gauss_kronrod() {
        let result = integrate_nd(|x: &[f64]| x[0].powi(4), [0.0], [1.0], 1e-5, 1e-10).unwrap();
        assert_abs_diff_eq!(result.value, 0.2, epsilon = 1e-15);
        assert_eq!(result.neval, 15);

        let reversed = integrate_nd(|x: &[f64]| x[0].powi(4), [1.0], [0.0], 1e-5, 1e-10).unwrap();
        assert_eq!(reversed.value, -result.value);
    }

    #[test]
    fn test_invalid_domains() {
        let f = FnIntegrand::new(2, |x: &[f64]| x[0] + x[1]);
        let cubature = Cubature::new();
        for (a, b) in [
            (vec![0.0], vec![1.0]),
            (vec![0.0, 0.0], vec![1.0, 1.0, 1.0]),
            (vec![0.0, f64::NAN], vec![1.0, 1.0]),
            (vec![0.0, 0.0], vec![1.0, f64::INFINITY]),
        ] {
            assert!(matches!(
                cubature.integrate(&f, &a, &b),
                Err(QuadError::InvalidInput { .. })
            ));
        }

        let wide = FnIntegrand::new(MAX_DIM + 1, |_: &[f64]| 1.0);
        let (a, b) = (vec![0.0; MAX_DIM + 1], vec![1.0; MAX_DIM + 1]);
        assert!(matches!(
            cubature.integrate(&wide, &a, &b),
            Err(QuadError::InvalidInput { .. })
        ));

        let empty = FnIntegrand::new(0, |_: &[f64]| 1.0);
        assert!(matches!(
            cubature.integrate(&empty, &[], &[]),
            Err(QuadError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_non_finite_integrand() {
        let f = |x: &[f64]| 1.0 / (x[0] + x[1]);
        match integrate_nd(f, [-1.0, -1.0], [1.0, 1.0], 1e-5, 1e-10) {
            Err(QuadError::InvalidIntegrand { point, .. }) => {
                assert_eq!(point.len(), 2);
                assert_eq!(point[0] + point[1], 0.0);
            }
            other => panic!("expected an invalid integrand, got {:?}", other),
        }
    }

    #[test]
    fn test_budget_of_one() {
        let cubature = Cubature::with_config(
            QuadConfig::multi_dim()
                .with_epsrel(1e-12)
                .with_epsabs(0.0)
                .with_max_subdivisions(1),
        );
        let f = FnIntegrand::new(2, |x: &[f64]| (x[0] * x[1]).sqrt());
        let err = cubature.integrate(&f, &[0.0, 0.0], &[1.0, 1.0]).unwrap_err();
        let partial = err.partial().unwrap();
        assert_eq!(partial.neval, n_points(2));
        assert!(partial.value.is_finite() && partial.error.is_finite());
        assert_abs_diff_eq!(partial.value, 4.0 / 9.0, epsilon = 5e-2);
    }

    #[test]
    fn test_degenerate_regions_stop_refinement() {
        // Each axis can be halved once before falling below the floor.
        let cubature = Cubature::with_config(
            QuadConfig::multi_dim()
                .with_epsrel(0.0)
                .with_epsabs(1e-6)
                .with_min_width(0.3),
        );
        let f = FnIntegrand::new(2, |x: &[f64]| if x[0] < 1.0 / 3.0 { 0.0 } else { 1.0 });
        let err = cubature.integrate(&f, &[0.0, 0.0], &[1.0, 1.0]).unwrap_err();
        let partial = err.partial().unwrap();
        // Root, both halves in x, and the smooth half split once in y.
        assert_eq!(partial.neval, 5 * n_points(2));
        assert_abs_diff_eq!(partial.value, 2.0 / 3.0, epsilon = 5e-2);
        match err {
            QuadError::NonConvergence { cells, limit, .. } => {
                assert_eq!(cells, 3);
                assert_eq!(limit, DEFAULT_MAX_REGIONS);
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_finite_bounds() {
        let result = integrate_nd(
            |x: &[f64]| 1.0 / x[0],
            [1e308, 0.0],
            [1.7e308, 1.0],
            1e-10,
            0.0,
        )
        .unwrap();
        assert_relative_eq!(result.value, 1.7f64.ln(), max_relative = 1e-9);
        assert!(result.neval > n_points(2));
    }
}
