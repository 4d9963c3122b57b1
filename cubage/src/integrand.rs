//! The `Integrand` traits, which define the function to be integrated.

use std::marker::PhantomData;

use wide::f64x4;

/// A trait representing a function to be integrated over an n-dimensional box.
///
/// Users of the library implement this trait for their function, or wrap a
/// closure with [`FnIntegrand`] or [`PerAxis`].
pub trait Integrand {
    /// Returns the number of dimensions of the integration space.
    fn dim(&self) -> usize;

    /// Evaluates the function at a given point `x`.
    ///
    /// # Arguments
    ///
    /// * `x`: A slice of `dim()` coordinates.
    ///
    /// # Returns
    ///
    /// The value of the function `f(x)`.
    fn eval(&self, x: &[f64]) -> f64;
}

/// A trait representing a function to be integrated using SIMD.
///
/// The integrators hand over four points at a time, one packet per coordinate:
/// `points[d]` holds the `d`-th coordinate of the four points.
pub trait SimdIntegrand {
    /// Returns the number of dimensions of the integration space.
    fn dim(&self) -> usize;

    /// Evaluates the function on a packet of 4 points.
    fn eval_simd(&self, points: &[f64x4]) -> f64x4;
}

impl<T: Integrand + ?Sized> Integrand for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn eval(&self, x: &[f64]) -> f64 {
        (**self).eval(x)
    }
}

impl<T: SimdIntegrand + ?Sized> SimdIntegrand for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn eval_simd(&self, points: &[f64x4]) -> f64x4 {
        (**self).eval_simd(points)
    }
}

/// A closure taking a coordinate slice, together with its dimension.
///
/// ```
/// use cubage::integrand::{FnIntegrand, Integrand};
///
/// let f = FnIntegrand::new(2, |x: &[f64]| x[0] * x[1]);
/// assert_eq!(f.dim(), 2);
/// assert_eq!(f.eval(&[2.0, 3.0]), 6.0);
/// ```
#[derive(Clone, Copy)]
pub struct FnIntegrand<F> {
    dim: usize,
    func: F,
}

impl<F: Fn(&[f64]) -> f64> FnIntegrand<F> {
    pub fn new(dim: usize, func: F) -> Self {
        FnIntegrand { dim, func }
    }
}

impl<F: Fn(&[f64]) -> f64> Integrand for FnIntegrand<F> {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        (self.func)(x)
    }
}

/// Functions of `N` separate real arguments, `f(x1, ..., xN)`.
///
/// Implemented for closures of one to six `f64` arguments.
pub trait AxisFn<const N: usize> {
    fn call_axes(&self, x: &[f64; N]) -> f64;
}

macro_rules! impl_axis_fn {
    (@f64 $i:literal) => { f64 };
    ($n:literal => $($i:literal),+) => {
        impl<F> AxisFn<$n> for F
        where
            F: Fn($(impl_axis_fn!(@f64 $i)),+) -> f64,
        {
            #[inline]
            fn call_axes(&self, x: &[f64; $n]) -> f64 {
                self($(x[$i]),+)
            }
        }
    };
}

impl_axis_fn!(1 => 0);
impl_axis_fn!(2 => 0, 1);
impl_axis_fn!(3 => 0, 1, 2);
impl_axis_fn!(4 => 0, 1, 2, 3);
impl_axis_fn!(5 => 0, 1, 2, 3, 4);
impl_axis_fn!(6 => 0, 1, 2, 3, 4, 5);

/// Adapts a closure of `N` separate arguments to the [`Integrand`] trait.
///
/// This is only a calling convention: the integrators sample the same points
/// as for the equivalent slice closure, so results are identical.
///
/// ```
/// use cubage::integrand::{Integrand, PerAxis};
///
/// let f = PerAxis::<_, 3>::new(|x: f64, y: f64, z: f64| x + 2.0 * y + 3.0 * z);
/// assert_eq!(f.dim(), 3);
/// assert_eq!(f.eval(&[1.0, 1.0, 1.0]), 6.0);
/// ```
pub struct PerAxis<F, const N: usize> {
    func: F,
    _axes: PhantomData<[f64; N]>,
}

impl<F: AxisFn<N>, const N: usize> PerAxis<F, N> {
    pub fn new(func: F) -> Self {
        PerAxis {
            func,
            _axes: PhantomData,
        }
    }
}

impl<F: AxisFn<N>, const N: usize> Integrand for PerAxis<F, N> {
    fn dim(&self) -> usize {
        N
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut axes = [0.0; N];
        axes.copy_from_slice(&x[..N]);
        self.func.call_axes(&axes)
    }
}

/// A scalar function of one variable seen as a 1-dimensional integrand.
pub(crate) struct Line<F>(pub(crate) F);

impl<F: Fn(f64) -> f64> Integrand for Line<F> {
    fn dim(&self) -> usize {
        1
    }

    fn eval(&self, x: &[f64]) -> f64 {
        (self.0)(x[0])
    }
}

/// Batch evaluation of points laid out contiguously, `dim` coordinates each.
///
/// The rules build their whole stencil first and hand it over in one call,
/// which lets the SIMD convention pack four points at a time while the scalar
/// convention walks them one by one. Either way the values come back in the
/// order the points were laid out.
pub(crate) trait Sampler {
    fn dim(&self) -> usize;

    fn sample(&self, points: &[f64], values: &mut [f64]);
}

/// Samples an [`Integrand`] one point at a time.
pub(crate) struct Scalar<'a, F: ?Sized>(pub(crate) &'a F);

impl<F: Integrand + ?Sized> Sampler for Scalar<'_, F> {
    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn sample(&self, points: &[f64], values: &mut [f64]) {
        let dim = self.0.dim();
        for (point, value) in points.chunks_exact(dim).zip(values.iter_mut()) {
            *value = self.0.eval(point);
        }
    }
}

/// Samples a [`SimdIntegrand`] in packets of four points.
///
/// A trailing partial packet is padded by repeating its last point; the
/// padded lanes are discarded.
pub(crate) struct Packed<'a, F: ?Sized>(pub(crate) &'a F);

impl<F: SimdIntegrand + ?Sized> Sampler for Packed<'_, F> {
    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn sample(&self, points: &[f64], values: &mut [f64]) {
        let dim = self.0.dim();
        let n_points = values.len();
        let mut packet = vec![f64x4::splat(0.0); dim];
        let mut lanes = [0.0; 4];

        for (p, chunk) in values.chunks_mut(4).enumerate() {
            let first = 4 * p;
            for (d, coordinate) in packet.iter_mut().enumerate() {
                for (lane, slot) in lanes.iter_mut().enumerate() {
                    let k = (first + lane).min(n_points - 1);
                    *slot = points[k * dim + d];
                }
                *coordinate = f64x4::from(lanes);
            }
            let result = self.0.eval_simd(&packet).to_array();
            chunk.copy_from_slice(&result[..chunk.len()]);
        }
    }
}
