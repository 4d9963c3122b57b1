//! Standard test integrands for adaptive integration, over the unit cube.
//!
//! The Genz families (A. Genz, "Testing multidimensional integration
//! routines", 1984) with closed-form results, plus a product of inverse square
//! roots that is singular at the origin.
use crate::integrand::{Integrand, SimdIntegrand};
use wide::f64x4;

use libm::erf;
use std::f64::consts::PI;

/// Returns the parameters for the Genz test functions.
fn genz_params(dim: usize) -> (Vec<f64>, Vec<f64>) {
    let mut c = Vec::with_capacity(dim);
    let mut w = Vec::with_capacity(dim);
    for i in 1..=dim {
        c.push(1. + 4. * ((i as f64).sqrt() * 12345.).fract());
        w.push(((i as f64).sqrt() * 54321.).fract());
    }
    (c, w)
}

fn splat_all(values: &[f64]) -> Vec<f64x4> {
    values.iter().map(|&val| f64x4::splat(val)).collect()
}

// Genz Oscillatory: cos(sum_i c_i (x_i - w_i))
#[derive(Clone)]
pub struct GenzOscillatory {
    dim: usize,
    c: Vec<f64>,
    w: Vec<f64>,
    c_simd: Vec<f64x4>,
    w_simd: Vec<f64x4>,
}

impl GenzOscillatory {
    pub fn new(dim: usize) -> Self {
        let (c, w) = genz_params(dim);
        Self {
            dim,
            c_simd: splat_all(&c),
            w_simd: splat_all(&w),
            c,
            w,
        }
    }

    /// The real part of `prod_i ∫_0^1 exp(i c_i (x - w_i)) dx`.
    pub fn analytical_result(&self) -> f64 {
        let (mut re, mut im) = (1.0, 0.0);
        for (&c, &w) in self.c.iter().zip(&self.w) {
            let (upper, lower) = (c * (1. - w), c * w);
            let factor_re = (upper.sin() + lower.sin()) / c;
            let factor_im = (lower.cos() - upper.cos()) / c;
            (re, im) = (re * factor_re - im * factor_im, re * factor_im + im * factor_re);
        }
        re
    }
}

impl Integrand for GenzOscillatory {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut sum = 0.;
        for i in 0..self.dim {
            sum += self.c[i] * (x[i] - self.w[i]);
        }
        sum.cos()
    }
}

impl SimdIntegrand for GenzOscillatory {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let mut sum = f64x4::splat(0.);
        for i in 0..self.dim {
            sum += self.c_simd[i] * (x[i] - self.w_simd[i]);
        }
        sum.cos()
    }
}

// Genz Product Peak: prod_i 1 / (c_i^-2 + (x_i - w_i)^2)
#[derive(Clone)]
pub struct GenzProductPeak {
    dim: usize,
    c: Vec<f64>,
    w: Vec<f64>,
    c_simd: Vec<f64x4>,
    w_simd: Vec<f64x4>,
}

impl GenzProductPeak {
    pub fn new(dim: usize) -> Self {
        let (c, w) = genz_params(dim);
        Self {
            dim,
            c_simd: splat_all(&c),
            w_simd: splat_all(&w),
            c,
            w,
        }
    }

    pub fn analytical_result(&self) -> f64 {
        let mut result = 1.0;
        for (&c, &w) in self.c.iter().zip(&self.w) {
            result *= c * ((c * (1. - w)).atan() + (c * w).atan());
        }
        result
    }
}

impl Integrand for GenzProductPeak {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut result = 1.0;
        for i in 0..self.dim {
            result *= 1.0 / (self.c[i].powi(-2) + (x[i] - self.w[i]).powi(2));
        }
        result
    }
}

impl SimdIntegrand for GenzProductPeak {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let mut result = f64x4::splat(1.0);
        for i in 0..self.dim {
            let d = x[i] - self.w_simd[i];
            result = result / (f64x4::splat(1.0) / (self.c_simd[i] * self.c_simd[i]) + d * d);
        }
        result
    }
}

// Genz Gaussian: exp(-sum_i c_i^2 (x_i - w_i)^2)
#[derive(Clone)]
pub struct GenzGaussian {
    dim: usize,
    c: Vec<f64>,
    w: Vec<f64>,
    c_simd: Vec<f64x4>,
    w_simd: Vec<f64x4>,
}

impl GenzGaussian {
    pub fn new(dim: usize) -> Self {
        let (c, w) = genz_params(dim);
        Self {
            dim,
            c_simd: splat_all(&c),
            w_simd: splat_all(&w),
            c,
            w,
        }
    }

    pub fn analytical_result(&self) -> f64 {
        let mut result = 1.0;
        for (&c, &w) in self.c.iter().zip(&self.w) {
            result *= (PI.sqrt() / (2. * c)) * (erf(c * (1. - w)) + erf(c * w));
        }
        result
    }
}

impl Integrand for GenzGaussian {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.dim {
            sum += self.c[i].powi(2) * (x[i] - self.w[i]).powi(2);
        }
        (-sum).exp()
    }
}

impl SimdIntegrand for GenzGaussian {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let mut sum = f64x4::splat(0.0);
        for i in 0..self.dim {
            let d = x[i] - self.w_simd[i];
            sum += self.c_simd[i] * self.c_simd[i] * d * d;
        }
        (-sum).exp()
    }
}

// Endpoint Singularity: prod_i x_i^-1/2
#[derive(Clone)]
pub struct EndpointSingularity {
    dim: usize,
}

impl EndpointSingularity {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn analytical_result(&self) -> f64 {
        2.0f64.powi(self.dim as i32)
    }
}

impl Integrand for EndpointSingularity {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut result = 1.0;
        for &val in x {
            result = result / val.sqrt();
        }
        result
    }
}

impl SimdIntegrand for EndpointSingularity {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let mut result = f64x4::splat(1.0);
        for &val in x {
            result = result / val.sqrt();
        }
        result
    }
}
