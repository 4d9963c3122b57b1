//! The Genz-Malik degree-7 cubature rule with an embedded degree-5 rule.
//!
//! A. C. Genz and A. A. Malik, "An adaptive algorithm for numerical
//! integration over an n-dimensional rectangular region", J. Comput. Appl.
//! Math. 6 (1980) 295-302.
//!
//! For a region with center `c` and half-widths `h` the stencil is
//!
//! * the center,
//! * `c ± λ2 h_i e_i` and `c ± λ4 h_i e_i` along every axis,
//! * `c ± λ4 h_i e_i ± λ4 h_j e_j` for every pair of axes `i < j`,
//! * the `2^n` points `c ± λ5 h`,
//!
//! for a total of `1 + 4n + 2n(n-1) + 2^n` evaluations.

use crate::error::{QuadError, Result};
use crate::integrand::Sampler;
use crate::rules::{check_finite, RuleEstimate};

/// The largest dimension accepted; the stencil grows as `2^n`.
pub const MAX_DIM: usize = 16;

/// sqrt(9/70)
const LAMBDA2: f64 = 0.358_568_582_800_318_09;
/// sqrt(9/10)
const LAMBDA4: f64 = 0.948_683_298_050_513_8;
/// sqrt(9/19)
const LAMBDA5: f64 = 0.688_247_201_611_685_3;

const WEIGHT2: f64 = 980.0 / 6561.0;
const WEIGHT4: f64 = 200.0 / 19683.0;
const WEIGHT_E2: f64 = 245.0 / 486.0;
const WEIGHT_E4: f64 = 25.0 / 729.0;

/// λ2² / λ4², used to cancel the quadratic term of the fourth difference.
const RATIO: f64 = (LAMBDA2 * LAMBDA2) / (LAMBDA4 * LAMBDA4);

/// Number of stencil points in dimension `dim` (at most [`MAX_DIM`]).
pub fn n_points(dim: usize) -> usize {
    1 + 4 * dim + 2 * dim * dim.saturating_sub(1) + (1 << dim)
}

/// One application of the rule: the estimate and the axis to split next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Application {
    pub(crate) estimate: RuleEstimate,
    pub(crate) split_axis: usize,
}

/// The rule for a fixed dimension, with scratch space for its stencil.
pub(crate) struct GenzMalik {
    dim: usize,
    weight1: f64,
    weight3: f64,
    weight5: f64,
    weight_e1: f64,
    weight_e3: f64,
    points: Vec<f64>,
    values: Vec<f64>,
    diff: Vec<f64>,
}

impl GenzMalik {
    pub(crate) fn new(dim: usize) -> Result<Self> {
        if !(2..=MAX_DIM).contains(&dim) {
            return Err(QuadError::invalid_input(format!(
                "the Genz-Malik rule needs 2 to {} dimensions, got {}",
                MAX_DIM, dim
            )));
        }
        let n = dim as f64;
        let n_points = n_points(dim);
        Ok(GenzMalik {
            dim,
            weight1: (12824.0 - 9120.0 * n + 400.0 * n * n) / 19683.0,
            weight3: (1820.0 - 400.0 * n) / 19683.0,
            weight5: 6859.0 / 19683.0 / (1u64 << dim) as f64,
            weight_e1: (729.0 - 950.0 * n + 50.0 * n * n) / 729.0,
            weight_e3: (265.0 - 100.0 * n) / 1458.0,
            points: vec![0.0; n_points * dim],
            values: vec![0.0; n_points],
            diff: vec![0.0; dim],
        })
    }

    /// Evaluations per application.
    pub(crate) fn n_points(&self) -> usize {
        self.values.len()
    }

    /// Applies the rule to the region with the given center and (positive)
    /// half-widths.
    pub(crate) fn apply<S: Sampler + ?Sized>(
        &mut self,
        sampler: &S,
        center: &[f64],
        half_width: &[f64],
    ) -> Result<Application> {
        self.fill_stencil(center, half_width);
        sampler.sample(&self.points, &mut self.values);
        check_finite(&self.points, &self.values, self.dim)?;
        Ok(self.combine(half_width))
    }

    fn fill_stencil(&mut self, center: &[f64], half_width: &[f64]) {
        let dim = self.dim;
        for point in self.points.chunks_exact_mut(dim) {
            point.copy_from_slice(center);
        }
        let mut k = 1;

        for i in 0..dim {
            for offset in [LAMBDA2, -LAMBDA2, LAMBDA4, -LAMBDA4] {
                self.points[k * dim + i] += offset * half_width[i];
                k += 1;
            }
        }

        for i in 0..dim {
            for j in i + 1..dim {
                for (si, sj) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
                    self.points[k * dim + i] += si * LAMBDA4 * half_width[i];
                    self.points[k * dim + j] += sj * LAMBDA4 * half_width[j];
                    k += 1;
                }
            }
        }

        for corner in 0..1usize << dim {
            for (d, h) in half_width.iter().enumerate() {
                let sign = if corner & (1 << d) == 0 { 1.0 } else { -1.0 };
                self.points[k * dim + d] += sign * LAMBDA5 * h;
            }
            k += 1;
        }

        debug_assert_eq!(k, self.n_points());
    }

    fn combine(&mut self, half_width: &[f64]) -> Application {
        let dim = self.dim;
        let values = &self.values;
        let f1 = values[0];
        let two_f1 = 2.0 * f1;

        let mut sum2 = 0.0;
        let mut sum3 = 0.0;
        for i in 0..dim {
            let base = 1 + 4 * i;
            let lambda2_pair = values[base] + values[base + 1];
            let lambda4_pair = values[base + 2] + values[base + 3];
            sum2 += lambda2_pair;
            sum3 += lambda4_pair;
            self.diff[i] = (lambda2_pair - two_f1 - RATIO * (lambda4_pair - two_f1)).abs();
        }

        let pairs_start = 1 + 4 * dim;
        let corners_start = pairs_start + 2 * dim * (dim - 1);
        let sum4: f64 = values[pairs_start..corners_start].iter().sum();
        let sum5: f64 = values[corners_start..].iter().sum();

        let volume: f64 = half_width.iter().map(|h| 2.0 * h).product();
        let degree7 = volume
            * (self.weight1 * f1
                + WEIGHT2 * sum2
                + self.weight3 * sum3
                + WEIGHT4 * sum4
                + self.weight5 * sum5);
        let degree5 =
            volume * (self.weight_e1 * f1 + WEIGHT_E2 * sum2 + self.weight_e3 * sum3 + WEIGHT_E4 * sum4);

        Application {
            estimate: RuleEstimate {
                value: degree7,
                error: (degree7 - degree5).abs(),
            },
            split_axis: self.split_axis(half_width),
        }
    }

    /// The axis with the largest fourth difference. Differences equal to
    /// within rounding go to the wider axis, then to the lower index.
    fn split_axis(&self, half_width: &[f64]) -> usize {
        let mut best = 0;
        for i in 1..self.dim {
            let (d, d_best) = (self.diff[i], self.diff[best]);
            if (d - d_best).abs() <= 1e-14 * d_best.abs() {
                if half_width[i] > half_width[best] {
                    best = i;
                }
            } else if d > d_best {
                best = i;
            }
        }
        best
    }
}
