//! Fixed-order base rules: one pass over a stencil yields an estimate of the
//! integral and a second, lower-order estimate used to gauge its error.

pub mod gauss_kronrod;
pub mod genz_malik;

use crate::error::{QuadError, Result};

/// Output of one application of a base rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleEstimate {
    /// The higher-order estimate of the integral.
    pub value: f64,
    /// The local error estimate.
    pub error: f64,
}

/// Fails on the first non-finite sample, reporting where it occurred.
pub(crate) fn check_finite(points: &[f64], values: &[f64], dim: usize) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(k) => Err(QuadError::InvalidIntegrand {
            point: points[k * dim..(k + 1) * dim].to_vec(),
            value: values[k],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite_reports_point() {
        let points = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(check_finite(&points, &[1.0, 2.0, 3.0], 2).is_ok());
        match check_finite(&points, &[1.0, f64::INFINITY, f64::NAN], 2) {
            Err(QuadError::InvalidIntegrand { point, value }) => {
                assert_eq!(point, vec![2.0, 3.0]);
                assert_eq!(value, f64::INFINITY);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
