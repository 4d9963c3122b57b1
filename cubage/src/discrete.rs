//! Integration of pre-sampled data on a uniform grid.

use crate::error::{QuadError, Result};

/// Integrates evenly spaced samples `f(x0), f(x0 + h), ...` over
/// `[x0, x0 + (n - 1) h]`.
///
/// An odd number of samples uses the composite Simpson rule. An even number
/// uses Simpson on all but the last interval, which is closed with the
/// Hollingsworth-Hunter four-point correction. Both are exact for cubics.
/// Two samples fall back to the trapezoid. No error estimate is available.
///
/// ```
/// use cubage::discrete_integrate;
///
/// let samples: Vec<f64> = (0..5).map(|i| (0.25 * i as f64).powi(3)).collect();
/// assert_eq!(discrete_integrate(&samples, 0.25).unwrap(), 0.25);
/// ```
///
/// # Errors
///
/// Fails with [`QuadError::InvalidInput`] for fewer than two samples or a
/// non-finite spacing, and with [`QuadError::InvalidIntegrand`] for a
/// non-finite sample.
pub fn discrete_integrate(samples: &[f64], h: f64) -> Result<f64> {
    let n = samples.len();
    if n < 2 {
        return Err(QuadError::invalid_input(format!(
            "need at least 2 samples, got {}",
            n
        )));
    }
    if !h.is_finite() {
        return Err(QuadError::invalid_input(format!(
            "the sample spacing must be finite, got {}",
            h
        )));
    }
    if let Some(k) = samples.iter().position(|f| !f.is_finite()) {
        return Err(QuadError::InvalidIntegrand {
            point: vec![k as f64 * h],
            value: samples[k],
        });
    }

    if n == 2 {
        return Ok(0.5 * h * (samples[0] + samples[1]));
    }
    if n % 2 == 1 {
        return Ok(simpson(samples, h));
    }

    let f = &samples[n - 4..];
    let last = h / 24.0 * (f[0] - 5.0 * f[1] + 19.0 * f[2] + 9.0 * f[3]);
    Ok(simpson(&samples[..n - 1], h) + last)
}

/// Composite Simpson rule over an odd number of samples.
fn simpson(samples: &[f64], h: f64) -> f64 {
    let n = samples.len();
    let interior: f64 = samples[1..n - 1]
        .iter()
        .enumerate()
        .map(|(i, f)| if i % 2 == 0 { 4.0 * f } else { 2.0 * f })
        .sum();
    h / 3.0 * (samples[0] + interior + samples[n - 1])
}
