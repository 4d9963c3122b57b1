//! Tolerances and engine settings shared by the 1-D and n-D integrators.

use crate::error::{QuadError, Result};

/// Default relative tolerance.
pub const DEFAULT_EPSREL: f64 = 1e-5;
/// Default absolute tolerance.
pub const DEFAULT_EPSABS: f64 = 1e-10;
/// Default number of subintervals the 1-D engine may hold.
pub const DEFAULT_MAX_INTERVALS: usize = 1000;
/// Default number of subregions the n-D engine may hold.
pub const DEFAULT_MAX_REGIONS: usize = 10_000;

/// The pair of accuracy targets of an integration call.
///
/// The engines stop as soon as *either* target is met, so a caller that needs
/// a strict absolute guarantee must set `epsrel` to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    /// Target error relative to the magnitude of the running estimate.
    pub epsrel: f64,
    /// Target absolute error.
    pub epsabs: f64,
}

impl Tolerance {
    pub fn new(epsrel: f64, epsabs: f64) -> Self {
        Tolerance { epsrel, epsabs }
    }

    /// Whether an accumulated `error` is acceptable for the estimate `value`.
    pub fn is_met(&self, value: f64, error: f64) -> bool {
        error <= self.epsabs || error <= self.epsrel * value.abs()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        // `!(x >= 0.0)` also rejects NaN.
        if !(self.epsrel >= 0.0) || !(self.epsabs >= 0.0) {
            return Err(QuadError::invalid_input(format!(
                "tolerances must be non-negative (epsrel = {}, epsabs = {})",
                self.epsrel, self.epsabs
            )));
        }
        Ok(())
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            epsrel: DEFAULT_EPSREL,
            epsabs: DEFAULT_EPSABS,
        }
    }
}

/// Settings of an adaptive integration engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadConfig {
    /// The accuracy targets.
    pub tolerance: Tolerance,
    /// The maximum number of cells (subintervals or subregions) the partition
    /// may hold. Reaching it without meeting the tolerance is reported as
    /// [`QuadError::NonConvergence`].
    pub max_subdivisions: usize,
    /// Cells narrower than this fraction of the original domain width (per
    /// axis) are no longer split.
    pub min_width: f64,
}

impl QuadConfig {
    /// Settings suited to the 1-D Gauss-Kronrod engine.
    pub fn one_dim() -> Self {
        QuadConfig {
            tolerance: Tolerance::default(),
            max_subdivisions: DEFAULT_MAX_INTERVALS,
            min_width: f64::EPSILON,
        }
    }

    /// Settings suited to the n-D Genz-Malik engine.
    pub fn multi_dim() -> Self {
        QuadConfig {
            max_subdivisions: DEFAULT_MAX_REGIONS,
            ..QuadConfig::one_dim()
        }
    }

    pub fn with_epsrel(mut self, epsrel: f64) -> Self {
        self.tolerance.epsrel = epsrel;
        self
    }

    pub fn with_epsabs(mut self, epsabs: f64) -> Self {
        self.tolerance.epsabs = epsabs;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_subdivisions(mut self, max_subdivisions: usize) -> Self {
        self.max_subdivisions = max_subdivisions;
        self
    }

    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = min_width;
        self
    }

    /// Checks the settings before any integrand evaluation.
    pub fn validate(&self) -> Result<()> {
        self.tolerance.validate()?;
        if self.max_subdivisions == 0 {
            return Err(QuadError::invalid_input(
                "max_subdivisions must be at least 1",
            ));
        }
        if !(self.min_width >= 0.0) || !self.min_width.is_finite() {
            return Err(QuadError::invalid_input(format!(
                "min_width must be finite and non-negative, got {}",
                self.min_width
            )));
        }
        Ok(())
    }
}

impl Default for QuadConfig {
    fn default() -> Self {
        QuadConfig::one_dim()
    }
}
