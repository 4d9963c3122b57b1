//! Changes of variable for the 1-D integrator.
//!
//! A substitution rewrites `∫_a^b f(x) dx` as
//! `∫_{u(a)}^{u(b)} f(x(u)) x'(u) du`, which the integrator then handles like
//! any other integral. Substitutions carry no state.

use std::str::FromStr;

use crate::error::QuadError;
use crate::integrand::Integrand;

/// A change of variable `x = x(u)`.
///
/// `dxdu` must be the derivative of `x`, and `u` its inverse. Neither is
/// checked; an inconsistent substitution silently gives wrong results.
pub trait Substitution {
    /// The original variable as a function of the new one.
    fn x(&self, u: f64) -> f64;
    /// The new variable as a function of the original one.
    fn u(&self, x: f64) -> f64;
    /// The Jacobian `dx/du`.
    fn dxdu(&self, u: f64) -> f64;
}

impl<T: Substitution + ?Sized> Substitution for &T {
    fn x(&self, u: f64) -> f64 {
        (**self).x(u)
    }

    fn u(&self, x: f64) -> f64 {
        (**self).u(x)
    }

    fn dxdu(&self, u: f64) -> f64 {
        (**self).dxdu(u)
    }
}

/// The predefined substitutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sub {
    /// `x = u`.
    #[default]
    Identity,
    /// `x = exp(u)`, for integrands spread over many orders of magnitude.
    Exponential,
    /// `x = 1/u`, for tails decaying at least like `1/x²`. Maps an infinite
    /// bound to zero.
    Reciprocal,
}

impl Substitution for Sub {
    fn x(&self, u: f64) -> f64 {
        match self {
            Sub::Identity => u,
            Sub::Exponential => u.exp(),
            Sub::Reciprocal => 1.0 / u,
        }
    }

    fn u(&self, x: f64) -> f64 {
        match self {
            Sub::Identity => x,
            Sub::Exponential => x.ln(),
            Sub::Reciprocal => 1.0 / x,
        }
    }

    fn dxdu(&self, u: f64) -> f64 {
        match self {
            Sub::Identity => 1.0,
            Sub::Exponential => u.exp(),
            Sub::Reciprocal => -1.0 / (u * u),
        }
    }
}

impl FromStr for Sub {
    type Err = QuadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(Sub::Identity),
            "exponential" | "exp" => Ok(Sub::Exponential),
            "reciprocal" | "inverse" => Ok(Sub::Reciprocal),
            other => Err(QuadError::invalid_input(format!(
                "unknown substitution '{}'",
                other
            ))),
        }
    }
}

/// A user substitution built from three closures.
///
/// ```
/// use cubage::{integrate_sub, FnSubstitution};
///
/// // x = u² removes the 1/√x singularity at the origin.
/// let square = FnSubstitution::new(|u: f64| u * u, f64::sqrt, |u: f64| 2.0 * u);
/// let result = integrate_sub(|x: f64| 1.0 / x.sqrt(), 0.0, 1.0, 1e-10, 0.0, &square).unwrap();
/// assert!((result.value - 2.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy)]
pub struct FnSubstitution<X, U, D> {
    x: X,
    u: U,
    dxdu: D,
}

impl<X, U, D> FnSubstitution<X, U, D>
where
    X: Fn(f64) -> f64,
    U: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    pub fn new(x: X, u: U, dxdu: D) -> Self {
        FnSubstitution { x, u, dxdu }
    }
}

impl<X, U, D> Substitution for FnSubstitution<X, U, D>
where
    X: Fn(f64) -> f64,
    U: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    fn x(&self, u: f64) -> f64 {
        (self.x)(u)
    }

    fn u(&self, x: f64) -> f64 {
        (self.u)(x)
    }

    fn dxdu(&self, u: f64) -> f64 {
        (self.dxdu)(u)
    }
}

/// `f(x(u)) x'(u)` as a 1-dimensional integrand in `u`.
pub(crate) struct Substituted<'a, F, S: ?Sized> {
    pub(crate) func: F,
    pub(crate) sub: &'a S,
}

impl<F, S> Integrand for Substituted<'_, F, S>
where
    F: Fn(f64) -> f64,
    S: Substitution + ?Sized,
{
    fn dim(&self) -> usize {
        1
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let u = x[0];
        (self.func)(self.sub.x(u)) * self.sub.dxdu(u)
    }
}
