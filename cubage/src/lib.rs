//! `cubage` is an adaptive, error-controlled integration library.
//!
//! It provides the 15-point Gauss-Kronrod rule with recursive interval
//! bisection for 1-D integrals, optionally after a change of variable, and the
//! Genz-Malik degree-7/5 cubature rule with recursive region halving for
//! integrals over n-dimensional boxes. A Simpson-type formula integrates data
//! already sampled on a uniform grid.
//!
//! ```
//! use cubage::{integrate, integrate_nd, discrete_integrate};
//!
//! let line = integrate(|x: f64| x.powi(4), 0.0, 1.0).unwrap();
//! assert!((line.value - 0.2).abs() < 1e-15);
//!
//! let square = integrate_nd(|x: &[f64]| x[0] * x[1], [0.0; 2], [1.0; 2], 1e-5, 1e-10).unwrap();
//! assert!((square.value - 0.25).abs() < 1e-15);
//!
//! let samples = [0.0, 1.0 / 64.0, 1.0 / 8.0, 27.0 / 64.0, 1.0];
//! assert_eq!(discrete_integrate(&samples, 0.25).unwrap(), 0.25);
//! ```
//!
//! All routines are synchronous and keep no state between calls. Progress is
//! reported through the `log` facade.

mod adaptive;
mod partition;

pub mod benchmark;
pub mod config;
pub mod cubature;
pub mod discrete;
pub mod error;
pub mod integrand;
pub mod quad;
pub mod rules;
pub mod substitution;

pub use config::{QuadConfig, Tolerance};
pub use cubature::{integrate_nd, Cubature};
pub use discrete::discrete_integrate;
pub use error::{QuadError, Result};
pub use quad::{integrate, integrate_sub, integrate_with, Quad, QuadResult};
pub use substitution::{FnSubstitution, Sub, Substitution};
