//! The C-language interface for `cubage`

use std::ffi::c_void;
use std::os::raw::c_int;
use std::slice;

use cubage::integrand::Integrand;
use cubage::{Cubature, Quad, QuadConfig, QuadError, QuadResult, Sub};

/// Status codes returned by the integration functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CStatus {
    /// The tolerance was met.
    Ok = 0,
    /// The subdivision budget ran out; the result holds the best estimate.
    NonConvergence = 1,
    /// The integrand returned NaN or an infinity.
    InvalidIntegrand = 2,
    /// Invalid bounds, tolerances, sizes or null pointers.
    InvalidInput = 3,
}

/// Substitution codes accepted by `cubage_quad_integrate`.
pub const CUBAGE_SUB_IDENTITY: c_int = 0;
pub const CUBAGE_SUB_EXPONENTIAL: c_int = 1;
pub const CUBAGE_SUB_RECIPROCAL: c_int = 2;

/// The C-style 1-D integrand: the point and a user-provided `user_data`
/// pointer.
pub type CIntegrand1D = extern "C" fn(f64, *mut c_void) -> f64;

/// The C-style n-D integrand function pointer.
/// The first argument is the point `x` (an array of f64).
/// The second argument is the dimension.
/// The third is a user-provided `user_data` pointer.
pub type CIntegrand = extern "C" fn(*const f64, c_int, *mut c_void) -> f64;

/// A wrapper that implements the Rust `Integrand` trait.
struct CIntegrandWrapper {
    dim: usize,
    func: CIntegrand,
    user_data: *mut c_void,
}

impl Integrand for CIntegrandWrapper {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        (self.func)(x.as_ptr(), self.dim as c_int, self.user_data)
    }
}

/// The opaque pointer to the 1-D integrator.
pub type QuadC = c_void;

/// The opaque pointer to the n-D integrator.
pub type CubatureC = c_void;

fn config(epsrel: f64, epsabs: f64, max_subdivisions: usize, base: QuadConfig) -> Option<QuadConfig> {
    let config = base
        .with_epsrel(epsrel)
        .with_epsabs(epsabs)
        .with_max_subdivisions(max_subdivisions);
    config.validate().ok().map(|()| config)
}

/// Writes the outcome of a call to `result` and converts it to a status.
unsafe fn report(outcome: Result<QuadResult, QuadError>, result: *mut QuadResult) -> CStatus {
    let (value, status) = match outcome {
        Ok(value) => (value, CStatus::Ok),
        Err(QuadError::NonConvergence { result, .. }) => (result, CStatus::NonConvergence),
        Err(QuadError::InvalidIntegrand { .. }) => (QuadResult::default(), CStatus::InvalidIntegrand),
        Err(QuadError::InvalidInput { .. }) => (QuadResult::default(), CStatus::InvalidInput),
    };
    if !result.is_null() {
        *result = value;
    }
    status
}

/// Creates a new 1-D adaptive integrator.
///
/// Returns a null pointer if the tolerances are negative or NaN, or if
/// `max_intervals` is zero.
#[no_mangle]
pub extern "C" fn cubage_quad_new(epsrel: f64, epsabs: f64, max_intervals: usize) -> *mut QuadC {
    match config(epsrel, epsabs, max_intervals, QuadConfig::one_dim()) {
        Some(config) => Box::into_raw(Box::new(Quad::with_config(config))) as *mut QuadC,
        None => std::ptr::null_mut(),
    }
}

/// Integrates `func` over `[a, b]`, after the substitution with code
/// `substitution` (one of the `CUBAGE_SUB_*` constants).
///
/// # Safety
///
/// `quad_ptr` must be a valid pointer returned by `cubage_quad_new`, and
/// `result` must be null or point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn cubage_quad_integrate(
    quad_ptr: *const QuadC,
    func: Option<CIntegrand1D>,
    user_data: *mut c_void,
    a: f64,
    b: f64,
    substitution: c_int,
    result: *mut QuadResult,
) -> CStatus {
    let (Some(func), false) = (func, quad_ptr.is_null()) else {
        return report(Err(QuadError::InvalidInput { context: "null pointer".to_string() }), result);
    };
    let quad = &*(quad_ptr as *const Quad);
    let f = |x: f64| func(x, user_data);

    let outcome = match substitution {
        CUBAGE_SUB_IDENTITY => quad.integrate(f, a, b),
        CUBAGE_SUB_EXPONENTIAL => quad.integrate_sub(f, a, b, &Sub::Exponential),
        CUBAGE_SUB_RECIPROCAL => quad.integrate_sub(f, a, b, &Sub::Reciprocal),
        other => Err(QuadError::InvalidInput {
            context: format!("unknown substitution code {}", other),
        }),
    };
    report(outcome, result)
}

/// Frees the memory of the 1-D integrator.
///
/// # Safety
///
/// `quad_ptr` must be a valid pointer returned by `cubage_quad_new`
/// and must not be used afterward.
#[no_mangle]
pub unsafe extern "C" fn cubage_quad_free(quad_ptr: *mut QuadC) {
    if !quad_ptr.is_null() {
        drop(Box::from_raw(quad_ptr as *mut Quad));
    }
}

/// Creates a new n-D adaptive integrator.
///
/// Returns a null pointer if the tolerances are negative or NaN, or if
/// `max_regions` is zero.
#[no_mangle]
pub extern "C" fn cubage_cubature_new(epsrel: f64, epsabs: f64, max_regions: usize) -> *mut CubatureC {
    match config(epsrel, epsabs, max_regions, QuadConfig::multi_dim()) {
        Some(config) => Box::into_raw(Box::new(Cubature::with_config(config))) as *mut CubatureC,
        None => std::ptr::null_mut(),
    }
}

/// Integrates `func` over the box with corners `a` and `b`.
///
/// # Safety
///
/// `cubature_ptr` must be a valid pointer returned by `cubage_cubature_new`.
/// `a` and `b` must be valid pointers to arrays of `dim` doubles, and
/// `result` must be null or point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn cubage_cubature_integrate(
    cubature_ptr: *const CubatureC,
    func: Option<CIntegrand>,
    user_data: *mut c_void,
    dim: usize,
    a: *const f64,
    b: *const f64,
    result: *mut QuadResult,
) -> CStatus {
    let (Some(func), false) = (func, cubature_ptr.is_null() || a.is_null() || b.is_null()) else {
        return report(Err(QuadError::InvalidInput { context: "null pointer".to_string() }), result);
    };
    let cubature = &*(cubature_ptr as *const Cubature);
    let integrand = CIntegrandWrapper {
        dim,
        func,
        user_data,
    };
    let a = slice::from_raw_parts(a, dim);
    let b = slice::from_raw_parts(b, dim);
    report(cubature.integrate(&integrand, a, b), result)
}

/// Frees the memory of the n-D integrator.
///
/// # Safety
///
/// `cubature_ptr` must be a valid pointer returned by `cubage_cubature_new`
/// and must not be used afterward.
#[no_mangle]
pub unsafe extern "C" fn cubage_cubature_free(cubature_ptr: *mut CubatureC) {
    if !cubature_ptr.is_null() {
        drop(Box::from_raw(cubature_ptr as *mut Cubature));
    }
}

/// Integrates `n` samples spaced by `h` and writes the estimate to `result`.
///
/// # Safety
///
/// `samples` must be a valid pointer to an array of `n` doubles, and `result`
/// must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn cubage_discrete_integrate(
    samples: *const f64,
    n: usize,
    h: f64,
    result: *mut f64,
) -> CStatus {
    if samples.is_null() || result.is_null() {
        return CStatus::InvalidInput;
    }
    match cubage::discrete_integrate(slice::from_raw_parts(samples, n), h) {
        Ok(value) => {
            *result = value;
            CStatus::Ok
        }
        Err(QuadError::InvalidIntegrand { .. }) => CStatus::InvalidIntegrand,
        Err(_) => CStatus::InvalidInput,
    }
}
