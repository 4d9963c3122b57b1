//! Adaptive integration interface.

use std::cell::RefCell;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyList;

use cubage::config::{
    DEFAULT_EPSABS, DEFAULT_EPSREL, DEFAULT_MAX_INTERVALS, DEFAULT_MAX_REGIONS,
};
use cubage::integrand::FnIntegrand;
use cubage::{Cubature, Quad, QuadConfig, QuadError, QuadResult, Sub};

#[pyclass(name = "QuadResult")]
#[derive(Debug, Clone, Copy)]
struct PyQuadResult {
    #[pyo3(get)]
    value: f64,
    #[pyo3(get)]
    error: f64,
    #[pyo3(get)]
    neval: usize,
    /// `False` when the subdivision budget ran out before the tolerance was
    /// met; `value` and `error` are then the best estimate available.
    #[pyo3(get)]
    converged: bool,
}

impl PyQuadResult {
    fn new(result: QuadResult, converged: bool) -> Self {
        PyQuadResult {
            value: result.value,
            error: result.error,
            neval: result.neval,
            converged,
        }
    }
}

#[pymethods]
impl PyQuadResult {
    fn __repr__(&self) -> String {
        format!(
            "QuadResult(value={:.12e}, error={:.6e}, neval={}, converged={})",
            self.value,
            self.error,
            self.neval,
            if self.converged { "True" } else { "False" }
        )
    }

    fn __str__(&self) -> String {
        format!(
            "Value: {:.12e} ± {:.6e} ({} evaluations)",
            self.value, self.error, self.neval
        )
    }
}

/// The first exception raised by a Python integrand during one call.
///
/// The integrators only see a NaN, which stops them at once; the exception
/// is re-raised afterwards.
#[derive(Default)]
struct Failure(RefCell<Option<PyErr>>);

impl Failure {
    fn guard(&self, call: impl FnOnce() -> PyResult<f64>) -> f64 {
        if self.0.borrow().is_some() {
            return f64::NAN;
        }
        call().unwrap_or_else(|err| {
            *self.0.borrow_mut() = Some(err);
            f64::NAN
        })
    }

    fn into_result(self, outcome: cubage::Result<QuadResult>) -> PyResult<PyQuadResult> {
        if let Some(err) = self.0.into_inner() {
            return Err(err);
        }
        match outcome {
            Ok(result) => Ok(PyQuadResult::new(result, true)),
            Err(QuadError::NonConvergence { result, .. }) => Ok(PyQuadResult::new(result, false)),
            Err(err) => Err(PyValueError::new_err(err.to_string())),
        }
    }
}

fn check_callable(py: Python<'_>, callable: &PyObject) -> PyResult<()> {
    if !callable.bind(py).is_callable() {
        return Err(PyValueError::new_err("integrand must be callable"));
    }
    Ok(())
}

fn config(base: QuadConfig, epsrel: f64, epsabs: f64, limit: usize) -> QuadConfig {
    base.with_epsrel(epsrel)
        .with_epsabs(epsabs)
        .with_max_subdivisions(limit)
}

/// Integrates `f(x)` over `[a, b]` with the adaptive 15-point Gauss-Kronrod
/// rule.
///
/// `substitution` is one of `"identity"`, `"exponential"` or `"reciprocal"`;
/// the latter allows an infinite bound, e.g. `b = math.inf` with `a > 0`.
#[pyfunction]
#[pyo3(signature = (f, a, b, epsrel=DEFAULT_EPSREL, epsabs=DEFAULT_EPSABS, limit=DEFAULT_MAX_INTERVALS, substitution=None))]
#[allow(clippy::too_many_arguments)]
fn integrate(
    py: Python<'_>,
    f: PyObject,
    a: f64,
    b: f64,
    epsrel: f64,
    epsabs: f64,
    limit: usize,
    substitution: Option<String>,
) -> PyResult<PyQuadResult> {
    check_callable(py, &f)?;
    let sub = substitution
        .as_deref()
        .map(str::parse::<Sub>)
        .transpose()
        .map_err(|err| PyValueError::new_err(err.to_string()))?;

    let quad = Quad::with_config(config(QuadConfig::one_dim(), epsrel, epsabs, limit));
    let failure = Failure::default();
    let line = |x: f64| failure.guard(|| f.call1(py, (x,))?.extract::<f64>(py));
    let outcome = match sub {
        None | Some(Sub::Identity) => quad.integrate(line, a, b),
        Some(sub) => quad.integrate_sub(line, a, b, &sub),
    };
    failure.into_result(outcome)
}

/// Integrates `f(x)` over the box with corners `a` and `b` with the adaptive
/// Genz-Malik rule. `f` receives the point as a list of floats.
#[pyfunction]
#[pyo3(signature = (f, a, b, epsrel=DEFAULT_EPSREL, epsabs=DEFAULT_EPSABS, limit=DEFAULT_MAX_REGIONS))]
fn integrate_nd(
    py: Python<'_>,
    f: PyObject,
    a: Vec<f64>,
    b: Vec<f64>,
    epsrel: f64,
    epsabs: f64,
    limit: usize,
) -> PyResult<PyQuadResult> {
    check_callable(py, &f)?;
    let cubature = Cubature::with_config(config(QuadConfig::multi_dim(), epsrel, epsabs, limit));
    let failure = Failure::default();
    let outcome = {
        let integrand = FnIntegrand::new(a.len(), |x: &[f64]| {
            failure.guard(|| f.call1(py, (PyList::new_bound(py, x),))?.extract::<f64>(py))
        });
        cubature.integrate(&integrand, &a, &b)
    };
    failure.into_result(outcome)
}

/// Integrates samples taken at uniform spacing `h` with Simpson's rule
/// (with an end correction for an even number of samples).
#[pyfunction]
#[pyo3(signature = (samples, h=1.0))]
fn discrete_integrate(samples: Vec<f64>, h: f64) -> PyResult<f64> {
    cubage::discrete_integrate(&samples, h).map_err(|err| PyValueError::new_err(err.to_string()))
}

/// Registers the `quad` submodule with the parent Python module.
///
/// Parameters
/// ----------
/// `parent_module` : pyo3.Bound[pyo3.types.PyModule]
///     The parent Python module to which the `quad` submodule will be added.
///
/// Returns
/// -------
/// pyo3.PyResult<()>
///     `Ok(())` if the registration is successful, or an error if the submodule
///     cannot be created or added.
///
/// # Errors
///
/// Raises an error if the (sub)module is not found or cannot be registered.
pub fn register(parent_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new_bound(parent_module.py(), "quad")?;
    m.setattr(
        pyo3::intern!(m.py(), "__doc__"),
        "Adaptive Gauss-Kronrod quadrature and Genz-Malik cubature",
    )?;
    pyo3::py_run!(
        parent_module.py(),
        m,
        "import sys; sys.modules['cubage.quad'] = m"
    );
    m.add_class::<PyQuadResult>()?;
    m.add_function(wrap_pyfunction!(integrate, &m)?)?;
    m.add_function(wrap_pyfunction!(integrate_nd, &m)?)?;
    m.add_function(wrap_pyfunction!(discrete_integrate, &m)?)?;
    parent_module.add_submodule(&m)
}
