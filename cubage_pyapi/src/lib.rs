//! Generate `PyO3` interface for `cubage`

use pyo3::prelude::*;

/// Python bindings for the adaptive integrators.
pub mod quad;

/// `PyO3` Python module that contains all exposed classes from Rust.
#[pymodule]
#[pyo3(name = "cubage")]
fn cubage_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("version", env!("CARGO_PKG_VERSION"))?;
    quad::register(m)?;
    Ok(())
}
