//! Test integrands with known results, shared by the tests and benchmarks.

pub mod integrands;
