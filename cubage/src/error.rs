//! Errors reported by the integration routines.

use thiserror::Error;

use crate::quad::QuadResult;

/// Result type used throughout `cubage`.
pub type Result<T> = std::result::Result<T, QuadError>;

/// Everything that can go wrong during an integration call.
///
/// Callers that can live with a degraded answer may recover the best estimate
/// of a [`QuadError::NonConvergence`] through [`QuadError::partial`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadError {
    /// The subdivision budget ran out, or every cell became too narrow to
    /// split, before the requested tolerance was met.
    ///
    /// `cells < limit` tells the second cause from the first.
    #[error("no convergence with {cells} cells (budget {limit}): {result}")]
    NonConvergence {
        /// The best estimate available when the engine stopped.
        result: QuadResult,
        /// The number of cells in the final partition.
        cells: usize,
        /// The subdivision budget in effect.
        limit: usize,
    },

    /// The integrand returned NaN or an infinity.
    #[error("integrand is not finite at {point:?} (value {value})")]
    InvalidIntegrand {
        /// The sampled point, in the integration variable.
        point: Vec<f64>,
        /// The offending value.
        value: f64,
    },

    /// The domain, the tolerances or the sample set are unusable.
    #[error("invalid input: {context}")]
    InvalidInput { context: String },
}

impl QuadError {
    pub(crate) fn invalid_input(context: impl Into<String>) -> Self {
        QuadError::InvalidInput {
            context: context.into(),
        }
    }

    /// Returns the estimate carried by a non-converged call, if any.
    pub fn partial(&self) -> Option<&QuadResult> {
        match self {
            QuadError::NonConvergence { result, .. } => Some(result),
            _ => None,
        }
    }
}
