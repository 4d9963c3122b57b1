//! The subdivision driver shared by the 1-D and n-D engines.

use log::{trace, warn};

use crate::config::QuadConfig;
use crate::error::{QuadError, Result};
use crate::partition::{Cell, Partition};
use crate::quad::QuadResult;

/// The engine-specific half of the adaptive loop: how a cell is split and
/// how many integrand evaluations have been spent so far.
pub(crate) trait Refine {
    type Cell: Cell;

    /// Splits `cell` in two and applies the base rule to both halves.
    ///
    /// Returns `Ok(None)` when the cell is too narrow to be split; it then
    /// keeps contributing its current estimate and error.
    fn split(&mut self, cell: &Self::Cell) -> Result<Option<(Self::Cell, Self::Cell)>>;

    /// Integrand evaluations performed so far, including the root cell.
    fn neval(&self) -> usize;
}

/// Refines `root` until the tolerance of `config` is met.
///
/// The cell with the largest error is split first. The call fails with
/// [`QuadError::NonConvergence`] once the partition holds
/// `config.max_subdivisions` cells, or when every remaining cell is too narrow
/// to split, and the carried result is the best estimate at that point.
pub(crate) fn subdivide<R: Refine>(
    refiner: &mut R,
    root: R::Cell,
    config: &QuadConfig,
) -> Result<QuadResult> {
    let tolerance = config.tolerance;
    let mut value = root.value();
    let mut error = root.error();
    let mut partition = Partition::new();
    let mut retired = Vec::new();
    partition.push(root);
    let mut n_cells = 1;

    loop {
        if tolerance.is_met(value, error) {
            return Ok(accumulate(partition, retired, refiner.neval()));
        }
        if n_cells >= config.max_subdivisions {
            break;
        }
        let Some(cell) = partition.pop() else {
            break;
        };

        match refiner.split(&cell)? {
            Some((left, right)) => {
                value += left.value() + right.value() - cell.value();
                error += left.error() + right.error() - cell.error();
                n_cells += 1;
                partition.push(left);
                partition.push(right);
                trace!(
                    "split cell with error {:.3e}, {} active: total {:.12e} +/- {:.3e}",
                    cell.error(),
                    partition.len(),
                    value,
                    error
                );
            }
            None => {
                trace!("cell too narrow to split, error {:.3e} is final", cell.error());
                retired.push(cell);
            }
        }
    }

    let result = accumulate(partition, retired, refiner.neval());
    let cause = if n_cells >= config.max_subdivisions {
        "budget exhausted"
    } else {
        "no cell left to split"
    };
    warn!(
        "tolerance (epsrel {:e}, epsabs {:e}) not met with {} cells, {}: {}",
        tolerance.epsrel, tolerance.epsabs, n_cells, cause, result
    );
    Err(QuadError::NonConvergence {
        result,
        cells: n_cells,
        limit: config.max_subdivisions,
    })
}

/// Sums the final partition afresh rather than trusting the running totals,
/// which accumulate rounding from every replacement.
fn accumulate<C: Cell>(partition: Partition<C>, retired: Vec<C>, neval: usize) -> QuadResult {
    let mut value = 0.0;
    let mut error = 0.0;
    for cell in partition.into_cells().chain(retired) {
        value += cell.value();
        error += cell.error();
    }
    QuadResult {
        value,
        error,
        neval,
    }
}
