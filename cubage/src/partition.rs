//! The priority-ordered work partition of the adaptive engines.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A cell of the adaptive partition (a subinterval or a subregion).
pub(crate) trait Cell {
    /// The rule's estimate of the integral over the cell.
    fn value(&self) -> f64;
    /// The rule's error estimate over the cell; the splitting priority.
    fn error(&self) -> f64;
}

struct Entry<C> {
    error: f64,
    seq: u64,
    cell: C,
}

impl<C> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C> Eq for Entry<C> {}

impl<C> PartialOrd for Entry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Entry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Largest error first; among equal errors the earliest insertion wins.
        self.error
            .total_cmp(&other.error)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A max-heap of cells keyed by local error contribution.
///
/// Ties are broken by insertion order, so the split sequence is a pure
/// function of the integrand and the domain.
pub(crate) struct Partition<C> {
    heap: BinaryHeap<Entry<C>>,
    next_seq: u64,
}

impl<C: Cell> Partition<C> {
    pub(crate) fn new() -> Self {
        Partition {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub(crate) fn push(&mut self, cell: C) {
        let entry = Entry {
            error: cell.error(),
            seq: self.next_seq,
            cell,
        };
        self.next_seq += 1;
        self.heap.push(entry);
    }

    /// Removes the cell with the largest error.
    pub(crate) fn pop(&mut self) -> Option<C> {
        self.heap.pop().map(|entry| entry.cell)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Iterates over the cells in insertion order.
    pub(crate) fn into_cells(self) -> impl Iterator<Item = C> {
        let mut entries = self.heap.into_vec();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.cell)
    }
}
