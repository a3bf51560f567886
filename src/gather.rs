//! Reassembly of per-rank result fragments into one global CSR matrix
//!
//! Every rank's local result has a `row_ptr` starting at 0, so concatenating
//! raw arrays would corrupt the global structure. The offset bookkeeping is
//! isolated here: a [`GatherPlan`] is computed once from each rank's
//! reported sizes and then drives the layout of the concatenated arrays and
//! the additive correction of each rank's row-pointer tail.

use num_traits::Num;

use crate::error::{Error, Result};
use crate::matrix::SparseMatrixCSR;

/// Where one rank's fragment lands in the assembled global arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentLayout {
    /// Rows contributed by this rank
    pub row_count: usize,
    /// Stored entries contributed by this rank
    pub nnz_count: usize,
    /// Start of this rank's entries in the global `values`/`col_idx` arrays;
    /// also the additive offset for its row-pointer tail
    pub value_displacement: usize,
    /// Start of this rank's rows in the global matrix
    pub row_ptr_displacement: usize,
}

/// Displacement tables for gathering fragments in rank order
#[derive(Debug, Clone)]
pub struct GatherPlan {
    fragments: Vec<FragmentLayout>,
    total_rows: usize,
    total_nnz: usize,
}

impl GatherPlan {
    /// Computes the plan from each rank's reported `(row_count, nnz_count)`,
    /// in rank order
    ///
    /// Displacements are running sums over the lower ranks, so fragments lay
    /// out contiguously and without overlap.
    pub fn new(sizes: &[(usize, usize)]) -> Self {
        let mut fragments = Vec::with_capacity(sizes.len());
        let mut total_rows = 0;
        let mut total_nnz = 0;

        for &(row_count, nnz_count) in sizes {
            fragments.push(FragmentLayout {
                row_count,
                nnz_count,
                value_displacement: total_nnz,
                row_ptr_displacement: total_rows,
            });
            total_rows += row_count;
            total_nnz += nnz_count;
        }

        Self { fragments, total_rows, total_nnz }
    }

    /// Per-rank layout table
    pub fn fragments(&self) -> &[FragmentLayout] {
        &self.fragments
    }

    /// Total rows across all fragments
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Total stored entries across all fragments
    pub fn total_nnz(&self) -> usize {
        self.total_nnz
    }

    /// Assembles gathered fragments into the global CSR matrix
    ///
    /// Per rank, in rank order: `values` and `col_idx` fragments are
    /// concatenated (valid because ranks own contiguous, increasing row
    /// ranges); the `row_ptr` tail — the rank's local per-row cumulative
    /// counts, leading 0 excluded — is placed at the rank's row-pointer
    /// displacement with the rank's cumulative nnz offset added to every
    /// entry. `row_ptr[0]` is pinned to 0, giving one continuous, monotonic
    /// global row-pointer array.
    ///
    /// Fails with [`Error::Collective`] if any fragment's size disagrees
    /// with what its rank reported when the plan was computed.
    pub fn assemble<T>(
        &self,
        n_cols: usize,
        value_parts: Vec<Vec<T>>,
        col_parts: Vec<Vec<usize>>,
        tail_parts: Vec<Vec<usize>>,
    ) -> Result<SparseMatrixCSR<T>>
    where
        T: Copy + Num,
    {
        let n_ranks = self.fragments.len();
        if value_parts.len() != n_ranks || col_parts.len() != n_ranks || tail_parts.len() != n_ranks
        {
            return Err(Error::Collective { phase: "reassemble-offsets" });
        }

        let mut values = Vec::with_capacity(self.total_nnz);
        let mut col_idx = Vec::with_capacity(self.total_nnz);
        let mut row_ptr = vec![0; self.total_rows + 1];

        let parts = value_parts
            .into_iter()
            .zip(col_parts)
            .zip(tail_parts);

        for (fragment, ((vals, cols), tail)) in self.fragments.iter().zip(parts) {
            if vals.len() != fragment.nnz_count
                || cols.len() != fragment.nnz_count
                || tail.len() != fragment.row_count
            {
                return Err(Error::Collective { phase: "reassemble-offsets" });
            }

            values.extend(vals);
            col_idx.extend(cols);
            for (j, &count) in tail.iter().enumerate() {
                row_ptr[fragment.row_ptr_displacement + j + 1] = count + fragment.value_displacement;
            }
        }

        Ok(SparseMatrixCSR::new(self.total_rows, n_cols, row_ptr, col_idx, values))
    }
}
