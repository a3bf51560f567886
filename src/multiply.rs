//! # Local multiply engine
//!
//! Row-parallel SpGEMM with a dense per-row accumulator. Each row of the
//! result is computed independently: a dense value array of length
//! `b.n_cols` accumulates partial products, an `occupied` flag array marks
//! which columns have been touched, and a discovered-column list records the
//! order of first touch. That discovery order becomes the row's output
//! column order, so the sequential and parallel variants produce identical
//! structure and the distributed runner can be compared positionally against
//! a single-process recomputation.
//!
//! The scratch buffers are reused across rows: resetting walks only the
//! discovered-column list instead of zeroing the full arrays, so the cost of
//! a reset is proportional to the row's output size. Allocating fresh
//! buffers per row would put `O(n_rows × n_cols)` pressure on the allocator
//! for wide matrices.

use rayon::prelude::*;

use num_traits::Num;
use std::ops::AddAssign;

use crate::error::{Error, Result};
use crate::matrix::SparseMatrixCSR;

/// Reusable scratch state for accumulating one output row at a time
///
/// One accumulator serves many rows; `drain_row` hands back the finished row
/// and clears exactly the slots that row touched.
pub struct RowAccumulator<T> {
    /// Dense accumulation array, one slot per output column
    values: Vec<T>,

    /// Marks the columns touched by the current row
    occupied: Vec<bool>,

    /// Columns of the current row in the order they were first touched
    cols: Vec<usize>,
}

impl<T> RowAccumulator<T>
where
    T: Copy + Num + AddAssign,
{
    /// Creates an accumulator for output rows of width `n_cols`
    pub fn new(n_cols: usize) -> Self {
        Self {
            values: vec![T::zero(); n_cols],
            occupied: vec![false; n_cols],
            cols: Vec::new(),
        }
    }

    /// Accumulates `val` into column `col`
    ///
    /// The first touch of a column defines its position in the row's output
    /// order; later touches only add into the dense slot.
    fn accumulate(&mut self, col: usize, val: T) {
        if !self.occupied[col] {
            self.occupied[col] = true;
            self.cols.push(col);
            self.values[col] = val;
        } else {
            self.values[col] += val;
        }
    }

    /// Extracts the finished row as `(col_idx, values)` in discovery order
    /// and resets the touched slots for the next row
    ///
    /// Stale values are left in untouched slots; the first touch of a column
    /// assigns rather than adds, so they can never leak into a later row.
    fn drain_row(&mut self) -> (Vec<usize>, Vec<T>) {
        let vals: Vec<T> = self.cols.iter().map(|&col| self.values[col]).collect();
        let cols = std::mem::take(&mut self.cols);

        for &col in &cols {
            self.occupied[col] = false;
        }

        (cols, vals)
    }
}

fn check_dimensions<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> Result<()> {
    if a.n_cols != b.n_rows {
        return Err(Error::DimensionMismatch {
            left_rows: a.n_rows,
            left_cols: a.n_cols,
            right_rows: b.n_rows,
            right_cols: b.n_cols,
        });
    }
    Ok(())
}

/// Computes row `i` of `a * b` into the accumulator and drains it
fn multiply_row<T>(
    acc: &mut RowAccumulator<T>,
    i: usize,
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
) -> (Vec<usize>, Vec<T>)
where
    T: Copy + Num + AddAssign,
{
    for (k, &a_val) in a.row_iter(i) {
        let b_start = b.row_ptr[k];
        let b_end = b.row_ptr[k + 1];

        for b_idx in b_start..b_end {
            acc.accumulate(b.col_idx[b_idx], a_val * b.values[b_idx]);
        }
    }

    acc.drain_row()
}

/// Assembles per-row `(col_idx, values)` fragments into one CSR matrix
///
/// Strictly sequential: rows are appended in row order and `row_ptr` is the
/// running prefix sum of per-row entry counts.
fn compact_rows<T>(
    n_rows: usize,
    n_cols: usize,
    row_results: Vec<(Vec<usize>, Vec<T>)>,
) -> SparseMatrixCSR<T>
where
    T: Copy + Num,
{
    let mut row_ptr = Vec::with_capacity(n_rows + 1);
    row_ptr.push(0);

    let mut running_nnz = 0;
    for (cols, _) in &row_results {
        running_nnz += cols.len();
        row_ptr.push(running_nnz);
    }

    let mut col_idx = Vec::with_capacity(running_nnz);
    let mut values = Vec::with_capacity(running_nnz);

    for (cols, vals) in row_results {
        col_idx.extend(cols);
        values.extend(vals);
    }

    SparseMatrixCSR::new(n_rows, n_cols, row_ptr, col_idx, values)
}

/// Multiplies two CSR matrices sequentially: `C = A × B`
///
/// Fails with [`Error::DimensionMismatch`] if `a.n_cols != b.n_rows`, before
/// any row is processed. The result stores every entry the accumulation
/// produced; a value that cancels to exactly zero is kept as an explicit
/// stored zero, not filtered.
pub fn spgemm<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> Result<SparseMatrixCSR<T>>
where
    T: Copy + Num + AddAssign,
{
    check_dimensions(a, b)?;

    let mut acc = RowAccumulator::new(b.n_cols);
    let row_results: Vec<(Vec<usize>, Vec<T>)> = (0..a.n_rows)
        .map(|i| multiply_row(&mut acc, i, a, b))
        .collect();

    Ok(compact_rows(a.n_rows, b.n_cols, row_results))
}

/// Multiplies two CSR matrices with row-parallel processing: `C = A × B`
///
/// Rows are farmed out to Rayon's pool with dynamic scheduling, since the
/// cost of a row varies with its nonzero count and the density of the
/// matching rows of `b`. Each pool thread keeps one [`RowAccumulator`] and
/// reuses it for every row it processes. The final compaction runs after all
/// rows complete and is sequential.
///
/// Produces exactly the same matrix as [`spgemm`], including per-row column
/// order: discovery order depends only on a row's own inputs, never on which
/// thread computed it.
pub fn spgemm_parallel<T>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
) -> Result<SparseMatrixCSR<T>>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    check_dimensions(a, b)?;

    let row_results: Vec<(Vec<usize>, Vec<T>)> = (0..a.n_rows)
        .into_par_iter()
        .map_init(|| RowAccumulator::new(b.n_cols), |acc, i| multiply_row(acc, i, a, b))
        .collect();

    Ok(compact_rows(a.n_rows, b.n_cols, row_results))
}
