//! Reference SpGEMM used for correctness testing
//!
//! A simple row-by-row multiply with a hashmap accumulator. It is slow, it
//! sorts each output row, and it drops exact zeros, so it is only an oracle:
//! comparisons against it must treat absent entries as zero and ignore the
//! engine's discovery ordering.

use num_traits::Num;
use std::collections::HashMap;
use std::ops::AddAssign;

use crate::error::{Error, Result};
use crate::matrix::SparseMatrixCSR;

/// Multiplies two CSR matrices with a hashmap accumulator
///
/// Output rows are sorted by column and exact zeros are filtered, unlike the
/// production engine.
pub fn reference_spgemm<T>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
) -> Result<SparseMatrixCSR<T>>
where
    T: Copy + Num + AddAssign,
{
    if a.n_cols != b.n_rows {
        return Err(Error::DimensionMismatch {
            left_rows: a.n_rows,
            left_cols: a.n_cols,
            right_rows: b.n_rows,
            right_cols: b.n_cols,
        });
    }

    let mut row_ptr = Vec::with_capacity(a.n_rows + 1);
    let mut col_idx = Vec::new();
    let mut values = Vec::new();
    row_ptr.push(0);

    for i in 0..a.n_rows {
        let mut accum: HashMap<usize, T> = HashMap::new();

        for (k, &a_val) in a.row_iter(i) {
            for (j, &b_val) in b.row_iter(k) {
                *accum.entry(j).or_insert(T::zero()) += a_val * b_val;
            }
        }

        let mut row_entries: Vec<_> = accum.into_iter().collect();
        row_entries.sort_by_key(|&(col, _)| col);

        for (j, val) in row_entries {
            if !val.is_zero() {
                col_idx.push(j);
                values.push(val);
            }
        }

        row_ptr.push(col_idx.len());
    }

    Ok(SparseMatrixCSR::new(a.n_rows, b.n_cols, row_ptr, col_idx, values))
}
