//! Conversions between our CSR format and sprs
//!
//! Used for interop and for cross-checking the multiply engine against an
//! independent implementation in tests.

use num_traits::Num;
use sprs::CsMat;

use crate::matrix::SparseMatrixCSR;

/// Converts a CSR matrix to a sprs `CsMat`
///
/// sprs requires column indices sorted within each row, while our rows are
/// stored in discovery order, so each row is sorted on the way out. The
/// result is numerically identical but loses the discovery ordering.
pub fn to_sprs<T>(matrix: &SparseMatrixCSR<T>) -> CsMat<T>
where
    T: Copy + Num + Default,
{
    let mut col_idx = Vec::with_capacity(matrix.nnz());
    let mut values = Vec::with_capacity(matrix.nnz());

    for i in 0..matrix.n_rows {
        let mut row: Vec<(usize, T)> = matrix.row_iter(i).map(|(j, &v)| (j, v)).collect();
        row.sort_by_key(|&(j, _)| j);
        for (j, v) in row {
            col_idx.push(j);
            values.push(v);
        }
    }

    CsMat::new(
        (matrix.n_rows, matrix.n_cols),
        matrix.row_ptr.clone(),
        col_idx,
        values,
    )
}

/// Converts a sprs `CsMat` (any storage order) to our CSR format
pub fn from_sprs<T>(matrix: CsMat<T>) -> SparseMatrixCSR<T>
where
    T: Copy + Num + Default,
{
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let shape = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    SparseMatrixCSR::new(shape.0, shape.1, indptr, indices, data)
}
