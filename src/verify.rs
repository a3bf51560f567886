//! Verification oracle for the distributed result
//!
//! The coordinator recomputes the product single-process and compares it
//! against the reassembled distributed result. Structure is compared
//! positionally: both computations run the identical per-row kernel, and a
//! row's column discovery order depends only on that row's inputs, so
//! `row_ptr` and `col_idx` must match exactly. Values are compared with an
//! absolute tolerance because the two runs may sum partial products in a
//! different order.

use std::fmt;

use crate::matrix::SparseMatrixCSR;

/// Default absolute tolerance for value comparison
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// The first point at which two results disagree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mismatch {
    /// The matrices have different dimensions
    Shape {
        /// Candidate dimensions (rows, cols)
        left: (usize, usize),
        /// Reference dimensions (rows, cols)
        right: (usize, usize),
    },
    /// The matrices store a different number of entries
    NnzCount {
        /// Candidate nnz
        left: usize,
        /// Reference nnz
        right: usize,
    },
    /// `row_ptr` differs at an index
    RowPtr {
        /// Index into `row_ptr`
        index: usize,
        /// Candidate entry
        left: usize,
        /// Reference entry
        right: usize,
    },
    /// `col_idx` differs at a position
    ColIndex {
        /// Position into `col_idx`
        index: usize,
        /// Candidate column
        left: usize,
        /// Reference column
        right: usize,
    },
    /// A value differs beyond the tolerance
    Value {
        /// Position into `values`
        index: usize,
        /// Candidate value
        left: f64,
        /// Reference value
        right: f64,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Mismatch::Shape { left, right } => write!(
                f,
                "shape mismatch: distributed {}x{}, sequential {}x{}",
                left.0, left.1, right.0, right.1
            ),
            Mismatch::NnzCount { left, right } => {
                write!(f, "nnz mismatch: distributed {}, sequential {}", left, right)
            }
            Mismatch::RowPtr { index, left, right } => write!(
                f,
                "row_ptr[{}] mismatch: distributed {}, sequential {}",
                index, left, right
            ),
            Mismatch::ColIndex { index, left, right } => write!(
                f,
                "col_idx[{}] mismatch: distributed {}, sequential {}",
                index, left, right
            ),
            Mismatch::Value { index, left, right } => write!(
                f,
                "value[{}] mismatch: distributed {}, sequential {}",
                index, left, right
            ),
        }
    }
}

/// Outcome of comparing the distributed result against the oracle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// The results agree
    Pass,
    /// The results disagree; carries the first mismatch found
    Fail(Mismatch),
}

impl Verdict {
    /// True if the comparison passed
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Compares a candidate result against the reference computation
///
/// `row_ptr` and `col_idx` must match exactly and positionally; `values`
/// must agree within `tolerance` in absolute difference. Returns the first
/// mismatch encountered, checking shape, then nnz, then `row_ptr`, then the
/// paired entry arrays.
pub fn verify(
    candidate: &SparseMatrixCSR<f64>,
    reference: &SparseMatrixCSR<f64>,
    tolerance: f64,
) -> Verdict {
    if candidate.n_rows != reference.n_rows || candidate.n_cols != reference.n_cols {
        return Verdict::Fail(Mismatch::Shape {
            left: (candidate.n_rows, candidate.n_cols),
            right: (reference.n_rows, reference.n_cols),
        });
    }

    if candidate.nnz() != reference.nnz() {
        return Verdict::Fail(Mismatch::NnzCount {
            left: candidate.nnz(),
            right: reference.nnz(),
        });
    }

    for (index, (&left, &right)) in candidate.row_ptr.iter().zip(&reference.row_ptr).enumerate() {
        if left != right {
            return Verdict::Fail(Mismatch::RowPtr { index, left, right });
        }
    }

    for (index, (&left, &right)) in candidate.col_idx.iter().zip(&reference.col_idx).enumerate() {
        if left != right {
            return Verdict::Fail(Mismatch::ColIndex { index, left, right });
        }
    }

    for (index, (&left, &right)) in candidate.values.iter().zip(&reference.values).enumerate() {
        if (left - right).abs() >= tolerance {
            return Verdict::Fail(Mismatch::Value { index, left, right });
        }
    }

    Verdict::Pass
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseMatrixCSR<f64> {
        SparseMatrixCSR::new(
            2,
            3,
            vec![0, 2, 3],
            vec![2, 0, 1],
            vec![1.0, 2.0, 3.0],
        )
    }

    #[test]
    fn test_identical_matrices_pass() {
        let m = sample();
        assert!(verify(&m, &m.clone(), DEFAULT_TOLERANCE).is_pass());
    }

    #[test]
    fn test_value_within_tolerance_passes() {
        let reference = sample();
        let mut candidate = sample();
        candidate.values[1] += 1e-9;

        assert!(verify(&candidate, &reference, DEFAULT_TOLERANCE).is_pass());
    }

    #[test]
    fn test_value_beyond_tolerance_fails() {
        let reference = sample();
        let mut candidate = sample();
        candidate.values[2] += 0.5;

        let verdict = verify(&candidate, &reference, DEFAULT_TOLERANCE);
        assert_eq!(
            verdict,
            Verdict::Fail(Mismatch::Value { index: 2, left: 3.5, right: 3.0 })
        );
    }

    #[test]
    fn test_column_order_is_positional() {
        let reference = sample();
        let mut candidate = sample();
        // Same entry set, different stored order within row 0
        candidate.col_idx.swap(0, 1);
        candidate.values.swap(0, 1);

        let verdict = verify(&candidate, &reference, DEFAULT_TOLERANCE);
        assert_eq!(
            verdict,
            Verdict::Fail(Mismatch::ColIndex { index: 0, left: 0, right: 2 })
        );
    }

    #[test]
    fn test_row_ptr_mismatch_reported_first() {
        let reference = sample();
        let candidate = SparseMatrixCSR::new(
            2,
            3,
            vec![0, 1, 3],
            vec![2, 0, 1],
            vec![1.0, 2.0, 3.0],
        );

        let verdict = verify(&candidate, &reference, DEFAULT_TOLERANCE);
        assert_eq!(
            verdict,
            Verdict::Fail(Mismatch::RowPtr { index: 1, left: 1, right: 2 })
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let reference = sample();
        let candidate = SparseMatrixCSR::<f64>::zeros(2, 2);

        let verdict = verify(&candidate, &reference, DEFAULT_TOLERANCE);
        assert!(matches!(verdict, Verdict::Fail(Mismatch::Shape { .. })));
    }
}
