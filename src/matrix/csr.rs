//! Compressed Sparse Row (CSR) matrix container

use std::fmt;
use num_traits::Num;

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// Three arrays describe the matrix:
/// - `row_ptr`: size `n_rows + 1`; entries for row `i` occupy the half-open
///   range `[row_ptr[i], row_ptr[i + 1])` of the other two arrays
/// - `col_idx`: size nnz; column position of each stored entry
/// - `values`: size nnz; the stored entries, positionally paired with `col_idx`
///
/// A matrix is constructed once, by the loader or by a multiply, and never
/// mutated afterward. Within a row each column index appears at most once;
/// the order of columns within a row is the order in which the multiply
/// engine first discovered them, which is not necessarily sorted. The
/// verification oracle depends on that ordering being reproducible, so
/// nothing in this crate re-sorts rows after construction.
#[derive(Clone, PartialEq)]
pub struct SparseMatrixCSR<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Row start offsets (size: n_rows + 1); `row_ptr[n_rows]` equals nnz
    pub row_ptr: Vec<usize>,

    /// Column indices of stored entries (size: nnz)
    pub col_idx: Vec<usize>,

    /// Stored entries (size: nnz)
    pub values: Vec<T>,
}

impl<T> SparseMatrixCSR<T>
where
    T: Copy + Num,
{
    /// Creates a CSR matrix from its raw arrays
    ///
    /// # Panics
    ///
    /// Panics if the arrays are structurally inconsistent:
    /// - `row_ptr.len()` must be `n_rows + 1` with `row_ptr[0] == 0`
    /// - `row_ptr` must be monotonically non-decreasing
    /// - `col_idx.len()` must equal `values.len()` and `row_ptr[n_rows]`
    /// - every column index must be below `n_cols`
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(row_ptr.len(), n_rows + 1, "row_ptr.len() must be n_rows + 1");
        assert_eq!(row_ptr[0], 0, "row_ptr must start at 0");
        assert!(
            row_ptr.windows(2).all(|w| w[0] <= w[1]),
            "row_ptr must be monotonically non-decreasing"
        );
        assert_eq!(col_idx.len(), values.len(), "col_idx.len() must equal values.len()");
        assert_eq!(
            row_ptr[n_rows],
            col_idx.len(),
            "row_ptr[n_rows] must equal the number of stored entries"
        );
        for &col in &col_idx {
            assert!(col < n_cols, "column index {} out of bounds (n_cols = {})", col, n_cols);
        }

        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Returns the number of stored entries in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns an iterator over the stored entries of row `i` as
    /// `(col_idx, value)` pairs, in stored order
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(i < self.n_rows, "row index out of bounds");

        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];

        self.col_idx[start..end]
            .iter()
            .zip(&self.values[start..end])
            .map(|(&col, val)| (col, val))
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates the identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }

    /// Extracts rows `[start, end)` as an owned CSR matrix
    ///
    /// The slice keeps the full column dimension. Its `row_ptr` is rebased to
    /// start at 0 by subtracting `row_ptr[start]` from every entry, so the
    /// result is a self-contained matrix: this is how each rank extracts its
    /// partition of the left operand.
    pub fn row_block(&self, start: usize, end: usize) -> Self {
        assert!(start <= end, "row block start must not exceed end");
        assert!(end <= self.n_rows, "row block end out of bounds");

        let lo = self.row_ptr[start];
        let hi = self.row_ptr[end];

        Self {
            n_rows: end - start,
            n_cols: self.n_cols,
            row_ptr: self.row_ptr[start..=end].iter().map(|&p| p - lo).collect(),
            col_idx: self.col_idx[lo..hi].to_vec(),
            values: self.values[lo..hi].to_vec(),
        }
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for SparseMatrixCSR<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrixCSR {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        let max_rows_to_print = 5.min(self.n_rows);

        for i in 0..max_rows_to_print {
            write!(f, "  row {}: ", i)?;
            let start = self.row_ptr[i];
            let end = self.row_ptr[i + 1];

            if start == end {
                writeln!(f, "(empty)")?;
            } else {
                let shown = 5.min(end - start);
                for j in start..(start + shown) {
                    write!(f, "({}, {:?}) ", self.col_idx[j], self.values[j])?;
                }
                if end - start > shown {
                    write!(f, "... ({} more)", end - start - shown)?;
                }
                writeln!(f)?;
            }
        }

        if self.n_rows > max_rows_to_print {
            writeln!(f, "  ... ({} more rows)", self.n_rows - max_rows_to_print)?;
        }

        write!(f, "}}")
    }
}
