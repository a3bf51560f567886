//! Matrix file loading, triplet dumping, and the timing log
//!
//! The input format is a plain-text triplet file in the Matrix Market
//! symmetric convention: optional `%` comment lines, a header line with
//! `rows cols nnz`, then one `row col value` triplet per line using 1-based
//! indices. Indices are converted to 0-based on load, and every off-diagonal
//! entry is mirrored across the diagonal (symmetric expansion) before the
//! entries are sorted row-major and compressed.

use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use num_traits::Num;

use crate::error::{Error, Result};
use crate::matrix::SparseMatrixCSR;

/// Loads a symmetric triplet file into a CSR matrix
///
/// Fails with [`Error::Io`] if the path cannot be opened and with
/// [`Error::Format`] if the header or a triplet line does not parse or an
/// index is out of range.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<SparseMatrixCSR<f64>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    // Skip comments and read the header
    let mut header_line = String::new();
    for line in lines.by_ref() {
        let line = line?;
        if !line.starts_with('%') {
            header_line = line;
            break;
        }
    }

    let parts: Vec<&str> = header_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::Format(format!(
            "expected header 'rows cols nnz', got {:?}",
            header_line
        )));
    }

    let n_rows: usize = parts[0]
        .parse()
        .map_err(|_| Error::Format("invalid row count in header".to_string()))?;
    let n_cols: usize = parts[1]
        .parse()
        .map_err(|_| Error::Format("invalid column count in header".to_string()))?;
    let nnz: usize = parts[2]
        .parse()
        .map_err(|_| Error::Format("invalid nnz count in header".to_string()))?;

    // Read triplets, mirroring off-diagonal entries
    let mut entries: Vec<(usize, usize, f64)> = Vec::with_capacity(2 * nnz);
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(Error::Format(format!("expected 'row col value', got {:?}", line)));
        }

        let row: usize = fields[0]
            .parse()
            .map_err(|_| Error::Format(format!("invalid row index {:?}", fields[0])))?;
        let col: usize = fields[1]
            .parse()
            .map_err(|_| Error::Format(format!("invalid column index {:?}", fields[1])))?;
        let val: f64 = fields[2]
            .parse()
            .map_err(|_| Error::Format(format!("invalid value {:?}", fields[2])))?;

        // 1-based on disk
        if row == 0 || row > n_rows || col == 0 || col > n_cols {
            return Err(Error::Format(format!(
                "entry ({}, {}) outside {}x{} matrix",
                row, col, n_rows, n_cols
            )));
        }
        entries.push((row - 1, col - 1, val));
        if row != col {
            entries.push((col - 1, row - 1, val));
        }
    }

    // Sort row-major, then compress
    entries.sort_by_key(|&(row, col, _)| (row, col));

    let mut row_ptr = vec![0; n_rows + 1];
    let mut col_idx = Vec::with_capacity(entries.len());
    let mut values = Vec::with_capacity(entries.len());

    for &(row, col, val) in &entries {
        row_ptr[row + 1] += 1;
        col_idx.push(col);
        values.push(val);
    }
    for i in 0..n_rows {
        row_ptr[i + 1] += row_ptr[i];
    }

    Ok(SparseMatrixCSR::new(n_rows, n_cols, row_ptr, col_idx, values))
}

/// Writes every stored entry as a `Row i Col j Val v` line, in row-major
/// compressed order
pub fn dump_triplets<T, W>(matrix: &SparseMatrixCSR<T>, out: &mut W) -> Result<()>
where
    T: Copy + Num + Display,
    W: Write,
{
    for i in 0..matrix.n_rows {
        for (j, val) in matrix.row_iter(i) {
            writeln!(out, "Row {} Col {} Val {}", i, j, val)?;
        }
    }
    Ok(())
}

/// Appends one `label,seconds` line to the timing log at `path`
///
/// The file is created if missing and never truncated.
pub fn append_timing<P: AsRef<Path>>(path: P, label: &str, seconds: f64) -> Result<()> {
    let mut log = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(log, "{},{}", label, seconds)?;
    Ok(())
}
