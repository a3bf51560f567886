//! Error types for spdist
//!
//! Every error here is fatal for the run that raises it: this is a batch
//! computation, not a service, so callers propagate with `?` and the driver
//! terminates with a diagnostic.

use thiserror::Error;

/// Result type alias using spdist's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, multiplying, or distributing matrices
#[derive(Error, Debug)]
pub enum Error {
    /// The matrix file could not be opened or read
    #[error("failed to access matrix file: {0}")]
    Io(#[from] std::io::Error),

    /// The matrix file was readable but not a valid triplet file
    #[error("malformed matrix file: {0}")]
    Format(String),

    /// Operand shapes are incompatible for multiplication
    #[error("dimension mismatch: left operand is {left_rows}x{left_cols}, right operand is {right_rows}x{right_cols}")]
    DimensionMismatch {
        /// Rows of the left operand
        left_rows: usize,
        /// Columns of the left operand
        left_cols: usize,
        /// Rows of the right operand
        right_rows: usize,
        /// Columns of the right operand
        right_cols: usize,
    },

    /// A broadcast/gather/reduction did not complete for all participants
    #[error("collective operation failed during {phase}")]
    Collective {
        /// The run phase in which the collective was invoked
        phase: &'static str,
    },
}
