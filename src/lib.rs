//! # spdist: row-distributed sparse matrix multiplication
//!
//! This library multiplies sparse matrices stored in Compressed Sparse Row
//! (CSR) form, in two execution modes that must produce identical output:
//!
//! 1. **Local**: a row-parallel SpGEMM kernel using a dense per-row
//!    accumulator with reusable scratch buffers ([`spgemm`],
//!    [`spgemm_parallel`]).
//! 2. **Distributed**: the left operand's rows are partitioned across
//!    cooperating ranks, the right operand is replicated to every rank by
//!    broadcast, each rank runs the same local kernel on its slice, and the
//!    fragments are gathered and reassembled into one global CSR result with
//!    explicit offset bookkeeping ([`run_distributed`]).
//!
//! A verification oracle ([`verify`]) cross-checks the two modes: row
//! structure and column order positionally, values within a floating-point
//! tolerance. Positional comparison is sound because a row's output column
//! order is its discovery order during accumulation, which depends only on
//! the row's inputs.
//!
//! ## Usage
//!
//! ```
//! use spdist::{SparseMatrixCSR, spgemm_parallel};
//!
//! // diag(1, 2) squared is diag(1, 4)
//! let a = SparseMatrixCSR::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0, 2.0]);
//! let c = spgemm_parallel(&a, &a).unwrap();
//!
//! assert_eq!(c.values, vec![1.0, 4.0]);
//! assert_eq!(c.row_ptr, vec![0, 1, 2]);
//! ```
//!
//! A distributed run over in-process ranks:
//!
//! ```
//! use spdist::{SparseMatrixCSR, run_distributed};
//!
//! let a = SparseMatrixCSR::identity(7);
//! let report = run_distributed(a, 3).unwrap();
//! assert!(report.verdict.is_pass());
//! ```

pub mod comm;
pub mod convert;
pub mod distributed;
pub mod error;
pub mod gather;
pub mod io;
pub mod matrix;
pub mod multiply;
pub mod partition;
pub mod verify;

// Re-export primary components
pub use comm::{Communicator, Frame, Transferable, ROOT};
pub use convert::{from_sprs, to_sprs};
pub use distributed::{run_distributed, RunReport};
pub use error::{Error, Result};
pub use gather::{FragmentLayout, GatherPlan};
pub use io::{append_timing, dump_triplets, load_matrix};
pub use matrix::{reference_spgemm, SparseMatrixCSR};
pub use multiply::{spgemm, spgemm_parallel, RowAccumulator};
pub use partition::{partition_rows, RowRange};
pub use verify::{verify, Mismatch, Verdict, DEFAULT_TOLERANCE};

/// Version information for the spdist library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
