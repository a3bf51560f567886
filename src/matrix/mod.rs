// Matrix data structures and the test-oracle multiply

pub mod csr;
pub mod reference;

pub use csr::SparseMatrixCSR;
pub use reference::reference_spgemm;
