//! Correctness tests for the local multiply engine
//!
//! The engine is checked against a dense reference multiplication, against
//! the hashmap reference implementation, and against sprs's own CSR product.
//! Comparisons treat absent entries as zero, since the engine keeps explicit
//! zeros and the oracles drop them.

use proptest::prelude::*;
use spdist::{from_sprs, reference_spgemm, spgemm, spgemm_parallel, to_sprs, SparseMatrixCSR};

const TOLERANCE: f64 = 1e-9;

/// Expands a CSR matrix into a dense row-major table
fn to_dense(m: &SparseMatrixCSR<f64>) -> Vec<Vec<f64>> {
    let mut dense = vec![vec![0.0; m.n_cols]; m.n_rows];
    for i in 0..m.n_rows {
        for (j, &val) in m.row_iter(i) {
            dense[i][j] += val;
        }
    }
    dense
}

/// Compresses a dense row-major table into CSR, dropping zeros
fn from_dense(dense: &[Vec<f64>], n_cols: usize) -> SparseMatrixCSR<f64> {
    let mut row_ptr = vec![0];
    let mut col_idx = Vec::new();
    let mut values = Vec::new();

    for row in dense {
        for (j, &val) in row.iter().enumerate() {
            if val != 0.0 {
                col_idx.push(j);
                values.push(val);
            }
        }
        row_ptr.push(col_idx.len());
    }

    SparseMatrixCSR::new(dense.len(), n_cols, row_ptr, col_idx, values)
}

/// Dense reference product
fn dense_multiply(a: &[Vec<f64>], b: &[Vec<f64>], n_cols: usize) -> Vec<Vec<f64>> {
    let mut c = vec![vec![0.0; n_cols]; a.len()];
    for (i, a_row) in a.iter().enumerate() {
        for (k, &a_val) in a_row.iter().enumerate() {
            if a_val != 0.0 {
                for j in 0..n_cols {
                    c[i][j] += a_val * b[k][j];
                }
            }
        }
    }
    c
}

fn assert_dense_close(left: &[Vec<f64>], right: &[Vec<f64>]) {
    assert_eq!(left.len(), right.len());
    for (i, (l_row, r_row)) in left.iter().zip(right).enumerate() {
        for (j, (l, r)) in l_row.iter().zip(r_row).enumerate() {
            assert!(
                (l - r).abs() < TOLERANCE,
                "entry ({}, {}): {} vs {}",
                i,
                j,
                l,
                r
            );
        }
    }
}

#[test]
fn test_engine_matches_dense_reference() {
    let a_dense = vec![
        vec![1.0, 0.0, 2.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0],
        vec![3.0, -1.0, 0.0, 0.5],
    ];
    let b_dense = vec![
        vec![0.0, 2.0],
        vec![1.0, 0.0],
        vec![0.0, -4.0],
        vec![7.0, 0.0],
    ];

    let a = from_dense(&a_dense, 4);
    let b = from_dense(&b_dense, 2);

    let c = spgemm(&a, &b).unwrap();
    let expected = dense_multiply(&a_dense, &b_dense, 2);

    assert_dense_close(&to_dense(&c), &expected);
}

#[test]
fn test_engine_matches_sprs() {
    let a = SparseMatrixCSR::new(
        4,
        4,
        vec![0, 2, 3, 5, 6],
        vec![1, 3, 0, 2, 1, 3],
        vec![1.5, -2.0, 3.0, 0.5, 4.0, -1.0],
    );

    let ours = spgemm_parallel(&a, &a).unwrap();
    let sprs_a = to_sprs(&a);
    let theirs = from_sprs(&sprs_a * &sprs_a);

    assert_dense_close(&to_dense(&ours), &to_dense(&theirs));
}

#[test]
fn test_identity_preserves_matrix_exactly() {
    let a = SparseMatrixCSR::new(
        3,
        3,
        vec![0, 2, 2, 3],
        vec![2, 0, 1],
        vec![1.0, -2.5, 4.0],
    );
    let identity = SparseMatrixCSR::<f64>::identity(3);

    let c = spgemm_parallel(&a, &identity).unwrap();

    assert_eq!(c.row_ptr, a.row_ptr);
    assert_eq!(c.col_idx, a.col_idx);
    assert_eq!(c.values, a.values);
}

#[test]
fn test_engine_matches_hashmap_reference() {
    let a = SparseMatrixCSR::new(
        3,
        3,
        vec![0, 2, 4, 6],
        vec![0, 1, 0, 2, 1, 2],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
    );

    let ours = spgemm(&a, &a).unwrap();
    let oracle = reference_spgemm(&a, &a).unwrap();

    assert_dense_close(&to_dense(&ours), &to_dense(&oracle));
}

/// Strategy: a dense matrix of the given shape with about half zeros
fn dense_matrix(rows: usize, cols: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    proptest::collection::vec(
        proptest::collection::vec(
            prop_oneof![2 => Just(0.0), 1 => -4.0..4.0f64],
            cols,
        ),
        rows,
    )
}

/// Strategy: compatible operand shapes with their dense contents
fn operand_pair() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    (1usize..7, 1usize..7, 1usize..7)
        .prop_flat_map(|(m, k, n)| (dense_matrix(m, k), dense_matrix(k, n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_multiply_matches_dense((a_dense, b_dense) in operand_pair()) {
        let k = a_dense[0].len();
        let n = b_dense[0].len();
        let a = from_dense(&a_dense, k);
        let b = from_dense(&b_dense, n);

        let seq = spgemm(&a, &b).unwrap();
        let par = spgemm_parallel(&a, &b).unwrap();
        let expected = dense_multiply(&a_dense, &b_dense, n);

        // Both modes match the dense product, and each other positionally
        assert_dense_close(&to_dense(&seq), &expected);
        prop_assert_eq!(&par.row_ptr, &seq.row_ptr);
        prop_assert_eq!(&par.col_idx, &seq.col_idx);
        prop_assert_eq!(&par.values, &seq.values);
    }
}
