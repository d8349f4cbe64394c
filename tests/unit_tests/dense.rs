use isofem::dense::DenseMatrix;
use isofem::pool::MatrixPool;
use isofem::proptest::diagonally_dominant_matrix;
use isofem::Error;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq, prop_assert_matrix_eq};
use nalgebra::DMatrix;
use proptest::prelude::*;
use util::assert_panics;

fn example_matrix() -> DenseMatrix {
    DenseMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
}

#[test]
fn row_and_column_slices_agree() {
    let by_rows = example_matrix();
    let by_columns = DenseMatrix::from_column_slice(2, 3, &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    assert_eq!(by_rows, by_columns);
    assert_eq!(by_rows[(1, 2)], 6.0);
    assert_eq!(by_rows.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn checked_access_reports_index() {
    let mut matrix = example_matrix();
    assert_eq!(matrix.get(0, 1), Ok(2.0));
    matrix.set(1, 0, -4.0).unwrap();
    assert_eq!(matrix[(1, 0)], -4.0);

    assert_eq!(
        matrix.get(2, 0),
        Err(Error::IndexOutOfBounds {
            index: (2, 0),
            shape: (2, 3)
        })
    );
    assert!(matrix.set(0, 3, 1.0).is_err());
    assert_panics!(example_matrix()[(0, 3)]);
}

#[test]
fn zero_sized_matrices_are_rejected() {
    assert_panics!(DenseMatrix::zeros(0, 3));
    assert!(DenseMatrix::try_from(&DMatrix::<f64>::zeros(0, 2)).is_err());
}

#[test]
fn multiply_checks_dimensions() {
    let a = example_matrix();
    let b = DenseMatrix::from_row_slice(3, 1, &[1.0, 0.0, -1.0]);

    let ab = a.multiply(&b).unwrap();
    assert_eq!(ab, DenseMatrix::from_row_slice(2, 1, &[-2.0, -2.0]));

    let err = b.multiply(&b).unwrap_err();
    assert_eq!(
        err,
        Error::DimensionMismatch {
            operation: "multiply",
            left: (3, 1),
            right: (3, 1)
        }
    );
    assert!(a.add(&b).is_err());
    assert!(a.sub(&b).is_err());
}

#[test]
fn pooled_products_match_unpooled() {
    let mut pool = MatrixPool::new();
    let a = example_matrix();
    let d = DenseMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);

    let expected = a.transpose().multiply(&d).unwrap().multiply(&a).unwrap();
    let btdb = DenseMatrix::bt_d_b_pooled(&a, &d, &mut pool).unwrap();
    assert_eq!(btdb, expected);
    assert!(btdb.is_pooled());
    assert!(btdb.is_symmetric(0.0));

    let atd = a.transpose_multiply_pooled(&d, &mut pool).unwrap();
    assert_eq!(atd, a.transpose().multiply(&d).unwrap());

    btdb.return_to_pool(&mut pool).unwrap();
    atd.return_to_pool(&mut pool).unwrap();
}

#[test]
fn transpose_in_place_of_rectangular_matrix() {
    let mut matrix = example_matrix();
    matrix.transpose_in_place();
    assert_eq!(matrix.shape(), (3, 2));
    assert_eq!(matrix, DenseMatrix::from_row_slice(3, 2, &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]));
}

#[test]
fn determinant_with_row_exchange() {
    let matrix = DenseMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 0.0, 3.0, 0.0, 1.0]);
    let expected = DMatrix::from(&matrix).determinant();
    assert_scalar_eq!(matrix.determinant().unwrap(), expected, comp = abs, tol = 1e-12);
    assert_scalar_eq!(expected, -5.0, comp = abs, tol = 1e-12);
}

#[test]
fn singular_matrices_are_reported() {
    let matrix = DenseMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
    assert_eq!(matrix.determinant(), Err(Error::Singular { operation: "determinant" }));
    assert_eq!(matrix.inverse().unwrap_err(), Error::Singular { operation: "inverse" });
    let b = DenseMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
    assert_eq!(matrix.solve(&b).unwrap_err(), Error::Singular { operation: "solve" });
}

#[test]
fn non_square_decompositions_are_dimension_mismatches() {
    let matrix = example_matrix();
    assert!(matches!(matrix.determinant(), Err(Error::DimensionMismatch { .. })));
    assert!(matches!(matrix.inverse(), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn cholesky_of_positive_definite_matrix() {
    let matrix = DenseMatrix::from_row_slice(3, 3, &[4.0, 2.0, 0.0, 2.0, 5.0, 1.0, 0.0, 1.0, 3.0]);
    let l = matrix.cholesky().unwrap();
    let reconstructed = l.multiply(&l.transpose()).unwrap();
    assert_matrix_eq!(DMatrix::from(&reconstructed), DMatrix::from(&matrix), comp = abs, tol = 1e-12);

    let indefinite = DenseMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
    assert_eq!(indefinite.cholesky().unwrap_err(), Error::Singular { operation: "cholesky" });
}

#[test]
fn display_lists_rows() {
    let text = example_matrix().to_string();
    assert!(text.starts_with("DenseMatrix 2x3"));
    assert_eq!(text.lines().count(), 3);
}

proptest! {
    #[test]
    fn transpose_twice_is_identity(matrix in diagonally_dominant_matrix(6)) {
        let mut twice = matrix.transpose();
        twice.transpose_in_place();
        prop_assert_eq!(twice, matrix);
    }

    #[test]
    fn inverse_times_matrix_is_identity(matrix in diagonally_dominant_matrix(6)) {
        let n = matrix.nrows();
        let inverse = matrix.inverse().unwrap();
        let product = inverse.multiply(&matrix).unwrap();
        prop_assert_matrix_eq!(DMatrix::from(&product), DMatrix::<f64>::identity(n, n), comp = abs, tol = 1e-10);
    }

    #[test]
    fn solve_agrees_with_nalgebra(matrix in diagonally_dominant_matrix(6)) {
        let n = matrix.nrows();
        let b = DenseMatrix::from_fn(n, 2, |i, j| (i + 2 * j) as f64 - 1.5);
        let x = matrix.solve(&b).unwrap();
        let expected = DMatrix::from(&matrix).lu().solve(&DMatrix::from(&b)).unwrap();
        prop_assert_matrix_eq!(DMatrix::from(&x), expected, comp = abs, tol = 1e-10);

        let det = matrix.determinant().unwrap();
        let expected_det = DMatrix::from(&matrix).determinant();
        prop_assert!((det - expected_det).abs() <= 1e-10 * expected_det.abs());
    }
}
