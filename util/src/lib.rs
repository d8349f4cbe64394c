use nalgebra::{DMatrix, DVector};

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Largest entry of `|A - A^T|`, relative to the largest entry of `|A|`.
pub fn relative_asymmetry(matrix: &DMatrix<f64>) -> f64 {
    assert_eq!(matrix.nrows(), matrix.ncols(), "matrix must be square");
    let scale = matrix.abs().max();
    if scale == 0.0 {
        return 0.0;
    }
    (matrix - matrix.transpose()).abs().max() / scale
}

/// Largest entry of `|K u|`, relative to `max |K| * max |u|`.
///
/// Zero for vectors in the null space of `K`, e.g. rigid body modes of a stiffness matrix.
pub fn relative_residual(matrix: &DMatrix<f64>, u: &DVector<f64>) -> f64 {
    let scale = matrix.abs().max() * u.abs().max();
    if scale == 0.0 {
        return 0.0;
    }
    (matrix * u).abs().max() / scale
}

/// Exact integral of `x^alpha` over `[a, b]`.
pub fn monomial_integral(alpha: i32, a: f64, b: f64) -> f64 {
    let p = alpha + 1;
    (b.powi(p) - a.powi(p)) / p as f64
}
