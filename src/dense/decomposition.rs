//! Determinant, inverse, linear solve and Cholesky factorization.
//!
//! Elimination-based routines share one singularity test: a pivot is admissible only if its
//! magnitude exceeds $\epsilon = 10^{-10} \min_{ij} |a_{ij}|$, or $10^{-9}$ when the matrix has a
//! zero entry. When no admissible pivot exists the routine fails with [`Error::Singular`].

use super::DenseMatrix;
use crate::error::{Error, Result};

fn pivot_tolerance(matrix: &DenseMatrix) -> f64 {
    let min_abs = matrix
        .as_slice()
        .iter()
        .fold(f64::INFINITY, |min, x| f64::min(min, x.abs()));
    let eps = 1e-10 * min_abs;
    if eps == 0.0 {
        1e-9
    } else {
        eps
    }
}

impl DenseMatrix {
    fn check_square(&self, operation: &'static str) -> Result<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                operation,
                left: self.shape(),
                right: (self.ncols, self.nrows),
            })
        }
    }

    /// Row index in `rows` with the largest magnitude entry in column `col`, if admissible.
    fn find_row_pivot(&self, col: usize, rows: std::ops::Range<usize>, eps: f64) -> Option<usize> {
        rows.map(|i| (i, self[(i, col)].abs()))
            .filter(|&(_, value)| value > eps)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Determinant by Gaussian elimination with partial pivoting.
    pub fn determinant(&self) -> Result<f64> {
        self.check_square("determinant")?;
        let n = self.nrows;
        let eps = pivot_tolerance(self);
        let mut a = self.clone();
        let mut sign = 1.0;

        for k in 0..n {
            let p = a
                .find_row_pivot(k, k..n, eps)
                .ok_or(Error::Singular { operation: "determinant" })?;
            if p != k {
                a.swap_rows(p, k);
                sign = -sign;
            }

            let pivot = a[(k, k)];
            for i in (k + 1)..n {
                let factor = a[(i, k)] / pivot;
                if factor != 0.0 {
                    for j in k..n {
                        let akj = a[(k, j)];
                        a[(i, j)] -= factor * akj;
                    }
                }
            }
        }

        Ok((0..n).fold(sign, |det, i| det * a[(i, i)]))
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    pub fn inverse(&self) -> Result<DenseMatrix> {
        self.check_square("inverse")?;
        let n = self.nrows;
        let eps = pivot_tolerance(self);
        let mut a = self.clone();
        let mut inv = DenseMatrix::identity(n);

        for k in 0..n {
            let p = a
                .find_row_pivot(k, k..n, eps)
                .ok_or(Error::Singular { operation: "inverse" })?;
            a.swap_rows(p, k);
            inv.swap_rows(p, k);

            let scale = 1.0 / a[(k, k)];
            for j in 0..n {
                a[(k, j)] *= scale;
                inv[(k, j)] *= scale;
            }

            for i in (0..n).filter(|&i| i != k) {
                let factor = a[(i, k)];
                if factor != 0.0 {
                    for j in 0..n {
                        let akj = a[(k, j)];
                        let ikj = inv[(k, j)];
                        a[(i, j)] -= factor * akj;
                        inv[(i, j)] -= factor * ikj;
                    }
                }
            }
        }

        Ok(inv)
    }

    /// Solves `self * x = b` for square `self` and any number of right-hand side columns.
    ///
    /// Uses Gaussian elimination with column pivoting: at step `k` the largest entry of row `k`
    /// among the remaining columns becomes the pivot. The column permutation is recorded and
    /// undone when writing the solution.
    pub fn solve(&self, b: &DenseMatrix) -> Result<DenseMatrix> {
        self.check_square("solve")?;
        if b.nrows != self.nrows {
            return Err(Error::DimensionMismatch {
                operation: "solve",
                left: self.shape(),
                right: b.shape(),
            });
        }

        let n = self.nrows;
        let m = b.ncols;
        let eps = pivot_tolerance(self);
        let mut a = self.clone();
        let mut rhs = b.clone();
        // permutation[k] is the unknown stored in column k of the eliminated system
        let mut permutation: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let p = (k..n)
                .map(|j| (j, a[(k, j)].abs()))
                .filter(|&(_, value)| value > eps)
                .max_by(|x, y| x.1.total_cmp(&y.1))
                .map(|(j, _)| j)
                .ok_or(Error::Singular { operation: "solve" })?;

            if p != k {
                for i in 0..n {
                    a.as_mut_slice().swap(k * n + i, p * n + i);
                }
                permutation.swap(k, p);
            }

            let pivot = a[(k, k)];
            for i in (k + 1)..n {
                let factor = a[(i, k)] / pivot;
                if factor != 0.0 {
                    for j in k..n {
                        let akj = a[(k, j)];
                        a[(i, j)] -= factor * akj;
                    }
                    for c in 0..m {
                        let rkc = rhs[(k, c)];
                        rhs[(i, c)] -= factor * rkc;
                    }
                }
            }
        }

        let mut x = DenseMatrix::zeros(n, m);
        for c in 0..m {
            for k in (0..n).rev() {
                let mut sum = rhs[(k, c)];
                for j in (k + 1)..n {
                    sum -= a[(k, j)] * x[(permutation[j], c)];
                }
                x[(permutation[k], c)] = sum / a[(k, k)];
            }
        }

        Ok(x)
    }

    /// Lower-triangular Cholesky factor `L` with `self = L L^T`.
    ///
    /// Only the upper triangle of `self` is read. Fails with [`Error::Singular`] if a
    /// non-positive pivot is met, i.e. the matrix is not positive definite.
    pub fn cholesky(&self) -> Result<DenseMatrix> {
        self.check_square("cholesky")?;
        let n = self.nrows;
        let mut l = DenseMatrix::zeros(n, n);

        for i in 0..n {
            let mut lii = self[(i, i)];
            for t in 0..i {
                lii -= l[(i, t)] * l[(i, t)];
            }
            // Also rejects NaN
            if !(lii > 0.0) {
                return Err(Error::Singular { operation: "cholesky" });
            }
            let lii = lii.sqrt();
            l[(i, i)] = lii;

            for j in (i + 1)..n {
                let mut lji = self[(i, j)];
                for t in 0..i {
                    lji -= l[(i, t)] * l[(j, t)];
                }
                l[(j, i)] = lji / lii;
            }
        }

        Ok(l)
    }
}
