//! Column-major dense matrices backed by pooled buffers.
//!
//! [`DenseMatrix`] is the value type passed between element operators, the integrator and the
//! assembler. Matrices are either *unpooled*, owning an ordinary heap buffer, or *pooled*, in
//! which case their buffer was rented from a [`MatrixPool`] and should be handed back with
//! [`DenseMatrix::return_to_pool`] once the matrix is no longer needed.
//!
//! Returning a matrix consumes it, so reading a matrix after its buffer went back to the pool,
//! or returning it twice, is rejected at compile time. Dropping a pooled matrix without
//! returning it is allowed; its buffer is then freed normally.
//!
//! Named operations (`multiply`, `add`, `get`, ...) report shape and index violations as
//! [`Error`]s. The arithmetic operator overloads and indexing panic instead, like their
//! `nalgebra` counterparts.

use crate::error::{Error, Result};
use crate::pool::{MatrixPool, PoolId};
use nalgebra::storage::Storage;
use nalgebra::{DMatrix, Dim, Matrix};
use std::fmt;
use std::fmt::{Display, Formatter};

mod decomposition;
mod ops;

#[derive(Debug)]
pub struct DenseMatrix {
    nrows: usize,
    ncols: usize,
    data: Vec<f64>,
    pool: Option<PoolId>,
}

impl DenseMatrix {
    fn assert_valid_shape(nrows: usize, ncols: usize) {
        assert!(
            nrows > 0 && ncols > 0,
            "matrix dimensions must be positive, got {nrows}x{ncols}"
        );
    }

    /// An unpooled matrix filled with zeros.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::assert_valid_shape(nrows, ncols);
        Self {
            nrows,
            ncols,
            data: vec![0.0; nrows * ncols],
            pool: None,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix[(i, i)] = 1.0;
        }
        matrix
    }

    /// A zero-filled matrix whose buffer is rented from `pool`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn from_pool(pool: &mut MatrixPool, nrows: usize, ncols: usize) -> Self {
        Self::assert_valid_shape(nrows, ncols);
        let data = pool.allocate(nrows * ncols);
        debug_assert!(data.iter().all(|&x| x == 0.0));
        Self {
            nrows,
            ncols,
            data,
            pool: Some(pool.id()),
        }
    }

    /// Builds a matrix from entries given in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or the slice length is not `nrows * ncols`.
    pub fn from_row_slice(nrows: usize, ncols: usize, entries: &[f64]) -> Self {
        assert_eq!(entries.len(), nrows * ncols, "slice length must match the matrix shape");
        Self::from_fn(nrows, ncols, |i, j| entries[i * ncols + j])
    }

    /// Builds a matrix from entries given in column-major order.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or the slice length is not `nrows * ncols`.
    pub fn from_column_slice(nrows: usize, ncols: usize, entries: &[f64]) -> Self {
        Self::assert_valid_shape(nrows, ncols);
        assert_eq!(entries.len(), nrows * ncols, "slice length must match the matrix shape");
        Self {
            nrows,
            ncols,
            data: entries.to_vec(),
            pool: None,
        }
    }

    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut matrix = Self::zeros(nrows, ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                matrix.data[j * nrows + i] = f(i, j);
            }
        }
        matrix
    }

    /// Like [`from_row_slice`](Self::from_row_slice), with the buffer rented from `pool`.
    pub fn from_row_slice_pooled(pool: &mut MatrixPool, nrows: usize, ncols: usize, entries: &[f64]) -> Self {
        assert_eq!(entries.len(), nrows * ncols, "slice length must match the matrix shape");
        let mut matrix = Self::from_pool(pool, nrows, ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                matrix.data[j * nrows + i] = entries[i * ncols + j];
            }
        }
        matrix
    }

    /// A pooled copy of a (statically or dynamically sized) `nalgebra` matrix.
    pub fn from_nalgebra_pooled<R, C, S>(pool: &mut MatrixPool, matrix: &Matrix<f64, R, C, S>) -> Self
    where
        R: Dim,
        C: Dim,
        S: Storage<f64, R, C>,
    {
        let (nrows, ncols) = matrix.shape();
        let mut copy = Self::from_pool(pool, nrows, ncols);
        for (dst, src) in copy.data.iter_mut().zip(matrix.iter()) {
            *dst = *src;
        }
        copy
    }

    /// A copy of this matrix whose buffer is rented from `pool`.
    pub fn clone_pooled(&self, pool: &mut MatrixPool) -> Self {
        let mut copy = Self::from_pool(pool, self.nrows, self.ncols);
        copy.data.copy_from_slice(&self.data);
        copy
    }

    pub fn is_pooled(&self) -> bool {
        self.pool.is_some()
    }

    /// Hands the buffer of a pooled matrix back to the pool it was rented from.
    ///
    /// Returning an unpooled matrix is a no-op. Returning a pooled matrix to a different pool
    /// fails with [`Error::PoolMisuse`] and drops the buffer.
    pub fn return_to_pool(self, pool: &mut MatrixPool) -> Result<()> {
        match self.pool {
            None => Ok(()),
            Some(id) if id == pool.id() => {
                pool.free(self.data);
                Ok(())
            }
            Some(_) => Err(Error::PoolMisuse(format!(
                "{}x{} matrix returned to a pool that did not rent it",
                self.nrows, self.ncols
            ))),
        }
    }

    /// Releases the matrix from its pool, so that it behaves like an unpooled matrix.
    pub fn detach(mut self) -> Self {
        self.pool = None;
        self
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// The entries in column-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    fn linear_index(&self, row: usize, col: usize) -> Result<usize> {
        if row < self.nrows && col < self.ncols {
            Ok(col * self.nrows + row)
        } else {
            Err(Error::IndexOutOfBounds {
                index: (row, col),
                shape: self.shape(),
            })
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        Ok(self.data[self.linear_index(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let idx = self.linear_index(row, col)?;
        self.data[idx] = value;
        Ok(())
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Copies the entries of `other`, which must have the same shape.
    pub fn copy_from(&mut self, other: &DenseMatrix) -> Result<()> {
        self.check_same_shape(other, "copy")?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    fn check_same_shape(&self, other: &DenseMatrix, operation: &'static str) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                operation,
                left: self.shape(),
                right: other.shape(),
            })
        }
    }

    pub fn transpose(&self) -> DenseMatrix {
        DenseMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// Transposes the matrix, reusing its buffer.
    pub fn transpose_in_place(&mut self) {
        let (m, n) = self.shape();
        if m == n {
            for j in 0..n {
                for i in (j + 1)..n {
                    self.data.swap(j * n + i, i * n + j);
                }
            }
        } else if m > 1 && n > 1 {
            // Cycle-following over the column-major permutation: the entry at linear index k of
            // the m x n matrix moves to index (k * n) mod (mn - 1) of the n x m result.
            let last = m * n - 1;
            let mut visited = vec![false; m * n];
            for start in 1..last {
                if visited[start] {
                    continue;
                }
                let mut k = start;
                let mut carried = self.data[start];
                loop {
                    let target = (k * n) % last;
                    std::mem::swap(&mut self.data[target], &mut carried);
                    visited[target] = true;
                    k = target;
                    if k == start {
                        break;
                    }
                }
            }
        }
        // Row and column vectors have the same linear layout in both orientations.
        self.nrows = n;
        self.ncols = m;
    }

    fn check_multiply(&self, rhs: &DenseMatrix) -> Result<()> {
        if self.ncols == rhs.nrows {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                operation: "multiply",
                left: self.shape(),
                right: rhs.shape(),
            })
        }
    }

    /// Computes `self * rhs` into `output`, which must be `self.nrows() x rhs.ncols()`.
    pub fn multiply_into(&self, rhs: &DenseMatrix, output: &mut DenseMatrix) -> Result<()> {
        self.check_multiply(rhs)?;
        if output.shape() != (self.nrows, rhs.ncols) {
            return Err(Error::DimensionMismatch {
                operation: "multiply (output)",
                left: (self.nrows, rhs.ncols),
                right: output.shape(),
            });
        }

        output.fill(0.0);
        let m = self.nrows;
        for j in 0..rhs.ncols {
            let out_col = &mut output.data[j * m..(j + 1) * m];
            for k in 0..self.ncols {
                let r = rhs.data[j * rhs.nrows + k];
                if r == 0.0 {
                    continue;
                }
                let lhs_col = &self.data[k * m..(k + 1) * m];
                for (o, a) in out_col.iter_mut().zip(lhs_col) {
                    *o += a * r;
                }
            }
        }
        Ok(())
    }

    pub fn multiply(&self, rhs: &DenseMatrix) -> Result<DenseMatrix> {
        self.check_multiply(rhs)?;
        let mut output = DenseMatrix::zeros(self.nrows, rhs.ncols);
        self.multiply_into(rhs, &mut output)?;
        Ok(output)
    }

    /// Like [`multiply`](Self::multiply), with the result rented from `pool`.
    pub fn multiply_pooled(&self, rhs: &DenseMatrix, pool: &mut MatrixPool) -> Result<DenseMatrix> {
        self.check_multiply(rhs)?;
        let mut output = DenseMatrix::from_pool(pool, self.nrows, rhs.ncols);
        self.multiply_into(rhs, &mut output)?;
        Ok(output)
    }

    /// Computes `self^T * rhs` without forming the transpose. The result is rented from `pool`.
    pub fn transpose_multiply_pooled(&self, rhs: &DenseMatrix, pool: &mut MatrixPool) -> Result<DenseMatrix> {
        if self.nrows != rhs.nrows {
            return Err(Error::DimensionMismatch {
                operation: "transpose multiply",
                left: (self.ncols, self.nrows),
                right: rhs.shape(),
            });
        }
        let mut output = DenseMatrix::from_pool(pool, self.ncols, rhs.ncols);
        for j in 0..rhs.ncols {
            let rhs_col = &rhs.data[j * rhs.nrows..(j + 1) * rhs.nrows];
            for i in 0..self.ncols {
                let lhs_col = &self.data[i * self.nrows..(i + 1) * self.nrows];
                output.data[j * self.ncols + i] = lhs_col.iter().zip(rhs_col).map(|(a, b)| a * b).sum();
            }
        }
        Ok(output)
    }

    /// Computes $B^T D B$ with the result and the intermediate product rented from `pool`.
    #[allow(non_snake_case)]
    pub fn bt_d_b_pooled(B: &DenseMatrix, D: &DenseMatrix, pool: &mut MatrixPool) -> Result<DenseMatrix> {
        let DB = D.multiply_pooled(B, pool)?;
        let result = B.transpose_multiply_pooled(&DB, pool);
        DB.return_to_pool(pool)?;
        result
    }

    pub fn add(&self, rhs: &DenseMatrix) -> Result<DenseMatrix> {
        self.check_same_shape(rhs, "add")?;
        let mut output = self.clone();
        output.add_scaled_assign(1.0, rhs)?;
        Ok(output)
    }

    pub fn sub(&self, rhs: &DenseMatrix) -> Result<DenseMatrix> {
        self.check_same_shape(rhs, "subtract")?;
        let mut output = self.clone();
        output.add_scaled_assign(-1.0, rhs)?;
        Ok(output)
    }

    /// `self += alpha * other`.
    pub fn add_scaled_assign(&mut self, alpha: f64, other: &DenseMatrix) -> Result<()> {
        self.check_same_shape(other, "add")?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += alpha * b;
        }
        Ok(())
    }

    pub fn scale(&self, factor: f64) -> DenseMatrix {
        let mut output = self.clone();
        output.scale_mut(factor);
        output
    }

    pub fn scale_mut(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|x| *x *= factor);
    }

    /// Row `i` as a `1 x ncols` matrix.
    pub fn extract_row(&self, i: usize) -> Result<DenseMatrix> {
        self.linear_index(i, 0)?;
        Ok(DenseMatrix::from_fn(1, self.ncols, |_, j| self[(i, j)]))
    }

    /// Column `j` as an `nrows x 1` matrix.
    pub fn extract_column(&self, j: usize) -> Result<DenseMatrix> {
        self.linear_index(0, j)?;
        Ok(DenseMatrix::from_column_slice(
            self.nrows,
            1,
            &self.data[j * self.nrows..(j + 1) * self.nrows],
        ))
    }

    /// Row `i` rented from `pool`.
    pub fn extract_row_pooled(&self, i: usize, pool: &mut MatrixPool) -> Result<DenseMatrix> {
        self.linear_index(i, 0)?;
        let mut row = DenseMatrix::from_pool(pool, 1, self.ncols);
        for j in 0..self.ncols {
            row.data[j] = self[(i, j)];
        }
        Ok(row)
    }

    pub fn set_row(&mut self, i: usize, values: &[f64]) -> Result<()> {
        self.linear_index(i, 0)?;
        if values.len() != self.ncols {
            return Err(Error::DimensionMismatch {
                operation: "set row",
                left: (1, self.ncols),
                right: (1, values.len()),
            });
        }
        for (j, &v) in values.iter().enumerate() {
            self.data[j * self.nrows + i] = v;
        }
        Ok(())
    }

    pub fn set_column(&mut self, j: usize, values: &[f64]) -> Result<()> {
        self.linear_index(0, j)?;
        if values.len() != self.nrows {
            return Err(Error::DimensionMismatch {
                operation: "set column",
                left: (self.nrows, 1),
                right: (values.len(), 1),
            });
        }
        self.data[j * self.nrows..(j + 1) * self.nrows].copy_from_slice(values);
        Ok(())
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a != b {
            for j in 0..self.ncols {
                self.data.swap(j * self.nrows + a, j * self.nrows + b);
            }
        }
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |max, x| f64::max(max, x.abs()))
    }

    /// Whether the matrix is square and `|a_ij - a_ji| <= tol * max|a|` for all entries.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        let threshold = tol * self.max_abs();
        (0..self.nrows).all(|i| (0..i).all(|j| (self[(i, j)] - self[(j, i)]).abs() <= threshold))
    }
}

impl Clone for DenseMatrix {
    /// Clones are always unpooled.
    fn clone(&self) -> Self {
        Self {
            nrows: self.nrows,
            ncols: self.ncols,
            data: self.data.clone(),
            pool: None,
        }
    }
}

impl PartialEq for DenseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

impl From<&DenseMatrix> for DMatrix<f64> {
    fn from(matrix: &DenseMatrix) -> Self {
        DMatrix::from_column_slice(matrix.nrows, matrix.ncols, &matrix.data)
    }
}

impl From<DenseMatrix> for DMatrix<f64> {
    fn from(matrix: DenseMatrix) -> Self {
        DMatrix::from_vec(matrix.nrows, matrix.ncols, matrix.data)
    }
}

impl TryFrom<&DMatrix<f64>> for DenseMatrix {
    type Error = Error;

    fn try_from(matrix: &DMatrix<f64>) -> Result<Self> {
        if matrix.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "cannot build a {}x{} dense matrix",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        Ok(DenseMatrix::from_column_slice(matrix.nrows(), matrix.ncols(), matrix.as_slice()))
    }
}

impl Display for DenseMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "DenseMatrix {}x{}", self.nrows, self.ncols)?;
        for i in 0..self.nrows {
            write!(f, "[")?;
            for j in 0..self.ncols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:12.5e}", self[(i, j)])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
