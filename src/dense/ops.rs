//! Arithmetic operator overloads. These panic on shape mismatch, matching `nalgebra`.

use super::DenseMatrix;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.nrows && col < self.ncols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.nrows,
            self.ncols
        );
        &self.data[col * self.nrows + row]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.nrows && col < self.ncols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.nrows,
            self.ncols
        );
        &mut self.data[col * self.nrows + row]
    }
}

impl<'a> Mul<&'a DenseMatrix> for &'a DenseMatrix {
    type Output = DenseMatrix;

    fn mul(self, rhs: &'a DenseMatrix) -> DenseMatrix {
        match self.multiply(rhs) {
            Ok(product) => product,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<'a> Add<&'a DenseMatrix> for &'a DenseMatrix {
    type Output = DenseMatrix;

    fn add(self, rhs: &'a DenseMatrix) -> DenseMatrix {
        match DenseMatrix::add(self, rhs) {
            Ok(sum) => sum,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<'a> Sub<&'a DenseMatrix> for &'a DenseMatrix {
    type Output = DenseMatrix;

    fn sub(self, rhs: &'a DenseMatrix) -> DenseMatrix {
        match DenseMatrix::sub(self, rhs) {
            Ok(difference) => difference,
            Err(err) => panic!("{err}"),
        }
    }
}

impl Mul<f64> for &DenseMatrix {
    type Output = DenseMatrix;

    fn mul(self, factor: f64) -> DenseMatrix {
        self.scale(factor)
    }
}

impl Mul<&DenseMatrix> for f64 {
    type Output = DenseMatrix;

    fn mul(self, matrix: &DenseMatrix) -> DenseMatrix {
        matrix.scale(self)
    }
}

impl Neg for &DenseMatrix {
    type Output = DenseMatrix;

    fn neg(self) -> DenseMatrix {
        self.scale(-1.0)
    }
}
