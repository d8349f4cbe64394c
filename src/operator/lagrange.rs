use crate::dense::DenseMatrix;
use crate::element::BarElement;
use crate::error::Result;
use crate::model::Dof;
use crate::polynomial::{interpolating_shape_functions, Polynomial};
use crate::pool::MatrixPool;
use std::sync::OnceLock;

/// Lagrange shape functions of a single axial dof over the nodes of a bar.
///
/// Nodes whose dof is released are excluded from the interpolation conditions and get a zero
/// shape function. Polynomials are solved on first use and memoized for the lifetime of the
/// operator.
#[derive(Debug)]
pub(crate) struct LagrangeBar<'a> {
    pub element: &'a BarElement,
    pub dof: Dof,
    active: Vec<bool>,
    shape: OnceLock<Vec<Polynomial>>,
    geometry: OnceLock<Vec<Polynomial>>,
}

fn memoized<F>(cell: &OnceLock<Vec<Polynomial>>, compute: F) -> Result<&[Polynomial]>
where
    F: FnOnce() -> Result<Vec<Polynomial>>,
{
    if let Some(polynomials) = cell.get() {
        return Ok(polynomials);
    }
    let polynomials = compute()?;
    Ok(cell.get_or_init(|| polynomials))
}

impl<'a> LagrangeBar<'a> {
    pub fn new(element: &'a BarElement, dof: Dof) -> Self {
        let active = element
            .releases()
            .iter()
            .map(|release| !release.is_released(dof))
            .collect();
        Self {
            element,
            dof,
            active,
            shape: OnceLock::new(),
            geometry: OnceLock::new(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    pub fn shape_functions(&self) -> Result<&[Polynomial]> {
        memoized(&self.shape, || interpolating_shape_functions(&self.active))
    }

    /// Shape functions over all nodes, used for the geometric map.
    fn geometry_functions(&self) -> Result<&[Polynomial]> {
        memoized(&self.geometry, || {
            interpolating_shape_functions(&vec![true; self.element.node_count()])
        })
    }

    /// Rows: shape function values and their $\xi$-derivatives.
    pub fn n_matrix(&self, pool: &mut MatrixPool, xi: f64) -> Result<DenseMatrix> {
        let shape = self.shape_functions()?;
        let mut n = DenseMatrix::from_pool(pool, 2, shape.len());
        for (j, polynomial) in shape.iter().enumerate() {
            n[(0, j)] = polynomial.evaluate(xi);
            n[(1, j)] = polynomial.evaluate_derivative(1, xi);
        }
        Ok(n)
    }

    /// $\mathrm{d}x / \mathrm{d}\xi$ along the bar axis.
    pub fn jacobian(&self, xi: f64) -> Result<f64> {
        let positions = self.element.node_iso_positions();
        let geometry = self.geometry_functions()?;
        Ok(geometry
            .iter()
            .zip(positions)
            .map(|(polynomial, s)| polynomial.evaluate_derivative(1, xi) * self.element.iso_to_local(s))
            .sum())
    }

    pub fn b_matrix(&self, pool: &mut MatrixPool, xi: f64) -> Result<DenseMatrix> {
        let shape = self.shape_functions()?;
        let j = self.jacobian(xi)?;
        let mut b = DenseMatrix::from_pool(pool, 1, shape.len());
        for (k, polynomial) in shape.iter().enumerate() {
            b[(0, k)] = polynomial.evaluate_derivative(1, xi) / j;
        }
        Ok(b)
    }

    pub fn interpolation_matrix(&self, pool: &mut MatrixPool, xi: f64) -> Result<DenseMatrix> {
        let shape = self.shape_functions()?;
        let mut h = DenseMatrix::from_pool(pool, 1, shape.len());
        for (k, polynomial) in shape.iter().enumerate() {
            h[(0, k)] = polynomial.evaluate(xi);
        }
        Ok(h)
    }

    pub fn n_max_order(&self) -> [usize; 3] {
        [self.active_count().saturating_sub(1), 0, 0]
    }

    pub fn b_max_order(&self) -> [usize; 3] {
        [self.active_count().saturating_sub(2), 0, 0]
    }

    pub fn det_j_order(&self) -> [usize; 3] {
        [self.element.node_count().saturating_sub(2), 0, 0]
    }
}
