//! Single-variable polynomials and their construction from interpolation conditions.
//!
//! Bar-family shape functions are obtained by imposing value and derivative conditions at node
//! positions and solving for the polynomial coefficients. This generalizes the closed-form
//! two-node formulas to any node count and to kinematically released end conditions.

use crate::dense::DenseMatrix;
use crate::error::{Error, Result};

/// Largest admissible deviation of a solved polynomial from its conditions.
pub const CONDITION_TOLERANCE: f64 = 1e-7;

/// A polynomial $p(x) = \sum_k c_k x^k$, with coefficients stored in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

/// Requires the `derivative`-th derivative of a polynomial to equal `value` at `x`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Condition {
    pub x: f64,
    pub derivative: usize,
    pub value: f64,
}

impl Condition {
    pub fn value(x: f64, value: f64) -> Self {
        Self {
            x,
            derivative: 0,
            value,
        }
    }

    pub fn derivative(x: f64, derivative: usize, value: f64) -> Self {
        Self { x, derivative, value }
    }
}

/// $\frac{d^k}{dx^k} x^j$ evaluated at `x`.
fn monomial_derivative(j: usize, k: usize, x: f64) -> f64 {
    if k > j {
        return 0.0;
    }
    let falling_factorial: f64 = ((j - k + 1)..=j).map(|f| f as f64).product();
    falling_factorial * x.powi((j - k) as i32)
}

impl Polynomial {
    pub fn zero() -> Self {
        Self {
            coefficients: vec![0.0],
        }
    }

    /// Builds a polynomial from coefficients in ascending order, i.e. `c[k]` multiplies `x^k`.
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        if coefficients.is_empty() {
            Self::zero()
        } else {
            Self { coefficients }
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Degree of the polynomial, ignoring trailing zero coefficients. The zero polynomial has
    /// degree 0.
    pub fn degree(&self) -> usize {
        self.coefficients
            .iter()
            .rposition(|&c| c != 0.0)
            .unwrap_or(0)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coefficients: self.coefficients.iter().map(|c| c * factor).collect(),
        }
    }

    /// Evaluates the `k`-th derivative at `x`.
    pub fn evaluate_derivative(&self, k: usize, x: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(j, &c)| c * monomial_derivative(j, k, x))
            .sum()
    }

    /// The unique polynomial of degree `conditions.len() - 1` satisfying all conditions.
    ///
    /// The coefficients are found by solving the (generalized) Vandermonde system. The solution
    /// is checked against every condition; a deviation above [`CONDITION_TOLERANCE`] fails with
    /// [`Error::InterpolationMismatch`]. An inconsistent or underdetermined set of conditions
    /// fails with [`Error::Singular`].
    pub fn from_conditions(conditions: &[Condition]) -> Result<Self> {
        let n = conditions.len();
        if n == 0 {
            return Err(Error::InvalidArgument(
                "at least one interpolation condition is required".to_string(),
            ));
        }

        let system = DenseMatrix::from_fn(n, n, |i, j| {
            let condition = &conditions[i];
            monomial_derivative(j, condition.derivative, condition.x)
        });
        let targets = DenseMatrix::from_fn(n, 1, |i, _| conditions[i].value);
        let solution = system.solve(&targets)?;
        let polynomial = Self::from_coefficients(solution.as_slice().to_vec());

        let residual = conditions
            .iter()
            .map(|c| (polynomial.evaluate_derivative(c.derivative, c.x) - c.value).abs())
            .fold(0.0, f64::max);
        if residual > CONDITION_TOLERANCE {
            return Err(Error::InterpolationMismatch { residual });
        }

        Ok(polynomial)
    }
}

/// Lagrange-type shape functions over equally spaced nodes on `[-1, 1]`.
///
/// For every node marked active in `active`, the returned polynomial is one at that node and
/// zero at every other active node. Inactive (released) nodes get the zero polynomial. The
/// polynomial degree is one less than the number of active nodes.
pub fn interpolating_shape_functions(active: &[bool]) -> Result<Vec<Polynomial>> {
    let n = active.len();
    if n < 2 {
        return Err(Error::InvalidElement(format!("at least two nodes are required, got {n}")));
    }

    let positions: Vec<f64> = (0..n)
        .map(|i| -1.0 + 2.0 * i as f64 / (n - 1) as f64)
        .collect();
    let active_nodes: Vec<usize> = (0..n).filter(|&i| active[i]).collect();

    (0..n)
        .map(|i| {
            if !active[i] {
                return Ok(Polynomial::zero());
            }
            let conditions: Vec<Condition> = active_nodes
                .iter()
                .map(|&j| Condition::value(positions[j], if i == j { 1.0 } else { 0.0 }))
                .collect();
            Polynomial::from_conditions(&conditions)
        })
        .collect()
}
