//! Gauss-Legendre integration of matrix-valued functions over parametric cells.
//!
//! The integrator evaluates
//!
//! $$
//! I = \int_{a_1}^{a_2} \int_{f_1(\gamma)}^{f_2(\gamma)} \int_{g_1(\eta, \gamma)}^{g_2(\eta, \gamma)}
//!     H(\xi, \eta, \gamma) \\, \mathrm{d}\xi \\, \mathrm{d}\eta \\, \mathrm{d}\gamma
//! $$
//!
//! with an independent number of Gauss points per axis. Since the inner bounds may depend on the
//! outer coordinates, simplex cells are integrated by collapsing the cube. The standard cells used
//! by element operators are described by [`Domain`], which is the single place where their bound
//! functions and the associated point-count rule are defined.

use crate::dense::DenseMatrix;
use crate::error::{Error, Result};
use crate::pool::MatrixPool;
use isofem_quadrature::univariate::gauss_on_interval;
use serde::{Deserialize, Serialize};

/// Parametric (isoparametric) coordinates $(\xi, \eta, \gamma)$.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsoPoint {
    pub xi: f64,
    pub eta: f64,
    pub gamma: f64,
}

impl IsoPoint {
    pub fn new(xi: f64, eta: f64, gamma: f64) -> Self {
        Self { xi, eta, gamma }
    }

    /// A point on a one-dimensional cell.
    pub fn line(xi: f64) -> Self {
        Self::new(xi, 0.0, 0.0)
    }

    /// A point on a two-dimensional cell.
    pub fn planar(xi: f64, eta: f64) -> Self {
        Self::new(xi, eta, 0.0)
    }
}

/// Number of Gauss points needed to integrate a polynomial of the given degree exactly.
///
/// An `n`-point rule is exact up to degree `2n - 1`, so `n = floor(degree / 2) + 1`.
pub fn points_for_degree(degree: usize) -> usize {
    degree / 2 + 1
}

/// Reference cells over which element operators are integrated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    /// $\xi \in [-1, 1]$; $\eta, \gamma \in [0, 1]$ carry unit weight.
    Line,
    /// $\xi, \eta \in [-1, 1]$; $\gamma \in [0, 1]$ carries unit weight.
    Square,
    /// $0 \leq \xi \leq 1 - \eta$, $\eta \in [0, 1]$; $\gamma \in [0, 1]$ carries unit weight.
    Triangle,
    /// $0 \leq \xi \leq 1 - \eta - \gamma$, $0 \leq \eta \leq 1 - \gamma$, $\gamma \in [0, 1]$.
    Tetrahedron,
}

impl Domain {
    /// Per-axis polynomial degree of the integrand after accounting for collapsed bounds.
    ///
    /// On simplices the inner upper bound is linear in the outer coordinates, so integrating out
    /// an inner axis raises the degree seen by the next outer axis. Degree hints on simplices are
    /// read as total-degree bounds: for an integrand of total degree $p$, the $\eta$ integrand of a
    /// triangle has degree at most $p + 1$, and on a tetrahedron the $\gamma$ integrand has
    /// degree at most $p + 2$.
    pub fn effective_degrees(&self, [xi, eta, gamma]: [usize; 3]) -> [usize; 3] {
        match self {
            Domain::Line | Domain::Square => [xi, eta, gamma],
            Domain::Triangle => [xi, xi.max(eta) + 1, gamma],
            Domain::Tetrahedron => [xi, xi.max(eta) + 1, xi.max(eta).max(gamma) + 2],
        }
    }

    /// Gauss point counts per axis that integrate a polynomial of the given per-axis degrees
    /// exactly over this domain.
    pub fn points_for(&self, degrees: [usize; 3]) -> [usize; 3] {
        self.effective_degrees(degrees).map(points_for_degree)
    }

    /// An integrator over this domain, exact for integrands of the given per-axis degrees.
    pub fn integrator(&self, degrees: [usize; 3]) -> GaussianIntegrator {
        let integrator = GaussianIntegrator::new().with_points(self.points_for(degrees));
        match self {
            Domain::Line => integrator
                .with_gamma_bounds(0.0, 1.0)
                .with_eta_bounds(|_| [0.0, 1.0])
                .with_xi_bounds(|_, _| [-1.0, 1.0]),
            Domain::Square => integrator
                .with_gamma_bounds(0.0, 1.0)
                .with_eta_bounds(|_| [-1.0, 1.0])
                .with_xi_bounds(|_, _| [-1.0, 1.0]),
            Domain::Triangle => integrator
                .with_gamma_bounds(0.0, 1.0)
                .with_eta_bounds(|_| [0.0, 1.0])
                .with_xi_bounds(|eta, _| [0.0, 1.0 - eta]),
            Domain::Tetrahedron => integrator
                .with_gamma_bounds(0.0, 1.0)
                .with_eta_bounds(|gamma| [0.0, 1.0 - gamma])
                .with_xi_bounds(|eta, gamma| [0.0, 1.0 - eta - gamma]),
        }
    }

    /// Measure (length, area or volume) of the reference cell.
    pub fn measure(&self) -> f64 {
        match self {
            Domain::Line => 2.0,
            Domain::Square => 4.0,
            Domain::Triangle => 0.5,
            Domain::Tetrahedron => 1.0 / 6.0,
        }
    }
}

type EtaBounds = Box<dyn Fn(f64) -> [f64; 2] + Send + Sync>;
type XiBounds = Box<dyn Fn(f64, f64) -> [f64; 2] + Send + Sync>;

/// Three-level nested Gauss-Legendre integrator.
///
/// The outer axis $\gamma$ has constant bounds, the bounds of $\eta$ may depend on $\gamma$ and
/// the bounds of $\xi$ may depend on $(\eta, \gamma)$. An unconfigured axis spans $[-1, 1]$.
pub struct GaussianIntegrator {
    points: [usize; 3],
    gamma_bounds: [f64; 2],
    eta_bounds: EtaBounds,
    xi_bounds: XiBounds,
}

impl std::fmt::Debug for GaussianIntegrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaussianIntegrator")
            .field("points", &self.points)
            .field("gamma_bounds", &self.gamma_bounds)
            .finish_non_exhaustive()
    }
}

impl Default for GaussianIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianIntegrator {
    pub fn new() -> Self {
        Self {
            points: [1, 1, 1],
            gamma_bounds: [-1.0, 1.0],
            eta_bounds: Box::new(|_| [-1.0, 1.0]),
            xi_bounds: Box::new(|_, _| [-1.0, 1.0]),
        }
    }

    /// Sets the number of Gauss points along $\xi$, $\eta$ and $\gamma$.
    pub fn with_points(mut self, points: [usize; 3]) -> Self {
        self.points = points;
        self
    }

    pub fn with_gamma_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.gamma_bounds = [lower, upper];
        self
    }

    /// Bounds of $\eta$ as a function of $\gamma$.
    pub fn with_eta_bounds(mut self, bounds: impl Fn(f64) -> [f64; 2] + Send + Sync + 'static) -> Self {
        self.eta_bounds = Box::new(bounds);
        self
    }

    /// Bounds of $\xi$ as a function of $(\eta, \gamma)$.
    pub fn with_xi_bounds(mut self, bounds: impl Fn(f64, f64) -> [f64; 2] + Send + Sync + 'static) -> Self {
        self.xi_bounds = Box::new(bounds);
        self
    }

    pub fn points(&self) -> [usize; 3] {
        self.points
    }

    /// Integrates a matrix-valued function.
    ///
    /// The integrand receives the pool along with the evaluation point, so that it can rent its
    /// intermediate matrices; every value it returns is handed back to the pool after being
    /// accumulated. All evaluations must have the same shape. The result is rented from `pool`.
    ///
    /// Fails with [`Error::InvalidArgument`] if any point count is zero, and propagates the
    /// first error returned by the integrand.
    pub fn integrate<F>(&self, pool: &mut MatrixPool, mut integrand: F) -> Result<DenseMatrix>
    where
        F: FnMut(&mut MatrixPool, IsoPoint) -> Result<DenseMatrix>,
    {
        let [n_xi, n_eta, n_gamma] = self.points;
        if n_xi == 0 || n_eta == 0 || n_gamma == 0 {
            return Err(Error::InvalidArgument(format!(
                "quadrature point counts must be positive, got {:?}",
                self.points
            )));
        }

        let [a1, a2] = self.gamma_bounds;
        let (gamma_weights, gamma_points) = gauss_on_interval(n_gamma, a1, a2)?;
        let mut sum: Option<DenseMatrix> = None;

        for (&w_gamma, &[gamma]) in gamma_weights.iter().zip(&gamma_points) {
            let [f1, f2] = (self.eta_bounds)(gamma);
            let (eta_weights, eta_points) = gauss_on_interval(n_eta, f1, f2)?;

            for (&w_eta, &[eta]) in eta_weights.iter().zip(&eta_points) {
                let [g1, g2] = (self.xi_bounds)(eta, gamma);
                let (xi_weights, xi_points) = gauss_on_interval(n_xi, g1, g2)?;

                for (&w_xi, &[xi]) in xi_weights.iter().zip(&xi_points) {
                    let value = integrand(pool, IsoPoint::new(xi, eta, gamma))?;
                    let weight = w_xi * w_eta * w_gamma;
                    let (nrows, ncols) = value.shape();
                    let accumulator = sum.get_or_insert_with(|| DenseMatrix::from_pool(pool, nrows, ncols));
                    accumulator.add_scaled_assign(weight, &value)?;
                    value.return_to_pool(pool)?;
                }
            }
        }

        // At least one point per axis was evaluated
        sum.ok_or_else(|| Error::InvalidArgument("integration produced no evaluations".to_string()))
    }
}
