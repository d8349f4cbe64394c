use super::constitutive::plate_bending_matrix;
use super::quad_membrane::{bilinear_jacobian, bilinear_shape_values};
use super::{column_vector, ElementOperator};
use crate::dense::DenseMatrix;
use crate::element::QuadrilateralElement;
use crate::error::Result;
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Dof, ElementDof, Force, TransformationManager};
use crate::pool::MatrixPool;

/// Discrete Kirchhoff quadrilateral (Batoz and Tahar) for thin plate bending.
///
/// Same dofs and sign conventions as [`DktOperator`](super::DktOperator). Mass and damping are
/// not defined.
#[derive(Debug)]
pub struct DkqOperator<'a> {
    element: &'a QuadrilateralElement,
}

/// Edge coefficients for the four edges 12, 23, 34 and 41, built from forward differences
/// $x_{ij} = x_j - x_i$.
#[derive(Default)]
struct EdgeCoefficients {
    a: [f64; 4],
    b: [f64; 4],
    c: [f64; 4],
    d: [f64; 4],
    e: [f64; 4],
}

impl<'a> DkqOperator<'a> {
    pub fn new(element: &'a QuadrilateralElement) -> Self {
        Self { element }
    }

    fn edge_coefficients(&self) -> EdgeCoefficients {
        let nodes = self.element.local_nodes();
        let mut coefficients = EdgeCoefficients::default();
        for k in 0..4 {
            let (from, to) = (nodes[k], nodes[(k + 1) % 4]);
            let (x, y) = (to.x - from.x, to.y - from.y);
            let l2 = x * x + y * y;
            coefficients.a[k] = -0.75 * x * y / l2;
            coefficients.b[k] = (0.5 * y * y - 0.25 * x * x) / l2;
            coefficients.c[k] = -x / l2;
            coefficients.d[k] = (0.5 * x * x - 0.25 * y * y) / l2;
            coefficients.e[k] = -y / l2;
        }
        coefficients
    }
}

/// Derivatives of the eight serendipity functions $N_1 \dots N_8$ (corners then mid-edges),
/// with respect to $\xi$ and $\eta$.
fn serendipity_derivatives(xi: f64, eta: f64) -> ([f64; 8], [f64; 8]) {
    let n_xi = [
        0.25 * (2.0 * xi + eta) * (1.0 - eta),
        0.25 * (2.0 * xi - eta) * (1.0 - eta),
        0.25 * (2.0 * xi + eta) * (1.0 + eta),
        0.25 * (2.0 * xi - eta) * (1.0 + eta),
        -xi * (1.0 - eta),
        0.5 * (1.0 - eta * eta),
        -xi * (1.0 + eta),
        -0.5 * (1.0 - eta * eta),
    ];
    let n_eta = [
        0.25 * (2.0 * eta + xi) * (1.0 - xi),
        0.25 * (2.0 * eta - xi) * (1.0 + xi),
        0.25 * (2.0 * eta + xi) * (1.0 + xi),
        0.25 * (2.0 * eta - xi) * (1.0 - xi),
        -0.5 * (1.0 - xi * xi),
        -eta * (1.0 + xi),
        0.5 * (1.0 - xi * xi),
        -eta * (1.0 - xi),
    ];
    (n_xi, n_eta)
}

/// Derivatives of the rotation interpolations $H_x$ and $H_y$ along one parametric direction,
/// given the serendipity derivatives `n` along that direction.
///
/// $H_x$ interpolates $\beta_x = \theta_y$ and $H_y$ interpolates $\beta_y = -\theta_x$, so that at
/// the corners $\beta = -\nabla w$.
fn rotation_derivatives(k: &EdgeCoefficients, n: &[f64; 8]) -> ([f64; 12], [f64; 12]) {
    let mut hx = [0.0; 12];
    let mut hy = [0.0; 12];
    for i in 0..4 {
        // Mid-edge functions of the edges leaving (m) and entering (l) corner i
        let m = i;
        let l = (i + 3) % 4;
        let (nm, nl) = (n[4 + m], n[4 + l]);

        hx[3 * i] = 1.5 * (k.c[l] * nl - k.c[m] * nm);
        hx[3 * i + 1] = -k.a[m] * nm - k.a[l] * nl;
        hx[3 * i + 2] = n[i] + k.b[m] * nm + k.b[l] * nl;

        hy[3 * i] = 1.5 * (k.e[l] * nl - k.e[m] * nm);
        hy[3 * i + 1] = -n[i] - k.d[m] * nm - k.d[l] * nl;
        hy[3 * i + 2] = k.a[m] * nm + k.a[l] * nl;
    }
    (hx, hy)
}

impl ElementOperator for DkqOperator<'_> {
    fn name(&self) -> &'static str {
        "discrete Kirchhoff quadrilateral"
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        (0..4)
            .flat_map(|node| [Dof::Dz, Dof::Rx, Dof::Ry].map(|dof| ElementDof::new(node, dof)))
            .collect()
    }

    fn node_count(&self) -> usize {
        4
    }

    fn domain(&self) -> Domain {
        Domain::Square
    }

    fn transformation(&self) -> TransformationManager {
        self.element.transformation()
    }

    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(DenseMatrix::from_row_slice_pooled(pool, 1, 4, &bilinear_shape_values(iso)))
    }

    /// Curvatures $(\beta_{x,x}, \beta_{y,y}, \beta_{x,y} + \beta_{y,x})$, which equal
    /// $-(w_{,xx}, w_{,yy}, 2 w_{,xy})$ in the Kirchhoff limit.
    #[allow(non_snake_case)]
    fn b_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let J = self.j_matrix_at(pool, iso)?;
        let J_inv = J.inverse();
        J.return_to_pool(pool)?;
        let J_inv = J_inv?;
        let (j11, j12, j21, j22) = (J_inv[(0, 0)], J_inv[(0, 1)], J_inv[(1, 0)], J_inv[(1, 1)]);

        let coefficients = self.edge_coefficients();
        let (n_xi, n_eta) = serendipity_derivatives(iso.xi, iso.eta);
        let (hx_xi, hy_xi) = rotation_derivatives(&coefficients, &n_xi);
        let (hx_eta, hy_eta) = rotation_derivatives(&coefficients, &n_eta);

        let mut b = DenseMatrix::from_pool(pool, 3, 12);
        for i in 0..12 {
            b[(0, i)] = j11 * hx_xi[i] + j12 * hx_eta[i];
            b[(1, i)] = j21 * hy_xi[i] + j22 * hy_eta[i];
            b[(2, i)] = j11 * hy_xi[i] + j12 * hy_eta[i] + j21 * hx_xi[i] + j22 * hx_eta[i];
        }
        Ok(b)
    }

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let properties = self.element.material.properties_at(iso);
        let t = self.element.section.thickness_at(iso);
        Ok(DenseMatrix::from_nalgebra_pooled(pool, &plate_bending_matrix(&properties, t)))
    }

    fn j_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(bilinear_jacobian(pool, &self.element.local_nodes(), iso))
    }

    /// Bilinear interpolation of the deflection from the corner values.
    fn interpolation_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let mut h = DenseMatrix::from_pool(pool, 1, 12);
        for (i, n) in bilinear_shape_values(iso).into_iter().enumerate() {
            h[(0, 3 * i)] = n;
        }
        Ok(h)
    }

    fn load_components(&self, pool: &mut MatrixPool, force: &Force) -> Result<DenseMatrix> {
        Ok(column_vector(pool, &[force.fz]))
    }

    fn n_max_order(&self) -> [usize; 3] {
        [1, 1, 0]
    }

    fn b_max_order(&self) -> [usize; 3] {
        [1, 1, 0]
    }

    fn det_j_order(&self) -> [usize; 3] {
        [1, 1, 0]
    }

    fn material_order(&self) -> [usize; 3] {
        self.element.material.max_function_order()
    }

    fn section_order(&self) -> [usize; 3] {
        self.element.section.max_function_order()
    }
}
