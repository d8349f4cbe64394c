use super::constitutive::plate_bending_matrix;
use super::{column_vector, ElementOperator};
use crate::dense::DenseMatrix;
use crate::element::TriangleElement;
use crate::error::Result;
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Dof, ElementDof, Force, TransformationManager};
use crate::pool::MatrixPool;

/// Discrete Kirchhoff triangle (Batoz, Bathe and Ho) for thin plate bending.
///
/// Dofs per node are the deflection $w$ and the rotations $\theta_x = \partial w / \partial y$
/// and $\theta_y = -\partial w / \partial x$. Moments are $D \kappa$ with
/// $\kappa = -(w_{,xx}, w_{,yy}, 2 w_{,xy})$, so a sagging field gives negative moments. Mass and
/// damping are not defined.
#[derive(Debug)]
pub struct DktOperator<'a> {
    element: &'a TriangleElement,
}

/// Edge coefficients of the DKT rotation interpolation, indexed by the edge opposite to each
/// node (edges 23, 31 and 12).
struct EdgeCoefficients {
    p: [f64; 3],
    q: [f64; 3],
    r: [f64; 3],
    t: [f64; 3],
}

impl EdgeCoefficients {
    fn new(x: [f64; 3], y: [f64; 3]) -> Self {
        let mut coefficients = Self {
            p: [0.0; 3],
            q: [0.0; 3],
            r: [0.0; 3],
            t: [0.0; 3],
        };
        for k in 0..3 {
            let l2 = x[k] * x[k] + y[k] * y[k];
            coefficients.p[k] = -6.0 * x[k] / l2;
            coefficients.q[k] = 3.0 * x[k] * y[k] / l2;
            coefficients.r[k] = 3.0 * y[k] * y[k] / l2;
            coefficients.t[k] = -6.0 * y[k] / l2;
        }
        coefficients
    }
}

impl<'a> DktOperator<'a> {
    pub fn new(element: &'a TriangleElement) -> Self {
        Self { element }
    }

    /// Edge vectors $(x_{23}, x_{31}, x_{12})$ and $(y_{23}, y_{31}, y_{12})$ with
    /// $x_{ij} = x_i - x_j$.
    fn edges(&self) -> ([f64; 3], [f64; 3]) {
        let [p1, p2, p3] = self.element.local_nodes();
        (
            [p2.x - p3.x, p3.x - p1.x, p1.x - p2.x],
            [p2.y - p3.y, p3.y - p1.y, p1.y - p2.y],
        )
    }
}

impl ElementOperator for DktOperator<'_> {
    fn name(&self) -> &'static str {
        "discrete Kirchhoff triangle"
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        (0..3)
            .flat_map(|node| {
                [
                    ElementDof::new(node, Dof::Dz),
                    ElementDof::new(node, Dof::Rx),
                    ElementDof::new(node, Dof::Ry),
                ]
            })
            .collect()
    }

    fn node_count(&self) -> usize {
        3
    }

    fn domain(&self) -> Domain {
        Domain::Triangle
    }

    fn transformation(&self) -> TransformationManager {
        self.element.transformation()
    }

    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(DenseMatrix::from_row_slice_pooled(
            pool,
            1,
            3,
            &[1.0 - iso.xi - iso.eta, iso.xi, iso.eta],
        ))
    }

    /// Curvatures $(\beta_{x,x}, \beta_{y,y}, \beta_{x,y} + \beta_{y,x})$ with $\beta_x = \theta_y$ and
    /// $\beta_y = -\theta_x$, i.e. $-(w_{,xx}, w_{,yy}, 2 w_{,xy})$ for a Kirchhoff field.
    fn b_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let j = self.j_matrix_at(pool, iso)?;
        let two_area = j.determinant();
        j.return_to_pool(pool)?;
        let two_area = two_area?.abs();

        let (x, y) = self.edges();
        let [_, x31, x12] = x;
        let [_, y31, y12] = y;
        let EdgeCoefficients { p, q, r, t } = EdgeCoefficients::new(x, y);
        let [p4, p5, p6] = p;
        let [q4, q5, q6] = q;
        let [r4, r5, r6] = r;
        let [t4, t5, t6] = t;
        let (xi, eta) = (iso.xi, iso.eta);

        let hx_xi = [
            p6 * (1.0 - 2.0 * xi) + (p5 - p6) * eta,
            q6 * (1.0 - 2.0 * xi) - (q5 + q6) * eta,
            -4.0 + 6.0 * (xi + eta) + r6 * (1.0 - 2.0 * xi) - eta * (r5 + r6),
            -p6 * (1.0 - 2.0 * xi) + eta * (p4 + p6),
            q6 * (1.0 - 2.0 * xi) - eta * (q6 - q4),
            -2.0 + 6.0 * xi + r6 * (1.0 - 2.0 * xi) + eta * (r4 - r6),
            -eta * (p5 + p4),
            eta * (q4 - q5),
            -eta * (r5 - r4),
        ];
        let hy_xi = [
            t6 * (1.0 - 2.0 * xi) + eta * (t5 - t6),
            1.0 + r6 * (1.0 - 2.0 * xi) - eta * (r5 + r6),
            -q6 * (1.0 - 2.0 * xi) + eta * (q5 + q6),
            -t6 * (1.0 - 2.0 * xi) + eta * (t4 + t6),
            -1.0 + r6 * (1.0 - 2.0 * xi) + eta * (r4 - r6),
            -q6 * (1.0 - 2.0 * xi) - eta * (q4 - q6),
            -eta * (t4 + t5),
            eta * (r4 - r5),
            -eta * (q4 - q5),
        ];
        let hx_eta = [
            -p5 * (1.0 - 2.0 * eta) - xi * (p6 - p5),
            q5 * (1.0 - 2.0 * eta) - xi * (q5 + q6),
            -4.0 + 6.0 * (xi + eta) + r5 * (1.0 - 2.0 * eta) - xi * (r5 + r6),
            xi * (p4 + p6),
            xi * (q4 - q6),
            -xi * (r6 - r4),
            p5 * (1.0 - 2.0 * eta) - xi * (p4 + p5),
            q5 * (1.0 - 2.0 * eta) + xi * (q4 - q5),
            -2.0 + 6.0 * eta + r5 * (1.0 - 2.0 * eta) + xi * (r4 - r5),
        ];
        let hy_eta = [
            -t5 * (1.0 - 2.0 * eta) - xi * (t6 - t5),
            1.0 + r5 * (1.0 - 2.0 * eta) - xi * (r5 + r6),
            -q5 * (1.0 - 2.0 * eta) + xi * (q5 + q6),
            xi * (t4 + t6),
            xi * (r4 - r6),
            -xi * (q4 - q6),
            t5 * (1.0 - 2.0 * eta) - xi * (t4 + t5),
            -1.0 + r5 * (1.0 - 2.0 * eta) + xi * (r4 - r5),
            -q5 * (1.0 - 2.0 * eta) - xi * (q4 - q5),
        ];

        let mut b = DenseMatrix::from_pool(pool, 3, 9);
        for i in 0..9 {
            b[(0, i)] = y31 * hx_xi[i] + y12 * hx_eta[i];
            b[(1, i)] = -x31 * hy_xi[i] - x12 * hy_eta[i];
            b[(2, i)] = -x31 * hx_xi[i] - x12 * hx_eta[i] + y31 * hy_xi[i] + y12 * hy_eta[i];
        }
        b.scale_mut(1.0 / two_area);
        Ok(b)
    }

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let properties = self.element.material.properties_at(iso);
        let t = self.element.section.thickness_at(iso);
        Ok(DenseMatrix::from_nalgebra_pooled(pool, &plate_bending_matrix(&properties, t)))
    }

    /// $\begin{bmatrix} x_{31} & x_{12} \\\\ y_{31} & y_{12} \end{bmatrix}$, whose determinant is
    /// twice the signed area.
    fn j_matrix_at(&self, pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        let ([_, x31, x12], [_, y31, y12]) = self.edges();
        Ok(DenseMatrix::from_row_slice_pooled(pool, 2, 2, &[x31, x12, y31, y12]))
    }

    /// Linear interpolation of the deflection from the corner values.
    fn interpolation_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let mut h = DenseMatrix::from_pool(pool, 1, 9);
        for (i, n) in [1.0 - iso.xi - iso.eta, iso.xi, iso.eta].into_iter().enumerate() {
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
        [0, 0, 0]
    }

    fn material_order(&self) -> [usize; 3] {
        self.element.material.max_function_order()
    }

    fn section_order(&self) -> [usize; 3] {
        self.element.section.max_function_order()
    }
}
