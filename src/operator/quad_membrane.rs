use super::constitutive::{plane_strain_matrix, plane_stress_matrix};
use super::{column_vector, diagonal_matrix, local_dof_vector, vector_interpolation_matrix, ElementOperator, OperatorKind};
use crate::dense::DenseMatrix;
use crate::element::{MembraneBehaviour, QuadrilateralElement};
use crate::error::Result;
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Displacement, Dof, ElementDof, Force, TransformationManager};
use crate::pool::MatrixPool;
use nalgebra::{Matrix3, Point3};

/// Parametric positions of the corner nodes.
const CORNERS: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

pub(crate) fn bilinear_shape_values(iso: IsoPoint) -> [f64; 4] {
    CORNERS.map(|[xi_i, eta_i]| 0.25 * (1.0 + xi_i * iso.xi) * (1.0 + eta_i * iso.eta))
}

/// Jacobian of the bilinear map,
/// $\begin{bmatrix} x_{,\xi} & y_{,\xi} \\\\ x_{,\eta} & y_{,\eta} \end{bmatrix}$.
pub(crate) fn bilinear_jacobian(pool: &mut MatrixPool, nodes: &[Point3<f64>; 4], iso: IsoPoint) -> DenseMatrix {
    let [p1, p2, p3, p4] = nodes;
    let (x12, x34) = (p1.x - p2.x, p3.x - p4.x);
    let (y12, y34) = (p1.y - p2.y, p3.y - p4.y);
    let (x32, x41) = (p3.x - p2.x, p4.x - p1.x);
    let (y32, y41) = (p3.y - p2.y, p4.y - p1.y);

    let j11 = 0.25 * (-x12 + x34 + iso.eta * (x12 + x34));
    let j12 = 0.25 * (-y12 + y34 + iso.eta * (y12 + y34));
    let j21 = 0.25 * (x32 + x41 + iso.xi * (x12 + x34));
    let j22 = 0.25 * (y32 + y41 + iso.xi * (y12 + y34));
    DenseMatrix::from_row_slice_pooled(pool, 2, 2, &[j11, j12, j21, j22])
}

/// Four-node bilinear membrane quadrilateral (Q4).
#[derive(Debug)]
pub struct QuadMembraneOperator<'a> {
    element: &'a QuadrilateralElement,
}

impl<'a> QuadMembraneOperator<'a> {
    pub fn new(element: &'a QuadrilateralElement) -> Self {
        Self { element }
    }

    fn elasticity(&self, iso: IsoPoint) -> Result<Matrix3<f64>> {
        let properties = self.element.material.properties_at(iso);
        match self.element.behaviour {
            MembraneBehaviour::PlaneStress => Ok(plane_stress_matrix(&properties)),
            MembraneBehaviour::PlaneStrain => plane_strain_matrix(&properties),
        }
    }
}

impl ElementOperator for QuadMembraneOperator<'_> {
    fn name(&self) -> &'static str {
        "quadrilateral membrane"
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        (0..4)
            .flat_map(|node| [ElementDof::new(node, Dof::Dx), ElementDof::new(node, Dof::Dy)])
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

    fn supports(&self, _kind: OperatorKind) -> bool {
        true
    }

    /// Rows: shape function values and their derivatives with respect to $\xi$ and $\eta$.
    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let mut n = DenseMatrix::from_pool(pool, 3, 4);
        for (i, (value, [xi_i, eta_i])) in bilinear_shape_values(iso).into_iter().zip(CORNERS).enumerate() {
            n[(0, i)] = value;
            n[(1, i)] = 0.25 * xi_i * (1.0 + eta_i * iso.eta);
            n[(2, i)] = 0.25 * eta_i * (1.0 + xi_i * iso.xi);
        }
        Ok(n)
    }

    #[allow(non_snake_case)]
    fn b_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let J = self.j_matrix_at(pool, iso)?;
        let J_inv = J.inverse();
        J.return_to_pool(pool)?;
        let J_inv = J_inv?;
        let N = self.n_matrix_at(pool, iso)?;

        let mut b = DenseMatrix::from_pool(pool, 3, 8);
        for i in 0..4 {
            let (n_xi, n_eta) = (N[(1, i)], N[(2, i)]);
            let n_x = J_inv[(0, 0)] * n_xi + J_inv[(0, 1)] * n_eta;
            let n_y = J_inv[(1, 0)] * n_xi + J_inv[(1, 1)] * n_eta;
            b[(0, 2 * i)] = n_x;
            b[(1, 2 * i + 1)] = n_y;
            b[(2, 2 * i)] = n_y;
            b[(2, 2 * i + 1)] = n_x;
        }
        N.return_to_pool(pool)?;
        Ok(b)
    }

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let t = self.element.section.thickness_at(iso);
        let c = self.elasticity(iso)? * t;
        Ok(DenseMatrix::from_nalgebra_pooled(pool, &c))
    }

    fn j_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(bilinear_jacobian(pool, &self.element.local_nodes(), iso))
    }

    fn rho_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let rho = self.element.material.properties_at(iso).rho;
        let t = self.element.section.thickness_at(iso);
        Ok(diagonal_matrix(pool, &[rho * t; 2]))
    }

    fn mu_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let mu = self.element.material.properties_at(iso).mu;
        let t = self.element.section.thickness_at(iso);
        Ok(diagonal_matrix(pool, &[mu * t; 2]))
    }

    fn interpolation_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(vector_interpolation_matrix(pool, &bilinear_shape_values(iso), 2))
    }

    fn load_components(&self, pool: &mut MatrixPool, force: &Force) -> Result<DenseMatrix> {
        Ok(column_vector(pool, &[force.fx, force.fy]))
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

    #[allow(non_snake_case)]
    fn stress_at(&self, pool: &mut MatrixPool, displacements: &[Displacement], iso: IsoPoint) -> Result<DenseMatrix> {
        let u = local_dof_vector(self, pool, displacements)?;
        let B = self.b_matrix_at(pool, iso)?;
        let C = DenseMatrix::from_nalgebra_pooled(pool, &self.elasticity(iso)?);
        let strain = B.multiply_pooled(&u, pool)?;
        let stress = C.multiply_pooled(&strain, pool)?;
        for matrix in [u, B, C, strain] {
            matrix.return_to_pool(pool)?;
        }
        Ok(stress)
    }
}
