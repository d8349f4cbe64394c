use super::constitutive::{plane_strain_matrix, plane_stress_matrix};
use super::{column_vector, diagonal_matrix, local_dof_vector, vector_interpolation_matrix, ElementOperator, OperatorKind};
use crate::dense::DenseMatrix;
use crate::element::{MembraneBehaviour, TriangleElement};
use crate::error::Result;
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Displacement, Dof, ElementDof, Force, TransformationManager};
use crate::pool::MatrixPool;
use nalgebra::Matrix3;

/// Constant-strain (linear) membrane triangle.
///
/// Parametric coordinates are area coordinates: $N_1 = 1 - \xi - \eta$, $N_2 = \xi$,
/// $N_3 = \eta$.
#[derive(Debug)]
pub struct CstOperator<'a> {
    element: &'a TriangleElement,
}

impl<'a> CstOperator<'a> {
    pub fn new(element: &'a TriangleElement) -> Self {
        Self { element }
    }

    fn shape_values(iso: IsoPoint) -> [f64; 3] {
        [1.0 - iso.xi - iso.eta, iso.xi, iso.eta]
    }

    /// Constitutive matrix (without thickness).
    fn elasticity(&self, iso: IsoPoint) -> Result<Matrix3<f64>> {
        let properties = self.element.material.properties_at(iso);
        match self.element.behaviour {
            MembraneBehaviour::PlaneStress => Ok(plane_stress_matrix(&properties)),
            MembraneBehaviour::PlaneStrain => plane_strain_matrix(&properties),
        }
    }
}

impl ElementOperator for CstOperator<'_> {
    fn name(&self) -> &'static str {
        "constant-strain triangle"
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        (0..3)
            .flat_map(|node| [ElementDof::new(node, Dof::Dx), ElementDof::new(node, Dof::Dy)])
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

    fn supports(&self, _kind: OperatorKind) -> bool {
        true
    }

    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(DenseMatrix::from_row_slice_pooled(pool, 1, 3, &Self::shape_values(iso)))
    }

    /// $B = \frac{1}{2A}
    /// \begin{bmatrix}
    ///   y_{23} & 0 & y_{31} & 0 & y_{12} & 0 \\\\
    ///   0 & x_{32} & 0 & x_{13} & 0 & x_{21} \\\\
    ///   x_{32} & y_{23} & x_{13} & y_{31} & x_{21} & y_{12}
    /// \end{bmatrix}$ with $x_{ij} = x_i - x_j$.
    ///
    /// Fails with [`Error::Singular`](crate::Error::Singular) for zero-area triangles.
    fn b_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let j = self.j_matrix_at(pool, iso)?;
        let two_area = j.determinant();
        j.return_to_pool(pool)?;
        let two_area = two_area?;

        let [p1, p2, p3] = self.element.local_nodes();
        let (x1, x2, x3) = (p1.x, p2.x, p3.x);
        let (y1, y2, y3) = (p1.y, p2.y, p3.y);
        #[rustfmt::skip]
        let entries = [
            y2 - y3, 0.0,     y3 - y1, 0.0,     y1 - y2, 0.0,
            0.0,     x3 - x2, 0.0,     x1 - x3, 0.0,     x2 - x1,
            x3 - x2, y2 - y3, x1 - x3, y3 - y1, x2 - x1, y1 - y2,
        ];
        let mut b = DenseMatrix::from_row_slice_pooled(pool, 3, 6, &entries);
        b.scale_mut(1.0 / two_area);
        Ok(b)
    }

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let t = self.element.section.thickness_at(iso);
        let c = self.elasticity(iso)? * t;
        Ok(DenseMatrix::from_nalgebra_pooled(pool, &c))
    }

    fn j_matrix_at(&self, pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        let [p1, p2, p3] = self.element.local_nodes();
        Ok(DenseMatrix::from_row_slice_pooled(
            pool,
            2,
            2,
            &[p2.x - p1.x, p2.y - p1.y, p3.x - p1.x, p3.y - p1.y],
        ))
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
        Ok(vector_interpolation_matrix(pool, &Self::shape_values(iso), 2))
    }

    /// In-plane components; the out-of-plane component does not act on a membrane.
    fn load_components(&self, pool: &mut MatrixPool, force: &Force) -> Result<DenseMatrix> {
        Ok(column_vector(pool, &[force.fx, force.fy]))
    }

    fn n_max_order(&self) -> [usize; 3] {
        [1, 1, 0]
    }

    fn b_max_order(&self) -> [usize; 3] {
        [0, 0, 0]
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

    /// $(\sigma_x, \sigma_y, \tau_{xy})$.
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
