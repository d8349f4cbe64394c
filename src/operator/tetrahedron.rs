use super::constitutive::solid_matrix;
use super::{column_vector, diagonal_matrix, vector_interpolation_matrix, ElementOperator, OperatorKind};
use crate::dense::DenseMatrix;
use crate::element::TetrahedronElement;
use crate::error::{Error, Result};
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Displacement, Dof, ElementDof, Force, TransformationManager};
use crate::pool::MatrixPool;

/// Linear four-node tetrahedron.
///
/// Strains are constant, so the stiffness is a single evaluation $B^T D B V$. Parametric
/// coordinates are barycentric: $N_0 = 1 - \xi - \eta - \gamma$, $N_1 = \xi$, $N_2 = \eta$,
/// $N_3 = \gamma$.
#[derive(Debug)]
pub struct TetrahedronOperator<'a> {
    element: &'a TetrahedronElement,
}

impl<'a> TetrahedronOperator<'a> {
    pub fn new(element: &'a TetrahedronElement) -> Self {
        Self { element }
    }

    fn shape_values(iso: IsoPoint) -> [f64; 4] {
        [1.0 - iso.xi - iso.eta - iso.gamma, iso.xi, iso.eta, iso.gamma]
    }

    /// The coordinate matrix with rows $(1, 1, 1, 1)$, $(x_i)$, $(y_i)$, $(z_i)$.
    fn coordinate_matrix(&self, pool: &mut MatrixPool) -> DenseMatrix {
        let mut x = DenseMatrix::from_pool(pool, 4, 4);
        for (i, node) in self.element.nodes.iter().enumerate() {
            x[(0, i)] = 1.0;
            x[(1, i)] = node.x;
            x[(2, i)] = node.y;
            x[(3, i)] = node.z;
        }
        x
    }

    /// Signed volume, positive when the edges from node 0 to nodes 1, 2 and 3 form a
    /// right-handed triple.
    pub fn volume(&self, pool: &mut MatrixPool) -> Result<f64> {
        let x = self.coordinate_matrix(pool);
        let det = x.determinant();
        x.return_to_pool(pool)?;
        Ok(det? / 6.0)
    }

    /// Gradients of the shape functions, `gradients[i] = [dN_i/dx, dN_i/dy, dN_i/dz]`.
    fn shape_gradients(&self, pool: &mut MatrixPool) -> Result<[[f64; 3]; 4]> {
        if self.volume(pool)? < 0.0 {
            return Err(Error::InvalidElement(
                "tetrahedron has negative volume, node ordering is inverted".to_string(),
            ));
        }
        let x = self.coordinate_matrix(pool);
        let inverse = x.inverse();
        x.return_to_pool(pool)?;
        let inverse = inverse?;
        Ok([0, 1, 2, 3].map(|i| [inverse[(i, 1)], inverse[(i, 2)], inverse[(i, 3)]]))
    }
}

impl ElementOperator for TetrahedronOperator<'_> {
    fn name(&self) -> &'static str {
        "tetrahedron"
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        (0..4)
            .flat_map(|node| [Dof::Dx, Dof::Dy, Dof::Dz].map(|dof| ElementDof::new(node, dof)))
            .collect()
    }

    fn node_count(&self) -> usize {
        4
    }

    fn domain(&self) -> Domain {
        Domain::Tetrahedron
    }

    fn transformation(&self) -> TransformationManager {
        self.element.transformation()
    }

    fn supports(&self, _kind: OperatorKind) -> bool {
        true
    }

    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(DenseMatrix::from_row_slice_pooled(pool, 1, 4, &Self::shape_values(iso)))
    }

    /// Strains ordered $(\epsilon_x, \epsilon_y, \epsilon_z, \gamma_{xy}, \gamma_{yz}, \gamma_{zx})$.
    fn b_matrix_at(&self, pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        let gradients = self.shape_gradients(pool)?;
        let mut b = DenseMatrix::from_pool(pool, 6, 12);
        for (i, [bx, by, bz]) in gradients.into_iter().enumerate() {
            let c = 3 * i;
            b[(0, c)] = bx;
            b[(1, c + 1)] = by;
            b[(2, c + 2)] = bz;
            b[(3, c)] = by;
            b[(3, c + 1)] = bx;
            b[(4, c + 1)] = bz;
            b[(4, c + 2)] = by;
            b[(5, c)] = bz;
            b[(5, c + 2)] = bx;
        }
        Ok(b)
    }

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let properties = self.element.material.properties_at(iso);
        Ok(DenseMatrix::from_nalgebra_pooled(pool, &solid_matrix(&properties)?))
    }

    /// Rows are the edge vectors from node 0 to nodes 1, 2 and 3; the determinant is six times
    /// the volume.
    fn j_matrix_at(&self, pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        let [n0, n1, n2, n3] = &self.element.nodes;
        let mut j = DenseMatrix::from_pool(pool, 3, 3);
        for (row, node) in [n1, n2, n3].into_iter().enumerate() {
            let edge = node - n0;
            for col in 0..3 {
                j[(row, col)] = edge[col];
            }
        }
        Ok(j)
    }

    fn rho_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let rho = self.element.material.properties_at(iso).rho;
        Ok(diagonal_matrix(pool, &[rho; 3]))
    }

    fn mu_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let mu = self.element.material.properties_at(iso).mu;
        Ok(diagonal_matrix(pool, &[mu; 3]))
    }

    fn interpolation_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        Ok(vector_interpolation_matrix(pool, &Self::shape_values(iso), 3))
    }

    fn load_components(&self, pool: &mut MatrixPool, force: &Force) -> Result<DenseMatrix> {
        Ok(column_vector(pool, &[force.fx, force.fy, force.fz]))
    }

    fn n_max_order(&self) -> [usize; 3] {
        [1, 1, 1]
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

    /// For a solid the generalized internal force is the stress itself.
    fn stress_at(&self, pool: &mut MatrixPool, displacements: &[Displacement], iso: IsoPoint) -> Result<DenseMatrix> {
        self.internal_force_at(pool, displacements, iso)
    }
}
