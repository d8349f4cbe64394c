use super::{diagonal_matrix, ElementOperator, OperatorKind};
use crate::dense::DenseMatrix;
use crate::element::QuadrilateralElement;
use crate::error::{Error, Result};
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Dof, ElementDof, TransformationManager};
use crate::pool::MatrixPool;

/// Stiffness attached to each in-plane rotation dof.
pub const DRILLING_STIFFNESS: f64 = 1e3;

/// Artificial stiffness on the in-plane (drilling) rotations of a flat quadrilateral shell, so
/// that coplanar shell assemblies are not singular in $R_z$.
///
/// There is no field formulation behind it: only the stiffness matrix is defined.
#[derive(Debug)]
pub struct DrillingOperator<'a> {
    element: &'a QuadrilateralElement,
}

impl<'a> DrillingOperator<'a> {
    pub fn new(element: &'a QuadrilateralElement) -> Self {
        Self { element }
    }

    fn undefined(&self, matrix: &'static str) -> Error {
        Error::not_implemented(self.name(), matrix)
    }
}

impl ElementOperator for DrillingOperator<'_> {
    fn name(&self) -> &'static str {
        "drilling stabilisation"
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        (0..4).map(|node| ElementDof::new(node, Dof::Rz)).collect()
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

    fn supports(&self, kind: OperatorKind) -> bool {
        kind == OperatorKind::Stiffness
    }

    fn n_matrix_at(&self, _pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(self.undefined("shape function matrix"))
    }

    fn b_matrix_at(&self, _pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(self.undefined("strain-displacement matrix"))
    }

    fn d_matrix_at(&self, _pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(self.undefined("constitutive matrix"))
    }

    fn j_matrix_at(&self, _pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(self.undefined("Jacobian matrix"))
    }

    fn n_max_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }

    fn b_max_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }

    fn det_j_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }

    fn local_matrix(&self, pool: &mut MatrixPool, kind: OperatorKind) -> Result<DenseMatrix> {
        match kind {
            OperatorKind::Stiffness => Ok(diagonal_matrix(pool, &[DRILLING_STIFFNESS; 4])),
            OperatorKind::Mass => Err(self.undefined("mass matrix")),
            OperatorKind::Damping => Err(self.undefined("damping matrix")),
        }
    }
}
