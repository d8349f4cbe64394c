//! Element operator strategies.
//!
//! An [`ElementOperator`] describes one element formulation: its degrees of freedom, the
//! shape-function ($N$), strain-displacement ($B$), constitutive ($D$) and Jacobian ($J$)
//! matrices at a parametric point, and polynomial-degree bounds for each of them. The operator
//! assembler (see [`crate::assembly`]) combines these into local stiffness, mass and damping
//! matrices and equivalent nodal loads.
//!
//! All matrices are expressed in the element's local frame. Nodal displacements passed to the
//! post-processing methods are local as well; use the element's transformation to convert from
//! global displacements.
//!
//! Operators only implement the matrices that their formulation defines. Everything else fails
//! with [`Error::NotImplemented`], and [`ElementOperator::supports`] reports up front which
//! operator kinds are available.

use crate::assembly;
use crate::dense::DenseMatrix;
use crate::error::{Error, Result};
use crate::integrate::{Domain, IsoPoint};
use crate::load::ElementLoad;
use crate::model::{Displacement, ElementDof, Force, TransformationManager};
use crate::pool::MatrixPool;
use serde::{Deserialize, Serialize};

mod beam;
mod constitutive;
mod cst;
mod dkq;
mod dkt;
mod drilling;
mod lagrange;
mod quad_membrane;
mod shaft;
mod tetrahedron;
mod truss;

pub use beam::{BeamDirection, EulerBernoulliBeamOperator};
pub use constitutive::{plane_strain_matrix, plane_stress_matrix, plate_bending_matrix, solid_matrix};
pub use cst::CstOperator;
pub use dkq::DkqOperator;
pub use dkt::DktOperator;
pub use drilling::{DrillingOperator, DRILLING_STIFFNESS};
pub use quad_membrane::QuadMembraneOperator;
pub use shaft::ShaftOperator;
pub use tetrahedron::TetrahedronOperator;
pub use truss::TrussOperator;

/// The element matrices an operator may be able to produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    Stiffness,
    Mass,
    Damping,
}

/// One element formulation evaluated on one element.
///
/// Degree bounds are per parametric axis $(\xi, \eta, \gamma)$. On simplex domains they are read
/// as bounds on the total degree.
pub trait ElementOperator: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Meaning of each row/column of the local matrices.
    fn dof_order(&self) -> Vec<ElementDof>;

    fn node_count(&self) -> usize;

    /// Reference cell that the element is integrated over.
    fn domain(&self) -> Domain;

    fn transformation(&self) -> TransformationManager;

    /// Whether [`local_matrix`](Self::local_matrix) is defined for `kind`.
    fn supports(&self, kind: OperatorKind) -> bool {
        kind == OperatorKind::Stiffness
    }

    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix>;

    fn b_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix>;

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix>;

    /// Jacobian of the map from parametric to local physical coordinates.
    fn j_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix>;

    /// Mass density matrix acting on the rows of the interpolation matrix.
    fn rho_matrix_at(&self, _pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(Error::not_implemented(self.name(), "mass density matrix"))
    }

    /// Damping density matrix acting on the rows of the interpolation matrix.
    fn mu_matrix_at(&self, _pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(Error::not_implemented(self.name(), "damping density matrix"))
    }

    /// Interpolation matrix $H$ mapping the local dof vector to the displacement field at `iso`.
    ///
    /// $H$ is used for consistent mass and damping matrices, equivalent nodal loads and
    /// displacement interpolation.
    fn interpolation_matrix_at(&self, _pool: &mut MatrixPool, _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(Error::not_implemented(self.name(), "interpolation matrix"))
    }

    /// The components of a (local) force that act on the rows of the interpolation matrix, as a
    /// column vector.
    fn load_components(&self, _pool: &mut MatrixPool, _force: &Force) -> Result<DenseMatrix> {
        Err(Error::not_implemented(self.name(), "equivalent nodal loads"))
    }

    fn n_max_order(&self) -> [usize; 3];

    fn b_max_order(&self) -> [usize; 3];

    fn det_j_order(&self) -> [usize; 3];

    fn material_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }

    fn section_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }

    /// The local matrix of the given kind.
    fn local_matrix(&self, pool: &mut MatrixPool, kind: OperatorKind) -> Result<DenseMatrix> {
        assembly::local_matrix(self, pool, kind)
    }

    fn local_stiffness_matrix(&self, pool: &mut MatrixPool) -> Result<DenseMatrix> {
        self.local_matrix(pool, OperatorKind::Stiffness)
    }

    fn local_mass_matrix(&self, pool: &mut MatrixPool) -> Result<DenseMatrix> {
        self.local_matrix(pool, OperatorKind::Mass)
    }

    fn local_damp_matrix(&self, pool: &mut MatrixPool) -> Result<DenseMatrix> {
        self.local_matrix(pool, OperatorKind::Damping)
    }

    /// Generalized internal force $D B u$ at `iso` for local nodal displacements.
    #[allow(non_snake_case)]
    fn internal_force_at(
        &self,
        pool: &mut MatrixPool,
        displacements: &[Displacement],
        iso: IsoPoint,
    ) -> Result<DenseMatrix> {
        let u = local_dof_vector(self, pool, displacements)?;
        let B = self.b_matrix_at(pool, iso)?;
        let D = self.d_matrix_at(pool, iso)?;
        let strain = B.multiply_pooled(&u, pool)?;
        let force = D.multiply_pooled(&strain, pool)?;
        for matrix in [u, B, D, strain] {
            matrix.return_to_pool(pool)?;
        }
        Ok(force)
    }

    /// Interpolated local displacement field $H u$ at `iso`.
    #[allow(non_snake_case)]
    fn displacement_at(
        &self,
        pool: &mut MatrixPool,
        displacements: &[Displacement],
        iso: IsoPoint,
    ) -> Result<DenseMatrix> {
        let u = local_dof_vector(self, pool, displacements)?;
        let H = self.interpolation_matrix_at(pool, iso)?;
        let field = H.multiply_pooled(&u, pool)?;
        u.return_to_pool(pool)?;
        H.return_to_pool(pool)?;
        Ok(field)
    }

    /// Stress (not stress resultant) at `iso` for local nodal displacements.
    fn stress_at(&self, _pool: &mut MatrixPool, _displacements: &[Displacement], _iso: IsoPoint) -> Result<DenseMatrix> {
        Err(Error::not_implemented(self.name(), "stress"))
    }

    /// Local nodal forces equivalent to `load`, one per element node.
    fn equivalent_nodal_loads(&self, pool: &mut MatrixPool, load: &ElementLoad) -> Result<Vec<Force>> {
        assembly::equivalent_nodal_loads(self, pool, load)
    }
}

/// Gathers local nodal displacements into a column vector following the operator's dof order.
pub fn local_dof_vector<O>(operator: &O, pool: &mut MatrixPool, displacements: &[Displacement]) -> Result<DenseMatrix>
where
    O: ElementOperator + ?Sized,
{
    if displacements.len() != operator.node_count() {
        return Err(Error::InvalidArgument(format!(
            "{} expects {} nodal displacements, got {}",
            operator.name(),
            operator.node_count(),
            displacements.len()
        )));
    }
    let dofs = operator.dof_order();
    let mut u = DenseMatrix::from_pool(pool, dofs.len(), 1);
    for (i, dof) in dofs.iter().enumerate() {
        u[(i, 0)] = displacements[dof.node].component(dof.dof);
    }
    Ok(u)
}

/// Fails unless `xi` lies in $[-1, 1]$.
pub(crate) fn check_line_coordinate(xi: f64) -> Result<()> {
    if (-1.0..=1.0).contains(&xi) {
        Ok(())
    } else {
        Err(Error::ParametricCoordinateOutOfRange { axis: "xi", value: xi })
    }
}

/// A `1 x 1` pooled matrix.
pub(crate) fn scalar_matrix(pool: &mut MatrixPool, value: f64) -> DenseMatrix {
    let mut matrix = DenseMatrix::from_pool(pool, 1, 1);
    matrix[(0, 0)] = value;
    matrix
}

/// A pooled `n x n` diagonal matrix.
pub(crate) fn diagonal_matrix(pool: &mut MatrixPool, diagonal: &[f64]) -> DenseMatrix {
    let n = diagonal.len();
    let mut matrix = DenseMatrix::from_pool(pool, n, n);
    for (i, &d) in diagonal.iter().enumerate() {
        matrix[(i, i)] = d;
    }
    matrix
}

/// A pooled column vector.
pub(crate) fn column_vector(pool: &mut MatrixPool, entries: &[f64]) -> DenseMatrix {
    let mut matrix = DenseMatrix::from_pool(pool, entries.len(), 1);
    matrix.as_mut_slice().copy_from_slice(entries);
    matrix
}

/// Interpolation matrix for `components` displacement components, each interpolated with the
/// same scalar shape functions `n`: entry `(c, c + components * i)` is `n[i]`.
pub(crate) fn vector_interpolation_matrix(pool: &mut MatrixPool, n: &[f64], components: usize) -> DenseMatrix {
    let mut matrix = DenseMatrix::from_pool(pool, components, components * n.len());
    for (i, &ni) in n.iter().enumerate() {
        for c in 0..components {
            matrix[(c, components * i + c)] = ni;
        }
    }
    matrix
}
