//! Integration of element operators into local matrices and equivalent nodal loads.
//!
//! The assembler derives the number of Gauss points per axis from the degree bounds reported by
//! an operator, so that every integrand is integrated exactly:
//!
//! - stiffness, $\int B^T D B \\, |\det J|$, has degree $2 b + m + s + j$ per axis,
//! - mass and damping, $\int H^T \rho H \\, |\det J|$, have degree $2 n + m + s + j$,
//! - uniform loads, $\int H^T q \\, |\det J|$, have degree $n + j$,
//!
//! where $b$, $n$, $m$, $s$ and $j$ are the bounds for $B$, $N$, material, section and
//! $\det J$. See [`Domain::points_for`](crate::integrate::Domain::points_for) for how degrees map
//! to point counts on each reference cell.

use crate::dense::DenseMatrix;
use crate::error::{Error, Result};
use crate::integrate::IsoPoint;
use crate::load::ElementLoad;
use crate::model::{ElementDof, Force};
use crate::operator::{ElementOperator, OperatorKind};
use crate::pool::{with_thread_local_pool, MatrixPool};
use eyre::eyre;
use itertools::izip;
use log::debug;
use nalgebra::DMatrixSliceMut;
use rayon::prelude::*;

fn kind_description(kind: OperatorKind) -> &'static str {
    match kind {
        OperatorKind::Stiffness => "stiffness matrix",
        OperatorKind::Mass => "mass matrix",
        OperatorKind::Damping => "damping matrix",
    }
}

/// Per-axis degree of an integrand made of a squared field term times the given factors.
fn integrand_degrees(squared: [usize; 3], factors: &[[usize; 3]]) -> [usize; 3] {
    let mut degrees = squared.map(|d| 2 * d);
    for factor in factors {
        for (degree, d) in izip!(&mut degrees, factor) {
            *degree += d;
        }
    }
    degrees
}

fn jacobian_determinant<O>(operator: &O, pool: &mut MatrixPool, iso: IsoPoint) -> Result<f64>
where
    O: ElementOperator + ?Sized,
{
    let j = operator.j_matrix_at(pool, iso)?;
    let det = j.determinant();
    j.return_to_pool(pool)?;
    det
}

/// Computes the local matrix of the given kind by integrating over the operator's domain.
///
/// Operators that do not support `kind` are rejected with [`Error::NotImplemented`] before any
/// evaluation. The result is rented from `pool`.
pub fn local_matrix<O>(operator: &O, pool: &mut MatrixPool, kind: OperatorKind) -> Result<DenseMatrix>
where
    O: ElementOperator + ?Sized,
{
    if !operator.supports(kind) {
        return Err(Error::not_implemented(operator.name(), kind_description(kind)));
    }
    match kind {
        OperatorKind::Stiffness => stiffness_matrix(operator, pool),
        OperatorKind::Mass => property_matrix(operator, pool, kind, |pool, iso| operator.rho_matrix_at(pool, iso)),
        OperatorKind::Damping => property_matrix(operator, pool, kind, |pool, iso| operator.mu_matrix_at(pool, iso)),
    }
}

#[allow(non_snake_case)]
fn stiffness_matrix<O>(operator: &O, pool: &mut MatrixPool) -> Result<DenseMatrix>
where
    O: ElementOperator + ?Sized,
{
    let degrees = integrand_degrees(
        operator.b_max_order(),
        &[
            operator.material_order(),
            operator.section_order(),
            operator.det_j_order(),
        ],
    );
    let integrator = operator.domain().integrator(degrees);
    debug!(
        "Integrating {} stiffness with degrees {:?} using {:?} Gauss points",
        operator.name(),
        degrees,
        integrator.points()
    );

    integrator.integrate(pool, |pool, iso| {
        let det_j = jacobian_determinant(operator, pool, iso)?;
        let B = operator.b_matrix_at(pool, iso)?;
        let D = operator.d_matrix_at(pool, iso)?;
        let mut K = DenseMatrix::bt_d_b_pooled(&B, &D, pool)?;
        B.return_to_pool(pool)?;
        D.return_to_pool(pool)?;
        K.scale_mut(det_j.abs());
        Ok(K)
    })
}

/// Consistent mass or damping matrix, $\int H^T P H \\, |\det J|$ for the density matrix $P$.
#[allow(non_snake_case)]
fn property_matrix<O, F>(operator: &O, pool: &mut MatrixPool, kind: OperatorKind, density: F) -> Result<DenseMatrix>
where
    O: ElementOperator + ?Sized,
    F: Fn(&mut MatrixPool, IsoPoint) -> Result<DenseMatrix>,
{
    let degrees = integrand_degrees(
        operator.n_max_order(),
        &[
            operator.material_order(),
            operator.section_order(),
            operator.det_j_order(),
        ],
    );
    let integrator = operator.domain().integrator(degrees);
    debug!(
        "Integrating {} {} with degrees {:?} using {:?} Gauss points",
        operator.name(),
        kind_description(kind),
        degrees,
        integrator.points()
    );

    integrator.integrate(pool, |pool, iso| {
        let det_j = jacobian_determinant(operator, pool, iso)?;
        let H = operator.interpolation_matrix_at(pool, iso)?;
        let P = density(pool, iso)?;
        let mut M = DenseMatrix::bt_d_b_pooled(&H, &P, pool)?;
        H.return_to_pool(pool)?;
        P.return_to_pool(pool)?;
        M.scale_mut(det_j.abs());
        Ok(M)
    })
}

/// Local nodal forces equivalent to an element load, one entry per element node.
///
/// Global load directions are rotated into the element frame first. A uniform load is
/// integrated as $\int H^T q \\, |\det J|$; a concentrated load contributes $H(\xi)^T q$ at its
/// parametric location.
#[allow(non_snake_case)]
pub fn equivalent_nodal_loads<O>(operator: &O, pool: &mut MatrixPool, load: &ElementLoad) -> Result<Vec<Force>>
where
    O: ElementOperator + ?Sized,
{
    let local_force = load.local_force(&operator.transformation());
    let q = operator.load_components(pool, &local_force)?;

    let f = match load {
        ElementLoad::Uniform { .. } => {
            let degrees = integrand_degrees([0, 0, 0], &[operator.n_max_order(), operator.det_j_order()]);
            let integrator = operator.domain().integrator(degrees);
            debug!(
                "Integrating {} uniform load with degrees {:?} using {:?} Gauss points",
                operator.name(),
                degrees,
                integrator.points()
            );
            integrator.integrate(pool, |pool, iso| {
                let det_j = jacobian_determinant(operator, pool, iso)?;
                let H = operator.interpolation_matrix_at(pool, iso)?;
                let mut f = H.transpose_multiply_pooled(&q, pool)?;
                H.return_to_pool(pool)?;
                f.scale_mut(det_j.abs());
                Ok(f)
            })?
        }
        ElementLoad::Concentrated { location, .. } => {
            let H = operator.interpolation_matrix_at(pool, *location)?;
            let f = H.transpose_multiply_pooled(&q, pool)?;
            H.return_to_pool(pool)?;
            f
        }
    };
    q.return_to_pool(pool)?;

    let mut forces = vec![Force::default(); operator.node_count()];
    for (dof, &value) in operator.dof_order().iter().zip(f.as_slice()) {
        *forces[dof.node].component_mut(dof.dof) += value;
    }
    f.return_to_pool(pool)?;
    Ok(forces)
}

/// Assembles dense element matrices for a collection of elements.
///
/// This is the interface consumed by global (sparse) assemblers.
pub trait ElementMatrixAssembler {
    fn num_elements(&self) -> usize;

    /// Meaning of the rows and columns of the matrix of element `element_index`.
    fn element_dofs(&self, element_index: usize) -> Vec<ElementDof>;

    fn assemble_element_matrix_into(&self, element_index: usize, output: DMatrixSliceMut<f64>) -> eyre::Result<()>;
}

/// Element matrix assembler for a slice of element operators, producing local matrices of one
/// kind. Matrices are computed with the calling thread's pool.
///
/// Every element matrix borrows the pool through [`with_thread_local_pool`], so the assembler
/// must not be driven from inside a `with_thread_local_pool` closure on the same thread.
#[derive(Debug)]
pub struct LocalOperatorAssembler<'a, O> {
    operators: &'a [O],
    kind: OperatorKind,
}

impl<'a, O> LocalOperatorAssembler<'a, O> {
    pub fn new(operators: &'a [O], kind: OperatorKind) -> Self {
        Self { operators, kind }
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }
}

impl<'a, O: ElementOperator> ElementMatrixAssembler for LocalOperatorAssembler<'a, O> {
    fn num_elements(&self) -> usize {
        self.operators.len()
    }

    fn element_dofs(&self, element_index: usize) -> Vec<ElementDof> {
        self.operators[element_index].dof_order()
    }

    fn assemble_element_matrix_into(&self, element_index: usize, mut output: DMatrixSliceMut<f64>) -> eyre::Result<()> {
        let operator = self
            .operators
            .get(element_index)
            .ok_or_else(|| eyre!("element index {element_index} out of bounds ({} elements)", self.operators.len()))?;

        with_thread_local_pool(|pool| {
            let matrix = operator.local_matrix(pool, self.kind)?;
            if output.shape() != matrix.shape() {
                let shape = matrix.shape();
                matrix.return_to_pool(pool)?;
                return Err(eyre!(
                    "output has shape {:?}, but the {} {} has shape {:?}",
                    output.shape(),
                    operator.name(),
                    kind_description(self.kind),
                    shape
                ));
            }
            for j in 0..matrix.ncols() {
                for i in 0..matrix.nrows() {
                    output[(i, j)] = matrix[(i, j)];
                }
            }
            matrix.return_to_pool(pool)?;
            Ok(())
        })
    }
}

/// Computes the local matrices of many elements in parallel.
///
/// Each rayon worker rents from its own thread-local pool; the returned matrices are unpooled.
pub fn par_local_matrices<O: ElementOperator>(operators: &[O], kind: OperatorKind) -> Result<Vec<DenseMatrix>> {
    operators
        .par_iter()
        .map(|operator| {
            with_thread_local_pool(|pool| {
                let matrix = operator.local_matrix(pool, kind)?;
                let detached = matrix.clone();
                matrix.return_to_pool(pool)?;
                Ok(detached)
            })
        })
        .collect()
}
