use super::lagrange::LagrangeBar;
use super::{check_line_coordinate, column_vector, scalar_matrix, ElementOperator, OperatorKind};
use crate::dense::DenseMatrix;
use crate::element::BarElement;
use crate::error::Result;
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Dof, ElementDof, Force, TransformationManager};
use crate::pool::MatrixPool;

/// Torsion of a bar about its axis, with stiffness $G J$ and $G = E / (2 (1 + \nu_{xy}))$.
///
/// The consistent mass uses the polar mass moment $\rho J$, not the translational $\rho A$.
#[derive(Debug)]
pub struct ShaftOperator<'a> {
    bar: LagrangeBar<'a>,
}

impl<'a> ShaftOperator<'a> {
    pub fn new(element: &'a BarElement) -> Self {
        Self {
            bar: LagrangeBar::new(element, Dof::Rx),
        }
    }

    pub fn element(&self) -> &BarElement {
        self.bar.element
    }
}

impl ElementOperator for ShaftOperator<'_> {
    fn name(&self) -> &'static str {
        "shaft"
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        (0..self.node_count())
            .map(|node| ElementDof::new(node, self.bar.dof))
            .collect()
    }

    fn node_count(&self) -> usize {
        self.bar.element.node_count()
    }

    fn domain(&self) -> Domain {
        Domain::Line
    }

    fn transformation(&self) -> TransformationManager {
        self.bar.element.transformation()
    }

    fn supports(&self, _kind: OperatorKind) -> bool {
        true
    }

    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        self.bar.n_matrix(pool, iso.xi)
    }

    fn b_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        self.bar.b_matrix(pool, iso.xi)
    }

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let material = self.element().material().properties_at(iso);
        let g = material.ex / (2.0 * (1.0 + material.nu_xy));
        let j = self.element().section().properties_at(iso).j;
        Ok(scalar_matrix(pool, g * j))
    }

    fn j_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        Ok(scalar_matrix(pool, self.bar.jacobian(iso.xi)?))
    }

    /// Polar mass moment per unit length, $\rho J$.
    fn rho_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let rho = self.element().material().properties_at(iso).rho;
        let j = self.element().section().properties_at(iso).j;
        Ok(scalar_matrix(pool, rho * j))
    }

    fn mu_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let mu = self.element().material().properties_at(iso).mu;
        let a = self.element().section().properties_at(iso).a;
        Ok(scalar_matrix(pool, mu * a))
    }

    fn interpolation_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        self.bar.interpolation_matrix(pool, iso.xi)
    }

    fn load_components(&self, pool: &mut MatrixPool, force: &Force) -> Result<DenseMatrix> {
        Ok(column_vector(pool, &[force.mx]))
    }

    fn n_max_order(&self) -> [usize; 3] {
        self.bar.n_max_order()
    }

    fn b_max_order(&self) -> [usize; 3] {
        self.bar.b_max_order()
    }

    fn det_j_order(&self) -> [usize; 3] {
        self.bar.det_j_order()
    }

    fn material_order(&self) -> [usize; 3] {
        self.element().material().max_function_order()
    }

    fn section_order(&self) -> [usize; 3] {
        self.element().section().max_function_order()
    }
}
