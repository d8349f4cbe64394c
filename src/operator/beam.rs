use super::{check_line_coordinate, column_vector, diagonal_matrix, scalar_matrix, ElementOperator, OperatorKind};
use crate::dense::DenseMatrix;
use crate::element::BarElement;
use crate::error::{Error, Result};
use crate::integrate::{Domain, IsoPoint};
use crate::model::{Dof, ElementDof, Force, TransformationManager};
use crate::polynomial::{Condition, Polynomial};
use crate::pool::MatrixPool;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Plane of bending of an Euler-Bernoulli beam.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamDirection {
    /// Deflection along local z, rotation about local y ($\theta_y = -\mathrm{d}w/\mathrm{d}x$),
    /// stiffness $E I_y$.
    Y,
    /// Deflection along local y, rotation about local z ($\theta_z = \mathrm{d}w/\mathrm{d}x$),
    /// stiffness $E I_z$.
    Z,
}

impl BeamDirection {
    /// The translational and rotational dof of the bending plane.
    pub fn dofs(&self) -> (Dof, Dof) {
        match self {
            BeamDirection::Y => (Dof::Dz, Dof::Ry),
            BeamDirection::Z => (Dof::Dy, Dof::Rz),
        }
    }

    /// Sign relating the nodal rotation to the slope $\mathrm{d}w/\mathrm{d}x$.
    fn rotation_sign(&self) -> f64 {
        match self {
            BeamDirection::Y => -1.0,
            BeamDirection::Z => 1.0,
        }
    }
}

/// Two-node Euler-Bernoulli beam with cubic Hermite interpolation.
///
/// Shape functions are solved from end conditions rather than taken in closed form, so that end
/// releases are handled exactly: a released rotation replaces the slope condition at that end
/// by $w'' = 0$ (zero moment), a released deflection replaces the value condition by
/// $w''' = 0$ (zero shear). Released dofs get a zero column. Combinations that leave the beam
/// kinematically unstable fail with [`Error::Singular`].
#[derive(Debug)]
pub struct EulerBernoulliBeamOperator<'a> {
    element: &'a BarElement,
    direction: BeamDirection,
    shape: OnceLock<Vec<Polynomial>>,
}

impl<'a> EulerBernoulliBeamOperator<'a> {
    pub fn new(element: &'a BarElement, direction: BeamDirection) -> Result<Self> {
        if element.node_count() != 2 {
            return Err(Error::InvalidElement(format!(
                "Euler-Bernoulli beams have two nodes, got {}",
                element.node_count()
            )));
        }
        Ok(Self {
            element,
            direction,
            shape: OnceLock::new(),
        })
    }

    pub fn direction(&self) -> BeamDirection {
        self.direction
    }

    /// $\mathrm{d}x / \mathrm{d}\xi$.
    fn jacobian(&self) -> f64 {
        0.5 * self.element.length()
    }

    fn is_released(&self, node: usize, dof: Dof) -> bool {
        self.element.releases()[node].is_released(dof)
    }

    /// Shape functions of $w(\xi)$ in dof order. Rotation columns are scaled so that they carry
    /// a unit nodal rotation.
    pub fn shape_functions(&self) -> Result<&[Polynomial]> {
        if let Some(shape) = self.shape.get() {
            return Ok(shape);
        }
        let shape = self.solve_shape_functions()?;
        Ok(self.shape.get_or_init(|| shape))
    }

    fn solve_shape_functions(&self) -> Result<Vec<Polynomial>> {
        let (deflection, rotation) = self.direction.dofs();
        let ends = [-1.0, 1.0];
        let mut functions = Vec::with_capacity(4);

        for node in 0..2 {
            for dof in [deflection, rotation] {
                if self.is_released(node, dof) {
                    functions.push(Polynomial::zero());
                    continue;
                }

                let target = |end: usize, d: Dof| if end == node && d == dof { 1.0 } else { 0.0 };
                let mut conditions = Vec::with_capacity(4);
                for (end, &x) in ends.iter().enumerate() {
                    conditions.push(if self.is_released(end, deflection) {
                        Condition::derivative(x, 3, 0.0)
                    } else {
                        Condition::value(x, target(end, deflection))
                    });
                    conditions.push(if self.is_released(end, rotation) {
                        Condition::derivative(x, 2, 0.0)
                    } else {
                        Condition::derivative(x, 1, target(end, rotation))
                    });
                }

                let polynomial = Polynomial::from_conditions(&conditions)?;
                functions.push(if dof == rotation {
                    polynomial.scaled(self.direction.rotation_sign() * self.jacobian())
                } else {
                    polynomial
                });
            }
        }

        Ok(functions)
    }
}

impl ElementOperator for EulerBernoulliBeamOperator<'_> {
    fn name(&self) -> &'static str {
        match self.direction {
            BeamDirection::Y => "Euler-Bernoulli beam (y)",
            BeamDirection::Z => "Euler-Bernoulli beam (z)",
        }
    }

    fn dof_order(&self) -> Vec<ElementDof> {
        let (deflection, rotation) = self.direction.dofs();
        vec![
            ElementDof::new(0, deflection),
            ElementDof::new(0, rotation),
            ElementDof::new(1, deflection),
            ElementDof::new(1, rotation),
        ]
    }

    fn node_count(&self) -> usize {
        2
    }

    fn domain(&self) -> Domain {
        Domain::Line
    }

    fn transformation(&self) -> TransformationManager {
        self.element.transformation()
    }

    fn supports(&self, _kind: OperatorKind) -> bool {
        true
    }

    /// Rows are the derivatives of order 0 to 3 with respect to $\xi$.
    fn n_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        let shape = self.shape_functions()?;
        let mut n = DenseMatrix::from_pool(pool, 4, 4);
        for (j, polynomial) in shape.iter().enumerate() {
            for k in 0..4 {
                n[(k, j)] = polynomial.evaluate_derivative(k, iso.xi);
            }
        }
        Ok(n)
    }

    /// Curvature $\mathrm{d}^2 w / \mathrm{d}x^2$.
    fn b_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        let shape = self.shape_functions()?;
        let j = self.jacobian();
        let mut b = DenseMatrix::from_pool(pool, 1, 4);
        for (k, polynomial) in shape.iter().enumerate() {
            b[(0, k)] = polynomial.evaluate_derivative(2, iso.xi) / (j * j);
        }
        Ok(b)
    }

    fn d_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let e = self.element.material().properties_at(iso).ex;
        let section = self.element.section().properties_at(iso);
        let i = match self.direction {
            BeamDirection::Y => section.iy,
            BeamDirection::Z => section.iz,
        };
        Ok(scalar_matrix(pool, e * i))
    }

    fn j_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        Ok(scalar_matrix(pool, self.jacobian()))
    }

    /// Translational inertia only; rotary inertia of the section is neglected.
    fn rho_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let rho = self.element.material().properties_at(iso).rho;
        let a = self.element.section().properties_at(iso).a;
        Ok(diagonal_matrix(pool, &[rho * a, 0.0]))
    }

    fn mu_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        let mu = self.element.material().properties_at(iso).mu;
        let a = self.element.section().properties_at(iso).a;
        Ok(diagonal_matrix(pool, &[mu * a, 0.0]))
    }

    /// Rows: deflection and section rotation.
    fn interpolation_matrix_at(&self, pool: &mut MatrixPool, iso: IsoPoint) -> Result<DenseMatrix> {
        check_line_coordinate(iso.xi)?;
        let shape = self.shape_functions()?;
        let factor = self.direction.rotation_sign() / self.jacobian();
        let mut h = DenseMatrix::from_pool(pool, 2, 4);
        for (k, polynomial) in shape.iter().enumerate() {
            h[(0, k)] = polynomial.evaluate(iso.xi);
            h[(1, k)] = factor * polynomial.evaluate_derivative(1, iso.xi);
        }
        Ok(h)
    }

    fn load_components(&self, pool: &mut MatrixPool, force: &Force) -> Result<DenseMatrix> {
        let (deflection, rotation) = self.direction.dofs();
        Ok(column_vector(pool, &[force.component(deflection), force.component(rotation)]))
    }

    fn n_max_order(&self) -> [usize; 3] {
        [3, 0, 0]
    }

    fn b_max_order(&self) -> [usize; 3] {
        [1, 0, 0]
    }

    fn det_j_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }

    fn material_order(&self) -> [usize; 3] {
        self.element.material().max_function_order()
    }

    fn section_order(&self) -> [usize; 3] {
        self.element.section().max_function_order()
    }
}
