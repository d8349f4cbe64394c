use crate::unit_tests::into_dmatrix;
use isofem::element::{MembraneBehaviour, QuadrilateralElement, TriangleElement};
use isofem::integrate::IsoPoint;
use isofem::load::ElementLoad;
use isofem::material::{MaterialProperties, UniformIsotropicMaterial};
use isofem::model::{CoordinationSystem, Displacement};
use isofem::operator::{
    plane_strain_matrix, plane_stress_matrix, CstOperator, ElementOperator, QuadMembraneOperator,
};
use isofem::pool::MatrixPool;
use isofem::section::UniformThickness;
use isofem::Error;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{dmatrix, DMatrix, DVector, Matrix3, Point3, Vector3};
use std::sync::Arc;
use util::relative_residual;

const E: f64 = 210e9;
const NU: f64 = 0.3;
const T: f64 = 0.01;
const RHO: f64 = 7850.0;

fn material() -> Arc<UniformIsotropicMaterial> {
    Arc::new(UniformIsotropicMaterial::new(E, NU).with_mass_density(RHO))
}

fn unit_triangle() -> TriangleElement {
    TriangleElement::new(
        [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        material(),
        Arc::new(UniformThickness(T)),
    )
}

fn rectangle(width: f64, height: f64) -> QuadrilateralElement {
    QuadrilateralElement::new(
        [
            Point3::origin(),
            Point3::new(width, 0.0, 0.0),
            Point3::new(width, height, 0.0),
            Point3::new(0.0, height, 0.0),
        ],
        material(),
        Arc::new(UniformThickness(T)),
    )
}

fn to_dmatrix(c: &Matrix3<f64>) -> DMatrix<f64> {
    DMatrix::from_iterator(3, 3, c.iter().copied())
}

/// Strain-displacement matrix of the unit right triangle.
fn unit_triangle_b() -> DMatrix<f64> {
    dmatrix![
        -1.0, 0.0, 1.0, 0.0, 0.0, 0.0;
        0.0, -1.0, 0.0, 0.0, 0.0, 1.0;
        -1.0, -1.0, 0.0, 1.0, 1.0, 0.0
    ]
}

fn properties() -> MaterialProperties {
    MaterialProperties::isotropic(E, NU, RHO, 0.0)
}

#[test]
fn cst_plane_stress_stiffness() {
    let element = unit_triangle();
    let operator = CstOperator::new(&element);
    let mut pool = MatrixPool::new();
    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);

    let b = unit_triangle_b();
    let c = to_dmatrix(&plane_stress_matrix(&properties()));
    let expected = b.transpose() * c * &b * (0.5 * T);
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-3);

    let translation = DVector::from_column_slice(&[1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    assert!(relative_residual(&k, &translation) <= 1e-12);
}

#[test]
fn cst_plane_strain_stiffness() {
    let element = unit_triangle().with_behaviour(MembraneBehaviour::PlaneStrain);
    let operator = CstOperator::new(&element);
    let mut pool = MatrixPool::new();
    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);

    let b = unit_triangle_b();
    let c = to_dmatrix(&plane_strain_matrix(&properties()).unwrap());
    let expected = b.transpose() * c * &b * (0.5 * T);
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-3);

    // Plane strain is stiffer than plane stress in the normal directions
    let plane_stress = CstOperator::new(&unit_triangle())
        .local_stiffness_matrix(&mut pool)
        .unwrap();
    assert!(k[(0, 0)] > plane_stress[(0, 0)]);
}

#[test]
fn cst_stress_under_uniform_strain() {
    let element = unit_triangle();
    let operator = CstOperator::new(&element);
    let mut pool = MatrixPool::new();
    let strain = 1e-4;
    // u_x = strain * x
    let displacements = [
        Displacement::default(),
        Displacement::new(strain, 0.0, 0.0, 0.0, 0.0, 0.0),
        Displacement::default(),
    ];

    let stress = operator
        .stress_at(&mut pool, &displacements, IsoPoint::planar(1.0 / 3.0, 1.0 / 3.0))
        .unwrap();
    let factor = E / (1.0 - NU * NU);
    assert_scalar_eq!(stress[(0, 0)], factor * strain, comp = abs, tol = 1e-3);
    assert_scalar_eq!(stress[(1, 0)], factor * NU * strain, comp = abs, tol = 1e-3);
    assert_scalar_eq!(stress[(2, 0)], 0.0, comp = abs, tol = 1e-3);

    // The stress resultant carries the thickness
    let force = operator
        .internal_force_at(&mut pool, &displacements, IsoPoint::planar(0.2, 0.1))
        .unwrap();
    assert_scalar_eq!(force[(0, 0)], factor * strain * T, comp = abs, tol = 1e-6);
}

#[test]
fn cst_mass_of_translation_is_total_mass() {
    let element = unit_triangle();
    let operator = CstOperator::new(&element);
    let mut pool = MatrixPool::new();
    let m = into_dmatrix(operator.local_mass_matrix(&mut pool).unwrap(), &mut pool);

    let translation = DVector::from_column_slice(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    let total = translation.dot(&(&m * &translation));
    assert_scalar_eq!(total, RHO * T * 0.5, comp = abs, tol = 1e-10);

    // Consistent mass: twice the coupling on the diagonal
    assert_scalar_eq!(m[(0, 0)], 2.0 * m[(0, 2)], comp = abs, tol = 1e-10);
}

#[test]
fn degenerate_triangle_is_singular() {
    let element = TriangleElement::new(
        [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
        material(),
        Arc::new(UniformThickness(T)),
    );
    let operator = CstOperator::new(&element);
    let mut pool = MatrixPool::new();
    assert!(matches!(
        operator.local_stiffness_matrix(&mut pool),
        Err(Error::Singular { .. })
    ));
}

#[test]
fn cst_uniform_load_is_shared_equally() {
    let element = unit_triangle();
    let operator = CstOperator::new(&element);
    let mut pool = MatrixPool::new();
    let q = 6.0;

    // The out-of-plane part of the direction does not act on a membrane
    let load = ElementLoad::uniform(Vector3::new(1.0, 0.0, 1.0), q * 2f64.sqrt(), CoordinationSystem::Global);
    let forces = operator.equivalent_nodal_loads(&mut pool, &load).unwrap();
    assert_eq!(forces.len(), 3);
    for force in &forces {
        assert_scalar_eq!(force.fx, q * 0.5 / 3.0, comp = abs, tol = 1e-12);
        assert_eq!(force.fz, 0.0);
    }
}

#[test]
fn q4_square_stiffness_entries() {
    let element = rectangle(1.0, 1.0);
    let operator = QuadMembraneOperator::new(&element);
    let mut pool = MatrixPool::new();
    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
    let factor = E * T / (1.0 - NU * NU);

    assert_scalar_eq!(k[(0, 0)], factor * (0.5 - NU / 6.0), comp = abs, tol = 1e-3);
    assert_scalar_eq!(k[(0, 1)], factor * (1.0 + NU) / 8.0, comp = abs, tol = 1e-3);
    assert_scalar_eq!(k[(0, 2)], factor * (-0.25 - NU / 12.0), comp = abs, tol = 1e-3);
}

#[test]
fn q4_passes_the_constant_strain_patch_test() {
    let element = rectangle(2.0, 1.0);
    let operator = QuadMembraneOperator::new(&element);
    let mut pool = MatrixPool::new();
    let (ex, ey, gxy) = (1e-4, -2e-5, 3e-5);

    // u = ex x + gxy y / 2, v = ey y + gxy x / 2
    let displacements = element.local_nodes().map(|p| {
        Displacement::new(ex * p.x + 0.5 * gxy * p.y, ey * p.y + 0.5 * gxy * p.x, 0.0, 0.0, 0.0, 0.0)
    });
    let expected = plane_stress_matrix(&properties()) * Vector3::new(ex, ey, gxy);
    for iso in [IsoPoint::planar(-0.7, 0.2), IsoPoint::planar(0.5, 0.9)] {
        let stress = operator.stress_at(&mut pool, &displacements, iso).unwrap();
        for i in 0..3 {
            assert_scalar_eq!(stress[(i, 0)], expected[i], comp = abs, tol = 1e-3);
        }
    }
}

#[test]
fn q4_mass_and_uniform_load() {
    let (width, height) = (2.0, 1.5);
    let element = rectangle(width, height);
    let operator = QuadMembraneOperator::new(&element);
    let mut pool = MatrixPool::new();

    let m = into_dmatrix(operator.local_mass_matrix(&mut pool).unwrap(), &mut pool);
    let translation = DVector::from_fn(8, |i, _| if i % 2 == 0 { 1.0 } else { 0.0 });
    let total = translation.dot(&(&m * &translation));
    assert_scalar_eq!(total, RHO * T * width * height, comp = abs, tol = 1e-9);

    let load = ElementLoad::uniform(Vector3::y(), 4.0, CoordinationSystem::Local);
    let forces = operator.equivalent_nodal_loads(&mut pool, &load).unwrap();
    for force in &forces {
        assert_scalar_eq!(force.fy, width * height, comp = abs, tol = 1e-12);
        assert_eq!(force.fx, 0.0);
    }
}
