use crate::unit_tests::into_dmatrix;
use isofem::element::BarElement;
use isofem::integrate::IsoPoint;
use isofem::load::ElementLoad;
use isofem::material::UniformIsotropicMaterial;
use isofem::model::{Constraint, CoordinationSystem, Displacement, Dof, DofConstraint, Force};
use isofem::operator::{BeamDirection, ElementOperator, EulerBernoulliBeamOperator, ShaftOperator, TrussOperator};
use isofem::pool::MatrixPool;
use isofem::section::{CrossSectionProperties, TaperedBarSection, UniformBarSection};
use isofem::Error;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{dmatrix, DVector, Point3, Vector3};
use std::sync::Arc;

const E: f64 = 200.0;
const NU: f64 = 0.25;
const RHO: f64 = 7.5;
const L: f64 = 2.0;

fn section() -> CrossSectionProperties {
    CrossSectionProperties::rectangle(0.5, 0.4)
}

fn material() -> Arc<UniformIsotropicMaterial> {
    Arc::new(UniformIsotropicMaterial::new(E, NU).with_mass_density(RHO).with_damping_density(0.5))
}

/// A bar along global x, so that local and global frames coincide.
fn bar_along_x() -> BarElement {
    BarElement::two_node(
        Point3::origin(),
        Point3::new(L, 0.0, 0.0),
        material(),
        Arc::new(UniformBarSection(section())),
    )
    .unwrap()
}

fn beam_stiffness(direction: BeamDirection) -> nalgebra::DMatrix<f64> {
    let i = match direction {
        BeamDirection::Y => section().iy,
        BeamDirection::Z => section().iz,
    };
    let s = match direction {
        BeamDirection::Y => -1.0,
        BeamDirection::Z => 1.0,
    };
    let k = E * i / L.powi(3);
    #[rustfmt::skip]
    let expected = dmatrix![
        12.0,        6.0 * L * s,  -12.0,       6.0 * L * s;
        6.0 * L * s, 4.0 * L * L,  -6.0 * L * s, 2.0 * L * L;
        -12.0,       -6.0 * L * s, 12.0,        -6.0 * L * s;
        6.0 * L * s, 2.0 * L * L,  -6.0 * L * s, 4.0 * L * L
    ];
    expected * k
}

#[test]
fn truss_stiffness_and_mass() {
    let element = bar_along_x();
    let operator = TrussOperator::new(&element);
    let mut pool = MatrixPool::new();
    let a = section().a;

    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
    let expected = dmatrix![1.0, -1.0; -1.0, 1.0] * (E * a / L);
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-12);

    let m = into_dmatrix(operator.local_mass_matrix(&mut pool).unwrap(), &mut pool);
    let expected = dmatrix![2.0, 1.0; 1.0, 2.0] * (RHO * a * L / 6.0);
    assert_matrix_eq!(m, expected, comp = abs, tol = 1e-12);
}

#[test]
fn three_node_truss_stiffness() {
    let element = BarElement::new(
        vec![Point3::origin(), Point3::new(0.5 * L, 0.0, 0.0), Point3::new(L, 0.0, 0.0)],
        material(),
        Arc::new(UniformBarSection(section())),
    )
    .unwrap();
    let operator = TrussOperator::new(&element);
    let mut pool = MatrixPool::new();

    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
    let expected = dmatrix![
        7.0, -8.0, 1.0;
        -8.0, 16.0, -8.0;
        1.0, -8.0, 7.0
    ] * (E * section().a / (3.0 * L));
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-10);
}

#[test]
fn tapered_truss_uses_average_area() {
    let start = CrossSectionProperties::rectangle(0.5, 0.4);
    let end = CrossSectionProperties::rectangle(0.5, 0.8);
    let element = BarElement::two_node(
        Point3::origin(),
        Point3::new(L, 0.0, 0.0),
        material(),
        Arc::new(TaperedBarSection { start, end }),
    )
    .unwrap();
    let operator = TrussOperator::new(&element);
    let mut pool = MatrixPool::new();

    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
    let axial = E * 0.5 * (start.a + end.a) / L;
    assert_matrix_eq!(k, dmatrix![1.0, -1.0; -1.0, 1.0] * axial, comp = abs, tol = 1e-12);
}

#[test]
fn truss_with_released_end_has_no_stiffness() {
    let element = bar_along_x()
        .with_release(1, Constraint::FIXED.with(Dof::Dx, DofConstraint::Released))
        .unwrap();
    let operator = TrussOperator::new(&element);
    let mut pool = MatrixPool::new();
    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
    assert_eq!(k.shape(), (2, 2));
    assert_scalar_eq!(k.abs().max(), 0.0, comp = abs, tol = 1e-12);
}

#[test]
fn truss_internal_force_and_displacement() {
    let element = bar_along_x();
    let operator = TrussOperator::new(&element);
    let mut pool = MatrixPool::new();
    let delta = 1e-3;
    let displacements = [Displacement::default(), Displacement::new(delta, 0.0, 0.0, 0.0, 0.0, 0.0)];

    let force = operator
        .internal_force_at(&mut pool, &displacements, IsoPoint::line(0.3))
        .unwrap();
    assert_scalar_eq!(force[(0, 0)], E * section().a * delta / L, comp = abs, tol = 1e-12);

    let u = operator
        .displacement_at(&mut pool, &displacements, IsoPoint::line(0.0))
        .unwrap();
    assert_scalar_eq!(u[(0, 0)], 0.5 * delta, comp = abs, tol = 1e-15);

    let err = operator
        .internal_force_at(&mut pool, &displacements[..1], IsoPoint::line(0.0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn bar_matrices_reject_points_outside_the_line() {
    let element = bar_along_x();
    let operator = TrussOperator::new(&element);
    let mut pool = MatrixPool::new();
    assert_eq!(
        operator.b_matrix_at(&mut pool, IsoPoint::line(1.5)).unwrap_err(),
        Error::ParametricCoordinateOutOfRange { axis: "xi", value: 1.5 }
    );

    let beam = EulerBernoulliBeamOperator::new(&element, BeamDirection::Z).unwrap();
    assert!(matches!(
        beam.n_matrix_at(&mut pool, IsoPoint::line(-1.01)),
        Err(Error::ParametricCoordinateOutOfRange { .. })
    ));
}

#[test]
fn shaft_stiffness_and_polar_mass() {
    let element = bar_along_x();
    let operator = ShaftOperator::new(&element);
    let mut pool = MatrixPool::new();
    let g = E / (2.0 * (1.0 + NU));

    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
    let expected = dmatrix![1.0, -1.0; -1.0, 1.0] * (g * section().j / L);
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-12);
    assert_eq!(operator.dof_order()[1].dof, Dof::Rx);

    let m = into_dmatrix(operator.local_mass_matrix(&mut pool).unwrap(), &mut pool);
    let expected = dmatrix![2.0, 1.0; 1.0, 2.0] * (RHO * section().j * L / 6.0);
    assert_matrix_eq!(m, expected, comp = abs, tol = 1e-12);
}

#[test]
fn beam_stiffness_in_both_planes() {
    let element = bar_along_x();
    let mut pool = MatrixPool::new();
    for direction in [BeamDirection::Y, BeamDirection::Z] {
        let operator = EulerBernoulliBeamOperator::new(&element, direction).unwrap();
        let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
        assert_matrix_eq!(k, beam_stiffness(direction), comp = abs, tol = 1e-9);
    }
}

#[test]
fn beam_needs_two_nodes() {
    let element = BarElement::new(
        vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
        material(),
        Arc::new(UniformBarSection(section())),
    )
    .unwrap();
    assert!(matches!(
        EulerBernoulliBeamOperator::new(&element, BeamDirection::Y),
        Err(Error::InvalidElement(_))
    ));
}

#[test]
fn beam_with_released_end_rotation() {
    let element = bar_along_x()
        .with_release(1, Constraint::FIXED.with(Dof::Rz, DofConstraint::Released))
        .unwrap();
    let operator = EulerBernoulliBeamOperator::new(&element, BeamDirection::Z).unwrap();
    let mut pool = MatrixPool::new();

    let k = into_dmatrix(operator.local_stiffness_matrix(&mut pool).unwrap(), &mut pool);
    let expected = dmatrix![
        1.0, L, -1.0, 0.0;
        L, L * L, -L, 0.0;
        -1.0, -L, 1.0, 0.0;
        0.0, 0.0, 0.0, 0.0
    ] * (3.0 * E * section().iz / L.powi(3));
    assert_matrix_eq!(k, expected, comp = abs, tol = 1e-9);
}

#[test]
fn beam_with_both_deflections_released_is_unstable() {
    let released = Constraint::FIXED.with(Dof::Dy, DofConstraint::Released);
    let element = bar_along_x()
        .with_release(0, released)
        .unwrap()
        .with_release(1, released)
        .unwrap();
    let operator = EulerBernoulliBeamOperator::new(&element, BeamDirection::Z).unwrap();
    let mut pool = MatrixPool::new();
    assert!(matches!(
        operator.local_stiffness_matrix(&mut pool),
        Err(Error::Singular { .. })
    ));
}

#[test]
fn beam_mass_carries_translational_inertia() {
    let element = bar_along_x();
    let operator = EulerBernoulliBeamOperator::new(&element, BeamDirection::Z).unwrap();
    let mut pool = MatrixPool::new();
    let m = into_dmatrix(operator.local_mass_matrix(&mut pool).unwrap(), &mut pool);
    let translation = DVector::from_column_slice(&[1.0, 0.0, 1.0, 0.0]);
    let total = translation.dot(&(&m * &translation));
    assert_scalar_eq!(total, RHO * section().a * L, comp = abs, tol = 1e-12);
}

#[test]
fn beam_uniform_load_gives_fixed_end_forces() {
    let element = bar_along_x();
    let mut pool = MatrixPool::new();
    let w = 3.0;

    let operator = EulerBernoulliBeamOperator::new(&element, BeamDirection::Y).unwrap();
    let load = ElementLoad::uniform(Vector3::z(), w, CoordinationSystem::Global);
    let forces = operator.equivalent_nodal_loads(&mut pool, &load).unwrap();
    assert_eq!(forces.len(), 2);
    assert_scalar_eq!(forces[0].fz, 0.5 * w * L, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[1].fz, 0.5 * w * L, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[0].my, -w * L * L / 12.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[1].my, w * L * L / 12.0, comp = abs, tol = 1e-12);
    assert_eq!(forces[0].fy, 0.0);

    let operator = EulerBernoulliBeamOperator::new(&element, BeamDirection::Z).unwrap();
    let load = ElementLoad::uniform(Vector3::new(0.0, 2.0, 0.0), w, CoordinationSystem::Local);
    let forces = operator.equivalent_nodal_loads(&mut pool, &load).unwrap();
    assert_scalar_eq!(forces[0].fy, 0.5 * w * L, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[0].mz, w * L * L / 12.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[1].mz, -w * L * L / 12.0, comp = abs, tol = 1e-12);
}

#[test]
fn beam_concentrated_midspan_load() {
    let element = bar_along_x();
    let operator = EulerBernoulliBeamOperator::new(&element, BeamDirection::Z).unwrap();
    let mut pool = MatrixPool::new();
    let p = 10.0;
    let load = ElementLoad::concentrated(
        Force::new(0.0, p, 0.0, 0.0, 0.0, 0.0),
        IsoPoint::line(0.0),
        CoordinationSystem::Local,
    );
    let forces = operator.equivalent_nodal_loads(&mut pool, &load).unwrap();
    assert_scalar_eq!(forces[0].fy, 0.5 * p, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[1].fy, 0.5 * p, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[0].mz, p * L / 8.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(forces[1].mz, -p * L / 8.0, comp = abs, tol = 1e-12);
}

#[test]
fn truss_uniform_load_along_an_inclined_bar() {
    let end = Point3::new(1.0, 2.0, 2.0);
    let element = BarElement::two_node(
        Point3::origin(),
        end,
        material(),
        Arc::new(UniformBarSection(section())),
    )
    .unwrap();
    let length = element.length();
    let operator = TrussOperator::new(&element);
    let mut pool = MatrixPool::new();

    // Only the axial part of a global load acts on a truss
    let load = ElementLoad::uniform(end.coords, 4.0, CoordinationSystem::Global);
    let forces = operator.equivalent_nodal_loads(&mut pool, &load).unwrap();
    for force in &forces {
        assert_scalar_eq!(force.fx, 2.0 * length, comp = abs, tol = 1e-12);
        assert_eq!(force.fy, 0.0);
    }
}
