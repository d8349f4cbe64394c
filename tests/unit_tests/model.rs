use isofem::element::BarElement;
use isofem::material::UniformIsotropicMaterial;
use isofem::model::{Constraint, Displacement, Dof, DofConstraint, Force, TransformationManager};
use isofem::proptest::{point3, rotation3};
use isofem::section::{CrossSectionProperties, UniformBarSection};
use isofem::Error;
use matrixcompare::{assert_matrix_eq, prop_assert_matrix_eq};
use nalgebra::{Matrix3, Point3, Unit, Vector3};
use proptest::prelude::*;
use std::sync::Arc;

fn transformation_from(rotation: &Matrix3<f64>, origin: Point3<f64>) -> TransformationManager {
    let axis = |i: usize| Unit::new_normalize(rotation.column(i).into_owned());
    TransformationManager::from_axes(axis(0), axis(1), axis(2), origin)
}

fn bar(start: Point3<f64>, end: Point3<f64>) -> BarElement {
    BarElement::two_node(
        start,
        end,
        Arc::new(UniformIsotropicMaterial::new(1.0, 0.0)),
        Arc::new(UniformBarSection(CrossSectionProperties::rectangle(1.0, 1.0))),
    )
    .unwrap()
}

#[test]
fn constraint_presets() {
    assert!(Dof::ALL.iter().all(|&dof| !Constraint::FIXED.is_released(dof)));
    assert!(Dof::ALL.iter().all(|&dof| Constraint::RELEASED.is_released(dof)));
    for dof in Dof::ALL {
        assert_eq!(Constraint::HINGED.is_released(dof), dof.is_rotation());
    }
    assert_eq!(Constraint::default(), Constraint::FIXED);

    let constraint = Constraint::FIXED.with(Dof::Ry, DofConstraint::Released);
    assert_eq!(constraint.get(Dof::Ry), DofConstraint::Released);
    assert_eq!(constraint.get(Dof::Rz), DofConstraint::Fixed);
}

#[test]
fn force_arithmetic() {
    let a = Force::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
    let b = Force::from_vectors(Vector3::repeat(1.0), Vector3::repeat(-1.0));
    assert_eq!(a + b, Force::new(2.0, 3.0, 4.0, 3.0, 4.0, 5.0));
    assert_eq!(a - a, Force::default());
    assert_eq!(-b, Force::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0));

    let mut c = a;
    c += b;
    *c.component_mut(Dof::Rz) = 0.0;
    assert_eq!(c.component(Dof::Dx), 2.0);
    assert_eq!(c.mz, 0.0);
}

#[test]
fn six_component_records_serialize_by_field() {
    let displacement = Displacement::new(0.5, 0.0, 0.0, 0.0, 0.0, -1.0);
    let json = serde_json::to_value(displacement).unwrap();
    assert_eq!(json["dx"], 0.5);
    assert_eq!(json["rz"], -1.0);
    let back: Displacement = serde_json::from_value(json).unwrap();
    assert_eq!(back, displacement);

    let constraint: Constraint = serde_json::from_str(
        r#"{ "dx": "Fixed", "dy": "Fixed", "dz": "Fixed", "rx": "Released", "ry": "Fixed", "rz": "Fixed" }"#,
    )
    .unwrap();
    assert!(constraint.is_released(Dof::Rx));
}

#[test]
fn bar_frame_conventions() {
    let horizontal = bar(Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 3.0, 0.0)).transformation();
    #[rustfmt::skip]
    let expected = Matrix3::new(
        0.0, 1.0, 0.0,
        -1.0, 0.0, 0.0,
        0.0, 0.0, 1.0,
    );
    assert_matrix_eq!(*horizontal.rotation(), expected, comp = abs, tol = 1e-15);

    // Vertical bars take local y perpendicular to global x
    let vertical = bar(Point3::origin(), Point3::new(0.0, 0.0, 2.0)).transformation();
    let y = vertical.local_to_global_vector(&Vector3::y());
    assert!(y.x.abs() < 1e-15);
    assert!((y.norm() - 1.0).abs() < 1e-15);
}

#[test]
fn bar_construction_errors() {
    let material = Arc::new(UniformIsotropicMaterial::new(1.0, 0.0));
    let section = Arc::new(UniformBarSection(CrossSectionProperties::rectangle(1.0, 1.0)));
    assert!(matches!(
        BarElement::new(vec![Point3::origin()], material.clone(), section.clone()),
        Err(Error::InvalidElement(_))
    ));
    assert!(matches!(
        BarElement::two_node(Point3::origin(), Point3::origin(), material, section),
        Err(Error::InvalidElement(_))
    ));
    assert!(matches!(
        bar(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).with_release(2, Constraint::HINGED),
        Err(Error::InvalidArgument(_))
    ));
}

proptest! {
    #[test]
    fn transformation_round_trips(rotation in rotation3(), origin in point3(), p in point3()) {
        let t = transformation_from(rotation.matrix(), origin);
        let back = t.local_to_global_point(&t.global_to_local_point(&p));
        prop_assert!((back - p).norm() <= 1e-12 * (1.0 + p.coords.norm() + origin.coords.norm()));

        let force = Force::new(p.x, p.y, p.z, -p.z, p.x, 0.5);
        let round_trip = t.local_to_global_force(&t.global_to_local_force(&force));
        prop_assert!((round_trip - force).translational().norm() <= 1e-12 * (1.0 + p.coords.norm()));
        prop_assert!((round_trip - force).rotational().norm() <= 1e-12 * (1.0 + p.coords.norm()));
    }

    #[test]
    fn bar_frames_are_right_handed(start in point3(), end in point3(), angle in -3.0..3.0) {
        prop_assume!((end - start).norm() > 0.1);
        let element = bar(start, end).with_web_rotation(angle);
        let t = element.transformation();
        let r = t.rotation();
        prop_assert_matrix_eq!(r * r.transpose(), Matrix3::<f64>::identity(), comp = abs, tol = 1e-12);
        prop_assert!((r.determinant() - 1.0).abs() <= 1e-12);

        let local_end = t.global_to_local_point(&end);
        prop_assert!((local_end.x - element.length()).abs() <= 1e-12 * (1.0 + element.length()));
        prop_assert!(local_end.y.abs() <= 1e-12 * (1.0 + element.length()));
    }
}
