use isofem::integrate::IsoPoint;
use isofem::load::ElementLoad;
use isofem::model::{CoordinationSystem, Force, TransformationManager};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Point3, Unit, Vector3};

/// Local x along global y, local y along negative global x.
fn quarter_turn() -> TransformationManager {
    TransformationManager::from_axes(
        Vector3::y_axis(),
        Unit::new_normalize(-Vector3::x()),
        Vector3::z_axis(),
        Point3::new(5.0, 5.0, 5.0),
    )
}

#[test]
fn uniform_load_is_normalized_and_rotated() {
    let t = quarter_turn();
    let load = ElementLoad::uniform(Vector3::new(0.0, 3.0, 4.0), 10.0, CoordinationSystem::Global);
    let force = load.local_force(&t);
    assert_scalar_eq!(force.fx, 6.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(force.fy, 0.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(force.fz, 8.0, comp = abs, tol = 1e-14);
    assert_eq!(force.rotational(), Vector3::zeros());

    let local = ElementLoad::uniform(Vector3::new(0.0, 3.0, 4.0), 10.0, CoordinationSystem::Local);
    assert_eq!(local.local_force(&t), Force::new(0.0, 6.0, 8.0, 0.0, 0.0, 0.0));
}

#[test]
fn zero_direction_gives_zero_load() {
    let load = ElementLoad::uniform(Vector3::zeros(), 10.0, CoordinationSystem::Local);
    assert_eq!(load.local_force(&quarter_turn()), Force::default());
}

#[test]
fn concentrated_load_rotates_force_and_moment() {
    let t = quarter_turn();
    let force = Force::new(1.0, 0.0, 0.0, 0.0, 2.0, 0.0);
    let load = ElementLoad::concentrated(force, IsoPoint::line(0.5), CoordinationSystem::Global);
    let local = load.local_force(&t);
    assert_scalar_eq!(local.fx, 0.0, comp = abs, tol = 1e-15);
    assert_scalar_eq!(local.fy, -1.0, comp = abs, tol = 1e-15);
    assert_scalar_eq!(local.mx, 2.0, comp = abs, tol = 1e-15);

    let load = ElementLoad::concentrated(force, IsoPoint::line(0.5), CoordinationSystem::Local);
    assert_eq!(load.local_force(&t), force);
}

#[test]
fn loads_deserialize_from_json() {
    let load: ElementLoad = serde_json::from_str(
        r#"{ "Uniform": { "direction": [0.0, 0.0, -1.0], "magnitude": 9.81, "system": "Global" } }"#,
    )
    .unwrap();
    assert_eq!(
        load,
        ElementLoad::uniform(-Vector3::z(), 9.81, CoordinationSystem::Global)
    );
}
