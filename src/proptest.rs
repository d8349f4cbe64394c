//! Strategies for property-based tests of element operators.
use crate::dense::DenseMatrix;
use crate::element::{BarElement, QuadrilateralElement, TetrahedronElement, TriangleElement};
use crate::material::UniformIsotropicMaterial;
use crate::section::{CrossSectionProperties, UniformBarSection, UniformThickness};
use ::proptest::prelude::*;
use nalgebra::{Point3, Rotation3, Vector3};
use std::sync::Arc;

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    // Keep coordinates moderate so that element matrices stay well scaled
    let range = -10.0f64..10.0;
    [range.clone(), range.clone(), range].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// An arbitrary rotation, given by its scaled axis.
pub fn rotation3() -> impl Strategy<Value = Rotation3<f64>> {
    let range = -3.0f64..3.0;
    [range.clone(), range.clone(), range].prop_map(|[x, y, z]| Rotation3::from_scaled_axis(Vector3::new(x, y, z)))
}

pub fn isotropic_material() -> impl Strategy<Value = UniformIsotropicMaterial> {
    (1.0f64..1000.0, 0.0f64..0.45, 0.1f64..10.0, 0.0f64..1.0).prop_map(|(young, poisson, rho, mu)| {
        UniformIsotropicMaterial::new(young, poisson)
            .with_mass_density(rho)
            .with_damping_density(mu)
    })
}

/// Square matrices with a dominant diagonal, hence invertible with a well-conditioned pivot
/// sequence.
pub fn diagonally_dominant_matrix(max_dim: usize) -> impl Strategy<Value = DenseMatrix> {
    (1..=max_dim.max(1))
        .prop_flat_map(|n| (Just(n), ::proptest::collection::vec(-1.0f64..1.0, n * n), ::proptest::collection::vec(0.5f64..2.0, n)))
        .prop_map(|(n, entries, diagonal)| {
            let mut matrix = DenseMatrix::from_row_slice(n, n, &entries);
            for (i, d) in diagonal.into_iter().enumerate() {
                matrix[(i, i)] = n as f64 + d;
            }
            matrix
        })
}

/// Two-node bars of length at least 0.5 with a rectangular section.
pub fn bar_element() -> impl Strategy<Value = BarElement> {
    (point3(), [-5.0f64..5.0, -5.0..5.0, -5.0..5.0], isotropic_material(), 0.1f64..1.0, 0.1f64..1.0)
        .prop_filter("bar must not be too short", |(_, direction, ..)| {
            Vector3::from(*direction).norm() >= 0.5
        })
        .prop_filter_map("bar must be valid", |(start, direction, material, width, height)| {
            let end = start + Vector3::from(direction);
            let section = UniformBarSection(CrossSectionProperties::rectangle(width, height));
            BarElement::two_node(start, end, Arc::new(material), Arc::new(section)).ok()
        })
}

/// Counterclockwise triangle corners in the xy plane with interior angles bounded away from 0
/// and pi, before rotation.
fn planar_triangle() -> impl Strategy<Value = [Point3<f64>; 3]> {
    (-5.0f64..5.0, -5.0f64..5.0, 0.5f64..4.0, 0.5f64..4.0, 0.0..std::f64::consts::TAU, 0.4f64..2.6).prop_map(
        |(x, y, a, b, theta, phi): (f64, f64, f64, f64, f64, f64)| {
            let p0 = Point3::new(x, y, 0.0);
            let p1 = p0 + a * Vector3::new(theta.cos(), theta.sin(), 0.0);
            let p2 = p0 + b * Vector3::new((theta + phi).cos(), (theta + phi).sin(), 0.0);
            [p0, p1, p2]
        },
    )
}

/// Non-degenerate triangles in arbitrary orientation.
pub fn triangle_element() -> impl Strategy<Value = TriangleElement> {
    (planar_triangle(), rotation3(), isotropic_material(), 0.01f64..0.5).prop_map(
        |(corners, rotation, material, thickness)| {
            TriangleElement::new(
                corners.map(|p| rotation * p),
                Arc::new(material),
                Arc::new(UniformThickness(thickness)),
            )
        },
    )
}

/// Convex quadrilaterals, obtained by perturbing the corners of a rectangle by less than a
/// quarter of its shortest side, in arbitrary orientation.
pub fn quadrilateral_element() -> impl Strategy<Value = QuadrilateralElement> {
    let perturbation = ::proptest::collection::vec(-0.24f64..0.24, 8);
    (0.5f64..4.0, 0.5f64..4.0, perturbation, rotation3(), isotropic_material(), 0.01f64..0.5).prop_map(
        |(width, height, perturbation, rotation, material, thickness)| {
            let h = width.min(height);
            let corners = [[0.0, 0.0], [width, 0.0], [width, height], [0.0, height]];
            let mut nodes = [Point3::origin(); 4];
            for (i, [x, y]) in corners.into_iter().enumerate() {
                let p = Point3::new(x + h * perturbation[2 * i], y + h * perturbation[2 * i + 1], 0.0);
                nodes[i] = rotation * p;
            }
            QuadrilateralElement::new(nodes, Arc::new(material), Arc::new(UniformThickness(thickness)))
        },
    )
}

/// Positively oriented tetrahedra: a counterclockwise base triangle and an apex above it.
pub fn tetrahedron_element() -> impl Strategy<Value = TetrahedronElement> {
    (planar_triangle(), -2.0f64..2.0, -2.0f64..2.0, 0.5f64..4.0, rotation3(), isotropic_material()).prop_map(
        |([p0, p1, p2], dx, dy, height, rotation, material)| {
            let centroid = Point3::from((p0.coords + p1.coords + p2.coords) / 3.0);
            let apex = centroid + Vector3::new(dx, dy, height);
            TetrahedronElement::new([p0, p1, p2, apex].map(|p| rotation * p), Arc::new(material))
        },
    )
}
