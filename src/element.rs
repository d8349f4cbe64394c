//! Element records: geometry, material and section data that operators are evaluated on.
//!
//! Records are plain data shared read-only by operators, so one record may back several
//! operators (for example a frame bar evaluated as truss, shaft and two beams).

use crate::error::{Error, Result};
use crate::material::Material;
use crate::model::{Constraint, TransformationManager};
use crate::section::{BarSection, PlateSection};
use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// In-plane behaviour of membrane elements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MembraneBehaviour {
    #[default]
    PlaneStress,
    PlaneStrain,
}

/// A straight bar with two or more equally spaced, collinear nodes.
#[derive(Debug, Clone)]
pub struct BarElement {
    nodes: Vec<Point3<f64>>,
    material: Arc<dyn Material>,
    section: Arc<dyn BarSection>,
    releases: Vec<Constraint>,
    web_rotation: f64,
}

impl BarElement {
    /// A bar through the given nodes. Intermediate nodes are assumed to be equally spaced
    /// between the end nodes.
    pub fn new(nodes: Vec<Point3<f64>>, material: Arc<dyn Material>, section: Arc<dyn BarSection>) -> Result<Self> {
        if nodes.len() < 2 {
            return Err(Error::InvalidElement(format!(
                "a bar needs at least two nodes, got {}",
                nodes.len()
            )));
        }
        let length = (nodes[nodes.len() - 1] - nodes[0]).norm();
        if !(length > 0.0) {
            return Err(Error::InvalidElement("bar end nodes coincide".to_string()));
        }

        let releases = vec![Constraint::FIXED; nodes.len()];
        Ok(Self {
            nodes,
            material,
            section,
            releases,
            web_rotation: 0.0,
        })
    }

    pub fn two_node(
        start: Point3<f64>,
        end: Point3<f64>,
        material: Arc<dyn Material>,
        section: Arc<dyn BarSection>,
    ) -> Result<Self> {
        Self::new(vec![start, end], material, section)
    }

    /// Sets the attachment conditions of the element end at `node`.
    pub fn with_release(mut self, node: usize, constraint: Constraint) -> Result<Self> {
        let count = self.nodes.len();
        let release = self
            .releases
            .get_mut(node)
            .ok_or_else(|| Error::InvalidArgument(format!("node {node} out of range for a {count}-node bar")))?;
        *release = constraint;
        Ok(self)
    }

    /// Rotation (radians) of the section about the bar axis.
    pub fn with_web_rotation(mut self, angle: f64) -> Self {
        self.web_rotation = angle;
        self
    }

    pub fn nodes(&self) -> &[Point3<f64>] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    pub fn section(&self) -> &dyn BarSection {
        self.section.as_ref()
    }

    pub fn releases(&self) -> &[Constraint] {
        &self.releases
    }

    pub fn length(&self) -> f64 {
        (self.nodes[self.nodes.len() - 1] - self.nodes[0]).norm()
    }

    /// Distance from the first node of the point at parametric coordinate `xi`.
    pub fn iso_to_local(&self, xi: f64) -> f64 {
        0.5 * (xi + 1.0) * self.length()
    }

    pub fn local_to_iso(&self, x: f64) -> f64 {
        2.0 * x / self.length() - 1.0
    }

    /// Parametric coordinates of the nodes, equally spaced over `[-1, 1]`.
    pub fn node_iso_positions(&self) -> Vec<f64> {
        let n = self.nodes.len();
        (0..n).map(|i| -1.0 + 2.0 * i as f64 / (n - 1) as f64).collect()
    }

    /// Local frame with x along the bar axis.
    ///
    /// The local y axis is horizontal (perpendicular to global z) unless the bar is vertical, in
    /// which case it is perpendicular to global x. The web rotation then turns y and z about x.
    pub fn transformation(&self) -> TransformationManager {
        let start = self.nodes[0];
        let x = Unit::new_normalize(self.nodes[self.nodes.len() - 1] - start);
        let up = if x.cross(&Vector3::z()).norm() < 1e-9 {
            Vector3::x()
        } else {
            Vector3::z()
        };
        let y0 = up.cross(&x).normalize();
        let z0 = x.cross(&y0);
        let (sin, cos) = self.web_rotation.sin_cos();
        let y = Unit::new_normalize(y0 * cos + z0 * sin);
        let z = Unit::new_normalize(z0 * cos - y0 * sin);
        TransformationManager::from_axes(x, y, z, start)
    }
}

/// Local frame of a planar element: x along `p1 - p0`, z along the normal of the plane through
/// `p0`, `p1`, `p2`. Degenerate input still yields an orthonormal frame, so that degenerate
/// geometry surfaces through a singular Jacobian rather than here.
fn planar_frame(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> TransformationManager {
    let along = p1 - p0;
    let x = if along.norm() > 0.0 {
        Unit::new_normalize(along)
    } else {
        Vector3::x_axis()
    };
    let normal = x.cross(&(p2 - p0));
    let z = if normal.norm() > 1e-12 * (p2 - p0).norm().max(1.0) {
        Unit::new_normalize(normal)
    } else {
        let helper = if x.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        Unit::new_normalize(x.cross(&helper))
    };
    let y = Unit::new_normalize(z.cross(&x));
    TransformationManager::from_axes(x, y, z, *p0)
}

/// A three-node flat triangle, used for membrane (CST) and plate bending (DKT) behaviour.
#[derive(Debug, Clone)]
pub struct TriangleElement {
    pub nodes: [Point3<f64>; 3],
    pub material: Arc<dyn Material>,
    pub section: Arc<dyn PlateSection>,
    pub behaviour: MembraneBehaviour,
}

impl TriangleElement {
    pub fn new(nodes: [Point3<f64>; 3], material: Arc<dyn Material>, section: Arc<dyn PlateSection>) -> Self {
        Self {
            nodes,
            material,
            section,
            behaviour: MembraneBehaviour::default(),
        }
    }

    pub fn with_behaviour(self, behaviour: MembraneBehaviour) -> Self {
        Self { behaviour, ..self }
    }

    pub fn transformation(&self) -> TransformationManager {
        let [p0, p1, p2] = &self.nodes;
        planar_frame(p0, p1, p2)
    }

    /// Node positions in the local frame.
    pub fn local_nodes(&self) -> [Point3<f64>; 3] {
        let t = self.transformation();
        self.nodes.map(|p| t.global_to_local_point(&p))
    }
}

/// A four-node flat quadrilateral, nodes ordered counter-clockwise.
#[derive(Debug, Clone)]
pub struct QuadrilateralElement {
    pub nodes: [Point3<f64>; 4],
    pub material: Arc<dyn Material>,
    pub section: Arc<dyn PlateSection>,
    pub behaviour: MembraneBehaviour,
}

impl QuadrilateralElement {
    pub fn new(nodes: [Point3<f64>; 4], material: Arc<dyn Material>, section: Arc<dyn PlateSection>) -> Self {
        Self {
            nodes,
            material,
            section,
            behaviour: MembraneBehaviour::default(),
        }
    }

    pub fn with_behaviour(self, behaviour: MembraneBehaviour) -> Self {
        Self { behaviour, ..self }
    }

    /// Local frame with x along the first edge and z normal to the plane spanned by the first
    /// edge and the diagonal from node 0 to node 2.
    pub fn transformation(&self) -> TransformationManager {
        let [p0, p1, p2, _] = &self.nodes;
        planar_frame(p0, p1, p2)
    }

    pub fn local_nodes(&self) -> [Point3<f64>; 4] {
        let t = self.transformation();
        self.nodes.map(|p| t.global_to_local_point(&p))
    }
}

/// A four-node linear tetrahedron, expressed directly in global coordinates.
#[derive(Debug, Clone)]
pub struct TetrahedronElement {
    pub nodes: [Point3<f64>; 4],
    pub material: Arc<dyn Material>,
}

impl TetrahedronElement {
    pub fn new(nodes: [Point3<f64>; 4], material: Arc<dyn Material>) -> Self {
        Self { nodes, material }
    }

    pub fn transformation(&self) -> TransformationManager {
        TransformationManager::identity()
    }
}
