//! Nodal quantities shared by all element archetypes: degrees of freedom, end releases,
//! forces, displacements and the local/global frame transformation.

use nalgebra::{Matrix3, Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub};

/// One scalar degree of freedom at a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dof {
    Dx,
    Dy,
    Dz,
    Rx,
    Ry,
    Rz,
}

impl Dof {
    pub const ALL: [Dof; 6] = [Dof::Dx, Dof::Dy, Dof::Dz, Dof::Rx, Dof::Ry, Dof::Rz];

    pub fn is_rotation(&self) -> bool {
        matches!(self, Dof::Rx | Dof::Ry | Dof::Rz)
    }
}

/// A `(node index, degree of freedom)` pair giving the meaning of one row/column of an element
/// matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementDof {
    pub node: usize,
    pub dof: Dof,
}

impl ElementDof {
    pub fn new(node: usize, dof: Dof) -> Self {
        Self { node, dof }
    }
}

/// Whether an element end is attached to its node in one degree of freedom.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DofConstraint {
    #[default]
    Fixed,
    Released,
}

/// Per-node attachment conditions of an element end, one entry per degree of freedom.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Constraint {
    pub dx: DofConstraint,
    pub dy: DofConstraint,
    pub dz: DofConstraint,
    pub rx: DofConstraint,
    pub ry: DofConstraint,
    pub rz: DofConstraint,
}

impl Constraint {
    pub const FIXED: Constraint = Constraint::uniform(DofConstraint::Fixed);
    pub const RELEASED: Constraint = Constraint::uniform(DofConstraint::Released);
    /// Translations fixed, rotations released.
    pub const HINGED: Constraint = Constraint {
        dx: DofConstraint::Fixed,
        dy: DofConstraint::Fixed,
        dz: DofConstraint::Fixed,
        rx: DofConstraint::Released,
        ry: DofConstraint::Released,
        rz: DofConstraint::Released,
    };

    const fn uniform(c: DofConstraint) -> Self {
        Self {
            dx: c,
            dy: c,
            dz: c,
            rx: c,
            ry: c,
            rz: c,
        }
    }

    pub fn get(&self, dof: Dof) -> DofConstraint {
        match dof {
            Dof::Dx => self.dx,
            Dof::Dy => self.dy,
            Dof::Dz => self.dz,
            Dof::Rx => self.rx,
            Dof::Ry => self.ry,
            Dof::Rz => self.rz,
        }
    }

    pub fn with(mut self, dof: Dof, constraint: DofConstraint) -> Self {
        match dof {
            Dof::Dx => self.dx = constraint,
            Dof::Dy => self.dy = constraint,
            Dof::Dz => self.dz = constraint,
            Dof::Rx => self.rx = constraint,
            Dof::Ry => self.ry = constraint,
            Dof::Rz => self.rz = constraint,
        }
        self
    }

    pub fn is_released(&self, dof: Dof) -> bool {
        self.get(dof) == DofConstraint::Released
    }
}

macro_rules! six_component_type {
    ($name:ident, $doc:literal, [$t0:ident, $t1:ident, $t2:ident], [$r0:ident, $r1:ident, $r2:ident]) => {
        #[doc = $doc]
        #[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub $t0: f64,
            pub $t1: f64,
            pub $t2: f64,
            pub $r0: f64,
            pub $r1: f64,
            pub $r2: f64,
        }

        impl $name {
            pub fn new($t0: f64, $t1: f64, $t2: f64, $r0: f64, $r1: f64, $r2: f64) -> Self {
                Self {
                    $t0,
                    $t1,
                    $t2,
                    $r0,
                    $r1,
                    $r2,
                }
            }

            pub fn from_vectors(translational: Vector3<f64>, rotational: Vector3<f64>) -> Self {
                Self::new(
                    translational.x,
                    translational.y,
                    translational.z,
                    rotational.x,
                    rotational.y,
                    rotational.z,
                )
            }

            pub fn translational(&self) -> Vector3<f64> {
                Vector3::new(self.$t0, self.$t1, self.$t2)
            }

            pub fn rotational(&self) -> Vector3<f64> {
                Vector3::new(self.$r0, self.$r1, self.$r2)
            }

            /// The component associated with a degree of freedom.
            pub fn component(&self, dof: Dof) -> f64 {
                match dof {
                    Dof::Dx => self.$t0,
                    Dof::Dy => self.$t1,
                    Dof::Dz => self.$t2,
                    Dof::Rx => self.$r0,
                    Dof::Ry => self.$r1,
                    Dof::Rz => self.$r2,
                }
            }

            pub fn component_mut(&mut self, dof: Dof) -> &mut f64 {
                match dof {
                    Dof::Dx => &mut self.$t0,
                    Dof::Dy => &mut self.$t1,
                    Dof::Dz => &mut self.$t2,
                    Dof::Rx => &mut self.$r0,
                    Dof::Ry => &mut self.$r1,
                    Dof::Rz => &mut self.$r2,
                }
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self::from_vectors(
                    self.translational() + rhs.translational(),
                    self.rotational() + rhs.rotational(),
                )
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                self + (-rhs)
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self::from_vectors(-self.translational(), -self.rotational())
            }
        }
    };
}

six_component_type!(
    Force,
    "A force and moment acting at a node.",
    [fx, fy, fz],
    [mx, my, mz]
);

six_component_type!(
    Displacement,
    "A translation and (small) rotation of a node.",
    [dx, dy, dz],
    [rx, ry, rz]
);

/// The frame in which a load direction or force is expressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinationSystem {
    #[default]
    Global,
    Local,
}

/// Rigid transformation between the global frame and an element's local frame.
///
/// The rows of `rotation` are the local axes expressed in global coordinates, so that
/// `local = rotation * (global - origin)` for points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformationManager {
    rotation: Matrix3<f64>,
    origin: Point3<f64>,
}

impl Default for TransformationManager {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformationManager {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            origin: Point3::origin(),
        }
    }

    /// Builds the transformation from orthonormal local axes and the local origin.
    pub fn from_axes(x: Unit<Vector3<f64>>, y: Unit<Vector3<f64>>, z: Unit<Vector3<f64>>, origin: Point3<f64>) -> Self {
        let rotation = Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]);
        Self { rotation, origin }
    }

    /// Rows are the local axes in global coordinates.
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    pub fn global_to_local_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (p - self.origin))
    }

    pub fn local_to_global_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.origin + self.rotation.transpose() * p.coords
    }

    pub fn global_to_local_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    pub fn local_to_global_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * v
    }

    pub fn global_to_local_force(&self, f: &Force) -> Force {
        Force::from_vectors(
            self.global_to_local_vector(&f.translational()),
            self.global_to_local_vector(&f.rotational()),
        )
    }

    pub fn local_to_global_force(&self, f: &Force) -> Force {
        Force::from_vectors(
            self.local_to_global_vector(&f.translational()),
            self.local_to_global_vector(&f.rotational()),
        )
    }

    pub fn global_to_local_displacement(&self, d: &Displacement) -> Displacement {
        Displacement::from_vectors(
            self.global_to_local_vector(&d.translational()),
            self.global_to_local_vector(&d.rotational()),
        )
    }

    pub fn local_to_global_displacement(&self, d: &Displacement) -> Displacement {
        Displacement::from_vectors(
            self.local_to_global_vector(&d.translational()),
            self.local_to_global_vector(&d.rotational()),
        )
    }
}
