//! Loads applied to elements, converted to equivalent nodal loads by element operators.

use crate::integrate::IsoPoint;
use crate::model::{CoordinationSystem, Force, TransformationManager};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementLoad {
    /// A force per unit length, area or volume (depending on the element) with constant
    /// magnitude. `direction` need not be normalized.
    Uniform {
        direction: Vector3<f64>,
        magnitude: f64,
        system: CoordinationSystem,
    },
    /// A force and moment applied at one parametric location.
    Concentrated {
        force: Force,
        location: IsoPoint,
        system: CoordinationSystem,
    },
}

impl ElementLoad {
    pub fn uniform(direction: Vector3<f64>, magnitude: f64, system: CoordinationSystem) -> Self {
        Self::Uniform {
            direction,
            magnitude,
            system,
        }
    }

    pub fn concentrated(force: Force, location: IsoPoint, system: CoordinationSystem) -> Self {
        Self::Concentrated {
            force,
            location,
            system,
        }
    }

    /// The load intensity in the element's local frame.
    ///
    /// For uniform loads, this is the force per unit measure along the normalized direction.
    pub fn local_force(&self, transformation: &TransformationManager) -> Force {
        match self {
            ElementLoad::Uniform {
                direction,
                magnitude,
                system,
            } => {
                let direction = match system {
                    CoordinationSystem::Global => transformation.global_to_local_vector(direction),
                    CoordinationSystem::Local => *direction,
                };
                let norm = direction.norm();
                let intensity = if norm > 0.0 {
                    direction * (*magnitude / norm)
                } else {
                    Vector3::zeros()
                };
                Force::from_vectors(intensity, Vector3::zeros())
            }
            ElementLoad::Concentrated { force, system, .. } => match system {
                CoordinationSystem::Global => transformation.global_to_local_force(force),
                CoordinationSystem::Local => *force,
            },
        }
    }
}
