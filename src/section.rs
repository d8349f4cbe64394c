//! Cross sections of bar elements and thickness of planar elements.

use crate::integrate::IsoPoint;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Geometric properties of a bar cross section.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionProperties {
    /// Area.
    pub a: f64,
    /// Second moment of area about the local y axis.
    pub iy: f64,
    /// Second moment of area about the local z axis.
    pub iz: f64,
    /// Polar (torsional) moment.
    pub j: f64,
    /// Shear area along y.
    pub ay: f64,
    /// Shear area along z.
    pub az: f64,
}

impl CrossSectionProperties {
    /// Properties of a solid `width x height` rectangle, with `height` measured along local z.
    pub fn rectangle(width: f64, height: f64) -> Self {
        let a = width * height;
        let iy = width * height.powi(3) / 12.0;
        let iz = height * width.powi(3) / 12.0;
        Self {
            a,
            iy,
            iz,
            j: iy + iz,
            ay: a,
            az: a,
        }
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| (1.0 - t) * a + t * b;
        Self {
            a: mix(self.a, other.a),
            iy: mix(self.iy, other.iy),
            iz: mix(self.iz, other.iz),
            j: mix(self.j, other.j),
            ay: mix(self.ay, other.ay),
            az: mix(self.az, other.az),
        }
    }
}

/// A bar cross section, possibly varying along the bar axis.
pub trait BarSection: Debug + Send + Sync {
    fn properties_at(&self, iso: IsoPoint) -> CrossSectionProperties;

    /// Per-axis polynomial degree of the properties in parametric coordinates.
    fn max_function_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniformBarSection(pub CrossSectionProperties);

impl BarSection for UniformBarSection {
    fn properties_at(&self, _iso: IsoPoint) -> CrossSectionProperties {
        self.0
    }
}

/// Properties interpolated linearly from `start` at $\xi = -1$ to `end` at $\xi = 1$.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaperedBarSection {
    pub start: CrossSectionProperties,
    pub end: CrossSectionProperties,
}

impl BarSection for TaperedBarSection {
    fn properties_at(&self, iso: IsoPoint) -> CrossSectionProperties {
        self.start.lerp(&self.end, 0.5 * (iso.xi + 1.0))
    }

    fn max_function_order(&self) -> [usize; 3] {
        [1, 0, 0]
    }
}

/// Thickness of a planar (membrane or plate) element.
pub trait PlateSection: Debug + Send + Sync {
    fn thickness_at(&self, iso: IsoPoint) -> f64;

    fn max_function_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniformThickness(pub f64);

impl PlateSection for UniformThickness {
    fn thickness_at(&self, _iso: IsoPoint) -> f64 {
        self.0
    }
}
