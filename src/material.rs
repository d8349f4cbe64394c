//! Elastic material laws consumed by element operators.

use crate::integrate::IsoPoint;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Orthotropic elastic constants plus mass and damping densities at a point.
///
/// Poisson ratios follow the convention $\nu_{ij} E_j = \nu_{ji} E_i$.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub ex: f64,
    pub ey: f64,
    pub ez: f64,
    pub nu_xy: f64,
    pub nu_yx: f64,
    pub nu_xz: f64,
    pub nu_zx: f64,
    pub nu_yz: f64,
    pub nu_zy: f64,
    /// Mass density.
    pub rho: f64,
    /// Damping density.
    pub mu: f64,
}

impl MaterialProperties {
    pub fn isotropic(young: f64, poisson: f64, rho: f64, mu: f64) -> Self {
        Self {
            ex: young,
            ey: young,
            ez: young,
            nu_xy: poisson,
            nu_yx: poisson,
            nu_xz: poisson,
            nu_zx: poisson,
            nu_yz: poisson,
            nu_zy: poisson,
            rho,
            mu,
        }
    }

    /// Whether all moduli and all Poisson ratios coincide (relative tolerance `1e-9`).
    pub fn is_isotropic(&self) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * a.abs().max(b.abs());
        let nus = [self.nu_yx, self.nu_xz, self.nu_zx, self.nu_yz, self.nu_zy];
        close(self.ex, self.ey) && close(self.ex, self.ez) && nus.iter().all(|&nu| close(self.nu_xy, nu))
    }

    /// In-plane shear modulus $G_{xy} = \frac{E_x E_y}{E_x + E_y + 2 E_y \nu_{xy}}$, which reduces to
    /// $\frac{E}{2 (1 + \nu)}$ for isotropic materials.
    pub fn shear_modulus_xy(&self) -> f64 {
        self.ex * self.ey / (self.ex + self.ey + 2.0 * self.ey * self.nu_xy)
    }
}

/// A (possibly spatially graded) material attached to an element.
pub trait Material: Debug + Send + Sync {
    fn properties_at(&self, iso: IsoPoint) -> MaterialProperties;

    /// Per-axis polynomial degree of the properties in parametric coordinates.
    fn max_function_order(&self) -> [usize; 3] {
        [0, 0, 0]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformIsotropicMaterial {
    pub young_modulus: f64,
    pub poisson_ratio: f64,
    #[serde(default)]
    pub mass_density: f64,
    #[serde(default)]
    pub damping_density: f64,
}

impl UniformIsotropicMaterial {
    pub fn new(young_modulus: f64, poisson_ratio: f64) -> Self {
        Self {
            young_modulus,
            poisson_ratio,
            mass_density: 0.0,
            damping_density: 0.0,
        }
    }

    pub fn with_mass_density(self, mass_density: f64) -> Self {
        Self { mass_density, ..self }
    }

    pub fn with_damping_density(self, damping_density: f64) -> Self {
        Self { damping_density, ..self }
    }
}

impl Material for UniformIsotropicMaterial {
    fn properties_at(&self, _iso: IsoPoint) -> MaterialProperties {
        MaterialProperties::isotropic(
            self.young_modulus,
            self.poisson_ratio,
            self.mass_density,
            self.damping_density,
        )
    }
}

/// A material with the same orthotropic constants everywhere.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniformOrthotropicMaterial(pub MaterialProperties);

impl Material for UniformOrthotropicMaterial {
    fn properties_at(&self, _iso: IsoPoint) -> MaterialProperties {
        self.0
    }
}
