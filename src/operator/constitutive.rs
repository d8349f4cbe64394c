//! Elastic constitutive matrices in Voigt notation.
//!
//! Poisson ratios follow the convention of [`MaterialProperties`]: $\nu_{ij} / E_i = \nu_{ji} / E_j$.

use crate::error::{Error, Result};
use crate::material::MaterialProperties;
use nalgebra::{Matrix3, Matrix6};

/// Shear modulus $G_{ij} = \frac{E_i E_j}{E_i + E_j + 2 E_j \nu_{ij}}$, the isotropic
/// $\frac{E}{2 (1 + \nu)}$ for equal moduli.
fn shear_modulus(ei: f64, ej: f64, nu_ij: f64) -> f64 {
    ei * ej / (ei + ej + 2.0 * ej * nu_ij)
}

/// Plane stress matrix mapping $(\epsilon_x, \epsilon_y, \gamma_{xy})$ to
/// $(\sigma_x, \sigma_y, \tau_{xy})$.
pub fn plane_stress_matrix(p: &MaterialProperties) -> Matrix3<f64> {
    let denominator = 1.0 - p.nu_xy * p.nu_yx;
    let d00 = p.ex / denominator;
    let d11 = p.ey / denominator;
    let d01 = p.nu_xy * p.ey / denominator;
    let g = p.shear_modulus_xy();
    Matrix3::new(d00, d01, 0.0, d01, d11, 0.0, 0.0, 0.0, g)
}

/// Plane strain matrix, obtained by eliminating $\sigma_z$ from the orthotropic compliance.
pub fn plane_strain_matrix(p: &MaterialProperties) -> Result<Matrix3<f64>> {
    let s11 = 1.0 / p.ex;
    let s22 = 1.0 / p.ey;
    let s33 = 1.0 / p.ez;
    let s12 = -p.nu_xy / p.ex;
    let s13 = -p.nu_xz / p.ex;
    let s23 = -p.nu_yz / p.ey;

    let r11 = s11 - s13 * s13 / s33;
    let r22 = s22 - s23 * s23 / s33;
    let r12 = s12 - s13 * s23 / s33;
    let det = r11 * r22 - r12 * r12;
    if !(det.abs() > 0.0) || !det.is_finite() {
        return Err(Error::Singular {
            operation: "plane strain compliance",
        });
    }

    let g = p.shear_modulus_xy();
    Ok(Matrix3::new(
        r22 / det,
        -r12 / det,
        0.0,
        -r12 / det,
        r11 / det,
        0.0,
        0.0,
        0.0,
        g,
    ))
}

/// Bending rigidity matrix of a plate of thickness `t`, mapping curvatures to moments per unit
/// length.
pub fn plate_bending_matrix(p: &MaterialProperties, t: f64) -> Matrix3<f64> {
    let denominator = 1.0 - p.nu_xy * p.nu_yx;
    let d00 = p.ex / denominator;
    let d11 = p.ey / denominator;
    let d01 = p.ex * p.nu_yx / denominator;
    let d22 = p.shear_modulus_xy();
    Matrix3::new(d00, d01, 0.0, d01, d11, 0.0, 0.0, 0.0, d22) * (t.powi(3) / 12.0)
}

/// Three-dimensional orthotropic stiffness for strains ordered
/// $(\epsilon_x, \epsilon_y, \epsilon_z, \gamma_{xy}, \gamma_{yz}, \gamma_{zx})$.
pub fn solid_matrix(p: &MaterialProperties) -> Result<Matrix6<f64>> {
    let mut compliance = Matrix6::zeros();
    compliance[(0, 0)] = 1.0 / p.ex;
    compliance[(1, 1)] = 1.0 / p.ey;
    compliance[(2, 2)] = 1.0 / p.ez;
    compliance[(0, 1)] = -p.nu_xy / p.ex;
    compliance[(1, 0)] = compliance[(0, 1)];
    compliance[(0, 2)] = -p.nu_xz / p.ex;
    compliance[(2, 0)] = compliance[(0, 2)];
    compliance[(1, 2)] = -p.nu_yz / p.ey;
    compliance[(2, 1)] = compliance[(1, 2)];
    compliance[(3, 3)] = 1.0 / shear_modulus(p.ex, p.ey, p.nu_xy);
    compliance[(4, 4)] = 1.0 / shear_modulus(p.ey, p.ez, p.nu_yz);
    compliance[(5, 5)] = 1.0 / shear_modulus(p.ez, p.ex, p.nu_zx);

    compliance.try_inverse().ok_or(Error::Singular {
        operation: "solid compliance",
    })
}
