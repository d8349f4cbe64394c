//! Gauss-Legendre quadrature rules for one-dimensional domains.
//!
//! Rules are returned as `(weights, points)` pairs. Rules on the reference interval `[-1, 1]`
//! come from [`univariate::gauss`]; [`univariate::gauss_on_interval`] maps them onto an
//! arbitrary interval `[a, b]` with the usual affine change of variables.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that a rule satisfying the given requirements is not available.
    NoRuleAvailable,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable => {
                write!(f, "There is no quadrature rule satisfying the requirements available")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, mut f: impl FnMut(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    assert_eq!(weights.len(), points.len(), "weights and points must have the same length");
    weights
        .iter()
        .zip(points)
        .map(|(w, x)| w * f(x))
        .sum()
}
