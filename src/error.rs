//! Library-wide error type.

use std::fmt;
use std::fmt::{Display, Formatter};

/// Errors produced while building or evaluating element operators.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A matrix operation was invoked with incompatible shapes.
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// No admissible pivot was found, or a decomposition met a non-positive pivot.
    Singular { operation: &'static str },
    /// A `(row, column)` index outside of the matrix shape.
    IndexOutOfBounds { index: (usize, usize), shape: (usize, usize) },
    /// A parametric coordinate outside of the element's reference domain.
    ParametricCoordinateOutOfRange { axis: &'static str, value: f64 },
    /// The element archetype does not define the requested operator.
    NotImplemented {
        element: &'static str,
        operation: &'static str,
    },
    /// An argument the operation cannot accept, e.g. the wrong number of nodal displacements or a
    /// zero quadrature point count.
    InvalidArgument(String),
    /// Element data that no operator can be built from, e.g. wrong node count or inverted geometry.
    InvalidElement(String),
    /// A pooled buffer was handed to a pool that did not rent it.
    PoolMisuse(String),
    /// Shape functions solved from interpolation conditions failed their self-check.
    InterpolationMismatch { residual: f64 },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn not_implemented(element: &'static str, operation: &'static str) -> Self {
        Self::NotImplemented { element, operation }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch {
                operation,
                left,
                right,
            } => write!(
                f,
                "Dimension mismatch in {operation}: {}x{} and {}x{}",
                left.0, left.1, right.0, right.1
            ),
            Self::Singular { operation } => write!(f, "Matrix is singular ({operation})"),
            Self::IndexOutOfBounds { index, shape } => write!(
                f,
                "Index ({}, {}) out of bounds for {}x{} matrix",
                index.0, index.1, shape.0, shape.1
            ),
            Self::ParametricCoordinateOutOfRange { axis, value } => {
                write!(f, "Parametric coordinate {axis} = {value} is outside of [-1, 1]")
            }
            Self::NotImplemented { element, operation } => {
                write!(f, "{operation} is not implemented for {element}")
            }
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::InvalidElement(msg) => write!(f, "Invalid element: {msg}"),
            Self::PoolMisuse(msg) => write!(f, "Pool misuse: {msg}"),
            Self::InterpolationMismatch { residual } => write!(
                f,
                "Interpolation conditions are not satisfied by the solved shape functions (residual {residual:e})"
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<isofem_quadrature::Error> for Error {
    fn from(err: isofem_quadrature::Error) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
