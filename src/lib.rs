//! Per-element finite element operators for structural analysis.
//!
//! The crate computes local stiffness, mass and damping matrices and equivalent nodal loads for
//! bar (truss, shaft, Euler-Bernoulli beam), membrane, plate and solid elements. Every element
//! formulation is an [`ElementOperator`](operator::ElementOperator) that exposes its
//! shape-function, strain-displacement, constitutive and Jacobian matrices at a parametric point;
//! the [`assembly`] module integrates them with Gauss-Legendre rules whose orders follow from the
//! polynomial degrees each operator reports.
//!
//! Small dense matrices are the currency of every evaluation, so their storage is rented from a
//! [`BufferPool`](pool::BufferPool) and returned after use.

pub mod assembly;
pub mod dense;
pub mod element;
pub mod error;
pub mod integrate;
pub mod load;
pub mod material;
pub mod model;
pub mod operator;
pub mod polynomial;
pub mod pool;
pub mod section;

#[cfg(feature = "proptest")]
pub mod proptest;

pub use error::{Error, Result};

pub extern crate nalgebra;
