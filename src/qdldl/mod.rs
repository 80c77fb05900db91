//! Sparse LDLᵀ factorization of quasidefinite matrices.
//!
//! Takes the upper triangle of a symmetric matrix in CSC format,
//! computes a fill reducing ordering with [`amd`] and splits the work
//! into a symbolic stage (done once) and a numeric stage that can be
//! repeated after [`update_values`](QDLDLFactorisation::update_values).

#[allow(clippy::module_inception)]
mod qdldl;
pub use qdldl::*;
