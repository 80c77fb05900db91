//! Linear algebra used by the solver.
//!
//! Vectors are plain slices of [`FloatT`] values with operations provided
//! by the [`VectorMath`] trait.  Problem matrices are either sparse
//! ([`CscMatrix`]) or dense ([`Matrix`], row major), and both implement
//! [`ProblemMatrix`], which is the capability the solver core is generic over.

mod error_types;
mod floats;
mod math_traits;
mod matrix_types;
mod problem_matrix;
mod vecmath;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_types::*;
pub use problem_matrix::*;

mod csc;

mod dense;
pub use dense::*;
