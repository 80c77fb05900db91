//! Solver implementations.  The default implementation covers both the
//! dense and the sparse problem layouts.

pub mod default;
