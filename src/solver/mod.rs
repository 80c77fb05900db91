//! PIQP solver main module.
//!
//! The [`Solver`] type is generic over the matrix layout and comes in a
//! dense ([`DenseSolver`]) and a sparse ([`SparseSolver`]) flavour.
//! [`QPSolver`] wraps either of them behind a single owning handle.

/// Bounds at or beyond this magnitude are treated as absent
pub(crate) const PIQP_INF: f64 = 1e30;

// internal module structure
pub(crate) mod core;
pub mod implementations;

//user facing traits and types required to interact with solver
pub use crate::solver::core::{IPSolver, SettingsError, Status};

#[cfg(feature = "serde")]
pub use crate::solver::core::SolverJSONReadWrite;

//linear system engines for the two matrix layouts
pub use crate::solver::core::kktsolvers::{DenseKKTEngine, KKTEngine, KKTError, SparseKKTEngine};

//Since we only have default, it is exposed at the top level
pub use crate::solver::implementations::default;
pub use crate::solver::implementations::default::*;
