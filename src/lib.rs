//! __piqp__ is a proximal interior point solver for convex quadratic programs
//! of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T P x + c^T x\\\\\[2ex\]
//!  \text{subject to} & Ax = b \\\\\[1ex\]
//!         & Gx \leq h \\\\\[1ex\]
//!         & x_{lb} \leq x \leq x_{ub}
//!  \end{array}
//! $$
//!
//! with decision variables $x \in \mathbb{R}^n$ and data
//! $P=P^\top \succeq 0$, $c \in \mathbb{R}^n$,
//! $A \in \mathbb{R}^{p \times n}$, $b \in \mathbb{R}^p$,
//! $G \in \mathbb{R}^{m \times n}$ and $h \in \mathbb{R}^m$.
//! Bounds at or beyond $\pm 10^{30}$ are treated as absent.
//!
//! ## Features
//!
//! * __Dense and sparse__: problems are given either as dense row major
//!   [`Matrix`](algebra::Matrix) data, factored with a Cholesky decomposition of
//!   the reduced KKT system, or as [`CscMatrix`](algebra::CscMatrix) data, factored
//!   with the bundled [`qdldl`] LDLᵀ solver.
//!
//! * __Robust__: the proximal method of multipliers regularizes the KKT system
//!   so that problems with rank deficient constraints or a singular `P` can be
//!   solved without preprocessing.  Primal and dual infeasibility are detected.
//!
//! * __Warm data updates__: problem data can be changed in place with
//!   [`Solver::update`](solver::Solver::update), reusing the symbolic analysis
//!   and optionally the preconditioner.
//!
//! ## Example
//!
//! ```
//! use piqp::algebra::*;
//! use piqp::solver::*;
//!
//! // P = [4 1; 1 2] (upper triangle)
//! let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
//! let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);
//! let G = CscMatrix::zeros(0, 2);
//!
//! let settings = SettingsBuilder::default().verbose(false).build().unwrap();
//! let mut solver = SparseSolver::new(
//!     &P, &[1., 1.], &A, &[1.], &G, &[],
//!     Some(&[0., 0.][..]), Some(&[0.7, 0.7][..]), settings,
//! ).unwrap();
//!
//! assert_eq!(solver.solve(), Status::Solved);
//! assert!(f64::abs(solver.result().x[0] - 0.3) < 1e-6);
//! ```
//!
//! # License
//!
//! Licensed under the BSD 2-Clause License.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub(crate) mod io;
pub mod qdldl;
pub mod solver;
pub mod timers;

pub use crate::io::ConfigurablePrintTarget;
