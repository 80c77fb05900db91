use enum_dispatch::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// Solver terminated with a solution.
    Solved,
    /// Iteration limit reached before solution or infeasibility certificate found.
    MaxIterReached,
    /// Problem is primal infeasible.
    PrimalInfeasible,
    /// Problem is dual infeasible.
    DualInfeasible,
    /// Solver terminated with a numerical error
    NumericalError,
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Settings failed validation at the start of the solve
    InvalidSettings,
    /// The user supplied termination callback requested a stop
    CallbackTerminated,
}

impl Status {
    /// true only for [`Status::Solved`]
    pub fn is_solved(&self) -> bool {
        matches!(self, Status::Solved)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Status::Solved => "PIQP_SOLVED",
            Status::MaxIterReached => "PIQP_MAX_ITER_REACHED",
            Status::PrimalInfeasible => "PIQP_PRIMAL_INFEASIBLE",
            Status::DualInfeasible => "PIQP_DUAL_INFEASIBLE",
            Status::NumericalError => "PIQP_NUMERICS",
            Status::Unsolved => "PIQP_UNSOLVED",
            Status::InvalidSettings => "PIQP_INVALID_SETTINGS",
            Status::CallbackTerminated => "PIQP_CALLBACK_TERMINATED",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------------
// IPSolver trait
// ---------------------------------

/// An interior point solver.
///
/// Only the main solve function lives here.  Construction, data updates
/// and result access are layout specific and implemented directly on
/// the [solver](crate::solver::Solver) type.

#[enum_dispatch]
pub trait IPSolver {
    /// Run the solver.  The returned status is also stored in the
    /// solver's info.
    fn solve(&mut self) -> Status;
}

// ---------------------------------
// JSON problem files
// ---------------------------------

/// Reading and writing of the problem data and settings to JSON files
#[cfg(feature = "serde")]
pub trait SolverJSONReadWrite: Sized {
    /// Writes the unscaled problem data and settings
    fn write_to_file(&self, file: &mut std::fs::File) -> Result<(), std::io::Error>;
    /// Constructs a new solver from a file written by `write_to_file`
    fn read_from_file(file: &mut std::fs::File) -> Result<Self, std::io::Error>;
}

#[test]
fn test_status_display() {
    assert_eq!(Status::default(), Status::Unsolved);
    assert_eq!(Status::Solved.to_string(), "PIQP_SOLVED");
    assert_eq!(Status::MaxIterReached.to_string(), "PIQP_MAX_ITER_REACHED");
    assert_eq!(Status::NumericalError.to_string(), "PIQP_NUMERICS");
    assert!(Status::Solved.is_solved());
    assert!(!Status::MaxIterReached.is_solved());
}
