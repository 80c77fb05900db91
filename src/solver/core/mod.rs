// package together the parts of the solver that do not depend on the
// problem layout and re-export in a partially flattened structure :
// : termination callbacks
// : kkt solver engines (dense and sparse)
// : settings errors
// : solver status and the main solver trait

pub mod callbacks;
pub mod kktsolvers;

mod settings;
mod solver;
pub use settings::*;
pub use solver::*;
