#![allow(non_snake_case)]

mod data_updating;
mod equilibration;
mod facade;
mod info;
mod info_print;
mod kktsystem;
mod problemdata;
mod regularization;
mod residuals;
mod settings;
mod solution;
mod solver;
mod variables;

#[cfg(feature = "serde")]
mod json;

//export flattened
pub use data_updating::*;
pub use equilibration::*;
pub use facade::*;
pub use info::*;
pub use kktsystem::*;
pub use problemdata::*;
pub use regularization::*;
pub use residuals::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use variables::*;
