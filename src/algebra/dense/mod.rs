mod core;
mod matrix_math;
mod factor_traits;
pub use factor_traits::*;
mod cholesky;
pub use cholesky::*;
