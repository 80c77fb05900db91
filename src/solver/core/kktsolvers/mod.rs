//! Linear system engines for the regularized KKT system.
//!
//! Each engine owns a copy of the (scaled) problem matrices in its own
//! layout and factors the quasidefinite system
//!
//! ```text
//! [ P + diag(x_reg)   A'          G'            ]
//! [ A                -δI          0             ]
//! [ G                 0          -diag(z_reg)   ]
//! ```
//!
//! where `P` is given by its upper triangle.

use crate::algebra::*;
use crate::qdldl::QDLDLError;
use thiserror::Error;

mod dense;
mod sparse;
pub use dense::*;
pub use sparse::*;

/// Error type returned when a KKT engine cannot be constructed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KKTError {
    #[error("Symbolic factorization of the KKT matrix failed")]
    SymbolicFactorization(#[from] QDLDLError),
}

/// Factorize and solve capability for the regularized KKT system,
/// implemented once per matrix layout.
pub trait KKTEngine<T: FloatT, M: ProblemMatrix<T>>: Sized {
    /// Allocate the engine for `P` (upper triangle, n x n), `A` (p x n)
    /// and `G` (m x n).  Any symbolic analysis happens here.
    fn new(P: &M, A: &M, G: &M) -> Result<Self, KKTError>;

    /// Replace the matrix values.  Sparse matrices must keep the
    /// sparsity pattern given at construction.
    fn update_data(&mut self, P: &M, A: &M, G: &M);

    /// Numeric factorization for the given regularization.  Returns
    /// `false` if the matrix could not be factored as quasidefinite.
    fn factorize(&mut self, x_reg: &[T], delta: T, z_reg: &[T]) -> bool;

    /// Solve with the last successful factorization.
    #[allow(clippy::too_many_arguments)]
    fn solve(
        &mut self,
        rhs_x: &[T],
        rhs_y: &[T],
        rhs_z: &[T],
        lhs_x: &mut [T],
        lhs_y: &mut [T],
        lhs_z: &mut [T],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    // dense and sparse engines must agree on the same system
    #[test]
    fn test_engines_agree() {
        #[rustfmt::skip]
        let P = [[4., 1., 0.],
                 [1., 2., 0.],
                 [0., 0., 0.]];
        let A = [[1., 1., 1.]];
        #[rustfmt::skip]
        let G = [[1., 0., -1.],
                 [0., 2., 0.]];

        let mut dense =
            DenseKKTEngine::new(&Matrix::from(&P).to_triu(), &Matrix::from(&A), &Matrix::from(&G))
                .unwrap();
        let mut sparse = SparseKKTEngine::new(
            &CscMatrix::from(&P).to_triu(),
            &CscMatrix::from(&A),
            &CscMatrix::from(&G),
        )
        .unwrap();

        let x_reg = [1e-2, 1e-2, 0.5];
        let z_reg = [0.3, 2.0];
        let delta = 1e-3;
        assert!(dense.factorize(&x_reg, delta, &z_reg));
        assert!(sparse.factorize(&x_reg, delta, &z_reg));

        let (bx, by, bz) = ([1., -2., 0.5], [3.], [0.1, -1.]);
        let (mut dx1, mut dy1, mut dz1) = ([0.; 3], [0.; 1], [0.; 2]);
        let (mut dx2, mut dy2, mut dz2) = ([0.; 3], [0.; 1], [0.; 2]);
        dense.solve(&bx, &by, &bz, &mut dx1, &mut dy1, &mut dz1);
        sparse.solve(&bx, &by, &bz, &mut dx2, &mut dy2, &mut dz2);

        assert!(dx1.norm_inf_diff(&dx2) < 1e-8);
        assert!(dy1.norm_inf_diff(&dy2) < 1e-8);
        assert!(dz1.norm_inf_diff(&dz2) < 1e-8);

        // check the first block row of the system directly
        let Pfull = Matrix::from(&P);
        let Amat = Matrix::from(&A);
        let Gmat = Matrix::from(&G);
        let mut r = [0.; 3];
        Pfull.gemv(&mut r, &dx1, 1.0, 0.0);
        Amat.t().gemv(&mut r, &dy1, 1.0, 1.0);
        Gmat.t().gemv(&mut r, &dz1, 1.0, 1.0);
        for i in 0..3 {
            r[i] += x_reg[i] * dx1[i];
        }
        assert!(r.norm_inf_diff(&bx) < 1e-8);

        // and the last one
        let mut rz = [0.; 2];
        Gmat.gemv(&mut rz, &dx1, 1.0, 0.0);
        for i in 0..2 {
            rz[i] -= z_reg[i] * dz1[i];
        }
        assert!(rz.norm_inf_diff(&bz) < 1e-8);
    }

    #[test]
    fn test_factorize_rejects_indefinite() {
        // negative x regularization makes the (1,1) block indefinite
        let P = CscMatrix::<f64>::identity(2);
        let A = CscMatrix::zeros(0, 2);
        let G = CscMatrix::zeros(0, 2);
        let mut sparse = SparseKKTEngine::new(&P, &A, &G).unwrap();
        assert!(sparse.factorize(&[1., 1.], 1e-4, &[]));
        assert!(!sparse.factorize(&[-5., 1.], 1e-4, &[]));

        let P = Matrix::<f64>::identity(2);
        let A = Matrix::zeros((0, 2));
        let G = Matrix::zeros((0, 2));
        let mut dense = DenseKKTEngine::new(&P, &A, &G).unwrap();
        assert!(dense.factorize(&[1., 1.], 1e-4, &[]));
        assert!(!dense.factorize(&[-5., 1.], 1e-4, &[]));
    }
}
