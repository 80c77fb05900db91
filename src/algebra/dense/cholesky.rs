#![allow(non_snake_case)]

use crate::algebra::{DenseFactorizationError, FloatT, Matrix, ShapedMatrix, VectorMath};

/// Dense Cholesky factorization `A = LLᵀ` of a symmetric positive
/// definite matrix, computed from the upper triangle of `A`.
#[derive(Debug, Clone)]
pub struct CholeskyEngine<T> {
    /// factor storage.  Read column major, the lower triangle holds `L`.
    pub L: Matrix<T>,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let L = Matrix::<T>::zeros((n, n));
        Self { L }
    }

    /// Factor `A`, reading only its upper triangle.  On failure the
    /// contents of `L` are unspecified.
    pub fn cholesky(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if A.size() != self.L.size() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }

        // the row major upper triangle of A is the column
        // major lower triangle referenced by the factorization
        let n = A.nrows();
        self.L.data.copy_from(&A.data);
        T::xpotrf(n, &mut self.L.data)?;

        // a NaN or Inf in A can pass the pivot checks
        if !(0..n).all(|i| self.L.data[i * n + i].is_finite()) {
            return Err(DenseFactorizationError::NonPositivePivot);
        }
        Ok(())
    }

    /// Solves `LLᵀx = b` in place
    pub fn solve(&self, x: &mut [T]) {
        assert_eq!(x.len(), self.L.nrows());
        T::xpotrs(self.L.nrows(), &self.L.data, x);
    }
}
