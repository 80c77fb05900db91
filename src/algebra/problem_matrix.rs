use crate::algebra::*;

/// Matrix layout capability the solver is generic over.
///
/// Implemented for [`CscMatrix`] (sparse problems) and [`Matrix`]
/// (dense problems).  Symmetric operations read the upper triangle only.
pub trait ProblemMatrix<T: FloatT>:
    Clone + std::fmt::Debug + ShapedMatrix + MatrixMath<T = T> + MatrixVectorMultiply<T = T>
{
    /// `y = a*selfᵀ*x + b*y`
    fn gemv_t(&self, y: &mut [T], x: &[T], a: T, b: T);

    /// `y = a*self*x + b*y` with `self` symmetric and stored as its upper triangle
    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T);

    /// Copy with all structure below the diagonal removed
    fn triu(&self) -> Self;

    /// An m x n matrix of zeros in this layout
    fn zeros_like(m: usize, n: usize) -> Self;

    /// Checks that `other` can replace the values of `self` in place,
    /// i.e. it has the same dimensions (and for sparse matrices, the
    /// same sparsity pattern)
    fn check_replacement(&self, other: &Self) -> Result<(), SparseFormatError>;

    /// Checks internal consistency of the matrix data
    fn check_format(&self) -> Result<(), SparseFormatError>;

    /// Overwrite the values of `self` with the values of `other`.  Assumes
    /// a successful [`check_replacement`](ProblemMatrix::check_replacement).
    fn copy_values_from(&mut self, other: &Self);

    /// Number of stored entries
    fn nnz(&self) -> usize;
}

impl<T: FloatT> ProblemMatrix<T> for CscMatrix<T> {
    fn gemv_t(&self, y: &mut [T], x: &[T], a: T, b: T) {
        self.t().gemv(y, x, a, b);
    }

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        self.sym().symv(y, x, a, b);
    }

    fn triu(&self) -> Self {
        self.to_triu()
    }

    fn zeros_like(m: usize, n: usize) -> Self {
        CscMatrix::zeros(m, n)
    }

    fn check_replacement(&self, other: &Self) -> Result<(), SparseFormatError> {
        self.check_equal_sparsity(other)
    }

    fn check_format(&self) -> Result<(), SparseFormatError> {
        CscMatrix::check_format(self)
    }

    fn copy_values_from(&mut self, other: &Self) {
        self.nzval.copy_from_slice(&other.nzval);
    }

    fn nnz(&self) -> usize {
        CscMatrix::nnz(self)
    }
}

impl<T: FloatT> ProblemMatrix<T> for Matrix<T> {
    fn gemv_t(&self, y: &mut [T], x: &[T], a: T, b: T) {
        self.t().gemv(y, x, a, b);
    }

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        self.sym().symv(y, x, a, b);
    }

    fn triu(&self) -> Self {
        self.to_triu()
    }

    fn zeros_like(m: usize, n: usize) -> Self {
        Matrix::zeros((m, n))
    }

    fn check_replacement(&self, other: &Self) -> Result<(), SparseFormatError> {
        if self.size() != other.size() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        Ok(())
    }

    fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.data.len() != self.m * self.n {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        Ok(())
    }

    fn copy_values_from(&mut self, other: &Self) {
        self.data.copy_from_slice(&other.data);
    }

    fn nnz(&self) -> usize {
        self.data.len()
    }
}
