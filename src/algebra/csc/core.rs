#![allow(non_snake_case)]

use crate::algebra::{
    Adjoint, CscMatrix, FloatT, MatrixShape, ShapedMatrix, SparseFormatError, Symmetric,
};
use std::iter::zip;

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__
    /// ensure that rows indices are all in bounds or that data is arranged
    /// such that entries within each column appear in order of increasing
    /// row index.   Use [`check_format`](CscMatrix::check_format) for that.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    ///
    /// To make an m x n matrix of zeros, use
    /// ```
    /// use piqp::algebra::CscMatrix;
    /// let A : CscMatrix<f64> = CscMatrix::spalloc(3, 4, 0);
    /// assert_eq!(A.nnz(), 0);
    /// ```
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// An m x n matrix with no structural entries
    pub fn zeros(m: usize, n: usize) -> Self {
        Self::spalloc(m, n, 0)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transpose
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// symmetric view
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr[0] != 0 || self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// Error unless `self` and `B` have identical dimensions and
    /// sparsity patterns.
    pub fn check_equal_sparsity(&self, B: &Self) -> Result<(), SparseFormatError> {
        if self.size() != B.size() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if self.nnz() != B.nnz() || self.colptr != B.colptr || self.rowval != B.rowval {
            return Err(SparseFormatError::SparsityMismatch);
        }
        Ok(())
    }

    /// Allocates a new matrix containing only entries from the upper triangular part
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let n = self.n;
        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(self.nnz());
        let mut nzval = Vec::with_capacity(self.nnz());

        for col in 0..n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            for (&row, &v) in zip(&self.rowval[rng.clone()], &self.nzval[rng]) {
                if row <= col {
                    rowval.push(row);
                    nzval.push(v);
                }
            }
            colptr[col + 1] = rowval.len();
        }
        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // any structural entry in the lower triangle counts,
        // regardless of its value
        (0..self.ncols()).all(|col| {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            rows.iter().all(|&row| row <= col)
        })
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.nrows() && col < self.ncols());

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        let rows_in_this_column = &self.rowval[first..last];
        match rows_in_this_column.binary_search(&row) {
            Ok(idx) => Some(self.nzval[first + idx]),
            Err(_) => None,
        }
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}

/// Builds a sparse matrix from dense rows, dropping the zeros.
impl<const M: usize, const N: usize, T> From<&[[T; N]; M]> for CscMatrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> CscMatrix<T> {
        let mut colptr = vec![0; N + 1];
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        for col in 0..N {
            for (row, r) in rows.iter().enumerate() {
                if r[col] != T::zero() {
                    rowval.push(row);
                    nzval.push(r[col]);
                }
            }
            colptr[col + 1] = rowval.len();
        }
        CscMatrix::new(M, N, colptr, rowval, nzval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_matrix() -> CscMatrix<f64> {
        // A =
        //[ ⋅   4.0    ⋅    ⋅   12.0]
        //[1.0  5.0    ⋅    ⋅     ⋅ ]
        //[ ⋅   6.0    ⋅    ⋅   13.0]
        //[2.0  7.0  10.0   ⋅     ⋅ ]
        //[ ⋅   8.0  11.0   ⋅   14.0]
        //[3.0  9.0    ⋅    ⋅     ⋅ ]
        CscMatrix::new(
            6,                                                                 // m
            5,                                                                 // n
            vec![0, 3, 9, 11, 11, 14],                                         // colptr
            vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],                    // rowval
            vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.], // nzval
        )
    }

    #[test]
    fn test_csc_get_entry() {
        let A = test_matrix();

        assert_eq!(A.get_entry((1, 0)).unwrap(), 1.);
        assert_eq!(A.get_entry((5, 0)).unwrap(), 3.);
        assert_eq!(A.get_entry((3, 1)).unwrap(), 7.);
        assert_eq!(A.get_entry((4, 4)).unwrap(), 14.);

        assert!(A.get_entry((0, 0)).is_none());
        assert!(A.get_entry((2, 3)).is_none());
    }

    #[test]
    fn test_csc_from_rows() {
        let A = CscMatrix::from(&[
            [0., 4., 0., 0., 12.],
            [1., 5., 0., 0., 0.],
            [0., 6., 0., 0., 13.],
            [2., 7., 10., 0., 0.],
            [0., 8., 11., 0., 14.],
            [3., 9., 0., 0., 0.],
        ]);
        assert_eq!(A, test_matrix());
        assert!(A.check_format().is_ok());
    }

    #[test]
    fn test_check_format() {
        let mut A = test_matrix();
        A.rowval.swap(0, 1);
        assert_eq!(A.check_format(), Err(SparseFormatError::BadRowOrdering));

        let mut A = test_matrix();
        A.rowval[2] = 6;
        assert_eq!(A.check_format(), Err(SparseFormatError::BadRowval));

        let mut A = test_matrix();
        A.colptr[2] = 2;
        assert_eq!(A.check_format(), Err(SparseFormatError::BadColptr));
    }

    #[test]
    fn test_triu_and_sparsity() {
        let P = CscMatrix::from(&[
            [4., 1., 0.],
            [1., 2., 3.],
            [0., 3., 0.]]);
        assert!(!P.is_triu());

        let Pu = P.to_triu();
        assert!(Pu.is_triu());
        assert_eq!(Pu.nnz(), 4);
        assert_eq!(Pu.get_entry((1, 2)), Some(3.));

        let mut Q = Pu.clone();
        Q.nzval.fill(7.);
        assert!(Pu.check_equal_sparsity(&Q).is_ok());
        assert_eq!(
            Pu.check_equal_sparsity(&CscMatrix::identity(3)),
            Err(SparseFormatError::SparsityMismatch)
        );
        assert_eq!(
            Pu.check_equal_sparsity(&CscMatrix::identity(2)),
            Err(SparseFormatError::IncompatibleDimension)
        );

        let mut R = Pu.clone();
        R.rowval[3] = 0;
        assert_eq!(Pu.check_equal_sparsity(&R), Err(SparseFormatError::SparsityMismatch));
    }
}
