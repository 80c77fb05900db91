use crate::algebra::{Adjoint, FloatT, Matrix, MatrixShape, ShapedMatrix, Symmetric};
use std::ops::{Index, IndexMut};

impl<T> Matrix<T>
where
    T: FloatT,
{
    /// `Matrix` constructor from row major data.
    ///
    /// # Panics
    /// Panics if the data length is not `m*n`.
    pub fn new(m: usize, n: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), m * n);
        Self { m, n, data }
    }

    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        let data = vec![T::zero(); m * n];
        Self { m, n, data }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        for i in 0..n {
            mat[(i, i)] = T::one();
        }
        mat
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        assert!(row < self.m);
        &self.data[(row * self.n)..(row + 1) * self.n]
    }

    pub fn row_slice_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.m);
        &mut self.data[(row * self.n)..(row + 1) * self.n]
    }

    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// Symmetric view of the upper triangle.  Entries below the
    /// diagonal are ignored by operations on the view.
    pub fn sym(&self) -> Symmetric<'_, Self> {
        Symmetric { src: self }
    }

    /// Copy of the matrix with the strict lower triangle zeroed
    pub fn to_triu(&self) -> Self {
        assert!(self.is_square());
        let mut out = self.clone();
        for r in 0..self.m {
            out.row_slice_mut(r)[..r].fill(T::zero());
        }
        out
    }

    pub fn is_triu(&self) -> bool {
        (0..self.m).all(|r| (0..r.min(self.n)).all(|c| self[(r, c)] == T::zero()))
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut Self::Output {
        &mut self.data[idx.0 * self.n + idx.1]
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data[idx.0 * self.n + idx.1]
    }
}

impl<T> ShapedMatrix for Matrix<T> {
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

impl<const M: usize, const N: usize, T> From<&[[T; N]; M]> for Matrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> Matrix<T> {
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(M, N, data)
    }
}

impl<T> std::fmt::Display for Matrix<T>
where
    T: FloatT,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f)?;
        for i in 0..self.m {
            write!(f, "[ ")?;
            for v in self.row_slice(i) {
                write!(f, " {:?}", v)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
