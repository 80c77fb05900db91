#![allow(non_snake_case)]

use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_T(self.src, y, x, a, b);
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_symv(self.src, y, x, a, b);
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.colptr.len() - 1);

        for (i, v) in norms.iter_mut().enumerate() {
            *v = self.nzval[self.colptr[i]..self.colptr[i + 1]]
                .iter()
                .fold(*v, |m, &nzval| T::max(m, T::abs(nzval)));
        }
    }

    fn col_norms_sym_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.colptr.len() - 1);

        for i in 0..norms.len() {
            for j in self.colptr[i]..self.colptr[i + 1] {
                let tmp = T::abs(self.nzval[j]);
                let r = self.rowval[j];
                norms[i] = T::max(norms[i], tmp);
                norms[r] = T::max(norms[r], tmp);
            }
        }
    }

    fn row_norms_no_reset(&self, norms: &mut [T]) {
        for (row, val) in zip(&self.rowval, &self.nzval) {
            norms[*row] = T::max(norms[*row], T::abs(*val));
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(self.nzval.len(), self.nnz());

        for (col, &ri) in r.iter().enumerate() {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let vals = &mut self.nzval[first..last];
            let rows = &self.rowval[first..last];

            for (val, row) in zip(vals, rows) {
                *val *= l[*row] * ri;
            }
        }
    }

    fn quad_form(&self, y: &[T], x: &[T]) -> T {
        _csc_quad_form(self, y, x)
    }
}

// y = a*Ax + b*y for symmetric A stored as its upper triangle.
// Any entries below the diagonal are ignored.
fn _csc_symv<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert!(x.len() == A.n);
    assert!(y.len() == A.n);
    assert!(A.n == A.m);

    y.scale(b);

    for (col, &xcol) in x.iter().enumerate() {
        let first = A.colptr[col];
        let last = A.colptr[col + 1];
        let rows = &A.rowval[first..last];
        let nzvals = &A.nzval[first..last];

        for (&row, &Aij) in zip(rows, nzvals) {
            if row < col {
                y[row] += a * Aij * xcol;
                y[col] += a * Aij * x[row];
            } else if row == col {
                y[row] += a * Aij * xcol;
            }
        }
    }
}

fn _csc_quad_form<T: FloatT>(M: &CscMatrix<T>, y: &[T], x: &[T]) -> T {
    assert_eq!(M.n, M.m);
    assert_eq!(x.len(), M.n);
    assert_eq!(y.len(), M.n);

    let mut out = T::zero();

    for col in 0..M.n {
        let mut tmp1 = T::zero();
        let mut tmp2 = T::zero();

        let first = M.colptr[col];
        let last = M.colptr[col + 1];

        let values = &M.nzval[first..last];
        let rows = &M.rowval[first..last];

        for (&Mv, &row) in zip(values, rows) {
            if row < col {
                //triu terms only
                tmp1 += Mv * x[row];
                tmp2 += Mv * y[row];
            } else if row == col {
                out += Mv * x[col] * y[col];
            }
        }
        out += tmp1 * y[col] + tmp2 * x[col];
    }
    out
}

// sparse matrix-vector multiply, no transpose
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);

    //first do the b*y part
    if b == T::zero() {
        y.fill(T::zero());
    } else if b != T::one() {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    for (j, &xj) in x.iter().enumerate() {
        let axj = a * xj;
        for i in A.colptr[j]..A.colptr[j + 1] {
            y[A.rowval[i]] += A.nzval[i] * axj;
        }
    }
}

// sparse matrix-vector multiply, transposed
fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);

    if b == T::zero() {
        y.fill(T::zero());
    } else if b != T::one() {
        y.scale(b);
    }

    if a == T::zero() {
        return;
    }

    for (j, yj) in y.iter_mut().enumerate() {
        let mut acc = T::zero();
        for k in A.colptr[j]..A.colptr[j + 1] {
            acc += A.nzval[k] * x[A.rowval[k]];
        }
        *yj += a * acc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemv() {
        let A = CscMatrix::from(&[
            [1., 0., 2.],
            [0., 3., 0.]]);
        let x = [1., 2., 3.];
        let mut y = [1., 1.];
        A.gemv(&mut y, &x, 1.0, 2.0);
        assert_eq!(y, [9., 8.]);

        let mut z = [0.; 3];
        A.t().gemv(&mut z, &[1., -1.], 2.0, 0.0);
        assert_eq!(z, [2., -6., 4.]);
    }

    #[test]
    fn test_symv_and_quad_form() {
        // triu of [4 1; 1 2]
        let P = CscMatrix::from(&[
            [4., 1.],
            [0., 2.]]);
        let x = [1., -1.];
        let mut y = [0.; 2];
        P.sym().symv(&mut y, &x, 1.0, 0.0);
        assert_eq!(y, [3., -1.]);
        assert_eq!(P.quad_form(&x, &x), 4.);
    }

    #[test]
    fn test_norms_and_scaling() {
        let mut A = CscMatrix::from(&[
            [1., -5., 0.],
            [0., 3., -2.]]);
        let mut cn = [0.; 3];
        A.col_norms_no_reset(&mut cn);
        assert_eq!(cn, [1., 5., 2.]);

        let mut rn = [0.; 2];
        A.row_norms_no_reset(&mut rn);
        assert_eq!(rn, [5., 3.]);

        A.lrscale(&[2., 1.], &[1., 0.5, 1.]);
        assert_eq!(A.nzval, vec![2., -5., 1.5, -2.]);

        let P = CscMatrix::from(&[
            [1., -7.],
            [0., 3.]]);
        let mut pn = [0.; 2];
        P.col_norms_sym_no_reset(&mut pn);
        assert_eq!(pn, [7., 7.]);
    }
}
