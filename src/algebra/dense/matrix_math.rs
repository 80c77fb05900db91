#![allow(non_snake_case)]

use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for Matrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);

        for (i, yi) in y.iter_mut().enumerate() {
            let Ax = self.row_slice(i).dot(x);
            *yi = if b == T::zero() { a * Ax } else { a * Ax + b * *yi };
        }
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, Matrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert_eq!(x.len(), A.m);
        assert_eq!(y.len(), A.n);

        if b == T::zero() {
            y.fill(T::zero());
        } else if b != T::one() {
            y.scale(b);
        }
        for (i, &xi) in x.iter().enumerate() {
            if xi != T::zero() {
                y.axpby(a * xi, A.row_slice(i), T::one());
            }
        }
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, Matrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let A = self.src;
        assert!(A.is_square());
        assert_eq!(x.len(), A.n);
        assert_eq!(y.len(), A.n);

        if b == T::zero() {
            y.fill(T::zero());
        } else if b != T::one() {
            y.scale(b);
        }
        for i in 0..A.n {
            let row = &A.row_slice(i)[i..];
            // diagonal and strict upper part of row i
            y[i] += a * row.dot(&x[i..]);
            // mirrored strict upper part contributes to y[j], j > i
            let axi = a * x[i];
            for (yj, &Aij) in zip(&mut y[i + 1..], &row[1..]) {
                *yj += Aij * axi;
            }
        }
    }
}

impl<T: FloatT> MatrixMath for Matrix<T> {
    type T = T;

    fn scale(&mut self, c: T) {
        self.data.scale(c);
    }

    fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        for i in 0..self.m {
            for (v, &Aij) in zip(norms.iter_mut(), self.row_slice(i)) {
                *v = T::max(*v, T::abs(Aij));
            }
        }
    }

    fn col_norms_sym_no_reset(&self, norms: &mut [T]) {
        assert!(self.is_square());
        assert_eq!(norms.len(), self.n);
        for i in 0..self.n {
            for j in i..self.n {
                let tmp = T::abs(self[(i, j)]);
                norms[i] = T::max(norms[i], tmp);
                norms[j] = T::max(norms[j], tmp);
            }
        }
    }

    fn row_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        for (i, v) in norms.iter_mut().enumerate() {
            *v = T::max(*v, self.row_slice(i).norm_inf());
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);
        for (i, &li) in l.iter().enumerate() {
            for (Aij, &rj) in zip(self.row_slice_mut(i), r) {
                *Aij *= li * rj;
            }
        }
    }

    fn quad_form(&self, y: &[T], x: &[T]) -> T {
        assert!(self.is_square());
        let mut out = T::zero();
        for i in 0..self.n {
            out += self[(i, i)] * x[i] * y[i];
            for j in (i + 1)..self.n {
                out += self[(i, j)] * (x[i] * y[j] + x[j] * y[i]);
            }
        }
        out
    }
}
