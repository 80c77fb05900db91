#![allow(non_snake_case)]

use crate::algebra::DenseFactorizationError;
use faer::{
    dyn_stack::{MemBuffer, MemStack},
    linalg::cholesky::llt::{
        factor::{cholesky_in_place, cholesky_in_place_scratch, LltParams, LltRegularization},
        solve::{solve_in_place_scratch, solve_in_place_with_conj},
    },
    Conj, MatMut, MatRef, Par, Spec,
};

// Dense factorization kernels, provided by faer for the float types
// it supports.  Matrices are square, column major and of dimension n.
pub trait DenseFactorFloatT: Sized {
    // LLᵀ factorization in place.  Only the lower triangle of `a` is
    // referenced and overwritten with L.  Fails on a non-positive pivot.
    fn xpotrf(n: usize, a: &mut [Self]) -> Result<(), DenseFactorizationError>;

    // solves LLᵀx = b in place, with L from `xpotrf`
    fn xpotrs(n: usize, L: &[Self], b: &mut [Self]);
}

macro_rules! impl_dense_factor {
    ($T:ty) => {
        impl DenseFactorFloatT for $T {
            fn xpotrf(n: usize, a: &mut [Self]) -> Result<(), DenseFactorizationError> {
                let params: Spec<LltParams, $T> = Default::default();
                let mut work = MemBuffer::new(cholesky_in_place_scratch::<$T>(n, Par::Seq, params));
                let A = MatMut::from_column_major_slice_mut(a, n, n);

                cholesky_in_place(
                    A,
                    LltRegularization::default(),
                    Par::Seq,
                    MemStack::new(&mut work),
                    params,
                )
                .map(|_| ())
                .map_err(|_| DenseFactorizationError::NonPositivePivot)
            }

            fn xpotrs(n: usize, L: &[Self], b: &mut [Self]) {
                let mut work = MemBuffer::new(solve_in_place_scratch::<$T>(n, 1, Par::Seq));
                let L = MatRef::from_column_major_slice(L, n, n);
                let rhs = MatMut::from_column_major_slice_mut(b, n, 1);

                solve_in_place_with_conj(L, Conj::No, rhs, Par::Seq, MemStack::new(&mut work));
            }
        }
    };
}
impl_dense_factor!(f32);
impl_dense_factor!(f64);
