#![allow(non_snake_case)]

use super::*;
use std::iter::zip;

/// KKT engine for dense problems.
///
/// Eliminates `dy` and `dz` and factors the positive definite matrix
/// `P + diag(x_reg) + A'A/δ + G'diag(1/z_reg)G` with a dense Cholesky
/// decomposition.
#[derive(Debug, Clone)]
pub struct DenseKKTEngine<T> {
    P: Matrix<T>,
    A: Matrix<T>,
    G: Matrix<T>,

    // regularization of the last factorization
    delta: T,
    z_reg: Vec<T>,

    // reduced matrix and its factors
    kkt: Matrix<T>,
    chol: CholeskyEngine<T>,

    work_y: Vec<T>,
    work_z: Vec<T>,
}

impl<T: FloatT> KKTEngine<T, Matrix<T>> for DenseKKTEngine<T> {
    fn new(P: &Matrix<T>, A: &Matrix<T>, G: &Matrix<T>) -> Result<Self, KKTError> {
        let n = P.nrows();
        let (p, m) = (A.nrows(), G.nrows());

        Ok(Self {
            P: P.clone(),
            A: A.clone(),
            G: G.clone(),
            delta: T::one(),
            z_reg: vec![T::one(); m],
            kkt: Matrix::zeros((n, n)),
            chol: CholeskyEngine::new(n),
            work_y: vec![T::zero(); p],
            work_z: vec![T::zero(); m],
        })
    }

    fn update_data(&mut self, P: &Matrix<T>, A: &Matrix<T>, G: &Matrix<T>) {
        self.P.data.copy_from(&P.data);
        self.A.data.copy_from(&A.data);
        self.G.data.copy_from(&G.data);
    }

    fn factorize(&mut self, x_reg: &[T], delta: T, z_reg: &[T]) -> bool {
        self.delta = delta;
        self.z_reg.copy_from(z_reg);

        // only the upper triangle is formed.  Cholesky never reads below.
        let kkt = &mut self.kkt;
        kkt.data.copy_from(&self.P.data);
        for (i, &xi) in x_reg.iter().enumerate() {
            kkt[(i, i)] += xi;
        }

        let δinv = T::recip(delta);
        for k in 0..self.A.nrows() {
            _add_upper_outer(kkt, self.A.row_slice(k), δinv);
        }
        for (k, &zk) in self.z_reg.iter().enumerate() {
            _add_upper_outer(kkt, self.G.row_slice(k), T::recip(zk));
        }

        self.chol.cholesky(kkt).is_ok()
    }

    fn solve(
        &mut self,
        rhs_x: &[T],
        rhs_y: &[T],
        rhs_z: &[T],
        lhs_x: &mut [T],
        lhs_y: &mut [T],
        lhs_z: &mut [T],
    ) {
        let δ = self.delta;

        // dx = Φ⁻¹(bx + A'by/δ + G'diag(1/z_reg)bz)
        self.work_y.copy_from(rhs_y).scale(T::recip(δ));
        self.work_z.copy_from(rhs_z).hadamard_div(&self.z_reg);

        lhs_x.copy_from(rhs_x);
        self.A.t().gemv(lhs_x, &self.work_y, T::one(), T::one());
        self.G.t().gemv(lhs_x, &self.work_z, T::one(), T::one());
        self.chol.solve(lhs_x);

        // dy = (A dx - by)/δ
        lhs_y.copy_from(rhs_y);
        self.A.gemv(lhs_y, lhs_x, T::recip(δ), -T::recip(δ));

        // dz = (G dx - bz)/z_reg
        lhs_z.copy_from(rhs_z);
        self.G.gemv(lhs_z, lhs_x, T::one(), -T::one());
        lhs_z.hadamard_div(&self.z_reg);
    }
}

// K[i,j] += s*a[i]*a[j] for i ≤ j
fn _add_upper_outer<T: FloatT>(K: &mut Matrix<T>, a: &[T], s: T) {
    for (i, &ai) in a.iter().enumerate() {
        if ai == T::zero() {
            continue;
        }
        let sai = s * ai;
        for (Kij, &aj) in zip(&mut K.row_slice_mut(i)[i..], &a[i..]) {
            *Kij += sai * aj;
        }
    }
}

#[test]
fn test_add_upper_outer() {
    let mut K = Matrix::<f64>::zeros((3, 3));
    _add_upper_outer(&mut K, &[1., 0., 2.], 0.5);
    assert_eq!(K.data, vec![0.5, 0., 1., 0., 0., 0., 0., 0., 2.]);
}
