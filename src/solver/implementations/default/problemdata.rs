#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::kktsolvers::KKTError;
use crate::solver::PIQP_INF;
use thiserror::Error;

/// Error type returned when constructing a solver from inconsistent data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Incompatible dimension for \"{0}\"")]
    IncompatibleDimension(&'static str),
    #[error("Data formatting error")]
    BadFormat(#[from] SparseFormatError),
    #[error("KKT system setup failed")]
    KKTSetup(#[from] KKTError),
}

// ---------------
// Data type for the QP
//
//   min  ½x'Px + c'x
//   s.t. Ax  = b
//        Gx ≤ h
//        x_lb ≤ x ≤ x_ub
// ---------------

/// Problem data held by the solver, stored in scaled form.
///
/// Finite bounds are packed: `x_lb[k]` is the (scaled) lower bound on
/// variable `x_lb_idx[k]` for `k < n_lb`, and likewise for the upper
/// bounds.  Entries past `n_lb` / `n_ub` are unused.

#[derive(Debug, Clone)]
pub struct ProblemData<T, M> {
    pub n: usize,
    pub p: usize,
    pub m: usize,

    // upper triangle of P
    pub P: M,
    pub c: Vec<T>,
    pub A: M,
    pub b: Vec<T>,
    pub G: M,
    pub h: Vec<T>,

    pub x_lb: Vec<T>,
    pub x_ub: Vec<T>,
    pub x_lb_idx: Vec<usize>,
    pub x_ub_idx: Vec<usize>,
    pub n_lb: usize,
    pub n_ub: usize,

    pub equilibration: EquilibrationData<T>,
}

impl<T, M> ProblemData<T, M>
where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        P: &M,
        c: &[T],
        A: &M,
        b: &[T],
        G: &M,
        h: &[T],
        x_lb: Option<&[T]>,
        x_ub: Option<&[T]>,
    ) -> Result<Self, SetupError> {
        let n = c.len();
        let (p, m) = (b.len(), h.len());

        check_matrix(P, "P", n, n)?;
        check_matrix(A, "A", p, n)?;
        check_matrix(G, "G", m, n)?;
        check_bounds(x_lb, "x_lb", n)?;
        check_bounds(x_ub, "x_ub", n)?;

        let mut data = Self {
            n,
            p,
            m,
            P: P.triu(),
            c: c.to_vec(),
            A: A.clone(),
            b: b.to_vec(),
            G: G.clone(),
            h: h.to_vec(),
            x_lb: vec![T::zero(); n],
            x_ub: vec![T::zero(); n],
            x_lb_idx: vec![0; n],
            x_ub_idx: vec![0; n],
            n_lb: 0,
            n_ub: 0,
            equilibration: EquilibrationData::new(n, p, m),
        };
        data.set_lower_bounds(x_lb);
        data.set_upper_bounds(x_ub);

        Ok(data)
    }

    /// Number of complementarity pairs, i.e. inequalities plus finite bounds
    pub fn n_complementarity(&self) -> usize {
        self.m + self.n_lb + self.n_ub
    }

    // Packs finite lower bounds.  Values are stored unscaled.
    pub(crate) fn set_lower_bounds(&mut self, x_lb: Option<&[T]>) {
        self.n_lb = 0;
        let Some(x_lb) = x_lb else { return };
        let threshold: T = PIQP_INF.as_T();
        let threshold = -threshold;
        for (i, &v) in x_lb.iter().enumerate() {
            if v > threshold {
                self.x_lb_idx[self.n_lb] = i;
                self.x_lb[self.n_lb] = v;
                self.n_lb += 1;
            }
        }
    }

    // Packs finite upper bounds.  Values are stored unscaled.
    pub(crate) fn set_upper_bounds(&mut self, x_ub: Option<&[T]>) {
        self.n_ub = 0;
        let Some(x_ub) = x_ub else { return };
        let threshold: T = PIQP_INF.as_T();
        for (i, &v) in x_ub.iter().enumerate() {
            if v < threshold {
                self.x_ub_idx[self.n_ub] = i;
                self.x_ub[self.n_ub] = v;
                self.n_ub += 1;
            }
        }
    }

    /// Full length bound vectors in the user's coordinates, with
    /// `∓∞` at absent bounds
    pub fn unscaled_bounds(&self) -> (Vec<T>, Vec<T>) {
        let d = &self.equilibration.d;
        let mut lb = vec![T::neg_infinity(); self.n];
        let mut ub = vec![T::infinity(); self.n];
        for (&i, &v) in self.x_lb_idx[..self.n_lb].iter().zip(&self.x_lb) {
            lb[i] = v * d[i];
        }
        for (&i, &v) in self.x_ub_idx[..self.n_ub].iter().zip(&self.x_ub) {
            ub[i] = v * d[i];
        }
        (lb, ub)
    }
}

pub(crate) fn check_matrix<T: FloatT, M: ProblemMatrix<T>>(
    M: &M,
    name: &'static str,
    nrows: usize,
    ncols: usize,
) -> Result<(), SetupError> {
    if M.nrows() != nrows || M.ncols() != ncols {
        return Err(SetupError::IncompatibleDimension(name));
    }
    M.check_format()?;
    Ok(())
}

pub(crate) fn check_bounds<T>(v: Option<&[T]>, name: &'static str, n: usize) -> Result<(), SetupError> {
    match v {
        Some(v) if v.len() != n => Err(SetupError::IncompatibleDimension(name)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_packing() {
        let P = CscMatrix::<f64>::identity(4);
        let A = CscMatrix::zeros(0, 4);
        let G = CscMatrix::zeros(0, 4);
        let lb = [0.0, -f64::INFINITY, -2.0, -1e30];
        let ub = [1e31, 3.0, f64::INFINITY, 5.0];

        let data =
            ProblemData::new(&P, &[0.; 4], &A, &[], &G, &[], Some(&lb[..]), Some(&ub[..])).unwrap();

        assert_eq!(data.n_lb, 2);
        assert_eq!(&data.x_lb_idx[..2], &[0, 2]);
        assert_eq!(&data.x_lb[..2], &[0.0, -2.0]);
        assert_eq!(data.n_ub, 2);
        assert_eq!(&data.x_ub_idx[..2], &[1, 3]);
        assert_eq!(data.n_complementarity(), 4);

        let (lb, ub) = data.unscaled_bounds();
        assert_eq!(lb[1], f64::NEG_INFINITY);
        assert_eq!(ub[3], 5.0);
    }

    #[test]
    fn test_dimension_checks() {
        let P = Matrix::<f64>::identity(2);
        let A = Matrix::zeros((1, 2));
        let G = Matrix::zeros((1, 3));

        let err = ProblemData::new(&P, &[0.; 2], &A, &[1.], &G, &[1.], None, None).unwrap_err();
        assert_eq!(err, SetupError::IncompatibleDimension("G"));

        let G = Matrix::zeros((1, 2));
        let err = ProblemData::new(&P, &[0.; 2], &A, &[], &G, &[1.], None, None).unwrap_err();
        assert_eq!(err, SetupError::IncompatibleDimension("A"));

        let err = ProblemData::new(&P, &[0.; 2], &A, &[1.], &G, &[1.], Some(&[0.; 3][..]), None)
            .unwrap_err();
        assert_eq!(err, SetupError::IncompatibleDimension("x_lb"));
    }
}
