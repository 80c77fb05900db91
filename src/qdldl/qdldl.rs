#![allow(non_snake_case)]
use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`](QDLDLFactorisation) factor operations

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot")]
    ZeroPivot,
    #[error("Matrix factorization produced a non-finite pivot")]
    NonFinitePivot,
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("AMD ordering failed")]
    OrderingFailed,
}

/// Settings for [`QDLDLFactorisation`](QDLDLFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings {
    /// multiplier applied to the default AMD dense row threshold
    #[builder(default = "1.5")]
    pub amd_dense_scale: f64,
    /// user supplied fill reducing permutation.  AMD is used if `None`.
    #[builder(default = "None", setter(strip_option))]
    pub perm: Option<Vec<usize>>,
    /// compute the symbolic structure only, deferring numeric work to
    /// [`refactor`](QDLDLFactorisation::refactor)
    #[builder(default = "false")]
    pub logical: bool,
}

impl Default for QDLDLSettings {
    fn default() -> QDLDLSettings {
        QDLDLSettings {
            amd_dense_scale: 1.5,
            perm: None,
            logical: false,
        }
    }
}

/// Performs $LDL^T$ factorization of a symmetric quasidefinite matrix
/// supplied as its upper triangle in CSC format.
///
/// The symbolic part (ordering, elimination tree and the sparsity of `L`)
/// is computed once on construction.  Numeric values may then be replaced
/// through [`update_values`](QDLDLFactorisation::update_values) and the
/// factors recomputed with [`refactor`](QDLDLFactorisation::refactor).

#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    // fill reducing permutation
    pub perm: Vec<usize>,
    // unit lower triangular factor (diagonal implied)
    pub L: CscMatrix<T>,
    // D and its inverse for PAPᵀ = LDLᵀ
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    workspace: QDLDLWorkspace<T>,
    // true until a numeric factorisation has succeeded
    is_logical: bool,
}

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<QDLDLSettings>,
    ) -> Result<QDLDLFactorisation<T>, QDLDLError> {
        check_structure(Ain)?;
        _qdldl_new(Ain, opts.unwrap_or_default())
    }

    /// Number of strictly positive entries in `D` from the last factorisation
    pub fn positive_inertia(&self) -> usize {
        self.workspace.positive_inertia
    }

    /// Dimension of the factored matrix
    pub fn dim(&self) -> usize {
        self.D.len()
    }

    /// Solves `Ax = b` in place using the current factors
    pub fn solve(&mut self, b: &mut [T]) {
        assert!(!self.is_logical, "solve called on a logical factorisation");
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.workspace.fwork;
        _permute(tmp, b, &self.perm);
        _solve(
            &self.L.colptr,
            &self.L.rowval,
            &self.L.nzval,
            &self.Dinv,
            tmp,
        );
        _ipermute(b, tmp, &self.perm);
    }

    /// Overwrite entries of the factorisation target.  `indices` refer to
    /// positions in the `nzval` of the matrix originally passed to
    /// [`new`](QDLDLFactorisation::new).
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        assert_eq!(indices.len(), values.len());
        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for (&idx, &v) in zip(indices, values) {
            nzval[AtoPAPt[idx]] = v;
        }
    }

    /// Numeric refactorisation with the current values
    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        // a failed refactor leaves the factors unusable
        self.is_logical = true;
        _factor(
            &mut self.L,
            &mut self.D,
            &mut self.Dinv,
            &mut self.workspace,
            false,
        )?;
        self.is_logical = false;
        Ok(())
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }

    // every column needs at least its diagonal
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }

    Ok(())
}

fn _qdldl_new<T: FloatT>(
    Ain: &CscMatrix<T>,
    opts: QDLDLSettings,
) -> Result<QDLDLFactorisation<T>, QDLDLError> {
    let n = Ain.nrows();

    let (perm, iperm) = match opts.perm {
        Some(perm) => {
            if perm.len() != n {
                return Err(QDLDLError::InvalidPermutation);
            }
            let iperm = _invperm(&perm)?;
            (perm, iperm)
        }
        None => _get_amd_ordering(Ain, opts.amd_dense_scale)?,
    };

    let (A, AtoPAPt) = _permute_symmetric(Ain, &iperm);

    let mut workspace = QDLDLWorkspace::<T>::new(A, AtoPAPt);

    let sumLnz = workspace.Lnz.iter().sum();
    let mut L = CscMatrix::spalloc(n, n, sumLnz);
    let mut D = vec![T::zero(); n];
    let mut Dinv = vec![T::zero(); n];

    _factor(&mut L, &mut D, &mut Dinv, &mut workspace, opts.logical)?;

    Ok(QDLDLFactorisation {
        perm,
        L,
        D,
        Dinv,
        workspace,
        is_logical: opts.logical,
    })
}

#[derive(Debug)]
struct QDLDLWorkspace<T> {
    etree: Vec<usize>,
    Lnz: Vec<usize>,
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    positive_inertia: usize,

    // permuted upper triangle PAPᵀ that is actually factored
    triuA: CscMatrix<T>,

    // position of each input nonzero within triuA
    AtoPAPt: Vec<usize>,
}

impl<T> QDLDLWorkspace<T>
where
    T: FloatT,
{
    fn new(triuA: CscMatrix<T>, AtoPAPt: Vec<usize>) -> Self {
        let n = triuA.ncols();
        let mut etree = vec![0; n];
        let mut Lnz = vec![0; n];
        let mut iwork = vec![0; n * 3];

        _etree(n, &triuA.colptr, &triuA.rowval, &mut iwork, &mut Lnz, &mut etree);

        Self {
            etree,
            Lnz,
            iwork,
            bwork: vec![false; n],
            fwork: vec![T::zero(); n],
            positive_inertia: 0,
            triuA,
            AtoPAPt,
        }
    }
}

fn _factor<T: FloatT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    workspace: &mut QDLDLWorkspace<T>,
    logical: bool,
) -> Result<(), QDLDLError> {
    if logical {
        L.nzval.fill(T::zero());
        D.fill(T::zero());
        Dinv.fill(T::zero());
    }

    let A = &workspace.triuA;
    let mut factors = LFactorParts {
        Lp: &mut L.colptr,
        Li: &mut L.rowval,
        Lx: &mut L.nzval,
        D,
        Dinv,
    };

    let positive = _factor_inner(
        A,
        &mut factors,
        &workspace.Lnz,
        &workspace.etree,
        &mut workspace.bwork,
        &mut workspace.iwork,
        &mut workspace.fwork,
        logical,
    )?;
    workspace.positive_inertia = positive;

    Ok(())
}

const QDLDL_UNKNOWN: usize = usize::MAX;
const QDLDL_USED: bool = true;
const QDLDL_UNUSED: bool = false;

// Elimination tree and column counts of L for an upper triangular CSC matrix.
fn _etree(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    work: &mut [usize],
    Lnz: &mut [usize],
    etree: &mut [usize],
) {
    work.fill(0);
    Lnz.fill(0);
    etree.fill(QDLDL_UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for &row in &Ai[Ap[j]..Ap[j + 1]] {
            let mut i = row;
            while work[i] != j {
                if etree[i] == QDLDL_UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1;
                work[i] = j;
                i = etree[i];
            }
        }
    }
}

struct LFactorParts<'a, T> {
    Lp: &'a mut [usize],
    Li: &'a mut [usize],
    Lx: &'a mut [T],
    D: &'a mut [T],
    Dinv: &'a mut [T],
}

// Accepts a computed pivot, returning true if it is positive.
fn _accept_pivot<T: FloatT>(d: T) -> Result<bool, QDLDLError> {
    if d == T::zero() {
        return Err(QDLDLError::ZeroPivot);
    }
    if !d.is_finite() {
        return Err(QDLDLError::NonFinitePivot);
    }
    Ok(d > T::zero())
}

// Up-looking LDLᵀ.  Row k of L solves L[0..k,0..k] y = A[0..k,k] using
// the elimination tree to find its nonzero pattern.  Returns the number
// of positive pivots.
#[allow(clippy::too_many_arguments)]
fn _factor_inner<T: FloatT>(
    A: &CscMatrix<T>,
    F: &mut LFactorParts<'_, T>,
    Lnz: &[usize],
    etree: &[usize],
    y_markers: &mut [bool],
    iwork: &mut [usize],
    y_vals: &mut [T],
    logical_factor: bool,
) -> Result<usize, QDLDLError> {
    let n = A.n;
    let (Ap, Ai, Ax) = (&A.colptr, &A.rowval, &A.nzval);
    let mut positive = 0;

    let (y_idx, iwork) = iwork.split_at_mut(n);
    let (elim_buffer, next_colspace) = iwork.split_at_mut(n);

    F.Lp[0] = 0;
    let mut acc = 0;
    for (p, nz) in zip(&mut F.Lp[1..], Lnz) {
        acc += nz;
        *p = acc;
    }

    y_markers.fill(QDLDL_UNUSED);
    y_vals.fill(T::zero());
    F.D.fill(T::zero());
    next_colspace.copy_from_slice(&F.Lp[0..n]);

    if n == 0 {
        return Ok(0);
    }

    if !logical_factor {
        F.D[0] = Ax[0];
        if _accept_pivot(F.D[0])? {
            positive += 1;
        }
        F.Dinv[0] = T::recip(F.D[0]);
    }

    for k in 1..n {
        let mut nnz_y = 0;

        // pattern of row k of L
        for i in Ap[k]..Ap[k + 1] {
            let bidx = Ai[i];
            if bidx == k {
                F.D[k] = Ax[i];
                continue;
            }

            y_vals[bidx] = Ax[i];

            if y_markers[bidx] == QDLDL_UNUSED {
                y_markers[bidx] = QDLDL_USED;
                elim_buffer[0] = bidx;
                let mut nnz_e = 1;

                let mut next_idx = etree[bidx];
                while next_idx != QDLDL_UNKNOWN && next_idx < k {
                    if y_markers[next_idx] == QDLDL_USED {
                        break;
                    }
                    y_markers[next_idx] = QDLDL_USED;
                    elim_buffer[nnz_e] = next_idx;
                    next_idx = etree[next_idx];
                    nnz_e += 1;
                }

                // reverse into topological order
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }
        }

        // values of row k of L
        for &cidx in y_idx[0..nnz_y].iter().rev() {
            let tmp_idx = next_colspace[cidx];

            if !logical_factor {
                let y_cidx = y_vals[cidx];
                let start = F.Lp[cidx];
                for (&Lij, &Lxj) in zip(&F.Li[start..tmp_idx], &F.Lx[start..tmp_idx]) {
                    y_vals[Lij] -= Lxj * y_cidx;
                }
                F.Lx[tmp_idx] = y_cidx * F.Dinv[cidx];
                F.D[k] -= y_cidx * F.Lx[tmp_idx];
            }

            F.Li[tmp_idx] = k;
            next_colspace[cidx] += 1;

            y_vals[cidx] = T::zero();
            y_markers[cidx] = QDLDL_UNUSED;
        }

        if !logical_factor {
            if _accept_pivot(F.D[k])? {
                positive += 1;
            }
            F.Dinv[k] = T::recip(F.D[k]);
        }
    }

    Ok(positive)
}

// Solves (L+I)x = b in place
fn _lsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        let (f, l) = (Lp[i], Lp[i + 1]);
        for (&Lij, &Lxj) in zip(&Li[f..l], &Lx[f..l]) {
            x[Lij] -= Lxj * xi;
        }
    }
}

// Solves (L+I)ᵀx = b in place
fn _ltsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let (f, l) = (Lp[i], Lp[i + 1]);
        let s = zip(&Li[f..l], &Lx[f..l]).fold(T::zero(), |s, (&Lij, &Lxj)| s + Lxj * x[Lij]);
        x[i] -= s;
    }
}

fn _solve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], Dinv: &[T], b: &mut [T]) {
    _lsolve(Lp, Li, Lx, b);
    zip(b.iter_mut(), Dinv).for_each(|(b, d)| *b *= *d);
    _ltsolve(Lp, Li, Lx, b);
}

fn _invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let mut b = vec![QDLDL_UNKNOWN; p.len()];
    for (i, &j) in p.iter().enumerate() {
        if j < p.len() && b[j] == QDLDL_UNKNOWN {
            b[j] = i;
        } else {
            return Err(QDLDLError::InvalidPermutation);
        }
    }
    Ok(b)
}

fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Upper triangle of PAPᵀ from the upper triangle of A, together with the
// position of every entry of A inside the result.  Rows within a column of
// the result are not sorted.
fn _permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.ncols();
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    let (Ac, Ar, Av) = (&A.colptr, &A.rowval, &A.nzval);

    // entries per column of P
    let mut next = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for &rowA in Ar[Ac[colA]..Ac[colA + 1]].iter().filter(|&&r| r <= colA) {
            next[max(iperm[rowA], colP)] += 1;
        }
    }

    P.colptr[0] = 0;
    let mut acc = 0;
    for (c, cnt) in zip(&mut P.colptr[1..], next.iter_mut()) {
        let start = acc;
        acc += *cnt;
        *c = acc;
        *cnt = start;
    }

    for colA in 0..n {
        let colP = iperm[colA];
        for idx in Ac[colA]..Ac[colA + 1] {
            let rowA = Ar[idx];
            if rowA > colA {
                continue;
            }
            let rowP = iperm[rowA];
            let col = max(colP, rowP);
            let dest = next[col];
            P.rowval[dest] = min(colP, rowP);
            P.nzval[dest] = Av[idx];
            AtoPAPt[idx] = dest;
            next[col] += 1;
        }
    }
    (P, AtoPAPt)
}

fn _get_amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    if A.nrows() == 0 {
        return Ok((vec![], vec![]));
    }
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::OrderingFailed)?;
    Ok((perm, iperm))
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
