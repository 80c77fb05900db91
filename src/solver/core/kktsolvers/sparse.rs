#![allow(non_snake_case)]

use super::*;
use crate::qdldl::*;

// ---------------
// index maps from the problem matrices into the KKT matrix
// ---------------

#[derive(Debug, Clone)]
struct KKTDataMap {
    P: Vec<usize>,
    A: Vec<usize>,
    G: Vec<usize>,
    // the full diagonal, ordered as x, y, z blocks
    diag_full: Vec<usize>,
}

impl KKTDataMap {
    fn new<T: FloatT>(P: &CscMatrix<T>, A: &CscMatrix<T>, G: &CscMatrix<T>) -> Self {
        let dim = P.nrows() + A.nrows() + G.nrows();
        Self {
            P: vec![0; P.nnz()],
            A: vec![0; A.nnz()],
            G: vec![0; G.nnz()],
            diag_full: vec![0; dim],
        }
    }
}

/// KKT engine for sparse problems.
///
/// The quasidefinite KKT matrix is assembled once as an upper triangle
/// in CSC format.  The fill reducing ordering and the symbolic
/// factorization are computed on construction, after which every
/// [`factorize`](KKTEngine::factorize) only replaces values and
/// performs a numeric LDLᵀ refactorization.
#[derive(Debug)]
pub struct SparseKKTEngine<T> {
    n: usize,
    map: KKTDataMap,

    // diagonal of P, zero where P has no structural entry
    P_diag: Vec<T>,
    // values written to the diagonal of the KKT matrix
    diag_values: Vec<T>,

    ldl: QDLDLFactorisation<T>,
    work: Vec<T>,
}

impl<T: FloatT> KKTEngine<T, CscMatrix<T>> for SparseKKTEngine<T> {
    fn new(P: &CscMatrix<T>, A: &CscMatrix<T>, G: &CscMatrix<T>) -> Result<Self, KKTError> {
        let n = P.nrows();
        let (K, map) = _assemble_kkt_matrix(P, A, G);

        // allocate memory only on init
        let opts = QDLDLSettings {
            logical: true,
            ..QDLDLSettings::default()
        };
        let ldl = QDLDLFactorisation::new(&K, Some(opts))?;

        let mut P_diag = vec![T::zero(); n];
        _diagonal_values(P, &mut P_diag);

        Ok(Self {
            n,
            map,
            P_diag,
            diag_values: vec![T::zero(); K.nrows()],
            ldl,
            work: vec![T::zero(); K.nrows()],
        })
    }

    fn update_data(&mut self, P: &CscMatrix<T>, A: &CscMatrix<T>, G: &CscMatrix<T>) {
        self.ldl.update_values(&self.map.P, &P.nzval);
        self.ldl.update_values(&self.map.A, &A.nzval);
        self.ldl.update_values(&self.map.G, &G.nzval);
        _diagonal_values(P, &mut self.P_diag);
    }

    fn factorize(&mut self, x_reg: &[T], delta: T, z_reg: &[T]) -> bool {
        let n = self.n;
        let p = self.diag_values.len() - n - z_reg.len();

        let (dx, rest) = self.diag_values.split_at_mut(n);
        let (dy, dz) = rest.split_at_mut(p);
        dx.waxpby(T::one(), &self.P_diag, T::one(), x_reg);
        dy.set(-delta);
        dz.scalarop_from(|v| -v, z_reg);

        self.ldl.update_values(&self.map.diag_full, &self.diag_values);

        if self.ldl.refactor().is_err() {
            return false;
        }
        self.ldl.D.is_finite() && self.ldl.positive_inertia() == n
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
        let (n, p) = (lhs_x.len(), lhs_y.len());
        let work = &mut self.work;
        work[..n].copy_from(rhs_x);
        work[n..n + p].copy_from(rhs_y);
        work[n + p..].copy_from(rhs_z);

        self.ldl.solve(work);

        lhs_x.copy_from(&work[..n]);
        lhs_y.copy_from(&work[n..n + p]);
        lhs_z.copy_from(&work[n + p..]);
    }
}

// ---------------
// KKT assembly
// ---------------

//   [ P   A'  G' ]
//   [     -δI    ]     (upper triangle only)
//   [         -Z ]
fn _assemble_kkt_matrix<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    G: &CscMatrix<T>,
) -> (CscMatrix<T>, KKTDataMap) {
    let n = P.nrows();
    let (p, m) = (A.nrows(), G.nrows());
    let dim = n + p + m;

    let mut map = KKTDataMap::new(P, A, G);

    // entries actually on the diagonal of P
    let nnz_diagP = (0..n).filter(|&j| _has_diagonal(P, j)).count();

    let nnzKKT = P.nnz() +      // Number of elements in P
    n -                         // Number of elements in diagonal top left block
    nnz_diagP +                 // remove double count on the diagonal if P has entries
    A.nnz() + G.nnz() +         // Number of nonzeros in A and G
    p + m; // diagonal of the lower right blocks

    let mut K = CscMatrix::<T>::spalloc(dim, dim, nnzKKT);

    // use K.colptr to hold nnz entries in each
    // column of the KKT matrix
    K.colptr.fill(0);
    for j in 0..n {
        K.colptr[j] += P.colptr[j + 1] - P.colptr[j];
        if !_has_diagonal(P, j) {
            K.colptr[j] += 1;
        }
    }
    for (M, offset) in [(A, n), (G, n + p)] {
        for &row in M.rowval.iter() {
            K.colptr[offset + row] += 1;
        }
        for i in 0..M.nrows() {
            K.colptr[offset + i] += 1;
        }
    }

    // cumsum total entries to convert to K.colptr
    let mut currentptr = 0;
    for ptr in K.colptr.iter_mut() {
        let count = *ptr;
        *ptr = currentptr;
        currentptr += count;
    }

    // fill P, appending structural zeros on its missing diagonal.
    // rows are ordered within each column, so the diagonal lands last.
    for j in 0..n {
        for k in P.colptr[j]..P.colptr[j + 1] {
            map.P[k] = _push_entry(&mut K, P.rowval[k], j, P.nzval[k]);
        }
        if !_has_diagonal(P, j) {
            _push_entry(&mut K, j, j, T::zero());
        }
    }

    // fill A' and G' by rows, then the diagonal below them
    for (M, Mmap, offset) in [(A, &mut map.A, n), (G, &mut map.G, n + p)] {
        for j in 0..n {
            for k in M.colptr[j]..M.colptr[j + 1] {
                Mmap[k] = _push_entry(&mut K, j, offset + M.rowval[k], M.nzval[k]);
            }
        }
        for i in 0..M.nrows() {
            _push_entry(&mut K, offset + i, offset + i, T::zero());
        }
    }

    // backshift the colptrs to recover K.colptr again
    for i in (1..K.colptr.len()).rev() {
        K.colptr[i] = K.colptr[i - 1];
    }
    K.colptr[0] = 0;

    // matrix is triu, so diagonal is last in each column
    map.diag_full.copy_from_slice(&K.colptr[1..]);
    map.diag_full.iter_mut().for_each(|x| *x -= 1);

    (K, map)
}

// place an entry at the next free slot of column `col` and return its index
fn _push_entry<T: FloatT>(K: &mut CscMatrix<T>, row: usize, col: usize, val: T) -> usize {
    let dest = K.colptr[col];
    K.rowval[dest] = row;
    K.nzval[dest] = val;
    K.colptr[col] += 1;
    dest
}

// P is triu with sorted rows, so any diagonal entry is last in its column
fn _has_diagonal<T>(P: &CscMatrix<T>, col: usize) -> bool {
    let (start, stop) = (P.colptr[col], P.colptr[col + 1]);
    stop > start && P.rowval[stop - 1] == col
}

fn _diagonal_values<T: FloatT>(P: &CscMatrix<T>, out: &mut [T]) {
    for (j, v) in out.iter_mut().enumerate() {
        *v = if _has_diagonal(P, j) {
            P.nzval[P.colptr[j + 1] - 1]
        } else {
            T::zero()
        };
    }
}
