use super::*;
use crate::algebra::{CscMatrix, FloatT};

// upper triangle of
//[ 8.0  -3.0   2.0    ⋅ ]
//[ -3.0  8.0  -1.0    ⋅ ]
//[ 2.0  -1.0   8.0  -1.0]
//[  ⋅     ⋅   -1.0   1.0]
fn test_matrix_4x4() -> CscMatrix<f64> {
    CscMatrix::new(
        4,
        4,
        vec![0, 1, 3, 6, 8],
        vec![0, 0, 1, 0, 1, 2, 2, 3],
        vec![8., -3., 8., 2., -1., 8., -1., 1.],
    )
}

fn natural_order(n: usize) -> QDLDLSettings {
    QDLDLSettingsBuilder::default()
        .perm((0..n).collect())
        .build()
        .unwrap()
}

fn inf_norm_diff<T: FloatT>(a: &[T], b: &[T]) -> T {
    zip(a, b).fold(T::zero(), |acc, (x, y)| T::max(acc, T::abs(*x - *y)))
}

#[test]
fn test_invperm() {
    let iperm = _invperm(&[3, 0, 2, 1]).unwrap();
    assert_eq!(iperm, vec![1, 3, 2, 0]);

    // repeated index
    assert_eq!(_invperm(&[3, 0, 2, 0]), Err(QDLDLError::InvalidPermutation));
    // index out of range
    assert_eq!(_invperm(&[4, 0, 2, 1]), Err(QDLDLError::InvalidPermutation));
}

#[test]
fn test_permute_and_inverse() {
    let perm = vec![3, 0, 2, 1];
    let b = vec![1., 2., 3., 4.];
    let mut x = vec![0.; 4];
    let mut y = vec![0.; 4];

    _permute(&mut x, &b, &perm);
    assert_eq!(x, vec![4., 1., 3., 2.]);

    _ipermute(&mut y, &x, &perm);
    assert_eq!(y, b);
}

#[test]
fn test_triangular_solves() {
    //L =
    //[ ⋅    ⋅     ⋅    ⋅ ]
    //[1.0   ⋅     ⋅    ⋅ ]
    //[2.0  1.0    ⋅    ⋅ ]
    //[ ⋅   7.0  -3.0   ⋅ ]
    let Lp = vec![0, 2, 4, 5, 5];
    let Li = vec![1, 2, 2, 3, 3];
    let Lx = vec![1., 2., 1., 7., -3.];
    let dinv = [0.25, -1.0, -0.5, 1.0];
    let x = vec![-3., 2., 1., 4.];

    let mut b = vec![-3., -1., -3., 15.];
    _lsolve(&Lp, &Li, &Lx, &mut b);
    assert_eq!(b, x);

    let mut b = vec![1., 31., -11., 4.];
    _ltsolve(&Lp, &Li, &Lx, &mut b);
    assert_eq!(b, x);

    // (I+L)D(I+L)ᵀx = b
    let mut b = vec![4., -27., -1., -279.];
    _solve(&Lp, &Li, &Lx, &dinv, &mut b);
    assert_eq!(b, x);
}

#[test]
fn test_etree_and_counts() {
    let n = 4;
    let A = test_matrix_4x4();
    let mut Lnz = vec![0; n];
    let mut iwork = vec![0; 3 * n];
    let mut etree = vec![0; n];

    _etree(n, &A.colptr, &A.rowval, &mut iwork, &mut Lnz, &mut etree);

    assert_eq!(etree, vec![1, 2, 3, QDLDL_UNKNOWN]);
    assert_eq!(Lnz, vec![2, 1, 1, 0]);
}

#[test]
fn test_amd() {
    let A = test_matrix_4x4();
    let (perm, iperm) = _get_amd_ordering(&A, 1.5).unwrap();
    assert_eq!(perm, [3, 0, 1, 2]);
    assert_eq!(iperm, [1, 2, 3, 0]);
}

#[test]
fn test_permute_symmetric() {
    let A = test_matrix_4x4();
    let (P, AtoPAPt) = _permute_symmetric(&A, &[0, 1, 2, 3]);
    assert_eq!(&A.colptr, &P.colptr);
    assert_eq!(&A.rowval, &P.rowval);
    assert_eq!(&A.nzval, &P.nzval);
    assert_eq!(AtoPAPt, (0..A.nnz()).collect::<Vec<_>>());

    // label entries by position so the mapping is visible.
    // Rows within a permuted column are not sorted.
    let mut A = test_matrix_4x4();
    A.nzval.iter_mut().enumerate().for_each(|(i, v)| *v = i as f64 + 1.);

    let iperm = _invperm(&[2, 3, 0, 1]).unwrap();
    let (P, AtoPAPt) = _permute_symmetric(&A, &iperm);

    assert_eq!(&P.colptr, &vec![0, 1, 3, 5, 8]);
    assert_eq!(&P.rowval, &vec![0, 0, 1, 2, 0, 2, 3, 0]);
    assert_eq!(&P.nzval, &vec![6.0, 7.0, 8.0, 1.0, 4.0, 2.0, 3.0, 5.0]);
    for (idx, &dest) in AtoPAPt.iter().enumerate() {
        assert_eq!(P.nzval[dest], A.nzval[idx]);
    }
}

#[test]
fn test_settings_builder() {
    let opts = QDLDLSettings::default();
    assert_eq!(opts.amd_dense_scale, 1.5);
    assert!(opts.perm.is_none());
    assert!(!opts.logical);

    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1, 2, 3])
        .logical(true)
        .amd_dense_scale(2.0)
        .build()
        .unwrap();
    assert_eq!(opts.perm, Some(vec![0, 1, 2, 3]));
    assert!(opts.logical);
}

#[test]
fn test_solve_basic() {
    let A = test_matrix_4x4();
    let x = [1., -2., 3., -4.];

    // natural, amd and user orderings agree
    let orderings = [
        Some(natural_order(4)),
        None,
        Some(
            QDLDLSettingsBuilder::default()
                .perm(vec![3, 0, 2, 1])
                .build()
                .unwrap(),
        ),
    ];

    for opts in orderings {
        let mut factors = QDLDLFactorisation::new(&A, opts).unwrap();
        let mut b = [20.0, -22.0, 32.0, -7.0];
        factors.solve(&mut b);
        assert!(inf_norm_diff(&x, &b) <= 1e-8);
        assert_eq!(factors.positive_inertia(), 4);
    }
}

#[test]
#[should_panic]
fn test_solve_logical() {
    let A = test_matrix_4x4();
    let opts = QDLDLSettingsBuilder::default()
        .logical(true)
        .build()
        .unwrap();

    let mut factors = QDLDLFactorisation::new(&A, Some(opts)).unwrap();
    let mut b = [20.0, -22.0, 32.0, -7.0];
    factors.solve(&mut b);
}

#[test]
fn test_update_values_and_refactor() {
    let A = test_matrix_4x4();
    let opts = QDLDLSettingsBuilder::default()
        .logical(true)
        .build()
        .unwrap();

    let mut factors = QDLDLFactorisation::new(&A, Some(opts)).unwrap();
    assert!(factors.refactor().is_ok());

    let x = [1., -2., 3., -4.];
    let mut b = [20.0, -22.0, 32.0, -7.0];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&x, &b) <= 1e-8);

    // doubling every entry halves the solution
    let indices: Vec<usize> = (0..A.nnz()).collect();
    let values: Vec<f64> = A.nzval.iter().map(|v| 2. * v).collect();
    factors.update_values(&indices, &values);
    assert!(factors.refactor().is_ok());

    let mut b = [20.0, -22.0, 32.0, -7.0];
    factors.solve(&mut b);
    let xhalf: Vec<f64> = x.iter().map(|v| v / 2.).collect();
    assert!(inf_norm_diff(&xhalf, &b) <= 1e-8);
}

#[test]
fn test_quasidefinite_inertia() {
    // [1  1]
    // [1 -1]
    let A = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1., 1., -1.]);
    let mut factors = QDLDLFactorisation::new(&A, Some(natural_order(2))).unwrap();
    assert_eq!(factors.D, vec![1., -2.]);
    assert_eq!(factors.positive_inertia(), 1);

    let mut b = [3., -1.];
    factors.solve(&mut b);
    assert!(inf_norm_diff(&[1., 2.], &b) <= 1e-12);
}

#[test]
fn test_bad_numeric_pivot() {
    let mut A = test_matrix_4x4();
    A.nzval[0] = 0.;
    let err = QDLDLFactorisation::new(&A, Some(natural_order(4))).unwrap_err();
    assert_eq!(err, QDLDLError::ZeroPivot);

    let mut A = test_matrix_4x4();
    *A.nzval.last_mut().unwrap() = 0.;
    assert!(QDLDLFactorisation::new(&A, None).is_err());

    let mut A = test_matrix_4x4();
    A.nzval[0] = f64::NAN;
    let err = QDLDLFactorisation::new(&A, Some(natural_order(4))).unwrap_err();
    assert_eq!(err, QDLDLError::NonFinitePivot);
}

#[test]
fn test_failed_refactor_blocks_solve() {
    let A = test_matrix_4x4();
    let mut factors = QDLDLFactorisation::new(&A, Some(natural_order(4))).unwrap();
    factors.update_values(&[0], &[0.]);
    assert!(factors.refactor().is_err());

    let result = std::panic::catch_unwind(move || {
        let mut b = [1., 1., 1., 1.];
        factors.solve(&mut b);
    });
    assert!(result.is_err());
}

#[test]
fn test_structure_errors() {
    let A = CscMatrix::from(&[
        //
        [1.0, 3.0, 5.0],
        [2.0, 3.0, 6.0],
        [1.0, 4.0, 7.0],
    ]);
    let err = QDLDLFactorisation::new(&A, None).unwrap_err();
    assert_eq!(err, QDLDLError::NotUpperTriangular);

    let A = CscMatrix::from(&[
        //
        [1.0, 0.0, 5.0],
        [0.0, 0.0, 6.0],
        [0.0, 0.0, 7.0],
    ]);
    let err = QDLDLFactorisation::new(&A, None).unwrap_err();
    assert_eq!(err, QDLDLError::EmptyColumn);

    let A = CscMatrix::<f64>::spalloc(2, 3, 0);
    let err = QDLDLFactorisation::new(&A, None).unwrap_err();
    assert_eq!(err, QDLDLError::IncompatibleDimension);

    let A = test_matrix_4x4();
    let opts = QDLDLSettingsBuilder::default().perm(vec![0, 1]).build().unwrap();
    let err = QDLDLFactorisation::new(&A, Some(opts)).unwrap_err();
    assert_eq!(err, QDLDLError::InvalidPermutation);
}
