#![allow(non_snake_case)]
#![allow(clippy::type_complexity)]
use piqp::{algebra::*, solver::*};

// a collection of tests to ensure that data of
// incompatible dimension won't be accepted

fn api_dim_check_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
) {
    let P = CscMatrix::<f64>::spalloc(4, 4, 0);
    let c = vec![0.; 4];
    let A = CscMatrix::<f64>::spalloc(2, 4, 0);
    let b = vec![0.; 2];
    let G = CscMatrix::<f64>::spalloc(3, 4, 0);
    let h = vec![0.; 3];
    (P, c, A, b, G, h)
}

fn setup(
    P: &CscMatrix<f64>,
    c: &[f64],
    A: &CscMatrix<f64>,
    b: &[f64],
    G: &CscMatrix<f64>,
    h: &[f64],
) -> Result<SparseSolver<f64>, SetupError> {
    SparseSolver::new(P, c, A, b, G, h, None, None, Settings::default())
}

#[test]
fn api_dim_check_working() {
    // This example should work because dimensions are
    // all compatible.  All following checks vary one
    // of these sizes to test dimension checks

    let (P, c, A, b, G, h) = api_dim_check_data();
    assert!(setup(&P, &c, &A, &b, &G, &h).is_ok());
}

#[test]
fn api_dim_check_bad_P() {
    let (_P, c, A, b, G, h) = api_dim_check_data();
    let P = CscMatrix::<f64>::spalloc(3, 3, 0);
    assert_eq!(
        setup(&P, &c, &A, &b, &G, &h).err(),
        Some(SetupError::IncompatibleDimension("P"))
    );
}

#[test]
fn api_dim_check_bad_A_rows() {
    let (P, c, _A, b, G, h) = api_dim_check_data();
    let A = CscMatrix::<f64>::spalloc(3, 4, 0);
    assert_eq!(
        setup(&P, &c, &A, &b, &G, &h).err(),
        Some(SetupError::IncompatibleDimension("A"))
    );
}

#[test]
fn api_dim_check_bad_G_cols() {
    let (P, c, A, b, _G, h) = api_dim_check_data();
    let G = CscMatrix::<f64>::spalloc(3, 5, 0);
    assert_eq!(
        setup(&P, &c, &A, &b, &G, &h).err(),
        Some(SetupError::IncompatibleDimension("G"))
    );
}

#[test]
fn api_dim_check_bad_h() {
    let (P, c, A, b, G, _h) = api_dim_check_data();
    let h = vec![0.; 2];
    assert_eq!(
        setup(&P, &c, &A, &b, &G, &h).err(),
        Some(SetupError::IncompatibleDimension("G"))
    );
}

#[test]
fn api_dim_check_bad_bounds() {
    let (P, c, A, b, G, h) = api_dim_check_data();
    let x_ub = [1.; 3];
    let result = SparseSolver::new(&P, &c, &A, &b, &G, &h, None, Some(&x_ub[..]), Settings::default());
    assert_eq!(result.err(), Some(SetupError::IncompatibleDimension("x_ub")));
}

#[test]
fn api_bad_csc_format() {
    let (P, c, A, b, _G, h) = api_dim_check_data();
    // row index out of range
    let G = CscMatrix::new(3, 4, vec![0, 1, 1, 1, 1], vec![5], vec![1.]);
    assert_eq!(
        setup(&P, &c, &A, &b, &G, &h).err(),
        Some(SetupError::BadFormat(SparseFormatError::BadRowval))
    );
}

#[test]
fn api_dim_check_dense() {
    let P = Matrix::<f64>::identity(2);
    let A = Matrix::zeros((1, 3));
    let G = Matrix::zeros((0, 2));
    let result = DenseSolver::new(&P, &[0., 0.], &A, &[0.], &G, &[], None, None, Settings::default());
    assert_eq!(result.err(), Some(SetupError::IncompatibleDimension("A")));
}
