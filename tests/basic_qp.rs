#![allow(non_snake_case)]

use piqp::{algebra::*, solver::*};

fn basic_qp_P() -> CscMatrix<f64> {
    // P = [4. 1;1 2], upper triangle
    CscMatrix::new(
        2,                // m
        2,                // n
        vec![0, 1, 3],    // colptr
        vec![0, 0, 1],    // rowval
        vec![4., 1., 2.], // nzval
    )
}

#[allow(clippy::type_complexity)]
fn basic_qp_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<f64>,
    Vec<f64>,
) {
    // A = [1. 1]
    let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);

    let c = vec![1., 1.];
    let b = vec![1.];
    let x_lb = vec![0., 0.];
    let x_ub = vec![0.7, 0.7];

    (basic_qp_P(), c, A, b, x_lb, x_ub)
}

fn no_inequalities() -> CscMatrix<f64> {
    CscMatrix::zeros(0, 2)
}

#[test]
fn test_qp_unconstrained() {
    let P = basic_qp_P();
    let c = [1., 1.];
    let A = CscMatrix::zeros(0, 2);
    let G = no_inequalities();

    let settings = Settings::default();
    let mut solver = SparseSolver::new(&P, &c, &A, &[], &G, &[], None, None, settings).unwrap();

    assert_eq!(solver.solve(), Status::Solved);

    let refsol = vec![-1. / 7., -3. / 7.];
    assert!(solver.result().x.dist(&refsol) <= 1e-6);

    // no complementarity pairs, a single Newton step
    assert!(solver.info().iter <= 2);
    assert!(solver.result().z_lb.iter().all(|&z| z == 0.));
    assert!(solver.result().s_ub.iter().all(|s| s.is_infinite()));
}

#[test]
fn test_qp_feasible() {
    let (P, c, A, b, x_lb, x_ub) = basic_qp_data();
    let G = no_inequalities();

    let settings = Settings::default();
    let mut solver =
        SparseSolver::new(&P, &c, &A, &b, &G, &[], Some(&x_lb[..]), Some(&x_ub[..]), settings).unwrap();

    assert_eq!(solver.solve(), Status::Solved);

    let refsol = vec![0.3, 0.7];
    assert!(solver.result().x.dist(&refsol) <= 1e-6);

    let refobj = 1.88;
    let info = solver.info();
    assert!(f64::abs(info.primal_obj - refobj) <= 1e-6);
    assert!(f64::abs(info.dual_obj - refobj) <= 1e-6);
    assert!(info.primal_inf < 1e-7);
    assert!(info.dual_inf < 1e-7);

    // only the upper bound on x[1] is active
    let sol = solver.result();
    assert!(sol.z_ub[1] > 1e-3);
    assert!(sol.z_lb[0].abs() < 1e-6);
    assert!(sol.s_ub[1].abs() < 1e-6);
}

#[test]
fn test_qp_feasible_inequalities() {
    // the box of test_qp_feasible written as Gx ≤ h
    let (P, c, A, b, _, _) = basic_qp_data();
    let G = CscMatrix::new(
        4,
        2,
        vec![0, 2, 4],
        vec![0, 2, 1, 3],
        vec![-1., 1., -1., 1.],
    );
    let h = [0., 0., 0.7, 0.7];

    let settings = Settings::default();
    let mut solver = SparseSolver::new(&P, &c, &A, &b, &G, &h, None, None, settings).unwrap();

    assert_eq!(solver.solve(), Status::Solved);
    assert!(solver.result().x.dist(&[0.3, 0.7]) <= 1e-6);
    assert!(solver.result().s.iter().all(|&s| s >= -1e-8));
}

#[test]
fn test_qp_infinite_bounds_ignored() {
    let (P, c, A, b, _, _) = basic_qp_data();
    let G = no_inequalities();
    let x_lb = [f64::NEG_INFINITY, -1e30];
    let x_ub = [1e31, f64::INFINITY];

    let settings = Settings::default();
    let mut solver =
        SparseSolver::new(&P, &c, &A, &b, &G, &[], Some(&x_lb[..]), Some(&x_ub[..]), settings).unwrap();

    assert_eq!(solver.solve(), Status::Solved);
    // min 2x² - x + 2 along x[0] + x[1] = 1
    assert!(solver.result().x.dist(&[0.25, 0.75]) <= 1e-6);
}

#[test]
fn test_qp_primal_infeasible() {
    let P = CscMatrix::identity(2);
    let c = [0., 0.];
    let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);
    let b = [3.];
    let G = no_inequalities();
    let x_lb = [0., 0.];
    let x_ub = [1., 1.];

    let settings = Settings::default();
    let mut solver =
        SparseSolver::new(&P, &c, &A, &b, &G, &[], Some(&x_lb[..]), Some(&x_ub[..]), settings).unwrap();

    assert_eq!(solver.solve(), Status::PrimalInfeasible);
    assert_eq!(solver.info().status, Status::PrimalInfeasible);
}

#[test]
fn test_qp_primal_infeasible_tight_box() {
    // x fixed at the origin cannot satisfy x[0] + x[1] = 3
    let x_lb = [0., 0.];
    let x_ub = [0., 0.];

    let P = CscMatrix::identity(2);
    let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);
    let G = no_inequalities();
    let mut solver = SparseSolver::new(
        &P,
        &[0., 0.],
        &A,
        &[3.],
        &G,
        &[],
        Some(&x_lb[..]),
        Some(&x_ub[..]),
        Settings::default(),
    )
    .unwrap();
    assert_eq!(solver.solve(), Status::PrimalInfeasible);

    let P = Matrix::identity(2);
    let A = Matrix::new(1, 2, vec![1., 1.]);
    let G = Matrix::zeros((0, 2));
    let mut solver = DenseSolver::new(
        &P,
        &[0., 0.],
        &A,
        &[3.],
        &G,
        &[],
        Some(&x_lb[..]),
        Some(&x_ub[..]),
        Settings::default(),
    )
    .unwrap();
    assert_eq!(solver.solve(), Status::PrimalInfeasible);
}

#[test]
fn test_qp_primal_infeasible_dense() {
    let P = Matrix::identity(2);
    let A = Matrix::new(1, 2, vec![1., 1.]);
    let G = Matrix::zeros((0, 2));
    let x_lb = [0., 0.];
    let x_ub = [1., 1.];

    let settings = Settings::default();
    let mut solver =
        DenseSolver::new(&P, &[0., 0.], &A, &[3.], &G, &[], Some(&x_lb[..]), Some(&x_ub[..]), settings)
            .unwrap();

    assert_eq!(solver.solve(), Status::PrimalInfeasible);
    assert_eq!(solver.info().status, Status::PrimalInfeasible);
}

#[test]
fn test_qp_primal_infeasible_inequalities() {
    // x ≤ 0 and x ≥ 1
    let P = CscMatrix::identity(1);
    let A = CscMatrix::zeros(0, 1);
    let G = CscMatrix::new(2, 1, vec![0, 2], vec![0, 1], vec![1., -1.]);
    let h = [0., -1.];

    let settings = Settings::default();
    let mut solver = SparseSolver::new(&P, &[0.], &A, &[], &G, &h, None, None, settings).unwrap();

    assert_eq!(solver.solve(), Status::PrimalInfeasible);
}

#[test]
fn test_qp_dual_infeasible() {
    // P = [1 0;0 0], unbounded along x[1]
    let P = CscMatrix::new(2, 2, vec![0, 1, 1], vec![0], vec![1.]);
    let c = [1., -1.];
    let A = CscMatrix::zeros(0, 2);
    let G = no_inequalities();

    let settings = Settings::default();
    let mut solver = SparseSolver::new(&P, &c, &A, &[], &G, &[], None, None, settings).unwrap();

    assert_eq!(solver.solve(), Status::DualInfeasible);
}

#[test]
fn test_lp_dual_infeasible() {
    // min -x[0] - x[1] s.t. x ≥ 0
    let P = CscMatrix::zeros(2, 2);
    let c = [-1., -1.];
    let A = CscMatrix::zeros(0, 2);
    let G = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![-1., -1.]);
    let h = [0., 0.];

    let settings = Settings::default();
    let mut solver = SparseSolver::new(&P, &c, &A, &[], &G, &h, None, None, settings).unwrap();

    assert_eq!(solver.solve(), Status::DualInfeasible);
}

#[test]
fn test_qp_dual_infeasible_dense() {
    let P = Matrix::new(2, 2, vec![1., 0., 0., 0.]);
    let A = Matrix::zeros((0, 2));
    let G = Matrix::zeros((0, 2));

    let settings = Settings::default();
    let mut solver = DenseSolver::new(&P, &[1., -1.], &A, &[], &G, &[], None, None, settings).unwrap();

    assert_eq!(solver.solve(), Status::DualInfeasible);
}

#[test]
fn test_lp_dual_infeasible_dense() {
    let P = Matrix::zeros((2, 2));
    let A = Matrix::zeros((0, 2));
    let G = Matrix::new(2, 2, vec![-1., 0., 0., -1.]);

    let settings = Settings::default();
    let mut solver =
        DenseSolver::new(&P, &[-1., -1.], &A, &[], &G, &[0., 0.], None, None, settings).unwrap();

    assert_eq!(solver.solve(), Status::DualInfeasible);
}

#[test]
fn test_lp_feasible() {
    // min -x[0] - 2x[1] s.t. x[0] + x[1] ≤ 1, x ≥ 0
    let P = CscMatrix::zeros(2, 2);
    let c = [-1., -2.];
    let A = CscMatrix::zeros(0, 2);
    let G = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);
    let h = [1.];
    let x_lb = [0., 0.];

    let settings = Settings::default();
    let mut solver =
        SparseSolver::new(&P, &c, &A, &[], &G, &h, Some(&x_lb[..]), None, settings).unwrap();

    assert_eq!(solver.solve(), Status::Solved);
    assert!(solver.result().x.dist(&[0., 1.]) <= 1e-6);
    assert!(f64::abs(solver.info().primal_obj + 2.) <= 1e-6);
}

#[test]
fn test_qp_max_iter() {
    let (P, c, A, b, x_lb, x_ub) = basic_qp_data();
    let G = no_inequalities();

    let settings = SettingsBuilder::default().max_iter(1).build().unwrap();
    let mut solver =
        SparseSolver::new(&P, &c, &A, &b, &G, &[], Some(&x_lb[..]), Some(&x_ub[..]), settings).unwrap();

    assert_eq!(solver.solve(), Status::MaxIterReached);
    assert_eq!(solver.info().iter, 1);
}

#[test]
fn test_qp_iterative_refinement_always() {
    let (P, c, A, b, x_lb, x_ub) = basic_qp_data();
    let G = no_inequalities();

    let settings = SettingsBuilder::default()
        .iterative_refinement_always_enabled(true)
        .build()
        .unwrap();
    let mut solver =
        SparseSolver::new(&P, &c, &A, &b, &G, &[], Some(&x_lb[..]), Some(&x_ub[..]), settings).unwrap();

    assert_eq!(solver.solve(), Status::Solved);
    assert!(solver.result().x.dist(&[0.3, 0.7]) <= 1e-6);
}
