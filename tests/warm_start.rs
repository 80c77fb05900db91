#![allow(non_snake_case)]

use piqp::{algebra::*, solver::*};

// P = [6 2 1; 2 5 2; 1 2 4], c = [-8 -3 -3]
// A = [1 1 1], b = [1]
// G = [1 -1 0], h = [0.5]
// -1 ≤ x ≤ [1, ∞, 1]

const P_DENSE: [[f64; 3]; 3] = [[6., 2., 1.], [2., 5., 2.], [1., 2., 4.]];
const C: [f64; 3] = [-8., -3., -3.];
const X_LB: [f64; 3] = [-1., -1., -1.];
const X_UB: [f64; 3] = [1., f64::INFINITY, 1.];

fn sparse_solver(settings: Settings<f64>) -> SparseSolver<f64> {
    let P = CscMatrix::from(&P_DENSE);
    let A = CscMatrix::from(&[[1., 1., 1.]]);
    let G = CscMatrix::from(&[[1., -1., 0.]]);
    SparseSolver::new(
        &P,
        &C,
        &A,
        &[1.],
        &G,
        &[0.5],
        Some(&X_LB[..]),
        Some(&X_UB[..]),
        settings,
    )
    .unwrap()
}

fn dense_solver(settings: Settings<f64>) -> DenseSolver<f64> {
    let P = Matrix::from(&P_DENSE);
    let A = Matrix::from(&[[1., 1., 1.]]);
    let G = Matrix::from(&[[1., -1., 0.]]);
    DenseSolver::new(
        &P,
        &C,
        &A,
        &[1.],
        &G,
        &[0.5],
        Some(&X_LB[..]),
        Some(&X_UB[..]),
        settings,
    )
    .unwrap()
}

#[test]
fn test_repeated_solve_is_identical() {
    let mut solver = sparse_solver(Settings::default());

    assert_eq!(solver.solve(), Status::Solved);
    let first = solver.result().clone();

    assert_eq!(solver.solve(), Status::Solved);
    let second = solver.result();

    assert_eq!(first.x, second.x);
    assert_eq!(first.y, second.y);
    assert_eq!(first.z_lb, second.z_lb);
    assert_eq!(first.info.iter, second.info.iter);
}

#[test]
fn test_dense_sparse_agreement() {
    for refine in [false, true] {
        let settings = SettingsBuilder::default()
            .iterative_refinement_always_enabled(refine)
            .build()
            .unwrap();

        let mut sparse = sparse_solver(settings.clone());
        let mut dense = dense_solver(settings);

        assert_eq!(sparse.solve(), Status::Solved);
        assert_eq!(dense.solve(), Status::Solved);

        let refsol = [14. / 19., 4.5 / 19., 0.5 / 19.];
        assert!(sparse.result().x.dist(&refsol) <= 1e-6);
        assert!(dense.result().x.dist(&refsol) <= 1e-6);
        assert!(sparse.result().y.dist(&dense.result().y) <= 1e-6);
        assert!(sparse.result().z.dist(&dense.result().z) <= 1e-6);
        assert!((sparse.info().primal_obj - dense.info().primal_obj).abs() <= 1e-6);
    }
}

#[test]
fn test_scaled_cost_agreement() {
    let settings = SettingsBuilder::default()
        .preconditioner_scale_cost(true)
        .build()
        .unwrap();
    let mut solver = sparse_solver(settings);
    assert_eq!(solver.solve(), Status::Solved);
    assert!(solver.result().x.dist(&[14. / 19., 4.5 / 19., 0.5 / 19.]) <= 1e-6);

    // unpreconditioned
    let settings = SettingsBuilder::default().preconditioner_iter(0).build().unwrap();
    let mut solver = dense_solver(settings);
    assert_eq!(solver.solve(), Status::Solved);
    assert!(solver.result().x.dist(&[14. / 19., 4.5 / 19., 0.5 / 19.]) <= 1e-6);
}

#[test]
fn test_settings_update_between_solves() {
    let mut solver = sparse_solver(Settings::default());
    solver.settings_mut().max_iter = 2;
    assert_eq!(solver.solve(), Status::MaxIterReached);

    solver.update_settings(Settings::default());
    assert_eq!(solver.solve(), Status::Solved);
}

#[test]
fn test_invalid_settings() {
    let mut solver = sparse_solver(Settings::default());
    solver.settings_mut().tau = 1.5;
    assert_eq!(solver.solve(), Status::InvalidSettings);
    assert_eq!(solver.info().status, Status::InvalidSettings);
    assert_eq!(solver.settings().validate(), Err(SettingsError::BadFieldValue("tau")));

    solver.settings_mut().tau = 0.99;
    solver.settings_mut().reg_finetune_lower_limit = 1.;
    assert_eq!(solver.solve(), Status::InvalidSettings);

    let bad = SettingsBuilder::default().eps_abs(-1.).build().unwrap();
    solver.update_settings(bad);
    assert_eq!(solver.solve(), Status::InvalidSettings);
}

#[test]
fn test_facade() {
    let settings = Settings::default();
    let P = Matrix::from(&P_DENSE);
    let A = Matrix::from(&[[1., 1., 1.]]);
    let G = Matrix::from(&[[1., -1., 0.]]);
    let mut solver = QPSolver::new_dense(
        &P,
        &C,
        &A,
        &[1.],
        &G,
        &[0.5],
        Some(&X_LB[..]),
        Some(&X_UB[..]),
        settings,
    )
    .unwrap();

    assert!(solver.is_dense());
    assert_eq!(solver.solve(), Status::Solved);
    assert_eq!(solver.info().status, Status::Solved);
    assert!(solver.result().x.dist(&[14. / 19., 4.5 / 19., 0.5 / 19.]) <= 1e-6);

    let c = [1., 2., 3.];
    let sparse_update = ProblemUpdate::<f64, CscMatrix<f64>>::new().with_c(&c);
    assert_eq!(
        solver.update_sparse(&sparse_update),
        Err(DataUpdateError::WrongVariant)
    );
    solver
        .update_dense(&ProblemUpdate::new().with_c(&c))
        .unwrap();
    assert_eq!(solver.solve(), Status::Solved);
    assert!(solver.result().x.dist(&[16. / 31., 9. / 31., 6. / 31.]) <= 1e-6);

    // dropping an absent handle is a no-op
    let handle: Option<QPSolver<f64>> = None;
    drop(handle);
}
