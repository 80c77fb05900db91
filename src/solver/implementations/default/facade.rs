#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{IPSolver, Status};
use enum_dispatch::*;

/// Owning handle over a dense or a sparse solver.
///
/// [`solve`](IPSolver::solve) and the accessors dispatch on the variant.
/// Data updates are layout specific and fail with
/// [`DataUpdateError::WrongVariant`] when sent to the other layout.
///
/// ```
/// use piqp::algebra::Matrix;
/// use piqp::solver::*;
///
/// let P = Matrix::new(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
/// let A = Matrix::zeros((0, 2));
/// let G = Matrix::zeros((0, 2));
/// let mut solver =
///     QPSolver::new_dense(&P, &[1.0, -1.0], &A, &[], &G, &[], None, None, Settings::default())
///         .unwrap();
///
/// assert_eq!(solver.solve(), Status::Solved);
/// assert!(f64::abs(solver.result().x[0] + 1.0) < 1e-6);
/// ```
#[enum_dispatch(IPSolver)]
pub enum QPSolver<T>
where
    T: FloatT,
{
    Dense(DenseSolver<T>),
    Sparse(SparseSolver<T>),
}

impl<T> QPSolver<T>
where
    T: FloatT,
{
    /// Sets up a dense solver.  See [`Solver::new`].
    #[allow(clippy::too_many_arguments)]
    pub fn new_dense(
        P: &Matrix<T>,
        c: &[T],
        A: &Matrix<T>,
        b: &[T],
        G: &Matrix<T>,
        h: &[T],
        x_lb: Option<&[T]>,
        x_ub: Option<&[T]>,
        settings: Settings<T>,
    ) -> Result<Self, SetupError> {
        let solver = DenseSolver::new(P, c, A, b, G, h, x_lb, x_ub, settings)?;
        Ok(Self::Dense(solver))
    }

    /// Sets up a sparse solver.  See [`Solver::new`].
    #[allow(clippy::too_many_arguments)]
    pub fn new_sparse(
        P: &CscMatrix<T>,
        c: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        G: &CscMatrix<T>,
        h: &[T],
        x_lb: Option<&[T]>,
        x_ub: Option<&[T]>,
        settings: Settings<T>,
    ) -> Result<Self, SetupError> {
        let solver = SparseSolver::new(P, c, A, b, G, h, x_lb, x_ub, settings)?;
        Ok(Self::Sparse(solver))
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, Self::Dense(_))
    }

    pub fn update_dense(&mut self, update: &ProblemUpdate<T, Matrix<T>>) -> Result<(), DataUpdateError> {
        match self {
            Self::Dense(solver) => solver.update(update),
            Self::Sparse(_) => Err(DataUpdateError::WrongVariant),
        }
    }

    pub fn update_sparse(
        &mut self,
        update: &ProblemUpdate<T, CscMatrix<T>>,
    ) -> Result<(), DataUpdateError> {
        match self {
            Self::Sparse(solver) => solver.update(update),
            Self::Dense(_) => Err(DataUpdateError::WrongVariant),
        }
    }

    pub fn result(&self) -> &Solution<T> {
        match self {
            Self::Dense(solver) => solver.result(),
            Self::Sparse(solver) => solver.result(),
        }
    }

    pub fn info(&self) -> &Info<T> {
        &self.result().info
    }

    pub fn settings(&self) -> &Settings<T> {
        match self {
            Self::Dense(solver) => solver.settings(),
            Self::Sparse(solver) => solver.settings(),
        }
    }

    pub fn settings_mut(&mut self) -> &mut Settings<T> {
        match self {
            Self::Dense(solver) => solver.settings_mut(),
            Self::Sparse(solver) => solver.settings_mut(),
        }
    }

    pub fn set_termination_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Info<T>) -> bool + Send + 'static,
    {
        match self {
            Self::Dense(solver) => solver.set_termination_callback(callback),
            Self::Sparse(solver) => solver.set_termination_callback(callback),
        }
    }

    pub fn unset_termination_callback(&mut self) {
        match self {
            Self::Dense(solver) => solver.unset_termination_callback(),
            Self::Sparse(solver) => solver.unset_termination_callback(),
        }
    }
}

#[test]
fn test_wrong_variant_update() {
    let P = CscMatrix::<f64>::identity(2);
    let A = CscMatrix::zeros(0, 2);
    let G = CscMatrix::zeros(0, 2);
    let mut solver =
        QPSolver::new_sparse(&P, &[1., 1.], &A, &[], &G, &[], None, None, Settings::default())
            .unwrap();
    assert!(!solver.is_dense());

    let Pd = Matrix::<f64>::identity(2);
    let update = ProblemUpdate::new().with_P(&Pd);
    assert_eq!(solver.update_dense(&update), Err(DataUpdateError::WrongVariant));

    let c = [2., 2.];
    let update = ProblemUpdate::new().with_c(&c);
    assert_eq!(solver.update_sparse(&update), Ok(()));

    assert_eq!(solver.solve(), Status::Solved);
    assert!(solver.result().x.iter().all(|x| (x + 2.).abs() < 1e-6));
}
