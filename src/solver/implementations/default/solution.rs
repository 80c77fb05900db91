use super::*;
use crate::algebra::*;

/// Result of a solve, in the user's coordinates.
///
/// Box duals and slacks are full length vectors.  At absent bounds the
/// dual is zero and the slack is infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<T> {
    /// primal solution
    pub x: Vec<T>,
    /// equality constraint duals
    pub y: Vec<T>,
    /// inequality constraint duals
    pub z: Vec<T>,
    /// lower bound duals
    pub z_lb: Vec<T>,
    /// upper bound duals
    pub z_ub: Vec<T>,
    /// inequality slacks
    pub s: Vec<T>,
    /// lower bound slacks
    pub s_lb: Vec<T>,
    /// upper bound slacks
    pub s_ub: Vec<T>,

    // proximal centers
    pub zeta: Vec<T>,
    pub lambda: Vec<T>,
    pub nu: Vec<T>,
    pub nu_lb: Vec<T>,
    pub nu_ub: Vec<T>,

    /// solver diagnostics of the last solve
    pub info: Info<T>,
}

impl<T> Solution<T>
where
    T: FloatT,
{
    pub fn new(n: usize, p: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); p],
            z: vec![T::zero(); m],
            z_lb: vec![T::zero(); n],
            z_ub: vec![T::zero(); n],
            s: vec![T::zero(); m],
            s_lb: vec![T::infinity(); n],
            s_ub: vec![T::infinity(); n],
            zeta: vec![T::zero(); n],
            lambda: vec![T::zero(); p],
            nu: vec![T::zero(); m],
            nu_lb: vec![T::zero(); n],
            nu_ub: vec![T::zero(); n],
            info: Info::new(),
        }
    }

    /// Undoes the preconditioner on the iterate and the centers
    pub(crate) fn update<M: ProblemMatrix<T>>(
        &mut self,
        data: &ProblemData<T, M>,
        vars: &Variables<T>,
        centers: &ProximalCenters<T>,
    ) {
        let equil = &data.equilibration;
        let cinv = equil.cinv;

        self.x.copy_from(&vars.x).hadamard(&equil.d);
        self.zeta.copy_from(&centers.zeta).hadamard(&equil.d);

        self.y.copy_from(&vars.y).hadamard(&equil.e).scale(cinv);
        self.lambda.copy_from(&centers.lambda).hadamard(&equil.e).scale(cinv);

        self.z.copy_from(&vars.z).hadamard(&equil.f).scale(cinv);
        self.nu.copy_from(&centers.nu).hadamard(&equil.f).scale(cinv);
        self.s.copy_from(&vars.s).hadamard(&equil.finv);

        for v in [&mut self.z_lb, &mut self.z_ub, &mut self.nu_lb, &mut self.nu_ub] {
            v.set(T::zero());
        }
        self.s_lb.set(T::infinity());
        self.s_ub.set(T::infinity());

        let dinv = &equil.dinv;
        for (k, &i) in data.x_lb_idx[..data.n_lb].iter().enumerate() {
            self.z_lb[i] = vars.z_lb[k] * dinv[i] * cinv;
            self.nu_lb[i] = centers.nu_lb[k] * dinv[i] * cinv;
            self.s_lb[i] = vars.s_lb[k] * equil.d[i];
        }
        for (k, &i) in data.x_ub_idx[..data.n_ub].iter().enumerate() {
            self.z_ub[i] = vars.z_ub[k] * dinv[i] * cinv;
            self.nu_ub[i] = centers.nu_ub[k] * dinv[i] * cinv;
            self.s_ub[i] = vars.s_ub[k] * equil.d[i];
        }
    }
}

#[test]
fn test_solution_unscaling() {
    let P = CscMatrix::<f64>::identity(3);
    let A = CscMatrix::zeros(0, 3);
    let G = CscMatrix::zeros(0, 3);
    let lb = [0., f64::NEG_INFINITY, -1.];
    let mut data =
        ProblemData::new(&P, &[1., 2., 3.], &A, &[], &G, &[], Some(&lb[..]), None).unwrap();
    data.equilibration.d.copy_from_slice(&[2., 4., 8.]);
    data.equilibration.dinv.copy_from_slice(&[0.5, 0.25, 0.125]);
    data.equilibration.c = 0.5;
    data.equilibration.cinv = 2.;

    let mut vars = Variables::new(3, 0, 0);
    vars.x.copy_from_slice(&[1., 1., 1.]);
    vars.z_lb[..2].copy_from_slice(&[3., 5.]);
    vars.s_lb[..2].copy_from_slice(&[1., 0.5]);
    let centers = ProximalCenters::new(3, 0, 0);

    let mut sol = Solution::new(3, 0, 0);
    sol.update(&data, &vars, &centers);

    assert_eq!(sol.x, vec![2., 4., 8.]);
    assert_eq!(sol.z_lb, vec![3., 0., 5. * 0.125 * 2.]);
    assert_eq!(sol.s_lb, vec![2., f64::INFINITY, 4.]);
    assert_eq!(sol.z_ub, vec![0.; 3]);
    assert!(sol.s_ub.iter().all(|s| s.is_infinite()));
}
