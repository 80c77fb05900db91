#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;

// ---------------
// Residuals type for the proximal interior point method
// ---------------

/// Residuals of the scaled problem at the current iterate, without the
/// proximal terms, and the matrix-vector products they are built from.
#[derive(Debug, Clone)]
pub struct Residuals<T> {
    /// `-(Px + c + A'y + G'z - z_lb + z_ub)`
    pub rx_nr: Vec<T>,
    /// `b - Ax`
    pub ry_nr: Vec<T>,
    /// `h - Gx - s`
    pub rz_nr: Vec<T>,
    /// `x - x_lb - s_lb` on the bounded entries
    pub rz_lb_nr: Vec<T>,
    /// `x_ub - x - s_ub` on the bounded entries
    pub rz_ub_nr: Vec<T>,

    // products with the current iterate
    pub Px: Vec<T>,
    pub Aty: Vec<T>,
    pub Gtz: Vec<T>,
    pub Ax: Vec<T>,
    pub Gx: Vec<T>,

    // work vectors for the infeasibility checks
    work_x: Vec<T>,
    work_y: Vec<T>,
    work_z: Vec<T>,
    work_lb: Vec<T>,
    work_ub: Vec<T>,
}

impl<T> Residuals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, p: usize, m: usize) -> Self {
        Self {
            rx_nr: vec![T::zero(); n],
            ry_nr: vec![T::zero(); p],
            rz_nr: vec![T::zero(); m],
            rz_lb_nr: vec![T::zero(); n],
            rz_ub_nr: vec![T::zero(); n],
            Px: vec![T::zero(); n],
            Aty: vec![T::zero(); n],
            Gtz: vec![T::zero(); n],
            Ax: vec![T::zero(); p],
            Gx: vec![T::zero(); m],
            work_x: vec![T::zero(); n],
            work_y: vec![T::zero(); p],
            work_z: vec![T::zero(); m],
            work_lb: vec![T::zero(); n],
            work_ub: vec![T::zero(); n],
        }
    }

    pub(crate) fn update<M: ProblemMatrix<T>>(
        &mut self,
        data: &ProblemData<T, M>,
        vars: &Variables<T>,
    ) {
        let (n_lb, n_ub) = (data.n_lb, data.n_ub);

        data.P.symv(&mut self.Px, &vars.x, T::one(), T::zero());
        data.A.gemv_t(&mut self.Aty, &vars.y, T::one(), T::zero());
        data.G.gemv_t(&mut self.Gtz, &vars.z, T::one(), T::zero());
        data.A.gemv(&mut self.Ax, &vars.x, T::one(), T::zero());
        data.G.gemv(&mut self.Gx, &vars.x, T::one(), T::zero());

        // stationarity
        for (r, Px, c, Aty, Gtz) in itertools::izip!(
            &mut self.rx_nr,
            &self.Px,
            &data.c,
            &self.Aty,
            &self.Gtz
        ) {
            *r = -(*Px + *c + *Aty + *Gtz);
        }
        for (&i, &z) in data.x_lb_idx[..n_lb].iter().zip(&vars.z_lb) {
            self.rx_nr[i] += z;
        }
        for (&i, &z) in data.x_ub_idx[..n_ub].iter().zip(&vars.z_ub) {
            self.rx_nr[i] -= z;
        }

        self.ry_nr.waxpby(T::one(), &data.b, -T::one(), &self.Ax);

        self.rz_nr.waxpby(T::one(), &data.h, -T::one(), &self.Gx);
        self.rz_nr.axpby(-T::one(), &vars.s, T::one());

        for k in 0..n_lb {
            let i = data.x_lb_idx[k];
            self.rz_lb_nr[k] = vars.x[i] - data.x_lb[k] - vars.s_lb[k];
        }
        for k in 0..n_ub {
            let i = data.x_ub_idx[k];
            self.rz_ub_nr[k] = data.x_ub[k] - vars.x[i] - vars.s_ub[k];
        }
    }

    /// Infinity norm of the scaled primal residuals
    pub(crate) fn scaled_primal_inf(&self, n_lb: usize, n_ub: usize) -> T {
        [
            self.ry_nr.norm_inf(),
            self.rz_nr.norm_inf(),
            self.rz_lb_nr[..n_lb].norm_inf(),
            self.rz_ub_nr[..n_ub].norm_inf(),
        ]
        .into_iter()
        .fold(T::zero(), T::max)
    }

    /// Infinity norm of the scaled dual residual
    pub(crate) fn scaled_dual_inf(&self) -> T {
        self.rx_nr.norm_inf()
    }

    /// Right hand side of the Newton system: the residuals with their
    /// proximal terms in the `x,y,z,z_lb,z_ub` blocks of `rhs`.  The
    /// complementarity blocks are left untouched.
    pub(crate) fn proximal_rhs(
        &self,
        rhs: &mut Variables<T>,
        vars: &Variables<T>,
        centers: &ProximalCenters<T>,
        ρ: T,
        δ: T,
    ) {
        // rx = rx_nr - ρ(x - ζ)
        rhs.x.waxpby(-ρ, &vars.x, ρ, &centers.zeta);
        rhs.x.axpby(T::one(), &self.rx_nr, T::one());

        // r = r_nr + δ(v - center) for the dual blocks
        for (r, r_nr, v, center) in [
            (&mut rhs.y, &self.ry_nr, &vars.y, &centers.lambda),
            (&mut rhs.z, &self.rz_nr, &vars.z, &centers.nu),
            (&mut rhs.z_lb, &self.rz_lb_nr, &vars.z_lb, &centers.nu_lb),
            (&mut rhs.z_ub, &self.rz_ub_nr, &vars.z_ub, &centers.nu_ub),
        ] {
            r.waxpby(δ, v, -δ, center);
            r.axpby(T::one(), r_nr, T::one());
        }
    }

    /// Certificate of primal infeasibility from the change in the duals
    /// since the last center update.
    ///
    /// With `Δ = (Δy, Δz, Δz_lb, Δz_ub)` in the user's coordinates, checks
    /// that `‖Δ‖∞` is large, `A'Δy + G'Δz - Δz_lb + Δz_ub ≈ 0` and
    /// `b'Δy + h'Δz - x_lb'Δz_lb + x_ub'Δz_ub < 0`.
    pub(crate) fn is_primal_infeasible<M: ProblemMatrix<T>>(
        &mut self,
        data: &ProblemData<T, M>,
        vars: &Variables<T>,
        centers: &ProximalCenters<T>,
        eps: T,
    ) -> bool {
        let (n_lb, n_ub) = (data.n_lb, data.n_ub);
        let equil = &data.equilibration;
        let cinv = equil.cinv;

        // scaled changes in the duals
        let Δy = &mut self.work_y;
        let Δz = &mut self.work_z;
        let Δz_lb = &mut self.work_lb[..n_lb];
        let Δz_ub = &mut self.work_ub[..n_ub];
        Δy.waxpby(T::one(), &vars.y, -T::one(), &centers.lambda);
        Δz.waxpby(T::one(), &vars.z, -T::one(), &centers.nu);
        Δz_lb.waxpby(T::one(), &vars.z_lb[..n_lb], -T::one(), &centers.nu_lb[..n_lb]);
        Δz_ub.waxpby(T::one(), &vars.z_ub[..n_ub], -T::one(), &centers.nu_ub[..n_ub]);

        let dinv = &equil.dinv;
        let Δ_norm = [
            Δy.norm_inf_scaled(&equil.e),
            Δz.norm_inf_scaled(&equil.f),
            _norm_inf_gathered(Δz_lb, dinv, &data.x_lb_idx),
            _norm_inf_gathered(Δz_ub, dinv, &data.x_ub_idx),
        ]
        .into_iter()
        .fold(T::zero(), T::max)
            * cinv;

        if !(Δ_norm > (1e2).as_T()) {
            return false;
        }

        // A'Δy + G'Δz - Δz_lb + Δz_ub
        let r = &mut self.work_x;
        data.A.gemv_t(r, Δy, T::one(), T::zero());
        data.G.gemv_t(r, Δz, T::one(), T::one());
        for (&i, &v) in data.x_lb_idx.iter().zip(Δz_lb.iter()) {
            r[i] -= v;
        }
        for (&i, &v) in data.x_ub_idx.iter().zip(Δz_ub.iter()) {
            r[i] += v;
        }
        let stationarity = r.norm_inf_scaled(dinv) * cinv;

        let support = (data.b.dot(Δy) + data.h.dot(Δz) - data.x_lb[..n_lb].dot(Δz_lb)
            + data.x_ub[..n_ub].dot(Δz_ub))
            * cinv;

        stationarity <= eps * Δ_norm && support < -eps * Δ_norm
    }

    /// Certificate of dual infeasibility from the change in `x` since
    /// the last center update.
    ///
    /// With `Δx` in the user's coordinates, checks that `‖Δx‖∞` is large,
    /// `PΔx ≈ 0`, `AΔx ≈ 0`, `GΔx ≤ 0`, the bounds stay inactive along
    /// `Δx` and `c'Δx < 0`.
    pub(crate) fn is_dual_infeasible<M: ProblemMatrix<T>>(
        &mut self,
        data: &ProblemData<T, M>,
        vars: &Variables<T>,
        centers: &ProximalCenters<T>,
        eps: T,
    ) -> bool {
        let (n_lb, n_ub) = (data.n_lb, data.n_ub);
        let equil = &data.equilibration;
        let cinv = equil.cinv;

        let Δx = &mut self.work_x;
        Δx.waxpby(T::one(), &vars.x, -T::one(), &centers.zeta);

        let Δx_norm = Δx.norm_inf_scaled(&equil.d);
        if !(Δx_norm > (1e2).as_T()) {
            return false;
        }
        let tol = eps * Δx_norm;

        let PΔx = &mut self.work_lb;
        data.P.symv(PΔx, Δx, T::one(), T::zero());
        if PΔx.norm_inf_scaled(&equil.dinv) * cinv > tol {
            return false;
        }

        let AΔx = &mut self.work_y;
        data.A.gemv(AΔx, Δx, T::one(), T::zero());
        if AΔx.norm_inf_scaled(&equil.einv) > tol {
            return false;
        }

        let GΔx = &mut self.work_z;
        data.G.gemv(GΔx, Δx, T::one(), T::zero());
        GΔx.hadamard(&equil.finv);
        if GΔx.maximum() > tol {
            return false;
        }

        let d = &equil.d;
        let lb_violation = data.x_lb_idx[..n_lb]
            .iter()
            .fold(T::zero(), |acc, &i| T::max(acc, -Δx[i] * d[i]));
        let ub_violation = data.x_ub_idx[..n_ub]
            .iter()
            .fold(T::zero(), |acc, &i| T::max(acc, Δx[i] * d[i]));
        if lb_violation > tol || ub_violation > tol {
            return false;
        }

        data.c.dot(Δx) * cinv < -tol
    }
}

// max_k |v[k] * s[idx[k]]|
pub(super) fn _norm_inf_gathered<T: FloatT>(v: &[T], s: &[T], idx: &[usize]) -> T {
    v.iter()
        .zip(idx)
        .fold(T::zero(), |acc, (&vk, &i)| T::max(acc, T::abs(vk * s[i])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residuals() {
        let P = CscMatrix::from(&[
            [2., 1.], //
            [0., 2.], //
        ]);
        let A = CscMatrix::from(&[[1., 1.]]);
        let G = CscMatrix::from(&[[1., 0.]]);
        let lb = [0., f64::NEG_INFINITY];
        let ub = [f64::INFINITY, 3.];
        let data =
            ProblemData::new(&P, &[1., -1.], &A, &[1.], &G, &[2.], Some(&lb[..]), Some(&ub[..]))
                .unwrap();

        let mut vars = Variables::new(2, 1, 1);
        vars.x.copy_from_slice(&[1., 2.]);
        vars.y[0] = 0.5;
        vars.z[0] = 0.25;
        vars.s[0] = 0.5;
        vars.z_lb[0] = 1.;
        vars.s_lb[0] = 0.5;
        vars.z_ub[0] = 2.;
        vars.s_ub[0] = 0.25;

        let mut res = Residuals::new(2, 1, 1);
        res.update(&data, &vars);

        // Px = (4, 5)
        assert_eq!(res.Px, vec![4., 5.]);
        // -(Px + c + A'y + G'z) + z_lb - z_ub
        assert_eq!(res.rx_nr, vec![-(4. + 1. + 0.5 + 0.25) + 1., -(5. - 1. + 0.5) - 2.]);
        assert_eq!(res.ry_nr, vec![1. - 3.]);
        assert_eq!(res.rz_nr, vec![2. - 1. - 0.5]);
        assert_eq!(res.rz_lb_nr[0], 1. - 0. - 0.5);
        assert_eq!(res.rz_ub_nr[0], 3. - 2. - 0.25);

        assert_eq!(res.scaled_primal_inf(1, 1), 2.);
        assert_eq!(res.scaled_dual_inf(), 6.5);

        // proximal terms vanish at the centers
        let mut centers = ProximalCenters::new(2, 1, 1);
        centers.set_primal(&vars);
        centers.set_dual(&vars);
        let mut rhs = Variables::new(2, 1, 1);
        res.proximal_rhs(&mut rhs, &vars, &centers, 1e-3, 1e-2);
        assert_eq!(rhs.x, res.rx_nr);
        assert_eq!(rhs.y, res.ry_nr);

        // and are linear in the distance to them
        centers.zeta[0] = 0.;
        centers.lambda[0] = 0.;
        res.proximal_rhs(&mut rhs, &vars, &centers, 1e-3, 1e-2);
        assert!((rhs.x[0] - (res.rx_nr[0] - 1e-3)).abs() < 1e-15);
        assert!((rhs.y[0] - (res.ry_nr[0] + 0.5e-2)).abs() < 1e-15);
    }
}
