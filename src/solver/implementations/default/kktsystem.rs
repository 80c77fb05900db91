#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::kktsolvers::*;
use std::marker::PhantomData;

// ---------------
// Newton system of the proximal interior point method
//
//   [ P+ρ   A'   G'        -I_lb'      I_ub'     ] [dx  ]   [rx ]
//   [ A    -δ                                    ] [dy  ]   [ry ]
//   [ G         -(δ+S/Z)                         ] [dz  ] = [rz - rs/z]
//   [-I_lb              -(δ+S_lb/Z_lb)           ] [dzlb]   [rzlb - rslb/zlb]
//   [ I_ub                           -(δ+S_ub/Z_ub)] [dzub]   [rzub - rsub/zub]
//
// with the slack directions recovered as ds = (rs - s∘dz)/z.
// ---------------

// diagonal data of the current factorization
#[derive(Debug, Clone)]
struct KKTDiagonal<T> {
    // values of the unperturbed system
    rho: T,
    delta: T,
    // static perturbation of the factored system
    eps: T,

    // s/z ratios of the iterate
    s_z: Vec<T>,
    s_z_lb: Vec<T>,
    s_z_ub: Vec<T>,

    // diagonals handed to the engine
    x_reg: Vec<T>,
    z_reg: Vec<T>,

    // diagonals of the eliminated box rows
    w_lb: Vec<T>,
    w_ub: Vec<T>,
}

impl<T: FloatT> KKTDiagonal<T> {
    fn new(n: usize, m: usize) -> Self {
        Self {
            rho: T::one(),
            delta: T::one(),
            eps: T::zero(),
            s_z: vec![T::one(); m],
            s_z_lb: vec![T::one(); n],
            s_z_ub: vec![T::one(); n],
            x_reg: vec![T::one(); n],
            z_reg: vec![T::one(); m],
            w_lb: vec![T::one(); n],
            w_ub: vec![T::one(); n],
        }
    }

    fn update_diagonals(&mut self, x_lb_idx: &[usize], x_ub_idx: &[usize], eps: T) {
        self.eps = eps;
        let ρ = self.rho + eps;
        let δ = self.delta + eps;

        self.x_reg.set(ρ);
        for (k, &i) in x_lb_idx.iter().enumerate() {
            self.w_lb[k] = δ + self.s_z_lb[k];
            self.x_reg[i] += T::recip(self.w_lb[k]);
        }
        for (k, &i) in x_ub_idx.iter().enumerate() {
            self.w_ub[k] = δ + self.s_z_ub[k];
            self.x_reg[i] += T::recip(self.w_ub[k]);
        }
        self.z_reg.scalarop_from(|r| δ + r, &self.s_z);
    }
}

/// Regularized Newton system, factored through a [`KKTEngine`] after
/// eliminating the bound rows.
///
/// When iterative refinement is active, the factored matrix carries an
/// additional static perturbation and every solve is refined against
/// the unperturbed system.
pub struct KKTSystem<T, M, K> {
    engine: K,
    reg: KKTDiagonal<T>,
    refinement: bool,

    // reduced right hand side for the bound and complementarity rows
    rhs: Variables<T>,
    // refinement residual, correction and trial point
    err: Variables<T>,
    correction: Variables<T>,
    trial: Variables<T>,

    work_x: Vec<T>,

    phantom: PhantomData<M>,
}

impl<T, M, K> KKTSystem<T, M, K>
where
    T: FloatT,
    M: ProblemMatrix<T>,
    K: KKTEngine<T, M>,
{
    pub fn new(data: &ProblemData<T, M>) -> Result<Self, KKTError> {
        let (n, p, m) = (data.n, data.p, data.m);
        let engine = K::new(&data.P, &data.A, &data.G)?;

        Ok(Self {
            engine,
            reg: KKTDiagonal::new(n, m),
            refinement: false,
            rhs: Variables::new(n, p, m),
            err: Variables::new(n, p, m),
            correction: Variables::new(n, p, m),
            trial: Variables::new(n, p, m),
            work_x: vec![T::zero(); n],
            phantom: PhantomData,
        })
    }

    /// Pass new matrix values to the engine
    pub(crate) fn update_data(&mut self, data: &ProblemData<T, M>) {
        self.engine.update_data(&data.P, &data.A, &data.G);
    }

    pub(crate) fn refinement_active(&self) -> bool {
        self.refinement
    }

    pub(crate) fn set_refinement(&mut self, active: bool) {
        self.refinement = active;
    }

    /// Factorizes the system for the iterate `vars` and regularization
    /// `(ρ, δ)`.  Returns `false` on a failed factorization.
    pub(crate) fn factorize(
        &mut self,
        data: &ProblemData<T, M>,
        vars: &Variables<T>,
        ρ: T,
        δ: T,
        settings: &Settings<T>,
    ) -> bool {
        let (n_lb, n_ub) = (data.n_lb, data.n_ub);
        let x_lb_idx = &data.x_lb_idx[..n_lb];
        let x_ub_idx = &data.x_ub_idx[..n_ub];
        let reg = &mut self.reg;

        reg.rho = ρ;
        reg.delta = δ;
        reg.s_z.copy_from(&vars.s).hadamard_div(&vars.z);
        for k in 0..n_lb {
            reg.s_z_lb[k] = vars.s_lb[k] / vars.z_lb[k];
        }
        for k in 0..n_ub {
            reg.s_z_ub[k] = vars.s_ub[k] / vars.z_ub[k];
        }

        reg.update_diagonals(x_lb_idx, x_ub_idx, T::zero());
        if self.refinement {
            let diag_max = T::max(T::max(reg.x_reg.norm_inf(), reg.z_reg.norm_inf()), δ);
            let eps = settings.iterative_refinement_static_regularization_eps
                + settings.iterative_refinement_static_regularization_rel * diag_max;
            reg.update_diagonals(x_lb_idx, x_ub_idx, eps);
        }

        self.engine.factorize(&reg.x_reg, δ + reg.eps, &reg.z_reg)
    }

    /// Solves the Newton system for the right hand side `rhs`, writing
    /// the full direction (slacks included) into `lhs`.
    pub(crate) fn solve(
        &mut self,
        data: &ProblemData<T, M>,
        vars: &Variables<T>,
        rhs: &Variables<T>,
        lhs: &mut Variables<T>,
        settings: &Settings<T>,
    ) {
        let (n_lb, n_ub) = (data.n_lb, data.n_ub);

        // fold the complementarity rows into the dual rows
        let r = &mut self.rhs;
        r.x.copy_from(&rhs.x);
        r.y.copy_from(&rhs.y);
        for (ri, &rzi, &rsi, &zi) in itertools::izip!(&mut r.z, &rhs.z, &rhs.s, &vars.z) {
            *ri = rzi - rsi / zi;
        }
        for k in 0..n_lb {
            r.z_lb[k] = rhs.z_lb[k] - rhs.s_lb[k] / vars.z_lb[k];
        }
        for k in 0..n_ub {
            r.z_ub[k] = rhs.z_ub[k] - rhs.s_ub[k] / vars.z_ub[k];
        }

        _solve_perturbed(
            &mut self.engine,
            &self.reg,
            data,
            &self.rhs,
            lhs,
            &mut self.work_x,
        );

        if self.refinement {
            self.refine(data, lhs, settings);
        }

        // recover the slack directions
        for (dsi, &rsi, &si, &dzi, &zi) in
            itertools::izip!(&mut lhs.s, &rhs.s, &vars.s, &lhs.z, &vars.z)
        {
            *dsi = (rsi - si * dzi) / zi;
        }
        for k in 0..n_lb {
            lhs.s_lb[k] = (rhs.s_lb[k] - vars.s_lb[k] * lhs.z_lb[k]) / vars.z_lb[k];
        }
        for k in 0..n_ub {
            lhs.s_ub[k] = (rhs.s_ub[k] - vars.s_ub[k] * lhs.z_ub[k]) / vars.z_ub[k];
        }
    }

    // refines lhs against the unperturbed system with right hand side self.rhs
    fn refine(&mut self, data: &ProblemData<T, M>, lhs: &mut Variables<T>, settings: &Settings<T>) {
        let (n_lb, n_ub) = (data.n_lb, data.n_ub);
        let eps_abs = settings.iterative_refinement_eps_abs;
        let eps_rel = settings.iterative_refinement_eps_rel;
        let min_rate = settings.iterative_refinement_min_improvement_rate;

        let rhs_norm = _norm_inf_blocks(&self.rhs, n_lb, n_ub);

        _residual(&self.reg, data, &self.rhs, lhs, &mut self.err);
        let mut err_norm = _norm_inf_blocks(&self.err, n_lb, n_ub);

        for _ in 0..settings.iterative_refinement_max_iter {
            if err_norm <= eps_abs + eps_rel * rhs_norm {
                break;
            }

            _solve_perturbed(
                &mut self.engine,
                &self.reg,
                data,
                &self.err,
                &mut self.correction,
                &mut self.work_x,
            );
            for (t, l, c) in [
                (&mut self.trial.x, &lhs.x, &self.correction.x),
                (&mut self.trial.y, &lhs.y, &self.correction.y),
                (&mut self.trial.z, &lhs.z, &self.correction.z),
                (&mut self.trial.z_lb, &lhs.z_lb, &self.correction.z_lb),
                (&mut self.trial.z_ub, &lhs.z_ub, &self.correction.z_ub),
            ] {
                t.waxpby(T::one(), l, T::one(), c);
            }

            _residual(&self.reg, data, &self.rhs, &self.trial, &mut self.err);
            let new_norm = _norm_inf_blocks(&self.err, n_lb, n_ub);

            let rate = err_norm / new_norm;
            if rate < min_rate {
                if rate > T::one() {
                    _copy_blocks(lhs, &self.trial);
                }
                break;
            }
            _copy_blocks(lhs, &self.trial);
            err_norm = new_norm;
        }
    }
}

// Solves the perturbed system (ρ+ε, δ+ε) for the x,y,z,z_lb,z_ub blocks
// by eliminating the bound rows and calling the engine.
fn _solve_perturbed<T, M, K>(
    engine: &mut K,
    reg: &KKTDiagonal<T>,
    data: &ProblemData<T, M>,
    rhs: &Variables<T>,
    lhs: &mut Variables<T>,
    work_x: &mut [T],
) where
    T: FloatT,
    M: ProblemMatrix<T>,
    K: KKTEngine<T, M>,
{
    let (n_lb, n_ub) = (data.n_lb, data.n_ub);

    work_x.copy_from(&rhs.x);
    for (k, &i) in data.x_lb_idx[..n_lb].iter().enumerate() {
        work_x[i] -= rhs.z_lb[k] / reg.w_lb[k];
    }
    for (k, &i) in data.x_ub_idx[..n_ub].iter().enumerate() {
        work_x[i] += rhs.z_ub[k] / reg.w_ub[k];
    }

    engine.solve(work_x, &rhs.y, &rhs.z, &mut lhs.x, &mut lhs.y, &mut lhs.z);

    for (k, &i) in data.x_lb_idx[..n_lb].iter().enumerate() {
        lhs.z_lb[k] = (-lhs.x[i] - rhs.z_lb[k]) / reg.w_lb[k];
    }
    for (k, &i) in data.x_ub_idx[..n_ub].iter().enumerate() {
        lhs.z_ub[k] = (lhs.x[i] - rhs.z_ub[k]) / reg.w_ub[k];
    }
}

// err = rhs - K*d for the unperturbed system
fn _residual<T, M>(
    reg: &KKTDiagonal<T>,
    data: &ProblemData<T, M>,
    rhs: &Variables<T>,
    d: &Variables<T>,
    err: &mut Variables<T>,
) where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    let (n_lb, n_ub) = (data.n_lb, data.n_ub);
    let (ρ, δ) = (reg.rho, reg.delta);

    err.x.waxpby(T::one(), &rhs.x, -ρ, &d.x);
    data.P.symv(&mut err.x, &d.x, -T::one(), T::one());
    data.A.gemv_t(&mut err.x, &d.y, -T::one(), T::one());
    data.G.gemv_t(&mut err.x, &d.z, -T::one(), T::one());
    for (k, &i) in data.x_lb_idx[..n_lb].iter().enumerate() {
        err.x[i] += d.z_lb[k];
    }
    for (k, &i) in data.x_ub_idx[..n_ub].iter().enumerate() {
        err.x[i] -= d.z_ub[k];
    }

    err.y.waxpby(T::one(), &rhs.y, δ, &d.y);
    data.A.gemv(&mut err.y, &d.x, -T::one(), T::one());

    for (ei, &ri, &dzi, &wi) in itertools::izip!(&mut err.z, &rhs.z, &d.z, &reg.s_z) {
        *ei = ri + (δ + wi) * dzi;
    }
    data.G.gemv(&mut err.z, &d.x, -T::one(), T::one());

    for (k, &i) in data.x_lb_idx[..n_lb].iter().enumerate() {
        err.z_lb[k] = rhs.z_lb[k] + d.x[i] + (δ + reg.s_z_lb[k]) * d.z_lb[k];
    }
    for (k, &i) in data.x_ub_idx[..n_ub].iter().enumerate() {
        err.z_ub[k] = rhs.z_ub[k] - d.x[i] + (δ + reg.s_z_ub[k]) * d.z_ub[k];
    }
}

fn _norm_inf_blocks<T: FloatT>(v: &Variables<T>, n_lb: usize, n_ub: usize) -> T {
    [
        v.x.norm_inf(),
        v.y.norm_inf(),
        v.z.norm_inf(),
        v.z_lb[..n_lb].norm_inf(),
        v.z_ub[..n_ub].norm_inf(),
    ]
    .into_iter()
    .fold(T::zero(), T::max)
}

fn _copy_blocks<T: FloatT>(dst: &mut Variables<T>, src: &Variables<T>) {
    dst.x.copy_from(&src.x);
    dst.y.copy_from(&src.y);
    dst.z.copy_from(&src.z);
    dst.z_lb.copy_from(&src.z_lb);
    dst.z_ub.copy_from(&src.z_ub);
}
