#![allow(non_snake_case)]
use super::residuals::_norm_inf_gathered;
use super::*;
use crate::algebra::*;
use crate::solver::core::Status;
use crate::timers::*;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Solver diagnostics, refreshed on every iteration.
///
/// Residuals, objectives and the duality gap are reported for the
/// problem as given by the user, i.e. after undoing the preconditioner.
/// Times are in seconds and only recorded if
/// [`compute_timings`](crate::solver::Settings::compute_timings) is set.

#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Info<T> {
    pub status: Status,
    pub iter: u32,

    pub rho: T,
    pub delta: T,
    pub mu: T,
    pub sigma: T,
    pub primal_step: T,
    pub dual_step: T,

    pub primal_inf: T,
    pub primal_rel_inf: T,
    pub dual_inf: T,
    pub dual_rel_inf: T,

    pub primal_obj: T,
    pub dual_obj: T,
    pub duality_gap: T,
    pub duality_gap_rel: T,

    pub factor_retires: u32,
    pub reg_limit: T,
    pub no_primal_update: u32,
    pub no_dual_update: u32,

    pub setup_time: f64,
    pub update_time: f64,
    pub solve_time: f64,
    pub run_time: f64,
}

impl<T> Info<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self {
            setup_time: self.setup_time,
            update_time: self.update_time,
            ..Self::default()
        };
    }

    /// Copies the state of the regularization controller
    pub(crate) fn update_regularization(&mut self, reg: &ProximalRegularization<T>) {
        self.rho = reg.rho;
        self.delta = reg.delta;
        self.reg_limit = reg.reg_limit;
        self.no_primal_update = reg.no_primal_update;
        self.no_dual_update = reg.no_dual_update;
        self.factor_retires = reg.factor_retires;
    }

    /// Infeasibilities, objectives and gap of the current iterate in
    /// the user's coordinates
    pub(crate) fn update_residuals<M: ProblemMatrix<T>>(
        &mut self,
        data: &ProblemData<T, M>,
        vars: &Variables<T>,
        res: &Residuals<T>,
    ) {
        let (n_lb, n_ub) = (data.n_lb, data.n_ub);
        let lb_idx = &data.x_lb_idx[..n_lb];
        let ub_idx = &data.x_ub_idx[..n_ub];
        let equil = &data.equilibration;
        let (d, dinv) = (&equil.d, &equil.dinv);
        let (einv, finv) = (&equil.einv, &equil.finv);
        let cinv = equil.cinv;

        // primal residuals
        self.primal_inf = _max_of(&[
            res.ry_nr.norm_inf_scaled(einv),
            res.rz_nr.norm_inf_scaled(finv),
            _norm_inf_gathered(&res.rz_lb_nr[..n_lb], d, lb_idx),
            _norm_inf_gathered(&res.rz_ub_nr[..n_ub], d, ub_idx),
        ]);
        self.primal_rel_inf = _max_of(&[
            res.Ax.norm_inf_scaled(einv),
            data.b.norm_inf_scaled(einv),
            res.Gx.norm_inf_scaled(finv),
            data.h.norm_inf_scaled(finv),
            vars.s.norm_inf_scaled(finv),
            _norm_inf_indexed(&vars.x, d, lb_idx),
            _norm_inf_indexed(&vars.x, d, ub_idx),
            _norm_inf_gathered(&data.x_lb[..n_lb], d, lb_idx),
            _norm_inf_gathered(&data.x_ub[..n_ub], d, ub_idx),
        ]);

        // dual residuals
        self.dual_inf = res.rx_nr.norm_inf_scaled(dinv) * cinv;
        self.dual_rel_inf = _max_of(&[
            res.Px.norm_inf_scaled(dinv),
            data.c.norm_inf_scaled(dinv),
            res.Aty.norm_inf_scaled(dinv),
            res.Gtz.norm_inf_scaled(dinv),
            _norm_inf_gathered(&vars.z_lb[..n_lb], dinv, lb_idx),
            _norm_inf_gathered(&vars.z_ub[..n_ub], dinv, ub_idx),
        ]) * cinv;

        // objectives
        let half: T = (0.5).as_T();
        let xPx_half = half * vars.x.dot(&res.Px) * cinv;
        let cx = data.c.dot(&vars.x) * cinv;
        let by = data.b.dot(&vars.y) * cinv;
        let hz = data.h.dot(&vars.z) * cinv;
        let lbz = data.x_lb[..n_lb].dot(&vars.z_lb[..n_lb]) * cinv;
        let ubz = data.x_ub[..n_ub].dot(&vars.z_ub[..n_ub]) * cinv;

        self.primal_obj = xPx_half + cx;
        self.dual_obj = -xPx_half - by - hz + lbz - ubz;
        self.duality_gap = T::abs(self.primal_obj - self.dual_obj);
        self.duality_gap_rel = _max_of(&[
            T::abs(xPx_half),
            T::abs(cx),
            T::abs(by),
            T::abs(hz),
            T::abs(lbz),
            T::abs(ubz),
        ]);
    }

    /// Checks the termination tolerances
    pub(crate) fn is_solved(&self, settings: &Settings<T>) -> bool {
        let primal_ok = self.primal_inf < settings.eps_abs + settings.eps_rel * self.primal_rel_inf;
        let dual_ok = self.dual_inf < settings.eps_abs + settings.eps_rel * self.dual_rel_inf;
        let gap_ok = !settings.check_duality_gap
            || self.duality_gap
                < settings.eps_duality_gap_abs + settings.eps_duality_gap_rel * self.duality_gap_rel;
        primal_ok && dual_ok && gap_ok
    }

    /// Copies the elapsed times from the timers
    pub(crate) fn update_timings(&mut self, timers: &Timers, settings: &Settings<T>) {
        if !settings.compute_timings {
            return;
        }
        self.setup_time = timers.elapsed("setup").as_secs_f64();
        self.update_time = timers.elapsed("update").as_secs_f64();
        self.solve_time = timers.elapsed("solve").as_secs_f64();
        self.run_time = self.setup_time + self.update_time + self.solve_time;
    }
}

fn _max_of<T: FloatT>(vals: &[T]) -> T {
    vals.iter().fold(T::zero(), |acc, &v| T::max(acc, v))
}

// max_k |x[idx[k]] * s[idx[k]]|
fn _norm_inf_indexed<T: FloatT>(x: &[T], s: &[T], idx: &[usize]) -> T {
    idx.iter()
        .fold(T::zero(), |acc, &i| T::max(acc, T::abs(x[i] * s[i])))
}
