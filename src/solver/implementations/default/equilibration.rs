#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;

// bounds applied to each Ruiz scaling factor
const MIN_SCALING: f64 = 1e-4;
const MAX_SCALING: f64 = 1e4;

// ---------------
// equilibration data
// ---------------

/// Data from the Ruiz equilibration procedure.
///
/// The scaled problem is obtained from the user's problem as
/// `P̂ = c·DPD`, `ĉ = c·Dc`, `Â = EAD`, `b̂ = Eb`, `Ĝ = FGD`, `ĥ = Fh`
/// and `x̂_lb = D⁻¹x_lb`, `x̂_ub = D⁻¹x_ub`.
#[derive(Debug, Clone)]
pub struct EquilibrationData<T> {
    /// Vector of variable scaling terms
    pub d: Vec<T>,
    /// Vector of inverse variable scaling terms
    pub dinv: Vec<T>,
    /// Vector of equality constraint scaling terms
    pub e: Vec<T>,
    /// Vector of inverse equality constraint scaling terms
    pub einv: Vec<T>,
    /// Vector of inequality constraint scaling terms
    pub f: Vec<T>,
    /// Vector of inverse inequality constraint scaling terms
    pub finv: Vec<T>,
    /// overall scaling for objective function
    pub c: T,
    /// inverse of the objective scaling
    pub cinv: T,
}

impl<T> EquilibrationData<T>
where
    T: FloatT,
{
    /// creates an identity scaling
    pub fn new(n: usize, p: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); p],
            einv: vec![T::one(); p],
            f: vec![T::one(); m],
            finv: vec![T::one(); m],
            c: T::one(),
            cinv: T::one(),
        }
    }

    /// resets to the identity scaling
    pub fn reset(&mut self) {
        for v in [
            &mut self.d,
            &mut self.dinv,
            &mut self.e,
            &mut self.einv,
            &mut self.f,
            &mut self.finv,
        ] {
            v.set(T::one());
        }
        self.c = T::one();
        self.cinv = T::one();
    }

    fn update_inverses(&mut self) {
        self.dinv.scalarop_from(T::recip, &self.d);
        self.einv.scalarop_from(T::recip, &self.e);
        self.finv.scalarop_from(T::recip, &self.f);
        self.cinv = T::recip(self.c);
    }
}

impl<T, M> ProblemData<T, M>
where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    /// Ruiz equilibration of the problem data.
    ///
    /// Assumes the data is currently unscaled, i.e. the equilibration
    /// holds the identity scaling.
    pub(crate) fn equilibrate(&mut self, settings: &Settings<T>) {
        let n = self.n;
        let equil = &mut self.equilibration;

        let (d, e, f) = (&mut equil.d, &mut equil.e, &mut equil.f);

        // use the inverse scalings as work vectors
        let dwork = &mut equil.dinv;
        let ework = &mut equil.einv;
        let fwork = &mut equil.finv;

        // note that P is triu
        let (P, A, G) = (&mut self.P, &mut self.A, &mut self.G);
        let (c, b, h) = (&mut self.c, &mut self.b, &mut self.h);

        for _ in 0..settings.preconditioner_iter {
            dwork.set(T::zero());
            ework.set(T::zero());
            fwork.set(T::zero());

            // column norms of the KKT matrix [P A' G'; A 0 0; G 0 0]
            P.col_norms_sym_no_reset(dwork);
            A.col_norms_no_reset(dwork);
            G.col_norms_no_reset(dwork);
            A.row_norms_no_reset(ework);
            G.row_norms_no_reset(fwork);

            for work in [&mut *dwork, &mut *ework, &mut *fwork] {
                work.scalarop(limit_scaling).rsqrt();
            }

            P.lrscale(dwork, dwork);
            A.lrscale(ework, dwork);
            G.lrscale(fwork, dwork);
            c.hadamard(dwork);
            b.hadamard(ework);
            h.hadamard(fwork);

            d.hadamard(dwork);
            e.hadamard(ework);
            f.hadamard(fwork);

            if settings.preconditioner_scale_cost && n > 0 {
                dwork.set(T::zero());
                P.col_norms_sym_no_reset(dwork);
                let mean_col_norm_P = dwork.sum() / n.as_T();
                let scale_cost = limit_scaling(T::max(mean_col_norm_P, c.norm_inf()));
                let ctmp = T::recip(scale_cost);

                P.scale(ctmp);
                c.scale(ctmp);
                equil.c *= ctmp;
            }
        }

        equil.update_inverses();

        self.scale_bounds();
    }

    /// Reverts the equilibration in place and resets it to the identity.
    pub(crate) fn unscale(&mut self) {
        let equil = &mut self.equilibration;
        let (dinv, einv, finv, cinv) = (&equil.dinv, &equil.einv, &equil.finv, equil.cinv);

        self.P.lrscale(dinv, dinv);
        self.P.scale(cinv);
        self.A.lrscale(einv, dinv);
        self.G.lrscale(finv, dinv);
        self.c.hadamard(dinv).scale(cinv);
        self.b.hadamard(einv);
        self.h.hadamard(finv);

        let d = &equil.d;
        for (v, &i) in self.x_lb[..self.n_lb].iter_mut().zip(&self.x_lb_idx) {
            *v *= d[i];
        }
        for (v, &i) in self.x_ub[..self.n_ub].iter_mut().zip(&self.x_ub_idx) {
            *v *= d[i];
        }

        equil.reset();
    }

    // x̂_lb = D⁻¹x_lb and x̂_ub = D⁻¹x_ub on the packed entries
    pub(crate) fn scale_bounds(&mut self) {
        self.scale_lower_bounds();
        self.scale_upper_bounds();
    }

    pub(crate) fn scale_lower_bounds(&mut self) {
        let dinv = &self.equilibration.dinv;
        for (v, &i) in self.x_lb[..self.n_lb].iter_mut().zip(&self.x_lb_idx) {
            *v *= dinv[i];
        }
    }

    pub(crate) fn scale_upper_bounds(&mut self) {
        let dinv = &self.equilibration.dinv;
        for (v, &i) in self.x_ub[..self.n_ub].iter_mut().zip(&self.x_ub_idx) {
            *v *= dinv[i];
        }
    }
}

fn limit_scaling<T: FloatT>(s: T) -> T {
    if s < MIN_SCALING.as_T() {
        T::one()
    } else if s > MAX_SCALING.as_T() {
        MAX_SCALING.as_T()
    } else {
        s
    }
}
