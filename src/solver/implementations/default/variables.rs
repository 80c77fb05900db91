#![allow(non_snake_case)]
use crate::algebra::*;

// ---------------
// Variables type for the proximal interior point method
// ---------------

/// Primal-dual iterate, in the scaled problem.
///
/// The same type holds Newton directions and their right hand sides, in
/// which case `x,y,z,z_lb,z_ub` carry the residuals of the stationarity,
/// equality, inequality and bound rows and `s,s_lb,s_ub` those of the
/// complementarity rows.
///
/// Box entries live in length `n` buffers of which only the first
/// `n_lb` (resp. `n_ub`) are active.
#[derive(Debug, Clone)]
pub struct Variables<T> {
    pub x: Vec<T>,
    pub y: Vec<T>,
    pub z: Vec<T>,
    pub z_lb: Vec<T>,
    pub z_ub: Vec<T>,
    pub s: Vec<T>,
    pub s_lb: Vec<T>,
    pub s_ub: Vec<T>,
}

impl<T> Variables<T>
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
            s_lb: vec![T::zero(); n],
            s_ub: vec![T::zero(); n],
        }
    }

    /// Sets every slack and inequality dual to one, active bounds included
    pub(crate) fn unit_complementarity(&mut self) {
        for v in [
            &mut self.z,
            &mut self.z_lb,
            &mut self.z_ub,
            &mut self.s,
            &mut self.s_lb,
            &mut self.s_ub,
        ] {
            v.set(T::one());
        }
    }

    /// Complementarity measure `(s'z + s_lb'z_lb + s_ub'z_ub)/N`.
    /// Zero without inequalities.
    pub(crate) fn calc_mu(&self, n_lb: usize, n_ub: usize) -> T {
        let N = self.z.len() + n_lb + n_ub;
        if N == 0 {
            return T::zero();
        }
        let sz = self.s.dot(&self.z)
            + self.s_lb[..n_lb].dot(&self.z_lb[..n_lb])
            + self.s_ub[..n_ub].dot(&self.z_ub[..n_ub]);
        sz / N.as_T()
    }

    /// Complementarity after a trial step, `Σ(s + α_p ds)(z + α_d dz)/N`
    pub(crate) fn calc_mu_shifted(&self, step: &Self, α_p: T, α_d: T, n_lb: usize, n_ub: usize) -> T {
        let N = self.z.len() + n_lb + n_ub;
        if N == 0 {
            return T::zero();
        }
        let dot = <[T] as VectorMath>::dot_shifted;
        let sz = dot(&self.z, &self.s, &step.z, &step.s, α_d, α_p)
            + dot(
                &self.z_lb[..n_lb],
                &self.s_lb[..n_lb],
                &step.z_lb[..n_lb],
                &step.s_lb[..n_lb],
                α_d,
                α_p,
            )
            + dot(
                &self.z_ub[..n_ub],
                &self.s_ub[..n_ub],
                &step.z_ub[..n_ub],
                &step.s_ub[..n_ub],
                α_d,
                α_p,
            );
        sz / N.as_T()
    }

    /// Largest primal and dual step lengths in `(0, 1]` that keep the
    /// slacks and duals nonnegative
    pub(crate) fn calc_step_length(&self, step: &Self, n_lb: usize, n_ub: usize) -> (T, T) {
        let mut α_p = T::one();
        for (v, dv) in [
            (&self.s[..], &step.s[..]),
            (&self.s_lb[..n_lb], &step.s_lb[..n_lb]),
            (&self.s_ub[..n_ub], &step.s_ub[..n_ub]),
        ] {
            α_p = T::min(α_p, _step_to_boundary(v, dv));
        }

        let mut α_d = T::one();
        for (v, dv) in [
            (&self.z[..], &step.z[..]),
            (&self.z_lb[..n_lb], &step.z_lb[..n_lb]),
            (&self.z_ub[..n_ub], &step.z_ub[..n_ub]),
        ] {
            α_d = T::min(α_d, _step_to_boundary(v, dv));
        }
        (α_p, α_d)
    }

    /// Moves the primal block `(x, s, s_lb, s_ub)` by `α_p` and the dual
    /// block `(y, z, z_lb, z_ub)` by `α_d`
    pub(crate) fn add_step(&mut self, step: &Self, α_p: T, α_d: T) {
        self.x.axpby(α_p, &step.x, T::one());
        self.s.axpby(α_p, &step.s, T::one());
        self.s_lb.axpby(α_p, &step.s_lb, T::one());
        self.s_ub.axpby(α_p, &step.s_ub, T::one());

        self.y.axpby(α_d, &step.y, T::one());
        self.z.axpby(α_d, &step.z, T::one());
        self.z_lb.axpby(α_d, &step.z_lb, T::one());
        self.z_ub.axpby(α_d, &step.z_ub, T::one());
    }

    /// Mehrotra style shift of the starting point into the interior.
    ///
    /// Returns `false` if the shifted point is not strictly positive, in
    /// which case the slacks and duals are left unchanged.
    pub(crate) fn shift_to_interior(&mut self, n_lb: usize, n_ub: usize) -> bool {
        let s_blocks = [&self.s[..], &self.s_lb[..n_lb], &self.s_ub[..n_ub]];
        let z_blocks = [&self.z[..], &self.z_lb[..n_lb], &self.z_ub[..n_ub]];

        let min_s = s_blocks.iter().fold(T::infinity(), |m, v| T::min(m, v.minimum()));
        let min_z = z_blocks.iter().fold(T::infinity(), |m, v| T::min(m, v.minimum()));

        let c: T = (1.5).as_T();
        let δs = T::max(-c * min_s, T::zero());
        let δz = T::max(-c * min_z, T::zero());

        let mut sz = T::zero();
        let mut s_sum = T::zero();
        let mut z_sum = T::zero();
        for (s, z) in s_blocks.iter().zip(z_blocks.iter()) {
            for (&si, &zi) in s.iter().zip(z.iter()) {
                sz += (si + δs) * (zi + δz);
                s_sum += si + δs;
                z_sum += zi + δz;
            }
        }

        if !(sz > T::zero() && s_sum > T::zero() && z_sum > T::zero()) {
            return false;
        }

        let half: T = (0.5).as_T();
        let shift_s = δs + half * sz / z_sum;
        let shift_z = δz + half * sz / s_sum;

        // new values are strictly positive only if the minima are
        if !(min_s + shift_s > T::zero() && min_z + shift_z > T::zero()) {
            return false;
        }

        for v in [&mut self.s, &mut self.s_lb, &mut self.s_ub] {
            v.translate(shift_s);
        }
        for v in [&mut self.z, &mut self.z_lb, &mut self.z_ub] {
            v.translate(shift_z);
        }
        true
    }
}

// largest α ≤ 1 with v + α dv ≥ 0, for v > 0
fn _step_to_boundary<T: FloatT>(v: &[T], dv: &[T]) -> T {
    v.iter()
        .zip(dv)
        .filter(|(_, dvi)| **dvi < T::zero())
        .fold(T::one(), |α, (&vi, &dvi)| T::min(α, -vi / dvi))
}

// ---------------
// Proximal centers
// ---------------

/// Centers `(ζ, λ, ν, ν_lb, ν_ub)` of the proximal terms
#[derive(Debug, Clone)]
pub struct ProximalCenters<T> {
    pub zeta: Vec<T>,
    pub lambda: Vec<T>,
    pub nu: Vec<T>,
    pub nu_lb: Vec<T>,
    pub nu_ub: Vec<T>,
}

impl<T> ProximalCenters<T>
where
    T: FloatT,
{
    pub fn new(n: usize, p: usize, m: usize) -> Self {
        Self {
            zeta: vec![T::zero(); n],
            lambda: vec![T::zero(); p],
            nu: vec![T::zero(); m],
            nu_lb: vec![T::zero(); n],
            nu_ub: vec![T::zero(); n],
        }
    }

    pub(crate) fn set_primal(&mut self, vars: &Variables<T>) {
        self.zeta.copy_from(&vars.x);
    }

    pub(crate) fn set_dual(&mut self, vars: &Variables<T>) {
        self.lambda.copy_from(&vars.y);
        self.nu.copy_from(&vars.z);
        self.nu_lb.copy_from(&vars.z_lb);
        self.nu_ub.copy_from(&vars.z_ub);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_length() {
        let mut v = Variables::<f64>::new(2, 0, 2);
        v.unit_complementarity();
        let mut step = Variables::<f64>::new(2, 0, 2);
        step.s.copy_from_slice(&[-2., 1.]);
        step.z.copy_from_slice(&[1., -0.25]);
        // inactive bound entries are ignored
        step.s_lb.copy_from_slice(&[-4., -100.]);

        let (α_p, α_d) = v.calc_step_length(&step, 1, 0);
        assert_eq!(α_p, 0.25);
        assert_eq!(α_d, 1.0);

        step.z_lb[0] = -1e-3;
        let (_, α_d) = v.calc_step_length(&step, 1, 0);
        assert_eq!(α_d, 1.0);
    }

    #[test]
    fn test_mu() {
        let mut v = Variables::<f64>::new(1, 0, 1);
        v.s[0] = 2.;
        v.z[0] = 3.;
        v.s_lb[0] = 1.;
        v.z_lb[0] = 4.;
        assert_eq!(v.calc_mu(1, 0), 5.0);

        let mut step = Variables::<f64>::new(1, 0, 1);
        step.s[0] = -2.;
        step.z[0] = 1.;
        // (2 - 1)(3 + 1) + (1)(4) over 2
        assert_eq!(v.calc_mu_shifted(&step, 0.5, 1.0, 1, 0), 4.0);

        // no inequalities
        let v = Variables::<f64>::new(3, 1, 0);
        assert_eq!(v.calc_mu(0, 0), 0.0);
    }

    #[test]
    fn test_shift_to_interior() {
        let mut v = Variables::<f64>::new(1, 0, 2);
        v.s.copy_from_slice(&[-1., 2.]);
        v.z.copy_from_slice(&[1., 1.]);
        assert!(v.shift_to_interior(0, 0));
        assert!(v.s.iter().all(|&s| s > 0.));
        assert!(v.z.iter().all(|&z| z > 0.));

        // all zero point cannot be shifted
        let mut v = Variables::<f64>::new(1, 0, 2);
        assert!(!v.shift_to_interior(0, 0));
        assert_eq!(v.s, vec![0., 0.]);
    }
}
