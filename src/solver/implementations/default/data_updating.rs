#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::kktsolvers::KKTEngine;
use crate::timers::*;
use thiserror::Error;

/// Error type returned by [`Solver::update`].  A rejected update leaves
/// the solver unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataUpdateError {
    #[error("Incompatible dimension for \"{0}\"")]
    IncompatibleDimension(&'static str),
    #[error("Data formatting error")]
    BadFormat(#[from] SparseFormatError),
    #[error("Update data does not match the solver's matrix layout")]
    WrongVariant,
}

/// A set of changes to the problem data.
///
/// Fields left at `None` keep their current values.  Matrices must keep
/// their dimensions and, for sparse problems, their sparsity pattern
/// (for `P`, the pattern of its upper triangle).
///
/// ```
/// use piqp::algebra::CscMatrix;
/// use piqp::solver::ProblemUpdate;
///
/// let c = [1.0, -1.0];
/// let update = ProblemUpdate::<f64, CscMatrix<f64>>::new()
///     .with_c(&c)
///     .reuse_preconditioner(true);
/// assert!(update.P.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ProblemUpdate<'a, T, M> {
    pub P: Option<&'a M>,
    pub c: Option<&'a [T]>,
    pub A: Option<&'a M>,
    pub b: Option<&'a [T]>,
    pub G: Option<&'a M>,
    pub h: Option<&'a [T]>,
    pub x_lb: Option<&'a [T]>,
    pub x_ub: Option<&'a [T]>,

    /// scale the new data with the existing preconditioner instead of
    /// recomputing it
    pub reuse_preconditioner: bool,
}

impl<T, M> Default for ProblemUpdate<'_, T, M> {
    fn default() -> Self {
        Self {
            P: None,
            c: None,
            A: None,
            b: None,
            G: None,
            h: None,
            x_lb: None,
            x_ub: None,
            reuse_preconditioner: false,
        }
    }
}

impl<'a, T, M> ProblemUpdate<'a, T, M> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_P(mut self, P: &'a M) -> Self {
        self.P = Some(P);
        self
    }
    pub fn with_c(mut self, c: &'a [T]) -> Self {
        self.c = Some(c);
        self
    }
    pub fn with_A(mut self, A: &'a M) -> Self {
        self.A = Some(A);
        self
    }
    pub fn with_b(mut self, b: &'a [T]) -> Self {
        self.b = Some(b);
        self
    }
    pub fn with_G(mut self, G: &'a M) -> Self {
        self.G = Some(G);
        self
    }
    pub fn with_h(mut self, h: &'a [T]) -> Self {
        self.h = Some(h);
        self
    }
    pub fn with_x_lb(mut self, x_lb: &'a [T]) -> Self {
        self.x_lb = Some(x_lb);
        self
    }
    pub fn with_x_ub(mut self, x_ub: &'a [T]) -> Self {
        self.x_ub = Some(x_ub);
        self
    }
    pub fn reuse_preconditioner(mut self, reuse: bool) -> Self {
        self.reuse_preconditioner = reuse;
        self
    }
}

impl<T, M, K> Solver<T, M, K>
where
    T: FloatT,
    M: ProblemMatrix<T>,
    K: KKTEngine<T, M>,
{
    /// Overwrites (parts of) the problem data, keeping the symbolic
    /// analysis of the KKT system.
    ///
    /// All inputs are checked before anything is modified.  The next
    /// [`solve`](crate::solver::IPSolver::solve) starts from scratch on the
    /// new data.
    pub fn update(&mut self, update: &ProblemUpdate<T, M>) -> Result<(), DataUpdateError> {
        let P_triu = self.check_update(update)?;

        let mut timers = std::mem::take(&mut self.timers);
        timers.reset_timer("update");
        timeit! {timers => "update"; {
            self.apply_update(update, P_triu);
        }}
        self.timers = timers;
        self.solution.info.update_timings(&self.timers, &self.settings);

        Ok(())
    }

    // validates every field of the update against the current data and
    // returns the upper triangle of a new P
    fn check_update(&self, update: &ProblemUpdate<T, M>) -> Result<Option<M>, DataUpdateError> {
        let data = &self.data;

        let check_vec = |v: Option<&[T]>, name, len| match v {
            Some(v) if v.len() != len => Err(DataUpdateError::IncompatibleDimension(name)),
            _ => Ok(()),
        };
        check_vec(update.c, "c", data.n)?;
        check_vec(update.b, "b", data.p)?;
        check_vec(update.h, "h", data.m)?;
        check_vec(update.x_lb, "x_lb", data.n)?;
        check_vec(update.x_ub, "x_ub", data.n)?;

        for (new, current, name) in [(update.A, &data.A, "A"), (update.G, &data.G, "G")] {
            if let Some(new) = new {
                if new.size() != current.size() {
                    return Err(DataUpdateError::IncompatibleDimension(name));
                }
                new.check_format()?;
                current.check_replacement(new)?;
            }
        }

        let P_triu = match update.P {
            Some(P) => {
                if P.size() != data.P.size() {
                    return Err(DataUpdateError::IncompatibleDimension("P"));
                }
                P.check_format()?;
                let P_triu = P.triu();
                data.P.check_replacement(&P_triu)?;
                Some(P_triu)
            }
            None => None,
        };

        Ok(P_triu)
    }

    fn apply_update(&mut self, update: &ProblemUpdate<T, M>, P_triu: Option<M>) {
        let data = &mut self.data;

        if !update.reuse_preconditioner {
            data.unscale();
        }

        if let Some(P) = &P_triu {
            data.P.copy_values_from(P);
        }
        if let Some(A) = update.A {
            data.A.copy_values_from(A);
        }
        if let Some(G) = update.G {
            data.G.copy_values_from(G);
        }
        if let Some(c) = update.c {
            data.c.copy_from(c);
        }
        if let Some(b) = update.b {
            data.b.copy_from(b);
        }
        if let Some(h) = update.h {
            data.h.copy_from(h);
        }
        if update.x_lb.is_some() {
            data.set_lower_bounds(update.x_lb);
        }
        if update.x_ub.is_some() {
            data.set_upper_bounds(update.x_ub);
        }

        if update.reuse_preconditioner {
            // only the new values need scaling
            let equil = &data.equilibration;
            let (d, e, f) = (&equil.d, &equil.e, &equil.f);
            if P_triu.is_some() {
                data.P.lrscale(d, d);
                data.P.scale(equil.c);
            }
            if update.A.is_some() {
                data.A.lrscale(e, d);
            }
            if update.G.is_some() {
                data.G.lrscale(f, d);
            }
            if update.c.is_some() {
                data.c.hadamard(d).scale(equil.c);
            }
            if update.b.is_some() {
                data.b.hadamard(e);
            }
            if update.h.is_some() {
                data.h.hadamard(f);
            }
            if update.x_lb.is_some() {
                data.scale_lower_bounds();
            }
            if update.x_ub.is_some() {
                data.scale_upper_bounds();
            }
        } else {
            data.equilibrate(&self.settings);
        }

        self.kktsystem.update_data(&self.data);
    }
}
