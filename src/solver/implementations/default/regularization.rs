use super::*;
use crate::algebra::*;

/// State of the proximal regularization `(ρ, δ)`.
///
/// Both parameters shrink with the complementarity measure as long as
/// the corresponding residual improves, and never go below the current
/// lower limit.  The limit is lowered once to its finetune value when
/// the parameters stall at it.
#[derive(Debug, Clone)]
pub struct ProximalRegularization<T> {
    /// primal proximal penalty
    pub rho: T,
    /// dual proximal penalty
    pub delta: T,
    /// current lower limit of `rho` and `delta`
    pub reg_limit: T,

    /// consecutive iterations without a primal (ζ) center update
    pub no_primal_update: u32,
    /// consecutive iterations without a dual (λ, ν) center update
    pub no_dual_update: u32,

    /// failed factorizations since the last success
    pub factor_retires: u32,
}

impl<T> ProximalRegularization<T>
where
    T: FloatT,
{
    pub fn new(settings: &Settings<T>) -> Self {
        Self {
            rho: settings.rho_init,
            delta: settings.delta_init,
            reg_limit: settings.reg_lower_limit,
            no_primal_update: 0,
            no_dual_update: 0,
            factor_retires: 0,
        }
    }

    pub(crate) fn reset(&mut self, settings: &Settings<T>) {
        *self = Self::new(settings);
    }

    /// Lowers the limit to `reg_finetune_lower_limit` if either parameter
    /// sits at the limit and its center has not moved for longer than
    /// the configured threshold.  Returns true if the limit changed.
    pub(crate) fn try_finetune(&mut self, settings: &Settings<T>) -> bool {
        if self.reg_limit == settings.reg_finetune_lower_limit {
            return false;
        }
        let primal_stalled = self.no_primal_update > settings.reg_finetune_primal_update_threshold
            && self.rho == self.reg_limit;
        let dual_stalled = self.no_dual_update > settings.reg_finetune_dual_update_threshold
            && self.delta == self.reg_limit;

        if primal_stalled || dual_stalled {
            self.reg_limit = settings.reg_finetune_lower_limit;
            self.no_primal_update = 0;
            self.no_dual_update = 0;
            return true;
        }
        false
    }

    /// Response to a failed factorization.  Returns false once the
    /// retries are exhausted.
    pub(crate) fn increase_after_failure(&mut self, settings: &Settings<T>) -> bool {
        if self.factor_retires >= settings.max_factor_retires {
            return false;
        }
        let factor: T = (100.).as_T();
        let limit_factor: T = (10.).as_T();
        self.rho *= factor;
        self.delta *= factor;
        self.reg_limit = T::min(limit_factor * self.reg_limit, settings.eps_abs);
        self.factor_retires += 1;
        true
    }

    pub(crate) fn reset_failures(&mut self) {
        self.factor_retires = 0;
    }

    /// Update of `δ` after a step.  Returns true if the dual centers
    /// should move to the new iterate.
    pub(crate) fn update_dual(&mut self, primal_inf: T, primal_inf_prev: Option<T>, mu_rate: T) -> bool {
        let improved = match primal_inf_prev {
            None => true,
            Some(prev) => primal_inf < _sufficient_decrease::<T>() * prev,
        };
        let rate = if improved {
            mu_rate
        } else {
            self.no_dual_update += 1;
            _slow_rate::<T>() * mu_rate
        };
        self.delta = T::max(self.delta * (T::one() - rate), self.reg_limit);
        improved
    }

    /// Update of `ρ` after a step.  Returns true if the primal center
    /// should move to the new iterate.
    pub(crate) fn update_primal(&mut self, dual_inf: T, dual_inf_prev: Option<T>, mu_rate: T) -> bool {
        let improved = match dual_inf_prev {
            None => true,
            Some(prev) => dual_inf < _sufficient_decrease::<T>() * prev,
        };
        let rate = if improved {
            mu_rate
        } else {
            self.no_primal_update += 1;
            _slow_rate::<T>() * mu_rate
        };
        self.rho = T::max(self.rho * (T::one() - rate), self.reg_limit);
        improved
    }
}

// a residual must drop below this fraction of its previous value
fn _sufficient_decrease<T: FloatT>() -> T {
    (0.95).as_T()
}

// damping of mu_rate when a residual did not improve
fn _slow_rate<T: FloatT>() -> T {
    (0.666).as_T()
}
