use crate::{algebra::*, solver::core::SettingsError};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Solver settings.
///
/// All fields take default values, so a typical construction overrides
/// only what it needs:
///
/// ```
/// use piqp::solver::*;
///
/// let settings = SettingsBuilder::<f64>::default()
///     .eps_abs(1e-9)
///     .verbose(true)
///     .build()
///     .unwrap();
/// assert_eq!(settings.max_iter, 250);
/// ```
///
/// Settings are not checked when they are set.  The solver calls
/// [`validate`](Settings::validate) at the start of every solve and
/// terminates with [`Status::InvalidSettings`](crate::solver::Status::InvalidSettings)
/// if it fails.

#[derive(Builder, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings<T: FloatT> {
    ///initial value of the primal proximal penalty
    #[builder(default = "(1e-6).as_T()")]
    pub rho_init: T,

    ///initial value of the dual proximal penalty
    #[builder(default = "(1e-4).as_T()")]
    pub delta_init: T,

    ///absolute tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub eps_abs: T,

    ///relative tolerance
    #[builder(default = "(1e-9).as_T()")]
    pub eps_rel: T,

    ///include the duality gap in the termination criterion
    #[builder(default = "true")]
    pub check_duality_gap: bool,

    ///absolute duality gap tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub eps_duality_gap_abs: T,

    ///relative duality gap tolerance
    #[builder(default = "(1e-9).as_T()")]
    pub eps_duality_gap_rel: T,

    ///lower limit on the proximal penalties
    #[builder(default = "(1e-10).as_T()")]
    pub reg_lower_limit: T,

    ///lower limit on the proximal penalties once fine tuning is triggered
    #[builder(default = "(1e-13).as_T()")]
    pub reg_finetune_lower_limit: T,

    ///iterations without a primal center update before fine tuning
    #[builder(default = "7")]
    pub reg_finetune_primal_update_threshold: u32,

    ///iterations without a dual center update before fine tuning
    #[builder(default = "5")]
    pub reg_finetune_dual_update_threshold: u32,

    ///maximum number of iterations
    #[builder(default = "250")]
    pub max_iter: u32,

    ///maximum number of factorization retries per iteration
    #[builder(default = "10")]
    pub max_factor_retires: u32,

    ///include the cost in the preconditioner scaling
    #[builder(default = "false")]
    pub preconditioner_scale_cost: bool,

    ///number of Ruiz equilibration passes
    #[builder(default = "10")]
    pub preconditioner_iter: u32,

    ///fraction to boundary factor
    #[builder(default = "(0.99).as_T()")]
    pub tau: T,

    ///always use iterative refinement for KKT solves
    #[builder(default = "false")]
    pub iterative_refinement_always_enabled: bool,

    ///iterative refinement absolute tolerance
    #[builder(default = "(1e-12).as_T()")]
    pub iterative_refinement_eps_abs: T,

    ///iterative refinement relative tolerance
    #[builder(default = "(1e-12).as_T()")]
    pub iterative_refinement_eps_rel: T,

    ///iterative refinement maximum iterations
    #[builder(default = "10")]
    pub iterative_refinement_max_iter: u32,

    ///minimum error reduction factor per refinement step
    #[builder(default = "(5.0).as_T()")]
    pub iterative_refinement_min_improvement_rate: T,

    ///static regularization added while refining
    #[builder(default = "(1e-7).as_T()")]
    pub iterative_refinement_static_regularization_eps: T,

    ///static regularization added while refining, relative to the largest diagonal entry
    #[builder(default = "T::epsilon()*T::epsilon()")]
    pub iterative_refinement_static_regularization_rel: T,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///record setup, update and solve times in the info
    #[builder(default = "false")]
    pub compute_timings: bool,
}

impl<T> Default for Settings<T>
where
    T: FloatT,
{
    fn default() -> Settings<T> {
        Settings {
            rho_init: (1e-6).as_T(),
            delta_init: (1e-4).as_T(),
            eps_abs: (1e-8).as_T(),
            eps_rel: (1e-9).as_T(),
            check_duality_gap: true,
            eps_duality_gap_abs: (1e-8).as_T(),
            eps_duality_gap_rel: (1e-9).as_T(),
            reg_lower_limit: (1e-10).as_T(),
            reg_finetune_lower_limit: (1e-13).as_T(),
            reg_finetune_primal_update_threshold: 7,
            reg_finetune_dual_update_threshold: 5,
            max_iter: 250,
            max_factor_retires: 10,
            preconditioner_scale_cost: false,
            preconditioner_iter: 10,
            tau: (0.99).as_T(),
            iterative_refinement_always_enabled: false,
            iterative_refinement_eps_abs: (1e-12).as_T(),
            iterative_refinement_eps_rel: (1e-12).as_T(),
            iterative_refinement_max_iter: 10,
            iterative_refinement_min_improvement_rate: (5.0).as_T(),
            iterative_refinement_static_regularization_eps: (1e-7).as_T(),
            iterative_refinement_static_regularization_rel: T::epsilon() * T::epsilon(),
            verbose: false,
            compute_timings: false,
        }
    }
}

macro_rules! check_positive {
    ($self:expr, $field:ident) => {
        if !($self.$field > T::zero() && $self.$field.is_finite()) {
            return Err(SettingsError::BadFieldValue(stringify!($field)));
        }
    };
}

macro_rules! check_nonnegative {
    ($self:expr, $field:ident) => {
        if !($self.$field >= T::zero() && $self.$field.is_finite()) {
            return Err(SettingsError::BadFieldValue(stringify!($field)));
        }
    };
}

impl<T> Settings<T>
where
    T: FloatT,
{
    /// Checks that all values lie in their admissible ranges
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_positive!(self, rho_init);
        check_positive!(self, delta_init);
        check_positive!(self, eps_abs);
        check_nonnegative!(self, eps_rel);
        check_positive!(self, eps_duality_gap_abs);
        check_nonnegative!(self, eps_duality_gap_rel);
        check_positive!(self, reg_lower_limit);
        check_positive!(self, reg_finetune_lower_limit);
        check_nonnegative!(self, iterative_refinement_eps_abs);
        check_nonnegative!(self, iterative_refinement_eps_rel);
        check_positive!(self, iterative_refinement_static_regularization_eps);
        check_nonnegative!(self, iterative_refinement_static_regularization_rel);

        if self.reg_finetune_lower_limit > self.reg_lower_limit {
            return Err(SettingsError::InconsistentFields(
                "reg_finetune_lower_limit",
                "reg_lower_limit",
            ));
        }

        if !(self.tau > T::zero() && self.tau <= T::one()) {
            return Err(SettingsError::BadFieldValue("tau"));
        }

        if !(self.iterative_refinement_min_improvement_rate > T::one()) {
            return Err(SettingsError::BadFieldValue(
                "iterative_refinement_min_improvement_rate",
            ));
        }

        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    // defaults are valid, and the builder agrees with Default
    let settings = SettingsBuilder::<f64>::default().build().unwrap();
    assert!(settings.validate().is_ok());
    assert_eq!(settings, Settings::default());
    assert_eq!(
        settings.iterative_refinement_static_regularization_rel,
        f64::EPSILON * f64::EPSILON
    );

    let settings = Settings::<f64> {
        eps_abs: -1.0,
        ..Settings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("eps_abs"))
    );

    let settings = Settings::<f64> {
        rho_init: f64::NAN,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());

    let settings = Settings::<f64> {
        tau: 1.5,
        ..Settings::default()
    };
    assert_eq!(settings.validate(), Err(SettingsError::BadFieldValue("tau")));

    let settings = Settings::<f64> {
        reg_finetune_lower_limit: 1e-5,
        ..Settings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(SettingsError::InconsistentFields(..))
    ));

    let settings = Settings::<f64> {
        iterative_refinement_min_improvement_rate: 0.5,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}
