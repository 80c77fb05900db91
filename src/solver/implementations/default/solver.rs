#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::core::{
    callbacks::{Callback, SolverCallbacks},
    kktsolvers::*,
    IPSolver, Status,
};
use crate::timers::*;

/// Proximal interior point solver for problems of the form
///
/// ```text
///   minimize    ½x'Px + c'x
///   subject to  Ax = b
///               Gx ≤ h
///               x_lb ≤ x ≤ x_ub
/// ```
///
/// generic over the matrix layout `M` and the KKT engine `K`.  Use the
/// [`DenseSolver`] and [`SparseSolver`] aliases.
pub struct Solver<T, M, K>
where
    T: FloatT,
{
    pub(crate) data: ProblemData<T, M>,
    pub(crate) variables: Variables<T>,
    pub(crate) centers: ProximalCenters<T>,
    pub(crate) residuals: Residuals<T>,
    pub(crate) kktsystem: KKTSystem<T, M, K>,
    pub(crate) regularization: ProximalRegularization<T>,
    pub(crate) step_lhs: Variables<T>,
    pub(crate) step_rhs: Variables<T>,
    pub(crate) solution: Solution<T>,
    pub(crate) settings: Settings<T>,
    pub(crate) timers: Timers,
    pub(crate) callbacks: SolverCallbacks<Info<T>>,
    pub(crate) print_target: PrintTarget,
}

/// Solver for dense problems, factored with a dense Cholesky decomposition
pub type DenseSolver<T = f64> = Solver<T, Matrix<T>, DenseKKTEngine<T>>;

/// Solver for sparse problems, factored with a sparse LDLᵀ decomposition
pub type SparseSolver<T = f64> = Solver<T, CscMatrix<T>, SparseKKTEngine<T>>;

impl<T, M, K> Solver<T, M, K>
where
    T: FloatT,
    M: ProblemMatrix<T>,
    K: KKTEngine<T, M>,
{
    /// Sets up a solver for the given problem.
    ///
    /// Only the upper triangle of `P` is read.  Bounds of magnitude at
    /// least `1e30` (or infinite) are treated as absent, as is a missing
    /// bound vector.  The data is equilibrated and the KKT system is
    /// analysed here.  Settings are checked on every
    /// [`solve`](IPSolver::solve).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        P: &M,
        c: &[T],
        A: &M,
        b: &[T],
        G: &M,
        h: &[T],
        x_lb: Option<&[T]>,
        x_ub: Option<&[T]>,
        settings: Settings<T>,
    ) -> Result<Self, SetupError> {
        let mut timers = Timers::default();
        let output;

        timeit! {timers => "setup"; {
            output = Self::allocate(P, c, A, b, G, h, x_lb, x_ub, settings);
        }}

        let mut solver = output?;
        solver.timers = timers;
        solver
            .solution
            .info
            .update_timings(&solver.timers, &solver.settings);
        Ok(solver)
    }

    #[allow(clippy::too_many_arguments)]
    fn allocate(
        P: &M,
        c: &[T],
        A: &M,
        b: &[T],
        G: &M,
        h: &[T],
        x_lb: Option<&[T]>,
        x_ub: Option<&[T]>,
        settings: Settings<T>,
    ) -> Result<Self, SetupError> {
        let mut data = ProblemData::new(P, c, A, b, G, h, x_lb, x_ub)?;
        let (n, p, m) = (data.n, data.p, data.m);

        data.equilibrate(&settings);
        let kktsystem = KKTSystem::new(&data)?;

        Ok(Self {
            data,
            variables: Variables::new(n, p, m),
            centers: ProximalCenters::new(n, p, m),
            residuals: Residuals::new(n, p, m),
            kktsystem,
            regularization: ProximalRegularization::new(&settings),
            step_lhs: Variables::new(n, p, m),
            step_rhs: Variables::new(n, p, m),
            solution: Solution::new(n, p, m),
            settings,
            timers: Timers::default(),
            callbacks: SolverCallbacks::default(),
            print_target: PrintTarget::default(),
        })
    }

    /// Result of the last solve
    pub fn result(&self) -> &Solution<T> {
        &self.solution
    }

    /// Diagnostics of the last solve
    pub fn info(&self) -> &Info<T> {
        &self.solution.info
    }

    pub fn settings(&self) -> &Settings<T> {
        &self.settings
    }

    /// Mutable access to the settings.  Changes take effect on the next
    /// solve, which also checks them.
    pub fn settings_mut(&mut self) -> &mut Settings<T> {
        &mut self.settings
    }

    pub fn update_settings(&mut self, settings: Settings<T>) {
        self.settings = settings;
    }

    /// Installs a callback that is polled once per iteration with the
    /// current [`Info`].  Returning `true` stops the solve with
    /// [`Status::CallbackTerminated`].
    pub fn set_termination_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Info<T>) -> bool + Send + 'static,
    {
        self.callbacks.termination_callback = Callback::Rust(Box::new(callback));
    }

    pub fn unset_termination_callback(&mut self) {
        self.callbacks.termination_callback = Callback::None;
    }

    // ---------------
    // main algorithm
    // ---------------

    fn run(&mut self, timers: &mut Timers) -> Status {
        if self.settings.validate().is_err() {
            return Status::InvalidSettings;
        }

        let (n_lb, n_ub) = (self.data.n_lb, self.data.n_ub);
        let no_inequalities = self.data.n_complementarity() == 0;

        self.regularization.reset(&self.settings);
        self.kktsystem
            .set_refinement(self.settings.iterative_refinement_always_enabled);

        let is_init_success;
        timeit! {timers => "init"; {
            is_init_success = self.initialize();
        }}
        if !is_init_success {
            return Status::NumericalError;
        }

        let mut μ = self.variables.calc_mu(n_lb, n_ub);
        let mut primal_inf_prev = None;
        let mut dual_inf_prev = None;
        let mut iter: u32 = 0;

        loop {
            // diagnostics and termination
            // --------------
            let info = &mut self.solution.info;
            info.iter = iter;
            info.mu = μ;
            info.update_regularization(&self.regularization);
            info.update_residuals(&self.data, &self.variables, &self.residuals);
            let _ = info.print_status(&mut self.print_target, &self.settings);

            if self.callbacks.check_termination(&self.solution.info) {
                return Status::CallbackTerminated;
            }

            if self.solution.info.is_solved(&self.settings) {
                return Status::Solved;
            }

            let eps = self.settings.eps_abs;
            if self.regularization.no_dual_update > 5
                && self
                    .residuals
                    .is_primal_infeasible(&self.data, &self.variables, &self.centers, eps)
            {
                return Status::PrimalInfeasible;
            }
            if self.regularization.no_primal_update > 5
                && self
                    .residuals
                    .is_dual_infeasible(&self.data, &self.variables, &self.centers, eps)
            {
                return Status::DualInfeasible;
            }

            if iter >= self.settings.max_iter {
                return Status::MaxIterReached;
            }
            iter += 1;

            // factorization
            // --------------
            self.regularization.try_finetune(&self.settings);

            let is_factor_success;
            timeit! {timers => "kkt factor"; {
                is_factor_success = self.factorize();
            }}
            if !is_factor_success {
                return Status::NumericalError;
            }

            self.residuals.proximal_rhs(
                &mut self.step_rhs,
                &self.variables,
                &self.centers,
                self.regularization.rho,
                self.regularization.delta,
            );

            // step
            // --------------
            let (α_p, α_d, σ);
            timeit! {timers => "kkt solve"; {
                (α_p, α_d, σ) = if no_inequalities {
                    self.kkt_solve();
                    (T::one(), T::one(), T::zero())
                } else {
                    self.predictor_corrector(μ)
                };
            }}

            self.variables.add_step(&self.step_lhs, α_p, α_d);

            let μ_prev = μ;
            μ = self.variables.calc_mu(n_lb, n_ub);
            let mu_rate = if no_inequalities {
                T::one()
            } else {
                T::max(μ_prev - μ, T::zero()) / μ_prev
            };

            // regularization and proximal centers
            // --------------
            self.residuals.update(&self.data, &self.variables);
            let primal_inf = self.residuals.scaled_primal_inf(n_lb, n_ub);
            let dual_inf = self.residuals.scaled_dual_inf();

            let reg = &mut self.regularization;
            if reg.update_dual(primal_inf, primal_inf_prev, mu_rate) {
                self.centers.set_dual(&self.variables);
            }
            if reg.update_primal(dual_inf, dual_inf_prev, mu_rate) {
                self.centers.set_primal(&self.variables);
            }
            primal_inf_prev = Some(primal_inf);
            dual_inf_prev = Some(dual_inf);

            let info = &mut self.solution.info;
            info.sigma = σ;
            info.primal_step = α_p;
            info.dual_step = α_d;
        }
    }

    // Starting point from a regularized least squares type solve with
    // unit slacks and duals, shifted into the interior
    fn initialize(&mut self) -> bool {
        let (n_lb, n_ub) = (self.data.n_lb, self.data.n_ub);

        self.variables.unit_complementarity();
        self.solution.info.primal_step = T::zero();
        self.solution.info.dual_step = T::zero();

        if !self.factorize() {
            return false;
        }

        let (data, rhs) = (&self.data, &mut self.step_rhs);
        rhs.x.scalarop_from(|c| -c, &data.c);
        rhs.y.copy_from(&data.b);
        rhs.z.copy_from(&data.h);
        rhs.z_lb[..n_lb].scalarop_from(|v| -v, &data.x_lb[..n_lb]);
        rhs.z_ub[..n_ub].copy_from(&data.x_ub[..n_ub]);
        for v in [&mut rhs.s, &mut rhs.s_lb, &mut rhs.s_ub] {
            v.set(T::zero());
        }
        self.kkt_solve();

        let (vars, step) = (&mut self.variables, &self.step_lhs);
        for (v, d) in [
            (&mut vars.x, &step.x),
            (&mut vars.y, &step.y),
            (&mut vars.z, &step.z),
            (&mut vars.z_lb, &step.z_lb),
            (&mut vars.z_ub, &step.z_ub),
            (&mut vars.s, &step.s),
            (&mut vars.s_lb, &step.s_lb),
            (&mut vars.s_ub, &step.s_ub),
        ] {
            v.copy_from(d);
        }

        if !vars.shift_to_interior(n_lb, n_ub) {
            vars.unit_complementarity();
        }

        self.centers.set_primal(&self.variables);
        self.centers.set_dual(&self.variables);
        self.residuals.update(&self.data, &self.variables);
        true
    }

    // Factorizes the KKT system, escalating on failure: refinement is
    // switched on first, then the regularization is increased
    fn factorize(&mut self) -> bool {
        loop {
            let reg = &mut self.regularization;
            let ok = self.kktsystem.factorize(
                &self.data,
                &self.variables,
                reg.rho,
                reg.delta,
                &self.settings,
            );
            if ok {
                reg.reset_failures();
                return true;
            }
            if !self.kktsystem.refinement_active() {
                self.kktsystem.set_refinement(true);
            } else if !reg.increase_after_failure(&self.settings) {
                return false;
            }
        }
    }

    fn kkt_solve(&mut self) {
        self.kktsystem.solve(
            &self.data,
            &self.variables,
            &self.step_rhs,
            &mut self.step_lhs,
            &self.settings,
        );
    }

    // Mehrotra predictor-corrector step.  Expects the proximal residuals
    // in step_rhs and returns (primal step, dual step, σ).
    fn predictor_corrector(&mut self, μ: T) -> (T, T, T) {
        let (n_lb, n_ub) = (self.data.n_lb, self.data.n_ub);
        let vars = &self.variables;

        // affine scaling direction
        let rhs = &mut self.step_rhs;
        _complementarity_rhs(&mut rhs.s, &vars.s, &vars.z, None, T::zero());
        _complementarity_rhs(&mut rhs.s_lb[..n_lb], &vars.s_lb, &vars.z_lb, None, T::zero());
        _complementarity_rhs(&mut rhs.s_ub[..n_ub], &vars.s_ub, &vars.z_ub, None, T::zero());
        self.kkt_solve();

        let vars = &self.variables;
        let step = &self.step_lhs;
        let (α_p, α_d) = vars.calc_step_length(step, n_lb, n_ub);
        let μ_aff = vars.calc_mu_shifted(step, α_p, α_d, n_lb, n_ub);
        let σ = T::powi(μ_aff / μ, 3);

        // centering and second order correction
        let σμ = σ * μ;
        let rhs = &mut self.step_rhs;
        _complementarity_rhs(&mut rhs.s, &vars.s, &vars.z, Some((&step.s[..], &step.z[..])), σμ);
        _complementarity_rhs(
            &mut rhs.s_lb[..n_lb],
            &vars.s_lb,
            &vars.z_lb,
            Some((&step.s_lb[..], &step.z_lb[..])),
            σμ,
        );
        _complementarity_rhs(
            &mut rhs.s_ub[..n_ub],
            &vars.s_ub,
            &vars.z_ub,
            Some((&step.s_ub[..], &step.z_ub[..])),
            σμ,
        );
        self.kkt_solve();

        let (α_p, α_d) = self
            .variables
            .calc_step_length(&self.step_lhs, n_lb, n_ub);
        let τ = self.settings.tau;
        (T::min(τ * α_p, T::one()), T::min(τ * α_d, T::one()), σ)
    }
}

// rs = σμ - s∘z - ds∘dz, the last term only if an affine step is given
fn _complementarity_rhs<T: FloatT>(rs: &mut [T], s: &[T], z: &[T], affine: Option<(&[T], &[T])>, σμ: T) {
    for (i, rsi) in rs.iter_mut().enumerate() {
        *rsi = σμ - s[i] * z[i];
        if let Some((ds, dz)) = affine {
            *rsi -= ds[i] * dz[i];
        }
    }
}

impl<T, M, K> IPSolver for Solver<T, M, K>
where
    T: FloatT,
    M: ProblemMatrix<T>,
    K: KKTEngine<T, M>,
{
    fn solve(&mut self) -> Status {
        // timers are swapped out to avoid borrow conflicts with other fields
        let mut timers = std::mem::take(&mut self.timers);
        timers.reset_timer("solve");

        self.solution.info.reset();
        if self.settings.verbose {
            let info = &self.solution.info;
            let _ = info.print_configuration(&mut self.print_target, &self.settings, &self.data);
            let _ = info.print_status_header(&mut self.print_target, &self.settings);
        }

        let status;
        timeit! {timers => "solve"; {
            status = self.run(&mut timers);
        }}
        self.timers = timers;

        if status != Status::InvalidSettings {
            self.solution
                .update(&self.data, &self.variables, &self.centers);
        }

        let info = &mut self.solution.info;
        info.status = status;
        info.update_timings(&self.timers, &self.settings);
        let _ = info.print_footer(&mut self.print_target, &self.settings);

        status
    }
}

impl<T, M, K> ConfigurablePrintTarget for Solver<T, M, K>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.print_target.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.print_target.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn std::io::Write + Send + Sync>) {
        self.print_target.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.print_target.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.print_target.get_print_buffer()
    }
}
