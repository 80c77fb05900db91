use super::*;
use crate::algebra::*;
use std::io::Write;
use std::time::Duration;

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

const LINE: &str =
    "----------------------------------------------------------------------------------------------------------------";

impl<T> Info<T>
where
    T: FloatT,
{
    pub(crate) fn print_configuration<M: ProblemMatrix<T>>(
        &self,
        out: &mut impl Write,
        settings: &Settings<T>,
        data: &ProblemData<T, M>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        writeln!(out, "{LINE}")?;
        writeln!(
            out,
            "          piqp v{}  -  proximal interior point QP solver",
            crate::VERSION
        )?;
        writeln!(out, "{LINE}")?;

        writeln!(out, "problem:")?;
        writeln!(out, "  variables n = {}, nnz(P upper triangular) = {}", data.n, data.P.nnz())?;
        writeln!(out, "  equality constraints p = {}, nnz(A) = {}", data.p, data.A.nnz())?;
        writeln!(out, "  inequality constraints m = {}, nnz(G) = {}", data.m, data.G.nnz())?;
        writeln!(
            out,
            "  variable lower bounds n_lb = {}, upper bounds n_ub = {}",
            data.n_lb, data.n_ub
        )?;
        writeln!(out)?;

        let set = settings;
        writeln!(out, "settings:")?;
        writeln!(
            out,
            "  precision: {} bit, max iter = {}, tau = {:.3}",
            _get_precision_string::<T>(),
            set.max_iter,
            set.tau
        )?;
        writeln!(
            out,
            "  eps_abs = {:.1e}, eps_rel = {:.1e}, duality gap: {}, eps_abs = {:.1e}, eps_rel = {:.1e}",
            set.eps_abs,
            set.eps_rel,
            _bool_on_off(set.check_duality_gap),
            set.eps_duality_gap_abs,
            set.eps_duality_gap_rel
        )?;
        writeln!(
            out,
            "  rho_init = {:.1e}, delta_init = {:.1e}, reg limit = {:.1e}, finetune limit = {:.1e}",
            set.rho_init, set.delta_init, set.reg_lower_limit, set.reg_finetune_lower_limit
        )?;
        writeln!(
            out,
            "  preconditioner: iter = {}, scale cost = {}",
            set.preconditioner_iter,
            _bool_on_off(set.preconditioner_scale_cost)
        )?;
        writeln!(
            out,
            "  iter refine: always = {}, max iter = {}, abstol = {:.1e}, reltol = {:.1e}",
            _bool_on_off(set.iterative_refinement_always_enabled),
            set.iterative_refinement_max_iter,
            set.iterative_refinement_eps_abs,
            set.iterative_refinement_eps_rel
        )?;
        writeln!(out)?;

        Ok(())
    }

    pub(crate) fn print_status_header(
        &self,
        out: &mut impl Write,
        settings: &Settings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        write!(out, "iter  ")?;
        write!(out, "prim_obj       ")?;
        write!(out, "dual_obj       ")?;
        write!(out, "duality_gap  ")?;
        write!(out, "prim_inf     ")?;
        write!(out, "dual_inf     ")?;
        write!(out, "rho          ")?;
        write!(out, "delta        ")?;
        write!(out, "mu           ")?;
        write!(out, "p_step    ")?;
        write!(out, "d_step")?;
        writeln!(out)?;
        writeln!(out, "{LINE}")?;
        out.flush()
    }

    pub(crate) fn print_status(
        &self,
        out: &mut impl Write,
        settings: &Settings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        write!(out, "{:>3}   ", self.iter)?;
        write!(out, "{}  ", expformat!("{:+.6e}", self.primal_obj))?;
        write!(out, "{}  ", expformat!("{:+.6e}", self.dual_obj))?;
        write!(out, "{}  ", expformat!("{:.4e}", self.duality_gap))?;
        write!(out, "{}  ", expformat!("{:.4e}", self.primal_inf))?;
        write!(out, "{}  ", expformat!("{:.4e}", self.dual_inf))?;
        write!(out, "{}  ", expformat!("{:.4e}", self.rho))?;
        write!(out, "{}  ", expformat!("{:.4e}", self.delta))?;
        write!(out, "{}  ", expformat!("{:.4e}", self.mu))?;
        write!(out, "{:.4}    ", self.primal_step)?;
        write!(out, "{:.4}", self.dual_step)?;
        writeln!(out)?;

        Ok(())
    }

    pub(crate) fn print_footer(
        &self,
        out: &mut impl Write,
        settings: &Settings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "status:               {}", self.status)?;
        writeln!(out, "number of iterations: {}", self.iter)?;
        writeln!(out, "objective:            {}", expformat!("{:.5e}", self.primal_obj))?;

        if settings.compute_timings {
            let fmt = |t: f64| format!("{:?}", Duration::from_secs_f64(t));
            writeln!(out, "total run time:       {}", fmt(self.run_time))?;
            writeln!(out, "  setup time:         {}", fmt(self.setup_time))?;
            writeln!(out, "  update time:        {}", fmt(self.update_time))?;
            writeln!(out, "  solve time:         {}", fmt(self.solve_time))?;
        }
        writeln!(out)?;
        out.flush()
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.
fn _exp_str_reformat(mut thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');
    let exp_digits = thestr.len() - eidx - if has_sign { 2 } else { 1 };

    let chars = match (has_sign, exp_digits < 2) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e3)), "1.50e+03");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e-3)), "1.50e-03");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e-300)), "1.50e-300");
    assert_eq!(_exp_str_reformat("inf".to_string()), "inf");
}

#[test]
fn test_print_status() {
    let info = Info::<f64> {
        iter: 3,
        primal_obj: -2.5,
        ..Info::default()
    };
    let settings = Settings {
        verbose: true,
        ..Settings::default()
    };
    let mut out = Vec::new();
    info.print_status(&mut out, &settings).unwrap();
    let line = String::from_utf8(out).unwrap();
    assert!(line.starts_with("  3   -2.500000e+00"));

    // nothing when quiet
    let mut out = Vec::new();
    info.print_status(&mut out, &Settings::default()).unwrap();
    assert!(out.is_empty());
}
