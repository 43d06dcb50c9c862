//! Smoke test: a short Euler/RK4 run with every intermediate value listed.

use std::fmt;

use sw_core::Real;

use crate::error::IntegrateResult;
use crate::rhs::RhsFunction;
use crate::solve::{solve_scalar_ode_euler, solve_scalar_ode_rk4};

/// One row of a smoke report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmokeRow {
    pub step: usize,
    pub t: Real,
    pub euler: Real,
    pub rk4: Real,
}

/// Side-by-side Euler and RK4 values for manual verification.
#[derive(Clone, Debug, PartialEq)]
pub struct SmokeReport {
    pub dt: Real,
    pub params: Vec<Real>,
    pub rows: Vec<SmokeRow>,
    pub euler_evaluations: usize,
    pub rk4_evaluations: usize,
}

/// Run both methods on a scalar ODE and collect their values step by step.
pub fn smoke_report<R>(
    rhs: &R,
    y0: Real,
    steps: usize,
    dt: Real,
    params: &[Real],
) -> IntegrateResult<SmokeReport>
where
    R: RhsFunction<Real> + ?Sized,
{
    let euler = solve_scalar_ode_euler(rhs, y0, steps, dt, params)?;
    let rk4 = solve_scalar_ode_rk4(rhs, y0, steps, dt, params)?;

    let rows = euler
        .iter()
        .zip(rk4.states())
        .enumerate()
        .map(|(step, ((t, e), r))| SmokeRow {
            step,
            t,
            euler: *e,
            rk4: *r,
        })
        .collect();

    Ok(SmokeReport {
        dt,
        params: params.to_vec(),
        rows,
        euler_evaluations: euler.rhs_evaluations(),
        rk4_evaluations: rk4.rhs_evaluations(),
    })
}

impl fmt::Display for SmokeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dt = {}, params = {:?}", self.dt, self.params)?;
        writeln!(
            f,
            "{:>6} {:>12} {:>20} {:>20}",
            "step", "t", "euler", "rk4"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>6} {:>12.6} {:>20.12e} {:>20.12e}",
                row.step, row.t, row.euler, row.rk4
            )?;
        }
        write!(
            f,
            "rhs evaluations: euler={}, rk4={}",
            self.euler_evaluations, self.rk4_evaluations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntegrateError;
    use crate::models;

    #[test]
    fn report_lists_every_step() {
        let report = smoke_report(&models::relaxation, 10.0, 3, 0.01, &[1.0, 2.0]).unwrap();
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.rows[0].euler, 10.0);
        assert_eq!(report.rows[0].rk4, 10.0);
        assert_eq!(report.euler_evaluations, 3);
        assert_eq!(report.rk4_evaluations, 12);

        let text = report.to_string();
        assert!(text.contains("step"));
        assert!(text.contains("euler=3, rk4=12"));
        assert_eq!(text.lines().count(), 2 + 4 + 1);
    }

    #[test]
    fn report_propagates_validation_errors() {
        let err = smoke_report(&models::relaxation, 10.0, 0, 0.01, &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, IntegrateError::InvalidStepCount { steps: 0 });
    }
}
