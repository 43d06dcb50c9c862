//! Trusted reference solutions for accuracy comparisons.
//!
//! Closed forms cover the scalar models and the oscillator. Anything else
//! (e.g. Lorenz) goes through [`refined_reference`], an RK4 run with many
//! interior steps per output sample.
//!
//! The closed forms index `params` like the models they solve and panic on
//! short parameter slices.

use sw_core::{OdeState, Real};

use crate::error::Aborted;
use crate::rhs::RhsFunction;
use crate::solve::{MAX_PREALLOC_POINTS, StepOptions, integrate};
use crate::stepper::Rk4;
use crate::trajectory::Trajectory;

/// Exact solution of [`crate::models::exponential_decay`] after elapsed time `t`.
pub fn exponential_decay_exact(y0: Real, t: Real, p: &[Real]) -> Real {
    y0 * (-p[0] * t).exp()
}

/// Exact solution of [`crate::models::relaxation`] after elapsed time `t`.
pub fn relaxation_exact(y0: Real, t: Real, p: &[Real]) -> Real {
    p[1] + (y0 - p[1]) * (-p[0] * t).exp()
}

/// Exact solution of [`crate::models::logistic`] after elapsed time `t`.
pub fn logistic_exact(y0: Real, t: Real, p: &[Real]) -> Real {
    let growth = (p[0] * t).exp();
    p[1] * y0 * growth / (p[1] + y0 * (growth - 1.0))
}

/// Exact solution of [`crate::models::harmonic_oscillator`] after elapsed time `t`.
pub fn harmonic_oscillator_exact(y0: &[Real; 2], t: Real, p: &[Real]) -> [Real; 2] {
    let omega = p[0];
    let (sin, cos) = (omega * t).sin_cos();
    if omega == 0.0 {
        return [y0[0] + y0[1] * t, y0[1]];
    }
    [
        y0[0] * cos + y0[1] / omega * sin,
        -y0[0] * omega * sin + y0[1] * cos,
    ]
}

/// Evaluate a closed form at each time in `times`, measured from `t0`.
pub fn sample_exact<S, F>(times: &[Real], t0: Real, exact: F) -> Vec<S>
where
    F: Fn(Real) -> S,
{
    times.iter().map(|t| exact(t - t0)).collect()
}

/// RK4 reference sampled on the same grid as a coarse run.
///
/// Integrates each coarse interval with `substeps` interior steps of
/// `opts.dt / substeps` and records only the state at its end, so memory
/// stays proportional to `opts.steps`. Times are the coarse grid's, so they
/// compare equal to a coarse run's times.
pub fn refined_reference<S, R>(
    rhs: &R,
    y0: S,
    params: &[Real],
    opts: &StepOptions,
    substeps: usize,
) -> Result<Trajectory<S>, Aborted<S>>
where
    S: OdeState,
    R: RhsFunction<S> + ?Sized,
{
    if let Err(error) = opts.validate() {
        return Err(Aborted::before_start(error, opts.dt));
    }
    let substeps = substeps.max(1);
    let fine_dt = opts.dt / substeps as Real;

    let capacity = opts.steps.saturating_add(1).min(MAX_PREALLOC_POINTS);
    let mut coarse = Trajectory::with_capacity(capacity, opts.dt);
    let mut evaluations = 0;
    let mut x = y0;
    for i in 0..opts.steps {
        let t = opts.time_at(i);
        let interval = StepOptions::new(substeps, fine_dt).starting_at(t);
        let start = x;
        match integrate(&Rk4, rhs, start.clone(), params, &interval) {
            Ok(fine) => {
                evaluations += fine.rhs_evaluations();
                x = fine.into_parts().1.pop().unwrap_or_else(|| start.clone());
                coarse.push(t, start);
            }
            Err(Aborted { trajectory, error }) => {
                evaluations += trajectory.rhs_evaluations();
                if !trajectory.is_empty() {
                    coarse.push(t, start);
                }
                coarse.set_rhs_evaluations(evaluations);
                return Err(Aborted {
                    trajectory: coarse,
                    error,
                });
            }
        }
    }
    coarse.push(opts.t_end(), x);
    coarse.set_rhs_evaluations(evaluations);
    Ok(coarse)
}
