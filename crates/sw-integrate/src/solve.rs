//! Integrator loop and scalar entry points.

use sw_core::{OdeState, Real, grid_time};

use crate::error::{Aborted, IntegrateError, IntegrateResult, NonFiniteStage};
use crate::rhs::{RhsEvaluator, RhsFunction};
use crate::stepper::{Euler, Rk4, Stepper};
use crate::trajectory::Trajectory;

/// Upper bound on the up-front output allocation; longer runs grow on demand.
pub(crate) const MAX_PREALLOC_POINTS: usize = 1 << 20;

/// Options for fixed-step runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOptions {
    /// Number of steps to take.
    pub steps: usize,
    /// Fixed step size.
    pub dt: Real,
    /// Time of the initial condition.
    pub t0: Real,
}

impl StepOptions {
    pub fn new(steps: usize, dt: Real) -> Self {
        Self { steps, dt, t0: 0.0 }
    }

    pub fn starting_at(mut self, t0: Real) -> Self {
        self.t0 = t0;
        self
    }

    /// Check step count, step size and start time.
    pub fn validate(&self) -> IntegrateResult<()> {
        if self.steps == 0 {
            return Err(IntegrateError::InvalidStepCount { steps: 0 });
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(IntegrateError::InvalidStepSize { dt: self.dt });
        }
        sw_core::ensure_finite(self.t0, "start time must be finite")?;
        Ok(())
    }

    /// Time of sample `index`.
    pub fn time_at(&self, index: usize) -> Real {
        grid_time(self.t0, self.dt, index)
    }

    /// Time of the last sample.
    pub fn t_end(&self) -> Real {
        self.time_at(self.steps)
    }
}

/// Run `stepper` for `opts.steps` fixed steps starting from `y0`.
///
/// Returns `steps + 1` points, the initial condition included. On failure the
/// points computed before the offending step are returned with the error.
pub fn integrate<M, S, R>(
    stepper: &M,
    rhs: &R,
    y0: S,
    params: &[Real],
    opts: &StepOptions,
) -> Result<Trajectory<S>, Aborted<S>>
where
    M: Stepper,
    S: OdeState,
    R: RhsFunction<S> + ?Sized,
{
    if let Err(error) = opts.validate() {
        return Err(Aborted::before_start(error, opts.dt));
    }
    run_steps(stepper, rhs, y0, params, opts.t0, opts.dt, opts.steps, |step| {
        (opts.dt, opts.time_at(step + 1))
    })
}

/// Integrate over caller-supplied sample times with one step per interval.
///
/// `times[0]` is the time of `y0`; the step from `times[i]` to `times[i + 1]`
/// uses that interval as its step size, so spacing may vary. Needs at least
/// two times, all finite and strictly increasing. The trajectory's
/// [`Trajectory::dt`] is the first interval.
pub fn integrate_on_times<M, S, R>(
    stepper: &M,
    rhs: &R,
    y0: S,
    params: &[Real],
    times: &[Real],
) -> Result<Trajectory<S>, Aborted<S>>
where
    M: Stepper,
    S: OdeState,
    R: RhsFunction<S> + ?Sized,
{
    let (t0, first_dt) = match times {
        [t0, t1, ..] => (*t0, t1 - t0),
        _ => {
            let steps = times.len() as i64 - 1;
            return Err(Aborted::before_start(
                IntegrateError::InvalidStepCount { steps },
                0.0,
            ));
        }
    };
    if !t0.is_finite() {
        return Err(Aborted::before_start(
            IntegrateError::InvalidArgument {
                what: "start time must be finite",
            },
            first_dt,
        ));
    }
    if let Some(dt) = times
        .windows(2)
        .map(|w| w[1] - w[0])
        .find(|dt| !dt.is_finite() || *dt <= 0.0)
    {
        return Err(Aborted::before_start(
            IntegrateError::InvalidStepSize { dt },
            first_dt,
        ));
    }

    run_steps(stepper, rhs, y0, params, t0, first_dt, times.len() - 1, |step| {
        (times[step + 1] - times[step], times[step + 1])
    })
}

/// Shared stepping loop. `interval(step)` gives the step size and the time
/// reached by step `step`.
#[allow(clippy::too_many_arguments)]
fn run_steps<M, S, R>(
    stepper: &M,
    rhs: &R,
    y0: S,
    params: &[Real],
    t0: Real,
    dt: Real,
    steps: usize,
    interval: impl Fn(usize) -> (Real, Real),
) -> Result<Trajectory<S>, Aborted<S>>
where
    M: Stepper,
    S: OdeState,
    R: RhsFunction<S> + ?Sized,
{
    if !y0.is_finite() {
        return Err(Aborted::before_start(
            IntegrateError::InvalidArgument {
                what: "initial state must be finite",
            },
            dt,
        ));
    }

    let dim = y0.dim();
    let capacity = steps.saturating_add(1).min(MAX_PREALLOC_POINTS);
    let mut trajectory = Trajectory::with_capacity(capacity, dt);
    let mut evaluator = RhsEvaluator::new(rhs);

    let mut t = t0;
    let mut x = y0;
    for step in 0..steps {
        let (h, t_next) = interval(step);
        let next = stepper
            .advance(&x, t, h, &mut evaluator, params)
            .and_then(|next| {
                if next.dim() != dim {
                    Err(IntegrateError::ShapeMismatch {
                        expected: dim,
                        found: next.dim(),
                    })
                } else if !next.is_finite() {
                    Err(IntegrateError::NonFiniteResult {
                        stage: NonFiniteStage::Update,
                        t: t_next,
                    })
                } else {
                    Ok(next)
                }
            });

        match next {
            Ok(next) => {
                trajectory.push(t, x);
                x = next;
                t = t_next;
            }
            Err(error) => {
                trajectory.push(t, x);
                trajectory.set_rhs_evaluations(evaluator.evaluations());
                return Err(Aborted { trajectory, error });
            }
        }
    }

    trajectory.push(t, x);
    trajectory.set_rhs_evaluations(evaluator.evaluations());
    Ok(trajectory)
}

/// Integrate a scalar ODE with explicit Euler from `t = 0`.
pub fn solve_scalar_ode_euler<R>(
    rhs: &R,
    y0: Real,
    steps: usize,
    dt: Real,
    params: &[Real],
) -> Result<Trajectory<Real>, Aborted<Real>>
where
    R: RhsFunction<Real> + ?Sized,
{
    integrate(&Euler, rhs, y0, params, &StepOptions::new(steps, dt))
}

/// Integrate a scalar ODE with classical RK4 from `t = 0`.
pub fn solve_scalar_ode_rk4<R>(
    rhs: &R,
    y0: Real,
    steps: usize,
    dt: Real,
    params: &[Real],
) -> Result<Trajectory<Real>, Aborted<Real>>
where
    R: RhsFunction<Real> + ?Sized,
{
    integrate(&Rk4, rhs, y0, params, &StepOptions::new(steps, dt))
}
