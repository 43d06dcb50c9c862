//! Run execution service.
//!
//! Model and method are picked at runtime by name; each run is dispatched once
//! to a statically typed integration and the result is widened to
//! `Trajectory<Vec<Real>>` for reporting and export.

use std::time::Instant;

use sw_core::{OdeState, Real};
use sw_integrate::{
    Aborted, Euler, IntegrateError, RhsFunction, Rk4, SmokeReport, StepOptions, Trajectory,
    integrate, models, smoke_report,
};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, Method, Model, RunConfig};
use crate::error::{AppError, AppResult};
use crate::fingerprint::trajectory_fingerprint;

/// Trajectory of one run, complete or cut short.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRun {
    pub trajectory: Trajectory<Vec<Real>>,
    /// Set when the run aborted; `trajectory` then holds the partial result.
    pub error: Option<IntegrateError>,
}

impl ModelRun {
    fn from_result<S: OdeState>(result: Result<Trajectory<S>, Aborted<S>>) -> Self {
        match result {
            Ok(trajectory) => Self {
                trajectory: trajectory.into_dynamic(),
                error: None,
            },
            Err(Aborted { trajectory, error }) => Self {
                trajectory: trajectory.into_dynamic(),
                error: Some(error),
            },
        }
    }

    /// The trajectory of a completed run, or the abort as an error.
    pub fn into_completed(self) -> AppResult<Trajectory<Vec<Real>>> {
        match self.error {
            None => Ok(self.trajectory),
            Some(source) => Err(AppError::Aborted {
                points: self.trajectory.len(),
                source,
            }),
        }
    }
}

fn run_typed<S, R>(
    method: Method,
    rhs: &R,
    y0: S,
    params: &[Real],
    opts: &StepOptions,
) -> ModelRun
where
    S: OdeState,
    R: RhsFunction<S> + ?Sized,
{
    ModelRun::from_result(match method {
        Method::Euler => integrate(&Euler, rhs, y0, params, opts),
        Method::Rk4 => integrate(&Rk4, rhs, y0, params, opts),
    })
}

pub(crate) fn fixed_state<const N: usize>(model: Model, y0: &[Real]) -> AppResult<[Real; N]> {
    <[Real; N]>::try_from(y0).map_err(|_| {
        AppError::Config(ConfigError::StateDim {
            model,
            expected: N,
            found: y0.len(),
        })
    })
}

/// Integrate a built-in model.
///
/// Errors only when the inputs do not fit the model; integration failures are
/// reported through [`ModelRun::error`] alongside the partial trajectory.
pub fn run_model(
    model: Model,
    method: Method,
    y0: &[Real],
    params: &[Real],
    opts: &StepOptions,
) -> AppResult<ModelRun> {
    model.check_inputs(y0, params)?;
    let run = match model {
        Model::ExponentialDecay => {
            let [y] = fixed_state::<1>(model, y0)?;
            run_typed(method, &models::exponential_decay, y, params, opts)
        }
        Model::Relaxation => {
            let [y] = fixed_state::<1>(model, y0)?;
            run_typed(method, &models::relaxation, y, params, opts)
        }
        Model::Logistic => {
            let [y] = fixed_state::<1>(model, y0)?;
            run_typed(method, &models::logistic, y, params, opts)
        }
        Model::HarmonicOscillator => {
            let y = fixed_state::<2>(model, y0)?;
            run_typed(method, &models::harmonic_oscillator, y, params, opts)
        }
        Model::Lorenz => {
            let y = fixed_state::<3>(model, y0)?;
            run_typed(method, &models::lorenz, y, params, opts)
        }
    };
    Ok(run)
}

/// Result of a configured run.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub name: String,
    pub model: Model,
    pub method: Method,
    pub trajectory: Trajectory<Vec<Real>>,
    /// Set when the run aborted early.
    pub failure: Option<IntegrateError>,
    /// SHA-256 of the trajectory's raw bytes.
    pub fingerprint: String,
    pub elapsed_s: f64,
}

impl RunResponse {
    pub fn ensure_completed(&self) -> AppResult<()> {
        match &self.failure {
            None => Ok(()),
            Some(source) => Err(AppError::Aborted {
                points: self.trajectory.len(),
                source: source.clone(),
            }),
        }
    }
}

/// Validate and execute a run config.
pub fn run_config(config: &RunConfig) -> AppResult<RunResponse> {
    let started = Instant::now();
    let opts = config.step_options()?;
    info!(
        name = config.display_name(),
        model = %config.model,
        method = %config.method,
        steps = opts.steps,
        dt = opts.dt,
        "starting run"
    );

    let ModelRun { trajectory, error } = run_model(
        config.model,
        config.method,
        &config.initial_state,
        &config.params,
        &opts,
    )?;
    let elapsed_s = started.elapsed().as_secs_f64();
    let fingerprint = trajectory_fingerprint(&trajectory);

    match &error {
        None => info!(
            points = trajectory.len(),
            evaluations = trajectory.rhs_evaluations(),
            elapsed_s,
            fingerprint = %fingerprint,
            "run complete"
        ),
        Some(e) => warn!(
            points = trajectory.len(),
            evaluations = trajectory.rhs_evaluations(),
            error = %e,
            "run aborted"
        ),
    }
    if let Some((t, state)) = trajectory.last() {
        debug!(t, ?state, "final state");
    }

    Ok(RunResponse {
        name: config.display_name().to_string(),
        model: config.model,
        method: config.method,
        trajectory,
        failure: error,
        fingerprint,
        elapsed_s,
    })
}

/// Side-by-side Euler and RK4 listing for a scalar model.
pub fn smoke_model(
    model: Model,
    y0: Real,
    steps: usize,
    dt: Real,
    params: &[Real],
) -> AppResult<SmokeReport> {
    let rhs: fn(&Real, Real, &[Real]) -> Real = match model {
        Model::ExponentialDecay => models::exponential_decay,
        Model::Relaxation => models::relaxation,
        Model::Logistic => models::logistic,
        Model::HarmonicOscillator | Model::Lorenz => {
            return Err(AppError::InvalidInput(format!(
                "smoke test needs a scalar model, {model} is {}-dimensional",
                model.dim()
            )));
        }
    };
    model.check_inputs(&[y0], params)?;
    let report = smoke_report(&rhs, y0, steps, dt, params)?;
    debug!(
        model = %model,
        euler_evaluations = report.euler_evaluations,
        rk4_evaluations = report.rk4_evaluations,
        "smoke report ready"
    );
    Ok(report)
}
