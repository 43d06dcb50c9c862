//! Method comparison and convergence sweeps against a trusted reference.

use rayon::prelude::*;
use serde::Serialize;
use sw_core::{Real, max_abs_diff, observed_order};
use sw_integrate::{StepOptions, models, reference};
use tracing::{debug, info};

use crate::config::{Method, Model, RunConfig};
use crate::error::{AppError, AppResult};
use crate::run_service::{fixed_state, run_model};

/// Interior RK4 steps per output sample for the refined reference.
pub const REFINED_SUBSTEPS: usize = 64;

/// Largest number of sweep levels (each one doubles the step count).
pub const MAX_SWEEP_LEVELS: usize = 12;

/// Where the reference solution came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ReferenceKind {
    ClosedForm,
    Refined { substeps: usize },
}

/// Reference states sampled on the grid of `opts`.
pub fn reference_states(
    model: Model,
    y0: &[Real],
    params: &[Real],
    opts: &StepOptions,
) -> AppResult<(ReferenceKind, Vec<Vec<Real>>)> {
    model.check_inputs(y0, params)?;
    let times: Vec<Real> = (0..=opts.steps).map(|i| opts.time_at(i)).collect();
    let t0 = opts.t0;
    let states = match model {
        Model::ExponentialDecay => {
            let [y] = fixed_state::<1>(model, y0)?;
            reference::sample_exact(&times, t0, |t| {
                vec![reference::exponential_decay_exact(y, t, params)]
            })
        }
        Model::Relaxation => {
            let [y] = fixed_state::<1>(model, y0)?;
            reference::sample_exact(&times, t0, |t| {
                vec![reference::relaxation_exact(y, t, params)]
            })
        }
        Model::Logistic => {
            let [y] = fixed_state::<1>(model, y0)?;
            reference::sample_exact(&times, t0, |t| vec![reference::logistic_exact(y, t, params)])
        }
        Model::HarmonicOscillator => {
            let y = fixed_state::<2>(model, y0)?;
            reference::sample_exact(&times, t0, |t| {
                reference::harmonic_oscillator_exact(&y, t, params).to_vec()
            })
        }
        Model::Lorenz => {
            let y = fixed_state::<3>(model, y0)?;
            let refined =
                reference::refined_reference(&models::lorenz, y, params, opts, REFINED_SUBSTEPS)?;
            let states = refined.into_dynamic().into_parts().1;
            return Ok((
                ReferenceKind::Refined {
                    substeps: REFINED_SUBSTEPS,
                },
                states,
            ));
        }
    };
    Ok((ReferenceKind::ClosedForm, states))
}

fn sample_errors(states: &[Vec<Real>], reference: &[Vec<Real>]) -> AppResult<Vec<Real>> {
    if states.len() != reference.len() {
        return Err(AppError::InvalidInput(format!(
            "reference has {} samples, run has {}",
            reference.len(),
            states.len()
        )));
    }
    states
        .iter()
        .zip(reference)
        .map(|(s, r)| max_abs_diff(s, r).map_err(AppError::from))
        .collect()
}

fn max_error(errors: &[Real]) -> Real {
    errors.iter().copied().fold(0.0, Real::max)
}

/// Euler, RK4 and reference at one sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonSample {
    pub step: usize,
    pub t: Real,
    pub reference: Vec<Real>,
    pub euler: Vec<Real>,
    pub rk4: Vec<Real>,
    pub euler_error: Real,
    pub rk4_error: Real,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub model: Model,
    pub steps: usize,
    pub dt: Real,
    pub reference: ReferenceKind,
    pub euler_max_error: Real,
    pub rk4_max_error: Real,
    pub euler_evaluations: usize,
    pub rk4_evaluations: usize,
    /// RK4 error strictly below Euler's at every sample after the initial one.
    pub rk4_better_everywhere: bool,
    pub samples: Vec<ComparisonSample>,
}

/// Run both methods on the config's model and compare them with the reference.
///
/// The config's `method` is ignored.
pub fn compare_methods(config: &RunConfig) -> AppResult<ComparisonReport> {
    let opts = config.step_options()?;
    let (model, y0, params) = (config.model, &config.initial_state, &config.params);

    let euler = run_model(model, Method::Euler, y0, params, &opts)?.into_completed()?;
    let rk4 = run_model(model, Method::Rk4, y0, params, &opts)?.into_completed()?;
    let (kind, reference) = reference_states(model, y0, params, &opts)?;

    let euler_errors = sample_errors(euler.states(), &reference)?;
    let rk4_errors = sample_errors(rk4.states(), &reference)?;

    let samples: Vec<ComparisonSample> = euler
        .iter()
        .zip(rk4.states())
        .zip(&reference)
        .zip(euler_errors.iter().zip(&rk4_errors))
        .enumerate()
        .map(|(step, ((((t, e), r4), rf), (ee, re)))| ComparisonSample {
            step,
            t,
            reference: rf.clone(),
            euler: e.clone(),
            rk4: r4.clone(),
            euler_error: *ee,
            rk4_error: *re,
        })
        .collect();

    let report = ComparisonReport {
        model,
        steps: opts.steps,
        dt: opts.dt,
        reference: kind,
        euler_max_error: max_error(&euler_errors),
        rk4_max_error: max_error(&rk4_errors),
        euler_evaluations: euler.rhs_evaluations(),
        rk4_evaluations: rk4.rhs_evaluations(),
        rk4_better_everywhere: samples.iter().skip(1).all(|s| s.rk4_error < s.euler_error),
        samples,
    };

    info!(
        model = %model,
        steps = report.steps,
        dt = report.dt,
        euler_max_error = report.euler_max_error,
        rk4_max_error = report.rk4_max_error,
        rk4_better_everywhere = report.rk4_better_everywhere,
        "comparison complete"
    );
    Ok(report)
}

/// One refinement level of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepLevel {
    pub level: usize,
    pub steps: usize,
    pub dt: Real,
    pub max_error: Real,
    pub rhs_evaluations: usize,
    /// Order observed between the previous level and this one.
    pub observed_order: Option<Real>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepReport {
    pub model: Model,
    pub method: Method,
    pub expected_order: u32,
    pub reference: ReferenceKind,
    pub levels: Vec<SweepLevel>,
}

impl SweepReport {
    /// Observed order between the two finest levels.
    pub fn final_order(&self) -> Option<Real> {
        self.levels.last().and_then(|l| l.observed_order)
    }
}

/// Convergence sweep over `levels` grids, each with twice the steps and half
/// the step size of the previous one, covering the same time span.
///
/// Levels run in parallel; each run is independent.
pub fn convergence_sweep(config: &RunConfig, levels: usize) -> AppResult<SweepReport> {
    if levels == 0 || levels > MAX_SWEEP_LEVELS {
        return Err(AppError::InvalidInput(format!(
            "sweep levels must be between 1 and {MAX_SWEEP_LEVELS}, got {levels}"
        )));
    }
    let base = config.step_options()?;
    let (model, method) = (config.model, config.method);

    let grids: Vec<StepOptions> = (0..levels)
        .map(|level| -> AppResult<StepOptions> {
            let factor = 1usize << level;
            let steps = base.steps.checked_mul(factor).ok_or_else(|| {
                AppError::InvalidInput(format!("step count overflows at sweep level {level}"))
            })?;
            Ok(StepOptions::new(steps, base.dt / factor as Real).starting_at(base.t0))
        })
        .collect::<AppResult<_>>()?;

    let results: Vec<(ReferenceKind, Real, usize)> = grids
        .par_iter()
        .map(|opts| -> AppResult<(ReferenceKind, Real, usize)> {
            let run = run_model(model, method, &config.initial_state, &config.params, opts)?
                .into_completed()?;
            let (kind, reference) =
                reference_states(model, &config.initial_state, &config.params, opts)?;
            let max_error = max_error(&sample_errors(run.states(), &reference)?);
            debug!(steps = opts.steps, dt = opts.dt, max_error, "sweep level done");
            Ok((kind, max_error, run.rhs_evaluations()))
        })
        .collect::<AppResult<_>>()?;

    let mut sweep = Vec::with_capacity(levels);
    let mut previous: Option<Real> = None;
    for (level, (opts, (_, max_error, evaluations))) in grids.iter().zip(&results).enumerate() {
        sweep.push(SweepLevel {
            level,
            steps: opts.steps,
            dt: opts.dt,
            max_error: *max_error,
            rhs_evaluations: *evaluations,
            observed_order: previous.and_then(|coarse| observed_order(coarse, *max_error, 2.0)),
        });
        previous = Some(*max_error);
    }

    let reference = results
        .first()
        .map_or(ReferenceKind::ClosedForm, |(kind, _, _)| *kind);
    let report = SweepReport {
        model,
        method,
        expected_order: method.order(),
        reference,
        levels: sweep,
    };
    info!(
        model = %model,
        method = %method,
        levels,
        observed_order = ?report.final_order(),
        "sweep complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decay(method: Method, steps: i64, dt: Real) -> RunConfig {
        RunConfig {
            name: String::new(),
            model: Model::ExponentialDecay,
            method,
            initial_state: vec![1.0],
            params: vec![1.0],
            steps,
            dt,
            t0: 0.0,
        }
    }

    #[test]
    fn reference_matches_grid() {
        let opts = StepOptions::new(10, 0.1).starting_at(2.0);
        let (kind, states) =
            reference_states(Model::ExponentialDecay, &[1.0], &[1.0], &opts).unwrap();
        assert_eq!(kind, ReferenceKind::ClosedForm);
        assert_eq!(states.len(), 11);
        // Closed forms are measured from t0.
        assert_eq!(states[0], vec![1.0]);
        assert!((states[10][0] - (-1.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn lorenz_uses_refined_reference() {
        let opts = StepOptions::new(20, 0.01);
        let (kind, states) =
            reference_states(Model::Lorenz, &[1.0, 1.0, 1.0], &[10.0, 28.0, 8.0 / 3.0], &opts)
                .unwrap();
        assert_eq!(
            kind,
            ReferenceKind::Refined {
                substeps: REFINED_SUBSTEPS
            }
        );
        assert_eq!(states.len(), 21);
        assert_eq!(states[0], vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn comparison_counts_and_errors() {
        let report = compare_methods(&decay(Method::Rk4, 50, 0.02)).unwrap();
        assert_eq!(report.samples.len(), 51);
        assert_eq!(report.euler_evaluations, 50);
        assert_eq!(report.rk4_evaluations, 200);
        assert_eq!(report.samples[0].euler_error, 0.0);
        assert!(report.rk4_max_error < report.euler_max_error);
        assert!(report.rk4_better_everywhere);
    }

    #[test]
    fn sweep_observes_expected_orders() {
        let euler = convergence_sweep(&decay(Method::Euler, 20, 0.05), 4).unwrap();
        assert_eq!(euler.levels.len(), 4);
        assert_eq!(euler.levels[3].steps, 160);
        assert!(euler.levels[0].observed_order.is_none());
        let order = euler.final_order().unwrap();
        assert!((order - 1.0).abs() < 0.1, "euler order {order}");

        let rk4 = convergence_sweep(&decay(Method::Rk4, 10, 0.1), 4).unwrap();
        let order = rk4.final_order().unwrap();
        assert!((order - 4.0).abs() < 0.3, "rk4 order {order}");
        assert_eq!(rk4.expected_order, 4);
    }

    #[test]
    fn sweep_rejects_bad_levels() {
        let config = decay(Method::Rk4, 10, 0.1);
        assert!(matches!(
            convergence_sweep(&config, 0),
            Err(AppError::InvalidInput(_))
        ));
        assert!(convergence_sweep(&config, MAX_SWEEP_LEVELS + 1).is_err());
    }
}
