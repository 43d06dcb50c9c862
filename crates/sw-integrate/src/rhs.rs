//! Right-hand side evaluation.
//!
//! Every right-hand side uses the argument order `(state, time, params)`.
//! Callers whose functions take `(time, state, params)` must adapt them.

use std::marker::PhantomData;

use sw_core::{OdeState, Real};
use thiserror::Error;

use crate::error::{IntegrateError, IntegrateResult, NonFiniteStage};

/// Failure reported by a fallible right-hand side (e.g. a host callback).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RhsFailure {
    pub message: String,
    /// `(expected, found)` when the derivative had the wrong length.
    pub shape: Option<(usize, usize)>,
}

impl RhsFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            shape: None,
        }
    }

    /// The right-hand side produced `found` components for a state of `expected`.
    pub fn wrong_shape(expected: usize, found: usize) -> Self {
        Self {
            message: format!("derivative has {found} components, state has {expected}"),
            shape: Some((expected, found)),
        }
    }
}

/// A right-hand side `f(state, time, params) -> derivative`.
///
/// Implementations must be deterministic and free of side effects; the
/// integrators may call them any number of times per step. Any closure or
/// function `Fn(&S, Real, &[Real]) -> S` qualifies; wrap fallible closures in
/// [`Fallible`].
pub trait RhsFunction<S> {
    fn eval(&self, state: &S, t: Real, params: &[Real]) -> Result<S, RhsFailure>;
}

impl<S, F> RhsFunction<S> for F
where
    F: Fn(&S, Real, &[Real]) -> S,
{
    #[inline]
    fn eval(&self, state: &S, t: Real, params: &[Real]) -> Result<S, RhsFailure> {
        Ok(self(state, t, params))
    }
}

/// Adapter for right-hand sides that can fail.
#[derive(Clone, Copy, Debug)]
pub struct Fallible<F>(pub F);

impl<S, F> RhsFunction<S> for Fallible<F>
where
    F: Fn(&S, Real, &[Real]) -> Result<S, RhsFailure>,
{
    #[inline]
    fn eval(&self, state: &S, t: Real, params: &[Real]) -> Result<S, RhsFailure> {
        (self.0)(state, t, params)
    }
}

/// Uniform call interface over a borrowed right-hand side.
///
/// The shape check runs on the first evaluation only; right-hand sides that
/// know their write count (host callbacks) report later mismatches through
/// [`RhsFailure::wrong_shape`]. Every derivative is checked for NaN/Infinity,
/// and every call is counted.
pub struct RhsEvaluator<'f, S, R: ?Sized> {
    func: &'f R,
    validated: bool,
    evaluations: usize,
    _state: PhantomData<fn(&S) -> S>,
}

impl<'f, S, R> RhsEvaluator<'f, S, R>
where
    S: OdeState,
    R: RhsFunction<S> + ?Sized,
{
    pub fn new(func: &'f R) -> Self {
        Self {
            func,
            validated: false,
            evaluations: 0,
            _state: PhantomData,
        }
    }

    /// Evaluate the derivative at `(state, t)`.
    pub fn evaluate(&mut self, state: &S, t: Real, params: &[Real]) -> IntegrateResult<S> {
        self.evaluations += 1;
        let derivative = self
            .func
            .eval(state, t, params)
            .map_err(|e| match e.shape {
                Some((expected, found)) => IntegrateError::ShapeMismatch { expected, found },
                None => IntegrateError::Callback {
                    t,
                    message: e.message,
                },
            })?;

        if !self.validated {
            if derivative.dim() != state.dim() {
                return Err(IntegrateError::ShapeMismatch {
                    expected: state.dim(),
                    found: derivative.dim(),
                });
            }
            self.validated = true;
        }

        if !derivative.is_finite() {
            return Err(IntegrateError::NonFiniteResult {
                stage: NonFiniteStage::Rhs,
                t,
            });
        }
        Ok(derivative)
    }

    /// Number of evaluations so far, failed ones included.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Whether the derivative shape has been checked.
    pub fn is_validated(&self) -> bool {
        self.validated
    }
}
