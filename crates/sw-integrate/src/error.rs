//! Error types for integration runs.

use std::fmt;

use sw_core::Real;
use thiserror::Error;

use crate::trajectory::Trajectory;

/// Where a non-finite value showed up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonFiniteStage {
    /// The right-hand side returned NaN/Infinity.
    Rhs,
    /// The stepper combined finite derivatives into a non-finite state.
    Update,
}

impl fmt::Display for NonFiniteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonFiniteStage::Rhs => f.write_str("rhs evaluation"),
            NonFiniteStage::Update => f.write_str("state update"),
        }
    }
}

/// Errors encountered while integrating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrateError {
    #[error("Invalid step count: {steps} (must be at least 1)")]
    InvalidStepCount { steps: i64 },

    #[error("Invalid step size: {dt} (must be finite and positive)")]
    InvalidStepSize { dt: Real },

    #[error("Shape mismatch: state has {expected} components, derivative has {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Non-finite result from {stage} at t={t}")]
    NonFiniteResult { stage: NonFiniteStage, t: Real },

    #[error("Right-hand side failed at t={t}: {message}")]
    Callback { t: Real, message: String },

    #[error("Invalid argument: {what}")]
    InvalidArgument { what: &'static str },
}

pub type IntegrateResult<T> = Result<T, IntegrateError>;

impl From<sw_core::CoreError> for IntegrateError {
    fn from(e: sw_core::CoreError) -> Self {
        match e {
            sw_core::CoreError::NonFinite { what, .. } => IntegrateError::InvalidArgument { what },
            sw_core::CoreError::DimensionMismatch {
                expected, found, ..
            } => IntegrateError::ShapeMismatch { expected, found },
        }
    }
}

/// A run that stopped early.
///
/// `trajectory` holds every point computed before the failure: the offending
/// step is not included, and runs rejected during validation carry an empty
/// trajectory.
#[derive(Clone, Debug, PartialEq)]
pub struct Aborted<S> {
    pub trajectory: Trajectory<S>,
    pub error: IntegrateError,
}

impl<S> Aborted<S> {
    /// Abort before any point was recorded.
    pub(crate) fn before_start(error: IntegrateError, dt: Real) -> Self {
        Self {
            trajectory: Trajectory::with_capacity(0, dt),
            error,
        }
    }

    pub fn into_error(self) -> IntegrateError {
        self.error
    }
}

impl<S> fmt::Display for Aborted<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "integration aborted after {} recorded points: {}",
            self.trajectory.len(),
            self.error
        )
    }
}

impl<S: fmt::Debug> std::error::Error for Aborted<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<S> From<Aborted<S>> for IntegrateError {
    fn from(aborted: Aborted<S>) -> Self {
        aborted.error
    }
}
