//! Status codes returned across the C boundary.

use std::ffi::c_char;

use sw_integrate::IntegrateError;
use thiserror::Error;

/// Result of a boundary call. `Ok` is zero; everything else is a failure.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwStatus {
    Ok = 0,
    InvalidStepCount = 1,
    InvalidStepSize = 2,
    ShapeMismatch = 3,
    NonFiniteResult = 4,
    CallbackFailed = 5,
    InvalidArgument = 6,
}

impl SwStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => SwStatus::Ok,
            1 => SwStatus::InvalidStepCount,
            2 => SwStatus::InvalidStepSize,
            3 => SwStatus::ShapeMismatch,
            4 => SwStatus::NonFiniteResult,
            5 => SwStatus::CallbackFailed,
            6 => SwStatus::InvalidArgument,
            _ => return None,
        })
    }

    fn message(self) -> &'static std::ffi::CStr {
        match self {
            SwStatus::Ok => c"ok",
            SwStatus::InvalidStepCount => c"invalid step count",
            SwStatus::InvalidStepSize => c"invalid step size",
            SwStatus::ShapeMismatch => c"derivative shape does not match state",
            SwStatus::NonFiniteResult => c"non-finite result",
            SwStatus::CallbackFailed => c"right-hand side callback failed",
            SwStatus::InvalidArgument => c"invalid argument",
        }
    }
}

/// Failures detected at the boundary before or while integrating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("Null pointer: {what}")]
    NullPointer { what: &'static str },

    #[error("Output buffer too small: need {needed} points, capacity is {capacity}")]
    InsufficientCapacity { needed: usize, capacity: usize },

    #[error(transparent)]
    Integrate(#[from] IntegrateError),
}

impl BoundaryError {
    pub fn status(&self) -> SwStatus {
        match self {
            BoundaryError::NullPointer { .. } | BoundaryError::InsufficientCapacity { .. } => {
                SwStatus::InvalidArgument
            }
            BoundaryError::Integrate(e) => status_of(e),
        }
    }
}

pub fn status_of(error: &IntegrateError) -> SwStatus {
    match error {
        IntegrateError::InvalidStepCount { .. } => SwStatus::InvalidStepCount,
        IntegrateError::InvalidStepSize { .. } => SwStatus::InvalidStepSize,
        IntegrateError::ShapeMismatch { .. } => SwStatus::ShapeMismatch,
        IntegrateError::NonFiniteResult { .. } => SwStatus::NonFiniteResult,
        IntegrateError::Callback { .. } => SwStatus::CallbackFailed,
        IntegrateError::InvalidArgument { .. } => SwStatus::InvalidArgument,
    }
}

/// Static, NUL-terminated description of a status code.
///
/// The returned pointer is valid for the lifetime of the program.
#[unsafe(no_mangle)]
pub extern "C" fn sw_status_message(code: i32) -> *const c_char {
    SwStatus::from_code(code)
        .map(SwStatus::message)
        .unwrap_or(c"unknown status")
        .as_ptr()
}
