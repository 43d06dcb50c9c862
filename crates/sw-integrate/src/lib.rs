//! Fixed-step ODE integration engine.
//!
//! Provides:
//! - RHS evaluation behind a uniform `(state, time, params)` interface
//! - Explicit Euler and classical RK4 steppers
//! - A fixed-step integrator loop producing immutable trajectories, on a
//!   uniform grid or on caller-supplied sample times
//! - Built-in models and trusted reference solutions
//!
//! Runs are synchronous and self-contained: nothing is cached between calls
//! and no global state is touched, so independent runs may execute
//! concurrently.
//!
//! ```
//! use sw_integrate::{models, solve_scalar_ode_rk4};
//!
//! let traj = solve_scalar_ode_rk4(&models::relaxation, 10.0, 100, 0.1, &[0.02, 5.0]).unwrap();
//! assert_eq!(traj.len(), 101);
//! assert_eq!(traj.rhs_evaluations(), 400);
//! ```

pub mod diagnostics;
pub mod error;
pub mod models;
pub mod reference;
pub mod rhs;
pub mod solve;
pub mod stepper;
pub mod trajectory;

// Re-exports for public API
pub use diagnostics::{SmokeReport, SmokeRow, smoke_report};
pub use error::{Aborted, IntegrateError, IntegrateResult, NonFiniteStage};
pub use rhs::{Fallible, RhsEvaluator, RhsFailure, RhsFunction};
pub use solve::{
    StepOptions, integrate, integrate_on_times, solve_scalar_ode_euler, solve_scalar_ode_rk4,
};
pub use stepper::{Euler, Rk4, Stepper};
pub use sw_core::{OdeState, Real};
pub use trajectory::Trajectory;
