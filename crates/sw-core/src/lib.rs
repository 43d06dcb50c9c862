//! sw-core: numeric foundation for stepwise.
//!
//! Contains:
//! - numeric (Real + float helpers)
//! - state (the vector abstraction integrators step over)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod state;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use state::OdeState;
