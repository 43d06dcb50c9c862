//! Service layer for stepwise.
//!
//! Front ends (the CLI today) go through this crate for run configuration,
//! run execution, method comparison, convergence sweeps and export. The
//! engine itself stays free of I/O and logging; everything here logs through
//! `tracing`.

pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod run_service;

// Re-export key types for convenience
pub use compare::{
    ComparisonReport, ComparisonSample, ReferenceKind, SweepLevel, SweepReport, compare_methods,
    convergence_sweep, reference_states,
};
pub use config::{
    ConfigError, ConfigFormat, Method, Model, RunConfig, load_config, parse_config, save_config,
};
pub use error::{AppError, AppResult};
pub use export::{ExportFormat, export_report, export_trajectory, render_trajectory, report_json};
pub use fingerprint::trajectory_fingerprint;
pub use run_service::{ModelRun, RunResponse, run_config, run_model, smoke_model};
