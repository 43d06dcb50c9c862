//! Error types for the sw-app service layer.

use std::path::PathBuf;

use sw_integrate::IntegrateError;

use crate::config::ConfigError;

/// Application error shared by the CLI and any other front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("Integration error: {0}")]
    Integrate(#[from] IntegrateError),

    #[error("Integration aborted after {points} points: {source}")]
    Aborted {
        points: usize,
        source: IntegrateError,
    },

    #[error("Numeric error: {0}")]
    Numeric(#[from] sw_core::CoreError),

    #[error("Failed to write output file: {path}")]
    ExportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sw-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl<S> From<sw_integrate::Aborted<S>> for AppError {
    fn from(aborted: sw_integrate::Aborted<S>) -> Self {
        AppError::Aborted {
            points: aborted.trajectory.len(),
            source: aborted.error,
        }
    }
}
