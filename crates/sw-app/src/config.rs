//! Run configuration files.
//!
//! A config names a built-in model, a method and the run grid:
//!
//! ```yaml
//! name: relaxation-baseline
//! model: relaxation
//! method: rk4
//! initial_state: [10.0]
//! params: [0.02, 5.0]
//! steps: 3000
//! dt: 0.1
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sw_core::Real;
use sw_integrate::{Euler, Rk4, StepOptions, Stepper};

use crate::error::{AppError, AppResult};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Model {model} takes {expected} parameters, got {found}")]
    ParamCount {
        model: Model,
        expected: usize,
        found: usize,
    },

    #[error("Model {model} has a {expected}-dimensional state, got {found} initial values")]
    StateDim {
        model: Model,
        expected: usize,
        found: usize,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Built-in right-hand sides selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    ExponentialDecay,
    Relaxation,
    Logistic,
    HarmonicOscillator,
    Lorenz,
}

impl Model {
    pub const ALL: [Model; 5] = [
        Model::ExponentialDecay,
        Model::Relaxation,
        Model::Logistic,
        Model::HarmonicOscillator,
        Model::Lorenz,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Model::ExponentialDecay => "exponential_decay",
            Model::Relaxation => "relaxation",
            Model::Logistic => "logistic",
            Model::HarmonicOscillator => "harmonic_oscillator",
            Model::Lorenz => "lorenz",
        }
    }

    /// State dimension.
    pub fn dim(self) -> usize {
        match self {
            Model::ExponentialDecay | Model::Relaxation | Model::Logistic => 1,
            Model::HarmonicOscillator => 2,
            Model::Lorenz => 3,
        }
    }

    pub fn param_count(self) -> usize {
        match self {
            Model::ExponentialDecay | Model::HarmonicOscillator => 1,
            Model::Relaxation | Model::Logistic => 2,
            Model::Lorenz => 3,
        }
    }

    /// Check an initial state and parameter vector against this model.
    pub fn check_inputs(self, initial_state: &[Real], params: &[Real]) -> Result<(), ConfigError> {
        if initial_state.len() != self.dim() {
            return Err(ConfigError::StateDim {
                model: self,
                expected: self.dim(),
                found: initial_state.len(),
            });
        }
        if params.len() != self.param_count() {
            return Err(ConfigError::ParamCount {
                model: self,
                expected: self.param_count(),
                found: params.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownModel(s.to_string()))
    }
}

/// Stepping method selectable by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Euler,
    #[default]
    Rk4,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Euler => Euler::NAME,
            Method::Rk4 => Rk4::NAME,
        }
    }

    pub fn order(self) -> u32 {
        match self {
            Method::Euler => Euler::ORDER,
            Method::Rk4 => Rk4::ORDER,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euler" => Ok(Method::Euler),
            "rk4" => Ok(Method::Rk4),
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// One fixed-step run of a built-in model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub name: String,
    pub model: Model,
    #[serde(default)]
    pub method: Method,
    pub initial_state: Vec<Real>,
    #[serde(default)]
    pub params: Vec<Real>,
    /// Signed so that negative counts reach validation instead of the parser.
    pub steps: i64,
    pub dt: Real,
    #[serde(default)]
    pub t0: Real,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.check_inputs(&self.initial_state, &self.params)?;
        if self.steps < 1 {
            return Err(ConfigError::InvalidValue {
                field: "steps",
                value: self.steps.to_string(),
                reason: "must be at least 1",
            });
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "dt",
                value: self.dt.to_string(),
                reason: "must be finite and positive",
            });
        }
        if !self.t0.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "t0",
                value: self.t0.to_string(),
                reason: "must be finite",
            });
        }
        if let Some(v) = self.initial_state.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "initial_state",
                value: v.to_string(),
                reason: "must be finite",
            });
        }
        if let Some(v) = self.params.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "params",
                value: v.to_string(),
                reason: "must be finite",
            });
        }
        Ok(())
    }

    /// Grid of a validated config.
    pub fn step_options(&self) -> Result<StepOptions, ConfigError> {
        self.validate()?;
        let steps = usize::try_from(self.steps).map_err(|_| ConfigError::InvalidValue {
            field: "steps",
            value: self.steps.to_string(),
            reason: "does not fit the platform's index type",
        })?;
        Ok(StepOptions::new(steps, self.dt).starting_at(self.t0))
    }

    /// Display name, falling back to the model name.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.model.name()
        } else {
            &self.name
        }
    }
}

/// Serialized config format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Parse and validate a config document.
pub fn parse_config(content: &str, format: ConfigFormat) -> AppResult<RunConfig> {
    let config: RunConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    config.validate()?;
    Ok(config)
}

/// Load a config file, choosing the parser by extension.
pub fn load_config(path: &Path) -> AppResult<RunConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format)
}

/// Write a config as YAML or JSON, chosen by extension.
pub fn save_config(path: &Path, config: &RunConfig) -> AppResult<()> {
    config.validate()?;
    let content = match ConfigFormat::from_path(path)? {
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    };
    std::fs::write(path, content).map_err(|source| AppError::ExportWrite {
        path: path.to_path_buf(),
        source,
    })
}
