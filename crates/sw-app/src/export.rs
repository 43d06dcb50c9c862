//! Trajectory and report export.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use sw_core::Real;
use sw_integrate::Trajectory;

use crate::error::{AppError, AppResult};

/// Output format for trajectories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::InvalidInput(format!(
                "unknown export format: {other}"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        })
    }
}

#[derive(Serialize)]
struct TrajectoryRecord<'a> {
    times: &'a [Real],
    states: &'a [Vec<Real>],
}

/// CSV with a `t,y0,y1,...` header and one row per point.
pub fn write_csv<W: Write>(trajectory: &Trajectory<Vec<Real>>, mut out: W) -> std::io::Result<()> {
    let dim = trajectory.dim().unwrap_or(0);
    let mut header = String::from("t");
    for i in 0..dim {
        header.push_str(&format!(",y{i}"));
    }
    writeln!(out, "{header}")?;
    for (t, state) in trajectory.iter() {
        write!(out, "{t}")?;
        for v in state {
            write!(out, ",{v}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// `{"times": [...], "states": [[...], ...]}`.
pub fn trajectory_json(trajectory: &Trajectory<Vec<Real>>) -> AppResult<String> {
    let record = TrajectoryRecord {
        times: trajectory.times(),
        states: trajectory.states(),
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

pub fn render_trajectory(
    trajectory: &Trajectory<Vec<Real>>,
    format: ExportFormat,
) -> AppResult<String> {
    match format {
        ExportFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(trajectory, &mut buf)?;
            String::from_utf8(buf).map_err(|e| AppError::InvalidInput(e.to_string()))
        }
        ExportFormat::Json => trajectory_json(trajectory),
    }
}

pub fn export_trajectory(
    path: &Path,
    trajectory: &Trajectory<Vec<Real>>,
    format: ExportFormat,
) -> AppResult<()> {
    let content = render_trajectory(trajectory, format)?;
    write_file(path, &content)
}

/// Pretty JSON for any serializable report.
pub fn report_json<T: Serialize>(report: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn export_report<T: Serialize>(path: &Path, report: &T) -> AppResult<()> {
    write_file(path, &report_json(report)?)
}

fn write_file(path: &Path, content: &str) -> AppResult<()> {
    std::fs::write(path, content).map_err(|source| AppError::ExportWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_integrate::{Euler, StepOptions, integrate, models};

    fn oscillator() -> Trajectory<Vec<Real>> {
        integrate(
            &Euler,
            &models::harmonic_oscillator,
            [1.0, 0.0],
            &[1.0],
            &StepOptions::new(2, 0.5),
        )
        .unwrap()
        .into_dynamic()
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = render_trajectory(&oscillator(), ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, ["t,y0,y1", "0,1,0", "0.5,1,-0.5", "1,0.75,-1"]);
    }

    #[test]
    fn json_has_times_and_states() {
        let json = render_trajectory(&oscillator(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["times"].as_array().unwrap().len(), 3);
        assert_eq!(value["states"][2][0].as_f64(), Some(0.75));
    }

    #[test]
    fn format_names() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
    }
}
