use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use sw_app::{
    AppResult, ComparisonReport, ExportFormat, Method, Model, RunConfig, RunResponse, SweepReport,
    compare_methods, convergence_sweep, export_report, export_trajectory, load_config, run_config,
    smoke_model,
};
use sw_core::Real;

#[derive(Parser)]
#[command(name = "stepwise")]
#[command(about = "Fixed-step ODE integration with explicit Euler and RK4", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an integration described by a config file
    Run {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
        /// Write the trajectory to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Trajectory file format (csv or json)
        #[arg(long, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Run an integration described on the command line
    Solve {
        /// Built-in model name
        #[arg(long)]
        model: Model,
        /// Stepping method (euler or rk4)
        #[arg(long, default_value_t = Method::Rk4)]
        method: Method,
        /// Initial state components
        #[arg(long = "y0", num_args = 1.., required = true, allow_negative_numbers = true)]
        y0: Vec<Real>,
        /// Model parameter (repeat for each one)
        #[arg(long = "param", allow_negative_numbers = true)]
        params: Vec<Real>,
        /// Number of steps
        #[arg(long, allow_negative_numbers = true)]
        steps: i64,
        /// Step size
        #[arg(long, allow_negative_numbers = true)]
        dt: Real,
        /// Start time
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        t0: Real,
        /// Write the trajectory to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Trajectory file format (csv or json)
        #[arg(long, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Compare Euler and RK4 against the reference solution
    Compare {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
        /// Print every n-th sample
        #[arg(long, default_value_t = 1)]
        every: usize,
        /// Write the full report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Convergence sweep halving the step size at each level
    Sweep {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
        /// Number of refinement levels
        #[arg(long, default_value_t = 5)]
        levels: usize,
        /// Write the full report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print a short step-by-step Euler/RK4 listing for a scalar model
    Smoke {
        /// Built-in scalar model name
        #[arg(long, default_value_t = Model::Relaxation)]
        model: Model,
        /// Initial value
        #[arg(long = "y0", default_value_t = 10.0, allow_negative_numbers = true)]
        y0: Real,
        /// Number of steps
        #[arg(long, default_value_t = 3)]
        steps: usize,
        /// Step size
        #[arg(long, default_value_t = 0.01)]
        dt: Real,
        /// Model parameter (repeat for each one)
        #[arg(long = "param", default_values_t = [0.02, 5.0], allow_negative_numbers = true)]
        params: Vec<Real>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config_path,
            output,
            format,
        } => cmd_run(&config_path, output.as_deref(), format),
        Commands::Solve {
            model,
            method,
            y0,
            params,
            steps,
            dt,
            t0,
            output,
            format,
        } => {
            let config = RunConfig {
                name: String::new(),
                model,
                method,
                initial_state: y0,
                params,
                steps,
                dt,
                t0,
            };
            execute(&config, output.as_deref(), format)
        }
        Commands::Compare {
            config_path,
            every,
            report,
        } => cmd_compare(&config_path, every, report.as_deref()),
        Commands::Sweep {
            config_path,
            levels,
            report,
        } => cmd_sweep(&config_path, levels, report.as_deref()),
        Commands::Smoke {
            model,
            y0,
            steps,
            dt,
            params,
        } => {
            let report = smoke_model(model, y0, steps, dt, &params)?;
            println!("{report}");
            Ok(())
        }
    }
}

fn cmd_run(config_path: &Path, output: Option<&Path>, format: ExportFormat) -> AppResult<()> {
    let config = load_config(config_path)?;
    execute(&config, output, format)
}

fn execute(config: &RunConfig, output: Option<&Path>, format: ExportFormat) -> AppResult<()> {
    println!(
        "Running {} with {} ({} steps, dt = {})",
        config.display_name(),
        config.method,
        config.steps,
        config.dt
    );
    let response = run_config(config)?;
    print_run_summary(&response);

    if let Some(path) = output {
        export_trajectory(path, &response.trajectory, format)?;
        println!("  Trajectory written to {}", path.display());
    }
    response.ensure_completed()
}

fn print_run_summary(response: &RunResponse) {
    let traj = &response.trajectory;
    match &response.failure {
        None => println!("✓ Run completed: {}", response.name),
        Some(e) => println!("✗ Run aborted: {e}"),
    }
    println!("  Points: {}", traj.len());
    if let Some((t, state)) = traj.last() {
        println!("  Final time: {t}");
        println!("  Final state: {}", format_state(state));
    }
    println!("  RHS evaluations: {}", traj.rhs_evaluations());
    println!("  Fingerprint: {}", response.fingerprint);
    println!("  Elapsed: {:.3} ms", response.elapsed_s * 1e3);
}

fn format_state(state: &[Real]) -> String {
    let parts: Vec<String> = state.iter().map(|v| format!("{v:.10e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn cmd_compare(config_path: &Path, every: usize, report_path: Option<&Path>) -> AppResult<()> {
    let config = load_config(config_path)?;
    let report = compare_methods(&config)?;
    print_comparison(&report, every.max(1));
    if let Some(path) = report_path {
        export_report(path, &report)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_comparison(report: &ComparisonReport, every: usize) {
    println!(
        "{:>8} {:>12} {:>14} {:>14}",
        "step", "t", "euler error", "rk4 error"
    );
    for sample in report.samples.iter().step_by(every) {
        println!(
            "{:>8} {:>12.6} {:>14.6e} {:>14.6e}",
            sample.step, sample.t, sample.euler_error, sample.rk4_error
        );
    }
    println!();
    println!("Model: {} ({:?} reference)", report.model, report.reference);
    println!("  Max error: euler={:.6e}, rk4={:.6e}", report.euler_max_error, report.rk4_max_error);
    println!(
        "  RHS evaluations: euler={}, rk4={}",
        report.euler_evaluations, report.rk4_evaluations
    );
    if report.rk4_better_everywhere {
        println!("✓ RK4 is more accurate than Euler at every sample");
    } else {
        println!("✗ RK4 is not more accurate than Euler at every sample");
    }
}

fn cmd_sweep(config_path: &Path, levels: usize, report_path: Option<&Path>) -> AppResult<()> {
    let config = load_config(config_path)?;
    let report = convergence_sweep(&config, levels)?;
    print_sweep(&report);
    if let Some(path) = report_path {
        export_report(path, &report)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_sweep(report: &SweepReport) {
    println!(
        "Convergence sweep: {} with {} (expected order {})",
        report.model, report.method, report.expected_order
    );
    println!(
        "{:>6} {:>10} {:>12} {:>14} {:>8} {:>10}",
        "level", "steps", "dt", "max error", "order", "rhs evals"
    );
    for level in &report.levels {
        let order = level
            .observed_order
            .map_or_else(|| "-".to_string(), |o| format!("{o:.3}"));
        println!(
            "{:>6} {:>10} {:>12.4e} {:>14.6e} {:>8} {:>10}",
            level.level, level.steps, level.dt, level.max_error, order, level.rhs_evaluations
        );
    }
}
