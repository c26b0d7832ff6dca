use clap::{Parser, Subcommand, ValueEnum};
use pi_app::{
    AppError, AppResult, RunOptions, RunRequest, RunSummary, SweepParameter,
    project_service, query, run_service,
};
use pi_project::Scenario;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pi-cli")]
#[command(about = "PI control loop simulator with saturation and anti-windup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Template {
    StepResponse,
    IntegralDemo,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and parameters
    Validate {
        /// Path to the scenario file (.yaml or .json)
        scenario_path: PathBuf,
    },
    /// Simulate a scenario and store the run
    Run {
        /// Path to the scenario file (.yaml or .json)
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Also write the trajectory as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List stored runs for a scenario
    Runs {
        /// Path to the scenario file
        scenario_path: PathBuf,
    },
    /// Show the summary of a stored run
    ShowRun {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export a stored trajectory as CSV
    Export {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID to export
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare setpoint and reference-trajectory integral action
    Compare {
        /// Path to the scenario file (defaults to the built-in integral demo)
        scenario_path: Option<PathBuf>,
    },
    /// Sweep one loop parameter over a list of values
    Sweep {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Parameter to vary: c-p, t-cl, t-n, u-min or u-max
        #[arg(long)]
        param: String,
        /// Comma-separated parameter values
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
    },
    /// Write a built-in scenario file
    Init {
        /// Destination path (.yaml or .json)
        scenario_path: PathBuf,
        /// Built-in scenario to write
        #[arg(long, value_enum, default_value = "step-response")]
        template: Template,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            no_cache,
            csv,
        } => cmd_run(&scenario_path, !no_cache, csv.as_deref()),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::Export {
            scenario_path,
            run_id,
            output,
        } => cmd_export(&scenario_path, &run_id, output.as_deref()),
        Commands::Compare { scenario_path } => cmd_compare(scenario_path.as_deref()),
        Commands::Sweep {
            scenario_path,
            param,
            values,
        } => cmd_sweep(&scenario_path, &param, &values),
        Commands::Init {
            scenario_path,
            template,
            force,
        } => cmd_init(&scenario_path, template, force),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = project_service::load_scenario(scenario_path)?;
    project_service::validate_scenario(&scenario)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    Ok(())
}

fn cmd_run(scenario_path: &Path, use_cache: bool, csv: Option<&Path>) -> AppResult<()> {
    let request = RunRequest {
        scenario_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };
    let response = run_service::ensure_run(&request)?;

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }
    tracing::debug!(elapsed_s = response.elapsed_s, "run finished");

    let stats = response.manifest.stats;
    println!(
        "  Integrator: {} rhs calls, {} accepted / {} rejected steps",
        stats.rhs_calls, stats.accepted_steps, stats.rejected_steps
    );

    let (manifest, records) = run_service::load_run(scenario_path, &response.run_id)?;
    let summary = query::summarize_run(&manifest, &records)?;
    print_summary(&summary);

    if let Some(path) = csv {
        write_records_csv(&records, Some(path))?;
    }
    Ok(())
}

fn cmd_runs(scenario_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No stored runs for: {}", scenario_path.display());
    } else {
        println!("Stored runs for '{}':", runs[0].scenario_name);
        for manifest in runs {
            println!(
                "  {} ({}, {} samples over {:.3} s)",
                manifest.run_id, manifest.timestamp, manifest.samples, manifest.t_end_s
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(scenario_path, run_id)?;
    let summary = query::summarize_run(&manifest, &records)?;

    println!("\nRun {}:", manifest.run_id);
    println!("  Scenario: {}", manifest.scenario_name);
    println!("  Created: {}", manifest.timestamp);
    println!("  Solver: {}", manifest.solver_version);
    print_summary(&summary);
    Ok(())
}

fn cmd_export(scenario_path: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    let (_manifest, records) = run_service::load_run(scenario_path, run_id)?;
    write_records_csv(&records, output)
}

fn cmd_compare(scenario_path: Option<&Path>) -> AppResult<()> {
    let scenario = match scenario_path {
        Some(path) => project_service::load_scenario(path)?,
        None => Scenario::integral_demo(),
    };
    println!("Comparing integral modes for '{}'", scenario.name);

    let cmp = pi_app::compare_integral_modes(&scenario)?;
    println!("\nIntegral of setpoint error:");
    print_summary(&cmp.standard_summary);
    println!("\nIntegral of reference-trajectory error:");
    print_summary(&cmp.reference_summary);
    println!("\n  Largest x difference: {:.6}", cmp.max_x_difference);
    Ok(())
}

fn cmd_sweep(scenario_path: &Path, param: &str, values: &[f64]) -> AppResult<()> {
    let parameter: SweepParameter = param.parse()?;
    let scenario = project_service::load_scenario(scenario_path)?;
    println!(
        "Sweeping {} over {} values for '{}'",
        parameter,
        values.len(),
        scenario.name
    );

    let points = pi_app::sweep_parameter(&scenario, parameter, values)?;
    println!(
        "\n  {:>10}  {:>12}  {:>10}  {:>10}  {:>10}",
        parameter.name(),
        "final error",
        "overshoot",
        "settling",
        "windup"
    );
    for point in points {
        let s = &point.summary;
        let settling = s
            .settling_time
            .map(|t| format!("{:.3}", t))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>10.4}  {:>12.3e}  {:>10.4}  {:>10}  {:>10.4}",
            point.value, s.final_error, s.peak_overshoot, settling, s.max_windup
        );
    }
    Ok(())
}

fn cmd_init(scenario_path: &Path, template: Template, force: bool) -> AppResult<()> {
    if scenario_path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            scenario_path.display()
        )));
    }
    let scenario = match template {
        Template::StepResponse => Scenario::step_response(),
        Template::IntegralDemo => Scenario::integral_demo(),
    };
    project_service::save_scenario(scenario_path, &scenario)?;
    println!(
        "✓ Wrote scenario '{}' to {}",
        scenario.name,
        scenario_path.display()
    );
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "  Time range: {:.3} - {:.3} s ({} samples)",
        summary.time_range.0, summary.time_range.1, summary.samples
    );
    println!(
        "  Final x: {:.6} (error {:.3e})",
        summary.final_x, summary.final_error
    );
    println!("  Final u_raw: {:.6}", summary.final_u_raw);
    println!("  Peak overshoot: {:.6}", summary.peak_overshoot);
    match summary.settling_time {
        Some(t) => println!("  Settling time (2%): {:.3} s", t),
        None => println!("  Settling time (2%): not settled"),
    }
    println!("  Max windup beyond limits: {:.3e}", summary.max_windup);
}

fn write_records_csv(records: &[pi_results::TrajectoryRecord], output: Option<&Path>) -> AppResult<()> {
    if let Some(path) = output {
        let file = std::fs::File::create(path)?;
        pi_results::write_csv(io::BufWriter::new(file), records)?;
        println!(
            "✓ Exported {} samples to {}",
            records.len(),
            path.display()
        );
    } else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        pi_results::write_csv(&mut lock, records)?;
        lock.flush()?;
    }
    Ok(())
}
