//! Shared application service layer for the PI loop simulator.
//!
//! Centralizes scenario handling, model compilation, simulation runs with
//! result caching, parameter sweeps, and result summaries for the CLI.

pub mod compare;
pub mod compile;
pub mod error;
pub mod project_service;
pub mod query;
pub mod run_service;
pub mod sweep;

// Re-export key types for convenience
pub use compare::{IntegralComparison, compare_integral_modes};
pub use compile::{
    ScenarioModel, compile_options, compile_params, compile_scenario, compile_signal,
};
pub use error::{AppError, AppResult};
pub use project_service::{load_scenario, render_scenario_yaml, save_scenario, validate_scenario};
pub use query::{RunSummary, summarize, summarize_records, summarize_run};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, SOLVER_VERSION, ensure_run, list_runs, load_run,
    simulate, trajectory_records,
};
pub use sweep::{SweepParameter, SweepPoint, sweep_parameter};
