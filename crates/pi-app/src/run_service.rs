//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use pi_controls::ActuatorLimits;
use pi_project::schema::Scenario;
use pi_results::{ActuatorRange, RunManifest, RunStats, RunStore, TrajectoryRecord};
use pi_sim::{Simulator, Trajectory};
use tracing::info;

use crate::compile;
use crate::error::AppResult;
use crate::project_service;

/// Version tag mixed into run ids so solver changes invalidate the cache.
pub const SOLVER_VERSION: &str = pi_sim::SOLVER_VERSION;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: SOLVER_VERSION.to_string(),
        }
    }
}

/// Request to execute a run of the scenario stored at `scenario_path`.
pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub options: RunOptions,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub elapsed_s: f64,
}

/// Compile and solve a scenario in memory.
pub fn simulate(scenario: &Scenario) -> AppResult<Trajectory> {
    let (model, opts) = compile::compile_scenario(scenario)?;
    let mut sim = Simulator::new(model, opts);
    sim.solve()?;
    Ok(sim.into_trajectory()?)
}

/// Storage rows for a trajectory, with the applied output clamped to `limits`.
pub fn trajectory_records(traj: &Trajectory, limits: &ActuatorLimits) -> Vec<TrajectoryRecord> {
    traj.iter()
        .map(|s| TrajectoryRecord {
            time_s: s.t,
            x: s.x,
            u_raw: s.u_raw,
            u: s.u(limits),
            r: s.r,
            setpoint: s.setpoint,
            load: s.load,
        })
        .collect()
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let started = Instant::now();

    let scenario = project_service::load_scenario(request.scenario_path)?;
    let run_id = pi_results::compute_run_id(&scenario, &request.options.solver_version)?;
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        let manifest = store.load_manifest(&run_id)?;
        info!(run_id = %run_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            elapsed_s: started.elapsed().as_secs_f64(),
        });
    }

    let traj = simulate(&scenario)?;
    let limits = *compile::compile_params(&scenario.params)?.limits();
    let records = trajectory_records(&traj, &limits);

    let stats = traj.stats();
    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_name: scenario.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: request.options.solver_version.clone(),
        t_end_s: scenario.horizon.t_end_s,
        samples: traj.len(),
        limits: ActuatorRange {
            u_min: limits.min(),
            u_max: limits.max(),
        },
        stats: RunStats {
            rhs_calls: stats.rhs_calls,
            accepted_steps: stats.accepted_steps,
            rejected_steps: stats.rejected_steps,
        },
    };
    store.save_run(&manifest, &records)?;
    info!(
        run_id = %run_id,
        samples = traj.len(),
        rhs_calls = stats.rhs_calls,
        "stored run"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        elapsed_s: started.elapsed().as_secs_f64(),
    })
}

/// Stored runs of the scenario at `scenario_path`, newest first.
pub fn list_runs(scenario_path: &Path) -> AppResult<Vec<RunManifest>> {
    let scenario = project_service::load_scenario(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;
    Ok(store.list_runs(&scenario.name)?)
}

/// Manifest and trajectory rows of a stored run.
pub fn load_run(
    scenario_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TrajectoryRecord>)> {
    let store = RunStore::for_scenario(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_trajectory(run_id)?;
    Ok((manifest, records))
}
