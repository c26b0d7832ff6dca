//! Performance summaries of loop trajectories.

use pi_controls::ActuatorLimits;
use pi_results::{RunManifest, RunStats, TrajectoryRecord};
use pi_sim::{IntegrationStats, Trajectory, TrajectorySample};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Relative width of the settling band.
pub const SETTLING_BAND: f64 = 0.02;

/// Key figures of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub samples: usize,
    pub final_x: f64,
    pub final_u_raw: f64,
    /// `setpoint - x` at the last sample.
    pub final_error: f64,
    /// Largest excursion of `x` past the setpoint, in the direction of the
    /// initial approach (0 when it never crosses).
    pub peak_overshoot: f64,
    /// First time after which `|setpoint - x|` stays inside the settling band;
    /// `None` if the last sample is still outside.
    pub settling_time: Option<f64>,
    /// Largest distance of `u_raw` outside the actuator limits.
    pub max_windup: f64,
    pub rhs_calls: usize,
}

/// Summarize a trajectory against the actuator `limits`.
pub fn summarize(traj: &Trajectory, limits: &ActuatorLimits) -> AppResult<RunSummary> {
    let (first, last) = match (traj.sample(0), traj.final_sample()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AppError::InvalidInput("No samples in run".to_string())),
    };

    // Approach direction from the first sample towards the final setpoint
    let direction = if last.setpoint >= first.x { 1.0 } else { -1.0 };
    let peak_overshoot = traj
        .iter()
        .map(|s| (s.x - s.setpoint) * direction)
        .fold(0.0_f64, f64::max);

    let scale = (last.setpoint - first.x).abs().max(last.setpoint.abs());
    let band = SETTLING_BAND * if scale > 0.0 { scale } else { 1.0 };
    let errors: Vec<f64> = traj.iter().map(|s| s.error().abs()).collect();
    let settling_time = match errors.iter().rposition(|&e| e > band) {
        None => Some(first.t),
        Some(i) if i + 1 < traj.len() => Some(traj.t()[i + 1]),
        Some(_) => None,
    };

    let max_windup = traj
        .u_raw()
        .iter()
        .map(|&u| limits.excess(u))
        .fold(0.0_f64, f64::max);

    Ok(RunSummary {
        time_range: (first.t, last.t),
        samples: traj.len(),
        final_x: last.x,
        final_u_raw: last.u_raw,
        final_error: last.error(),
        peak_overshoot,
        settling_time,
        max_windup,
        rhs_calls: traj.stats().rhs_calls,
    })
}

/// Summarize a stored run.
pub fn summarize_records(
    records: &[TrajectoryRecord],
    stats: RunStats,
    limits: &ActuatorLimits,
) -> AppResult<RunSummary> {
    let samples = records.iter().map(|r| TrajectorySample {
        t: r.time_s,
        x: r.x,
        u_raw: r.u_raw,
        r: r.r,
        setpoint: r.setpoint,
        load: r.load,
    });
    let stats = IntegrationStats {
        rhs_calls: stats.rhs_calls,
        accepted_steps: stats.accepted_steps,
        rejected_steps: stats.rejected_steps,
    };
    let traj = Trajectory::from_samples(samples, stats)?;
    summarize(&traj, limits)
}

/// Summarize a stored run against the actuator limits recorded in its manifest.
pub fn summarize_run(
    manifest: &RunManifest,
    records: &[TrajectoryRecord],
) -> AppResult<RunSummary> {
    let limits = ActuatorLimits::new(manifest.limits.u_min, manifest.limits.u_max)?;
    summarize_records(records, manifest.stats, &limits)
}
