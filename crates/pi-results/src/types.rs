//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub t_end_s: f64,
    pub samples: usize,
    /// Actuator limits the run was solved with.
    pub limits: ActuatorRange,
    #[serde(default)]
    pub stats: RunStats,
}

/// Saturation interval `[u_min, u_max]` recorded with a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ActuatorRange {
    pub u_min: f64,
    pub u_max: f64,
}

/// Integrator work for a stored run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RunStats {
    pub rhs_calls: usize,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

/// One trajectory sample, including the applied output `u`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryRecord {
    pub time_s: f64,
    pub x: f64,
    pub u_raw: f64,
    pub u: f64,
    pub r: f64,
    pub setpoint: f64,
    pub load: f64,
}
