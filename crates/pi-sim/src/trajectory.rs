//! Uniformly sampled loop trajectory.

use crate::error::{SimError, SimResult};
use crate::loop_model::{ControlLoopModel, LoopVector};
use crate::sim::{IntegrationStats, SimRecord};
use pi_controls::{ActuatorLimits, TimeSignal};

/// One row of a [`Trajectory`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub t: f64,
    pub x: f64,
    pub u_raw: f64,
    pub r: f64,
    pub setpoint: f64,
    pub load: f64,
}

impl TrajectorySample {
    /// Applied (saturated) controller output.
    pub fn u(&self, limits: &ActuatorLimits) -> f64 {
        limits.clamp(self.u_raw)
    }

    /// Control error `setpoint - x`.
    pub fn error(&self) -> f64 {
        self.setpoint - self.x
    }
}

/// Column-oriented simulation output. All columns have the same length and
/// `t` is uniformly spaced over `[0, t_end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    t: Vec<f64>,
    x: Vec<f64>,
    u_raw: Vec<f64>,
    r: Vec<f64>,
    setpoint: Vec<f64>,
    load: Vec<f64>,
    stats: IntegrationStats,
}

impl Trajectory {
    pub(crate) fn from_record<S, L>(
        record: SimRecord<LoopVector>,
        model: &ControlLoopModel<S, L>,
    ) -> Self
    where
        S: TimeSignal,
        L: TimeSignal,
    {
        let n = record.t.len();
        let mut x = Vec::with_capacity(n);
        let mut u_raw = Vec::with_capacity(n);
        let mut r = Vec::with_capacity(n);
        for v in &record.x {
            x.push(v[0]);
            u_raw.push(v[1]);
            r.push(v[2]);
        }
        let setpoint = record.t.iter().map(|&t| model.setpoint_at(t)).collect();
        let load = record.t.iter().map(|&t| model.load_at(t)).collect();

        Self {
            t: record.t,
            x,
            u_raw,
            r,
            setpoint,
            load,
            stats: record.stats,
        }
    }

    /// Rebuild a trajectory from stored rows.
    pub fn from_samples(
        samples: impl IntoIterator<Item = TrajectorySample>,
        stats: IntegrationStats,
    ) -> SimResult<Self> {
        let mut traj = Self {
            t: Vec::new(),
            x: Vec::new(),
            u_raw: Vec::new(),
            r: Vec::new(),
            setpoint: Vec::new(),
            load: Vec::new(),
            stats,
        };
        for s in samples {
            if traj.t.last().is_some_and(|&prev| s.t <= prev) {
                return Err(SimError::InvalidArg {
                    what: "trajectory times must be strictly increasing",
                });
            }
            traj.t.push(s.t);
            traj.x.push(s.x);
            traj.u_raw.push(s.u_raw);
            traj.r.push(s.r);
            traj.setpoint.push(s.setpoint);
            traj.load.push(s.load);
        }
        Ok(traj)
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn u_raw(&self) -> &[f64] {
        &self.u_raw
    }

    pub fn r(&self) -> &[f64] {
        &self.r
    }

    pub fn setpoint(&self) -> &[f64] {
        &self.setpoint
    }

    pub fn load(&self) -> &[f64] {
        &self.load
    }

    pub fn stats(&self) -> IntegrationStats {
        self.stats
    }

    pub fn sample(&self, i: usize) -> Option<TrajectorySample> {
        if i >= self.len() {
            return None;
        }
        Some(TrajectorySample {
            t: self.t[i],
            x: self.x[i],
            u_raw: self.u_raw[i],
            r: self.r[i],
            setpoint: self.setpoint[i],
            load: self.load[i],
        })
    }

    pub fn final_sample(&self) -> Option<TrajectorySample> {
        self.len().checked_sub(1).and_then(|i| self.sample(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = TrajectorySample> + '_ {
        (0..self.len()).filter_map(|i| self.sample(i))
    }

    /// Applied output `clamp(u_raw)` at every sample.
    pub fn clamped_output(&self, limits: &ActuatorLimits) -> Vec<f64> {
        self.u_raw.iter().map(|&u| limits.clamp(u)).collect()
    }
}
