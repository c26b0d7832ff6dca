//! Time-varying input signals (setpoint and load).
//!
//! A signal is anything that maps a time in seconds to a scalar. Signals are
//! stateless: the integrator may evaluate them repeatedly, at trial points and
//! out of order.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Scalar function of time.
///
/// Implemented by closures `Fn(f64) -> f64` and by the concrete signal types
/// of this module.
pub trait TimeSignal {
    /// Signal value at time `t` (seconds).
    fn value_at(&self, t: f64) -> f64;
}

impl<F> TimeSignal for F
where
    F: Fn(f64) -> f64,
{
    fn value_at(&self, t: f64) -> f64 {
        self(t)
    }
}

/// Signal that never changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constant(pub f64);

impl TimeSignal for Constant {
    fn value_at(&self, _t: f64) -> f64 {
        self.0
    }
}

/// Single step: `before` for `t < at`, `after` from `at` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub at: f64,
    pub before: f64,
    pub after: f64,
}

impl Step {
    /// Step from zero to `after` at time `at`.
    pub fn new(at: f64, after: f64) -> Self {
        Self {
            at,
            before: 0.0,
            after,
        }
    }
}

impl TimeSignal for Step {
    fn value_at(&self, t: f64) -> f64 {
        if t >= self.at { self.after } else { self.before }
    }
}

fn check_sorted(times: impl Iterator<Item = f64>, what: &str) -> ControlResult<()> {
    let mut prev = f64::NEG_INFINITY;
    for (i, t) in times.enumerate() {
        if !t.is_finite() {
            return Err(ControlError::InvalidSignal {
                what: format!("{what}: time at index {i} is not finite"),
            });
        }
        if t < prev {
            return Err(ControlError::InvalidSignal {
                what: format!("{what}: times must be non-decreasing (index {i})"),
            });
        }
        prev = t;
    }
    Ok(())
}

fn check_values(values: impl Iterator<Item = f64>, what: &str) -> ControlResult<()> {
    for (i, v) in values.enumerate() {
        if !v.is_finite() {
            return Err(ControlError::InvalidSignal {
                what: format!("{what}: value at index {i} is not finite"),
            });
        }
    }
    Ok(())
}

/// Piecewise-constant schedule: `initial` until the first event, then the
/// value of the latest event whose time has been reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleFields")]
pub struct PiecewiseConstant {
    initial: f64,
    events: Vec<(f64, f64)>,
}

#[derive(Deserialize)]
struct ScheduleFields {
    initial: f64,
    events: Vec<(f64, f64)>,
}

impl TryFrom<ScheduleFields> for PiecewiseConstant {
    type Error = ControlError;

    fn try_from(fields: ScheduleFields) -> ControlResult<Self> {
        Self::new(fields.initial, fields.events)
    }
}

impl PiecewiseConstant {
    /// Create a schedule from `(time, value)` events sorted by time.
    pub fn new(initial: f64, events: Vec<(f64, f64)>) -> ControlResult<Self> {
        check_sorted(events.iter().map(|e| e.0), "schedule")?;
        check_values(
            std::iter::once(initial).chain(events.iter().map(|e| e.1)),
            "schedule",
        )?;
        Ok(Self { initial, events })
    }

    pub fn events(&self) -> &[(f64, f64)] {
        &self.events
    }
}

impl TimeSignal for PiecewiseConstant {
    fn value_at(&self, t: f64) -> f64 {
        let idx = self.events.partition_point(|e| e.0 <= t);
        if idx == 0 {
            self.initial
        } else {
            self.events[idx - 1].1
        }
    }
}

/// Lookup table with linear interpolation, held constant beyond both ends.
///
/// Never empty and sorted by time, however it was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableFields")]
pub struct PiecewiseLinear {
    points: Vec<(f64, f64)>,
}

#[derive(Deserialize)]
struct TableFields {
    points: Vec<(f64, f64)>,
}

impl TryFrom<TableFields> for PiecewiseLinear {
    type Error = ControlError;

    fn try_from(fields: TableFields) -> ControlResult<Self> {
        Self::new(fields.points)
    }
}

impl PiecewiseLinear {
    /// Create a table from `(time, value)` points sorted by time.
    ///
    /// Repeated times are allowed and produce a jump.
    pub fn new(points: Vec<(f64, f64)>) -> ControlResult<Self> {
        if points.is_empty() {
            return Err(ControlError::InvalidSignal {
                what: "table: at least one point is required".to_string(),
            });
        }
        check_sorted(points.iter().map(|p| p.0), "table")?;
        check_values(points.iter().map(|p| p.1), "table")?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl TimeSignal for PiecewiseLinear {
    fn value_at(&self, t: f64) -> f64 {
        let idx = self.points.partition_point(|p| p.0 <= t);
        if idx == 0 {
            return self.points[0].1;
        }
        if idx == self.points.len() {
            return self.points[idx - 1].1;
        }
        // points[idx - 1].0 <= t < points[idx].0, so the span is positive
        let (t0, v0) = self.points[idx - 1];
        let (t1, v1) = self.points[idx];
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }
}

/// Closed set of signal kinds that can be described in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalSource {
    Constant(Constant),
    Step(Step),
    Schedule(PiecewiseConstant),
    Table(PiecewiseLinear),
}

impl TimeSignal for SignalSource {
    fn value_at(&self, t: f64) -> f64 {
        match self {
            Self::Constant(s) => s.value_at(t),
            Self::Step(s) => s.value_at(t),
            Self::Schedule(s) => s.value_at(t),
            Self::Table(s) => s.value_at(t),
        }
    }
}

impl Default for SignalSource {
    fn default() -> Self {
        Self::Constant(Constant(0.0))
    }
}

impl From<f64> for SignalSource {
    fn from(value: f64) -> Self {
        Self::Constant(Constant(value))
    }
}
