//! Continuous-time PI control loop primitives.
//!
//! This crate holds the dynamical model of a PI loop driving a first-order
//! process through a saturating actuator:
//!
//! ```text
//! c_p * dx/dt = clamp((sp - x) / t_cl + u, u_min, u_max) - load
//! du_raw/dt   = (sp - x) / (t_cl * t_n)      or  (r - x) / (t_cl * t_n)
//! dr/dt       = (sp - r) / t_cl
//! ```
//!
//! with `u = clamp(u_raw, u_min, u_max)`, an anti-windup override on
//! `du_raw/dt` and optional adaptive scheduling of `t_cl`/`t_n`.
//!
//! # Architecture
//!
//! - [`PiLoopParams`] is an immutable, validated configuration
//! - [`derivative`] is a pure function of `(t, state, params, signals)`
//! - Setpoint and load are any [`TimeSignal`]: closures, steps, schedules or
//!   lookup tables
//!
//! Time integration lives in `pi-sim`; this crate never advances state.

pub mod controller;
pub mod dynamics;
pub mod error;
pub mod signal;

pub use controller::{ActuatorLimits, PiLoopParams};
pub use dynamics::{
    ADAPT_EPSILON, ANTI_WINDUP_DIVISOR, EffectiveTimeConstants, LoopEvaluation, LoopState,
    anti_windup, derivative, effective_time_constants, evaluate,
};
pub use error::{ControlError, ControlResult};
pub use signal::{Constant, PiecewiseConstant, PiecewiseLinear, SignalSource, Step, TimeSignal};
