//! Right-hand side of the PI loop ODE.
//!
//! The loop state is `(x, u_raw, r)`:
//! - `x`: controlled process variable
//! - `u_raw`: unclamped controller output (the integrator state)
//! - `r`: reference trajectory, only fed back when `use_ref` is set
//!
//! Everything here is a pure function of its arguments. Adaptive re-tuning
//! produces per-evaluation time constants and never touches the
//! configuration.

use crate::controller::PiLoopParams;
use crate::signal::TimeSignal;
use serde::{Deserialize, Serialize};

/// Guard added to the headroom denominators of the adaptive re-tuning.
pub const ADAPT_EPSILON: f64 = 1e-8;

/// The anti-windup correction acts with time constant `t_cl / ANTI_WINDUP_DIVISOR`.
pub const ANTI_WINDUP_DIVISOR: f64 = 20.0;

/// State of the loop. Also used for its time derivative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoopState {
    pub x: f64,
    pub u_raw: f64,
    pub r: f64,
}

impl LoopState {
    pub fn new(x: f64, u_raw: f64, r: f64) -> Self {
        Self { x, u_raw, r }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.u_raw, self.r]
    }

    pub fn from_array([x, u_raw, r]: [f64; 3]) -> Self {
        Self { x, u_raw, r }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.u_raw.is_finite() && self.r.is_finite()
    }
}

/// Time constants in effect for a single derivative evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveTimeConstants {
    pub t_cl: f64,
    pub t_n: f64,
}

/// Adaptive re-tuning of `t_cl`/`t_n`.
///
/// The candidate closed-loop time constant is the one the remaining headroom
/// towards the upper limit could sustain. A negative candidate is replaced by
/// the headroom towards the lower limit. The result never drops below the
/// configured `t_cl`, and `t_n` keeps the configured `t_n / t_cl` ratio.
///
/// Returns the configured constants unchanged when `adapt_t` is off.
pub fn effective_time_constants(
    params: &PiLoopParams,
    sp: f64,
    x: f64,
    u: f64,
) -> EffectiveTimeConstants {
    if !params.adapt_t() {
        return EffectiveTimeConstants {
            t_cl: params.t_cl(),
            t_n: params.t_n(),
        };
    }

    let limits = params.limits();
    let mut candidate = (sp - x) / (limits.max() - u + ADAPT_EPSILON);
    if candidate < 0.0 {
        candidate = (sp - x) / (u - limits.min() + ADAPT_EPSILON);
    }
    // f64::max ignores a NaN candidate, which keeps the configured value
    let t_cl = params.t_cl().max(candidate);

    EffectiveTimeConstants {
        t_cl,
        t_n: params.integral_ratio() * t_cl,
    }
}

/// Anti-windup override of the integrator rate.
///
/// When `u_raw` already sits at or beyond a limit and `du` pushes it further
/// out, the rate is replaced by a fast pull back onto that limit with time
/// constant `t_cl / 20` (configured `t_cl`). Any other rate passes through,
/// so recovery from saturation is never blocked.
pub fn anti_windup(params: &PiLoopParams, u_raw: f64, du: f64) -> f64 {
    let limits = params.limits();
    let t_lim = params.t_lim();
    if du < 0.0 && u_raw <= limits.min() {
        (limits.min() - u_raw) / t_lim
    } else if du > 0.0 && u_raw >= limits.max() {
        (limits.max() - u_raw) / t_lim
    } else {
        du
    }
}

/// Every intermediate quantity of one derivative evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopEvaluation {
    /// Setpoint at the evaluation time.
    pub setpoint: f64,
    /// Load at the evaluation time.
    pub load: f64,
    /// Clamped controller output.
    pub u: f64,
    /// Actuator command `clamp((sp - x) / t_cl + u)`, before the load.
    pub command: f64,
    /// Time constants in effect.
    pub time_constants: EffectiveTimeConstants,
    /// Whether the anti-windup override replaced the integrator rate.
    pub anti_windup_active: bool,
    /// `(dx/dt, du_raw/dt, dr/dt)`.
    pub derivative: LoopState,
}

/// Evaluate the loop at time `t` and keep the intermediate quantities.
pub fn evaluate<S, L>(
    t: f64,
    state: &LoopState,
    params: &PiLoopParams,
    setpoint: &S,
    load: &L,
) -> LoopEvaluation
where
    S: TimeSignal + ?Sized,
    L: TimeSignal + ?Sized,
{
    let LoopState { x, u_raw, r } = *state;
    let sp = setpoint.value_at(t);
    let ul = load.value_at(t);

    let u = params.limits().clamp(u_raw);
    let tc = effective_time_constants(params, sp, x, u);

    // Actuator limit applies to the command, the load acts downstream of it
    let command = params.limits().clamp((sp - x) / tc.t_cl + u);
    let dx = (command - ul) / params.c_p();

    let error = if params.use_ref() { r - x } else { sp - x };
    let du_integral = error / (tc.t_cl * tc.t_n);
    let du = anti_windup(params, u_raw, du_integral);

    let dr = (sp - r) / tc.t_cl;

    LoopEvaluation {
        setpoint: sp,
        load: ul,
        u,
        command,
        time_constants: tc,
        anti_windup_active: du != du_integral,
        derivative: LoopState {
            x: dx,
            u_raw: du,
            r: dr,
        },
    }
}

/// `(dx/dt, du_raw/dt, dr/dt)` at time `t`.
pub fn derivative<S, L>(
    t: f64,
    state: &LoopState,
    params: &PiLoopParams,
    setpoint: &S,
    load: &L,
) -> LoopState
where
    S: TimeSignal + ?Sized,
    L: TimeSignal + ?Sized,
{
    evaluate(t, state, params, setpoint, load).derivative
}
