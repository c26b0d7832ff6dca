//! PI loop configuration.
//!
//! Provides:
//! - **ActuatorLimits**: the saturation interval `[min, max]` of the applied output
//! - **PiLoopParams**: process gain, closed-loop and integral time constants,
//!   limits and behavioral flags
//!
//! Both are validated at construction and never change during a run.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

fn require_positive(value: f64, what: &'static str) -> ControlResult<f64> {
    pi_core::ensure_positive(value, what).map_err(|_| ControlError::InvalidArg { what })
}

/// Saturation interval of the actuator.
///
/// Always satisfies finite `min < max`; deserialization goes through the
/// same check as [`ActuatorLimits::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LimitsFields")]
pub struct ActuatorLimits {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct LimitsFields {
    min: f64,
    max: f64,
}

impl TryFrom<LimitsFields> for ActuatorLimits {
    type Error = ControlError;

    fn try_from(fields: LimitsFields) -> ControlResult<Self> {
        Self::new(fields.min, fields.max)
    }
}

impl ActuatorLimits {
    /// Create a limit pair; requires finite `min < max`.
    pub fn new(min: f64, max: f64) -> ControlResult<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "u_min and u_max must be finite",
            });
        }
        if min >= max {
            return Err(ControlError::InvalidArg {
                what: "u_min must be less than u_max",
            });
        }
        Ok(Self { min, max })
    }

    /// Lowest output the actuator can apply.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Highest output the actuator can apply.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Restrict `value` to `[min, max]`.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Distance by which `value` lies outside the interval (0 inside).
    pub fn excess(&self, value: f64) -> f64 {
        if value > self.max {
            value - self.max
        } else if value < self.min {
            self.min - value
        } else {
            0.0
        }
    }
}

impl Default for ActuatorLimits {
    fn default() -> Self {
        Self {
            min: -1.0,
            max: 1.0,
        }
    }
}

/// PI loop configuration.
///
/// Immutable once built: gains and time constants are positive and finite,
/// and the limits are ordered. Only the behavioral flags can be changed, by
/// the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParamsFields")]
pub struct PiLoopParams {
    c_p: f64,
    t_cl: f64,
    t_n: f64,
    limits: ActuatorLimits,
    use_ref: bool,
    adapt_t: bool,
}

#[derive(Deserialize)]
struct ParamsFields {
    c_p: f64,
    t_cl: f64,
    t_n: f64,
    limits: ActuatorLimits,
    #[serde(default)]
    use_ref: bool,
    #[serde(default)]
    adapt_t: bool,
}

impl TryFrom<ParamsFields> for PiLoopParams {
    type Error = ControlError;

    fn try_from(fields: ParamsFields) -> ControlResult<Self> {
        Ok(Self::new(fields.c_p, fields.t_cl, fields.t_n, fields.limits)?
            .with_reference_trajectory(fields.use_ref)
            .with_adaptive_time_constants(fields.adapt_t))
    }
}

impl PiLoopParams {
    /// Create a new PI loop configuration with both flags off.
    ///
    /// # Arguments
    ///
    /// * `c_p` - Process gain (must be positive)
    /// * `t_cl` - Closed-loop time constant in seconds (must be positive)
    /// * `t_n` - Integral time constant in seconds (must be positive)
    /// * `limits` - Actuator saturation interval
    pub fn new(c_p: f64, t_cl: f64, t_n: f64, limits: ActuatorLimits) -> ControlResult<Self> {
        Ok(Self {
            c_p: require_positive(c_p, "c_p must be positive and finite")?,
            t_cl: require_positive(t_cl, "t_cl must be positive and finite")?,
            t_n: require_positive(t_n, "t_n must be positive and finite")?,
            limits,
            use_ref: false,
            adapt_t: false,
        })
    }

    /// Select reference-trajectory integral error.
    pub fn with_reference_trajectory(mut self, use_ref: bool) -> Self {
        self.use_ref = use_ref;
        self
    }

    /// Enable adaptive re-tuning of `t_cl`/`t_n`.
    pub fn with_adaptive_time_constants(mut self, adapt_t: bool) -> Self {
        self.adapt_t = adapt_t;
        self
    }

    /// Process gain (inertia) dividing the net applied input.
    #[inline]
    pub fn c_p(&self) -> f64 {
        self.c_p
    }

    /// Target closed-loop time constant (seconds).
    #[inline]
    pub fn t_cl(&self) -> f64 {
        self.t_cl
    }

    /// Integral (load estimation) time constant (seconds).
    #[inline]
    pub fn t_n(&self) -> f64 {
        self.t_n
    }

    #[inline]
    pub fn limits(&self) -> &ActuatorLimits {
        &self.limits
    }

    /// Integrate the error against the reference trajectory `r` instead of the setpoint.
    #[inline]
    pub fn use_ref(&self) -> bool {
        self.use_ref
    }

    /// Slow the loop down when the remaining actuator headroom cannot deliver `t_cl`.
    #[inline]
    pub fn adapt_t(&self) -> bool {
        self.adapt_t
    }

    /// Time constant of the anti-windup correction, `t_cl / 20`.
    #[inline]
    pub fn t_lim(&self) -> f64 {
        self.t_cl / crate::dynamics::ANTI_WINDUP_DIVISOR
    }

    /// Ratio `t_n / t_cl` preserved by adaptive re-tuning.
    #[inline]
    pub fn integral_ratio(&self) -> f64 {
        self.t_n / self.t_cl
    }
}

impl Default for PiLoopParams {
    fn default() -> Self {
        Self {
            c_p: 1.0,
            t_cl: 0.5,
            t_n: 1.5,
            limits: ActuatorLimits::default(),
            use_ref: false,
            adapt_t: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_creation() {
        let params = PiLoopParams::new(1.0, 0.5, 1.5, ActuatorLimits::new(-1.0, 1.0).unwrap())
            .unwrap();
        assert_eq!(params.c_p(), 1.0);
        assert_eq!(params.t_cl(), 0.5);
        assert_eq!(params.t_n(), 1.5);
        assert!(!params.use_ref());
        assert!(!params.adapt_t());
        assert_eq!(params, PiLoopParams::default());
    }

    #[test]
    fn builder_flags() {
        let params = PiLoopParams::default()
            .with_reference_trajectory(true)
            .with_adaptive_time_constants(true);
        assert!(params.use_ref());
        assert!(params.adapt_t());
    }

    #[test]
    fn invalid_params() {
        let limits = ActuatorLimits::default();
        assert!(PiLoopParams::new(0.0, 0.5, 1.5, limits).is_err());
        assert!(PiLoopParams::new(1.0, -0.5, 1.5, limits).is_err());
        assert!(PiLoopParams::new(1.0, 0.5, 0.0, limits).is_err());
        assert!(PiLoopParams::new(f64::NAN, 0.5, 1.5, limits).is_err());
    }

    #[test]
    fn invalid_limits() {
        assert!(ActuatorLimits::new(1.0, 1.0).is_err());
        assert!(ActuatorLimits::new(1.0, -1.0).is_err());
        assert!(ActuatorLimits::new(f64::NEG_INFINITY, 1.0).is_err());
        assert!(ActuatorLimits::new(f64::NAN, 1.0).is_err());
        assert_eq!(
            ActuatorLimits::new(2.0, 1.0),
            Err(ControlError::InvalidArg {
                what: "u_min must be less than u_max"
            })
        );
    }

    #[test]
    fn deserialize_validates() {
        let limits: ActuatorLimits = serde_json::from_str(r#"{"min":-2.0,"max":3.0}"#).unwrap();
        assert_eq!((limits.min(), limits.max()), (-2.0, 3.0));
        assert!(serde_json::from_str::<ActuatorLimits>(r#"{"min":1.0,"max":-1.0}"#).is_err());

        let params: PiLoopParams = serde_json::from_str(
            r#"{"c_p":2.0,"t_cl":0.5,"t_n":1.5,"limits":{"min":-1.0,"max":1.0},"use_ref":true}"#,
        )
        .unwrap();
        assert_eq!(params.c_p(), 2.0);
        assert!(params.use_ref());
        assert!(!params.adapt_t());

        let inverted_limits =
            r#"{"c_p":1.0,"t_cl":0.5,"t_n":1.5,"limits":{"min":1.0,"max":-1.0}}"#;
        assert!(serde_json::from_str::<PiLoopParams>(inverted_limits).is_err());
        let zero_gain = r#"{"c_p":0.0,"t_cl":0.5,"t_n":1.5,"limits":{"min":-1.0,"max":1.0}}"#;
        assert!(serde_json::from_str::<PiLoopParams>(zero_gain).is_err());
    }

    #[test]
    fn serialize_round_trips_through_validation() {
        let params = PiLoopParams::default().with_adaptive_time_constants(true);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(serde_json::from_str::<PiLoopParams>(&json).unwrap(), params);
    }

    #[test]
    fn limits_clamp_and_excess() {
        let limits = ActuatorLimits::new(-1.0, 1.0).unwrap();
        assert_eq!(limits.clamp(2.5), 1.0);
        assert_eq!(limits.clamp(-3.0), -1.0);
        assert_eq!(limits.clamp(0.25), 0.25);
        assert!(limits.contains(1.0));
        assert!(!limits.contains(1.0 + 1e-12));
        assert!((limits.excess(1.5) - 0.5).abs() < 1e-12);
        assert!((limits.excess(-1.25) - 0.25).abs() < 1e-12);
        assert_eq!(limits.excess(0.0), 0.0);
    }

    #[test]
    fn anti_windup_time_constant() {
        let params = PiLoopParams::default();
        assert!((params.t_lim() - 0.025).abs() < 1e-15);
        assert!((params.integral_ratio() - 3.0).abs() < 1e-12);
    }
}
