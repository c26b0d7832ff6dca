//! Scenario validation logic.

use crate::schema::{SCENARIO_VERSION, Scenario, SignalDef};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid signal '{field}': {reason}")]
    InvalidSignal { field: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    pi_core::ensure_positive(value, "value")
        .map(|_| ())
        .map_err(|_| invalid(field, value, "must be positive and finite"))
}

fn require_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    pi_core::ensure_finite(value, "value")
        .map(|_| ())
        .map_err(|_| invalid(field, value, "must be finite"))
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version != SCENARIO_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "''", "must not be empty"));
    }

    let p = &scenario.params;
    require_positive("params.c_p", p.c_p)?;
    require_positive("params.t_cl", p.t_cl)?;
    require_positive("params.t_n", p.t_n)?;
    require_finite("params.u_min", p.u_min)?;
    require_finite("params.u_max", p.u_max)?;
    if p.u_min >= p.u_max {
        return Err(invalid(
            "params.u_min",
            p.u_min,
            "must be less than params.u_max",
        ));
    }

    let init = &scenario.initial;
    require_finite("initial.x", init.x)?;
    require_finite("initial.u_raw", init.u_raw)?;
    require_finite("initial.r", init.r)?;

    validate_signal("setpoint", &scenario.setpoint)?;
    validate_signal("load", &scenario.load)?;

    require_positive("horizon.t_end_s", scenario.horizon.t_end_s)?;
    if scenario.horizon.samples < 2 {
        return Err(invalid(
            "horizon.samples",
            scenario.horizon.samples,
            "at least 2 samples are required",
        ));
    }

    let solver = &scenario.solver;
    for (field, tol) in [("solver.rtol", solver.rtol), ("solver.atol", solver.atol)] {
        if !tol.is_finite() || tol < 0.0 {
            return Err(invalid(field, tol, "must be non-negative and finite"));
        }
    }
    if solver.rtol == 0.0 && solver.atol == 0.0 {
        return Err(invalid(
            "solver.rtol",
            solver.rtol,
            "rtol and atol cannot both be zero",
        ));
    }
    require_positive("solver.dt_s", solver.dt_s)?;
    if solver.max_steps == 0 {
        return Err(invalid("solver.max_steps", 0, "must be positive"));
    }

    Ok(())
}

fn validate_signal(field: &str, signal: &SignalDef) -> Result<(), ValidationError> {
    let fail = |reason: String| ValidationError::InvalidSignal {
        field: field.to_string(),
        reason,
    };

    let (initial, times, values): (Option<f64>, Vec<f64>, Vec<f64>) = match signal {
        SignalDef::Constant { value } => (Some(*value), vec![], vec![]),
        SignalDef::Step { at_s, before, after } => (Some(*before), vec![*at_s], vec![*after]),
        SignalDef::Schedule { initial, events } => (
            Some(*initial),
            events.iter().map(|e| e.time_s).collect(),
            events.iter().map(|e| e.value).collect(),
        ),
        SignalDef::Table { points } => {
            if points.is_empty() {
                return Err(fail("table needs at least one point".to_string()));
            }
            (
                None,
                points.iter().map(|p| p[0]).collect(),
                points.iter().map(|p| p[1]).collect(),
            )
        }
    };

    if let Some(v) = initial
        && !v.is_finite()
    {
        return Err(fail(format!("value {v} is not finite")));
    }
    for (i, v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(fail(format!("value at index {i} is not finite")));
        }
    }
    for (i, t) in times.iter().enumerate() {
        if !t.is_finite() {
            return Err(fail(format!("time at index {i} is not finite")));
        }
        if i > 0 && *t < times[i - 1] {
            return Err(fail(format!("times must be non-decreasing (index {i})")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SignalEventDef;

    #[test]
    fn builtin_scenarios_are_valid() {
        validate_scenario(&Scenario::new("default")).unwrap();
        validate_scenario(&Scenario::step_response()).unwrap();
        validate_scenario(&Scenario::integral_demo()).unwrap();
    }

    #[test]
    fn rejects_bad_params() {
        let mut s = Scenario::step_response();
        s.params.t_cl = 0.0;
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::InvalidValue { field, .. }) if field == "params.t_cl"
        ));

        let mut s = Scenario::step_response();
        s.params.u_min = 1.0;
        assert!(validate_scenario(&s).is_err());

        let mut s = Scenario::step_response();
        s.initial.u_raw = f64::NAN;
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn rejects_bad_horizon_and_solver() {
        let mut s = Scenario::new("h");
        s.horizon.samples = 1;
        assert!(validate_scenario(&s).is_err());

        let mut s = Scenario::new("tol");
        s.solver.rtol = 0.0;
        s.solver.atol = 0.0;
        assert!(validate_scenario(&s).is_err());

        let mut s = Scenario::new("dt");
        s.solver.dt_s = -1.0;
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn rejects_bad_signals() {
        let mut s = Scenario::new("sched");
        s.setpoint = SignalDef::Schedule {
            initial: 0.0,
            events: vec![
                SignalEventDef {
                    time_s: 3.0,
                    value: 1.0,
                },
                SignalEventDef {
                    time_s: 1.0,
                    value: 2.0,
                },
            ],
        };
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::InvalidSignal { field, .. }) if field == "setpoint"
        ));

        let mut s = Scenario::new("table");
        s.load = SignalDef::Table { points: vec![] };
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut s = Scenario::new("v");
        s.version = 7;
        assert_eq!(
            validate_scenario(&s),
            Err(ValidationError::UnsupportedVersion { version: 7 })
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn positive_params_with_ordered_limits_validate(
                c_p in 1e-3f64..1e3,
                t_cl in 1e-3f64..1e2,
                t_n in 1e-3f64..1e2,
                u_min in -1e3f64..1e3,
                width in 1e-6f64..1e3,
            ) {
                let mut s = Scenario::new("prop");
                s.params.c_p = c_p;
                s.params.t_cl = t_cl;
                s.params.t_n = t_n;
                s.params.u_min = u_min;
                s.params.u_max = u_min + width;
                prop_assert!(validate_scenario(&s).is_ok());
            }

            #[test]
            fn non_positive_time_constant_is_rejected(t_cl in -1e3f64..=0.0) {
                let mut s = Scenario::new("prop");
                s.params.t_cl = t_cl;
                prop_assert!(validate_scenario(&s).is_err());
            }
        }
    }
}
