//! Scenario compilation: schema definitions to a runnable loop model.

use pi_controls::{
    ActuatorLimits, Constant, LoopState, PiLoopParams, PiecewiseConstant, PiecewiseLinear,
    SignalSource, Step,
};
use pi_core::Tolerances;
use pi_project::schema::{ParamsDef, Scenario, SignalDef, SolverMethodDef};
use pi_sim::{ControlLoopModel, IntegratorType, SimOptions};

use crate::error::{AppError, AppResult};

/// Model type produced from scenario files.
pub type ScenarioModel = ControlLoopModel<SignalSource, SignalSource>;

pub fn compile_signal(def: &SignalDef) -> AppResult<SignalSource> {
    let source = match def {
        SignalDef::Constant { value } => SignalSource::Constant(Constant(*value)),
        SignalDef::Step {
            at_s,
            before,
            after,
        } => SignalSource::Step(Step {
            at: *at_s,
            before: *before,
            after: *after,
        }),
        SignalDef::Schedule { initial, events } => SignalSource::Schedule(PiecewiseConstant::new(
            *initial,
            events.iter().map(|e| (e.time_s, e.value)).collect(),
        )?),
        SignalDef::Table { points } => SignalSource::Table(PiecewiseLinear::new(
            points.iter().map(|p| (p[0], p[1])).collect(),
        )?),
    };
    Ok(source)
}

pub fn compile_params(def: &ParamsDef) -> AppResult<PiLoopParams> {
    let limits = ActuatorLimits::new(def.u_min, def.u_max)?;
    let params = PiLoopParams::new(def.c_p, def.t_cl, def.t_n, limits)?
        .with_reference_trajectory(def.use_ref)
        .with_adaptive_time_constants(def.adapt_t);
    Ok(params)
}

pub fn compile_options(scenario: &Scenario) -> AppResult<SimOptions> {
    let solver = &scenario.solver;
    let tolerances = Tolerances::new(solver.atol, solver.rtol)
        .map_err(|e| AppError::Compile(format!("solver tolerances: {}", e)))?;
    let integrator = match solver.method {
        SolverMethodDef::Dopri5 => IntegratorType::Dopri5,
        SolverMethodDef::Rk4 => IntegratorType::RK4,
        SolverMethodDef::ForwardEuler => IntegratorType::ForwardEuler,
    };
    let opts = SimOptions {
        integrator,
        tolerances,
        dt: solver.dt_s,
        max_steps: solver.max_steps,
        ..SimOptions::with_horizon(scenario.horizon.t_end_s, scenario.horizon.samples)
    };
    opts.validate()?;
    Ok(opts)
}

/// Build the loop model and simulation options described by `scenario`.
pub fn compile_scenario(scenario: &Scenario) -> AppResult<(ScenarioModel, SimOptions)> {
    pi_project::validate_scenario(scenario)?;

    let params = compile_params(&scenario.params)?;
    let initial = LoopState::new(
        scenario.initial.x,
        scenario.initial.u_raw,
        scenario.initial.r,
    );
    let setpoint = compile_signal(&scenario.setpoint)?;
    let load = compile_signal(&scenario.load)?;

    let model = ControlLoopModel::new(params, initial, setpoint, load)?;
    Ok((model, compile_options(scenario)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pi_controls::TimeSignal;
    use pi_project::schema::SignalEventDef;

    #[test]
    fn compile_step_response() {
        let (model, opts) = compile_scenario(&Scenario::step_response()).unwrap();
        assert_eq!(model.params(), &PiLoopParams::default());
        assert_eq!(model.initial(), LoopState::default());
        assert_eq!(model.setpoint_at(1.9), 0.0);
        assert_eq!(model.setpoint_at(2.0), 1.0);
        assert_eq!(model.load_at(10.0), 0.5);
        assert_eq!(opts.t_end, 20.0);
        assert_eq!(opts.samples, 1000);
        assert_eq!(opts.integrator, IntegratorType::Dopri5);
        assert_eq!(opts.tolerances.rel, 1e-6);
        assert_eq!(opts.tolerances.abs, 1e-9);
    }

    #[test]
    fn compile_signals() {
        let sched = compile_signal(&SignalDef::Schedule {
            initial: 0.5,
            events: vec![SignalEventDef {
                time_s: 1.0,
                value: 2.0,
            }],
        })
        .unwrap();
        assert_eq!(sched.value_at(0.0), 0.5);
        assert_eq!(sched.value_at(1.0), 2.0);

        let table = compile_signal(&SignalDef::Table {
            points: vec![[0.0, 0.0], [2.0, 1.0]],
        })
        .unwrap();
        assert!((table.value_at(1.0) - 0.5).abs() < 1e-12);

        assert!(compile_signal(&SignalDef::Table { points: vec![] }).is_err());
    }

    #[test]
    fn compile_flags_and_method() {
        let mut scenario = Scenario::new("flags");
        scenario.params.use_ref = true;
        scenario.params.adapt_t = true;
        scenario.solver.method = SolverMethodDef::ForwardEuler;
        let (model, opts) = compile_scenario(&scenario).unwrap();
        assert!(model.params().use_ref());
        assert!(model.params().adapt_t());
        assert_eq!(opts.integrator, IntegratorType::ForwardEuler);
    }

    #[test]
    fn invalid_scenario_does_not_compile() {
        let mut scenario = Scenario::new("bad");
        scenario.params.u_max = -2.0;
        assert!(matches!(
            compile_scenario(&scenario),
            Err(AppError::Validation(_))
        ));
    }
}
