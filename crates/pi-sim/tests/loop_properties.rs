//! Integration test: trajectory-level properties of the PI loop.

use pi_controls::{ActuatorLimits, Constant, LoopState, PiLoopParams, Step};
use pi_sim::{ControlLoopModel, SimError, SimOptions, Simulator};

#[test]
fn zero_state_stays_at_rest() {
    let params = PiLoopParams::default()
        .with_reference_trajectory(true)
        .with_adaptive_time_constants(true);
    let model =
        ControlLoopModel::new(params, LoopState::default(), Constant(0.0), Constant(0.0)).unwrap();
    let mut sim = Simulator::new(model, SimOptions::with_horizon(10.0, 101));
    let traj = sim.solve().unwrap();

    assert!(traj.x().iter().all(|&v| v == 0.0));
    assert!(traj.u_raw().iter().all(|&v| v == 0.0));
    assert!(traj.r().iter().all(|&v| v == 0.0));
}

#[test]
fn windup_is_bounded_while_saturated() {
    // Setpoint far beyond what the actuator can deliver quickly
    let params = PiLoopParams::default();
    let model = ControlLoopModel::new(
        params.clone(),
        LoopState::default(),
        Step::new(0.5, 5.0),
        Constant(0.0),
    )
    .unwrap();
    let mut sim = Simulator::new(model, SimOptions::with_horizon(4.0, 401));
    let traj = sim.solve().unwrap();

    let u_max = params.limits().max();
    let u_raw = traj.u_raw();
    for w in u_raw.windows(2) {
        if w[0] > u_max {
            assert!(w[1] <= w[0] + 1e-6, "u_raw grew above u_max: {} -> {}", w[0], w[1]);
        }
    }
    let peak = u_raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(peak < u_max + 0.01, "u_raw peak = {peak}");

    // Saturated actuator drives x at full rate: dx/dt = u_max / c_p
    let last = traj.final_sample().unwrap();
    assert!((last.x - 3.5).abs() < 0.05, "x(4) = {}", last.x);
}

#[test]
fn negative_windup_is_bounded() {
    let params = PiLoopParams::new(2.0, 0.4, 1.0, ActuatorLimits::new(-0.5, 2.0).unwrap()).unwrap();
    let model = ControlLoopModel::new(
        params.clone(),
        LoopState::default(),
        Constant(-4.0),
        Constant(0.0),
    )
    .unwrap();
    let mut sim = Simulator::new(model, SimOptions::with_horizon(3.0, 301));
    let traj = sim.solve().unwrap();

    let u_min = params.limits().min();
    for w in traj.u_raw().windows(2) {
        if w[0] < u_min {
            assert!(w[1] >= w[0] - 1e-6, "u_raw fell below u_min: {} -> {}", w[0], w[1]);
        }
    }
    let trough = traj.u_raw().iter().cloned().fold(f64::INFINITY, f64::min);
    assert!(trough > u_min - 0.01, "u_raw trough = {trough}");
}

#[test]
fn step_budget_failure_returns_no_trajectory() {
    let model = ControlLoopModel::new(
        PiLoopParams::default(),
        LoopState::default(),
        Constant(1.0),
        Constant(0.0),
    )
    .unwrap();
    let opts = SimOptions {
        max_steps: 20,
        ..SimOptions::default()
    };
    let mut sim = Simulator::new(model, opts);
    match sim.solve() {
        Err(SimError::ConvergenceFailed { t, .. }) => assert!(t > 0.0 && t < 20.0),
        other => panic!("expected convergence failure, got {other:?}"),
    }
    assert_eq!(sim.results().err(), Some(SimError::NotSolved));
}
