//! The PI control loop as a [`TransientModel`].

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use ode_solvers::SVector;
use pi_controls::{LoopEvaluation, LoopState, PiLoopParams, TimeSignal, evaluate};

/// Integrator state `[x, u_raw, r]`.
pub type LoopVector = SVector<f64, 3>;

fn to_vector(state: LoopState) -> LoopVector {
    LoopVector::from(state.to_array())
}

fn to_state(v: &LoopVector) -> LoopState {
    LoopState::new(v[0], v[1], v[2])
}

/// Three-state PI loop driven by a setpoint and a load signal.
#[derive(Debug, Clone)]
pub struct ControlLoopModel<S, L> {
    params: PiLoopParams,
    initial: LoopState,
    setpoint: S,
    load: L,
}

impl<S, L> ControlLoopModel<S, L>
where
    S: TimeSignal,
    L: TimeSignal,
{
    /// Build a model; the initial state must be finite.
    pub fn new(params: PiLoopParams, initial: LoopState, setpoint: S, load: L) -> SimResult<Self> {
        if !initial.is_finite() {
            return Err(SimError::InvalidArg {
                what: "initial state must be finite",
            });
        }
        Ok(Self {
            params,
            initial,
            setpoint,
            load,
        })
    }

    pub fn params(&self) -> &PiLoopParams {
        &self.params
    }

    pub fn initial(&self) -> LoopState {
        self.initial
    }

    pub fn setpoint_at(&self, t: f64) -> f64 {
        self.setpoint.value_at(t)
    }

    pub fn load_at(&self, t: f64) -> f64 {
        self.load.value_at(t)
    }

    /// Full evaluation of the loop equations at `(t, state)`.
    pub fn evaluate(&self, t: f64, state: &LoopState) -> LoopEvaluation {
        evaluate(t, state, &self.params, &self.setpoint, &self.load)
    }
}

impl<S, L> TransientModel<3> for ControlLoopModel<S, L>
where
    S: TimeSignal,
    L: TimeSignal,
{
    fn initial_state(&self) -> LoopVector {
        to_vector(self.initial)
    }

    fn rhs(&self, t: f64, x: &LoopVector) -> SimResult<LoopVector> {
        let eval = self.evaluate(t, &to_state(x));
        Ok(to_vector(eval.derivative))
    }
}
