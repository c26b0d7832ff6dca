//! Adaptive Dormand-Prince 5(4) integration through `ode_solvers`.

use std::{cell::RefCell, rc::Rc};

use ode_solvers::{SVector, System, dop_shared::IntegrationError};
use pi_core::Tolerances;

use crate::error::{SimError, SimResult};
use crate::model::{TransientModel, all_finite};
use crate::sim::IntegrationStats;

/// Solver progress shared between [`OdeSystem`] and [`dopri5_samples`].
#[derive(Debug, Default)]
struct Progress {
    /// Time of the last accepted step.
    t: f64,
    accepted: usize,
    failure: Option<SimError>,
}

/// Adapts a [`TransientModel`] into an `ode_solvers` system.
struct OdeSystem<'a, M, const N: usize> {
    model: &'a M,
    max_steps: usize,
    progress: Rc<RefCell<Progress>>,
}

impl<M: TransientModel<N>, const N: usize> System<f64, SVector<f64, N>> for OdeSystem<'_, M, N> {
    fn system(&self, t: f64, y: &SVector<f64, N>, dy: &mut SVector<f64, N>) {
        match self.model.rhs(t, y) {
            Ok(derivative) => *dy = derivative,
            Err(e) => {
                let mut progress = self.progress.borrow_mut();
                if progress.failure.is_none() {
                    progress.failure = Some(e);
                }
                *dy = SVector::from_element(f64::NAN);
            }
        }
    }

    fn solout(&mut self, t: f64, y: &SVector<f64, N>, _dy: &SVector<f64, N>) -> bool {
        let mut progress = self.progress.borrow_mut();
        progress.t = t;
        progress.accepted += 1;
        if progress.failure.is_none() {
            if !all_finite(y) {
                progress.failure = Some(SimError::ConvergenceFailed {
                    what: "state became non-finite",
                    t,
                });
            } else if progress.accepted > self.max_steps {
                progress.failure = Some(SimError::ConvergenceFailed {
                    what: "step budget exhausted",
                    t,
                });
            }
        }
        // Stop integration once anything has failed.
        progress.failure.is_some()
    }
}

fn convergence_failure(err: &IntegrationError, t: f64) -> SimError {
    let what = match err {
        IntegrationError::MaxNumStepReached { .. } => "solver step limit reached",
        IntegrationError::StepSizeUnderflow { .. } => "step size underflow",
        IntegrationError::StiffnessDetected { .. } => "problem became stiff",
    };
    SimError::ConvergenceFailed { what, t }
}

/// Integrate `model` from `y0` with Dormand-Prince 5(4) and return the state
/// at every time in `t_record`.
///
/// `t_record` must hold at least two uniformly spaced times. States between
/// accepted steps come from the solver's dense output.
pub fn dopri5_samples<M: TransientModel<N>, const N: usize>(
    model: &M,
    y0: SVector<f64, N>,
    t_record: &[f64],
    tolerances: Tolerances,
    max_steps: usize,
    stats: &mut IntegrationStats,
) -> SimResult<Vec<SVector<f64, N>>> {
    let (t0, t1) = match t_record {
        [first, .., last] => (*first, *last),
        _ => {
            return Err(SimError::InvalidArg {
                what: "at least two sample times are required",
            });
        }
    };
    let dx = (t1 - t0) / (t_record.len() - 1) as f64;

    let progress = Rc::new(RefCell::new(Progress {
        t: t0,
        ..Progress::default()
    }));
    let system = OdeSystem {
        model,
        max_steps,
        progress: Rc::clone(&progress),
    };

    // The dense-output grid is accumulated by repeated addition; running half
    // a sample past the end keeps rounding from dropping the last sample.
    let mut stepper = ode_solvers::Dopri5::new(
        system,
        t0,
        t1 + 0.5 * dx,
        dx,
        y0,
        tolerances.rel,
        tolerances.abs,
    );
    let result = stepper.integrate();

    let mut progress = progress.borrow_mut();
    if let Some(err) = progress.failure.take() {
        return Err(err);
    }
    let solver_stats = result.map_err(|e| convergence_failure(&e, progress.t))?;
    stats.rhs_calls += solver_stats.num_eval as usize;
    stats.accepted_steps += solver_stats.accepted_steps as usize;
    stats.rejected_steps += solver_stats.rejected_steps as usize;

    let (x_out, y_out) = (stepper.x_out(), stepper.y_out());
    let mut states = Vec::with_capacity(t_record.len());
    let mut j = 0;
    for &t in t_record {
        while x_out.get(j).is_some_and(|&x| x < t - 0.5 * dx) {
            j += 1;
        }
        match (x_out.get(j), y_out.get(j)) {
            (Some(&x), Some(y)) if (x - t).abs() <= 0.25 * dx => states.push(*y),
            _ => {
                return Err(SimError::ConvergenceFailed {
                    what: "dense output does not cover the sample time",
                    t,
                });
            }
        }
    }
    Ok(states)
}
