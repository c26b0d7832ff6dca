//! Fixed-step time integrators.
//!
//! The adaptive method lives in [`crate::ode`].

use crate::error::SimResult;
use crate::model::TransientModel;
use ode_solvers::SVector;

/// Trait for fixed-step time integrators.
pub trait Integrator {
    /// Right-hand side evaluations per step.
    const STAGES: usize;

    /// Advance state by one time step using the transient model.
    fn step<M: TransientModel<N>, const N: usize>(
        &self,
        model: &M,
        t: f64,
        x: &SVector<f64, N>,
        dt: f64,
    ) -> SimResult<SVector<f64, N>>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    const STAGES: usize = 4;

    fn step<M: TransientModel<N>, const N: usize>(
        &self,
        model: &M,
        t: f64,
        x: &SVector<f64, N>,
        dt: f64,
    ) -> SimResult<SVector<f64, N>> {
        let k1 = model.rhs(t, x)?;
        let k2 = model.rhs(t + 0.5 * dt, &(x + k1 * (0.5 * dt)))?;
        let k3 = model.rhs(t + 0.5 * dt, &(x + k2 * (0.5 * dt)))?;
        let k4 = model.rhs(t + dt, &(x + k3 * dt))?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        Ok(x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
    }
}

/// Forward Euler (explicit, 1st order, fast for testing).
/// Calls rhs() once per step instead of 4 times (RK4).
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    const STAGES: usize = 1;

    fn step<M: TransientModel<N>, const N: usize>(
        &self,
        model: &M,
        t: f64,
        x: &SVector<f64, N>,
        dt: f64,
    ) -> SimResult<SVector<f64, N>> {
        let xdot = model.rhs(t, x)?;
        Ok(x + xdot * dt)
    }
}
