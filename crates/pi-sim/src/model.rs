//! TransientModel trait for pluggable dynamic systems.

use crate::error::SimResult;
use ode_solvers::SVector;

/// Trait for transient (dynamic) system models with `N` state variables.
///
/// A TransientModel must implement:
/// - Initial state
/// - RHS (right-hand side) computation: x_dot = f(t, x)
pub trait TransientModel<const N: usize> {
    /// Return the initial state at t=0.
    fn initial_state(&self) -> SVector<f64, N>;

    /// Compute state derivative dxdt = f(t, x).
    ///
    /// Must be free of side effects: adaptive integrators evaluate it at
    /// trial points that may later be rejected.
    fn rhs(&self, t: f64, x: &SVector<f64, N>) -> SimResult<SVector<f64, N>>;
}

/// True when every component of `x` is finite.
pub fn all_finite<const N: usize>(x: &SVector<f64, N>) -> bool {
    x.iter().all(|v| v.is_finite())
}
