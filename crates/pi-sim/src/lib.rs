//! Transient simulation of the PI control loop.
//!
//! Provides:
//! - `TransientModel` trait for pluggable dynamic systems
//! - Adaptive Dormand-Prince 5(4) through `ode_solvers`, plus fixed-step RK4 and forward Euler
//! - `ControlLoopModel`, the PI loop as a transient model
//! - `run_sim` for uniformly sampled integration of any model
//! - `Simulator`, a single-use unsolved/solved driver producing a `Trajectory`

pub mod error;
pub mod integrator;
pub mod loop_model;
pub mod model;
pub mod ode;
pub mod sim;
pub mod simulator;
pub mod trajectory;

/// Integrator build tag, `pi-sim/<crate version>`.
pub const SOLVER_VERSION: &str = concat!("pi-sim/", env!("CARGO_PKG_VERSION"));

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use loop_model::{ControlLoopModel, LoopVector};
pub use model::TransientModel;
pub use ode::dopri5_samples;
pub use sim::{IntegrationStats, IntegratorType, SimOptions, SimRecord, run_sim};
pub use simulator::Simulator;
pub use trajectory::{Trajectory, TrajectorySample};
