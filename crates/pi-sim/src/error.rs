//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition at t = {t}: {what}")]
    NonPhysical { what: &'static str, t: f64 },

    #[error("Integration did not converge at t = {t}: {what}")]
    ConvergenceFailed { what: &'static str, t: f64 },

    #[error("System not solved yet; call solve() first")]
    NotSolved,

    #[error("System already solved; build a fresh model to run again")]
    AlreadySolved,
}

pub type SimResult<T> = Result<T, SimError>;
