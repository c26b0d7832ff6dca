//! Error types for control loop configuration.

use thiserror::Error;

/// Result type for control loop operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while configuring a control loop or its input signals.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Malformed time signal definition (unsorted or empty tables, NaN values).
    #[error("Invalid signal: {what}")]
    InvalidSignal { what: String },
}
