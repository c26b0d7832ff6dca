//! Error types for the pi-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Project(String),

    #[error("Failed to write scenario file: {path}")]
    ScenarioFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Model compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pi-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<pi_project::ProjectError> for AppError {
    fn from(err: pi_project::ProjectError) -> Self {
        match err {
            pi_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<pi_project::ValidationError> for AppError {
    fn from(err: pi_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<pi_controls::ControlError> for AppError {
    fn from(err: pi_controls::ControlError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<pi_sim::SimError> for AppError {
    fn from(err: pi_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<pi_results::ResultsError> for AppError {
    fn from(err: pi_results::ResultsError) -> Self {
        match err {
            pi_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
