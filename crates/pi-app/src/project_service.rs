//! Scenario loading, saving and validation.

use std::path::Path;

use pi_project::schema::Scenario;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Load and validate a scenario file (`.yaml`, `.yml` or `.json`).
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let scenario = pi_project::load_path(path)?;
    debug!(path = %path.display(), name = %scenario.name, "scenario loaded");
    Ok(scenario)
}

/// Validate and write a scenario; the format follows the file extension.
pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    pi_project::save_path(path, scenario).map_err(|e| match e {
        pi_project::ProjectError::Io(source) => AppError::ScenarioFileWrite {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    pi_project::validate_scenario(scenario)?;
    Ok(())
}

/// Scenario as YAML text, in the same layout `save_scenario` writes.
pub fn render_scenario_yaml(scenario: &Scenario) -> AppResult<String> {
    validate_scenario(scenario)?;
    serde_yaml::to_string(scenario)
        .map_err(|e| AppError::Project(format!("Failed to serialize scenario: {}", e)))
}
