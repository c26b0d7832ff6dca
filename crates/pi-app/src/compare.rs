//! Side-by-side comparison of the two integral error modes.

use pi_project::schema::Scenario;
use pi_sim::Trajectory;
use tracing::info;

use crate::compile;
use crate::error::{AppError, AppResult};
use crate::query::{RunSummary, summarize};
use crate::run_service::simulate;

/// Same scenario integrated against the setpoint (`standard`) and against
/// the reference trajectory (`reference`).
#[derive(Debug, Clone)]
pub struct IntegralComparison {
    pub standard: Trajectory,
    pub reference: Trajectory,
    pub standard_summary: RunSummary,
    pub reference_summary: RunSummary,
    /// Largest `|x_standard - x_reference|` over the shared sample times.
    pub max_x_difference: f64,
}

pub fn compare_integral_modes(scenario: &Scenario) -> AppResult<IntegralComparison> {
    let mut standard_scenario = scenario.clone();
    standard_scenario.params.use_ref = false;
    let mut reference_scenario = scenario.clone();
    reference_scenario.params.use_ref = true;

    let (standard, reference) = rayon::join(
        || simulate(&standard_scenario),
        || simulate(&reference_scenario),
    );
    let (standard, reference) = (standard?, reference?);
    if standard.t() != reference.t() {
        return Err(AppError::Simulation(
            "integral mode runs produced different sample times".to_string(),
        ));
    }

    let limits = *compile::compile_params(&scenario.params)?.limits();
    let standard_summary = summarize(&standard, &limits)?;
    let reference_summary = summarize(&reference, &limits)?;

    let max_x_difference = standard
        .x()
        .iter()
        .zip(reference.x())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);

    info!(
        scenario = %scenario.name,
        max_x_difference,
        standard_overshoot = standard_summary.peak_overshoot,
        reference_overshoot = reference_summary.peak_overshoot,
        "compared integral modes"
    );

    Ok(IntegralComparison {
        standard,
        reference,
        standard_summary,
        reference_summary,
        max_x_difference,
    })
}
