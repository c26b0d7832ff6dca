//! Parallel parameter sweeps.

use std::fmt;
use std::str::FromStr;

use pi_project::schema::{ParamsDef, Scenario};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::compile;
use crate::error::{AppError, AppResult};
use crate::query::{RunSummary, summarize};
use crate::run_service::simulate;

/// Loop parameter varied by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SweepParameter {
    CP,
    TCl,
    TN,
    UMin,
    UMax,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 5] = [
        SweepParameter::CP,
        SweepParameter::TCl,
        SweepParameter::TN,
        SweepParameter::UMin,
        SweepParameter::UMax,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::CP => "c-p",
            SweepParameter::TCl => "t-cl",
            SweepParameter::TN => "t-n",
            SweepParameter::UMin => "u-min",
            SweepParameter::UMax => "u-max",
        }
    }

    pub fn apply(self, params: &mut ParamsDef, value: f64) {
        match self {
            SweepParameter::CP => params.c_p = value,
            SweepParameter::TCl => params.t_cl = value,
            SweepParameter::TN => params.t_n = value,
            SweepParameter::UMin => params.u_min = value,
            SweepParameter::UMax => params.u_max = value,
        }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepParameter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        SweepParameter::ALL
            .into_iter()
            .find(|p| p.name() == key)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "unknown sweep parameter '{}' (expected one of c-p, t-cl, t-n, u-min, u-max)",
                    s
                ))
            })
    }
}

/// Result for one swept value.
#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub value: f64,
    pub summary: RunSummary,
}

/// Run `scenario` once per value of `parameter`, in parallel.
///
/// Points come back in the order of `values`. Any invalid value or failed
/// run fails the whole sweep.
pub fn sweep_parameter(
    scenario: &Scenario,
    parameter: SweepParameter,
    values: &[f64],
) -> AppResult<Vec<SweepPoint>> {
    if values.is_empty() {
        return Err(AppError::InvalidInput("sweep needs at least one value".to_string()));
    }

    let points = values
        .par_iter()
        .map(|&value| -> AppResult<SweepPoint> {
            let mut variant = scenario.clone();
            parameter.apply(&mut variant.params, value);
            let limits = *compile::compile_params(&variant.params)?.limits();
            let traj = simulate(&variant)?;
            Ok(SweepPoint {
                value,
                summary: summarize(&traj, &limits)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    info!(
        scenario = %scenario.name,
        parameter = %parameter,
        points = points.len(),
        "sweep finished"
    );
    Ok(points)
}
