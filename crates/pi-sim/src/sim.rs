//! Simulation runner and result recording.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::{TransientModel, all_finite};
use crate::ode::dopri5_samples;
use ode_solvers::SVector;
use pi_core::{Tolerances, linspace};
use tracing::{debug, warn};

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// Adaptive Dormand-Prince 5(4) (default, error controlled).
    #[default]
    Dopri5,
    /// Fixed-step 4th-order Runge-Kutta (4 rhs calls per step).
    RK4,
    /// Fixed-step forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Final simulation time (seconds); the run covers `[0, t_end]`
    pub t_end: f64,
    /// Number of uniformly spaced output samples, both ends included
    pub samples: usize,
    /// Integrator type (default: Dopri5)
    pub integrator: IntegratorType,
    /// Error control for the adaptive integrator
    pub tolerances: Tolerances,
    /// Largest fixed step (seconds)
    pub dt: f64,
    /// Maximum number of accepted steps (safety limit)
    pub max_steps: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t_end: 20.0,
            samples: 1000,
            integrator: IntegratorType::default(),
            tolerances: Tolerances {
                abs: 1e-9,
                rel: 1e-6,
            },
            dt: 1e-3,
            max_steps: 100_000,
        }
    }
}

impl SimOptions {
    /// Horizon `[0, t_end]` sampled at `samples` points, other options default.
    pub fn with_horizon(t_end: f64, samples: usize) -> Self {
        Self {
            t_end,
            samples,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(SimError::InvalidArg {
                what: "t_end must be positive and finite",
            });
        }
        if self.samples < 2 {
            return Err(SimError::InvalidArg {
                what: "samples must be at least 2",
            });
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Tolerances::new(self.tolerances.abs, self.tolerances.rel).map_err(|_| {
            SimError::InvalidArg {
                what: "tolerances must be non-negative with at least one positive",
            }
        })?;
        Ok(())
    }
}

/// Work done by an integration run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrationStats {
    /// Right-hand side evaluations.
    pub rhs_calls: usize,
    /// Steps kept.
    pub accepted_steps: usize,
    /// Steps retried with a smaller size (adaptive only).
    pub rejected_steps: usize,
}

impl IntegrationStats {
    /// Steps attempted, accepted or not.
    pub fn steps(&self) -> usize {
        self.accepted_steps + self.rejected_steps
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
    /// Integration work
    pub stats: IntegrationStats,
}

fn fixed_step_segment<I: Integrator, M: TransientModel<N>, const N: usize>(
    integrator: &I,
    model: &M,
    t0: f64,
    x0: &SVector<f64, N>,
    t1: f64,
    opts: &SimOptions,
    stats: &mut IntegrationStats,
) -> SimResult<SVector<f64, N>> {
    let span = t1 - t0;
    let n = ((span / opts.dt).ceil() as usize).max(1);
    let h = span / n as f64;

    let mut x = *x0;
    for i in 0..n {
        if stats.accepted_steps >= opts.max_steps {
            return Err(SimError::ConvergenceFailed {
                what: "step budget exhausted",
                t: t0 + i as f64 * h,
            });
        }
        x = integrator.step(model, t0 + i as f64 * h, &x, h)?;
        stats.rhs_calls += I::STAGES;
        stats.accepted_steps += 1;
        if !all_finite(&x) {
            return Err(SimError::ConvergenceFailed {
                what: "state became non-finite",
                t: t0 + (i + 1) as f64 * h,
            });
        }
    }
    Ok(x)
}

fn fixed_step_samples<I: Integrator, M: TransientModel<N>, const N: usize>(
    integrator: &I,
    model: &M,
    x0: SVector<f64, N>,
    t_record: &[f64],
    opts: &SimOptions,
    stats: &mut IntegrationStats,
) -> SimResult<Vec<SVector<f64, N>>> {
    let mut x = x0;
    let mut states = Vec::with_capacity(t_record.len());
    states.push(x);
    for w in t_record.windows(2) {
        x = fixed_step_segment(integrator, model, w[0], &x, w[1], opts, stats)?;
        states.push(x);
    }
    Ok(states)
}

/// Integrate `model` over `[0, opts.t_end]` and sample the state at
/// `opts.samples` uniformly spaced times.
///
/// Fixed-step integrators land exactly on each sample time; the adaptive
/// integrator samples its dense output. Either the full record is returned
/// or an error; partial results are discarded.
pub fn run_sim<M: TransientModel<N>, const N: usize>(
    model: &M,
    opts: &SimOptions,
) -> SimResult<SimRecord<SVector<f64, N>>> {
    opts.validate()?;

    let t_record = linspace(0.0, opts.t_end, opts.samples);
    let x0 = model.initial_state();
    if !all_finite(&x0) {
        return Err(SimError::NonPhysical {
            what: "initial state is not finite",
            t: 0.0,
        });
    }

    debug!(
        integrator = ?opts.integrator,
        t_end = opts.t_end,
        samples = opts.samples,
        "starting integration"
    );

    let mut stats = IntegrationStats::default();
    let result = match opts.integrator {
        IntegratorType::Dopri5 => dopri5_samples(
            model,
            x0,
            &t_record,
            opts.tolerances,
            opts.max_steps,
            &mut stats,
        ),
        IntegratorType::RK4 => fixed_step_samples(&RK4, model, x0, &t_record, opts, &mut stats),
        IntegratorType::ForwardEuler => {
            fixed_step_samples(&ForwardEuler, model, x0, &t_record, opts, &mut stats)
        }
    };
    let x_record = match result {
        Ok(x) => x,
        Err(e) => {
            warn!(error = %e, ?stats, "integration failed");
            return Err(e);
        }
    };

    debug!(
        rhs_calls = stats.rhs_calls,
        accepted = stats.accepted_steps,
        rejected = stats.rejected_steps,
        "integration finished"
    );

    Ok(SimRecord {
        t: t_record,
        x: x_record,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp;

    impl TransientModel<1> for Ramp {
        fn initial_state(&self) -> SVector<f64, 1> {
            SVector::zeros()
        }

        fn rhs(&self, _t: f64, _x: &SVector<f64, 1>) -> SimResult<SVector<f64, 1>> {
            Ok(SVector::from_element(1.0))
        }
    }

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.t_end, 20.0);
        assert_eq!(opts.samples, 1000);
        assert_eq!(opts.integrator, IntegratorType::Dopri5);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn sim_options_invalid() {
        let bad = [
            SimOptions {
                t_end: 0.0,
                ..SimOptions::default()
            },
            SimOptions {
                samples: 1,
                ..SimOptions::default()
            },
            SimOptions {
                dt: 0.0,
                ..SimOptions::default()
            },
            SimOptions {
                max_steps: 0,
                ..SimOptions::default()
            },
            SimOptions {
                tolerances: Tolerances { abs: 0.0, rel: 0.0 },
                ..SimOptions::default()
            },
        ];
        for opts in &bad {
            assert!(
                matches!(run_sim(&Ramp, opts), Err(SimError::InvalidArg { .. })),
                "{opts:?} should be rejected"
            );
        }
    }

    #[test]
    fn samples_are_uniform() {
        for integrator in [
            IntegratorType::Dopri5,
            IntegratorType::RK4,
            IntegratorType::ForwardEuler,
        ] {
            let opts = SimOptions {
                integrator,
                ..SimOptions::with_horizon(2.0, 11)
            };
            let record = run_sim(&Ramp, &opts).unwrap();
            assert_eq!(record.t.len(), 11);
            assert_eq!(record.x.len(), 11);
            assert_eq!(record.t[10], 2.0);
            for (t, x) in record.t.iter().zip(&record.x) {
                assert!((t - x[0]).abs() < 1e-9, "{integrator:?}: x({t}) = {}", x[0]);
            }
        }
    }

    #[test]
    fn fixed_step_counts_rhs_calls() {
        let opts = SimOptions {
            integrator: IntegratorType::RK4,
            dt: 0.1,
            ..SimOptions::with_horizon(1.0, 3)
        };
        let record = run_sim(&Ramp, &opts).unwrap();
        // Two segments of 0.5 s, 5 steps each
        assert_eq!(record.stats.accepted_steps, 10);
        assert_eq!(record.stats.rhs_calls, 40);
        assert_eq!(record.stats.rejected_steps, 0);
    }

    #[test]
    fn step_budget_is_enforced() {
        let opts = SimOptions {
            integrator: IntegratorType::ForwardEuler,
            dt: 1e-3,
            max_steps: 10,
            ..SimOptions::with_horizon(1.0, 2)
        };
        assert!(matches!(
            run_sim(&Ramp, &opts),
            Err(SimError::ConvergenceFailed { .. })
        ));
    }
}
