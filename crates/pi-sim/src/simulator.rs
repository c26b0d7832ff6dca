//! Single-use simulation driver.

use crate::error::{SimError, SimResult};
use crate::loop_model::ControlLoopModel;
use crate::sim::{SimOptions, run_sim};
use crate::trajectory::Trajectory;
use pi_controls::TimeSignal;
use tracing::info;

#[derive(Debug, Clone)]
enum SolveState {
    Unsolved,
    Solved(Trajectory),
}

/// Owns a [`ControlLoopModel`] and produces its trajectory once.
///
/// `Unsolved` until [`Simulator::solve`] succeeds, then `Solved` for good.
/// A failed solve leaves the simulator `Unsolved`.
#[derive(Debug, Clone)]
pub struct Simulator<S, L> {
    model: ControlLoopModel<S, L>,
    opts: SimOptions,
    state: SolveState,
}

impl<S, L> Simulator<S, L>
where
    S: TimeSignal,
    L: TimeSignal,
{
    pub fn new(model: ControlLoopModel<S, L>, opts: SimOptions) -> Self {
        Self {
            model,
            opts,
            state: SolveState::Unsolved,
        }
    }

    pub fn model(&self) -> &ControlLoopModel<S, L> {
        &self.model
    }

    pub fn options(&self) -> &SimOptions {
        &self.opts
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.state, SolveState::Solved(_))
    }

    /// Integrate over `[0, t_end]` and keep the sampled trajectory.
    ///
    /// # Errors
    ///
    /// [`SimError::AlreadySolved`] on a second call; integration errors
    /// from [`run_sim`] otherwise.
    pub fn solve(&mut self) -> SimResult<&Trajectory> {
        if self.is_solved() {
            return Err(SimError::AlreadySolved);
        }

        let record = run_sim(&self.model, &self.opts)?;
        let trajectory = Trajectory::from_record(record, &self.model);
        info!(
            samples = trajectory.len(),
            rhs_calls = trajectory.stats().rhs_calls,
            "loop solved"
        );
        self.state = SolveState::Solved(trajectory);
        self.results()
    }

    /// Trajectory of a solved simulator.
    pub fn results(&self) -> SimResult<&Trajectory> {
        match &self.state {
            SolveState::Solved(trajectory) => Ok(trajectory),
            SolveState::Unsolved => Err(SimError::NotSolved),
        }
    }

    pub fn into_trajectory(self) -> SimResult<Trajectory> {
        match self.state {
            SolveState::Solved(trajectory) => Ok(trajectory),
            SolveState::Unsolved => Err(SimError::NotSolved),
        }
    }
}
