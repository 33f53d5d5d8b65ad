use ndarray::{Array1, ArrayView1, Axis};
use std::sync::Arc;

use crate::approximator::{Actor, Critic};
use crate::context::LearningContext;
use crate::error::{DdpgError, Result};
use crate::learner::LearnReport;
use crate::noise::OrnsteinUhlenbeck;
use crate::replay_buffer::Transition;

/// Where an agent is in the act/step exchange with its environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentPhase {
    /// Waiting for the next state.
    Idle,
    /// An action was returned and the environment step is pending.
    ActionEmitted,
}

/// Per-environment interaction surface over a shared [`LearningContext`].
///
/// Every agent owns its exploration noise; networks and replay memory are shared.
pub struct Agent<A, C> {
    context: Arc<LearningContext<A, C>>,
    noise: OrnsteinUhlenbeck,
    phase: AgentPhase,
    state_size: usize,
    action_size: usize,
}

impl<A: Actor, C: Critic> Agent<A, C> {
    /// Attach a new agent to `context`. `seed` drives this agent's noise process.
    pub fn new(context: Arc<LearningContext<A, C>>, seed: u64) -> Self {
        let (state_size, action_size) = {
            let models = context.snapshot();
            (models.actor.state_size(), models.actor.action_size())
        };
        let config = context.config();
        let noise = OrnsteinUhlenbeck::new(
            action_size,
            config.noise_mu,
            config.noise_theta,
            config.noise_sigma,
            seed,
        )
        .with_distribution(config.noise_distribution);

        Agent {
            context,
            noise,
            phase: AgentPhase::Idle,
            state_size,
            action_size,
        }
    }

    /// Action for `state` from the current policy, optionally with exploration noise.
    ///
    /// Every coordinate is clipped to `[-1, 1]`.
    pub fn act(&mut self, state: ArrayView1<f32>, add_noise: bool) -> Result<Array1<f32>> {
        let states = state.insert_axis(Axis(0));
        let mut action = self
            .context
            .policy(states)?
            .index_axis_move(Axis(0), 0);

        if add_noise {
            action += &self.noise.sample();
        }
        action.mapv_inplace(|a| a.clamp(-1.0, 1.0));

        self.phase = AgentPhase::ActionEmitted;
        Ok(action)
    }

    /// Record a transition and learn when the cadence and buffer size allow it.
    ///
    /// A transition whose widths do not match the networks is rejected with
    /// `DimensionMismatch` and never reaches the shared buffer.
    ///
    /// Learning happens only if `time_step` is a multiple of `learn_every` and the
    /// shared buffer holds more than `batch_size` transitions. Returns the report of
    /// the cycle that ran, if any.
    pub fn step(
        &mut self,
        time_step: usize,
        state: ArrayView1<f32>,
        action: ArrayView1<f32>,
        reward: f32,
        next_state: ArrayView1<f32>,
        done: bool,
    ) -> Result<Option<LearnReport>> {
        check_width("state", state.len(), self.state_size)?;
        check_width("action", action.len(), self.action_size)?;
        check_width("next_state", next_state.len(), self.state_size)?;

        self.context
            .remember(Transition::new(state, action, reward, next_state, done));
        self.phase = AgentPhase::Idle;

        let config = self.context.config();
        if time_step % config.learn_every != 0 {
            return Ok(None);
        }
        let stored = self.context.memory_len();
        if stored <= config.batch_size {
            log::trace!(
                "step {}: {} transitions stored, waiting for more than {}",
                time_step,
                stored,
                config.batch_size
            );
            return Ok(None);
        }

        match self.context.learn() {
            Ok(report) => Ok(Some(report)),
            Err(err) if err.is_insufficient_data() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Start of a new episode: reset the exploration noise only.
    pub fn reset(&mut self) {
        self.noise.reset();
        self.phase = AgentPhase::Idle;
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn context(&self) -> &Arc<LearningContext<A, C>> {
        &self.context
    }

    pub fn noise(&self) -> &OrnsteinUhlenbeck {
        &self.noise
    }
}

fn check_width(what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(DdpgError::dimension_mismatch(
            format!("{} {} features", expected, what),
            format!("{} {} features", actual, what),
        ))
    }
}
