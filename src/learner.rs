//! # Actor-Critic Learner
//!
//! One learning cycle, in this order:
//!
//! 1. Bootstrapped critic targets from the *target* networks:
//!    `y = r + gamma * Q'(s', mu'(s')) * (1 - done)`.
//! 2. Critic step minimising `mean((Q(s, a) - y)^2)`, `y` held constant.
//! 3. Actor step minimising `-mean(Q(s, mu(s)))` through the freshly updated
//!    critic; only actor parameters move.
//! 4. Soft update of the critic target, then the actor target:
//!    `target <- tau * local + (1 - tau) * target`.
//!
//! Target networks are only ever changed by step 4.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::approximator::{Actor, Critic, Parameterized};
use crate::error::{DdpgError, Result};
use crate::loss;
use crate::replay_buffer::TransitionBatch;

/// Summary of one completed learning cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnReport {
    pub critic_loss: f32,
    pub actor_loss: f32,
    /// Number of cycles completed by this learner, including this one.
    pub update: u64,
}

/// The four networks of DDPG and the blend rate that ties targets to currents.
#[derive(Clone, Debug)]
pub struct Learner<A, C> {
    pub actor: A,
    pub actor_target: A,
    pub critic: C,
    pub critic_target: C,
    tau: f32,
    updates: u64,
}

impl<A: Actor, C: Critic> Learner<A, C> {
    /// Build a learner whose targets start as exact copies of the current networks.
    pub fn new(actor: A, critic: C, tau: f32) -> Result<Self> {
        if !(tau > 0.0 && tau <= 1.0) {
            return Err(DdpgError::invalid_parameter("tau", "must be in (0, 1]"));
        }
        Ok(Learner {
            actor_target: actor.clone(),
            critic_target: critic.clone(),
            actor,
            critic,
            tau,
            updates: 0,
        })
    }

    pub fn tau(&self) -> f32 {
        self.tau
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Run one full learning cycle on `batch`.
    ///
    /// On error the learner may hold partially updated networks; callers that
    /// need atomicity run the cycle on a copy (see `LearningContext`).
    pub fn learn(&mut self, batch: &TransitionBatch, gamma: f32) -> Result<LearnReport> {
        let states = batch.states.view();
        let actions = batch.actions.view();

        // Critic targets
        let next_actions = self.actor_target.evaluate(batch.next_states.view())?;
        let next_values = self
            .critic_target
            .evaluate(batch.next_states.view(), next_actions.view())?;
        let target_q = bootstrapped_targets(
            batch.rewards.view(),
            next_values.view(),
            batch.dones.view(),
            gamma,
        )?;

        // Critic update
        let expected_q = self.critic.evaluate(states, actions)?;
        let (critic_loss, critic_grads) = loss::mse(expected_q.view(), target_q.view())?;
        ensure_finite("critic loss", critic_loss)?;
        self.critic.gradient_step(states, actions, critic_grads.view())?;

        // Actor update through the updated critic
        let predicted_actions = self.actor.evaluate(states)?;
        let values = self.critic.evaluate(states, predicted_actions.view())?;
        let (actor_loss, value_grads) = loss::negated_mean(values.view())?;
        ensure_finite("actor loss", actor_loss)?;
        let action_grads = self
            .critic
            .action_gradient(states, predicted_actions.view(), value_grads.view())?;
        self.actor.gradient_step(states, action_grads.view())?;

        // Target blend
        soft_update(&self.critic, &mut self.critic_target, self.tau)?;
        soft_update(&self.actor, &mut self.actor_target, self.tau)?;

        self.updates += 1;
        log::debug!(
            "learn cycle {}: critic_loss={:.6} actor_loss={:.6}",
            self.updates,
            critic_loss,
            actor_loss
        );

        Ok(LearnReport {
            critic_loss,
            actor_loss,
            update: self.updates,
        })
    }
}

/// `reward + gamma * next_value * (1 - done)`, elementwise.
pub fn bootstrapped_targets(
    rewards: ArrayView1<f32>,
    next_values: ArrayView1<f32>,
    dones: ArrayView1<f32>,
    gamma: f32,
) -> Result<Array1<f32>> {
    let n = rewards.len();
    if next_values.len() != n || dones.len() != n {
        return Err(DdpgError::dimension_mismatch(
            format!("{} rewards, values and done flags", n),
            format!("{}/{}/{}", n, next_values.len(), dones.len()),
        ));
    }

    let mut targets = rewards.to_owned();
    ndarray::Zip::from(&mut targets)
        .and(next_values)
        .and(dones)
        .for_each(|y, &v, &d| *y += gamma * v * (1.0 - d));
    Ok(targets)
}

/// Blend every parameter of `local` into `target`: `target <- tau * local + (1 - tau) * target`.
///
/// Parameter counts and shapes are checked before any value is written.
pub fn soft_update<P: Parameterized>(local: &P, target: &mut P, tau: f32) -> Result<()> {
    let local_params = local.parameters();
    let mut target_params = target.parameters_mut();

    if local_params.len() != target_params.len() {
        return Err(DdpgError::dimension_mismatch(
            format!("{} parameter tensors", local_params.len()),
            format!("{} parameter tensors", target_params.len()),
        ));
    }
    for (l, t) in local_params.iter().zip(target_params.iter()) {
        if l.shape() != t.shape() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", l.shape()),
                format!("{:?}", t.shape()),
            ));
        }
    }

    for (l, t) in local_params.iter().zip(target_params.iter_mut()) {
        t.zip_mut_with(l, |t, &l| *t = tau * l + (1.0 - tau) * *t);
    }
    Ok(())
}

fn ensure_finite(what: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        log::warn!("{} is not finite ({}), aborting learn cycle", what, value);
        Err(DdpgError::Numerical(format!("{} is {}", what, value)))
    }
}
