//! Shared learning context.
//!
//! One [`LearningContext`] exists per learning problem. It owns the actor and
//! critic (current and target, with their optimizers) and the replay buffer,
//! and is handed to every cooperating agent behind an `Arc`. Dropping the last
//! handle drops all learned state, so a new context always starts clean.
//!
//! Locking:
//!
//! - replay insertions and sampling go through one mutex,
//! - learn cycles are serialised by a dedicated mutex held for the whole cycle,
//! - the networks are published as an immutable `Arc<Learner>` snapshot. A
//!   learn cycle trains a private copy and swaps it in only after every step
//!   succeeded, so readers see either the previous or the next parameter set,
//!   never a mix, and a failed cycle leaves nothing behind.

use ndarray::{Array2, ArrayView2};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::approximator::{Actor, Critic};
use crate::config::DdpgConfig;
use crate::error::Result;
use crate::learner::{LearnReport, Learner};
use crate::replay_buffer::{ReplayBuffer, Transition, TransitionBatch};

/// Networks, optimizers and replay memory shared by every agent of one learning problem.
pub struct LearningContext<A, C> {
    config: DdpgConfig,
    models: RwLock<Arc<Learner<A, C>>>,
    memory: Mutex<ReplayBuffer>,
    learn_lock: Mutex<()>,
}

impl<A: Actor, C: Critic> LearningContext<A, C> {
    /// Create a context around freshly built networks. Targets start as copies.
    pub fn new(config: DdpgConfig, actor: A, critic: C) -> Result<Self> {
        config.validate()?;
        let learner = Learner::new(actor, critic, config.tau)?;
        let memory = ReplayBuffer::new(config.buffer_size, config.seed)?;

        log::info!(
            "learning context created: buffer_size={} batch_size={} learn_every={}",
            config.buffer_size,
            config.batch_size,
            config.learn_every
        );

        Ok(LearningContext {
            config,
            models: RwLock::new(Arc::new(learner)),
            memory: Mutex::new(memory),
            learn_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &DdpgConfig {
        &self.config
    }

    /// Store one transition in the shared replay buffer.
    pub fn remember(&self, transition: Transition) {
        self.memory.lock().add(transition);
    }

    pub fn memory_len(&self) -> usize {
        self.memory.lock().len()
    }

    /// The currently published networks. The snapshot never changes under the caller.
    pub fn snapshot(&self) -> Arc<Learner<A, C>> {
        Arc::clone(&self.models.read())
    }

    /// Evaluate the current actor on a batch of states, in inference mode.
    pub fn policy(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.snapshot().actor.evaluate(states)
    }

    /// Number of learn cycles published so far.
    pub fn updates(&self) -> u64 {
        self.models.read().updates()
    }

    /// Sample a batch of `batch_size` from the replay buffer and run one learn cycle.
    ///
    /// Fails with `InsufficientData` when the buffer holds fewer than `batch_size` transitions.
    pub fn learn(&self) -> Result<LearnReport> {
        let _cycle = self.learn_lock.lock();
        let batch = self.memory.lock().sample(self.config.batch_size)?;
        self.learn_locked(&batch)
    }

    /// Run one learn cycle on a caller-supplied batch.
    pub fn learn_from(&self, batch: &TransitionBatch) -> Result<LearnReport> {
        let _cycle = self.learn_lock.lock();
        self.learn_locked(batch)
    }

    fn learn_locked(&self, batch: &TransitionBatch) -> Result<LearnReport> {
        let mut next = self.models.read().as_ref().clone();
        let report = next.learn(batch, self.config.gamma)?;
        *self.models.write() = Arc::new(next);
        Ok(report)
    }
}
