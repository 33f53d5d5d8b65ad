use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use std::collections::VecDeque;

use crate::error::{DdpgError, Result};

/// One recorded interaction. Stored verbatim and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: Array1<f32>,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: ArrayView1<f32>,
        action: ArrayView1<f32>,
        reward: f32,
        next_state: ArrayView1<f32>,
        done: bool,
    ) -> Self {
        Transition {
            state: state.to_owned(),
            action: action.to_owned(),
            reward,
            next_state: next_state.to_owned(),
            done,
        }
    }
}

/// A sampled batch laid out as parallel arrays, one row per transition.
#[derive(Clone, Debug)]
pub struct TransitionBatch {
    pub states: Array2<f32>,
    pub actions: Array2<f32>,
    pub rewards: Array1<f32>,
    pub next_states: Array2<f32>,
    /// `1.0` for terminal transitions, `0.0` otherwise.
    pub dones: Array1<f32>,
}

impl TransitionBatch {
    /// Stack transitions into a batch. Fails on an empty slice or ragged vector lengths.
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        let first = transitions
            .first()
            .ok_or_else(|| DdpgError::invalid_parameter("transitions", "empty batch"))?;

        Ok(TransitionBatch {
            states: stack_rows(transitions.iter().map(|t| t.state.view()), first.state.len())?,
            actions: stack_rows(transitions.iter().map(|t| t.action.view()), first.action.len())?,
            rewards: transitions.iter().map(|t| t.reward).collect(),
            next_states: stack_rows(transitions.iter().map(|t| t.next_state.view()), first.state.len())?,
            dones: transitions.iter().map(|t| if t.done { 1.0 } else { 0.0 }).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// Fixed-capacity FIFO store of transitions with uniform sampling without replacement.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Create an empty buffer. A zero capacity could never hold a transition and is rejected.
    pub fn new(capacity: usize, seed: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(DdpgError::invalid_parameter("capacity", "must be greater than 0"));
        }
        Ok(ReplayBuffer {
            // Large capacities grow on demand instead of reserving up front.
            buffer: VecDeque::with_capacity(capacity.min(1 << 16)),
            capacity,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Append a transition, evicting the oldest one when full.
    pub fn add(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        if batch_size == 0 {
            return Err(DdpgError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.buffer.len() < batch_size {
            return Err(DdpgError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }

        let picked = index::sample(&mut self.rng, self.buffer.len(), batch_size);
        let transitions = picked.iter().map(|i| &self.buffer[i]).collect::<Vec<_>>();
        TransitionBatch::from_transitions(&transitions)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}

fn stack_rows<'a, I>(rows: I, width: usize) -> Result<Array2<f32>>
where
    I: ExactSizeIterator<Item = ArrayView1<'a, f32>>,
{
    let mut result = Array2::zeros((rows.len(), width));
    for (i, row) in rows.enumerate() {
        if row.len() != width {
            return Err(DdpgError::dimension_mismatch(
                format!("{} columns", width),
                format!("{} columns", row.len()),
            ));
        }
        result.row_mut(i).assign(&row);
    }
    Ok(result)
}
