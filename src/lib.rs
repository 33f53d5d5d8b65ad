//! # ddpg - Deep Deterministic Policy Gradient
//!
//! An off-policy actor-critic agent for continuous action spaces. Several
//! agents, e.g. one per parallel environment copy, can share one learning
//! context: the actor and critic with their target copies, their optimizers,
//! and the replay buffer. Exploration noise stays private to each agent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddpg::agent::Agent;
//! use ddpg::builders::DdpgBuilder;
//! use ndarray::array;
//!
//! let context = DdpgBuilder::new(3, 1)
//!     .hidden_sizes(vec![64, 64])
//!     .batch_size(64)
//!     .build()
//!     .unwrap();
//!
//! let mut agent = Agent::new(context.clone(), 1);
//! agent.reset();
//!
//! let state = array![0.1, -0.2, 0.0];
//! let action = agent.act(state.view(), true).unwrap();
//! let next_state = array![0.1, -0.1, 0.05];
//! agent.step(0, state.view(), action.view(), 1.0, next_state.view(), false).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - Per-environment facade: act, step, reset
//! - [`context`] - Shared learning context and its locking discipline
//! - [`learner`] - The actor-critic update cycle and soft target blending
//! - [`replay_buffer`] - Fixed-capacity experience replay
//! - [`noise`] - Ornstein-Uhlenbeck exploration noise
//! - [`approximator`] - Actor/critic contract and the bundled MLP implementations
//! - [`config`] - Hyperparameters with JSON load/save
//! - [`builders`] - Builder for a ready-to-use shared context
//! - [`network`], [`layers`], [`activations`], [`optimizer`], [`loss`] - Dense networks
//! - [`error`] - Error types and result handling

pub mod activations;
pub mod agent;
pub mod approximator;
pub mod builders;
pub mod config;
pub mod context;
pub mod error;
pub mod layers;
pub mod learner;
pub mod loss;
pub mod network;
pub mod noise;
pub mod optimizer;
pub mod replay_buffer;

pub use agent::{Agent, AgentPhase};
pub use config::DdpgConfig;
pub use context::LearningContext;
pub use error::{DdpgError, Result};
pub use learner::{LearnReport, Learner};

/// Shared context over the bundled MLP networks.
pub type MlpContext = LearningContext<approximator::MlpActor, approximator::MlpCritic>;

/// Agent over the bundled MLP networks.
pub type MlpAgent = Agent<approximator::MlpActor, approximator::MlpCritic>;

#[cfg(test)]
mod tests;
