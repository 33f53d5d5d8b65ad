use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{DdpgError, Result};
use crate::noise::NoiseDistribution;

/// Hyperparameters of one learning problem.
///
/// Defaults: a 1e6 transition buffer, batch 128, one learn cycle every second step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdpgConfig {
    /// Replay buffer capacity
    pub buffer_size: usize,
    /// Minibatch size
    pub batch_size: usize,
    /// Discount factor
    pub gamma: f32,
    /// Soft update rate of the target networks
    pub tau: f32,
    pub lr_actor: f32,
    pub lr_critic: f32,
    /// L2 weight decay of the critic optimizer
    pub weight_decay: f32,
    /// Ornstein-Uhlenbeck mean
    pub noise_mu: f32,
    /// Ornstein-Uhlenbeck mean reversion rate
    pub noise_theta: f32,
    /// Ornstein-Uhlenbeck random factor
    pub noise_sigma: f32,
    pub noise_distribution: NoiseDistribution,
    /// Learn only every `learn_every` environment steps
    pub learn_every: usize,
    pub hidden_sizes: Vec<usize>,
    pub seed: u64,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        DdpgConfig {
            buffer_size: 1_000_000,
            batch_size: 128,
            gamma: 0.99,
            tau: 1e-3,
            lr_actor: 1e-4,
            lr_critic: 1e-3,
            weight_decay: 1e-4,
            noise_mu: 0.0,
            noise_theta: 0.05,
            noise_sigma: 0.02,
            noise_distribution: NoiseDistribution::Uniform,
            learn_every: 2,
            hidden_sizes: vec![256, 128],
            seed: 0,
        }
    }
}

impl DdpgConfig {
    /// Check every value is usable, naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(DdpgError::invalid_parameter("buffer_size", "must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(DdpgError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.batch_size >= self.buffer_size {
            return Err(DdpgError::invalid_parameter(
                "batch_size",
                "must be smaller than buffer_size or learning never starts",
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DdpgError::invalid_parameter("gamma", "must be in [0, 1]"));
        }
        if !(self.tau > 0.0 && self.tau <= 1.0) {
            return Err(DdpgError::invalid_parameter("tau", "must be in (0, 1]"));
        }
        if !(self.lr_actor > 0.0 && self.lr_actor.is_finite()) {
            return Err(DdpgError::invalid_parameter("lr_actor", "must be positive"));
        }
        if !(self.lr_critic > 0.0 && self.lr_critic.is_finite()) {
            return Err(DdpgError::invalid_parameter("lr_critic", "must be positive"));
        }
        if !(self.weight_decay >= 0.0 && self.weight_decay.is_finite()) {
            return Err(DdpgError::invalid_parameter("weight_decay", "must be non-negative"));
        }
        if !self.noise_mu.is_finite() {
            return Err(DdpgError::invalid_parameter("noise_mu", "must be finite"));
        }
        if !(self.noise_theta >= 0.0 && self.noise_theta.is_finite()) {
            return Err(DdpgError::invalid_parameter("noise_theta", "must be non-negative"));
        }
        if !(self.noise_sigma >= 0.0 && self.noise_sigma.is_finite()) {
            return Err(DdpgError::invalid_parameter("noise_sigma", "must be non-negative"));
        }
        if self.learn_every == 0 {
            return Err(DdpgError::invalid_parameter("learn_every", "must be at least 1"));
        }
        if self.hidden_sizes.iter().any(|&size| size == 0) {
            return Err(DdpgError::invalid_parameter("hidden_sizes", "sizes must be non-zero"));
        }
        Ok(())
    }

    /// Read a JSON config. Missing fields take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DdpgConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
