use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::approximator::{MlpActor, MlpCritic};
use crate::config::DdpgConfig;
use crate::context::LearningContext;
use crate::error::{DdpgError, Result};
use crate::noise::NoiseDistribution;
use crate::optimizer::{Adam, OptimizerWrapper};

/// Builder for a shared learning context over the bundled MLP actor and critic.
pub struct DdpgBuilder {
    state_size: usize,
    action_size: usize,
    config: DdpgConfig,
}

impl DdpgBuilder {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        DdpgBuilder {
            state_size,
            action_size,
            config: DdpgConfig::default(),
        }
    }

    /// Replace every hyperparameter at once, e.g. with a config read from JSON.
    pub fn config(mut self, config: DdpgConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hidden_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.config.hidden_sizes = sizes;
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.config.buffer_size = buffer_size;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn tau(mut self, tau: f32) -> Self {
        self.config.tau = tau;
        self
    }

    pub fn learning_rates(mut self, actor: f32, critic: f32) -> Self {
        self.config.lr_actor = actor;
        self.config.lr_critic = critic;
        self
    }

    pub fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.config.weight_decay = weight_decay;
        self
    }

    pub fn noise_params(mut self, mu: f32, theta: f32, sigma: f32) -> Self {
        self.config.noise_mu = mu;
        self.config.noise_theta = theta;
        self.config.noise_sigma = sigma;
        self
    }

    pub fn noise_distribution(mut self, distribution: NoiseDistribution) -> Self {
        self.config.noise_distribution = distribution;
        self
    }

    pub fn learn_every(mut self, steps: usize) -> Self {
        self.config.learn_every = steps;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn build(self) -> Result<Arc<LearningContext<MlpActor, MlpCritic>>> {
        if self.state_size == 0 {
            return Err(DdpgError::invalid_parameter("state_size", "must be greater than 0"));
        }
        if self.action_size == 0 {
            return Err(DdpgError::invalid_parameter("action_size", "must be greater than 0"));
        }
        self.config.validate()?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let actor = MlpActor::new(
            self.state_size,
            self.action_size,
            &self.config.hidden_sizes,
            OptimizerWrapper::Adam(Adam::default()),
            self.config.lr_actor,
            &mut rng,
        )?;
        let critic = MlpCritic::new(
            self.state_size,
            self.action_size,
            &self.config.hidden_sizes,
            OptimizerWrapper::Adam(Adam::default().with_weight_decay(self.config.weight_decay)),
            self.config.lr_critic,
            &mut rng,
        )?;

        Ok(Arc::new(LearningContext::new(self.config, actor, critic)?))
    }
}
