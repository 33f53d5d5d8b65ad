//! Ornstein-Uhlenbeck exploration noise.
//!
//! Discrete-time update applied on every [`OrnsteinUhlenbeck::sample`]:
//!
//! ```text
//! state <- state + theta * (mu - state) + sigma * xi
//! ```
//!
//! where `xi` holds one fresh draw per action dimension. The draw is uniform on
//! `[0, 1)` by default; [`NoiseDistribution::Gaussian`] switches to a standard
//! normal draw.

use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Distribution of the per-step random term `xi`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NoiseDistribution {
    /// Uniform on `[0, 1)`.
    #[default]
    Uniform,
    /// Standard normal.
    Gaussian,
}

/// Mean-reverting correlated noise, one process per agent.
#[derive(Clone, Debug)]
pub struct OrnsteinUhlenbeck {
    mu: Array1<f32>,
    theta: f32,
    sigma: f32,
    distribution: NoiseDistribution,
    state: Array1<f32>,
    rng: StdRng,
}

impl OrnsteinUhlenbeck {
    /// Create a process of dimension `size` with every coordinate of the mean set to `mu`.
    pub fn new(size: usize, mu: f32, theta: f32, sigma: f32, seed: u64) -> Self {
        let mu = Array1::from_elem(size, mu);
        OrnsteinUhlenbeck {
            state: mu.clone(),
            mu,
            theta,
            sigma,
            distribution: NoiseDistribution::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_distribution(mut self, distribution: NoiseDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Reset the internal state to the mean.
    pub fn reset(&mut self) {
        self.state.assign(&self.mu);
    }

    /// Advance the process one step and return the new state.
    pub fn sample(&mut self) -> Array1<f32> {
        let size = self.state.len();
        let xi: Array1<f32> = match self.distribution {
            NoiseDistribution::Uniform => {
                Array1::random_using(size, Uniform::new(0.0f32, 1.0), &mut self.rng)
            }
            NoiseDistribution::Gaussian => {
                Array1::random_using(size, StandardNormal, &mut self.rng)
            }
        };

        let dx = (&self.mu - &self.state) * self.theta + xi * self.sigma;
        self.state += &dx;
        self.state.clone()
    }

    pub fn state(&self) -> &Array1<f32> {
        &self.state
    }

    pub fn mu(&self) -> &Array1<f32> {
        &self.mu
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn distribution(&self) -> NoiseDistribution {
        self.distribution
    }

    pub fn size(&self) -> usize {
        self.state.len()
    }
}
