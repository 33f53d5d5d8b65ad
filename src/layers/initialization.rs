use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Uniform in `±1/sqrt(fan_in)`, the usual choice for DDPG hidden layers
    FanIn,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },
}

impl WeightInit {
    /// Initialize weights of shape `(fan_in, fan_out)`.
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let (fan_in, _) = shape;

        match self {
            WeightInit::FanIn => {
                let limit = fan_in_limit(fan_in);
                Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array2::random_using(shape, Uniform::new_inclusive(min.min(*max), max.max(*min)), rng)
            }
        }
    }

    /// Initialize biases for a layer with `fan_in` inputs.
    pub fn initialize_biases<R: Rng + ?Sized>(&self, fan_in: usize, size: usize, rng: &mut R) -> Array1<f32> {
        match self {
            WeightInit::FanIn => {
                let limit = fan_in_limit(fan_in);
                Array1::random_using(size, Uniform::new_inclusive(-limit, limit), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array1::random_using(size, Uniform::new_inclusive(min.min(*max), max.max(*min)), rng)
            }
        }
    }
}

fn fan_in_limit(fan_in: usize) -> f32 {
    1.0 / (fan_in.max(1) as f32).sqrt()
}
