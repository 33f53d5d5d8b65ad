use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Actor, Critic, Parameterized};
use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::network::NeuralNetwork;
use crate::optimizer::OptimizerWrapper;

/// Actor network: ReLU hidden layers and a tanh head bounding actions to (-1, 1).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MlpActor {
    pub network: NeuralNetwork,
    pub learning_rate: f32,
}

impl MlpActor {
    pub fn new<R: Rng + ?Sized>(
        state_size: usize,
        action_size: usize,
        hidden_sizes: &[usize],
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut sizes = vec![state_size];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(action_size);

        let activations = vec![Activation::Relu; hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(Activation::Tanh))
            .collect::<Vec<_>>();

        let network = NeuralNetwork::new(&sizes, &activations, optimizer, rng)?;
        Ok(MlpActor { network, learning_rate })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.network.save(path)
    }

    pub fn load<P: AsRef<Path>>(path: P, learning_rate: f32) -> Result<Self> {
        let network = NeuralNetwork::load(path)?;
        Ok(MlpActor { network, learning_rate })
    }
}

impl Parameterized for MlpActor {
    fn parameters(&self) -> Vec<ArrayViewD<'_, f32>> {
        self.network.parameters()
    }

    fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        self.network.parameters_mut()
    }
}

impl Actor for MlpActor {
    fn evaluate(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.network.forward(states)
    }

    fn gradient_step(&mut self, states: ArrayView2<f32>, action_grads: ArrayView2<f32>) -> Result<()> {
        let expected = (states.nrows(), self.action_size());
        if action_grads.dim() != expected {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", expected),
                format!("{:?}", action_grads.dim()),
            ));
        }

        let (_, trace) = self.network.forward_traced(states)?;
        let gradients = self.network.backward(&trace, action_grads)?;
        self.network.apply_gradients(&gradients, self.learning_rate)
    }

    fn state_size(&self) -> usize {
        self.network.input_size()
    }

    fn action_size(&self) -> usize {
        self.network.output_size()
    }
}

/// Critic network over the concatenated `[state | action]` input with a linear scalar head.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MlpCritic {
    pub network: NeuralNetwork,
    pub learning_rate: f32,
    state_size: usize,
    action_size: usize,
}

impl MlpCritic {
    pub fn new<R: Rng + ?Sized>(
        state_size: usize,
        action_size: usize,
        hidden_sizes: &[usize],
        optimizer: OptimizerWrapper,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut sizes = vec![state_size + action_size];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(1);

        let activations = vec![Activation::Relu; hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(Activation::Linear))
            .collect::<Vec<_>>();

        let network = NeuralNetwork::new(&sizes, &activations, optimizer, rng)?;
        Ok(MlpCritic {
            network,
            learning_rate,
            state_size,
            action_size,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.network.save(path)
    }

    pub fn load<P: AsRef<Path>>(path: P, action_size: usize, learning_rate: f32) -> Result<Self> {
        let network = NeuralNetwork::load(path)?;
        let state_size = network.input_size().checked_sub(action_size).ok_or_else(|| {
            DdpgError::invalid_parameter("action_size", "larger than the critic's input")
        })?;
        Ok(MlpCritic {
            network,
            learning_rate,
            state_size,
            action_size,
        })
    }

    fn joint_input(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        if states.ncols() != self.state_size || actions.ncols() != self.action_size {
            return Err(DdpgError::dimension_mismatch(
                format!("{} state and {} action features", self.state_size, self.action_size),
                format!("{} state and {} action features", states.ncols(), actions.ncols()),
            ));
        }
        concatenate(Axis(1), &[states.view(), actions.view()]).map_err(|_| {
            DdpgError::dimension_mismatch(
                format!("{} action rows", states.nrows()),
                format!("{} action rows", actions.nrows()),
            )
        })
    }

    fn value_column(&self, rows: usize, value_grads: ArrayView1<f32>) -> Result<Array2<f32>> {
        if value_grads.len() != rows {
            return Err(DdpgError::dimension_mismatch(
                format!("{} value gradients", rows),
                format!("{} value gradients", value_grads.len()),
            ));
        }
        Ok(value_grads.to_owned().insert_axis(Axis(1)))
    }
}

impl Parameterized for MlpCritic {
    fn parameters(&self) -> Vec<ArrayViewD<'_, f32>> {
        self.network.parameters()
    }

    fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        self.network.parameters_mut()
    }
}

impl Critic for MlpCritic {
    fn evaluate(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array1<f32>> {
        let inputs = self.joint_input(states, actions)?;
        let values = self.network.forward(inputs.view())?;
        Ok(values.column(0).to_owned())
    }

    fn action_gradient(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        value_grads: ArrayView1<f32>,
    ) -> Result<Array2<f32>> {
        let inputs = self.joint_input(states, actions)?;
        let output_grads = self.value_column(inputs.nrows(), value_grads)?;
        let (_, trace) = self.network.forward_traced(inputs.view())?;
        let gradients = self.network.backward(&trace, output_grads.view())?;
        Ok(gradients.inputs.slice(s![.., self.state_size..]).to_owned())
    }

    fn gradient_step(
        &mut self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        value_grads: ArrayView1<f32>,
    ) -> Result<()> {
        let inputs = self.joint_input(states, actions)?;
        let output_grads = self.value_column(inputs.nrows(), value_grads)?;
        let (_, trace) = self.network.forward_traced(inputs.view())?;
        let gradients = self.network.backward(&trace, output_grads.view())?;
        self.network.apply_gradients(&gradients, self.learning_rate)
    }
}
