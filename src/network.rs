use ndarray::{Array1, Array2, ArrayView2, ArrayViewD, ArrayViewMutD};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::{DenseLayer, LayerTrace, WeightInit};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// Output layers start close to zero so early actions and values are near neutral.
pub const OUTPUT_INIT_LIMIT: f32 = 3e-3;

/// Per-layer traces recorded by [`NeuralNetwork::forward_traced`].
#[derive(Clone, Debug)]
pub struct NetworkTrace {
    layers: Vec<LayerTrace>,
}

/// Parameter gradients for every layer plus the gradient with respect to the network input.
#[derive(Clone, Debug)]
pub struct NetworkGradients {
    pub layers: Vec<(Array2<f32>, Array1<f32>)>,
    pub inputs: Array2<f32>,
}

impl NetworkGradients {
    pub fn is_finite(&self) -> bool {
        self.layers.iter().all(|(w, b)| {
            w.iter().all(|g| g.is_finite()) && b.iter().all(|g| g.is_finite())
        })
    }
}

/// A feed-forward network of dense layers and the optimizer that trains it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a network with the given layer sizes and activations.
    ///
    /// Hidden layers use fan-in uniform initialization and the output layer a
    /// small uniform range of `±OUTPUT_INIT_LIMIT`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DdpgError::invalid_parameter(
                "layer_sizes",
                "at least an input and an output size are required",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} activations", layer_sizes.len() - 1),
                format!("{} activations", activations.len()),
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DdpgError::invalid_parameter("layer_sizes", "sizes must be non-zero"));
        }

        let last = activations.len() - 1;
        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .enumerate()
            .map(|(i, (window, &activation))| {
                let init = if i == last {
                    WeightInit::Uniform { min: -OUTPUT_INIT_LIMIT, max: OUTPUT_INIT_LIMIT }
                } else {
                    WeightInit::FanIn
                };
                DenseLayer::new(window[0], window[1], activation, init, rng)
            })
            .collect::<Vec<_>>();

        Ok(NeuralNetwork { layers, optimizer })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Inference forward pass for a batch (one row per sample).
    pub fn forward(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.forward(current.view())?;
        }
        Ok(current)
    }

    /// Training forward pass that keeps what backpropagation needs.
    pub fn forward_traced(&self, inputs: ArrayView2<f32>) -> Result<(Array2<f32>, NetworkTrace)> {
        let mut current = inputs.to_owned();
        let mut traces = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let (output, trace) = layer.forward_traced(current.view())?;
            traces.push(trace);
            current = output;
        }
        Ok((current, NetworkTrace { layers: traces }))
    }

    /// Backpropagate `output_grads` (dL/d outputs) from the last layer to the input.
    pub fn backward(&self, trace: &NetworkTrace, output_grads: ArrayView2<f32>) -> Result<NetworkGradients> {
        if trace.layers.len() != self.layers.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} layer traces", self.layers.len()),
                format!("{} layer traces", trace.layers.len()),
            ));
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        let mut current = output_grads.to_owned();
        for (layer, layer_trace) in self.layers.iter().zip(&trace.layers).rev() {
            let grads = layer.backward(layer_trace, current.view())?;
            layers.push((grads.weights, grads.biases));
            current = grads.inputs;
        }
        layers.reverse();

        Ok(NetworkGradients { layers, inputs: current })
    }

    /// Apply one optimizer step. Nothing is modified unless every gradient is finite.
    pub fn apply_gradients(&mut self, gradients: &NetworkGradients, learning_rate: f32) -> Result<()> {
        if gradients.layers.len() != self.layers.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} layer gradients", self.layers.len()),
                format!("{} layer gradients", gradients.layers.len()),
            ));
        }
        for (layer, (w, b)) in self.layers.iter().zip(&gradients.layers) {
            if w.dim() != layer.weights.dim() || b.dim() != layer.biases.dim() {
                return Err(DdpgError::dimension_mismatch(
                    format!("{:?}/{:?}", layer.weights.dim(), layer.biases.dim()),
                    format!("{:?}/{:?}", w.dim(), b.dim()),
                ));
            }
        }
        if !gradients.is_finite() {
            log::warn!("non-finite gradient, skipping parameter update");
            return Err(DdpgError::Numerical("non-finite gradient".to_string()));
        }

        self.optimizer.begin_step();
        for (i, (layer, (w, b))) in self.layers.iter_mut().zip(&gradients.layers).enumerate() {
            self.optimizer.update_weights(i, &mut layer.weights, w, learning_rate);
            self.optimizer.update_biases(i, &mut layer.biases, b, learning_rate);
        }
        Ok(())
    }

    /// Every parameter tensor in a fixed order: weights then biases, layer by layer.
    pub fn parameters(&self) -> Vec<ArrayViewD<'_, f32>> {
        let mut params = Vec::with_capacity(self.layers.len() * 2);
        for layer in &self.layers {
            params.push(layer.weights.view().into_dyn());
            params.push(layer.biases.view().into_dyn());
        }
        params
    }

    /// Mutable counterpart of [`NeuralNetwork::parameters`], in the same order.
    pub fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        let mut params = Vec::with_capacity(self.layers.len() * 2);
        for layer in &mut self.layers {
            params.push(layer.weights.view_mut().into_dyn());
            params.push(layer.biases.view_mut().into_dyn());
        }
        params
    }

    /// Save the network, including optimizer state, to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load a network previously written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let network: Self = bincode::deserialize(&buffer)?;
        Ok(network)
    }
}
