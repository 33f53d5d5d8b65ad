use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::initialization::WeightInit;
use crate::activations::Activation;
use crate::error::{DdpgError, Result};

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Values recorded by a training-mode forward pass, consumed by `backward`.
#[derive(Clone, Debug)]
pub struct LayerTrace {
    inputs: Array2<f32>,
    pre_activation: Array2<f32>,
}

/// Gradients of a loss with respect to one layer's parameters and inputs.
#[derive(Clone, Debug)]
pub struct LayerGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub inputs: Array2<f32>,
}

impl DenseLayer {
    /// Create a new dense layer with the given input size, output size, activation and initialization.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Self {
        let weights = init.initialize_weights((input_size, output_size), rng);
        let biases = init.initialize_biases(input_size, output_size, rng);
        DenseLayer {
            weights,
            biases,
            activation,
        }
    }

    /// Inference forward pass. Records nothing.
    pub fn forward(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut outputs = self.affine(inputs)?;
        self.activation.apply_batch(&mut outputs);
        Ok(outputs)
    }

    /// Training forward pass, returning the outputs and the trace needed by `backward`.
    pub fn forward_traced(&self, inputs: ArrayView2<f32>) -> Result<(Array2<f32>, LayerTrace)> {
        let pre_activation = self.affine(inputs)?;
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        let trace = LayerTrace {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        Ok((outputs, trace))
    }

    /// Backpropagate `output_grads` (dL/d outputs) through the layer.
    pub fn backward(&self, trace: &LayerTrace, output_grads: ArrayView2<f32>) -> Result<LayerGradients> {
        if output_grads.dim() != trace.pre_activation.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", trace.pre_activation.dim()),
                format!("{:?}", output_grads.dim()),
            ));
        }

        let activation_deriv = self.activation.derivative_batch(trace.pre_activation.view());
        let delta = &output_grads * &activation_deriv;

        Ok(LayerGradients {
            weights: trace.inputs.t().dot(&delta),
            biases: delta.sum_axis(Axis(0)),
            inputs: delta.dot(&self.weights.t()),
        })
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    fn affine(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        if inputs.ncols() != self.input_size() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} input features", self.input_size()),
                format!("{} input features", inputs.ncols()),
            ));
        }
        Ok(inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0)))
    }
}
