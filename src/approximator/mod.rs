//! # Function Approximator Contract
//!
//! The learner never looks inside the actor or the critic. It only needs:
//!
//! - a pure, batched `evaluate` (inference mode: `&self`, nothing recorded),
//! - a `gradient_step` that receives the gradient of the loss with respect to
//!   the model output and updates the model's own parameters,
//! - for the critic, the gradient of the loss with respect to its action input,
//!   which is how the actor's objective flows through the critic,
//! - an ordered, enumerable parameter set for target blending.
//!
//! [`mlp`] provides dense-network implementations of both roles.

pub mod mlp;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewD, ArrayViewMutD};

use crate::error::Result;

pub use mlp::{MlpActor, MlpCritic};

/// A model whose parameters can be enumerated in a stable order.
pub trait Parameterized {
    fn parameters(&self) -> Vec<ArrayViewD<'_, f32>>;
    fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f32>>;
}

/// Deterministic policy: state -> action.
pub trait Actor: Parameterized + Clone + Send + Sync {
    /// Evaluate a batch of states (one per row) in inference mode.
    fn evaluate(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// One optimizer step given dL/d actions for the batch. Applies nothing on error.
    fn gradient_step(&mut self, states: ArrayView2<f32>, action_grads: ArrayView2<f32>) -> Result<()>;

    fn state_size(&self) -> usize;
    fn action_size(&self) -> usize;
}

/// Action-value function: (state, action) -> scalar value.
pub trait Critic: Parameterized + Clone + Send + Sync {
    /// Evaluate a batch of state/action pairs in inference mode.
    fn evaluate(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array1<f32>>;

    /// dL/d actions given dL/d values. Parameters are left untouched.
    fn action_gradient(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        value_grads: ArrayView1<f32>,
    ) -> Result<Array2<f32>>;

    /// One optimizer step given dL/d values for the batch. Applies nothing on error.
    fn gradient_step(
        &mut self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        value_grads: ArrayView1<f32>,
    ) -> Result<()>;
}
