//! # Activation Functions
//!
//! Elementwise non-linearities used by the bundled actor and critic networks.
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers
//! - **Tanh**: bounded to (-1, 1), used as the actor's output head
//! - **Linear**: identity, used as the critic's output head
//!
//! Every variant provides its derivative with respect to the pre-activation
//! value so layers can backpropagate without an autodiff engine.

pub mod functions;

pub use functions::Activation;
