//! Training objectives used by the learner, each returning the loss value
//! together with its gradient with respect to the model output.

pub mod functions;

pub use functions::{mse, negated_mean};
