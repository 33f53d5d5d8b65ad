use ndarray::{Array1, ArrayView1};

use crate::error::{DdpgError, Result};

/// Mean squared error between `predictions` and constant `targets`.
///
/// Returns `(loss, dL/d predictions)`. Targets are not differentiated through.
pub fn mse(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<(f32, Array1<f32>)> {
    if predictions.len() != targets.len() {
        return Err(DdpgError::dimension_mismatch(
            format!("{} targets", predictions.len()),
            format!("{} targets", targets.len()),
        ));
    }
    if predictions.is_empty() {
        return Err(DdpgError::invalid_parameter("predictions", "empty batch"));
    }

    let n = predictions.len() as f32;
    let diff = &predictions - &targets;
    let loss = diff.mapv(|d| d * d).sum() / n;
    let gradient = diff * (2.0 / n);
    Ok((loss, gradient))
}

/// Negated mean of `values`, the objective minimised to maximise value.
///
/// Returns `(loss, dL/d values)`.
pub fn negated_mean(values: ArrayView1<f32>) -> Result<(f32, Array1<f32>)> {
    if values.is_empty() {
        return Err(DdpgError::invalid_parameter("values", "empty batch"));
    }

    let n = values.len() as f32;
    let loss = -values.sum() / n;
    let gradient = Array1::from_elem(values.len(), -1.0 / n);
    Ok((loss, gradient))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse_value_and_gradient() {
        let predictions = array![1.0, 2.0, 3.0, 4.0];
        let targets = array![1.0, 1.0, 1.0, 1.0];
        let (loss, grad) = mse(predictions.view(), targets.view()).unwrap();
        assert!((loss - 3.5).abs() < 1e-6);
        assert_eq!(grad, array![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_mse_rejects_mismatched_lengths() {
        let result = mse(array![1.0, 2.0].view(), array![1.0].view());
        assert!(matches!(result, Err(DdpgError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_negated_mean() {
        let (loss, grad) = negated_mean(array![2.0, 4.0].view()).unwrap();
        assert_eq!(loss, -3.0);
        assert_eq!(grad, array![-0.5, -0.5]);
    }
}
