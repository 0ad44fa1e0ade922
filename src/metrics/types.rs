// Metrics data types

use anyhow::{Context, Result};
use candle_core::{DType, Tensor};
use serde::{Deserialize, Serialize};

/// Scalar results of one optimizer step or evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub loss: f64,
    pub accuracy: f64,
}

impl BatchMetrics {
    pub fn new(loss: f64, accuracy: f64) -> Self {
        Self { loss, accuracy }
    }
}

/// Loss and accuracy tensor handles returned by an evaluation
///
/// Unlike training steps, evaluation hands back tensors; the caller reads
/// them out with [`EvalOutput::to_metrics`].
#[derive(Debug, Clone)]
pub struct EvalOutput {
    pub loss: Tensor,
    pub accuracy: Tensor,
}

impl EvalOutput {
    pub fn new(loss: Tensor, accuracy: Tensor) -> Self {
        Self { loss, accuracy }
    }

    pub fn to_metrics(&self) -> Result<BatchMetrics> {
        let loss = scalar_value(&self.loss).context("Failed to read evaluation loss")?;
        let accuracy =
            scalar_value(&self.accuracy).context("Failed to read evaluation accuracy")?;
        Ok(BatchMetrics::new(loss, accuracy))
    }
}

/// Epoch-level validation averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub loss: f64,
    pub accuracy: f64,
    /// Number of validation batches averaged
    pub batches: usize,
}

/// Read a single-element tensor of any rank and dtype as f64
pub fn scalar_value(tensor: &Tensor) -> Result<f64> {
    let count = tensor.elem_count();
    if count != 1 {
        anyhow::bail!(
            "Expected a scalar tensor, got {} elements (shape {:?})",
            count,
            tensor.dims()
        );
    }
    let values = tensor.flatten_all()?.to_dtype(DType::F64)?.to_vec1::<f64>()?;
    Ok(values[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_scalar_value_from_rank_zero() {
        let tensor = Tensor::new(0.25f32, &Device::Cpu).unwrap();
        assert!((scalar_value(&tensor).unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_scalar_value_from_single_element_vector() {
        let tensor = Tensor::new(&[3u32], &Device::Cpu).unwrap();
        assert_eq!(scalar_value(&tensor).unwrap(), 3.0);
    }

    #[test]
    fn test_scalar_value_rejects_empty() {
        let tensor = Tensor::zeros(0, DType::F32, &Device::Cpu).unwrap();
        assert!(scalar_value(&tensor).is_err());
    }

    #[test]
    fn test_scalar_value_rejects_per_sample_vector() {
        let tensor = Tensor::new(&[0.5f32, 1.5, 2.5], &Device::Cpu).unwrap();
        let err = scalar_value(&tensor).unwrap_err();
        assert!(err.to_string().contains("3 elements"));
    }

    #[test]
    fn test_eval_output_to_metrics() {
        let output = EvalOutput::new(
            Tensor::new(1.5f32, &Device::Cpu).unwrap(),
            Tensor::new(0.5f32, &Device::Cpu).unwrap(),
        );
        let metrics = output.to_metrics().unwrap();
        assert!((metrics.loss - 1.5).abs() < 1e-6);
        assert!((metrics.accuracy - 0.5).abs() < 1e-6);
    }
}
