// Model contract consumed by the training driver

use anyhow::Result;
use async_trait::async_trait;
use candle_core::Tensor;

use crate::metrics::{BatchMetrics, EvalOutput};

/// A model that can take optimizer steps, evaluate and persist itself
#[async_trait]
pub trait TrainableModel: Send {
    /// Run one optimizer step on a stacked batch
    async fn train_on_batch(&mut self, inputs: &Tensor, targets: &Tensor) -> Result<BatchMetrics>;

    /// Compute loss and accuracy on a stacked batch without updating weights
    async fn evaluate(&self, inputs: &Tensor, targets: &Tensor) -> Result<EvalOutput>;

    /// Persist the model at `uri` (`file://...`), replacing any existing artifact
    async fn save(&self, uri: &str) -> Result<()>;
}

/// A trainable model plus whatever metadata the pipeline attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct UniModel<M, Meta = ()> {
    pub model: M,
    pub metadata: Meta,
}

impl<M, Meta> UniModel<M, Meta> {
    pub fn new(model: M, metadata: Meta) -> Self {
        Self { model, metadata }
    }

    pub fn into_parts(self) -> (M, Meta) {
        (self.model, self.metadata)
    }
}
