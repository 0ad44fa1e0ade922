// Data module
// Samples, batch loaders and the dataset handed to the training driver

pub mod batch;
pub mod memory;

pub use batch::{StackedBatch, TensorLedger};
pub use memory::InMemoryLoader;

use anyhow::Result;
use async_trait::async_trait;
use candle_core::Tensor;

/// One labeled example
#[derive(Debug, Clone)]
pub struct Sample {
    pub data: Tensor,
    pub label: Tensor,
}

impl Sample {
    pub fn new(data: Tensor, label: Tensor) -> Self {
        Self { data, label }
    }
}

/// Asynchronous source of sample batches
///
/// Sampling order (sequential, shuffled, ...) is up to the implementation.
/// Every call to `next_batch` hands ownership of fresh samples to the caller.
#[async_trait]
pub trait DataLoader: Send {
    /// Number of samples available
    async fn len(&self) -> Result<usize>;

    /// Whether the loader has no samples at all
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Produce the next `batch_size` samples
    async fn next_batch(&mut self, batch_size: usize) -> Result<Vec<Sample>>;
}

/// Training data plus optional validation data
pub struct ImageDataset {
    pub train_loader: Box<dyn DataLoader>,
    pub validation_loader: Option<Box<dyn DataLoader>>,
}

impl ImageDataset {
    pub fn new(train_loader: impl DataLoader + 'static) -> Self {
        Self {
            train_loader: Box::new(train_loader),
            validation_loader: None,
        }
    }

    pub fn with_validation(mut self, validation_loader: impl DataLoader + 'static) -> Self {
        self.validation_loader = Some(Box::new(validation_loader));
        self
    }
}
