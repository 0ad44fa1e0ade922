// Batch stacking with scoped tensor lifetime
//
// A StackedBatch owns the two tensors built from a batch of samples and
// gives them back to the allocator when dropped, on success and error paths
// alike. The ledger counts both sides so callers can check the balance.

use anyhow::{bail, Context, Result};
use candle_core::Tensor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::Sample;

/// Counts stacked tensors handed out and released
#[derive(Debug, Default)]
pub struct TensorLedger {
    allocated: AtomicUsize,
    released: AtomicUsize,
}

impl TensorLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Tensors currently alive
    pub fn outstanding(&self) -> usize {
        self.allocated().saturating_sub(self.released())
    }

    fn record_allocation(&self, count: usize) {
        self.allocated.fetch_add(count, Ordering::SeqCst);
    }

    fn record_release(&self, count: usize) {
        self.released.fetch_add(count, Ordering::SeqCst);
    }
}

/// Inputs and targets stacked along a new leading batch axis
#[derive(Debug)]
pub struct StackedBatch {
    inputs: Tensor,
    targets: Tensor,
    ledger: Arc<TensorLedger>,
}

impl StackedBatch {
    const TENSORS: usize = 2;

    /// Stack `samples` into one input tensor and one target tensor
    ///
    /// The samples are consumed; per-sample tensors and any intermediates
    /// are dropped before this returns.
    pub fn stack(samples: Vec<Sample>, ledger: &Arc<TensorLedger>) -> Result<Self> {
        if samples.is_empty() {
            bail!("Cannot stack an empty batch");
        }

        let (data, labels): (Vec<Tensor>, Vec<Tensor>) = samples
            .into_iter()
            .map(|sample| (sample.data, sample.label))
            .unzip();

        let inputs = Tensor::stack(&data, 0).context("Failed to stack sample data")?;
        let targets = Tensor::stack(&labels, 0).context("Failed to stack sample labels")?;

        ledger.record_allocation(Self::TENSORS);

        Ok(Self {
            inputs,
            targets,
            ledger: Arc::clone(ledger),
        })
    }

    pub fn inputs(&self) -> &Tensor {
        &self.inputs
    }

    pub fn targets(&self) -> &Tensor {
        &self.targets
    }

    /// Number of samples in the batch
    pub fn len(&self) -> usize {
        self.inputs.dims().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for StackedBatch {
    fn drop(&mut self) {
        self.ledger.record_release(Self::TENSORS);
    }
}
