// Running sums of per-batch metrics, averaged per epoch

use super::types::{BatchMetrics, ValidationSummary};

#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    loss_sum: f64,
    accuracy_sum: f64,
    batches: usize,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, metrics: BatchMetrics) {
        self.loss_sum += metrics.loss;
        self.accuracy_sum += metrics.accuracy;
        self.batches += 1;
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Averages over all added batches, or None if nothing was added
    pub fn average(&self) -> Option<ValidationSummary> {
        if self.batches == 0 {
            return None;
        }
        let n = self.batches as f64;
        Some(ValidationSummary {
            loss: self.loss_sum / n,
            accuracy: self.accuracy_sum / n,
            batches: self.batches,
        })
    }
}
