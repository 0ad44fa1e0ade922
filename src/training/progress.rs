// Training progress reporting
//
// The driver never writes output itself; it emits TrainingEvents into a
// ProgressSink supplied by the caller.

use tokio::sync::mpsc;

use crate::metrics::{BatchMetrics, ValidationSummary};

/// Something worth reporting during a training run
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    /// An epoch is about to begin (0-based)
    EpochStarted { epoch: usize, epochs: usize },
    /// Periodic report of a training step's metrics
    BatchProgress {
        epoch: usize,
        iteration: usize,
        batches_per_epoch: usize,
        metrics: BatchMetrics,
    },
    /// Epoch-level validation averages
    ValidationCompleted {
        epoch: usize,
        epochs: usize,
        summary: ValidationSummary,
    },
    /// A validation loader was present but too small for a single batch
    ValidationSkipped {
        epoch: usize,
        epochs: usize,
        samples: usize,
        batch_size: usize,
    },
    /// The trained model was written
    ModelSaved { uri: String },
}

/// Receiver of training events
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &TrainingEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&TrainingEvent) + Send + Sync,
{
    fn on_event(&self, event: &TrainingEvent) {
        self(event)
    }
}

/// Renders events as tracing log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_event(&self, event: &TrainingEvent) {
        match event {
            TrainingEvent::EpochStarted { epoch, epochs } => {
                tracing::info!(epoch, epochs, "Epoch {}/{} start", epoch, epochs);
            }
            TrainingEvent::BatchProgress {
                epoch,
                iteration,
                batches_per_epoch,
                metrics,
            } => {
                tracing::info!(
                    epoch,
                    loss = metrics.loss,
                    accuracy = metrics.accuracy,
                    "Iteration {}/{} result --- loss: {} accuracy: {}",
                    iteration,
                    batches_per_epoch,
                    metrics.loss,
                    metrics.accuracy
                );
            }
            TrainingEvent::ValidationCompleted {
                epoch,
                epochs,
                summary,
            } => {
                tracing::info!(
                    batches = summary.batches,
                    "Validation Result {}/{} result --- loss: {} accuracy: {}",
                    epoch,
                    epochs,
                    summary.loss,
                    summary.accuracy
                );
            }
            TrainingEvent::ValidationSkipped {
                epoch,
                epochs,
                samples,
                batch_size,
            } => {
                tracing::warn!(
                    samples,
                    batch_size,
                    "Validation {}/{} skipped: fewer samples than one batch",
                    epoch,
                    epochs
                );
            }
            TrainingEvent::ModelSaved { uri } => {
                tracing::info!(uri = %uri, "Saved trained model");
            }
        }
    }
}

/// Forwards events to an unbounded channel
///
/// Events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TrainingEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<TrainingEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TrainingEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_event(&self, event: &TrainingEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!("Progress receiver dropped, discarding event");
        }
    }
}
