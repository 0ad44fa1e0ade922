// Training driver - epochs of mini-batch training with optional validation
//
// Everything is awaited in order on the caller's task: loader fetches,
// optimizer steps, evaluations and the final save never overlap.

use anyhow::{Context, Result};
use std::sync::Arc;

use super::progress::{ProgressSink, TracingSink, TrainingEvent};
use crate::config::TrainArgs;
use crate::data::{DataLoader, ImageDataset, StackedBatch, TensorLedger};
use crate::metrics::MetricsAccumulator;
use crate::models::{model_uri, TrainableModel, UniModel};

/// Full batches that fit in `count` samples; the remainder is never visited
pub fn batches_per_epoch(count: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    count / batch_size
}

/// Report every n-th batch, roughly ten reports per epoch
pub fn log_interval(batches_per_epoch: usize) -> usize {
    (batches_per_epoch / 10).max(1)
}

/// Runs a training job described by [`TrainArgs`]
pub struct TrainingDriver {
    args: TrainArgs,
    sink: Arc<dyn ProgressSink>,
    ledger: Arc<TensorLedger>,
}

impl TrainingDriver {
    /// Create a driver, rejecting invalid arguments up front
    pub fn new(args: TrainArgs) -> Result<Self> {
        args.validate().context("Invalid training arguments")?;
        Ok(Self {
            args,
            sink: Arc::new(TracingSink),
            ledger: TensorLedger::new(),
        })
    }

    /// Route progress events to `sink` instead of the log
    pub fn with_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn args(&self) -> &TrainArgs {
        &self.args
    }

    /// Stacked-tensor bookkeeping for this driver's runs
    pub fn ledger(&self) -> Arc<TensorLedger> {
        Arc::clone(&self.ledger)
    }

    /// Train `model` on `dataset`, save it and hand it back
    ///
    /// The returned wrapper carries the trained model and the untouched
    /// metadata of the input wrapper. Any failure aborts the whole run.
    pub async fn run<M, Meta>(
        &self,
        dataset: &mut ImageDataset,
        model: UniModel<M, Meta>,
    ) -> Result<UniModel<M, Meta>>
    where
        M: TrainableModel,
    {
        let (mut model, metadata) = model.into_parts();
        let epochs = self.args.epochs;
        let batch_size = self.args.batch_size;

        let count = dataset
            .train_loader
            .len()
            .await
            .context("Failed to query training sample count")?;
        let train_batches = batches_per_epoch(count, batch_size);

        let validation = match dataset.validation_loader.as_ref() {
            Some(loader) => {
                let samples = loader
                    .len()
                    .await
                    .context("Failed to query validation sample count")?;
                Some((samples, batches_per_epoch(samples, batch_size)))
            }
            None => None,
        };

        tracing::info!(
            samples = count,
            batch_size,
            batches_per_epoch = train_batches,
            epochs,
            validation_batches = ?validation.map(|(_, batches)| batches),
            "Starting training"
        );

        let interval = log_interval(train_batches);

        for epoch in 0..epochs {
            self.sink
                .on_event(&TrainingEvent::EpochStarted { epoch, epochs });

            for iteration in 0..train_batches {
                let batch = self
                    .fetch_batch(dataset.train_loader.as_mut(), batch_size)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to prepare training batch {}/{} of epoch {}",
                            iteration, train_batches, epoch
                        )
                    })?;

                let metrics = model
                    .train_on_batch(batch.inputs(), batch.targets())
                    .await
                    .with_context(|| {
                        format!(
                            "Training step failed on batch {}/{} of epoch {}",
                            iteration, train_batches, epoch
                        )
                    })?;
                drop(batch);

                if iteration % interval == 0 {
                    self.sink.on_event(&TrainingEvent::BatchProgress {
                        epoch,
                        iteration,
                        batches_per_epoch: train_batches,
                        metrics,
                    });
                }
            }

            if let (Some(loader), Some((samples, val_batches))) =
                (dataset.validation_loader.as_mut(), validation)
            {
                if val_batches == 0 {
                    self.sink.on_event(&TrainingEvent::ValidationSkipped {
                        epoch,
                        epochs,
                        samples,
                        batch_size,
                    });
                    continue;
                }

                let mut accumulator = MetricsAccumulator::new();
                for iteration in 0..val_batches {
                    let batch = self
                        .fetch_batch(loader.as_mut(), batch_size)
                        .await
                        .with_context(|| {
                            format!(
                                "Failed to prepare validation batch {}/{} of epoch {}",
                                iteration, val_batches, epoch
                            )
                        })?;

                    let output = model
                        .evaluate(batch.inputs(), batch.targets())
                        .await
                        .with_context(|| {
                            format!(
                                "Evaluation failed on validation batch {}/{} of epoch {}",
                                iteration, val_batches, epoch
                            )
                        })?;
                    drop(batch);

                    accumulator.add(output.to_metrics()?);
                }

                if let Some(summary) = accumulator.average() {
                    self.sink.on_event(&TrainingEvent::ValidationCompleted {
                        epoch,
                        epochs,
                        summary,
                    });
                }
            }
        }

        let uri = model_uri(self.args.model_path());
        model
            .save(&uri)
            .await
            .with_context(|| format!("Failed to save model to {}", uri))?;
        self.sink.on_event(&TrainingEvent::ModelSaved { uri });

        Ok(UniModel::new(model, metadata))
    }

    async fn fetch_batch(
        &self,
        loader: &mut dyn DataLoader,
        batch_size: usize,
    ) -> Result<StackedBatch> {
        let samples = loader.next_batch(batch_size).await?;
        tracing::debug!(samples = samples.len(), "Fetched batch");
        StackedBatch::stack(samples, &self.ledger)
    }
}

/// Train with the default tracing sink
pub async fn train<M, Meta>(
    dataset: &mut ImageDataset,
    model: UniModel<M, Meta>,
    args: &TrainArgs,
) -> Result<UniModel<M, Meta>>
where
    M: TrainableModel,
{
    TrainingDriver::new(args.clone())?.run(dataset, model).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_per_epoch_floors() {
        assert_eq!(batches_per_epoch(32, 16), 2);
        assert_eq!(batches_per_epoch(100, 16), 6);
        assert_eq!(batches_per_epoch(15, 16), 0);
        assert_eq!(batches_per_epoch(0, 16), 0);
    }

    #[test]
    fn test_batches_per_epoch_zero_batch_size() {
        assert_eq!(batches_per_epoch(10, 0), 0);
    }

    #[test]
    fn test_log_interval_never_zero() {
        assert_eq!(log_interval(0), 1);
        assert_eq!(log_interval(6), 1);
        assert_eq!(log_interval(25), 2);
        assert_eq!(log_interval(100), 10);
    }

    #[test]
    fn test_new_rejects_invalid_args() {
        assert!(TrainingDriver::new(TrainArgs::new("model").with_epochs(0)).is_err());
        assert!(TrainingDriver::new(TrainArgs::new("model").with_batch_size(0)).is_err());
        assert!(TrainingDriver::new(TrainArgs::new("model")).is_ok());
    }
}
