// Training arguments

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Precondition violations in training arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrainArgsError {
    #[error("epochs must be a positive integer")]
    ZeroEpochs,

    #[error("batch size must be a positive integer")]
    ZeroBatchSize,

    #[error("model path is required")]
    MissingModelPath,
}

/// Arguments for a training run, as handed over by the host pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainArgs {
    /// Number of full passes over the training data (default: 10)
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Samples per batch (default: 16)
    #[serde(default = "default_batch_size", alias = "batchSize")]
    pub batch_size: usize,

    /// Destination of the saved model
    #[serde(alias = "modelPath")]
    pub model_path: PathBuf,
}

fn default_epochs() -> usize {
    10
}

fn default_batch_size() -> usize {
    16
}

impl TrainArgs {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            model_path: model_path.into(),
        }
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Check preconditions before any loader or model call is made
    pub fn validate(&self) -> Result<(), TrainArgsError> {
        if self.epochs == 0 {
            return Err(TrainArgsError::ZeroEpochs);
        }
        if self.batch_size == 0 {
            return Err(TrainArgsError::ZeroBatchSize);
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(TrainArgsError::MissingModelPath);
        }
        Ok(())
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}
