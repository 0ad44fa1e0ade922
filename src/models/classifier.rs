// Image classifier backed by candle
//
// Flatten -> Linear -> ReLU -> Linear, trained with AdamW on cross-entropy.
// Labels may be class indices (rank 1 after stacking) or one-hot rows (rank 2).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{linear, loss, AdamW, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::common::TrainableModel;
use super::persistence::{load_model_metadata, save_model_with_metadata, ModelMetadata};
use super::uri::path_from_uri;
use crate::metrics::{BatchMetrics, EvalOutput};

const MODEL_TYPE: &str = "image_classifier";

/// Classifier shape and optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Flattened size of one input image (channels * height * width)
    pub input_dim: usize,
    pub hidden_dim: usize,
    pub num_classes: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
}

impl ClassifierConfig {
    pub fn new(input_dim: usize, num_classes: usize) -> Self {
        Self {
            input_dim,
            hidden_dim: 64,
            num_classes,
            learning_rate: 1e-3,
            weight_decay: 0.0,
        }
    }

    pub fn with_hidden_dim(mut self, hidden_dim: usize) -> Self {
        self.hidden_dim = hidden_dim;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

pub struct ImageClassifier {
    config: ClassifierConfig,
    varmap: VarMap,
    hidden: Linear,
    output: Linear,
    optimizer: AdamW,
    device: Device,
    step: usize,
}

impl ImageClassifier {
    /// Create a randomly initialised classifier
    pub fn new(config: ClassifierConfig, device: &Device) -> Result<Self> {
        if config.input_dim == 0 || config.hidden_dim == 0 || config.num_classes == 0 {
            bail!("Classifier dimensions must be positive: {:?}", config);
        }

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let hidden = linear(config.input_dim, config.hidden_dim, vb.pp("hidden"))?;
        let output = linear(config.hidden_dim, config.num_classes, vb.pp("output"))?;

        let params = ParamsAdamW {
            lr: config.learning_rate,
            weight_decay: config.weight_decay,
            ..Default::default()
        };
        let optimizer = AdamW::new(varmap.all_vars(), params)?;

        Ok(Self {
            config,
            varmap,
            hidden,
            output,
            optimizer,
            device: device.clone(),
            step: 0,
        })
    }

    /// Restore a classifier saved with [`TrainableModel::save`]
    pub fn load(weights_path: &Path, device: &Device) -> Result<Self> {
        let metadata = load_model_metadata(weights_path)?;
        if metadata.model_type != MODEL_TYPE {
            bail!(
                "Expected a {} model at {:?}, found {}",
                MODEL_TYPE,
                weights_path,
                metadata.model_type
            );
        }

        let mut model = Self::new(metadata.config, device)?;
        model
            .varmap
            .load(weights_path)
            .with_context(|| format!("Failed to load weights from {:?}", weights_path))?;
        model.step = metadata.training_step;

        tracing::info!(
            path = %weights_path.display(),
            step = model.step,
            "Loaded image classifier"
        );

        Ok(model)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Optimizer steps taken so far
    pub fn step(&self) -> usize {
        self.step
    }

    /// Class logits, shape [batch, num_classes]
    pub fn forward(&self, inputs: &Tensor) -> Result<Tensor> {
        let xs = inputs.to_dtype(DType::F32)?.flatten_from(1)?;
        let features = xs.dim(1)?;
        if features != self.config.input_dim {
            bail!(
                "Input has {} features per sample, classifier expects {}",
                features,
                self.config.input_dim
            );
        }

        let hidden = self.hidden.forward(&xs)?.relu()?;
        Ok(self.output.forward(&hidden)?)
    }

    /// Predicted class index per sample
    pub fn predict(&self, inputs: &Tensor) -> Result<Tensor> {
        Ok(self.forward(inputs)?.argmax(D::Minus1)?)
    }

    fn class_indices(targets: &Tensor) -> Result<Tensor> {
        match targets.rank() {
            1 => Ok(targets.to_dtype(DType::U32)?),
            2 => Ok(targets.argmax(D::Minus1)?),
            rank => bail!("Targets must be class indices or one-hot rows, got rank {}", rank),
        }
    }

    fn loss_and_accuracy(&self, inputs: &Tensor, targets: &Tensor) -> Result<(Tensor, Tensor)> {
        let logits = self.forward(inputs)?;
        let labels = Self::class_indices(targets)?;

        let loss = loss::cross_entropy(&logits, &labels)?;
        let accuracy = logits
            .argmax(D::Minus1)?
            .eq(&labels)?
            .to_dtype(DType::F32)?
            .mean_all()?;

        Ok((loss, accuracy))
    }
}

#[async_trait]
impl TrainableModel for ImageClassifier {
    async fn train_on_batch(&mut self, inputs: &Tensor, targets: &Tensor) -> Result<BatchMetrics> {
        let (loss, accuracy) = self.loss_and_accuracy(inputs, targets)?;
        self.optimizer
            .backward_step(&loss)
            .context("Optimizer step failed")?;
        self.step += 1;

        Ok(BatchMetrics::new(
            loss.to_dtype(DType::F64)?.to_scalar::<f64>()?,
            accuracy.to_dtype(DType::F64)?.to_scalar::<f64>()?,
        ))
    }

    async fn evaluate(&self, inputs: &Tensor, targets: &Tensor) -> Result<EvalOutput> {
        let (loss, accuracy) = self.loss_and_accuracy(inputs, targets)?;
        Ok(EvalOutput::new(loss, accuracy))
    }

    async fn save(&self, uri: &str) -> Result<()> {
        let path = path_from_uri(uri)?;
        let metadata = ModelMetadata::new(self.config.clone(), MODEL_TYPE.to_string(), self.step);
        save_model_with_metadata(&path, &self.varmap, &metadata)
    }
}
