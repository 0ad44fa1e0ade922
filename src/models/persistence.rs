// Model persistence utilities
// Handles saving/loading weights + configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::classifier::ClassifierConfig;

/// Metadata saved alongside model weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model configuration
    pub config: ClassifierConfig,
    /// Model type identifier
    pub model_type: String,
    /// Optimizer steps taken before the save
    pub training_step: usize,
    /// Timestamp of save
    pub timestamp: String,
    /// Version of the persistence format
    pub format_version: u32,
}

impl ModelMetadata {
    pub fn new(config: ClassifierConfig, model_type: String, training_step: usize) -> Self {
        Self {
            config,
            model_type,
            training_step,
            timestamp: chrono::Utc::now().to_rfc3339(),
            format_version: 1,
        }
    }
}

/// Save model with metadata
///
/// Creates two files:
/// - {path} - Model weights (safetensors, via Candle's VarMap)
/// - {path}.json - Model metadata (config, type, step)
///
/// Existing files at either location are overwritten.
pub fn save_model_with_metadata(
    weights_path: &Path,
    varmap: &candle_nn::VarMap,
    metadata: &ModelMetadata,
) -> Result<()> {
    if let Some(parent) = weights_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create model directory {:?}", parent))?;
        }
    }

    varmap
        .save(weights_path)
        .with_context(|| format!("Failed to save model weights to {:?}", weights_path))?;

    let metadata_path = weights_path.with_extension("json");
    let metadata_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize model metadata")?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("Failed to write metadata to {:?}", metadata_path))?;

    tracing::info!(
        path = %weights_path.display(),
        model_type = %metadata.model_type,
        step = metadata.training_step,
        "Saved model"
    );

    Ok(())
}

/// Load model metadata
pub fn load_model_metadata(weights_path: &Path) -> Result<ModelMetadata> {
    let metadata_path = weights_path.with_extension("json");

    if !metadata_path.exists() {
        anyhow::bail!("Model metadata not found at {:?}", metadata_path);
    }

    let metadata_json = fs::read_to_string(&metadata_path)
        .with_context(|| format!("Failed to read metadata from {:?}", metadata_path))?;

    let metadata: ModelMetadata =
        serde_json::from_str(&metadata_json).context("Failed to parse model metadata JSON")?;

    Ok(metadata)
}

/// Check if a saved model exists
pub fn model_exists(weights_path: &Path) -> bool {
    let metadata_path = weights_path.with_extension("json");
    weights_path.exists() && metadata_path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_serialization() {
        let metadata =
            ModelMetadata::new(ClassifierConfig::new(12, 3), "image_classifier".to_string(), 100);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(metadata.model_type, deserialized.model_type);
        assert_eq!(metadata.training_step, deserialized.training_step);
        assert_eq!(metadata.config, deserialized.config);
    }

    #[test]
    fn test_model_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.safetensors");

        assert!(!model_exists(&path));

        fs::write(&path, "weights").unwrap();
        assert!(!model_exists(&path));

        fs::write(path.with_extension("json"), "metadata").unwrap();
        assert!(model_exists(&path));
    }

    #[test]
    fn test_load_missing_metadata() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_model_metadata(&temp_dir.path().join("absent.safetensors")).is_err());
    }
}
