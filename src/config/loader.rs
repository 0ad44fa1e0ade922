// Configuration loader
// Loads training arguments from a TOML or JSON file

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use super::settings::TrainArgs;

/// Load and validate training arguments from `path`
///
/// The format is chosen by extension: `.toml` or `.json`.
pub fn load_train_args(path: &Path) -> Result<TrainArgs> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let args = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        Some("json") => parse_json(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        other => bail!(
            "Unsupported config format {:?} for {} (expected .toml or .json)",
            other,
            path.display()
        ),
    };

    args.validate()?;

    tracing::debug!(
        path = %path.display(),
        epochs = args.epochs,
        batch_size = args.batch_size,
        "Loaded training arguments"
    );

    Ok(args)
}

/// Parse training arguments from TOML text (not validated)
pub fn parse_toml(contents: &str) -> Result<TrainArgs> {
    toml::from_str(contents).context("Invalid TOML training arguments")
}

/// Parse training arguments from JSON text (not validated)
pub fn parse_json(contents: &str) -> Result<TrainArgs> {
    serde_json::from_str(contents).context("Invalid JSON training arguments")
}
