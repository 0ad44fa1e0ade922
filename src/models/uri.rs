// Model URIs
// Saved models are addressed as file://{path}

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

pub fn model_uri(path: &Path) -> String {
    format!("{}{}", FILE_SCHEME, path.display())
}

/// Resolve a `file://` URI to a filesystem path
pub fn path_from_uri(uri: &str) -> Result<PathBuf> {
    match uri.strip_prefix(FILE_SCHEME) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        Some(_) => bail!("Model URI has an empty path: {}", uri),
        None => bail!("Unsupported model URI scheme (expected file://): {}", uri),
    }
}
