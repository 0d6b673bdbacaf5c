pub mod diff;
pub mod replay;

use serde::de::DeserializeOwned;
use std::path::Path;

use nvbind_core::errors::{BindingError, Result};

/// Read and parse a JSON document, naming the file in errors.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| BindingError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| BindingError::Serialization {
        message: format!("{}: {}", path.display(), e),
    })
}
