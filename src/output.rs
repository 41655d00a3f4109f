//! Resource file output.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::resource::ResourceTree;

/// Default location of the generated resource file.
pub const DEFAULT_OUTPUT: &str = "locales/ko.json";

/// Errors that can occur while writing the resource file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize `tree` as pretty JSON to `path`, creating parent directories.
///
/// An existing file at `path` is overwritten.
pub fn write_resource(tree: &ResourceTree, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = tree.to_json_pretty()?;
    fs::write(path, json).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), leaves = tree.leaf_count(), "wrote resource file");
    Ok(())
}
