//! Error types for hanlift.

use std::path::PathBuf;

use crate::extract::ExtractError;
use crate::output::OutputError;
use crate::rewrite::RewriteError;
use crate::walker::WalkError;

/// Top-level error type for a lift run.
#[derive(Debug, thiserror::Error)]
pub enum LiftError {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("extract error in {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("rewrite error in {path}: {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },

    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &LiftError) -> i32 {
    match error {
        LiftError::PathNotFound(_) => 3,
        LiftError::Walk(WalkError::NotFound { .. }) => 3,
        LiftError::Walk(WalkError::PermissionDenied { .. }) => 4,
        LiftError::Walk(_) => 2,
        LiftError::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => 4,
        LiftError::Io { .. } => 1,
        LiftError::Extract { .. } => 1,
        LiftError::Rewrite { .. } => 1,
        LiftError::Output(_) => 1,
    }
}
