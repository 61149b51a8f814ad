//! Errors raised while reading embedding files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or saving embeddings.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid embedding JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The rows parsed but do not form a valid embedding matrix.
    #[error("invalid embeddings in {}: {source}", path.display())]
    Embedding {
        path: PathBuf,
        source: fmd_core::Error,
    },
}

impl LoadError {
    /// Path of the file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Json { path, .. } | Self::Embedding { path, .. } => path,
        }
    }
}

/// Convenience alias for loader results.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
