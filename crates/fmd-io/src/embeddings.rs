//! JSON embedding files.
//!
//! Two layouts are accepted:
//!
//! ```json
//! [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
//! ```
//!
//! ```json
//! {"embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]}
//! ```
//!
//! Each inner array is one piece. Files are always written in the second
//! layout.

use std::path::Path;

use fmd_core::EmbeddingMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingFile {
    Rows(Vec<Vec<f64>>),
    Wrapped { embeddings: Vec<Vec<f64>> },
}

impl EmbeddingFile {
    fn into_rows(self) -> Vec<Vec<f64>> {
        match self {
            Self::Rows(rows) | Self::Wrapped { embeddings: rows } => rows,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingFileOut {
    embeddings: Vec<Vec<f64>>,
}

/// Read an embedding matrix from a JSON file.
pub fn load_embeddings(path: impl AsRef<Path>) -> LoadResult<EmbeddingMatrix> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let matrix = parse(&text, path)?;
    log::debug!(
        "Loaded {} embeddings of dimension {} from {}",
        matrix.n_samples(),
        matrix.dim(),
        path.display()
    );
    Ok(matrix)
}

/// Parse an embedding matrix from JSON text.
pub fn embeddings_from_str(text: &str) -> LoadResult<EmbeddingMatrix> {
    parse(text, Path::new("<memory>"))
}

/// Write an embedding matrix as `{"embeddings": [...]}`.
pub fn save_embeddings(path: impl AsRef<Path>, matrix: &EmbeddingMatrix) -> LoadResult<()> {
    let path = path.as_ref();
    let rows = matrix
        .as_matrix()
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();
    let text = serde_json::to_string(&EmbeddingFileOut { embeddings: rows }).map_err(|source| {
        LoadError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    std::fs::write(path, text).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse(text: &str, origin: &Path) -> LoadResult<EmbeddingMatrix> {
    let file: EmbeddingFile = serde_json::from_str(text).map_err(|source| LoadError::Json {
        path: origin.to_path_buf(),
        source,
    })?;
    EmbeddingMatrix::from_rows(&file.into_rows()).map_err(|source| LoadError::Embedding {
        path: origin.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_rows() {
        let matrix = embeddings_from_str("[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]").unwrap();
        assert_eq!(matrix.n_samples(), 3);
        assert_eq!(matrix.dim(), 2);
    }

    #[test]
    fn test_parse_wrapped_rows() {
        let matrix = embeddings_from_str(r#"{"embeddings": [[1, 2, 3]]}"#).unwrap();
        assert_eq!(matrix.n_samples(), 1);
        assert_eq!(matrix.dim(), 3);
    }

    #[test]
    fn test_parse_rejects_ragged() {
        let err = embeddings_from_str("[[1.0, 2.0], [3.0]]").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Embedding {
                source: fmd_core::Error::InvalidInput(_),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            embeddings_from_str("[]").unwrap_err(),
            LoadError::Embedding { .. }
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = embeddings_from_str(r#"{"rows": 3}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert_eq!(err.path(), Path::new("<memory>"));
    }
}
