use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// A set of embedding vectors, one row per music piece.
///
/// Every row has the same dimensionality and every value is finite. The
/// matrix always holds at least one row and one column; constructors reject
/// anything else with [`Error::InvalidInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: DMatrix<f64>,
}

impl EmbeddingMatrix {
    /// Build a matrix from row vectors.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| Error::InvalidInput(String::from("embedding matrix has no rows")))?;
        let dim = first.as_ref().len();

        for (idx, row) in rows.iter().enumerate() {
            let len = row.as_ref().len();
            if len != dim {
                return Err(Error::InvalidInput(format!(
                    "row {} has {} values, expected {}",
                    idx, len, dim
                )));
            }
        }

        let data = DMatrix::from_fn(rows.len(), dim, |i, j| rows[i].as_ref()[j]);
        Self::from_matrix(data)
    }

    /// Build a matrix from a flat row-major buffer.
    pub fn from_row_slice(n_samples: usize, dim: usize, values: &[f64]) -> Result<Self> {
        let expected = n_samples.checked_mul(dim).ok_or_else(|| {
            Error::InvalidInput(format!("shape {}x{} overflows", n_samples, dim))
        })?;
        if values.len() != expected {
            return Err(Error::InvalidInput(format!(
                "buffer has {} values, shape {}x{} needs {}",
                values.len(),
                n_samples,
                dim,
                expected
            )));
        }
        Self::from_matrix(DMatrix::from_row_slice(n_samples, dim, values))
    }

    /// Wrap an existing matrix whose rows are samples.
    pub fn from_matrix(data: DMatrix<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(Error::InvalidInput(String::from(
                "embedding matrix has no rows",
            )));
        }
        if data.ncols() == 0 {
            return Err(Error::InvalidInput(String::from(
                "embedding matrix has no feature columns",
            )));
        }

        // nalgebra stores column-major.
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            let (row, col) = (pos % data.nrows(), pos / data.nrows());
            return Err(Error::InvalidInput(format!(
                "non-finite value {} at row {}, column {}",
                data[(row, col)],
                row,
                col
            )));
        }

        Ok(Self { data })
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn into_inner(self) -> DMatrix<f64> {
        self.data
    }

    /// Per-feature average over all samples.
    pub fn mean(&self) -> DVector<f64> {
        self.data.row_mean().transpose()
    }

    /// Returns the sample mean together with a copy of the data with that
    /// mean subtracted from every row.
    pub fn centered(&self) -> (DVector<f64>, DMatrix<f64>) {
        let mean = self.mean();
        let mut centered = self.data.clone();
        for (j, mut column) in centered.column_iter_mut().enumerate() {
            column.add_scalar_mut(-mean[j]);
        }
        (mean, centered)
    }
}

impl TryFrom<Vec<Vec<f64>>> for EmbeddingMatrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(&rows)
    }
}

impl TryFrom<DMatrix<f64>> for EmbeddingMatrix {
    type Error = Error;

    fn try_from(data: DMatrix<f64>) -> Result<Self> {
        Self::from_matrix(data)
    }
}
