use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::linalg;

/// Relative asymmetry accepted when a covariance is handed in from outside.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Mean and covariance of a fitted multivariate Gaussian.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaussianParameters {
    mean: DVector<f64>,
    covariance: DMatrix<f64>,
}

impl GaussianParameters {
    /// Validate and wrap a mean vector and covariance matrix.
    ///
    /// The covariance must be square, match the mean's length, contain only
    /// finite values and be symmetric up to a small relative tolerance. It is
    /// stored exactly symmetrized.
    pub fn new(mean: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        let dim = mean.len();
        if dim == 0 {
            return Err(Error::InvalidInput(String::from(
                "gaussian parameters need at least one dimension",
            )));
        }
        if covariance.nrows() != dim || covariance.ncols() != dim {
            return Err(Error::InvalidInput(format!(
                "covariance is {}x{}, mean has {} entries",
                covariance.nrows(),
                covariance.ncols(),
                dim
            )));
        }
        if mean.iter().chain(covariance.iter()).any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(String::from(
                "gaussian parameters contain non-finite values",
            )));
        }

        let asymmetry = linalg::relative_asymmetry(&covariance, 0.0);
        if asymmetry > SYMMETRY_TOLERANCE {
            return Err(Error::InvalidInput(format!(
                "covariance is not symmetric (relative asymmetry {:e})",
                asymmetry
            )));
        }

        Ok(Self {
            mean,
            covariance: linalg::symmetrize(&covariance),
        })
    }

    /// Parameters of a one-dimensional Gaussian.
    pub fn univariate(mean: f64, variance: f64) -> Result<Self> {
        if variance < 0.0 {
            return Err(Error::InvalidInput(format!(
                "variance must be non-negative, got {}",
                variance
            )));
        }
        Self::new(
            DVector::from_element(1, mean),
            DMatrix::from_element(1, 1, variance),
        )
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn into_parts(self) -> (DVector<f64>, DMatrix<f64>) {
        (self.mean, self.covariance)
    }

    /// Eigenvalues of the covariance, in no particular order.
    pub fn eigenvalues(&self) -> DVector<f64> {
        linalg::symmetric_eigenvalues(&self.covariance)
    }

    /// Ratio of the largest to the smallest covariance eigenvalue.
    ///
    /// Singular covariances (smallest eigenvalue at or below round-off level)
    /// report `f64::INFINITY`.
    pub fn condition_number(&self) -> f64 {
        let eigenvalues = self.eigenvalues();
        let largest = eigenvalues.max();
        let smallest = eigenvalues.min();
        let floor = largest * f64::EPSILON * self.dim() as f64;

        if largest <= 0.0 || smallest <= floor {
            f64::INFINITY
        } else {
            largest / smallest
        }
    }

    /// Whether no covariance eigenvalue falls below
    /// `-tolerance * max|lambda|`.
    pub fn is_positive_semi_definite(&self, tolerance: f64) -> bool {
        let eigenvalues = self.eigenvalues();
        let largest = eigenvalues.amax();
        eigenvalues.min() >= -tolerance * largest
    }
}
