//! Ledoit-Wolf shrinkage covariance estimator.
//!
//! The estimate is a convex combination of the empirical covariance `S` and
//! the scaled identity `mu * I` with `mu = trace(S) / D`:
//!
//! ```text
//! sigma = (1 - s) * S + s * mu * I
//! ```
//!
//! The intensity `s` is chosen analytically to minimise the expected
//! Frobenius-norm error (Ledoit & Wolf, "A well-conditioned estimator for
//! large-dimensional covariance matrices", 2004). Any `s > 0` with `mu > 0`
//! makes the result strictly positive definite.

use nalgebra::DMatrix;

use crate::embedding::EmbeddingMatrix;
use crate::error::{Error, Result};
use crate::gaussian::GaussianParameters;

use super::GaussianEstimator;

/// Column block width used when accumulating the shrinkage statistics.
pub const DEFAULT_BLOCK_SIZE: usize = 1000;

/// Ledoit-Wolf estimator. The mean is estimated from the data, not assumed
/// to be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkageEstimator {
    block_size: usize,
}

/// Parameters together with the shrinkage intensity that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkageFit {
    pub parameters: GaussianParameters,
    /// Weight of the scaled-identity target, in `[0, 1]`.
    pub shrinkage: f64,
}

impl Default for ShrinkageEstimator {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ShrinkageEstimator {
    /// `block_size` sets the column chunking of the internal products. It
    /// only changes floating-point accumulation order, never the result.
    pub fn new(block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidParameter {
                name: "block_size",
                message: String::from("must be at least 1"),
            });
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Fit the shrunk Gaussian and report the intensity used.
    pub fn fit(&self, features: &EmbeddingMatrix) -> Result<ShrinkageFit> {
        let n_samples = features.n_samples() as f64;
        let dim = features.dim();
        let (mean, centered) = features.centered();

        let empirical = centered.tr_mul(&centered) / n_samples;

        if dim == 1 {
            return Ok(ShrinkageFit {
                parameters: GaussianParameters::new(mean, empirical)?,
                shrinkage: 0.0,
            });
        }

        let shrinkage = self.shrinkage_intensity(&centered, &empirical);
        let mu = empirical.trace() / dim as f64;

        let mut covariance = empirical * (1.0 - shrinkage);
        for i in 0..dim {
            covariance[(i, i)] += shrinkage * mu;
        }

        log::debug!(
            "shrinkage: {} samples, {} dimensions, intensity {:.6}, target scale {:.6e}",
            features.n_samples(),
            dim,
            shrinkage,
            mu
        );

        Ok(ShrinkageFit {
            parameters: GaussianParameters::new(mean, covariance)?,
            shrinkage,
        })
    }

    /// Ledoit-Wolf intensity for already-centered data.
    fn shrinkage_intensity(&self, centered: &DMatrix<f64>, empirical: &DMatrix<f64>) -> f64 {
        let n = centered.nrows() as f64;
        let dim = centered.ncols();
        let p = dim as f64;

        let squared = centered.map(|v| v * v);

        // beta_raw = sum_k ||x_k||^4, delta_raw = ||X^T X||_F^2, both
        // accumulated block by block over pairs of column ranges.
        let mut beta_raw = 0.0;
        let mut delta_raw = 0.0;
        for (row_start, row_len) in column_blocks(dim, self.block_size) {
            let squared_rows = squared.columns(row_start, row_len);
            let rows = centered.columns(row_start, row_len);
            for (col_start, col_len) in column_blocks(dim, self.block_size) {
                beta_raw += squared_rows
                    .tr_mul(&squared.columns(col_start, col_len))
                    .sum();
                delta_raw += rows
                    .tr_mul(&centered.columns(col_start, col_len))
                    .norm_squared();
            }
            log::trace!(
                "shrinkage: accumulated column block {}..{}",
                row_start,
                row_start + row_len
            );
        }
        delta_raw /= n * n;

        let trace = empirical.trace();
        let mu = trace / p;

        let beta = (beta_raw / n - delta_raw) / (p * n);
        let delta = (delta_raw - 2.0 * mu * trace + p * mu * mu) / p;
        let beta = beta.min(delta);

        if beta <= 0.0 {
            0.0
        } else {
            (beta / delta).clamp(0.0, 1.0)
        }
    }
}

impl GaussianEstimator for ShrinkageEstimator {
    fn name(&self) -> &'static str {
        "shrinkage"
    }

    fn estimate_parameters(&self, features: &EmbeddingMatrix) -> Result<GaussianParameters> {
        self.fit(features).map(|fit| fit.parameters)
    }
}

/// `(start, len)` ranges covering `0..dim` in steps of `block_size`.
fn column_blocks(dim: usize, block_size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..dim)
        .step_by(block_size)
        .map(move |start| (start, block_size.min(dim - start)))
}
