use crate::embedding::EmbeddingMatrix;
use crate::error::Result;
use crate::gaussian::GaussianParameters;

use super::GaussianEstimator;

/// Sample mean and unbiased sample covariance, without regularization.
///
/// With fewer samples than dimensions the covariance is singular. A single
/// sample yields an all-zero covariance rather than a division by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxLikelihoodEstimator;

impl GaussianEstimator for MaxLikelihoodEstimator {
    fn name(&self) -> &'static str {
        "mle"
    }

    fn estimate_parameters(&self, features: &EmbeddingMatrix) -> Result<GaussianParameters> {
        let n_samples = features.n_samples();
        let (mean, centered) = features.centered();

        let divisor = n_samples.saturating_sub(1).max(1) as f64;
        let covariance = centered.tr_mul(&centered) / divisor;

        if n_samples <= features.dim() {
            log::debug!(
                "mle: {} samples for {} dimensions, covariance is rank-deficient",
                n_samples,
                features.dim()
            );
        }

        GaussianParameters::new(mean, covariance)
    }
}
