//! Strategies for fitting a Gaussian to a set of embeddings.

mod max_likelihood;
mod shrinkage;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingMatrix;
use crate::error::{Error, Result};
use crate::gaussian::GaussianParameters;

pub use max_likelihood::MaxLikelihoodEstimator;
pub use shrinkage::{ShrinkageEstimator, ShrinkageFit, DEFAULT_BLOCK_SIZE};

/// Turns an embedding matrix into Gaussian parameters.
///
/// Implementations are deterministic and keep no state between calls, so a
/// single instance can serve concurrent fits.
pub trait GaussianEstimator {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    fn estimate_parameters(&self, features: &EmbeddingMatrix) -> Result<GaussianParameters>;
}

/// Selector for one of the built-in estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EstimatorKind {
    /// Plain sample mean and unbiased sample covariance.
    #[default]
    #[serde(rename = "mle", alias = "max_likelihood")]
    MaxLikelihood,
    /// Ledoit-Wolf shrinkage towards a scaled identity.
    #[serde(rename = "shrinkage", alias = "ledoit_wolf")]
    Shrinkage,
}

impl EstimatorKind {
    pub const ALL: [Self; 2] = [Self::MaxLikelihood, Self::Shrinkage];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaxLikelihood => "mle",
            Self::Shrinkage => "shrinkage",
        }
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mle" | "max_likelihood" => Ok(Self::MaxLikelihood),
            "shrinkage" | "ledoit_wolf" | "lw" => Ok(Self::Shrinkage),
            _ => Err(Error::UnknownEstimator(s.to_string())),
        }
    }
}

/// A configured estimator from the closed set of built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    MaxLikelihood(MaxLikelihoodEstimator),
    Shrinkage(ShrinkageEstimator),
}

impl Estimator {
    /// Build the estimator named by `kind`. `block_size` only applies to the
    /// shrinkage strategy but is validated either way.
    pub fn new(kind: EstimatorKind, block_size: usize) -> Result<Self> {
        let shrinkage = ShrinkageEstimator::new(block_size)?;
        Ok(match kind {
            EstimatorKind::MaxLikelihood => Self::MaxLikelihood(MaxLikelihoodEstimator),
            EstimatorKind::Shrinkage => Self::Shrinkage(shrinkage),
        })
    }

    pub fn kind(&self) -> EstimatorKind {
        match self {
            Self::MaxLikelihood(_) => EstimatorKind::MaxLikelihood,
            Self::Shrinkage(_) => EstimatorKind::Shrinkage,
        }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        EstimatorKind::default().into()
    }
}

impl From<EstimatorKind> for Estimator {
    fn from(kind: EstimatorKind) -> Self {
        match kind {
            EstimatorKind::MaxLikelihood => Self::MaxLikelihood(MaxLikelihoodEstimator),
            EstimatorKind::Shrinkage => Self::Shrinkage(ShrinkageEstimator::default()),
        }
    }
}

impl GaussianEstimator for Estimator {
    fn name(&self) -> &'static str {
        match self {
            Self::MaxLikelihood(inner) => inner.name(),
            Self::Shrinkage(inner) => inner.name(),
        }
    }

    fn estimate_parameters(&self, features: &EmbeddingMatrix) -> Result<GaussianParameters> {
        match self {
            Self::MaxLikelihood(inner) => inner.estimate_parameters(features),
            Self::Shrinkage(inner) => inner.estimate_parameters(features),
        }
    }
}
