//! Error types for Gaussian fitting and distance computation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The embeddings could not be used as a sample matrix.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reference and candidate embeddings live in different feature spaces.
    #[error("dimension mismatch: reference has {reference} features, candidate has {candidate}")]
    DimensionMismatch { reference: usize, candidate: usize },

    /// The matrix square root produced components beyond tolerance.
    #[error("numerical instability in {stage}: {detail}")]
    NumericalInstability { stage: &'static str, detail: String },

    /// A configuration value is out of range, such as a zero block size.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// An estimator name that matches none of the built-in strategies.
    #[error("unknown estimator: {0} (expected one of: mle, shrinkage)")]
    UnknownEstimator(String),
}

impl Error {
    pub(crate) fn instability(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::NumericalInstability {
            stage,
            detail: detail.into(),
        }
    }

    /// Returns `true` for failures a caller may recover from by switching to
    /// a better-conditioned estimator.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::NumericalInstability { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = Error::DimensionMismatch {
            reference: 8,
            candidate: 16,
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch: reference has 8 features, candidate has 16"
        );
    }

    #[test]
    fn test_parameter_and_estimator_messages() {
        let err = Error::InvalidParameter {
            name: "block_size",
            message: String::from("must be at least 1"),
        };
        assert_eq!(err.to_string(), "invalid parameter block_size: must be at least 1");
        assert_eq!(
            Error::UnknownEstimator(String::from("oas")).to_string(),
            "unknown estimator: oas (expected one of: mle, shrinkage)"
        );
    }

    #[test]
    fn test_is_numerical() {
        assert!(Error::instability("sqrtm", "negative eigenvalue").is_numerical());
        assert!(!Error::InvalidInput(String::from("empty")).is_numerical());
    }
}
