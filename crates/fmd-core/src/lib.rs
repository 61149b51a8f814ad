//! Core statistics for the Frechet Music Distance.
//!
//! This crate fits multivariate Gaussians to sets of music embeddings
//! (one row per piece) and computes the closed-form Frechet distance between
//! two fitted Gaussians. Feature extraction happens elsewhere; everything
//! here starts from an [`EmbeddingMatrix`].
//!
//! ```
//! use fmd_core::{EmbeddingMatrix, FrechetDistanceEngine, ShrinkageEstimator};
//!
//! let reference = EmbeddingMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]])?;
//! let candidate = EmbeddingMatrix::from_rows(&[vec![2.0, 1.0], vec![3.0, 0.0], vec![2.5, 0.5]])?;
//!
//! let engine = FrechetDistanceEngine::new();
//! let distance = engine.compute(&reference, &candidate, &ShrinkageEstimator::default())?;
//! assert!(distance > 0.0);
//! # Ok::<(), fmd_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod embedding;
pub mod error;
pub mod estimator;
pub mod frechet;
pub mod gaussian;
mod linalg;

pub use embedding::EmbeddingMatrix;
pub use error::{Error, Result};
pub use estimator::{
    Estimator, EstimatorKind, GaussianEstimator, MaxLikelihoodEstimator, ShrinkageEstimator,
    ShrinkageFit, DEFAULT_BLOCK_SIZE,
};
pub use frechet::{
    frechet_distance, FrechetDistance, FrechetDistanceEngine, DEFAULT_EIGENVALUE_TOLERANCE,
};
pub use gaussian::GaussianParameters;
