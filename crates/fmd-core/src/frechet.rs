//! Closed-form Frechet distance between two fitted Gaussians.
//!
//! For `N(mu_r, sigma_r)` and `N(mu_c, sigma_c)`:
//!
//! ```text
//! d^2 = ||mu_r - mu_c||^2 + tr(sigma_r) + tr(sigma_c) - 2 tr(sqrtm(sigma_r sigma_c))
//! ```
//!
//! The product `sigma_r sigma_c` is not symmetric, so its square root is
//! never formed directly. Its eigenvalues equal those of the symmetric
//! congruence `M = sigma_r^(1/2) sigma_c sigma_r^(1/2)`, and
//! `tr(sqrtm(sigma_r sigma_c))` is the sum of their square roots.
//!
//! Round-off can still leave `M` slightly asymmetric (where a general
//! eigensolver on the raw product would report small spurious imaginary
//! parts) and its spectrum slightly negative. Both are discarded when they stay
//! within the engine tolerance, relative to the largest magnitude involved.
//! Anything larger is reported as [`Error::NumericalInstability`].

use serde::Serialize;

use crate::embedding::EmbeddingMatrix;
use crate::error::{Error, Result};
use crate::estimator::{Estimator, EstimatorKind, GaussianEstimator};
use crate::gaussian::GaussianParameters;
use crate::linalg;

/// Relative tolerance for eigenvalue clipping and asymmetry removal.
///
/// Eigenvalues in `[-1e-6 * max|lambda|, 0)` are treated as zero. Small
/// positive eigenvalues are kept as they are, so the distance of a set to
/// itself stays at zero. Asymmetry of the covariance congruence up to `1e-6`
/// of its magnitude is treated as round-off. For the congruence, the magnitude is the larger of
/// its own largest eigenvalue and `lambda_max(sigma_r) * ||sigma_c||_F`, so
/// nearly orthogonal covariances do not turn round-off into failures.
pub const DEFAULT_EIGENVALUE_TOLERANCE: f64 = 1e-6;

/// Breakdown of a squared Frechet distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrechetDistance {
    /// `||mu_r - mu_c||^2`.
    pub mean_term: f64,
    /// `tr(sigma_r + sigma_c - 2 sqrtm(sigma_r sigma_c))`.
    pub trace_term: f64,
    /// Sum of both terms, clamped at zero when only round-off made it negative.
    pub value: f64,
    /// Number of eigenvalues clipped to zero on the way.
    pub clipped_eigenvalues: usize,
}

/// Computes Frechet distances between embedding sets.
///
/// The engine holds only its tolerance; every call fits fresh parameters
/// and nothing is cached between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrechetDistanceEngine {
    tolerance: f64,
}

impl Default for FrechetDistanceEngine {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_EIGENVALUE_TOLERANCE,
        }
    }
}

impl FrechetDistanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a custom relative tolerance in `(0, 1)`.
    pub fn with_tolerance(tolerance: f64) -> Result<Self> {
        if !(tolerance.is_finite() && tolerance > 0.0 && tolerance < 1.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: format!("must lie strictly between 0 and 1, got {}", tolerance),
            });
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Squared Frechet distance between the Gaussians fitted to `reference`
    /// and `candidate`.
    pub fn compute<E>(
        &self,
        reference: &EmbeddingMatrix,
        candidate: &EmbeddingMatrix,
        estimator: &E,
    ) -> Result<f64>
    where
        E: GaussianEstimator + ?Sized,
    {
        self.compute_detailed(reference, candidate, estimator)
            .map(|distance| distance.value)
    }

    /// Like [`compute`](Self::compute), returning the individual terms.
    pub fn compute_detailed<E>(
        &self,
        reference: &EmbeddingMatrix,
        candidate: &EmbeddingMatrix,
        estimator: &E,
    ) -> Result<FrechetDistance>
    where
        E: GaussianEstimator + ?Sized,
    {
        if reference.dim() != candidate.dim() {
            return Err(Error::DimensionMismatch {
                reference: reference.dim(),
                candidate: candidate.dim(),
            });
        }

        let fitted_reference = estimator.estimate_parameters(reference)?;
        let fitted_candidate = estimator.estimate_parameters(candidate)?;
        log::debug!(
            "{}: fitted reference ({} samples) and candidate ({} samples) in {} dimensions",
            estimator.name(),
            reference.n_samples(),
            candidate.n_samples(),
            reference.dim()
        );

        self.compute_from_parameters(&fitted_reference, &fitted_candidate)
    }

    /// Squared Frechet distance between two already-fitted Gaussians.
    pub fn compute_from_parameters(
        &self,
        reference: &GaussianParameters,
        candidate: &GaussianParameters,
    ) -> Result<FrechetDistance> {
        if reference.dim() != candidate.dim() {
            return Err(Error::DimensionMismatch {
                reference: reference.dim(),
                candidate: candidate.dim(),
            });
        }

        let mean_term = (reference.mean() - candidate.mean()).norm_squared();
        let trace_reference = reference.covariance().trace();
        let trace_candidate = candidate.covariance().trace();

        let (sqrt_reference, reference_spectrum) = linalg::psd_sqrt(
            reference.covariance(),
            self.tolerance,
            "reference covariance",
        )?;

        // Natural magnitude of the congruence: lambda_max(sigma_r) times an
        // upper bound (Frobenius norm) of lambda_max(sigma_c).
        let product_scale = reference_spectrum.largest * candidate.covariance().norm();

        let congruence = &sqrt_reference * candidate.covariance() * &sqrt_reference;
        let asymmetry = linalg::relative_asymmetry(&congruence, product_scale);
        if asymmetry > self.tolerance {
            return Err(Error::instability(
                "covariance product",
                format!(
                    "relative asymmetry {:e} exceeds tolerance {:e}",
                    asymmetry, self.tolerance
                ),
            ));
        }
        let congruence = linalg::symmetrize(&congruence);

        let spectrum = linalg::clip_spectrum(
            linalg::symmetric_eigenvalues(&congruence),
            self.tolerance,
            product_scale,
            "covariance product",
        )?;
        let trace_sqrt: f64 = spectrum.values.iter().map(|v| v.sqrt()).sum();

        let clipped_eigenvalues = reference_spectrum.clipped + spectrum.clipped;
        if clipped_eigenvalues > 0 {
            log::debug!(
                "clipped {} round-off eigenvalues to zero ({} from the reference covariance)",
                clipped_eigenvalues,
                reference_spectrum.clipped
            );
        }

        let trace_term = trace_reference + trace_candidate - 2.0 * trace_sqrt;
        let raw = mean_term + trace_term;
        if !raw.is_finite() {
            return Err(Error::instability(
                "distance",
                format!("non-finite result (mean term {}, trace term {})", mean_term, trace_term),
            ));
        }

        let scale = mean_term + trace_reference + trace_candidate;
        let value = if raw >= 0.0 {
            raw
        } else if -raw <= self.tolerance * scale {
            log::debug!("clamped round-off distance {:e} to zero", raw);
            0.0
        } else {
            return Err(Error::instability(
                "distance",
                format!(
                    "squared distance {:e} is negative beyond tolerance (scale {:e})",
                    raw, scale
                ),
            ));
        };

        Ok(FrechetDistance {
            mean_term,
            trace_term,
            value,
            clipped_eigenvalues,
        })
    }
}

/// Squared Frechet distance with a default-configured estimator of `kind`.
pub fn frechet_distance(
    reference: &EmbeddingMatrix,
    candidate: &EmbeddingMatrix,
    kind: EstimatorKind,
) -> Result<f64> {
    FrechetDistanceEngine::new().compute(reference, candidate, &Estimator::from(kind))
}
