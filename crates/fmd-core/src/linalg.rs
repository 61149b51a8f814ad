//! Symmetric eigenvalue helpers shared by the estimators and the distance
//! engine.

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Eigenvalues of a symmetric matrix.
pub(crate) fn symmetric_eigenvalues(m: &DMatrix<f64>) -> DVector<f64> {
    m.symmetric_eigenvalues()
}

/// Largest absolute entry, 0 for the zero matrix.
pub(crate) fn max_abs(m: &DMatrix<f64>) -> f64 {
    m.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Largest `|m_ij - m_ji|` relative to the larger of `scale_floor` and the
/// largest entry of `m`.
pub(crate) fn relative_asymmetry(m: &DMatrix<f64>, scale_floor: f64) -> f64 {
    let scale = max_abs(m).max(scale_floor);
    if scale <= 0.0 {
        return 0.0;
    }
    let n = m.nrows();
    let mut worst = 0.0_f64;
    for i in 0..n {
        for j in (i + 1)..n {
            worst = worst.max((m[(i, j)] - m[(j, i)]).abs());
        }
    }
    worst / scale
}

pub(crate) fn symmetrize(m: &DMatrix<f64>) -> DMatrix<f64> {
    (m + m.transpose()) * 0.5
}

/// Eigenvalues after noise clipping.
#[derive(Debug, Clone)]
pub(crate) struct ClippedSpectrum {
    pub values: DVector<f64>,
    /// How many negative eigenvalues were set to zero.
    pub clipped: usize,
    /// Largest eigenvalue magnitude before clipping.
    pub largest: f64,
}

/// Clip floating-point noise out of a spectrum.
///
/// With `scale = max(max|lambda|, scale_floor)`, eigenvalues inside
/// `[-tolerance * scale, 0)` are set to zero. Anything more negative, or
/// non-finite, is reported as instability. Small positive eigenvalues pass
/// through so that the square-root side of the trace term stays consistent
/// with the plain traces.
pub(crate) fn clip_spectrum(
    eigenvalues: DVector<f64>,
    tolerance: f64,
    scale_floor: f64,
    stage: &'static str,
) -> Result<ClippedSpectrum> {
    if let Some(bad) = eigenvalues.iter().find(|v| !v.is_finite()) {
        return Err(Error::instability(
            stage,
            format!("non-finite eigenvalue {}", bad),
        ));
    }

    let largest = eigenvalues.amax();
    let threshold = tolerance * largest.max(scale_floor);
    let mut clipped = 0;
    let mut values = eigenvalues;

    for value in values.iter_mut() {
        if *value >= 0.0 {
            continue;
        }
        if -*value > threshold {
            return Err(Error::instability(
                stage,
                format!(
                    "eigenvalue {:e} is negative beyond tolerance {:e} (largest magnitude {:e})",
                    *value, threshold, largest
                ),
            ));
        }
        *value = 0.0;
        clipped += 1;
    }

    Ok(ClippedSpectrum {
        values,
        clipped,
        largest,
    })
}

/// Principal square root of a symmetric positive semi-definite matrix.
///
/// Also returns the clipped spectrum of `m` it was built from.
pub(crate) fn psd_sqrt(
    m: &DMatrix<f64>,
    tolerance: f64,
    stage: &'static str,
) -> Result<(DMatrix<f64>, ClippedSpectrum)> {
    let eigen = m.clone().symmetric_eigen();
    let spectrum = clip_spectrum(eigen.eigenvalues, tolerance, 0.0, stage)?;
    let roots = spectrum.values.map(f64::sqrt);
    let vectors = eigen.eigenvectors;
    let root = &vectors * DMatrix::from_diagonal(&roots) * vectors.transpose();
    Ok((symmetrize(&root), spectrum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_psd_sqrt_squares_back() {
        let m = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let (root, spectrum) = psd_sqrt(&m, 1e-6, "test").unwrap();
        assert_eq!(spectrum.clipped, 0);
        assert_relative_eq!(&root * &root, m, epsilon = 1e-10);
    }

    #[test]
    fn test_clip_spectrum_zeroes_noise() {
        let spectrum =
            clip_spectrum(DVector::from_vec(vec![2.0, -1e-9, 0.5]), 1e-6, 0.0, "test").unwrap();
        assert_eq!(spectrum.clipped, 1);
        assert_relative_eq!(spectrum.largest, 2.0);
        assert_relative_eq!(spectrum.values[1], 0.0);
        assert_relative_eq!(spectrum.values[2], 0.5);
    }

    #[test]
    fn test_clip_spectrum_keeps_small_positive() {
        let spectrum =
            clip_spectrum(DVector::from_vec(vec![1.0, 1e-12, -1e-12]), 1e-6, 0.0, "test").unwrap();
        assert_eq!(spectrum.clipped, 1);
        assert_relative_eq!(spectrum.values[1], 1e-12);
        assert_relative_eq!(spectrum.values[2], 0.0);
    }

    #[test]
    fn test_clip_spectrum_rejects_real_negative() {
        let err = clip_spectrum(DVector::from_vec(vec![1.0, -0.1]), 1e-6, 0.0, "test").unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn test_clip_spectrum_scale_floor() {
        // Both values are noise next to a floor of 1.0.
        let spectrum =
            clip_spectrum(DVector::from_vec(vec![1e-17, -1e-17]), 1e-6, 1.0, "test").unwrap();
        assert_eq!(spectrum.clipped, 1);
        assert!(clip_spectrum(DVector::from_vec(vec![1e-17, -1e-17]), 1e-6, 0.0, "test").is_err());
    }

    #[test]
    fn test_clip_spectrum_rejects_nan() {
        let err = clip_spectrum(DVector::from_vec(vec![1.0, f64::NAN]), 1e-6, 0.0, "test").unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn test_relative_asymmetry() {
        let sym = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert_relative_eq!(relative_asymmetry(&sym, 0.0), 0.0);

        let skew = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 1.0, 1.0]);
        assert_relative_eq!(relative_asymmetry(&skew, 0.0), 0.5);
        assert_relative_eq!(relative_asymmetry(&skew, 10.0), 0.1);
        assert_relative_eq!(relative_asymmetry(&DMatrix::zeros(3, 3), 0.0), 0.0);
    }
}
