use anyhow::{Context, Result};
use fmd_core::{Estimator, GaussianEstimator};
use fmd_io::{load_embeddings, Config};
use std::path::Path;

pub fn run_fit(config: &Config, path: &Path, json: bool) -> Result<()> {
    log::info!("Fitting {}", path.display());

    let estimator = config.estimator()?;
    let features = load_embeddings(path).context("Failed to load embeddings")?;

    let (parameters, shrinkage) = match &estimator {
        Estimator::Shrinkage(inner) => {
            let fit = inner.fit(&features)?;
            (fit.parameters, Some(fit.shrinkage))
        }
        Estimator::MaxLikelihood(inner) => (inner.estimate_parameters(&features)?, None),
    };

    let eigenvalues = parameters.eigenvalues();
    let condition = parameters.condition_number();
    let trace = parameters.covariance().trace();
    let psd = parameters.is_positive_semi_definite(config.tolerance);

    if json {
        let report = serde_json::json!({
            "path": path.display().to_string(),
            "estimator": estimator.name(),
            "samples": features.n_samples(),
            "dimensions": features.dim(),
            "covariance_trace": trace,
            "min_eigenvalue": eigenvalues.min(),
            "max_eigenvalue": eigenvalues.max(),
            "condition_number": condition.is_finite().then_some(condition),
            "positive_semi_definite": psd,
            "shrinkage": shrinkage,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Gaussian fit: {}", path.display());
    println!("  Estimator:        {}", estimator.name());
    println!("  Pieces:           {}", features.n_samples());
    println!("  Dimensions:       {}", features.dim());
    println!("  Covariance trace: {:.6}", trace);
    println!(
        "  Eigenvalues:      [{:.6e}, {:.6e}]",
        eigenvalues.min(),
        eigenvalues.max()
    );
    if condition.is_finite() {
        println!("  Condition number: {:.3e}", condition);
    } else {
        println!("  Condition number: inf (singular covariance)");
    }
    println!("  PSD:              {}", if psd { "yes" } else { "no" });
    if let Some(shrinkage) = shrinkage {
        println!("  Shrinkage:        {:.6}", shrinkage);
    }

    if features.n_samples() <= features.dim() && shrinkage.is_none() {
        println!(
            "\nNote: {} pieces for {} dimensions; the covariance is rank-deficient.",
            features.n_samples(),
            features.dim()
        );
    }

    Ok(())
}
