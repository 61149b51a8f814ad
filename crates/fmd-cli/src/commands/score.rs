use anyhow::{Context, Result};
use fmd_core::{EstimatorKind, GaussianEstimator};
use fmd_io::{load_embeddings, Config};
use std::path::Path;

pub fn run_score(config: &Config, reference: &Path, candidate: &Path, json: bool) -> Result<()> {
    log::info!(
        "Scoring {} against {}",
        candidate.display(),
        reference.display()
    );

    let estimator = config.estimator()?;
    let engine = config.engine()?;

    let reference_set = load_embeddings(reference).context("Failed to load reference embeddings")?;
    let candidate_set = load_embeddings(candidate).context("Failed to load candidate embeddings")?;

    let distance = match engine.compute_detailed(&reference_set, &candidate_set, &estimator) {
        Ok(distance) => distance,
        Err(e) => {
            if e.is_numerical() && estimator.kind() == EstimatorKind::MaxLikelihood {
                eprintln!(
                    "Hint: the covariance estimate is ill-conditioned; try `--estimator shrinkage`."
                );
            }
            return Err(e).context("Failed to compute Frechet distance");
        }
    };

    if json {
        let report = serde_json::json!({
            "reference": reference.display().to_string(),
            "candidate": candidate.display().to_string(),
            "estimator": estimator.name(),
            "reference_samples": reference_set.n_samples(),
            "candidate_samples": candidate_set.n_samples(),
            "dimensions": reference_set.dim(),
            "distance": distance,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Frechet Music Distance: {:.6}", distance.value);
    println!("  Estimator:   {}", estimator.name());
    println!(
        "  Reference:   {} ({} pieces)",
        reference.display(),
        reference_set.n_samples()
    );
    println!(
        "  Candidate:   {} ({} pieces)",
        candidate.display(),
        candidate_set.n_samples()
    );
    println!("  Dimensions:  {}", reference_set.dim());
    println!("  Mean term:   {:.6}", distance.mean_term);
    println!("  Trace term:  {:.6}", distance.trace_term);
    if distance.clipped_eigenvalues > 0 {
        println!(
            "  Clipped {} round-off eigenvalues (tolerance {:e})",
            distance.clipped_eigenvalues,
            engine.tolerance()
        );
    }

    Ok(())
}
