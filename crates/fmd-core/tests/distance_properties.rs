//! Behavioural tests for the distance engine on sampled embedding sets.

use approx::assert_relative_eq;
use fmd_core::{
    EmbeddingMatrix, Error, Estimator, EstimatorKind, FrechetDistanceEngine, GaussianEstimator,
    MaxLikelihoodEstimator, ShrinkageEstimator,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, StandardNormal};
use rand_pcg::Pcg64;

fn standard_normal(n_samples: usize, dim: usize, seed: u64) -> EmbeddingMatrix {
    let mut rng = Pcg64::seed_from_u64(seed);
    let values: Vec<f64> = (0..n_samples * dim)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect();
    EmbeddingMatrix::from_row_slice(n_samples, dim, &values).unwrap()
}

fn shifted_normal(n_samples: usize, dim: usize, mean: f64, std_dev: f64, seed: u64) -> EmbeddingMatrix {
    let mut rng = Pcg64::seed_from_u64(seed);
    let normal = Normal::new(mean, std_dev).unwrap();
    let values: Vec<f64> = (0..n_samples * dim).map(|_| normal.sample(&mut rng)).collect();
    EmbeddingMatrix::from_row_slice(n_samples, dim, &values).unwrap()
}

fn estimators() -> [Estimator; 2] {
    [
        Estimator::from(EstimatorKind::MaxLikelihood),
        Estimator::from(EstimatorKind::Shrinkage),
    ]
}

#[test]
fn self_distance_is_zero() {
    let engine = FrechetDistanceEngine::new();
    let features = standard_normal(64, 16, 1);

    for estimator in estimators() {
        let d = engine.compute(&features, &features, &estimator).unwrap();
        assert!(d >= 0.0);
        assert!(d < 1e-8, "{}: self distance {}", estimator.name(), d);
    }
}

#[test]
fn self_distance_is_zero_when_rank_deficient() {
    let engine = FrechetDistanceEngine::new();
    let features = standard_normal(50, 128, 2);

    for estimator in estimators() {
        let d = engine.compute(&features, &features, &estimator).unwrap();
        assert!(d >= 0.0);
        // Traces are around 128; allow round-off from the singular directions.
        assert!(d < 1e-3, "{}: self distance {}", estimator.name(), d);
    }
}

#[test]
fn distance_is_symmetric() {
    let engine = FrechetDistanceEngine::new();
    let a = standard_normal(80, 12, 3);
    let b = shifted_normal(60, 12, 0.5, 2.0, 4);

    for estimator in estimators() {
        let ab = engine.compute(&a, &b, &estimator).unwrap();
        let ba = engine.compute(&b, &a, &estimator).unwrap();
        assert_relative_eq!(ab, ba, max_relative = 1e-9);
    }
}

#[test]
fn separated_corpora_are_far_apart() {
    let engine = FrechetDistanceEngine::new();
    let a = standard_normal(200, 4, 5);
    let b = shifted_normal(200, 4, 3.0, 1.0, 6);

    let d = engine.compute(&a, &b, &MaxLikelihoodEstimator).unwrap();
    // Mean shift of 3 in each of 4 dimensions dominates: d^2 is close to 36.
    assert!(d > 30.0 && d < 42.0, "unexpected distance {}", d);
}

#[test]
fn dimension_mismatch_is_reported() {
    let engine = FrechetDistanceEngine::new();
    let a = standard_normal(10, 8, 7);
    let b = standard_normal(10, 16, 8);

    for estimator in estimators() {
        let err = engine.compute(&a, &b, &estimator).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                reference: 8,
                candidate: 16
            }
        ));
    }
}

#[test]
fn single_row_is_accepted_by_mle() {
    let features = EmbeddingMatrix::from_rows(&[vec![1.0, 2.0, 3.0, 4.0]]).unwrap();
    let params = MaxLikelihoodEstimator.estimate_parameters(&features).unwrap();
    assert_eq!(params.dim(), 4);
    assert!(params.covariance().iter().all(|v| *v == 0.0));
}

#[test]
fn single_candidate_never_yields_nan() {
    let engine = FrechetDistanceEngine::new();
    let reference = standard_normal(50, 128, 9);
    let candidate = standard_normal(1, 128, 10);

    for estimator in estimators() {
        match engine.compute(&reference, &candidate, &estimator) {
            Ok(d) => assert!(d.is_finite() && d >= 0.0, "{}: got {}", estimator.name(), d),
            Err(err) => assert!(err.is_numerical(), "{}: unexpected {}", estimator.name(), err),
        }
        match engine.compute(&candidate, &reference, &estimator) {
            Ok(d) => assert!(d.is_finite() && d >= 0.0, "{}: got {}", estimator.name(), d),
            Err(err) => assert!(err.is_numerical(), "{}: unexpected {}", estimator.name(), err),
        }
    }
}

#[test]
fn shrinkage_improves_conditioning() {
    let features = standard_normal(10, 128, 11);
    let shrunk = ShrinkageEstimator::default()
        .estimate_parameters(&features)
        .unwrap();
    let plain = MaxLikelihoodEstimator.estimate_parameters(&features).unwrap();

    assert!(shrunk.condition_number() < plain.condition_number());
}

#[test]
fn engines_share_nothing_across_threads() {
    let engine = FrechetDistanceEngine::new();
    let a = standard_normal(30, 6, 12);
    let b = standard_normal(30, 6, 13);
    let expected = engine.compute(&a, &b, &ShrinkageEstimator::default()).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.compute(&a, &b, &ShrinkageEstimator::default())))
            .collect();
        for handle in handles {
            let d = handle.join().unwrap().unwrap();
            assert_relative_eq!(d, expected);
        }
    });
}

fn embedding_pair() -> impl Strategy<Value = (EmbeddingMatrix, EmbeddingMatrix)> {
    (1usize..5).prop_flat_map(|dim| {
        let a = (dim + 2..dim + 12)
            .prop_flat_map(move |n| prop::collection::vec(-10.0f64..10.0, n * dim))
            .prop_map(move |values| {
                EmbeddingMatrix::from_row_slice(values.len() / dim, dim, &values).unwrap()
            });
        let b = (dim + 2..dim + 12)
            .prop_flat_map(move |n| prop::collection::vec(-10.0f64..10.0, n * dim))
            .prop_map(move |values| {
                EmbeddingMatrix::from_row_slice(values.len() / dim, dim, &values).unwrap()
            });
        (a, b)
    })
}

proptest! {
    #[test]
    fn distance_is_non_negative_and_symmetric((a, b) in embedding_pair()) {
        let engine = FrechetDistanceEngine::new();
        for estimator in estimators() {
            let scale = estimator.estimate_parameters(&a).unwrap().covariance().trace()
                + estimator.estimate_parameters(&b).unwrap().covariance().trace();
            let ab = engine.compute(&a, &b, &estimator).unwrap();
            let ba = engine.compute(&b, &a, &estimator).unwrap();
            prop_assert!(ab >= 0.0);
            prop_assert!(ba >= 0.0);
            prop_assert!(
                (ab - ba).abs() <= 1e-6 * (1.0 + scale + ab.max(ba)),
                "{}: {} vs {}", estimator.name(), ab, ba
            );
        }
    }

    #[test]
    fn self_distance_vanishes((a, _b) in embedding_pair()) {
        let engine = FrechetDistanceEngine::new();
        for estimator in estimators() {
            let scale = estimator.estimate_parameters(&a).unwrap().covariance().trace();
            let d = engine.compute(&a, &a, &estimator).unwrap();
            prop_assert!(d <= 1e-6 * (1.0 + scale), "{}: {}", estimator.name(), d);
        }
    }
}

fn samples(dim: usize, rows: std::ops::Range<usize>) -> impl Strategy<Value = EmbeddingMatrix> {
    rows.prop_flat_map(move |n| prop::collection::vec(-10.0f64..10.0, n * dim))
        .prop_map(move |values| {
            EmbeddingMatrix::from_row_slice(values.len() / dim, dim, &values).unwrap()
        })
}

/// Fewer rows than dimensions, so the MLE covariances are singular.
fn rank_deficient_pair() -> impl Strategy<Value = (EmbeddingMatrix, EmbeddingMatrix)> {
    (2usize..33).prop_flat_map(|dim| (samples(dim, 1..dim), samples(dim, 1..dim)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Square roots of round-off eigenvalues of singular covariances are
    // larger than the round-off itself, hence the looser bound.
    #[test]
    fn rank_deficient_distance_is_non_negative_and_symmetric((a, b) in rank_deficient_pair()) {
        let engine = FrechetDistanceEngine::new();
        for estimator in estimators() {
            let scale = estimator.estimate_parameters(&a).unwrap().covariance().trace()
                + estimator.estimate_parameters(&b).unwrap().covariance().trace();
            let ab = engine.compute(&a, &b, &estimator).unwrap();
            let ba = engine.compute(&b, &a, &estimator).unwrap();
            prop_assert!(ab.is_finite() && ab >= 0.0);
            prop_assert!(ba.is_finite() && ba >= 0.0);
            prop_assert!(
                (ab - ba).abs() <= 1e-5 * (1.0 + scale + ab.max(ba)),
                "{}: {} vs {}", estimator.name(), ab, ba
            );
        }
    }

    #[test]
    fn rank_deficient_self_distance_vanishes((a, _b) in rank_deficient_pair()) {
        let engine = FrechetDistanceEngine::new();
        for estimator in estimators() {
            let scale = estimator.estimate_parameters(&a).unwrap().covariance().trace();
            let d = engine.compute(&a, &a, &estimator).unwrap();
            prop_assert!(d <= 1e-5 * (1.0 + scale), "{}: {}", estimator.name(), d);
        }
    }
}
