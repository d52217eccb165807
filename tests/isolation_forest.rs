//! End-to-end behaviour of the isolation forest on a clustered dataset
//! with a handful of far-away outliers.

use isoforest_rust::utils::evaluation::{roc_auc, Metrics};
use isoforest_rust::{Dataset, Detector, IsolationForest, IsolationForestParams, Scoring};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const INLIERS: usize = 200;
const OUTLIERS: usize = 10;

/// Standard normal draw via the Box–Muller transform.
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// A tight cluster around the origin followed by outliers on a distant ring.
fn clustered(seed: u64) -> (Dataset, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(INLIERS + OUTLIERS);

    for _ in 0..INLIERS {
        rows.push(vec![0.5 * gaussian(&mut rng), 0.5 * gaussian(&mut rng)]);
    }

    for _ in 0..OUTLIERS {
        let angle = rng.gen_range(0.0..2.0 * PI);
        let radius = rng.gen_range(20.0..30.0);
        rows.push(vec![radius * angle.cos(), radius * angle.sin()]);
    }

    let mut truth = vec![0u8; INLIERS];
    truth.extend(vec![1u8; OUTLIERS]);

    (Dataset::from_rows(rows).unwrap(), truth)
}

fn forest(seed: u64) -> IsolationForest {
    IsolationForest::from_params(IsolationForestParams {
        trees: 50,
        ratio: 0.25,
        threshold: 0.5,
        random_state: Some(seed),
        n_jobs: None,
    })
    .unwrap()
}

#[test]
fn flags_distant_outliers() {
    let (dataset, truth) = clustered(2024);
    let mut model = forest(17);
    model.train(&dataset).unwrap();

    let labels = model.predict(&dataset).unwrap();
    let metrics = Metrics::from_labels(&truth, &labels).unwrap();

    assert!(
        metrics.true_positives >= 8,
        "only {} of {} outliers flagged",
        metrics.true_positives,
        OUTLIERS
    );
    assert!(
        metrics.false_positives <= INLIERS / 20,
        "{} false positives among {} inliers",
        metrics.false_positives,
        INLIERS
    );
}

#[test]
fn scores_rank_outliers_first() {
    let (dataset, truth) = clustered(7);
    let mut model = forest(3);
    model.train(&dataset).unwrap();

    let scores = model.score(&dataset).unwrap();
    assert_eq!(scores.len(), INLIERS + OUTLIERS);
    assert!(roc_auc(&truth, &scores).unwrap() > 0.95);
}

#[test]
fn seeded_training_is_reproducible() {
    let (dataset, _) = clustered(11);

    let mut first = forest(5);
    let mut second = forest(5);
    first.train(&dataset).unwrap();
    second.train(&dataset).unwrap();

    assert_eq!(first.score(&dataset).unwrap(), second.score(&dataset).unwrap());
    assert_eq!(first.predict(&dataset).unwrap(), second.predict(&dataset).unwrap());
}

#[test]
fn estimators_follow_subsample_depth() {
    let (dataset, _) = clustered(1);
    let mut model = forest(1);
    model.train(&dataset).unwrap();

    let n = model.subsample_size(dataset.num_rows());
    assert_eq!(n, 53);

    let limit = IsolationForest::max_depth_for(n);
    assert_eq!(model.trees().len(), 50);
    for tree in model.trees() {
        assert_eq!(tree.n_samples(), n);
        assert!(tree.leaves().iter().all(|leaf| leaf.depth <= limit));
    }
}

#[test]
fn unseen_queries_are_scored() {
    let (dataset, _) = clustered(9);
    let mut model = forest(9);
    model.train(&dataset).unwrap();

    let far = model.score_sample(&[500.0, -500.0]).unwrap();
    let center = model.score_sample(&[0.0, 0.0]).unwrap();
    assert!(far > center);
    assert_eq!(model.predict_sample(&[500.0, -500.0]).unwrap(), 1);
}
