// src/models/isolation_forest.rs

use rand::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{AnomalyError, Result};
use crate::models::base_model::{Detector, Scoring};
use crate::models::isolation_tree::IsolationTree;
use crate::utils::dataset::Dataset;

/// Added to the tree count when averaging per-tree scores.
const EPSILON: f64 = 1e-8;

/// Hyperparameters of an [`IsolationForest`].
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForestParams {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Fraction of the training rows drawn for each tree, in `[0.01, 1.0]`.
    pub ratio: f64,
    /// Averaged score above which a sample is labeled anomalous, in `[0, 1]`.
    pub threshold: f64,
    /// Seed for the forest's random source. Entropy is used when absent.
    pub random_state: Option<u64>,
    /// Worker threads used to grow trees. Defaults to the number of CPUs.
    pub n_jobs: Option<usize>,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        IsolationForestParams {
            trees: 300,
            ratio: 0.2,
            threshold: 0.5,
            random_state: None,
            n_jobs: None,
        }
    }
}

impl IsolationForestParams {
    fn validate(&self) -> Result<()> {
        if self.trees < 1 {
            return Err(AnomalyError::InvalidArgument(format!(
                "the number of trees must be at least 1, {} given",
                self.trees
            )));
        }

        if !(0.01..=1.0).contains(&self.ratio) {
            return Err(AnomalyError::InvalidArgument(format!(
                "ratio must be between 0.01 and 1.0, {} given",
                self.ratio
            )));
        }

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(AnomalyError::InvalidArgument(format!(
                "threshold must be between 0 and 1, {} given",
                self.threshold
            )));
        }

        if self.n_jobs == Some(0) {
            return Err(AnomalyError::InvalidArgument(
                "n_jobs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Ensemble of isolation trees, each grown on its own random subsample.
pub struct IsolationForest {
    params: IsolationForestParams,
    trees: Vec<IsolationTree>,
    n_features: usize,
    rng: StdRng,
}

impl IsolationForest {
    pub fn new(trees: usize, ratio: f64, threshold: f64) -> Result<Self> {
        Self::from_params(IsolationForestParams {
            trees,
            ratio,
            threshold,
            ..IsolationForestParams::default()
        })
    }

    pub fn from_params(params: IsolationForestParams) -> Result<Self> {
        params.validate()?;

        let rng = match params.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(IsolationForest {
            params,
            trees: Vec::new(),
            n_features: 0,
            rng,
        })
    }

    pub fn params(&self) -> &IsolationForestParams {
        &self.params
    }

    /// The trained trees, in construction order.
    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }

    /// Rows drawn per tree for a training set of `n_rows`.
    pub fn subsample_size(&self, n_rows: usize) -> usize {
        ((self.params.ratio * n_rows as f64).round() as usize).clamp(1, n_rows.max(1))
    }

    /// Depth limit shared by every tree grown on `n` rows.
    ///
    /// With the root at depth 1, `n <= 2` gives trees that never split, so
    /// every query scores the same.
    pub fn max_depth_for(n: usize) -> usize {
        if n < 2 {
            return 1;
        }
        ((n as f64).log2().ceil() as usize).max(1)
    }

    fn grow_tree(dataset: &Dataset, n: usize, max_depth: usize, seed: u64) -> Result<IsolationTree> {
        let mut rng = StdRng::seed_from_u64(seed);
        let subset = dataset.random_subset(n, &mut rng)?;

        let mut tree = IsolationTree::new(max_depth)?;
        tree.train(&subset, &mut rng)?;
        Ok(tree)
    }

    fn worker_pool(&self) -> Result<rayon::ThreadPool> {
        let n_jobs = self.params.n_jobs.unwrap_or_else(num_cpus::get).max(1);

        rayon::ThreadPoolBuilder::new()
            .num_threads(n_jobs)
            .build()
            .map_err(|e| AnomalyError::Runtime(format!("failed to build worker pool: {}", e)))
    }

    fn check_dimensionality(&self, n_features: usize) -> Result<()> {
        if n_features != self.n_features {
            return Err(AnomalyError::InvalidArgument(format!(
                "expected {} features, got {}",
                self.n_features, n_features
            )));
        }
        Ok(())
    }

    fn not_fitted() -> AnomalyError {
        AnomalyError::NotFitted("isolation forest must be trained before inference".to_string())
    }

    fn average_score(&self, sample: &[f64]) -> Result<f64> {
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.search(sample)?.score;
        }
        Ok(total / (self.trees.len() as f64 + EPSILON))
    }

    fn label(&self, score: f64) -> u8 {
        u8::from(score > self.params.threshold)
    }
}

impl Detector for IsolationForest {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(AnomalyError::InvalidArgument(
                "cannot train on an empty dataset".to_string(),
            ));
        }

        // validates column types and values before any state changes
        dataset.continuous_rows()?;

        let n = self.subsample_size(dataset.num_rows());
        let max_depth = Self::max_depth_for(n);
        let pool = self.worker_pool()?;

        info!(
            trees = self.params.trees,
            rows = dataset.num_rows(),
            subsample = n,
            max_depth,
            workers = pool.current_num_threads(),
            "training isolation forest"
        );

        let seeds: Vec<u64> = (0..self.params.trees).map(|_| self.rng.gen()).collect();

        let trees = pool.install(|| {
            seeds
                .par_iter()
                .map(|&seed| Self::grow_tree(dataset, n, max_depth, seed))
                .collect::<Result<Vec<_>>>()
        })?;

        self.trees = trees;
        self.n_features = dataset.num_columns();

        debug!(trees = self.trees.len(), "isolation forest trained");

        Ok(())
    }

    fn trained(&self) -> bool {
        !self.trees.is_empty()
    }

    fn predict_sample(&self, sample: &[f64]) -> Result<u8> {
        Ok(self.label(self.score_sample(sample)?))
    }

    fn predict(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        Ok(self
            .score(dataset)?
            .into_iter()
            .map(|s| self.label(s))
            .collect())
    }
}

impl Scoring for IsolationForest {
    fn score_sample(&self, sample: &[f64]) -> Result<f64> {
        if !self.trained() {
            return Err(Self::not_fitted());
        }
        self.check_dimensionality(sample.len())?;
        self.average_score(sample)
    }

    fn score(&self, dataset: &Dataset) -> Result<Vec<f64>> {
        if !self.trained() {
            return Err(Self::not_fitted());
        }
        if dataset.is_empty() {
            return Ok(Vec::new());
        }
        self.check_dimensionality(dataset.num_columns())?;

        let rows = dataset.continuous_rows()?;
        rows.par_iter().map(|x| self.average_score(x)).collect()
    }
}
