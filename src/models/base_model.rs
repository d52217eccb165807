use crate::error::{AnomalyError, Result};
use crate::utils::dataset::Dataset;

/// A common Rust trait for batch anomaly detectors.
pub trait Detector {
    /// Fit the detector to a training set, replacing any previous fit.
    fn train(&mut self, dataset: &Dataset) -> Result<()>;

    /// Whether `train` has completed successfully.
    fn trained(&self) -> bool;

    /// Label one sample: `1` for an anomaly, `0` otherwise.
    fn predict_sample(&self, sample: &[f64]) -> Result<u8>;

    /// Default: label every row of a dataset.
    fn predict(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        if !self.trained() {
            return Err(not_fitted());
        }

        dataset
            .continuous_rows()?
            .iter()
            .map(|x| self.predict_sample(x))
            .collect()
    }
}

/// Detectors that also expose a continuous anomaly score in `[0, 1]`.
pub trait Scoring: Detector {
    /// Score one sample.
    fn score_sample(&self, sample: &[f64]) -> Result<f64>;

    /// Default: score a batch.
    fn score(&self, dataset: &Dataset) -> Result<Vec<f64>> {
        if !self.trained() {
            return Err(not_fitted());
        }

        dataset
            .continuous_rows()?
            .iter()
            .map(|x| self.score_sample(x))
            .collect()
    }
}

fn not_fitted() -> AnomalyError {
    AnomalyError::NotFitted("detector must be trained before inference".to_string())
}
