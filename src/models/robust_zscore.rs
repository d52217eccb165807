use tracing::debug;

use crate::error::{AnomalyError, Result};
use crate::models::base_model::Detector;
use crate::utils::dataset::Dataset;
use crate::utils::stats::{mean_absolute_deviation, median, median_absolute_deviation};

/// Consistency constant relating the MAD to the standard deviation.
const ETA: f64 = 0.6745;

/// Scale applied to the mean absolute deviation when a column's MAD is zero.
const MEAN_AD_FACTOR: f64 = 1.253314;

const EPSILON: f64 = 1e-8;

/// Global outlier detector based on the modified z-score of each feature.
///
/// A sample is an anomaly if any single feature's z-score exceeds
/// `threshold`, or if the average z-score over all features exceeds
/// `tolerance`.
#[derive(Debug, Clone)]
pub struct RobustZScore {
    tolerance: f64,
    threshold: f64,
    medians: Vec<f64>,
    scales: Vec<f64>,
}

impl Default for RobustZScore {
    fn default() -> Self {
        RobustZScore {
            tolerance: 3.0,
            threshold: 3.5,
            medians: Vec::new(),
            scales: Vec::new(),
        }
    }
}

impl RobustZScore {
    pub fn new(tolerance: f64, threshold: f64) -> Result<Self> {
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(AnomalyError::InvalidArgument(format!(
                "tolerance must be 0 or greater, {} given",
                tolerance
            )));
        }

        if threshold.is_nan() || threshold <= 0.0 {
            return Err(AnomalyError::InvalidArgument(format!(
                "threshold must be greater than 0, {} given",
                threshold
            )));
        }

        Ok(RobustZScore {
            tolerance,
            threshold,
            ..RobustZScore::default()
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    /// Absolute modified z-score of every feature of a sample.
    pub fn z_scores(&self, sample: &[f64]) -> Result<Vec<f64>> {
        if !self.trained() {
            return Err(AnomalyError::NotFitted(
                "robust z-score must be trained before inference".to_string(),
            ));
        }

        if sample.len() != self.medians.len() {
            return Err(AnomalyError::InvalidArgument(format!(
                "expected {} features, got {}",
                self.medians.len(),
                sample.len()
            )));
        }

        Ok(sample
            .iter()
            .zip(self.medians.iter().zip(&self.scales))
            .map(|(x, (median, scale))| (x - median).abs() / scale)
            .collect())
    }
}

impl Detector for RobustZScore {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(AnomalyError::InvalidArgument(
                "cannot train on an empty dataset".to_string(),
            ));
        }

        let x = dataset.to_array()?;

        let mut medians = Vec::with_capacity(x.ncols());
        let mut scales = Vec::with_capacity(x.ncols());

        for column in x.columns() {
            let values = column.to_vec();

            let center = median(&values).unwrap_or(0.0);
            let mad = median_absolute_deviation(&values, center).unwrap_or(0.0);

            let scale = if mad > 0.0 {
                mad / ETA
            } else {
                let mean_ad = mean_absolute_deviation(&values, center).unwrap_or(0.0);
                if mean_ad > 0.0 {
                    MEAN_AD_FACTOR * mean_ad
                } else {
                    EPSILON
                }
            };

            medians.push(center);
            scales.push(scale);
        }

        debug!(
            features = medians.len(),
            rows = dataset.num_rows(),
            "robust z-score trained"
        );

        self.medians = medians;
        self.scales = scales;

        Ok(())
    }

    fn trained(&self) -> bool {
        !self.medians.is_empty()
    }

    fn predict_sample(&self, sample: &[f64]) -> Result<u8> {
        let z = self.z_scores(sample)?;

        if z.iter().any(|&score| score > self.threshold) {
            return Ok(1);
        }

        let mean = z.iter().sum::<f64>() / z.len() as f64;
        Ok(u8::from(mean > self.tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[f64]) -> Dataset {
        Dataset::from_rows(values.iter().map(|&v| vec![v]).collect()).unwrap()
    }

    #[test]
    fn flags_the_single_outlier() {
        let dataset = column(&[1.0, 2.0, 2.0, 3.0, 2.0, 2.0, 50.0]);
        let mut detector = RobustZScore::default();
        detector.train(&dataset).unwrap();

        assert_eq!(detector.predict(&dataset).unwrap(), vec![0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn mad_scaling_when_spread_is_nonzero() {
        let dataset = column(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut detector = RobustZScore::default();
        detector.train(&dataset).unwrap();

        // median 3, MAD 1
        let z = detector.z_scores(&[5.0]).unwrap();
        assert!((z[0] - 2.0 * ETA).abs() < 1e-12);
    }

    #[test]
    fn tolerance_flags_broad_deviation() {
        let rows: Vec<Vec<f64>> = (0..9).map(|i| vec![i as f64, i as f64]).collect();
        let dataset = Dataset::from_rows(rows).unwrap();

        // median 4, MAD 2: a deviation of 8 gives z = 4 * ETA, under the threshold
        let mut detector = RobustZScore::new(2.5, 3.5).unwrap();
        detector.train(&dataset).unwrap();
        assert_eq!(detector.predict_sample(&[10.0, 10.0]).unwrap(), 0);
        assert_eq!(detector.predict_sample(&[12.0, 12.0]).unwrap(), 1);
    }

    #[test]
    fn invalid_parameters() {
        assert!(RobustZScore::new(-1.0, 3.5).is_err());
        assert!(RobustZScore::new(3.0, 0.0).is_err());
        assert!(RobustZScore::new(f64::NAN, 3.5).is_err());
    }

    #[test]
    fn not_fitted() {
        let detector = RobustZScore::default();
        assert!(matches!(
            detector.predict_sample(&[1.0]),
            Err(AnomalyError::NotFitted(_))
        ));
    }

    #[test]
    fn empty_query() {
        let mut detector = RobustZScore::default();
        assert!(matches!(
            detector.predict(&Dataset::default()),
            Err(AnomalyError::NotFitted(_))
        ));

        detector.train(&column(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(detector.predict(&Dataset::default()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn constant_column_does_not_divide_by_zero() {
        let dataset = column(&[4.0; 10]);
        let mut detector = RobustZScore::default();
        detector.train(&dataset).unwrap();

        assert_eq!(detector.predict_sample(&[4.0]).unwrap(), 0);
        assert_eq!(detector.predict_sample(&[4.1]).unwrap(), 1);
    }
}
