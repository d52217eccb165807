//! Classification metrics for binary anomaly labels (`1` = anomaly).

use crate::error::{AnomalyError, Result};

/// Confusion counts of predicted against true labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(AnomalyError::InvalidArgument(format!(
            "got {} true labels but {} predictions",
            a, b
        )));
    }
    Ok(())
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

impl Metrics {
    pub fn from_labels(true_labels: &[u8], predicted: &[u8]) -> Result<Self> {
        check_lengths(true_labels.len(), predicted.len())?;

        let mut m = Metrics::default();
        for (&label, &pred) in true_labels.iter().zip(predicted) {
            match (label > 0, pred > 0) {
                (true, true) => m.true_positives += 1,
                (false, true) => m.false_positives += 1,
                (false, false) => m.true_negatives += 1,
                (true, false) => m.false_negatives += 1,
            }
        }
        Ok(m)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    pub fn false_positive_rate(&self) -> f64 {
        ratio(self.false_positives, self.false_positives + self.true_negatives)
    }
}

/// Precision, recall and F1 after labeling every score above `threshold` anomalous.
pub fn threshold_metrics(true_labels: &[u8], scores: &[f64], threshold: f64) -> Result<(f64, f64, f64)> {
    let predicted: Vec<u8> = scores.iter().map(|&s| u8::from(s > threshold)).collect();
    let m = Metrics::from_labels(true_labels, &predicted)?;
    Ok((m.precision(), m.recall(), m.f1()))
}

/// Area under the ROC curve, computed from the rank-sum statistic.
///
/// Tied scores share their average rank. Returns 0.5 when only one class is present.
pub fn roc_auc(true_labels: &[u8], scores: &[f64]) -> Result<f64> {
    check_lengths(true_labels.len(), scores.len())?;

    let positives = true_labels.iter().filter(|&&l| l > 0).count();
    let negatives = true_labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Ok(0.5);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // ranks are 1-based
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }

    let rank_sum: f64 = ranks
        .iter()
        .zip(true_labels)
        .filter(|(_, l)| **l > 0)
        .map(|(r, _)| r)
        .sum();

    let p = positives as f64;
    Ok((rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}
