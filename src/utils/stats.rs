/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the values. Even-sized inputs average the two middle elements.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn absolute_deviations(values: &[f64], center: f64) -> Vec<f64> {
    values.iter().map(|x| (x - center).abs()).collect()
}

/// Median of the absolute deviations from `center`.
pub fn median_absolute_deviation(values: &[f64], center: f64) -> Option<f64> {
    median(&absolute_deviations(values, center))
}

/// Mean of the absolute deviations from `center`.
pub fn mean_absolute_deviation(values: &[f64], center: f64) -> Option<f64> {
    mean(&absolute_deviations(values, center))
}
