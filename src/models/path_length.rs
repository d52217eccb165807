//! Path-length normalization for isolation trees.
//!
//! A raw leaf depth depends on the subsample size, so scores are expressed
//! relative to `c(n)`, the average path length of an unsuccessful search in
//! a binary search tree built from `n` keys.

/// Euler–Mascheroni constant.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Largest `m` for which harmonic numbers are summed exactly.
/// Beyond it `ln(m) + γ` is used; the truncation error is below `1 / (2m)`.
pub const HARMONIC_EXACT_LIMIT: usize = 1024;

/// The m-th harmonic number `H(m) = 1 + 1/2 + ... + 1/m`.
pub fn harmonic(m: usize) -> f64 {
    if m == 0 {
        return 0.0;
    }

    if m <= HARMONIC_EXACT_LIMIT {
        // smallest terms first
        (1..=m).rev().map(|i| 1.0 / i as f64).sum()
    } else {
        (m as f64).ln() + EULER_GAMMA
    }
}

/// `c(k)`: expected path length of an unsuccessful BST search over `k` keys.
pub fn average_path_length(k: usize) -> f64 {
    if k <= 1 {
        return 0.0;
    }

    let k_f = k as f64;
    2.0 * harmonic(k - 1) - 2.0 * (k_f - 1.0) / k_f
}

/// Isolation score of a leaf reached at `depth` holding `size` training rows,
/// for a tree grown on a subsample of `n` rows.
///
/// Always lies in `(0, 1]`.
pub fn isolation_score(depth: usize, size: usize, n: usize) -> f64 {
    let delta = average_path_length(n);
    let delta = if delta > 0.0 { delta } else { 1.0 };

    let path = depth as f64 + average_path_length(size);
    2.0_f64.powf(-path / delta)
}
