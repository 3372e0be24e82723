//! Deterministic cross-sectional ordering.

use famafrench_primitives::Symbol;

/// Values in ascending order, ties broken by symbol.
pub(crate) fn ranked(values: &[(Symbol, f64)]) -> Vec<&(Symbol, f64)> {
    let mut sorted: Vec<&(Symbol, f64)> = values.iter().collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Number of members in each tail for a fraction of `n`.
pub(crate) fn tail_len(n: usize, fraction: f64) -> usize {
    (n as f64 * fraction).floor() as usize
}
