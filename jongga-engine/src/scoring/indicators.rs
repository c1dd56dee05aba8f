//! Price-series helpers used by the score engine.

use statrs::statistics::Statistics;

/// Span-based exponential mean with adjusted weights.
///
/// `alpha = 2 / (span + 1)`; each output is the weighted mean of all values
/// so far with weights `(1 - alpha)^age`, normalised over the available
/// history. The first output equals the first input.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    values
        .iter()
        .map(|&x| {
            numerator = x + decay * numerator;
            denominator = 1.0 + decay * denominator;
            numerator / denominator
        })
        .collect()
}

/// Last value of [`ewm_mean`], or `None` for an empty series.
pub fn ewm_last(values: &[f64], span: usize) -> Option<f64> {
    ewm_mean(values, span).last().copied()
}

/// Highest value among the last `n` entries.
pub fn trailing_max(values: &[f64], n: usize) -> Option<f64> {
    let start = values.len().saturating_sub(n);
    values[start..].iter().copied().reduce(f64::max)
}

/// Mean of the last `n` entries.
pub fn trailing_mean(values: &[f64], n: usize) -> Option<f64> {
    let start = values.len().saturating_sub(n);
    let window = &values[start..];
    if window.is_empty() {
        None
    } else {
        Some(window.mean())
    }
}

/// Rolling relative volatility width: sample stdev / mean over `window` values.
///
/// Entries before the first full window are `None`, as is any window whose
/// mean is zero.
pub fn rolling_width(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mean = slice.mean();
            if mean == 0.0 || !mean.is_finite() {
                return None;
            }
            let width = slice.std_dev() / mean;
            width.is_finite().then_some(width)
        })
        .collect()
}

/// Mean of the defined entries; `None` when nothing is defined.
pub fn mean_defined(values: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().mean())
    }
}
