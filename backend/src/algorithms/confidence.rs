//! Confidence scoring for suggestions.
//!
//! A score in `[0, 100]` is composited from three sub-scores:
//!
//! - **clarity**: coefficient of variation of binned counts (peaked data scores high)
//! - **coverage**: spanned fraction of the range, record volume and distribution uniformity
//! - **statistical**: signal-to-noise, peak prominence and entropy of density bins
//!
//! Every scorer returns 0 for an empty population or a zero-span range.

use serde::{Deserialize, Serialize};

use super::stats::{compute_stats, max_or_zero, to_score};
use crate::models::TimeDomain;

const COVERAGE_BINS: usize = 20;

/// Relative weight of each sub-score in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub clarity: f64,
    pub coverage: f64,
    pub statistical: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            clarity: 0.4,
            coverage: 0.3,
            statistical: 0.3,
        }
    }
}

/// Partial override of [`ConfidenceWeights`]; unset fields keep their default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightOverrides {
    pub clarity: Option<f64>,
    pub coverage: Option<f64>,
    pub statistical: Option<f64>,
}

impl ConfidenceWeights {
    pub fn with_overrides(self, overrides: &WeightOverrides) -> Self {
        Self {
            clarity: overrides.clarity.unwrap_or(self.clarity),
            coverage: overrides.coverage.unwrap_or(self.coverage),
            statistical: overrides.statistical.unwrap_or(self.statistical),
        }
    }
}

/// Sub-scores and composite of one scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub clarity: u8,
    pub coverage: u8,
    pub statistical: u8,
    pub composite: u8,
}

/// Number of bins used by the clarity score: `clamp(n / 100, 10, 100)`.
pub fn clarity_bin_count(record_count: usize) -> usize {
    (record_count / 100).clamp(10, 100)
}

/// Histogram over `range`; values before the start are dropped and values at or
/// after the end fall into the last bin.
fn histogram(timestamps: &[f64], range: &TimeDomain, bin_count: usize) -> Vec<f64> {
    let mut bins = vec![0.0; bin_count];
    let bin_size = range.span() / bin_count as f64;
    if bin_size <= 0.0 {
        return bins;
    }
    for &t in timestamps {
        let idx = ((t - range.start) / bin_size).floor();
        if !idx.is_finite() || idx < 0.0 {
            continue;
        }
        let idx = (idx as usize).min(bin_count - 1);
        bins[idx] += 1.0;
    }
    bins
}

/// Bins used when no density bins are supplied to [`calculate_confidence`].
pub fn record_bins(timestamps: &[f64], range: &TimeDomain) -> Vec<f64> {
    histogram(timestamps, range, clarity_bin_count(timestamps.len()))
}

pub fn data_clarity(timestamps: &[f64], range: &TimeDomain) -> u8 {
    if timestamps.is_empty() || range.is_degenerate() {
        return 0;
    }

    let bin_count = clarity_bin_count(timestamps.len());
    let bins = histogram(timestamps, range, bin_count);
    let mean = timestamps.len() as f64 / bin_count as f64;
    let variance = bins.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / bin_count as f64;
    let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };

    to_score(cv * 50.0)
}

pub fn calculate_coverage(timestamps: &[f64], range: &TimeDomain) -> u8 {
    if timestamps.is_empty() || range.is_degenerate() {
        return 0;
    }

    let stats = compute_stats(timestamps);
    let span_fraction = (stats.max - stats.min) / range.span();

    let volume = ((timestamps.len() as f64 + 1.0).log10() * 20.0).min(100.0);

    let mut bins = histogram(timestamps, range, COVERAGE_BINS);
    bins.sort_by(|a, b| a.total_cmp(b));
    let total: f64 = bins.iter().sum();
    let uniformity = if total > 0.0 {
        let n = bins.len() as f64;
        let gini_sum: f64 = bins
            .iter()
            .enumerate()
            .map(|(i, b)| (2.0 * (i as f64 + 1.0) - n - 1.0) * b)
            .sum();
        let gini = gini_sum / (n * total);
        (1.0 - gini.abs()) * 100.0
    } else {
        0.0
    };

    to_score(span_fraction * 30.0 + volume * 0.35 + uniformity * 0.35)
}

pub fn statistical_confidence(density_bins: &[f64]) -> u8 {
    if density_bins.len() < 2 {
        return 0;
    }

    let n = density_bins.len() as f64;
    let stats = compute_stats(density_bins);

    let snr = if stats.mean > 0.0 { stats.std_dev / stats.mean } else { 0.0 };
    let snr_score = (snr * 100.0).min(100.0);

    let max = max_or_zero(density_bins);
    let prominence = if max > 0.0 { (max - stats.mean) / max } else { 0.0 };
    let prominence_score = prominence * 100.0;

    let scale = if max > 0.0 { max } else { 1.0 };
    let entropy: f64 = density_bins
        .iter()
        .map(|v| v / scale)
        .filter(|v| *v > 0.0)
        .map(|v| v * v.log2())
        .sum();
    let entropy_score = entropy.abs() / n.log2() * 100.0;

    to_score(snr_score * 0.4 + prominence_score * 0.35 + entropy_score * 0.25)
}

/// Score a population with every sub-score exposed.
///
/// When `density_bins` is `None` or empty the statistical sub-score is
/// computed from record bins sized like the clarity bins.
pub fn score_breakdown(
    timestamps: &[f64],
    range: &TimeDomain,
    density_bins: Option<&[f64]>,
    weights: &ConfidenceWeights,
) -> ConfidenceBreakdown {
    if timestamps.is_empty() || range.is_degenerate() {
        return ConfidenceBreakdown::default();
    }

    let clarity = data_clarity(timestamps, range);
    let coverage = calculate_coverage(timestamps, range);
    let statistical = match density_bins {
        Some(bins) if !bins.is_empty() => statistical_confidence(bins),
        _ => statistical_confidence(&record_bins(timestamps, range)),
    };

    let composite = to_score(
        clarity as f64 * weights.clarity
            + coverage as f64 * weights.coverage
            + statistical as f64 * weights.statistical,
    );

    ConfidenceBreakdown {
        clarity,
        coverage,
        statistical,
        composite,
    }
}

/// Composite confidence in `[0, 100]`.
pub fn calculate_confidence(
    timestamps: &[f64],
    range: &TimeDomain,
    density_bins: Option<&[f64]>,
    weights: &ConfidenceWeights,
) -> u8 {
    score_breakdown(timestamps, range, density_bins, weights).composite
}
