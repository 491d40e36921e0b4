//! Density, burstiness and warp map construction.
//!
//! Pipeline for one pass over a time domain:
//!
//! ```text
//! timestamps ──► bin counts ──► moving average ──► density [0,1] ──► weights 1 + 5·d
//!      │                                                                  │
//!      └──► inter-arrival stats per bin ──► burstiness [0,1]              ▼
//!                                                          cumulative warp map
//! ```
//!
//! The same pipeline accepts the pre-aggregated forms produced by an external
//! analytic engine (per-bin counts and inter-arrival sums), see
//! [`build_from_aggregates`].
//!
//! Nothing here fails: empty input gives all-zero density and burstiness with a
//! linear warp map; a zero-span domain gives all-zero maps and a warp map
//! collapsed onto the domain start.

use serde::{Deserialize, Serialize};

use super::stats::max_or_zero;
use crate::models::TimeDomain;

/// Extra weight given to a bin at full density in the warp map.
pub const DENSITY_WEIGHT_GAIN: f64 = 5.0;

pub const DEFAULT_BIN_COUNT: usize = 256;
pub const DEFAULT_KERNEL_WIDTH: usize = 2;

/// Parameters of a density pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityConfig {
    /// Number of bins; zero is promoted to one.
    pub bin_count: usize,
    /// Half-width of the moving-average window; zero disables smoothing.
    pub kernel_width: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            kernel_width: DEFAULT_KERNEL_WIDTH,
        }
    }
}

impl DensityConfig {
    pub fn new(bin_count: usize, kernel_width: usize) -> Self {
        Self {
            bin_count,
            kernel_width,
        }
    }

    pub fn effective_bin_count(&self) -> usize {
        self.bin_count.max(1)
    }
}

/// Inter-arrival aggregates for one bin: number of deltas, their sum and the
/// sum of their squares.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterArrivalStats {
    pub count: u64,
    pub sum: f64,
    pub sum_squares: f64,
}

impl InterArrivalStats {
    pub fn push(&mut self, delta: f64) {
        self.count += 1;
        self.sum += delta;
        self.sum_squares += delta * delta;
    }

    /// Bounded dispersion index of the deltas: 0 regular, 1 clustered.
    ///
    /// `((σ-μ)/(σ+μ) + 1) / 2` clamped to `[0, 1]`, with fewer than two deltas
    /// or `σ+μ == 0` scoring 0.
    pub fn burstiness(&self) -> f64 {
        if self.count <= 1 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = (self.sum_squares / n - mean * mean).max(0.0);
        let std_dev = variance.sqrt();
        let denom = std_dev + mean;
        if denom == 0.0 || !denom.is_finite() {
            return 0.0;
        }
        (((std_dev - mean) / denom + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Output of a density pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityMaps {
    pub domain: TimeDomain,
    pub bin_count: usize,
    pub kernel_width: usize,
    /// Smoothed, max-normalized counts, one per bin.
    #[serde(rename = "densityMap")]
    pub density: Vec<f64>,
    /// Dispersion index per bin.
    #[serde(rename = "burstinessMap")]
    pub burstiness: Vec<f64>,
    /// `bin_count + 1` epoch boundaries; first is `domain.start`, last is `domain.end`.
    #[serde(rename = "warpMap")]
    pub warp: Vec<f64>,
}

/// Bin index of `t`, clamped to `[0, bin_count - 1]`.
pub fn bin_index(t: f64, domain: &TimeDomain, bin_count: usize) -> usize {
    let span = domain.span();
    let bin_count = bin_count.max(1);
    if span == 0.0 || !t.is_finite() {
        return 0;
    }
    let idx = ((t - domain.start) / span * bin_count as f64).floor();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(bin_count - 1)
    }
}

/// Raw event count per bin. A zero-span domain counts nothing.
pub fn bin_counts(timestamps: &[f64], domain: &TimeDomain, bin_count: usize) -> Vec<f64> {
    let bin_count = bin_count.max(1);
    let mut counts = vec![0.0; bin_count];
    if domain.is_degenerate() {
        return counts;
    }
    for &t in timestamps.iter().filter(|t| t.is_finite()) {
        counts[bin_index(t, domain, bin_count)] += 1.0;
    }
    counts
}

/// Centered moving average of half-width `kernel_width`.
///
/// The window is truncated at the edges and divided by the number of bins it
/// actually covers.
pub fn smooth_counts(counts: &[f64], kernel_width: usize) -> Vec<f64> {
    if kernel_width == 0 {
        return counts.to_vec();
    }
    let n = counts.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(kernel_width);
            let hi = i.saturating_add(kernel_width).min(n - 1);
            let window = &counts[lo..=hi];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Divide by the maximum so values land in `[0, 1]`. An all-zero input stays zero.
pub fn normalize_density(values: &[f64]) -> Vec<f64> {
    let max = max_or_zero(values);
    let max = if max > 0.0 { max } else { 1.0 };
    values.iter().map(|v| (v / max).clamp(0.0, 1.0)).collect()
}

/// Inter-arrival aggregates per bin.
///
/// `sorted` must be ascending. Each delta `t[i] - t[i-1]` is attributed to the
/// bin of `t[i]`.
pub fn inter_arrival_stats(
    sorted: &[f64],
    domain: &TimeDomain,
    bin_count: usize,
) -> Vec<InterArrivalStats> {
    let bin_count = bin_count.max(1);
    let mut stats = vec![InterArrivalStats::default(); bin_count];
    if domain.is_degenerate() {
        return stats;
    }
    for pair in sorted.windows(2) {
        let (prev, t) = (pair[0], pair[1]);
        if !prev.is_finite() || !t.is_finite() {
            continue;
        }
        stats[bin_index(t, domain, bin_count)].push(t - prev);
    }
    stats
}

pub fn burstiness_from_stats(stats: &[InterArrivalStats]) -> Vec<f64> {
    stats.iter().map(InterArrivalStats::burstiness).collect()
}

/// Warp weight per bin: `1 + density * 5`.
pub fn warp_weights(density: &[f64]) -> Vec<f64> {
    density
        .iter()
        .map(|d| 1.0 + d * DENSITY_WEIGHT_GAIN)
        .collect()
}

/// Cumulative weight fraction mapped back onto the domain.
///
/// Returns `weights.len() + 1` boundaries with the last one forced to
/// `domain.end`. A zero-span domain collapses every boundary onto `start`.
pub fn build_warp_map(weights: &[f64], domain: &TimeDomain) -> Vec<f64> {
    let span = domain.span();
    if span == 0.0 {
        return vec![domain.start; weights.len() + 1];
    }

    let total: f64 = weights.iter().sum();
    let total = if total > 0.0 { total } else { 1.0 };

    let mut warp = Vec::with_capacity(weights.len() + 1);
    let mut accumulated = 0.0;
    warp.push(domain.start);
    for w in weights {
        accumulated += w;
        warp.push((domain.start + accumulated / total * span).min(domain.end));
    }
    if let Some(last) = warp.last_mut() {
        *last = domain.end;
    }
    warp
}

/// Full density pass over raw timestamps. Input order does not matter.
pub fn build_density_maps(
    timestamps: &[f64],
    domain: TimeDomain,
    config: &DensityConfig,
) -> DensityMaps {
    let bin_count = config.effective_bin_count();
    let counts = bin_counts(timestamps, &domain, bin_count);

    let stats = if timestamps.windows(2).all(|w| w[0] <= w[1]) {
        inter_arrival_stats(timestamps, &domain, bin_count)
    } else {
        let mut sorted: Vec<f64> = timestamps.iter().copied().filter(|t| t.is_finite()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        inter_arrival_stats(&sorted, &domain, bin_count)
    };

    log::debug!(
        "density pass: {} timestamps, {} bins, kernel {}",
        timestamps.len(),
        bin_count,
        config.kernel_width
    );

    assemble(counts, &stats, domain, bin_count, config.kernel_width)
}

/// Density pass over aggregates supplied by an external engine.
///
/// Missing bins are treated as empty and surplus entries are ignored.
pub fn build_from_aggregates(
    counts: &[f64],
    inter_arrival: &[InterArrivalStats],
    domain: TimeDomain,
    config: &DensityConfig,
) -> DensityMaps {
    let bin_count = config.effective_bin_count();
    let mut counts: Vec<f64> = counts
        .iter()
        .map(|c| if c.is_finite() { c.max(0.0) } else { 0.0 })
        .take(bin_count)
        .collect();
    counts.resize(bin_count, 0.0);

    let mut stats: Vec<InterArrivalStats> = inter_arrival.iter().copied().take(bin_count).collect();
    stats.resize(bin_count, InterArrivalStats::default());

    if domain.is_degenerate() {
        counts.iter_mut().for_each(|c| *c = 0.0);
        stats.iter_mut().for_each(|s| *s = InterArrivalStats::default());
    }

    assemble(counts, &stats, domain, bin_count, config.kernel_width)
}

fn assemble(
    counts: Vec<f64>,
    stats: &[InterArrivalStats],
    domain: TimeDomain,
    bin_count: usize,
    kernel_width: usize,
) -> DensityMaps {
    let density = normalize_density(&smooth_counts(&counts, kernel_width));
    let burstiness = burstiness_from_stats(stats);
    let warp = build_warp_map(&warp_weights(&density), &domain);

    DensityMaps {
        domain,
        bin_count,
        kernel_width,
        density,
        burstiness,
        warp,
    }
}

#[cfg(test)]
#[path = "density_tests.rs"]
mod density_tests;
