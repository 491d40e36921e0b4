//! Warp profile generation.
//!
//! The analyzed range is split into equal index ranges per profile and each
//! range gets a warp strength inversely related to its average density, so
//! sparse stretches are compressed harder than busy ones.

use serde::{Deserialize, Serialize};

use super::density::{bin_counts, normalize_density};
use super::stats::{compute_stats, round_to};
use crate::models::{TimeDomain, WarpEmphasis, WarpInterval, WarpProfile};

pub const DEFAULT_ANALYSIS_BINS: usize = 50;
pub const MIN_INTERVAL_COUNT: usize = 3;
pub const MAX_INTERVAL_COUNT: usize = 12;

/// One bin of a density analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityBin {
    pub epoch_start: f64,
    pub epoch_end: f64,
    pub count: f64,
    /// Count divided by the largest count, in `[0, 1]`.
    pub density: f64,
}

impl DensityBin {
    pub fn midpoint(&self) -> f64 {
        (self.epoch_start + self.epoch_end) / 2.0
    }
}

/// Binned view of a record population over a range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityAnalysis {
    pub bins: Vec<DensityBin>,
    pub total_records: usize,
    /// Midpoints of the densest 10% of bins.
    pub peak_epochs: Vec<f64>,
    /// Midpoints of the sparsest 10% of bins.
    pub low_epochs: Vec<f64>,
}

impl DensityAnalysis {
    pub fn densities(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.density).collect()
    }
}

/// Bin `timestamps` over `range` with raw (unsmoothed) normalized counts.
pub fn analyze_density(timestamps: &[f64], range: &TimeDomain, bin_count: usize) -> DensityAnalysis {
    if timestamps.is_empty() || bin_count == 0 || range.is_degenerate() {
        return DensityAnalysis {
            total_records: timestamps.len(),
            ..Default::default()
        };
    }

    let counts = bin_counts(timestamps, range, bin_count);
    let density = normalize_density(&counts);
    let bin_size = range.span() / bin_count as f64;

    let bins: Vec<DensityBin> = counts
        .iter()
        .zip(&density)
        .enumerate()
        .map(|(i, (&count, &density))| DensityBin {
            epoch_start: range.start + i as f64 * bin_size,
            epoch_end: range.start + (i + 1) as f64 * bin_size,
            count,
            density,
        })
        .collect();

    let tail = (bin_count / 10).max(1);
    let mut by_density: Vec<&DensityBin> = bins.iter().collect();
    by_density.sort_by(|a, b| b.density.total_cmp(&a.density));
    let peak_epochs = by_density.iter().take(tail).map(|b| b.midpoint()).collect();
    let low_epochs = by_density
        .iter()
        .skip(by_density.len().saturating_sub(tail))
        .map(|b| b.midpoint())
        .collect();

    DensityAnalysis {
        bins,
        total_records: timestamps.len(),
        peak_epochs,
        low_epochs,
    }
}

/// Midpoints of bins where the density level shifts by more than 1.5σ between
/// adjacent windows of `max(2, n / 10)` bins.
///
/// Nearly flat series (σ < 0.05) have no events. Events closer than 5% of the
/// analyzed range to an earlier one are dropped.
pub fn detect_events(bins: &[DensityBin]) -> Vec<f64> {
    let n = bins.len();
    if n < 3 {
        return Vec::new();
    }

    let densities: Vec<f64> = bins.iter().map(|b| b.density).collect();
    let stats = compute_stats(&densities);
    if stats.std_dev < 0.05 {
        return Vec::new();
    }

    let threshold = 1.5 * stats.std_dev;
    let window = (n / 10).max(2);
    let range = bins[n - 1].epoch_end - bins[0].epoch_start;

    let mut events: Vec<f64> = Vec::new();
    for i in window..n.saturating_sub(window) {
        let left = densities[i - window..i].iter().sum::<f64>() / window as f64;
        let right = densities[i..i + window].iter().sum::<f64>() / window as f64;
        if (right - left).abs() > threshold {
            let epoch = bins[i].midpoint();
            if !events.iter().any(|e| (e - epoch).abs() < range * 0.05) {
                events.push(epoch);
            }
        }
    }
    events
}

/// Split `density` into `interval_count` equal index ranges and assign each a
/// strength in `[min_strength, max_strength]`, higher for sparser ranges.
pub fn generate_intervals(
    density: &[f64],
    interval_count: usize,
    (min_strength, max_strength): (f64, f64),
) -> Vec<WarpInterval> {
    let n = density.len();
    if n == 0 || interval_count == 0 {
        return Vec::new();
    }

    let step = n as f64 / interval_count as f64;
    (0..interval_count)
        .map(|i| {
            let start_idx = (i as f64 * step).floor() as usize;
            let end_idx = (((i + 1) as f64 * step).floor() as usize).min(n);
            let slice = &density[start_idx..end_idx.max(start_idx)];
            let avg = if slice.is_empty() {
                0.0
            } else {
                slice.iter().sum::<f64>() / slice.len() as f64
            };
            let strength = min_strength + (1.0 - avg) * (max_strength - min_strength);

            WarpInterval {
                start_percent: start_idx as f64 / n as f64 * 100.0,
                end_percent: (end_idx as f64 / n as f64).min(1.0) * 100.0,
                strength: round_to(strength, 2),
            }
        })
        .collect()
}

/// Clamp a requested interval count into the supported range.
pub fn clamp_interval_count(target: usize) -> usize {
    target.clamp(MIN_INTERVAL_COUNT, MAX_INTERVAL_COUNT)
}

/// Build up to three warp profiles (aggressive, balanced, conservative, in that
/// order) from shared density bins and a shared base confidence.
pub fn generate_warp_profiles(
    density: &[f64],
    base_confidence: u8,
    target_intervals: usize,
    profile_count: usize,
) -> Vec<WarpProfile> {
    if density.is_empty() {
        return Vec::new();
    }

    let target = clamp_interval_count(target_intervals);

    WarpEmphasis::ALL
        .iter()
        .take(profile_count.min(WarpEmphasis::ALL.len()))
        .map(|&emphasis| {
            let intervals =
                generate_intervals(density, emphasis.interval_count(target), emphasis.strength_range());
            let confidence =
                (base_confidence as f64 * emphasis.confidence_multiplier()).round().min(100.0) as u8;

            WarpProfile {
                name: emphasis.display_name().to_string(),
                intervals,
                confidence,
                emphasis,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_density_bins_and_extremes() {
        let range = TimeDomain::new(0.0, 100.0);
        let mut timestamps = vec![5.0; 8];
        timestamps.extend([15.0, 95.0]);

        let analysis = analyze_density(&timestamps, &range, 10);

        assert_eq!(analysis.bins.len(), 10);
        assert_eq!(analysis.total_records, 10);
        assert_eq!(analysis.bins[0].count, 8.0);
        assert_eq!(analysis.bins[0].density, 1.0);
        assert_eq!(analysis.bins[1].density, 0.125);
        assert_eq!(analysis.peak_epochs, vec![5.0]);
        assert_eq!(analysis.low_epochs.len(), 1);
    }

    #[test]
    fn test_analyze_density_degenerate() {
        let analysis = analyze_density(&[3.0, 3.0], &TimeDomain::new(3.0, 3.0), 10);
        assert!(analysis.bins.is_empty());
        assert_eq!(analysis.total_records, 2);
    }

    #[test]
    fn test_detect_events_step() {
        let range = TimeDomain::new(0.0, 200.0);
        let mut timestamps: Vec<f64> = (0..20).map(|i| i as f64 * 5.0 + 0.5).collect();
        timestamps.extend((0..200).map(|i| 100.0 + i as f64 * 0.5));
        let analysis = analyze_density(&timestamps, &range, 20);

        let events = detect_events(&analysis.bins);
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| (80.0..=120.0).contains(e)));
    }

    #[test]
    fn test_detect_events_flat_has_none() {
        let range = TimeDomain::new(0.0, 100.0);
        let timestamps: Vec<f64> = (0..100).map(|i| i as f64 + 0.5).collect();
        let analysis = analyze_density(&timestamps, &range, 10);
        assert!(detect_events(&analysis.bins).is_empty());
    }

    #[test]
    fn test_generate_intervals_strength_inverse_to_density() {
        let density = vec![1.0, 1.0, 0.0, 0.0];
        let intervals = generate_intervals(&density, 2, (0.5, 2.0));

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].strength, 0.5);
        assert_eq!(intervals[1].strength, 2.0);
        assert_eq!(intervals[0].start_percent, 0.0);
        assert_eq!(intervals[0].end_percent, 50.0);
        assert_eq!(intervals[1].end_percent, 100.0);
    }

    #[test]
    fn test_generate_intervals_more_intervals_than_bins() {
        let intervals = generate_intervals(&[0.5, 0.5], 3, (0.7, 1.5));
        assert_eq!(intervals.len(), 3);
        // floor(0 * 2/3) .. floor(2/3) is empty and scores as zero density.
        assert_eq!(intervals[0].strength, 1.5);
        assert_eq!(intervals[2].end_percent, 100.0);
    }

    #[test]
    fn test_generate_warp_profiles_variants() {
        let density: Vec<f64> = (0..50).map(|i| (i % 5) as f64 / 4.0).collect();
        let profiles = generate_warp_profiles(&density, 80, 5, 3);

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].emphasis, WarpEmphasis::Aggressive);
        assert_eq!(profiles[0].name, "High Density Focus");
        assert_eq!(profiles[0].intervals.len(), 7);
        assert_eq!(profiles[0].confidence, 72);
        assert_eq!(profiles[1].intervals.len(), 5);
        assert_eq!(profiles[1].confidence, 80);
        assert_eq!(profiles[2].intervals.len(), 3);
        assert_eq!(profiles[2].confidence, 88);

        for profile in &profiles {
            let (lo, hi) = profile.emphasis.strength_range();
            assert!(profile.intervals.iter().all(|iv| iv.strength >= lo && iv.strength <= hi));
        }
    }

    #[test]
    fn test_generate_warp_profiles_confidence_capped() {
        let profiles = generate_warp_profiles(&[0.2, 0.9, 0.4], 95, 4, 3);
        assert_eq!(profiles[2].confidence, 100);
    }

    #[test]
    fn test_generate_warp_profiles_count_and_target_clamp() {
        let density = vec![0.5; 20];
        assert_eq!(generate_warp_profiles(&density, 50, 5, 1).len(), 1);
        assert_eq!(generate_warp_profiles(&density, 50, 5, 9).len(), 3);
        assert!(generate_warp_profiles(&density, 50, 5, 0).is_empty());

        let clamped = generate_warp_profiles(&density, 50, 40, 2);
        assert_eq!(clamped[0].intervals.len(), 12);
        assert_eq!(clamped[1].intervals.len(), 12);
    }
}
