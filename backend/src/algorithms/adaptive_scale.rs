//! Density-weighted output coordinate for timestamps.
//!
//! The output range `[y_min, y_max]` is split into one segment per time bin,
//! each sized proportionally to `1 + 5 * count / max_count`. Timestamps are
//! then placed by linear interpolation inside their bin's segment, so busy
//! periods are stretched and quiet ones compressed while order is preserved.

use serde::{Deserialize, Serialize};

use super::density::{bin_counts, normalize_density, warp_weights};
use crate::models::TimeDomain;

pub const DEFAULT_SCALE_BINS: usize = 100;

/// Piecewise-linear breakpoints: `domain[i]` (epoch seconds) maps to `range[i]`.
///
/// Both vectors hold `bin_count + 1` entries except for the degenerate cases,
/// which fall back to the two-point linear scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveScaleConfig {
    pub domain: Vec<f64>,
    pub range: Vec<f64>,
}

impl AdaptiveScaleConfig {
    fn linear(domain: &TimeDomain, y_min: f64, y_max: f64) -> Self {
        Self {
            domain: vec![domain.start, domain.end],
            range: vec![y_min, y_max],
        }
    }
}

/// Build the breakpoints of the adaptive scale.
pub fn adaptive_scale_config(
    timestamps: &[f64],
    domain: TimeDomain,
    y_min: f64,
    y_max: f64,
    bin_count: usize,
) -> AdaptiveScaleConfig {
    if timestamps.is_empty() || domain.is_degenerate() || !output_range_is_finite(y_min, y_max) {
        return AdaptiveScaleConfig::linear(&domain, y_min, y_max);
    }

    let bin_count = bin_count.max(1);
    let y_starts = bin_starts(timestamps, &domain, y_min, y_max, bin_count);
    let bin_size = domain.span() / bin_count as f64;

    let mut breakpoints: Vec<f64> = (0..bin_count)
        .map(|i| domain.start + i as f64 * bin_size)
        .collect();
    breakpoints.push(domain.end);

    AdaptiveScaleConfig {
        domain: breakpoints,
        range: y_starts,
    }
}

/// Map each timestamp to its adaptive output coordinate.
///
/// Output order matches input order. Non-decreasing input gives non-decreasing
/// output, and the domain endpoints map exactly to `y_min` / `y_max`. A
/// zero-span domain or a non-finite output range maps everything to `y_min`.
pub fn compute_adaptive_y(
    timestamps: &[f64],
    domain: TimeDomain,
    y_min: f64,
    y_max: f64,
    bin_count: usize,
) -> Vec<f64> {
    if timestamps.is_empty() {
        return Vec::new();
    }
    if domain.is_degenerate() || !output_range_is_finite(y_min, y_max) {
        return vec![y_min; timestamps.len()];
    }

    let bin_count = bin_count.max(1);
    let y_starts = bin_starts(timestamps, &domain, y_min, y_max, bin_count);
    let span = domain.span();

    timestamps
        .iter()
        .map(|&t| {
            let fractional = (t - domain.start) / span * bin_count as f64;
            if !fractional.is_finite() {
                return y_min;
            }
            let idx = fractional.floor();
            if idx < 0.0 {
                return y_starts[0];
            }
            if idx >= bin_count as f64 {
                return y_starts[bin_count];
            }
            let idx = idx as usize;
            let (lo, hi) = (y_starts[idx], y_starts[idx + 1]);
            let y = lo + (fractional - idx as f64) * (hi - lo);
            y.clamp(lo.min(hi), lo.max(hi))
        })
        .collect()
}

fn output_range_is_finite(y_min: f64, y_max: f64) -> bool {
    y_min.is_finite() && y_max.is_finite()
}

/// Cumulative segment starts; `bin_count + 1` entries ending exactly at `y_max`.
fn bin_starts(
    timestamps: &[f64],
    domain: &TimeDomain,
    y_min: f64,
    y_max: f64,
    bin_count: usize,
) -> Vec<f64> {
    let counts = bin_counts(timestamps, domain, bin_count);
    let weights = warp_weights(&normalize_density(&counts));
    let total: f64 = weights.iter().sum();
    let height = y_max - y_min;

    let mut starts = Vec::with_capacity(bin_count + 1);
    let mut current = y_min;
    for w in &weights {
        starts.push(current);
        current += w / total * height;
    }
    starts.push(y_max);
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: f64 = 3600.0;

    fn day() -> TimeDomain {
        // 2023-01-01T00:00:00Z .. 2023-01-02T00:00:00Z
        TimeDomain::new(1_672_531_200.0, 1_672_531_200.0 + 24.0 * HOUR)
    }

    #[test]
    fn test_empty_input_returns_empty() {
        assert!(compute_adaptive_y(&[], day(), 0.0, 100.0, 100).is_empty());
    }

    #[test]
    fn test_length_and_monotonic() {
        let d = day();
        let points = vec![d.start + HOUR, d.start + 2.0 * HOUR];
        let ys = compute_adaptive_y(&points, d, 0.0, 100.0, DEFAULT_SCALE_BINS);
        assert_eq!(ys.len(), 2);
        assert!(ys[1] >= ys[0]);
    }

    #[test]
    fn test_uniform_input_is_roughly_linear() {
        let d = day();
        let points: Vec<f64> = (0..24).map(|i| d.start + i as f64 * HOUR + 1.0).collect();
        let ys = compute_adaptive_y(&points, d, 0.0, 100.0, DEFAULT_SCALE_BINS);
        assert!(ys[12] > 40.0 && ys[12] < 60.0);
    }

    #[test]
    fn test_dense_region_is_expanded() {
        let d = day();
        let mut points: Vec<f64> = (0..50).map(|i| d.start + i as f64 * 60.0).collect();
        points.push(d.start + 20.0 * HOUR);
        let ys = compute_adaptive_y(&points, d, 0.0, 100.0, DEFAULT_SCALE_BINS);
        // A linear scale would place the last dense point near 3.4.
        assert!(ys[49] > 10.0);
    }

    #[test]
    fn test_domain_endpoints_are_exact() {
        let d = day();
        let points = vec![d.start, d.start + 5.0 * HOUR, d.end];
        let ys = compute_adaptive_y(&points, d, -20.0, 80.0, 37);
        assert_eq!(ys[0], -20.0);
        assert_eq!(ys[2], 80.0);
    }

    #[test]
    fn test_out_of_domain_points_clamp() {
        let d = day();
        let points = vec![d.start - HOUR, d.end + HOUR];
        let ys = compute_adaptive_y(&points, d, 0.0, 10.0, 10);
        assert_eq!(ys, vec![0.0, 10.0]);
    }

    #[test]
    fn test_zero_span_maps_to_y_min() {
        let d = TimeDomain::new(50.0, 50.0);
        assert_eq!(compute_adaptive_y(&[50.0, 60.0], d, 3.0, 9.0, 10), vec![3.0, 3.0]);
    }

    #[test]
    fn test_non_finite_output_range_maps_to_y_min() {
        let d = TimeDomain::new(0.0, 100.0);
        let ys = compute_adaptive_y(&[10.0, 50.0], d, f64::NAN, 100.0, 4);
        assert_eq!(ys.len(), 2);
        assert!(ys.iter().all(|y| y.is_nan()));

        assert_eq!(compute_adaptive_y(&[10.0, 50.0], d, 0.0, f64::NAN, 4), vec![0.0, 0.0]);
        assert_eq!(
            compute_adaptive_y(&[10.0], d, f64::NEG_INFINITY, 1.0, 4),
            vec![f64::NEG_INFINITY]
        );

        let config = adaptive_scale_config(&[10.0, 50.0], d, 0.0, f64::INFINITY, 4);
        assert_eq!(config.domain, vec![0.0, 100.0]);
        assert_eq!(config.range, vec![0.0, f64::INFINITY]);
    }

    #[test]
    fn test_scale_config_breakpoints() {
        let d = TimeDomain::new(0.0, 100.0);
        let config = adaptive_scale_config(&[10.0, 12.0, 80.0], d, 0.0, 1.0, 4);
        assert_eq!(config.domain, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(config.range.len(), 5);
        assert_eq!(config.range[0], 0.0);
        assert_eq!(config.range[4], 1.0);
        assert!(config.range.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_scale_config_degenerate_is_linear() {
        let d = TimeDomain::new(0.0, 100.0);
        let config = adaptive_scale_config(&[], d, 0.0, 1.0, 4);
        assert_eq!(config.domain, vec![0.0, 100.0]);
        assert_eq!(config.range, vec![0.0, 1.0]);
    }
}
