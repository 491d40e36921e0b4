//! Burst windows: contiguous stretches of a density or burstiness map at or
//! above a percentile cutoff.

use serde::{Deserialize, Serialize};

use super::density::DensityMaps;
use crate::models::TimeDomain;

pub const DEFAULT_BURST_THRESHOLD: f64 = 0.7;
pub const MAX_BURST_WINDOWS: usize = 10;

/// Map the burst cutoff is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurstMetric {
    #[default]
    Density,
    Burstiness,
}

impl BurstMetric {
    pub fn select<'a>(&self, maps: &'a DensityMaps) -> &'a [f64] {
        match self {
            BurstMetric::Density => &maps.density,
            BurstMetric::Burstiness => &maps.burstiness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstWindow {
    /// `"<startIdx>-<endIdx>"`, or `"<startIdx>-end"` for a run reaching the last bin.
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub peak: f64,
}

/// Value at `floor(p * (n - 1))` of the sorted values; `p` is clamped to
/// `[0, 1]`. An empty input gives 1.
pub fn compute_percentile(values: &[f64], percentile: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return 1.0;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let p = if percentile.is_nan() { 0.0 } else { percentile.clamp(0.0, 1.0) };
    let index = ((p * (sorted.len() - 1) as f64).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Runs of `map` at or above `cutoff`, strongest first, at most ten.
pub fn extract_burst_windows(map: &[f64], domain: &TimeDomain, cutoff: f64) -> Vec<BurstWindow> {
    if map.is_empty() {
        return Vec::new();
    }

    let span = (domain.end - domain.start).max(0.0001);
    let step = span / (map.len().saturating_sub(1)).max(1) as f64;

    let mut windows = Vec::new();
    let mut run: Option<(usize, f64)> = None;

    for (i, &value) in map.iter().enumerate() {
        if value >= cutoff {
            let (start_idx, peak) = run.unwrap_or((i, 0.0));
            run = Some((start_idx, peak.max(value)));
        } else if let Some((start_idx, peak)) = run.take() {
            windows.push(BurstWindow {
                id: format!("{}-{}", start_idx, i),
                start: domain.start + start_idx as f64 * step,
                end: domain.start + i as f64 * step,
                peak,
            });
        }
    }

    if let Some((start_idx, peak)) = run {
        windows.push(BurstWindow {
            id: format!("{}-end", start_idx),
            start: domain.start + start_idx as f64 * step,
            end: domain.end,
            peak,
        });
    }

    windows.sort_by(|a, b| b.peak.total_cmp(&a.peak));
    windows.truncate(MAX_BURST_WINDOWS);
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_empty_is_one() {
        assert_eq!(compute_percentile(&[], 0.7), 1.0);
    }

    #[test]
    fn test_percentile_index() {
        let values = [0.9, 0.1, 0.5, 0.3, 0.7];
        assert_eq!(compute_percentile(&values, 0.0), 0.1);
        assert_eq!(compute_percentile(&values, 0.7), 0.5);
        assert_eq!(compute_percentile(&values, 1.0), 0.9);
        assert_eq!(compute_percentile(&values, 3.0), 0.9);
        assert_eq!(compute_percentile(&values, -1.0), 0.1);
    }

    #[test]
    fn test_extract_windows() {
        let map = [0.1, 0.8, 0.9, 0.2, 0.1, 0.75, 0.1, 0.1, 0.1, 0.95, 1.0];
        let domain = TimeDomain::new(0.0, 100.0);
        let windows = extract_burst_windows(&map, &domain, 0.7);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].id, "9-end");
        assert_eq!(windows[0].start, 90.0);
        assert_eq!(windows[0].end, 100.0);
        assert_eq!(windows[0].peak, 1.0);
        assert_eq!(windows[1].id, "1-3");
        assert_eq!(windows[1].start, 10.0);
        assert_eq!(windows[1].end, 30.0);
        assert_eq!(windows[2].peak, 0.75);
    }

    #[test]
    fn test_extract_windows_caps_at_ten() {
        let map: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
        let windows = extract_burst_windows(&map, &TimeDomain::new(0.0, 39.0), 0.5);
        assert_eq!(windows.len(), MAX_BURST_WINDOWS);
    }

    #[test]
    fn test_extract_windows_empty_map() {
        assert!(extract_burst_windows(&[], &TimeDomain::new(0.0, 1.0), 0.5).is_empty());
    }

    #[test]
    fn test_metric_wire_names() {
        assert_eq!(serde_json::to_string(&BurstMetric::Burstiness).unwrap(), "\"burstiness\"");
        assert_eq!(BurstMetric::default(), BurstMetric::Density);
    }
}
