//! Interval boundary detection over normalized density bins.
//!
//! Three detectors produce bin indices:
//!
//! | method         | rule                                                         | cap (low/medium/high) |
//! |----------------|--------------------------------------------------------------|-----------------------|
//! | `peak`         | strict local maximum at or above a mean + k·σ threshold      | 3 / 6 / 10            |
//! | `change-point` | sliding-window mean shift larger than σ × {2.0, 1.5, 1.0}    | 3 / 5 / 8             |
//! | `rule-based`   | equal-time split into `boundary_count` intervals             | -                     |
//!
//! Indices become epochs at bin centres, are optionally snapped to a calendar
//! unit, topped up with rule-based boundaries when fewer than two survive, and
//! finally sorted with near-duplicates (closer than 5% of the range) removed.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Timelike};

use super::stats::compute_stats;
use crate::models::{BoundaryMetadata, BoundaryMethod, Sensitivity, SnapUnit, TimeDomain};

/// Minimum spacing between two boundaries, as a fraction of the range.
pub const MIN_BOUNDARY_GAP_FRACTION: f64 = 0.05;

pub const DEFAULT_BOUNDARY_COUNT: usize = 5;

/// Options of a boundary detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryOptions {
    pub method: BoundaryMethod,
    pub sensitivity: Sensitivity,
    pub snap_to_unit: SnapUnit,
    /// Target boundary count for the rule-based method and the fallback.
    pub boundary_count: usize,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            method: BoundaryMethod::Peak,
            sensitivity: Sensitivity::Medium,
            snap_to_unit: SnapUnit::None,
            boundary_count: DEFAULT_BOUNDARY_COUNT,
        }
    }
}

/// Boundaries found by [`detect_boundaries`], ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryDetection {
    pub boundaries: Vec<f64>,
    pub metadata: BoundaryMetadata,
}

/// Indices of strict local maxima at or above the sensitivity threshold.
///
/// The first and last bins never qualify. Fewer than three bins gives none.
pub fn detect_peaks(density: &[f64], sensitivity: Sensitivity) -> Vec<usize> {
    let n = density.len();
    if n < 3 {
        return Vec::new();
    }

    let stats = compute_stats(density);
    let threshold = match sensitivity {
        Sensitivity::Low => stats.mean + stats.std_dev,
        Sensitivity::Medium => stats.mean + stats.std_dev * 0.5,
        Sensitivity::High => stats.mean,
    };
    let cap = match sensitivity {
        Sensitivity::Low => 3,
        Sensitivity::Medium => 6,
        Sensitivity::High => 10,
    };

    (1..n - 1)
        .filter(|&i| {
            density[i] > density[i - 1] && density[i] > density[i + 1] && density[i] >= threshold
        })
        .take(cap)
        .collect()
}

/// Indices where the mean of the following window departs from the mean of
/// the preceding window by more than a multiple of σ.
///
/// Window width is `max(2, n / 8)`; a candidate closer than half a window to
/// an accepted one is dropped. Fewer than five bins gives none.
pub fn detect_change_points(density: &[f64], sensitivity: Sensitivity) -> Vec<usize> {
    let n = density.len();
    if n < 5 {
        return Vec::new();
    }

    let window = (n / 8).max(2);
    let stats = compute_stats(density);
    let threshold = stats.std_dev
        * match sensitivity {
            Sensitivity::Low => 2.0,
            Sensitivity::Medium => 1.5,
            Sensitivity::High => 1.0,
        };
    let cap = match sensitivity {
        Sensitivity::Low => 3,
        Sensitivity::Medium => 5,
        Sensitivity::High => 8,
    };

    let mut points: Vec<usize> = Vec::new();
    for i in window..n.saturating_sub(window) {
        let left: f64 = density[i - window..i].iter().sum::<f64>() / window as f64;
        let right: f64 = density[i..i + window].iter().sum::<f64>() / window as f64;

        if (right - left).abs() > threshold {
            let too_close = points
                .iter()
                .any(|&p| ((p as f64) - (i as f64)).abs() < window as f64 / 2.0);
            if !too_close {
                points.push(i);
            }
        }
    }

    points.truncate(cap);
    points
}

/// Equal-time split of `n` bins into `boundary_count` intervals.
pub fn apply_rule_based(bin_count: usize, boundary_count: usize) -> Vec<usize> {
    if bin_count < 2 || boundary_count < 2 {
        return Vec::new();
    }

    let step = bin_count as f64 / boundary_count as f64;
    (1..boundary_count)
        .map(|i| (i as f64 * step).floor() as usize)
        .filter(|&idx| idx > 0 && idx < bin_count)
        .collect()
}

/// Epoch at the centre of each bin.
pub fn indices_to_epochs(indices: &[usize], range: &TimeDomain, bin_count: usize) -> Vec<f64> {
    let bin_size = range.span() / bin_count.max(1) as f64;
    indices
        .iter()
        .map(|&i| range.start + (i as f64 + 0.5) * bin_size)
        .collect()
}

/// Snap an epoch in the local time zone. See [`snap_to_unit_in`].
pub fn snap_to_unit(epoch: f64, unit: SnapUnit) -> f64 {
    snap_to_unit_in(epoch, unit, &Local)
}

/// Snap an epoch to a calendar unit in `tz`.
///
/// `Hour` rounds to the nearest hour (add 30 minutes, then truncate to `:00`).
/// `Day` moves to noon of the same calendar day. The result is whole seconds;
/// values chrono cannot represent are returned unchanged.
pub fn snap_to_unit_in<Tz: TimeZone>(epoch: f64, unit: SnapUnit, tz: &Tz) -> f64 {
    if unit == SnapUnit::None || !epoch.is_finite() {
        return epoch;
    }
    let Some(utc) = DateTime::from_timestamp_millis((epoch * 1000.0).floor() as i64) else {
        return epoch;
    };
    let local = utc.with_timezone(tz);

    let snapped = match unit {
        SnapUnit::Hour => (local + Duration::minutes(30))
            .with_minute(0)
            .and_then(|d| d.with_second(0))
            .and_then(|d| d.with_nanosecond(0)),
        SnapUnit::Day => {
            let noon = local.date_naive().and_time(NaiveTime::MIN) + Duration::hours(12);
            tz.from_local_datetime(&noon).earliest()
        }
        SnapUnit::None => Some(local),
    };

    snapped.map(|d| d.timestamp() as f64).unwrap_or(epoch)
}

/// Sort ascending and drop any value closer than `min_gap` to the previous kept one.
pub fn dedupe_sorted(mut values: Vec<f64>, min_gap: f64) -> Vec<f64> {
    values.retain(|v| v.is_finite());
    values.sort_by(|a, b| a.total_cmp(b));

    let mut unique: Vec<f64> = Vec::with_capacity(values.len());
    for v in values {
        match unique.last() {
            Some(&last) if v - last < min_gap => {}
            _ => unique.push(v),
        }
    }
    unique
}

/// Detect boundaries using the local time zone for snapping.
pub fn detect_boundaries(
    density: &[f64],
    range: &TimeDomain,
    options: &BoundaryOptions,
) -> BoundaryDetection {
    detect_boundaries_in(density, range, options, &Local)
}

/// Detect boundaries over normalized density bins covering `range`.
pub fn detect_boundaries_in<Tz: TimeZone>(
    density: &[f64],
    range: &TimeDomain,
    options: &BoundaryOptions,
    tz: &Tz,
) -> BoundaryDetection {
    if density.is_empty() || range.is_degenerate() {
        return BoundaryDetection::default();
    }

    let n = density.len();
    let mut metadata = BoundaryMetadata::default();

    let indices = match options.method {
        BoundaryMethod::Peak => detect_peaks(density, options.sensitivity),
        BoundaryMethod::ChangePoint => detect_change_points(density, options.sensitivity),
        BoundaryMethod::RuleBased => apply_rule_based(n, options.boundary_count),
    };
    let epochs = indices_to_epochs(&indices, range, n);

    match options.method {
        BoundaryMethod::Peak => metadata.peaks = Some(epochs.clone()),
        BoundaryMethod::ChangePoint => metadata.change_points = Some(epochs.clone()),
        BoundaryMethod::RuleBased => metadata.rule_based_boundaries = Some(epochs.clone()),
    }

    let mut boundaries: Vec<f64> = epochs
        .into_iter()
        .map(|e| snap_to_unit_in(e, options.snap_to_unit, tz))
        .collect();

    if boundaries.len() < 2 && options.method != BoundaryMethod::RuleBased {
        let fallback = apply_rule_based(n, options.boundary_count.max(3));
        log::debug!(
            "{} detection found {} boundaries; adding {} rule-based",
            options.method,
            boundaries.len(),
            fallback.len()
        );
        boundaries.extend(indices_to_epochs(&fallback, range, n));
    }

    BoundaryDetection {
        boundaries: dedupe_sorted(boundaries, range.span() * MIN_BOUNDARY_GAP_FRACTION),
        metadata,
    }
}

#[cfg(test)]
#[path = "boundaries_tests.rs"]
mod boundaries_tests;
