//! Boundary adjustment for timeline slices.
//!
//! [`adjust_boundary`] is a pure function: the pointer is clamped to the
//! domain, optionally snapped onto a grid or neighbor candidate, and then the
//! minimum-duration and domain hard stops are applied in that order. The
//! result reports which constraint (if any) capped the move and where the
//! settled value came from.

use serde::{Deserialize, Serialize};

use crate::models::{
    sec_to_normalized, AdjustmentHandle, AdjustmentResult, LimitCue, SliceBoundary, SliceId,
    SnapCandidate, SnapConfig, SnapMode, SnapSource, TimeDomain,
};

pub const MIN_SLICE_DURATION_SEC: f64 = 60.0;

/// Steps on either side of the nearest grid step offered as candidates.
pub const GRID_CANDIDATE_RADIUS: i64 = 4;

const SNAP_TOLERANCE_FRACTION: f64 = 0.35;

const HOUR_SEC: f64 = 3600.0;
const DAY_SEC: f64 = 86_400.0;

/// One adjustment step of a dragged handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub handle: AdjustmentHandle,
    pub raw_pointer_sec: f64,
    pub fixed_boundary_sec: f64,
    pub domain_start_sec: f64,
    pub domain_end_sec: f64,
    #[serde(default = "default_min_duration")]
    pub min_duration_sec: f64,
    #[serde(default)]
    pub snap: Option<SnapConfig>,
}

fn default_min_duration() -> f64 {
    MIN_SLICE_DURATION_SEC
}

impl AdjustmentRequest {
    pub fn new(
        handle: AdjustmentHandle,
        raw_pointer_sec: f64,
        fixed_boundary_sec: f64,
        domain: TimeDomain,
    ) -> Self {
        Self {
            handle,
            raw_pointer_sec,
            fixed_boundary_sec,
            domain_start_sec: domain.start,
            domain_end_sec: domain.end,
            min_duration_sec: MIN_SLICE_DURATION_SEC,
            snap: None,
        }
    }

    pub fn with_min_duration(mut self, min_duration_sec: f64) -> Self {
        self.min_duration_sec = min_duration_sec;
        self
    }

    pub fn with_snap(mut self, snap: SnapConfig) -> Self {
        self.snap = Some(snap);
        self
    }

    /// Domain with its bounds ordered.
    pub fn domain(&self) -> TimeDomain {
        TimeDomain::ordered(self.domain_start_sec, self.domain_end_sec)
    }
}

/// Nearest candidate within `tolerance_sec` of `raw_sec`.
///
/// Equal distances prefer a neighbor over a grid candidate, then the lower
/// value. A negative tolerance never matches.
pub fn pick_nearest(
    raw_sec: f64,
    candidates: &[SnapCandidate],
    tolerance_sec: f64,
) -> Option<SnapCandidate> {
    if tolerance_sec < 0.0 {
        return None;
    }

    let rank = |source: SnapSource| match source {
        SnapSource::Neighbor => 0,
        _ => 1,
    };

    let winner = candidates
        .iter()
        .filter(|c| c.value_sec.is_finite())
        .min_by(|a, b| {
            let da = (a.value_sec - raw_sec).abs();
            let db = (b.value_sec - raw_sec).abs();
            da.total_cmp(&db)
                .then_with(|| rank(a.source).cmp(&rank(b.source)))
                .then_with(|| a.value_sec.total_cmp(&b.value_sec))
        })?;

    if (winner.value_sec - raw_sec).abs() > tolerance_sec {
        return None;
    }
    Some(*winner)
}

/// Snap `raw_sec` according to `snap`; returns the settled value and its source.
pub fn resolve_snap(raw_sec: f64, snap: Option<&SnapConfig>) -> (f64, SnapSource) {
    let Some(snap) = snap.filter(|s| s.enabled && !s.bypass) else {
        return (raw_sec, SnapSource::None);
    };

    let candidates: Vec<SnapCandidate> = snap
        .grid_candidates_sec
        .iter()
        .map(|&v| SnapCandidate::grid(v))
        .chain(snap.neighbor_candidates_sec.iter().map(|&v| SnapCandidate::neighbor(v)))
        .collect();

    match pick_nearest(raw_sec, &candidates, snap.tolerance_sec) {
        Some(winner) => (winner.value_sec, winner.source),
        None => (raw_sec, SnapSource::None),
    }
}

/// Move one handle of a slice and report the settled boundaries.
pub fn adjust_boundary(request: &AdjustmentRequest) -> AdjustmentResult {
    let domain = request.domain();
    let min_duration = request.min_duration_sec.max(0.0);
    let fixed = request.fixed_boundary_sec;

    let raw_clamped = domain.clamp(request.raw_pointer_sec);
    let (snapped, snap_source) = resolve_snap(raw_clamped, request.snap.as_ref());
    let snapped = domain.clamp(snapped);

    let mut limit_cue = LimitCue::None;
    let (start_sec, end_sec, applied_sec) = match request.handle {
        AdjustmentHandle::Start => {
            let mut start = snapped;
            let max_start = fixed - min_duration;
            if start > max_start {
                start = max_start;
                limit_cue = LimitCue::MinDuration;
            }
            if start < domain.start {
                start = domain.start;
                limit_cue = LimitCue::DomainStart;
            } else if limit_cue == LimitCue::None && request.raw_pointer_sec < domain.start {
                limit_cue = LimitCue::DomainStart;
            }
            (start, fixed, start)
        }
        AdjustmentHandle::End => {
            let mut end = snapped;
            let min_end = fixed + min_duration;
            if end < min_end {
                end = min_end;
                limit_cue = LimitCue::MinDuration;
            }
            if end > domain.end {
                end = domain.end;
                limit_cue = LimitCue::DomainEnd;
            } else if limit_cue == LimitCue::None && request.raw_pointer_sec > domain.end {
                limit_cue = LimitCue::DomainEnd;
            }
            (fixed, end, end)
        }
    };

    AdjustmentResult {
        start_sec,
        end_sec,
        start_norm: sec_to_normalized(start_sec, domain.start, domain.end),
        end_norm: sec_to_normalized(end_sec, domain.start, domain.end),
        raw_clamped_sec: raw_clamped,
        applied_sec,
        limit_cue,
        snap_source: if limit_cue == LimitCue::None {
            snap_source
        } else {
            SnapSource::None
        },
    }
}

/// Values a handle of `active` may snap onto: both domain extremes and the
/// start/end of every other visible slice, ascending and deduplicated, with
/// the fixed boundary removed.
pub fn resolve_neighbor_candidates(
    slices: &[SliceBoundary],
    active: &SliceId,
    domain: &TimeDomain,
    fixed_boundary_sec: f64,
) -> Vec<f64> {
    let domain = TimeDomain::ordered(domain.start, domain.end);
    let mut candidates = vec![domain.start, domain.end];
    for slice in slices {
        if &slice.id == active || !slice.visible {
            continue;
        }
        candidates.push(slice.start_sec);
        candidates.push(slice.end_sec);
    }

    candidates.retain(|v| v.is_finite() && *v != fixed_boundary_sec);
    candidates.sort_by(|a, b| a.total_cmp(b));
    candidates.dedup();
    candidates
}

/// Grid interval suited to the width of `domain`.
pub fn adaptive_interval_sec(domain: &TimeDomain) -> f64 {
    let span = TimeDomain::ordered(domain.start, domain.end).span();
    if span <= 2.0 * HOUR_SEC {
        60.0
    } else if span <= 12.0 * HOUR_SEC {
        300.0
    } else if span <= 48.0 * HOUR_SEC {
        900.0
    } else if span <= 14.0 * DAY_SEC {
        HOUR_SEC
    } else {
        DAY_SEC
    }
}

/// A positive preset wins in fixed mode; everything else falls back to the
/// adaptive interval.
pub fn resolve_snap_interval_sec(mode: SnapMode, fixed_preset_sec: Option<f64>, domain: &TimeDomain) -> f64 {
    match (mode, fixed_preset_sec) {
        (SnapMode::Fixed, Some(preset)) if preset.is_finite() && preset > 0.0 => preset,
        _ => adaptive_interval_sec(domain),
    }
}

/// Grid steps anchored at the domain start around `raw_sec`, inside the domain.
pub fn build_grid_candidates(raw_sec: f64, interval_sec: f64, domain: &TimeDomain) -> Vec<f64> {
    let domain = TimeDomain::ordered(domain.start, domain.end);
    if interval_sec.is_nan() || interval_sec <= 0.0 || !raw_sec.is_finite() || domain.is_degenerate() {
        return Vec::new();
    }

    let nearest = ((raw_sec - domain.start) / interval_sec).round() as i64;
    (nearest - GRID_CANDIDATE_RADIUS..=nearest + GRID_CANDIDATE_RADIUS)
        .map(|k| domain.start + k as f64 * interval_sec)
        .filter(|v| domain.contains(*v))
        .collect()
}

/// Snap tolerance for a grid interval, never below one second.
pub fn snap_tolerance_sec(interval_sec: f64) -> f64 {
    (interval_sec * SNAP_TOLERANCE_FRACTION).max(1.0)
}

#[cfg(test)]
#[path = "adjustment_tests.rs"]
mod adjustment_tests;
