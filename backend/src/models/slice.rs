//! Timeline slices and the types exchanged with the boundary-adjustment engine.

use serde::{Deserialize, Serialize};

crate::define_id_type!(String, SliceId);

/// A time range marker on the timeline, in epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceBoundary {
    pub id: SliceId,
    pub start_sec: f64,
    pub end_sec: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_visible() -> bool {
    true
}

impl SliceBoundary {
    pub fn new(id: impl Into<String>, start_sec: f64, end_sec: f64) -> Self {
        Self {
            id: SliceId::new(id),
            start_sec,
            end_sec,
            visible: true,
            locked: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn duration_sec(&self) -> f64 {
        (self.end_sec - self.start_sec).max(0.0)
    }

    /// Boundary that stays put while `handle` is dragged.
    pub fn fixed_boundary_for(&self, handle: AdjustmentHandle) -> f64 {
        match handle {
            AdjustmentHandle::Start => self.end_sec,
            AdjustmentHandle::End => self.start_sec,
        }
    }
}

/// Which side of a slice is being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentHandle {
    Start,
    End,
}

/// Constraint that capped an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitCue {
    #[default]
    None,
    MinDuration,
    DomainStart,
    DomainEnd,
}

/// Where a settled boundary value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapSource {
    #[default]
    None,
    Grid,
    Neighbor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    #[default]
    Adaptive,
    Fixed,
}

/// A candidate value a boundary may snap onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapCandidate {
    pub value_sec: f64,
    pub source: SnapSource,
}

impl SnapCandidate {
    pub fn grid(value_sec: f64) -> Self {
        Self {
            value_sec,
            source: SnapSource::Grid,
        }
    }

    pub fn neighbor(value_sec: f64) -> Self {
        Self {
            value_sec,
            source: SnapSource::Neighbor,
        }
    }
}

/// Snapping configuration for one adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapConfig {
    pub enabled: bool,
    #[serde(default)]
    pub bypass: bool,
    #[serde(default)]
    pub mode: SnapMode,
    pub tolerance_sec: f64,
    #[serde(default)]
    pub grid_candidates_sec: Vec<f64>,
    #[serde(default)]
    pub neighbor_candidates_sec: Vec<f64>,
}

impl SnapConfig {
    pub fn new(tolerance_sec: f64) -> Self {
        Self {
            enabled: true,
            bypass: false,
            mode: SnapMode::Adaptive,
            tolerance_sec,
            grid_candidates_sec: Vec::new(),
            neighbor_candidates_sec: Vec::new(),
        }
    }

    pub fn with_grid(mut self, grid: Vec<f64>) -> Self {
        self.grid_candidates_sec = grid;
        self
    }

    pub fn with_neighbors(mut self, neighbors: Vec<f64>) -> Self {
        self.neighbor_candidates_sec = neighbors;
        self
    }

    pub fn bypassed(mut self) -> Self {
        self.bypass = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Outcome of a single boundary adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentResult {
    pub start_sec: f64,
    pub end_sec: f64,
    /// Start in `[0, 100]` relative to the domain.
    pub start_norm: f64,
    /// End in `[0, 100]` relative to the domain.
    pub end_norm: f64,
    /// Raw pointer after the initial domain clamp.
    pub raw_clamped_sec: f64,
    /// Value finally applied to the moving handle.
    pub applied_sec: f64,
    pub limit_cue: LimitCue,
    pub snap_source: SnapSource,
}

impl AdjustmentResult {
    pub fn duration_sec(&self) -> f64 {
        (self.end_sec - self.start_sec).max(0.0)
    }

    /// Value of the boundary that was moved.
    pub fn boundary_sec(&self, handle: AdjustmentHandle) -> f64 {
        match handle {
            AdjustmentHandle::Start => self.start_sec,
            AdjustmentHandle::End => self.end_sec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_defaults_from_json() {
        let slice: SliceBoundary =
            serde_json::from_str(r#"{"id": "s1", "startSec": 10, "endSec": 70}"#).unwrap();
        assert!(slice.visible);
        assert!(!slice.locked);
        assert_eq!(slice.duration_sec(), 60.0);
        assert_eq!(slice.id.value(), "s1");
    }

    #[test]
    fn test_fixed_boundary_for_handle() {
        let slice = SliceBoundary::new("a", 100.0, 400.0);
        assert_eq!(slice.fixed_boundary_for(AdjustmentHandle::Start), 400.0);
        assert_eq!(slice.fixed_boundary_for(AdjustmentHandle::End), 100.0);
    }

    #[test]
    fn test_limit_cue_wire_names() {
        assert_eq!(serde_json::to_string(&LimitCue::MinDuration).unwrap(), "\"minDuration\"");
        assert_eq!(serde_json::to_string(&LimitCue::DomainStart).unwrap(), "\"domainStart\"");
        assert_eq!(serde_json::to_string(&SnapSource::Neighbor).unwrap(), "\"neighbor\"");
    }
}
