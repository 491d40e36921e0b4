//! Pure analysis algorithms.
//!
//! Everything here is synchronous and side-effect free: inputs are plain
//! slices and value types, outputs are freshly built vectors or structs.
//! Empty or malformed inputs degrade to neutral results instead of errors.

pub mod adaptive_scale;
pub mod adjustment;
pub mod boundaries;
pub mod bursts;
pub mod confidence;
pub mod density;
pub mod stats;
pub mod warp;

pub use adaptive_scale::{adaptive_scale_config, compute_adaptive_y, AdaptiveScaleConfig};
pub use adjustment::{
    adaptive_interval_sec, adjust_boundary, build_grid_candidates, pick_nearest,
    resolve_neighbor_candidates, resolve_snap, resolve_snap_interval_sec, snap_tolerance_sec,
    AdjustmentRequest, MIN_SLICE_DURATION_SEC,
};
pub use boundaries::{detect_boundaries, detect_boundaries_in, BoundaryDetection, BoundaryOptions};
pub use bursts::{compute_percentile, extract_burst_windows, BurstMetric, BurstWindow};
pub use confidence::{
    calculate_confidence, score_breakdown, ConfidenceBreakdown, ConfidenceWeights, WeightOverrides,
};
pub use density::{
    build_density_maps, build_from_aggregates, DensityConfig, DensityMaps, InterArrivalStats,
};
pub use warp::{analyze_density, detect_events, generate_warp_profiles, DensityAnalysis};
