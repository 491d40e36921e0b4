//! Data Transfer Objects for the HTTP API.
//!
//! Domain types that already derive Serialize/Deserialize (suggestions,
//! adjustment requests and results, density maps) are used directly; the
//! types here only wrap them into request and response envelopes.

use serde::{Deserialize, Serialize};

use crate::algorithms::adaptive_scale::DEFAULT_SCALE_BINS;
use crate::algorithms::bursts::DEFAULT_BURST_THRESHOLD;
use crate::algorithms::{AdaptiveScaleConfig, BurstMetric, BurstWindow, WeightOverrides};
use crate::models::{CrimeRecord, SliceBoundary, SliceId, Suggestion, TimeDomain};
use crate::services::GenerationParams;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Repository status
    pub database: String,
}

// ==================== Records ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub records: Vec<CrimeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub accepted: usize,
    pub total: usize,
}

// ==================== Adaptive maps ====================

/// Query parameters for the global maps endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMapsQuery {
    #[serde(default)]
    pub bin_count: Option<f64>,
    #[serde(default)]
    pub kernel_width: Option<f64>,
}

/// Density maps over caller-supplied timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityMapsRequest {
    pub timestamps: Vec<f64>,
    /// Defaults to the range covered by `timestamps`.
    #[serde(default)]
    pub domain: Option<TimeDomain>,
    #[serde(default)]
    pub bin_count: Option<usize>,
    #[serde(default)]
    pub kernel_width: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveYRequest {
    pub timestamps: Vec<f64>,
    pub domain: TimeDomain,
    pub y_min: f64,
    pub y_max: f64,
    #[serde(default = "default_scale_bins")]
    pub bin_count: usize,
}

fn default_scale_bins() -> usize {
    DEFAULT_SCALE_BINS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveYResponse {
    pub y: Vec<f64>,
    pub scale: AdaptiveScaleConfig,
}

// ==================== Confidence ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceRequest {
    pub timestamps: Vec<f64>,
    pub range: TimeDomain,
    #[serde(default)]
    pub density_bins: Option<Vec<f64>>,
    #[serde(default)]
    pub weights: WeightOverrides,
}

// ==================== Suggestions ====================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Defaults to the full record range.
    #[serde(default)]
    pub range: Option<TimeDomain>,
    #[serde(default)]
    pub params: Option<GenerationParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionListResponse {
    pub suggestions: Vec<Suggestion>,
    pub total: usize,
    pub pending: usize,
}

impl SuggestionListResponse {
    pub fn new(suggestions: Vec<Suggestion>, pending: usize) -> Self {
        Self {
            total: suggestions.len(),
            suggestions,
            pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledResponse {
    pub message: String,
}

// ==================== Slices ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborsRequest {
    pub slices: Vec<SliceBoundary>,
    pub active_id: SliceId,
    pub domain: TimeDomain,
    pub fixed_boundary_sec: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborsResponse {
    pub candidates_sec: Vec<f64>,
}

// ==================== Bursts ====================

/// Burst windows over supplied timestamps, or over the global maps when
/// `timestamps` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurstsRequest {
    #[serde(default)]
    pub timestamps: Option<Vec<f64>>,
    #[serde(default)]
    pub domain: Option<TimeDomain>,
    #[serde(default)]
    pub metric: BurstMetric,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub bin_count: Option<usize>,
    #[serde(default)]
    pub kernel_width: Option<usize>,
}

fn default_threshold() -> f64 {
    DEFAULT_BURST_THRESHOLD
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurstsResponse {
    pub metric: BurstMetric,
    pub cutoff: f64,
    pub windows: Vec<BurstWindow>,
}
