//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! algorithms and service layer. CPU-bound passes run on the blocking pool.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::dto::{
    AdaptiveYRequest, AdaptiveYResponse, BurstsRequest, BurstsResponse, ConfidenceRequest,
    DensityMapsRequest, GenerateRequest, GlobalMapsQuery, HealthResponse, IngestRequest,
    IngestResponse, NeighborsRequest, NeighborsResponse, ScheduledResponse, SuggestionListResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::algorithms::{
    adaptive_scale_config, adjust_boundary, build_density_maps, compute_adaptive_y,
    compute_percentile, extract_burst_windows, resolve_neighbor_candidates, score_breakdown,
    AdjustmentRequest, ConfidenceBreakdown, DensityConfig, DensityMaps,
};
use crate::db::repository::AnalyticsRepository;
use crate::db::services as db_services;
use crate::models::{AdjustmentResult, Suggestion, SuggestionData, SuggestionId, TimeDomain};
use crate::services::adaptive_maps::{MAX_GLOBAL_BIN_COUNT, MAX_GLOBAL_KERNEL_WIDTH};
use crate::services::{GenerationParams, GlobalAdaptiveMaps};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Records
// =============================================================================

/// POST /v1/records
///
/// Ingest a batch of records. A batch with any non-finite timestamp is
/// rejected as a whole.
pub async fn ingest_records(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let repo = state.repository.as_ref();
    let accepted = db_services::store_records(repo, request.records).await?;
    let total = repo.record_count().await?;

    Ok((StatusCode::CREATED, Json(IngestResponse { accepted, total })))
}

/// GET /v1/records/meta
pub async fn records_meta(State(state): State<AppState>) -> HandlerResult<db_services::DatasetMeta> {
    let meta = db_services::dataset_meta(state.repository.as_ref()).await?;
    Ok(Json(meta))
}

// =============================================================================
// Adaptive Maps
// =============================================================================

/// GET /v1/adaptive/global?binCount&kernelWidth
///
/// Dataset-wide maps; bin count is clamped to 64..=4096 and kernel width to
/// 0..=25.
pub async fn global_maps(
    State(state): State<AppState>,
    Query(query): Query<GlobalMapsQuery>,
) -> HandlerResult<GlobalAdaptiveMaps> {
    let maps = state
        .adaptive_maps
        .global_maps(query.bin_count, query.kernel_width)
        .await?
        .ok_or_else(|| AppError::NotFound("No records loaded".to_string()))?;

    Ok(Json(maps.as_ref().clone()))
}

/// Density parameters for a caller-supplied pass, defaulting to the configured
/// ones. Oversized requests are rejected rather than clamped.
fn request_density_config(
    state: &AppState,
    bin_count: Option<usize>,
    kernel_width: Option<usize>,
) -> Result<DensityConfig, AppError> {
    let bin_count = bin_count.unwrap_or(state.config.density.bin_count);
    let kernel_width = kernel_width.unwrap_or(state.config.density.kernel_width);
    check_bin_count(bin_count)?;
    if kernel_width > MAX_GLOBAL_KERNEL_WIDTH {
        return Err(AppError::BadRequest(format!(
            "kernelWidth must be at most {}, got {}",
            MAX_GLOBAL_KERNEL_WIDTH, kernel_width
        )));
    }
    Ok(DensityConfig::new(bin_count, kernel_width))
}

fn check_bin_count(bin_count: usize) -> Result<(), AppError> {
    if bin_count > MAX_GLOBAL_BIN_COUNT {
        return Err(AppError::BadRequest(format!(
            "binCount must be at most {}, got {}",
            MAX_GLOBAL_BIN_COUNT, bin_count
        )));
    }
    Ok(())
}

/// POST /v1/adaptive/maps
pub async fn density_maps(
    State(state): State<AppState>,
    Json(request): Json<DensityMapsRequest>,
) -> HandlerResult<DensityMaps> {
    let domain = request
        .domain
        .or_else(|| TimeDomain::covering(&request.timestamps))
        .ok_or_else(|| AppError::BadRequest("domain is required without timestamps".to_string()))?;
    let config = request_density_config(&state, request.bin_count, request.kernel_width)?;

    let maps = tokio::task::spawn_blocking(move || {
        build_density_maps(&request.timestamps, domain, &config)
    })
    .await?;

    Ok(Json(maps))
}

/// POST /v1/adaptive/y
pub async fn adaptive_y(Json(request): Json<AdaptiveYRequest>) -> HandlerResult<AdaptiveYResponse> {
    check_bin_count(request.bin_count)?;
    let response = tokio::task::spawn_blocking(move || {
        let AdaptiveYRequest {
            timestamps,
            domain,
            y_min,
            y_max,
            bin_count,
        } = request;
        AdaptiveYResponse {
            y: compute_adaptive_y(&timestamps, domain, y_min, y_max, bin_count),
            scale: adaptive_scale_config(&timestamps, domain, y_min, y_max, bin_count),
        }
    })
    .await?;

    Ok(Json(response))
}

// =============================================================================
// Confidence
// =============================================================================

/// POST /v1/confidence
pub async fn confidence(
    State(state): State<AppState>,
    Json(request): Json<ConfidenceRequest>,
) -> HandlerResult<ConfidenceBreakdown> {
    let weights = state.config.suggestions.weights.with_overrides(&request.weights);

    let breakdown = tokio::task::spawn_blocking(move || {
        score_breakdown(
            &request.timestamps,
            &request.range,
            request.density_bins.as_deref(),
            &weights,
        )
    })
    .await?;

    Ok(Json(breakdown))
}

// =============================================================================
// Suggestions
// =============================================================================

async fn resolve_range(state: &AppState, range: Option<TimeDomain>) -> Result<Option<TimeDomain>, AppError> {
    match range {
        Some(range) => Ok(Some(range)),
        None => Ok(state.repository.time_bounds().await?),
    }
}

fn resolve_params(state: &AppState, params: Option<GenerationParams>) -> GenerationParams {
    params.unwrap_or_else(|| GenerationParams::from_settings(&state.config.suggestions))
}

/// POST /v1/suggestions/generate
///
/// Regenerate now; the new set replaces every stored suggestion.
pub async fn generate_suggestions(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> HandlerResult<SuggestionListResponse> {
    let params = resolve_params(&state, request.params);
    let Some(range) = resolve_range(&state, request.range).await? else {
        state.store().clear();
        return Ok(Json(SuggestionListResponse::new(Vec::new(), 0)));
    };

    let records = db_services::records_in_range(state.repository.as_ref(), Some(range)).await?;
    let generator = state.generator.clone();
    let suggestions =
        tokio::task::spawn_blocking(move || generator.run(&records, &range, &params)).await?;

    let pending = state.store().pending_count();
    Ok(Json(SuggestionListResponse::new(suggestions, pending)))
}

/// POST /v1/suggestions/schedule
///
/// Queue a debounced regeneration. Requests arriving within the quiet period
/// collapse into one run of the latest.
pub async fn schedule_suggestions(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<ScheduledResponse>), AppError> {
    let trigger = state
        .trigger
        .clone()
        .ok_or_else(|| AppError::Internal("Debounced generation is not running".to_string()))?;
    let params = resolve_params(&state, request.params);
    let range = resolve_range(&state, request.range)
        .await?
        .ok_or_else(|| AppError::BadRequest("No records loaded and no range given".to_string()))?;

    if !trigger.request(range, params) {
        return Err(AppError::Internal("Debounced generation has stopped".to_string()));
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(ScheduledResponse {
            message: format!(
                "Regeneration scheduled after {} ms of quiet",
                state.config.suggestions.debounce_ms
            ),
        }),
    ))
}

/// GET /v1/suggestions
pub async fn list_suggestions(State(state): State<AppState>) -> HandlerResult<SuggestionListResponse> {
    let store = state.store();
    Ok(Json(SuggestionListResponse::new(store.list(), store.pending_count())))
}

/// POST /v1/suggestions/{id}/accept
pub async fn accept_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Suggestion> {
    Ok(Json(state.store().accept(&SuggestionId::new(id))?))
}

/// POST /v1/suggestions/{id}/reject
pub async fn reject_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Suggestion> {
    Ok(Json(state.store().reject(&SuggestionId::new(id))?))
}

/// PUT /v1/suggestions/{id}
///
/// Replace the payload (same kind only) and mark the suggestion modified.
pub async fn modify_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<SuggestionData>,
) -> HandlerResult<Suggestion> {
    Ok(Json(state.store().modify(&SuggestionId::new(id), data)?))
}

// =============================================================================
// Slices
// =============================================================================

/// POST /v1/slices/adjust
pub async fn adjust_slice(Json(request): Json<AdjustmentRequest>) -> HandlerResult<AdjustmentResult> {
    Ok(Json(adjust_boundary(&request)))
}

/// POST /v1/slices/neighbors
pub async fn neighbor_candidates(Json(request): Json<NeighborsRequest>) -> HandlerResult<NeighborsResponse> {
    Ok(Json(NeighborsResponse {
        candidates_sec: resolve_neighbor_candidates(
            &request.slices,
            &request.active_id,
            &request.domain,
            request.fixed_boundary_sec,
        ),
    }))
}

// =============================================================================
// Bursts
// =============================================================================

/// POST /v1/bursts
pub async fn bursts(
    State(state): State<AppState>,
    Json(request): Json<BurstsRequest>,
) -> HandlerResult<BurstsResponse> {
    let metric = request.metric;
    let threshold = request.threshold;

    let maps = match request.timestamps {
        Some(timestamps) => {
            let domain = request
                .domain
                .or_else(|| TimeDomain::covering(&timestamps))
                .ok_or_else(|| AppError::BadRequest("domain is required without timestamps".to_string()))?;
            let config = request_density_config(&state, request.bin_count, request.kernel_width)?;
            tokio::task::spawn_blocking(move || build_density_maps(&timestamps, domain, &config)).await?
        }
        None => {
            let global = state
                .adaptive_maps
                .global_maps(
                    request.bin_count.map(|b| b as f64),
                    request.kernel_width.map(|k| k as f64),
                )
                .await?
                .ok_or_else(|| AppError::NotFound("No records loaded".to_string()))?;
            global.maps.clone()
        }
    };

    let values = metric.select(&maps);
    let cutoff = compute_percentile(values, threshold);
    let windows = extract_burst_windows(values, &maps.domain, cutoff);

    Ok(Json(BurstsResponse {
        metric,
        cutoff,
        windows,
    }))
}
