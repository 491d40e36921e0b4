//! Repository-agnostic data operations.
//!
//! These functions work with any [`AnalyticsRepository`] and hold the small
//! amount of orchestration shared by the HTTP layer and the services: turning
//! aggregates into density maps and describing the stored dataset.

use serde::{Deserialize, Serialize};

use super::repository::{AnalyticsRepository, RepositoryResult};
use crate::algorithms::{build_from_aggregates, DensityConfig, DensityMaps};
use crate::models::{CrimeRecord, TimeDomain};

// ==================== Health & Metadata ====================

pub async fn health_check<R: AnalyticsRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Summary of the stored dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMeta {
    pub record_count: usize,
    pub min_timestamp_sec: Option<f64>,
    pub max_timestamp_sec: Option<f64>,
    pub checksum: String,
}

pub async fn dataset_meta<R: AnalyticsRepository + ?Sized>(repo: &R) -> RepositoryResult<DatasetMeta> {
    let bounds = repo.time_bounds().await?;
    Ok(DatasetMeta {
        record_count: repo.record_count().await?,
        min_timestamp_sec: bounds.map(|b| b.start),
        max_timestamp_sec: bounds.map(|b| b.end),
        checksum: repo.dataset_checksum().await?,
    })
}

// ==================== Records ====================

pub async fn store_records<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    records: Vec<CrimeRecord>,
) -> RepositoryResult<usize> {
    if records.is_empty() {
        log::warn!("ingest called with an empty batch");
        return Ok(0);
    }
    repo.ingest(records).await
}

/// Records inside `range`, or every record when `range` is `None`.
pub async fn records_in_range<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    range: Option<TimeDomain>,
) -> RepositoryResult<Vec<CrimeRecord>> {
    match range.or(repo.time_bounds().await?) {
        Some(range) => repo.fetch_records(range).await,
        None => Ok(Vec::new()),
    }
}

// ==================== Density ====================

/// Density maps over `domain` built from the repository's aggregates.
pub async fn load_density_maps<R: AnalyticsRepository + ?Sized>(
    repo: &R,
    domain: TimeDomain,
    config: &DensityConfig,
) -> RepositoryResult<DensityMaps> {
    let bin_count = config.effective_bin_count();
    let counts = repo.aggregate(domain, bin_count).await?;
    let inter_arrival = repo.inter_arrival_stats(domain, bin_count).await?;
    Ok(build_from_aggregates(&counts, &inter_arrival, domain, config))
}
