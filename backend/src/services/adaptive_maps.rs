//! Dataset-wide adaptive maps.
//!
//! Maps over the full record range are computed from repository aggregates
//! and memoized per `(bin_count, kernel_width, dataset checksum)`. Ingesting
//! records changes the checksum, so stale entries are never served and are
//! evicted on the next computation.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::algorithms::{DensityConfig, DensityMaps};
use crate::config::DensitySettings;
use crate::db::repository::{AnalyticsRepository, RepositoryResult};
use crate::db::services::load_density_maps;

pub const MIN_GLOBAL_BIN_COUNT: usize = 64;
pub const MAX_GLOBAL_BIN_COUNT: usize = 4096;
pub const MAX_GLOBAL_KERNEL_WIDTH: usize = 25;

/// Clamp a requested bin count; non-finite requests use `fallback`.
pub fn clamp_bin_count(requested: Option<f64>, fallback: usize) -> usize {
    match requested {
        Some(v) if v.is_finite() => {
            v.floor().clamp(MIN_GLOBAL_BIN_COUNT as f64, MAX_GLOBAL_BIN_COUNT as f64) as usize
        }
        _ => fallback,
    }
}

/// Clamp a requested kernel width; non-finite requests use `fallback`.
pub fn clamp_kernel_width(requested: Option<f64>, fallback: usize) -> usize {
    match requested {
        Some(v) if v.is_finite() => v.floor().clamp(0.0, MAX_GLOBAL_KERNEL_WIDTH as f64) as usize,
        _ => fallback,
    }
}

/// Density maps over every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAdaptiveMaps {
    pub row_count: usize,
    pub checksum: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub maps: DensityMaps,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    bin_count: usize,
    kernel_width: usize,
    checksum: String,
}

/// Memoizing provider of [`GlobalAdaptiveMaps`].
#[derive(Clone)]
pub struct AdaptiveMapService {
    repo: Arc<dyn AnalyticsRepository>,
    defaults: DensitySettings,
    cache: Arc<Mutex<HashMap<CacheKey, Arc<GlobalAdaptiveMaps>>>>,
}

impl AdaptiveMapService {
    pub fn new(repo: Arc<dyn AnalyticsRepository>, defaults: DensitySettings) -> Self {
        Self {
            repo,
            defaults,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Maps for the requested resolution, or `None` when no records are stored.
    pub async fn global_maps(
        &self,
        bin_count: Option<f64>,
        kernel_width: Option<f64>,
    ) -> RepositoryResult<Option<Arc<GlobalAdaptiveMaps>>> {
        let bin_count = clamp_bin_count(bin_count, self.defaults.bin_count);
        let kernel_width = clamp_kernel_width(kernel_width, self.defaults.kernel_width);

        let Some(domain) = self.repo.time_bounds().await? else {
            return Ok(None);
        };
        let key = CacheKey {
            bin_count,
            kernel_width,
            checksum: self.repo.dataset_checksum().await?,
        };

        if let Some(hit) = self.cache.lock().get(&key) {
            log::debug!("global maps cache hit ({} bins, kernel {})", bin_count, kernel_width);
            return Ok(Some(hit.clone()));
        }

        let config = DensityConfig::new(bin_count, kernel_width);
        let maps = load_density_maps(self.repo.as_ref(), domain, &config).await?;
        let entry = Arc::new(GlobalAdaptiveMaps {
            row_count: self.repo.record_count().await?,
            checksum: key.checksum.clone(),
            generated_at: Utc::now(),
            maps,
        });

        let mut cache = self.cache.lock();
        cache.retain(|k, _| k.checksum == key.checksum);
        cache.insert(key, entry.clone());
        log::info!(
            "computed global maps ({} bins, kernel {}, {} rows)",
            bin_count,
            kernel_width,
            entry.row_count
        );
        Ok(Some(entry))
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::models::CrimeRecord;

    fn service(repo: LocalRepository) -> AdaptiveMapService {
        AdaptiveMapService::new(Arc::new(repo), DensitySettings::default())
    }

    #[test]
    fn test_clamping() {
        assert_eq!(clamp_bin_count(Some(10.0), 256), 64);
        assert_eq!(clamp_bin_count(Some(100_000.0), 256), 4096);
        assert_eq!(clamp_bin_count(Some(300.9), 256), 300);
        assert_eq!(clamp_bin_count(Some(f64::NAN), 256), 256);
        assert_eq!(clamp_bin_count(None, 256), 256);
        assert_eq!(clamp_kernel_width(Some(-3.0), 2), 0);
        assert_eq!(clamp_kernel_width(Some(99.0), 2), 25);
        assert_eq!(clamp_kernel_width(None, 2), 2);
    }

    #[tokio::test]
    async fn test_empty_dataset_has_no_maps() {
        assert!(service(LocalRepository::new())
            .global_maps(None, None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_cache_hit_and_invalidation() {
        let repo = LocalRepository::with_records((0..100).map(|i| CrimeRecord::new(i as f64)).collect());
        let service = AdaptiveMapService::new(Arc::new(repo.clone()), DensitySettings::default());

        let first = service.global_maps(Some(64.0), Some(1.0)).await.unwrap().unwrap();
        assert_eq!(first.maps.bin_count, 64);
        assert_eq!(first.row_count, 100);
        let again = service.global_maps(Some(64.0), Some(1.0)).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        service.global_maps(None, None).await.unwrap().unwrap();
        assert_eq!(service.cached_entries(), 2);

        repo.ingest(vec![CrimeRecord::new(500.0)]).await.unwrap();
        let fresh = service.global_maps(Some(64.0), Some(1.0)).await.unwrap().unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.row_count, 101);
        assert_eq!(fresh.maps.domain.end, 500.0);
        assert_eq!(service.cached_entries(), 1);
    }
}
