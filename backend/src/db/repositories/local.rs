//! In-memory local repository implementation.
//!
//! Records are kept sorted by timestamp so range queries are two binary
//! searches and the aggregates can run the same binning code as the in-process
//! density pass.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::algorithms::density::{bin_counts, inter_arrival_stats};
use crate::algorithms::InterArrivalStats;
use crate::db::checksum::timestamps_checksum;
use crate::db::repository::{AnalyticsRepository, ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{to_epoch_seconds, CrimeRecord, TimeDomain};

/// In-memory local repository.
///
/// # Example
/// ```
/// use timeslice_rust::db::LocalRepository;
/// use timeslice_rust::models::CrimeRecord;
///
/// let repo = LocalRepository::with_records(vec![CrimeRecord::new(10.0), CrimeRecord::new(5.0)]);
/// assert_eq!(repo.len(), 2);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    /// Ascending by timestamp.
    records: Vec<CrimeRecord>,
    /// Timestamp column of `records`.
    timestamps: Vec<f64>,
    checksum: String,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            timestamps: Vec::new(),
            checksum: timestamps_checksum(&[]),
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn reindex(&mut self) {
        self.records.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        self.timestamps = self.records.iter().map(|r| r.timestamp).collect();
        self.checksum = timestamps_checksum(&self.timestamps);
    }

    /// Index range of records inside `domain`.
    fn range_of(&self, domain: &TimeDomain) -> std::ops::Range<usize> {
        let domain = TimeDomain::ordered(domain.start, domain.end);
        let lo = self.timestamps.partition_point(|t| *t < domain.start);
        let hi = self.timestamps.partition_point(|t| *t <= domain.end);
        lo..hi.max(lo)
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository pre-populated with `records`.
    ///
    /// Records with a non-finite timestamp are skipped.
    pub fn with_records(records: Vec<CrimeRecord>) -> Self {
        let repo = Self::new();
        {
            let mut data = repo.data.write();
            data.records = records
                .into_iter()
                .filter(|r| r.timestamp.is_finite())
                .map(normalize_record)
                .collect();
            data.reindex();
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.data.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark the store available or not. An unavailable store fails
    /// `health_check` and refuses ingest.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }
}

fn normalize_record(mut record: CrimeRecord) -> CrimeRecord {
    record.timestamp = to_epoch_seconds(record.timestamp);
    record
}

#[async_trait]
impl AnalyticsRepository for LocalRepository {
    async fn aggregate(&self, domain: TimeDomain, bin_count: usize) -> RepositoryResult<Vec<f64>> {
        let data = self.data.read();
        let range = data.range_of(&domain);
        Ok(bin_counts(&data.timestamps[range], &domain, bin_count.max(1)))
    }

    async fn inter_arrival_stats(
        &self,
        domain: TimeDomain,
        bin_count: usize,
    ) -> RepositoryResult<Vec<InterArrivalStats>> {
        let data = self.data.read();
        let range = data.range_of(&domain);
        Ok(inter_arrival_stats(&data.timestamps[range], &domain, bin_count))
    }

    async fn ingest(&self, records: Vec<CrimeRecord>) -> RepositoryResult<usize> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "record store is unavailable",
                ErrorContext::new("ingest").with_entity("record"),
            ));
        }
        if let Some((idx, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| !r.timestamp.is_finite())
        {
            return Err(RepositoryError::validation_with_context(
                "record timestamp must be a finite number",
                ErrorContext::new("ingest")
                    .with_entity("record")
                    .with_entity_id(idx)
                    .with_details(format!("timestamp={}", record.timestamp)),
            ));
        }

        let accepted = records.len();
        let mut data = self.data.write();
        data.records.extend(records.into_iter().map(normalize_record));
        data.reindex();

        log::info!("ingested {} records ({} total)", accepted, data.records.len());
        Ok(accepted)
    }

    async fn fetch_records(&self, domain: TimeDomain) -> RepositoryResult<Vec<CrimeRecord>> {
        let data = self.data.read();
        let range = data.range_of(&domain);
        Ok(data.records[range].to_vec())
    }

    async fn time_bounds(&self) -> RepositoryResult<Option<TimeDomain>> {
        let data = self.data.read();
        Ok(match (data.timestamps.first(), data.timestamps.last()) {
            (Some(&first), Some(&last)) => Some(TimeDomain::new(first, last)),
            _ => None,
        })
    }

    async fn record_count(&self) -> RepositoryResult<usize> {
        Ok(self.data.read().records.len())
    }

    async fn dataset_checksum(&self) -> RepositoryResult<String> {
        Ok(self.data.read().checksum.clone())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }
}
