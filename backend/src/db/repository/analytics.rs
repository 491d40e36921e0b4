//! Analytics repository trait.
//!
//! The analysis core only needs two aggregate queries from a data source:
//! per-bin event counts and per-bin inter-arrival sums over a time domain.
//! Record-level access and ingestion are provided for the HTTP surface and
//! for in-process analysis of smaller ranges.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::algorithms::InterArrivalStats;
use crate::models::{CrimeRecord, TimeDomain};

/// Repository trait for crime analytics.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    // ==================== Aggregates ====================

    /// Event counts per bin over `domain`.
    ///
    /// Records outside the domain are not counted. A zero-span domain yields
    /// `bin_count` zeros.
    async fn aggregate(&self, domain: TimeDomain, bin_count: usize) -> RepositoryResult<Vec<f64>>;

    /// Inter-arrival aggregates per bin over `domain`; each delta belongs to
    /// the bin of the later event.
    async fn inter_arrival_stats(
        &self,
        domain: TimeDomain,
        bin_count: usize,
    ) -> RepositoryResult<Vec<InterArrivalStats>>;

    // ==================== Records ====================

    /// Store records and return how many were accepted.
    async fn ingest(&self, records: Vec<CrimeRecord>) -> RepositoryResult<usize>;

    /// Records inside `domain`, ascending by timestamp.
    async fn fetch_records(&self, domain: TimeDomain) -> RepositoryResult<Vec<CrimeRecord>>;

    /// Smallest domain covering every stored record, `None` when empty.
    async fn time_bounds(&self) -> RepositoryResult<Option<TimeDomain>>;

    async fn record_count(&self) -> RepositoryResult<usize>;

    /// Fingerprint of the stored dataset; changes whenever records change.
    async fn dataset_checksum(&self) -> RepositoryResult<String>;

    /// Check that the backing store is usable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
