//! Data access for crime records.
//!
//! Storage is abstracted behind the [`AnalyticsRepository`] trait so the
//! analysis can be driven either by an in-memory store or by an external
//! analytic engine that only answers aggregate queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / services                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - density maps from aggregates                          │
//! │  - dataset metadata and checksums                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```

pub mod checksum;
pub mod repositories;
pub mod repository;
pub mod services;

pub use checksum::{calculate_checksum, timestamps_checksum};
pub use repositories::LocalRepository;
pub use repository::{AnalyticsRepository, ErrorContext, RepositoryError, RepositoryResult};
pub use services::{
    dataset_meta, health_check, load_density_maps, records_in_range, store_records, DatasetMeta,
};
