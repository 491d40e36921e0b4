//! Repository traits and error types.

pub mod analytics;
pub mod error;

pub use analytics::AnalyticsRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
