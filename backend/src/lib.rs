//! # Timeslice Rust Backend
//!
//! Adaptive temporal analysis for crime event timelines.
//!
//! Given a set of timestamped records this crate builds density maps that
//! stretch busy periods and compress quiet ones, scores how trustworthy an
//! analysis of a time range is, suggests warp profiles and interval
//! boundaries, and constrains interactive boundary edits of timeline slices.
//!
//! ## Architecture
//!
//! - [`models`]: time domains, records, suggestions and slice types
//! - [`algorithms`]: pure, synchronous analysis (density, adaptive scale,
//!   confidence, warp profiles, boundaries, adjustment, bursts)
//! - [`db`]: repository trait over the record store and its in-memory implementation
//! - [`services`]: stateful orchestration (suggestion store, debounced
//!   generation, drag controller, density worker, global map cache)
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
