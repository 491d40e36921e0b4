//! Suggestion generation.
//!
//! A generation run analyzes the records inside the requested range once
//! (shared density bins and a shared composite confidence) and derives from
//! that single pass:
//!
//! - up to three warp profiles (aggressive, balanced, conservative)
//! - one interval boundary suggestion
//!
//! Each run fully replaces the previous suggestion set in the
//! [`SuggestionStore`].

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use super::suggestion_store::SuggestionStore;
use crate::algorithms::boundaries::{detect_boundaries_in, BoundaryOptions};
use crate::algorithms::confidence::calculate_confidence;
use crate::algorithms::warp::{analyze_density, detect_events, generate_warp_profiles, MIN_INTERVAL_COUNT};
use crate::config::SuggestionSettings;
use crate::models::{
    BoundaryMethod, CrimeRecord, IntervalBoundarySuggestion, Sensitivity, SnapUnit, Suggestion,
    SuggestionData, TimeDomain,
};

/// Maximum number of warp profiles per run.
pub const MAX_WARP_COUNT: usize = 3;

/// User-facing knobs of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationParams {
    /// Number of warp profiles, 0 to 3.
    pub warp_count: usize,
    /// Target interval count; 0 disables the boundary suggestion.
    pub interval_count: usize,
    pub snap_to_unit: SnapUnit,
    pub boundary_method: BoundaryMethod,
    pub sensitivity: Sensitivity,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from_settings(&SuggestionSettings::default())
    }
}

impl GenerationParams {
    pub fn from_settings(settings: &SuggestionSettings) -> Self {
        Self {
            warp_count: settings.warp_count,
            interval_count: settings.interval_count,
            snap_to_unit: settings.snap_to_unit,
            boundary_method: settings.boundary_method,
            sensitivity: settings.sensitivity,
        }
    }
}

/// Generate suggestions, snapping boundaries in the local time zone.
pub fn generate_suggestions(
    records: &[CrimeRecord],
    range: &TimeDomain,
    params: &GenerationParams,
    settings: &SuggestionSettings,
) -> Vec<Suggestion> {
    generate_suggestions_in(records, range, params, settings, &Local)
}

/// Generate suggestions for the records inside `range`.
///
/// No records in range or a zero-span range gives an empty set.
pub fn generate_suggestions_in<Tz: TimeZone>(
    records: &[CrimeRecord],
    range: &TimeDomain,
    params: &GenerationParams,
    settings: &SuggestionSettings,
    tz: &Tz,
) -> Vec<Suggestion> {
    let range = TimeDomain::ordered(range.start, range.end);
    if range.is_degenerate() {
        log::debug!("suggestion generation skipped: zero-span range");
        return Vec::new();
    }

    let timestamps: Vec<f64> = records
        .iter()
        .map(|r| r.timestamp)
        .filter(|t| range.contains(*t))
        .collect();
    if timestamps.is_empty() {
        log::debug!("suggestion generation skipped: no records in range");
        return Vec::new();
    }

    let analysis = analyze_density(&timestamps, &range, settings.bin_count.max(1));
    let densities = analysis.densities();
    let confidence = calculate_confidence(&timestamps, &range, Some(&densities), &settings.weights);

    let events = detect_events(&analysis.bins);
    if !events.is_empty() {
        log::debug!("density shifts near {:?}", events);
    }

    let mut suggestions = Vec::new();

    if params.warp_count > 0 {
        let target = if params.interval_count == 0 {
            MIN_INTERVAL_COUNT
        } else {
            params.interval_count
        };
        let profiles = generate_warp_profiles(
            &densities,
            confidence,
            target,
            params.warp_count.min(MAX_WARP_COUNT),
        );
        suggestions.extend(
            profiles
                .into_iter()
                .map(|p| Suggestion::new(SuggestionData::WarpProfile(p))),
        );
    }

    if params.interval_count > 0 {
        let options = BoundaryOptions {
            method: params.boundary_method,
            sensitivity: params.sensitivity,
            snap_to_unit: params.snap_to_unit,
            boundary_count: params.interval_count,
        };
        let detection = detect_boundaries_in(&densities, &range, &options, tz);
        suggestions.push(Suggestion::new(SuggestionData::IntervalBoundary(
            IntervalBoundarySuggestion {
                boundaries: detection.boundaries,
                method: params.boundary_method,
                confidence,
                metadata: detection.metadata,
            },
        )));
    }

    log::info!(
        "generated {} suggestions from {} records (confidence {})",
        suggestions.len(),
        timestamps.len(),
        confidence
    );
    suggestions
}

/// Runs generation and publishes the result into a store.
#[derive(Clone)]
pub struct SuggestionGenerator {
    settings: SuggestionSettings,
    store: SuggestionStore,
}

impl SuggestionGenerator {
    pub fn new(settings: SuggestionSettings, store: SuggestionStore) -> Self {
        Self { settings, store }
    }

    pub fn settings(&self) -> &SuggestionSettings {
        &self.settings
    }

    pub fn store(&self) -> &SuggestionStore {
        &self.store
    }

    /// Generate and replace the stored set; returns the new suggestions.
    pub fn run(
        &self,
        records: &[CrimeRecord],
        range: &TimeDomain,
        params: &GenerationParams,
    ) -> Vec<Suggestion> {
        let suggestions = generate_suggestions(records, range, params, &self.settings);
        self.store.replace_all(suggestions.clone());
        suggestions
    }
}
