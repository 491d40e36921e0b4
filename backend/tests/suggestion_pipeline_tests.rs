//! End-to-end tests: records in a repository through generation, review and
//! the debounced trigger.

use std::sync::Arc;
use std::time::Duration;

use timeslice_rust::config::SuggestionSettings;
use timeslice_rust::db::{self, AnalyticsRepository, LocalRepository};
use timeslice_rust::models::{
    CrimeRecord, SuggestionData, SuggestionKind, SuggestionStatus, TimeDomain, WarpEmphasis,
};
use timeslice_rust::services::{
    GenerationParams, SuggestionError, SuggestionGenerator, SuggestionStore, SuggestionTrigger,
};

const DAY_START: f64 = 1_704_067_200.0; // 2024-01-01T00:00:00Z
const HOUR: f64 = 3600.0;

/// One record every 20 minutes, plus an evening spike of one per minute.
fn day_of_records() -> Vec<CrimeRecord> {
    let mut records: Vec<CrimeRecord> = (0..72)
        .map(|i| CrimeRecord::new(DAY_START + i as f64 * 1200.0).with_attribute("type", "THEFT"))
        .collect();
    records.extend((0..120).map(|i| {
        CrimeRecord::new(DAY_START + 19.0 * HOUR + i as f64 * 60.0).with_attribute("type", "BATTERY")
    }));
    records
}

fn day() -> TimeDomain {
    TimeDomain::new(DAY_START, DAY_START + 24.0 * HOUR)
}

#[tokio::test]
async fn test_generation_from_repository_records() {
    let repo = LocalRepository::new();
    assert_eq!(db::store_records(&repo, day_of_records()).await.unwrap(), 192);

    let records = db::records_in_range(&repo, Some(day())).await.unwrap();
    let generator = SuggestionGenerator::new(SuggestionSettings::default(), SuggestionStore::new());
    let suggestions = generator.run(&records, &day(), &GenerationParams::default());

    let kinds: Vec<SuggestionKind> = suggestions.iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SuggestionKind::WarpProfile,
            SuggestionKind::WarpProfile,
            SuggestionKind::WarpProfile,
            SuggestionKind::IntervalBoundary
        ]
    );

    let emphases: Vec<WarpEmphasis> = suggestions
        .iter()
        .filter_map(|s| match &s.data {
            SuggestionData::WarpProfile(p) => Some(p.emphasis),
            _ => None,
        })
        .collect();
    assert_eq!(
        emphases,
        vec![WarpEmphasis::Aggressive, WarpEmphasis::Balanced, WarpEmphasis::Conservative]
    );

    for suggestion in &suggestions {
        assert!(suggestion.confidence <= 100);
        assert_eq!(suggestion.status, SuggestionStatus::Pending);
    }

    let SuggestionData::IntervalBoundary(boundaries) = &suggestions[3].data else {
        panic!("expected interval boundaries last");
    };
    assert!(boundaries.boundaries.windows(2).all(|w| w[0] < w[1]));
    assert!(boundaries
        .boundaries
        .iter()
        .all(|b| *b >= day().start && *b <= day().end));
}

#[tokio::test]
async fn test_review_flow_and_regeneration() {
    let generator = SuggestionGenerator::new(SuggestionSettings::default(), SuggestionStore::new());
    let store = generator.store().clone();
    let first = generator.run(&day_of_records(), &day(), &GenerationParams::default());

    store.accept(&first[0].id).unwrap();
    store.reject(&first[1].id).unwrap();
    assert_eq!(store.pending_count(), 2);

    // Interval boundaries cannot be swapped for a warp profile.
    let warp = first[0].data.clone();
    assert!(matches!(
        store.modify(&first[3].id, warp),
        Err(SuggestionError::KindMismatch { .. })
    ));

    let second = generator.run(&day_of_records(), &day(), &GenerationParams::default());
    assert_eq!(store.len(), second.len());
    assert_eq!(store.pending_count(), second.len());
    assert!(store.get(&first[0].id).is_none());
}

#[tokio::test]
async fn test_empty_range_clears_suggestions() {
    let generator = SuggestionGenerator::new(SuggestionSettings::default(), SuggestionStore::new());
    generator.run(&day_of_records(), &day(), &GenerationParams::default());
    assert!(!generator.store().is_empty());

    let next_week = TimeDomain::new(DAY_START + 7.0 * 24.0 * HOUR, DAY_START + 8.0 * 24.0 * HOUR);
    let out = generator.run(&day_of_records(), &next_week, &GenerationParams::default());
    assert!(out.is_empty());
    assert!(generator.store().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_debounced_trigger_collapses_burst() {
    let repo: Arc<dyn AnalyticsRepository> = Arc::new(LocalRepository::with_records(day_of_records()));
    let settings = SuggestionSettings::default();
    let generator = SuggestionGenerator::new(settings.clone(), SuggestionStore::new());
    let trigger = SuggestionTrigger::spawn(generator.clone(), repo, settings.debounce());
    let mut runs = trigger.subscribe();

    for warp_count in [3, 2, 1] {
        let params = GenerationParams {
            warp_count,
            ..Default::default()
        };
        trigger.request(day(), params);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(trigger.completed_runs(), 0);

    runs.changed().await.unwrap();
    assert_eq!(trigger.completed_runs(), 1);
    // Only the last request (one warp profile plus boundaries) ran.
    assert_eq!(generator.store().len(), 2);
}
