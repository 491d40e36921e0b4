//! Property tests for the density, adaptive-scale and confidence passes.

use proptest::prelude::*;

use timeslice_rust::algorithms::boundaries::detect_peaks;
use timeslice_rust::algorithms::{
    build_density_maps, calculate_confidence, compute_adaptive_y, ConfidenceWeights, DensityConfig,
};
use timeslice_rust::models::{normalized_to_sec, sec_to_normalized, Sensitivity, TimeDomain};

const START: f64 = 1_700_000_000.0;

fn timestamps_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..86_400.0, 0..400)
        .prop_map(|offsets| offsets.into_iter().map(|o| START + o).collect())
}

fn domain_strategy() -> impl Strategy<Value = TimeDomain> {
    (0.0f64..3_600.0, 3_600.0f64..172_800.0).prop_map(|(a, span)| TimeDomain::new(START + a, START + a + span))
}

proptest! {
    #[test]
    fn density_maps_have_expected_shape(
        timestamps in timestamps_strategy(),
        domain in domain_strategy(),
        bin_count in 1usize..300,
        kernel_width in 0usize..6,
    ) {
        let maps = build_density_maps(&timestamps, domain, &DensityConfig::new(bin_count, kernel_width));

        prop_assert_eq!(maps.density.len(), bin_count);
        prop_assert_eq!(maps.burstiness.len(), bin_count);
        prop_assert_eq!(maps.warp.len(), bin_count + 1);
        prop_assert!(maps.density.iter().all(|d| (0.0..=1.0).contains(d)));
        prop_assert!(maps.burstiness.iter().all(|b| (0.0..=1.0).contains(b)));
        prop_assert!(maps.warp.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(maps.warp[0], domain.start);
        prop_assert_eq!(maps.warp[bin_count], domain.end);
    }

    #[test]
    fn density_peak_is_one_when_any_record_lands(
        timestamps in timestamps_strategy(),
        bin_count in 1usize..128,
    ) {
        let domain = TimeDomain::new(START, START + 86_400.0);
        let maps = build_density_maps(&timestamps, domain, &DensityConfig::new(bin_count, 1));
        let max = maps.density.iter().cloned().fold(0.0, f64::max);
        if timestamps.is_empty() {
            prop_assert_eq!(max, 0.0);
        } else {
            prop_assert!((max - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn adaptive_y_is_monotonic_with_exact_endpoints(
        mut timestamps in timestamps_strategy(),
        bin_count in 1usize..200,
        y_min in -500.0f64..0.0,
        y_len in 1.0f64..2_000.0,
    ) {
        let domain = TimeDomain::new(START, START + 86_400.0);
        let y_max = y_min + y_len;
        timestamps.sort_by(|a, b| a.total_cmp(b));
        timestamps.insert(0, domain.start);
        timestamps.push(domain.end);

        let y = compute_adaptive_y(&timestamps, domain, y_min, y_max, bin_count);
        prop_assert_eq!(y.len(), timestamps.len());
        prop_assert!(y.windows(2).all(|w| w[0] <= w[1] + 1e-9));
        prop_assert_eq!(y[0], y_min);
        prop_assert_eq!(*y.last().unwrap(), y_max);
    }

    #[test]
    fn confidence_is_bounded(
        timestamps in timestamps_strategy(),
        domain in domain_strategy(),
    ) {
        let score = calculate_confidence(&timestamps, &domain, None, &ConfidenceWeights::default());
        prop_assert!(score <= 100);
        if timestamps.is_empty() {
            prop_assert_eq!(score, 0);
        }
    }

    #[test]
    fn normalization_round_trips(
        domain in domain_strategy(),
        fraction in 0.0f64..=1.0,
    ) {
        let sec = domain.start + fraction * domain.span();
        let normalized = sec_to_normalized(sec, domain.start, domain.end);
        let back = normalized_to_sec(normalized, domain.start, domain.end);
        prop_assert!((0.0..=100.0).contains(&normalized));
        prop_assert!((back - sec).abs() < 1e-3);
    }

    #[test]
    fn peaks_skip_edges_and_respect_caps(
        density in prop::collection::vec(0.0f64..1.0, 0..120),
    ) {
        for (sensitivity, cap) in [
            (Sensitivity::Low, 3),
            (Sensitivity::Medium, 6),
            (Sensitivity::High, 10),
        ] {
            let peaks = detect_peaks(&density, sensitivity);
            prop_assert!(peaks.len() <= cap);
            prop_assert!(peaks.iter().all(|&i| i > 0 && i + 1 < density.len()));
        }
    }
}

#[test]
fn zero_span_domain_collapses() {
    let domain = TimeDomain::new(START, START);
    let maps = build_density_maps(&[START, START], domain, &DensityConfig::new(8, 2));
    assert!(maps.density.iter().all(|d| *d == 0.0));
    assert!(maps.warp.iter().all(|w| *w == START));

    let y = compute_adaptive_y(&[START, START + 5.0], domain, 10.0, 20.0, 8);
    assert_eq!(y, vec![10.0, 10.0]);
    assert_eq!(
        calculate_confidence(&[START], &domain, None, &ConfidenceWeights::default()),
        0
    );
}
