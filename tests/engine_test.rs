// ABOUTME: End-to-end tests for the route prediction engine
// ABOUTME: Validates generic and personalized predictions, comparisons, fatigue, and serialization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use trailcast::config::EngineConfig;
use trailcast::engine::{PredictionRequest, RoutePredictor};
use trailcast::errors::EngineError;
use trailcast::models::{ActivityKind, CalculationResult, SplitSample, TrackPoint};
use trailcast::profile::{create_shared_store, ProfileBuilder, ProfileRepository};
use uuid::Uuid;

fn flat_route(total_km: f64) -> Vec<TrackPoint> {
    (0..=100)
        .map(|i| TrackPoint::new(total_km * f64::from(i) / 100.0, 500.0))
        .collect()
}

/// Alternating 2 km climbs and descents at 8%, `legs` of each
fn rolling_route(legs: u32) -> Vec<TrackPoint> {
    let mut points = vec![TrackPoint::new(0.0, 1000.0)];
    let mut elevation = 1000.0;
    for i in 1..=(legs * 40) {
        elevation += if (i - 1) % 40 < 20 { 8.0 } else { -8.0 };
        points.push(TrackPoint::new(f64::from(i) * 0.1, elevation));
    }
    points
}

#[test]
fn flat_ten_kilometers_at_the_generic_pace_takes_an_hour() {
    let predictor = RoutePredictor::default();
    let request = PredictionRequest::new(flat_route(10.0), ActivityKind::TrailRunning);
    let result = predictor.predict(&request).unwrap();

    assert!(
        (result.total_time_minutes() - 60.0).abs() < 0.5,
        "10 km at 6.0 min/km must be about an hour, got {:.1} min",
        result.total_time_minutes()
    );
    assert_eq!(result.formatted_total_time(), "1:00");
}

#[test]
fn unknown_athletes_get_a_valid_generic_prediction() {
    let predictor = RoutePredictor::new(EngineConfig::default())
        .unwrap()
        .with_store(create_shared_store());

    for kind in [ActivityKind::TrailRunning, ActivityKind::Hiking] {
        let request = PredictionRequest::new(rolling_route(2), kind).with_user(Uuid::new_v4());
        let result = predictor.predict(&request).unwrap();

        assert!(!result.segments.is_empty());
        assert!(result.total_time_hours > 0.0);
        let segment_sum: f64 = result.segments.iter().map(|s| s.time_hours).sum();
        assert!(
            (segment_sum - result.total_time_hours).abs() < 1e-9,
            "{kind}: segment times must sum to the total"
        );
    }
}

#[test]
fn learned_history_speeds_up_the_prediction() {
    let store = create_shared_store();
    let user = Uuid::new_v4();

    // A dozen steady 5.0 min/km flat kilometers
    let splits: Vec<SplitSample> = (0..12)
        .map(|_| SplitSample::new(1000.0, 0.0, 300.0))
        .collect();
    let profile = ProfileBuilder::new(&EngineConfig::default())
        .unwrap()
        .build(user, ActivityKind::TrailRunning, &splits, 4);
    store.save(profile, "history import").unwrap();

    let predictor = RoutePredictor::default().with_store(store);
    let generic = PredictionRequest::new(flat_route(10.0), ActivityKind::TrailRunning);
    let personal = PredictionRequest::new(flat_route(10.0), ActivityKind::TrailRunning)
        .with_user(user);

    let generic_result = predictor.predict(&generic).unwrap();
    let personal_result = predictor.predict(&personal).unwrap();

    assert_eq!(personal_result.segments[0].method_used, "personalized");
    assert!(
        (personal_result.total_time_minutes() - 50.0).abs() < 0.5,
        "10 km at the learned 5.0 min/km, got {:.1} min",
        personal_result.total_time_minutes()
    );
    assert!(personal_result.total_time_hours < generic_result.total_time_hours);
}

#[test]
fn elevation_makes_routes_slower_than_their_flat_equivalent() {
    let predictor = RoutePredictor::default();
    let request = PredictionRequest::new(rolling_route(3), ActivityKind::TrailRunning);
    let result = predictor.predict(&request).unwrap();

    assert!(result.summary.flat_equivalent_hours > 0.0);
    assert!(result.total_time_hours > result.summary.flat_equivalent_hours);
    assert!(result.summary.elevation_impact_percent > 0.0);
}

#[test]
fn fatigue_engages_late_on_long_routes() {
    let predictor = RoutePredictor::default();
    // 10 legs of climb/descent: 40 km, well past the 2 h onset
    let request = PredictionRequest::new(rolling_route(10), ActivityKind::TrailRunning);
    let result = predictor.predict(&request).unwrap();

    let first = result.segments.first().unwrap();
    let last = result.segments.last().unwrap();
    assert!((first.fatigue_multiplier - 1.0).abs() < f64::EPSILON);
    assert!(
        last.fatigue_multiplier > 1.05,
        "late segments must be degraded, got {}",
        last.fatigue_multiplier
    );

    for pair in result.segments.windows(2) {
        assert!(pair[1].cumulative_time_hours > pair[0].cumulative_time_hours);
        assert!(pair[1].cumulative_distance_km > pair[0].cumulative_distance_km);
    }
}

#[test]
fn requested_comparisons_total_every_model() {
    let predictor = RoutePredictor::default();
    let request =
        PredictionRequest::new(rolling_route(2), ActivityKind::TrailRunning).with_comparison();
    let result = predictor.predict(&request).unwrap();

    for name in ["naismith", "tobler", "gap_empirical", "gap_hybrid", "personalized"] {
        let total = result.method_totals.get(name).copied();
        assert!(
            total.unwrap_or(0.0) > 0.0,
            "missing or empty total for {name}: {total:?}"
        );
    }
    let naismith = result.method_totals["naismith"];
    let tobler = result.method_totals["tobler"];
    assert!(
        (naismith - tobler).abs() > 0.01,
        "hiking formulas must disagree on hilly ground: {naismith} vs {tobler}"
    );
}

#[test]
fn compare_reports_a_full_per_segment_matrix() {
    let predictor = RoutePredictor::default();
    let request = PredictionRequest::new(rolling_route(2), ActivityKind::Hiking);
    let comparison = predictor.compare(&request).unwrap();

    assert_eq!(comparison.methods.len(), 5);
    assert!(!comparison.per_segment.is_empty());
    for row in &comparison.per_segment {
        assert_eq!(row.times_hours.len(), 5, "every model must fill every row");
    }
    for method in &comparison.methods {
        let summed: f64 = comparison
            .per_segment
            .iter()
            .map(|row| row.times_hours[&method.name])
            .sum();
        assert!(
            (summed - method.total_hours).abs() < 1e-9,
            "{}: per-segment times must sum to the reported total",
            method.name
        );
        assert!(!method.description.is_empty());
    }
}

#[test]
fn results_serialize_round_trip() {
    let predictor = RoutePredictor::default();
    let request =
        PredictionRequest::new(rolling_route(1), ActivityKind::TrailRunning).with_comparison();
    let result = predictor.predict(&request).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: CalculationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn degenerate_tracks_are_rejected_whole() {
    let predictor = RoutePredictor::default();
    let request = PredictionRequest::new(
        vec![TrackPoint::new(0.0, 500.0)],
        ActivityKind::TrailRunning,
    );
    assert!(matches!(
        predictor.predict(&request),
        Err(EngineError::InvalidRoute { .. })
    ));
}
