// ABOUTME: Integration tests for profile building, statistics, and storage
// ABOUTME: Validates outlier filtering, percentile bands, cutoff detection, and store round trips
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use trailcast::config::EngineConfig;
use trailcast::gradient::GradientCategory;
use trailcast::models::{ActivityKind, EffortLevel, SplitSample};
use trailcast::profile::{InMemoryProfileStore, ProfileBuilder, ProfileRepository};
use uuid::Uuid;

/// 1 km split at the given gradient (percent) and pace (min/km)
fn split(gradient_percent: f64, pace_min_per_km: f64) -> SplitSample {
    SplitSample::new(1000.0, gradient_percent * 10.0, pace_min_per_km * 60.0)
}

fn builder() -> ProfileBuilder {
    ProfileBuilder::new(&EngineConfig::default()).unwrap()
}

#[test]
fn outlier_splits_do_not_skew_the_learned_pace() {
    let mut splits: Vec<SplitSample> = Vec::new();
    for pace in [5.4, 5.4, 5.4, 5.4, 5.5, 5.5, 5.5, 5.5, 5.6, 5.6, 5.6] {
        splits.push(split(0.0, pace));
    }
    // One struggling split, still running-paced so only the IQR filter can drop it
    splits.push(split(0.0, 8.5));

    let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 3);
    let flat = profile.category(GradientCategory::Flat).copied().unwrap();

    assert_eq!(flat.sample_count, 11, "the outlier must be filtered out");
    let average = flat.pace_min_per_km.unwrap();
    assert!(
        average < 5.6,
        "average {average} must exclude the 8.5 min/km outlier"
    );
}

#[test]
fn effort_levels_read_increasing_percentile_bands() {
    let splits: Vec<SplitSample> = [5.4, 5.4, 5.4, 5.4, 5.5, 5.5, 5.5, 5.5, 5.6, 5.6, 5.6]
        .iter()
        .map(|&pace| split(0.0, pace))
        .collect();

    let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 2);

    let fast = profile.flat_pace(EffortLevel::Fast).unwrap();
    let moderate = profile.flat_pace(EffortLevel::Moderate).unwrap();
    let easy = profile.flat_pace(EffortLevel::Easy).unwrap();
    assert!(
        fast < moderate && moderate < easy,
        "p25 {fast} < p50 {moderate} < p75 {easy}"
    );
    assert!((moderate - 5.5).abs() < 1e-9);
}

#[test]
fn uphill_pace_collapse_sets_the_walk_threshold() {
    let mut splits = vec![split(0.0, 5.5); 4];
    // Running holds to 14%, collapses to walking paces from 18% on
    for (gradient, pace) in [
        (6.0, 7.0),
        (8.0, 7.1),
        (10.0, 7.2),
        (12.0, 7.3),
        (14.0, 7.4),
        (18.0, 12.0),
        (22.0, 12.4),
        (26.0, 12.8),
    ] {
        splits.push(split(gradient, pace));
    }

    let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 5);
    let detected = profile.walk_threshold_percent.unwrap();
    assert!(
        (detected - 16.0).abs() < 1e-9,
        "cutoff must sit between the last running and first walking split, got {detected}"
    );
}

#[test]
fn hiking_profiles_never_detect_a_walk_threshold() {
    let mut splits = vec![split(0.0, 12.0); 5];
    for (gradient, pace) in [
        (6.0, 14.0),
        (8.0, 14.5),
        (10.0, 15.0),
        (14.0, 16.0),
        (18.0, 20.0),
        (22.0, 21.0),
    ] {
        splits.push(split(gradient, pace));
    }

    let profile = builder().build(Uuid::new_v4(), ActivityKind::Hiking, &splits, 4);
    assert!(profile.walk_threshold_percent.is_none());
}

#[test]
fn vertical_ability_compares_gentle_uphill_to_flat() {
    let mut splits = vec![split(0.0, 6.0); 5];
    splits.extend(std::iter::repeat_n(split(5.0, 7.2), 5));

    let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 6);
    // (7.2 / 6.0) / 1.5 = 0.8: climbs cost this athlete less than average
    assert!((profile.vertical_ability - 0.8).abs() < 1e-9);
}

#[test]
fn thin_history_yields_an_unpopulated_profile() {
    let splits = vec![split(0.0, 5.5); 4];
    let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 1);

    assert!(!profile.has_data());
    assert!(profile.flat_pace(EffortLevel::Moderate).is_none());
    // Totals still describe what was seen
    assert!((profile.total_distance_km - 4.0).abs() < 1e-9);
    assert_eq!(profile.total_activities, 1);
}

#[test]
fn store_round_trips_and_snapshots_every_save() {
    let store = InMemoryProfileStore::new();
    let user = Uuid::new_v4();
    let splits: Vec<SplitSample> = (0..8).map(|_| split(0.0, 5.5)).collect();

    let first = builder().build(user, ActivityKind::TrailRunning, &splits, 2);
    store.save(first, "initial import").unwrap();

    let more: Vec<SplitSample> = (0..12).map(|_| split(0.0, 5.3)).collect();
    let second = builder().build(user, ActivityKind::TrailRunning, &more, 4);
    store.save(second, "weekly recalculation").unwrap();

    let current = store.get(user, ActivityKind::TrailRunning).unwrap();
    assert_eq!(current.total_activities, 4, "reads must see the latest save");

    let history = store.snapshots(user, ActivityKind::TrailRunning);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].reason, "initial import");
    assert_eq!(history[1].reason, "weekly recalculation");

    let stats = store.stats();
    assert_eq!(stats.profile_count, 1);
    assert_eq!(stats.user_count, 1);
    assert_eq!(stats.snapshot_count, 2);
}

#[test]
fn profiles_serialize_round_trip() {
    let splits: Vec<SplitSample> = (0..10).map(|_| split(0.0, 5.5)).collect();
    let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 3);

    let json = serde_json::to_string(&profile).unwrap();
    let back: trailcast::models::PerformanceProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, profile);
}
