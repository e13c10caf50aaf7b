// ABOUTME: Integration tests for the Naismith, Tobler, and grade-adjusted pace models
// ABOUTME: Validates published anchor values, mode agreement, and multiplier scaling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use trailcast::models::{MacroSegment, SegmentType};
use trailcast::pace::{GapCalculator, GapMode, NaismithCalculator, PaceModel, ToblerCalculator};

fn segment(distance_km: f64, gain_m: f64, loss_m: f64) -> MacroSegment {
    let net = gain_m - loss_m;
    let segment_type = if net > 0.0 {
        SegmentType::Ascent
    } else if net < 0.0 {
        SegmentType::Descent
    } else {
        SegmentType::Flat
    };
    MacroSegment {
        index: 0,
        segment_type,
        distance_km,
        elevation_gain_m: gain_m,
        elevation_loss_m: loss_m,
        start_elevation_m: 1000.0,
        end_elevation_m: 1000.0 + net,
    }
}

#[test]
fn tobler_flat_speed_matches_the_published_value() {
    let calc = ToblerCalculator::default();
    // 6 * exp(-3.5 * 0.05) ~= 5.04 km/h on level ground
    assert!((calc.speed_for_slope(0.0) - 5.04).abs() < 0.01);
}

#[test]
fn tobler_peaks_on_a_gentle_downhill() {
    let calc = ToblerCalculator::default();
    let peak = calc.speed_for_slope(-0.05);

    assert!(peak > calc.speed_for_slope(0.0));
    assert!(peak > calc.speed_for_slope(-0.10));

    // Strictly decreasing away from the peak in both directions
    assert!(calc.speed_for_slope(0.0) > calc.speed_for_slope(0.05));
    assert!(calc.speed_for_slope(0.05) > calc.speed_for_slope(0.15));
    assert!(calc.speed_for_slope(-0.10) > calc.speed_for_slope(-0.20));
}

#[test]
fn gap_modes_agree_downhill_and_diverge_uphill() {
    let empirical = GapCalculator::with_mode(GapMode::Empirical);
    let hybrid = GapCalculator::with_mode(GapMode::Hybrid);

    for gradient in [-20.0, -10.0, -5.0, 0.0] {
        let a = empirical.adjustment(gradient).pace_multiplier;
        let b = hybrid.adjustment(gradient).pace_multiplier;
        assert!(
            (a - b).abs() < 1e-12,
            "modes must agree at {gradient}%: {a} vs {b}"
        );
    }

    for gradient in [5.0, 10.0, 20.0] {
        let a = empirical.adjustment(gradient).pace_multiplier;
        let b = hybrid.adjustment(gradient).pace_multiplier;
        assert!(
            (a - b).abs() > 1e-6,
            "modes must diverge at {gradient}%: {a} vs {b}"
        );
    }
}

#[test]
fn gap_empirical_interpolates_between_anchors() {
    let calc = GapCalculator::with_mode(GapMode::Empirical);

    assert!((calc.adjustment(0.0).pace_multiplier - 1.0).abs() < 1e-9);
    assert!((calc.adjustment(10.0).pace_multiplier - 1.38).abs() < 1e-9);
    assert!((calc.adjustment(-10.0).pace_multiplier - 0.88).abs() < 1e-9);
    // Halfway between the 8% (1.28) and 10% (1.38) anchors
    assert!((calc.adjustment(9.0).pace_multiplier - 1.33).abs() < 1e-9);
}

#[test]
fn gap_adjustment_clamps_outside_the_table() {
    let calc = GapCalculator::with_mode(GapMode::Empirical);
    // Past the steep end, the multiplier saturates instead of extrapolating
    assert!(calc.adjustment(60.0).pace_multiplier <= 4.0);
    assert!(calc.adjustment(-60.0).pace_multiplier >= 0.5);
}

#[test]
fn naismith_charges_ascent_and_discounts_gentle_descent() {
    let calc = NaismithCalculator::default();

    let flat = calc.calculate_segment(&segment(5.0, 0.0, 0.0), 1.0);
    assert!((flat.time_hours - 1.0).abs() < 1e-9, "5 km at 5 km/h");

    let climb = calc.calculate_segment(&segment(5.0, 600.0, 0.0), 1.0);
    assert!(
        (climb.time_hours - 2.0).abs() < 1e-9,
        "600 m of ascent must add one hour, got {}",
        climb.time_hours
    );

    let gentle_down = calc.calculate_segment(&segment(3.0, 0.0, 300.0), 1.0);
    let flat_3k = calc.calculate_segment(&segment(3.0, 0.0, 0.0), 1.0);
    assert!(gentle_down.time_hours < flat_3k.time_hours);
}

#[test]
fn every_model_scales_linearly_with_the_multiplier() {
    let hilly = segment(4.0, 250.0, 0.0);
    let models = [
        PaceModel::naismith(),
        PaceModel::tobler(),
        PaceModel::gap(GapMode::Empirical),
        PaceModel::gap(GapMode::Hybrid),
    ];

    for model in &models {
        let average = model.calculate_segment(&hilly, 1.0).unwrap();
        let strong = model.calculate_segment(&hilly, 1.25).unwrap();
        assert!(
            (strong.speed_kmh - average.speed_kmh * 1.25).abs() < 1e-9,
            "{} must scale speed by the multiplier",
            model.name()
        );
        assert!(strong.time_hours < average.time_hours);
    }
}

#[test]
fn degenerate_multipliers_are_rejected() {
    let model = PaceModel::tobler();
    let hilly = segment(4.0, 250.0, 0.0);
    for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
        assert!(
            model.calculate_segment(&hilly, bad).is_err(),
            "multiplier {bad} must be rejected"
        );
    }
}

#[test]
fn every_model_carries_its_metadata() {
    let models = [
        PaceModel::naismith(),
        PaceModel::tobler(),
        PaceModel::gap(GapMode::Empirical),
        PaceModel::gap(GapMode::Hybrid),
    ];
    for model in &models {
        assert!(!model.name().is_empty());
        assert!(!model.description().is_empty());
        assert!(!model.formula().is_empty(), "{} has no formula", model.name());
    }
    assert_eq!(
        PaceModel::gap(GapMode::Empirical).formula(),
        "pace = flat_pace x table(gradient)"
    );
}
