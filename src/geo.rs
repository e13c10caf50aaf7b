// ABOUTME: Geometry utilities for raw GPS points and elevation series
// ABOUTME: Haversine distances, centered-window smoothing, and gain/loss extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::constants::geometry::EARTH_RADIUS_KM;
use crate::models::{GeoPoint, TrackPoint};

/// Great-circle distance between two points in kilometers
///
/// Haversine on a spherical Earth (radius 6371 km). Symmetric, non-negative,
/// zero exactly when the points coincide.
#[must_use]
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.latitude_deg - a.latitude_deg).to_radians();
    let d_lon = (b.longitude_deg - a.longitude_deg).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude_deg.to_radians().cos()
            * b.latitude_deg.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Chain raw GPS points into cumulative-distance track points
#[must_use]
pub fn track_points(points: &[GeoPoint]) -> Vec<TrackPoint> {
    let mut out = Vec::with_capacity(points.len());
    let mut cumulative_km = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            cumulative_km += haversine_km(&points[i - 1], point);
        }
        out.push(TrackPoint::new(cumulative_km, point.elevation_m));
    }

    out
}

/// Centered moving average over an elevation series
///
/// The window truncates at the array boundaries instead of wrapping or
/// padding, so the first and last points average over fewer samples.
/// A window below 2 returns the series unchanged.
#[must_use]
pub fn smooth_elevations(elevations: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || elevations.len() < 3 {
        return elevations.to_vec();
    }

    let half = window / 2;
    (0..elevations.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(elevations.len());
            let slice = &elevations[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Total ascent and descent of a route after smoothing
///
/// Smooths the elevation series with a centered window, then sums the
/// positive deltas into gain and the negative deltas into loss. Both
/// components are non-negative.
#[must_use]
pub fn gain_loss(points: &[TrackPoint], window: usize) -> (f64, f64) {
    let elevations: Vec<f64> = points.iter().map(|p| p.elevation_m).collect();
    series_gain_loss(&smooth_elevations(&elevations, window))
}

/// Positive/negative delta sums of an already-smoothed elevation series
#[must_use]
pub fn series_gain_loss(elevations: &[f64]) -> (f64, f64) {
    let mut gain = 0.0;
    let mut loss = 0.0;

    for pair in elevations.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain += delta;
        } else {
            loss -= delta;
        }
    }

    (gain, loss)
}
