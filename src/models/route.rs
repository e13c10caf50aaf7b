// ABOUTME: Route geometry types from raw GPS points to macro-segments
// ABOUTME: Defines GeoPoint, TrackPoint, SegmentType, and MacroSegment with derived gradients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// Raw GPS sample with elevation
///
/// Input shape for callers that have coordinates instead of cumulative
/// distances; [`crate::geo::track_points`] chains these into [`TrackPoint`]s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub latitude_deg: f64,
    /// Longitude in degrees
    pub longitude_deg: f64,
    /// Elevation above sea level in meters
    pub elevation_m: f64,
}

/// One sample of a route profile: cumulative distance plus elevation
///
/// Ordered by distance from the route start. Produced by the GPX-parsing
/// collaborator or derived from [`GeoPoint`]s; immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Distance from the route start in kilometers
    pub distance_km: f64,
    /// Elevation above sea level in meters
    pub elevation_m: f64,
}

impl TrackPoint {
    /// Create a track point
    #[must_use]
    pub const fn new(distance_km: f64, elevation_m: f64) -> Self {
        Self {
            distance_km,
            elevation_m,
        }
    }
}

/// Terrain direction of a macro-segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    /// Consistently climbing
    Ascent,
    /// Consistently descending
    Descent,
    /// Within the flat noise band
    Flat,
}

impl SegmentType {
    /// Stable snake_case name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ascent => "ascent",
            Self::Descent => "descent",
            Self::Flat => "flat",
        }
    }
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A maximal contiguous stretch of route moving consistently up, down, or flat
///
/// Produced once per prediction by the segmenter and immutable afterward.
/// Invariants: `elevation_gain_m >= 0`, `elevation_loss_m >= 0`, and segments
/// are contiguous with distances summing to the route total (within smoothing
/// rounding). A nominally ascending segment can still carry nonzero loss from
/// minor dips absorbed below the jitter threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSegment {
    /// Zero-based position within the route
    pub index: usize,
    /// Overall direction of the segment
    pub segment_type: SegmentType,
    /// Horizontal length in kilometers
    pub distance_km: f64,
    /// Sum of climbing within the segment in meters
    pub elevation_gain_m: f64,
    /// Sum of descending within the segment in meters
    pub elevation_loss_m: f64,
    /// Elevation at the segment start in meters
    pub start_elevation_m: f64,
    /// Elevation at the segment end in meters
    pub end_elevation_m: f64,
}

impl MacroSegment {
    /// Net elevation change in meters (gain minus loss)
    #[must_use]
    pub fn elevation_change_m(&self) -> f64 {
        self.elevation_gain_m - self.elevation_loss_m
    }

    /// Average gradient as a percentage
    ///
    /// Zero-distance segments are degenerate, not an error: they report a
    /// flat gradient so downstream models produce zero time for them.
    #[must_use]
    pub fn gradient_percent(&self) -> f64 {
        if self.distance_km <= 0.0 {
            return 0.0;
        }
        self.elevation_change_m() / (self.distance_km * 1000.0) * 100.0
    }

    /// Average gradient in degrees
    #[must_use]
    pub fn gradient_degrees(&self) -> f64 {
        (self.gradient_percent() / 100.0).atan().to_degrees()
    }
}
