// ABOUTME: Splits a route profile into macro-segments by terrain direction
// ABOUTME: Smooths elevations, walks per-step gradients, and closes segments on direction reversals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route segmentation.
//!
//! A route profile enters as ordered [`TrackPoint`]s and leaves as
//! [`MacroSegment`]s, each covering a maximal stretch that consistently
//! climbs, descends, or stays flat. Elevations are smoothed with a centered
//! moving average first so GPS noise does not fragment the route, and
//! direction reversals shorter than `min_segment_km` are absorbed into the
//! surrounding segment instead of closing one.
//!
//! Consecutive segments share their boundary point, so segment distances sum
//! to the route total exactly (up to floating-point error).

use tracing::debug;

use crate::config::SegmenterConfig;
use crate::errors::{EngineError, EngineResult};
use crate::geo;
use crate::models::{MacroSegment, SegmentType, TrackPoint};

/// Steps shorter than this carry no usable direction (km)
const MIN_STEP_KM: f64 = 0.001;

/// Splits ordered track points into direction-consistent macro-segments
#[derive(Debug, Clone, Default)]
pub struct RouteSegmenter {
    config: SegmenterConfig,
}

impl RouteSegmenter {
    /// Create a segmenter with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the configuration fails
    /// validation.
    pub fn new(config: SegmenterConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split a route profile into macro-segments
    ///
    /// The final segment is always emitted, a perfectly flat route yields
    /// exactly one `Flat` segment, and segment distances sum to the route
    /// total.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidRoute` for fewer than two points,
    /// non-finite coordinates, or decreasing cumulative distance. No partial
    /// result is produced.
    pub fn segment_route(&self, points: &[TrackPoint]) -> EngineResult<Vec<MacroSegment>> {
        validate_route(points)?;
        let elevations = self.smoothed_elevations(points);
        let segments = self.find_segments(points, &elevations);
        debug!(
            points = points.len(),
            segments = segments.len(),
            "route segmented"
        );
        Ok(segments)
    }

    /// Smoothed elevation series, index-aligned with the points
    ///
    /// Routes with fewer points than the window keep their raw elevations;
    /// averaging almost the whole route into every sample would flatten it.
    fn smoothed_elevations(&self, points: &[TrackPoint]) -> Vec<f64> {
        let elevations: Vec<f64> = points.iter().map(|p| p.elevation_m).collect();
        if points.len() <= self.config.smoothing_window {
            return elevations;
        }
        geo::smooth_elevations(&elevations, self.config.smoothing_window)
    }

    /// Walk per-step gradients and close segments on direction reversals
    fn find_segments(&self, points: &[TrackPoint], elevations: &[f64]) -> Vec<MacroSegment> {
        let mut segments = Vec::new();
        let mut segment_start = 0usize;
        let mut current: Option<SegmentType> = None;

        for i in 1..points.len() {
            let step_km = points[i].distance_km - points[i - 1].distance_km;
            if step_km < MIN_STEP_KM {
                continue;
            }
            let gradient = (elevations[i] - elevations[i - 1]) / (step_km * 1000.0) * 100.0;
            let direction = self.direction_of(gradient);

            match current {
                None => current = Some(direction),
                // Flat steps extend whatever runs; only a genuine reversal
                // can close a segment, and only once it is long enough.
                Some(held) if direction != held && direction != SegmentType::Flat => {
                    let span_km = points[i - 1].distance_km - points[segment_start].distance_km;
                    if span_km >= self.config.min_segment_km {
                        segments.push(self.build_segment(
                            points,
                            elevations,
                            segment_start,
                            i - 1,
                            segments.len(),
                        ));
                        segment_start = i - 1;
                    }
                    current = Some(direction);
                }
                Some(_) => {}
            }
        }

        if segment_start < points.len() - 1 {
            segments.push(self.build_segment(
                points,
                elevations,
                segment_start,
                points.len() - 1,
                segments.len(),
            ));
        }
        segments
    }

    /// Build one segment over `points[start..=end]`
    ///
    /// The type comes from the realized net gradient, not the direction that
    /// was being tracked when the segment closed; absorbed jitter can drag a
    /// nominal ascent below the flat threshold.
    fn build_segment(
        &self,
        points: &[TrackPoint],
        elevations: &[f64],
        start: usize,
        end: usize,
        index: usize,
    ) -> MacroSegment {
        let distance_km = points[end].distance_km - points[start].distance_km;
        let (gain, loss) = geo::series_gain_loss(&elevations[start..=end]);
        let net_m = elevations[end] - elevations[start];
        let gradient = if distance_km > 0.0 {
            net_m / (distance_km * 1000.0) * 100.0
        } else {
            0.0
        };
        MacroSegment {
            index,
            segment_type: self.direction_of(gradient),
            distance_km,
            elevation_gain_m: gain,
            elevation_loss_m: loss,
            start_elevation_m: elevations[start],
            end_elevation_m: elevations[end],
        }
    }

    /// Direction of a gradient against the flat threshold
    fn direction_of(&self, gradient_percent: f64) -> SegmentType {
        if gradient_percent > self.config.flat_threshold_percent {
            SegmentType::Ascent
        } else if gradient_percent < -self.config.flat_threshold_percent {
            SegmentType::Descent
        } else {
            SegmentType::Flat
        }
    }
}

/// Reject routes the segmenter cannot interpret
fn validate_route(points: &[TrackPoint]) -> EngineResult<()> {
    if points.len() < 2 {
        return Err(EngineError::invalid_route(format!(
            "route needs at least 2 track points, got {}",
            points.len()
        )));
    }
    for (i, point) in points.iter().enumerate() {
        if !point.distance_km.is_finite() || !point.elevation_m.is_finite() {
            return Err(EngineError::invalid_route(format!(
                "non-finite track point at index {i}"
            )));
        }
    }
    for pair in points.windows(2) {
        if pair[1].distance_km < pair[0].distance_km {
            return Err(EngineError::invalid_route(format!(
                "cumulative distance decreases from {:.3} km to {:.3} km",
                pair[0].distance_km, pair[1].distance_km
            )));
        }
    }
    Ok(())
}
