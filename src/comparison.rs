// ABOUTME: Side-by-side comparison of pace models over the same segment sequence
// ABOUTME: Produces per-method route totals and a per-segment time matrix
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Method comparison.
//!
//! Runs several pace models over one segmented route and lays their answers
//! side by side. Diagnostic output: raw model times without threshold or
//! fatigue adjustments, so the models stay directly comparable. Read-only
//! and side-effect-free.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::EngineResult;
use crate::models::MacroSegment;
use crate::pace::PaceModel;

/// One model's totals over the compared route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodTotal {
    /// Stable model name
    pub name: String,
    /// Human-readable model description
    pub description: String,
    /// Predicted route duration (hours)
    pub total_hours: f64,
    /// Average speed over the route (km/h)
    pub avg_speed_kmh: f64,
}

/// Segment-level times across all compared models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentComparison {
    /// Zero-based position within the route
    pub index: usize,
    /// Segment length (km)
    pub distance_km: f64,
    /// Average segment gradient (percent)
    pub gradient_percent: f64,
    /// Predicted hours keyed by model name
    pub times_hours: BTreeMap<String, f64>,
}

/// Complete model comparison for one route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteComparison {
    /// Per-model route totals, in the order the models were given
    pub methods: Vec<MethodTotal>,
    /// Per-segment times across models
    pub per_segment: Vec<SegmentComparison>,
    /// Total route distance (km)
    pub total_distance_km: f64,
    /// Total ascent (m)
    pub total_ascent_m: f64,
    /// Total descent (m)
    pub total_descent_m: f64,
}

/// Runs pace models side by side over a segmented route
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonService;

impl ComparisonService {
    /// Compare models over the identical segment sequence
    ///
    /// Every model sees the same segments with a neutral profile multiplier;
    /// cumulative state is per model, so no model contaminates another.
    ///
    /// # Errors
    ///
    /// Propagates the first model error; models with valid configuration do
    /// not fail on route geometry.
    pub fn compare(segments: &[MacroSegment], models: &[PaceModel]) -> EngineResult<RouteComparison> {
        let total_distance_km: f64 = segments.iter().map(|s| s.distance_km).sum();
        let total_ascent_m: f64 = segments.iter().map(|s| s.elevation_gain_m).sum();
        let total_descent_m: f64 = segments.iter().map(|s| s.elevation_loss_m).sum();

        let mut per_segment: Vec<SegmentComparison> = segments
            .iter()
            .map(|segment| SegmentComparison {
                index: segment.index,
                distance_km: segment.distance_km,
                gradient_percent: segment.gradient_percent(),
                times_hours: BTreeMap::new(),
            })
            .collect();

        let mut methods = Vec::with_capacity(models.len());
        for model in models {
            let mut total_hours = 0.0;
            for (segment, row) in segments.iter().zip(per_segment.iter_mut()) {
                let estimate = model.calculate_segment(segment, 1.0)?;
                total_hours += estimate.time_hours;
                row.times_hours
                    .insert(model.name().to_owned(), estimate.time_hours);
            }
            let avg_speed_kmh = if total_hours > 0.0 {
                total_distance_km / total_hours
            } else {
                0.0
            };
            methods.push(MethodTotal {
                name: model.name().to_owned(),
                description: model.description(),
                total_hours,
                avg_speed_kmh,
            });
        }

        Ok(RouteComparison {
            methods,
            per_segment,
            total_distance_km,
            total_ascent_m,
            total_descent_m,
        })
    }
}
