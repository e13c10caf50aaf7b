// ABOUTME: Prediction output types from per-segment estimates to route totals
// ABOUTME: Defines MethodResult, MovementMode, SegmentResult, RouteSummary, CalculationResult
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::route::MacroSegment;

/// One pace model's answer for one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    /// Name of the model that produced the estimate
    pub method: String,
    /// Effective speed over the segment (km/h)
    pub speed_kmh: f64,
    /// Effective pace over the segment (min/km)
    pub pace_min_per_km: f64,
    /// Predicted segment duration (hours)
    pub time_hours: f64,
    /// Formula or lookup the estimate came from
    pub formula: String,
}

/// Movement mode chosen for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Running pace regime
    Run,
    /// Walking pace regime
    Walk,
}

impl MovementMode {
    /// Stable snake_case name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Walk => "walk",
        }
    }
}

impl std::fmt::Display for MovementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Final per-segment prediction after mode selection and fatigue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    /// The segment this result describes
    pub segment: MacroSegment,
    /// Run or walk, as decided by the threshold service
    pub movement_mode: MovementMode,
    /// Name of the pace source used (personalized or a generic model)
    pub method_used: String,
    /// Post-fatigue pace (min/km)
    pub pace_min_per_km: f64,
    /// Fatigue multiplier applied to the base estimate
    pub fatigue_multiplier: f64,
    /// Post-fatigue segment duration (hours)
    pub time_hours: f64,
    /// Route time elapsed after this segment (hours)
    pub cumulative_time_hours: f64,
    /// Route distance covered after this segment (km)
    pub cumulative_distance_km: f64,
}

/// Route-level digest of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RouteSummary {
    /// Distance predicted at running pace (km)
    pub run_distance_km: f64,
    /// Distance predicted at walking pace (km)
    pub walk_distance_km: f64,
    /// Time predicted at running pace (hours)
    pub run_time_hours: f64,
    /// Time predicted at walking pace (hours)
    pub walk_time_hours: f64,
    /// Segments predicted as runs
    pub run_segments: usize,
    /// Segments predicted as walks
    pub walk_segments: usize,
    /// Share of distance predicted as running (percent)
    pub run_percent: f64,
    /// Time the route would take at the flat pace with no elevation (hours)
    pub flat_equivalent_hours: f64,
    /// Extra time attributable to elevation, relative to flat (percent)
    pub elevation_impact_percent: f64,
}

/// Complete prediction for a route
///
/// Serializable to a plain structured record; the primary value is
/// `total_time_hours` with the per-segment breakdown in `segments`.
/// `method_totals` is populated only when a method comparison was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Ordered per-segment results
    pub segments: Vec<SegmentResult>,
    /// Total route distance (km)
    pub total_distance_km: f64,
    /// Total ascent (m)
    pub total_ascent_m: f64,
    /// Total descent (m)
    pub total_descent_m: f64,
    /// Predicted total duration (hours)
    pub total_time_hours: f64,
    /// Total predicted hours per compared method; empty unless requested
    pub method_totals: BTreeMap<String, f64>,
    /// Route-level digest
    pub summary: RouteSummary,
}

impl CalculationResult {
    /// Predicted total duration in minutes
    #[must_use]
    pub fn total_time_minutes(&self) -> f64 {
        self.total_time_hours * 60.0
    }

    /// Total duration as "H:MM"
    #[must_use]
    pub fn formatted_total_time(&self) -> String {
        format_hours_hm(self.total_time_hours)
    }
}

/// Format a duration in hours as "H:MM"
#[must_use]
pub fn format_hours_hm(hours: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Safe: rounded and clamped non-negative
    let total_minutes = (hours * 60.0).round().max(0.0) as u64;
    format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
}
