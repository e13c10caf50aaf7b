// ABOUTME: Tobler hiking function for walking pace as a function of slope
// ABOUTME: Exponential speed decay away from the optimum gentle-downhill gradient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Tobler's hiking function.
//!
//! `speed = base * exp(-decay * |slope + offset|)` with slope as a
//! fraction (gradient percent / 100). The offset places the maximum
//! speed on a gentle downhill near -5% rather than on flat ground;
//! flat walking comes out near 5.04 km/h with the default parameters.
//!
//! Reference: Tobler, W. (1993), "Three presentations on geographical
//! analysis and modeling".

use crate::config::ToblerConfig;
use crate::models::{MacroSegment, MethodResult};

/// Walking-pace estimator backed by Tobler's hiking function.
#[derive(Debug, Clone)]
pub struct ToblerCalculator {
    config: ToblerConfig,
}

impl ToblerCalculator {
    /// Create a calculator with explicit parameters.
    #[must_use]
    pub const fn new(config: ToblerConfig) -> Self {
        Self { config }
    }

    /// Walking speed in km/h for a slope given as a fraction (rise/run).
    #[must_use]
    pub fn speed_for_slope(&self, slope: f64) -> f64 {
        let cfg = &self.config;
        cfg.base_speed_kmh * (-cfg.decay_rate * (slope + cfg.slope_offset).abs()).exp()
    }

    /// Estimate one segment at the given profile multiplier
    #[must_use]
    pub fn calculate_segment(&self, segment: &MacroSegment, profile_multiplier: f64) -> MethodResult {
        let slope = segment.gradient_percent() / 100.0;
        let speed_kmh = super::clamp_speed(self.speed_for_slope(slope) * profile_multiplier);

        let time_hours = if segment.distance_km > 0.0 {
            segment.distance_km / speed_kmh
        } else {
            0.0
        };

        MethodResult {
            method: self.name().to_owned(),
            speed_kmh,
            pace_min_per_km: super::pace_from_speed(speed_kmh),
            time_hours,
            formula: self.description(),
        }
    }

    /// Stable identifier used in comparisons and per-method totals.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "tobler"
    }

    /// Human-readable formula summary.
    #[must_use]
    pub fn description(&self) -> String {
        let cfg = &self.config;
        format!(
            "Tobler: speed = {:.1} * exp(-{:.1} * |slope + {:.2}|) km/h",
            cfg.base_speed_kmh, cfg.decay_rate, cfg.slope_offset
        )
    }

    /// The formula as a string
    #[must_use]
    pub const fn formula(&self) -> &'static str {
        "v = base x exp(-decay x |slope + offset|)"
    }
}

impl Default for ToblerCalculator {
    fn default() -> Self {
        Self::new(ToblerConfig::default())
    }
}
