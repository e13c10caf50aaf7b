// ABOUTME: Naismith's additive time rule with Langmuir descent corrections
// ABOUTME: Flat base speed plus ascent penalty, descent discount or braking penalty by steepness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::NaismithConfig;
use crate::models::{MacroSegment, MethodResult};

/// Naismith-style pace calculator
///
/// Time is additive: the flat crossing time plus one hour per configured
/// block of ascent. Langmuir's corrections adjust for descent: gentle
/// descents (5-12 degrees by default) speed the walker up, steep descents
/// slow them down through braking. The profile multiplier scales the
/// resulting effective speed.
#[derive(Debug, Clone, PartialEq)]
pub struct NaismithCalculator {
    config: NaismithConfig,
}

impl NaismithCalculator {
    /// Build a calculator from validated configuration
    #[must_use]
    pub const fn new(config: NaismithConfig) -> Self {
        Self { config }
    }

    /// Estimate one segment at the given profile multiplier
    #[must_use]
    pub fn calculate_segment(&self, segment: &MacroSegment, profile_multiplier: f64) -> MethodResult {
        let cfg = &self.config;

        if segment.distance_km <= 0.0 {
            let speed_kmh = super::clamp_speed(cfg.base_speed_kmh * profile_multiplier);
            return self.result(speed_kmh, 0.0);
        }

        let flat_hours = segment.distance_km / cfg.base_speed_kmh;
        let ascent_hours = segment.elevation_gain_m / cfg.ascent_m_per_hour;
        let descent_hours = self.descent_correction_hours(segment);

        let base_hours = (flat_hours + ascent_hours + descent_hours).max(cfg.min_time_hours);
        let speed_kmh = super::clamp_speed(segment.distance_km / base_hours * profile_multiplier);

        self.result(speed_kmh, segment.distance_km / speed_kmh)
    }

    fn result(&self, speed_kmh: f64, time_hours: f64) -> MethodResult {
        MethodResult {
            method: self.name().to_owned(),
            speed_kmh,
            pace_min_per_km: super::pace_from_speed(speed_kmh),
            time_hours,
            formula: self.description(),
        }
    }

    /// Langmuir correction in hours, negative on gentle descents
    ///
    /// Applies only to the descent component of a segment; ascent within the
    /// same segment is already charged by the ascent rate.
    fn descent_correction_hours(&self, segment: &MacroSegment) -> f64 {
        let cfg = &self.config;
        if segment.elevation_loss_m <= 0.0 {
            return 0.0;
        }

        let descent_angle = segment.gradient_degrees().abs();
        if descent_angle < cfg.gentle_descent_min_degrees || segment.gradient_percent() >= 0.0 {
            // Shallow downhill walks at flat pace
            return 0.0;
        }

        let blocks = segment.elevation_loss_m / cfg.descent_block_m;
        let correction = blocks * cfg.descent_correction_minutes / 60.0;

        if descent_angle > cfg.steep_descent_degrees {
            correction
        } else {
            -correction
        }
    }

    /// Model name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "naismith"
    }

    /// Human-readable description of the rule
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "Naismith-Langmuir ({} km/h + 1h per {}m ascent, descent corrected)",
            self.config.base_speed_kmh, self.config.ascent_m_per_hour
        )
    }

    /// The formula as a string
    #[must_use]
    pub const fn formula(&self) -> &'static str {
        "t = d/v_flat + gain/rate +/- Langmuir descent correction"
    }
}

impl Default for NaismithCalculator {
    fn default() -> Self {
        Self::new(NaismithConfig::default())
    }
}
