// ABOUTME: Grade-adjusted pace model with empirical-table and metabolic-hybrid modes
// ABOUTME: Maps segment gradient to a pace multiplier applied to the athlete's flat base pace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Grade-adjusted pace (GAP).
//!
//! Two interchangeable adjustment modes share one calculator:
//!
//! - **Empirical**: a breakpoint table of pace multipliers fitted to
//!   large-scale athlete split data, linearly interpolated and clamped at
//!   the extremes.
//! - **Hybrid**: climbs use the Minetti metabolic cost polynomial mapped
//!   through a sub-linear exponent; descents fall back to the empirical
//!   table because metabolic models are unreliable for downhill running.
//!   The two modes therefore agree exactly on descents and diverge on
//!   climbs.
//!
//! References: Strava GAP model (2017); Minetti et al. (2002), J Appl
//! Physiol 93(3).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::GapConfig;
use crate::constants::gap as defaults;
use crate::errors::{EngineError, EngineResult};
use crate::models::{MacroSegment, MethodResult};

/// Adjustment strategy for climbs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapMode {
    /// Breakpoint table everywhere
    #[default]
    Empirical,
    /// Minetti metabolic cost uphill, empirical table downhill
    Hybrid,
}

impl GapMode {
    /// Stable snake_case name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Empirical => "empirical",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for GapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GapMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empirical" => Ok(Self::Empirical),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(EngineError::invalid_config(
                "gap.mode",
                format!("unknown GAP mode '{other}', expected 'empirical' or 'hybrid'"),
            )),
        }
    }
}

/// One gradient's pace adjustment, with provenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapAdjustment {
    /// Gradient the adjustment was computed for (percent)
    pub gradient_percent: f64,
    /// Multiplier on the flat base pace (> 1 is slower than flat)
    pub pace_multiplier: f64,
    /// Metabolic cost relative to level running, present only on hybrid climbs
    pub energy_cost_ratio: Option<f64>,
    /// Mode that produced the multiplier
    pub mode: GapMode,
}

/// Validated empirical breakpoint table
///
/// Breakpoints are (gradient_percent, pace_multiplier) pairs sorted by
/// gradient. Lookups interpolate linearly between neighbors and clamp to the
/// end multipliers outside the covered range, so any real gradient resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapTable {
    breakpoints: Vec<(f64, f64)>,
}

impl GapTable {
    /// Build a table from breakpoints, validating shape
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when fewer than two breakpoints
    /// are given, gradients are not strictly increasing, or any value is
    /// non-finite or a multiplier is not positive.
    pub fn new(breakpoints: Vec<(f64, f64)>) -> EngineResult<Self> {
        if breakpoints.len() < 2 {
            return Err(EngineError::invalid_config(
                "gap.table",
                format!("need at least 2 breakpoints, got {}", breakpoints.len()),
            ));
        }
        for (gradient, multiplier) in &breakpoints {
            if !gradient.is_finite() || !multiplier.is_finite() || *multiplier <= 0.0 {
                return Err(EngineError::invalid_config(
                    "gap.table",
                    format!("breakpoint ({gradient}, {multiplier}) is not finite and positive"),
                ));
            }
        }
        if breakpoints.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
            return Err(EngineError::invalid_config(
                "gap.table",
                "breakpoint gradients must be strictly increasing",
            ));
        }
        Ok(Self { breakpoints })
    }

    /// Pace multiplier for a gradient; interpolated inside the table,
    /// clamped to the end multipliers outside it
    #[must_use]
    pub fn multiplier(&self, gradient_percent: f64) -> f64 {
        let (first_gradient, first_multiplier) = self.breakpoints[0];
        if gradient_percent <= first_gradient {
            return first_multiplier;
        }
        let (last_gradient, last_multiplier) = self.breakpoints[self.breakpoints.len() - 1];
        if gradient_percent >= last_gradient {
            return last_multiplier;
        }
        for pair in self.breakpoints.windows(2) {
            let (low_gradient, low_multiplier) = pair[0];
            let (high_gradient, high_multiplier) = pair[1];
            if gradient_percent <= high_gradient {
                let t = (gradient_percent - low_gradient) / (high_gradient - low_gradient);
                return (high_multiplier - low_multiplier).mul_add(t, low_multiplier);
            }
        }
        last_multiplier
    }

    /// Gradient range covered by the breakpoints (percent)
    #[must_use]
    pub fn coverage(&self) -> (f64, f64) {
        (
            self.breakpoints[0].0,
            self.breakpoints[self.breakpoints.len() - 1].0,
        )
    }
}

impl Default for GapTable {
    fn default() -> Self {
        Self {
            breakpoints: defaults::EMPIRICAL_TABLE.to_vec(),
        }
    }
}

/// Grade-adjusted pace calculator
#[derive(Debug, Clone)]
pub struct GapCalculator {
    table: GapTable,
    flat_pace_min_per_km: f64,
    mode: GapMode,
}

impl GapCalculator {
    /// Build a calculator from injected configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the breakpoint table is
    /// malformed or the flat base pace is not positive.
    pub fn new(config: GapConfig, mode: GapMode) -> EngineResult<Self> {
        if !config.flat_pace_min_per_km.is_finite() || config.flat_pace_min_per_km <= 0.0 {
            return Err(EngineError::invalid_config(
                "gap.flat_pace_min_per_km",
                format!("flat pace must be positive, got {}", config.flat_pace_min_per_km),
            ));
        }
        Ok(Self {
            table: GapTable::new(config.table)?,
            flat_pace_min_per_km: config.flat_pace_min_per_km,
            mode,
        })
    }

    /// Default-configured calculator in the given mode
    #[must_use]
    pub fn with_mode(mode: GapMode) -> Self {
        Self {
            table: GapTable::default(),
            flat_pace_min_per_km: defaults::DEFAULT_FLAT_PACE_MIN_KM,
            mode,
        }
    }

    /// Mode this calculator was built with
    #[must_use]
    pub const fn mode(&self) -> GapMode {
        self.mode
    }

    /// Pace adjustment for a gradient in this calculator's mode
    #[must_use]
    pub fn adjustment(&self, gradient_percent: f64) -> GapAdjustment {
        self.adjustment_in_mode(gradient_percent, self.mode)
    }

    /// Pace adjustment for a gradient in an explicit mode
    #[must_use]
    pub fn adjustment_in_mode(&self, gradient_percent: f64, mode: GapMode) -> GapAdjustment {
        // Hybrid only replaces the table on climbs; descents share the
        // empirical multipliers so both modes agree there.
        match mode {
            GapMode::Hybrid if gradient_percent > 0.0 => {
                let slope = gradient_percent / 100.0;
                let cost_ratio = minetti_cost(slope) / defaults::FLAT_COST_J_PER_KG_M;
                let pace_multiplier = cost_ratio
                    .powf(defaults::PACE_ADJUSTMENT_EXPONENT)
                    .clamp(defaults::ADJUSTMENT_MIN, defaults::ADJUSTMENT_MAX);
                GapAdjustment {
                    gradient_percent,
                    pace_multiplier,
                    energy_cost_ratio: Some(cost_ratio),
                    mode,
                }
            }
            GapMode::Hybrid | GapMode::Empirical => GapAdjustment {
                gradient_percent,
                pace_multiplier: self
                    .table
                    .multiplier(gradient_percent)
                    .clamp(defaults::ADJUSTMENT_MIN, defaults::ADJUSTMENT_MAX),
                energy_cost_ratio: None,
                mode,
            },
        }
    }

    /// Both modes' adjustments for one gradient, for side-by-side reporting
    #[must_use]
    pub fn compare_modes(&self, gradient_percent: f64) -> [GapAdjustment; 2] {
        [
            self.adjustment_in_mode(gradient_percent, GapMode::Empirical),
            self.adjustment_in_mode(gradient_percent, GapMode::Hybrid),
        ]
    }

    /// Grade-adjusted pace for a gradient from an explicit flat base pace
    #[must_use]
    pub fn pace_for_gradient(&self, gradient_percent: f64, flat_pace_min_per_km: f64) -> f64 {
        flat_pace_min_per_km * self.adjustment(gradient_percent).pace_multiplier
    }

    /// Estimate one segment from an explicit flat base pace
    #[must_use]
    pub fn calculate_with_flat_pace(
        &self,
        segment: &MacroSegment,
        flat_pace_min_per_km: f64,
        profile_multiplier: f64,
    ) -> MethodResult {
        let adjusted_pace = self.pace_for_gradient(segment.gradient_percent(), flat_pace_min_per_km);
        let speed_kmh = super::clamp_speed(60.0 / adjusted_pace * profile_multiplier);
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

    /// Estimate one segment at the given profile multiplier
    #[must_use]
    pub fn calculate_segment(&self, segment: &MacroSegment, profile_multiplier: f64) -> MethodResult {
        self.calculate_with_flat_pace(segment, self.flat_pace_min_per_km, profile_multiplier)
    }

    /// Stable identifier used in comparisons and per-method totals.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.mode {
            GapMode::Empirical => "gap_empirical",
            GapMode::Hybrid => "gap_hybrid",
        }
    }

    /// Human-readable formula summary.
    #[must_use]
    pub fn description(&self) -> String {
        match self.mode {
            GapMode::Empirical => format!(
                "GAP empirical: pace = flat_pace * table(gradient), {} breakpoints",
                self.table.breakpoints.len()
            ),
            GapMode::Hybrid => {
                "GAP hybrid: Minetti cost ratio^0.75 uphill, empirical table downhill".to_owned()
            }
        }
    }

    /// The formula as a string
    #[must_use]
    pub const fn formula(&self) -> &'static str {
        match self.mode {
            GapMode::Empirical => "pace = flat_pace x table(gradient)",
            GapMode::Hybrid => "pace = flat_pace x (C(i)/3.6)^0.75 uphill, table downhill",
        }
    }
}

impl Default for GapCalculator {
    fn default() -> Self {
        Self::with_mode(GapMode::Empirical)
    }
}

/// Minetti cost of transport C(i) in J/kg/m for slope fraction `i`,
/// evaluated by Horner's rule over the degree-5 polynomial
fn minetti_cost(slope: f64) -> f64 {
    let [c5, c4, c3, c2, c1, c0] = defaults::MINETTI_COEFFICIENTS;
    c5.mul_add(slope, c4)
        .mul_add(slope, c3)
        .mul_add(slope, c2)
        .mul_add(slope, c1)
        .mul_add(slope, c0)
}
