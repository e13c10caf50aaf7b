// ABOUTME: Injected configuration for every engine component, with research-derived defaults
// ABOUTME: Components receive validated config at construction; nothing reads tunables ad hoc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Engine configuration.
//!
//! Every numeric policy the engine runs on lives in one of these structs and
//! is injected at construction. `Default` impls carry the research-derived
//! values from [`crate::constants`]; tests and callers with calibration data
//! of their own override fields and re-validate. [`EngineConfig::validate`]
//! checks the whole tree before a predictor accepts it.

use serde::{Deserialize, Serialize};

use crate::constants::{gap, geometry, limits, naismith, segmentation, tobler};
use crate::errors::{EngineError, EngineResult};
use crate::fatigue::FatigueConfig;
use crate::gradient::GradientBands;
use crate::models::ActivityKind;
use crate::threshold::ThresholdConfig;

/// Elevation smoothing and macro-segmentation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Centered moving-average window over elevation samples
    pub smoothing_window: usize,
    /// Gradient band around zero treated as flat (percent)
    pub flat_threshold_percent: f64,
    /// Minimum length before a direction reversal may close a segment (km)
    pub min_segment_km: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            smoothing_window: geometry::DEFAULT_SMOOTHING_WINDOW,
            flat_threshold_percent: segmentation::FLAT_THRESHOLD_PERCENT,
            min_segment_km: segmentation::MIN_SEGMENT_KM,
        }
    }
}

impl SegmenterConfig {
    /// Check the policy invariants
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` on a non-positive flat band or a
    /// negative minimum segment length.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.flat_threshold_percent.is_finite() || self.flat_threshold_percent <= 0.0 {
            return Err(EngineError::invalid_config(
                "segmenter.flat_threshold_percent",
                format!("must be positive, got {}", self.flat_threshold_percent),
            ));
        }
        if !self.min_segment_km.is_finite() || self.min_segment_km < 0.0 {
            return Err(EngineError::invalid_config(
                "segmenter.min_segment_km",
                format!("must be non-negative, got {}", self.min_segment_km),
            ));
        }
        Ok(())
    }
}

/// Naismith-rule parameters with Langmuir descent corrections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaismithConfig {
    /// Base walking speed on flat ground (km/h)
    pub base_speed_kmh: f64,
    /// Vertical ascent absorbed per extra hour (m)
    pub ascent_m_per_hour: f64,
    /// Langmuir correction minutes per descent block
    pub descent_correction_minutes: f64,
    /// Descent block the correction applies to (m)
    pub descent_block_m: f64,
    /// Descent angle where the gentle-descent speedup starts (degrees)
    pub gentle_descent_min_degrees: f64,
    /// Descent angle beyond which braking slows the walker (degrees)
    pub steep_descent_degrees: f64,
    /// Floor on the additive segment time (hours)
    pub min_time_hours: f64,
}

impl Default for NaismithConfig {
    fn default() -> Self {
        Self {
            base_speed_kmh: naismith::BASE_FLAT_SPEED_KMH,
            ascent_m_per_hour: naismith::ASCENT_METERS_PER_HOUR,
            descent_correction_minutes: naismith::DESCENT_CORRECTION_MINUTES,
            descent_block_m: naismith::DESCENT_CORRECTION_BLOCK_M,
            gentle_descent_min_degrees: naismith::GENTLE_DESCENT_MIN_DEGREES,
            steep_descent_degrees: naismith::STEEP_DESCENT_DEGREES,
            min_time_hours: limits::MIN_SEGMENT_TIME_HOURS,
        }
    }
}

impl NaismithConfig {
    /// Check the policy invariants
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` on non-positive rates or an
    /// inverted descent band.
    pub fn validate(&self) -> EngineResult<()> {
        for (parameter, value) in [
            ("naismith.base_speed_kmh", self.base_speed_kmh),
            ("naismith.ascent_m_per_hour", self.ascent_m_per_hour),
            ("naismith.descent_block_m", self.descent_block_m),
            ("naismith.min_time_hours", self.min_time_hours),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::invalid_config(
                    parameter,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        if self.gentle_descent_min_degrees >= self.steep_descent_degrees {
            return Err(EngineError::invalid_config(
                "naismith.gentle_descent_min_degrees",
                format!(
                    "gentle descent band [{}, {}] is inverted",
                    self.gentle_descent_min_degrees, self.steep_descent_degrees
                ),
            ));
        }
        Ok(())
    }
}

/// Tobler hiking-function parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToblerConfig {
    /// Peak speed coefficient (km/h)
    pub base_speed_kmh: f64,
    /// Exponential decay rate per unit slope offset
    pub decay_rate: f64,
    /// Slope of maximum speed, as a positive offset (0.05 puts it at -5%)
    pub slope_offset: f64,
}

impl Default for ToblerConfig {
    fn default() -> Self {
        Self {
            base_speed_kmh: tobler::BASE_SPEED_KMH,
            decay_rate: tobler::DECAY_RATE,
            slope_offset: tobler::OPTIMAL_SLOPE_OFFSET,
        }
    }
}

impl ToblerConfig {
    /// Check the policy invariants
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` on a non-positive base speed or a
    /// negative decay rate.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.base_speed_kmh.is_finite() || self.base_speed_kmh <= 0.0 {
            return Err(EngineError::invalid_config(
                "tobler.base_speed_kmh",
                format!("must be positive, got {}", self.base_speed_kmh),
            ));
        }
        if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
            return Err(EngineError::invalid_config(
                "tobler.decay_rate",
                format!("must be non-negative, got {}", self.decay_rate),
            ));
        }
        if !self.slope_offset.is_finite() {
            return Err(EngineError::invalid_config(
                "tobler.slope_offset",
                format!("must be finite, got {}", self.slope_offset),
            ));
        }
        Ok(())
    }
}

/// Grade-adjusted pace parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapConfig {
    /// Empirical (gradient_percent, pace_multiplier) breakpoints, sorted by
    /// gradient
    pub table: Vec<(f64, f64)>,
    /// Flat base pace when no profile supplies one (min/km)
    pub flat_pace_min_per_km: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            table: gap::EMPIRICAL_TABLE.to_vec(),
            flat_pace_min_per_km: gap::DEFAULT_FLAT_PACE_MIN_KM,
        }
    }
}

impl GapConfig {
    /// Check the table shape and base pace
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` on a malformed breakpoint table
    /// or a non-positive flat pace.
    pub fn validate(&self) -> EngineResult<()> {
        crate::pace::GapTable::new(self.table.clone())?;
        if !self.flat_pace_min_per_km.is_finite() || self.flat_pace_min_per_km <= 0.0 {
            return Err(EngineError::invalid_config(
                "gap.flat_pace_min_per_km",
                format!("must be positive, got {}", self.flat_pace_min_per_km),
            ));
        }
        Ok(())
    }
}

/// Profile-building policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationConfig {
    /// Minimum post-filter samples before a category pace is trusted
    pub min_samples_per_category: usize,
    /// Minimum usable splits before any category is populated
    pub min_splits_for_profile: usize,
    /// IQR fence multiplier for outlier exclusion
    pub iqr_multiplier: f64,
    /// Population uphill/flat pace ratio anchoring vertical ability at 1.0
    pub vertical_ability_baseline: f64,
    /// Sane running split pace range, splits outside are dropped (min/km)
    pub run_pace_bounds_min_per_km: (f64, f64),
    /// Sane hiking split pace range, splits outside are dropped (min/km)
    pub hike_pace_bounds_min_per_km: (f64, f64),
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        use crate::constants::personalization as p;
        Self {
            min_samples_per_category: p::MIN_SAMPLES_PER_CATEGORY,
            min_splits_for_profile: p::MIN_SPLITS_FOR_PROFILE,
            iqr_multiplier: p::IQR_MULTIPLIER,
            vertical_ability_baseline: p::VERTICAL_ABILITY_BASELINE,
            run_pace_bounds_min_per_km: p::RUN_PACE_BOUNDS_MIN_KM,
            hike_pace_bounds_min_per_km: p::HIKE_PACE_BOUNDS_MIN_KM,
        }
    }
}

impl PersonalizationConfig {
    /// Absolute sanity pace bounds for one activity kind (min/km)
    #[must_use]
    pub const fn pace_bounds(&self, kind: ActivityKind) -> (f64, f64) {
        match kind {
            ActivityKind::TrailRunning => self.run_pace_bounds_min_per_km,
            ActivityKind::Hiking => self.hike_pace_bounds_min_per_km,
        }
    }

    /// Check the policy invariants
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` on a negative IQR multiplier, a
    /// non-positive baseline, or inverted pace bounds.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(EngineError::invalid_config(
                "personalization.iqr_multiplier",
                format!("must be non-negative, got {}", self.iqr_multiplier),
            ));
        }
        if !self.vertical_ability_baseline.is_finite() || self.vertical_ability_baseline <= 0.0 {
            return Err(EngineError::invalid_config(
                "personalization.vertical_ability_baseline",
                format!("must be positive, got {}", self.vertical_ability_baseline),
            ));
        }
        for (parameter, (low, high)) in [
            (
                "personalization.run_pace_bounds_min_per_km",
                self.run_pace_bounds_min_per_km,
            ),
            (
                "personalization.hike_pace_bounds_min_per_km",
                self.hike_pace_bounds_min_per_km,
            ),
        ] {
            if !(low.is_finite() && high.is_finite()) || low <= 0.0 || low >= high {
                return Err(EngineError::invalid_config(
                    parameter,
                    format!("bounds ({low}, {high}) must be positive and ordered"),
                ));
            }
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Gradient category boundaries shared by profiles and predictions
    pub gradient_bands: GradientBands,
    /// Elevation smoothing and segmentation
    pub segmenter: SegmenterConfig,
    /// Naismith pace model
    pub naismith: NaismithConfig,
    /// Tobler pace model
    pub tobler: ToblerConfig,
    /// Grade-adjusted pace model
    pub gap: GapConfig,
    /// Profile building
    pub personalization: PersonalizationConfig,
    /// Run/walk threshold policy
    pub threshold: ThresholdConfig,
    /// Fatigue degradation policy
    pub fatigue: FatigueConfig,
}

impl EngineConfig {
    /// Validate the whole configuration tree
    ///
    /// # Errors
    ///
    /// Returns the first `EngineError::InvalidConfig` found in any section.
    pub fn validate(&self) -> EngineResult<()> {
        self.gradient_bands.validate()?;
        self.segmenter.validate()?;
        self.naismith.validate()?;
        self.tobler.validate()?;
        self.gap.validate()?;
        self.personalization.validate()?;
        self.threshold.validate()?;
        self.fatigue.validate()?;
        Ok(())
    }
}
