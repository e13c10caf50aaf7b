// ABOUTME: Pace model abstraction enabling pluggable per-segment time estimation methods
// ABOUTME: Provides enum-based dispatch across Naismith, Tobler, GAP, and personalized calculators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Pace Model Selection Module
//!
//! This module provides a type-safe, enum-based system for selecting between
//! the per-segment pace estimation methods. Every method answers the same
//! question (how long does this segment take at a given fitness multiplier)
//! so they are interchangeable behind [`PaceModel`] and comparable
//! side-by-side.
//!
//! # Design Philosophy
//!
//! - **Type Safety**: Models are enum variants, not strings or booleans
//! - **Performance**: Enum dispatch, no vtable for built-in models
//! - **Uniform contract**: every model yields a [`MethodResult`] with speed,
//!   pace, time, and the formula it applied
//!
//! # Example
//!
//! ```rust,no_run
//! use trailcast::models::{MacroSegment, SegmentType};
//! use trailcast::pace::{GapMode, PaceModel};
//!
//! # fn main() -> Result<(), trailcast::errors::EngineError> {
//! let segment = MacroSegment {
//!     index: 0,
//!     segment_type: SegmentType::Ascent,
//!     distance_km: 2.0,
//!     elevation_gain_m: 150.0,
//!     elevation_loss_m: 0.0,
//!     start_elevation_m: 800.0,
//!     end_elevation_m: 950.0,
//! };
//! let model = PaceModel::gap(GapMode::Empirical);
//! let estimate = model.calculate_segment(&segment, 1.0)?;
//! println!("{:.1} min/km", estimate.pace_min_per_km);
//! # Ok(())
//! # }
//! ```

pub mod gap;
pub mod naismith;
pub mod personalized;
pub mod tobler;

// Re-export calculator types
pub use gap::{GapAdjustment, GapCalculator, GapMode, GapTable};
pub use naismith::NaismithCalculator;
pub use personalized::{PaceSelection, PersonalizedCalculator};
pub use tobler::ToblerCalculator;

use std::sync::Arc;

use tracing::warn;

use crate::constants::limits::MIN_SPEED_KMH;
use crate::errors::{EngineError, EngineResult};
use crate::models::{EffortLevel, MacroSegment, MethodResult, PerformanceProfile};

/// Pace estimation method selection
#[derive(Debug, Clone)]
pub enum PaceModel {
    /// Naismith's rule with Langmuir descent corrections
    Naismith(NaismithCalculator),
    /// Tobler's exponential hiking function
    Tobler(ToblerCalculator),
    /// Grade-adjusted pace, empirical or metabolic-hybrid
    Gap(GapCalculator),
    /// Profile-backed paces with total generic fallback
    Personalized(PersonalizedCalculator),
}

impl PaceModel {
    /// Default-configured Naismith model
    #[must_use]
    pub fn naismith() -> Self {
        Self::Naismith(NaismithCalculator::default())
    }

    /// Default-configured Tobler model
    #[must_use]
    pub fn tobler() -> Self {
        Self::Tobler(ToblerCalculator::default())
    }

    /// Default-configured GAP model in the given mode
    #[must_use]
    pub fn gap(mode: GapMode) -> Self {
        Self::Gap(GapCalculator::with_mode(mode))
    }

    /// Default-configured personalized model over a profile
    #[must_use]
    pub fn personalized(profile: Arc<PerformanceProfile>, effort: EffortLevel) -> Self {
        Self::Personalized(PersonalizedCalculator::with_defaults(profile, effort))
    }

    /// Estimate one segment
    ///
    /// `profile_multiplier` scales the model's speed; 1.0 means the
    /// population average, above 1.0 is faster.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the multiplier is not a
    /// positive finite number.
    pub fn calculate_segment(
        &self,
        segment: &MacroSegment,
        profile_multiplier: f64,
    ) -> EngineResult<MethodResult> {
        if !profile_multiplier.is_finite() || profile_multiplier <= 0.0 {
            return Err(EngineError::invalid_config(
                "profile_multiplier",
                format!("must be positive and finite, got {profile_multiplier}"),
            ));
        }
        Ok(match self {
            Self::Naismith(calc) => calc.calculate_segment(segment, profile_multiplier),
            Self::Tobler(calc) => calc.calculate_segment(segment, profile_multiplier),
            Self::Gap(calc) => calc.calculate_segment(segment, profile_multiplier),
            Self::Personalized(calc) => calc.calculate_segment(segment, profile_multiplier),
        })
    }

    /// Stable identifier used in comparisons and per-method totals
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Naismith(calc) => calc.name(),
            Self::Tobler(calc) => calc.name(),
            Self::Gap(calc) => calc.name(),
            Self::Personalized(calc) => calc.name(),
        }
    }

    /// Human-readable summary of the formula behind the model
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Naismith(calc) => calc.description(),
            Self::Tobler(calc) => calc.description(),
            Self::Gap(calc) => calc.description(),
            Self::Personalized(calc) => calc.description(),
        }
    }

    /// The formula as a string
    #[must_use]
    pub const fn formula(&self) -> &'static str {
        match self {
            Self::Naismith(calc) => calc.formula(),
            Self::Tobler(calc) => calc.formula(),
            Self::Gap(calc) => calc.formula(),
            Self::Personalized(calc) => calc.formula(),
        }
    }
}

/// Floor a computed speed at the process-wide minimum
///
/// Upstream bugs or absurd inputs can drive a model's speed to zero or a
/// non-finite value; flooring keeps every downstream division well-defined.
/// A clamp is a data-quality diagnostic, never an error.
pub(crate) fn clamp_speed(speed_kmh: f64) -> f64 {
    if !speed_kmh.is_finite() || speed_kmh < MIN_SPEED_KMH {
        warn!(speed_kmh, floor_kmh = MIN_SPEED_KMH, "computed speed clamped to floor");
        return MIN_SPEED_KMH;
    }
    speed_kmh
}

/// Pace in min/km from a speed already floored by [`clamp_speed`]
pub(crate) fn pace_from_speed(speed_kmh: f64) -> f64 {
    60.0 / speed_kmh
}
