// ABOUTME: Fatigue degradation model slowing predicted paces as effort accumulates
// ABOUTME: Linear or quadratic curve past an onset, downhill penalty, ultra-distance escalation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Runner fatigue model.
//!
//! Paces hold steady for the first hours of an effort, then degrade: the
//! multiplier is 1.0 up to `threshold_hours`, then follows a linear or
//! quadratic curve in the hours past onset. Tired descents degrade hardest
//! (quadriceps braking damage), so downhill segments receive an extra
//! multiplier. Past each ultra-distance boundary the degradation excess is
//! escalated, steepening the curve for very long efforts.
//!
//! The model is a pure function of elapsed hours, elapsed kilometers, and
//! segment gradient; the orchestrator feeds it cumulative state as it
//! walks the route.
//!
//! Example multipliers (default config, flat gradient):
//! 2 h → 1.00, 4 h → 1.13, 6 h → 1.33, 10 h → 1.91; downhill at 6 h → 2.0.
//!
//! Reference: UTMB pacing study (PMC7578994).

use serde::{Deserialize, Serialize};

use crate::constants::fatigue as defaults;
use crate::errors::{EngineError, EngineResult};

/// Shape of the degradation curve past the fatigue onset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum DegradationCurve {
    /// Constant slowdown per hour past onset
    Linear {
        /// Degradation per hour past onset
        rate: f64,
    },
    /// Accelerating slowdown, the default for trail running
    Quadratic {
        /// Degradation per hour past onset
        linear_rate: f64,
        /// Degradation per squared hour past onset
        quadratic_rate: f64,
    },
}

impl DegradationCurve {
    /// Degradation excess for `extra_hours` past the onset (≥ 0)
    #[must_use]
    pub fn degradation(&self, extra_hours: f64) -> f64 {
        match self {
            Self::Linear { rate } => rate * extra_hours,
            Self::Quadratic {
                linear_rate,
                quadratic_rate,
            } => (quadratic_rate * extra_hours).mul_add(extra_hours, linear_rate * extra_hours),
        }
    }

    /// Stable snake_case name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::Quadratic { .. } => "quadratic",
        }
    }

    /// Check that every rate is finite and non-negative
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` on a negative or non-finite rate.
    pub fn validate(&self) -> EngineResult<()> {
        let sane = |rate: f64| rate.is_finite() && rate >= 0.0;
        let valid = match self {
            Self::Linear { rate } => sane(*rate),
            Self::Quadratic {
                linear_rate,
                quadratic_rate,
            } => sane(*linear_rate) && sane(*quadratic_rate),
        };
        if !valid {
            return Err(EngineError::invalid_config(
                "fatigue.curve",
                format!("{} curve rates must be finite and non-negative", self.name()),
            ));
        }
        Ok(())
    }
}

impl Default for DegradationCurve {
    fn default() -> Self {
        Self::Quadratic {
            linear_rate: defaults::LINEAR_RATE,
            quadratic_rate: defaults::QUADRATIC_RATE,
        }
    }
}

/// One ultra-distance boundary where the degradation excess escalates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UltraThreshold {
    /// Elapsed distance where the escalation starts applying (km)
    pub distance_km: f64,
    /// Factor multiplying the degradation excess once crossed (≥ 1)
    pub escalation: f64,
}

/// Fatigue model policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueConfig {
    /// Disabled models return 1.0 everywhere
    pub enabled: bool,
    /// Hours of effort before degradation begins
    pub threshold_hours: f64,
    /// Degradation curve past onset
    pub curve: DegradationCurve,
    /// Extra multiplier on fatigued descents
    pub downhill_multiplier: f64,
    /// Gradient below which a segment counts as a fatiguing descent (percent)
    pub downhill_gradient_cutoff: f64,
    /// Escalation boundaries for very long efforts; the highest crossed
    /// boundary's factor applies
    pub ultra_thresholds: Vec<UltraThreshold>,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_hours: defaults::THRESHOLD_HOURS,
            curve: DegradationCurve::default(),
            downhill_multiplier: defaults::DOWNHILL_MULTIPLIER,
            downhill_gradient_cutoff: defaults::DOWNHILL_GRADIENT_CUTOFF,
            ultra_thresholds: vec![
                UltraThreshold {
                    distance_km: defaults::ULTRA_FIRST_KM,
                    escalation: defaults::ULTRA_FIRST_ESCALATION,
                },
                UltraThreshold {
                    distance_km: defaults::ULTRA_SECOND_KM,
                    escalation: defaults::ULTRA_SECOND_ESCALATION,
                },
            ],
        }
    }
}

impl FatigueConfig {
    /// Check the policy invariants
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the onset is negative, the
    /// downhill policy cannot slow anything down, or an ultra boundary is
    /// degenerate.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.threshold_hours.is_finite() || self.threshold_hours < 0.0 {
            return Err(EngineError::invalid_config(
                "fatigue.threshold_hours",
                format!("must be non-negative, got {}", self.threshold_hours),
            ));
        }
        self.curve.validate()?;
        if !self.downhill_multiplier.is_finite() || self.downhill_multiplier < 1.0 {
            return Err(EngineError::invalid_config(
                "fatigue.downhill_multiplier",
                format!("must be at least 1.0, got {}", self.downhill_multiplier),
            ));
        }
        if !self.downhill_gradient_cutoff.is_finite() || self.downhill_gradient_cutoff >= 0.0 {
            return Err(EngineError::invalid_config(
                "fatigue.downhill_gradient_cutoff",
                format!("must be a negative gradient, got {}", self.downhill_gradient_cutoff),
            ));
        }
        for threshold in &self.ultra_thresholds {
            if !threshold.distance_km.is_finite() || threshold.distance_km <= 0.0 {
                return Err(EngineError::invalid_config(
                    "fatigue.ultra_thresholds",
                    format!("boundary distance must be positive, got {}", threshold.distance_km),
                ));
            }
            if !threshold.escalation.is_finite() || threshold.escalation < 1.0 {
                return Err(EngineError::invalid_config(
                    "fatigue.ultra_thresholds",
                    format!("escalation must be at least 1.0, got {}", threshold.escalation),
                ));
            }
        }
        Ok(())
    }
}

/// Fatigue degradation service
#[derive(Debug, Clone, Default)]
pub struct FatigueModel {
    config: FatigueConfig,
}

impl FatigueModel {
    /// Build the model after validating its policy
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the config violates an
    /// invariant (see [`FatigueConfig::validate`]).
    pub fn new(config: FatigueConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// A model that returns 1.0 everywhere
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            config: FatigueConfig {
                enabled: false,
                ..FatigueConfig::default()
            },
        }
    }

    /// Policy this model runs under
    #[must_use]
    pub const fn config(&self) -> &FatigueConfig {
        &self.config
    }

    /// Whether the model degrades anything at all
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Degradation multiplier at a point in the effort (≥ 1.0)
    ///
    /// Non-decreasing in elapsed hours and elapsed kilometers; 1.0 at or
    /// below the onset.
    #[must_use]
    pub fn multiplier(&self, elapsed_hours: f64, elapsed_km: f64, gradient_percent: f64) -> f64 {
        if !self.config.enabled || elapsed_hours <= self.config.threshold_hours {
            return 1.0;
        }

        let extra = elapsed_hours - self.config.threshold_hours;
        let excess = self.config.curve.degradation(extra) * self.escalation(elapsed_km);

        let mut multiplier = 1.0 + excess;
        if gradient_percent < self.config.downhill_gradient_cutoff {
            multiplier *= self.config.downhill_multiplier;
        }
        multiplier
    }

    /// Apply fatigue to one segment's base time, evaluating the curve at the
    /// segment's temporal midpoint
    ///
    /// Returns `(adjusted_time_hours, multiplier)`.
    #[must_use]
    pub fn apply(
        &self,
        base_time_hours: f64,
        elapsed_hours: f64,
        elapsed_km: f64,
        gradient_percent: f64,
    ) -> (f64, f64) {
        if !self.config.enabled {
            return (base_time_hours, 1.0);
        }
        // midpoint evaluation: a long segment straddling the onset is
        // degraded by its average fatigue state, not its entry state
        let midpoint_hours = base_time_hours.mul_add(0.5, elapsed_hours);
        let multiplier = self.multiplier(midpoint_hours, elapsed_km, gradient_percent);
        (base_time_hours * multiplier, multiplier)
    }

    /// Highest escalation factor among crossed ultra boundaries
    fn escalation(&self, elapsed_km: f64) -> f64 {
        self.config
            .ultra_thresholds
            .iter()
            .filter(|threshold| elapsed_km >= threshold.distance_km)
            .map(|threshold| threshold.escalation)
            .fold(1.0, f64::max)
    }
}
