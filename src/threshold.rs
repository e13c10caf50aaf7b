// ABOUTME: Run/walk transition policy driven by gradient, fatigue, and route distance
// ABOUTME: Decides movement mode per segment, classifies historical splits, detects personal cutoffs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Hike/run threshold service.
//!
//! On steep climbs running stops paying off and strong runners switch to
//! power-hiking; on very steep descents braking forces a walk. The cutoff
//! is a gradient percentage: static by default, optionally lowered as the
//! effort accumulates hours and on ultra distances. The same thresholds
//! classify historical splits so learned running profiles are not polluted
//! by walking samples, and a personal cutoff can be detected from the pace
//! discontinuity in an athlete's uphill splits.
//!
//! Reference: University of Colorado Boulder walking-efficiency studies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::threshold as defaults;
use crate::errors::{EngineError, EngineResult};
use crate::models::{MacroSegment, MovementMode, SplitSample};

/// Decision confidence when the gradient clears the cutoff by a wide margin
const HIGH_CONFIDENCE: f64 = 0.9;
/// Decision confidence inside the transition zone near the cutoff
const NEAR_CUTOFF_CONFIDENCE: f64 = 0.7;
/// Decision confidence on technical-descent walks
const TECHNICAL_DESCENT_CONFIDENCE: f64 = 0.8;
/// Width of the transition zone above the cutoff (percent gradient)
const NEAR_CUTOFF_MARGIN_PERCENT: f64 = 5.0;

/// Run/walk threshold policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Uphill gradient at/above which the athlete walks (percent)
    pub uphill_threshold_percent: f64,
    /// Downhill gradient at/below which the descent is walked (percent)
    pub downhill_threshold_percent: f64,
    /// Floor for detected, overridden, or dynamically lowered cutoffs (percent)
    pub min_threshold_percent: f64,
    /// Ceiling for detected or overridden cutoffs (percent)
    pub max_threshold_percent: f64,
    /// Lower the uphill cutoff as hours and kilometers accumulate
    pub dynamic: bool,
    /// Pace slower than this classifies a historical split as walking (min/km)
    pub walk_pace_min_per_km: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            uphill_threshold_percent: defaults::DEFAULT_UPHILL_PERCENT,
            downhill_threshold_percent: defaults::DEFAULT_DOWNHILL_PERCENT,
            min_threshold_percent: defaults::MIN_PERCENT,
            max_threshold_percent: defaults::MAX_PERCENT,
            dynamic: false,
            walk_pace_min_per_km: defaults::WALK_PACE_MIN_KM,
        }
    }
}

impl ThresholdConfig {
    /// Check the policy invariants
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when a threshold has the wrong
    /// sign, the clamp bounds are inverted, or the walk pace is not positive.
    pub fn validate(&self) -> EngineResult<()> {
        if self.uphill_threshold_percent <= 0.0 || !self.uphill_threshold_percent.is_finite() {
            return Err(EngineError::invalid_config(
                "threshold.uphill_threshold_percent",
                format!("must be a positive gradient, got {}", self.uphill_threshold_percent),
            ));
        }
        if self.downhill_threshold_percent >= 0.0 || !self.downhill_threshold_percent.is_finite() {
            return Err(EngineError::invalid_config(
                "threshold.downhill_threshold_percent",
                format!("must be a negative gradient, got {}", self.downhill_threshold_percent),
            ));
        }
        if self.min_threshold_percent >= self.max_threshold_percent {
            return Err(EngineError::invalid_config(
                "threshold.min_threshold_percent",
                format!(
                    "clamp bounds inverted: [{}, {}]",
                    self.min_threshold_percent, self.max_threshold_percent
                ),
            ));
        }
        if self.walk_pace_min_per_km <= 0.0 || !self.walk_pace_min_per_km.is_finite() {
            return Err(EngineError::invalid_config(
                "threshold.walk_pace_min_per_km",
                format!("must be a positive pace, got {}", self.walk_pace_min_per_km),
            ));
        }
        Ok(())
    }
}

/// One segment's movement-mode decision, with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HikeRunDecision {
    /// Chosen movement mode
    pub mode: MovementMode,
    /// Cutoff the gradient was compared against (percent)
    pub threshold_used: f64,
    /// Human-readable justification
    pub reason: String,
    /// Confidence in [0, 1]; lowest inside the transition zone
    pub confidence: f64,
}

/// Per-mode aggregate over a route's decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSummary {
    /// Segments decided as running
    pub run_segments: usize,
    /// Segments decided as walking
    pub walk_segments: usize,
    /// Distance decided as running (km)
    pub run_distance_km: f64,
    /// Distance decided as walking (km)
    pub walk_distance_km: f64,
    /// Running share of the total distance (percent)
    pub run_percent: f64,
}

/// Hike/run decision service
#[derive(Debug, Clone)]
pub struct HikeRunThreshold {
    config: ThresholdConfig,
}

impl HikeRunThreshold {
    /// Build the service after validating its policy
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the config violates an
    /// invariant (see [`ThresholdConfig::validate`]).
    pub fn new(config: ThresholdConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build the service with a replacement uphill cutoff (a detected
    /// personal threshold or an explicit override), clamped into the
    /// configured bounds
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the base config is invalid
    /// or the replacement cutoff is not finite.
    pub fn with_uphill_cutoff(mut config: ThresholdConfig, cutoff_percent: f64) -> EngineResult<Self> {
        if !cutoff_percent.is_finite() {
            return Err(EngineError::invalid_config(
                "threshold.uphill_threshold_percent",
                format!("cutoff override must be finite, got {cutoff_percent}"),
            ));
        }
        let clamped =
            cutoff_percent.clamp(config.min_threshold_percent, config.max_threshold_percent);
        if (clamped - cutoff_percent).abs() > f64::EPSILON {
            debug!(
                requested = cutoff_percent,
                clamped, "uphill cutoff clamped into configured bounds"
            );
        }
        config.uphill_threshold_percent = clamped;
        Self::new(config)
    }

    /// Policy this service runs under
    #[must_use]
    pub const fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Uphill cutoff after fatigue and ultra-distance reductions (percent)
    ///
    /// Static policies ignore both inputs. Dynamic policies lower the cutoff
    /// as hours pass the fatigue onset and as the route runs past the ultra
    /// onset, floored at `min_threshold_percent`: late in a long day, climbs
    /// that were runnable at the start no longer are.
    #[must_use]
    pub fn effective_threshold(&self, elapsed_hours: f64, route_distance_km: f64) -> f64 {
        if !self.config.dynamic {
            return self.config.uphill_threshold_percent;
        }

        let mut cutoff = self.config.uphill_threshold_percent;
        if elapsed_hours > defaults::FATIGUE_ONSET_HOURS {
            let reduction = (elapsed_hours - defaults::FATIGUE_ONSET_HOURS)
                * defaults::FATIGUE_REDUCTION_PER_HOUR;
            cutoff -= reduction.min(defaults::MAX_FATIGUE_REDUCTION);
        }
        if route_distance_km > defaults::ULTRA_ONSET_KM {
            let reduction =
                (route_distance_km - defaults::ULTRA_ONSET_KM) / defaults::ULTRA_REDUCTION_DIVISOR;
            cutoff -= reduction.min(defaults::MAX_ULTRA_REDUCTION);
        }
        cutoff.max(self.config.min_threshold_percent)
    }

    /// Decide the movement mode for one segment
    #[must_use]
    pub fn decide(
        &self,
        segment: &MacroSegment,
        elapsed_hours: f64,
        route_distance_km: f64,
    ) -> HikeRunDecision {
        let gradient = segment.gradient_percent();
        let cutoff = self.effective_threshold(elapsed_hours, route_distance_km);

        if gradient >= cutoff {
            let confidence = if gradient > cutoff + NEAR_CUTOFF_MARGIN_PERCENT {
                HIGH_CONFIDENCE
            } else {
                NEAR_CUTOFF_CONFIDENCE
            };
            return HikeRunDecision {
                mode: MovementMode::Walk,
                threshold_used: cutoff,
                reason: format!("climb {gradient:.1}% at or above walk cutoff {cutoff:.1}%"),
                confidence,
            };
        }

        if gradient <= self.config.downhill_threshold_percent {
            return HikeRunDecision {
                mode: MovementMode::Walk,
                threshold_used: self.config.downhill_threshold_percent,
                reason: format!(
                    "technical descent {gradient:.1}% at or below {:.1}%",
                    self.config.downhill_threshold_percent
                ),
                confidence: TECHNICAL_DESCENT_CONFIDENCE,
            };
        }

        HikeRunDecision {
            mode: MovementMode::Run,
            threshold_used: cutoff,
            reason: format!("runnable gradient {gradient:.1}%"),
            confidence: HIGH_CONFIDENCE,
        }
    }

    /// Classify a historical split as running or walking
    ///
    /// Used by the profile builder to keep walking samples out of running
    /// profiles. Static thresholds only: splits carry no elapsed context.
    #[must_use]
    pub fn classify_split(&self, gradient_percent: f64, pace_min_per_km: f64) -> MovementMode {
        if pace_min_per_km > self.config.walk_pace_min_per_km
            || gradient_percent >= self.config.uphill_threshold_percent
            || gradient_percent <= self.config.downhill_threshold_percent
        {
            MovementMode::Walk
        } else {
            MovementMode::Run
        }
    }

    /// Decide a whole route in order, advancing a rough elapsed-time estimate
    /// so dynamic cutoffs see the accumulating effort
    #[must_use]
    pub fn decide_route(
        &self,
        segments: &[MacroSegment],
        route_distance_km: f64,
    ) -> Vec<HikeRunDecision> {
        let mut decisions = Vec::with_capacity(segments.len());
        let mut elapsed_hours = 0.0;
        for segment in segments {
            let decision = self.decide(segment, elapsed_hours, route_distance_km);
            let estimate_speed = match decision.mode {
                MovementMode::Run => defaults::ESTIMATE_RUN_SPEED_KMH,
                MovementMode::Walk => defaults::ESTIMATE_WALK_SPEED_KMH,
            };
            elapsed_hours += segment.distance_km / estimate_speed;
            decisions.push(decision);
        }
        decisions
    }

    /// Detect an athlete's personal walk cutoff from historical splits
    ///
    /// Looks for the steepest positive pace-per-gradient derivative between
    /// adjacent uphill splits: the gradient where pace suddenly collapses is
    /// where this athlete starts walking. Returns `None` when the history is
    /// too thin to trust (fewer than 10 splits or 5 uphill splits) or shows
    /// no pace discontinuity.
    #[must_use]
    pub fn detect_from_splits(&self, splits: &[SplitSample]) -> Option<f64> {
        if splits.len() < defaults::DETECTION_MIN_SPLITS {
            return None;
        }

        let mut uphill: Vec<(f64, f64)> = splits
            .iter()
            .filter_map(|split| {
                let pace = split.pace_min_per_km()?;
                let gradient = split.gradient_percent();
                (gradient > defaults::DETECTION_UPHILL_PERCENT).then_some((gradient, pace))
            })
            .collect();
        if uphill.len() < defaults::DETECTION_MIN_UPHILL_SPLITS {
            return None;
        }

        uphill.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut best: Option<(f64, f64)> = None;
        for pair in uphill.windows(2) {
            let (low_gradient, low_pace) = pair[0];
            let (high_gradient, high_pace) = pair[1];
            let gradient_step = high_gradient - low_gradient;
            if gradient_step <= f64::EPSILON {
                continue;
            }
            let derivative = (high_pace - low_pace) / gradient_step;
            if derivative > best.map_or(0.0, |(_, d)| d) {
                best = Some((f64::midpoint(low_gradient, high_gradient), derivative));
            }
        }

        best.map(|(midpoint, _)| {
            midpoint.clamp(
                self.config.min_threshold_percent,
                self.config.max_threshold_percent,
            )
        })
    }

    /// Aggregate a route's decisions per movement mode
    #[must_use]
    pub fn summarize(
        segments: &[MacroSegment],
        decisions: &[HikeRunDecision],
    ) -> ThresholdSummary {
        let mut summary = ThresholdSummary::default();
        for (segment, decision) in segments.iter().zip(decisions) {
            match decision.mode {
                MovementMode::Run => {
                    summary.run_segments += 1;
                    summary.run_distance_km += segment.distance_km;
                }
                MovementMode::Walk => {
                    summary.walk_segments += 1;
                    summary.walk_distance_km += segment.distance_km;
                }
            }
        }
        let total = summary.run_distance_km + summary.walk_distance_km;
        if total > 0.0 {
            summary.run_percent = summary.run_distance_km / total * 100.0;
        }
        summary
    }
}

impl Default for HikeRunThreshold {
    fn default() -> Self {
        // the default config upholds every invariant
        Self {
            config: ThresholdConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SegmentType;

    fn segment_at(gradient_percent: f64, distance_km: f64) -> MacroSegment {
        let net_m = gradient_percent / 100.0 * distance_km * 1000.0;
        let (segment_type, gain, loss) = if net_m > 0.0 {
            (SegmentType::Ascent, net_m, 0.0)
        } else if net_m < 0.0 {
            (SegmentType::Descent, 0.0, -net_m)
        } else {
            (SegmentType::Flat, 0.0, 0.0)
        };
        MacroSegment {
            index: 0,
            segment_type,
            distance_km,
            elevation_gain_m: gain,
            elevation_loss_m: loss,
            start_elevation_m: 1500.0,
            end_elevation_m: 1500.0 + net_m,
        }
    }

    /// gradient g percent and pace p min/km over a 1 km split
    fn split(gradient_percent: f64, pace_min_per_km: f64) -> SplitSample {
        SplitSample::new(1000.0, gradient_percent * 10.0, pace_min_per_km * 60.0)
    }

    #[test]
    fn steep_climb_walks_with_high_confidence() {
        let service = HikeRunThreshold::default();
        let decision = service.decide(&segment_at(31.0, 1.0), 0.0, 10.0);
        assert_eq!(decision.mode, MovementMode::Walk);
        assert!((decision.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn transition_zone_climb_walks_with_low_confidence() {
        let service = HikeRunThreshold::default();
        let decision = service.decide(&segment_at(26.0, 1.0), 0.0, 10.0);
        assert_eq!(decision.mode, MovementMode::Walk);
        assert!(
            (decision.confidence - 0.7).abs() < f64::EPSILON,
            "26% is inside the 25-30% transition zone"
        );
    }

    #[test]
    fn technical_descent_walks() {
        let service = HikeRunThreshold::default();
        let decision = service.decide(&segment_at(-35.0, 1.0), 0.0, 10.0);
        assert_eq!(decision.mode, MovementMode::Walk);
        assert!((decision.confidence - 0.8).abs() < f64::EPSILON);
        assert!((decision.threshold_used - -30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn moderate_gradient_runs() {
        let service = HikeRunThreshold::default();
        let decision = service.decide(&segment_at(10.0, 1.0), 0.0, 10.0);
        assert_eq!(decision.mode, MovementMode::Run);
        assert!((decision.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn static_policy_ignores_elapsed_effort() {
        let service = HikeRunThreshold::default();
        let early = service.effective_threshold(0.0, 10.0);
        let late = service.effective_threshold(8.0, 120.0);
        assert!((early - late).abs() < f64::EPSILON);
    }

    #[test]
    fn dynamic_policy_lowers_cutoff_over_time_and_distance() {
        let service = HikeRunThreshold::new(ThresholdConfig {
            dynamic: true,
            ..ThresholdConfig::default()
        })
        .unwrap_or_default();

        assert!((service.effective_threshold(1.0, 10.0) - 25.0).abs() < 1e-9);
        // 2 hours past onset: 25 - 2 * 1.5 = 22
        assert!((service.effective_threshold(4.0, 10.0) - 22.0).abs() < 1e-9);
        // hour reduction caps at 5
        assert!((service.effective_threshold(12.0, 10.0) - 20.0).abs() < 1e-9);
        // 50 km past the ultra onset: another 2 off
        assert!((service.effective_threshold(1.0, 100.0) - 23.0).abs() < 1e-9);
        // both reductions capped: 25 - 5 - 3 = 17
        assert!((service.effective_threshold(24.0, 300.0) - 17.0).abs() < 1e-9);
    }

    #[test]
    fn dynamic_cutoff_never_drops_below_floor() {
        let service = HikeRunThreshold::new(ThresholdConfig {
            dynamic: true,
            uphill_threshold_percent: 16.0,
            ..ThresholdConfig::default()
        })
        .unwrap_or_default();
        assert!(
            (service.effective_threshold(20.0, 500.0) - 15.0).abs() < 1e-9,
            "floor is min_threshold_percent"
        );
    }

    #[test]
    fn split_classification_flags_slow_or_steep_splits() {
        let service = HikeRunThreshold::default();
        assert_eq!(service.classify_split(5.0, 10.0), MovementMode::Walk, "slow pace");
        assert_eq!(service.classify_split(30.0, 6.0), MovementMode::Walk, "steep climb");
        assert_eq!(service.classify_split(-35.0, 6.0), MovementMode::Walk, "steep descent");
        assert_eq!(service.classify_split(8.0, 6.5), MovementMode::Run);
    }

    #[test]
    fn route_decisions_advance_elapsed_estimate() {
        let config = ThresholdConfig {
            dynamic: true,
            ..ThresholdConfig::default()
        };
        let service = HikeRunThreshold::new(config).unwrap_or_default();

        // 27 runnable km at ~9 km/h = 3 h elapsed puts the last climb's
        // cutoff at 25 - 1.5 = 23.5, so a 24% climb walks late in the route
        let segments = vec![
            segment_at(5.0, 27.0),
            segment_at(24.0, 1.0),
        ];
        let decisions = service.decide_route(&segments, 28.0);
        assert_eq!(decisions[0].mode, MovementMode::Run);
        assert_eq!(
            decisions[1].mode,
            MovementMode::Walk,
            "late 24% climb should breach the lowered cutoff {}",
            decisions[1].threshold_used
        );
    }

    #[test]
    fn detection_needs_enough_history() {
        let service = HikeRunThreshold::default();
        let thin: Vec<SplitSample> = (0..9).map(|_| split(10.0, 7.0)).collect();
        assert!(service.detect_from_splits(&thin).is_none(), "fewer than 10 splits");

        let mut few_uphill: Vec<SplitSample> = (0..8).map(|_| split(0.0, 6.0)).collect();
        few_uphill.extend((0..4).map(|_| split(10.0, 7.0)));
        assert!(
            service.detect_from_splits(&few_uphill).is_none(),
            "fewer than 5 uphill splits"
        );
    }

    #[test]
    fn detection_finds_the_pace_collapse_midpoint() {
        let service = HikeRunThreshold::default();
        let mut splits = vec![
            split(6.0, 7.0),
            split(8.0, 7.1),
            split(10.0, 7.2),
            split(18.0, 7.5),
            split(22.0, 13.0),
        ];
        splits.extend((0..5).map(|_| split(0.0, 6.0)));

        let detected = service.detect_from_splits(&splits).unwrap_or(0.0);
        assert!(
            (detected - 20.0).abs() < 1e-9,
            "pace collapses between 18% and 22%, midpoint 20%, got {detected}"
        );
    }

    #[test]
    fn detection_clamps_into_configured_bounds() {
        let service = HikeRunThreshold::default();
        let mut splits = vec![
            split(6.0, 7.0),
            split(12.0, 7.1),
            split(20.0, 7.2),
            split(38.0, 7.4),
            split(42.0, 14.0),
        ];
        splits.extend((0..5).map(|_| split(0.0, 6.0)));

        let detected = service.detect_from_splits(&splits).unwrap_or(0.0);
        assert!(
            (detected - 35.0).abs() < 1e-9,
            "midpoint 40% clamps to the 35% ceiling, got {detected}"
        );
    }

    #[test]
    fn override_cutoff_is_clamped() {
        let service =
            HikeRunThreshold::with_uphill_cutoff(ThresholdConfig::default(), 60.0)
                .unwrap_or_default();
        assert!((service.config().uphill_threshold_percent - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_splits_distance_by_mode() {
        let service = HikeRunThreshold::default();
        let segments = vec![segment_at(5.0, 6.0), segment_at(30.0, 2.0), segment_at(-2.0, 2.0)];
        let decisions = service.decide_route(&segments, 10.0);
        let summary = HikeRunThreshold::summarize(&segments, &decisions);

        assert_eq!(summary.run_segments, 2);
        assert_eq!(summary.walk_segments, 1);
        assert!((summary.run_distance_km - 8.0).abs() < 1e-9);
        assert!((summary.walk_distance_km - 2.0).abs() < 1e-9);
        assert!((summary.run_percent - 80.0).abs() < 1e-9);
    }
}
