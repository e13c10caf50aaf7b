// ABOUTME: Profile-backed pace selection with total generic fallback
// ABOUTME: Uses learned per-category paces when populated, else GAP or Tobler scaled to the athlete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Personalized pace calculator.
//!
//! Each segment's gradient is classified into the shared category grid. A
//! populated profile category answers directly at the requested effort
//! percentile. Unpopulated categories fall back to a generic model scaled
//! to the athlete: trail running falls back to grade-adjusted pace on the
//! athlete's flat pace, hiking to Tobler scaled by the athlete's flat
//! speed; on climbs the generic extra cost is additionally scaled by
//! `vertical_ability` (1.0 = population-average climber). The fallback is
//! total, so an entirely empty profile still yields a usable prediction.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::constants::personalization::POPULATION_FLAT_SPEED_KMH;
use crate::errors::EngineResult;
use crate::gradient::GradientBands;
use crate::models::{
    ActivityKind, EffortLevel, MacroSegment, MethodResult, MovementMode, PerformanceProfile,
};
use crate::pace::{GapCalculator, GapMode, ToblerCalculator};

/// One pace choice for a segment, before fatigue
#[derive(Debug, Clone)]
pub struct PaceSelection {
    /// Chosen pace (min/km)
    pub pace_min_per_km: f64,
    /// Stable name of the pace source
    pub source: &'static str,
    /// Human-readable derivation
    pub formula: String,
}

/// Pace estimator personalized to one athlete's performance profile.
#[derive(Debug, Clone)]
pub struct PersonalizedCalculator {
    profile: Arc<PerformanceProfile>,
    effort: EffortLevel,
    bands: GradientBands,
    gap: GapCalculator,
    tobler: ToblerCalculator,
    default_flat_pace_min_per_km: f64,
}

impl PersonalizedCalculator {
    /// Build a calculator for one profile under the given engine configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the GAP configuration inside
    /// the engine config is malformed.
    pub fn new(
        profile: Arc<PerformanceProfile>,
        effort: EffortLevel,
        config: &EngineConfig,
    ) -> EngineResult<Self> {
        Ok(Self {
            bands: config.gradient_bands.clone(),
            gap: GapCalculator::new(config.gap.clone(), GapMode::Empirical)?,
            tobler: ToblerCalculator::new(config.tobler.clone()),
            default_flat_pace_min_per_km: config.gap.flat_pace_min_per_km,
            profile,
            effort,
        })
    }

    /// Build a calculator with default configuration
    #[must_use]
    pub fn with_defaults(profile: Arc<PerformanceProfile>, effort: EffortLevel) -> Self {
        Self {
            bands: GradientBands::default(),
            gap: GapCalculator::default(),
            tobler: ToblerCalculator::default(),
            default_flat_pace_min_per_km: crate::constants::gap::DEFAULT_FLAT_PACE_MIN_KM,
            profile,
            effort,
        }
    }

    /// Profile this calculator reads from
    #[must_use]
    pub fn profile(&self) -> &PerformanceProfile {
        &self.profile
    }

    /// Effort level driving percentile selection
    #[must_use]
    pub const fn effort(&self) -> EffortLevel {
        self.effort
    }

    /// Estimate one segment at the given profile multiplier
    #[must_use]
    pub fn calculate_segment(&self, segment: &MacroSegment, profile_multiplier: f64) -> MethodResult {
        let gradient = segment.gradient_percent();
        let category = self.bands.classify(gradient);

        let (pace_min_per_km, formula) = match self.profile.pace_for(category, self.effort) {
            Some(pace) => (
                pace,
                format!("personal {category} pace, {}", self.effort.description()),
            ),
            None => self.fallback_pace(gradient),
        };

        let speed_kmh = super::clamp_speed(60.0 / pace_min_per_km * profile_multiplier);
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
            formula,
        }
    }

    /// Pick a pace for one segment, honoring the decided movement mode.
    ///
    /// A populated profile category always wins. Without one, running
    /// segments fall back to grade-adjusted pace and walking segments to
    /// Tobler, regardless of the profile's activity kind.
    #[must_use]
    pub fn select_pace(&self, segment: &MacroSegment, mode: MovementMode) -> PaceSelection {
        let gradient = segment.gradient_percent();
        let category = self.bands.classify(gradient);

        if let Some(pace) = self.profile.pace_for(category, self.effort) {
            return PaceSelection {
                pace_min_per_km: pace,
                source: self.name(),
                formula: format!("personal {category} pace, {}", self.effort.description()),
            };
        }

        let (pace_min_per_km, formula) = match mode {
            MovementMode::Run => self.gap_fallback(gradient),
            MovementMode::Walk => self.tobler_fallback(gradient),
        };
        let source = match mode {
            MovementMode::Run => self.gap.name(),
            MovementMode::Walk => self.tobler.name(),
        };

        PaceSelection {
            pace_min_per_km,
            source,
            formula,
        }
    }

    fn fallback_pace(&self, gradient_percent: f64) -> (f64, String) {
        match self.profile.kind {
            ActivityKind::TrailRunning => self.gap_fallback(gradient_percent),
            ActivityKind::Hiking => self.tobler_fallback(gradient_percent),
        }
    }

    /// Grade-adjusted pace on the athlete's flat pace (population default
    /// when the flat category is itself unpopulated)
    fn gap_fallback(&self, gradient_percent: f64) -> (f64, String) {
        let flat_pace = self
            .profile
            .flat_pace(self.effort)
            .unwrap_or(self.default_flat_pace_min_per_km);
        let generic_ratio = self.gap.adjustment(gradient_percent).pace_multiplier;
        let adjusted_ratio = self.climb_adjusted_ratio(generic_ratio, gradient_percent);

        (
            flat_pace * adjusted_ratio,
            format!(
                "GAP fallback x{adjusted_ratio:.2}, vertical ability {:.2}",
                self.profile.vertical_ability
            ),
        )
    }

    /// Tobler speed scaled by the athlete's flat speed relative to the
    /// population walking baseline
    fn tobler_fallback(&self, gradient_percent: f64) -> (f64, String) {
        let flat_speed = self
            .profile
            .flat_pace(self.effort)
            .map_or(POPULATION_FLAT_SPEED_KMH, |pace| 60.0 / pace);
        let scale = flat_speed / POPULATION_FLAT_SPEED_KMH;

        let generic_speed = self.tobler.speed_for_slope(gradient_percent / 100.0);
        let generic_ratio = self.tobler.speed_for_slope(0.0) / generic_speed;
        let adjusted_ratio = self.climb_adjusted_ratio(generic_ratio, gradient_percent);

        let speed = generic_speed * scale * (generic_ratio / adjusted_ratio);
        (
            60.0 / speed,
            format!(
                "Tobler fallback x{scale:.2} flat speed, vertical ability {:.2}",
                self.profile.vertical_ability
            ),
        )
    }

    /// Scale the extra pace cost above flat by the athlete's vertical
    /// ability; descents and flat terrain keep the generic ratio
    fn climb_adjusted_ratio(&self, generic_ratio: f64, gradient_percent: f64) -> f64 {
        if gradient_percent <= 0.0 {
            return generic_ratio;
        }
        (generic_ratio - 1.0).mul_add(self.profile.vertical_ability.max(0.0), 1.0)
    }

    /// Stable identifier used in comparisons and per-method totals.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "personalized"
    }

    /// Human-readable formula summary.
    #[must_use]
    pub fn description(&self) -> String {
        let fallback = match self.profile.kind {
            ActivityKind::TrailRunning => "GAP",
            ActivityKind::Hiking => "Tobler",
        };
        format!(
            "Personalized: profile category paces with {fallback} fallback, {}",
            self.effort.description()
        )
    }

    /// The formula as a string
    #[must_use]
    pub const fn formula(&self) -> &'static str {
        "pace = profile[category][effort], else generic fallback x vertical ability"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::GradientCategory;
    use crate::models::{CategoryStats, PaceBands, SegmentType};
    use uuid::Uuid;

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
            start_elevation_m: 1000.0,
            end_elevation_m: 1000.0 + net_m,
        }
    }

    fn profile_with(
        kind: ActivityKind,
        paces: &[(GradientCategory, f64, usize)],
    ) -> PerformanceProfile {
        let mut profile = PerformanceProfile::empty(Uuid::new_v4(), kind);
        for (category, pace, samples) in paces {
            profile.categories.insert(
                *category,
                CategoryStats {
                    pace_min_per_km: Some(*pace),
                    sample_count: *samples,
                    percentiles: None,
                },
            );
        }
        profile
    }

    #[test]
    fn empty_profile_still_predicts() {
        let profile = PerformanceProfile::empty(Uuid::new_v4(), ActivityKind::TrailRunning);
        let calc = PersonalizedCalculator::with_defaults(Arc::new(profile), EffortLevel::Moderate);

        let result = calc.calculate_segment(&segment_at(0.0, 10.0), 1.0);
        assert_eq!(result.method, "personalized");
        assert!(
            (result.time_hours - 1.0).abs() < 1e-9,
            "10 flat km on the 6.0 min/km default should take one hour, got {}",
            result.time_hours
        );
    }

    #[test]
    fn populated_category_short_circuits_fallback() {
        let profile = profile_with(
            ActivityKind::TrailRunning,
            &[(GradientCategory::Flat, 5.0, 12)],
        );
        let calc = PersonalizedCalculator::with_defaults(Arc::new(profile), EffortLevel::Moderate);

        let result = calc.calculate_segment(&segment_at(0.0, 10.0), 1.0);
        assert!(
            (result.pace_min_per_km - 5.0).abs() < 1e-9,
            "flat segment should use the learned 5.0 min/km pace, got {}",
            result.pace_min_per_km
        );
    }

    #[test]
    fn effort_selects_percentile_band() {
        let mut profile =
            PerformanceProfile::empty(Uuid::new_v4(), ActivityKind::TrailRunning);
        profile.categories.insert(
            GradientCategory::Flat,
            CategoryStats {
                pace_min_per_km: Some(5.0),
                sample_count: 20,
                percentiles: Some(PaceBands {
                    p25: 4.5,
                    p50: 5.0,
                    p75: 5.5,
                }),
            },
        );
        let profile = Arc::new(profile);

        let fast = PersonalizedCalculator::with_defaults(Arc::clone(&profile), EffortLevel::Fast);
        let easy = PersonalizedCalculator::with_defaults(profile, EffortLevel::Easy);

        let fast_result = fast.calculate_segment(&segment_at(0.0, 1.0), 1.0);
        let easy_result = easy.calculate_segment(&segment_at(0.0, 1.0), 1.0);
        assert!((fast_result.pace_min_per_km - 4.5).abs() < 1e-9);
        assert!((easy_result.pace_min_per_km - 5.5).abs() < 1e-9);
    }

    #[test]
    fn run_fallback_scales_climb_cost_by_vertical_ability() {
        let mut weak_climber =
            PerformanceProfile::empty(Uuid::new_v4(), ActivityKind::TrailRunning);
        weak_climber.vertical_ability = 2.0;

        let baseline = PersonalizedCalculator::with_defaults(
            Arc::new(PerformanceProfile::empty(Uuid::new_v4(), ActivityKind::TrailRunning)),
            EffortLevel::Moderate,
        );
        let weak = PersonalizedCalculator::with_defaults(
            Arc::new(weak_climber),
            EffortLevel::Moderate,
        );

        // at +10% the empirical multiplier is 1.38; doubling the extra cost
        // gives 1.76 on the 6.0 min/km default flat pace
        let climb = segment_at(10.0, 1.0);
        let baseline_pace = baseline.calculate_segment(&climb, 1.0).pace_min_per_km;
        let weak_pace = weak.calculate_segment(&climb, 1.0).pace_min_per_km;

        assert!((baseline_pace - 6.0 * 1.38).abs() < 1e-9, "got {baseline_pace}");
        assert!((weak_pace - 6.0 * 1.76).abs() < 1e-9, "got {weak_pace}");
    }

    #[test]
    fn descent_fallback_ignores_vertical_ability() {
        let mut profile = PerformanceProfile::empty(Uuid::new_v4(), ActivityKind::TrailRunning);
        profile.vertical_ability = 2.0;
        let calc = PersonalizedCalculator::with_defaults(Arc::new(profile), EffortLevel::Moderate);

        // at -10% the empirical multiplier is 0.88 regardless of climbing ability
        let result = calc.calculate_segment(&segment_at(-10.0, 1.0), 1.0);
        assert!(
            (result.pace_min_per_km - 6.0 * 0.88).abs() < 1e-9,
            "got {}",
            result.pace_min_per_km
        );
    }

    #[test]
    fn hike_fallback_scales_tobler_to_flat_speed() {
        // flat pace 10 min/km = 6 km/h, 1.2x the 5 km/h population baseline
        let profile = profile_with(ActivityKind::Hiking, &[(GradientCategory::Flat, 10.0, 8)]);
        let calc = PersonalizedCalculator::with_defaults(Arc::new(profile), EffortLevel::Moderate);

        let tobler = ToblerCalculator::default();
        let expected_pace = 60.0 / (tobler.speed_for_slope(0.10) * 1.2);

        let result = calc.calculate_segment(&segment_at(10.0, 1.0), 1.0);
        assert!(
            (result.pace_min_per_km - expected_pace).abs() < 1e-9,
            "expected {expected_pace}, got {}",
            result.pace_min_per_km
        );
    }
}
