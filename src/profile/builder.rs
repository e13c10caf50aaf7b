// ABOUTME: Builds PerformanceProfile from historical terrain splits
// ABOUTME: Sanity bounds, walk-split exclusion, IQR filtering, and percentile bands per gradient category
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Profile building from raw terrain splits.
//!
//! The builder turns a pile of historical splits into a
//! [`PerformanceProfile`]: splits pass absolute sanity bounds, walk-paced
//! splits are excluded from running profiles, and each gradient category is
//! IQR-filtered before its average and percentile bands are recorded.
//! Building never fails; too little data simply leaves categories absent and
//! the generic models take over downstream.

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::config::{EngineConfig, PersonalizationConfig};
use crate::errors::EngineResult;
use crate::gradient::{GradientBands, GradientCategory};
use crate::models::{
    ActivityKind, CategoryStats, MovementMode, PaceBands, PerformanceProfile, SplitSample,
};
use crate::profile::stats;
use crate::threshold::HikeRunThreshold;

/// Builds performance profiles from historical terrain splits
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    config: PersonalizationConfig,
    bands: GradientBands,
    threshold: HikeRunThreshold,
}

impl ProfileBuilder {
    /// Create a builder from the engine configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when the personalization,
    /// gradient-band, or threshold sections fail validation.
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        config.personalization.validate()?;
        config.gradient_bands.validate()?;
        Ok(Self {
            config: config.personalization.clone(),
            bands: config.gradient_bands.clone(),
            threshold: HikeRunThreshold::new(config.threshold.clone())?,
        })
    }

    /// Build a profile from historical splits
    ///
    /// `activity_count` is the number of activities the splits came from;
    /// splits carry no activity identity themselves. Totals aggregate over
    /// all supplied splits, populated categories only over splits that
    /// survive filtering. Never fails: with too little data every category
    /// stays absent and predictions fall back to the generic models.
    #[must_use]
    pub fn build(
        &self,
        user_id: Uuid,
        kind: ActivityKind,
        splits: &[SplitSample],
        activity_count: usize,
    ) -> PerformanceProfile {
        let mut profile = PerformanceProfile::empty(user_id, kind);
        profile.total_activities = activity_count;
        profile.total_distance_km = splits.iter().map(|s| s.distance_m).sum::<f64>() / 1000.0;
        profile.total_elevation_m = splits.iter().map(|s| s.elevation_diff_m.max(0.0)).sum();

        let sane = self.sanity_filter(kind, splits);
        if sane.len() < self.config.min_splits_for_profile {
            debug!(
                user_id = %user_id,
                kind = kind.name(),
                usable = sane.len(),
                required = self.config.min_splits_for_profile,
                "too few usable splits, leaving profile categories absent"
            );
            return profile;
        }

        // Threshold detection sees every sane split: the walk-paced ones are
        // the evidence of the run-to-walk transition.
        if kind == ActivityKind::TrailRunning {
            let samples: Vec<SplitSample> = sane.iter().map(|(split, _)| *split).collect();
            profile.walk_threshold_percent = self.threshold.detect_from_splits(&samples);
        }

        let grouped = self.group_by_category(kind, &sane);
        for (category, paces) in grouped {
            let filtered = stats::filter_outliers_iqr(&paces, self.config.iqr_multiplier);
            let entry = if filtered.len() >= self.config.min_samples_per_category {
                CategoryStats {
                    pace_min_per_km: stats::mean(&filtered),
                    sample_count: filtered.len(),
                    percentiles: stats::quartiles(&filtered)
                        .map(|(p25, p50, p75)| PaceBands { p25, p50, p75 }),
                }
            } else {
                // Too few to trust; keep the count so callers can see how
                // close the category is to activating.
                CategoryStats {
                    pace_min_per_km: None,
                    sample_count: filtered.len(),
                    percentiles: None,
                }
            };
            profile.categories.insert(category, entry);
        }

        profile.vertical_ability = self.vertical_ability(&profile);
        profile.last_calculated_at = Utc::now();

        debug!(
            user_id = %user_id,
            kind = kind.name(),
            populated = profile
                .categories
                .values()
                .filter(|stats| stats.is_populated())
                .count(),
            vertical_ability = profile.vertical_ability,
            walk_threshold = ?profile.walk_threshold_percent,
            "profile rebuilt"
        );
        profile
    }

    /// Drop degenerate splits and splits outside the per-kind pace bounds
    fn sanity_filter(&self, kind: ActivityKind, splits: &[SplitSample]) -> Vec<(SplitSample, f64)> {
        let (min_pace, max_pace) = self.config.pace_bounds(kind);
        let mut degenerate = 0usize;
        let mut out_of_bounds = 0usize;
        let mut sane = Vec::with_capacity(splits.len());
        for split in splits {
            let Some(pace) = split.pace_min_per_km() else {
                degenerate += 1;
                continue;
            };
            if !(min_pace..=max_pace).contains(&pace) {
                out_of_bounds += 1;
                continue;
            }
            sane.push((*split, pace));
        }
        if degenerate + out_of_bounds > 0 {
            debug!(
                degenerate,
                out_of_bounds,
                low = min_pace,
                high = max_pace,
                "dropped unusable splits"
            );
        }
        sane
    }

    /// Group sane split paces by gradient category
    ///
    /// Running profiles exclude walk-paced splits here so the recorded paces
    /// stay pure running.
    fn group_by_category(
        &self,
        kind: ActivityKind,
        sane: &[(SplitSample, f64)],
    ) -> BTreeMap<GradientCategory, Vec<f64>> {
        let mut grouped: BTreeMap<GradientCategory, Vec<f64>> = BTreeMap::new();
        let mut walking = 0usize;
        for (split, pace) in sane {
            let gradient = split.gradient_percent();
            if kind == ActivityKind::TrailRunning
                && self.threshold.classify_split(gradient, *pace) == MovementMode::Walk
            {
                walking += 1;
                continue;
            }
            grouped
                .entry(self.bands.classify(gradient))
                .or_default()
                .push(*pace);
        }
        if walking > 0 {
            debug!(walking, "excluded walk-mode splits from running profile");
        }
        grouped
    }

    /// Uphill efficiency relative to the population baseline
    ///
    /// Ratio of gentle-uphill to flat pace over the configured baseline;
    /// 1.0 when either category is unpopulated.
    fn vertical_ability(&self, profile: &PerformanceProfile) -> f64 {
        let flat = profile
            .category(GradientCategory::Flat)
            .and_then(|stats| stats.pace_min_per_km);
        let uphill = profile
            .category(GradientCategory::GentleUphill)
            .and_then(|stats| stats.pace_min_per_km);
        match (flat, uphill) {
            (Some(flat), Some(uphill)) if flat > 0.0 => {
                (uphill / flat) / self.config.vertical_ability_baseline
            }
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_split(pace_min_per_km: f64) -> SplitSample {
        SplitSample::new(1000.0, 0.0, pace_min_per_km * 60.0)
    }

    fn graded_split(gradient_percent: f64, pace_min_per_km: f64) -> SplitSample {
        SplitSample::new(1000.0, gradient_percent * 10.0, pace_min_per_km * 60.0)
    }

    fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }

    #[test]
    fn no_splits_yield_an_empty_profile() {
        let user = Uuid::new_v4();
        let profile = builder().build(user, ActivityKind::TrailRunning, &[], 0);
        assert!(!profile.has_data());
        assert!((profile.vertical_ability - 1.0).abs() < 1e-12);
        assert!(profile.walk_threshold_percent.is_none());
        assert_eq!(profile.total_activities, 0);
    }

    #[test]
    fn too_few_splits_leave_categories_absent_but_record_totals() {
        let splits = vec![flat_split(6.0); 4];
        let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 2);
        assert!(!profile.has_data());
        assert_eq!(profile.total_activities, 2);
        assert!((profile.total_distance_km - 4.0).abs() < 1e-9);
    }

    #[test]
    fn flat_splits_populate_the_flat_category() {
        let splits = vec![flat_split(6.0); 8];
        let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 3);
        let stats = profile
            .category(GradientCategory::Flat)
            .copied()
            .unwrap_or_default();
        assert!(stats.is_populated());
        assert_eq!(stats.sample_count, 8);
        assert!((stats.pace_min_per_km.unwrap_or_default() - 6.0).abs() < 1e-9);
        let bands = stats.percentiles.unwrap_or(PaceBands {
            p25: 0.0,
            p50: 0.0,
            p75: 0.0,
        });
        assert!((bands.p50 - 6.0).abs() < 1e-9);
    }

    #[test]
    fn iqr_outlier_is_fenced_out_of_the_average() {
        // Hiking bounds admit 24.0 min/km, the IQR fence does not.
        let mut splits: Vec<SplitSample> = (0..7)
            .map(|i| flat_split(0.05f64.mul_add(f64::from(i), 12.0)))
            .collect();
        splits.push(flat_split(24.0));
        let profile = builder().build(Uuid::new_v4(), ActivityKind::Hiking, &splits, 1);
        let stats = profile
            .category(GradientCategory::Flat)
            .copied()
            .unwrap_or_default();
        assert_eq!(stats.sample_count, 7);
        let avg = stats.pace_min_per_km.unwrap_or_default();
        assert!(avg < 12.5, "outlier leaked into the average: {avg}");
    }

    #[test]
    fn walk_paced_splits_stay_out_of_a_running_profile() {
        // 10.0 min/km passes the running sanity bounds but classifies as walking.
        let mut splits = vec![flat_split(5.5); 6];
        splits.extend(vec![flat_split(10.0); 6]);
        let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 4);
        let stats = profile
            .category(GradientCategory::Flat)
            .copied()
            .unwrap_or_default();
        assert_eq!(stats.sample_count, 6);
        assert!((stats.pace_min_per_km.unwrap_or_default() - 5.5).abs() < 1e-9);
    }

    #[test]
    fn hiking_profile_keeps_slow_splits() {
        let mut splits = vec![flat_split(5.5); 6];
        splits.extend(vec![flat_split(10.0); 6]);
        let profile = builder().build(Uuid::new_v4(), ActivityKind::Hiking, &splits, 4);
        let stats = profile
            .category(GradientCategory::Flat)
            .copied()
            .unwrap_or_default();
        assert_eq!(stats.sample_count, 12);
    }

    #[test]
    fn vertical_ability_compares_gentle_uphill_to_flat() {
        let mut splits = vec![flat_split(6.0); 5];
        splits.extend(vec![graded_split(5.0, 7.2); 5]);
        let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 2);
        // (7.2 / 6.0) / 1.5 baseline
        assert!((profile.vertical_ability - 0.8).abs() < 1e-9);
    }

    #[test]
    fn walk_threshold_detected_from_uphill_pace_jump() {
        let mut splits = vec![flat_split(6.0), flat_split(6.1)];
        splits.extend([
            graded_split(6.0, 7.0),
            graded_split(8.0, 7.1),
            graded_split(10.0, 7.2),
            graded_split(12.0, 7.3),
            graded_split(14.0, 7.4),
            graded_split(18.0, 7.8),
            graded_split(22.0, 12.0),
            graded_split(26.0, 12.4),
        ]);
        let profile = builder().build(Uuid::new_v4(), ActivityKind::TrailRunning, &splits, 5);
        // Sharpest pace-per-gradient jump sits between 18% and 22%.
        let detected = profile.walk_threshold_percent.unwrap_or_default();
        assert!((detected - 20.0).abs() < 1e-9);
    }

    #[test]
    fn hiking_profiles_never_detect_a_walk_threshold() {
        let splits: Vec<SplitSample> = (0..12)
            .map(|i| graded_split(6.0 + f64::from(i), 0.2f64.mul_add(f64::from(i), 12.0)))
            .collect();
        let profile = builder().build(Uuid::new_v4(), ActivityKind::Hiking, &splits, 3);
        assert!(profile.walk_threshold_percent.is_none());
    }

    #[test]
    fn elevation_total_counts_climbing_only() {
        let splits = vec![
            SplitSample::new(1000.0, 120.0, 420.0),
            SplitSample::new(1000.0, -80.0, 330.0),
        ];
        let profile = builder().build(Uuid::new_v4(), ActivityKind::Hiking, &splits, 1);
        assert!((profile.total_elevation_m - 120.0).abs() < 1e-9);
    }
}
