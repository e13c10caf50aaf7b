// ABOUTME: Per-user performance profile types built from historical terrain splits
// ABOUTME: Defines ActivityKind, EffortLevel, CategoryStats, PerformanceProfile, and snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gradient::GradientCategory;

/// Activity kind a profile is scoped to
///
/// Paces differ enough between hiking and trail running that the two are
/// profiled independently per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Walking-dominant movement
    Hiking,
    /// Running-dominant movement
    TrailRunning,
}

impl ActivityKind {
    /// Stable snake_case name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hiking => "hiking",
            Self::TrailRunning => "trail_running",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Effort level a prediction is requested at
///
/// Selects which percentile of the user's observed pace distribution feeds
/// the estimate: a fast day reads the 25th percentile, an easy day the 75th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EffortLevel {
    /// Strong day, 25th percentile pace
    Fast,
    /// Typical day, median pace
    #[default]
    Moderate,
    /// Relaxed day, 75th percentile pace
    Easy,
}

impl EffortLevel {
    /// Percentile of the pace distribution this effort reads
    #[must_use]
    pub const fn percentile(&self) -> f64 {
        match self {
            Self::Fast => 25.0,
            Self::Moderate => 50.0,
            Self::Easy => 75.0,
        }
    }

    /// Human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Fast => "fast effort (p25 pace)",
            Self::Moderate => "moderate effort (median pace)",
            Self::Easy => "easy effort (p75 pace)",
        }
    }
}

/// Percentile bands of observed pace within one gradient category (min/km)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceBands {
    /// 25th percentile pace
    pub p25: f64,
    /// Median pace
    pub p50: f64,
    /// 75th percentile pace
    pub p75: f64,
}

impl PaceBands {
    /// Pace band matching the requested effort level
    #[must_use]
    pub const fn select(&self, effort: EffortLevel) -> f64 {
        match effort {
            EffortLevel::Fast => self.p25,
            EffortLevel::Moderate => self.p50,
            EffortLevel::Easy => self.p75,
        }
    }
}

/// Aggregated pace statistics for one gradient category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CategoryStats {
    /// Outlier-filtered average pace (min/km); None until enough samples exist
    pub pace_min_per_km: Option<f64>,
    /// Samples surviving the outlier filter
    pub sample_count: usize,
    /// Percentile bands, recorded alongside the average when populated
    pub percentiles: Option<PaceBands>,
}

impl CategoryStats {
    /// Whether this category holds a trustworthy pace
    #[must_use]
    pub const fn is_populated(&self) -> bool {
        self.pace_min_per_km.is_some()
    }
}

/// Per-user, per-activity-kind pace profile over the gradient categories
///
/// Built by [`crate::profile::ProfileBuilder`] and replaced whole on every
/// recalculation; nothing mutates it field by field. Categories with too few
/// samples stay unpopulated and trigger the generic fallback at prediction
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    /// Owner of the profile
    pub user_id: Uuid,
    /// Activity kind the paces were learned from
    pub kind: ActivityKind,
    /// Pace statistics per gradient category
    pub categories: BTreeMap<GradientCategory, CategoryStats>,
    /// Uphill efficiency relative to the population baseline (1.0 = average)
    pub vertical_ability: f64,
    /// Detected run/walk gradient cutoff, when derivable from splits (percent)
    pub walk_threshold_percent: Option<f64>,
    /// Activities the profile aggregates
    pub total_activities: usize,
    /// Distance the profile aggregates (km)
    pub total_distance_km: f64,
    /// Climbing the profile aggregates (m)
    pub total_elevation_m: f64,
    /// When the profile was last recalculated
    pub last_calculated_at: DateTime<Utc>,
}

impl PerformanceProfile {
    /// A profile with no historical data
    ///
    /// Valid input everywhere: every lookup misses and predictions fall back
    /// to the generic models.
    #[must_use]
    pub fn empty(user_id: Uuid, kind: ActivityKind) -> Self {
        let categories = GradientCategory::ALL
            .iter()
            .map(|cat| (*cat, CategoryStats::default()))
            .collect();
        Self {
            user_id,
            kind,
            categories,
            vertical_ability: 1.0,
            walk_threshold_percent: None,
            total_activities: 0,
            total_distance_km: 0.0,
            total_elevation_m: 0.0,
            last_calculated_at: Utc::now(),
        }
    }

    /// Statistics for one category, if present
    #[must_use]
    pub fn category(&self, category: GradientCategory) -> Option<&CategoryStats> {
        self.categories.get(&category)
    }

    /// Personalized pace for a category at the requested effort (min/km)
    ///
    /// Prefers the effort's percentile band, falls back to the filtered
    /// average, and returns None when the category has too few samples.
    #[must_use]
    pub fn pace_for(&self, category: GradientCategory, effort: EffortLevel) -> Option<f64> {
        let stats = self.category(category)?;
        if !stats.is_populated() {
            return None;
        }
        stats
            .percentiles
            .map(|bands| bands.select(effort))
            .or(stats.pace_min_per_km)
    }

    /// Personalized flat pace at the requested effort (min/km)
    #[must_use]
    pub fn flat_pace(&self, effort: EffortLevel) -> Option<f64> {
        self.pace_for(GradientCategory::Flat, effort)
    }

    /// Whether any category holds a trustworthy pace
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.categories.values().any(CategoryStats::is_populated)
    }
}

/// Immutable point-in-time copy of a profile, kept for auditability
///
/// Append-only: snapshots are taken at each save and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Owner of the snapshotted profile
    pub user_id: Uuid,
    /// Activity kind of the snapshotted profile
    pub kind: ActivityKind,
    /// Why the snapshot was taken (e.g. "recalculated", "manual save")
    pub reason: String,
    /// Activities aggregated at snapshot time
    pub activities_count: usize,
    /// The profile as it was saved
    pub profile: PerformanceProfile,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
}

impl ProfileSnapshot {
    /// Capture a snapshot of a profile now
    #[must_use]
    pub fn capture(profile: PerformanceProfile, reason: impl Into<String>) -> Self {
        Self {
            user_id: profile.user_id,
            kind: profile.kind,
            reason: reason.into(),
            activities_count: profile.total_activities,
            profile,
            created_at: Utc::now(),
        }
    }
}

/// One historical terrain split from the activity-sync collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitSample {
    /// Horizontal length in meters
    pub distance_m: f64,
    /// Net elevation change across the split in meters
    pub elevation_diff_m: f64,
    /// Moving time in seconds
    pub moving_time_s: f64,
}

impl SplitSample {
    /// Create a split sample
    #[must_use]
    pub const fn new(distance_m: f64, elevation_diff_m: f64, moving_time_s: f64) -> Self {
        Self {
            distance_m,
            elevation_diff_m,
            moving_time_s,
        }
    }

    /// Average gradient of the split as a percentage; zero when degenerate
    #[must_use]
    pub fn gradient_percent(&self) -> f64 {
        if self.distance_m <= 0.0 {
            return 0.0;
        }
        self.elevation_diff_m / self.distance_m * 100.0
    }

    /// Realized pace in minutes per kilometer; None when degenerate
    #[must_use]
    pub fn pace_min_per_km(&self) -> Option<f64> {
        if self.distance_m <= 0.0 || self.moving_time_s <= 0.0 {
            return None;
        }
        Some((self.moving_time_s / 60.0) / (self.distance_m / 1000.0))
    }
}
