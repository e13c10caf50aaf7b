// ABOUTME: Prediction orchestrator wiring segmentation, thresholds, pace selection, and fatigue
// ABOUTME: Turns a raw track into per-segment and whole-route time estimates, optionally comparing models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route prediction engine.
//!
//! [`RoutePredictor`] is the crate's front door. Each prediction runs one
//! sequential pipeline; fatigue depends on cumulative effort, so no segment
//! is computed before its predecessors:
//!
//! 1. Validate and segment the track into macro-segments
//! 2. Fetch the athlete's profile; absent or unavailable means an empty
//!    profile, never an error
//! 3. Per segment: decide run vs walk, pick a pace source (personal category
//!    pace when learned, otherwise grade-adjusted pace for runs and Tobler
//!    for walks), degrade by accumulated fatigue, advance the totals
//! 4. Digest into a [`RouteSummary`] and, when requested, total every
//!    configured model side by side
//!
//! The predictor is cheap to clone and safe to share across threads; all
//! computation is synchronous.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::comparison::{ComparisonService, RouteComparison};
use crate::config::EngineConfig;
use crate::constants::personalization::POPULATION_FLAT_SPEED_KMH;
use crate::errors::EngineResult;
use crate::fatigue::FatigueModel;
use crate::models::{
    ActivityKind, CalculationResult, EffortLevel, MacroSegment, MovementMode, PerformanceProfile,
    RouteSummary, SegmentResult, TrackPoint,
};
use crate::pace::{
    GapCalculator, GapMode, NaismithCalculator, PaceModel, PersonalizedCalculator, ToblerCalculator,
};
use crate::profile::{ProfileRepository, SharedProfileStore};
use crate::segmenter::RouteSegmenter;
use crate::threshold::HikeRunThreshold;

/// One route prediction request
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    /// Route geometry as cumulative-distance track points
    pub points: Vec<TrackPoint>,
    /// Athlete whose stored profile personalizes the paces, if any
    pub user_id: Option<Uuid>,
    /// Activity kind the prediction is for
    pub kind: ActivityKind,
    /// Effort level selecting the percentile pace band
    pub effort: EffortLevel,
    /// Also total every configured model over the same segments
    pub compare_methods: bool,
    /// Explicit uphill walk cutoff in percent, overriding any detected one
    pub walk_threshold_override: Option<f64>,
}

impl PredictionRequest {
    /// Request with moderate effort, no athlete, and no comparison
    #[must_use]
    pub fn new(points: Vec<TrackPoint>, kind: ActivityKind) -> Self {
        Self {
            points,
            user_id: None,
            kind,
            effort: EffortLevel::default(),
            compare_methods: false,
            walk_threshold_override: None,
        }
    }

    /// Personalize with the athlete's stored profile
    #[must_use]
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Read the pace band for the given effort
    #[must_use]
    pub fn with_effort(mut self, effort: EffortLevel) -> Self {
        self.effort = effort;
        self
    }

    /// Also total every configured model over the same segments
    #[must_use]
    pub fn with_comparison(mut self) -> Self {
        self.compare_methods = true;
        self
    }

    /// Force the uphill walk cutoff (percent gradient)
    #[must_use]
    pub fn with_walk_threshold(mut self, cutoff_percent: f64) -> Self {
        self.walk_threshold_override = Some(cutoff_percent);
        self
    }
}

/// Route time prediction engine
///
/// Holds validated configuration and the long-lived pipeline components.
/// Without a profile store every prediction is generic; with one, requests
/// carrying a user id read that athlete's learned paces.
#[derive(Debug, Clone)]
pub struct RoutePredictor {
    config: EngineConfig,
    segmenter: RouteSegmenter,
    fatigue: FatigueModel,
    store: Option<SharedProfileStore>,
}

impl Default for RoutePredictor {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            segmenter: RouteSegmenter::default(),
            fatigue: FatigueModel::default(),
            store: None,
        }
    }
}

impl RoutePredictor {
    /// Build a predictor after validating the whole configuration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` when any section of the
    /// configuration violates an invariant.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let segmenter = RouteSegmenter::new(config.segmenter.clone())?;
        let fatigue = FatigueModel::new(config.fatigue.clone())?;
        Ok(Self {
            config,
            segmenter,
            fatigue,
            store: None,
        })
    }

    /// Attach a profile store so requests with a user id personalize
    #[must_use]
    pub fn with_store(mut self, store: SharedProfileStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Configuration this predictor runs under
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Predict how long the requested route takes
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidRoute` for a degenerate track and
    /// `EngineError::InvalidConfig` when a walk-threshold override is not
    /// finite. A missing profile is never an error.
    pub fn predict(&self, request: &PredictionRequest) -> EngineResult<CalculationResult> {
        let segments = self.segmenter.segment_route(&request.points)?;
        let route_distance_km: f64 = segments.iter().map(|s| s.distance_km).sum();

        let profile = self.fetch_profile(request);
        let threshold = self.threshold_service(request, &profile)?;
        let personalized =
            PersonalizedCalculator::new(Arc::clone(&profile), request.effort, &self.config)?;

        debug!(
            kind = request.kind.name(),
            segments = segments.len(),
            distance_km = route_distance_km,
            personalized = profile.has_data(),
            "predicting route"
        );

        let mut results: Vec<SegmentResult> = Vec::with_capacity(segments.len());
        let mut elapsed_hours = 0.0;
        let mut elapsed_km = 0.0;
        let mut peak_fatigue = 1.0f64;

        for segment in &segments {
            let decision = threshold.decide(segment, elapsed_hours, route_distance_km);
            let selection = personalized.select_pace(segment, decision.mode);

            let speed_kmh = crate::pace::clamp_speed(60.0 / selection.pace_min_per_km);
            let base_time_hours = segment.distance_km / speed_kmh;
            let (time_hours, fatigue_multiplier) = self.fatigue.apply(
                base_time_hours,
                elapsed_hours,
                elapsed_km,
                segment.gradient_percent(),
            );
            peak_fatigue = peak_fatigue.max(fatigue_multiplier);

            elapsed_hours += time_hours;
            elapsed_km += segment.distance_km;

            results.push(SegmentResult {
                segment: segment.clone(),
                movement_mode: decision.mode,
                method_used: selection.source.to_owned(),
                pace_min_per_km: crate::pace::pace_from_speed(speed_kmh) * fatigue_multiplier,
                fatigue_multiplier,
                time_hours,
                cumulative_time_hours: elapsed_hours,
                cumulative_distance_km: elapsed_km,
            });
        }

        if peak_fatigue > 1.0 {
            debug!(peak_multiplier = peak_fatigue, "fatigue degraded late segments");
        }

        let summary = self.summarize(&results, &profile, request, route_distance_km, elapsed_hours);
        let method_totals = if request.compare_methods {
            self.method_totals(&segments, &profile, request.effort)?
        } else {
            BTreeMap::new()
        };

        Ok(CalculationResult {
            segments: results,
            total_distance_km: route_distance_km,
            total_ascent_m: segments.iter().map(|s| s.elevation_gain_m).sum(),
            total_descent_m: segments.iter().map(|s| s.elevation_loss_m).sum(),
            total_time_hours: elapsed_hours,
            method_totals,
            summary,
        })
    }

    /// Run every configured model over the requested route, side by side
    ///
    /// Diagnostic path: raw model times with no threshold or fatigue
    /// adjustments, so differences reflect the formulas alone.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidRoute` for a degenerate track.
    pub fn compare(&self, request: &PredictionRequest) -> EngineResult<RouteComparison> {
        let segments = self.segmenter.segment_route(&request.points)?;
        let profile = self.fetch_profile(request);
        let models = self.comparison_models(&profile, request.effort)?;
        ComparisonService::compare(&segments, &models)
    }

    /// Stored profile for the requesting athlete, or an empty one
    fn fetch_profile(&self, request: &PredictionRequest) -> Arc<PerformanceProfile> {
        if let (Some(store), Some(user_id)) = (&self.store, request.user_id) {
            if let Some(profile) = store.get(user_id, request.kind) {
                debug!(%user_id, kind = request.kind.name(), "stored profile found");
                return profile;
            }
            debug!(%user_id, kind = request.kind.name(), "no stored profile, predicting generically");
        }
        Arc::new(PerformanceProfile::empty(
            request.user_id.unwrap_or_default(),
            request.kind,
        ))
    }

    /// Threshold service with the effective uphill cutoff: explicit override
    /// first, then the profile's detected cutoff, then the config default
    fn threshold_service(
        &self,
        request: &PredictionRequest,
        profile: &PerformanceProfile,
    ) -> EngineResult<HikeRunThreshold> {
        let config = self.config.threshold.clone();
        match request
            .walk_threshold_override
            .or(profile.walk_threshold_percent)
        {
            Some(cutoff) => HikeRunThreshold::with_uphill_cutoff(config, cutoff),
            None => HikeRunThreshold::new(config),
        }
    }

    fn summarize(
        &self,
        results: &[SegmentResult],
        profile: &PerformanceProfile,
        request: &PredictionRequest,
        route_distance_km: f64,
        total_time_hours: f64,
    ) -> RouteSummary {
        let mut summary = RouteSummary::default();
        for result in results {
            match result.movement_mode {
                MovementMode::Run => {
                    summary.run_segments += 1;
                    summary.run_distance_km += result.segment.distance_km;
                    summary.run_time_hours += result.time_hours;
                }
                MovementMode::Walk => {
                    summary.walk_segments += 1;
                    summary.walk_distance_km += result.segment.distance_km;
                    summary.walk_time_hours += result.time_hours;
                }
            }
        }
        if route_distance_km > 0.0 {
            summary.run_percent = summary.run_distance_km / route_distance_km * 100.0;
        }

        let flat_speed_kmh = self.flat_speed_kmh(profile, request);
        if flat_speed_kmh > 0.0 && route_distance_km > 0.0 {
            summary.flat_equivalent_hours = route_distance_km / flat_speed_kmh;
            summary.elevation_impact_percent = (total_time_hours - summary.flat_equivalent_hours)
                / summary.flat_equivalent_hours
                * 100.0;
        }
        summary
    }

    /// Flat cruising speed behind the flat-equivalent baseline: the athlete's
    /// learned flat pace when present, else the population default for the
    /// activity kind
    fn flat_speed_kmh(&self, profile: &PerformanceProfile, request: &PredictionRequest) -> f64 {
        profile
            .flat_pace(request.effort)
            .filter(|pace| *pace > 0.0)
            .map_or_else(
                || match request.kind {
                    ActivityKind::TrailRunning => 60.0 / self.config.gap.flat_pace_min_per_km,
                    ActivityKind::Hiking => POPULATION_FLAT_SPEED_KMH,
                },
                |pace| 60.0 / pace,
            )
    }

    /// Independent per-model totals over the identical segment sequence
    fn method_totals(
        &self,
        segments: &[MacroSegment],
        profile: &Arc<PerformanceProfile>,
        effort: EffortLevel,
    ) -> EngineResult<BTreeMap<String, f64>> {
        let models = self.comparison_models(profile, effort)?;
        let comparison = ComparisonService::compare(segments, &models)?;
        Ok(comparison
            .methods
            .into_iter()
            .map(|method| (method.name, method.total_hours))
            .collect())
    }

    /// Every model this engine can run, configured like the engine itself
    fn comparison_models(
        &self,
        profile: &Arc<PerformanceProfile>,
        effort: EffortLevel,
    ) -> EngineResult<Vec<PaceModel>> {
        Ok(vec![
            PaceModel::Naismith(NaismithCalculator::new(self.config.naismith.clone())),
            PaceModel::Tobler(ToblerCalculator::new(self.config.tobler.clone())),
            PaceModel::Gap(GapCalculator::new(
                self.config.gap.clone(),
                GapMode::Empirical,
            )?),
            PaceModel::Gap(GapCalculator::new(self.config.gap.clone(), GapMode::Hybrid)?),
            PaceModel::Personalized(PersonalizedCalculator::new(
                Arc::clone(profile),
                effort,
                &self.config,
            )?),
        ])
    }
}
