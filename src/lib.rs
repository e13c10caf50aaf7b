// ABOUTME: Main library entry point for the trailcast route time prediction engine
// ABOUTME: Exposes segmentation, pace models, personalization, and the prediction orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy; this is a pure
//   computation crate with no FFI surface
#![deny(unsafe_code)]

//! # Trailcast
//!
//! A route time prediction engine for hiking and trail running. Give it a
//! route as an ordered elevation track and it predicts how long the route
//! takes, per segment and in total, personalized to an athlete's recorded
//! history when one is available.
//!
//! ## Features
//!
//! - **Macro-segmentation**: raw tracks are smoothed and split into ascent,
//!   descent, and flat segments by sustained gradient direction
//! - **Four pace models**: Naismith-Langmuir, Tobler, grade-adjusted pace
//!   (empirical or metabolic-hybrid), and a personalized model behind one
//!   uniform contract
//! - **Personalization**: per-gradient-category paces learned from historical
//!   splits with outlier filtering, percentile bands, and climbing-ability
//!   scaling; an empty history degrades to generic predictions, never errors
//! - **Run/walk policy**: gradient cutoffs decide where running stops paying
//!   off, with per-athlete cutoff detection from uphill pace collapse
//! - **Fatigue**: late-route slowdown applied at each segment's cumulative
//!   effort midpoint
//!
//! ## Architecture
//!
//! The crate is a synchronous computation pipeline:
//! - **Models**: plain serde data structures for routes, profiles, results
//! - **Segmenter**: track points in, macro-segments out
//! - **Pace**: interchangeable per-segment time estimators
//! - **Profile**: split statistics, profile building, and storage
//! - **Threshold / Fatigue**: movement-mode and degradation policies
//! - **Engine**: the orchestrator wiring all of the above per request
//!
//! ## Example Usage
//!
//! ```rust
//! use trailcast::engine::{PredictionRequest, RoutePredictor};
//! use trailcast::models::{ActivityKind, TrackPoint};
//!
//! # fn main() -> Result<(), trailcast::errors::EngineError> {
//! // A gentle 10 km route climbing 100 m.
//! let points: Vec<TrackPoint> = (0..=100)
//!     .map(|i| TrackPoint::new(f64::from(i) * 0.1, 500.0 + f64::from(i)))
//!     .collect();
//!
//! let predictor = RoutePredictor::default();
//! let request = PredictionRequest::new(points, ActivityKind::TrailRunning);
//! let result = predictor.predict(&request)?;
//! println!(
//!     "{} over {:.1} km",
//!     result.formatted_total_time(),
//!     result.total_distance_km
//! );
//! # Ok(())
//! # }
//! ```

/// Side-by-side totals for every pace model over one route
pub mod comparison;

/// Engine configuration structs with validated policy defaults
pub mod config;

/// Numeric policy defaults for every component
pub mod constants;

/// Route prediction orchestrator
pub mod engine;

/// Unified error handling with a typed error enum and result alias
pub mod errors;

/// Time-based performance degradation model
pub mod fatigue;

/// Geometry helpers: haversine distance, elevation smoothing, gain/loss
pub mod geo;

/// Gradient band classification grid shared by profiles and predictions
pub mod gradient;

/// Common data models for routes, profiles, and prediction results
pub mod models;

/// Pace models: Naismith, Tobler, grade-adjusted, and personalized
pub mod pace;

/// Profile statistics, building from historical splits, and storage
pub mod profile;

/// Macro-segmentation of elevation tracks by gradient direction
pub mod segmenter;

/// Hike/run transition policy and personal cutoff detection
pub mod threshold;
