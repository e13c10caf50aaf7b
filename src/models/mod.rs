// ABOUTME: Core data models for routes, performance profiles, and prediction results
// ABOUTME: Re-exports TrackPoint, MacroSegment, PerformanceProfile and result types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Data Models
//!
//! Core data structures flowing through the prediction pipeline: route
//! geometry in, segment-level and route-level estimates out, with per-user
//! performance profiles in between.
//!
//! ## Design Principles
//!
//! - **Immutable artifacts**: segments and results are derived per request
//!   and never mutated afterward
//! - **Serializable**: every public model supports JSON serialization for
//!   API collaborators
//! - **Owned data**: models carry no references, so prediction requests
//!   share nothing and run independently

// Domain modules
mod profile;
mod result;
mod route;

// Route domain
pub use route::{GeoPoint, MacroSegment, SegmentType, TrackPoint};

// Profile domain
pub use profile::{
    ActivityKind, CategoryStats, EffortLevel, PaceBands, PerformanceProfile, ProfileSnapshot,
    SplitSample,
};

// Result domain
pub use result::{
    format_hours_hm, CalculationResult, MethodResult, MovementMode, RouteSummary, SegmentResult,
};
