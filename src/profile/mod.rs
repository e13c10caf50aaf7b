// ABOUTME: Personalization subsystem building and storing per-user pace profiles
// ABOUTME: Re-exports the profile builder, sample statistics, and the repository boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Personalization
//!
//! Turns historical terrain splits into per-user pace profiles and stores
//! them for prediction time.
//!
//! - [`stats`] holds the sample statistics (percentiles, IQR fences)
//! - [`builder`] distills splits into a [`crate::models::PerformanceProfile`]
//! - [`store`] is the storage boundary; the in-memory implementation backs
//!   tests and single-process deployments
//!
//! Profiles are replaced whole on every rebuild and shared behind `Arc`, so
//! in-flight predictions keep a consistent view while a sync job saves a
//! fresh one.

pub mod builder;
pub mod stats;
pub mod store;

pub use builder::ProfileBuilder;
pub use store::{
    create_shared_store, InMemoryProfileStore, ProfileRepository, SharedProfileStore, StoreStats,
};
