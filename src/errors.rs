// ABOUTME: Error types for route prediction with structured context per failure class
// ABOUTME: Defines EngineError enum and the EngineResult alias used across the crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use thiserror::Error;

/// Result alias used throughout the crate
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors produced by the prediction engine
///
/// Every failure here is a local computation error: malformed route input or
/// invalid configuration. Storage and network failures belong to external
/// collaborators and never surface through this type; an unavailable profile
/// is treated as an empty profile, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Route input cannot be segmented
    #[error("Invalid route: {reason}")]
    InvalidRoute {
        /// Why the route was rejected
        reason: String,
    },

    /// A configuration value fails validation at construction time
    #[error("Invalid configuration '{parameter}': {reason}")]
    InvalidConfig {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Reason why the value is invalid
        reason: String,
    },

    /// The in-memory profile store could not complete a write
    #[error("Profile store failure: {reason}")]
    ProfileStore {
        /// Reason for the store failure
        reason: String,
    },
}

impl EngineError {
    /// Create an `InvalidRoute` error
    pub fn invalid_route(reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            reason: reason.into(),
        }
    }

    /// Create an `InvalidConfig` error
    pub fn invalid_config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter,
            reason: reason.into(),
        }
    }

    /// Create a `ProfileStore` error
    pub fn profile_store(reason: impl Into<String>) -> Self {
        Self::ProfileStore {
            reason: reason.into(),
        }
    }
}
