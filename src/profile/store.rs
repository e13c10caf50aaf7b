// ABOUTME: Storage boundary for performance profiles with an in-memory implementation
// ABOUTME: Whole-profile atomic replacement behind Arc plus an append-only snapshot log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Profile storage.
//!
//! The engine reaches profiles only through [`ProfileRepository`], keyed by
//! `(user_id, activity kind)`. Profiles are replaced whole on every save and
//! handed out behind `Arc`: a reader holds either the old or the new profile
//! in full, never a mix. Every save appends an immutable snapshot for
//! auditing profile evolution.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::warn;
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};
use crate::models::{ActivityKind, PerformanceProfile, ProfileSnapshot};

/// Storage boundary for performance profiles
///
/// Production backends live in collaborator services; the in-memory store
/// backs tests and single-process deployments. A missing profile is an
/// `Option`, never an error.
pub trait ProfileRepository: Send + Sync {
    /// Current profile for a user and activity kind
    fn get(&self, user_id: Uuid, kind: ActivityKind) -> Option<Arc<PerformanceProfile>>;

    /// Replace the stored profile atomically and append a snapshot
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ProfileStore` when the write cannot complete.
    fn save(&self, profile: PerformanceProfile, reason: &str) -> EngineResult<()>;

    /// Snapshot history for a user and activity kind, oldest first
    fn snapshots(&self, user_id: Uuid, kind: ActivityKind) -> Vec<ProfileSnapshot>;
}

/// Thread-safe in-memory profile store
///
/// # Thread Safety
///
/// Uses `RwLock` internally and is safe to share across threads via `Arc`.
/// A poisoned lock degrades reads to "no profile" and fails writes with
/// `EngineError::ProfileStore`; it never panics in either direction.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<(Uuid, ActivityKind), Arc<PerformanceProfile>>>,
    snapshot_log: RwLock<Vec<ProfileSnapshot>>,
}

impl InMemoryProfileStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store statistics
    ///
    /// Returns zeroed stats if a lock is poisoned.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let Ok(profiles) = self.profiles.read() else {
            return StoreStats::default();
        };
        let user_count = profiles
            .keys()
            .map(|(user_id, _)| *user_id)
            .collect::<HashSet<_>>()
            .len();
        let snapshot_count = self.snapshot_log.read().map_or(0, |log| log.len());
        StoreStats {
            profile_count: profiles.len(),
            user_count,
            snapshot_count,
        }
    }
}

impl ProfileRepository for InMemoryProfileStore {
    fn get(&self, user_id: Uuid, kind: ActivityKind) -> Option<Arc<PerformanceProfile>> {
        let Ok(profiles) = self.profiles.read() else {
            warn!(%user_id, kind = kind.name(), "profile store lock poisoned, treating profile as absent");
            return None;
        };
        profiles.get(&(user_id, kind)).cloned()
    }

    fn save(&self, profile: PerformanceProfile, reason: &str) -> EngineResult<()> {
        let key = (profile.user_id, profile.kind);
        let snapshot = ProfileSnapshot::capture(profile.clone(), reason);
        {
            let Ok(mut profiles) = self.profiles.write() else {
                return Err(EngineError::profile_store("profile map lock poisoned"));
            };
            profiles.insert(key, Arc::new(profile));
        }
        let Ok(mut log) = self.snapshot_log.write() else {
            return Err(EngineError::profile_store("snapshot log lock poisoned"));
        };
        log.push(snapshot);
        Ok(())
    }

    fn snapshots(&self, user_id: Uuid, kind: ActivityKind) -> Vec<ProfileSnapshot> {
        let Ok(log) = self.snapshot_log.read() else {
            return Vec::new();
        };
        log.iter()
            .filter(|snapshot| snapshot.user_id == user_id && snapshot.kind == kind)
            .cloned()
            .collect()
    }
}

/// Counts of what the store currently holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Stored (user, kind) profiles
    pub profile_count: usize,
    /// Distinct users with at least one profile
    pub user_count: usize,
    /// Snapshots accumulated across all saves
    pub snapshot_count: usize,
}

/// Thread-safe handle to an in-memory profile store
pub type SharedProfileStore = Arc<InMemoryProfileStore>;

/// Create a new shared in-memory store
#[must_use]
pub fn create_shared_store() -> SharedProfileStore {
    Arc::new(InMemoryProfileStore::new())
}
