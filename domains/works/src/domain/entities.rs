//! Work entities and the gallery store
//!
//! A work is a completed restoration result. Works are ephemeral by
//! design: the gallery keeps them for 24 hours and the expiry scheduler
//! sweeps anything older, so the user is expected to save what they want
//! to keep.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use relume_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a finished work is retained before eviction
pub fn retention() -> Duration {
    Duration::hours(24)
}

/// Work kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    Photo,
    Video,
}

/// A completed restoration result.
///
/// Immutable after creation; the only way out of the gallery is explicit
/// deletion or retention expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub kind: WorkKind,
    pub title: String,
    /// URL or data reference to the produced artifact
    pub locator: String,
    pub display_date: String,
    pub created_at: DateTime<Utc>,
}

impl WorkItem {
    pub fn new(
        kind: WorkKind,
        title: impl Into<String>,
        locator: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            locator: locator.into(),
            display_date: created_at.format("%Y-%m-%d").to_string(),
            created_at,
        }
    }

    /// Whether this work has outlived its retention window
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }

    /// Time left before eviction, clamped to zero
    pub fn remaining(&self, now: DateTime<Utc>, ttl: Duration) -> Duration {
        (self.created_at + ttl - now).max(Duration::zero())
    }
}

/// Ordered collection of works, most-recent-first
#[derive(Debug, Default)]
pub struct WorkGallery {
    items: Mutex<Vec<WorkItem>>,
}

impl WorkGallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a work. Duplicate ids are rejected.
    pub fn insert(&self, item: WorkItem) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|w| w.id == item.id) {
            return Err(Error::Conflict(format!(
                "work {} is already in the gallery",
                item.id
            )));
        }
        tracing::info!(id = %item.id, kind = ?item.kind, "Work added to gallery");
        items.insert(0, item);
        Ok(())
    }

    /// Remove every work whose id is in `ids`; unknown ids are a no-op.
    /// Returns how many works were removed.
    pub fn remove_many(&self, ids: &HashSet<Uuid>) -> usize {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|w| !ids.contains(&w.id));
        before - items.len()
    }

    /// Evict works older than `ttl`. Idempotent: with no expired items
    /// this changes nothing. Returns the ids of the evicted works.
    pub fn sweep_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<Uuid> {
        let mut items = self.items.lock().unwrap();
        let expired: Vec<Uuid> = items
            .iter()
            .filter(|w| w.is_expired(now, ttl))
            .map(|w| w.id)
            .collect();
        if !expired.is_empty() {
            items.retain(|w| !w.is_expired(now, ttl));
            tracing::info!(count = expired.len(), "Expired works evicted");
        }
        expired
    }

    /// Snapshot of the collection, most-recent-first
    pub fn items(&self) -> Vec<WorkItem> {
        self.items.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}
