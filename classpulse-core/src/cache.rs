//! Metrics cache
//!
//! Memoizes computed results per instructor and parameter set. An entry is
//! served while it is younger than the TTL; after that the next lookup
//! recomputes it. Writers must call [`MetricsCache::invalidate`] whenever an
//! instructor's records change.
//!
//! The map sits behind one `Mutex`. The compute function always runs with
//! the lock released, so two concurrent misses on the same key may both
//! compute; the last one stored wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::types::InstructorId;

// ============================================
// Clock
// ============================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        if let Ok(delta) = chrono::Duration::from_std(by) {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

// ============================================
// Keys and entries
// ============================================

/// Identifies one computation: instructor, function name and a digest of the
/// canonical JSON rendering of its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    instructor_id: InstructorId,
    function: String,
    args_digest: String,
}

impl CacheKey {
    pub fn new<A: Serialize + ?Sized>(
        instructor_id: InstructorId,
        function: &str,
        args: &A,
    ) -> Result<Self> {
        let canonical = serde_json::to_vec(args)?;
        Ok(Self {
            instructor_id,
            function: function.to_string(),
            args_digest: hex::encode(Sha256::digest(&canonical)),
        })
    }

    pub fn instructor_id(&self) -> InstructorId {
        self.instructor_id
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.instructor_id,
            self.function,
            &self.args_digest[..12.min(self.args_digest.len())]
        )
    }
}

/// A stored value and when it was computed.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: CacheKey,
    pub value: V,
    pub computed_at: DateTime<Utc>,
}

// ============================================
// Cache
// ============================================

/// TTL cache of computed metrics.
pub struct MetricsCache<V> {
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> std::fmt::Debug for MetricsCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCache")
            .field("entries", &"<Mutex>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<V: Clone> MetricsCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the fresh value for `key`, or compute and store it.
    ///
    /// `force_recalculate` skips the lookup and overwrites any existing entry.
    /// Errors from `compute` propagate and leave the cache untouched.
    pub fn get_or_compute<F>(&self, key: CacheKey, force_recalculate: bool, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if !force_recalculate {
            let now = self.clock.now();
            let mut entries = lock(&self.entries);
            match entries.get(&key) {
                Some(entry) if self.is_fresh(entry, now) => {
                    tracing::debug!(key = %key, "Metrics cache hit");
                    return Ok(entry.value.clone());
                }
                Some(_) => {
                    tracing::debug!(key = %key, "Metrics cache entry expired");
                    entries.remove(&key);
                }
                None => tracing::debug!(key = %key, "Metrics cache miss"),
            }
        } else {
            tracing::debug!(key = %key, "Forced metrics recalculation");
        }

        let value = compute()?;
        let entry = CacheEntry {
            key: key.clone(),
            value: value.clone(),
            computed_at: self.clock.now(),
        };
        lock(&self.entries).insert(key, entry);
        Ok(value)
    }

    /// Drop every entry of `instructor`, or everything when `None`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, instructor: Option<InstructorId>) -> usize {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        match instructor {
            Some(id) => entries.retain(|key, _| key.instructor_id() != id),
            None => entries.clear(),
        }
        let removed = before - entries.len();
        tracing::info!(instructor = ?instructor, removed, "Invalidated metrics cache");
        removed
    }

    /// Remove entries past their TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        let age = (now - entry.computed_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age < self.ttl
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!("Metrics cache lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
