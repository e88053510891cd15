//! Access decision cache
//!
//! Bounded, TTL-based, in-process cache of [`AccessResult`]s keyed by owner,
//! viewer and the check configuration.
//!
//! - Expiry is lazy: `get` ignores stale entries, it never removes them.
//! - When full, `set` sweeps expired entries; if the cache is still full the
//!   new entry is dropped. There is no LRU eviction.
//! - Invalidation by identity goes through a secondary index so an id is
//!   only ever compared whole, as owner or viewer.

use crate::access_control::types::{AccessResult, CheckConfig};
use crate::model::AccessLevel;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default maximum number of cached decisions
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Longest lifetime an entry can have, whatever ttl it was stored with
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Composite cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub owner_id: String,
    pub viewer_id: String,
    pub level: AccessLevel,
    pub entity_id: Option<String>,
    pub entity_type: Option<String>,
}

impl CacheKey {
    pub fn new(owner_id: &str, viewer_id: &str, config: &CheckConfig) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            viewer_id: viewer_id.to_string(),
            level: config.required_level,
            entity_id: config.entity_id.clone(),
            entity_type: config.entity_type.clone(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.owner_id,
            self.viewer_id,
            self.level,
            self.entity_id.as_deref().unwrap_or_default(),
            self.entity_type.as_deref().unwrap_or_default()
        )
    }
}

/// A cached decision and its expiry
#[derive(Debug, Clone)]
struct CacheItem {
    result: AccessResult,
    expires_at: Instant,
}

impl CacheItem {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Entries and the identity index, kept under one lock
#[derive(Debug, Default)]
struct CacheState {
    items: HashMap<CacheKey, CacheItem>,
    by_identity: HashMap<String, HashSet<CacheKey>>,
}

impl CacheState {
    fn insert(&mut self, key: CacheKey, item: CacheItem) {
        for id in [&key.owner_id, &key.viewer_id] {
            self.by_identity
                .entry(id.clone())
                .or_default()
                .insert(key.clone());
        }
        self.items.insert(key, item);
    }

    fn remove(&mut self, key: &CacheKey) {
        if self.items.remove(key).is_none() {
            return;
        }
        for id in [&key.owner_id, &key.viewer_id] {
            if let Some(keys) = self.by_identity.get_mut(id) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_identity.remove(id);
                }
            }
        }
    }

    fn sweep_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<CacheKey> = self
            .items
            .iter()
            .filter(|(_, item)| item.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }
}

/// In-memory cache of access decisions
#[derive(Debug)]
pub struct AccessCache {
    state: RwLock<CacheState>,
    max_entries: usize,
}

impl AccessCache {
    /// Create a cache holding at most `max_entries` decisions
    ///
    /// A capacity of zero disables caching.
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            max_entries,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("access cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("access cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Look up an unexpired decision
    ///
    /// The returned result is flagged `cached`.
    pub fn get(&self, key: &CacheKey) -> Option<AccessResult> {
        let state = self.read_state();
        let item = state.items.get(key)?;
        if item.is_expired(Instant::now()) {
            trace!(%key, "Cache entry expired");
            return None;
        }
        let mut result = item.result.clone();
        result.cached = true;
        Some(result)
    }

    /// Store a decision for `ttl`
    ///
    /// Returns `false` when the cache is full (after sweeping expired
    /// entries) and the decision was not stored.
    pub fn set(&self, key: CacheKey, result: &AccessResult, ttl: Duration) -> bool {
        if self.max_entries == 0 {
            return false;
        }

        let now = Instant::now();
        let mut state = self.write_state();

        if !state.items.contains_key(&key) && state.items.len() >= self.max_entries {
            let swept = state.sweep_expired(now);
            trace!(swept, "Swept expired cache entries");

            if state.items.len() >= self.max_entries {
                debug!(%key, capacity = self.max_entries, "Access cache full, skipping insert");
                return false;
            }
        }

        state.insert(
            key,
            CacheItem {
                result: result.clone(),
                expires_at: expiry_after(now, ttl),
            },
        );
        true
    }

    /// Invalidate every entry where one of `user_ids` is the owner or viewer
    ///
    /// Returns the number of entries removed.
    pub fn clear<S: AsRef<str>>(&self, user_ids: &[S]) -> usize {
        if user_ids.is_empty() {
            return 0;
        }

        let mut state = self.write_state();
        let keys: HashSet<CacheKey> = user_ids
            .iter()
            .filter_map(|id| state.by_identity.get(id.as_ref()))
            .flatten()
            .cloned()
            .collect();

        for key in &keys {
            state.remove(key);
        }
        debug!(removed = keys.len(), "Cleared access cache entries");
        keys.len()
    }

    /// Drop every entry
    pub fn clear_all(&self) {
        let mut state = self.write_state();
        state.items.clear();
        state.by_identity.clear();
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.read_state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}

/// `now + ttl`, capped at [`MAX_ENTRY_TTL`]
fn expiry_after(now: Instant, ttl: Duration) -> Instant {
    let ttl = ttl.min(MAX_ENTRY_TTL);
    now.checked_add(ttl).unwrap_or_else(|| {
        warn!(?ttl, "Cache ttl out of range, entry expires immediately");
        now
    })
}

impl Default for AccessCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
