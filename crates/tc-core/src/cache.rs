//! Read-through, time-boxed cache in front of the tenant store.
//!
//! Entries remember the store version they were read at, so a sweep only
//! refreshes tenants whose data actually moved. Unknown tenants are never
//! cached.

use crate::clock::Clock;
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tc_config::{CacheSettings, ConfigTree, TreeUpdate};

/// Authoritative source of tenant trees.
pub trait TenantStore: Send + Sync {
    /// Current tree and version for `id`; `None` if the tenant is unknown.
    fn fetch(&self, id: &str) -> Option<(ConfigTree, u64)>;

    /// Current version of `id` without copying the tree.
    fn version(&self, id: &str) -> Option<u64>;

    /// Apply a top-level replacement. `false` if the tenant is unknown.
    fn update(&self, id: &str, update: &TreeUpdate) -> bool;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    tree: ConfigTree,
    cached_at: Instant,
    version: u64,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    /// Cached tenant ids, sorted.
    pub keys: Vec<String>,
    pub hits: u64,
    pub misses: u64,
}

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepOutcome {
    /// Entries re-read because the store version moved.
    pub refreshed: usize,
    /// Entries dropped because the tenant no longer exists.
    pub evicted: usize,
    pub untouched: usize,
}

impl SweepOutcome {
    pub fn is_noop(&self) -> bool {
        self.refreshed == 0 && self.evicted == 0
    }
}

pub struct ConfigCache {
    store: Arc<dyn TenantStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    enabled: bool,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    log: LogContext,
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("ttl", &self.ttl)
            .field("enabled", &self.enabled)
            .field("size", &self.len())
            .finish()
    }
}

impl ConfigCache {
    pub fn new(
        store: Arc<dyn TenantStore>,
        clock: Arc<dyn Clock>,
        settings: &CacheSettings,
        log: LogContext,
    ) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::from_secs(settings.ttl_seconds),
            enabled: settings.enabled,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            log,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Tree for `id`, served from cache while younger than the TTL.
    pub fn get(&self, id: &str) -> Option<ConfigTree> {
        if !self.enabled {
            return self.store.fetch(id).map(|(tree, _)| tree);
        }

        let now = self.clock.now();
        if let Some(entry) = self.read().get(id) {
            if now.saturating_duration_since(entry.cached_at) < self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log_event!(
                    self.log,
                    DEBUG,
                    event_names::CACHE_HIT,
                    Stage::Cache,
                    "cache hit",
                    tenant_id = %id
                );
                return Some(entry.tree.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log_event!(
            self.log,
            DEBUG,
            event_names::CACHE_MISS,
            Stage::Cache,
            "cache miss",
            tenant_id = %id
        );
        self.refresh(id)
    }

    /// Re-read `id` from the store and cache it. An unknown tenant drops any
    /// stale entry and returns `None`.
    ///
    /// The fetch runs without the cache lock, so a concurrent refresh may
    /// already have cached a newer version; that entry is kept and returned.
    pub fn refresh(&self, id: &str) -> Option<ConfigTree> {
        match self.store.fetch(id) {
            Some((tree, version)) => {
                if !self.enabled {
                    return Some(tree);
                }
                let mut entries = self.write();
                if let Some(existing) = entries.get(id) {
                    if existing.version > version {
                        return Some(existing.tree.clone());
                    }
                }
                let entry = CacheEntry {
                    tree: tree.clone(),
                    cached_at: self.clock.now(),
                    version,
                };
                entries.insert(id.to_string(), entry);
                Some(tree)
            }
            None => {
                self.write().remove(id);
                None
            }
        }
    }

    /// Write through to the store; on success the entry is refreshed at once.
    pub fn update(&self, id: &str, update: &TreeUpdate) -> bool {
        if !self.store.update(id, update) {
            return false;
        }
        self.refresh(id);
        true
    }

    /// Drop one entry. Returns whether it was cached.
    pub fn invalidate(&self, id: &str) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            log_event!(
                self.log,
                DEBUG,
                event_names::CACHE_INVALIDATED,
                Stage::Cache,
                "cache entry invalidated",
                tenant_id = %id
            );
        }
        removed
    }

    /// Drop every entry. Returns how many were dropped.
    pub fn invalidate_all(&self) -> usize {
        let dropped = {
            let mut entries = self.write();
            let n = entries.len();
            entries.clear();
            n
        };
        log_event!(
            self.log,
            INFO,
            event_names::CACHE_CLEARED,
            Stage::Cache,
            "cache cleared",
            dropped = dropped
        );
        dropped
    }

    /// Bring cached entries in line with the store.
    ///
    /// Entries whose store version moved are re-read, entries whose tenant
    /// disappeared are evicted, the rest are left as they are.
    pub fn sweep(&self) -> SweepOutcome {
        let cached: Vec<(String, u64)> = self
            .read()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.version))
            .collect();

        let mut outcome = SweepOutcome::default();
        for (id, cached_version) in cached {
            match self.store.version(&id) {
                Some(current) if current == cached_version => outcome.untouched += 1,
                Some(_) => {
                    if self.refresh(&id).is_some() {
                        outcome.refreshed += 1;
                    } else {
                        outcome.evicted += 1;
                    }
                }
                None => {
                    self.write().remove(&id);
                    outcome.evicted += 1;
                }
            }
        }
        outcome
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
