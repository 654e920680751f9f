//! Cache behavior against a counting store and a manual clock.

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tc_config::{CacheSettings, ConfigTree, TemplateCatalog, TreeUpdate};
use tc_core::logging::LogContext;
use tc_core::{ConfigCache, ManualClock, TenantStore, WorkflowRegistry};

/// Registry wrapper that counts fetches.
struct CountingStore {
    inner: WorkflowRegistry,
    fetches: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: WorkflowRegistry::new(TemplateCatalog::builtin()),
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl TenantStore for CountingStore {
    fn fetch(&self, id: &str) -> Option<(ConfigTree, u64)> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(id)
    }

    fn version(&self, id: &str) -> Option<u64> {
        TenantStore::version(&self.inner, id)
    }

    fn update(&self, id: &str, update: &TreeUpdate) -> bool {
        TenantStore::update(&self.inner, id, update)
    }
}

fn cache_over(store: Arc<CountingStore>, clock: Arc<ManualClock>, ttl: u64) -> ConfigCache {
    ConfigCache::new(
        store,
        clock,
        &CacheSettings {
            enabled: true,
            ttl_seconds: ttl,
        },
        LogContext::new("engine-test"),
    )
}

proptest! {
    #[test]
    fn entry_is_fresh_before_ttl_and_stale_after(ttl in 2u64..3600) {
        let store = Arc::new(CountingStore::new());
        store.inner.register("acme", ConfigTree::baseline());
        let clock = Arc::new(ManualClock::new());
        let cache = cache_over(store.clone(), clock.clone(), ttl);

        cache.get("acme");
        prop_assert_eq!(store.fetches(), 1);

        clock.advance_secs(ttl - 1);
        cache.get("acme");
        prop_assert_eq!(store.fetches(), 1);

        clock.advance_secs(2);
        cache.get("acme");
        prop_assert_eq!(store.fetches(), 2);
    }
}

#[test]
fn unknown_tenant_is_fetched_every_time() {
    let store = Arc::new(CountingStore::new());
    let cache = cache_over(store.clone(), Arc::new(ManualClock::new()), 300);
    assert!(cache.get("ghost").is_none());
    assert!(cache.get("ghost").is_none());
    assert_eq!(store.fetches(), 2);
    assert_eq!(cache.stats().size, 0);
}

#[test]
fn update_refreshes_without_waiting_for_ttl() {
    let store = Arc::new(CountingStore::new());
    store.inner.register("acme", ConfigTree::baseline());
    let cache = cache_over(store.clone(), Arc::new(ManualClock::new()), 300);
    cache.get("acme");

    let update = TreeUpdate {
        subdomain: Some("acme".to_string()),
        ..Default::default()
    };
    assert!(cache.update("acme", &update));
    let fetches = store.fetches();
    assert_eq!(cache.get("acme").unwrap().subdomain, "acme");
    // Served from the refreshed entry.
    assert_eq!(store.fetches(), fetches);
}

#[test]
fn quiet_sweep_does_not_refetch() {
    let store = Arc::new(CountingStore::new());
    for id in ["a", "b"] {
        store.inner.register(id, ConfigTree::baseline());
    }
    let cache = cache_over(store.clone(), Arc::new(ManualClock::new()), 300);
    cache.get("a");
    cache.get("b");
    let before = store.fetches();

    let outcome = cache.sweep();
    assert!(outcome.is_noop());
    assert_eq!(store.fetches(), before);

    store.inner.update(
        "b",
        &TreeUpdate {
            name: Some("B".to_string()),
            ..Default::default()
        },
    );
    let outcome = cache.sweep();
    assert_eq!(outcome.refreshed, 1);
    assert_eq!(outcome.untouched, 1);
    assert_eq!(store.fetches(), before + 1);
}

#[test]
fn stats_count_hits_and_misses() {
    let store = Arc::new(CountingStore::new());
    let cache = cache_over(store, Arc::new(ManualClock::new()), 300);
    cache.get("demo");
    cache.get("demo");
    cache.get("demo");
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.keys, vec!["demo".to_string()]);
}

/// Registry wrapper whose fetches on the thread named `held` read the tree,
/// report it, then wait for a release before returning.
struct GatedStore {
    inner: WorkflowRegistry,
    fetched: Mutex<Sender<u64>>,
    release: Mutex<Receiver<()>>,
}

impl TenantStore for GatedStore {
    fn fetch(&self, id: &str) -> Option<(ConfigTree, u64)> {
        let result = self.inner.fetch(id);
        if thread::current().name() == Some("held") {
            let version = result.as_ref().map_or(0, |(_, v)| *v);
            let _ = self.fetched.lock().unwrap().send(version);
            let _ = self
                .release
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(10));
        }
        result
    }

    fn version(&self, id: &str) -> Option<u64> {
        TenantStore::version(&self.inner, id)
    }

    fn update(&self, id: &str, update: &TreeUpdate) -> bool {
        TenantStore::update(&self.inner, id, update)
    }
}

#[test]
fn late_refresh_does_not_overwrite_newer_entry() {
    let (fetched_tx, fetched_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let store = Arc::new(GatedStore {
        inner: WorkflowRegistry::new(TemplateCatalog::builtin()),
        fetched: Mutex::new(fetched_tx),
        release: Mutex::new(release_rx),
    });
    store.inner.register("acme", ConfigTree::baseline());
    let cache = Arc::new(ConfigCache::new(
        store.clone(),
        Arc::new(ManualClock::new()),
        &CacheSettings {
            enabled: true,
            ttl_seconds: 300,
        },
        LogContext::new("engine-test"),
    ));

    // A refresh (as a sweep tick would run it) reads the old version and stalls.
    let held = {
        let cache = cache.clone();
        thread::Builder::new()
            .name("held".to_string())
            .spawn(move || cache.refresh("acme"))
            .unwrap()
    };
    let old_version = fetched_rx.recv_timeout(Duration::from_secs(10)).unwrap();

    let update = TreeUpdate {
        name: Some("New".to_string()),
        ..Default::default()
    };
    assert!(cache.update("acme", &update));
    release_tx.send(()).unwrap();

    let late = held.join().unwrap().unwrap();
    assert_eq!(late.name, "New");
    assert!(store.inner.version("acme").unwrap() > old_version);
    assert_eq!(cache.get("acme").unwrap().name, "New");
}
