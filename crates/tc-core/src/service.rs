//! Tenant configuration service: the façade the rest of an application calls.
//!
//! Composes the registry, the cache and its sweeper, usage tracking and
//! artifact generation behind one API. Every read returns an owned copy.
//! Unknown tenants surface as `None`/`false`, never as an error.

use crate::artifacts::{generate_env_map, generate_style_sheet};
use crate::cache::{CacheStats, ConfigCache, SweepOutcome};
use crate::clock::{Clock, SystemClock};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::registry::WorkflowRegistry;
use crate::sync::AutoSync;
use crate::usage::{self, UsageReport};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tc_common::{Error, Result};
use tc_config::tree::{Branding, Features, Limits, Security};
use tc_config::validate::ValidationError;
use tc_config::{
    ConfigSnapshot, ConfigTree, EngineSettings, PartialConfigTree, TemplateCatalog, TreeUpdate,
    ValidationReport,
};

pub struct TenantConfigService {
    settings: EngineSettings,
    registry: Arc<WorkflowRegistry>,
    cache: Arc<ConfigCache>,
    sync: Mutex<Option<AutoSync>>,
    log: LogContext,
}

impl std::fmt::Debug for TenantConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantConfigService")
            .field("engine_id", &self.log.engine_id)
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .finish()
    }
}

impl TenantConfigService {
    /// Service with its own registry over the built-in templates plus any
    /// found in `settings.templates_dir`.
    pub fn new(settings: EngineSettings) -> Result<Self> {
        let catalog = match &settings.templates_dir {
            Some(dir) => TemplateCatalog::with_dir(dir).map_err(|e| Error::InvalidTemplate {
                name: dir.display().to_string(),
                message: e.to_string(),
            })?,
            None => TemplateCatalog::builtin(),
        };
        let log = LogContext::generate();
        let registry = Arc::new(WorkflowRegistry::new(catalog).with_log_context(log.clone()));
        Self::build(settings, registry, Arc::new(SystemClock), log)
    }

    /// Service over an existing registry and clock.
    pub fn with_registry(
        settings: EngineSettings,
        registry: Arc<WorkflowRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::build(settings, registry, clock, LogContext::generate())
    }

    fn build(
        settings: EngineSettings,
        registry: Arc<WorkflowRegistry>,
        clock: Arc<dyn Clock>,
        log: LogContext,
    ) -> Result<Self> {
        settings
            .validate()
            .map_err(|e| Error::InvalidSettings(e.to_string()))?;

        let cache = Arc::new(ConfigCache::new(
            registry.clone(),
            clock,
            &settings.cache,
            log.clone(),
        ));
        let service = Self {
            settings,
            registry,
            cache,
            sync: Mutex::new(None),
            log,
        };

        log_event!(
            service.log,
            INFO,
            event_names::ENGINE_STARTED,
            Stage::Init,
            "tenant config service started",
            cache_enabled = service.settings.cache.enabled,
            ttl_secs = service.settings.cache.ttl_seconds,
            sync_enabled = service.settings.sync.enabled
        );

        if service.settings.cache.enabled && service.settings.sync.enabled {
            service.start_auto_sync()?;
        }
        Ok(service)
    }

    fn sync_slot(&self) -> MutexGuard<'_, Option<AutoSync>> {
        self.sync.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<WorkflowRegistry> {
        &self.registry
    }

    pub fn log_context(&self) -> &LogContext {
        &self.log
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn get_tenant_config(&self, id: &str) -> Option<ConfigTree> {
        self.cache.get(id)
    }

    pub fn get_tenant_branding(&self, id: &str) -> Option<Branding> {
        self.get_tenant_config(id).map(|t| t.branding)
    }

    pub fn get_tenant_security(&self, id: &str) -> Option<Security> {
        self.get_tenant_config(id).map(|t| t.security)
    }

    pub fn get_tenant_features(&self, id: &str) -> Option<Features> {
        self.get_tenant_config(id).map(|t| t.features)
    }

    pub fn get_tenant_limits(&self, id: &str) -> Option<Limits> {
        self.get_tenant_config(id).map(|t| t.limits)
    }

    /// `false` for unknown tenants and unknown paths.
    pub fn is_feature_enabled(&self, id: &str, path: &str) -> bool {
        self.get_tenant_config(id)
            .is_some_and(|t| usage::is_feature_enabled(&t.features, path))
    }

    /// `false` for unknown tenants and unknown dimensions.
    pub fn is_limit_reached(&self, id: &str, dimension: &str) -> bool {
        self.get_tenant_config(id)
            .is_some_and(|t| usage::is_limit_reached_named(&t, dimension))
    }

    pub fn get_tenant_usage(&self, id: &str) -> Option<UsageReport> {
        self.get_tenant_config(id).map(|t| usage::usage_report(&t))
    }

    /// Snapshot of every registered tenant. Bypasses the cache.
    pub fn get_all_tenant_configs(&self) -> BTreeMap<String, ConfigTree> {
        self.registry.get_all()
    }

    pub fn tenant_style_sheet(&self, id: &str) -> Option<String> {
        self.get_tenant_config(id)
            .map(|t| generate_style_sheet(&t.branding))
    }

    pub fn tenant_env_map(&self, id: &str) -> Option<BTreeMap<String, String>> {
        self.get_tenant_config(id).map(|t| generate_env_map(&t))
    }

    pub fn tenant_snapshot(&self, id: &str) -> Result<Option<ConfigSnapshot>> {
        match self.get_tenant_config(id) {
            Some(tree) => Ok(Some(ConfigSnapshot::of(&tree)?)),
            None => Ok(None),
        }
    }

    /// Validate a registered tenant. An unknown tenant yields an invalid
    /// report with a single `id` issue.
    pub fn validate_tenant_config(&self, id: &str) -> ValidationReport {
        match self.registry.validate_tenant(id) {
            Some(report) => report,
            None => {
                let mut report = ValidationReport::ok();
                report.push(
                    "id",
                    ValidationError::SemanticError(format!("tenant '{}' not found", id)),
                );
                report
            }
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Replace top-level sections of `id`. The next read sees the change.
    pub fn update_tenant_config(&self, id: &str, update: &TreeUpdate) -> bool {
        self.cache.update(id, update)
    }

    pub fn create_tenant_from_template(
        &self,
        id: &str,
        template: &str,
        overrides: &PartialConfigTree,
        overwrite: bool,
    ) -> Result<ConfigTree> {
        let tree = self
            .registry
            .create_from_template(id, template, overrides, overwrite)?;
        self.cache.invalidate(id);
        Ok(tree)
    }

    pub fn remove_tenant_config(&self, id: &str) -> bool {
        let removed = self.registry.remove(id);
        self.cache.invalidate(id);
        removed
    }

    // ------------------------------------------------------------------
    // Cache and sync
    // ------------------------------------------------------------------

    /// Drop every cached entry. Returns how many were dropped.
    pub fn clear_cache(&self) -> usize {
        self.cache.invalidate_all()
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Run one sweep on the calling thread.
    pub fn sync_now(&self) -> SweepOutcome {
        self.cache.sweep()
    }

    /// Start the background sweeper. `false` if it was already running.
    pub fn start_auto_sync(&self) -> Result<bool> {
        let mut slot = self.sync_slot();
        if slot.as_ref().is_some_and(AutoSync::is_running) {
            return Ok(false);
        }
        let sync = AutoSync::start(
            self.cache.clone(),
            self.settings.sync_interval(),
            self.log.clone(),
        )
        .map_err(|e| Error::SyncFailed(format!("cannot spawn sweeper thread: {}", e)))?;
        *slot = Some(sync);
        Ok(true)
    }

    /// Stop the background sweeper and wait for it. `false` if none was running.
    pub fn stop_auto_sync(&self) -> bool {
        let running = self.sync_slot().take();
        match running {
            Some(sync) => {
                sync.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_auto_sync_running(&self) -> bool {
        self.sync_slot().as_ref().is_some_and(AutoSync::is_running)
    }
}

impl Drop for TenantConfigService {
    fn drop(&mut self) {
        self.stop_auto_sync();
        log_event!(
            self.log,
            DEBUG,
            event_names::ENGINE_STOPPED,
            Stage::Init,
            "tenant config service stopped"
        );
    }
}
