//! Workflow registry: the single owner of every resolved tenant tree.
//!
//! Reads hand out deep copies; a tree inside the registry can only change
//! through [`WorkflowRegistry::register`], [`WorkflowRegistry::update`] or
//! [`WorkflowRegistry::remove`]. Every mutation bumps a per-tenant version
//! the cache uses to decide what a sweep has to refresh.

use crate::cache::TenantStore;
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tc_common::{Error, Result, DEFAULT_TENANT_ID};
use tc_config::validate::ValidationError;
use tc_config::{
    resolve, validate_tree, ConfigTree, PartialConfigTree, ResolveStamp, TemplateCatalog,
    TreeUpdate, ValidationReport,
};

#[derive(Debug, Clone)]
struct Entry {
    tree: ConfigTree,
    version: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<String, Entry>,
    /// Versions are unique across the registry, so a re-registered tenant
    /// never reuses a version a cache may still hold.
    next_version: u64,
    /// Built-in tenants explicitly removed; they are not provisioned again
    /// until registered anew.
    retired: HashSet<String>,
}

impl RegistryState {
    fn insert(&mut self, id: &str, tree: ConfigTree) -> u64 {
        self.retired.remove(id);
        self.next_version += 1;
        let version = self.next_version;
        self.entries.insert(id.to_string(), Entry { tree, version });
        version
    }
}

/// Store of resolved tenant trees keyed by tenant id.
#[derive(Debug)]
pub struct WorkflowRegistry {
    state: RwLock<RegistryState>,
    baseline: ConfigTree,
    catalog: TemplateCatalog,
    log: LogContext,
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new(TemplateCatalog::builtin())
    }
}

impl WorkflowRegistry {
    /// Registry over `catalog`. The baseline tree is built here, once.
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self::with_baseline(ConfigTree::baseline(), catalog)
    }

    pub fn with_baseline(baseline: ConfigTree, catalog: TemplateCatalog) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            baseline,
            catalog,
            log: LogContext::generate(),
        }
    }

    /// Share the log context of an owning engine.
    pub fn with_log_context(mut self, log: LogContext) -> Self {
        self.log = log;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the baseline every template resolution starts from.
    pub fn baseline(&self) -> ConfigTree {
        self.baseline.clone()
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Insert or replace `id`. Last write wins.
    pub fn register(&self, id: &str, tree: ConfigTree) -> u64 {
        let version = self.write().insert(id, tree);
        log_event!(
            self.log,
            DEBUG,
            event_names::REGISTRY_REGISTERED,
            Stage::Registry,
            "tenant registered",
            tenant_id = %id,
            version = version
        );
        version
    }

    /// Deep copy of the tree for `id`, provisioning built-in tenants on
    /// first lookup. `None` means the tenant is unknown.
    pub fn get(&self, id: &str) -> Option<ConfigTree> {
        self.get_versioned(id).map(|(tree, _)| tree)
    }

    /// Like [`get`](Self::get), with the entry's current version.
    pub fn get_versioned(&self, id: &str) -> Option<(ConfigTree, u64)> {
        if let Some(entry) = self.read().entries.get(id) {
            return Some((entry.tree.clone(), entry.version));
        }
        self.provision_builtin(id)
    }

    /// Whether `id` names a tenant that exists implicitly.
    fn is_builtin(&self, id: &str) -> bool {
        id == DEFAULT_TENANT_ID || self.catalog.contains(id)
    }

    /// Tenants `default` and any catalog template name exist implicitly,
    /// unless they were removed.
    fn provision_builtin(&self, id: &str) -> Option<(ConfigTree, u64)> {
        let template = if id == DEFAULT_TENANT_ID {
            PartialConfigTree::default()
        } else if self.catalog.contains(id) {
            self.catalog.layer(id)
        } else {
            return None;
        };

        let mut state = self.write();
        // Another caller may have provisioned it between the two locks.
        if let Some(entry) = state.entries.get(id) {
            return Some((entry.tree.clone(), entry.version));
        }
        if state.retired.contains(id) {
            return None;
        }
        let tree = resolve(
            &self.baseline,
            &template,
            &PartialConfigTree::default(),
            &ResolveStamp::new(id),
        );
        let version = state.insert(id, tree.clone());
        drop(state);

        log_event!(
            self.log,
            INFO,
            event_names::REGISTRY_PROVISIONED,
            Stage::Registry,
            "built-in tenant provisioned",
            tenant_id = %id
        );
        Some((tree, version))
    }

    /// Snapshot of every registered tree. Mutating it never touches the registry.
    pub fn get_all(&self) -> BTreeMap<String, ConfigTree> {
        self.read()
            .entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.tree.clone()))
            .collect()
    }

    /// Replace the top-level keys present in `update`. `false` if `id` is unknown.
    /// A built-in tenant not yet looked up is provisioned first.
    pub fn update(&self, id: &str, update: &TreeUpdate) -> bool {
        if !self.contains(id) && self.provision_builtin(id).is_none() {
            return false;
        }
        let mut state = self.write();
        state.next_version += 1;
        let version = state.next_version;
        let Some(entry) = state.entries.get_mut(id) else {
            return false;
        };
        update.apply_to(&mut entry.tree);
        entry.version = version;
        drop(state);

        log_event!(
            self.log,
            DEBUG,
            event_names::REGISTRY_UPDATED,
            Stage::Registry,
            "tenant updated",
            tenant_id = %id,
            version = version
        );
        true
    }

    /// Delete `id`. Returns whether something was deleted.
    ///
    /// Removing a built-in tenant retires it: later lookups return `None`
    /// until the id is registered again.
    pub fn remove(&self, id: &str) -> bool {
        let builtin = self.is_builtin(id);
        let removed = {
            let mut state = self.write();
            let existed = state.entries.remove(id).is_some();
            if builtin {
                // An implicit tenant counts as present until retired.
                let implicit = !state.retired.contains(id);
                state.retired.insert(id.to_string());
                existed || implicit
            } else {
                existed
            }
        };
        if removed {
            log_event!(
                self.log,
                INFO,
                event_names::REGISTRY_REMOVED,
                Stage::Registry,
                "tenant removed",
                tenant_id = %id
            );
        }
        removed
    }

    /// Whether `id` is registered. Does not provision built-in tenants.
    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    /// Current version of `id`, if registered.
    pub fn version(&self, id: &str) -> Option<u64> {
        self.read().entries.get(id).map(|e| e.version)
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Check the structural invariants of `tree`. Never fails; returns every violation.
    pub fn validate(&self, tree: &ConfigTree) -> ValidationReport {
        validate_tree(tree)
    }

    /// Validate a registered tenant, including subdomain uniqueness across
    /// the registry. `None` if the tenant is unknown.
    pub fn validate_tenant(&self, id: &str) -> Option<ValidationReport> {
        let tree = self.get(id)?;
        let mut report = validate_tree(&tree);

        let mut clashes: Vec<String> = self
            .read()
            .entries
            .iter()
            .filter(|(other, entry)| other.as_str() != id && entry.tree.subdomain == tree.subdomain)
            .map(|(other, _)| other.clone())
            .collect();
        clashes.sort();
        if !clashes.is_empty() {
            report.push(
                "subdomain",
                ValidationError::SemanticError(format!(
                    "subdomain '{}' is also used by: {}",
                    tree.subdomain,
                    clashes.join(", ")
                )),
            );
        }
        Some(report)
    }

    /// Resolve `id` from `template` and `overrides` and register it.
    ///
    /// `template` may name several templates separated by commas; later
    /// names win. An unknown template name resolves against the baseline
    /// only. An existing tenant is only replaced when `overwrite` is set.
    pub fn create_from_template(
        &self,
        id: &str,
        template: &str,
        overrides: &PartialConfigTree,
        overwrite: bool,
    ) -> Result<ConfigTree> {
        if id.trim().is_empty() {
            return Err(Error::InvalidTenantId(id.to_string()));
        }

        let names: Vec<&str> = template
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        let layer = self.catalog.stacked(&names);
        let tree = resolve(&self.baseline, &layer, overrides, &ResolveStamp::new(id));

        let mut state = self.write();
        if !overwrite && state.entries.contains_key(id) {
            drop(state);
            log_event!(
                self.log,
                WARN,
                event_names::RESOLVE_CONFLICT,
                Stage::Resolve,
                "tenant already exists; refusing to overwrite",
                tenant_id = %id
            );
            return Err(Error::TenantExists {
                tenant_id: id.to_string(),
            });
        }
        let version = state.insert(id, tree.clone());
        drop(state);

        log_event!(
            self.log,
            INFO,
            event_names::RESOLVE_CREATED,
            Stage::Resolve,
            "tenant created from template",
            tenant_id = %id,
            template = %template,
            overwrite = overwrite,
            version = version
        );
        Ok(tree)
    }
}

impl TenantStore for WorkflowRegistry {
    fn fetch(&self, id: &str) -> Option<(ConfigTree, u64)> {
        self.get_versioned(id)
    }

    fn version(&self, id: &str) -> Option<u64> {
        WorkflowRegistry::version(self, id)
    }

    fn update(&self, id: &str, update: &TreeUpdate) -> bool {
        WorkflowRegistry::update(self, id, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_config::tree::{Limits, Plan};

    fn registry() -> WorkflowRegistry {
        WorkflowRegistry::new(TemplateCatalog::builtin())
    }

    #[test]
    fn register_then_get_round_trips() {
        let reg = registry();
        let mut tree = ConfigTree::baseline();
        tree.id = "acme".to_string();
        tree.name = "Acme".to_string();
        reg.register("acme", tree.clone());
        assert_eq!(reg.get("acme"), Some(tree));
    }

    #[test]
    fn unknown_tenant_is_safe() {
        let reg = registry();
        assert_eq!(reg.get("nonexistent"), None);
        assert!(!reg.update("nonexistent", &TreeUpdate::default()));
        assert!(!reg.remove("nonexistent"));
        assert!(reg.validate_tenant("nonexistent").is_none());
    }

    #[test]
    fn get_returns_independent_copy() {
        let reg = registry();
        reg.register("acme", ConfigTree::baseline());
        let mut copy = reg.get("acme").unwrap();
        copy.name = "mutated".to_string();
        assert_ne!(reg.get("acme").unwrap().name, "mutated");

        let mut all = reg.get_all();
        all.get_mut("acme").unwrap().name = "mutated".to_string();
        all.clear();
        assert_eq!(reg.len(), 1);
        assert_ne!(reg.get("acme").unwrap().name, "mutated");
    }

    #[test]
    fn builtin_tenants_provision_lazily() {
        let reg = registry();
        assert!(reg.is_empty());
        let default = reg.get("default").unwrap();
        assert_eq!(default.id, "default");
        let demo = reg.get("demo").unwrap();
        assert_eq!(demo.metadata.plan, Plan::Professional);
        assert_eq!(reg.ids(), vec!["default".to_string(), "demo".to_string()]);
        // Second lookup hits the stored entry.
        let v = reg.version("demo");
        reg.get("demo");
        assert_eq!(reg.version("demo"), v);
    }

    #[test]
    fn update_replaces_sections_and_bumps_version() {
        let reg = registry();
        reg.register("acme", ConfigTree::baseline());
        let before = reg.version("acme").unwrap();

        let mut limits = Limits::default();
        limits.users.max = 99;
        let update = TreeUpdate {
            limits: Some(limits.clone()),
            ..Default::default()
        };
        assert!(reg.update("acme", &update));
        let tree = reg.get("acme").unwrap();
        assert_eq!(tree.limits, limits);
        assert!(reg.version("acme").unwrap() > before);
    }

    #[test]
    fn update_provisions_builtin_tenant() {
        let reg = registry();
        let update = TreeUpdate {
            name: Some("Demo Renamed".to_string()),
            ..Default::default()
        };
        assert!(reg.update("demo", &update));
        let demo = reg.get("demo").unwrap();
        assert_eq!(demo.name, "Demo Renamed");
        assert_eq!(demo.metadata.plan, Plan::Professional);
        assert!(reg.update("default", &TreeUpdate::default()));
        assert!(!reg.update("ghost", &update));
        assert!(!reg.contains("ghost"));
    }

    #[test]
    fn removed_builtin_stays_removed() {
        let reg = registry();
        assert!(reg.get("demo").is_some());
        assert!(reg.remove("demo"));
        assert!(reg.get("demo").is_none());
        assert!(!reg.update("demo", &TreeUpdate::default()));
        assert!(!reg.remove("demo"));

        // Never looked up, still removable.
        assert!(reg.remove("enterprise"));
        assert!(reg.get("enterprise").is_none());
        assert!(!reg.ids().contains(&"enterprise".to_string()));
    }

    #[test]
    fn removed_builtin_can_be_recreated() {
        let reg = registry();
        assert!(reg.remove("demo"));
        reg.create_from_template("demo", "demo", &PartialConfigTree::default(), false)
            .unwrap();
        assert_eq!(reg.get("demo").unwrap().subdomain, "demo");

        assert!(reg.remove("default"));
        assert!(reg.get("default").is_none());
        reg.register("default", ConfigTree::baseline());
        assert!(reg.get("default").is_some());
    }

    #[test]
    fn comma_separated_templates_stack() {
        let reg = registry();
        let tree = reg
            .create_from_template("acme", "demo, enterprise", &PartialConfigTree::default(), false)
            .unwrap();
        assert_eq!(tree.subdomain, "enterprise");
        assert_eq!(tree.metadata.plan, Plan::Enterprise);
        assert_eq!(tree.branding.colors.primary, "#7C3AED");
    }

    #[test]
    fn remove_deletes() {
        let reg = registry();
        reg.register("acme", ConfigTree::baseline());
        assert!(reg.remove("acme"));
        assert!(!reg.remove("acme"));
        assert!(!reg.contains("acme"));
    }

    #[test]
    fn create_refuses_existing_without_overwrite() {
        let reg = registry();
        let first = reg
            .create_from_template("acme", "demo", &PartialConfigTree::default(), false)
            .unwrap();
        assert_eq!(first.subdomain, "demo");

        let err = reg
            .create_from_template("acme", "startup", &PartialConfigTree::default(), false)
            .unwrap_err();
        assert!(matches!(err, Error::TenantExists { ref tenant_id } if tenant_id == "acme"));
        assert_eq!(reg.get("acme").unwrap().subdomain, "demo");

        let second = reg
            .create_from_template("acme", "startup", &PartialConfigTree::default(), true)
            .unwrap();
        assert_eq!(second.subdomain, "startup");
        assert_eq!(reg.get("acme").unwrap(), second);
    }

    #[test]
    fn create_rejects_blank_id() {
        let reg = registry();
        let err = reg
            .create_from_template("  ", "demo", &PartialConfigTree::default(), false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTenantId(_)));
    }

    #[test]
    fn unknown_template_falls_back_to_baseline() {
        let reg = registry();
        let tree = reg
            .create_from_template("acme", "no-such-template", &PartialConfigTree::default(), false)
            .unwrap();
        let baseline = reg.baseline();
        assert_eq!(tree.id, "acme");
        assert_eq!(tree.name, baseline.name);
        assert_eq!(tree.branding, baseline.branding);
    }

    #[test]
    fn validate_tenant_flags_duplicate_subdomain() {
        let reg = registry();
        reg.create_from_template("a", "demo", &PartialConfigTree::default(), false)
            .unwrap();
        reg.create_from_template("b", "demo", &PartialConfigTree::default(), false)
            .unwrap();
        let report = reg.validate_tenant("a").unwrap();
        assert!(!report.valid);
        assert!(report.has_issue_for("subdomain"));
        assert_eq!(report.errors[0].kind, "semantic_error");
    }

    #[test]
    fn validate_collects_subdomain_errors() {
        let reg = registry();
        let mut tree = ConfigTree::baseline();
        tree.subdomain = "Demo_1".to_string();
        assert!(!reg.validate(&tree).valid);
        tree.subdomain = "demo-1".to_string();
        assert!(reg.validate(&tree).valid);
    }
}
