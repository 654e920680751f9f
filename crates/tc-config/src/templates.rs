//! Tenant templates: named layers used as merge bases when provisioning.
//!
//! Provides built-in templates for:
//! - Demo: showcase tenant on the professional plan
//! - Startup: small team, starter plan, modest quotas
//! - Enterprise: large quotas, strict security, compliance regimes on
//!
//! Additional templates can be loaded from a directory of `*.json` layer
//! documents; the file stem is the template name.

use crate::resolve::list_config_files;
use crate::tree::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Built-in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinTemplate {
    Demo,
    Startup,
    Enterprise,
}

impl BuiltinTemplate {
    pub const ALL: &'static [BuiltinTemplate] = &[
        BuiltinTemplate::Demo,
        BuiltinTemplate::Startup,
        BuiltinTemplate::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinTemplate::Demo => "demo",
            BuiltinTemplate::Startup => "startup",
            BuiltinTemplate::Enterprise => "enterprise",
        }
    }

    /// Parse a built-in template name (case-insensitive).
    pub fn parse(s: &str) -> Option<BuiltinTemplate> {
        match normalize_name(s).as_str() {
            "demo" => Some(BuiltinTemplate::Demo),
            "startup" => Some(BuiltinTemplate::Startup),
            "enterprise" => Some(BuiltinTemplate::Enterprise),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BuiltinTemplate::Demo => "Showcase tenant on the professional plan with most features on",
            BuiltinTemplate::Startup => "Small team on the starter plan with modest quotas",
            BuiltinTemplate::Enterprise => {
                "Large quotas, strict security and compliance regimes enabled"
            }
        }
    }

    /// The layer this template contributes.
    pub fn layer(&self) -> PartialConfigTree {
        match self {
            BuiltinTemplate::Demo => demo_template(),
            BuiltinTemplate::Startup => startup_template(),
            BuiltinTemplate::Enterprise => enterprise_template(),
        }
    }
}

impl fmt::Display for BuiltinTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BuiltinTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinTemplate::parse(s).ok_or_else(|| TemplateError::UnknownTemplate(s.to_string()))
    }
}

/// Errors related to template operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("Invalid template name '{0}': use letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("Corrupt template file {path}: {message}")]
    CorruptTemplateFile { path: String, message: String },

    #[error("Cannot read templates from {path}: {message}")]
    Io { path: String, message: String },
}

/// A named layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub description: String,
    pub builtin: bool,
    pub layer: PartialConfigTree,
}

impl Template {
    /// A custom template. The name is normalized to lowercase.
    pub fn custom(
        name: &str,
        description: impl Into<String>,
        layer: PartialConfigTree,
    ) -> Result<Self, TemplateError> {
        let name = normalize_name(name);
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TemplateError::InvalidName(name));
        }
        Ok(Self {
            name,
            description: description.into(),
            builtin: false,
            layer,
        })
    }

    fn from_builtin(template: BuiltinTemplate) -> Self {
        Self {
            name: template.as_str().to_string(),
            description: template.description().to_string(),
            builtin: true,
            layer: template.layer(),
        }
    }
}

/// Information about a template for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub name: String,
    pub description: String,
    pub builtin: bool,
    pub plan: Option<Plan>,
    /// Number of top-level keys the layer sets.
    pub sections: usize,
}

impl TemplateInfo {
    pub fn from_template(template: &Template) -> Self {
        let sections = serde_json::to_value(&template.layer)
            .ok()
            .and_then(|v| v.as_object().map(|o| o.len()))
            .unwrap_or(0);
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            builtin: template.builtin,
            plan: template.layer.metadata.as_ref().and_then(|m| m.plan),
            sections,
        }
    }
}

/// The set of templates known to an engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, Template>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    /// Catalog holding only the built-in templates.
    pub fn builtin() -> Self {
        let templates = BuiltinTemplate::ALL
            .iter()
            .map(|t| (t.as_str().to_string(), Template::from_builtin(*t)))
            .collect();
        Self { templates }
    }

    /// Catalog with no templates at all.
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Built-in templates plus every `*.json` layer in `dir`.
    pub fn with_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut catalog = Self::builtin();
        catalog.load_dir(dir)?;
        Ok(catalog)
    }

    /// Add or replace a template. A custom template may shadow a built-in one.
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        self.templates.insert(template.name.clone(), template)
    }

    /// Load every `*.json` layer document in `dir`. Returns how many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::Io {
                path: dir.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let mut loaded = 0;
        for path in list_config_files(dir) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let layer = PartialConfigTree::from_file(&path).map_err(|e| {
                TemplateError::CorruptTemplateFile {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            let template = Template::custom(
                &stem,
                format!("Custom template from {}", path.display()),
                layer,
            )?;
            tracing::debug!(
                template = %template.name,
                path = %path.display(),
                "loaded custom template"
            );
            self.insert(template);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Look up a template by name (trimmed, case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The layer for `name`. Unknown names resolve to the empty layer, which
    /// leaves the baseline untouched.
    pub fn layer(&self, name: &str) -> PartialConfigTree {
        match self.get(name) {
            Some(template) => template.layer.clone(),
            None => {
                tracing::warn!(
                    template = %name,
                    "unknown template; falling back to baseline only"
                );
                PartialConfigTree::default()
            }
        }
    }

    /// Stack several templates; later names win over earlier ones.
    pub fn stacked(&self, names: &[&str]) -> PartialConfigTree {
        names
            .iter()
            .fold(PartialConfigTree::default(), |acc, name| {
                self.layer(name).layer_over(&acc)
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Summary information for every template, sorted by name.
    pub fn list(&self) -> Vec<TemplateInfo> {
        self.templates.values().map(TemplateInfo::from_template).collect()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn quota(max: u64, warning_threshold: u64) -> Option<PartialQuotaLimit> {
    Some(PartialQuotaLimit {
        max: Some(max),
        warning_threshold: Some(warning_threshold),
        ..Default::default()
    })
}

/// Demo tenant: professional plan, purple branding, most platform features on.
fn demo_template() -> PartialConfigTree {
    PartialConfigTree {
        name: Some("Demo Company".to_string()),
        subdomain: Some("demo".to_string()),
        metadata: Some(PartialMetadata {
            plan: Some(Plan::Professional),
            tier: Some(Tier::Standard),
            tags: Some(strings(&["demo", "showcase"])),
            ..Default::default()
        }),
        branding: Some(PartialBranding {
            colors: Some(PartialPalette {
                primary: Some("#7C3AED".to_string()),
                secondary: Some("#EC4899".to_string()),
                accent: Some("#14B8A6".to_string()),
                ..Default::default()
            }),
            logo: Some(PartialLogoSet {
                primary: Some("/assets/demo/logo.svg".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        features: Some(PartialFeatures {
            core: Some(PartialCoreFeatures {
                search: Some(true),
                dark_mode: Some(true),
                ..Default::default()
            }),
            platform: Some(PartialPlatformFeatures {
                api_access: Some(PartialApiAccessFeature {
                    enabled: Some(true),
                    rate_limit_per_minute: Some(300),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            business: Some(PartialBusinessFeatures {
                custom_domain: Some(true),
                integrations: Some(PartialIntegrationsFeature {
                    enabled: Some(true),
                    max_integrations: Some(10),
                    allowed: Some(strings(&["slack", "github", "stripe"])),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        limits: Some(PartialLimits {
            users: quota(50, 40),
            storage: quota(10_240, 8_192),
            api_calls: quota(100_000, 80_000),
            custom_domains: quota(3, 2),
            integrations: quota(10, 8),
        }),
        workflow: Some(PartialWorkflow {
            rollout: Some(PartialRollout {
                beta_features: Some(strings(&["ai-assistant"])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Startup tenant: starter plan and small quotas.
fn startup_template() -> PartialConfigTree {
    PartialConfigTree {
        name: Some("Startup".to_string()),
        subdomain: Some("startup".to_string()),
        metadata: Some(PartialMetadata {
            plan: Some(Plan::Starter),
            tier: Some(Tier::Basic),
            tags: Some(strings(&["startup"])),
            ..Default::default()
        }),
        branding: Some(PartialBranding {
            colors: Some(PartialPalette {
                primary: Some("#059669".to_string()),
                accent: Some("#FBBF24".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        features: Some(PartialFeatures {
            platform: Some(PartialPlatformFeatures {
                api_access: Some(PartialApiAccessFeature {
                    enabled: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        limits: Some(PartialLimits {
            users: quota(25, 20),
            storage: quota(5_120, 4_096),
            api_calls: quota(50_000, 40_000),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Enterprise tenant: strict security, large quotas, every compliance regime on.
fn enterprise_template() -> PartialConfigTree {
    PartialConfigTree {
        name: Some("Enterprise".to_string()),
        subdomain: Some("enterprise".to_string()),
        metadata: Some(PartialMetadata {
            plan: Some(Plan::Enterprise),
            tier: Some(Tier::Premium),
            tags: Some(strings(&["enterprise"])),
            ..Default::default()
        }),
        security: Some(PartialSecurity {
            authentication: Some(PartialAuthenticationPolicy {
                session_timeout_minutes: Some(30),
                require_mfa: Some(true),
                max_login_attempts: Some(3),
                lockout_duration_minutes: Some(30),
                allowed_providers: Some(strings(&["password", "saml", "oidc"])),
            }),
            password_policy: Some(PartialPasswordPolicy {
                min_length: Some(12),
                require_symbols: Some(true),
                max_age_days: Some(90),
                ..Default::default()
            }),
            rate_limit: Some(PartialRateLimitPolicy {
                max_requests: Some(1_000),
                key_strategy: Some(RateLimitKey::Tenant),
                ..Default::default()
            }),
            data_protection: Some(PartialDataProtection {
                data_retention_days: Some(2_555),
                gdpr_compliant: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        }),
        features: Some(PartialFeatures {
            core: Some(PartialCoreFeatures {
                search: Some(true),
                dark_mode: Some(true),
                ..Default::default()
            }),
            platform: Some(PartialPlatformFeatures {
                api_access: Some(PartialApiAccessFeature {
                    enabled: Some(true),
                    rate_limit_per_minute: Some(1_000),
                    versions: Some(strings(&["v1", "v2"])),
                }),
                ..Default::default()
            }),
            business: Some(PartialBusinessFeatures {
                custom_domain: Some(true),
                white_label: Some(true),
                integrations: Some(PartialIntegrationsFeature {
                    enabled: Some(true),
                    max_integrations: Some(50),
                    ..Default::default()
                }),
                reporting: Some(PartialReportingFeature {
                    scheduled: Some(true),
                    export_formats: Some(strings(&["csv", "xlsx", "pdf"])),
                    ..Default::default()
                }),
            }),
            advanced: Some(PartialAdvancedFeatures {
                multi_tenancy: Some(PartialMultiTenancyFeature {
                    isolation: Some(IsolationMode::Database),
                    ..Default::default()
                }),
                audit_logging: Some(PartialAuditLoggingFeature {
                    enabled: Some(true),
                    retention_days: Some(365),
                }),
                backup: Some(PartialBackupFeature {
                    frequency: Some(BackupFrequency::Hourly),
                    retention_days: Some(30),
                    ..Default::default()
                }),
                monitoring: Some(PartialMonitoringFeature {
                    alerting: Some(true),
                    metrics_interval_seconds: Some(15),
                    ..Default::default()
                }),
            }),
        }),
        limits: Some(PartialLimits {
            users: quota(1_000, 900),
            storage: quota(1_048_576, 943_718),
            api_calls: quota(10_000_000, 9_000_000),
            custom_domains: quota(25, 20),
            integrations: quota(50, 45),
        }),
        compliance: Some(PartialCompliance {
            gdpr: Some(PartialGdprCompliance {
                enabled: Some(true),
                data_processing_agreement: Some(true),
                ..Default::default()
            }),
            soc2: Some(PartialSoc2Compliance {
                enabled: Some(true),
                report_type: Some("type2".to_string()),
                ..Default::default()
            }),
            iso27001: Some(PartialIso27001Compliance {
                enabled: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}
