//! Tenant configuration tree.
//!
//! A [`ConfigTree`] is the complete, fully populated configuration of one
//! tenant. Sections are declared with [`layered!`](crate::layer) so each has
//! a sparse twin used by templates and overrides ([`PartialConfigTree`]).
//!
//! `ConfigTree::default()` is the baseline ("default") tenant every template
//! resolution starts from.

pub mod branding;
pub mod compliance;
pub mod features;
pub mod integrations;
pub mod limits;
pub mod security;
pub mod workflow;

pub use branding::*;
pub use compliance::*;
pub use features::*;
pub use integrations::*;
pub use limits::*;
pub use security::*;
pub use workflow::*;

use crate::layer::layered;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Pending,
    Archived,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Pending => "pending",
            TenantStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Commercial plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Professional => "professional",
            Plan::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Service tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Standard,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Standard => "standard",
            Tier::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

layered! {
    /// Commercial and operational metadata.
    pub struct Metadata / PartialMetadata {
        value plan: Plan,
        value tier: Tier,
        value created_at: DateTime<Utc>,
        value last_active: DateTime<Utc>,
        /// Free-form tags; a layer replaces the whole list.
        value tags: Vec<String>,
        value region: String,
        value timezone: String,
    }
}

impl Default for Metadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            plan: Plan::Free,
            tier: Tier::Basic,
            created_at: now,
            last_active: now,
            tags: Vec::new(),
            region: "us-east-1".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

layered! {
    /// A tenant's complete configuration.
    pub struct ConfigTree / PartialConfigTree {
        /// Immutable, unique tenant id. Stamped at resolution time.
        value id: String,
        value name: String,
        /// Unique; lowercase alphanumerics and hyphens.
        value subdomain: String,
        value status: TenantStatus,
        nested metadata: Metadata,
        nested branding: Branding,
        nested security: Security,
        nested features: Features,
        nested limits: Limits,
        nested integrations: Integrations,
        nested workflow: Workflow,
        nested compliance: Compliance,
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self {
            id: tc_common::DEFAULT_TENANT_ID.to_string(),
            name: "Default Tenant".to_string(),
            subdomain: "default".to_string(),
            status: TenantStatus::Active,
            metadata: Metadata::default(),
            branding: Branding::default(),
            security: Security::default(),
            features: Features::default(),
            limits: Limits::default(),
            integrations: Integrations::default(),
            workflow: Workflow::default(),
            compliance: Compliance::default(),
        }
    }
}

impl ConfigTree {
    /// The baseline tree every template resolution starts from.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Load a complete tree from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::validate::ValidationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::validate::ValidationError::IoError(e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| crate::validate::ValidationError::ParseError(e.to_string()))
    }
}

impl PartialConfigTree {
    /// Load a layer document from a JSON file. Every key is optional.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::validate::ValidationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::validate::ValidationError::IoError(e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| crate::validate::ValidationError::ParseError(e.to_string()))
    }
}

/// Top-level replacement payload for an existing tree.
///
/// Present keys replace the stored value wholesale; sections are not merged
/// field by field. The tenant id cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TenantStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Integrations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<Compliance>,
}

impl TreeUpdate {
    pub fn is_empty(&self) -> bool {
        self == &TreeUpdate::default()
    }

    /// Replace every section present in this update.
    pub fn apply_to(&self, tree: &mut ConfigTree) {
        fn replace<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        replace(&mut tree.name, &self.name);
        replace(&mut tree.subdomain, &self.subdomain);
        replace(&mut tree.status, &self.status);
        replace(&mut tree.metadata, &self.metadata);
        replace(&mut tree.branding, &self.branding);
        replace(&mut tree.security, &self.security);
        replace(&mut tree.features, &self.features);
        replace(&mut tree.limits, &self.limits);
        replace(&mut tree.integrations, &self.integrations);
        replace(&mut tree.workflow, &self.workflow);
        replace(&mut tree.compliance, &self.compliance);
    }
}
