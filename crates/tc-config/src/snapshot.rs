//! Tenant configuration snapshots.
//!
//! A snapshot captures a resolved tree's fingerprint and a few headline values
//! so two resolutions can be compared, or a tree audited later, without
//! keeping the whole tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::tree::{ConfigTree, Plan, TenantStatus, Tier};

/// A frozen snapshot of one tenant's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    pub schema_version: String,

    pub tenant_id: String,

    /// SHA-256 of the tree's canonical JSON.
    pub tree_hash: String,

    /// Key configuration values for quick reference.
    pub summary: TreeSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSummary {
    pub name: String,
    pub subdomain: String,
    pub status: TenantStatus,
    pub plan: Plan,
    pub tier: Tier,
    pub region: String,
    pub require_mfa: bool,
    pub max_users: u64,
    pub custom_css: bool,
}

impl TreeSummary {
    fn of(tree: &ConfigTree) -> Self {
        Self {
            name: tree.name.clone(),
            subdomain: tree.subdomain.clone(),
            status: tree.status,
            plan: tree.metadata.plan,
            tier: tree.metadata.tier,
            region: tree.metadata.region.clone(),
            require_mfa: tree.security.authentication.require_mfa,
            max_users: tree.limits.users.max,
            custom_css: tree.branding.custom_css.is_some(),
        }
    }
}

impl ConfigSnapshot {
    /// Snapshot `tree` now.
    pub fn of(tree: &ConfigTree) -> Result<Self, serde_json::Error> {
        Ok(ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            tenant_id: tree.id.clone(),
            tree_hash: fingerprint(tree)?,
            summary: TreeSummary::of(tree),
        })
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same tree content).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.tree_hash == other.tree_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.tree_hash[..12.min(self.tree_hash.len())]
    }
}

/// SHA-256 of a tree's canonical JSON. Field order is fixed by the struct
/// definitions and maps are ordered, so equal trees hash equally.
pub fn fingerprint(tree: &ConfigTree) -> Result<String, serde_json::Error> {
    Ok(hash_content(&serde_json::to_string(tree)?))
}

/// Hash content with SHA-256 and return hex string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
