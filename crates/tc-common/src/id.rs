//! Tenant identity.
//!
//! The engine treats a tenant id as an opaque key. The only parsing it does is
//! the request-side derivation in [`TenantId::from_request`], which turns a
//! `Host` header (or an explicit `X-Tenant-ID` header) into that key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id reserved for the baseline tenant.
pub const DEFAULT_TENANT_ID: &str = "default";

/// Host labels that never name a tenant on their own.
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Opaque tenant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Wrap an id string. Surrounding whitespace is trimmed; empty ids are rejected.
    pub fn new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            None
        } else {
            Some(TenantId(id.to_string()))
        }
    }

    /// The baseline tenant.
    pub fn default_tenant() -> Self {
        TenantId(DEFAULT_TENANT_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Derive the tenant id for an incoming request.
    ///
    /// 1. A non-empty explicit tenant header wins.
    /// 2. `<tenant>.localhost` / `<tenant>.127.0.0.1` yield the first label.
    /// 3. Hosts with three or more labels yield the first label, unless it is `www`.
    /// 4. Anything else is treated as a custom domain and used whole
    ///    (with a leading `www.` removed).
    ///
    /// A bare loopback host yields `None`; callers fall back to the default tenant.
    pub fn from_request(host: Option<&str>, explicit: Option<&str>) -> Option<Self> {
        if let Some(id) = explicit.and_then(TenantId::new) {
            return Some(id);
        }

        let host = strip_port(host?.trim()).to_ascii_lowercase();
        if host.is_empty() || LOOPBACK_HOSTS.contains(&host.as_str()) {
            return None;
        }

        for loopback in LOOPBACK_HOSTS {
            if let Some(prefix) = host.strip_suffix(&format!(".{}", loopback)) {
                return prefix.split('.').next().and_then(TenantId::new);
            }
        }

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() >= 3 && labels[0] != "www" {
            return TenantId::new(labels[0]);
        }

        TenantId::new(host.strip_prefix("www.").unwrap_or(&host))
    }
}

/// Remove a trailing `:port` if present.
fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for TenantId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TenantId::new(s).ok_or_else(|| crate::Error::InvalidTenantId(s.to_string()))
    }
}
