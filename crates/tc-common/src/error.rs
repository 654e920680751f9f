//! Error types for the tenant configuration engine.
//!
//! Errors carry:
//! - Stable error codes for machine parsing
//! - A category for grouping
//! - Recoverability hints for automation
//! - Remediation text for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Tenant Already Exists
//!   Reason: tenant already exists: acme
//!   Fix: Pass overwrite to re-provision the tenant, or pick a different tenant id.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 21,
//!   "category": "tenant",
//!   "message": "tenant already exists: acme",
//!   "recoverable": true,
//!   "suggested_action": "overwrite",
//!   "context": { "tenant_id": "acme" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Engine settings and template documents.
    Config,
    /// Tenant lookup and provisioning.
    Tenant,
    /// Structural validation of a configuration tree.
    Validation,
    /// Cache sweeping and background sync.
    Sync,
    /// File I/O and serialization.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Tenant => write!(f, "tenant"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Sync => write!(f, "sync"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested follow-up for callers that automate around the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Retry the operation.
    Retry,
    /// Fix the engine settings or template file and reload.
    FixConfig,
    /// Run the validation command to see every violation.
    RunValidate,
    /// Re-issue the call with overwrite enabled.
    Overwrite,
    /// Fall back to the default tenant.
    UseDefaultTenant,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::FixConfig => write!(f, "fix_config"),
            SuggestedAction::RunValidate => write!(f, "run_validate"),
            SuggestedAction::Overwrite => write!(f, "overwrite"),
            SuggestedAction::UseDefaultTenant => write!(f, "use_default_tenant"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid template '{name}': {message}")]
    InvalidTemplate { name: String, message: String },

    #[error("invalid engine settings: {0}")]
    InvalidSettings(String),

    // Tenant errors (20-29)
    #[error("tenant not found: {tenant_id}")]
    TenantNotFound { tenant_id: String },

    #[error("tenant already exists: {tenant_id}")]
    TenantExists { tenant_id: String },

    #[error("invalid tenant id: {0}")]
    InvalidTenantId(String),

    // Validation errors (30-39)
    #[error("tenant {tenant_id} failed validation with {count} error(s)")]
    ValidationFailed { tenant_id: String, count: usize },

    // Sync errors (40-49)
    #[error("cache sync failed: {0}")]
    SyncFailed(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Tenant errors
    /// - 30-39: Validation errors
    /// - 40-49: Sync errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidTemplate { .. } => 11,
            Error::InvalidSettings(_) => 12,
            Error::TenantNotFound { .. } => 20,
            Error::TenantExists { .. } => 21,
            Error::InvalidTenantId(_) => 22,
            Error::ValidationFailed { .. } => 30,
            Error::SyncFailed(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidTemplate { .. } | Error::InvalidSettings(_) => {
                ErrorCategory::Config
            }

            Error::TenantNotFound { .. } | Error::TenantExists { .. } | Error::InvalidTenantId(_) => {
                ErrorCategory::Tenant
            }

            Error::ValidationFailed { .. } => ErrorCategory::Validation,

            Error::SyncFailed(_) => ErrorCategory::Sync,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidTemplate { .. } => true,
            Error::InvalidSettings(_) => true,

            Error::TenantNotFound { .. } => true, // Fall back to default tenant
            Error::TenantExists { .. } => true,
            Error::InvalidTenantId(_) => false,

            Error::ValidationFailed { .. } => true,

            Error::SyncFailed(_) => true, // Next tick retries

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns the suggested action for automation.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::FixConfig,
            Error::InvalidTemplate { .. } => SuggestedAction::FixConfig,
            Error::InvalidSettings(_) => SuggestedAction::FixConfig,

            Error::TenantNotFound { .. } => SuggestedAction::UseDefaultTenant,
            Error::TenantExists { .. } => SuggestedAction::Overwrite,
            Error::InvalidTenantId(_) => SuggestedAction::ManualIntervention,

            Error::ValidationFailed { .. } => SuggestedAction::RunValidate,

            Error::SyncFailed(_) => SuggestedAction::Retry,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'tc-core check' to see which engine settings file was loaded and why it failed."
            }
            Error::InvalidTemplate { .. } => {
                "Fix the template document in the templates directory; every key is optional but types must match."
            }
            Error::InvalidSettings(_) => {
                "Cache TTL and sync interval must be at least one second when enabled."
            }

            Error::TenantNotFound { .. } => {
                "The tenant is not registered. Provision it from a template or fall back to the default tenant."
            }
            Error::TenantExists { .. } => {
                "Pass overwrite to re-provision the tenant, or pick a different tenant id."
            }
            Error::InvalidTenantId(_) => {
                "Tenant ids must be non-empty. Check the Host or X-Tenant-ID header the id was derived from."
            }

            Error::ValidationFailed { .. } => {
                "Run 'tc-core validate <file>' to list every violation."
            }

            Error::SyncFailed(_) => {
                "The next sync tick retries automatically. Call clear_cache to force a full refresh."
            }

            Error::Io(_) => {
                "Check that the file exists and is readable, then retry."
            }
            Error::Json(_) => {
                "Invalid JSON in file. Check syntax with 'jq . <file>'."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidTemplate { .. } => "Invalid Template",
            Error::InvalidSettings(_) => "Invalid Engine Settings",

            Error::TenantNotFound { .. } => "Tenant Not Found",
            Error::TenantExists { .. } => "Tenant Already Exists",
            Error::InvalidTenantId(_) => "Invalid Tenant Id",

            Error::ValidationFailed { .. } => "Validation Failed",

            Error::SyncFailed(_) => "Cache Sync Failed",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for automation.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., tenant id).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::TenantNotFound { tenant_id } | Error::TenantExists { tenant_id } => {
                context.insert("tenant_id".to_string(), serde_json::json!(tenant_id));
            }
            Error::ValidationFailed { tenant_id, count } => {
                context.insert("tenant_id".to_string(), serde_json::json!(tenant_id));
                context.insert("error_count".to_string(), serde_json::json!(count));
            }
            Error::InvalidTemplate { name, .. } => {
                context.insert("template".to_string(), serde_json::json!(name));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
