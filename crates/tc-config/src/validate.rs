//! Tenant tree validation errors and semantic validation.
//!
//! Validation is advisory: it never blocks registration and never stops at
//! the first problem. [`validate_tree`] returns every violation it finds.

use crate::tree::ConfigTree;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
        }
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::IoError(_) => "io_error",
            ValidationError::ParseError(_) => "parse_error",
            ValidationError::SemanticError(_) => "semantic_error",
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidValue { .. } => "invalid_value",
        }
    }
}

/// One violation found in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field (camelCase, as in JSON).
    pub field: String,
    pub kind: String,
    pub code: u32,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, error: &ValidationError) -> Self {
        Self {
            field: field.into(),
            kind: error.kind().to_string(),
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Outcome of validating a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Record a violation.
    pub fn push(&mut self, field: impl Into<String>, error: ValidationError) {
        self.errors.push(ValidationIssue::new(field, &error));
        self.valid = false;
    }

    pub fn has_issue_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

static SUBDOMAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// True when `subdomain` is lowercase alphanumerics and hyphens.
pub fn is_valid_subdomain(subdomain: &str) -> bool {
    SUBDOMAIN_RE.is_match(subdomain)
}

/// True when `color` is a `#RRGGBB` hex string.
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

/// Check every invariant of a tree and collect all violations.
pub fn validate_tree(tree: &ConfigTree) -> ValidationReport {
    let mut report = ValidationReport::ok();

    validate_required(tree, &mut report);

    if !tree.subdomain.is_empty() && !is_valid_subdomain(&tree.subdomain) {
        report.push(
            "subdomain",
            ValidationError::InvalidValue {
                field: "subdomain".to_string(),
                message: format!(
                    "'{}' must contain only lowercase letters, digits and hyphens",
                    tree.subdomain
                ),
            },
        );
    }

    validate_colors(tree, &mut report);
    validate_limits(tree, &mut report);
    validate_security(tree, &mut report);
    validate_rollout(tree, &mut report);

    report
}

fn validate_required(tree: &ConfigTree, report: &mut ValidationReport) {
    let required = [
        ("id", tree.id.as_str()),
        ("name", tree.name.as_str()),
        ("subdomain", tree.subdomain.as_str()),
        ("metadata.region", tree.metadata.region.as_str()),
        ("metadata.timezone", tree.metadata.timezone.as_str()),
        (
            "branding.typography.fontFamily.primary",
            tree.branding.typography.font_family.primary.as_str(),
        ),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            report.push(field, ValidationError::MissingField(field.to_string()));
        }
    }
}

fn validate_colors(tree: &ConfigTree, report: &mut ValidationReport) {
    for (name, value) in tree.branding.colors.entries() {
        if !is_valid_hex_color(value) {
            let field = format!("branding.colors.{}", name);
            report.push(
                field.clone(),
                ValidationError::InvalidValue {
                    field,
                    message: format!("'{}' is not a #RRGGBB hex colour", value),
                },
            );
        }
    }
}

fn validate_limits(tree: &ConfigTree, report: &mut ValidationReport) {
    for (dimension, quota) in tree.limits.iter() {
        if quota.max < 1 {
            let field = format!("limits.{}.max", dimension);
            report.push(
                field.clone(),
                ValidationError::InvalidValue {
                    field,
                    message: format!("must be >= 1, got {}", quota.max),
                },
            );
        }
        if quota.max >= 1 && quota.warning_threshold >= quota.max {
            let field = format!("limits.{}.warningThreshold", dimension);
            report.push(
                field.clone(),
                ValidationError::InvalidValue {
                    field,
                    message: format!(
                        "must be below max ({}), got {}",
                        quota.max, quota.warning_threshold
                    ),
                },
            );
        }
    }
}

fn validate_security(tree: &ConfigTree, report: &mut ValidationReport) {
    let security = &tree.security;
    if security.password_policy.min_length < 1 {
        let field = "security.passwordPolicy.minLength";
        report.push(
            field,
            ValidationError::InvalidValue {
                field: field.to_string(),
                message: "must be >= 1".to_string(),
            },
        );
    }
    if security.rate_limit.max_requests < 1 {
        let field = "security.rateLimit.maxRequests";
        report.push(
            field,
            ValidationError::InvalidValue {
                field: field.to_string(),
                message: "must be >= 1".to_string(),
            },
        );
    }
}

fn validate_rollout(tree: &ConfigTree, report: &mut ValidationReport) {
    for (flag, percent) in &tree.workflow.rollout.percentages {
        if *percent > 100 {
            let field = format!("workflow.rollout.percentages.{}", flag);
            report.push(
                field.clone(),
                ValidationError::InvalidValue {
                    field,
                    message: format!("must be <= 100, got {}", percent),
                },
            );
        }
    }
}
