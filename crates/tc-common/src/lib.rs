//! Tenant config engine common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the engine crates:
//! - Tenant identity and request-side tenant derivation
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{TenantId, DEFAULT_TENANT_ID};
pub use output::OutputFormat;
