//! Tenant configuration model, templates, resolution and validation.
//!
//! This crate provides:
//! - The typed tenant tree ([`ConfigTree`]) and its sparse layer twin
//! - Built-in and directory-loaded templates
//! - Layered resolution (overrides → template → baseline)
//! - Collect-all semantic validation
//! - Engine settings and their resolution (CLI → env → XDG → defaults)
//! - Tree fingerprints and snapshots

pub mod engine;
pub mod layer;
pub mod merge;
pub mod resolve;
pub mod snapshot;
pub mod templates;
pub mod tree;
pub mod validate;

pub use engine::{CacheSettings, EngineSettings, SyncSettings};
pub use layer::Layered;
pub use merge::{resolve, ResolveStamp};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::{fingerprint, ConfigSnapshot};
pub use templates::{BuiltinTemplate, Template, TemplateCatalog, TemplateError, TemplateInfo};
pub use tree::{ConfigTree, Dimension, PartialConfigTree, TreeUpdate};
pub use validate::{validate_tree, ValidationError, ValidationIssue, ValidationReport};

/// Schema version of persisted trees and snapshots.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
