//! Tenant Config Core Library
//!
//! This library provides the runtime side of the tenant configuration engine:
//! - Workflow registry of resolved tenant trees
//! - Read-through cache with a version-aware background sweep
//! - Usage tracking and feature lookups
//! - Style sheet and environment map generation
//! - The `TenantConfigService` façade
//! - Engine configuration loading, structured logging and exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod artifacts;
pub mod cache;
pub mod clock;
pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod registry;
pub mod service;
pub mod sync;
pub mod usage;

pub use cache::{CacheStats, ConfigCache, SweepOutcome, TenantStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::WorkflowRegistry;
pub use service::TenantConfigService;
pub use sync::AutoSync;
pub use usage::{UsageEntry, UsageReport};
