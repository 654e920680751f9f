//! Structured event names and stages.
//!
//! Every engine event carries a stable event name (used as the tracing
//! target), the stage it belongs to and the engine instance id, so the JSONL
//! stream of several engines in one process can be told apart.

use serde::{Deserialize, Serialize};

/// Engine stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and settings loading.
    Init,
    /// Template resolution.
    Resolve,
    /// Registry mutations.
    Registry,
    /// Cache reads and writes.
    Cache,
    /// Background sweep.
    Sync,
    /// Style sheet and env map generation.
    Artifacts,
    Validate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Resolve => "resolve",
            Stage::Registry => "registry",
            Stage::Cache => "cache",
            Stage::Sync => "sync",
            Stage::Artifacts => "artifacts",
            Stage::Validate => "validate",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Engine lifecycle
    pub const ENGINE_STARTED: &str = "engine.started";
    pub const ENGINE_STOPPED: &str = "engine.stopped";

    // Registry
    pub const REGISTRY_REGISTERED: &str = "registry.registered";
    pub const REGISTRY_PROVISIONED: &str = "registry.provisioned";
    pub const REGISTRY_UPDATED: &str = "registry.updated";
    pub const REGISTRY_REMOVED: &str = "registry.removed";

    // Resolution
    pub const RESOLVE_CREATED: &str = "resolve.created";
    pub const RESOLVE_CONFLICT: &str = "resolve.conflict";

    // Validation
    pub const TREE_VALIDATED: &str = "tree.validated";

    // Cache
    pub const CACHE_HIT: &str = "cache.hit";
    pub const CACHE_MISS: &str = "cache.miss";
    pub const CACHE_INVALIDATED: &str = "cache.invalidated";
    pub const CACHE_CLEARED: &str = "cache.cleared";

    // Sync
    pub const SYNC_STARTED: &str = "sync.started";
    pub const SYNC_TICK: &str = "sync.tick";
    pub const SYNC_FAILED: &str = "sync.failed";
    pub const SYNC_STOPPED: &str = "sync.stopped";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";
}

/// Correlation context shared by every component of one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub engine_id: String,
}

impl LogContext {
    pub fn new(engine_id: impl Into<String>) -> Self {
        LogContext {
            engine_id: engine_id.into(),
        }
    }

    /// Context with a freshly generated engine id.
    pub fn generate() -> Self {
        Self::new(super::generate_engine_id())
    }
}
