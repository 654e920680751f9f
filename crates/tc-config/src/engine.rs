//! Engine settings (`engine.json`): cache and auto-sync knobs supplied once
//! at service construction.

use crate::validate::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheSettings {
    pub enabled: bool,
    /// Maximum age of a cached tree before it is re-read.
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSettings {
    pub enabled: bool,
    /// Period of the background cache sweep.
    pub interval_seconds: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
        }
    }
}

/// Engine settings. Every key is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    pub cache: CacheSettings,
    pub sync: SyncSettings,
    /// Directory of custom `*.json` templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

impl EngineSettings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ValidationError::IoError(e.to_string()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ValidationResult<Self> {
        serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Settings with cache and auto-sync both off.
    pub fn uncached() -> Self {
        Self {
            cache: CacheSettings {
                enabled: false,
                ..CacheSettings::default()
            },
            sync: SyncSettings {
                enabled: false,
                ..SyncSettings::default()
            },
            templates_dir: None,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_seconds)
    }

    /// Check the settings semantically.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(ValidationError::InvalidValue {
                field: "cache.ttlSeconds".to_string(),
                message: "must be >= 1 when the cache is enabled".to_string(),
            });
        }

        if self.sync.enabled && self.sync.interval_seconds == 0 {
            return Err(ValidationError::InvalidValue {
                field: "sync.intervalSeconds".to_string(),
                message: "must be >= 1 when auto-sync is enabled".to_string(),
            });
        }

        if let Some(dir) = &self.templates_dir {
            if dir.as_os_str().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "templatesDir".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}
