//! Engine configuration loading.
//!
//! This module handles:
//! - Locating engine.json (CLI > env > XDG > system > defaults)
//! - Parsing and semantic validation of the settings
//! - Building the template catalog, including a custom templates directory
//! - A content hash of the loaded file for diagnostics

pub use tc_config::validate::ValidationError;
pub use tc_config::{CacheSettings, EngineSettings, SyncSettings, TemplateError};

use serde::Serialize;
use std::path::{Path, PathBuf};
use tc_config::resolve::ConfigSource;
use tc_config::snapshot::hash_content;
use tc_config::{resolve_config, TemplateCatalog};
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid engine settings in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

impl From<ConfigError> for tc_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Template(TemplateError::InvalidName(name)) => {
                tc_common::Error::InvalidTemplate {
                    message: "template names are alphanumerics, '-' and '_'".to_string(),
                    name,
                }
            }
            ConfigError::Template(TemplateError::CorruptTemplateFile { path, message }) => {
                tc_common::Error::InvalidTemplate {
                    name: path,
                    message,
                }
            }
            ConfigError::Invalid { .. } | ConfigError::ValidationError(_) => {
                tc_common::Error::InvalidSettings(err.to_string())
            }
            other => tc_common::Error::Config(other.to_string()),
        }
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit engine.json path (highest priority).
    pub engine_path: Option<PathBuf>,
    /// Custom templates directory; overrides `templatesDir` in the file.
    pub templates_dir: Option<PathBuf>,
}

/// Loaded settings with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: EngineSettings,
    /// Path to engine.json (None if using defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
    /// SHA-256 of the file content (None if using defaults).
    pub hash: Option<String>,
}

impl ResolvedConfig {
    /// Built-in templates plus any found in the configured templates directory.
    pub fn catalog(&self) -> Result<TemplateCatalog, ConfigError> {
        match &self.settings.templates_dir {
            Some(dir) => Ok(TemplateCatalog::with_dir(dir)?),
            None => Ok(TemplateCatalog::builtin()),
        }
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            path: self.path.clone(),
            source: self.source.to_string(),
            hash: self.hash.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// Serializable view of a [`ResolvedConfig`] for diagnostics output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub path: Option<PathBuf>,
    pub source: String,
    pub hash: Option<String>,
    pub settings: EngineSettings,
}

/// Load engine settings with the standard resolution order.
///
/// An explicit path that does not exist is an error; every other missing
/// file falls through to the next source.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    if let Some(path) = &options.engine_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
    }

    let paths = resolve_config(options.engine_path.as_deref());
    let (mut settings, hash) = match &paths.engine {
        Some(path) => {
            let (settings, hash) = load_settings_from_file(path)?;
            (settings, Some(hash))
        }
        None => (EngineSettings::default(), None),
    };

    if let Some(dir) = &options.templates_dir {
        settings.templates_dir = Some(dir.clone());
    }
    settings.validate()?;

    Ok(ResolvedConfig {
        settings,
        path: paths.engine,
        source: paths.engine_source,
        hash,
    })
}

fn load_settings_from_file(path: &Path) -> Result<(EngineSettings, String), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let hash = hash_content(&content);

    let settings = EngineSettings::from_json(&content).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok((settings, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_file_is_loaded_and_hashed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"cache":{"ttlSeconds":30}}"#).unwrap();

        let resolved = load_config(&ConfigOptions {
            engine_path: Some(path.clone()),
            templates_dir: None,
        })
        .unwrap();
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.path, Some(path));
        assert_eq!(resolved.settings.cache.ttl_seconds, 30);
        assert!(resolved.settings.sync.enabled);
        assert_eq!(resolved.hash.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn missing_explicit_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&ConfigOptions {
            engine_path: Some(dir.path().join("absent.json")),
            templates_dir: None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"sync":{"enabled":true,"intervalSeconds":0}}"#).unwrap();
        let err = load_config(&ConfigOptions {
            engine_path: Some(path),
            templates_dir: None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        let common: tc_common::Error = err.into();
        assert!(matches!(common, tc_common::Error::InvalidSettings(_)));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config(&ConfigOptions {
            engine_path: Some(path.clone()),
            templates_dir: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn templates_dir_option_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"templatesDir":"/nowhere"}"#).unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(templates.join("agency.json"), r#"{"name":"Agency"}"#).unwrap();

        let resolved = load_config(&ConfigOptions {
            engine_path: Some(path),
            templates_dir: Some(templates.clone()),
        })
        .unwrap();
        assert_eq!(resolved.settings.templates_dir, Some(templates));
        let catalog = resolved.catalog().unwrap();
        assert!(catalog.contains("agency"));
        assert!(catalog.contains("demo"));
    }
}
