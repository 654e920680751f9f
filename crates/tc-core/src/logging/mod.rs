//! Structured logging for the engine.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for services and automation
//!
//! stdout is reserved for command payloads; all log output goes to stderr.

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, LogContext, Stage};

use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem.
///
/// Call once at startup. A second call is ignored. `RUST_LOG` directives,
/// when present, replace the level from `config`.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .from_env_lossy();

    let result = match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

/// Generate a unique id for one engine instance.
pub fn generate_engine_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("engine-{}", &uuid.simple().to_string()[..12])
}

/// Structured event logging with engine context.
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::CACHE_MISS, Stage::Cache, "cache miss",
///     tenant_id = %id);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, DEBUG, $event:expr, $stage:expr, $msg:expr $(, $($field:tt)+)?) => {
        tracing::debug!(
            target: "tc_core",
            event = $event,
            engine_id = %$ctx.engine_id,
            stage = %$stage,
            $($($field)+ ,)?
            $msg
        )
    };
    ($ctx:expr, INFO, $event:expr, $stage:expr, $msg:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            target: "tc_core",
            event = $event,
            engine_id = %$ctx.engine_id,
            stage = %$stage,
            $($($field)+ ,)?
            $msg
        )
    };
    ($ctx:expr, WARN, $event:expr, $stage:expr, $msg:expr $(, $($field:tt)+)?) => {
        tracing::warn!(
            target: "tc_core",
            event = $event,
            engine_id = %$ctx.engine_id,
            stage = %$stage,
            $($($field)+ ,)?
            $msg
        )
    };
    ($ctx:expr, ERROR, $event:expr, $stage:expr, $msg:expr $(, $($field:tt)+)?) => {
        tracing::error!(
            target: "tc_core",
            event = $event,
            engine_id = %$ctx.engine_id,
            stage = %$stage,
            $($($field)+ ,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_engine_id() {
        let id1 = generate_engine_id();
        let id2 = generate_engine_id();
        assert!(id1.starts_with("engine-"));
        assert_eq!(id1.len(), "engine-".len() + 12);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Human);
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn test_log_event_macro_compiles_with_fields() {
        let ctx = LogContext::new("engine-test");
        let tenant = "acme";
        crate::log_event!(ctx, DEBUG, event_names::CACHE_HIT, Stage::Cache, "hit", tenant_id = %tenant);
        crate::log_event!(ctx, INFO, event_names::ENGINE_STARTED, Stage::Init, "started");
    }
}
