//! Tenant Config Core - command line front end
//!
//! The main entry point for tc-core, handling:
//! - Template listing and tenant resolution
//! - Validation of tenant trees stored as JSON
//! - Style sheet, environment map and usage derivation
//! - Request-side tenant identification
//! - Engine configuration diagnostics

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tc_common::error::format_error_human;
use tc_common::{OutputFormat, StructuredError, TenantId};
use tc_config::validate::ValidationError;
use tc_config::{validate_tree, ConfigTree, EngineSettings, PartialConfigTree};
use tc_core::artifacts::{generate_env_map, generate_style_sheet, render_env_file};
use tc_core::config::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
use tc_core::exit_codes::ExitCode;
use tc_core::log_event;
use tc_core::logging::{
    event_names, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use tc_core::usage::usage_report;
use tc_core::{SystemClock, TenantConfigService, WorkflowRegistry};

/// Tenant Config Core - resolve, validate and derive tenant configuration
#[derive(Parser)]
#[command(name = "tc-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to engine.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of custom *.json templates
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available templates
    Templates,

    /// Resolve a tenant from a template and optional overrides
    Resolve(ResolveArgs),

    /// Validate a tenant tree stored as JSON
    Validate(TreeFileArgs),

    /// Print the style sheet for a tenant tree
    Stylesheet(TreeFileArgs),

    /// Print the environment variables for a tenant tree
    Env(TreeFileArgs),

    /// Print quota usage for a tenant tree
    Usage(TreeFileArgs),

    /// Derive the tenant id for a request
    Identify(IdentifyArgs),

    /// Show where the engine configuration comes from and whether it is valid
    Check,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Tenant id to stamp on the result
    #[arg(long)]
    tenant: String,

    /// Template name, or comma-separated names stacked left to right
    /// (unknown names resolve against the baseline only)
    #[arg(long)]
    template: String,

    /// JSON layer document applied over the template
    #[arg(long)]
    overrides: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TreeFileArgs {
    /// Path to a complete tenant tree (JSON)
    file: PathBuf,
}

#[derive(Args, Debug)]
struct IdentifyArgs {
    /// Request Host header
    #[arg(long)]
    host: Option<String>,

    /// Explicit X-Tenant-ID header
    #[arg(long)]
    tenant_header: Option<String>,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let env_config = LogConfig::from_env(None, cli.global.log_format);
    let level = LogLevel::from_verbosity(env_config.level, cli.global.verbose, cli.global.quiet);
    init_logging(&env_config.with_level(level));

    let exit_code = match &cli.command {
        Commands::Templates => run_templates(&cli.global),
        Commands::Resolve(args) => run_resolve(&cli.global, args),
        Commands::Validate(args) => run_validate(&cli.global, args),
        Commands::Stylesheet(args) => run_stylesheet(&cli.global, args),
        Commands::Env(args) => run_env(&cli.global, args),
        Commands::Usage(args) => run_usage(&cli.global, args),
        Commands::Identify(args) => run_identify(&cli.global, args),
        Commands::Check => run_check(&cli.global),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Helpers
// ============================================================================

fn config_options(global: &GlobalOpts) -> ConfigOptions {
    ConfigOptions {
        engine_path: global.config.clone(),
        templates_dir: global.templates_dir.clone(),
    }
}

fn load_resolved(global: &GlobalOpts) -> Result<ResolvedConfig, ExitCode> {
    load_config(&config_options(global)).map_err(|e| report_config_error(global, e))
}

fn report_config_error(global: &GlobalOpts, err: ConfigError) -> ExitCode {
    let code = match &err {
        ConfigError::NotFound { .. } => ExitCode::NotFound,
        ConfigError::IoError { .. } => ExitCode::IoError,
        _ => ExitCode::ConfigError,
    };
    report_error(global, &tc_common::Error::from(err));
    code
}

fn report_error(global: &GlobalOpts, err: &tc_common::Error) {
    match global.format {
        OutputFormat::Json => eprintln!("{}", StructuredError::from(err).to_json_pretty()),
        OutputFormat::Text => eprintln!("{}", format_error_human(err, false)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::Ok
        }
        Err(e) => {
            eprintln!("failed to serialize output: {}", e);
            ExitCode::InternalError
        }
    }
}

/// Read a complete tree from `path`, mapping failures to exit codes.
fn load_tree(global: &GlobalOpts, path: &Path) -> Result<ConfigTree, ExitCode> {
    if !path.exists() {
        report_error(
            global,
            &tc_common::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("tree file not found: {}", path.display()),
            )),
        );
        return Err(ExitCode::NotFound);
    }
    ConfigTree::from_file(path).map_err(|e| {
        let code = match e {
            ValidationError::IoError(_) => ExitCode::IoError,
            _ => ExitCode::ArgsError,
        };
        report_error(
            global,
            &tc_common::Error::Config(format!("{}: {}", path.display(), e)),
        );
        code
    })
}

// ============================================================================
// Commands
// ============================================================================

fn run_templates(global: &GlobalOpts) -> ExitCode {
    let resolved = match load_resolved(global) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let catalog = match resolved.catalog() {
        Ok(c) => c,
        Err(e) => return report_config_error(global, e),
    };

    let templates = catalog.list();
    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "templates": templates })),
        OutputFormat::Text => {
            for t in &templates {
                let plan = t.plan.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
                let kind = if t.builtin { "builtin" } else { "custom" };
                println!("{:<14} {:<8} {:<13} {}", t.name, kind, plan, t.description);
            }
            ExitCode::Ok
        }
    }
}

fn run_resolve(global: &GlobalOpts, args: &ResolveArgs) -> ExitCode {
    let resolved = match load_resolved(global) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let catalog = match resolved.catalog() {
        Ok(c) => c,
        Err(e) => return report_config_error(global, e),
    };

    let overrides = match &args.overrides {
        Some(path) => match PartialConfigTree::from_file(path) {
            Ok(layer) => layer,
            Err(e) => {
                report_error(
                    global,
                    &tc_common::Error::Config(format!("{}: {}", path.display(), e)),
                );
                return match e {
                    ValidationError::IoError(_) if !path.exists() => ExitCode::NotFound,
                    ValidationError::IoError(_) => ExitCode::IoError,
                    _ => ExitCode::ArgsError,
                };
            }
        },
        None => PartialConfigTree::default(),
    };

    let registry = Arc::new(WorkflowRegistry::new(catalog));
    let service = match TenantConfigService::with_registry(
        EngineSettings::uncached(),
        registry,
        Arc::new(SystemClock),
    ) {
        Ok(s) => s,
        Err(e) => {
            report_error(global, &e);
            return ExitCode::from(&e);
        }
    };

    let tree = match service.create_tenant_from_template(
        &args.tenant,
        &args.template,
        &overrides,
        false,
    ) {
        Ok(tree) => tree,
        Err(e) => {
            report_error(global, &e);
            return ExitCode::from(&e);
        }
    };

    match global.format {
        OutputFormat::Json => print_json(&tree),
        OutputFormat::Text => {
            println!("Tenant:    {}", tree.id);
            println!("Name:      {}", tree.name);
            println!("Subdomain: {}", tree.subdomain);
            println!("Plan:      {} ({})", tree.metadata.plan, tree.metadata.tier);
            println!("Status:    {}", tree.status);
            ExitCode::Ok
        }
    }
}

fn run_validate(global: &GlobalOpts, args: &TreeFileArgs) -> ExitCode {
    let tree = match load_tree(global, &args.file) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let ctx = LogContext::generate();
    let report = validate_tree(&tree);

    log_event!(
        ctx,
        INFO,
        event_names::TREE_VALIDATED,
        Stage::Validate,
        "tree validated",
        tenant_id = %tree.id,
        valid = report.valid,
        errors = report.len()
    );

    match global.format {
        OutputFormat::Json => {
            if let ExitCode::InternalError = print_json(&report) {
                return ExitCode::InternalError;
            }
        }
        OutputFormat::Text => {
            if report.valid {
                println!("{}: valid", args.file.display());
            } else {
                println!("{}: {} error(s)", args.file.display(), report.len());
                for issue in &report.errors {
                    println!("  {} [{}] {}", issue.field, issue.kind, issue.message);
                }
            }
        }
    }

    if report.valid {
        ExitCode::Ok
    } else {
        ExitCode::ValidationFailed
    }
}

fn run_stylesheet(global: &GlobalOpts, args: &TreeFileArgs) -> ExitCode {
    let tree = match load_tree(global, &args.file) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let css = generate_style_sheet(&tree.branding);
    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "tenantId": tree.id,
            "css": css,
        })),
        OutputFormat::Text => {
            print!("{}", css);
            ExitCode::Ok
        }
    }
}

fn run_env(global: &GlobalOpts, args: &TreeFileArgs) -> ExitCode {
    let tree = match load_tree(global, &args.file) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let env = generate_env_map(&tree);
    match global.format {
        OutputFormat::Json => print_json(&env),
        OutputFormat::Text => {
            print!("{}", render_env_file(&env));
            ExitCode::Ok
        }
    }
}

fn run_usage(global: &GlobalOpts, args: &TreeFileArgs) -> ExitCode {
    let tree = match load_tree(global, &args.file) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let report = usage_report(&tree);
    match global.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            for (dimension, entry) in &report {
                let flag = if entry.exceeded {
                    "EXCEEDED"
                } else if entry.warning {
                    "warning"
                } else {
                    "ok"
                };
                println!(
                    "{:<14} {:>10} / {:<10} {:>3}%  {}",
                    dimension, entry.current, entry.max, entry.percentage, flag
                );
            }
            ExitCode::Ok
        }
    }
}

fn run_identify(global: &GlobalOpts, args: &IdentifyArgs) -> ExitCode {
    let derived = TenantId::from_request(args.host.as_deref(), args.tenant_header.as_deref());
    let fallback = derived.is_none();
    let tenant = derived.unwrap_or_else(TenantId::default_tenant);

    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "tenantId": tenant,
            "fallback": fallback,
        })),
        OutputFormat::Text => {
            if fallback {
                println!("{} (fallback)", tenant.as_str());
            } else {
                println!("{}", tenant.as_str());
            }
            ExitCode::Ok
        }
    }
}

fn run_check(global: &GlobalOpts) -> ExitCode {
    let ctx = LogContext::generate();
    let resolved = match load_config(&config_options(global)) {
        Ok(r) => r,
        Err(e) => {
            log_event!(
                ctx,
                ERROR,
                event_names::CONFIG_ERROR,
                Stage::Init,
                "engine configuration rejected",
                error = %e
            );
            return report_config_error(global, e);
        }
    };

    match &resolved.path {
        Some(path) => log_event!(
            ctx,
            INFO,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "engine configuration loaded",
            path = %path.display(),
            source = %resolved.source
        ),
        None => log_event!(
            ctx,
            INFO,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "no engine.json found; using built-in defaults"
        ),
    }

    let templates = match resolved.catalog() {
        Ok(c) => c.names(),
        Err(e) => return report_config_error(global, e),
    };

    let summary = resolved.summary();
    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "config": summary,
            "templates": templates,
        })),
        OutputFormat::Text => {
            match &summary.path {
                Some(path) => println!("Config:    {} ({})", path.display(), summary.source),
                None => println!("Config:    {}", summary.source),
            }
            if let Some(hash) = &summary.hash {
                println!("Hash:      {}", hash);
            }
            println!(
                "Cache:     {} (ttl {}s)",
                if summary.settings.cache.enabled { "on" } else { "off" },
                summary.settings.cache.ttl_seconds
            );
            println!(
                "Sync:      {} (every {}s)",
                if summary.settings.sync.enabled { "on" } else { "off" },
                summary.settings.sync.interval_seconds
            );
            println!("Templates: {}", templates.join(", "));
            ExitCode::Ok
        }
    }
}
