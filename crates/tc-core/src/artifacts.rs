//! Derived artifacts: a style sheet and a flat environment map.
//!
//! Both are pure functions of a tree and are regenerated on demand.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use tc_config::tree::Branding;
use tc_config::ConfigTree;

/// Render the tenant style sheet.
///
/// Custom CSS is appended last so tenant overrides win by cascade order.
pub fn generate_style_sheet(branding: &Branding) -> String {
    let colors = &branding.colors;
    let typo = &branding.typography;
    let mut out = String::with_capacity(2048);

    out.push_str(":root {\n");
    for (name, value) in colors.entries() {
        push_var(&mut out, &format!("color-{}", name.replace('.', "-")), value);
    }
    push_var(&mut out, "font-family-primary", &typo.font_family.primary);
    push_var(&mut out, "font-family-secondary", &typo.font_family.secondary);
    push_var(&mut out, "font-family-mono", &typo.font_family.mono);
    for (name, value) in [
        ("xs", &typo.font_size.xs),
        ("sm", &typo.font_size.sm),
        ("base", &typo.font_size.base),
        ("lg", &typo.font_size.lg),
        ("xl", &typo.font_size.xl),
        ("xxl", &typo.font_size.xxl),
    ] {
        push_var(&mut out, &format!("font-size-{}", name), value);
    }
    let spacing = &branding.spacing;
    for (name, value) in [
        ("xs", &spacing.xs),
        ("sm", &spacing.sm),
        ("md", &spacing.md),
        ("lg", &spacing.lg),
        ("xl", &spacing.xl),
    ] {
        push_var(&mut out, &format!("spacing-{}", name), value);
    }
    let radius = &branding.border_radius;
    for (name, value) in [
        ("none", &radius.none),
        ("sm", &radius.sm),
        ("md", &radius.md),
        ("lg", &radius.lg),
        ("full", &radius.full),
    ] {
        push_var(&mut out, &format!("radius-{}", name), value);
    }
    out.push_str("}\n\n");

    let _ = write!(
        out,
        ".btn-primary {{\n  background-color: {primary};\n  color: {inverse};\n  \
         font-family: {font};\n  font-weight: {weight};\n  padding: {sp_sm} {sp_md};\n  \
         border: none;\n  border-radius: {radius};\n}}\n\n",
        primary = colors.primary,
        inverse = colors.text.inverse,
        font = typo.font_family.primary,
        weight = typo.font_weight.semibold,
        sp_sm = spacing.sm,
        sp_md = spacing.md,
        radius = radius.md,
    );
    let _ = write!(
        out,
        ".card {{\n  background-color: {surface};\n  color: {text};\n  padding: {sp_lg};\n  \
         border-radius: {radius};\n  box-shadow: {shadow};\n}}\n\n",
        surface = colors.surface,
        text = colors.text.primary,
        sp_lg = spacing.lg,
        radius = radius.lg,
        shadow = branding.shadows.md,
    );
    let _ = write!(
        out,
        ".input {{\n  font-family: {font};\n  font-size: {size};\n  color: {text};\n  \
         padding: {sp_sm};\n  border: 1px solid {border};\n  border-radius: {radius};\n}}\n\n\
         .input:focus {{\n  border-color: {primary};\n  outline: none;\n}}\n",
        font = typo.font_family.primary,
        size = typo.font_size.base,
        text = colors.text.primary,
        sp_sm = spacing.sm,
        border = colors.secondary,
        radius = radius.sm,
        primary = colors.primary,
    );

    if let Some(css) = branding.custom_css.as_deref() {
        if !css.trim().is_empty() {
            out.push('\n');
            out.push_str(css);
            if !css.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out
}

fn push_var(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "  --{}: {};", name, value);
}

/// Flatten deployment-relevant fields into environment variables.
pub fn generate_env_map(tree: &ConfigTree) -> BTreeMap<String, String> {
    let security = &tree.security;
    let limits = &tree.limits;
    let entries: [(&str, String); 25] = [
        ("TENANT_ID", tree.id.clone()),
        ("TENANT_NAME", tree.name.clone()),
        ("TENANT_SUBDOMAIN", tree.subdomain.clone()),
        ("TENANT_STATUS", tree.status.to_string()),
        ("TENANT_PLAN", tree.metadata.plan.to_string()),
        ("TENANT_TIER", tree.metadata.tier.to_string()),
        ("TENANT_REGION", tree.metadata.region.clone()),
        ("TENANT_TIMEZONE", tree.metadata.timezone.clone()),
        ("BRAND_PRIMARY_COLOR", tree.branding.colors.primary.clone()),
        ("BRAND_SECONDARY_COLOR", tree.branding.colors.secondary.clone()),
        ("BRAND_ACCENT_COLOR", tree.branding.colors.accent.clone()),
        (
            "BRAND_FONT_FAMILY",
            tree.branding.typography.font_family.primary.clone(),
        ),
        ("BRAND_LOGO_URL", tree.branding.logo.primary.clone()),
        ("BRAND_FAVICON_URL", tree.branding.logo.favicon.clone()),
        ("LIMIT_MAX_USERS", limits.users.max.to_string()),
        ("LIMIT_MAX_STORAGE", limits.storage.max.to_string()),
        ("LIMIT_MAX_API_CALLS", limits.api_calls.max.to_string()),
        ("LIMIT_MAX_CUSTOM_DOMAINS", limits.custom_domains.max.to_string()),
        ("LIMIT_MAX_INTEGRATIONS", limits.integrations.max.to_string()),
        (
            "SECURITY_SESSION_TIMEOUT",
            security.authentication.session_timeout_minutes.to_string(),
        ),
        (
            "SECURITY_REQUIRE_MFA",
            security.authentication.require_mfa.to_string(),
        ),
        (
            "SECURITY_RATE_LIMIT_WINDOW",
            security.rate_limit.window_seconds.to_string(),
        ),
        (
            "SECURITY_RATE_LIMIT_MAX",
            security.rate_limit.max_requests.to_string(),
        ),
        ("CORS_ORIGINS", security.cors.allowed_origins.join(",")),
        ("ALLOWED_DOMAINS", security.allowed_domains.join(",")),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Render an env map as `KEY=value` lines, sorted by key.
pub fn render_env_file(env: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in env {
        if value.contains(' ') || value.contains('#') {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            let _ = writeln!(out, "{}=\"{}\"", key, escaped);
        } else {
            let _ = writeln!(out, "{}={}", key, value);
        }
    }
    out
}
