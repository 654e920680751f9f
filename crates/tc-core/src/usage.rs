//! Quota consumption and feature lookups over a resolved tree.
//!
//! Everything here is a pure function of its input tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tc_config::tree::{Features, QuotaLimit};
use tc_config::{ConfigTree, Dimension};

/// Consumption of one quota dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub current: u64,
    pub max: u64,
    /// `round(current / max * 100)`; 0 when `max` is 0.
    pub percentage: u64,
    /// `current >= warningThreshold`.
    pub warning: bool,
    /// `current >= max`.
    pub exceeded: bool,
}

/// Usage of every dimension, keyed by dimension.
pub type UsageReport = BTreeMap<Dimension, UsageEntry>;

pub fn usage_entry(limit: &QuotaLimit) -> UsageEntry {
    UsageEntry {
        current: limit.current,
        max: limit.max,
        percentage: percentage(limit.current, limit.max),
        warning: limit.current >= limit.warning_threshold,
        exceeded: limit.current >= limit.max,
    }
}

fn percentage(current: u64, max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    (current as f64 / max as f64 * 100.0).round() as u64
}

pub fn usage_report(tree: &ConfigTree) -> UsageReport {
    tree.limits
        .iter()
        .map(|(dimension, limit)| (dimension, usage_entry(limit)))
        .collect()
}

/// `current >= max` for `dimension`.
pub fn is_limit_reached(tree: &ConfigTree, dimension: Dimension) -> bool {
    let limit = tree.limits.get(dimension);
    limit.current >= limit.max
}

/// String-keyed variant of [`is_limit_reached`]. Unknown dimensions are never reached.
pub fn is_limit_reached_named(tree: &ConfigTree, dimension: &str) -> bool {
    Dimension::parse(dimension).is_some_and(|d| is_limit_reached(tree, d))
}

pub fn is_warning_threshold_reached(tree: &ConfigTree, dimension: Dimension) -> bool {
    let limit = tree.limits.get(dimension);
    limit.current >= limit.warning_threshold
}

/// Look up a dot-separated path inside the features section.
///
/// A boolean leaf yields its value and an object yields its `enabled` flag.
/// Missing keys and any other kind of leaf yield `false`. A leading
/// `features.` is accepted, and snake_case segments match their camelCase keys.
pub fn is_feature_enabled(features: &Features, path: &str) -> bool {
    let Ok(root) = serde_json::to_value(features) else {
        return false;
    };
    let path = path.trim();
    let path = path.strip_prefix("features.").unwrap_or(path);
    if path.is_empty() {
        return false;
    }

    let mut node = &root;
    for segment in path.split('.') {
        let next = node
            .get(segment)
            .or_else(|| node.get(snake_to_camel(segment).as_str()));
        match next {
            Some(value) => node = value,
            None => return false,
        }
    }

    match node {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Object(map) => map
            .get("enabled")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false),
        _ => false,
    }
}

fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
