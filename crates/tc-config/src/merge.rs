//! Tenant tree resolution.
//!
//! `resolve` builds a complete [`ConfigTree`] from the baseline, a template
//! layer and caller overrides, with precedence `overrides > template > baseline`.
//! Inputs are borrowed immutably and the result is an owned value, so no
//! caller can observe the merge through aliasing.

use crate::layer::Layered;
use crate::tree::{ConfigTree, PartialConfigTree};
use chrono::{DateTime, Utc};

/// Values written onto every resolved tree, whatever the layers say.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveStamp {
    pub tenant_id: String,
    pub now: DateTime<Utc>,
}

impl ResolveStamp {
    /// Stamp for `tenant_id` at the current time.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self::at(tenant_id, Utc::now())
    }

    pub fn at(tenant_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            now,
        }
    }
}

/// Merge `template` then `overrides` over `baseline` and stamp the result.
///
/// Total over any well-typed layers: every field of the output comes from
/// the highest layer that sets it, falling back to the baseline. Arrays are
/// replaced, nested sections recurse, maps union per key.
pub fn resolve(
    baseline: &ConfigTree,
    template: &PartialConfigTree,
    overrides: &PartialConfigTree,
    stamp: &ResolveStamp,
) -> ConfigTree {
    resolve_layers(baseline, &[template, overrides], stamp)
}

/// Apply `layers` in order (later wins) over `baseline` and stamp the result.
fn resolve_layers(
    baseline: &ConfigTree,
    layers: &[&PartialConfigTree],
    stamp: &ResolveStamp,
) -> ConfigTree {
    let mut tree = baseline.clone();
    for layer in layers {
        tree.apply(layer);
    }
    tree.id = stamp.tenant_id.clone();
    tree.metadata.created_at = stamp.now;
    tree.metadata.last_active = stamp.now;
    tree
}
