//! Lifecycle, rollout and operational monitoring.

use crate::layer::layered;
use std::collections::BTreeMap;

layered! {
    /// Ordered lifecycle steps.
    pub struct LifecycleFlow / PartialLifecycleFlow {
        value steps: Vec<String>,
        value auto_advance: bool,
    }
}

layered! {
    /// Feature rollout state.
    pub struct Rollout / PartialRollout {
        map flags: BTreeMap<String, bool>,
        /// Percentage rollouts, 0..=100.
        map percentages: BTreeMap<String, u8>,
        value beta_features: Vec<String>,
        value experimental_features: Vec<String>,
    }
}

impl Default for Rollout {
    fn default() -> Self {
        Self {
            flags: BTreeMap::new(),
            percentages: BTreeMap::new(),
            beta_features: Vec::new(),
            experimental_features: Vec::new(),
        }
    }
}

layered! {
    pub struct OpsMonitoring / PartialOpsMonitoring {
        value health_check_interval_seconds: u32,
        value alert_channels: Vec<String>,
        value sla_target_percent: f64,
    }
}

impl Default for OpsMonitoring {
    fn default() -> Self {
        Self {
            health_check_interval_seconds: 60,
            alert_channels: vec!["email".to_string()],
            sla_target_percent: 99.5,
        }
    }
}

layered! {
    pub struct Workflow / PartialWorkflow {
        nested onboarding: LifecycleFlow,
        nested offboarding: LifecycleFlow,
        nested rollout: Rollout,
        nested monitoring: OpsMonitoring,
    }
}

fn steps(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            onboarding: LifecycleFlow {
                steps: steps(&["welcome", "profile", "team", "complete"]),
                auto_advance: false,
            },
            offboarding: LifecycleFlow {
                steps: steps(&["export", "confirm", "archive"]),
                auto_advance: false,
            },
            rollout: Rollout::default(),
            monitoring: OpsMonitoring::default(),
        }
    }
}
