//! Usage quotas.

use crate::layer::layered;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

layered! {
    /// Quota for one dimension.
    pub struct QuotaLimit / PartialQuotaLimit {
        value max: u64,
        value current: u64,
        /// Consumption level that should raise a warning; expected below `max`.
        value warning_threshold: u64,
    }
}

impl QuotaLimit {
    pub fn new(max: u64, warning_threshold: u64) -> Self {
        Self {
            max,
            current: 0,
            warning_threshold,
        }
    }
}

layered! {
    /// One quota record per dimension.
    pub struct Limits / PartialLimits {
        nested users: QuotaLimit,
        /// Storage in megabytes.
        nested storage: QuotaLimit,
        /// API calls per month.
        nested api_calls: QuotaLimit,
        nested custom_domains: QuotaLimit,
        nested integrations: QuotaLimit,
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            users: QuotaLimit::new(10, 8),
            storage: QuotaLimit::new(1024, 900),
            api_calls: QuotaLimit::new(10_000, 8_000),
            custom_domains: QuotaLimit::new(1, 0),
            integrations: QuotaLimit::new(3, 2),
        }
    }
}

impl Limits {
    /// The quota record for `dimension`.
    pub fn get(&self, dimension: Dimension) -> &QuotaLimit {
        match dimension {
            Dimension::Users => &self.users,
            Dimension::Storage => &self.storage,
            Dimension::ApiCalls => &self.api_calls,
            Dimension::CustomDomains => &self.custom_domains,
            Dimension::Integrations => &self.integrations,
        }
    }

    /// Every dimension with its quota record, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &QuotaLimit)> {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }
}

/// A quota category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Users,
    Storage,
    ApiCalls,
    CustomDomains,
    Integrations,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Users,
        Dimension::Storage,
        Dimension::ApiCalls,
        Dimension::CustomDomains,
        Dimension::Integrations,
    ];

    /// camelCase name, as used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Users => "users",
            Dimension::Storage => "storage",
            Dimension::ApiCalls => "apiCalls",
            Dimension::CustomDomains => "customDomains",
            Dimension::Integrations => "integrations",
        }
    }

    /// Parse a dimension name. Accepts camelCase, snake_case and kebab-case.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "users" => Some(Dimension::Users),
            "storage" => Some(Dimension::Storage),
            "apicalls" => Some(Dimension::ApiCalls),
            "customdomains" => Some(Dimension::CustomDomains),
            "integrations" => Some(Dimension::Integrations),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::parse(s).ok_or_else(|| {
            format!(
                "unknown dimension '{}' (expected one of: users, storage, apiCalls, customDomains, integrations)",
                s
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_several_spellings() {
        assert_eq!(Dimension::parse("apiCalls"), Some(Dimension::ApiCalls));
        assert_eq!(Dimension::parse("api_calls"), Some(Dimension::ApiCalls));
        assert_eq!(Dimension::parse("custom-domains"), Some(Dimension::CustomDomains));
        assert_eq!(Dimension::parse(" USERS "), Some(Dimension::Users));
        assert_eq!(Dimension::parse("bandwidth"), None);
        assert!("bandwidth".parse::<Dimension>().is_err());
    }

    #[test]
    fn as_str_round_trips() {
        for d in Dimension::ALL {
            assert_eq!(Dimension::parse(d.as_str()), Some(d));
            assert_eq!(
                serde_json::to_string(&d).unwrap(),
                format!("\"{}\"", d.as_str())
            );
        }
    }

    #[test]
    fn default_thresholds_below_max() {
        let limits = Limits::default();
        for (_, quota) in limits.iter() {
            assert!(quota.max >= 1);
            assert!(quota.warning_threshold < quota.max);
            assert_eq!(quota.current, 0);
        }
    }
}
