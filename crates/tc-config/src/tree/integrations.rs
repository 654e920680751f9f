//! Third-party provider connections.

use crate::layer::layered;
use std::collections::BTreeMap;

layered! {
    /// Connection descriptor for one provider slot.
    pub struct IntegrationConnection / PartialIntegrationConnection {
        value enabled: bool,
        value provider: String,
        /// Reference into the secret store; credentials never live in the tree.
        value credentials_ref: Option<String>,
        map settings: BTreeMap<String, String>,
    }
}

impl IntegrationConnection {
    fn disabled(provider: &str) -> Self {
        Self {
            enabled: false,
            provider: provider.to_string(),
            credentials_ref: None,
            settings: BTreeMap::new(),
        }
    }
}

layered! {
    pub struct Integrations / PartialIntegrations {
        nested email: IntegrationConnection,
        nested payment: IntegrationConnection,
        nested analytics: IntegrationConnection,
        nested storage: IntegrationConnection,
    }
}

impl Default for Integrations {
    fn default() -> Self {
        Self {
            email: IntegrationConnection {
                enabled: true,
                ..IntegrationConnection::disabled("smtp")
            },
            payment: IntegrationConnection::disabled("stripe"),
            analytics: IntegrationConnection::disabled("internal"),
            storage: IntegrationConnection {
                enabled: true,
                ..IntegrationConnection::disabled("local")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layered;

    #[test]
    fn settings_merge_per_key() {
        let mut base = Integrations::default();
        base.email.settings.insert("from".to_string(), "noreply@example.com".to_string());
        let layer: PartialIntegrations =
            serde_json::from_str(r#"{"email":{"settings":{"replyTo":"help@acme.io"}}}"#).unwrap();
        let merged = base.with_layer(&layer);
        assert_eq!(merged.email.settings.len(), 2);
        assert_eq!(merged.email.provider, "smtp");
    }
}
