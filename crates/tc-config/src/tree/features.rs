//! Feature flags, organised as core toggles plus platform, business and
//! advanced tiers. Sub-policies that can be switched off carry an `enabled`
//! flag; dot-path lookups treat that flag as the value of the object.

use crate::layer::layered;
use serde::{Deserialize, Serialize};

/// Data isolation between tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    Shared,
    Schema,
    Database,
}

impl IsolationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationMode::Shared => "shared",
            IsolationMode::Schema => "schema",
            IsolationMode::Database => "database",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    Hourly,
    Daily,
    Weekly,
}

impl BackupFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupFrequency::Hourly => "hourly",
            BackupFrequency::Daily => "daily",
            BackupFrequency::Weekly => "weekly",
        }
    }
}

layered! {
    /// Plain on/off toggles.
    pub struct CoreFeatures / PartialCoreFeatures {
        value authentication: bool,
        value user_management: bool,
        value dashboard: bool,
        value settings: bool,
        value search: bool,
        value dark_mode: bool,
    }
}

impl Default for CoreFeatures {
    fn default() -> Self {
        Self {
            authentication: true,
            user_management: true,
            dashboard: true,
            settings: true,
            search: false,
            dark_mode: false,
        }
    }
}

layered! {
    pub struct AnalyticsFeature / PartialAnalyticsFeature {
        value enabled: bool,
        value provider: String,
        value retention_days: u32,
    }
}

layered! {
    pub struct NotificationsFeature / PartialNotificationsFeature {
        value enabled: bool,
        value channels: Vec<String>,
    }
}

layered! {
    pub struct FileUploadFeature / PartialFileUploadFeature {
        value enabled: bool,
        value max_file_size_mb: u32,
        /// MIME types or extensions accepted for upload.
        value allowed_types: Vec<String>,
    }
}

layered! {
    pub struct ApiAccessFeature / PartialApiAccessFeature {
        value enabled: bool,
        value rate_limit_per_minute: u32,
        value versions: Vec<String>,
    }
}

layered! {
    pub struct PlatformFeatures / PartialPlatformFeatures {
        nested analytics: AnalyticsFeature,
        nested notifications: NotificationsFeature,
        nested file_upload: FileUploadFeature,
        nested api_access: ApiAccessFeature,
    }
}

impl Default for PlatformFeatures {
    fn default() -> Self {
        Self {
            analytics: AnalyticsFeature {
                enabled: true,
                provider: "internal".to_string(),
                retention_days: 30,
            },
            notifications: NotificationsFeature {
                enabled: true,
                channels: vec!["email".to_string()],
            },
            file_upload: FileUploadFeature {
                enabled: true,
                max_file_size_mb: 10,
                allowed_types: ["image/png", "image/jpeg", "application/pdf"]
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
            },
            api_access: ApiAccessFeature {
                enabled: false,
                rate_limit_per_minute: 60,
                versions: vec!["v1".to_string()],
            },
        }
    }
}

layered! {
    pub struct IntegrationsFeature / PartialIntegrationsFeature {
        value enabled: bool,
        value max_integrations: u32,
        value allowed: Vec<String>,
    }
}

layered! {
    pub struct ReportingFeature / PartialReportingFeature {
        value enabled: bool,
        value scheduled: bool,
        value export_formats: Vec<String>,
    }
}

layered! {
    pub struct BusinessFeatures / PartialBusinessFeatures {
        value custom_domain: bool,
        value white_label: bool,
        nested integrations: IntegrationsFeature,
        nested reporting: ReportingFeature,
    }
}

impl Default for BusinessFeatures {
    fn default() -> Self {
        Self {
            custom_domain: false,
            white_label: false,
            integrations: IntegrationsFeature {
                enabled: false,
                max_integrations: 3,
                allowed: Vec::new(),
            },
            reporting: ReportingFeature {
                enabled: true,
                scheduled: false,
                export_formats: vec!["csv".to_string()],
            },
        }
    }
}

layered! {
    pub struct MultiTenancyFeature / PartialMultiTenancyFeature {
        value enabled: bool,
        value isolation: IsolationMode,
    }
}

layered! {
    pub struct AuditLoggingFeature / PartialAuditLoggingFeature {
        value enabled: bool,
        value retention_days: u32,
    }
}

layered! {
    pub struct BackupFeature / PartialBackupFeature {
        value enabled: bool,
        value frequency: BackupFrequency,
        value retention_days: u32,
    }
}

layered! {
    pub struct MonitoringFeature / PartialMonitoringFeature {
        value enabled: bool,
        value alerting: bool,
        value metrics_interval_seconds: u32,
    }
}

layered! {
    pub struct AdvancedFeatures / PartialAdvancedFeatures {
        nested multi_tenancy: MultiTenancyFeature,
        nested audit_logging: AuditLoggingFeature,
        nested backup: BackupFeature,
        nested monitoring: MonitoringFeature,
    }
}

impl Default for AdvancedFeatures {
    fn default() -> Self {
        Self {
            multi_tenancy: MultiTenancyFeature {
                enabled: true,
                isolation: IsolationMode::Shared,
            },
            audit_logging: AuditLoggingFeature {
                enabled: false,
                retention_days: 90,
            },
            backup: BackupFeature {
                enabled: true,
                frequency: BackupFrequency::Daily,
                retention_days: 7,
            },
            monitoring: MonitoringFeature {
                enabled: true,
                alerting: false,
                metrics_interval_seconds: 60,
            },
        }
    }
}

layered! {
    /// Feature flags of a tenant.
    pub struct Features / PartialFeatures {
        nested core: CoreFeatures,
        nested platform: PlatformFeatures,
        nested business: BusinessFeatures,
        nested advanced: AdvancedFeatures,
    }
}

impl Default for Features {
    fn default() -> Self {
        Self {
            core: CoreFeatures::default(),
            platform: PlatformFeatures::default(),
            business: BusinessFeatures::default(),
            advanced: AdvancedFeatures::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layered;

    #[test]
    fn json_paths_use_camel_case() {
        let json = serde_json::to_value(Features::default()).unwrap();
        assert_eq!(json["platform"]["fileUpload"]["maxFileSizeMb"], 10);
        assert_eq!(json["advanced"]["multiTenancy"]["isolation"], "shared");
        assert_eq!(json["core"]["userManagement"], true);
    }

    #[test]
    fn nested_layer_touches_only_named_flag() {
        let layer: PartialFeatures =
            serde_json::from_str(r#"{"advanced":{"auditLogging":{"enabled":true}}}"#).unwrap();
        let merged = Features::default().with_layer(&layer);
        assert!(merged.advanced.audit_logging.enabled);
        assert_eq!(merged.advanced.audit_logging.retention_days, 90);
        assert_eq!(merged.platform, PlatformFeatures::default());
    }
}
