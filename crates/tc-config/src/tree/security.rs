//! Security policy.

use crate::layer::layered;
use serde::{Deserialize, Serialize};

/// Key a rate limit window is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitKey {
    Ip,
    User,
    Tenant,
}

impl RateLimitKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitKey::Ip => "ip",
            RateLimitKey::User => "user",
            RateLimitKey::Tenant => "tenant",
        }
    }
}

layered! {
    /// Session and login policy.
    pub struct AuthenticationPolicy / PartialAuthenticationPolicy {
        value session_timeout_minutes: u32,
        value require_mfa: bool,
        /// Failed attempts before the account is locked.
        value max_login_attempts: u32,
        value lockout_duration_minutes: u32,
        value allowed_providers: Vec<String>,
    }
}

impl Default for AuthenticationPolicy {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 60,
            require_mfa: false,
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
            allowed_providers: vec!["password".to_string()],
        }
    }
}

layered! {
    pub struct PasswordPolicy / PartialPasswordPolicy {
        value min_length: u32,
        value require_uppercase: bool,
        value require_lowercase: bool,
        value require_numbers: bool,
        value require_symbols: bool,
        /// Zero disables rotation.
        value max_age_days: u32,
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_symbols: false,
            max_age_days: 0,
        }
    }
}

layered! {
    pub struct RateLimitPolicy / PartialRateLimitPolicy {
        value window_seconds: u64,
        value max_requests: u32,
        value key_strategy: RateLimitKey,
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window_seconds: 900,
            max_requests: 100,
            key_strategy: RateLimitKey::Ip,
        }
    }
}

layered! {
    /// Cross-origin policy. Lists are replaced, never unioned.
    pub struct CorsPolicy / PartialCorsPolicy {
        value allowed_origins: Vec<String>,
        value allowed_methods: Vec<String>,
        value allowed_headers: Vec<String>,
        value allow_credentials: bool,
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            allow_credentials: true,
        }
    }
}

layered! {
    /// Fixed set of response security headers.
    pub struct SecurityHeaders / PartialSecurityHeaders {
        value content_security_policy: String,
        value strict_transport_security: String,
        value x_frame_options: String,
        value x_content_type_options: String,
        value referrer_policy: String,
    }
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            content_security_policy: "default-src 'self'".to_string(),
            strict_transport_security: "max-age=31536000; includeSubDomains".to_string(),
            x_frame_options: "DENY".to_string(),
            x_content_type_options: "nosniff".to_string(),
            referrer_policy: "strict-origin-when-cross-origin".to_string(),
        }
    }
}

layered! {
    pub struct DataProtection / PartialDataProtection {
        value encryption_at_rest: bool,
        value encryption_in_transit: bool,
        value data_retention_days: u32,
        value gdpr_compliant: bool,
    }
}

impl Default for DataProtection {
    fn default() -> Self {
        Self {
            encryption_at_rest: true,
            encryption_in_transit: true,
            data_retention_days: 365,
            gdpr_compliant: false,
        }
    }
}

layered! {
    /// Security policy of a tenant.
    pub struct Security / PartialSecurity {
        nested authentication: AuthenticationPolicy,
        nested password_policy: PasswordPolicy,
        nested rate_limit: RateLimitPolicy,
        nested cors: CorsPolicy,
        value allowed_domains: Vec<String>,
        value blocked_domains: Vec<String>,
        nested headers: SecurityHeaders,
        nested data_protection: DataProtection,
    }
}

impl Default for Security {
    fn default() -> Self {
        Self {
            authentication: AuthenticationPolicy::default(),
            password_policy: PasswordPolicy::default(),
            rate_limit: RateLimitPolicy::default(),
            cors: CorsPolicy::default(),
            allowed_domains: Vec::new(),
            blocked_domains: Vec::new(),
            headers: SecurityHeaders::default(),
            data_protection: DataProtection::default(),
        }
    }
}
