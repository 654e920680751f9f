//! Exit codes for the tc-core CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-1: Operational outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

/// Exit codes for tc-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-1)
    // ========================================================================
    /// Success
    Ok = 0,

    /// The tree was read but failed validation
    ValidationFailed = 1,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Engine settings or template files are unusable
    ConfigError = 11,

    /// Input file or tenant not found
    NotFound = 12,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Ok
    }

    /// Check if this exit code is a user/environment error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        let code = self as i32;
        (10..20).contains(&code)
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        let code = self as i32;
        code >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::ValidationFailed => "ERR_VALIDATION",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::NotFound => "ERR_NOT_FOUND",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&tc_common::Error> for ExitCode {
    fn from(err: &tc_common::Error) -> Self {
        use tc_common::Error;
        match err {
            Error::Config(_) | Error::InvalidTemplate { .. } | Error::InvalidSettings(_) => {
                ExitCode::ConfigError
            }
            Error::TenantNotFound { .. } => ExitCode::NotFound,
            Error::TenantExists { .. } | Error::InvalidTenantId(_) => ExitCode::ArgsError,
            Error::ValidationFailed { .. } => ExitCode::ValidationFailed,
            Error::SyncFailed(_) => ExitCode::InternalError,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ExitCode::NotFound,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::ArgsError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
        assert_eq!(ExitCode::ValidationFailed.as_i32(), 1);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::ConfigError.as_i32(), 11);
        assert_eq!(ExitCode::NotFound.as_i32(), 12);
        assert_eq!(ExitCode::InternalError.as_i32(), 20);
        assert_eq!(ExitCode::IoError.as_i32(), 21);
    }

    #[test]
    fn test_exit_code_ranges() {
        assert!(ExitCode::Ok.is_success());
        assert!(!ExitCode::ValidationFailed.is_success());
        assert!(ExitCode::NotFound.is_user_error());
        assert!(!ExitCode::IoError.is_user_error());
        assert!(ExitCode::IoError.is_internal_error());
    }

    #[test]
    fn test_from_error() {
        let err = tc_common::Error::TenantExists {
            tenant_id: "acme".to_string(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::ArgsError);
        let err = tc_common::Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x"));
        assert_eq!(ExitCode::from(&err), ExitCode::NotFound);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::ConfigError.to_string(), "ERR_CONFIG (11)");
    }
}
