//! Error taxonomy for installation runs.
//!
//! Every error carries human-readable remediation suggestions. Suggestions
//! are advisory text only, never executed. Errors are data on the run, not
//! exceptions: the engine surfaces them through its result and reporter and
//! never throws past its boundary.

use thiserror::Error;

use crate::exec::CommandOutcome;

/// Stable machine-readable error class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A critical preflight check failed; nothing was installed
    PreflightFailed,
    /// A package install command failed
    PackageInstallFailed,
    /// Anything outside the taxonomy above
    Unexpected,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreflightFailed => "PREFLIGHT_CHECK_FAILED",
            Self::PackageInstallFailed => "PACKAGE_INSTALL_FAILED",
            Self::Unexpected => "UNEXPECTED_ERROR",
        }
    }
}

/// One recorded failure on a run
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InstallError {
    pub code: ErrorCode,
    pub message: String,
    /// Package the failure is attributed to, when there is one
    pub package: Option<String>,
    /// Recoverable failures degrade to warnings instead of aborting the run
    pub recoverable: bool,
    pub suggestions: Vec<String>,
}

impl InstallError {
    /// A critical preflight failure; always aborts before any install attempt
    pub fn preflight(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::PreflightFailed,
            message: message.into(),
            package: None,
            recoverable: false,
            suggestions: vec!["Fix the reported issue and try again".to_string()],
        }
    }

    /// A failed install command for one package. Recoverable iff the package
    /// was marked optional.
    pub fn package_failure(package: &str, outcome: &CommandOutcome, recoverable: bool) -> Self {
        let reason = if outcome.timed_out {
            "install command timed out".to_string()
        } else {
            outcome
                .stderr
                .lines()
                .find(|line| !line.trim().is_empty())
                .map(|line| line.trim().to_string())
                .unwrap_or_else(|| format!("install command exited with code {}", outcome.exit_code))
        };

        let suggestions = if outcome.timed_out {
            vec![
                "Increase the timeout and retry".to_string(),
                "Check for a stalled network connection".to_string(),
            ]
        } else {
            suggest_for_output(&outcome.stderr)
        };

        Self {
            code: ErrorCode::PackageInstallFailed,
            message: format!("Failed to install {package}: {reason}"),
            package: Some(package.to_string()),
            recoverable,
            suggestions,
        }
    }

    /// Anything that escaped the taxonomy; never recoverable
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Unexpected,
            message: message.into(),
            package: None,
            recoverable: false,
            suggestions: vec![
                "Check the logs for more details".to_string(),
                "Re-run with -v for verbose output".to_string(),
            ],
        }
    }
}

/// Map failure output to remediation advice by signature fragments
fn suggest_for_output(stderr: &str) -> Vec<String> {
    let lower = stderr.to_lowercase();

    if lower.contains("404")
        || lower.contains("not found")
        || lower.contains("no matching version")
    {
        return vec![
            "Verify the package name and version".to_string(),
            "Search the registry for the correct spelling".to_string(),
        ];
    }

    if lower.contains("econnrefused")
        || lower.contains("enotfound")
        || lower.contains("etimedout")
        || lower.contains("network")
    {
        return vec![
            "Check your internet connection".to_string(),
            "Verify any proxy or registry configuration".to_string(),
        ];
    }

    if lower.contains("eacces") || lower.contains("eperm") || lower.contains("permission") {
        return vec![
            "Re-run from a console with administrator rights".to_string(),
            "Check ownership of the manager's global directory".to_string(),
        ];
    }

    if lower.contains("integrity") || lower.contains("checksum") || lower.contains("corrupt") {
        return vec!["Clear the package manager cache and retry".to_string()];
    }

    vec![
        "Check your internet connection".to_string(),
        "Verify the package name and version".to_string(),
        "Try clearing the package manager cache".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stderr: &str) -> CommandOutcome {
        CommandOutcome::failure(1, stderr)
    }

    #[test]
    fn preflight_errors_are_never_recoverable() {
        let err = InstallError::preflight("Insufficient disk space");
        assert_eq!(err.code, ErrorCode::PreflightFailed);
        assert!(!err.recoverable);
        assert!(err.package.is_none());
    }

    #[test]
    fn package_failure_carries_the_package_name() {
        let err = InstallError::package_failure("typescript", &failed("boom"), false);
        assert_eq!(err.code, ErrorCode::PackageInstallFailed);
        assert_eq!(err.package.as_deref(), Some("typescript"));
        assert!(err.message.contains("typescript"));
    }

    #[test]
    fn optional_package_failures_are_recoverable() {
        let err = InstallError::package_failure("fsevents", &failed("boom"), true);
        assert!(err.recoverable);
    }

    #[test]
    fn not_found_output_suggests_checking_the_name() {
        let err = InstallError::package_failure(
            "tpyescript",
            &failed("npm ERR! 404 Not Found - GET https://registry.npmjs.org/tpyescript"),
            false,
        );
        assert!(err.suggestions.iter().any(|s| s.contains("package name")));
    }

    #[test]
    fn network_output_suggests_checking_the_connection() {
        let err = InstallError::package_failure(
            "react",
            &failed("npm ERR! code ECONNREFUSED"),
            false,
        );
        assert!(err.suggestions.iter().any(|s| s.contains("internet connection")));
    }

    #[test]
    fn permission_output_suggests_elevation() {
        let err = InstallError::package_failure(
            "typescript",
            &failed("EACCES: permission denied, mkdir"),
            false,
        );
        assert!(err.suggestions.iter().any(|s| s.contains("administrator")));
    }

    #[test]
    fn timeout_gets_its_own_message_and_advice() {
        let outcome = CommandOutcome {
            exit_code: crate::exec::TIMEOUT_EXIT_CODE,
            stdout: String::new(),
            stderr: String::new(),
            duration: std::time::Duration::from_secs(300),
            timed_out: true,
        };
        let err = InstallError::package_failure("webpack", &outcome, false);
        assert!(err.message.contains("timed out"));
        assert!(err.suggestions.iter().any(|s| s.contains("timeout")));
    }

    #[test]
    fn error_codes_have_stable_names() {
        assert_eq!(ErrorCode::PreflightFailed.as_str(), "PREFLIGHT_CHECK_FAILED");
        assert_eq!(
            ErrorCode::PackageInstallFailed.as_str(),
            "PACKAGE_INSTALL_FAILED"
        );
        assert_eq!(ErrorCode::Unexpected.as_str(), "UNEXPECTED_ERROR");
    }
}
