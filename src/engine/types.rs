//! Data model for one installation run.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::manager::PackageManager;

pub use crate::manager::InstallKind;

use super::error::InstallError;

/// A single package requested for installation. Immutable for the duration
/// of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
    pub kind: InstallKind,
    /// Failure of an optional package degrades to a warning
    pub optional: bool,
}

impl PackageSpec {
    /// Parse a `name` or `name@version` argument. Scoped names keep their
    /// leading `@`: `@types/node@20.1.0` splits on the second `@`.
    pub fn parse(input: &str, kind: InstallKind) -> Self {
        let (name, version) = match input.strip_prefix('@') {
            Some(rest) => match rest.split_once('@') {
                Some((scoped, version)) => (format!("@{scoped}"), Some(version.to_string())),
                None => (input.to_string(), None),
            },
            None => match input.split_once('@') {
                Some((name, version)) => (name.to_string(), Some(version.to_string())),
                None => (input.to_string(), None),
            },
        };

        Self {
            name,
            version,
            kind,
            optional: false,
        }
    }

    /// Mark this package optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Manager-facing specifier, `name` or `name@version`
    pub fn specifier(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// Full configuration for one orchestration run. Owned by exactly one run,
/// never mutated after construction.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub packages: Vec<PackageSpec>,
    /// Explicit manager preference; `None` means auto-detect
    pub preferred_manager: Option<PackageManager>,
    pub working_dir: PathBuf,
    /// Per-command timeout, not a run-level deadline
    pub timeout: Duration,
    /// Install attempts per package, minimum 1
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub force: bool,
    pub exact: bool,
    pub offline: bool,
    pub registry: Option<String>,
    pub skip_preflight: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            preferred_manager: None,
            working_dir: PathBuf::from("."),
            timeout: Duration::from_secs(300),
            retry_attempts: 1,
            retry_delay: Duration::from_secs(1),
            force: false,
            exact: false,
            offline: false,
            registry: None,
            skip_preflight: false,
        }
    }
}

/// Lifecycle stage of a run. `Completed` and `Failed` are terminal; no stage
/// is re-enterable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Initializing,
    Preflight,
    Installing,
    Verifying,
    Completed,
    Failed,
}

impl std::fmt::Display for InstallStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Preflight => "preflight",
            Self::Installing => "installing",
            Self::Verifying => "verifying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Terminal state of one package attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOutcome {
    Completed,
    Failed,
}

/// Result of one package attempt, appended in request order and never revisited
#[derive(Debug, Clone)]
pub struct PackageResult {
    pub spec: PackageSpec,
    pub outcome: PackageOutcome,
    pub installed_version: Option<String>,
    pub duration: Duration,
    pub error: Option<InstallError>,
}

/// Mutable state of one run. Created at run start, mutated only by the
/// engine, handed to the caller when the run reaches a terminal stage.
#[derive(Debug)]
pub struct InstallRun {
    pub stage: InstallStage,
    /// Manager the run resolved to; set before the installing stage
    pub manager: Option<PackageManager>,
    pub package_results: Vec<PackageResult>,
    pub errors: Vec<InstallError>,
    pub warnings: Vec<String>,
    pub started_at: Instant,
    pub duration: Duration,
}

impl InstallRun {
    pub(crate) fn new() -> Self {
        Self {
            stage: InstallStage::Initializing,
            manager: None,
            package_results: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            started_at: Instant::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn failed(&self) -> bool {
        self.stage == InstallStage::Failed
    }

    /// Packages that finished successfully
    pub fn completed_count(&self) -> usize {
        self.package_results
            .iter()
            .filter(|r| r.outcome == PackageOutcome::Completed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_name() {
        let spec = PackageSpec::parse("typescript", InstallKind::Local);
        assert_eq!(spec.name, "typescript");
        assert_eq!(spec.version, None);
        assert_eq!(spec.specifier(), "typescript");
    }

    #[test]
    fn parse_name_with_version() {
        let spec = PackageSpec::parse("typescript@5.4.0", InstallKind::Global);
        assert_eq!(spec.name, "typescript");
        assert_eq!(spec.version.as_deref(), Some("5.4.0"));
        assert_eq!(spec.kind, InstallKind::Global);
        assert_eq!(spec.specifier(), "typescript@5.4.0");
    }

    #[test]
    fn parse_scoped_name() {
        let spec = PackageSpec::parse("@types/node", InstallKind::Dev);
        assert_eq!(spec.name, "@types/node");
        assert_eq!(spec.version, None);
    }

    #[test]
    fn parse_scoped_name_with_version() {
        let spec = PackageSpec::parse("@types/node@20.1.0", InstallKind::Dev);
        assert_eq!(spec.name, "@types/node");
        assert_eq!(spec.version.as_deref(), Some("20.1.0"));
        assert_eq!(spec.specifier(), "@types/node@20.1.0");
    }

    #[test]
    fn optional_builder_sets_the_flag() {
        let spec = PackageSpec::parse("fsevents", InstallKind::Local).optional();
        assert!(spec.optional);
    }

    #[test]
    fn fresh_run_starts_initializing() {
        let run = InstallRun::new();
        assert_eq!(run.stage, InstallStage::Initializing);
        assert!(run.package_results.is_empty());
        assert!(run.errors.is_empty());
        assert!(!run.failed());
    }
}
