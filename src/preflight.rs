//! Preflight environment validation.
//!
//! Checks run independently - a failing disk check never short-circuits the
//! network check. Classification: insufficient disk space and no network are
//! critical; an unreachable registry only warns. Warnings never block
//! progress.

use crate::engine::{InstallConfig, Platform};
use crate::probe::disk;
use crate::probe::network::DEFAULT_REGISTRY;
use crate::ui;

/// Outcome of one environment check. A failed check lands in exactly one of
/// the report's `critical_failures` or `warnings` buckets.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub critical: bool,
    pub message: String,
    pub details: Option<String>,
}

/// Aggregated preflight verdict
#[derive(Debug, Default)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
    pub critical_failures: Vec<CheckResult>,
    pub warnings: Vec<CheckResult>,
}

impl PreflightReport {
    /// True iff no critical check failed
    pub fn passed(&self) -> bool {
        self.critical_failures.is_empty()
    }

    fn record(&mut self, check: CheckResult) {
        if !check.passed {
            if check.critical {
                self.critical_failures.push(check.clone());
            } else {
                self.warnings.push(check.clone());
            }
        }
        self.checks.push(check);
    }
}

/// Run every applicable check for the given run configuration
pub fn run_checks(config: &InstallConfig, platform: &dyn Platform) -> PreflightReport {
    let mut report = PreflightReport::default();

    report.record(disk_check(config, platform));

    if config.offline {
        log::debug!("Offline run, skipping network checks");
        return report;
    }

    let registry = config.registry.as_deref().unwrap_or(DEFAULT_REGISTRY);
    let status = platform.network_status(registry);
    report.record(network_check(status.is_online));
    if status.is_online {
        report.record(registry_check(status.registry_reachable, registry));
    }

    report
}

fn disk_check(config: &InstallConfig, platform: &dyn Platform) -> CheckResult {
    let required = disk::estimate_required_space(config.packages.len());
    let status = platform.disk_status(&config.working_dir);
    let passed = status.free_bytes >= required;

    CheckResult {
        name: "Disk Space",
        passed,
        critical: !passed,
        message: if passed {
            format!(
                "Sufficient disk space: {} free",
                ui::format_size(status.free_bytes)
            )
        } else {
            format!(
                "Insufficient disk space: {} available, {} required",
                ui::format_size(status.free_bytes),
                ui::format_size(required)
            )
        },
        details: Some(format!(
            "{} free of {}",
            ui::format_size(status.free_bytes),
            ui::format_size(status.total_bytes)
        )),
    }
}

fn network_check(is_online: bool) -> CheckResult {
    CheckResult {
        name: "Network Connectivity",
        passed: is_online,
        critical: true,
        message: if is_online {
            "Internet connection available".to_string()
        } else {
            "No internet connection detected".to_string()
        },
        details: None,
    }
}

fn registry_check(reachable: bool, registry: &str) -> CheckResult {
    CheckResult {
        name: "Package Registry",
        passed: reachable,
        critical: false,
        message: if reachable {
            format!("Registry {registry} is reachable")
        } else {
            "Cannot reach the package registry, installation may fail".to_string()
        },
        details: Some(registry.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PackageSpec;
    use crate::exec::{CommandOutcome, ExecOptions};
    use crate::manager::PackageManager;
    use crate::probe::disk::DiskStatus;
    use crate::probe::network::NetworkStatus;
    use crate::system::{ArchKind, HostInfo, OsKind};
    use std::cell::Cell;
    use std::path::Path;

    struct ProbePlatform {
        free_bytes: u64,
        online: bool,
        registry_ok: bool,
        network_calls: Cell<usize>,
    }

    impl ProbePlatform {
        fn new(free_bytes: u64, online: bool, registry_ok: bool) -> Self {
            Self {
                free_bytes,
                online,
                registry_ok,
                network_calls: Cell::new(0),
            }
        }
    }

    impl Platform for ProbePlatform {
        fn host_info(&self) -> HostInfo {
            HostInfo {
                os: OsKind::Linux,
                arch: ArchKind::X64,
                is_container: false,
                is_ci: false,
                has_elevated_privileges: false,
            }
        }

        fn disk_status(&self, _path: &Path) -> DiskStatus {
            DiskStatus {
                free_bytes: self.free_bytes,
                total_bytes: self.free_bytes * 2,
            }
        }

        fn network_status(&self, _registry: &str) -> NetworkStatus {
            self.network_calls.set(self.network_calls.get() + 1);
            NetworkStatus {
                is_online: self.online,
                registry_reachable: self.registry_ok,
            }
        }

        fn manager_available(&self, _manager: PackageManager) -> bool {
            true
        }

        fn run(&self, _program: &str, _args: &[String], _opts: &ExecOptions) -> CommandOutcome {
            unreachable!("preflight never runs commands")
        }

        fn elevate(&self, _program: &str, _args: &[String], _opts: &ExecOptions) -> CommandOutcome {
            unreachable!("preflight never elevates")
        }
    }

    fn config(packages: usize, offline: bool) -> InstallConfig {
        InstallConfig {
            packages: (0..packages)
                .map(|i| PackageSpec::parse(&format!("pkg-{i}"), Default::default()))
                .collect(),
            offline,
            ..Default::default()
        }
    }

    const PLENTY: u64 = 100 * 1024 * 1024 * 1024;

    #[test]
    fn everything_passing_yields_a_clean_report() {
        let platform = ProbePlatform::new(PLENTY, true, true);
        let report = run_checks(&config(2, false), &platform);

        assert!(report.passed());
        assert!(report.critical_failures.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.checks.len(), 3);
    }

    #[test]
    fn insufficient_disk_space_is_critical() {
        let platform = ProbePlatform::new(1024, true, true);
        let report = run_checks(&config(2, false), &platform);

        assert!(!report.passed());
        assert_eq!(report.critical_failures.len(), 1);
        assert_eq!(report.critical_failures[0].name, "Disk Space");
        // The network check still ran; no short-circuit
        assert_eq!(platform.network_calls.get(), 1);
    }

    #[test]
    fn offline_runs_skip_network_checks() {
        let platform = ProbePlatform::new(PLENTY, false, false);
        let report = run_checks(&config(1, true), &platform);

        assert!(report.passed());
        assert_eq!(platform.network_calls.get(), 0);
        assert_eq!(report.checks.len(), 1);
    }

    #[test]
    fn no_network_is_critical() {
        let platform = ProbePlatform::new(PLENTY, false, false);
        let report = run_checks(&config(1, false), &platform);

        assert!(!report.passed());
        assert_eq!(report.critical_failures.len(), 1);
        assert_eq!(report.critical_failures[0].name, "Network Connectivity");
    }

    #[test]
    fn unreachable_registry_is_only_a_warning() {
        let platform = ProbePlatform::new(PLENTY, true, false);
        let report = run_checks(&config(1, false), &platform);

        assert!(report.passed());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].name, "Package Registry");
        assert!(!report.warnings[0].critical);
    }

    #[test]
    fn failed_checks_land_in_exactly_one_bucket() {
        let platform = ProbePlatform::new(1024, true, false);
        let report = run_checks(&config(3, false), &platform);

        for check in &report.checks {
            let in_critical = report
                .critical_failures
                .iter()
                .any(|c| c.name == check.name);
            let in_warnings = report.warnings.iter().any(|c| c.name == check.name);
            assert!(!(in_critical && in_warnings), "{} in both buckets", check.name);
        }
    }
}
