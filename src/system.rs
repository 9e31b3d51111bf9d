//! Host environment detection - OS, architecture, container/CI context,
//! and privilege level. Probed once per run and treated as a fact snapshot.

use std::fmt;
use std::path::Path;

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsKind {
    Linux,
    MacOs,
    Windows,
    Unknown,
}

impl OsKind {
    pub fn current() -> Self {
        Self::from_os_str(std::env::consts::OS)
    }

    fn from_os_str(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchKind {
    X64,
    X86,
    Arm64,
    Arm,
    Unknown,
}

impl ArchKind {
    pub fn current() -> Self {
        Self::from_arch_str(std::env::consts::ARCH)
    }

    fn from_arch_str(arch: &str) -> Self {
        match arch {
            "x86_64" => Self::X64,
            "x86" => Self::X86,
            "aarch64" => Self::Arm64,
            "arm" => Self::Arm,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ArchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X64 => write!(f, "x64"),
            Self::X86 => write!(f, "x86"),
            Self::Arm64 => write!(f, "arm64"),
            Self::Arm => write!(f, "arm"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Snapshot of host facts gathered at run start
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub os: OsKind,
    pub arch: ArchKind,
    pub is_container: bool,
    pub is_ci: bool,
    pub has_elevated_privileges: bool,
}

impl HostInfo {
    pub fn detect() -> Self {
        Self {
            os: OsKind::current(),
            arch: ArchKind::current(),
            is_container: detect_container(),
            is_ci: detect_ci(),
            has_elevated_privileges: has_elevated_privileges(),
        }
    }
}

/// Environment variables set by common CI providers
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
];

fn detect_ci() -> bool {
    ci_env_present(|name| std::env::var(name).ok())
}

fn ci_env_present(get: impl Fn(&str) -> Option<String>) -> bool {
    CI_ENV_VARS
        .iter()
        .any(|name| get(name).is_some_and(|value| !value.is_empty() && value != "false"))
}

fn detect_container() -> bool {
    if Path::new("/.dockerenv").exists() || Path::new("/run/.containerenv").exists() {
        return true;
    }
    std::fs::read_to_string("/proc/1/cgroup")
        .map(|content| cgroup_mentions_container(&content))
        .unwrap_or(false)
}

fn cgroup_mentions_container(content: &str) -> bool {
    content.lines().any(|line| {
        line.contains("docker")
            || line.contains("kubepods")
            || line.contains("containerd")
            || line.contains("lxc")
    })
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn has_elevated_privileges() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(windows)]
fn has_elevated_privileges() -> bool {
    use crate::exec::{self, ExecOptions};
    use std::time::Duration;

    // `net session` succeeds only from an elevated console
    let opts = ExecOptions {
        timeout: Duration::from_secs(5),
        ..Default::default()
    };
    exec::execute("net", &["session".to_string()], &opts).success()
}
