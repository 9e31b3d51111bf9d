//! Package manager detection and command construction.
//!
//! Resolution priority, first satisfied wins: explicit preference, lock-file
//! evidence, manifest evidence, first available from the probe order, then
//! npm as the hard-coded fallback. Every call re-probes availability - no
//! caching, so a changing environment is always observed.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::exec;

/// The package managers maestro knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

/// Probe order when no other evidence decides
pub const PROBE_ORDER: [PackageManager; 4] = [
    PackageManager::Npm,
    PackageManager::Yarn,
    PackageManager::Pnpm,
    PackageManager::Bun,
];

/// Assumed always present alongside a Node.js install
pub const DEFAULT_MANAGER: PackageManager = PackageManager::Npm;

impl PackageManager {
    /// Executable name on PATH
    pub fn command(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    /// Lock file that pins a project to this manager
    pub fn lock_file(self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Yarn => "yarn.lock",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Bun => "bun.lockb",
        }
    }

    /// Host-side existence probe for this manager's executable
    pub fn is_available(self) -> bool {
        exec::command_exists(self.command())
    }

    /// Reported tool version, if the executable responds
    pub fn version(self) -> Option<String> {
        exec::command_version(self.command())
    }

    /// Argument tokens for installing `specs` (each `name` or `name@version`).
    ///
    /// Tokens follow each manager's documented flag syntax; the caller spawns
    /// `self.command()` with these directly, so nothing passes through a shell.
    pub fn install_args(self, specs: &[String], kind: InstallKind, flags: &InstallFlags) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        match self {
            Self::Npm => {
                args.push("install".into());
                if kind == InstallKind::Global {
                    args.push("-g".into());
                }
                if kind == InstallKind::Dev {
                    args.push("--save-dev".into());
                }
                if flags.exact {
                    args.push("--save-exact".into());
                }
                if flags.force {
                    args.push("--force".into());
                }
                if flags.offline {
                    args.push("--offline".into());
                }
                if let Some(registry) = &flags.registry {
                    args.push(format!("--registry={registry}"));
                }
            }
            Self::Yarn => {
                if kind == InstallKind::Global {
                    args.push("global".into());
                }
                args.push("add".into());
                if kind == InstallKind::Dev {
                    args.push("--dev".into());
                }
                if flags.exact {
                    args.push("--exact".into());
                }
                if flags.force {
                    args.push("--force".into());
                }
                if flags.offline {
                    args.push("--offline".into());
                }
                if let Some(registry) = &flags.registry {
                    args.push(format!("--registry={registry}"));
                }
            }
            Self::Pnpm => {
                args.push("add".into());
                if kind == InstallKind::Global {
                    args.push("-g".into());
                }
                if kind == InstallKind::Dev {
                    args.push("--save-dev".into());
                }
                if flags.exact {
                    args.push("--save-exact".into());
                }
                if flags.force {
                    args.push("--force".into());
                }
                if flags.offline {
                    args.push("--offline".into());
                }
                if let Some(registry) = &flags.registry {
                    args.push(format!("--registry={registry}"));
                }
            }
            Self::Bun => {
                args.push("add".into());
                if kind == InstallKind::Global {
                    args.push("-g".into());
                }
                if kind == InstallKind::Dev {
                    args.push("--dev".into());
                }
                if flags.exact {
                    args.push("--exact".into());
                }
                if flags.force {
                    args.push("--force".into());
                }
                if let Some(registry) = &flags.registry {
                    args.push(format!("--registry={registry}"));
                }
            }
        }

        args.extend(specs.iter().cloned());
        args
    }

    /// Argument tokens for removing `specs`
    pub fn uninstall_args(self, specs: &[String], global: bool) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        match self {
            Self::Npm => {
                args.push("uninstall".into());
                if global {
                    args.push("-g".into());
                }
            }
            Self::Yarn => {
                if global {
                    args.push("global".into());
                }
                args.push("remove".into());
            }
            Self::Pnpm => {
                args.push("remove".into());
                if global {
                    args.push("-g".into());
                }
            }
            Self::Bun => {
                args.push("remove".into());
                if global {
                    args.push("-g".into());
                }
            }
        }
        args.extend(specs.iter().cloned());
        args
    }

    /// Argument tokens for clearing this manager's cache
    pub fn cache_clean_args(self) -> Vec<String> {
        let tokens: &[&str] = match self {
            Self::Npm => &["cache", "clean", "--force"],
            Self::Yarn => &["cache", "clean"],
            Self::Pnpm => &["store", "prune"],
            Self::Bun => &["pm", "cache", "rm"],
        };
        tokens.iter().map(|t| (*t).to_string()).collect()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            "pnpm" => Ok(Self::Pnpm),
            "bun" => Ok(Self::Bun),
            other => Err(format!("unknown package manager: {other}")),
        }
    }
}

/// How a package is wired into the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallKind {
    #[default]
    Local,
    Global,
    Dev,
}

/// Flags shared by every install invocation in a run
#[derive(Debug, Clone, Default)]
pub struct InstallFlags {
    pub exact: bool,
    pub force: bool,
    pub offline: bool,
    pub registry: Option<String>,
}

/// The evidence tier that decided a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    Preferred,
    LockFile(&'static str),
    Manifest,
    FirstAvailable,
    Default,
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preferred => write!(f, "explicit preference"),
            Self::LockFile(name) => write!(f, "lock file {name}"),
            Self::Manifest => write!(f, "package.json manifest"),
            Self::FirstAvailable => write!(f, "first available"),
            Self::Default => write!(f, "default fallback"),
        }
    }
}

/// A resolution verdict with the evidence that produced it
#[derive(Debug, Clone)]
pub struct Resolution {
    pub manager: PackageManager,
    pub evidence: Evidence,
}

/// Manager implied by a lock file present in `dir`
pub fn detect_from_lock_file(dir: &Path) -> Option<PackageManager> {
    PROBE_ORDER
        .iter()
        .copied()
        .find(|manager| dir.join(manager.lock_file()).exists())
}

/// Manager declared by the project manifest, via the Corepack
/// `packageManager` field or an `engines` constraint
pub fn detect_from_manifest(dir: &Path) -> Option<PackageManager> {
    let path = dir.join("package.json");
    let content = std::fs::read_to_string(&path).ok()?;
    let json: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Ignoring malformed {}: {e}", path.display());
            return None;
        }
    };

    // Corepack field, e.g. "pnpm@9.1.0+sha256..."
    static FIELD_RE: OnceLock<Regex> = OnceLock::new();
    if let Some(field) = json["packageManager"].as_str() {
        let re = FIELD_RE.get_or_init(|| {
            Regex::new(r"^(npm|yarn|pnpm|bun)@").expect("valid manager regex")
        });
        if let Some(caps) = re.captures(field) {
            return caps[1].parse().ok();
        }
    }

    // Engine constraints pin a manager too
    let engines = &json["engines"];
    for manager in [PackageManager::Pnpm, PackageManager::Yarn, PackageManager::Bun] {
        if !engines[manager.command()].is_null() {
            return Some(manager);
        }
    }

    None
}

/// Decide which manager to use for `dir`.
///
/// `available` is the host-side existence probe; injected so callers (and
/// tests) control how availability is determined.
pub fn resolve(
    dir: &Path,
    preferred: Option<PackageManager>,
    available: impl Fn(PackageManager) -> bool,
) -> Resolution {
    if let Some(manager) = preferred
        && available(manager)
    {
        log::debug!("Using preferred package manager: {manager}");
        return Resolution {
            manager,
            evidence: Evidence::Preferred,
        };
    }

    if let Some(manager) = detect_from_lock_file(dir)
        && available(manager)
    {
        log::debug!("Detected {manager} from lock file");
        return Resolution {
            manager,
            evidence: Evidence::LockFile(manager.lock_file()),
        };
    }

    if let Some(manager) = detect_from_manifest(dir)
        && available(manager)
    {
        log::debug!("Detected {manager} from package.json");
        return Resolution {
            manager,
            evidence: Evidence::Manifest,
        };
    }

    if let Some(manager) = PROBE_ORDER.iter().copied().find(|m| available(*m)) {
        log::debug!("Using first available package manager: {manager}");
        return Resolution {
            manager,
            evidence: Evidence::FirstAvailable,
        };
    }

    log::warn!("No package manager detected, defaulting to {DEFAULT_MANAGER}");
    Resolution {
        manager: DEFAULT_MANAGER,
        evidence: Evidence::Default,
    }
}
