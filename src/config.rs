//! User configuration.
//!
//! An optional `~/.config/maestro/config.toml` provides defaults that CLI
//! flags override. A missing file is not an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::manager::PackageManager;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("maestro"))
}

/// Defaults applied when the CLI does not specify a value
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaestroConfig {
    /// Preferred package manager
    pub manager: Option<PackageManager>,

    /// Registry override for installs and reachability checks
    pub registry: Option<String>,

    /// Per-command timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Install attempts per package
    pub retry_attempts: Option<u32>,

    /// Delay between retries in milliseconds
    pub retry_delay_ms: Option<u64>,
}

impl MaestroConfig {
    /// Load config.toml, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join("config.toml");
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MaestroConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.manager.is_none());
        assert!(config.registry.is_none());
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn parses_a_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
manager = "pnpm"
registry = "https://registry.example.com"
timeout_secs = 120
retry_attempts = 3
retry_delay_ms = 500
"#,
        )
        .unwrap();

        let config = MaestroConfig::load_from(&path).unwrap();
        assert_eq!(config.manager, Some(PackageManager::Pnpm));
        assert_eq!(
            config.registry.as_deref(),
            Some("https://registry.example.com")
        );
        assert_eq!(config.timeout_secs, Some(120));
        assert_eq!(config.retry_attempts, Some(3));
        assert_eq!(config.retry_delay_ms, Some(500));
    }

    #[test]
    fn partial_config_leaves_the_rest_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "manager = \"yarn\"\n").unwrap();

        let config = MaestroConfig::load_from(&path).unwrap();
        assert_eq!(config.manager, Some(PackageManager::Yarn));
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "manager = [not toml").unwrap();
        assert!(MaestroConfig::load_from(&path).is_err());
    }
}
