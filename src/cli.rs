use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::manager::PackageManager;

#[derive(Parser)]
#[command(name = "maestro")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Package installation orchestrator for npm, yarn, pnpm, and bun", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install one or more packages
    Install(InstallArgs),

    /// Uninstall one or more packages
    Uninstall(UninstallArgs),

    /// Check the environment without installing anything
    Check(CheckArgs),

    /// Show which package manager a directory resolves to
    Detect(DetectArgs),

    /// Interactive installation wizard
    #[command(alias = "i")]
    Interactive,

    /// Clear the package manager cache
    CacheClean(CacheCleanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Install
// ============================================================================

#[derive(Args)]
pub struct InstallArgs {
    /// Packages to install (name or name@version)
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Install packages globally
    #[arg(short, long)]
    pub global: bool,

    /// Install as dev dependencies
    #[arg(short = 'D', long)]
    pub dev: bool,

    /// Preferred package manager (auto-detected when omitted)
    #[arg(short = 'p', long = "package-manager", value_enum)]
    pub manager: Option<PackageManager>,

    /// Packages whose failure should only warn instead of aborting
    #[arg(long, value_name = "NAME")]
    pub optional: Vec<String>,

    /// Force installation
    #[arg(short, long)]
    pub force: bool,

    /// Pin exact versions instead of ranges
    #[arg(long)]
    pub exact: bool,

    /// Run in offline mode (skips network checks)
    #[arg(long)]
    pub offline: bool,

    /// Custom registry URL
    #[arg(short, long)]
    pub registry: Option<String>,

    /// Skip preflight checks
    #[arg(long)]
    pub no_preflight: bool,

    /// Working directory for the installation
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cwd: Option<String>,

    /// Per-command timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Install attempts per package
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,
}

// ============================================================================
// Uninstall
// ============================================================================

#[derive(Args)]
pub struct UninstallArgs {
    /// Packages to remove
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Remove global packages
    #[arg(short, long)]
    pub global: bool,

    /// Preferred package manager (auto-detected when omitted)
    #[arg(short = 'p', long = "package-manager", value_enum)]
    pub manager: Option<PackageManager>,

    /// Working directory
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cwd: Option<String>,
}

// ============================================================================
// Check / Detect / CacheClean
// ============================================================================

#[derive(Args)]
pub struct CheckArgs {
    /// Directory the checks should apply to
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cwd: Option<String>,

    /// Skip network checks
    #[arg(long)]
    pub offline: bool,

    /// Registry to probe for reachability
    #[arg(short, long)]
    pub registry: Option<String>,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Directory to resolve a manager for
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cwd: Option<String>,

    /// Preferred package manager to test against availability
    #[arg(short = 'p', long = "package-manager", value_enum)]
    pub manager: Option<PackageManager>,
}

#[derive(Args)]
pub struct CacheCleanArgs {
    /// Package manager whose cache to clear (auto-detected when omitted)
    #[arg(short = 'p', long = "package-manager", value_enum)]
    pub manager: Option<PackageManager>,

    /// Working directory used for auto-detection
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cwd: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
