//! Install command - wires CLI arguments into the orchestration engine and
//! renders its event stream.

use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::time::Duration;

use crate::Context;
use crate::cli::InstallArgs;
use crate::config::MaestroConfig;
use crate::engine::{
    HostPlatform, InstallConfig, InstallError, InstallKind, InstallRun, InstallStage, Installer,
    PackageOutcome, PackageSpec, ProgressUpdate, Reporter,
};
use crate::progress;
use crate::ui;

/// Renders engine events to the terminal
struct CliReporter {
    spinner: Option<ProgressBar>,
    quiet: bool,
}

impl CliReporter {
    fn new(quiet: bool) -> Self {
        Self {
            spinner: None,
            quiet,
        }
    }

    fn update_spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        match &self.spinner {
            Some(pb) => pb.set_message(message.to_string()),
            None => self.spinner = Some(progress::spinner(message)),
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Reporter for CliReporter {
    fn on_progress(&mut self, update: &ProgressUpdate) {
        let message = if update.stage == InstallStage::Installing && update.total > 0 {
            format!("[{:.0}%] {}", update.percent(), update.message)
        } else {
            update.message.clone()
        };
        self.update_spinner(&message);
    }

    fn on_error(&mut self, error: &InstallError) {
        self.clear_spinner();
        ui::error(&error.message);
        if !error.suggestions.is_empty() {
            println!();
            println!("{}", "Suggestions:".yellow());
            for suggestion in &error.suggestions {
                println!("  • {suggestion}");
            }
        }
    }

    fn on_warning(&mut self, warning: &str) {
        match &self.spinner {
            Some(pb) => pb.suspend(|| ui::warn(warning)),
            None => ui::warn(warning),
        }
    }

    fn on_complete(&mut self, run: &InstallRun) {
        self.clear_spinner();
        ui::success(&format!(
            "Installation completed in {:.2}s",
            run.duration.as_secs_f64()
        ));
        ui::dim(&format!(
            "{} of {} package(s) installed",
            run.completed_count(),
            run.package_results.len()
        ));
        if let Some(manager) = run.manager {
            ui::dim(&format!("Manager: {manager}"));
        }
        for result in &run.package_results {
            if result.outcome == PackageOutcome::Completed {
                let label = match &result.installed_version {
                    Some(version) => format!("{}@{}", result.spec.name, version),
                    None => result.spec.name.clone(),
                };
                ui::dim(&format!("{label} ({:.1}s)", result.duration.as_secs_f64()));
            }
        }
    }
}

pub fn run(ctx: &Context, args: InstallArgs) -> Result<()> {
    let defaults = MaestroConfig::load()?;
    let config = build_config(&args, &defaults)?;

    let platform = HostPlatform::new();
    let mut reporter = CliReporter::new(ctx.quiet);
    let run = Installer::new(config, &platform).run(&mut reporter);
    reporter.clear_spinner();

    if run.failed() {
        let failed: Vec<&str> = run
            .errors
            .iter()
            .filter_map(|e| e.package.as_deref())
            .collect();
        if !failed.is_empty() {
            ui::dim(&format!("Failed: {}", failed.join(", ")));
        }
        std::process::exit(1);
    }
    Ok(())
}

fn build_config(args: &InstallArgs, defaults: &MaestroConfig) -> Result<InstallConfig> {
    let kind = if args.global {
        InstallKind::Global
    } else if args.dev {
        InstallKind::Dev
    } else {
        InstallKind::Local
    };

    let packages = args
        .packages
        .iter()
        .map(|input| {
            let spec = PackageSpec::parse(input, kind);
            if args.optional.contains(&spec.name) {
                spec.optional()
            } else {
                spec
            }
        })
        .collect();

    let working_dir = resolve_working_dir(args.cwd.as_deref())?;

    Ok(InstallConfig {
        packages,
        preferred_manager: args.manager.or(defaults.manager),
        working_dir,
        timeout: Duration::from_secs(args.timeout.or(defaults.timeout_secs).unwrap_or(300)),
        retry_attempts: args.retries.or(defaults.retry_attempts).unwrap_or(1),
        retry_delay: Duration::from_millis(defaults.retry_delay_ms.unwrap_or(1000)),
        force: args.force,
        exact: args.exact,
        offline: args.offline,
        registry: args.registry.clone().or_else(|| defaults.registry.clone()),
        skip_preflight: args.no_preflight,
    })
}

/// Expand and resolve a user-supplied working directory, defaulting to the
/// process working directory
pub fn resolve_working_dir(cwd: Option<&str>) -> Result<PathBuf> {
    match cwd {
        Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).as_ref())),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(packages: &[&str]) -> InstallArgs {
        InstallArgs {
            packages: packages.iter().map(|p| (*p).to_string()).collect(),
            global: false,
            dev: false,
            manager: None,
            optional: Vec::new(),
            force: false,
            exact: false,
            offline: false,
            registry: None,
            no_preflight: false,
            cwd: None,
            timeout: None,
            retries: None,
        }
    }

    #[test]
    fn packages_are_parsed_with_versions() {
        let config = build_config(&args(&["typescript@5.4.0", "eslint"]), &MaestroConfig::default())
            .unwrap();
        assert_eq!(config.packages.len(), 2);
        assert_eq!(config.packages[0].name, "typescript");
        assert_eq!(config.packages[0].version.as_deref(), Some("5.4.0"));
        assert_eq!(config.packages[1].version, None);
    }

    #[test]
    fn global_flag_sets_the_install_kind() {
        let mut a = args(&["eslint"]);
        a.global = true;
        let config = build_config(&a, &MaestroConfig::default()).unwrap();
        assert_eq!(config.packages[0].kind, InstallKind::Global);
    }

    #[test]
    fn optional_flag_marks_matching_packages() {
        let mut a = args(&["fsevents@2.3.0", "react"]);
        a.optional = vec!["fsevents".to_string()];
        let config = build_config(&a, &MaestroConfig::default()).unwrap();
        assert!(config.packages[0].optional);
        assert!(!config.packages[1].optional);
    }

    #[test]
    fn config_file_defaults_fill_unset_flags() {
        let defaults = MaestroConfig {
            manager: Some(crate::manager::PackageManager::Pnpm),
            registry: Some("https://registry.example.com".to_string()),
            timeout_secs: Some(60),
            retry_attempts: Some(2),
            retry_delay_ms: Some(250),
        };
        let config = build_config(&args(&["react"]), &defaults).unwrap();
        assert_eq!(
            config.preferred_manager,
            Some(crate::manager::PackageManager::Pnpm)
        );
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(
            config.registry.as_deref(),
            Some("https://registry.example.com")
        );
    }

    #[test]
    fn cli_flags_override_config_defaults() {
        let defaults = MaestroConfig {
            timeout_secs: Some(60),
            ..Default::default()
        };
        let mut a = args(&["react"]);
        a.timeout = Some(120);
        let config = build_config(&a, &defaults).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(120));
    }
}
