//! The orchestration state machine.
//!
//! Stages run strictly in order: initializing, preflight, installing,
//! verifying, then completed or failed. Packages install one at a time in
//! request order - concurrent installs against a shared manager cache risk
//! corrupting its lock files, and sequential runs keep failures attributable.

use std::thread;
use std::time::Instant;

use anyhow::Result;

use crate::elevate;
use crate::exec::ExecOptions;
use crate::manager::{self, InstallFlags, PackageManager};
use crate::preflight;

use super::error::InstallError;
use super::events::{ProgressUpdate, Reporter};
use super::platform::Platform;
use super::types::{
    InstallConfig, InstallRun, InstallStage, PackageOutcome, PackageResult, PackageSpec,
};

/// Drives one installation run against a [`Platform`]
pub struct Installer<'a> {
    config: InstallConfig,
    platform: &'a dyn Platform,
}

impl<'a> Installer<'a> {
    pub fn new(config: InstallConfig, platform: &'a dyn Platform) -> Self {
        Self { config, platform }
    }

    /// Drive the run to a terminal stage.
    ///
    /// Never propagates an error past this boundary: internal failures are
    /// converted into an `Unexpected` install error on the returned run.
    pub fn run(self, reporter: &mut dyn Reporter) -> InstallRun {
        let mut run = InstallRun::new();

        if let Err(err) = self.run_inner(&mut run, reporter) {
            log::error!("Installation failed with an unexpected error: {err:#}");
            let error = InstallError::unexpected(format!("{err:#}"));
            reporter.on_error(&error);
            run.errors.push(error);
            run.stage = InstallStage::Failed;
        }

        run.duration = run.started_at.elapsed();
        run
    }

    fn run_inner(&self, run: &mut InstallRun, reporter: &mut dyn Reporter) -> Result<()> {
        let total = self.config.packages.len();

        self.enter(run, reporter, InstallStage::Initializing, "Initializing installation...");
        let host = self.platform.host_info();
        log::debug!(
            "Host: {} {} (container: {}, ci: {}, elevated: {})",
            host.os,
            host.arch,
            host.is_container,
            host.is_ci,
            host.has_elevated_privileges
        );

        if self.config.skip_preflight {
            log::debug!("Preflight checks skipped by configuration");
        } else {
            self.enter(run, reporter, InstallStage::Preflight, "Running preflight checks...");
            let report = preflight::run_checks(&self.config, self.platform);

            for warning in &report.warnings {
                run.warnings.push(warning.message.clone());
                reporter.on_warning(&warning.message);
            }

            if !report.passed() {
                for failure in &report.critical_failures {
                    let error = InstallError::preflight(failure.message.clone());
                    log::error!("{}: {}", error.code.as_str(), error.message);
                    reporter.on_error(&error);
                    run.errors.push(error);
                }
                run.stage = InstallStage::Failed;
                return Ok(());
            }
        }

        let resolution = manager::resolve(
            &self.config.working_dir,
            self.config.preferred_manager,
            |m| self.platform.manager_available(m),
        );
        log::info!(
            "Using package manager: {} ({})",
            resolution.manager,
            resolution.evidence
        );
        run.manager = Some(resolution.manager);

        self.enter(run, reporter, InstallStage::Installing, "Installing packages...");
        for (index, spec) in self.config.packages.iter().enumerate() {
            reporter.on_progress(&ProgressUpdate {
                stage: InstallStage::Installing,
                message: format!("Installing {}... ({}/{})", spec.name, index + 1, total),
                completed: index,
                total,
            });

            let result = self.install_package(spec, resolution.manager);

            if result.outcome == PackageOutcome::Failed {
                // A recoverable failure (optional package) degrades to a warning
                if result.error.as_ref().is_some_and(|e| e.recoverable) {
                    let warning = format!("Optional package {} failed to install", spec.name);
                    run.warnings.push(warning.clone());
                    reporter.on_warning(&warning);
                    run.package_results.push(result);
                    continue;
                }

                // Non-optional failure halts the run; later packages are
                // never attempted
                if let Some(error) = &result.error {
                    reporter.on_error(error);
                    run.errors.push(error.clone());
                }
                run.package_results.push(result);
                run.stage = InstallStage::Failed;
                return Ok(());
            }

            run.package_results.push(result);
        }

        self.enter(run, reporter, InstallStage::Verifying, "Verifying installation...");

        run.stage = InstallStage::Completed;
        run.duration = run.started_at.elapsed();
        reporter.on_progress(&ProgressUpdate {
            stage: InstallStage::Completed,
            message: format!(
                "Installation completed in {:.2}s",
                run.duration.as_secs_f64()
            ),
            completed: total,
            total,
        });
        reporter.on_complete(run);

        Ok(())
    }

    fn enter(
        &self,
        run: &mut InstallRun,
        reporter: &mut dyn Reporter,
        stage: InstallStage,
        message: &str,
    ) {
        run.stage = stage;
        log::info!("{message}");
        reporter.on_progress(&ProgressUpdate {
            stage,
            message: message.to_string(),
            completed: run.package_results.len(),
            total: self.config.packages.len(),
        });
    }

    fn install_package(&self, spec: &PackageSpec, manager: PackageManager) -> PackageResult {
        let started = Instant::now();
        log::info!("Installing package: {}", spec.specifier());

        let flags = InstallFlags {
            exact: self.config.exact,
            force: self.config.force,
            offline: self.config.offline,
            registry: self.config.registry.clone(),
        };
        let args = manager.install_args(&[spec.specifier()], spec.kind, &flags);
        let opts = ExecOptions {
            cwd: Some(self.config.working_dir.clone()),
            timeout: self.config.timeout,
            ..Default::default()
        };

        let attempts = self.config.retry_attempts.max(1);
        let mut elevated = self.attempt(manager, &args, &opts);
        let mut attempt = 1;
        while !elevated.outcome.success() && attempt < attempts {
            attempt += 1;
            log::debug!("Retrying {} (attempt {attempt}/{attempts})", spec.name);
            thread::sleep(self.config.retry_delay);
            elevated = self.attempt(manager, &args, &opts);
        }

        if elevated.outcome.success() {
            if elevated.elevation_used {
                log::info!("Installed {} with elevation", spec.name);
            }
            return PackageResult {
                spec: spec.clone(),
                outcome: PackageOutcome::Completed,
                installed_version: spec.version.clone(),
                duration: started.elapsed(),
                error: None,
            };
        }

        log::error!(
            "Failed to install {} (exit code {} after {}ms)",
            spec.name,
            elevated.outcome.exit_code,
            elevated.outcome.duration.as_millis()
        );
        let error = InstallError::package_failure(&spec.name, &elevated.outcome, spec.optional);
        PackageResult {
            spec: spec.clone(),
            outcome: PackageOutcome::Failed,
            installed_version: None,
            duration: started.elapsed(),
            error: Some(error),
        }
    }

    fn attempt(
        &self,
        manager: PackageManager,
        args: &[String],
        opts: &ExecOptions,
    ) -> elevate::Elevated {
        elevate::run_elevated_if_needed(
            || self.platform.run(manager.command(), args, opts),
            || self.platform.elevate(manager.command(), args, opts),
            false,
        )
    }
}
