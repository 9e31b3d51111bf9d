//! Environment check command - host facts, available managers, and the same
//! preflight checks an install run would perform.

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::cli::CheckArgs;
use crate::commands::install::resolve_working_dir;
use crate::engine::{HostPlatform, InstallConfig};
use crate::manager;
use crate::preflight;
use crate::system::HostInfo;
use crate::ui;

pub fn run(ctx: &Context, args: CheckArgs) -> Result<()> {
    ui::header("Environment Check");

    let host = HostInfo::detect();
    ui::section("Host");
    ui::kv("OS", &host.os.to_string());
    ui::kv("Architecture", &host.arch.to_string());
    ui::kv("Container", yes_no(host.is_container));
    ui::kv("CI", yes_no(host.is_ci));
    ui::kv("Elevated privileges", yes_no(host.has_elevated_privileges));

    ui::section("Package Managers");
    let mut any_available = false;
    for manager in manager::PROBE_ORDER {
        if manager.is_available() {
            any_available = true;
            let version = manager
                .version()
                .unwrap_or_else(|| "unknown version".to_string());
            println!("  {} {} - {}", "✓".green(), manager, version.dimmed());
        } else {
            println!(
                "  {} {} {}",
                "○".dimmed(),
                manager,
                "(not installed)".dimmed()
            );
        }
    }
    if !any_available {
        ui::warn("No package manager found on PATH");
    }

    ui::section("Preflight");
    let config = InstallConfig {
        working_dir: resolve_working_dir(args.cwd.as_deref())?,
        offline: args.offline,
        registry: args.registry.clone(),
        ..Default::default()
    };
    let platform = HostPlatform::new();
    let report = preflight::run_checks(&config, &platform);

    for check in &report.checks {
        if check.passed {
            println!("  {} {}", "✓".green(), check.message);
        } else if check.critical {
            println!("  {} {}", "✗".red(), check.message);
        } else {
            println!("  {} {}", "⚠".yellow(), check.message);
        }
        if ctx.verbose > 0
            && let Some(details) = &check.details
        {
            println!("      {}", format!("{}: {details}", check.name).dimmed());
        }
    }

    println!();
    if report.passed() && any_available {
        ui::success("Environment is ready");
        Ok(())
    } else {
        ui::error("Environment has critical issues");
        std::process::exit(1);
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
