//! Uninstall command - removes packages through the resolved manager.
//!
//! No preflight here: removal needs neither network nor reserved disk space.

use anyhow::Result;

use crate::Context;
use crate::cli::UninstallArgs;
use crate::commands::install::resolve_working_dir;
use crate::exec::{self, ExecOptions};
use crate::manager;
use crate::ui;

pub fn run(_ctx: &Context, args: UninstallArgs) -> Result<()> {
    let dir = resolve_working_dir(args.cwd.as_deref())?;
    let resolution = manager::resolve(&dir, args.manager, |m| m.is_available());
    ui::info(&format!("Using package manager: {}", resolution.manager));

    let mut failed = 0usize;
    for package in &args.packages {
        let uninstall_args = resolution
            .manager
            .uninstall_args(std::slice::from_ref(package), args.global);
        let opts = ExecOptions {
            cwd: Some(dir.clone()),
            ..Default::default()
        };
        let outcome = exec::execute(resolution.manager.command(), &uninstall_args, &opts);

        if outcome.success() {
            ui::success(&format!("Removed {package}"));
        } else {
            failed += 1;
            let reason = outcome
                .stderr
                .lines()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("unknown error");
            ui::error(&format!("Failed to remove {package}: {}", reason.trim()));
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
