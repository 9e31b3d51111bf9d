//! Cache maintenance command.

use anyhow::Result;

use crate::Context;
use crate::cli::CacheCleanArgs;
use crate::commands::install::resolve_working_dir;
use crate::exec::{self, ExecOptions};
use crate::manager;
use crate::progress;
use crate::ui;

pub fn run(_ctx: &Context, args: CacheCleanArgs) -> Result<()> {
    let dir = resolve_working_dir(args.cwd.as_deref())?;
    let resolution = manager::resolve(&dir, args.manager, |m| m.is_available());

    let pb = progress::spinner(&format!("Clearing {} cache...", resolution.manager));
    let clean_args = resolution.manager.cache_clean_args();
    let outcome = exec::execute(
        resolution.manager.command(),
        &clean_args,
        &ExecOptions::default(),
    );
    pb.finish_and_clear();

    if outcome.success() {
        ui::success(&format!("Cleared {} cache", resolution.manager));
        Ok(())
    } else {
        let reason = outcome
            .stderr
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("unknown error");
        ui::error(&format!(
            "Could not clear {} cache: {}",
            resolution.manager,
            reason.trim()
        ));
        std::process::exit(1);
    }
}
