//! Detect command - print the manager resolution verdict for a directory.

use anyhow::Result;

use crate::Context;
use crate::cli::DetectArgs;
use crate::commands::install::resolve_working_dir;
use crate::manager;
use crate::ui;

pub fn run(_ctx: &Context, args: DetectArgs) -> Result<()> {
    let dir = resolve_working_dir(args.cwd.as_deref())?;
    let resolution = manager::resolve(&dir, args.manager, |m| m.is_available());

    ui::kv("Directory", &dir.display().to_string());
    ui::kv("Manager", &resolution.manager.to_string());
    ui::kv("Evidence", &resolution.evidence.to_string());
    if let Some(version) = resolution.manager.version() {
        ui::kv("Version", &version);
    }

    Ok(())
}
