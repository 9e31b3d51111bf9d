//! Interactive installation wizard.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};

use crate::Context;
use crate::cli::InstallArgs;
use crate::commands::install;
use crate::manager::{self, PackageManager};
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    ui::banner();
    ui::header("Interactive Installation");

    let packages: String = Input::new()
        .with_prompt("Packages (space-separated, name or name@version)")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Enter at least one package name")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let kinds = ["Local", "Global", "Dev dependency"];
    let kind_index = Select::new()
        .with_prompt("Installation type")
        .items(&kinds)
        .default(0)
        .interact()?;

    let mut manager_items = vec!["Auto-detect".to_string()];
    manager_items.extend(
        manager::PROBE_ORDER
            .iter()
            .filter(|m| m.is_available())
            .map(ToString::to_string),
    );
    let manager_index = Select::new()
        .with_prompt("Package manager")
        .items(&manager_items)
        .default(0)
        .interact()?;
    let preferred: Option<PackageManager> = if manager_index == 0 {
        None
    } else {
        manager_items[manager_index].parse().ok()
    };

    let force = Confirm::new()
        .with_prompt("Force installation?")
        .default(false)
        .interact()?;

    println!();
    let args = InstallArgs {
        packages: packages.split_whitespace().map(str::to_string).collect(),
        global: kind_index == 1,
        dev: kind_index == 2,
        manager: preferred,
        optional: Vec::new(),
        force,
        exact: false,
        offline: false,
        registry: None,
        no_preflight: false,
        cwd: None,
        timeout: None,
        retries: None,
    };
    install::run(ctx, args)
}
