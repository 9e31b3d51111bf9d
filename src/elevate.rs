//! Automatic privilege escalation for failed install commands.
//!
//! Commands always run unprivileged first. Elevation is interactive (it may
//! block on a password or UAC prompt), so it is attempted only when the
//! failure output carries a permission signature, never speculatively.

use std::process::Command;

use crate::exec::{self, CommandOutcome, ExecOptions};
use crate::system::{HostInfo, OsKind};

/// Output fragments identifying a permission failure, matched case-insensitively
const PERMISSION_SIGNATURES: &[&str] = &[
    "eacces",
    "eperm",
    "permission denied",
    "access denied",
    "operation not permitted",
    "requires administrator",
    "requires root",
];

/// Check whether a failed outcome looks permission-related
pub fn looks_like_permission_failure(outcome: &CommandOutcome) -> bool {
    let stdout = outcome.stdout.to_lowercase();
    let stderr = outcome.stderr.to_lowercase();
    PERMISSION_SIGNATURES
        .iter()
        .any(|sig| stdout.contains(sig) || stderr.contains(sig))
}

/// Platform-specific elevation path, selected once at startup from host facts
pub trait Elevator: Send + Sync {
    /// Re-run a command through the platform's elevation mechanism
    fn elevate(&self, program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome;

    /// Human-readable name of the mechanism
    fn method(&self) -> &'static str;
}

/// sudo-based elevation for Unix-like systems
pub struct SudoElevator;

impl SudoElevator {
    /// Validate sudo up front so the password prompt happens on the tty,
    /// not buried inside captured output.
    fn validate(&self) -> bool {
        Command::new("sudo")
            .args(["-v"])
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Elevator for SudoElevator {
    fn elevate(&self, program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome {
        if !self.validate() {
            return CommandOutcome::failure(1, "failed to acquire sudo privileges");
        }

        let mut sudo_args = Vec::with_capacity(args.len() + 1);
        sudo_args.push(program.to_string());
        sudo_args.extend_from_slice(args);
        exec::execute("sudo", &sudo_args, opts)
    }

    fn method(&self) -> &'static str {
        "sudo"
    }
}

/// UAC elevation via PowerShell for Windows.
///
/// `Start-Process -Verb RunAs` raises the UAC prompt; output stays in the
/// elevated console, only the exit status is observable from here.
pub struct UacElevator;

impl Elevator for UacElevator {
    fn elevate(&self, program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome {
        let ps_command = if args.is_empty() {
            format!("Start-Process -FilePath '{program}' -Verb RunAs -Wait")
        } else {
            let arg_list = args
                .iter()
                .map(|a| format!("'{}'", a.replace('\'', "''")))
                .collect::<Vec<_>>()
                .join(",");
            format!("Start-Process -FilePath '{program}' -ArgumentList {arg_list} -Verb RunAs -Wait")
        };

        let ps_args = vec![
            "-NoProfile".to_string(),
            "-Command".to_string(),
            ps_command,
        ];
        exec::execute("powershell.exe", &ps_args, opts)
    }

    fn method(&self) -> &'static str {
        "UAC"
    }
}

/// Pick the elevation mechanism for the detected host
pub fn elevator_for(host: &HostInfo) -> Box<dyn Elevator> {
    match host.os {
        OsKind::Windows => Box::new(UacElevator),
        _ => Box::new(SudoElevator),
    }
}

/// Outcome of an escalating execution
#[derive(Debug)]
pub struct Elevated {
    pub outcome: CommandOutcome,
    pub elevation_used: bool,
}

/// Run unprivileged first and escalate only on a detected permission failure
/// (or when the caller forces elevation).
///
/// When both attempts fail the elevated outcome is returned - it is the more
/// informative final state.
pub fn run_elevated_if_needed<R, E>(run: R, elevate: E, force: bool) -> Elevated
where
    R: FnOnce() -> CommandOutcome,
    E: FnOnce() -> CommandOutcome,
{
    let first = run();
    if first.success() {
        return Elevated {
            outcome: first,
            elevation_used: false,
        };
    }

    if !force && !looks_like_permission_failure(&first) {
        return Elevated {
            outcome: first,
            elevation_used: false,
        };
    }

    log::info!("Command failed with a permission error, retrying with elevation");
    Elevated {
        outcome: elevate(),
        elevation_used: true,
    }
}
