//! Host-side collaborators the engine delegates to.
//!
//! The trait mirrors the narrow contracts the engine consumes: host facts,
//! disk and network probes, manager availability, and command execution with
//! and without elevation. Production wires the real host; tests swap in
//! scripted fakes.

use std::path::Path;

use crate::elevate::{self, Elevator};
use crate::exec::{self, CommandOutcome, ExecOptions};
use crate::manager::PackageManager;
use crate::probe::disk::{self, DiskStatus};
use crate::probe::network::{self, NetworkStatus};
use crate::system::HostInfo;

pub trait Platform {
    /// Synchronous snapshot of host facts
    fn host_info(&self) -> HostInfo;

    /// Best-effort capacity of the volume holding `path`
    fn disk_status(&self, path: &Path) -> DiskStatus;

    /// Best-effort connectivity and registry reachability
    fn network_status(&self, registry: &str) -> NetworkStatus;

    /// Host executable lookup for a manager
    fn manager_available(&self, manager: PackageManager) -> bool;

    /// Run a command unprivileged
    fn run(&self, program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome;

    /// Run a command through the platform's elevation path
    fn elevate(&self, program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome;
}

/// Production implementation backed by the real host. The elevation
/// mechanism is selected once at construction from the host probe.
pub struct HostPlatform {
    elevator: Box<dyn Elevator>,
}

impl HostPlatform {
    pub fn new() -> Self {
        let host = HostInfo::detect();
        let elevator = elevate::elevator_for(&host);
        log::debug!("Elevation mechanism: {}", elevator.method());
        Self { elevator }
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HostPlatform {
    fn host_info(&self) -> HostInfo {
        HostInfo::detect()
    }

    fn disk_status(&self, path: &Path) -> DiskStatus {
        disk::disk_status(path)
    }

    fn network_status(&self, registry: &str) -> NetworkStatus {
        network::network_status(registry)
    }

    fn manager_available(&self, manager: PackageManager) -> bool {
        manager.is_available()
    }

    fn run(&self, program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome {
        exec::execute(program, args, opts)
    }

    fn elevate(&self, program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome {
        self.elevator.elevate(program, args, opts)
    }
}
