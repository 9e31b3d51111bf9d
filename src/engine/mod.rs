//! Installation orchestration engine.
//!
//! The engine drives one run through its stages - initializing, preflight,
//! installing, verifying, then completed or failed - installing packages
//! strictly in request order and reporting events through a [`Reporter`].
//! All host interaction goes through the [`Platform`] seam so runs are
//! testable without touching the machine.

pub mod error;
pub mod events;
pub mod installer;
pub mod platform;
pub mod types;

pub use error::{ErrorCode, InstallError};
pub use events::{NoReporter, ProgressUpdate, Reporter};
pub use installer::Installer;
pub use platform::{HostPlatform, Platform};
pub use types::{
    InstallConfig, InstallKind, InstallRun, InstallStage, PackageOutcome, PackageResult,
    PackageSpec,
};
