//! Disk capacity probe.
//!
//! Best-effort: when the platform query fails, the probe falls back to a
//! conservative fixed estimate rather than failing the preflight outright.

use std::path::Path;
use std::time::Duration;

use crate::exec::{self, ExecOptions};

/// Fallback estimate used when no platform query works
const FALLBACK_FREE_BYTES: u64 = 10 * 1024 * 1024 * 1024;
const FALLBACK_TOTAL_BYTES: u64 = 100 * 1024 * 1024 * 1024;

/// Space reserved for the manager's cache and temp files
const BASE_RESERVE_BYTES: u64 = 500 * 1024 * 1024;

/// Conservative per-package estimate
const PER_PACKAGE_RESERVE_BYTES: u64 = 50 * 1024 * 1024;

/// Free/total capacity of the volume holding a path
#[derive(Debug, Clone, Copy)]
pub struct DiskStatus {
    pub free_bytes: u64,
    pub total_bytes: u64,
}

/// Estimated bytes an installation of `package_count` packages needs
pub fn estimate_required_space(package_count: usize) -> u64 {
    BASE_RESERVE_BYTES + PER_PACKAGE_RESERVE_BYTES * package_count as u64
}

/// Query disk capacity for `path`, falling back to a conservative estimate
pub fn disk_status(path: &Path) -> DiskStatus {
    query_disk_status(path).unwrap_or_else(|| {
        log::warn!(
            "Could not query disk space for {}, using a conservative estimate",
            path.display()
        );
        DiskStatus {
            free_bytes: FALLBACK_FREE_BYTES,
            total_bytes: FALLBACK_TOTAL_BYTES,
        }
    })
}

#[cfg(unix)]
fn query_disk_status(path: &Path) -> Option<DiskStatus> {
    let opts = ExecOptions {
        timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let args = vec!["-k".to_string(), path.display().to_string()];
    let outcome = exec::execute("df", &args, &opts);
    if !outcome.success() {
        return None;
    }
    parse_df_output(&outcome.stdout)
}

#[cfg(windows)]
fn query_disk_status(path: &Path) -> Option<DiskStatus> {
    use std::path::Component;

    let drive = match path.components().next()? {
        Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy().to_string(),
        _ => return None,
    };

    let opts = ExecOptions {
        timeout: Duration::from_secs(10),
        ..Default::default()
    };
    let args = vec![
        "logicaldisk".to_string(),
        "where".to_string(),
        format!("DeviceID='{drive}'"),
        "get".to_string(),
        "FreeSpace,Size".to_string(),
        "/value".to_string(),
    ];
    let outcome = exec::execute("wmic", &args, &opts);
    if !outcome.success() {
        return None;
    }
    parse_wmic_output(&outcome.stdout)
}

/// `df -k` output: Filesystem 1K-blocks Used Available Use% Mounted
#[allow(dead_code)]
fn parse_df_output(output: &str) -> Option<DiskStatus> {
    let line = output.lines().nth(1)?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    let total_kb: u64 = fields.get(1)?.parse().ok()?;
    let free_kb: u64 = fields.get(3)?.parse().ok()?;
    Some(DiskStatus {
        free_bytes: free_kb * 1024,
        total_bytes: total_kb * 1024,
    })
}

/// `wmic ... /value` output: `FreeSpace=` and `Size=` lines in bytes
#[allow(dead_code)]
fn parse_wmic_output(output: &str) -> Option<DiskStatus> {
    let mut free = None;
    let mut total = None;
    for line in output.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("FreeSpace=") {
            free = value.trim().parse().ok();
        }
        if let Some(value) = line.strip_prefix("Size=") {
            total = value.trim().parse().ok();
        }
    }
    Some(DiskStatus {
        free_bytes: free?,
        total_bytes: total?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_space_scales_with_package_count() {
        let base = estimate_required_space(0);
        assert_eq!(base, 500 * 1024 * 1024);
        assert_eq!(
            estimate_required_space(4),
            base + 4 * 50 * 1024 * 1024
        );
    }

    #[test]
    fn parses_df_output() {
        let output = "\
Filesystem     1K-blocks      Used Available Use% Mounted on
/dev/sda1      488245288 123456789 340000000  27% /
";
        let status = parse_df_output(output).unwrap();
        assert_eq!(status.total_bytes, 488_245_288 * 1024);
        assert_eq!(status.free_bytes, 340_000_000 * 1024);
    }

    #[test]
    fn rejects_truncated_df_output() {
        assert!(parse_df_output("Filesystem 1K-blocks\n").is_none());
        assert!(parse_df_output("").is_none());
    }

    #[test]
    fn parses_wmic_output() {
        let output = "\r\nFreeSpace=107374182400\r\nSize=536870912000\r\n\r\n";
        let status = parse_wmic_output(output).unwrap();
        assert_eq!(status.free_bytes, 107_374_182_400);
        assert_eq!(status.total_bytes, 536_870_912_000);
    }

    #[test]
    fn wmic_output_missing_fields_is_rejected() {
        assert!(parse_wmic_output("FreeSpace=123\n").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn probe_reports_nonzero_capacity_or_fallback() {
        let status = disk_status(Path::new("/"));
        assert!(status.total_bytes > 0);
    }
}
