//! Network reachability probe.
//!
//! General connectivity and registry reachability are probed separately so
//! the preflight can classify them differently (no network is critical, an
//! unreachable registry only warns).

use std::time::Duration;

/// Registry assumed when the run does not override it
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Endpoints used to confirm general connectivity; any one answering counts
const CONNECTIVITY_PROBES: &[&str] = &[
    "https://www.google.com",
    "https://www.cloudflare.com",
    "https://1.1.1.1",
];

/// Reachability snapshot for one run
#[derive(Debug, Clone, Copy)]
pub struct NetworkStatus {
    pub is_online: bool,
    pub registry_reachable: bool,
}

fn probe_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Check general internet connectivity
pub fn is_online() -> bool {
    let agent = probe_agent(Duration::from_secs(5));
    for url in CONNECTIVITY_PROBES {
        if agent.head(*url).call().is_ok() {
            log::debug!("Connectivity confirmed via {url}");
            return true;
        }
    }
    log::warn!("No internet connectivity detected");
    false
}

/// Check whether the package registry answers
pub fn registry_reachable(registry: &str) -> bool {
    let agent = probe_agent(Duration::from_secs(10));
    match agent.get(registry).call() {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Cannot reach registry {registry}: {e}");
            false
        }
    }
}

/// Combined snapshot; the registry probe is skipped when offline
pub fn network_status(registry: &str) -> NetworkStatus {
    let online = is_online();
    NetworkStatus {
        is_online: online,
        registry_reachable: online && registry_reachable(registry),
    }
}
