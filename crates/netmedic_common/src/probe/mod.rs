//! Diagnostic probes
//!
//! A probe is a read-only check that always produces a [`DiagnosticResult`].
//! Collaborator failures are folded into the result status; nothing is raised.
//!
//! Default registration order: adapter, ip, dns, hosts, proxy, connectivity.

pub mod adapter;
pub mod connectivity;
pub mod dns;
pub mod hosts;
pub mod ip;
pub mod proxy;

pub use adapter::AdapterProbe;
pub use connectivity::{classify_connectivity, ConnectivityProbe, ConnectivityTarget};
pub use dns::DnsProbe;
pub use hosts::HostsProbe;
pub use ip::IpProbe;
pub use proxy::ProxyProbe;

use crate::context::SystemContext;
use crate::types::DiagnosticResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Stable identifier (e.g. "dns")
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    async fn check(&self, cancel: &CancellationToken) -> DiagnosticResult;
}

/// The built-in probe set, in registration order
pub fn standard_probes(ctx: &SystemContext) -> Vec<Arc<dyn Probe>> {
    vec![
        Arc::new(AdapterProbe::new(ctx.clone())),
        Arc::new(IpProbe::new(ctx.clone())),
        Arc::new(DnsProbe::new(ctx.clone())),
        Arc::new(HostsProbe::new(ctx.clone())),
        Arc::new(ProxyProbe::new(ctx.clone())),
        Arc::new(ConnectivityProbe::new(ctx.clone())),
    ]
}

/// Integer mean in milliseconds; 0 for an empty sample
pub(crate) fn mean_latency_ms(latencies: &[u64]) -> u64 {
    if latencies.is_empty() {
        0
    } else {
        latencies.iter().sum::<u64>() / latencies.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_exec::FakeCommandRunner;
    use crate::context::testing::context_with_runner;

    #[test]
    fn test_standard_probe_order() {
        let ctx = context_with_runner(Arc::new(FakeCommandRunner::new()));
        let ids: Vec<String> = standard_probes(&ctx)
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(ids, ["adapter", "ip", "dns", "hosts", "proxy", "connectivity"]);
    }

    #[test]
    fn test_mean_latency() {
        assert_eq!(mean_latency_ms(&[]), 0);
        assert_eq!(mean_latency_ms(&[10, 21]), 15);
    }
}
