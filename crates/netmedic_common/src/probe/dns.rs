//! DNS resolution probe

use super::{mean_latency_ms, Probe};
use crate::context::SystemContext;
use crate::types::DiagnosticResult;
use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Domains resolved by the probe, in order
pub const DNS_TEST_DOMAINS: &[&str] = &["www.baidu.com", "www.qq.com"];

pub struct DnsProbe {
    ctx: SystemContext,
}

impl DnsProbe {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Probe for DnsProbe {
    fn id(&self) -> &str {
        "dns"
    }

    fn name(&self) -> &str {
        "DNS resolution"
    }

    async fn check(&self, _cancel: &CancellationToken) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(self.id(), self.name());

        let mut latencies = Vec::new();
        for domain in DNS_TEST_DOMAINS {
            let start = Instant::now();
            match self.ctx.reachability.resolve(domain).await {
                Ok(addrs) => {
                    latencies.push(start.elapsed().as_millis() as u64);
                    debug!("{} -> {:?}", domain, addrs);
                }
                Err(e) => debug!("Resolving {} failed: {}", domain, e),
            }
        }

        let success = latencies.len();
        result.add_detail("testedDomains", DNS_TEST_DOMAINS);
        result.add_detail("successCount", success);

        if success == 0 {
            result.set_error("DNS resolution failed for every test domain", true);
        } else {
            let avg = mean_latency_ms(&latencies);
            result.add_detail("avgLatencyMs", avg);
            if success < DNS_TEST_DOMAINS.len() {
                result.set_warning(
                    format!("DNS partially working, average latency {}ms", avg),
                    true,
                );
            } else {
                result.set_ok(format!("DNS working, average latency {}ms", avg));
            }
        }
        info!("dns: {}/{} resolved", success, DNS_TEST_DOMAINS.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_exec::FakeCommandRunner;
    use crate::context::testing::context_with_runner;
    use crate::reachability::FakeReachability;
    use crate::types::DiagnosticStatus;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(110, 242, 68, 66));

    async fn run(reach: FakeReachability) -> DiagnosticResult {
        let mut ctx = context_with_runner(Arc::new(FakeCommandRunner::new()));
        ctx.reachability = Arc::new(reach);
        DnsProbe::new(ctx).check(&CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_all_resolved() {
        let result = run(FakeReachability::new()
            .with_dns("www.baidu.com", IP)
            .with_dns("www.qq.com", IP))
        .await;
        assert_eq!(result.status, DiagnosticStatus::Ok);
        assert_eq!(result.detail("successCount"), Some(&serde_json::json!(2)));
        assert!(result.detail("avgLatencyMs").is_some());
    }

    #[tokio::test]
    async fn test_partial_is_repairable_warning() {
        let result = run(FakeReachability::new().with_dns("www.qq.com", IP)).await;
        assert_eq!(result.status, DiagnosticStatus::Warning);
        assert!(result.repairable);
    }

    #[tokio::test]
    async fn test_none_is_repairable_error() {
        let result = run(FakeReachability::new()).await;
        assert_eq!(result.status, DiagnosticStatus::Error);
        assert!(result.repairable);
        assert!(result.detail("avgLatencyMs").is_none());
        assert_eq!(
            result.detail("testedDomains"),
            Some(&serde_json::json!(["www.baidu.com", "www.qq.com"]))
        );
    }
}
