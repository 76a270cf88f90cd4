//! Internet connectivity probe.
//!
//! Five targets, attempted once each in order: three HTTP endpoints and two
//! public DNS servers over TCP. The verdict depends only on how many succeeded.

use super::{mean_latency_ms, Probe};
use crate::context::SystemContext;
use crate::types::{ConnectivityResult, DiagnosticResult, DiagnosticStatus};
use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Successes needed for a clean verdict
const HEALTHY_SUCCESSES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityTarget {
    Http { label: &'static str, url: &'static str },
    Tcp { label: &'static str, addr: &'static str },
}

impl ConnectivityTarget {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectivityTarget::Http { label, .. } | ConnectivityTarget::Tcp { label, .. } => label,
        }
    }
}

pub const DEFAULT_TARGETS: &[ConnectivityTarget] = &[
    ConnectivityTarget::Http { label: "HTTP baidu", url: "https://www.baidu.com" },
    ConnectivityTarget::Http { label: "HTTP qq", url: "https://www.qq.com" },
    ConnectivityTarget::Http { label: "HTTP taobao", url: "https://www.taobao.com" },
    ConnectivityTarget::Tcp { label: "TCP 114DNS", addr: "114.114.114.114:53" },
    ConnectivityTarget::Tcp { label: "TCP AliDNS", addr: "223.5.5.5:53" },
];

/// Verdict for a success count: (status, repairable)
pub fn classify_connectivity(success_count: usize) -> (DiagnosticStatus, bool) {
    match success_count {
        0 => (DiagnosticStatus::Error, true),
        n if n < HEALTHY_SUCCESSES => (DiagnosticStatus::Warning, true),
        _ => (DiagnosticStatus::Ok, false),
    }
}

pub struct ConnectivityProbe {
    ctx: SystemContext,
    targets: Vec<ConnectivityTarget>,
}

impl ConnectivityProbe {
    pub fn new(ctx: SystemContext) -> Self {
        Self::with_targets(ctx, DEFAULT_TARGETS.to_vec())
    }

    pub fn with_targets(ctx: SystemContext, targets: Vec<ConnectivityTarget>) -> Self {
        Self { ctx, targets }
    }

    async fn attempt(&self, target: &ConnectivityTarget) -> ConnectivityResult {
        let settings = &self.ctx.config.connectivity;
        let start = Instant::now();
        let outcome = match target {
            ConnectivityTarget::Http { url, .. } => {
                match self
                    .ctx
                    .reachability
                    .http_probe(url, settings.effective_http_timeout())
                    .await
                {
                    Ok(status) if (200..500).contains(&status) => Ok(()),
                    Ok(status) => Err(format!("HTTP {}", status)),
                    Err(e) => Err(e.to_string()),
                }
            }
            ConnectivityTarget::Tcp { addr, .. } => self
                .ctx
                .reachability
                .tcp_connect(addr, settings.effective_tcp_timeout())
                .await
                .map_err(|e| e.to_string()),
        };
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!("{}: {:?} in {}ms", target.label(), outcome, latency_ms);

        match outcome {
            Ok(()) => ConnectivityResult {
                target: target.label().to_string(),
                success: true,
                latency_ms,
                error: None,
            },
            Err(error) => ConnectivityResult {
                target: target.label().to_string(),
                success: false,
                latency_ms: 0,
                error: Some(error),
            },
        }
    }
}

#[async_trait]
impl Probe for ConnectivityProbe {
    fn id(&self) -> &str {
        "connectivity"
    }

    fn name(&self) -> &str {
        "Internet connectivity"
    }

    async fn check(&self, _cancel: &CancellationToken) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(self.id(), self.name());

        let mut outcomes = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            outcomes.push(self.attempt(target).await);
        }

        let latencies: Vec<u64> = outcomes
            .iter()
            .filter(|o| o.success)
            .map(|o| o.latency_ms)
            .collect();
        let success = latencies.len();
        let last_failure = outcomes.iter().rev().find(|o| !o.success);

        result.add_detail("successCount", success);
        result.add_detail("totalTargets", self.targets.len());
        result.add_detail("targets", &outcomes);
        if success > 0 {
            result.add_detail("avgLatencyMs", mean_latency_ms(&latencies));
        }

        match classify_connectivity(success) {
            (DiagnosticStatus::Ok, _) => result.set_ok(format!(
                "Internet reachable, average latency {}ms",
                mean_latency_ms(&latencies)
            )),
            (DiagnosticStatus::Warning, repairable) => result.set_warning(
                format!(
                    "Connectivity unstable: {} of {} targets reachable",
                    success,
                    self.targets.len()
                ),
                repairable,
            ),
            (DiagnosticStatus::Error, repairable) => result.set_error(
                format!(
                    "Cannot reach the Internet: {} failed",
                    last_failure.map(|o| o.target.as_str()).unwrap_or("every target")
                ),
                repairable,
            ),
        }
        info!("connectivity: {}/{} targets reachable", success, self.targets.len());
        result
    }
}
