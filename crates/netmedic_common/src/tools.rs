//! Network tools - one-shot utilities outside the probe/repair registries
//!
//! Ping, traceroute, port check, full adapter dump, firewall state, DNS server
//! switching and network service restarts. Everything goes through the same
//! command gateway and reachability collaborator as the probes.

use crate::command_exec::CommandResult;
use crate::context::SystemContext;
use crate::error::{NetmedicError, Result};
use crate::parsers::parse_interface_table;
use crate::types::AdapterStatus;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Hop-by-hop tracing is slow; give it more room than a normal command
const TRACE_TIMEOUT: Duration = Duration::from_secs(120);
const PORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Services restarted by [`NetworkTools::restart_services`], in order
pub const NETWORK_SERVICES: &[&str] = &["Dhcp", "Dnscache", "NlaSvc"];

/// A public resolver pair offered for DNS switching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DnsPreset {
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
}

pub const PUBLIC_DNS_SERVERS: &[DnsPreset] = &[
    DnsPreset { name: "alidns", primary: "223.5.5.5", secondary: "223.6.6.6" },
    DnsPreset { name: "114dns", primary: "114.114.114.114", secondary: "114.114.115.115" },
    DnsPreset { name: "dnspod", primary: "119.29.29.29", secondary: "182.254.116.116" },
    DnsPreset { name: "google", primary: "8.8.8.8", secondary: "8.8.4.4" },
    DnsPreset { name: "cloudflare", primary: "1.1.1.1", secondary: "1.0.0.1" },
];

pub fn dns_preset(name: &str) -> Option<&'static DnsPreset> {
    PUBLIC_DNS_SERVERS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// Reduce a URL-ish input to a bare host: no scheme, path or port.
///
/// `https://www.baidu.com:443/s?wd=x` becomes `www.baidu.com`.
pub fn normalize_target(input: &str) -> String {
    let mut target = input.trim();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = target.strip_prefix(scheme) {
            target = rest;
        }
    }
    if let Some(idx) = target.find('/') {
        target = &target[..idx];
    }
    if let Some(idx) = target.find(':') {
        target = &target[..idx];
    }
    target.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortCheck {
    pub target: String,
    pub open: bool,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one step applied to a named adapter or service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStep {
    pub name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolStep {
    fn from_result(name: &str, result: &CommandResult) -> Self {
        Self {
            name: name.to_string(),
            success: result.is_success(),
            error: (!result.is_success()).then(|| result.failure_detail()),
        }
    }
}

pub struct NetworkTools {
    ctx: SystemContext,
}

impl NetworkTools {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }

    /// Four echo requests to the normalized target
    pub async fn ping(&self, target: &str, cancel: &CancellationToken) -> Result<CommandResult> {
        let host = non_empty_target(target)?;
        let count_flag = if cfg!(windows) { "-n" } else { "-c" };
        let spec = self.ctx.command("ping", [count_flag, "4", host.as_str()]);
        Ok(self.ctx.runner.execute(&spec, cancel).await)
    }

    /// Numeric route trace, at most 15 hops
    pub async fn traceroute(
        &self,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandResult> {
        let host = non_empty_target(target)?;
        let spec = if cfg!(windows) {
            self.ctx.command("tracert", ["-d", "-h", "15", host.as_str()])
        } else {
            self.ctx.command("traceroute", ["-n", "-m", "15", host.as_str()])
        };
        Ok(self
            .ctx
            .runner
            .execute(&spec.with_timeout(TRACE_TIMEOUT), cancel)
            .await)
    }

    /// TCP connect to `host:port`
    pub async fn check_port(&self, host: &str, port: u16) -> Result<PortCheck> {
        let host = non_empty_target(host)?;
        let target = format!("{}:{}", host, port);
        let start = Instant::now();
        let outcome = self.ctx.reachability.tcp_connect(&target, PORT_TIMEOUT).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        Ok(match outcome {
            Ok(()) => PortCheck {
                target,
                open: true,
                latency_ms,
                error: None,
            },
            Err(e) => PortCheck {
                target,
                open: false,
                latency_ms: 0,
                error: Some(e.to_string()),
            },
        })
    }

    /// Raw `ipconfig /all`
    pub async fn network_info(&self, cancel: &CancellationToken) -> CommandResult {
        let spec = self.ctx.command("ipconfig", ["/all"]);
        self.ctx.runner.execute(&spec, cancel).await
    }

    pub async fn firewall_status(&self, cancel: &CancellationToken) -> CommandResult {
        let spec = self
            .ctx
            .command("netsh", ["advfirewall", "show", "allprofiles", "state"]);
        self.ctx.runner.execute(&spec, cancel).await
    }

    /// Names of connected, non-loopback interfaces
    pub async fn connected_adapters(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let spec = self.ctx.command("netsh", ["interface", "show", "interface"]);
        let result = self.ctx.runner.execute(&spec, cancel).await;
        if !result.is_success() {
            return Err(NetmedicError::Command(result.failure_detail()));
        }
        Ok(parse_interface_table(result.stdout())
            .into_iter()
            .filter(|iface| iface.status == AdapterStatus::Up && !iface.loopback)
            .map(|iface| iface.name)
            .collect())
    }

    /// Point every connected adapter at the given resolvers.
    ///
    /// The secondary is only added when the primary was set. An empty list
    /// means no adapter was connected.
    pub async fn switch_dns(
        &self,
        primary: &str,
        secondary: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ToolStep>> {
        for addr in [primary, secondary] {
            addr.parse::<Ipv4Addr>().map_err(|_| {
                NetmedicError::InvalidArgument(format!("'{}' is not an IPv4 address", addr))
            })?;
        }

        let adapters = self.connected_adapters(cancel).await?;
        let mut steps = Vec::with_capacity(adapters.len());
        for adapter in &adapters {
            let set = self.ctx.command(
                "netsh",
                ["interface", "ip", "set", "dns", adapter.as_str(), "static", primary],
            );
            let result = self.ctx.runner.execute(&set, cancel).await;
            if !result.is_success() {
                warn!("Setting DNS on {} failed: {}", adapter, result.failure_detail());
                steps.push(ToolStep::from_result(adapter, &result));
                continue;
            }

            let add = self.ctx.command(
                "netsh",
                ["interface", "ip", "add", "dns", adapter.as_str(), secondary, "index=2"],
            );
            let result = self.ctx.runner.execute(&add, cancel).await;
            steps.push(ToolStep::from_result(adapter, &result));
        }
        info!("DNS switched to {}/{} on {} adapter(s)", primary, secondary, steps.len());
        Ok(steps)
    }

    /// Stop then start each network service; success is judged on the start
    pub async fn restart_services(&self, cancel: &CancellationToken) -> Vec<ToolStep> {
        let mut steps = Vec::with_capacity(NETWORK_SERVICES.len());
        for &service in NETWORK_SERVICES {
            let stop = self.ctx.command("net", ["stop", service]);
            let stopped = self.ctx.runner.execute(&stop, cancel).await;
            if !stopped.is_success() {
                // Already-stopped services report failure here; start decides.
                warn!("net stop {}: {}", service, stopped.failure_detail());
            }
            let start = self.ctx.command("net", ["start", service]);
            let started = self.ctx.runner.execute(&start, cancel).await;
            steps.push(ToolStep::from_result(service, &started));
        }
        steps
    }
}

fn non_empty_target(input: &str) -> Result<String> {
    let host = normalize_target(input);
    if host.is_empty() {
        return Err(NetmedicError::InvalidArgument("empty target".to_string()));
    }
    Ok(host)
}
