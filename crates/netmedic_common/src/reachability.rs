//! Network reachability primitives used by the connectivity and DNS probes.
//!
//! Latency is measured by the caller; implementations only report whether the
//! attempt worked. Every attempt is made once.

use crate::error::{NetmedicError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

#[async_trait]
pub trait Reachability: Send + Sync {
    /// HTTP status code of the target, without following redirects
    async fn http_probe(&self, url: &str, timeout: Duration) -> Result<u16>;

    async fn tcp_connect(&self, addr: &str, timeout: Duration) -> Result<()>;

    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>>;
}

// ============================================================================
// System implementation
// ============================================================================

/// reqwest for HTTP, tokio for TCP and name resolution
#[derive(Debug, Default, Clone)]
pub struct SystemReachability;

impl SystemReachability {
    pub fn new() -> Self {
        Self
    }

    fn client(timeout: Duration) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| NetmedicError::Network(e.to_string()))
    }
}

#[async_trait]
impl Reachability for SystemReachability {
    async fn http_probe(&self, url: &str, timeout: Duration) -> Result<u16> {
        let client = Self::client(timeout)?;
        // Some servers refuse HEAD outright; only a transport error triggers the GET.
        let response = match client.head(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("HEAD {} failed ({}), retrying as GET", url, e);
                client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| NetmedicError::Network(e.to_string()))?
            }
        };
        Ok(response.status().as_u16())
    }

    async fn tcp_connect(&self, addr: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(NetmedicError::Network(format!("{}: {}", addr, e))),
            Err(_) => Err(NetmedicError::Network(format!(
                "{}: connect timed out after {:?}",
                addr, timeout
            ))),
        }
    }

    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| NetmedicError::Network(format!("{}: {}", host, e)))?;
        let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
        if ips.is_empty() {
            return Err(NetmedicError::Network(format!("{}: no addresses", host)));
        }
        Ok(ips)
    }
}

// ============================================================================
// Fake implementation (testing)
// ============================================================================

/// Scripted reachability. Anything not scripted is unreachable.
#[derive(Debug, Default, Clone)]
pub struct FakeReachability {
    http: HashMap<String, u16>,
    tcp: Vec<String>,
    dns: HashMap<String, Vec<IpAddr>>,
}

impl FakeReachability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http(mut self, url: &str, status: u16) -> Self {
        self.http.insert(url.to_string(), status);
        self
    }

    pub fn with_tcp(mut self, addr: &str) -> Self {
        self.tcp.push(addr.to_string());
        self
    }

    pub fn with_dns(mut self, host: &str, ip: IpAddr) -> Self {
        self.dns.entry(host.to_string()).or_default().push(ip);
        self
    }
}

#[async_trait]
impl Reachability for FakeReachability {
    async fn http_probe(&self, url: &str, _timeout: Duration) -> Result<u16> {
        self.http
            .get(url)
            .copied()
            .ok_or_else(|| NetmedicError::Network(format!("{}: connection refused", url)))
    }

    async fn tcp_connect(&self, addr: &str, _timeout: Duration) -> Result<()> {
        if self.tcp.iter().any(|a| a == addr) {
            Ok(())
        } else {
            Err(NetmedicError::Network(format!("{}: connection refused", addr)))
        }
    }

    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.dns
            .get(host)
            .cloned()
            .ok_or_else(|| NetmedicError::Network(format!("{}: no such host", host)))
    }
}
