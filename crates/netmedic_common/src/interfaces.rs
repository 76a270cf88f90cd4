//! Network interface enumeration.
//!
//! The adapter probe only sees [`InterfaceSource`]. Defaults:
//! - Windows: [`NetshInterfaceSource`] (interface table, enriched from `ipconfig /all`)
//! - elsewhere: [`SysfsInterfaceSource`] reading `/sys/class/net`

use crate::command_exec::{CommandRunner, CommandSpec};
use crate::error::{NetmedicError, Result};
use crate::parsers::{parse_interface_table, parse_ipconfig};
use crate::types::AdapterStatus;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const IFF_UP: u32 = 0x1;
const IFF_LOOPBACK: u32 = 0x8;

/// An interface as the platform reports it, before classification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawInterface {
    pub name: String,
    pub description: String,
    pub mac_address: String,
    pub is_up: bool,
    pub is_loopback: bool,
    pub ip_addresses: Vec<String>,
    pub subnet_masks: Vec<String>,
    pub gateways: Vec<String>,
    pub dns_servers: Vec<String>,
    pub dhcp_enabled: bool,
}

#[async_trait]
pub trait InterfaceSource: Send + Sync {
    async fn enumerate(&self, cancel: &CancellationToken) -> Result<Vec<RawInterface>>;
}

// ============================================================================
// netsh (Windows)
// ============================================================================

pub struct NetshInterfaceSource {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl NetshInterfaceSource {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

#[async_trait]
impl InterfaceSource for NetshInterfaceSource {
    async fn enumerate(&self, cancel: &CancellationToken) -> Result<Vec<RawInterface>> {
        let table = CommandSpec::new("netsh", ["interface", "show", "interface"])
            .with_timeout(self.timeout);
        let result = self.runner.execute(&table, cancel).await;
        if !result.is_success() {
            return Err(NetmedicError::Command(result.failure_detail()));
        }

        let mut interfaces: Vec<RawInterface> = parse_interface_table(result.stdout())
            .into_iter()
            .map(|row| RawInterface {
                name: row.name,
                is_up: row.status == AdapterStatus::Up,
                is_loopback: row.loopback,
                ..Default::default()
            })
            .collect();

        // Addressing is optional enrichment; the table alone is enough to classify.
        let ipconfig = CommandSpec::new("ipconfig", ["/all"]).with_timeout(self.timeout);
        let result = self.runner.execute(&ipconfig, cancel).await;
        if result.is_success() {
            for config in parse_ipconfig(result.stdout()) {
                if let Some(iface) = interfaces.iter_mut().find(|i| i.name == config.name) {
                    iface.ip_addresses = config.ip_addresses;
                    iface.subnet_masks = config.subnet_masks;
                    iface.gateways = config.gateways;
                    iface.dns_servers = config.dns_servers;
                    iface.dhcp_enabled = config.dhcp_enabled;
                }
            }
        } else {
            debug!("ipconfig enrichment skipped: {}", result.failure_detail());
        }

        Ok(interfaces)
    }
}

// ============================================================================
// /sys/class/net (Linux)
// ============================================================================

pub struct SysfsInterfaceSource {
    root: PathBuf,
}

impl SysfsInterfaceSource {
    pub fn new() -> Self {
        Self::with_root("/sys/class/net")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_trimmed(&self, iface: &str, file: &str) -> Option<String> {
        tokio::fs::read_to_string(self.root.join(iface).join(file))
            .await
            .ok()
            .map(|s| s.trim().to_string())
    }
}

impl Default for SysfsInterfaceSource {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flags(raw: &str) -> u32 {
    let hex = raw.trim_start_matches("0x");
    u32::from_str_radix(hex, 16).unwrap_or(0)
}

#[async_trait]
impl InterfaceSource for SysfsInterfaceSource {
    async fn enumerate(&self, _cancel: &CancellationToken) -> Result<Vec<RawInterface>> {
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();

        let mut interfaces = Vec::with_capacity(names.len());
        for name in names {
            let flags = match self.read_trimmed(&name, "flags").await {
                Some(raw) => parse_flags(&raw),
                None => {
                    warn!("No flags for interface {}", name);
                    0
                }
            };
            let mac_address = self.read_trimmed(&name, "address").await.unwrap_or_default();
            interfaces.push(RawInterface {
                name,
                mac_address,
                is_up: flags & IFF_UP != 0,
                is_loopback: flags & IFF_LOOPBACK != 0,
                ..Default::default()
            });
        }
        Ok(interfaces)
    }
}

/// Platform default source
pub fn default_interface_source(
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
) -> Arc<dyn InterfaceSource> {
    if cfg!(windows) {
        Arc::new(NetshInterfaceSource::new(runner, timeout))
    } else {
        Arc::new(SysfsInterfaceSource::new())
    }
}

// ============================================================================
// Static source (testing)
// ============================================================================

/// Returns a fixed list, or a fixed enumeration failure
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaceSource {
    interfaces: Vec<RawInterface>,
    failure: Option<String>,
}

impl StaticInterfaceSource {
    pub fn new(interfaces: Vec<RawInterface>) -> Self {
        Self {
            interfaces,
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            interfaces: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl InterfaceSource for StaticInterfaceSource {
    async fn enumerate(&self, _cancel: &CancellationToken) -> Result<Vec<RawInterface>> {
        match &self.failure {
            Some(message) => Err(NetmedicError::Command(message.clone())),
            None => Ok(self.interfaces.clone()),
        }
    }
}
