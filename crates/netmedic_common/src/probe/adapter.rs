//! Network adapter probe

use super::Probe;
use crate::context::SystemContext;
use crate::types::{AdapterInfo, AdapterStatus, DiagnosticResult};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct AdapterProbe {
    ctx: SystemContext,
}

impl AdapterProbe {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Probe for AdapterProbe {
    fn id(&self) -> &str {
        "adapter"
    }

    fn name(&self) -> &str {
        "Network adapters"
    }

    async fn check(&self, cancel: &CancellationToken) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(self.id(), self.name());

        let interfaces = match self.ctx.interfaces.enumerate(cancel).await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!("Interface enumeration failed: {}", e);
                result.set_error(format!("Unable to list network adapters: {}", e), false);
                return result;
            }
        };

        if interfaces.is_empty() {
            result.set_error("No network adapters detected", false);
            return result;
        }

        let adapters: Vec<AdapterInfo> = interfaces
            .into_iter()
            .filter(|iface| !iface.is_loopback)
            .map(|iface| AdapterInfo {
                status: if iface.is_up {
                    AdapterStatus::Up
                } else {
                    AdapterStatus::Down
                },
                name: iface.name,
                description: iface.description,
                mac_address: iface.mac_address,
                ip_addresses: iface.ip_addresses,
                subnet_masks: iface.subnet_masks,
                gateways: iface.gateways,
                dns_servers: iface.dns_servers,
                dhcp_enabled: iface.dhcp_enabled,
                dhcp_server: None,
            })
            .collect();
        let active = adapters
            .iter()
            .filter(|a| a.status == AdapterStatus::Up)
            .count();

        result.add_detail("adapters", &adapters);
        result.add_detail("totalCount", adapters.len());
        result.add_detail("activeCount", active);

        if active == 0 {
            result.set_warning("No active network adapter", true);
        } else {
            result.set_ok(format!("{} active network adapter(s) detected", active));
        }
        info!("adapter: {} of {} active", active, adapters.len());
        result
    }
}
