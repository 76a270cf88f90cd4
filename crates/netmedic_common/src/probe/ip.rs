//! IP configuration probe (`ipconfig /all`)

use super::Probe;
use crate::context::SystemContext;
use crate::parsers::parse_ipconfig;
use crate::types::DiagnosticResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct IpProbe {
    ctx: SystemContext,
}

impl IpProbe {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Probe for IpProbe {
    fn id(&self) -> &str {
        "ip"
    }

    fn name(&self) -> &str {
        "IP configuration"
    }

    async fn check(&self, cancel: &CancellationToken) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(self.id(), self.name());

        let spec = self.ctx.command("ipconfig", ["/all"]);
        let output = self.ctx.runner.execute(&spec, cancel).await;
        if !output.is_success() {
            warn!("ipconfig failed: {}", output.failure_detail());
            result.set_error(
                format!("Unable to read IP configuration: {}", output.failure_detail()),
                false,
            );
            return result;
        }

        let configs = parse_ipconfig(output.stdout());
        result.add_detail("configs", &configs);

        let has_ip = configs.iter().any(|c| !c.ip_addresses.is_empty());
        let has_dhcp = configs.iter().any(|c| c.dhcp_enabled);

        if !has_ip {
            result.set_error("No adapter has a valid IP address", true);
        } else if has_dhcp {
            result.set_ok("IP configuration looks fine (DHCP)");
        } else {
            result.set_ok("IP configuration looks fine (static)");
        }
        info!("ip: {} adapter section(s), has_ip={}", configs.len(), has_ip);
        result
    }
}
