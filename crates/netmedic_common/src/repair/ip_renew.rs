//! DHCP lease release and renew

use super::Repair;
use crate::context::SystemContext;
use crate::types::RepairResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct IpRenew {
    ctx: SystemContext,
}

impl IpRenew {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Repair for IpRenew {
    fn id(&self) -> &str {
        "ip"
    }

    fn name(&self) -> &str {
        "Release and renew IP address"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    async fn repair(&self, cancel: &CancellationToken) -> RepairResult {
        let mut result = RepairResult::new(self.id(), self.name());

        let release = self.ctx.command("ipconfig", ["/release"]);
        let output = self.ctx.runner.execute(&release, cancel).await;
        if !output.is_success() {
            warn!("ipconfig /release failed: {}", output.failure_detail());
            result.set_failure(format!("IP release failed: {}", output.failure_detail()));
            return result;
        }

        tokio::time::sleep(self.ctx.config.ip_renew.pause()).await;

        // Once released, renew runs even if the caller cancelled; a half-done
        // run would leave the host without an address.
        let renew = self.ctx.command("ipconfig", ["/renew"]);
        let output = self
            .ctx
            .runner
            .execute(&renew, &CancellationToken::new())
            .await;
        if !output.is_success() {
            warn!("ipconfig /renew failed: {}", output.failure_detail());
            result.set_failure(format!("IP renew failed: {}", output.failure_detail()));
            return result;
        }

        info!("ip: lease renewed");
        result.set_success("IP address released and renewed");
        result
    }
}
