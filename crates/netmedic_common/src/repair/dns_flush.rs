//! DNS resolver cache flush

use super::Repair;
use crate::context::SystemContext;
use crate::types::RepairResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct DnsFlush {
    ctx: SystemContext,
}

impl DnsFlush {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Repair for DnsFlush {
    fn id(&self) -> &str {
        "dns"
    }

    fn name(&self) -> &str {
        "Flush DNS cache"
    }

    fn requires_admin(&self) -> bool {
        false
    }

    async fn repair(&self, cancel: &CancellationToken) -> RepairResult {
        let mut result = RepairResult::new(self.id(), self.name());
        let spec = self.ctx.command("ipconfig", ["/flushdns"]);
        let output = self.ctx.runner.execute(&spec, cancel).await;

        if output.is_success() {
            info!("dns: resolver cache flushed");
            result.set_success("DNS resolver cache flushed");
        } else {
            warn!("ipconfig /flushdns failed: {}", output.failure_detail());
            result.set_failure(format!("DNS flush failed: {}", output.failure_detail()));
        }
        result
    }
}
