//! Disable and re-enable the wired adapter.
//!
//! Interface names are tried in configured order for each step, so a Chinese
//! system (以太网) and an English one (Ethernet) both work without detection.

use super::Repair;
use crate::context::SystemContext;
use crate::types::RepairResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct AdapterReset {
    ctx: SystemContext,
}

impl AdapterReset {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }

    /// Run `netsh interface set interface <name> <action>` for each name until one
    /// succeeds. Returns the name that worked.
    async fn set_state(&self, action: &str, cancel: &CancellationToken) -> Option<String> {
        for name in &self.ctx.config.adapter_reset.interface_names {
            let spec = self
                .ctx
                .command("netsh", ["interface", "set", "interface", name.as_str(), action]);
            let output = self.ctx.runner.execute(&spec, cancel).await;
            if output.is_success() {
                return Some(name.clone());
            }
            debug!("{} failed: {}", spec.command_line(), output.failure_detail());
        }
        None
    }
}

#[async_trait]
impl Repair for AdapterReset {
    fn id(&self) -> &str {
        "adapter"
    }

    fn name(&self) -> &str {
        "Restart network adapter"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    async fn repair(&self, cancel: &CancellationToken) -> RepairResult {
        let mut result = RepairResult::new(self.id(), self.name());

        match self.set_state("disable", cancel).await {
            Some(name) => debug!("Disabled {}", name),
            None => warn!("No configured interface could be disabled"),
        }

        tokio::time::sleep(self.ctx.config.adapter_reset.pause()).await;

        // Enable is not cancellable: the adapter must not be left disabled.
        match self.set_state("enable", &CancellationToken::new()).await {
            Some(name) => {
                info!("adapter: {} restarted", name);
                result.set_success(format!("Network adapter '{}' restarted", name));
            }
            None => {
                warn!("No configured interface could be enabled");
                result.set_failure(
                    "Network adapter restart failed; re-enable it manually in Device Manager",
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_exec::FakeCommandRunner;
    use crate::config::NetmedicConfig;
    use crate::context::testing::context_with_runner;
    use std::sync::Arc;

    fn context(runner: Arc<FakeCommandRunner>) -> SystemContext {
        let mut ctx = context_with_runner(runner);
        let mut config = NetmedicConfig::default();
        config.adapter_reset.pause_ms = 0;
        ctx.config = Arc::new(config);
        ctx
    }

    #[tokio::test]
    async fn test_primary_name_used_first() {
        let runner = Arc::new(
            FakeCommandRunner::new()
                .succeed("netsh interface set interface 以太网 disable", "")
                .succeed("netsh interface set interface 以太网 enable", ""),
        );
        let result = AdapterReset::new(context(runner.clone()))
            .repair(&CancellationToken::new())
            .await;

        assert!(result.success);
        assert_eq!(
            runner.calls(),
            [
                "netsh interface set interface 以太网 disable",
                "netsh interface set interface 以太网 enable"
            ]
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_english_name() {
        let runner = Arc::new(
            FakeCommandRunner::new()
                .succeed("netsh interface set interface Ethernet disable", "")
                .succeed("netsh interface set interface Ethernet enable", ""),
        );
        let result = AdapterReset::new(context(runner.clone()))
            .repair(&CancellationToken::new())
            .await;

        assert!(result.success);
        assert!(result.message.contains("Ethernet"));
        assert_eq!(runner.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_success_depends_only_on_enable() {
        // Disable fails under both names, enable works
        let runner = Arc::new(
            FakeCommandRunner::new().succeed("netsh interface set interface Ethernet enable", ""),
        );
        let result = AdapterReset::new(context(runner))
            .repair(&CancellationToken::new())
            .await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_enable_failure() {
        let runner = Arc::new(
            FakeCommandRunner::new().succeed("netsh interface set interface 以太网 disable", ""),
        );
        let result = AdapterReset::new(context(runner))
            .repair(&CancellationToken::new())
            .await;

        assert!(!result.success);
        assert!(result.message.contains("Device Manager"));
    }
}
