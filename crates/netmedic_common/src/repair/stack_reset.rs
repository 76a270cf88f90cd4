//! Winsock catalog and TCP/IP stack resets.
//!
//! Both are single `netsh` calls that only take effect after a restart.

use super::Repair;
use crate::context::SystemContext;
use crate::types::RepairResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct StackReset {
    ctx: SystemContext,
    id: &'static str,
    name: &'static str,
    args: &'static [&'static str],
}

impl StackReset {
    /// `netsh winsock reset`
    pub fn winsock(ctx: SystemContext) -> Self {
        Self {
            ctx,
            id: "winsock",
            name: "Reset Winsock catalog",
            args: &["winsock", "reset"],
        }
    }

    /// `netsh int ip reset`
    pub fn tcpip(ctx: SystemContext) -> Self {
        Self {
            ctx,
            id: "tcpip",
            name: "Reset TCP/IP stack",
            args: &["int", "ip", "reset"],
        }
    }
}

#[async_trait]
impl Repair for StackReset {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn requires_admin(&self) -> bool {
        true
    }

    async fn repair(&self, cancel: &CancellationToken) -> RepairResult {
        let mut result = RepairResult::new(self.id, self.name);
        let spec = self.ctx.command("netsh", self.args.iter().copied());
        let output = self.ctx.runner.execute(&spec, cancel).await;

        if output.is_success() {
            info!("{}: done, restart required", self.id);
            result.set_success(format!("{} completed; restart the computer to apply", self.name));
            result.set_require_reboot();
        } else {
            warn!("{} failed: {}", spec.command_line(), output.failure_detail());
            result.set_failure(format!("{} failed: {}", self.name, output.failure_detail()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_exec::{CommandFailure, CommandResult, FakeCommandRunner};
    use crate::context::testing::context_with_runner;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_winsock_success_requires_reboot() {
        let runner = Arc::new(FakeCommandRunner::new().succeed(
            "netsh winsock reset",
            "Sucessfully reset the Winsock Catalog.",
        ));
        let result = StackReset::winsock(context_with_runner(runner.clone()))
            .repair(&CancellationToken::new())
            .await;

        assert!(result.success);
        assert!(result.require_reboot);
        assert_eq!(runner.calls(), ["netsh winsock reset"]);
    }

    #[tokio::test]
    async fn test_tcpip_failure_carries_stderr() {
        let runner = Arc::new(
            FakeCommandRunner::new().fail("netsh int ip reset", "Access is denied."),
        );
        let result = StackReset::tcpip(context_with_runner(runner))
            .repair(&CancellationToken::new())
            .await;

        assert!(!result.success);
        assert!(!result.require_reboot);
        assert!(result.message.contains("Access is denied."));
    }

    #[tokio::test]
    async fn test_launch_failure_message_when_stderr_empty() {
        let runner = Arc::new(FakeCommandRunner::new().respond(
            "netsh winsock reset",
            CommandResult::failed(CommandFailure::Launch {
                reason: "program not found".to_string(),
            }),
        ));
        let result = StackReset::winsock(context_with_runner(runner))
            .repair(&CancellationToken::new())
            .await;

        assert!(result.message.contains("program not found"));
    }
}
