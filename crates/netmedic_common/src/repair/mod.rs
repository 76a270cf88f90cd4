//! Repair actions
//!
//! An action mutates system state and always produces a [`RepairResult`].
//! Actions run once; a failed action is reported, never retried or rolled back
//! beyond the backup it wrote itself.
//!
//! Default registration order: winsock, tcpip, dns, ip, hosts, proxy, adapter.

pub mod adapter_reset;
pub mod dns_flush;
pub mod hosts_restore;
pub mod ip_renew;
pub mod proxy_clear;
pub mod stack_reset;

pub use adapter_reset::AdapterReset;
pub use dns_flush::DnsFlush;
pub use hosts_restore::{default_hosts_template, HostsRestore};
pub use ip_renew::IpRenew;
pub use proxy_clear::ProxyClear;
pub use stack_reset::StackReset;

use crate::context::SystemContext;
use crate::types::RepairResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Repair: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Whether the action needs an elevated process to succeed
    fn requires_admin(&self) -> bool;

    async fn repair(&self, cancel: &CancellationToken) -> RepairResult;
}

/// The built-in action set, in registration order
pub fn standard_repairs(ctx: &SystemContext) -> Vec<Arc<dyn Repair>> {
    vec![
        Arc::new(StackReset::winsock(ctx.clone())),
        Arc::new(StackReset::tcpip(ctx.clone())),
        Arc::new(DnsFlush::new(ctx.clone())),
        Arc::new(IpRenew::new(ctx.clone())),
        Arc::new(HostsRestore::new(ctx.clone())),
        Arc::new(ProxyClear::new(ctx.clone())),
        Arc::new(AdapterReset::new(ctx.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_exec::FakeCommandRunner;
    use crate::context::testing::context_with_runner;

    #[test]
    fn test_standard_repair_order_and_admin() {
        let ctx = context_with_runner(Arc::new(FakeCommandRunner::new()));
        let repairs = standard_repairs(&ctx);

        let ids: Vec<&str> = repairs.iter().map(|r| r.id()).collect();
        assert_eq!(ids, ["winsock", "tcpip", "dns", "ip", "hosts", "proxy", "adapter"]);

        let unprivileged: Vec<&str> = repairs
            .iter()
            .filter(|r| !r.requires_admin())
            .map(|r| r.id())
            .collect();
        assert_eq!(unprivileged, ["dns", "proxy"]);
    }
}
