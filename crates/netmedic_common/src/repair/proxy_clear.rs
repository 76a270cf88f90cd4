//! Disable the system proxy and verify the change stuck

use super::Repair;
use crate::context::SystemContext;
use crate::proxy_store::{INTERNET_SETTINGS_KEY, PROXY_ENABLE};
use crate::types::RepairResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct ProxyClear {
    ctx: SystemContext,
}

impl ProxyClear {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Repair for ProxyClear {
    fn id(&self) -> &str {
        "proxy"
    }

    fn name(&self) -> &str {
        "Clear proxy settings"
    }

    fn requires_admin(&self) -> bool {
        false
    }

    async fn repair(&self, cancel: &CancellationToken) -> RepairResult {
        let mut result = RepairResult::new(self.id(), self.name());
        let store = &self.ctx.proxy;

        if let Err(e) = store
            .write_dword(INTERNET_SETTINGS_KEY, PROXY_ENABLE, 0, cancel)
            .await
        {
            warn!("Writing {} failed: {}", PROXY_ENABLE, e);
            result.set_failure(format!("Unable to disable proxy: {}", e));
            return result;
        }

        match store.read_dword(INTERNET_SETTINGS_KEY, PROXY_ENABLE, cancel).await {
            Ok(0) => {
                info!("proxy: disabled");
                result.set_success("Proxy disabled");
            }
            Ok(value) => {
                warn!("{} still {} after write", PROXY_ENABLE, value);
                result.set_failure("Proxy settings verification failed");
            }
            Err(e) => {
                warn!("Reading back {} failed: {}", PROXY_ENABLE, e);
                result.set_failure("Proxy settings verification failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_exec::FakeCommandRunner;
    use crate::context::testing::context_with_runner;
    use crate::proxy_store::{MemoryProxyStore, ProxyStore};
    use crate::types::ProxyConfig;
    use std::sync::Arc;

    fn enabled() -> ProxyConfig {
        ProxyConfig {
            enabled: true,
            server: "127.0.0.1:7890".to_string(),
            port: 7890,
            ..Default::default()
        }
    }

    async fn run(store: Arc<MemoryProxyStore>) -> RepairResult {
        let mut ctx = context_with_runner(Arc::new(FakeCommandRunner::new()));
        ctx.proxy = store;
        ProxyClear::new(ctx).repair(&CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_clear_enabled_proxy() {
        let store = Arc::new(MemoryProxyStore::new(enabled()));
        let result = run(store.clone()).await;

        assert!(result.success);
        let config = store.read_proxy(&CancellationToken::new()).await.unwrap();
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_ignored_write_fails_verification() {
        let result = run(Arc::new(MemoryProxyStore::new(enabled()).ignoring_writes())).await;

        assert!(!result.success);
        assert!(result.message.contains("verification failed"));
    }

    #[tokio::test]
    async fn test_unreadable_value_fails_verification() {
        let result = run(Arc::new(MemoryProxyStore::new(enabled()).failing_reads())).await;

        assert!(!result.success);
        assert!(result.message.contains("verification failed"));
    }
}
