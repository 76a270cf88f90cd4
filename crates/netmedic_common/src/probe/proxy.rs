//! System proxy probe

use super::Probe;
use crate::context::SystemContext;
use crate::types::DiagnosticResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct ProxyProbe {
    ctx: SystemContext,
}

impl ProxyProbe {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Probe for ProxyProbe {
    fn id(&self) -> &str {
        "proxy"
    }

    fn name(&self) -> &str {
        "Proxy settings"
    }

    async fn check(&self, cancel: &CancellationToken) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(self.id(), self.name());

        let config = match self.ctx.proxy.read_proxy(cancel).await {
            Ok(config) => config,
            Err(e) => {
                warn!("Reading proxy settings failed: {}", e);
                result.set_error(format!("Unable to read proxy settings: {}", e), false);
                return result;
            }
        };

        result.add_detail("proxyConfig", &config);
        if config.enabled {
            result.set_warning(format!("Proxy server enabled: {}", config.server), true);
        } else {
            result.set_ok("No proxy server enabled");
        }
        info!("proxy: enabled={}", config.enabled);
        result
    }
}
