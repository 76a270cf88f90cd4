//! System proxy settings storage.
//!
//! [`RegProxyStore`] drives `reg query` / `reg add` through the command gateway
//! against the per-user Internet Settings key. [`MemoryProxyStore`] is the
//! in-process stand-in for tests.

use crate::command_exec::{CommandRunner, CommandSpec};
use crate::error::{NetmedicError, Result};
use crate::parsers::{find_reg_value, parse_reg_values, RegValue};
use crate::types::ProxyConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Per-user Internet Settings key
pub const INTERNET_SETTINGS_KEY: &str =
    r"HKCU\Software\Microsoft\Windows\CurrentVersion\Internet Settings";

pub const PROXY_ENABLE: &str = "ProxyEnable";
pub const PROXY_SERVER: &str = "ProxyServer";
pub const PROXY_OVERRIDE: &str = "ProxyOverride";
pub const AUTO_CONFIG_URL: &str = "AutoConfigURL";

/// The only ProxyEnable value that means "on"
const PROXY_ENABLED: u32 = 1;

fn is_proxy_enabled(value: u32) -> bool {
    value == PROXY_ENABLED
}

#[async_trait]
pub trait ProxyStore: Send + Sync {
    async fn read_proxy(&self, cancel: &CancellationToken) -> Result<ProxyConfig>;

    async fn write_dword(
        &self,
        path: &str,
        name: &str,
        value: u32,
        cancel: &CancellationToken,
    ) -> Result<()>;

    async fn read_dword(&self, path: &str, name: &str, cancel: &CancellationToken) -> Result<u32>;
}

/// Build a `ProxyConfig` from the values under the Internet Settings key
pub fn proxy_config_from_values(values: &[(String, RegValue)]) -> ProxyConfig {
    let lookup = |name: &str| {
        values
            .iter()
            .find(|(value_name, _)| value_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    };
    let text = |name: &str| {
        lookup(name)
            .and_then(RegValue::as_text)
            .unwrap_or("")
            .to_string()
    };

    let server = text(PROXY_SERVER);
    let auto_config_url = text(AUTO_CONFIG_URL);
    ProxyConfig {
        enabled: lookup(PROXY_ENABLE)
            .and_then(RegValue::as_dword)
            .is_some_and(is_proxy_enabled),
        port: ProxyConfig::port_from_server(&server),
        server,
        bypass_list: text(PROXY_OVERRIDE),
        auto_config_url: (!auto_config_url.is_empty()).then_some(auto_config_url),
    }
}

// ============================================================================
// reg.exe store (production)
// ============================================================================

pub struct RegProxyStore {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl RegProxyStore {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    async fn reg(&self, args: Vec<String>, cancel: &CancellationToken) -> Result<String> {
        let spec = CommandSpec::new("reg", args).with_timeout(self.timeout);
        let result = self.runner.execute(&spec, cancel).await;
        if result.is_success() {
            Ok(result.stdout().to_string())
        } else {
            Err(NetmedicError::Registry(result.failure_detail()))
        }
    }
}

#[async_trait]
impl ProxyStore for RegProxyStore {
    async fn read_proxy(&self, cancel: &CancellationToken) -> Result<ProxyConfig> {
        let output = self
            .reg(vec!["query".into(), INTERNET_SETTINGS_KEY.into()], cancel)
            .await?;
        let config = proxy_config_from_values(&parse_reg_values(&output));
        debug!("Proxy enabled={} server='{}'", config.enabled, config.server);
        Ok(config)
    }

    async fn write_dword(
        &self,
        path: &str,
        name: &str,
        value: u32,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let args = vec![
            "add".into(),
            path.into(),
            "/v".into(),
            name.into(),
            "/t".into(),
            "REG_DWORD".into(),
            "/d".into(),
            value.to_string(),
            "/f".into(),
        ];
        self.reg(args, cancel).await.map(|_| ())
    }

    async fn read_dword(&self, path: &str, name: &str, cancel: &CancellationToken) -> Result<u32> {
        let output = self
            .reg(vec!["query".into(), path.into(), "/v".into(), name.into()], cancel)
            .await?;
        find_reg_value(&output, name)
            .and_then(|value| value.as_dword())
            .ok_or_else(|| NetmedicError::Registry(format!("{} is not a DWORD value", name)))
    }
}

// ============================================================================
// In-memory store (testing)
// ============================================================================

/// Proxy settings held in memory.
///
/// `ignoring_writes` models a policy-managed machine where writes report
/// success but the value never changes.
#[derive(Debug, Default)]
pub struct MemoryProxyStore {
    config: ProxyConfig,
    dwords: Mutex<HashMap<String, u32>>,
    ignore_writes: bool,
    fail_reads: bool,
}

impl MemoryProxyStore {
    pub fn new(config: ProxyConfig) -> Self {
        let mut dwords = HashMap::new();
        dwords.insert(
            Self::key(INTERNET_SETTINGS_KEY, PROXY_ENABLE),
            u32::from(config.enabled),
        );
        Self {
            config,
            dwords: Mutex::new(dwords),
            ..Default::default()
        }
    }

    pub fn ignoring_writes(mut self) -> Self {
        self.ignore_writes = true;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    fn key(path: &str, name: &str) -> String {
        format!("{}\\{}", path, name)
    }

    fn get(&self, path: &str, name: &str) -> Option<u32> {
        self.dwords
            .lock()
            .ok()
            .and_then(|dwords| dwords.get(&Self::key(path, name)).copied())
    }
}

#[async_trait]
impl ProxyStore for MemoryProxyStore {
    async fn read_proxy(&self, _cancel: &CancellationToken) -> Result<ProxyConfig> {
        if self.fail_reads {
            return Err(NetmedicError::Registry("access denied".to_string()));
        }
        let mut config = self.config.clone();
        config.enabled = self
            .get(INTERNET_SETTINGS_KEY, PROXY_ENABLE)
            .is_some_and(is_proxy_enabled);
        Ok(config)
    }

    async fn write_dword(
        &self,
        path: &str,
        name: &str,
        value: u32,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        if self.ignore_writes {
            return Ok(());
        }
        let mut dwords = self
            .dwords
            .lock()
            .map_err(|_| NetmedicError::Registry("store poisoned".to_string()))?;
        dwords.insert(Self::key(path, name), value);
        Ok(())
    }

    async fn read_dword(&self, path: &str, name: &str, _cancel: &CancellationToken) -> Result<u32> {
        if self.fail_reads {
            return Err(NetmedicError::Registry("access denied".to_string()));
        }
        self.get(path, name)
            .ok_or_else(|| NetmedicError::Registry(format!("{} not found", name)))
    }
}
