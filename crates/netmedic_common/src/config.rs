//! Netmedic Configuration
//!
//! Operator configuration for timeouts, file locations and adapter names.
//! Lives in `<config_dir>/netmedic/config.toml`; every field has a default, so a
//! missing file or a partial file is fine.

use crate::error::{NetmedicError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const CONFIG_DIR_NAME: &str = "netmedic";
const CONFIG_FILE: &str = "config.toml";

/// External command settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSettings {
    /// Per-command timeout in seconds (valid: 1-600)
    #[serde(default = "default_command_timeout")]
    pub timeout_secs: u64,
}

fn default_command_timeout() -> u64 {
    30
}

impl CommandSettings {
    pub fn effective_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 600))
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_command_timeout(),
        }
    }
}

/// Hosts file location and backup directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostsSettings {
    #[serde(default = "default_hosts_path")]
    pub path: PathBuf,

    /// Where hosts backups go; the hosts file's own directory when unset
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

fn default_hosts_path() -> PathBuf {
    if cfg!(windows) {
        let root = std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
        PathBuf::from(root)
            .join("System32")
            .join("drivers")
            .join("etc")
            .join("hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

impl HostsSettings {
    pub fn effective_backup_dir(&self) -> PathBuf {
        match &self.backup_dir {
            Some(dir) => dir.clone(),
            None => self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl Default for HostsSettings {
    fn default() -> Self {
        Self {
            path: default_hosts_path(),
            backup_dir: None,
        }
    }
}

/// Connectivity probe timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivitySettings {
    /// HTTP target timeout in seconds (valid: 1-60)
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// TCP connect timeout in seconds (valid: 1-60)
    #[serde(default = "default_tcp_timeout")]
    pub tcp_timeout_secs: u64,
}

fn default_http_timeout() -> u64 {
    8
}

fn default_tcp_timeout() -> u64 {
    5
}

impl ConnectivitySettings {
    pub fn effective_http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.clamp(1, 60))
    }

    pub fn effective_tcp_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_timeout_secs.clamp(1, 60))
    }
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            tcp_timeout_secs: default_tcp_timeout(),
        }
    }
}

/// Adapter reset: interface names tried in order, pause between disable and enable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterResetSettings {
    #[serde(default = "default_interface_names")]
    pub interface_names: Vec<String>,

    #[serde(default = "default_adapter_pause")]
    pub pause_ms: u64,
}

fn default_interface_names() -> Vec<String> {
    vec!["以太网".to_string(), "Ethernet".to_string()]
}

fn default_adapter_pause() -> u64 {
    2000
}

impl AdapterResetSettings {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms.min(30_000))
    }
}

impl Default for AdapterResetSettings {
    fn default() -> Self {
        Self {
            interface_names: default_interface_names(),
            pause_ms: default_adapter_pause(),
        }
    }
}

/// IP release/renew pause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpRenewSettings {
    #[serde(default = "default_renew_pause")]
    pub pause_ms: u64,
}

fn default_renew_pause() -> u64 {
    1000
}

impl IpRenewSettings {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms.min(30_000))
    }
}

impl Default for IpRenewSettings {
    fn default() -> Self {
        Self {
            pause_ms: default_renew_pause(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetmedicConfig {
    #[serde(default)]
    pub commands: CommandSettings,

    #[serde(default)]
    pub hosts: HostsSettings,

    #[serde(default)]
    pub connectivity: ConnectivitySettings,

    #[serde(default)]
    pub adapter_reset: AdapterResetSettings,

    #[serde(default)]
    pub ip_renew: IpRenewSettings,

    #[serde(default)]
    pub log: LogConfig,
}

impl NetmedicConfig {
    /// Default config file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.adapter_reset.interface_names.is_empty() {
            return Err(NetmedicError::Config(
                "adapter_reset.interface_names must list at least one interface".to_string(),
            ));
        }
        if self.hosts.path.as_os_str().is_empty() {
            return Err(NetmedicError::Config("hosts.path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetmedicConfig::default();
        assert_eq!(config.commands.effective_timeout(), Duration::from_secs(30));
        assert_eq!(config.connectivity.effective_http_timeout(), Duration::from_secs(8));
        assert_eq!(config.connectivity.effective_tcp_timeout(), Duration::from_secs(5));
        assert_eq!(config.adapter_reset.interface_names, ["以太网", "Ethernet"]);
        assert_eq!(config.adapter_reset.pause(), Duration::from_secs(2));
        assert_eq!(config.ip_renew.pause(), Duration::from_secs(1));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NetmedicConfig::from_toml(
            r#"
            [commands]
            timeout_secs = 10

            [hosts]
            path = "/tmp/hosts"
            "#,
        )
        .unwrap();

        assert_eq!(config.commands.effective_timeout(), Duration::from_secs(10));
        assert_eq!(config.hosts.path, PathBuf::from("/tmp/hosts"));
        assert_eq!(config.hosts.effective_backup_dir(), PathBuf::from("/tmp"));
        assert_eq!(config.connectivity.http_timeout_secs, 8);
    }

    #[test]
    fn test_timeout_is_clamped() {
        let config = NetmedicConfig::from_toml("[commands]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(config.commands.effective_timeout(), Duration::from_secs(1));

        let config =
            NetmedicConfig::from_toml("[connectivity]\nhttp_timeout_secs = 900\n").unwrap();
        assert_eq!(config.connectivity.effective_http_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_empty_interface_list_rejected() {
        let err = NetmedicConfig::from_toml("[adapter_reset]\ninterface_names = []\n").unwrap_err();
        assert_eq!(err.code(), "config");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = NetmedicConfig::from_toml("[commands\n").unwrap_err();
        assert_eq!(err.code(), "toml");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();

        let config = NetmedicConfig::load_from(&path).unwrap();
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_explicit_backup_dir() {
        let config = NetmedicConfig::from_toml(
            "[hosts]\npath = \"/etc/hosts\"\nbackup_dir = \"/var/backups\"\n",
        )
        .unwrap();
        assert_eq!(config.hosts.effective_backup_dir(), PathBuf::from("/var/backups"));
    }
}
