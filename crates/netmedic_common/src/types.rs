//! Core data types shared by probes, repairs and the report writer
//!
//! Field names serialize in camelCase; the report format and any UI bridge
//! depend on them, so renaming a field is a breaking change.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

// ============================================================================
// Diagnostic results
// ============================================================================

/// Severity of a diagnostic outcome. Ordering follows severity: Ok < Warning < Error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStatus {
    #[default]
    Ok,
    Warning,
    Error,
}

impl DiagnosticStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticStatus::Ok => "ok",
            DiagnosticStatus::Warning => "warning",
            DiagnosticStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for DiagnosticStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single probe run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    /// Probe identifier (e.g. "dns")
    pub id: String,
    /// Human-readable probe name
    pub name: String,
    pub status: DiagnosticStatus,
    /// One-line summary; non-empty once the probe has finished
    pub message: String,
    /// Structured facts, in insertion order
    pub details: Map<String, Value>,
    /// Creation time of this result
    pub timestamp: DateTime<Local>,
    /// Whether a registered repair can address this condition
    pub repairable: bool,
}

impl DiagnosticResult {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: DiagnosticStatus::Ok,
            message: String::new(),
            details: Map::new(),
            timestamp: Local::now(),
            repairable: false,
        }
    }

    pub fn set_ok(&mut self, message: impl Into<String>) {
        self.status = DiagnosticStatus::Ok;
        self.message = message.into();
        self.repairable = false;
    }

    pub fn set_warning(&mut self, message: impl Into<String>, repairable: bool) {
        self.status = DiagnosticStatus::Warning;
        self.message = message.into();
        self.repairable = repairable;
    }

    pub fn set_error(&mut self, message: impl Into<String>, repairable: bool) {
        self.status = DiagnosticStatus::Error;
        self.message = message.into();
        self.repairable = repairable;
    }

    /// Record a detail. Keys are write-once: a second write to the same key is dropped.
    pub fn add_detail(&mut self, key: &str, value: impl Serialize) {
        if self.details.contains_key(key) {
            debug!("{}: detail '{}' already set, ignoring", self.id, key);
            return;
        }
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.details.insert(key.to_string(), value);
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

// ============================================================================
// Repair results
// ============================================================================

/// Outcome of a single repair run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairResult {
    pub id: String,
    pub name: String,
    pub success: bool,
    pub message: String,
    /// Sticky for the run: there is no way to clear it once set
    pub require_reboot: bool,
    pub timestamp: DateTime<Local>,
    /// Present only when a backup was written before mutating state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
}

impl RepairResult {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            success: false,
            message: String::new(),
            require_reboot: false,
            timestamp: Local::now(),
            backup_path: None,
        }
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = true;
        self.message = message.into();
    }

    pub fn set_failure(&mut self, message: impl Into<String>) {
        self.success = false;
        self.message = message.into();
    }

    pub fn set_require_reboot(&mut self) {
        self.require_reboot = true;
    }

    pub fn set_backup_path(&mut self, path: impl Into<String>) {
        self.backup_path = Some(path.into());
    }
}

// ============================================================================
// Network facts
// ============================================================================

/// Link state of an adapter as reported by the interface source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AdapterStatus {
    Up,
    Down,
    #[default]
    Unknown,
}

/// Adapter as reported by the adapter probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdapterInfo {
    pub name: String,
    pub description: String,
    pub mac_address: String,
    pub status: AdapterStatus,
    pub ip_addresses: Vec<String>,
    pub subnet_masks: Vec<String>,
    pub gateways: Vec<String>,
    pub dns_servers: Vec<String>,
    pub dhcp_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp_server: Option<String>,
}

/// Per-adapter IP configuration extracted from `ipconfig /all`.
/// Empty lists are information, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    pub name: String,
    pub dhcp_enabled: bool,
    pub ip_addresses: Vec<String>,
    pub subnet_masks: Vec<String>,
    pub gateways: Vec<String>,
    pub dns_servers: Vec<String>,
}

/// One mapping line from the hosts file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostsEntry {
    pub ip: String,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 1-based physical line number, blanks and comments included
    pub line_num: usize,
    pub suspicious: bool,
}

/// System proxy settings (Internet Settings key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub enabled: bool,
    pub server: String,
    pub port: u16,
    pub bypass_list: String,
    #[serde(default, rename = "autoConfigUrl", skip_serializing_if = "Option::is_none")]
    pub auto_config_url: Option<String>,
}

impl ProxyConfig {
    /// Port from a `host:port` server string; 0 when absent or not numeric.
    /// Per-protocol strings such as `http=a:1;https=b:2` keep the first port.
    pub fn port_from_server(server: &str) -> u16 {
        let first = server.split(';').next().unwrap_or("");
        first
            .rsplit_once(':')
            .and_then(|(_, port)| port.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Outcome of one connectivity target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityResult {
    pub target: String,
    pub success: bool,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(DiagnosticStatus::Ok < DiagnosticStatus::Warning);
        assert!(DiagnosticStatus::Warning < DiagnosticStatus::Error);
        assert_eq!(
            [DiagnosticStatus::Warning, DiagnosticStatus::Error, DiagnosticStatus::Ok]
                .iter()
                .max(),
            Some(&DiagnosticStatus::Error)
        );
    }

    #[test]
    fn test_set_ok_clears_repairable() {
        let mut result = DiagnosticResult::new("dns", "DNS resolution");
        result.set_warning("partial", true);
        assert!(result.repairable);
        result.set_ok("fine");
        assert_eq!(result.status, DiagnosticStatus::Ok);
        assert!(!result.repairable);
        assert_eq!(result.message, "fine");
    }

    #[test]
    fn test_details_are_write_once_and_ordered() {
        let mut result = DiagnosticResult::new("hosts", "Hosts file");
        result.add_detail("totalEntries", 3);
        result.add_detail("suspiciousCount", 1);
        result.add_detail("totalEntries", 99);

        assert_eq!(result.detail("totalEntries"), Some(&Value::from(3)));
        let keys: Vec<&String> = result.details.keys().collect();
        assert_eq!(keys, ["totalEntries", "suspiciousCount"]);
    }

    #[test]
    fn test_diagnostic_result_json_shape() {
        let mut result = DiagnosticResult::new("proxy", "Proxy settings");
        result.set_warning("Proxy server enabled: 10.0.0.1:8080", true);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "warning");
        assert_eq!(json["repairable"], true);
        for key in ["id", "name", "message", "details", "timestamp"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_repair_result_json_shape() {
        let mut result = RepairResult::new("winsock", "Reset Winsock");
        result.set_success("done");
        result.set_require_reboot();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["requireReboot"], true);
        assert!(json.get("backupPath").is_none());

        result.set_backup_path("C:\\hosts.bak");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["backupPath"], "C:\\hosts.bak");
    }

    #[test]
    fn test_require_reboot_survives_failure() {
        let mut result = RepairResult::new("tcpip", "Reset TCP/IP");
        result.set_require_reboot();
        result.set_failure("later step failed");
        assert!(result.require_reboot);
    }

    #[test]
    fn test_proxy_port_from_server() {
        assert_eq!(ProxyConfig::port_from_server("127.0.0.1:7890"), 7890);
        assert_eq!(ProxyConfig::port_from_server("http=proxy:3128;https=proxy:3129"), 3128);
        assert_eq!(ProxyConfig::port_from_server("proxy.corp"), 0);
        assert_eq!(ProxyConfig::port_from_server(""), 0);
    }
}
