//! Error types for netmedic.
//!
//! Probes and repairs never return these: every failure there is folded into a
//! `DiagnosticResult` or `RepairResult`. Only collaborators (interface source,
//! proxy store, reachability), the network tools and the persistence side
//! (config, reports) surface them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetmedicError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl NetmedicError {
    /// Short machine-readable code, used by the CLI exit path and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            NetmedicError::Io(_) => "io",
            NetmedicError::Json(_) => "json",
            NetmedicError::Toml(_) => "toml",
            NetmedicError::Config(_) => "config",
            NetmedicError::Command(_) => "command",
            NetmedicError::Network(_) => "network",
            NetmedicError::Registry(_) => "registry",
            NetmedicError::InvalidArgument(_) => "invalid_argument",
        }
    }
}

pub type Result<T> = std::result::Result<T, NetmedicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "hosts");
        let err: NetmedicError = io.into();
        assert_eq!(err.code(), "io");
        assert!(err.to_string().contains("hosts"));
    }

    #[test]
    fn test_registry_error_message() {
        let err = NetmedicError::Registry("ProxyEnable missing".to_string());
        assert_eq!(err.to_string(), "Registry error: ProxyEnable missing");
    }
}
