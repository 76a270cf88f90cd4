//! Hosts file probe

use super::Probe;
use crate::context::SystemContext;
use crate::parsers::parse_hosts;
use crate::types::DiagnosticResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// More custom entries than this is worth a look, though not a repair
const MANY_ENTRIES: usize = 10;

pub struct HostsProbe {
    ctx: SystemContext,
}

impl HostsProbe {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

/// Hosts files saved by older editors are ANSI (GBK on Chinese systems)
pub(crate) fn decode_hosts(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => encoding_rs::GBK
            .decode_without_bom_handling(e.as_bytes())
            .0
            .into_owned(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

#[async_trait]
impl Probe for HostsProbe {
    fn id(&self) -> &str {
        "hosts"
    }

    fn name(&self) -> &str {
        "Hosts file"
    }

    async fn check(&self, _cancel: &CancellationToken) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(self.id(), self.name());
        let path = &self.ctx.config.hosts.path;

        let content = match tokio::fs::read(path).await {
            Ok(bytes) => decode_hosts(bytes),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                result.set_error(format!("Unable to read hosts file: {}", e), true);
                return result;
            }
        };

        let entries = parse_hosts(&content);
        let suspicious = entries.iter().filter(|e| e.suspicious).count();

        result.add_detail("entries", &entries);
        result.add_detail("totalEntries", entries.len());
        result.add_detail("suspiciousCount", suspicious);

        if suspicious > 0 {
            result.set_warning(
                format!(
                    "Found {} suspicious hosts entries redirecting well-known sites",
                    suspicious
                ),
                true,
            );
        } else if entries.len() > MANY_ENTRIES {
            result.set_warning(
                format!("Hosts file has {} custom entries", entries.len()),
                false,
            );
        } else {
            result.set_ok("Hosts file looks normal");
        }
        info!("hosts: {} entries, {} suspicious", entries.len(), suspicious);
        result
    }
}
