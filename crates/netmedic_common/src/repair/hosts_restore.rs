//! Hosts file restore: back up the current file, then write the stock template

use super::Repair;
use crate::context::SystemContext;
use crate::types::RepairResult;
use async_trait::async_trait;
use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const WINDOWS_HOSTS: &str = "\
# Copyright (c) 1993-2009 Microsoft Corp.
#
# This is a sample HOSTS file used by Microsoft TCP/IP for Windows.
#
# This file contains the mappings of IP addresses to host names. Each
# entry should be kept on an individual line. The IP address should
# be placed in the first column followed by the corresponding host name.
# The IP address and the host name should be separated by at least one
# space.
#
# Additionally, comments (such as these) may be inserted on individual
# lines or following the machine name denoted by a '#' symbol.
#
# For example:
#
#      102.54.94.97     rhino.acme.com          # source server
#       38.25.63.10     x.acme.com              # x client host

# localhost name resolution is handled within DNS itself.
#\t127.0.0.1       localhost
#\t::1             localhost
";

// Unix resolvers do not special-case localhost, so the mappings stay live.
const UNIX_HOSTS: &str = "\
127.0.0.1\tlocalhost
::1\tlocalhost ip6-localhost ip6-loopback
";

/// Stock hosts content for this platform
pub fn default_hosts_template() -> &'static str {
    if cfg!(windows) {
        WINDOWS_HOSTS
    } else {
        UNIX_HOSTS
    }
}

/// Same-second restores get a counter suffix
const MAX_BACKUP_SUFFIX: u32 = 100;

pub struct HostsRestore {
    ctx: SystemContext,
}

impl HostsRestore {
    pub fn new(ctx: SystemContext) -> Self {
        Self { ctx }
    }
}

/// Write `content` to a fresh `hosts.YYYYMMDD_HHMMSS[_N].bak` in `dir`.
/// Existing backups are never overwritten.
async fn write_backup(dir: &Path, content: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

    for n in 0..MAX_BACKUP_SUFFIX {
        let name = match n {
            0 => format!("hosts.{}.bak", stamp),
            _ => format!("hosts.{}_{}.bak", stamp, n),
        };
        let path = dir.join(name);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };
        file.write_all(content).await?;
        file.sync_all().await?;
        return Ok(path);
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free backup name for {} in {}", stamp, dir.display()),
    ))
}

#[async_trait]
impl Repair for HostsRestore {
    fn id(&self) -> &str {
        "hosts"
    }

    fn name(&self) -> &str {
        "Restore default hosts file"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    async fn repair(&self, _cancel: &CancellationToken) -> RepairResult {
        let mut result = RepairResult::new(self.id(), self.name());
        let settings = &self.ctx.config.hosts;

        let current = match tokio::fs::read(&settings.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Cannot read {}: {}", settings.path.display(), e);
                result.set_failure(format!("Unable to read hosts file: {}", e));
                return result;
            }
        };

        let backup_dir = settings.effective_backup_dir();
        let backup = match write_backup(&backup_dir, &current).await {
            Ok(path) => path,
            Err(e) => {
                warn!("Cannot write backup in {}: {}", backup_dir.display(), e);
                result.set_failure(format!("Unable to back up hosts file: {}", e));
                return result;
            }
        };
        result.set_backup_path(backup.display().to_string());

        if let Err(e) = tokio::fs::write(&settings.path, default_hosts_template()).await {
            warn!("Cannot write {}: {}", settings.path.display(), e);
            result.set_failure(format!("Unable to write hosts file: {}", e));
            return result;
        }

        info!("hosts: restored, backup at {}", backup.display());
        result.set_success("Hosts file restored to the default");
        result
    }
}
