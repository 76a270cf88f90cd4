//! Elevation check for admin-only repairs.
//!
//! Detection only; the process is never relaunched.

use crate::command_exec::{CommandRunner, CommandSpec};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Whether this process can run admin-only repairs
#[cfg(unix)]
pub async fn is_elevated(_runner: &dyn CommandRunner) -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub async fn is_elevated(runner: &dyn CommandRunner) -> bool {
    net_session_elevated(runner).await
}

/// `net session` only succeeds from an elevated prompt
pub async fn net_session_elevated(runner: &dyn CommandRunner) -> bool {
    let spec = CommandSpec::new("net", ["session"]).with_timeout(Duration::from_secs(10));
    runner
        .execute(&spec, &CancellationToken::new())
        .await
        .is_success()
}
