//! CommandExec - the single gateway for external utilities
//!
//! Every `ipconfig`, `netsh`, `reg` or `ping` call goes through a
//! [`CommandRunner`] as an explicit [`CommandSpec`] value:
//! - one attempt, no retries
//! - bounded by the command's timeout and the caller's cancellation token
//! - stdout/stderr captured in full and decoded from the GBK console codepage
//!
//! Output size is not bounded; a utility that floods stdout will be held in memory.
//!
//! Production code uses [`SystemCommandRunner`]. Tests use [`FakeCommandRunner`]
//! with pre-configured responses and get the list of command lines it received.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default timeout for commands
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit code reported when the process never produced one
pub const NO_EXIT_CODE: i32 = -1;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

// ============================================================================
// Command spec
// ============================================================================

/// An external command as a value: what to run and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program and arguments joined by single spaces
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

// ============================================================================
// Command result
// ============================================================================

/// Why a command produced no exit code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandFailure {
    #[error("failed to launch: {reason}")]
    Launch { reason: String },

    #[error("timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("cancelled")]
    Cancelled,
}

/// Result of one command execution.
///
/// Built only through [`CommandResult::completed`] and [`CommandResult::failed`], so a
/// result carrying a failure always has exit code [`NO_EXIT_CODE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    exit_code: i32,
    stdout: String,
    stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<CommandFailure>,
}

impl CommandResult {
    /// The process ran to completion with the given exit code
    pub fn completed(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            error: None,
        }
    }

    /// The process could not be launched or was stopped before it exited
    pub fn failed(error: CommandFailure) -> Self {
        Self {
            exit_code: NO_EXIT_CODE,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && self.error.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn error(&self) -> Option<&CommandFailure> {
        self.error.as_ref()
    }

    /// Best available explanation of a failure, for user-facing messages.
    ///
    /// netsh reports most errors on stdout, so stdout is used when stderr is empty.
    pub fn failure_detail(&self) -> String {
        if !self.stderr.is_empty() {
            return self.stderr.clone();
        }
        if let Some(error) = &self.error {
            return error.to_string();
        }
        if !self.stdout.is_empty() {
            return self.stdout.clone();
        }
        format!("exit code {}", self.exit_code)
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode console output bytes (GBK codepage) into trimmed Unicode text.
///
/// Malformed sequences become U+FFFD; decoding never fails.
pub fn decode_console_output(bytes: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::GBK.decode_without_bom_handling(bytes);
    if had_errors {
        debug!("Console output contained undecodable bytes");
    }
    text.trim().to_string()
}

// ============================================================================
// Runner trait
// ============================================================================

/// Executes command specs. Implementations must not panic and must not retry.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, spec: &CommandSpec, cancel: &CancellationToken) -> CommandResult;
}

// ============================================================================
// System runner (production)
// ============================================================================

/// Runs real OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn execute(&self, spec: &CommandSpec, cancel: &CancellationToken) -> CommandResult {
        let start = Instant::now();
        debug!("Executing: {} (timeout {:?})", spec.command_line(), spec.timeout);

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to launch {}: {}", spec.program, e);
                return CommandResult::failed(CommandFailure::Launch {
                    reason: e.to_string(),
                });
            }
        };

        // Dropping the output future drops the child, and kill_on_drop reaps it.
        let result = tokio::select! {
            output = child.wait_with_output() => match output {
                Ok(output) => CommandResult::completed(
                    output.status.code().unwrap_or(NO_EXIT_CODE),
                    decode_console_output(&output.stdout),
                    decode_console_output(&output.stderr),
                ),
                Err(e) => CommandResult::failed(CommandFailure::Launch {
                    reason: e.to_string(),
                }),
            },
            _ = tokio::time::sleep(spec.timeout) => {
                warn!("{} timed out after {:?}", spec.command_line(), spec.timeout);
                CommandResult::failed(CommandFailure::TimedOut {
                    timeout_ms: spec.timeout.as_millis() as u64,
                })
            }
            _ = cancel.cancelled() => {
                debug!("{} cancelled", spec.command_line());
                CommandResult::failed(CommandFailure::Cancelled)
            }
        };

        debug!(
            "{} finished in {}ms (exit {})",
            spec.program,
            start.elapsed().as_millis(),
            result.exit_code()
        );
        result
    }
}

// ============================================================================
// Fake runner (testing)
// ============================================================================

/// Scripted runner for deterministic tests.
///
/// Responses are keyed by [`CommandSpec::command_line`]. Unscripted commands
/// fail with a launch error, the same shape as a missing binary.
///
/// ```rust,ignore
/// let runner = FakeCommandRunner::new()
///     .respond("netsh winsock reset", CommandResult::completed(0, "ok", ""));
/// ```
#[derive(Debug, Default)]
pub struct FakeCommandRunner {
    responses: HashMap<String, CommandResult>,
    calls: Mutex<Vec<String>>,
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, command_line: &str, result: CommandResult) -> Self {
        self.responses.insert(command_line.to_string(), result);
        self
    }

    /// Shorthand for a zero-exit response with the given stdout
    pub fn succeed(self, command_line: &str, stdout: &str) -> Self {
        self.respond(command_line, CommandResult::completed(0, stdout, ""))
    }

    /// Shorthand for a non-zero exit with the given stderr
    pub fn fail(self, command_line: &str, stderr: &str) -> Self {
        self.respond(command_line, CommandResult::completed(1, "", stderr))
    }

    /// Command lines received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn execute(&self, spec: &CommandSpec, _cancel: &CancellationToken) -> CommandResult {
        let line = spec.command_line();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }
        self.responses.get(&line).cloned().unwrap_or_else(|| {
            CommandResult::failed(CommandFailure::Launch {
                reason: format!("no scripted response for '{}'", line),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_gbk_golden_fixture() {
        // "以太网适配器 本地连接:" as emitted by a Chinese-locale ipconfig
        let bytes = [
            0xd2, 0xd4, 0xcc, 0xab, 0xcd, 0xf8, 0xca, 0xca, 0xc5, 0xe4, 0xc6, 0xf7, 0x20, 0xb1,
            0xbe, 0xb5, 0xd8, 0xc1, 0xac, 0xbd, 0xd3, 0x3a,
        ];
        assert_eq!(decode_console_output(&bytes), "以太网适配器 本地连接:");
    }

    #[test]
    fn test_decode_ascii_and_trim() {
        assert_eq!(decode_console_output(b"  Ok.\r\n\r\n"), "Ok.");
    }

    #[test]
    fn test_decode_malformed_bytes_degrade() {
        // Lone lead byte at the end of input
        let decoded = decode_console_output(&[b'a', 0xd2]);
        assert!(decoded.starts_with('a'));
        assert!(decoded.contains('\u{FFFD}'));
    }

    #[test]
    fn test_failed_result_has_no_exit_code() {
        let result = CommandResult::failed(CommandFailure::Cancelled);
        assert_eq!(result.exit_code(), NO_EXIT_CODE);
        assert!(!result.is_success());
        assert_eq!(result.failure_detail(), "cancelled");
    }

    #[test]
    fn test_failure_detail_prefers_stderr_then_stdout() {
        let result = CommandResult::completed(1, "The requested operation requires elevation.", "");
        assert_eq!(result.failure_detail(), "The requested operation requires elevation.");

        let result = CommandResult::completed(1, "ignored", "Access is denied.");
        assert_eq!(result.failure_detail(), "Access is denied.");

        let result = CommandResult::completed(5, "", "");
        assert_eq!(result.failure_detail(), "exit code 5");
    }

    #[test]
    fn test_command_line() {
        let spec = CommandSpec::new("netsh", ["int", "ip", "reset"]);
        assert_eq!(spec.command_line(), "netsh int ip reset");
        assert_eq!(spec.timeout, DEFAULT_TIMEOUT);
        assert_eq!(CommandSpec::new("ipconfig", Vec::<String>::new()).command_line(), "ipconfig");
    }

    #[tokio::test]
    async fn test_fake_runner_records_calls() {
        let runner = FakeCommandRunner::new().succeed("ipconfig /flushdns", "flushed");
        let cancel = CancellationToken::new();

        let ok = runner
            .execute(&CommandSpec::new("ipconfig", ["/flushdns"]), &cancel)
            .await;
        let missing = runner
            .execute(&CommandSpec::new("netsh", ["winsock", "reset"]), &cancel)
            .await;

        assert!(ok.is_success());
        assert_eq!(ok.stdout(), "flushed");
        assert!(matches!(missing.error(), Some(CommandFailure::Launch { .. })));
        assert_eq!(runner.calls(), ["ipconfig /flushdns", "netsh winsock reset"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_exit_and_output() {
        let spec = CommandSpec::new("sh", ["-c", "printf hello; printf oops >&2; exit 3"]);
        let result = SystemCommandRunner::new()
            .execute(&spec, &CancellationToken::new())
            .await;

        assert_eq!(result.exit_code(), 3);
        assert_eq!(result.stdout(), "hello");
        assert_eq!(result.stderr(), "oops");
        assert!(result.error().is_none());
        assert!(!result.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let spec = CommandSpec::new("netmedic-definitely-not-a-binary", Vec::<String>::new());
        let result = SystemCommandRunner::new()
            .execute(&spec, &CancellationToken::new())
            .await;

        assert!(matches!(result.error(), Some(CommandFailure::Launch { .. })));
        assert_eq!(result.exit_code(), NO_EXIT_CODE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_timeout() {
        let spec = CommandSpec::new("sleep", ["5"]).with_timeout(Duration::from_millis(100));
        let start = Instant::now();
        let result = SystemCommandRunner::new()
            .execute(&spec, &CancellationToken::new())
            .await;

        assert_eq!(result.error(), Some(&CommandFailure::TimedOut { timeout_ms: 100 }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let spec = CommandSpec::new("sleep", ["5"]);
        let result = SystemCommandRunner::new().execute(&spec, &cancel).await;

        assert_eq!(result.error(), Some(&CommandFailure::Cancelled));
    }
}
