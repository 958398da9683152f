//! Command execution with a hard wall-clock timeout and captured output.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::allowlist::{AuthorizedCommand, ExecutionMode};
use crate::error::{AgentError, Result};

/// Default wall-clock bound on a single command.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Maximum captured size per output stream (1 MiB).
const MAX_OUTPUT_BYTES: usize = 1_048_576;
/// Environment variables safe to pass through to spawned commands.
/// Only functional variables — never API keys or other secrets.
const SAFE_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "TERM", "LANG", "LC_ALL", "LC_CTYPE", "USER", "SHELL",
];

/// Captured outcome of a command that ran to completion.
///
/// A non-zero exit code is data, not a service error: it distinguishes
/// "the command ran and itself reported failure" from "the service could
/// not run the command at all".
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; -1 when the process was terminated by a signal.
    pub exit_code: i32,
}

/// Runs authorized commands inside the workspace with a fixed timeout.
///
/// Every invocation is a fresh process whose working directory is the
/// workspace root, so no verb can chdir persistently across calls.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    cwd: PathBuf,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(cwd: PathBuf, timeout: Duration) -> Self {
        Self { cwd, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute an authorized command, capturing stdout/stderr/exit code.
    ///
    /// Builtin mode hands the original raw string to `/bin/sh -c`; exec
    /// mode spawns the token vector directly and never re-joins it into a
    /// shell string. On timeout the child's whole process group is killed
    /// so grandchildren do not orphan.
    pub async fn run(&self, authorized: &AuthorizedCommand) -> Result<ExecutionResult> {
        let mut command = match authorized.mode {
            ExecutionMode::Builtin => {
                let mut c = Command::new("/bin/sh");
                c.arg("-c").arg(&authorized.raw);
                c
            }
            ExecutionMode::Exec => {
                let mut c = Command::new(&authorized.tokens[0]);
                c.args(&authorized.tokens[1..]);
                c
            }
        };

        command
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env_clear()
            .kill_on_drop(true);

        for var in SAFE_ENV_VARS {
            if let Ok(val) = std::env::var(var) {
                command.env(var, val);
            }
        }

        // Own process group so a timeout can take down the whole tree.
        #[cfg(unix)]
        command.process_group(0);

        let verb = authorized.verb().to_string();
        let child = command.spawn().map_err(|e| {
            AgentError::Internal(format!("failed to spawn '{verb}': {e}"))
        })?;
        let pid = child.id();

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let exit_code = output.status.code().unwrap_or(-1);
                tracing::debug!(verb = %verb, exit_code, "command completed");
                Ok(ExecutionResult {
                    stdout: capture_stream(&output.stdout),
                    stderr: capture_stream(&output.stderr),
                    exit_code,
                })
            }
            Ok(Err(e)) => Err(AgentError::Internal(format!(
                "failed to collect output of '{verb}': {e}"
            ))),
            Err(_) => {
                // The dropped future already killed the direct child
                // (kill_on_drop); sweep the rest of its process group.
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                let secs = self.timeout.as_secs();
                tracing::warn!(verb = %verb, secs, "command timed out and was killed");
                Err(AgentError::CommandTimeout { secs })
            }
        }
    }
}

fn capture_stream(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > MAX_OUTPUT_BYTES {
        let mut cut = MAX_OUTPUT_BYTES;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("\n... [output truncated at 1MB]");
    }
    text
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    #[allow(clippy::cast_possible_wrap)]
    let pid = pid as libc::pid_t;
    unsafe {
        let pgid = libc::getpgid(pid);
        if pgid != -1 {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}
