//! Allowlisted command execution: authorization (verb → mode) and the
//! dual shell/no-shell dispatch runner.

mod allowlist;
mod runner;

pub use allowlist::{AuthorizedCommand, CommandAllowlist, ExecutionMode};
pub use runner::{CommandRunner, DEFAULT_TIMEOUT_SECS, ExecutionResult};
