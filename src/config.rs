use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

/// Default listening port, matching the service's historical deployment.
pub const DEFAULT_PORT: u16 = 3000;
/// Default workspace directory, resolved relative to the process cwd.
pub const DEFAULT_WORKSPACE: &str = "./workspace";

/// Process-lifetime configuration, resolved once at startup.
///
/// Precedence per field: CLI flag > environment variable > default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workspace_dir: PathBuf,
    pub command_timeout: Duration,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Self {
        Self::from_parts(
            cli,
            std::env::var("PORT").ok(),
            std::env::var("SANDBOXD_WORKSPACE").ok(),
            std::env::var("SANDBOXD_TIMEOUT_SECS").ok(),
        )
    }

    fn from_parts(
        cli: &Cli,
        env_port: Option<String>,
        env_workspace: Option<String>,
        env_timeout: Option<String>,
    ) -> Self {
        let port = cli
            .port
            .or_else(|| env_port.and_then(|p| p.trim().parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let workspace_dir = cli
            .workspace
            .clone()
            .or_else(|| env_workspace.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE));

        let timeout_secs = cli
            .timeout
            .or_else(|| env_timeout.and_then(|t| t.trim().parse().ok()))
            .unwrap_or(crate::exec::DEFAULT_TIMEOUT_SECS);

        Self {
            host: cli.host.clone(),
            port,
            workspace_dir,
            command_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
