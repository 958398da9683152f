use std::path::PathBuf;

use clap::Parser;

/// `sandboxd` — workspace-confined file and command execution service.
#[derive(Parser, Debug)]
#[command(name = "sandboxd")]
#[command(version = "0.1.0")]
#[command(about = "Serve sandboxed read/write/list/run operations over HTTP.", long_about = None)]
pub struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on (falls back to $PORT, then 3000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Workspace directory (falls back to $SANDBOXD_WORKSPACE, then ./workspace)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Per-command timeout in seconds (falls back to $SANDBOXD_TIMEOUT_SECS, then 10)
    #[arg(long)]
    pub timeout: Option<u64>,
}
